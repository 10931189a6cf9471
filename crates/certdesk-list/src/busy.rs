//! Busy flags for in-flight work.

use std::collections::HashMap;

/// Kinds of work the list can have in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Activity {
    Loading,
    Deleting,
    BulkDeleting,
    UpdatingStatus,
    Linking,
    Exporting,
}

/// Count of in-flight operations per activity.
///
/// Overlapping operations of one kind each hold the flag; it clears when
/// the last of them ends.
#[derive(Debug, Default)]
pub(crate) struct Activities {
    running: HashMap<Activity, usize>,
}

impl Activities {
    pub(crate) fn begin(&mut self, activity: Activity) {
        *self.running.entry(activity).or_insert(0) += 1;
    }

    /// Returns true when the last operation of this kind has finished.
    pub(crate) fn end(&mut self, activity: Activity) -> bool {
        match self.running.get_mut(&activity) {
            Some(count) if *count > 1 => {
                *count -= 1;
                false
            }
            _ => {
                self.running.remove(&activity);
                true
            }
        }
    }

    pub(crate) fn is_busy(&self, activity: Activity) -> bool {
        self.running.contains_key(&activity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlapping_operations_keep_flag_until_last_ends() {
        let mut activities = Activities::default();
        activities.begin(Activity::Loading);
        activities.begin(Activity::Loading);

        assert!(!activities.end(Activity::Loading));
        assert!(activities.is_busy(Activity::Loading));
        assert!(activities.end(Activity::Loading));
        assert!(!activities.is_busy(Activity::Loading));
    }

    #[test]
    fn test_end_without_begin_is_harmless() {
        let mut activities = Activities::default();
        assert!(activities.end(Activity::Exporting));
        assert!(!activities.is_busy(Activity::Exporting));
    }
}
