//! Bulk-mode selection.
//!
//! Selection is keyed by certificate id, so it survives re-sorting and is
//! not pruned when a filter hides a selected certificate.

use std::collections::BTreeSet;

use certdesk_core::CertificateId;

#[derive(Debug, Clone, Default)]
pub struct Selection {
    bulk_mode: bool,
    ids: BTreeSet<CertificateId>,
}

impl Selection {
    /// Enter bulk mode with nothing selected.
    pub fn enter(&mut self) {
        self.bulk_mode = true;
        self.ids.clear();
    }

    /// Leave bulk mode, dropping the selection.
    pub fn exit(&mut self) {
        self.bulk_mode = false;
        self.ids.clear();
    }

    pub fn is_bulk_mode(&self) -> bool {
        self.bulk_mode
    }

    /// Flip membership of `id`. Returns whether it is now selected.
    ///
    /// Outside bulk mode this does nothing.
    pub fn toggle(&mut self, id: CertificateId) -> bool {
        if !self.bulk_mode {
            return false;
        }
        if self.ids.remove(&id) {
            false
        } else {
            self.ids.insert(id);
            true
        }
    }

    /// Select every id given. Outside bulk mode this does nothing.
    pub fn extend<I: IntoIterator<Item = CertificateId>>(&mut self, ids: I) {
        if self.bulk_mode {
            self.ids.extend(ids);
        }
    }

    /// Forget ids that no longer exist.
    pub fn remove(&mut self, ids: &[CertificateId]) {
        for id in ids {
            self.ids.remove(id);
        }
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn contains(&self, id: &CertificateId) -> bool {
        self.ids.contains(id)
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Selected ids in id order.
    pub fn ids(&self) -> Vec<CertificateId> {
        self.ids.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> CertificateId {
        CertificateId::new(s)
    }

    #[test]
    fn test_toggle_twice_restores_membership() {
        let mut selection = Selection::default();
        selection.enter();
        selection.toggle(id("A"));

        let before = selection.ids();
        assert!(selection.toggle(id("B")));
        assert!(!selection.toggle(id("B")));
        assert_eq!(selection.ids(), before);
    }

    #[test]
    fn test_toggle_outside_bulk_mode_is_ignored() {
        let mut selection = Selection::default();
        assert!(!selection.toggle(id("A")));
        assert!(selection.is_empty());
    }

    #[test]
    fn test_enter_starts_empty_and_exit_clears() {
        let mut selection = Selection::default();
        selection.enter();
        selection.toggle(id("A"));
        selection.exit();
        assert!(!selection.is_bulk_mode());
        assert!(selection.is_empty());

        selection.enter();
        assert!(selection.is_bulk_mode());
        assert!(selection.is_empty());
    }

    #[test]
    fn test_remove_only_drops_named_ids() {
        let mut selection = Selection::default();
        selection.enter();
        selection.extend([id("A"), id("B"), id("C")]);
        selection.remove(&[id("B")]);
        assert_eq!(selection.ids(), vec![id("A"), id("C")]);
    }
}
