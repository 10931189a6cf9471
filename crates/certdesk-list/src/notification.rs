//! Terminal notifications produced by list mutations.

use serde::Serialize;

use certdesk_core::{CertificateId, CertificateStatus};
use certdesk_store::{ExportSummary, StoreError};

pub(crate) const DELETE_FALLBACK: &str = "Failed to delete certificate";
pub(crate) const STATUS_FALLBACK: &str = "Failed to update certificate status";
pub(crate) const LINK_FALLBACK: &str = "Failed to update customer link";
pub(crate) const EXPORT_FALLBACK: &str = "Failed to export certificates";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Success,
    Failure,
    /// Some items of a batch succeeded and some failed.
    Partial,
}

/// Success and failure tallies for a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchCounts {
    pub succeeded: usize,
    pub failed: usize,
}

/// Outcome of one item in a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationResult {
    pub id: CertificateId,
    pub success: bool,
    pub error_message: Option<String>,
}

impl MutationResult {
    pub(crate) fn from_outcome(id: CertificateId, outcome: Result<(), StoreError>) -> Self {
        match outcome {
            Ok(()) => Self {
                id,
                success: true,
                error_message: None,
            },
            Err(err) => Self {
                id,
                success: false,
                error_message: Some(err.to_string()),
            },
        }
    }
}

/// Ordered per-item outcomes of a batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkMutationResult {
    pub results: Vec<MutationResult>,
}

impl BulkMutationResult {
    pub fn counts(&self) -> BatchCounts {
        let succeeded = self.results.iter().filter(|r| r.success).count();
        BatchCounts {
            succeeded,
            failed: self.results.len() - succeeded,
        }
    }

    pub fn failures(&self) -> impl Iterator<Item = &MutationResult> {
        self.results.iter().filter(|r| !r.success)
    }
}

/// The single message a mutating command resolves to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub counts: Option<BatchCounts>,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Success,
            message: message.into(),
            counts: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Failure,
            message: message.into(),
            counts: None,
        }
    }

    fn with_counts(mut self, counts: BatchCounts) -> Self {
        self.counts = Some(counts);
        self
    }

    /// Failure carrying the server's message, or `fallback` when it gave none.
    pub(crate) fn from_error(err: &StoreError, fallback: &str) -> Self {
        Self::failure(err.remote_message().unwrap_or(fallback))
    }

    pub(crate) fn bulk_delete(counts: BatchCounts) -> Self {
        let BatchCounts { succeeded, failed } = counts;
        let notification = if failed == 0 {
            Self::success(format!("Deleted {}", certificates(succeeded)))
        } else if succeeded == 0 {
            Self::failure(format!("Failed to delete all {}", certificates(failed)))
        } else {
            Self {
                kind: NotificationKind::Partial,
                message: format!("Deleted {}, {} failed", certificates(succeeded), failed),
                counts: None,
            }
        };
        notification.with_counts(counts)
    }

    pub(crate) fn status_updated(count: usize, status: CertificateStatus) -> Self {
        Self::success(format!("Updated {} to {}", certificates(count), status.label()))
            .with_counts(BatchCounts {
                succeeded: count,
                failed: 0,
            })
    }

    pub(crate) fn export(summary: ExportSummary, bundled: bool) -> Self {
        let counts = BatchCounts {
            succeeded: summary.successful,
            failed: summary.failed,
        };
        let notification = if summary.successful == 0 && summary.failed == 0 {
            // Nothing came back for a non-empty request.
            Self::failure(EXPORT_FALLBACK)
        } else if summary.failed == 0 {
            let suffix = if bundled { " as a ZIP archive" } else { "" };
            Self::success(format!(
                "Exported {}{}",
                certificates(summary.successful),
                suffix
            ))
        } else if summary.successful == 0 {
            Self::failure(format!("Failed to export all {}", certificates(summary.failed)))
        } else {
            Self {
                kind: NotificationKind::Partial,
                message: format!(
                    "Exported {}, {} failed",
                    certificates(summary.successful),
                    summary.failed
                ),
                counts: None,
            }
        };
        notification.with_counts(counts)
    }
}

fn certificates(n: usize) -> String {
    if n == 1 {
        "1 certificate".to_string()
    } else {
        format!("{} certificates", n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(succeeded: usize, failed: usize) -> BatchCounts {
        BatchCounts { succeeded, failed }
    }

    #[test]
    fn test_bulk_delete_wording_is_distinct_per_outcome() {
        let all_ok = Notification::bulk_delete(counts(3, 0));
        let partial = Notification::bulk_delete(counts(2, 1));
        let all_failed = Notification::bulk_delete(counts(0, 3));

        assert_eq!(all_ok.kind, NotificationKind::Success);
        assert_eq!(all_ok.message, "Deleted 3 certificates");

        assert_eq!(partial.kind, NotificationKind::Partial);
        assert_eq!(partial.message, "Deleted 2 certificates, 1 failed");
        assert_eq!(partial.counts, Some(counts(2, 1)));

        assert_eq!(all_failed.kind, NotificationKind::Failure);
        assert_eq!(all_failed.message, "Failed to delete all 3 certificates");

        assert_ne!(partial.message, all_failed.message);
        assert_ne!(partial.message, all_ok.message);
    }

    #[test]
    fn test_singular_wording() {
        assert_eq!(
            Notification::bulk_delete(counts(1, 0)).message,
            "Deleted 1 certificate"
        );
        assert_eq!(
            Notification::status_updated(1, CertificateStatus::InProgress).message,
            "Updated 1 certificate to In progress"
        );
    }

    #[test]
    fn test_export_wording_mentions_archive_only_when_bundled() {
        let bundled = Notification::export(ExportSummary { successful: 6, failed: 0 }, true);
        assert_eq!(bundled.message, "Exported 6 certificates as a ZIP archive");

        let single = Notification::export(ExportSummary { successful: 2, failed: 0 }, false);
        assert_eq!(single.message, "Exported 2 certificates");

        let partial = Notification::export(ExportSummary { successful: 4, failed: 2 }, true);
        assert_eq!(partial.kind, NotificationKind::Partial);
        assert_eq!(partial.message, "Exported 4 certificates, 2 failed");
    }

    #[test]
    fn test_export_with_nothing_produced_is_a_failure() {
        let empty = Notification::export(ExportSummary { successful: 0, failed: 0 }, false);
        assert_eq!(empty.kind, NotificationKind::Failure);
        assert_eq!(empty.message, EXPORT_FALLBACK);
        assert_eq!(empty.counts, Some(counts(0, 0)));
    }

    #[test]
    fn test_from_error_falls_back_to_generic_message() {
        let with_text = StoreError::Rejected(Some("Certificate is locked".into()));
        assert_eq!(
            Notification::from_error(&with_text, DELETE_FALLBACK).message,
            "Certificate is locked"
        );

        let without = StoreError::Network("connection reset".into());
        assert_eq!(
            Notification::from_error(&without, DELETE_FALLBACK).message,
            DELETE_FALLBACK
        );
    }

    #[test]
    fn test_bulk_result_counts() {
        let result = BulkMutationResult {
            results: vec![
                MutationResult::from_outcome(CertificateId::new("A"), Ok(())),
                MutationResult::from_outcome(
                    CertificateId::new("B"),
                    Err(StoreError::Rejected(None)),
                ),
            ],
        };
        assert_eq!(result.counts(), counts(1, 1));
        assert_eq!(result.failures().count(), 1);
    }
}
