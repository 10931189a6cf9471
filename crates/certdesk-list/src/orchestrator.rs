//! Mutating commands.
//!
//! Each operation class recovers its own way: deletes are optimistic and
//! always resync page 1, status changes wait for the store and resync on
//! success, link updates patch the one field in place, and exports leave
//! the collection alone.

use std::slice;

use futures_util::future::join_all;
use tracing::{info, warn};

use certdesk_core::{CertificateId, CertificateStatus, CustomerId};

use crate::busy::Activity;
use crate::controller::{ExportProgress, ListController};
use crate::notification::{
    BulkMutationResult, MutationResult, Notification, DELETE_FALLBACK, EXPORT_FALLBACK,
    LINK_FALLBACK, STATUS_FALLBACK,
};

impl ListController {
    // Single delete

    /// Ask to delete `id`; nothing happens until `confirm_delete`.
    pub fn request_delete(&self, id: impl Into<CertificateId>) {
        self.write().pending_delete = Some(id.into());
    }

    pub fn cancel_delete(&self) {
        self.write().pending_delete = None;
    }

    /// Delete the certificate awaiting confirmation.
    ///
    /// The certificate leaves the collection before the store is called.
    /// Page 1 is re-fetched afterwards whatever the outcome. Returns `None`
    /// when nothing was pending.
    pub async fn confirm_delete(&self) -> Option<Notification> {
        let (id, owner, _busy) = {
            let mut state = self.write();
            let id = state.pending_delete.take()?;
            state.collection.remove(slice::from_ref(&id));
            state.selection.remove(slice::from_ref(&id));
            state.action_target = None;
            let owner = state.owner.clone();
            let busy = self.begin(&mut state, Activity::Deleting);
            (id, owner, busy)
        };

        info!(id = %id, owner = %owner, "Deleting certificate");
        let outcome = self.store.soft_delete(&id, &owner).await;
        self.resync().await;

        let notification = match outcome {
            Ok(()) => Notification::success(format!("Certificate {} deleted", id)),
            Err(e) => {
                warn!(id = %id, error = %e, "Failed to delete certificate");
                Notification::from_error(&e, DELETE_FALLBACK)
            }
        };
        self.announce(&notification);
        Some(notification)
    }

    // Bulk delete

    /// Ask to delete the whole selection. Returns false when there is
    /// nothing selected.
    pub fn request_bulk_delete(&self) -> bool {
        let mut state = self.write();
        if !state.selection.is_bulk_mode() || state.selection.is_empty() {
            return false;
        }
        state.confirming_bulk_delete = true;
        true
    }

    pub fn cancel_bulk_delete(&self) {
        self.write().confirming_bulk_delete = false;
    }

    /// Delete every selected certificate.
    ///
    /// All of them leave the collection at once, then one delete per id is
    /// issued concurrently and every outcome is awaited. Page 1 is
    /// re-fetched and bulk mode ends whatever the outcome.
    pub async fn confirm_bulk_delete(&self) -> Option<Notification> {
        let (ids, owner, _busy) = {
            let mut state = self.write();
            if !state.confirming_bulk_delete {
                return None;
            }
            state.confirming_bulk_delete = false;
            let ids = state.selection.ids();
            if ids.is_empty() {
                return None;
            }
            state.collection.remove(&ids);
            state.action_target = None;
            let owner = state.owner.clone();
            let busy = self.begin(&mut state, Activity::BulkDeleting);
            (ids, owner, busy)
        };

        info!(count = ids.len(), owner = %owner, "Deleting certificates");
        let outcomes = join_all(ids.iter().map(|id| self.store.soft_delete(id, &owner))).await;
        let result = BulkMutationResult {
            results: ids
                .into_iter()
                .zip(outcomes)
                .map(|(id, outcome)| MutationResult::from_outcome(id, outcome))
                .collect(),
        };

        for failure in result.failures() {
            warn!(
                id = %failure.id,
                error = failure.error_message.as_deref().unwrap_or_default(),
                "Failed to delete certificate"
            );
        }

        self.resync().await;
        self.write().selection.exit();

        let notification = Notification::bulk_delete(result.counts());
        self.announce(&notification);
        Some(notification)
    }

    // Bulk status

    /// Move every selected certificate to `status`.
    ///
    /// Not optimistic: the collection only changes through the page-1
    /// re-fetch after the store accepts. On failure the selection and bulk
    /// mode are kept so the user can retry. Returns `None` when no selected
    /// certificate is loaded.
    pub async fn bulk_set_status(&self, status: CertificateStatus) -> Option<Notification> {
        let (ids, owner, _busy) = {
            let mut state = self.write();
            let ids: Vec<CertificateId> = state
                .selection
                .ids()
                .into_iter()
                .filter(|id| state.collection.get(id).is_some())
                .collect();
            if ids.is_empty() {
                return None;
            }
            let owner = state.owner.clone();
            let busy = self.begin(&mut state, Activity::UpdatingStatus);
            (ids, owner, busy)
        };

        info!(count = ids.len(), status = %status.as_str(), "Updating certificate status");
        let notification = match self.store.update_status(&ids, &owner, status).await {
            Ok(()) => {
                self.resync().await;
                self.write().selection.exit();
                Notification::status_updated(ids.len(), status)
            }
            Err(e) => {
                warn!(count = ids.len(), error = %e, "Failed to update certificate status");
                Notification::from_error(&e, STATUS_FALLBACK)
            }
        };
        self.announce(&notification);
        Some(notification)
    }

    // Customer link

    /// Link `id` to `customer`, or unlink it with `None`.
    ///
    /// Only the linked customer of the loaded certificate changes, and only
    /// after the store accepts. Nothing is re-fetched.
    pub async fn link_entity(
        &self,
        id: impl Into<CertificateId>,
        customer: Option<CustomerId>,
    ) -> Option<Notification> {
        let id = id.into();
        let _busy = self.busy(Activity::Linking);

        let notification = match self.store.update_link(&id, customer.as_ref()).await {
            Ok(()) => {
                let mut state = self.write();
                if let Some(certificate) = state.collection.get_mut(&id) {
                    certificate.customer_id = customer.clone();
                }
                drop(state);

                let action = if customer.is_some() {
                    "linked to"
                } else {
                    "unlinked from"
                };
                Notification::success(format!("Certificate {} {} customer", id, action))
            }
            Err(e) => {
                warn!(id = %id, error = %e, "Failed to update customer link");
                Notification::from_error(&e, LINK_FALLBACK)
            }
        };
        self.announce(&notification);
        Some(notification)
    }

    // Export

    /// Export every selected certificate.
    ///
    /// Whether the output is bundled is decided before the call, and the
    /// same decision shapes the completion message. Bulk mode ends
    /// whatever the outcome.
    pub async fn bulk_export(&self) -> Option<Notification> {
        let (ids, owner, progress, _busy) = {
            let mut state = self.write();
            let ids = state.selection.ids();
            if ids.is_empty() {
                return None;
            }
            let progress = ExportProgress {
                count: ids.len(),
                bundled: ids.len() >= self.config.bulk_export_threshold,
            };
            state.export_progress = Some(progress);
            let owner = state.owner.clone();
            let busy = self.begin(&mut state, Activity::Exporting);
            (ids, owner, progress, busy)
        };

        info!(
            count = progress.count,
            bundled = progress.bundled,
            "Exporting certificates"
        );
        let outcome = self.exporter.export_batch(&ids, &owner).await;
        self.write().selection.exit();

        let notification = match outcome {
            Ok(summary) => Notification::export(summary, progress.bundled),
            Err(e) => {
                warn!(count = progress.count, error = %e, "Failed to export certificates");
                Notification::from_error(&e, EXPORT_FALLBACK)
            }
        };
        self.announce(&notification);
        Some(notification)
    }
}
