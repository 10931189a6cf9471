//! Store traits consumed by the list controller.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use certdesk_core::{CertificateId, CertificateStatus, CustomerId, OwnerId, Page};

use crate::error::StoreError;

/// Remote source of truth for an owner's certificates.
///
/// Other writers may change the data between calls; implementations are
/// responsible for their own timeouts.
#[async_trait]
pub trait CertificateStore: Send + Sync {
    /// Fetch one page (1-based) of the owner's live certificates.
    async fn fetch_page(
        &self,
        owner: &OwnerId,
        page: u32,
        page_size: u32,
    ) -> Result<Page, StoreError>;

    /// Soft-delete a certificate. Deleting twice is not an error.
    async fn soft_delete(&self, id: &CertificateId, owner: &OwnerId) -> Result<(), StoreError>;

    /// Set the status of several certificates in one call.
    async fn update_status(
        &self,
        ids: &[CertificateId],
        owner: &OwnerId,
        status: CertificateStatus,
    ) -> Result<(), StoreError>;

    /// Link a certificate to a customer, or unlink it with `None`.
    async fn update_link(
        &self,
        id: &CertificateId,
        customer: Option<&CustomerId>,
    ) -> Result<(), StoreError>;
}

/// Aggregate result of a batch export.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportSummary {
    pub successful: usize,
    pub failed: usize,
}

/// Generates certificate documents for download.
///
/// Whether the output is bundled into an archive is the exporter's call.
#[async_trait]
pub trait CertificateExporter: Send + Sync {
    async fn export_batch(
        &self,
        ids: &[CertificateId],
        owner: &OwnerId,
    ) -> Result<ExportSummary, StoreError>;
}
