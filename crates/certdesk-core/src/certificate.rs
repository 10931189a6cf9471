//! Certificate records and fetched pages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{CertificateId, CertificateKind, CertificateStatus, CustomerId};

/// A certificate as listed for its owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Certificate {
    /// Certificate number.
    pub id: CertificateId,

    /// Kind of certificate.
    pub kind: CertificateKind,

    /// Current lifecycle status.
    pub status: CertificateStatus,

    /// Client the work was carried out for.
    #[serde(default)]
    pub client_name: Option<String>,

    /// Address of the installation.
    #[serde(default)]
    pub installation_address: Option<String>,

    /// Linked customer record.
    #[serde(default)]
    pub customer_id: Option<CustomerId>,

    /// Last modification time on the server.
    pub updated_at: DateTime<Utc>,

    /// Form data. Opaque to the list.
    #[serde(default)]
    pub payload: Value,
}

impl Certificate {
    /// Create a new draft certificate.
    pub fn new(id: impl Into<CertificateId>, kind: CertificateKind) -> Self {
        Self {
            id: id.into(),
            kind,
            status: CertificateStatus::Draft,
            client_name: None,
            installation_address: None,
            customer_id: None,
            updated_at: Utc::now(),
            payload: Value::Null,
        }
    }

    pub fn with_status(mut self, status: CertificateStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_client_name(mut self, name: impl Into<String>) -> Self {
        self.client_name = Some(name.into());
        self
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.installation_address = Some(address.into());
        self
    }

    pub fn with_updated_at(mut self, updated_at: DateTime<Utc>) -> Self {
        self.updated_at = updated_at;
        self
    }

    /// Client name, or empty when unset.
    pub fn display_name(&self) -> &str {
        self.client_name.as_deref().unwrap_or("")
    }
}

/// One page of certificates as returned by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub items: Vec<Certificate>,
    pub total_count: usize,
    pub has_more: bool,
    /// 1-based page index.
    pub page: u32,
}
