//! Certificate store clients for certdesk.
//!
//! Defines the store seam the list controller talks to, plus an HTTP
//! implementation for the REST API and an in-memory one for tests and demos.

pub mod error;
pub mod http;
pub mod memory;
pub mod store;

pub use error::StoreError;
pub use http::{HttpStore, HttpStoreConfig};
pub use memory::MemoryStore;
pub use store::{CertificateExporter, CertificateStore, ExportSummary};
