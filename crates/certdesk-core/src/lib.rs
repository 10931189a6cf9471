//! certdesk core domain types
//!
//! Pure data types shared by the store client and the list controller.
//! Nothing here touches the network or an async runtime.

pub mod certificate;
pub mod criteria;
pub mod error;
pub mod ids;
pub mod status;

pub use certificate::{Certificate, Page};
pub use criteria::{Filter, SortKey, ViewCriteria};
pub use error::CoreError;
pub use ids::{CertificateId, CustomerId, OwnerId};
pub use status::{CertificateKind, CertificateStatus};
