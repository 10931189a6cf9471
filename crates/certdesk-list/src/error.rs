//! List controller errors.

use certdesk_store::StoreError;
use thiserror::Error;

/// Errors from loading the certificate list.
///
/// Mutations never return these; they resolve into a `Notification`.
#[derive(Debug, Error)]
pub enum ListError {
    /// A page could not be fetched.
    #[error("failed to load page {page}: {source}")]
    Fetch {
        page: u32,
        #[source]
        source: StoreError,
    },
}
