//! Error types for the certificate store.

use thiserror::Error;

/// Errors returned by a certificate store.
///
/// The list controller treats every variant the same way: the operation
/// failed, and `remote_message` may carry something worth showing.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Could not reach the server, or the request timed out.
    #[error("network error: {0}")]
    Network(String),

    /// The session is missing, expired or not allowed to do this.
    #[error("not authorized: {0}")]
    Auth(String),

    /// The server answered with an error status.
    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// The server processed the request but reported it unsuccessful.
    #[error("rejected: {}", .0.as_deref().unwrap_or("no reason given"))]
    Rejected(Option<String>),

    /// Response body could not be decoded.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl StoreError {
    /// The message the server supplied, if any.
    pub fn remote_message(&self) -> Option<&str> {
        let message = match self {
            StoreError::Auth(message) => Some(message.as_str()),
            StoreError::Server { message, .. } => Some(message.as_str()),
            StoreError::Rejected(message) => message.as_deref(),
            StoreError::Network(_) | StoreError::Serialization(_) => None,
        };
        message.filter(|m| !m.trim().is_empty())
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            StoreError::Serialization(err.to_string())
        } else {
            StoreError::Network(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_message_prefers_server_text() {
        let err = StoreError::Rejected(Some("Certificate is locked".to_string()));
        assert_eq!(err.remote_message(), Some("Certificate is locked"));

        let err = StoreError::Server {
            status: 500,
            message: "database unavailable".to_string(),
        };
        assert_eq!(err.remote_message(), Some("database unavailable"));
    }

    #[test]
    fn test_remote_message_absent_for_transport_errors() {
        assert_eq!(StoreError::Network("timed out".into()).remote_message(), None);
        assert_eq!(StoreError::Rejected(None).remote_message(), None);
        assert_eq!(StoreError::Rejected(Some("  ".into())).remote_message(), None);
    }
}
