//! Core domain errors.

use thiserror::Error;

/// Core domain errors for certdesk.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Invalid input, e.g. an unrecognised status name.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
