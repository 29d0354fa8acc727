//! Error types for calls against the OstrichDB backend.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure of a single remote call.
///
/// The backend has no structured error taxonomy: a rejection carries the
/// status and whatever message could be pulled out of the body.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "detail", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BackendError {
    /// The auth provider had no token to offer
    #[error("No authentication token available")]
    MissingToken,
    /// Request could not be completed
    #[error("Network error: {0}")]
    Network(String),
    /// Backend answered with a non-2xx status
    #[error("Request failed with status {status}: {message}")]
    Rejected { status: u16, message: String },
    /// Backend answered 2xx with a body we could not understand
    #[error("Unexpected response: {0}")]
    Decode(String),
}

impl BackendError {
    pub fn status(&self) -> Option<u16> {
        match self {
            BackendError::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }
}
