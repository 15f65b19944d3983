//! Errors surfaced by mutating lifecycle operations.

use thiserror::Error;

use crate::control_plane::ProviderError;

/// Errors returned by create, start, stop, and delete.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum ManagerError {
    /// Raised before any request is sent when a required field is missing.
    #[error("missing or empty field: {0}")]
    Validation(String),
    /// Raised when the control plane rejects or fails the request.
    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),
}

impl ManagerError {
    /// Returns the provider error when the failure came from the control plane.
    #[must_use]
    pub const fn provider(&self) -> Option<&ProviderError> {
        match self {
            Self::Provider(err) => Some(err),
            Self::Validation(_) => None,
        }
    }
}
