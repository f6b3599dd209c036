use std::time::Duration;

use thiserror::Error;

/// Error reported by a principal store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PrincipalStoreError {
    #[error("Principal store unavailable: {0}")]
    Unavailable(String),
}

/// Error type for principal resolution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("No principal for subject")]
    NotFound,

    #[error("Principal lookup timed out after {0:?}")]
    Timeout(Duration),

    #[error("Principal lookup failed: {0}")]
    Store(#[from] PrincipalStoreError),
}
