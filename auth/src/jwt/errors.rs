use std::time::Duration;

use thiserror::Error;

/// Reasons a token fails verification.
///
/// The variant is meant for logs; clients only ever learn that the token was
/// invalid.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerificationError {
    #[error("Malformed token: {0}")]
    MalformedToken(String),

    #[error("Unsupported token algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("Token signature does not match any active key")]
    BadSignature,

    #[error("Token is expired")]
    Expired,
}

/// Error type for token signing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignError {
    #[error("Token subject must not be empty")]
    EmptySubject,

    #[error("Token lifetime must be at least one second")]
    InvalidTtl,

    #[error("Failed to encode token: {0}")]
    EncodingFailed(String),
}

/// Error type for signing key management.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyRingError {
    #[error("Signing key id must not be empty")]
    EmptyKeyId,

    #[error("Duplicate signing key id: {0}")]
    DuplicateKeyId(String),

    #[error("Signing key {id} is too short: {actual} bytes, minimum {min}")]
    WeakSecret { id: String, actual: usize, min: usize },

    #[error("Key provider did not answer within {0:?}")]
    Timeout(Duration),

    #[error("Key provider failed: {0}")]
    Provider(String),
}
