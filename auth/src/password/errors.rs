use thiserror::Error;

/// Error type for password operations.
///
/// Verification never produces an error; a failed or impossible check is
/// simply `false`.
#[derive(Debug, Clone, Error)]
pub enum PasswordError {
    #[error("Password hashing failed: {0}")]
    HashingFailed(String),

    #[error("Invalid work factor: {0}")]
    InvalidWorkFactor(String),
}
