use async_trait::async_trait;

use super::errors::PrincipalStoreError;
use super::models::Principal;

/// Backing store for principals (user repository, directory service, ...).
#[async_trait]
pub trait PrincipalStore: Send + Sync + 'static {
    /// Look up the principal for a token subject.
    ///
    /// # Arguments
    /// * `subject` - Subject claim of a verified token
    ///
    /// # Returns
    /// Principal if the subject is known, None otherwise
    ///
    /// # Errors
    /// * `Unavailable` - Store could not be queried
    async fn find_principal(&self, subject: &str)
        -> Result<Option<Principal>, PrincipalStoreError>;
}
