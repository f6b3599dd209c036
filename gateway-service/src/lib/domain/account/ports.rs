use async_trait::async_trait;

use crate::account::errors::AccountError;
use crate::account::models::Account;
use crate::account::models::LoginResult;
use crate::account::models::Username;

/// Port for account domain service operations.
#[async_trait]
pub trait AccountServicePort: Send + Sync + 'static {
    /// Verify credentials and issue a bearer token.
    ///
    /// # Arguments
    /// * `username` - Login name
    /// * `password` - Plaintext password
    ///
    /// # Returns
    /// Token, its expiry and the principal it identifies
    ///
    /// # Errors
    /// * `InvalidCredentials` - Unknown username or wrong password
    /// * `TokenIssuance` - Token could not be signed
    /// * `RepositoryError` - Account lookup failed
    async fn login(&self, username: &Username, password: &str)
        -> Result<LoginResult, AccountError>;
}

/// Read access to stored accounts.
#[async_trait]
pub trait AccountRepository: Send + Sync + 'static {
    /// Retrieve account by username.
    ///
    /// # Arguments
    /// * `username` - Username to search for
    ///
    /// # Returns
    /// Optional account (None if not found)
    ///
    /// # Errors
    /// * `RepositoryError` - Storage operation failed
    async fn find_by_username(&self, username: &Username) -> Result<Option<Account>, AccountError>;
}
