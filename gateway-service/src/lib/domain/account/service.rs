use std::sync::Arc;

use async_trait::async_trait;
use auth::Authenticator;

use crate::account::errors::AccountError;
use crate::account::models::LoginResult;
use crate::account::models::Username;
use crate::account::ports::AccountRepository;
use crate::account::ports::AccountServicePort;

/// Domain service implementation for account operations.
pub struct AccountService<AR>
where
    AR: AccountRepository,
{
    repository: Arc<AR>,
    authenticator: Arc<Authenticator>,
    token_ttl: chrono::Duration,
}

impl<AR> AccountService<AR>
where
    AR: AccountRepository,
{
    /// Create a new account service with injected dependencies.
    ///
    /// # Arguments
    /// * `repository` - Account lookup implementation
    /// * `authenticator` - Password verification and token issuance
    /// * `token_ttl` - Lifetime of issued tokens
    pub fn new(
        repository: Arc<AR>,
        authenticator: Arc<Authenticator>,
        token_ttl: chrono::Duration,
    ) -> Self {
        Self {
            repository,
            authenticator,
            token_ttl,
        }
    }
}

#[async_trait]
impl<AR> AccountServicePort for AccountService<AR>
where
    AR: AccountRepository,
{
    async fn login(
        &self,
        username: &Username,
        password: &str,
    ) -> Result<LoginResult, AccountError> {
        let account = self.repository.find_by_username(username).await?;

        // Unknown accounts still pay for a password verification
        let result = self.authenticator.authenticate(
            password,
            account.as_ref().map(|account| &account.password_hash),
            username.as_str(),
            self.token_ttl,
        );

        let (result, account) = match (result, account) {
            (Ok(result), Some(account)) => (result, account),
            (Err(e), _) => {
                tracing::info!(username = %username, error = %e, "Login failed");
                return Err(e.into());
            }
            (Ok(_), None) => return Err(AccountError::InvalidCredentials),
        };

        tracing::info!(username = %username, expires_at = %result.expires_at, "Login succeeded");

        Ok(LoginResult {
            token: result.access_token,
            expires_at: result.expires_at,
            principal: account.principal(),
        })
    }
}
