use std::sync::Arc;

use auth::AuthPipeline;
use auth::Authenticator;
use auth::KeyRing;
use auth::KeyRingError;
use auth::PasswordError;
use auth::PasswordHasher;
use auth::PolicyError;
use auth::PolicyHandle;
use auth::PrincipalResolver;
use auth::StaticKeyProvider;
use auth::TokenCodec;
use config::ConfigError;
use thiserror::Error;

use crate::account::errors::UsernameError;
use crate::account::models::Account;
use crate::account::service::AccountService;
use crate::config::Config;
use crate::config::ConfigSource;
use crate::repositories::InMemoryAccountRepository;

pub type GatewayPipeline = AuthPipeline<InMemoryAccountRepository>;
pub type GatewayAccountService = AccountService<InMemoryAccountRepository>;

/// Error building or reloading the gateway from configuration
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Route policy error: {0}")]
    Policy(#[from] PolicyError),

    #[error("Signing key error: {0}")]
    Keys(#[from] KeyRingError),

    #[error("Password hasher error: {0}")]
    Password(#[from] PasswordError),

    #[error("Invalid account: {0}")]
    Account(#[from] UsernameError),

    #[error("Token TTL must be at least one minute, got {0} minutes")]
    TokenTtl(i64),
}

/// Everything the HTTP layer needs, built from one configuration.
///
/// Route policy, signing keys and accounts can be reloaded at runtime.
/// Server port, work factor and cache settings only take effect on restart.
pub struct Gateway {
    pipeline: Arc<GatewayPipeline>,
    account_service: Arc<GatewayAccountService>,
    accounts: Arc<InMemoryAccountRepository>,
    config_source: Arc<dyn ConfigSource>,
}

impl Gateway {
    /// Assemble the gateway.
    ///
    /// # Arguments
    /// * `config` - Validated start-up configuration
    /// * `config_source` - Source consulted again on reload
    ///
    /// # Errors
    /// * `GatewayError` - Any part of the configuration is invalid
    pub fn build(config: &Config, config_source: Arc<dyn ConfigSource>) -> Result<Self, GatewayError> {
        let token_ttl = config
            .token_ttl()
            .ok_or(GatewayError::TokenTtl(config.jwt.token_ttl_minutes))?;
        let policy = Arc::new(PolicyHandle::new(config.route_policy()?));
        let key_ring = Arc::new(KeyRing::new(config.key_set()?));
        let codec = Arc::new(TokenCodec::new(key_ring));
        let accounts = Arc::new(InMemoryAccountRepository::new(seed_accounts(config)?));

        let resolver = Arc::new(PrincipalResolver::new(
            Arc::clone(&accounts),
            config.resolver_settings(),
        ));
        let pipeline = Arc::new(AuthPipeline::new(policy, Arc::clone(&codec), resolver));

        let hasher = PasswordHasher::with_work_factor(config.password)?;
        let authenticator = Arc::new(Authenticator::new(hasher, codec)?);
        let account_service = Arc::new(AccountService::new(
            Arc::clone(&accounts),
            authenticator,
            token_ttl,
        ));

        tracing::info!(
            routes = config.routes.len(),
            accounts = accounts.len(),
            previous_keys = config.jwt.previous_keys.len(),
            "Gateway assembled"
        );

        Ok(Self {
            pipeline,
            account_service,
            accounts,
            config_source,
        })
    }

    pub fn pipeline(&self) -> &Arc<GatewayPipeline> {
        &self.pipeline
    }

    pub fn account_service(&self) -> &Arc<GatewayAccountService> {
        &self.account_service
    }

    /// Re-read configuration and swap in the new route policy, keys and accounts.
    ///
    /// Everything is validated before anything is swapped, so a failed
    /// reload leaves the running state untouched. Cached principals are
    /// dropped afterwards.
    ///
    /// # Errors
    /// * `GatewayError` - Configuration could not be loaded or is invalid
    pub async fn reload(&self) -> Result<(), GatewayError> {
        let config = self.config_source.load()?;

        let policy = config.route_policy()?;
        let provider = StaticKeyProvider::new(config.key_set()?);
        let accounts = seed_accounts(&config)?;

        self.pipeline
            .codec()
            .key_ring()
            .refresh(&provider, config.key_fetch_timeout())
            .await?;
        self.pipeline.policy().replace(policy);
        self.accounts.replace_all(accounts);
        self.pipeline.resolver().clear();

        tracing::info!(routes = config.routes.len(), "Gateway configuration reloaded");

        Ok(())
    }
}

fn seed_accounts(config: &Config) -> Result<Vec<Account>, UsernameError> {
    config.accounts.iter().map(Account::try_from).collect()
}
