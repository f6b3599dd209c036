use std::env;
use std::time::Duration;

use auth::KeyRingError;
use auth::KeySet;
use auth::PolicyError;
use auth::ResolverSettings;
use auth::RoutePolicy;
use auth::RouteRuleConfig;
use auth::SigningKey;
use auth::WorkFactor;
use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub jwt: JwtConfig,
    #[serde(default)]
    pub password: WorkFactor,
    #[serde(default)]
    pub principal_cache: PrincipalCacheConfig,
    #[serde(default)]
    pub routes: Vec<RouteRuleConfig>,
    #[serde(default)]
    pub accounts: Vec<AccountConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub http_port: u16,
}

#[derive(Deserialize, Clone)]
pub struct KeyConfig {
    pub id: String,
    pub secret: String,
}

impl std::fmt::Debug for KeyConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyConfig")
            .field("id", &self.id)
            .field("secret", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtConfig {
    pub current_key: KeyConfig,
    #[serde(default)]
    pub previous_keys: Vec<KeyConfig>,
    pub token_ttl_minutes: i64,
    #[serde(default = "default_key_fetch_timeout_ms")]
    pub key_fetch_timeout_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PrincipalCacheConfig {
    pub ttl_seconds: u64,
    pub lookup_timeout_ms: u64,
}

impl Default for PrincipalCacheConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: 60,
            lookup_timeout_ms: 2000,
        }
    }
}

/// Seed account for the in-memory account store.
#[derive(Debug, Deserialize, Clone)]
pub struct AccountConfig {
    pub username: String,
    pub display_name: String,
    /// PHC string (`$argon2id$v=19$...`)
    pub password_hash: String,
    #[serde(default)]
    pub authorities: Vec<String>,
}

fn default_key_fetch_timeout_ms() -> u64 {
    1000
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (GATEWAY_SERVER__HTTP_PORT, GATEWAY_JWT__CURRENT_KEY__SECRET, etc.)
    /// 2. Environment-specific config file (config/{environment}.toml)
    /// 3. Default config file (config/default.toml)
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        Self::load_layered(&run_mode, environment())
    }

    fn load_layered(run_mode: &str, environment: Environment) -> Result<Self, ConfigError> {
        let configuration = ConfigBuilder::builder()
            // Start with default configuration
            .add_source(File::with_name("config/default").required(false))
            // Layer on environment-specific configuration
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Layer on environment variables
            .add_source(environment)
            .build()?;

        let config: Config = configuration.try_deserialize()?;

        Ok(config)
    }

    /// Build the signing key set from the configured keys.
    ///
    /// # Errors
    /// * `EmptyKeyId` / `DuplicateKeyId` - Key ids are missing or repeated
    /// * `WeakSecret` - A secret is shorter than the minimum length
    pub fn key_set(&self) -> Result<KeySet, KeyRingError> {
        let current = signing_key(&self.jwt.current_key)?;
        let previous = self
            .jwt
            .previous_keys
            .iter()
            .map(signing_key)
            .collect::<Result<Vec<_>, _>>()?;

        KeySet::new(current, previous)
    }

    /// Build the route policy from the configured rules.
    ///
    /// # Errors
    /// * `PolicyError` - Rules are empty, malformed, contradictory or unreachable
    pub fn route_policy(&self) -> Result<RoutePolicy, PolicyError> {
        RoutePolicy::load(&self.routes)
    }

    pub fn resolver_settings(&self) -> ResolverSettings {
        ResolverSettings {
            cache_ttl: Duration::from_secs(self.principal_cache.ttl_seconds),
            lookup_timeout: Duration::from_millis(self.principal_cache.lookup_timeout_ms),
        }
    }

    /// Lifetime of issued tokens, `None` unless it is at least one minute
    /// and representable.
    pub fn token_ttl(&self) -> Option<chrono::Duration> {
        chrono::Duration::try_minutes(self.jwt.token_ttl_minutes)
            .filter(|ttl| *ttl >= chrono::Duration::minutes(1))
    }

    pub fn key_fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.jwt.key_fetch_timeout_ms)
    }
}

/// `GATEWAY_` prefix, `__` between nested keys.
///
/// Example: GATEWAY_JWT__CURRENT_KEY__SECRET=... overrides jwt.current_key.secret
fn environment() -> Environment {
    Environment::with_prefix("GATEWAY")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

fn signing_key(key: &KeyConfig) -> Result<SigningKey, KeyRingError> {
    SigningKey::new(key.id.clone(), key.secret.as_bytes())
}

/// Where configuration comes from, at start-up and on reload.
pub trait ConfigSource: Send + Sync + 'static {
    fn load(&self) -> Result<Config, ConfigError>;
}

/// Layered files plus environment, see [`Config::load`].
#[derive(Debug, Default, Clone, Copy)]
pub struct LayeredConfigSource;

impl ConfigSource for LayeredConfigSource {
    fn load(&self) -> Result<Config, ConfigError> {
        Config::load()
    }
}
