use std::sync::Arc;
use std::sync::Mutex;

use auth::PasswordHasher;
use auth::RouteRuleConfig;
use auth::WorkFactor;
use config::ConfigError;
use gateway_service::config::AccountConfig;
use gateway_service::config::Config;
use gateway_service::config::ConfigSource;
use gateway_service::config::JwtConfig;
use gateway_service::config::KeyConfig;
use gateway_service::config::PrincipalCacheConfig;
use gateway_service::config::ServerConfig;
use gateway_service::gateway::Gateway;
use gateway_service::inbound::http::router::create_router;

pub const SECRET: &str = "test-secret-key-for-jwt-signing-at-least-32-bytes";
pub const ALICE_PASSWORD: &str = "alice-password";
pub const ADMIN_PASSWORD: &str = "admin-password";

/// Config source tests can rewrite between reloads
pub struct TestConfigSource {
    config: Mutex<Result<Config, String>>,
}

impl TestConfigSource {
    pub fn set(&self, config: Config) {
        *self.config.lock().unwrap() = Ok(config);
    }

    pub fn fail(&self, reason: &str) {
        *self.config.lock().unwrap() = Err(reason.to_string());
    }

    pub fn current(&self) -> Config {
        self.config.lock().unwrap().clone().expect("config source is failing")
    }
}

impl ConfigSource for TestConfigSource {
    fn load(&self) -> Result<Config, ConfigError> {
        self.config
            .lock()
            .unwrap()
            .clone()
            .map_err(ConfigError::Message)
    }
}

/// Test application that spawns a real server
pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub api_client: reqwest::Client,
    pub config_source: Arc<TestConfigSource>,
}

impl TestApp {
    /// Spawn the application in a background task and return TestApp
    pub async fn spawn() -> Self {
        Self::spawn_with(test_config()).await
    }

    pub async fn spawn_with(config: Config) -> Self {
        // Use random port (0 = OS assigns)
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let config_source = Arc::new(TestConfigSource {
            config: Mutex::new(Ok(config.clone())),
        });

        let gateway = Arc::new(
            Gateway::build(&config, config_source.clone()).expect("Failed to build gateway"),
        );

        let router = create_router(gateway);

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server error");
        });

        Self {
            address,
            port,
            api_client: reqwest::Client::new(),
            config_source,
        }
    }

    /// Helper to make GET request
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(&format!("{}{}", self.address, path))
    }

    /// Helper to make POST request
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(&format!("{}{}", self.address, path))
    }

    /// Helper to make GET request with Bearer token
    pub fn get_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.get(path).bearer_auth(token)
    }

    /// Helper to make POST request with Bearer token
    pub fn post_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.post(path).bearer_auth(token)
    }

    /// Log in and return the issued token
    pub async fn login(&self, username: &str, password: &str) -> String {
        let response = self
            .post("/api/auth/login")
            .json(&serde_json::json!({
                "username": username,
                "password": password,
            }))
            .send()
            .await
            .expect("Failed to execute request");

        assert_eq!(response.status(), reqwest::StatusCode::OK);

        let body: serde_json::Value = response.json().await.expect("Failed to parse response");
        body["data"]["token"]
            .as_str()
            .expect("token missing")
            .to_string()
    }
}

pub fn fast_work_factor() -> WorkFactor {
    WorkFactor {
        memory_kib: 1024,
        iterations: 1,
        parallelism: 1,
    }
}

pub fn account(username: &str, password: &str, authorities: &[&str]) -> AccountConfig {
    let hasher = PasswordHasher::with_work_factor(fast_work_factor()).unwrap();

    AccountConfig {
        username: username.to_string(),
        display_name: username.to_uppercase(),
        password_hash: hasher.hash(password).unwrap().as_str().to_string(),
        authorities: authorities.iter().map(|a| a.to_string()).collect(),
    }
}

pub fn key(id: &str, secret: &str) -> KeyConfig {
    KeyConfig {
        id: id.to_string(),
        secret: secret.to_string(),
    }
}

pub fn test_config() -> Config {
    Config {
        server: ServerConfig { http_port: 0 },
        jwt: JwtConfig {
            current_key: key("test-1", SECRET),
            previous_keys: vec![],
            token_ttl_minutes: 60,
            key_fetch_timeout_ms: 1000,
        },
        password: fast_work_factor(),
        principal_cache: PrincipalCacheConfig {
            ttl_seconds: 60,
            lookup_timeout_ms: 2000,
        },
        routes: vec![
            RouteRuleConfig::new("/api/auth/**", false),
            RouteRuleConfig::new("/public/**", false),
        ],
        accounts: vec![
            account("alice", ALICE_PASSWORD, &["ROLE_USER"]),
            account("admin", ADMIN_PASSWORD, &["ROLE_USER", "ROLE_ADMIN"]),
        ],
    }
}
