//! Stateless bearer-token authentication library
//!
//! Provides the building blocks of a per-request authentication pipeline:
//! - Password hashing (Argon2id)
//! - Signed token issuance and verification with key rotation (HS256)
//! - Route classification into open and protected paths
//! - Subject to principal resolution with a TTL cache
//! - The pipeline tying them together into one outcome per request
//!
//! Services supply their own principal store and map `AuthOutcome` onto
//! their transport.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let record = hasher.hash("my_password").unwrap();
//! assert!(hasher.verify("my_password", &record));
//! assert!(!hasher.verify("wrong_password", &record));
//! ```
//!
//! ## Tokens
//! ```
//! use std::sync::Arc;
//! use auth::{KeyRing, KeySet, SigningKey, TokenCodec};
//!
//! let key = SigningKey::new("k1", b"secret_key_at_least_32_bytes_long!").unwrap();
//! let ring = Arc::new(KeyRing::new(KeySet::new(key, vec![]).unwrap()));
//! let codec = TokenCodec::new(ring);
//!
//! let token = codec.sign("alice", chrono::Duration::minutes(15)).unwrap();
//! assert_eq!(codec.verify(&token).unwrap().subject, "alice");
//! ```
//!
//! ## Route Policy
//! ```
//! use auth::{Access, RoutePolicy, RouteRuleConfig};
//!
//! let policy = RoutePolicy::load(&[
//!     RouteRuleConfig::new("/api/auth/**", false),
//!     RouteRuleConfig::new("/public/**", false),
//! ])
//! .unwrap();
//!
//! assert_eq!(policy.classify("/api/auth/login"), Access::Open);
//! assert_eq!(policy.classify("/api/v1/products/1"), Access::Protected);
//! ```

pub mod authenticator;
pub mod clock;
pub mod jwt;
pub mod password;
pub mod pipeline;
pub mod policy;
pub mod principal;

// Re-export commonly used items
pub use authenticator::AuthenticationError;
pub use authenticator::AuthenticationResult;
pub use authenticator::Authenticator;
pub use clock::Clock;
pub use clock::ManualClock;
pub use clock::SystemClock;
pub use jwt::IssuedToken;
pub use jwt::KeyProvider;
pub use jwt::KeyRing;
pub use jwt::KeyRingError;
pub use jwt::KeySet;
pub use jwt::SignError;
pub use jwt::SigningKey;
pub use jwt::StaticKeyProvider;
pub use jwt::Token;
pub use jwt::TokenCodec;
pub use jwt::VerificationError;
pub use password::PasswordError;
pub use password::PasswordHasher;
pub use password::PasswordRecord;
pub use password::WorkFactor;
pub use pipeline::extract_bearer;
pub use pipeline::AuthOutcome;
pub use pipeline::AuthPipeline;
pub use pipeline::RejectReason;
pub use pipeline::RequestDescriptor;
pub use policy::Access;
pub use policy::PolicyError;
pub use policy::PolicyHandle;
pub use policy::RoutePolicy;
pub use policy::RouteRuleConfig;
pub use principal::InMemoryPrincipalStore;
pub use principal::Principal;
pub use principal::PrincipalResolver;
pub use principal::PrincipalStore;
pub use principal::PrincipalStoreError;
pub use principal::ResolveError;
pub use principal::ResolverSettings;
