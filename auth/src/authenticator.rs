use std::sync::Arc;

use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;

use crate::jwt::SignError;
use crate::jwt::TokenCodec;
use crate::password::PasswordError;
use crate::password::PasswordHasher;
use crate::password::PasswordRecord;

const DUMMY_PASSWORD: &str = "dummy-password-for-unknown-accounts";

/// Authentication coordinator combining password verification and token issuance.
///
/// Unknown accounts are verified against a dummy record, so a failed login
/// costs the same whether or not the account exists.
pub struct Authenticator {
    password_hasher: PasswordHasher,
    codec: Arc<TokenCodec>,
    dummy_record: PasswordRecord,
}

/// Result of successful authentication.
#[derive(Debug, Clone)]
pub struct AuthenticationResult {
    /// Signed bearer token
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
}

/// Authentication operation errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthenticationError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Password error: {0}")]
    PasswordError(#[from] PasswordError),

    #[error("Token error: {0}")]
    TokenError(#[from] SignError),
}

impl Authenticator {
    /// Create a new authenticator.
    ///
    /// # Arguments
    /// * `password_hasher` - Hasher used for stored credentials
    /// * `codec` - Codec tokens are signed with
    ///
    /// # Errors
    /// * `PasswordError` - Dummy record could not be hashed
    pub fn new(
        password_hasher: PasswordHasher,
        codec: Arc<TokenCodec>,
    ) -> Result<Self, PasswordError> {
        let dummy_record = password_hasher.hash(DUMMY_PASSWORD)?;

        Ok(Self {
            password_hasher,
            codec,
            dummy_record,
        })
    }

    pub fn password_hasher(&self) -> &PasswordHasher {
        &self.password_hasher
    }

    /// Hash a password for storage.
    ///
    /// # Errors
    /// * `PasswordError` - Hashing operation failed
    pub fn hash_password(&self, password: &str) -> Result<PasswordRecord, PasswordError> {
        self.password_hasher.hash(password)
    }

    /// Verify credentials and issue a token.
    ///
    /// # Arguments
    /// * `password` - Plaintext password to verify
    /// * `record` - Stored record, `None` when the account does not exist
    /// * `subject` - Token subject on success
    /// * `ttl` - Token lifetime
    ///
    /// # Returns
    /// AuthenticationResult with access token and its expiry
    ///
    /// # Errors
    /// * `InvalidCredentials` - Unknown account or wrong password
    /// * `TokenError` - Token generation failed
    pub fn authenticate(
        &self,
        password: &str,
        record: Option<&PasswordRecord>,
        subject: &str,
        ttl: Duration,
    ) -> Result<AuthenticationResult, AuthenticationError> {
        let is_valid = match record {
            Some(record) => self.password_hasher.verify(password, record),
            None => {
                self.password_hasher.verify(password, &self.dummy_record);
                false
            }
        };

        if !is_valid {
            return Err(AuthenticationError::InvalidCredentials);
        }

        if record.is_some_and(|record| self.password_hasher.needs_rehash(record)) {
            tracing::info!(subject, "Stored password uses a weaker work factor");
        }

        let issued = self.codec.issue(subject, ttl)?;

        Ok(AuthenticationResult {
            access_token: issued.value,
            expires_at: issued.token.expires_at,
        })
    }
}
