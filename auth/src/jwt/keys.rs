use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use async_trait::async_trait;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;

use super::errors::KeyRingError;

/// HS256 secrets shorter than the hash output are rejected.
pub const MIN_SECRET_LEN: usize = 32;

/// Default number of retired keys kept for verification after a rotation.
pub const DEFAULT_MAX_PREVIOUS: usize = 2;

/// Named HMAC signing key.
#[derive(Clone)]
pub struct SigningKey {
    id: String,
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl SigningKey {
    /// Create a signing key from a shared secret.
    ///
    /// # Errors
    /// * `EmptyKeyId` - Id is empty
    /// * `WeakSecret` - Secret is shorter than 32 bytes
    pub fn new(id: impl Into<String>, secret: &[u8]) -> Result<Self, KeyRingError> {
        let id = id.into();

        if id.is_empty() {
            return Err(KeyRingError::EmptyKeyId);
        }

        if secret.len() < MIN_SECRET_LEN {
            return Err(KeyRingError::WeakSecret {
                id,
                actual: secret.len(),
                min: MIN_SECRET_LEN,
            });
        }

        Ok(Self {
            id,
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub(crate) fn encoding_key(&self) -> &EncodingKey {
        &self.encoding
    }

    pub(crate) fn decoding_key(&self) -> &DecodingKey {
        &self.decoding
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningKey")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

/// The keys accepted at one point in time.
///
/// Signing uses only `current`; verification tries `current` then each
/// previous key in order.
#[derive(Debug, Clone)]
pub struct KeySet {
    current: SigningKey,
    previous: Vec<SigningKey>,
}

impl KeySet {
    /// # Errors
    /// * `DuplicateKeyId` - Two keys share an id
    pub fn new(current: SigningKey, previous: Vec<SigningKey>) -> Result<Self, KeyRingError> {
        let set = Self { current, previous };

        let mut seen = std::collections::HashSet::new();
        for key in set.iter() {
            if !seen.insert(key.id()) {
                return Err(KeyRingError::DuplicateKeyId(key.id().to_string()));
            }
        }

        Ok(set)
    }

    pub fn current(&self) -> &SigningKey {
        &self.current
    }

    pub fn previous(&self) -> &[SigningKey] {
        &self.previous
    }

    /// All keys in verification order.
    pub fn iter(&self) -> impl Iterator<Item = &SigningKey> {
        std::iter::once(&self.current).chain(self.previous.iter())
    }

    /// Key set with `key` promoted to current and the old current demoted.
    fn rotated(&self, key: SigningKey, max_previous: usize) -> Result<Self, KeyRingError> {
        let mut previous = Vec::with_capacity(max_previous);
        previous.push(self.current.clone());
        previous.extend(self.previous.iter().cloned());
        previous.truncate(max_previous);

        Self::new(key, previous)
    }
}

/// Source of signing keys, e.g. a secrets manager.
#[async_trait]
pub trait KeyProvider: Send + Sync + 'static {
    /// Fetch the key set that should be active.
    ///
    /// # Errors
    /// * `Provider` - Keys could not be fetched
    async fn fetch(&self) -> Result<KeySet, KeyRingError>;
}

/// Key provider serving a fixed key set.
pub struct StaticKeyProvider {
    keys: KeySet,
}

impl StaticKeyProvider {
    pub fn new(keys: KeySet) -> Self {
        Self { keys }
    }
}

#[async_trait]
impl KeyProvider for StaticKeyProvider {
    async fn fetch(&self) -> Result<KeySet, KeyRingError> {
        Ok(self.keys.clone())
    }
}

/// Shared, atomically replaceable key set.
///
/// Readers take a snapshot per verification; rotation publishes a whole new
/// `KeySet`, so no reader ever sees a half-updated set.
pub struct KeyRing {
    keys: ArcSwap<KeySet>,
    max_previous: usize,
}

impl KeyRing {
    pub fn new(keys: KeySet) -> Self {
        Self {
            keys: ArcSwap::from_pointee(keys),
            max_previous: DEFAULT_MAX_PREVIOUS,
        }
    }

    /// Set how many retired keys survive a rotation.
    pub fn with_max_previous(mut self, max_previous: usize) -> Self {
        self.max_previous = max_previous;
        self
    }

    /// Current key set snapshot.
    pub fn snapshot(&self) -> Arc<KeySet> {
        self.keys.load_full()
    }

    /// Replace the whole key set.
    pub fn replace(&self, keys: KeySet) {
        tracing::info!(current_key = %keys.current().id(), "Signing keys replaced");
        self.keys.store(Arc::new(keys));
    }

    /// Promote `key` to current; the old current key keeps verifying.
    ///
    /// # Errors
    /// * `DuplicateKeyId` - `key` reuses the id of an active key
    pub fn rotate(&self, key: SigningKey) -> Result<(), KeyRingError> {
        let key_id = key.id().to_string();
        let mut outcome = Ok(());

        self.keys.rcu(|keys| match keys.rotated(key.clone(), self.max_previous) {
            Ok(rotated) => {
                outcome = Ok(());
                Arc::new(rotated)
            }
            Err(e) => {
                outcome = Err(e);
                Arc::clone(keys)
            }
        });

        if outcome.is_ok() {
            tracing::info!(current_key = %key_id, "Signing key rotated");
        }

        outcome
    }

    /// Fetch keys from a provider and swap them in.
    ///
    /// On any error the active key set is left untouched.
    pub async fn refresh(
        &self,
        provider: &dyn KeyProvider,
        timeout: Duration,
    ) -> Result<(), KeyRingError> {
        let keys = fetch_with_timeout(provider, timeout).await?;
        self.replace(keys);
        Ok(())
    }
}

async fn fetch_with_timeout(
    provider: &dyn KeyProvider,
    timeout: Duration,
) -> Result<KeySet, KeyRingError> {
    match tokio::time::timeout(timeout, provider.fetch()).await {
        Ok(result) => result,
        Err(_) => {
            tracing::error!(timeout_ms = timeout.as_millis() as u64, "Key provider timed out");
            Err(KeyRingError::Timeout(timeout))
        }
    }
}
