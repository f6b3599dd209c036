use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::time::Instant;

use super::errors::ResolveError;
use super::models::Principal;
use super::ports::PrincipalStore;

/// Principal resolver tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolverSettings {
    /// How long a resolved principal may be served from cache; zero disables caching
    pub cache_ttl: Duration,
    /// Upper bound for one store lookup
    pub lookup_timeout: Duration,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            cache_ttl: Duration::from_secs(60),
            lookup_timeout: Duration::from_secs(2),
        }
    }
}

#[derive(Debug, Clone)]
struct CachedPrincipal {
    principal: Principal,
    fetched_at: Instant,
    generation: u64,
}

/// Maps token subjects to principals through a store, with a TTL cache.
///
/// Only successful lookups are cached; unknown subjects and store failures
/// always go back to the store on the next request. Entries written by a
/// lookup that started before the last `clear` are never served.
pub struct PrincipalResolver<S>
where
    S: PrincipalStore,
{
    store: Arc<S>,
    cache: DashMap<String, CachedPrincipal>,
    generation: AtomicU64,
    settings: ResolverSettings,
}

impl<S> PrincipalResolver<S>
where
    S: PrincipalStore,
{
    pub fn new(store: Arc<S>, settings: ResolverSettings) -> Self {
        Self {
            store,
            cache: DashMap::new(),
            generation: AtomicU64::new(0),
            settings,
        }
    }

    pub fn settings(&self) -> ResolverSettings {
        self.settings
    }

    /// Resolve a subject to its principal.
    ///
    /// # Errors
    /// * `NotFound` - Store does not know the subject
    /// * `Timeout` - Store did not answer within the lookup timeout
    /// * `Store` - Store failed
    pub async fn resolve(&self, subject: &str) -> Result<Principal, ResolveError> {
        if let Some(principal) = self.cached(subject) {
            tracing::trace!(subject, "Principal served from cache");
            return Ok(principal);
        }

        let generation = self.generation.load(Ordering::Acquire);
        let lookup = self.store.find_principal(subject);
        let found = match tokio::time::timeout(self.settings.lookup_timeout, lookup).await {
            Ok(result) => result?,
            Err(_) => return Err(ResolveError::Timeout(self.settings.lookup_timeout)),
        };

        match found {
            Some(principal) => {
                if self.caching_enabled() {
                    self.cache.insert(
                        subject.to_string(),
                        CachedPrincipal {
                            principal: principal.clone(),
                            fetched_at: Instant::now(),
                            generation,
                        },
                    );
                }
                Ok(principal)
            }
            None => {
                self.cache.remove(subject);
                Err(ResolveError::NotFound)
            }
        }
    }

    /// Drop the cached entry for one subject.
    pub fn invalidate(&self, subject: &str) {
        self.cache.remove(subject);
    }

    /// Drop every cached entry, including ones lookups in flight are about
    /// to write.
    pub fn clear(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
        self.cache.clear();
    }

    /// Remove entries older than the TTL or from before the last `clear`.
    pub fn purge_expired(&self) {
        let ttl = self.settings.cache_ttl;
        let generation = self.generation.load(Ordering::Acquire);
        self.cache
            .retain(|_, entry| entry.generation == generation && entry.fetched_at.elapsed() < ttl);
    }

    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }

    fn caching_enabled(&self) -> bool {
        !self.settings.cache_ttl.is_zero()
    }

    fn cached(&self, subject: &str) -> Option<Principal> {
        if !self.caching_enabled() {
            return None;
        }

        let generation = self.generation.load(Ordering::Acquire);
        self.cache
            .get(subject)
            .filter(|entry| {
                entry.generation == generation && entry.fetched_at.elapsed() < self.settings.cache_ttl
            })
            .map(|entry| entry.principal.clone())
    }
}
