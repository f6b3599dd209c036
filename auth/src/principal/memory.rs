use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use super::errors::PrincipalStoreError;
use super::models::Principal;
use super::ports::PrincipalStore;

/// Principal store kept in process memory.
#[derive(Debug, Default)]
pub struct InMemoryPrincipalStore {
    principals: RwLock<HashMap<String, Principal>>,
}

impl InMemoryPrincipalStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_principals(principals: impl IntoIterator<Item = Principal>) -> Self {
        let store = Self::new();
        for principal in principals {
            store.insert(principal);
        }
        store
    }

    pub fn insert(&self, principal: Principal) {
        let mut principals = self.principals.write().unwrap_or_else(|e| e.into_inner());
        principals.insert(principal.id.clone(), principal);
    }

    pub fn remove(&self, id: &str) -> Option<Principal> {
        let mut principals = self.principals.write().unwrap_or_else(|e| e.into_inner());
        principals.remove(id)
    }
}

#[async_trait]
impl PrincipalStore for InMemoryPrincipalStore {
    async fn find_principal(
        &self,
        subject: &str,
    ) -> Result<Option<Principal>, PrincipalStoreError> {
        let principals = self.principals.read().unwrap_or_else(|e| e.into_inner());
        Ok(principals.get(subject).cloned())
    }
}
