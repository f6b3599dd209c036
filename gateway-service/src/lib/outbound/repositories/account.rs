use std::collections::HashMap;
use std::sync::Arc;

use arc_swap::ArcSwap;
use async_trait::async_trait;
use auth::Principal;
use auth::PrincipalStore;
use auth::PrincipalStoreError;

use crate::account::errors::AccountError;
use crate::account::models::Account;
use crate::account::models::Username;
use crate::account::ports::AccountRepository;

/// Accounts seeded from configuration.
///
/// Serves both password login and principal resolution. The whole account
/// set is swapped at once on reload.
pub struct InMemoryAccountRepository {
    accounts: ArcSwap<HashMap<Username, Account>>,
}

impl InMemoryAccountRepository {
    pub fn new(accounts: impl IntoIterator<Item = Account>) -> Self {
        Self {
            accounts: ArcSwap::from_pointee(index(accounts)),
        }
    }

    pub fn replace_all(&self, accounts: impl IntoIterator<Item = Account>) {
        let accounts = index(accounts);
        tracing::info!(accounts = accounts.len(), "Account set replaced");
        self.accounts.store(Arc::new(accounts));
    }

    pub fn len(&self) -> usize {
        self.accounts.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn index(accounts: impl IntoIterator<Item = Account>) -> HashMap<Username, Account> {
    accounts
        .into_iter()
        .map(|account| (account.username.clone(), account))
        .collect()
}

#[async_trait]
impl AccountRepository for InMemoryAccountRepository {
    async fn find_by_username(&self, username: &Username) -> Result<Option<Account>, AccountError> {
        Ok(self.accounts.load().get(username).cloned())
    }
}

#[async_trait]
impl PrincipalStore for InMemoryAccountRepository {
    async fn find_principal(
        &self,
        subject: &str,
    ) -> Result<Option<Principal>, PrincipalStoreError> {
        // Subjects are issued from validated usernames; anything else is unknown
        let Ok(username) = Username::new(subject) else {
            return Ok(None);
        };
        if username.as_str() != subject {
            return Ok(None);
        }

        Ok(self.accounts.load().get(&username).map(Account::principal))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use auth::PasswordRecord;

    use super::*;

    fn account(username: &str, authorities: &[&str]) -> Account {
        Account {
            username: Username::new(username).unwrap(),
            display_name: username.to_uppercase(),
            password_hash: PasswordRecord::from_phc("$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA"),
            authorities: authorities.iter().map(|a| a.to_string()).collect::<BTreeSet<_>>(),
        }
    }

    #[tokio::test]
    async fn test_find_by_username() {
        let repository = InMemoryAccountRepository::new([account("alice", &["ROLE_USER"])]);

        let found = repository
            .find_by_username(&Username::new("alice").unwrap())
            .await
            .unwrap();
        assert_eq!(found.map(|a| a.display_name), Some("ALICE".to_string()));

        let missing = repository
            .find_by_username(&Username::new("bob").unwrap())
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_find_principal() {
        let repository =
            InMemoryAccountRepository::new([account("admin", &["ROLE_USER", "ROLE_ADMIN"])]);

        let principal = repository.find_principal("admin").await.unwrap().unwrap();
        assert_eq!(principal.id, "admin");
        assert!(principal.has_authority("ROLE_ADMIN"));

        assert_eq!(repository.find_principal("").await.unwrap(), None);
        assert_eq!(repository.find_principal(" admin").await.unwrap(), None);
        assert_eq!(repository.find_principal("nobody").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_replace_all() {
        let repository = InMemoryAccountRepository::new([account("alice", &["ROLE_USER"])]);

        repository.replace_all([account("bob", &["ROLE_USER"])]);

        assert_eq!(repository.len(), 1);
        assert_eq!(repository.find_principal("alice").await.unwrap(), None);
        assert!(repository.find_principal("bob").await.unwrap().is_some());
    }
}
