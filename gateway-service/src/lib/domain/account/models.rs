use std::collections::BTreeSet;

use auth::PasswordRecord;
use auth::Principal;
use chrono::DateTime;
use chrono::Utc;

use crate::account::errors::UsernameError;
use crate::config::AccountConfig;

/// Validated login name; doubles as the token subject.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Username(String);

impl Username {
    const MAX_LENGTH: usize = 64;

    pub fn new(username: impl Into<String>) -> Result<Self, UsernameError> {
        let username = username.into();
        let trimmed = username.trim();

        if trimmed.is_empty() {
            return Err(UsernameError::Empty);
        }

        let length = trimmed.chars().count();
        if length > Self::MAX_LENGTH {
            return Err(UsernameError::TooLong {
                max: Self::MAX_LENGTH,
                actual: length,
            });
        }

        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Username {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Account that can log in and be resolved as a principal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub username: Username,
    pub display_name: String,
    pub password_hash: PasswordRecord,
    pub authorities: BTreeSet<String>,
}

impl Account {
    pub fn principal(&self) -> Principal {
        Principal::new(
            self.username.as_str(),
            self.display_name.clone(),
            self.authorities.iter().cloned(),
        )
    }
}

impl TryFrom<&AccountConfig> for Account {
    type Error = UsernameError;

    fn try_from(config: &AccountConfig) -> Result<Self, Self::Error> {
        Ok(Self {
            username: Username::new(config.username.clone())?,
            display_name: config.display_name.clone(),
            password_hash: PasswordRecord::from_phc(config.password_hash.clone()),
            authorities: config.authorities.iter().cloned().collect(),
        })
    }
}

/// Successful login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginResult {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub principal: Principal,
}
