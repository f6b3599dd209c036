use std::fmt;

use argon2::password_hash::PasswordHash;
use serde::Deserialize;
use serde::Serialize;

/// Stored password credential.
///
/// Wraps a PHC string, which carries the algorithm, work factor, salt and
/// hash in one value (`$argon2id$v=19$m=...,t=...,p=...$<salt>$<hash>`).
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PasswordRecord(String);

impl PasswordRecord {
    /// Wrap a PHC string loaded from a credential store.
    ///
    /// No validation happens here; a malformed record simply never verifies.
    pub fn from_phc(phc: impl Into<String>) -> Self {
        Self(phc.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Base64 salt embedded in the record, if the record parses.
    pub fn salt(&self) -> Option<String> {
        PasswordHash::new(&self.0)
            .ok()
            .and_then(|hash| hash.salt.map(|salt| salt.as_str().to_string()))
    }
}

// Keep hashes out of debug logs.
impl fmt::Debug for PasswordRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordRecord(..)")
    }
}
