use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::PasswordHash;
use argon2::password_hash::PasswordHasher as Argon2PasswordHasher;
use argon2::password_hash::PasswordVerifier;
use argon2::password_hash::SaltString;
use argon2::Algorithm;
use argon2::Argon2;
use argon2::Params;
use argon2::Version;
use serde::Deserialize;

use super::errors::PasswordError;
use super::record::PasswordRecord;

/// Argon2id cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct WorkFactor {
    /// Memory cost in KiB
    pub memory_kib: u32,
    /// Number of passes
    pub iterations: u32,
    /// Degree of parallelism
    pub parallelism: u32,
}

impl WorkFactor {
    fn params(&self) -> Result<Params, PasswordError> {
        Params::new(self.memory_kib, self.iterations, self.parallelism, None)
            .map_err(|e| PasswordError::InvalidWorkFactor(e.to_string()))
    }
}

impl Default for WorkFactor {
    fn default() -> Self {
        Self {
            memory_kib: Params::DEFAULT_M_COST,
            iterations: Params::DEFAULT_T_COST,
            parallelism: Params::DEFAULT_P_COST,
        }
    }
}

/// Password hashing implementation.
///
/// Salted, memory-hard one-way hashing (Argon2id, version 0x13) with a
/// configurable work factor.
pub struct PasswordHasher {
    argon2: Argon2<'static>,
    work_factor: WorkFactor,
}

impl PasswordHasher {
    /// Create a password hasher with the default work factor.
    pub fn new() -> Self {
        Self {
            argon2: Argon2::default(),
            work_factor: WorkFactor::default(),
        }
    }

    /// Create a password hasher with an explicit work factor.
    ///
    /// # Errors
    /// * `InvalidWorkFactor` - Parameters are outside Argon2's accepted range
    pub fn with_work_factor(work_factor: WorkFactor) -> Result<Self, PasswordError> {
        let params = work_factor.params()?;

        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
            work_factor,
        })
    }

    pub fn work_factor(&self) -> WorkFactor {
        self.work_factor
    }

    /// Hash a plaintext password securely.
    ///
    /// Every call generates a fresh 16-byte random salt.
    ///
    /// # Arguments
    /// * `password` - Plaintext password to hash
    ///
    /// # Returns
    /// PasswordRecord holding the PHC string
    ///
    /// # Errors
    /// * `HashingFailed` - Password hashing operation failed
    pub fn hash(&self, password: &str) -> Result<PasswordRecord, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);

        self.argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| PasswordRecord::from_phc(hash.to_string()))
            .map_err(|e| PasswordError::HashingFailed(e.to_string()))
    }

    /// Verify a password against a stored record.
    ///
    /// Recomputes the hash with the salt and work factor stored in the record
    /// and compares in constant time. Returns false for a wrong password, a
    /// malformed record, or a record produced by another algorithm or version.
    pub fn verify(&self, password: &str, record: &PasswordRecord) -> bool {
        let Ok(parsed) = PasswordHash::new(record.as_str()) else {
            return false;
        };

        if !is_supported(&parsed) {
            return false;
        }

        self.argon2
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }

    /// Check whether a record should be re-hashed with the current work factor.
    ///
    /// True for records that do not parse, use another algorithm or version, or
    /// were hashed with weaker parameters than configured.
    pub fn needs_rehash(&self, record: &PasswordRecord) -> bool {
        let Ok(parsed) = PasswordHash::new(record.as_str()) else {
            return true;
        };

        if !is_supported(&parsed) {
            return true;
        }

        match Params::try_from(&parsed) {
            Ok(params) => {
                params.m_cost() < self.work_factor.memory_kib
                    || params.t_cost() < self.work_factor.iterations
                    || params.p_cost() < self.work_factor.parallelism
            }
            Err(_) => true,
        }
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

fn is_supported(parsed: &PasswordHash<'_>) -> bool {
    let algorithm_ok = matches!(Algorithm::try_from(parsed.algorithm), Ok(Algorithm::Argon2id));
    let version_ok = matches!(parsed.version.map(Version::try_from), Some(Ok(Version::V0x13)));

    algorithm_ok && version_ok
}
