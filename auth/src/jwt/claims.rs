use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

use super::errors::VerificationError;

/// Token payload as it travels on the wire.
///
/// Timestamps are Unix seconds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenClaims {
    /// Subject (principal identifier)
    pub sub: String,

    /// Issued at
    pub iat: i64,

    /// Expiration time
    pub exp: i64,

    /// Token identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
}

impl TokenClaims {
    /// Create claims for a subject valid for `ttl` from `issued_at`.
    pub fn new(subject: impl ToString, issued_at: DateTime<Utc>, ttl: Duration) -> Self {
        let iat = issued_at.timestamp();

        Self {
            sub: subject.to_string(),
            iat,
            exp: iat + ttl.num_seconds(),
            jti: Some(Uuid::new_v4().to_string()),
        }
    }

    /// Check payload invariants and convert the timestamps.
    ///
    /// # Errors
    /// * `MalformedToken` - Empty subject, out-of-range timestamps, or `exp <= iat`
    pub fn validity(&self) -> Result<(DateTime<Utc>, DateTime<Utc>), VerificationError> {
        if self.sub.is_empty() {
            return Err(VerificationError::MalformedToken(
                "empty subject".to_string(),
            ));
        }

        let issued_at = DateTime::from_timestamp(self.iat, 0).ok_or_else(|| {
            VerificationError::MalformedToken("iat out of range".to_string())
        })?;
        let expires_at = DateTime::from_timestamp(self.exp, 0).ok_or_else(|| {
            VerificationError::MalformedToken("exp out of range".to_string())
        })?;

        if expires_at <= issued_at {
            return Err(VerificationError::MalformedToken(
                "exp is not after iat".to_string(),
            ));
        }

        Ok((issued_at, expires_at))
    }
}

/// A token whose signature and expiry have been verified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub subject: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub token_id: Option<String>,
    /// Id of the key whose signature matched
    pub key_id: String,
}

/// A freshly signed token together with what it asserts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    /// Compact serialization handed to the client
    pub value: String,
    pub token: Token,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, 0).unwrap()
    }

    #[test]
    fn test_new_claims() {
        let claims = TokenClaims::new("alice", at(1_000), Duration::minutes(15));

        assert_eq!(claims.sub, "alice");
        assert_eq!(claims.iat, 1_000);
        assert_eq!(claims.exp, 1_000 + 15 * 60);
        assert!(claims.jti.is_some());
    }

    #[test]
    fn test_token_ids_differ() {
        let a = TokenClaims::new("alice", at(1_000), Duration::minutes(1));
        let b = TokenClaims::new("alice", at(1_000), Duration::minutes(1));
        assert_ne!(a.jti, b.jti);
    }

    #[test]
    fn test_validity() {
        let claims = TokenClaims::new("alice", at(1_000), Duration::seconds(60));
        let (iat, exp) = claims.validity().unwrap();

        assert_eq!(iat, at(1_000));
        assert_eq!(exp, at(1_060));
    }

    #[test]
    fn test_validity_rejects_empty_subject() {
        let claims = TokenClaims::new("", at(1_000), Duration::seconds(60));
        assert!(matches!(
            claims.validity(),
            Err(VerificationError::MalformedToken(_))
        ));
    }

    #[test]
    fn test_validity_rejects_exp_not_after_iat() {
        let claims = TokenClaims {
            sub: "alice".to_string(),
            iat: 1_000,
            exp: 1_000,
            jti: None,
        };
        assert!(matches!(
            claims.validity(),
            Err(VerificationError::MalformedToken(_))
        ));
    }

    #[test]
    fn test_missing_jti_deserializes() {
        let claims: TokenClaims =
            serde_json::from_str(r#"{"sub":"alice","iat":1,"exp":2}"#).unwrap();
        assert_eq!(claims.jti, None);
    }

    #[test]
    fn test_wrong_typed_field_fails() {
        let result = serde_json::from_str::<TokenClaims>(r#"{"sub":"alice","iat":"1","exp":2}"#);
        assert!(result.is_err());
    }
}
