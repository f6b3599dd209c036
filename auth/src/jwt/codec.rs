use std::sync::Arc;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::Duration;
use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::Algorithm;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::claims::IssuedToken;
use super::claims::Token;
use super::claims::TokenClaims;
use super::errors::SignError;
use super::errors::VerificationError;
use super::keys::KeyRing;
use crate::clock::Clock;
use crate::clock::SystemClock;

/// The only algorithm tokens may be signed with.
pub const ALGORITHM: Algorithm = Algorithm::HS256;
const ALGORITHM_NAME: &str = "HS256";

#[derive(Debug, Deserialize)]
struct RawHeader {
    alg: String,
}

/// Signs and verifies compact HS256 tokens (`header.payload.signature`,
/// each segment base64url without padding).
///
/// Holds no state of its own besides the shared key ring and the clock.
pub struct TokenCodec {
    keys: Arc<KeyRing>,
    clock: Arc<dyn Clock>,
    validation: Validation,
}

impl TokenCodec {
    /// Create a codec judging expiry against the system clock.
    pub fn new(keys: Arc<KeyRing>) -> Self {
        Self::with_clock(keys, Arc::new(SystemClock))
    }

    pub fn with_clock(keys: Arc<KeyRing>, clock: Arc<dyn Clock>) -> Self {
        let mut validation = Validation::new(ALGORITHM);
        // Expiry is checked against our own clock before the signature.
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        Self {
            keys,
            clock,
            validation,
        }
    }

    pub fn key_ring(&self) -> &Arc<KeyRing> {
        &self.keys
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Sign a token for `subject` valid for `ttl` from now.
    ///
    /// Always signs with the current key; its id goes into the `kid` header.
    ///
    /// # Errors
    /// * `EmptySubject` - Subject is empty
    /// * `InvalidTtl` - Lifetime shorter than one second
    /// * `EncodingFailed` - Token encoding failed
    pub fn sign(&self, subject: &str, ttl: Duration) -> Result<String, SignError> {
        self.issue(subject, ttl).map(|issued| issued.value)
    }

    /// Like `sign`, but also returns the claims that went into the token.
    pub fn issue(&self, subject: &str, ttl: Duration) -> Result<IssuedToken, SignError> {
        if subject.is_empty() {
            return Err(SignError::EmptySubject);
        }

        if ttl.num_seconds() < 1 {
            return Err(SignError::InvalidTtl);
        }

        let keys = self.keys.snapshot();
        let key = keys.current();

        let mut header = Header::new(ALGORITHM);
        header.kid = Some(key.id().to_string());

        let claims = TokenClaims::new(subject, self.clock.now(), ttl);
        let (issued_at, expires_at) = claims
            .validity()
            .map_err(|e| SignError::EncodingFailed(e.to_string()))?;

        let value = encode(&header, &claims, key.encoding_key())
            .map_err(|e| SignError::EncodingFailed(e.to_string()))?;

        Ok(IssuedToken {
            value,
            token: Token {
                subject: claims.sub,
                issued_at,
                expires_at,
                token_id: claims.jti,
                key_id: key.id().to_string(),
            },
        })
    }

    /// Verify a token and return its claims.
    ///
    /// Checks, in order: three-segment structure, header algorithm, payload
    /// fields, expiry, then the signature against every active key.
    ///
    /// # Errors
    /// * `MalformedToken` - Token cannot be parsed or payload fields are missing/wrong-typed
    /// * `UnsupportedAlgorithm` - Header names an algorithm other than HS256
    /// * `Expired` - `now >= exp`
    /// * `BadSignature` - Signature matches no active key
    pub fn verify(&self, token: &str) -> Result<Token, VerificationError> {
        let segments: Vec<&str> = token.split('.').collect();
        let [header_segment, payload_segment, _signature] = segments.as_slice() else {
            return Err(VerificationError::MalformedToken(format!(
                "expected 3 segments, got {}",
                segments.len()
            )));
        };

        let header: RawHeader = decode_segment(header_segment)?;
        if header.alg != ALGORITHM_NAME {
            return Err(VerificationError::UnsupportedAlgorithm(header.alg));
        }

        let claims: TokenClaims = decode_segment(payload_segment)?;
        let (issued_at, expires_at) = claims.validity()?;

        if self.clock.now() >= expires_at {
            return Err(VerificationError::Expired);
        }

        let keys = self.keys.snapshot();
        for key in keys.iter() {
            match decode::<TokenClaims>(token, key.decoding_key(), &self.validation) {
                Ok(_) => {
                    return Ok(Token {
                        subject: claims.sub,
                        issued_at,
                        expires_at,
                        token_id: claims.jti,
                        key_id: key.id().to_string(),
                    });
                }
                Err(e) if matches!(e.kind(), ErrorKind::InvalidSignature) => continue,
                Err(e) => return Err(VerificationError::MalformedToken(e.to_string())),
            }
        }

        Err(VerificationError::BadSignature)
    }
}

fn decode_segment<T: DeserializeOwned>(segment: &str) -> Result<T, VerificationError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|e| VerificationError::MalformedToken(format!("invalid base64: {}", e)))?;

    serde_json::from_slice(&bytes)
        .map_err(|e| VerificationError::MalformedToken(format!("invalid json: {}", e)))
}

#[cfg(test)]
mod tests {
    use chrono::DateTime;
    use chrono::Utc;

    use super::*;
    use crate::clock::ManualClock;
    use crate::jwt::keys::KeySet;
    use crate::jwt::keys::SigningKey;

    const SECRET_1: &[u8] = b"first_secret_key_at_least_32_bytes!";
    const SECRET_2: &[u8] = b"second_secret_key_at_least_32_bytes";

    fn start() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn ring(id: &str, secret: &[u8]) -> Arc<KeyRing> {
        let key = SigningKey::new(id, secret).unwrap();
        Arc::new(KeyRing::new(KeySet::new(key, vec![]).unwrap()))
    }

    fn codec_with_clock(keys: Arc<KeyRing>) -> (TokenCodec, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(start()));
        (TokenCodec::with_clock(keys, clock.clone()), clock)
    }

    fn encode_json(value: &serde_json::Value) -> String {
        URL_SAFE_NO_PAD.encode(serde_json::to_vec(value).unwrap())
    }

    fn flip_signature_bit(token: &str, bit: usize) -> String {
        let mut parts: Vec<String> = token.split('.').map(String::from).collect();
        let mut signature = URL_SAFE_NO_PAD.decode(&parts[2]).unwrap();
        signature[bit / 8] ^= 1 << (bit % 8);
        parts[2] = URL_SAFE_NO_PAD.encode(signature);
        parts.join(".")
    }

    #[test]
    fn test_sign_and_verify() {
        let (codec, clock) = codec_with_clock(ring("k1", SECRET_1));

        let token = codec.sign("alice", Duration::minutes(15)).unwrap();
        let verified = codec.verify(&token).unwrap();

        assert_eq!(verified.subject, "alice");
        assert_eq!(verified.issued_at, start());
        assert_eq!(verified.expires_at, start() + Duration::minutes(15));
        assert_eq!(verified.key_id, "k1");

        // Still valid one second before expiry
        clock.advance(Duration::minutes(15) - Duration::seconds(1));
        assert!(codec.verify(&token).is_ok());
    }

    #[test]
    fn test_issue_matches_verify() {
        let (codec, _) = codec_with_clock(ring("k1", SECRET_1));

        let issued = codec.issue("alice", Duration::minutes(15)).unwrap();

        assert_eq!(codec.verify(&issued.value).unwrap(), issued.token);
        assert_eq!(issued.token.expires_at, start() + Duration::minutes(15));
    }

    #[test]
    fn test_sign_rejects_empty_subject_and_short_ttl() {
        let (codec, _) = codec_with_clock(ring("k1", SECRET_1));

        assert_eq!(
            codec.sign("", Duration::minutes(1)).unwrap_err(),
            SignError::EmptySubject
        );
        assert_eq!(
            codec.sign("alice", Duration::zero()).unwrap_err(),
            SignError::InvalidTtl
        );
        assert_eq!(
            codec.sign("alice", Duration::seconds(-5)).unwrap_err(),
            SignError::InvalidTtl
        );
    }

    #[test]
    fn test_verify_expired_at_exact_expiry() {
        let (codec, clock) = codec_with_clock(ring("k1", SECRET_1));
        let token = codec.sign("alice", Duration::seconds(30)).unwrap();

        clock.advance(Duration::seconds(30));
        assert_eq!(codec.verify(&token).unwrap_err(), VerificationError::Expired);

        clock.advance(Duration::days(365));
        assert_eq!(codec.verify(&token).unwrap_err(), VerificationError::Expired);
    }

    #[test]
    fn test_expired_wins_over_bad_signature() {
        let (codec, clock) = codec_with_clock(ring("k1", SECRET_1));
        let token = codec.sign("alice", Duration::seconds(30)).unwrap();
        let tampered = flip_signature_bit(&token, 0);

        clock.advance(Duration::seconds(31));
        assert_eq!(
            codec.verify(&tampered).unwrap_err(),
            VerificationError::Expired
        );
    }

    #[test]
    fn test_every_signature_bit_flip_is_bad_signature() {
        let (codec, _) = codec_with_clock(ring("k1", SECRET_1));
        let token = codec.sign("alice", Duration::minutes(5)).unwrap();

        // HS256 signatures are 32 bytes
        for bit in 0..256 {
            let tampered = flip_signature_bit(&token, bit);
            assert_eq!(
                codec.verify(&tampered).unwrap_err(),
                VerificationError::BadSignature,
                "bit {} flipped",
                bit
            );
        }
    }

    #[test]
    fn test_verify_with_wrong_secret() {
        let (issuer, _) = codec_with_clock(ring("k1", SECRET_1));
        let (verifier, _) = codec_with_clock(ring("k1", SECRET_2));

        let token = issuer.sign("alice", Duration::minutes(5)).unwrap();
        assert_eq!(
            verifier.verify(&token).unwrap_err(),
            VerificationError::BadSignature
        );
    }

    #[test]
    fn test_verify_malformed_structure() {
        let (codec, _) = codec_with_clock(ring("k1", SECRET_1));

        for token in ["", "abc", "a.b", "a.b.c.d", "invalid.token.here"] {
            assert!(
                matches!(
                    codec.verify(token),
                    Err(VerificationError::MalformedToken(_))
                ),
                "token {:?}",
                token
            );
        }
    }

    #[test]
    fn test_verify_missing_and_wrong_typed_fields() {
        let (codec, _) = codec_with_clock(ring("k1", SECRET_1));
        let header = encode_json(&serde_json::json!({"alg": "HS256", "typ": "JWT"}));

        let payloads = [
            serde_json::json!({"iat": 1_700_000_000, "exp": 1_800_000_000}),
            serde_json::json!({"sub": "alice", "exp": 1_800_000_000}),
            serde_json::json!({"sub": 42, "iat": 1_700_000_000, "exp": 1_800_000_000}),
            serde_json::json!({"sub": "alice", "iat": 1_700_000_000, "exp": "soon"}),
            serde_json::json!({"sub": "", "iat": 1_700_000_000, "exp": 1_800_000_000}),
        ];

        for payload in payloads {
            let token = format!("{}.{}.c2ln", header, encode_json(&payload));
            assert!(
                matches!(
                    codec.verify(&token),
                    Err(VerificationError::MalformedToken(_))
                ),
                "payload {}",
                payload
            );
        }
    }

    #[test]
    fn test_verify_rejects_unsupported_algorithms() {
        let (codec, _) = codec_with_clock(ring("k1", SECRET_1));
        let payload = encode_json(&serde_json::json!({
            "sub": "alice", "iat": 1_700_000_000, "exp": 1_800_000_000
        }));

        for alg in ["none", "HS512", "RS256", "XYZ"] {
            let header = encode_json(&serde_json::json!({"alg": alg}));
            let token = format!("{}.{}.", header, payload);
            assert_eq!(
                codec.verify(&token).unwrap_err(),
                VerificationError::UnsupportedAlgorithm(alg.to_string())
            );
        }
    }

    #[test]
    fn test_token_signed_with_previous_key_survives_rotation() {
        let keys = ring("k1", SECRET_1);
        let (codec, clock) = codec_with_clock(keys.clone());

        let old_token = codec.sign("alice", Duration::minutes(10)).unwrap();

        keys.rotate(SigningKey::new("k2", SECRET_2).unwrap()).unwrap();

        let verified = codec.verify(&old_token).unwrap();
        assert_eq!(verified.key_id, "k1");

        let new_token = codec.sign("bob", Duration::minutes(10)).unwrap();
        assert_eq!(codec.verify(&new_token).unwrap().key_id, "k2");

        // The new token is not accepted by a verifier that only knows the old key
        let (old_only, _) = codec_with_clock(ring("k1", SECRET_1));
        assert_eq!(
            old_only.verify(&new_token).unwrap_err(),
            VerificationError::BadSignature
        );

        // Old token still expires on its own schedule
        clock.advance(Duration::minutes(10));
        assert_eq!(
            codec.verify(&old_token).unwrap_err(),
            VerificationError::Expired
        );
    }

    #[test]
    fn test_token_from_retired_key_is_rejected() {
        let keys = ring("k1", SECRET_1);
        let (codec, _) = codec_with_clock(keys.clone());
        let token = codec.sign("alice", Duration::minutes(10)).unwrap();

        keys.replace(KeySet::new(SigningKey::new("k2", SECRET_2).unwrap(), vec![]).unwrap());

        assert_eq!(
            codec.verify(&token).unwrap_err(),
            VerificationError::BadSignature
        );
    }

    #[test]
    fn test_header_carries_key_id() {
        let (codec, _) = codec_with_clock(ring("k1", SECRET_1));
        let token = codec.sign("alice", Duration::minutes(1)).unwrap();

        let header = jsonwebtoken::decode_header(&token).unwrap();
        assert_eq!(header.alg, Algorithm::HS256);
        assert_eq!(header.kid.as_deref(), Some("k1"));
    }
}
