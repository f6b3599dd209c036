pub mod claims;
pub mod codec;
pub mod errors;
pub mod keys;

pub use claims::IssuedToken;
pub use claims::Token;
pub use claims::TokenClaims;
pub use codec::TokenCodec;
pub use errors::KeyRingError;
pub use errors::SignError;
pub use errors::VerificationError;
pub use keys::KeyProvider;
pub use keys::KeyRing;
pub use keys::KeySet;
pub use keys::SigningKey;
pub use keys::StaticKeyProvider;
