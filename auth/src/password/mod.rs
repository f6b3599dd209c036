pub mod argon2;
pub mod errors;
pub mod record;

pub use argon2::PasswordHasher;
pub use argon2::WorkFactor;
pub use errors::PasswordError;
pub use record::PasswordRecord;
