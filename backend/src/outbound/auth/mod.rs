//! Credential adapters implementing the domain's auth ports.
//!
//! - [`BcryptPasswordHasher`]: cost-factor password hashing on the
//!   blocking pool.
//! - [`JwtTokenCodec`]: HS256-signed, time-limited bearer tokens.

mod bcrypt_password_hasher;
mod jwt_token_codec;

pub use bcrypt_password_hasher::BcryptPasswordHasher;
pub use jwt_token_codec::{DEFAULT_TTL_HOURS, JwtTokenCodec};
