//! Outbound security adapters: password hashing and the token codec.

mod argon2_hasher;
mod jwt_codec;

pub use argon2_hasher::Argon2PasswordHasher;
pub use jwt_codec::JwtSessionCodec;
