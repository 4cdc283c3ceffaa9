//! Port abstraction for one-way password hashing.

use crate::domain::error::Error;
use crate::domain::user::PasswordHash;

/// Domain port for salted, one-way password digests.
///
/// Verification is a boolean on purpose: the authenticator collapses every
/// comparison failure into one undifferentiated credential error, so the
/// port must not leak *why* a password did not match.
#[cfg_attr(test, mockall::automock)]
pub trait PasswordHasher: Send + Sync {
    /// Digest a plaintext password with a fresh salt.
    fn hash(&self, plaintext: &str) -> Result<PasswordHash, Error>;

    /// Whether `plaintext` matches the stored digest.
    fn verify(&self, plaintext: &str, hash: &PasswordHash) -> bool;
}
