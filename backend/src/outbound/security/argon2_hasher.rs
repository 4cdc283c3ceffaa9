//! Argon2id password hashing adapter.

use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{
    PasswordHash as PhcString, PasswordHasher as _, PasswordVerifier as _, SaltString,
};

use crate::domain::error::Error;
use crate::domain::ports::PasswordHasher;
use crate::domain::user::PasswordHash;

/// [`PasswordHasher`] backed by Argon2id with per-password random salts.
#[derive(Default, Clone)]
pub struct Argon2PasswordHasher {
    argon2: Argon2<'static>,
}

impl Argon2PasswordHasher {
    /// Create a hasher with the library's recommended parameters.
    pub fn new() -> Self {
        Self::default()
    }
}

impl PasswordHasher for Argon2PasswordHasher {
    fn hash(&self, plaintext: &str) -> Result<PasswordHash, Error> {
        let salt = SaltString::generate(&mut OsRng);
        let digest = self
            .argon2
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|err| Error::internal(format!("password hashing failed: {err}")))?;
        Ok(PasswordHash::new(digest.to_string()))
    }

    fn verify(&self, plaintext: &str, hash: &PasswordHash) -> bool {
        // An unparseable digest verifies as false rather than erroring: the
        // authenticator must not reveal whether the stored hash or the
        // submitted password was at fault.
        PhcString::new(hash.as_str()).is_ok_and(|parsed| {
            self.argon2
                .verify_password(plaintext.as_bytes(), &parsed)
                .is_ok()
        })
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;

    #[test]
    fn hashes_verify_and_salts_differ() {
        let hasher = Argon2PasswordHasher::new();
        let first = hasher.hash("correct horse battery staple").expect("hash");
        let second = hasher.hash("correct horse battery staple").expect("hash");
        assert_ne!(first.as_str(), second.as_str(), "salts must differ");
        assert!(hasher.verify("correct horse battery staple", &first));
        assert!(!hasher.verify("wrong password", &first));
    }

    #[test]
    fn garbage_digests_verify_as_false() {
        let hasher = Argon2PasswordHasher::new();
        assert!(!hasher.verify("anything", &PasswordHash::new("not-a-phc-string")));
    }
}
