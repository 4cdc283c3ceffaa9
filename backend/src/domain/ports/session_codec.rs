//! Port abstraction for signing and verifying session tokens.

use crate::domain::error::Error;
use crate::domain::session::Session;

/// Domain port over the signed bearer-token format.
///
/// `verify` reports every failure mode (bad signature, malformed token,
/// lapsed expiry baked into the token) as `unauthenticated`; inbound
/// adapters additionally check [`Session::is_expired`] against their own
/// clock so a verified-but-stale session still dies.
#[cfg_attr(test, mockall::automock)]
pub trait SessionCodec: Send + Sync {
    /// Sign a session into an opaque bearer token.
    fn sign(&self, session: &Session) -> Result<String, Error>;

    /// Verify a token and reconstruct the session it asserts.
    fn verify(&self, token: &str) -> Result<Session, Error>;
}
