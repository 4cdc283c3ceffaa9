//! Driving port for login/authentication use-cases.
//!
//! In hexagonal terms this is a *driving* port: inbound adapters call it to
//! authenticate credentials without knowing (or importing) the backing
//! infrastructure. This keeps HTTP handler tests deterministic because they
//! can substitute a test double instead of wiring stores and codecs.

use async_trait::async_trait;

use crate::domain::auth::LoginCredentials;
use crate::domain::error::Error;
use crate::domain::session::Session;
use crate::domain::user::User;

/// Successful login: the signed token plus what it asserts.
#[derive(Debug, Clone)]
pub struct AuthenticatedSession {
    /// Opaque bearer token for the `Authorization` header.
    pub token: String,
    /// The session the token encodes, including its expiry.
    pub session: Session,
    /// Public profile of the authenticated user.
    pub user: User,
}

/// Domain use-case port for authentication.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Validate credentials and issue a signed session.
    async fn authenticate(
        &self,
        credentials: &LoginCredentials,
    ) -> Result<AuthenticatedSession, Error>;
}
