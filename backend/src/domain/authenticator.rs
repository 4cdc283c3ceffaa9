//! Login use-case: credential verification and session issuance.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::TimeDelta;
use mockable::Clock;
use tracing::warn;

use crate::domain::auth::LoginCredentials;
use crate::domain::error::Error;
use crate::domain::ports::{
    AuthenticatedSession, LoginService, PasswordHasher, SessionCodec, UserStore,
};
use crate::domain::session::Session;

/// Message shared by the lookup and comparison failure paths, so a caller
/// cannot tell which one fired.
const BAD_CREDENTIALS: &str = "invalid email or password";

/// Authenticator over a credential store, a password hasher, and a token
/// codec.
///
/// Verifies a submitted (email, password, claimed role) triple and issues a
/// signed [`Session`] with a fixed time-to-live. Never mutates the user
/// record.
#[derive(Clone)]
pub struct Authenticator {
    users: Arc<dyn UserStore>,
    hasher: Arc<dyn PasswordHasher>,
    codec: Arc<dyn SessionCodec>,
    clock: Arc<dyn Clock>,
    session_ttl: TimeDelta,
}

impl Authenticator {
    /// Wire an authenticator from its collaborators.
    pub fn new(
        users: Arc<dyn UserStore>,
        hasher: Arc<dyn PasswordHasher>,
        codec: Arc<dyn SessionCodec>,
        clock: Arc<dyn Clock>,
        session_ttl: TimeDelta,
    ) -> Self {
        Self {
            users,
            hasher,
            codec,
            clock,
            session_ttl,
        }
    }
}

#[async_trait]
impl LoginService for Authenticator {
    async fn authenticate(
        &self,
        credentials: &LoginCredentials,
    ) -> Result<AuthenticatedSession, Error> {
        let Some(record) = self.users.find_by_email(credentials.email()).await? else {
            return Err(Error::invalid_credentials(BAD_CREDENTIALS));
        };

        if !self
            .hasher
            .verify(credentials.password(), record.password_hash())
        {
            return Err(Error::invalid_credentials(BAD_CREDENTIALS));
        }

        let (user, _) = record.into_parts();
        if let Some(claimed) = credentials.claimed_role()
            && claimed != user.role()
        {
            warn!(user_id = %user.id(), %claimed, "login claimed a different role");
            return Err(Error::role_mismatch(format!(
                "account does not hold the {claimed} role"
            )));
        }

        let session = Session::issue(
            user.id().clone(),
            user.role(),
            self.clock.utc(),
            self.session_ttl,
        );
        let token = self.codec.sign(&session)?;
        Ok(AuthenticatedSession {
            token,
            session,
            user,
        })
    }
}
