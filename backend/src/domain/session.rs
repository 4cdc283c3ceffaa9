//! Session value asserting caller identity and role.
//!
//! A session is derived, not stored: the codec signs it into a bearer token
//! and reconstructs it on every request. There is no server-side revocation
//! list; expiry is the only way a token dies, so every consumer must check
//! [`Session::is_expired`] before trusting one.

use chrono::{DateTime, TimeDelta, Utc};

use super::role::Role;
use super::user::UserId;

/// How long an issued session stays valid.
pub fn default_session_ttl() -> TimeDelta {
    TimeDelta::hours(1)
}

/// Signed, time-limited assertion of caller identity and role.
///
/// ## Invariants
/// - `expires_at` never moves once issued; re-authentication is the only
///   way to extend access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    user_id: UserId,
    role: Role,
    expires_at: DateTime<Utc>,
}

impl Session {
    /// Issue a session valid for `ttl` from `now`.
    pub fn issue(user_id: UserId, role: Role, now: DateTime<Utc>, ttl: TimeDelta) -> Self {
        Self {
            user_id,
            role,
            expires_at: now + ttl,
        }
    }

    /// Reconstruct a session from verified token claims.
    pub fn from_claims(user_id: UserId, role: Role, expires_at: DateTime<Utc>) -> Self {
        Self {
            user_id,
            role,
            expires_at,
        }
    }

    /// Identity the session asserts.
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Role the session asserts.
    pub fn role(&self) -> Role {
        self.role
    }

    /// Instant after which the session must be rejected.
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Whether the session has lapsed as of `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}
