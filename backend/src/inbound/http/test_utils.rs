//! Shared helpers for HTTP adapter tests.

use std::sync::Arc;

use mockable::DefaultClock;

use crate::domain::{
    Authenticator, DashboardService, LeadService, UserService, default_session_ttl,
};
use crate::inbound::http::state::HttpState;
use crate::outbound::persistence::{InMemoryLeadStore, InMemoryUserStore};
use crate::outbound::security::{Argon2PasswordHasher, JwtSessionCodec};

/// Fully wired state over empty in-memory stores, for extractor and handler
/// tests that need real token verification.
pub fn test_state(secret: &[u8]) -> HttpState {
    let users = Arc::new(InMemoryUserStore::new());
    let leads = Arc::new(InMemoryLeadStore::new());
    let hasher = Arc::new(Argon2PasswordHasher::new());
    let sessions = Arc::new(JwtSessionCodec::new(secret));
    let clock = Arc::new(DefaultClock);
    HttpState {
        login: Arc::new(Authenticator::new(
            users.clone(),
            hasher.clone(),
            sessions.clone(),
            clock.clone(),
            default_session_ttl(),
        )),
        users: Arc::new(UserService::new(users.clone(), hasher)),
        leads: Arc::new(LeadService::new(leads.clone(), clock.clone())),
        dashboard: Arc::new(DashboardService::new(leads, users)),
        sessions,
        clock,
    }
}
