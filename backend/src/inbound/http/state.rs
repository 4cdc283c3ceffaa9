//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain services and ports, never on a concrete store or codec.

use std::sync::Arc;

use mockable::Clock;

use crate::domain::ports::{LoginService, SessionCodec};
use crate::domain::{DashboardService, LeadService, UserService};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub login: Arc<dyn LoginService>,
    pub users: Arc<UserService>,
    pub leads: Arc<LeadService>,
    pub dashboard: Arc<DashboardService>,
    /// Verifies bearer tokens for the [`crate::inbound::http::identity::Caller`]
    /// extractor.
    pub sessions: Arc<dyn SessionCodec>,
    /// Clock the expiry check uses, injectable so tests can freeze time.
    pub clock: Arc<dyn Clock>,
}
