//! Domain primitives, services, and ports.
//!
//! Purpose: define the transport-agnostic core: role and permission logic,
//! user and lead aggregates, session values, and the use-case services that
//! drive them. Inbound adapters translate HTTP to these types; outbound
//! adapters implement the ports. Keep types immutable and document
//! invariants and serialisation contracts (serde) in each type's Rustdoc.

pub mod auth;
pub mod authenticator;
pub mod dashboard;
pub mod dashboard_service;
pub mod error;
pub mod lead;
pub mod lead_service;
pub mod policy;
pub mod ports;
pub mod role;
pub mod session;
pub mod user;
pub mod user_service;

pub use self::auth::{LoginCredentials, LoginValidationError};
pub use self::authenticator::Authenticator;
pub use self::dashboard::{
    AgentPerformance, DashboardStats, RECENT_LEADS_LIMIT, StatusCounts, conversion_rate,
};
pub use self::dashboard_service::DashboardService;
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::lead::{
    Lead, LeadDraft, LeadId, LeadPatch, LeadStatus, LeadValidationError, ParseLeadStatusError,
    PhoneNumber,
};
pub use self::lead_service::{ImportFailure, ImportOutcome, LeadService};
pub use self::policy::{CallerContext, LeadScope, Operation, authorize, permits};
pub use self::role::{ParseRoleError, Role};
pub use self::session::{Session, default_session_ttl};
pub use self::user::{
    DisplayName, EmailAddress, PasswordHash, User, UserId, UserRecord, UserValidationError,
};
pub use self::user_service::{NewUser, UserChanges, UserService};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use backend::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
