//! Domain ports and supporting types for the hexagonal boundary.

mod lead_store;
mod login_service;
mod password_hasher;
mod session_codec;
mod user_store;

#[cfg(test)]
pub use lead_store::MockLeadStore;
pub use lead_store::{LeadFilter, LeadSort, LeadStore, LeadStoreError};
#[cfg(test)]
pub use login_service::MockLoginService;
pub use login_service::{AuthenticatedSession, LoginService};
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::PasswordHasher;
#[cfg(test)]
pub use session_codec::MockSessionCodec;
pub use session_codec::SessionCodec;
#[cfg(test)]
pub use user_store::MockUserStore;
pub use user_store::{UserFieldUpdate, UserStore, UserStoreError};
