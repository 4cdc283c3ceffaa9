//! Port abstraction for the credential store and its errors.
//!
//! In hexagonal terms this is a *driven* port: domain services call it to
//! look up and mutate user records without knowing the backing
//! infrastructure. Uniqueness of the email column is the store's job, so
//! every adapter enforces it and reports the collision as a typed error.

use async_trait::async_trait;

use crate::domain::role::Role;
use crate::domain::user::{DisplayName, EmailAddress, PasswordHash, User, UserId, UserRecord};

/// Persistence errors raised by credential-store adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserStoreError {
    /// The store could not be reached or the call failed mid-flight.
    #[error("credential store unavailable: {message}")]
    Unavailable { message: String },
    /// Another user already owns this email.
    #[error("a user with email {email} already exists")]
    DuplicateEmail { email: String },
}

impl From<UserStoreError> for crate::domain::error::Error {
    fn from(err: UserStoreError) -> Self {
        match err {
            UserStoreError::Unavailable { .. } => Self::internal(err.to_string()),
            UserStoreError::DuplicateEmail { .. } => Self::conflict(err.to_string()),
        }
    }
}

/// Field set a superadmin-initiated update may change. `None` leaves the
/// field untouched.
#[derive(Debug, Clone, Default)]
pub struct UserFieldUpdate {
    pub name: Option<DisplayName>,
    pub email: Option<EmailAddress>,
    pub role: Option<Role>,
    pub password_hash: Option<PasswordHash>,
}

/// Domain port over user persistence.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a new user record. Fails with [`UserStoreError::DuplicateEmail`]
    /// when the email is taken.
    async fn insert(&self, record: UserRecord) -> Result<(), UserStoreError>;

    /// Fetch a record by its normalised email.
    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<UserRecord>, UserStoreError>;

    /// Fetch a record by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<UserRecord>, UserStoreError>;

    /// Apply a partial update, returning the updated profile or `None` when
    /// the id does not exist.
    async fn update(
        &self,
        id: &UserId,
        fields: UserFieldUpdate,
    ) -> Result<Option<User>, UserStoreError>;

    /// Delete a record, reporting whether it existed.
    async fn delete(&self, id: &UserId) -> Result<bool, UserStoreError>;

    /// List every profile except those holding `role`, for the admin user
    /// table (superadmins never appear there).
    async fn list_excluding_role(&self, role: Role) -> Result<Vec<User>, UserStoreError>;
}
