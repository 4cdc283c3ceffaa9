//! Startup seeding for the bootstrap superadmin.
//!
//! Users are never self-registered, so the very first superadmin has to come
//! from somewhere: this module inserts it straight through the store port,
//! below the access policy, before the server starts taking requests.
//! Seeding is idempotent; an existing account with the configured email is
//! left untouched.

use tracing::info;

use crate::domain::ports::{PasswordHasher, UserStore};
use crate::domain::{DisplayName, EmailAddress, Error, Role, User, UserId, UserRecord};

/// Ensure a superadmin with the given credentials exists.
///
/// Returns the existing or newly created profile.
pub async fn ensure_superadmin(
    users: &dyn UserStore,
    hasher: &dyn PasswordHasher,
    email: &str,
    password: &str,
) -> Result<User, Error> {
    let email = EmailAddress::new(email)
        .map_err(|err| Error::invalid_request(format!("superadmin email: {err}")))?;
    if password.is_empty() {
        return Err(Error::invalid_request("superadmin password must not be empty"));
    }

    if let Some(existing) = users.find_by_email(&email).await? {
        info!(user_id = %existing.user().id(), "superadmin already present, skipping seed");
        return Ok(existing.user().clone());
    }

    let name = DisplayName::new(email.local_part())
        .map_err(|err| Error::invalid_request(format!("superadmin name: {err}")))?;
    let user = User::new(UserId::random(), name, email, Role::Superadmin);
    let password_hash = hasher.hash(password)?;
    users
        .insert(UserRecord::new(user.clone(), password_hash))
        .await?;
    info!(user_id = %user.id(), "seeded bootstrap superadmin");
    Ok(user)
}
