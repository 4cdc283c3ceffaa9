//! User provisioning use-cases, superadmin only.
//!
//! Users are never self-registered: a superadmin creates subadmins and
//! agents, and only a superadmin may list, change, or remove them. The
//! superadmin role itself cannot be handed out through this surface.

use std::sync::Arc;

use zeroize::Zeroizing;

use crate::domain::error::Error;
use crate::domain::policy::{CallerContext, Operation, authorize};
use crate::domain::ports::{PasswordHasher, UserFieldUpdate, UserStore};
use crate::domain::role::Role;
use crate::domain::user::{DisplayName, EmailAddress, User, UserId, UserRecord};

/// Validated field set for provisioning a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: EmailAddress,
    pub password: Zeroizing<String>,
    pub role: Role,
    /// Optional display name; defaults to the email local part.
    pub name: Option<DisplayName>,
}

/// Validated field set for a superadmin-initiated update. `None` leaves the
/// field untouched.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub name: Option<DisplayName>,
    pub email: Option<EmailAddress>,
    pub role: Option<Role>,
    pub password: Option<Zeroizing<String>>,
}

/// User provisioning over a [`UserStore`].
#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserStore>,
    hasher: Arc<dyn PasswordHasher>,
}

impl UserService {
    /// Wire the service from its collaborators.
    pub fn new(users: Arc<dyn UserStore>, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self { users, hasher }
    }

    /// Provision a subadmin or agent account.
    pub async fn create(&self, ctx: &CallerContext, new_user: NewUser) -> Result<User, Error> {
        authorize(ctx, Operation::CreateUser)?;
        require_provisionable(new_user.role)?;

        let name = match new_user.name {
            Some(name) => name,
            None => DisplayName::new(new_user.email.local_part())
                .map_err(|err| Error::invalid_request(err.to_string()))?,
        };
        let password_hash = self.hasher.hash(new_user.password.as_str())?;
        let user = User::new(UserId::random(), name, new_user.email, new_user.role);
        self.users
            .insert(UserRecord::new(user.clone(), password_hash))
            .await?;
        Ok(user)
    }

    /// List every subadmin and agent. Superadmins never appear in the
    /// management table.
    pub async fn list(&self, ctx: &CallerContext) -> Result<Vec<User>, Error> {
        authorize(ctx, Operation::ListUsers)?;
        Ok(self.users.list_excluding_role(Role::Superadmin).await?)
    }

    /// Apply a partial update to an existing user.
    pub async fn update(
        &self,
        ctx: &CallerContext,
        id: &UserId,
        changes: UserChanges,
    ) -> Result<User, Error> {
        authorize(ctx, Operation::UpdateUser)?;
        if let Some(role) = changes.role {
            require_provisionable(role)?;
        }

        let password_hash = changes
            .password
            .map(|password| self.hasher.hash(password.as_str()))
            .transpose()?;
        let fields = UserFieldUpdate {
            name: changes.name,
            email: changes.email,
            role: changes.role,
            password_hash,
        };
        self.users
            .update(id, fields)
            .await?
            .ok_or_else(|| Error::not_found(format!("no user with id {id}")))
    }

    /// Remove a user account.
    pub async fn delete(&self, ctx: &CallerContext, id: &UserId) -> Result<(), Error> {
        authorize(ctx, Operation::DeleteUser)?;
        if self.users.delete(id).await? {
            Ok(())
        } else {
            Err(Error::not_found(format!("no user with id {id}")))
        }
    }
}

fn require_provisionable(role: Role) -> Result<(), Error> {
    if Role::PROVISIONABLE.contains(&role) {
        Ok(())
    } else {
        Err(Error::invalid_request(
            "role must be subadmin or agent".to_owned(),
        ))
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::error::ErrorCode;
    use crate::domain::ports::{MockPasswordHasher, MockUserStore, UserStoreError};
    use crate::domain::user::PasswordHash;
    use rstest::rstest;

    fn service(users: MockUserStore, hasher: MockPasswordHasher) -> UserService {
        UserService::new(Arc::new(users), Arc::new(hasher))
    }

    fn caller(role: Role) -> CallerContext {
        CallerContext::new(UserId::random(), role)
    }

    fn new_user(role: Role, name: Option<&str>) -> NewUser {
        NewUser {
            email: EmailAddress::new("agent.one@crm.example").expect("email"),
            password: Zeroizing::new("hunter2hunter2".to_owned()),
            role,
            name: name.map(|n| DisplayName::new(n).expect("name")),
        }
    }

    fn stub_hasher() -> MockPasswordHasher {
        let mut hasher = MockPasswordHasher::new();
        hasher
            .expect_hash()
            .returning(|_| Ok(PasswordHash::new("$argon2id$stub")));
        hasher
    }

    #[rstest]
    #[case(Role::Subadmin)]
    #[case(Role::Agent)]
    #[tokio::test]
    async fn only_superadmins_may_provision(#[case] role: Role) {
        let mut users = MockUserStore::new();
        users.expect_insert().never();
        let err = service(users, MockPasswordHasher::new())
            .create(&caller(role), new_user(Role::Agent, None))
            .await
            .expect_err("non-superadmin must fail");
        assert_eq!(err.code(), ErrorCode::Forbidden);
    }

    #[tokio::test]
    async fn the_superadmin_role_cannot_be_provisioned() {
        let mut users = MockUserStore::new();
        users.expect_insert().never();
        let err = service(users, MockPasswordHasher::new())
            .create(&caller(Role::Superadmin), new_user(Role::Superadmin, None))
            .await
            .expect_err("superadmin role must be rejected");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }

    #[tokio::test]
    async fn display_name_defaults_to_the_email_local_part() {
        let mut users = MockUserStore::new();
        users.expect_insert().returning(|_| Ok(()));
        let user = service(users, stub_hasher())
            .create(&caller(Role::Superadmin), new_user(Role::Agent, None))
            .await
            .expect("create succeeds");
        assert_eq!(user.name().as_ref(), "agent.one");
        assert_eq!(user.role(), Role::Agent);
    }

    #[tokio::test]
    async fn duplicate_email_surfaces_as_conflict() {
        let mut users = MockUserStore::new();
        users.expect_insert().returning(|record| {
            Err(UserStoreError::DuplicateEmail {
                email: record.user().email().to_string(),
            })
        });
        let err = service(users, stub_hasher())
            .create(
                &caller(Role::Superadmin),
                new_user(Role::Subadmin, Some("Dup User")),
            )
            .await
            .expect_err("duplicate must fail");
        assert_eq!(err.code(), ErrorCode::Conflict);
    }

    #[tokio::test]
    async fn updating_a_missing_user_is_not_found() {
        let mut users = MockUserStore::new();
        users.expect_update().returning(|_, _| Ok(None));
        let err = service(users, stub_hasher())
            .update(
                &caller(Role::Superadmin),
                &UserId::random(),
                UserChanges::default(),
            )
            .await
            .expect_err("missing id must fail");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn role_changes_are_limited_to_provisionable_roles() {
        let mut users = MockUserStore::new();
        users.expect_update().never();
        let err = service(users, MockPasswordHasher::new())
            .update(
                &caller(Role::Superadmin),
                &UserId::random(),
                UserChanges {
                    role: Some(Role::Superadmin),
                    ..UserChanges::default()
                },
            )
            .await
            .expect_err("promotion to superadmin must be rejected");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }
}
