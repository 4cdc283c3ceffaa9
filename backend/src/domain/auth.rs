//! Authentication primitives such as login credentials.
//!
//! Keep inbound payload parsing outside the domain by exposing constructors
//! that validate string inputs before a handler talks to a port or service.

use std::fmt;
use std::str::FromStr;

use zeroize::Zeroizing;

use super::role::Role;
use super::user::EmailAddress;

/// Domain error returned when login payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginValidationError {
    /// Email was missing or not shaped like an address.
    InvalidEmail,
    /// Password was blank.
    EmptyPassword,
    /// A claimed role was supplied but is not a canonical role name.
    UnknownRole,
}

impl fmt::Display for LoginValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidEmail => write!(f, "email must be a valid address"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
            Self::UnknownRole => {
                write!(f, "role must be one of superadmin, subadmin, or agent")
            }
        }
    }
}

impl std::error::Error for LoginValidationError {}

/// Validated login credentials used by authentication services.
///
/// ## Invariants
/// - `email` is normalised the way the credential store indexes it.
/// - `password` is non-empty but otherwise untouched, so whitespace a user
///   typed deliberately still compares correctly.
/// - `claimed_role`, when present, is a canonical role; the authenticator
///   rejects the login if it differs from the stored role.
///
/// # Examples
/// ```
/// use backend::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts("ada@example.com", "password", None).unwrap();
/// assert_eq!(creds.email().as_ref(), "ada@example.com");
/// assert!(creds.claimed_role().is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: EmailAddress,
    password: Zeroizing<String>,
    claimed_role: Option<Role>,
}

impl LoginCredentials {
    /// Construct credentials from raw email/password/role inputs.
    pub fn try_from_parts(
        email: &str,
        password: &str,
        claimed_role: Option<&str>,
    ) -> Result<Self, LoginValidationError> {
        let email = EmailAddress::new(email).map_err(|_| LoginValidationError::InvalidEmail)?;
        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }
        let claimed_role = claimed_role
            .map(Role::from_str)
            .transpose()
            .map_err(|_| LoginValidationError::UnknownRole)?;
        Ok(Self {
            email,
            password: Zeroizing::new(password.to_owned()),
            claimed_role,
        })
    }

    /// Email used for the credential-store lookup.
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Password string provided by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }

    /// Role the caller claims to hold, if any.
    pub fn claimed_role(&self) -> Option<Role> {
        self.claimed_role
    }
}
