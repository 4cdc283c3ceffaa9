//! Access policy: the single source of truth for who may do what.
//!
//! Every guarded operation funnels through [`authorize`], which consults one
//! closed permission table and hands back the data scope the caller is
//! allowed to see. Services never re-derive authorisation and stores never
//! see an unscoped query from an agent.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::Error;
use super::lead::Lead;
use super::role::Role;
use super::user::UserId;

/// Guarded operations recognised by the policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    CreateLead,
    /// Unscoped listing across every lead.
    ListLeads,
    /// Listing restricted to leads assigned to the caller.
    ListAssignedLeads,
    UpdateLead,
    DeleteLead,
    ExportLeads,
    ImportLeads,
    ViewDashboard,
    CreateUser,
    ListUsers,
    UpdateUser,
    DeleteUser,
}

impl Operation {
    /// Every operation, for table sweeps in tests.
    pub const ALL: [Self; 12] = [
        Self::CreateLead,
        Self::ListLeads,
        Self::ListAssignedLeads,
        Self::UpdateLead,
        Self::DeleteLead,
        Self::ExportLeads,
        Self::ImportLeads,
        Self::ViewDashboard,
        Self::CreateUser,
        Self::ListUsers,
        Self::UpdateUser,
        Self::DeleteUser,
    ];
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::CreateLead => "create lead",
            Self::ListLeads => "list leads",
            Self::ListAssignedLeads => "list assigned leads",
            Self::UpdateLead => "update lead",
            Self::DeleteLead => "delete lead",
            Self::ExportLeads => "export leads",
            Self::ImportLeads => "import leads",
            Self::ViewDashboard => "view dashboard",
            Self::CreateUser => "create user",
            Self::ListUsers => "list users",
            Self::UpdateUser => "update user",
            Self::DeleteUser => "delete user",
        };
        f.write_str(name)
    }
}

/// Authenticated caller identity threaded explicitly through every handler
/// and service call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerContext {
    user_id: UserId,
    role: Role,
}

impl CallerContext {
    /// Build a context from a verified session.
    pub fn new(user_id: UserId, role: Role) -> Self {
        Self { user_id, role }
    }

    /// Caller identity.
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Caller role.
    pub fn role(&self) -> Role {
        self.role
    }
}

/// Predicate restricting which leads a query may touch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "user_id")]
pub enum LeadScope {
    /// No restriction; superadmin and subadmin visibility.
    All,
    /// Only leads whose `assigned_to` equals the given user.
    AssignedTo(UserId),
}

impl LeadScope {
    /// Whether a single lead falls inside the scope.
    pub fn permits(&self, lead: &Lead) -> bool {
        match self {
            Self::All => true,
            Self::AssignedTo(user_id) => lead.assigned_to() == Some(user_id),
        }
    }

    /// The assignee constraint, if the scope carries one.
    pub fn assigned_to(&self) -> Option<&UserId> {
        match self {
            Self::All => None,
            Self::AssignedTo(user_id) => Some(user_id),
        }
    }
}

/// The permission table. One match arm per row of the role/operation grid;
/// anything not listed here is denied.
pub const fn permits(role: Role, operation: Operation) -> bool {
    match operation {
        Operation::CreateLead
        | Operation::ListLeads
        | Operation::UpdateLead
        | Operation::DeleteLead
        | Operation::ExportLeads
        | Operation::ImportLeads => matches!(role, Role::Superadmin | Role::Subadmin),
        Operation::ListAssignedLeads | Operation::ViewDashboard => true,
        Operation::CreateUser
        | Operation::ListUsers
        | Operation::UpdateUser
        | Operation::DeleteUser => matches!(role, Role::Superadmin),
    }
}

/// Authorise `operation` for the caller, returning the scope every
/// subsequent store call must honour.
///
/// Agents are always pinned to their own assignments; superadmin and
/// subadmin always see the unscoped set. Denials carry the operation name so
/// the client can tell which call was refused.
///
/// # Examples
/// ```
/// use backend::domain::{authorize, CallerContext, Operation, Role, UserId};
///
/// let agent = CallerContext::new(UserId::random(), Role::Agent);
/// let scope = authorize(&agent, Operation::ViewDashboard).unwrap();
/// assert_eq!(scope.assigned_to(), Some(agent.user_id()));
/// assert!(authorize(&agent, Operation::CreateLead).is_err());
/// ```
pub fn authorize(ctx: &CallerContext, operation: Operation) -> Result<LeadScope, Error> {
    if !permits(ctx.role(), operation) {
        return Err(Error::forbidden(format!(
            "role {} may not {operation}",
            ctx.role()
        )));
    }
    Ok(scope_for(ctx))
}

fn scope_for(ctx: &CallerContext) -> LeadScope {
    match ctx.role() {
        Role::Superadmin | Role::Subadmin => LeadScope::All,
        Role::Agent => LeadScope::AssignedTo(ctx.user_id().clone()),
    }
}
