//! Port abstraction for lead persistence adapters and their errors.
//!
//! Adapters enforce email and phone uniqueness; callers always pass a filter
//! that already carries the access-policy scope, so the store never decides
//! who may see what.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

use crate::domain::lead::{Lead, LeadId, LeadPatch, LeadStatus};
use crate::domain::policy::LeadScope;
use crate::domain::user::UserId;

/// Persistence errors raised by lead-store adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LeadStoreError {
    /// The store could not be reached or the call failed mid-flight.
    #[error("lead store unavailable: {message}")]
    Unavailable { message: String },
    /// Another lead already owns this email.
    #[error("a lead with email {email} already exists")]
    DuplicateEmail { email: String },
    /// Another lead already owns this phone number.
    #[error("a lead with phone {phone} already exists")]
    DuplicatePhone { phone: String },
    /// A patch produced an invalid row (e.g. a blank name).
    #[error("invalid update: {message}")]
    InvalidPatch { message: String },
}

impl From<LeadStoreError> for crate::domain::error::Error {
    fn from(err: LeadStoreError) -> Self {
        match err {
            LeadStoreError::Unavailable { .. } => Self::internal(err.to_string()),
            LeadStoreError::DuplicateEmail { .. } | LeadStoreError::DuplicatePhone { .. } => {
                Self::conflict(err.to_string())
            }
            LeadStoreError::InvalidPatch { .. } => Self::invalid_request(err.to_string()),
        }
    }
}

/// Row predicate for queries. Every field is conjunctive; an empty filter
/// matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeadFilter {
    pub assigned_to: Option<UserId>,
    pub status: Option<LeadStatus>,
}

impl LeadFilter {
    /// Narrow the filter with a policy scope. A scoped caller's constraint
    /// always wins over whatever the filter held before.
    pub fn scoped(mut self, scope: &LeadScope) -> Self {
        if let Some(user_id) = scope.assigned_to() {
            self.assigned_to = Some(user_id.clone());
        }
        self
    }

    /// Whether `lead` satisfies every constraint.
    pub fn matches(&self, lead: &Lead) -> bool {
        if let Some(assigned_to) = &self.assigned_to
            && lead.assigned_to() != Some(assigned_to)
        {
            return false;
        }
        if let Some(status) = self.status
            && lead.status() != status
        {
            return false;
        }
        true
    }
}

/// Result ordering for [`LeadStore::find_many`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeadSort {
    /// Newest first; dashboards and listings default to this.
    CreatedAtDesc,
    /// Oldest first; export uses this so files read chronologically.
    CreatedAtAsc,
}

/// Domain port over lead persistence.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LeadStore: Send + Sync {
    /// Insert a new lead. Fails with a duplicate error when email or phone
    /// is taken.
    async fn insert(&self, lead: Lead) -> Result<(), LeadStoreError>;

    /// Fetch a lead by identifier.
    async fn find_by_id(&self, id: &LeadId) -> Result<Option<Lead>, LeadStoreError>;

    /// Fetch every lead matching `filter`, ordered by `sort`.
    async fn find_many(
        &self,
        filter: &LeadFilter,
        sort: LeadSort,
    ) -> Result<Vec<Lead>, LeadStoreError>;

    /// Apply a patch, returning the updated lead or `None` when the id does
    /// not exist. Duplicate email/phone introduced by the patch fails the
    /// same way as on insert.
    async fn update_by_id(
        &self,
        id: &LeadId,
        patch: LeadPatch,
        now: DateTime<Utc>,
    ) -> Result<Option<Lead>, LeadStoreError>;

    /// Delete a lead, reporting whether it existed.
    async fn delete_by_id(&self, id: &LeadId) -> Result<bool, LeadStoreError>;

    /// Count leads matching `filter`, grouped by status. Statuses with no
    /// rows are absent; the aggregator fills in the zeroes.
    async fn count_by_status(
        &self,
        filter: &LeadFilter,
    ) -> Result<BTreeMap<LeadStatus, u64>, LeadStoreError>;
}
