//! Lead data model.
//!
//! A lead is a sales contact tracked through a fixed status pipeline. Email
//! and phone are unique at the store boundary; `created_by` is provenance
//! only and never participates in access scoping.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::user::{EmailAddress, UserId};

/// Validation errors returned by the lead constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeadValidationError {
    EmptyId,
    InvalidId,
    EmptyName,
    EmptyPhone,
    InvalidPhone,
}

impl fmt::Display for LeadValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyId => write!(f, "lead id must not be empty"),
            Self::InvalidId => write!(f, "lead id must be a valid UUID"),
            Self::EmptyName => write!(f, "lead name must not be empty"),
            Self::EmptyPhone => write!(f, "phone number must not be empty"),
            Self::InvalidPhone => {
                write!(f, "phone number may only contain digits, spaces, and +-()")
            }
        }
    }
}

impl std::error::Error for LeadValidationError {}

/// Stable lead identifier stored as a UUID.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LeadId(Uuid);

impl LeadId {
    /// Validate and construct a [`LeadId`] from borrowed input.
    pub fn new(id: impl AsRef<str>) -> Result<Self, LeadValidationError> {
        let raw = id.as_ref();
        if raw.is_empty() {
            return Err(LeadValidationError::EmptyId);
        }
        if raw.trim() != raw {
            return Err(LeadValidationError::InvalidId);
        }
        let parsed = Uuid::parse_str(raw).map_err(|_| LeadValidationError::InvalidId)?;
        Ok(Self(parsed))
    }

    /// Generate a new random [`LeadId`].
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for LeadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<LeadId> for String {
    fn from(value: LeadId) -> Self {
        value.0.to_string()
    }
}

impl TryFrom<String> for LeadId {
    type Error = LeadValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Pipeline position of a lead.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
    ToSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum LeadStatus {
    /// Freshly captured, nobody has reached out yet.
    #[default]
    New,
    Contacted,
    Qualified,
    Lost,
    /// Converted; feeds the conversion rate.
    Won,
}

impl LeadStatus {
    /// Every status, in pipeline order. Dashboards report a count for each,
    /// zeroes included.
    pub const ALL: [Self; 5] = [
        Self::New,
        Self::Contacted,
        Self::Qualified,
        Self::Lost,
        Self::Won,
    ];
}

/// Error returned when parsing a lead status from string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseLeadStatusError;

impl fmt::Display for LeadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::New => f.write_str("new"),
            Self::Contacted => f.write_str("contacted"),
            Self::Qualified => f.write_str("qualified"),
            Self::Lost => f.write_str("lost"),
            Self::Won => f.write_str("won"),
        }
    }
}

impl fmt::Display for ParseLeadStatusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("status must be one of new, contacted, qualified, lost, or won")
    }
}

impl std::error::Error for ParseLeadStatusError {}

impl FromStr for LeadStatus {
    type Err = ParseLeadStatusError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "new" => Ok(Self::New),
            "contacted" => Ok(Self::Contacted),
            "qualified" => Ok(Self::Qualified),
            "lost" => Ok(Self::Lost),
            "won" => Ok(Self::Won),
            _ => Err(ParseLeadStatusError),
        }
    }
}

/// Contact phone number, unique at the store boundary.
///
/// Stored trimmed; allows digits, spaces, `+`, `-`, and parentheses.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Validate and construct a [`PhoneNumber`].
    pub fn new(phone: impl AsRef<str>) -> Result<Self, LeadValidationError> {
        let trimmed = phone.as_ref().trim();
        if trimmed.is_empty() {
            return Err(LeadValidationError::EmptyPhone);
        }
        let allowed = trimmed
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '+' | '-' | '(' | ')'));
        if !allowed || !trimmed.chars().any(|c| c.is_ascii_digit()) {
            return Err(LeadValidationError::InvalidPhone);
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for PhoneNumber {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<PhoneNumber> for String {
    fn from(value: PhoneNumber) -> Self {
        value.0
    }
}

impl TryFrom<String> for PhoneNumber {
    type Error = LeadValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// A tracked sales contact.
///
/// ## Invariants
/// - `status` is always one of the five [`LeadStatus`] values.
/// - `created_by` is set at creation and never changes.
/// - `updated_at` moves forward on every mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lead {
    id: LeadId,
    name: String,
    email: EmailAddress,
    phone: PhoneNumber,
    source: Option<String>,
    status: LeadStatus,
    tags: Vec<String>,
    notes: Vec<String>,
    assigned_to: Option<UserId>,
    created_by: UserId,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Validated field set for creating a lead.
#[derive(Debug, Clone)]
pub struct LeadDraft {
    pub name: String,
    pub email: EmailAddress,
    pub phone: PhoneNumber,
    pub source: Option<String>,
    pub status: LeadStatus,
    pub tags: Vec<String>,
    pub notes: Vec<String>,
    pub assigned_to: Option<UserId>,
}

impl LeadDraft {
    /// Build a draft with the defaults the store applies: status `new`, no
    /// tags, notes, or assignee.
    pub fn new(name: impl Into<String>, email: EmailAddress, phone: PhoneNumber) -> Self {
        Self {
            name: name.into(),
            email,
            phone,
            source: None,
            status: LeadStatus::default(),
            tags: Vec::new(),
            notes: Vec::new(),
            assigned_to: None,
        }
    }
}

/// Partial update applied to an existing lead.
///
/// `None` leaves a field untouched. `assigned_to` is doubly optional so an
/// explicit `null` can clear the assignment while an absent field keeps it.
#[derive(Debug, Clone, Default)]
pub struct LeadPatch {
    pub name: Option<String>,
    pub email: Option<EmailAddress>,
    pub phone: Option<PhoneNumber>,
    pub source: Option<String>,
    pub status: Option<LeadStatus>,
    pub tags: Option<Vec<String>>,
    pub notes: Option<Vec<String>>,
    pub assigned_to: Option<Option<UserId>>,
}

impl Lead {
    /// Materialise a draft into a lead owned by `created_by`.
    pub fn from_draft(
        id: LeadId,
        draft: LeadDraft,
        created_by: UserId,
        now: DateTime<Utc>,
    ) -> Result<Self, LeadValidationError> {
        let name = draft.name.trim().to_owned();
        if name.is_empty() {
            return Err(LeadValidationError::EmptyName);
        }
        Ok(Self {
            id,
            name,
            email: draft.email,
            phone: draft.phone,
            source: draft.source,
            status: draft.status,
            tags: draft.tags,
            notes: draft.notes,
            assigned_to: draft.assigned_to,
            created_by,
            created_at: now,
            updated_at: now,
        })
    }

    /// Apply a patch, returning the updated lead with `updated_at` advanced.
    pub fn apply(mut self, patch: LeadPatch, now: DateTime<Utc>) -> Result<Self, LeadValidationError> {
        if let Some(name) = patch.name {
            let name = name.trim().to_owned();
            if name.is_empty() {
                return Err(LeadValidationError::EmptyName);
            }
            self.name = name;
        }
        if let Some(email) = patch.email {
            self.email = email;
        }
        if let Some(phone) = patch.phone {
            self.phone = phone;
        }
        if let Some(source) = patch.source {
            self.source = Some(source);
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(tags) = patch.tags {
            self.tags = tags;
        }
        if let Some(notes) = patch.notes {
            self.notes = notes;
        }
        if let Some(assigned_to) = patch.assigned_to {
            self.assigned_to = assigned_to;
        }
        self.updated_at = now;
        Ok(self)
    }

    /// Stable lead identifier.
    pub fn id(&self) -> &LeadId {
        &self.id
    }

    /// Contact name.
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Contact email, unique across leads.
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Contact phone, unique across leads.
    pub fn phone(&self) -> &PhoneNumber {
        &self.phone
    }

    /// Where the lead came from, free text.
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// Pipeline position.
    pub fn status(&self) -> LeadStatus {
        self.status
    }

    /// Free-form labels, in insertion order.
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Free-form notes, in insertion order.
    pub fn notes(&self) -> &[String] {
        &self.notes
    }

    /// Agent currently responsible, if any.
    pub fn assigned_to(&self) -> Option<&UserId> {
        self.assigned_to.as_ref()
    }

    /// Who created the lead. Provenance only, never used for scoping.
    pub fn created_by(&self) -> &UserId {
        &self.created_by
    }

    /// Creation instant.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Last mutation instant.
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}
