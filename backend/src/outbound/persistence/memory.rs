//! In-memory store adapters.
//!
//! The stores are the system's only shared mutable state; a `RwLock` per
//! store gives each operation the atomicity the domain assumes. Uniqueness
//! of user email and of lead email/phone is enforced here, at the store
//! boundary, exactly like a database unique index would.

use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::lead::{Lead, LeadId, LeadPatch, LeadStatus};
use crate::domain::ports::{
    LeadFilter, LeadSort, LeadStore, LeadStoreError, UserFieldUpdate, UserStore, UserStoreError,
};
use crate::domain::role::Role;
use crate::domain::user::{EmailAddress, User, UserId, UserRecord};

/// Credential store backed by a process-local map.
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    rows: RwLock<HashMap<UserId, UserRecord>>,
}

impl InMemoryUserStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(
        &self,
    ) -> Result<std::sync::RwLockReadGuard<'_, HashMap<UserId, UserRecord>>, UserStoreError> {
        self.rows.read().map_err(|_| UserStoreError::Unavailable {
            message: "user store lock poisoned".to_owned(),
        })
    }

    fn write(
        &self,
    ) -> Result<std::sync::RwLockWriteGuard<'_, HashMap<UserId, UserRecord>>, UserStoreError> {
        self.rows.write().map_err(|_| UserStoreError::Unavailable {
            message: "user store lock poisoned".to_owned(),
        })
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn insert(&self, record: UserRecord) -> Result<(), UserStoreError> {
        let mut rows = self.write()?;
        if rows
            .values()
            .any(|existing| existing.user().email() == record.user().email())
        {
            return Err(UserStoreError::DuplicateEmail {
                email: record.user().email().to_string(),
            });
        }
        rows.insert(record.user().id().clone(), record);
        Ok(())
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<UserRecord>, UserStoreError> {
        let rows = self.read()?;
        Ok(rows
            .values()
            .find(|record| record.user().email() == email)
            .cloned())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<UserRecord>, UserStoreError> {
        Ok(self.read()?.get(id).cloned())
    }

    async fn update(
        &self,
        id: &UserId,
        fields: UserFieldUpdate,
    ) -> Result<Option<User>, UserStoreError> {
        let mut rows = self.write()?;
        let Some(record) = rows.get(id) else {
            return Ok(None);
        };
        if let Some(email) = &fields.email
            && rows
                .iter()
                .any(|(other_id, other)| other_id != id && other.user().email() == email)
        {
            return Err(UserStoreError::DuplicateEmail {
                email: email.to_string(),
            });
        }

        let (user, password_hash) = record.clone().into_parts();
        let updated = User::new(
            user.id().clone(),
            fields.name.unwrap_or_else(|| user.name().clone()),
            fields.email.unwrap_or_else(|| user.email().clone()),
            fields.role.unwrap_or_else(|| user.role()),
        );
        let password_hash = fields.password_hash.unwrap_or(password_hash);
        rows.insert(id.clone(), UserRecord::new(updated.clone(), password_hash));
        Ok(Some(updated))
    }

    async fn delete(&self, id: &UserId) -> Result<bool, UserStoreError> {
        Ok(self.write()?.remove(id).is_some())
    }

    async fn list_excluding_role(&self, role: Role) -> Result<Vec<User>, UserStoreError> {
        let rows = self.read()?;
        let mut users: Vec<User> = rows
            .values()
            .filter(|record| record.user().role() != role)
            .map(|record| record.user().clone())
            .collect();
        users.sort_by(|a, b| a.email().as_ref().cmp(b.email().as_ref()));
        Ok(users)
    }
}

/// Lead store backed by a process-local map.
#[derive(Debug, Default)]
pub struct InMemoryLeadStore {
    rows: RwLock<HashMap<LeadId, Lead>>,
}

impl InMemoryLeadStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(
        &self,
    ) -> Result<std::sync::RwLockReadGuard<'_, HashMap<LeadId, Lead>>, LeadStoreError> {
        self.rows.read().map_err(|_| LeadStoreError::Unavailable {
            message: "lead store lock poisoned".to_owned(),
        })
    }

    fn write(
        &self,
    ) -> Result<std::sync::RwLockWriteGuard<'_, HashMap<LeadId, Lead>>, LeadStoreError> {
        self.rows.write().map_err(|_| LeadStoreError::Unavailable {
            message: "lead store lock poisoned".to_owned(),
        })
    }

    fn check_unique(
        rows: &HashMap<LeadId, Lead>,
        candidate: &Lead,
        skip: Option<&LeadId>,
    ) -> Result<(), LeadStoreError> {
        for (id, existing) in rows {
            if skip == Some(id) {
                continue;
            }
            if existing.email() == candidate.email() {
                return Err(LeadStoreError::DuplicateEmail {
                    email: candidate.email().to_string(),
                });
            }
            if existing.phone() == candidate.phone() {
                return Err(LeadStoreError::DuplicatePhone {
                    phone: candidate.phone().to_string(),
                });
            }
        }
        Ok(())
    }
}

#[async_trait]
impl LeadStore for InMemoryLeadStore {
    async fn insert(&self, lead: Lead) -> Result<(), LeadStoreError> {
        let mut rows = self.write()?;
        Self::check_unique(&rows, &lead, None)?;
        rows.insert(lead.id().clone(), lead);
        Ok(())
    }

    async fn find_by_id(&self, id: &LeadId) -> Result<Option<Lead>, LeadStoreError> {
        Ok(self.read()?.get(id).cloned())
    }

    async fn find_many(
        &self,
        filter: &LeadFilter,
        sort: LeadSort,
    ) -> Result<Vec<Lead>, LeadStoreError> {
        let rows = self.read()?;
        let mut leads: Vec<Lead> = rows
            .values()
            .filter(|lead| filter.matches(lead))
            .cloned()
            .collect();
        leads.sort_by(|a, b| {
            let ordering = a
                .created_at()
                .cmp(&b.created_at())
                .then_with(|| a.id().as_uuid().cmp(b.id().as_uuid()));
            match sort {
                LeadSort::CreatedAtAsc => ordering,
                LeadSort::CreatedAtDesc => ordering.reverse(),
            }
        });
        Ok(leads)
    }

    async fn update_by_id(
        &self,
        id: &LeadId,
        patch: LeadPatch,
        now: DateTime<Utc>,
    ) -> Result<Option<Lead>, LeadStoreError> {
        let mut rows = self.write()?;
        let Some(existing) = rows.get(id).cloned() else {
            return Ok(None);
        };
        let updated = existing
            .apply(patch, now)
            .map_err(|err| LeadStoreError::InvalidPatch {
                message: err.to_string(),
            })?;
        Self::check_unique(&rows, &updated, Some(id))?;
        rows.insert(id.clone(), updated.clone());
        Ok(Some(updated))
    }

    async fn delete_by_id(&self, id: &LeadId) -> Result<bool, LeadStoreError> {
        Ok(self.write()?.remove(id).is_some())
    }

    async fn count_by_status(
        &self,
        filter: &LeadFilter,
    ) -> Result<BTreeMap<LeadStatus, u64>, LeadStoreError> {
        let rows = self.read()?;
        let mut counts = BTreeMap::new();
        for lead in rows.values().filter(|lead| filter.matches(lead)) {
            *counts.entry(lead.status()).or_insert(0) += 1;
        }
        Ok(counts)
    }
}
