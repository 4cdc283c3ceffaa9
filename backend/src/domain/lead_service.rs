//! Lead CRUD use-cases, every one gated by the access policy.
//!
//! The service authorises first, then threads the returned scope into each
//! store call. The store never re-derives authorisation and never sees an
//! agent query without the assignment constraint.

use std::sync::Arc;

use mockable::Clock;
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::error::Error;
use crate::domain::lead::{Lead, LeadDraft, LeadId, LeadPatch, LeadStatus};
use crate::domain::policy::{CallerContext, Operation, authorize};
use crate::domain::ports::{LeadFilter, LeadSort, LeadStore, LeadStoreError};

/// Result of a bulk import: rows that landed and rows that did not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImportOutcome {
    pub imported: u64,
    pub failures: Vec<ImportFailure>,
}

/// A row the import skipped, with the line it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImportFailure {
    pub line: u64,
    pub reason: String,
}

/// Lead operations over a [`LeadStore`].
#[derive(Clone)]
pub struct LeadService {
    leads: Arc<dyn LeadStore>,
    clock: Arc<dyn Clock>,
}

impl LeadService {
    /// Wire the service from its collaborators.
    pub fn new(leads: Arc<dyn LeadStore>, clock: Arc<dyn Clock>) -> Self {
        Self { leads, clock }
    }

    /// Create a lead owned by the caller.
    pub async fn create(&self, ctx: &CallerContext, draft: LeadDraft) -> Result<Lead, Error> {
        authorize(ctx, Operation::CreateLead)?;
        let lead = Lead::from_draft(
            LeadId::random(),
            draft,
            ctx.user_id().clone(),
            self.clock.utc(),
        )
        .map_err(|err| Error::invalid_request(err.to_string()))?;
        self.leads.insert(lead.clone()).await?;
        Ok(lead)
    }

    /// List leads visible to the caller, optionally narrowed by status.
    pub async fn list(
        &self,
        ctx: &CallerContext,
        status: Option<LeadStatus>,
    ) -> Result<Vec<Lead>, Error> {
        let scope = authorize(ctx, Operation::ListLeads)?;
        let filter = LeadFilter {
            status,
            ..LeadFilter::default()
        }
        .scoped(&scope);
        Ok(self.leads.find_many(&filter, LeadSort::CreatedAtDesc).await?)
    }

    /// List leads assigned to the caller. Open to every role; the filter
    /// pins `assigned_to` to the caller regardless of scope, so an admin's
    /// "mine" view behaves like an agent's.
    pub async fn list_assigned(&self, ctx: &CallerContext) -> Result<Vec<Lead>, Error> {
        let scope = authorize(ctx, Operation::ListAssignedLeads)?;
        let filter = LeadFilter {
            assigned_to: Some(ctx.user_id().clone()),
            status: None,
        }
        .scoped(&scope);
        Ok(self.leads.find_many(&filter, LeadSort::CreatedAtDesc).await?)
    }

    /// Apply a partial update to an existing lead.
    pub async fn update(
        &self,
        ctx: &CallerContext,
        id: &LeadId,
        patch: LeadPatch,
    ) -> Result<Lead, Error> {
        authorize(ctx, Operation::UpdateLead)?;
        self.leads
            .update_by_id(id, patch, self.clock.utc())
            .await?
            .ok_or_else(|| Error::not_found(format!("no lead with id {id}")))
    }

    /// Delete a lead. Deleting a missing id fails with `not_found`, and so
    /// does deleting it again.
    pub async fn delete(&self, ctx: &CallerContext, id: &LeadId) -> Result<(), Error> {
        authorize(ctx, Operation::DeleteLead)?;
        if self.leads.delete_by_id(id).await? {
            Ok(())
        } else {
            Err(Error::not_found(format!("no lead with id {id}")))
        }
    }

    /// Fetch every lead in scope for a tabular export, oldest first.
    pub async fn export(&self, ctx: &CallerContext) -> Result<Vec<Lead>, Error> {
        let scope = authorize(ctx, Operation::ExportLeads)?;
        let filter = LeadFilter::default().scoped(&scope);
        Ok(self.leads.find_many(&filter, LeadSort::CreatedAtAsc).await?)
    }

    /// Bulk-insert parsed rows. Rows colliding on email or phone are
    /// reported, not fatal; a store outage aborts the batch.
    pub async fn import(
        &self,
        ctx: &CallerContext,
        rows: Vec<(u64, LeadDraft)>,
    ) -> Result<ImportOutcome, Error> {
        authorize(ctx, Operation::ImportLeads)?;
        let mut imported = 0;
        let mut failures = Vec::new();
        for (line, draft) in rows {
            let lead = match Lead::from_draft(
                LeadId::random(),
                draft,
                ctx.user_id().clone(),
                self.clock.utc(),
            ) {
                Ok(lead) => lead,
                Err(err) => {
                    failures.push(ImportFailure {
                        line,
                        reason: err.to_string(),
                    });
                    continue;
                }
            };
            match self.leads.insert(lead).await {
                Ok(()) => imported += 1,
                Err(
                    err @ (LeadStoreError::DuplicateEmail { .. }
                    | LeadStoreError::DuplicatePhone { .. }),
                ) => failures.push(ImportFailure {
                    line,
                    reason: err.to_string(),
                }),
                Err(err @ LeadStoreError::Unavailable { .. }) => return Err(err.into()),
            }
        }
        Ok(ImportOutcome { imported, failures })
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::error::ErrorCode;
    use crate::domain::ports::MockLeadStore;
    use crate::domain::role::Role;
    use crate::domain::user::{EmailAddress, UserId};
    use crate::domain::lead::PhoneNumber;
    use chrono::{DateTime, Local, Utc};
    use rstest::rstest;

    struct FixedClock(DateTime<Utc>);

    impl Clock for FixedClock {
        fn local(&self) -> DateTime<Local> {
            self.0.with_timezone(&Local)
        }

        fn utc(&self) -> DateTime<Utc> {
            self.0
        }
    }

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).expect("timestamp")
    }

    fn service(store: MockLeadStore) -> LeadService {
        LeadService::new(Arc::new(store), Arc::new(FixedClock(now())))
    }

    fn caller(role: Role) -> CallerContext {
        CallerContext::new(UserId::random(), role)
    }

    fn draft(email: &str, phone: &str) -> LeadDraft {
        LeadDraft::new(
            "Grace Hopper",
            EmailAddress::new(email).expect("email"),
            PhoneNumber::new(phone).expect("phone"),
        )
    }

    #[tokio::test]
    async fn agents_may_not_create_leads() {
        let mut store = MockLeadStore::new();
        store.expect_insert().never();
        let err = service(store)
            .create(&caller(Role::Agent), draft("a@b.example", "555 0100"))
            .await
            .expect_err("agent create must fail");
        assert_eq!(err.code(), ErrorCode::Forbidden);
    }

    #[tokio::test]
    async fn created_leads_carry_provenance_and_timestamps() {
        let mut store = MockLeadStore::new();
        store.expect_insert().returning(|_| Ok(()));
        let ctx = caller(Role::Subadmin);
        let lead = service(store)
            .create(&ctx, draft("a@b.example", "555 0100"))
            .await
            .expect("create succeeds");
        assert_eq!(lead.created_by(), ctx.user_id());
        assert_eq!(lead.created_at(), now());
    }

    #[tokio::test]
    async fn agent_listing_is_pinned_to_their_assignments() {
        let ctx = caller(Role::Agent);
        let caller_id = ctx.user_id().clone();
        let mut store = MockLeadStore::new();
        store
            .expect_find_many()
            .withf(move |filter, sort| {
                filter.assigned_to.as_ref() == Some(&caller_id)
                    && *sort == LeadSort::CreatedAtDesc
            })
            .returning(|_, _| Ok(Vec::new()));
        let leads = service(store)
            .list_assigned(&ctx)
            .await
            .expect("listing succeeds");
        assert!(leads.is_empty());
    }

    #[tokio::test]
    async fn admin_mine_view_is_also_pinned_to_the_caller() {
        let ctx = caller(Role::Superadmin);
        let caller_id = ctx.user_id().clone();
        let mut store = MockLeadStore::new();
        store
            .expect_find_many()
            .withf(move |filter, _| filter.assigned_to.as_ref() == Some(&caller_id))
            .returning(|_, _| Ok(Vec::new()));
        service(store)
            .list_assigned(&ctx)
            .await
            .expect("listing succeeds");
    }

    #[rstest]
    #[case(Role::Agent)]
    #[tokio::test]
    async fn unscoped_listing_is_forbidden_for_agents(#[case] role: Role) {
        let store = MockLeadStore::new();
        let err = service(store)
            .list(&caller(role), None)
            .await
            .expect_err("agent list must fail");
        assert_eq!(err.code(), ErrorCode::Forbidden);
    }

    #[tokio::test]
    async fn deleting_a_missing_lead_is_not_found_every_time() {
        let mut store = MockLeadStore::new();
        store.expect_delete_by_id().times(2).returning(|_| Ok(false));
        let svc = service(store);
        let ctx = caller(Role::Superadmin);
        let id = LeadId::random();
        for _ in 0..2 {
            let err = svc
                .delete(&ctx, &id)
                .await
                .expect_err("missing id must fail");
            assert_eq!(err.code(), ErrorCode::NotFound);
        }
    }

    #[tokio::test]
    async fn import_reports_duplicate_rows_without_aborting() {
        let mut store = MockLeadStore::new();
        let mut first = true;
        store.expect_insert().times(2).returning(move |lead| {
            if first {
                first = false;
                Ok(())
            } else {
                Err(LeadStoreError::DuplicateEmail {
                    email: lead.email().to_string(),
                })
            }
        });
        let outcome = service(store)
            .import(
                &caller(Role::Subadmin),
                vec![
                    (2, draft("one@crm.example", "555 0101")),
                    (3, draft("one@crm.example", "555 0102")),
                ],
            )
            .await
            .expect("import completes");
        assert_eq!(outcome.imported, 1);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].line, 3);
    }
}
