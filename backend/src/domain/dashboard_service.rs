//! Dashboard aggregation over a scoped lead set.
//!
//! Read-only: the service authorises the caller, applies the returned scope,
//! and reduces the visible leads to the summary the dashboards render. An
//! agent's numbers therefore only ever describe their own assignments.

use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::dashboard::{
    AgentPerformance, DashboardStats, RECENT_LEADS_LIMIT, StatusCounts, conversion_rate,
};
use crate::domain::error::Error;
use crate::domain::lead::{Lead, LeadStatus};
use crate::domain::policy::{CallerContext, Operation, authorize};
use crate::domain::ports::{LeadFilter, LeadSort, LeadStore, UserStore};
use crate::domain::user::UserId;

/// Dashboard statistics over a [`LeadStore`], resolving assignee display
/// fields through the [`UserStore`].
#[derive(Clone)]
pub struct DashboardService {
    leads: Arc<dyn LeadStore>,
    users: Arc<dyn UserStore>,
}

impl DashboardService {
    /// Wire the service from its collaborators.
    pub fn new(leads: Arc<dyn LeadStore>, users: Arc<dyn UserStore>) -> Self {
        Self { leads, users }
    }

    /// Compute the summary statistics visible to the caller.
    pub async fn compute_stats(&self, ctx: &CallerContext) -> Result<DashboardStats, Error> {
        let scope = authorize(ctx, Operation::ViewDashboard)?;
        let filter = LeadFilter::default().scoped(&scope);

        let mut status_counts = StatusCounts::default();
        for (status, count) in self.leads.count_by_status(&filter).await? {
            status_counts.add(status, count);
        }
        let total_leads = status_counts.total();

        let leads = self.leads.find_many(&filter, LeadSort::CreatedAtDesc).await?;
        let agent_performance = self.resolve_performance(group_by_assignee(&leads)).await?;
        let recent_leads: Vec<Lead> = leads.into_iter().take(RECENT_LEADS_LIMIT).collect();

        Ok(DashboardStats {
            total_leads,
            conversion_rate: conversion_rate(total_leads, status_counts.won),
            status_counts,
            agent_performance,
            recent_leads,
        })
    }

    async fn resolve_performance(
        &self,
        groups: Vec<(UserId, PerformanceTally)>,
    ) -> Result<Vec<AgentPerformance>, Error> {
        let mut performance = Vec::with_capacity(groups.len());
        for (agent_id, tally) in groups {
            let (name, email) = match self.users.find_by_id(&agent_id).await? {
                Some(record) => (
                    record.user().name().to_string(),
                    record.user().email().to_string(),
                ),
                // Assignee was deleted; keep the row visible under its id.
                None => (agent_id.to_string(), String::new()),
            };
            performance.push(AgentPerformance {
                agent_id,
                name,
                email,
                total: tally.total,
                won: tally.won,
                new: tally.new,
            });
        }
        performance.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.name.cmp(&b.name)));
        Ok(performance)
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct PerformanceTally {
    total: u64,
    won: u64,
    new: u64,
}

/// Group leads by assignee, preserving first-seen order so the subsequent
/// sort is deterministic. Unassigned leads do not form a group.
fn group_by_assignee(leads: &[Lead]) -> Vec<(UserId, PerformanceTally)> {
    let mut order: Vec<UserId> = Vec::new();
    let mut tallies: HashMap<UserId, PerformanceTally> = HashMap::new();
    for lead in leads {
        let Some(agent_id) = lead.assigned_to() else {
            continue;
        };
        let tally = tallies.entry(agent_id.clone()).or_insert_with(|| {
            order.push(agent_id.clone());
            PerformanceTally::default()
        });
        tally.total += 1;
        match lead.status() {
            LeadStatus::Won => tally.won += 1,
            LeadStatus::New => tally.new += 1,
            _ => {}
        }
    }
    order
        .into_iter()
        .filter_map(|agent_id| {
            let tally = tallies.get(&agent_id).copied()?;
            Some((agent_id, tally))
        })
        .collect()
}
