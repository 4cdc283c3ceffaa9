//! Dashboard statistics types.
//!
//! Pure value types plus the conversion-rate arithmetic. The aggregation
//! itself lives in [`crate::domain::dashboard_service`]; keeping the maths
//! here makes the divide-by-zero guard trivially testable.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::lead::{Lead, LeadStatus};
use super::user::UserId;

/// How many recent leads a dashboard shows.
pub const RECENT_LEADS_LIMIT: usize = 5;

/// Per-status lead counts. One field per canonical status, so a response can
/// never omit a bucket: an empty scope reports five zeroes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusCounts {
    pub new: u64,
    pub contacted: u64,
    pub qualified: u64,
    pub lost: u64,
    pub won: u64,
}

impl StatusCounts {
    /// Bump the bucket for `status`.
    pub fn record(&mut self, status: LeadStatus) {
        match status {
            LeadStatus::New => self.new += 1,
            LeadStatus::Contacted => self.contacted += 1,
            LeadStatus::Qualified => self.qualified += 1,
            LeadStatus::Lost => self.lost += 1,
            LeadStatus::Won => self.won += 1,
        }
    }

    /// Add `count` to the bucket for `status`.
    pub fn add(&mut self, status: LeadStatus, count: u64) {
        match status {
            LeadStatus::New => self.new += count,
            LeadStatus::Contacted => self.contacted += count,
            LeadStatus::Qualified => self.qualified += count,
            LeadStatus::Lost => self.lost += count,
            LeadStatus::Won => self.won += count,
        }
    }

    /// Read the bucket for `status`.
    pub fn get(&self, status: LeadStatus) -> u64 {
        match status {
            LeadStatus::New => self.new,
            LeadStatus::Contacted => self.contacted,
            LeadStatus::Qualified => self.qualified,
            LeadStatus::Lost => self.lost,
            LeadStatus::Won => self.won,
        }
    }

    /// Sum across every bucket.
    pub fn total(&self) -> u64 {
        LeadStatus::ALL.iter().map(|status| self.get(*status)).sum()
    }
}

/// One agent's slice of the dashboard, with display fields resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AgentPerformance {
    /// The assignee the group keys on.
    #[schema(value_type = String, example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub agent_id: UserId,
    /// Resolved display name, or the id when the user record is gone.
    pub name: String,
    /// Resolved email, empty when the user record is gone.
    pub email: String,
    pub total: u64,
    pub won: u64,
    pub new: u64,
}

/// Summary statistics over a scoped lead set.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardStats {
    pub total_leads: u64,
    pub status_counts: StatusCounts,
    /// Sorted descending by `total`, name as tie-break.
    pub agent_performance: Vec<AgentPerformance>,
    /// The most recently created leads in scope, newest first, at most
    /// [`RECENT_LEADS_LIMIT`].
    pub recent_leads: Vec<Lead>,
    /// Won share of the scope as a percentage, one decimal place.
    pub conversion_rate: f64,
}

/// Won-lead share as a percentage rounded to one decimal.
///
/// Zero leads means a rate of zero; the guard is deliberate, not an
/// accident of arithmetic.
///
/// # Examples
/// ```
/// use backend::domain::conversion_rate;
///
/// assert_eq!(conversion_rate(0, 0), 0.0);
/// assert_eq!(conversion_rate(10, 3), 30.0);
/// ```
pub fn conversion_rate(total_leads: u64, won: u64) -> f64 {
    if total_leads == 0 {
        return 0.0;
    }
    let raw = (won as f64 / total_leads as f64) * 100.0;
    (raw * 10.0).round() / 10.0
}
