//! Plan summary types and functionality.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use super::{Plan, PlanStatus};

/// Summary information about a plan with stage statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanSummary {
    /// Plan ID
    pub id: u64,
    /// Title of the plan
    pub title: String,
    /// Detailed multi-line description of the plan
    pub description: Option<String>,
    /// Plan status
    pub status: PlanStatus,
    /// Sum of all stage durations in seconds
    pub total_duration_secs: u32,
    /// Creation timestamp
    pub created_at: Timestamp,
    /// Last update timestamp
    pub updated_at: Timestamp,
    /// Total number of stages
    pub total_stages: u32,
    /// Number of completed stages
    pub completed_stages: u32,
    /// Number of stages not yet completed
    pub remaining_stages: u32,
}

impl From<&Plan> for PlanSummary {
    fn from(plan: &Plan) -> Self {
        let total_stages = plan.stages.len() as u32;
        let completed_stages = plan.completed_count() as u32;

        Self {
            id: plan.id,
            title: plan.title.clone(),
            description: plan.description.clone(),
            status: plan.status,
            total_duration_secs: plan.total_duration_secs,
            created_at: plan.created_at,
            updated_at: plan.updated_at,
            total_stages,
            completed_stages,
            remaining_stages: total_stages - completed_stages,
        }
    }
}
