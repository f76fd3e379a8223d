//! Plan model definition and related functionality.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use super::{PlanStatus, Stage};

/// Represents a complete healing plan with metadata and its ordered stages.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Plan {
    /// Unique identifier for the plan
    pub id: u64,

    /// Title of the plan
    pub title: String,

    /// Detailed multi-line description of the plan
    pub description: Option<String>,

    /// Status of the plan, derived from its stages
    #[serde(default)]
    pub status: PlanStatus,

    /// Sum of all stage durations in seconds, fixed at creation
    pub total_duration_secs: u32,

    /// Timestamp when the plan was created (UTC)
    pub created_at: Timestamp,

    /// Timestamp when the plan was last modified (UTC)
    pub updated_at: Timestamp,

    /// Ordered stages of the plan; the order is fixed at creation
    #[serde(default)]
    pub stages: Vec<Stage>,
}

impl Plan {
    /// Number of completed stages.
    pub fn completed_count(&self) -> usize {
        self.stages.iter().filter(|s| s.is_completed()).count()
    }

    /// Index of the next incomplete stage, which doubles as the progress
    /// counter. Equals `stages.len()` when every stage is completed.
    ///
    /// Always recomputed from stage statuses, never cached, so it cannot
    /// drift from the stages themselves.
    pub fn current_stage_index(&self) -> usize {
        self.completed_count()
    }

    /// Whether every stage of the plan has been completed.
    pub fn is_finished(&self) -> bool {
        !self.stages.is_empty() && self.stages.iter().all(Stage::is_completed)
    }

    /// The plan status implied by the current stage statuses.
    pub fn derived_status(&self) -> PlanStatus {
        if self.is_finished() {
            PlanStatus::Completed
        } else {
            PlanStatus::Active
        }
    }

    /// Finds a stage by its ID.
    pub fn stage_by_id(&self, stage_id: u64) -> Option<(usize, &Stage)> {
        self.stages
            .iter()
            .enumerate()
            .find(|(_, s)| s.id == stage_id)
    }
}
