//! Status enumerations for plans and stages.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Type-safe enumeration of plan statuses.
///
/// `Completed` and `Active` are derived from stage statuses and recomputed
/// after every mutation; they are never set independently. `Draft` exists for
/// plans assembled upstream before enrollment and does not occur in this
/// engine's own lifecycle.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PlanStatus {
    /// Plan is being assembled and is not yet enrolled
    Draft,

    /// Plan is enrolled and in progress
    #[default]
    Active,

    /// Every stage of the plan is completed
    Completed,
}

impl FromStr for PlanStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "draft" => Ok(PlanStatus::Draft),
            "active" => Ok(PlanStatus::Active),
            "completed" => Ok(PlanStatus::Completed),
            _ => Err(format!("Invalid plan status: {s}")),
        }
    }
}

impl PlanStatus {
    /// Convert to database string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanStatus::Draft => "draft",
            PlanStatus::Active => "active",
            PlanStatus::Completed => "completed",
        }
    }
}

/// Type-safe enumeration of stage statuses.
///
/// `Pending`, `Generating` and `Ready` track content preparation and are
/// written through the content-update path; the progression engine itself
/// only ever moves a stage to `Completed`, which is terminal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StageStatus {
    /// Stage audio has not been requested yet
    #[default]
    Pending,

    /// Stage audio is being generated
    Generating,

    /// Stage audio is available for playback
    Ready,

    /// Stage has been completed by the listener
    Completed,
}

impl FromStr for StageStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(StageStatus::Pending),
            "generating" => Ok(StageStatus::Generating),
            "ready" => Ok(StageStatus::Ready),
            "completed" | "done" => Ok(StageStatus::Completed),
            _ => Err(format!("Invalid stage status: {s}")),
        }
    }
}

impl StageStatus {
    /// Convert to database string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            StageStatus::Pending => "pending",
            StageStatus::Generating => "generating",
            StageStatus::Ready => "ready",
            StageStatus::Completed => "completed",
        }
    }

    /// Get status with consistent icon formatting for display.
    ///
    /// # Icons Used
    /// - `✓ Completed` - Checkmark for finished stages
    /// - `▶ Ready` - Play marker for stages with audio available
    /// - `… Generating` - Ellipsis while audio is prepared
    /// - `○ Pending` - Circle for stages not yet prepared
    pub fn with_icon(&self) -> &'static str {
        match self {
            StageStatus::Completed => "✓ Completed",
            StageStatus::Ready => "▶ Ready",
            StageStatus::Generating => "… Generating",
            StageStatus::Pending => "○ Pending",
        }
    }

    /// Whether the stage's audio can be played (content is available).
    ///
    /// Both `Ready` and `Completed` count: completed content stays playable
    /// so listeners can revisit it.
    pub fn is_playable(&self) -> bool {
        matches!(self, StageStatus::Ready | StageStatus::Completed)
    }

    /// Whether this status may transition to `next` through the content
    /// preparation path. Only forward moves along
    /// `pending → generating → ready` are allowed; `completed` is reserved
    /// for the progression engine and is terminal.
    pub fn can_become(&self, next: StageStatus) -> bool {
        matches!(
            (self, next),
            (StageStatus::Pending, StageStatus::Generating)
                | (StageStatus::Pending, StageStatus::Ready)
                | (StageStatus::Generating, StageStatus::Ready)
        )
    }
}
