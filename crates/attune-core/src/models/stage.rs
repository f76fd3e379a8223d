//! Stage model definition and related functionality.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use super::StageStatus;

/// Represents an individual stage within a healing plan.
///
/// Everything but `status`, `audio_ref` and `updated_at` is immutable after
/// creation; the stage sequence of a plan is fixed when the plan is created.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Stage {
    /// Unique identifier for the stage
    pub id: u64,

    /// ID of the parent plan
    pub plan_id: u64,

    /// Brief title of the stage
    pub title: String,

    /// Detailed multi-line description of the stage
    pub description: Option<String>,

    /// Expected playback length in seconds, always greater than zero
    pub duration_secs: u32,

    /// Calendar gate: the stage cannot unlock before this instant,
    /// regardless of prerequisite completion. Absent means no gate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_at: Option<Timestamp>,

    /// Handle to the stage's audio in the content store, set once the
    /// content source has produced it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_ref: Option<String>,

    /// Current status of the stage
    pub status: StageStatus,

    /// Order of the stage within the plan (0-indexed)
    pub order: u32,

    /// Timestamp when the stage was created (UTC)
    pub created_at: Timestamp,

    /// Timestamp when the stage was last updated (UTC)
    pub updated_at: Timestamp,
}

impl Stage {
    /// Whether the listener has finished this stage.
    pub fn is_completed(&self) -> bool {
        self.status == StageStatus::Completed
    }
}
