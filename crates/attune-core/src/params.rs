//! Parameter structures for Attune operations
//!
//! Shared parameter structures usable across different interfaces (CLI, MCP,
//! etc.) without framework-specific derives. Interface layers wrap these with
//! their own derives (clap `Args`, `schemars::JsonSchema`) and convert via
//! `From`/`Into`, keeping the core free of UI framework dependencies.
//!
//! Timestamps cross this boundary as RFC 3339 strings and are parsed during
//! validation, so every interface shares one validation path.

use jiff::Timestamp;

#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{
    error::{ProgressionError, Result},
    models::StageStatus,
};

/// Generic parameters for operations requiring just an ID.
///
/// Used for operations like show_plan, show_stage and plan_overview.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct Id {
    /// The ID of the resource to operate on
    pub id: u64,
}

/// Description of one stage supplied at plan creation.
///
/// A plan's stage sequence is fixed when the plan is created; there is no
/// operation that appends, removes or reorders stages afterwards.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct StageSpec {
    /// Title of the stage (required)
    pub title: String,
    /// Optional detailed description of the stage
    pub description: Option<String>,
    /// Expected playback length in seconds, must be greater than zero
    pub duration_secs: u32,
    /// Optional calendar gate as an RFC 3339 timestamp; the stage cannot
    /// unlock before this instant
    pub scheduled_at: Option<String>,
}

/// Parameters for creating a new plan with its full stage sequence.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct CreatePlan {
    /// Title of the plan (required)
    pub title: String,
    /// Optional detailed description of the plan
    pub description: Option<String>,
    /// Ordered stage sequence, at least one stage
    pub stages: Vec<StageSpec>,
}

impl CreatePlan {
    /// Validate creation parameters and parse stage schedules.
    ///
    /// Returns the parsed calendar gates in stage order.
    ///
    /// # Errors
    ///
    /// * `ProgressionError::InvalidInput` - empty/whitespace title, empty
    ///   stage list, a zero duration, or an unparseable schedule
    pub fn validate(&self) -> Result<Vec<Option<Timestamp>>> {
        if self.title.trim().is_empty() {
            return Err(ProgressionError::invalid_input("title")
                .with_reason("Plan title must not be empty"));
        }

        if self.stages.is_empty() {
            return Err(ProgressionError::invalid_input("stages")
                .with_reason("A plan requires at least one stage"));
        }

        let mut schedules = Vec::with_capacity(self.stages.len());
        for (index, spec) in self.stages.iter().enumerate() {
            if spec.title.trim().is_empty() {
                return Err(ProgressionError::invalid_input("stages")
                    .with_reason(format!("Stage {index} title must not be empty")));
            }
            if spec.duration_secs == 0 {
                return Err(ProgressionError::invalid_input("stages").with_reason(format!(
                    "Stage {index} duration must be greater than zero"
                )));
            }
            schedules.push(match &spec.scheduled_at {
                Some(raw) => Some(raw.parse::<Timestamp>().map_err(|e| {
                    ProgressionError::invalid_input("stages")
                        .with_reason(format!("Stage {index} schedule is not RFC 3339: {e}"))
                })?),
                None => None,
            });
        }

        Ok(schedules)
    }
}

/// Parameters for listing plans.
///
/// Controls whether to show completed or in-progress plans.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct ListPlans {
    /// Whether to show completed plans instead of active ones
    #[serde(default)]
    pub completed: bool,
}

/// Parameters for renaming a plan.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct RenamePlan {
    /// Plan ID to rename (required)
    pub id: u64,
    /// Replacement title, must not be empty or whitespace-only
    pub title: String,
}

impl RenamePlan {
    /// Validate the replacement title.
    ///
    /// # Errors
    ///
    /// * `ProgressionError::InvalidInput` - empty or whitespace-only title
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(ProgressionError::invalid_input("title")
                .with_reason("Plan title must not be empty"));
        }
        Ok(())
    }
}

/// Parameters for permanently deleting a plan.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct DeletePlan {
    /// Plan ID to delete
    pub id: u64,
    /// Explicit confirmation, required to prevent accidental deletion
    #[serde(default)]
    pub confirmed: bool,
}

/// Parameters for marking a stage as completed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct CompleteStage {
    /// ID of the plan the stage belongs to
    pub plan_id: u64,
    /// ID of the stage to complete
    pub stage_id: u64,
}

/// Parameters for selecting a stage within a session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct SelectStage {
    /// ID of the plan whose session to operate on
    pub plan_id: u64,
    /// 0-based index of the stage to select
    pub index: usize,
}

/// Parameters for reporting a playback position tick.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct ReportProgress {
    /// ID of the plan whose session is playing
    pub plan_id: u64,
    /// Observed playback position in seconds from the start of the
    /// selected stage
    pub elapsed_secs: u32,
}

/// Parameters for the content source's write path.
///
/// Moves a stage along `pending → generating → ready` and records the
/// audio handle once produced. Completion is not reachable through this
/// path.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct StageContentUpdate {
    /// Stage ID to update (required)
    pub stage_id: u64,
    /// New content status, 'generating' or 'ready'
    pub status: String,
    /// Handle to the produced audio; expected when the status becomes
    /// 'ready'
    pub audio_ref: Option<String>,
}

impl StageContentUpdate {
    /// Validate and parse the requested content status.
    ///
    /// # Errors
    ///
    /// * `ProgressionError::InvalidInput` - status is not 'generating' or
    ///   'ready'
    pub fn validate(&self) -> Result<StageStatus> {
        let status = self.status.parse::<StageStatus>().map_err(|_| {
            ProgressionError::invalid_input("status").with_reason(format!(
                "Invalid content status: {}. Must be 'generating' or 'ready'",
                self.status
            ))
        })?;

        match status {
            StageStatus::Generating | StageStatus::Ready => Ok(status),
            _ => Err(ProgressionError::invalid_input("status").with_reason(
                "Content updates may only move a stage to 'generating' or 'ready'",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(title: &str, duration_secs: u32) -> StageSpec {
        StageSpec {
            title: title.to_string(),
            description: None,
            duration_secs,
            scheduled_at: None,
        }
    }

    #[test]
    fn create_plan_accepts_well_formed_input() {
        let params = CreatePlan {
            title: "Morning Calm".to_string(),
            description: None,
            stages: vec![spec("Breath", 600), spec("Body scan", 900)],
        };
        let schedules = params.validate().expect("should validate");
        assert_eq!(schedules, vec![None, None]);
    }

    #[test]
    fn create_plan_parses_schedules() {
        let mut params = CreatePlan {
            title: "Morning Calm".to_string(),
            description: None,
            stages: vec![spec("Breath", 600)],
        };
        params.stages[0].scheduled_at = Some("2026-04-01T06:00:00Z".to_string());

        let schedules = params.validate().expect("should validate");
        assert_eq!(
            schedules[0],
            Some("2026-04-01T06:00:00Z".parse().unwrap())
        );
    }

    #[test]
    fn create_plan_rejects_blank_title() {
        let params = CreatePlan {
            title: "   ".to_string(),
            description: None,
            stages: vec![spec("Breath", 600)],
        };
        match params.validate().unwrap_err() {
            ProgressionError::InvalidInput { field, .. } => assert_eq!(field, "title"),
            other => panic!("Expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn create_plan_rejects_empty_stage_list() {
        let params = CreatePlan {
            title: "Morning Calm".to_string(),
            description: None,
            stages: vec![],
        };
        match params.validate().unwrap_err() {
            ProgressionError::InvalidInput { field, reason } => {
                assert_eq!(field, "stages");
                assert!(reason.contains("at least one stage"));
            }
            other => panic!("Expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn create_plan_rejects_zero_duration() {
        let params = CreatePlan {
            title: "Morning Calm".to_string(),
            description: None,
            stages: vec![spec("Breath", 600), spec("Silence", 0)],
        };
        match params.validate().unwrap_err() {
            ProgressionError::InvalidInput { field, reason } => {
                assert_eq!(field, "stages");
                assert!(reason.contains("Stage 1"));
            }
            other => panic!("Expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn create_plan_rejects_malformed_schedule() {
        let mut params = CreatePlan {
            title: "Morning Calm".to_string(),
            description: None,
            stages: vec![spec("Breath", 600)],
        };
        params.stages[0].scheduled_at = Some("next tuesday".to_string());
        assert!(params.validate().is_err());
    }

    #[test]
    fn rename_rejects_whitespace_title() {
        let params = RenamePlan {
            id: 1,
            title: "\t ".to_string(),
        };
        assert!(params.validate().is_err());

        let params = RenamePlan {
            id: 1,
            title: "Evening Calm".to_string(),
        };
        assert!(params.validate().is_ok());
    }

    #[test]
    fn content_update_accepts_forward_states() {
        let params = StageContentUpdate {
            stage_id: 1,
            status: "generating".to_string(),
            audio_ref: None,
        };
        assert_eq!(params.validate().unwrap(), StageStatus::Generating);

        let params = StageContentUpdate {
            stage_id: 1,
            status: "ready".to_string(),
            audio_ref: Some("audio/calm-01.ogg".to_string()),
        };
        assert_eq!(params.validate().unwrap(), StageStatus::Ready);
    }

    #[test]
    fn content_update_rejects_completed_and_unknown() {
        for status in ["completed", "pending", "archived"] {
            let params = StageContentUpdate {
                stage_id: 1,
                status: status.to_string(),
                audio_ref: None,
            };
            assert!(params.validate().is_err(), "{status} should be rejected");
        }
    }
}
