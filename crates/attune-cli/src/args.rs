//! Command-line argument definitions using clap
//!
//! This module defines the CLI structure with clap's derive API, following
//! the parameter wrapper pattern: each command has an argument struct with
//! clap-specific attributes that converts into the framework-agnostic
//! parameter types of `attune_core::params` via `From`.

use std::path::PathBuf;

use attune_core::params::{
    CompleteStage, CreatePlan, DeletePlan, Id, ListPlans, RenamePlan, StageContentUpdate,
    StageSpec,
};
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};

/// Main command-line interface for the Attune progression engine
///
/// Attune manages enrollment in multi-stage audio healing plans: ordered
/// stage sequences that unlock one by one as earlier stages are completed
/// and calendar gates pass. It provides a command-line interface for
/// creating, inspecting and progressing plans, plus an MCP (Model Context
/// Protocol) server mode for integration with AI assistants.
#[derive(Parser)]
#[command(version, about, name = "attune")]
pub struct Args {
    /// Path to the SQLite database file. Defaults to
    /// $XDG_DATA_HOME/attune/attune.db
    #[arg(long, global = true)]
    pub database_file: Option<PathBuf>,

    /// Disable colored output and use plain text
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands for the Attune CLI
///
/// The CLI is organized into three main command categories:
/// - `plan`: Operations on whole plans (create, list, show, rename, delete)
/// - `stage`: Operations on individual stages (show, complete, content)
/// - `serve`: Start the MCP server for AI assistant integration
#[derive(Subcommand)]
pub enum Commands {
    /// Manage plans
    #[command(alias = "p")]
    Plan {
        #[command(subcommand)]
        command: PlanCommands,
    },
    /// Manage stages within plans
    #[command(alias = "s")]
    Stage {
        #[command(subcommand)]
        command: StageCommands,
    },
    /// Start the MCP server
    Serve,
}

#[derive(Subcommand)]
pub enum PlanCommands {
    /// Create a new plan with its full stage sequence
    #[command(alias = "c")]
    Create(CreatePlanArgs),
    /// List all plans
    #[command(aliases = ["l", "ls"])]
    List(ListPlansArgs),
    /// Show a plan with per-stage unlock state
    #[command(alias = "s")]
    Show(ShowPlanArgs),
    /// Rename a plan
    #[command(alias = "r")]
    Rename(RenamePlanArgs),
    /// Delete a plan permanently
    #[command(aliases = ["d", "rm"])]
    Delete(DeletePlanArgs),
}

#[derive(Subcommand)]
pub enum StageCommands {
    /// List the stages of a plan in playback order
    #[command(aliases = ["l", "ls"])]
    List(ListStagesArgs),
    /// Show details of a specific stage
    #[command(alias = "s")]
    Show(ShowStageArgs),
    /// Mark a stage as completed
    #[command(alias = "c")]
    Complete(CompleteStageArgs),
    /// Record a content-preparation update for a stage
    Content(StageContentArgs),
}

/// List the stages of a plan
#[derive(ClapArgs)]
pub struct ListStagesArgs {
    /// ID of the plan whose stages to list
    #[arg(help = "Unique identifier of the plan whose stages to list")]
    pub plan_id: u64,
}

impl From<ListStagesArgs> for Id {
    fn from(val: ListStagesArgs) -> Self {
        Id { id: val.plan_id }
    }
}

/// Create a new plan
///
/// The stage sequence is fixed at creation: pass one `--stage` per stage in
/// playback order. Each spec is `TITLE,DURATION_SECS[,RFC3339_SCHEDULE]`,
/// e.g. `--stage "Breath work,600"` or
/// `--stage "Release,720,2026-04-08T06:00:00Z"` for a calendar-gated stage.
#[derive(ClapArgs)]
pub struct CreatePlanArgs {
    /// Title of the plan
    pub title: String,
    /// Optional description providing more context about the plan
    #[arg(
        short,
        long,
        help = "Optional description providing more context about the plan"
    )]
    pub description: Option<String>,
    /// Stage specs in playback order: TITLE,DURATION_SECS[,RFC3339_SCHEDULE]
    #[arg(
        short,
        long = "stage",
        required = true,
        value_parser = parse_stage_spec,
        help = "Stage spec TITLE,DURATION_SECS[,RFC3339_SCHEDULE]; repeat in playback order"
    )]
    pub stages: Vec<StageSpec>,
}

impl From<CreatePlanArgs> for CreatePlan {
    fn from(val: CreatePlanArgs) -> Self {
        CreatePlan {
            title: val.title,
            description: val.description,
            stages: val.stages,
        }
    }
}

/// Parses a CLI stage spec of the form
/// `TITLE,DURATION_SECS[,RFC3339_SCHEDULE]`.
fn parse_stage_spec(raw: &str) -> Result<StageSpec, String> {
    let mut parts = raw.splitn(3, ',');
    let title = parts
        .next()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| "stage spec needs a title".to_string())?;
    let duration = parts
        .next()
        .ok_or_else(|| format!("stage '{title}' needs a duration in seconds"))?;
    let duration_secs: u32 = duration
        .trim()
        .parse()
        .map_err(|_| format!("stage '{title}' has an invalid duration: {duration}"))?;
    let scheduled_at = parts.next().map(|s| s.trim().to_string());

    Ok(StageSpec {
        title: title.to_string(),
        description: None,
        duration_secs,
        scheduled_at,
    })
}

/// List all plans
///
/// Display either in-progress plans (default) or completed plans based on
/// the --completed flag.
#[derive(ClapArgs)]
pub struct ListPlansArgs {
    /// Show completed plans instead of in-progress plans
    #[arg(long, help = "Show completed plans instead of in-progress ones")]
    pub completed: bool,
}

impl From<ListPlansArgs> for ListPlans {
    fn from(val: ListPlansArgs) -> Self {
        ListPlans {
            completed: val.completed,
        }
    }
}

/// Show a plan with its stages and their unlock state
///
/// Displays the plan's metadata, progress and every stage with a lock badge
/// and an unlock hint for stages that cannot be entered yet.
#[derive(ClapArgs)]
pub struct ShowPlanArgs {
    /// ID of the plan to display
    #[arg(help = "Unique identifier of the plan to show details for")]
    pub id: u64,
}

impl From<ShowPlanArgs> for Id {
    fn from(val: ShowPlanArgs) -> Self {
        Id { id: val.id }
    }
}

/// Rename a plan
#[derive(ClapArgs)]
pub struct RenamePlanArgs {
    /// ID of the plan to rename
    #[arg(help = "Unique identifier of the plan to rename")]
    pub id: u64,
    /// Replacement title
    pub title: String,
}

impl From<RenamePlanArgs> for RenamePlan {
    fn from(val: RenamePlanArgs) -> Self {
        RenamePlan {
            id: val.id,
            title: val.title,
        }
    }
}

/// Delete a plan permanently
#[derive(ClapArgs)]
pub struct DeletePlanArgs {
    /// ID of the plan to delete
    #[arg(help = "Unique identifier of the plan to permanently delete")]
    pub id: u64,
    /// Confirm the deletion (required to prevent accidental deletion)
    #[arg(long)]
    pub confirm: bool,
}

impl From<DeletePlanArgs> for DeletePlan {
    fn from(val: DeletePlanArgs) -> Self {
        DeletePlan {
            id: val.id,
            confirmed: val.confirm,
        }
    }
}

/// Show details of a specific stage
#[derive(ClapArgs)]
pub struct ShowStageArgs {
    #[arg(help = "Unique identifier of the stage to show details for")]
    pub id: u64,
}

impl From<ShowStageArgs> for Id {
    fn from(val: ShowStageArgs) -> Self {
        Id { id: val.id }
    }
}

/// Mark a stage as completed
///
/// This is the manual override for the automatic completion that playback
/// normally produces. Completing an already-completed stage is a no-op.
#[derive(ClapArgs)]
pub struct CompleteStageArgs {
    #[arg(help = "Unique identifier of the plan the stage belongs to")]
    pub plan_id: u64,
    #[arg(help = "Unique identifier of the stage to complete")]
    pub stage_id: u64,
}

impl From<CompleteStageArgs> for CompleteStage {
    fn from(val: CompleteStageArgs) -> Self {
        CompleteStage {
            plan_id: val.plan_id,
            stage_id: val.stage_id,
        }
    }
}

/// Record a content-preparation update for a stage
///
/// The content source reports generation progress through this command:
/// stages move forward along pending → generating → ready, with the audio
/// handle recorded when ready.
#[derive(ClapArgs)]
pub struct StageContentArgs {
    #[arg(help = "Unique identifier of the stage to update")]
    pub id: u64,
    #[arg(help = "New content status")]
    pub status: ContentStatusArg,
    #[arg(long, help = "Handle to the produced audio in the content store")]
    pub audio_ref: Option<String>,
}

impl From<StageContentArgs> for StageContentUpdate {
    fn from(val: StageContentArgs) -> Self {
        StageContentUpdate {
            stage_id: val.id,
            status: val.status.to_string(),
            audio_ref: val.audio_ref,
        }
    }
}

/// Command-line argument representation of content status values
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub enum ContentStatusArg {
    /// Audio generation has started
    Generating,
    /// Audio is available for playback
    Ready,
}

impl std::fmt::Display for ContentStatusArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContentStatusArg::Generating => write!(f, "generating"),
            ContentStatusArg::Ready => write!(f, "ready"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_spec_parses_title_and_duration() {
        let spec = parse_stage_spec("Breath work,600").unwrap();
        assert_eq!(spec.title, "Breath work");
        assert_eq!(spec.duration_secs, 600);
        assert_eq!(spec.scheduled_at, None);
    }

    #[test]
    fn stage_spec_parses_schedule() {
        let spec = parse_stage_spec("Release,720,2026-04-08T06:00:00Z").unwrap();
        assert_eq!(spec.duration_secs, 720);
        assert_eq!(
            spec.scheduled_at.as_deref(),
            Some("2026-04-08T06:00:00Z")
        );
    }

    #[test]
    fn stage_spec_rejects_malformed_input() {
        assert!(parse_stage_spec("").is_err());
        assert!(parse_stage_spec("Breath work").is_err());
        assert!(parse_stage_spec("Breath work,soon").is_err());
    }
}
