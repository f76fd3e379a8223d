//! Command handlers bridging parsed arguments to the progression engine.
//!
//! Each handler converts its argument struct into core parameters, runs the
//! engine operation, and renders the formatted result through the terminal
//! renderer. Not-found outcomes on read paths render as failure messages
//! rather than propagating errors; validation errors on mutations propagate
//! so the process exits non-zero.

use anyhow::Result;
use attune_core::{
    display::{CreateResult, DeleteResult, OperationStatus, UpdateResult},
    params::ListPlans,
    ProgressionEngine,
};

use crate::{
    args::{PlanCommands, StageCommands},
    renderer::TerminalRenderer,
};

/// Command dispatcher owning the engine and renderer.
pub struct Cli {
    engine: ProgressionEngine,
    renderer: TerminalRenderer,
}

impl Cli {
    /// Create a new CLI dispatcher.
    pub fn new(engine: ProgressionEngine, renderer: TerminalRenderer) -> Self {
        Self { engine, renderer }
    }

    /// Dispatch a plan subcommand.
    pub async fn handle_plan_command(&self, command: PlanCommands) -> Result<()> {
        match command {
            PlanCommands::Create(args) => {
                let plan = self.engine.create_plan(&args.into()).await?;
                self.renderer.render(&CreateResult::new(plan).to_string())
            }
            PlanCommands::List(args) => self.list_plans(&args.into()).await,
            PlanCommands::Show(args) => {
                let params = args.into();
                match self.engine.plan_overview(&params).await? {
                    Some(overview) => self.renderer.render(&overview.to_string()),
                    None => self.render_not_found("Plan", params.id),
                }
            }
            PlanCommands::Rename(args) => {
                let params = args.into();
                let plan = self.engine.rename_plan(&params).await?;
                let changes = vec![format!("Renamed to '{}'", plan.title)];
                self.renderer
                    .render(&UpdateResult::with_changes(plan, changes).to_string())
            }
            PlanCommands::Delete(args) => {
                let params = args.into();
                match self.engine.delete_plan(&params).await? {
                    Some(plan) => self.renderer.render(&DeleteResult::new(plan).to_string()),
                    None => self.render_not_found("Plan", params.id),
                }
            }
        }
    }

    /// Dispatch a stage subcommand.
    pub async fn handle_stage_command(&self, command: StageCommands) -> Result<()> {
        match command {
            StageCommands::List(args) => {
                let params = args.into();
                let stages = self.engine.get_stages(&params).await?;
                if stages.is_empty() {
                    self.render_not_found("Plan", params.id)
                } else {
                    self.renderer
                        .render(&format!("# Stages of plan {}\n\n{stages}", params.id))
                }
            }
            StageCommands::Show(args) => {
                let params = args.into();
                match self.engine.show_stage_details(&params).await? {
                    Some(stage) => self.renderer.render(&stage.to_string()),
                    None => self.render_not_found("Stage", params.id),
                }
            }
            StageCommands::Complete(args) => {
                let params = args.into();
                let plan = self.engine.complete_stage(&params).await?;
                let status = OperationStatus::success(format!(
                    "Stage {} completed ({}/{} stages done)",
                    params.stage_id,
                    plan.completed_count(),
                    plan.stages.len()
                ));
                self.renderer.render(&format!("{status}\n{plan}"))
            }
            StageCommands::Content(args) => {
                let params = args.into();
                let stage = self.engine.update_stage_content(&params).await?;
                let changes = vec![format!("Content status is now '{}'", stage.status)];
                self.renderer
                    .render(&UpdateResult::with_changes(stage, changes).to_string())
            }
        }
    }

    /// List plans as summaries, the default command.
    pub async fn list_plans(&self, params: &ListPlans) -> Result<()> {
        let summaries = self.engine.list_plans_summary(params).await?;

        let title = if summaries.is_empty() {
            if params.completed {
                "No completed plans found"
            } else {
                "No active plans found"
            }
        } else if params.completed {
            "Completed Plans"
        } else {
            "Active Plans"
        };

        self.renderer.render(&format!("# {title}\n\n{summaries}"))
    }

    fn render_not_found(&self, resource: &str, id: u64) -> Result<()> {
        self.renderer.render(
            &OperationStatus::failure(format!("{resource} with ID {id} not found")).to_string(),
        )
    }
}
