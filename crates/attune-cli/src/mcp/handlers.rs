//! MCP tool handlers implementation

use std::{collections::HashMap, sync::Arc};

use attune_core::{
    display::{CreateResult, DeleteResult, OperationStatus, UpdateResult},
    params as core,
    session::PlanSession,
    watcher::PlaybackWatcher,
    ProgressionEngine, ProgressionError,
};
use log::debug;
use rmcp::{
    model::{CallToolResult, Content},
    ErrorData,
};
use schemars::JsonSchema;
use serde::Deserialize;
use tokio::sync::Mutex;

use super::to_mcp_error;

// ============================================================================
// Generic Parameter Wrapper Implementation
// ============================================================================
//
// Wraps the framework-agnostic core parameter types in a transparent serde
// container that adds the MCP-specific derives (Deserialize, JsonSchema),
// keeping the core types clean of protocol dependencies.

/// Generic MCP wrapper for core parameter types with serde integration
#[derive(Debug, Deserialize)]
#[serde(transparent)]
pub struct McpParams<T>(T)
where
    T: JsonSchema;

impl<T> JsonSchema for McpParams<T>
where
    T: JsonSchema,
{
    fn schema_name() -> std::borrow::Cow<'static, str> {
        T::schema_name()
    }

    fn json_schema(g: &mut schemars::SchemaGenerator) -> schemars::Schema {
        T::json_schema(g)
    }
}

impl<T> AsRef<T> for McpParams<T>
where
    T: JsonSchema,
{
    fn as_ref(&self) -> &T {
        &self.0
    }
}

// Type aliases for cleaner usage in function signatures
pub type Id = McpParams<core::Id>;
pub type CreatePlan = McpParams<core::CreatePlan>;
pub type ListPlans = McpParams<core::ListPlans>;
pub type RenamePlan = McpParams<core::RenamePlan>;
pub type DeletePlan = McpParams<core::DeletePlan>;
pub type CompleteStage = McpParams<core::CompleteStage>;
pub type SelectStage = McpParams<core::SelectStage>;
pub type ReportProgress = McpParams<core::ReportProgress>;
pub type StageContentUpdate = McpParams<core::StageContentUpdate>;

pub type McpResult = Result<CallToolResult, ErrorData>;

/// One live listening session and its playback watcher.
pub struct SessionEntry {
    session: Arc<Mutex<PlanSession>>,
    watcher: Mutex<PlaybackWatcher>,
}

/// Per-plan sessions held for the lifetime of the MCP server.
///
/// Selection and playback position are session-scoped state; they live here,
/// never in storage, and die with the server.
#[derive(Default)]
pub struct Sessions {
    entries: Mutex<HashMap<u64, Arc<SessionEntry>>>,
}

impl Sessions {
    /// Returns the live session for a plan, opening one on first use.
    async fn entry(
        &self,
        engine: &Arc<ProgressionEngine>,
        plan_id: u64,
    ) -> Result<Arc<SessionEntry>, ProgressionError> {
        let mut entries = self.entries.lock().await;
        if let Some(entry) = entries.get(&plan_id) {
            return Ok(Arc::clone(entry));
        }

        let session = Arc::new(Mutex::new(engine.open_session(plan_id).await?));
        let watcher = Mutex::new(PlaybackWatcher::new(
            Arc::clone(engine),
            Arc::clone(&session),
        ));
        let entry = Arc::new(SessionEntry { session, watcher });
        entries.insert(plan_id, Arc::clone(&entry));
        Ok(entry)
    }

    /// Refreshes a live session with a newer plan snapshot, if one is open.
    async fn refresh(&self, plan: &attune_core::Plan) {
        let entries = self.entries.lock().await;
        if let Some(entry) = entries.get(&plan.id) {
            entry.session.lock().await.refresh(plan.clone());
        }
    }

    /// Drops the session of a deleted plan, stopping its watcher.
    async fn remove(&self, plan_id: u64) {
        let mut entries = self.entries.lock().await;
        if let Some(entry) = entries.remove(&plan_id) {
            entry.watcher.lock().await.stop();
        }
    }
}

/// Handler implementations for the MCP server
pub struct McpHandlers {
    engine: Arc<ProgressionEngine>,
    sessions: Arc<Sessions>,
}

impl McpHandlers {
    pub fn new(engine: Arc<ProgressionEngine>, sessions: Arc<Sessions>) -> Self {
        Self { engine, sessions }
    }

    fn text_result(text: String) -> McpResult {
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }

    pub async fn create_plan(&self, params: &core::CreatePlan) -> McpResult {
        debug!("create_plan: {:?}", params);

        let plan = self
            .engine
            .create_plan(params)
            .await
            .map_err(|e| to_mcp_error("Failed to create plan", &e))?;

        Self::text_result(CreateResult::new(plan).to_string())
    }

    pub async fn list_plans(&self, params: &core::ListPlans) -> McpResult {
        debug!("list_plans: {:?}", params);

        let summaries = self
            .engine
            .list_plans_summary(params)
            .await
            .map_err(|e| to_mcp_error("Failed to list plans", &e))?;

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

        Self::text_result(format!("# {title}\n\n{summaries}"))
    }

    pub async fn show_plan(&self, params: &core::Id) -> McpResult {
        debug!("show_plan: {:?}", params);

        let overview = self
            .engine
            .plan_overview(params)
            .await
            .map_err(|e| to_mcp_error("Failed to show plan", &e))?;

        match overview {
            Some(overview) => Self::text_result(overview.to_string()),
            None => Self::text_result(
                OperationStatus::failure(format!("Plan with ID {} not found", params.id))
                    .to_string(),
            ),
        }
    }

    pub async fn rename_plan(&self, params: &core::RenamePlan) -> McpResult {
        debug!("rename_plan: {:?}", params);

        let plan = self
            .engine
            .rename_plan(params)
            .await
            .map_err(|e| to_mcp_error("Failed to rename plan", &e))?;

        self.sessions.refresh(&plan).await;
        let changes = vec![format!("Renamed to '{}'", plan.title)];
        Self::text_result(UpdateResult::with_changes(plan, changes).to_string())
    }

    pub async fn delete_plan(&self, params: &core::DeletePlan) -> McpResult {
        debug!("delete_plan: {:?}", params);

        let deleted = self
            .engine
            .delete_plan(params)
            .await
            .map_err(|e| to_mcp_error("Failed to delete plan", &e))?;

        match deleted {
            Some(plan) => {
                self.sessions.remove(plan.id).await;
                Self::text_result(DeleteResult::new(plan).to_string())
            }
            None => Self::text_result(
                OperationStatus::failure(format!("Plan with ID {} not found", params.id))
                    .to_string(),
            ),
        }
    }

    pub async fn complete_stage(&self, params: &core::CompleteStage) -> McpResult {
        debug!("complete_stage: {:?}", params);

        // Already-completed stages are absorbed as successes by the engine.
        let plan = self
            .engine
            .complete_stage(params)
            .await
            .map_err(|e| to_mcp_error("Failed to complete stage", &e))?;

        self.sessions.refresh(&plan).await;

        let status = OperationStatus::success(format!(
            "Stage {} completed ({}/{} stages done)",
            params.stage_id,
            plan.completed_count(),
            plan.stages.len()
        ));
        Self::text_result(format!("{status}\n{plan}"))
    }

    pub async fn show_stage(&self, params: &core::Id) -> McpResult {
        debug!("show_stage: {:?}", params);

        let stage = self
            .engine
            .show_stage_details(params)
            .await
            .map_err(|e| to_mcp_error("Failed to show stage", &e))?;

        match stage {
            Some(stage) => Self::text_result(stage.to_string()),
            None => Self::text_result(
                OperationStatus::failure(format!("Stage with ID {} not found", params.id))
                    .to_string(),
            ),
        }
    }

    pub async fn update_stage_content(&self, params: &core::StageContentUpdate) -> McpResult {
        debug!("update_stage_content: {:?}", params);

        let stage = self
            .engine
            .update_stage_content(params)
            .await
            .map_err(|e| to_mcp_error("Failed to update stage content", &e))?;

        let changes = vec![format!("Content status is now '{}'", stage.status)];
        Self::text_result(UpdateResult::with_changes(stage, changes).to_string())
    }

    pub async fn select_stage(&self, params: &core::SelectStage) -> McpResult {
        debug!("select_stage: {:?}", params);

        let entry = self
            .sessions
            .entry(&self.engine, params.plan_id)
            .await
            .map_err(|e| to_mcp_error("Failed to open session", &e))?;

        let outcome = {
            let mut session = entry.session.lock().await;
            session.select(params.index, self.engine.now())
        };

        match outcome {
            Ok(()) => {
                entry.watcher.lock().await.begin_stage();
                let session = entry.session.lock().await;
                Self::text_result(format!(
                    "Selected stage {} of plan {}\n\n{}",
                    params.index,
                    params.plan_id,
                    session.selected_stage()
                ))
            }
            // Locked is an expected interactive outcome: report it with the
            // hint instead of failing the tool call.
            Err(ProgressionError::StageLocked { hint, .. }) => Self::text_result(
                OperationStatus::failure(format!(
                    "Stage {} is locked. {hint}",
                    params.index
                ))
                .to_string(),
            ),
            Err(e) => Err(to_mcp_error("Failed to select stage", &e)),
        }
    }

    async fn navigate(&self, plan_id: u64, forward: bool) -> McpResult {
        let entry = self
            .sessions
            .entry(&self.engine, plan_id)
            .await
            .map_err(|e| to_mcp_error("Failed to open session", &e))?;

        let now = self.engine.now();
        let (moved, index, stage) = {
            let mut session = entry.session.lock().await;
            let moved = if forward {
                session.next(now)
            } else {
                session.previous(now)
            };
            (
                moved,
                session.selected_index(),
                session.selected_stage().to_string(),
            )
        };

        if moved {
            entry.watcher.lock().await.begin_stage();
            Self::text_result(format!("Now at stage {index} of plan {plan_id}\n\n{stage}"))
        } else {
            // Boundary or locked neighbor: a disabled skip button, not an
            // error.
            Self::text_result(format!(
                "Selection unchanged; stage {index} of plan {plan_id} stays active"
            ))
        }
    }

    pub async fn next_stage(&self, params: &core::Id) -> McpResult {
        debug!("next_stage: {:?}", params);
        self.navigate(params.id, true).await
    }

    pub async fn previous_stage(&self, params: &core::Id) -> McpResult {
        debug!("previous_stage: {:?}", params);
        self.navigate(params.id, false).await
    }

    pub async fn report_progress(&self, params: &core::ReportProgress) -> McpResult {
        debug!("report_progress: {:?}", params);

        let entry = self
            .sessions
            .entry(&self.engine, params.plan_id)
            .await
            .map_err(|e| to_mcp_error("Failed to open session", &e))?;

        let completed = {
            let mut watcher = entry.watcher.lock().await;
            watcher
                .observe(params.elapsed_secs)
                .await
                .map_err(|e| to_mcp_error("Failed to record progress", &e))?
        };

        if completed {
            let session = entry.session.lock().await;
            let plan = session.plan();
            Self::text_result(
                OperationStatus::success(format!(
                    "Stage finished; {}/{} stages done",
                    plan.completed_count(),
                    plan.stages.len()
                ))
                .to_string(),
            )
        } else {
            Self::text_result(format!(
                "Recorded position {}s for plan {}",
                params.elapsed_secs, params.plan_id
            ))
        }
    }
}
