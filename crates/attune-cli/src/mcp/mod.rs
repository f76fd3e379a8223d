//! MCP server implementation for Attune
//!
//! This module implements the Model Context Protocol server for Attune,
//! providing a standardized interface for AI models to drive the plan
//! progression engine: enrolling in plans, inspecting unlock state,
//! selecting stages and feeding playback progress.

use std::future::Future;
use std::sync::Arc;

use anyhow::Result;
use attune_core::ProgressionEngine;
use log::{debug, error, info};
use rmcp::{
    handler::server::{router::tool::ToolRouter, tool::Parameters},
    model::{Implementation, ProtocolVersion, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router, ServerHandler,
};
use tokio::signal::unix::{signal, SignalKind};

pub mod errors;
pub mod handlers;

pub use errors::to_mcp_error;
// Re-export parameter types and result type from handlers for external use
pub use handlers::{
    CompleteStage, CreatePlan, DeletePlan, Id, ListPlans, McpResult, RenamePlan, ReportProgress,
    SelectStage, Sessions, StageContentUpdate,
};

/// MCP server for Attune
#[derive(Clone)]
pub struct AttuneMcpServer {
    engine: Arc<ProgressionEngine>,
    sessions: Arc<Sessions>,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl AttuneMcpServer {
    /// Create a new Attune MCP server
    pub fn new(engine: ProgressionEngine) -> Self {
        Self {
            engine: Arc::new(engine),
            sessions: Arc::new(Sessions::default()),
            tool_router: Self::tool_router(),
        }
    }

    fn handlers(&self) -> handlers::McpHandlers {
        handlers::McpHandlers::new(Arc::clone(&self.engine), Arc::clone(&self.sessions))
    }

    #[tool(
        name = "create_plan",
        description = "Enroll in a new healing plan. Provide a title (required), optional description, and the full ordered stage sequence: each stage has a title, duration_secs (> 0) and an optional scheduled_at RFC 3339 calendar gate. The stage sequence is fixed at creation. Returns the new plan with stage IDs."
    )]
    async fn create_plan(&self, params: Parameters<CreatePlan>) -> McpResult {
        self.handlers().create_plan(params.0.as_ref()).await
    }

    #[tool(
        name = "list_plans",
        description = "List healing plans. Use completed=false (default) for plans still in progress, or completed=true for finished plans. Returns a formatted list with IDs, titles and stage progress counts."
    )]
    async fn list_plans(&self, params: Parameters<ListPlans>) -> McpResult {
        self.handlers().list_plans(params.0.as_ref()).await
    }

    #[tool(
        name = "show_plan",
        description = "Display a plan with every stage's status, lock state and unlock hint evaluated at the current instant. Locked stages show why they are locked (previous stage unfinished and/or a future unlock date)."
    )]
    async fn show_plan(&self, params: Parameters<Id>) -> McpResult {
        self.handlers().show_plan(params.0.as_ref()).await
    }

    #[tool(
        name = "rename_plan",
        description = "Rename a plan. The replacement title must not be empty or whitespace-only. Only the title changes; stages and progress are untouched."
    )]
    async fn rename_plan(&self, params: Parameters<RenamePlan>) -> McpResult {
        self.handlers().rename_plan(params.0.as_ref()).await
    }

    #[tool(
        name = "delete_plan",
        description = "Permanently delete a plan and all its stages. This operation cannot be undone and requires confirmed=true."
    )]
    async fn delete_plan(&self, params: Parameters<DeletePlan>) -> McpResult {
        self.handlers().delete_plan(params.0.as_ref()).await
    }

    #[tool(
        name = "complete_stage",
        description = "Mark a stage as completed (manual override for playback-driven completion). Completing an already-completed stage is treated as success. Recomputes the plan's progress and status."
    )]
    async fn complete_stage(&self, params: Parameters<CompleteStage>) -> McpResult {
        self.handlers().complete_stage(params.0.as_ref()).await
    }

    #[tool(
        name = "show_stage",
        description = "View one stage's details: status, length, optional unlock date and audio handle."
    )]
    async fn show_stage(&self, params: Parameters<Id>) -> McpResult {
        self.handlers().show_stage(params.0.as_ref()).await
    }

    #[tool(
        name = "update_stage_content",
        description = "Content source write path: move a stage's content status forward ('generating' or 'ready') and record the audio handle. Backward moves and completed stages are rejected."
    )]
    async fn update_stage_content(&self, params: Parameters<StageContentUpdate>) -> McpResult {
        self.handlers()
            .update_stage_content(params.0.as_ref())
            .await
    }

    #[tool(
        name = "select_stage",
        description = "Select a stage (0-based index) in the plan's listening session. Selecting a locked stage reports the lock with its unlock hint instead of failing; browsing never changes progress."
    )]
    async fn select_stage(&self, params: Parameters<SelectStage>) -> McpResult {
        self.handlers().select_stage(params.0.as_ref()).await
    }

    #[tool(
        name = "next_stage",
        description = "Move the session selection one stage forward if that stage exists and is unlocked; otherwise the selection stays put (like a disabled skip button)."
    )]
    async fn next_stage(&self, params: Parameters<Id>) -> McpResult {
        self.handlers().next_stage(params.0.as_ref()).await
    }

    #[tool(
        name = "previous_stage",
        description = "Move the session selection one stage back if possible; otherwise the selection stays put."
    )]
    async fn previous_stage(&self, params: Parameters<Id>) -> McpResult {
        self.handlers().previous_stage(params.0.as_ref()).await
    }

    #[tool(
        name = "report_progress",
        description = "Feed the observed playback position (seconds from the start of the selected stage). When the position reaches the stage's duration (within a one second tolerance) the stage completes exactly once and, after a short delay, the session auto-advances to the next eligible stage."
    )]
    async fn report_progress(&self, params: Parameters<ReportProgress>) -> McpResult {
        self.handlers().report_progress(params.0.as_ref()).await
    }
}

#[tool_handler(router = self.tool_router)]
impl ServerHandler for AttuneMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "attune".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            instructions: Some(r#"Attune is the progression engine of an audio-healing platform: listeners enroll in multi-stage healing plans whose stages unlock sequentially.

## Core Concepts
- **Plans**: An enrollment in an ordered program. A plan's stage sequence is fixed at creation.
- **Stages**: One unit of the program with an expected audio length. A stage unlocks when the previous stage is completed AND its optional scheduled_at date has passed (both conditions are required). The first stage is always unlocked.
- **Sessions**: Browsing stages (select/next/previous) is session-scoped and never changes progress; only completion does.

## Workflow Examples

### Enrolling
1. Create a plan with `create_plan`, passing the full stage sequence
2. Use `show_plan` to see each stage's lock state and unlock hints
3. As the content source produces audio, record it with `update_stage_content`

### Listening
1. `select_stage` to enter an unlocked stage
2. Feed playback position ticks with `report_progress`; the stage completes automatically near its end and the session advances to the next eligible stage
3. `complete_stage` is the manual override; completing twice is harmless

### Tracking
- `list_plans` shows in-progress plans with completion counts
- Locked selections report their unlock hint (finish the previous stage, wait for the date, or both)

## Tool Categories
- **Plan Management**: create_plan, list_plans, show_plan, rename_plan, delete_plan
- **Stage Progression**: complete_stage, show_stage, update_stage_content
- **Session & Playback**: select_stage, next_stage, previous_stage, report_progress"#.to_string()),
        }
    }
}

/// Run the MCP server with stdio transport
pub async fn run_stdio_server(server: AttuneMcpServer) -> Result<()> {
    use rmcp::{transport::stdio, ServiceExt};

    info!("Starting Attune MCP server on stdio");
    debug!(
        "Server created with {} tools",
        server.tool_router.list_all().len()
    );

    let service = server.serve(stdio()).await.inspect_err(|e| {
        error!("serving error: {e:?}");
    })?;

    // Set up signal handlers for graceful shutdown
    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;

    tokio::select! {
        result = service.waiting() => {
            match result {
                Ok(_) => info!("MCP server stopped normally"),
                Err(e) => error!("MCP server error: {e:?}"),
            }
        }
        _ = sigint.recv() => {
            info!("Received SIGINT, shutting down gracefully...");
        }
        _ = sigterm.recv() => {
            info!("Received SIGTERM, shutting down gracefully...");
        }
    }

    info!("MCP server shutdown complete");
    Ok(())
}
