//! Core library for the Attune audio-healing platform's plan progression
//! engine.
//!
//! This crate manages a listener's enrollment in multi-stage healing plans:
//! which stage is currently playable, how completion advances state, and the
//! hybrid gating policy that combines prerequisite completion with
//! calendar-scheduled availability.
//!
//! # Architecture
//!
//! - **Models** ([`models`]): plans, stages and their derived progress
//! - **Unlock Policy** ([`unlock`]): pure eligibility predicates over
//!   `(stage, index, plan, now)`
//! - **Progression Engine** ([`progression`]): validated mutations
//!   (create, rename, delete, complete) backed by SQLite
//! - **Sessions** ([`session`]): transient selection and playback position,
//!   decoupled from persisted progress
//! - **Completion Watcher** ([`watcher`]): edge-triggered bridge from
//!   playback position to completion events with a cancellable deferred
//!   auto-advance
//! - **Clock** ([`clock`]): injectable time source so unlock decisions are
//!   deterministic under test
//!
//! # Quick Start
//!
//! ```rust
//! use attune_core::{
//!     params::{CreatePlan, StageSpec},
//!     ProgressionBuilder,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! // Create an engine instance
//! let engine = ProgressionBuilder::new()
//!     .with_database_path(Some("attune.db"))
//!     .build()
//!     .await?;
//!
//! // Enroll in a plan; the stage sequence is fixed at creation
//! let plan = engine
//!     .create_plan(&CreatePlan {
//!         title: "Deep Rest".to_string(),
//!         description: Some("A four week wind-down program".to_string()),
//!         stages: vec![
//!             StageSpec {
//!                 title: "Breath work".to_string(),
//!                 description: None,
//!                 duration_secs: 600,
//!                 scheduled_at: None,
//!             },
//!             StageSpec {
//!                 title: "Body scan".to_string(),
//!                 description: None,
//!                 duration_secs: 900,
//!                 scheduled_at: Some("2026-04-08T06:00:00Z".to_string()),
//!             },
//!         ],
//!     })
//!     .await?;
//! println!("Enrolled: {}", plan.title);
//!
//! // Inspect stage eligibility at the engine's current instant
//! use attune_core::params::Id;
//! if let Some(overview) = engine.plan_overview(&Id { id: plan.id }).await? {
//!     for (stage, gate) in overview.plan.stages.iter().zip(&overview.gates) {
//!         println!("{}: unlocked={} {}", stage.title, gate.unlocked, gate.hint);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod clock;
pub mod db;
pub mod display;
pub mod error;
pub mod models;
pub mod params;
pub mod progression;
pub mod session;
pub mod unlock;
pub mod watcher;

// Re-export commonly used types
pub use clock::{Clock, FixedClock, SystemClock};
pub use db::Database;
pub use display::{CreateResult, DeleteResult, OperationStatus, PlanSummaries, Stages, UpdateResult};
pub use error::{ProgressionError, Result};
pub use models::{Plan, PlanFilter, PlanStatus, PlanSummary, Stage, StageStatus};
pub use params::{
    CompleteStage, CreatePlan, DeletePlan, Id, ListPlans, RenamePlan, ReportProgress, SelectStage,
    StageContentUpdate, StageSpec,
};
pub use progression::{PlanOverview, ProgressionBuilder, ProgressionEngine, StageGate};
pub use session::PlanSession;
pub use watcher::{CompletionGate, PlaybackWatcher};
