//! High-level progression engine for healing plans.
//!
//! This module provides the main [`ProgressionEngine`] interface. The engine
//! owns every mutation of a plan (creation, rename, deletion, stage
//! completion, content updates) and every derived read (summaries, unlock
//! overviews, sessions), coordinating between callers and the persistence
//! layer.
//!
//! # Architecture Overview
//!
//! ```text
//! ┌─────────────────┐    ┌─────────────────┐    ┌─────────────────┐
//! │    Handlers     │    │   Operations    │    │    Database     │
//! │ (plan_handlers, │───▶│ (plan_ops,      │───▶│   (via db/)     │
//! │  stage_handlers)│    │  stage_ops)     │    │                 │
//! └─────────────────┘    └─────────────────┘    └─────────────────┘
//!     Validation &        Blocking DB access     Data persistence
//!     derived views       via spawn_blocking
//! ```
//!
//! ## Submodules
//!
//! - [`builder`]: Factory for creating [`ProgressionEngine`] instances
//! - [`plan_handlers`]: Validated plan operations (create, list, rename, ...)
//! - [`stage_handlers`]: Stage progression operations (complete, advance,
//!   content updates, sessions)
//! - [`plan_ops`] / [`stage_ops`]: Lower-level database operations
//!
//! ## Concurrency
//!
//! Each mutation runs as a single SQLite transaction on a per-call blocking
//! task, so concurrent completion events and user commands against the same
//! plan serialize at the database; no operation observes a half-applied
//! plan. The engine itself holds no plan state between calls; callers get
//! immutable snapshots.
//!
//! ## Time
//!
//! The engine reads the current time exclusively through the injected
//! [`Clock`](crate::clock::Clock), so unlock decisions are deterministic
//! under test.

use std::path::PathBuf;
use std::sync::Arc;

use jiff::Timestamp;

use crate::{
    clock::Clock,
    models::Plan,
    unlock,
};

// Module declarations
pub mod builder;
pub mod plan_handlers;
pub mod plan_ops;
pub mod stage_handlers;
pub mod stage_ops;


// Re-export the main types
pub use builder::ProgressionBuilder;

/// Main progression engine for managing healing plans.
pub struct ProgressionEngine {
    pub(crate) db_path: PathBuf,
    pub(crate) clock: Arc<dyn Clock>,
}

impl ProgressionEngine {
    /// Creates a new engine with the specified database path and clock.
    pub(crate) fn new(db_path: PathBuf, clock: Arc<dyn Clock>) -> Self {
        Self { db_path, clock }
    }

    /// The current instant according to the injected clock.
    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }
}

/// Unlock evaluation for one stage at a specific instant.
#[derive(Debug, Clone)]
pub struct StageGate {
    /// Whether the stage may be entered
    pub unlocked: bool,
    /// Advisory text explaining a locked stage; empty when unlocked
    pub hint: String,
}

/// A plan snapshot with per-stage unlock evaluations, for presentation.
#[derive(Debug, Clone)]
pub struct PlanOverview {
    /// The plan snapshot the gates were evaluated against
    pub plan: Plan,
    /// One gate per stage, in stage order
    pub gates: Vec<StageGate>,
    /// The instant the gates were evaluated at
    pub evaluated_at: Timestamp,
}

impl PlanOverview {
    /// Evaluates every stage's gate against the plan at `now`.
    pub fn evaluate(plan: Plan, now: Timestamp) -> Self {
        let gates = plan
            .stages
            .iter()
            .enumerate()
            .map(|(index, stage)| StageGate {
                unlocked: unlock::is_unlocked(stage, index, &plan, now),
                hint: unlock::unlock_hint(stage, index, &plan, now),
            })
            .collect();

        Self {
            plan,
            gates,
            evaluated_at: now,
        }
    }
}
