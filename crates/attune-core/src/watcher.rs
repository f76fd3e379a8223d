//! Playback completion watcher.
//!
//! Bridges a continuously advancing playback position to discrete stage
//! completion events. The audio subsystem itself is external; this module
//! only observes `(elapsed, duration)` pairs and the already-completed flag.
//!
//! Two layers:
//!
//! - [`CompletionGate`] is the pure, edge-triggered detector: it fires at
//!   most once per activation, inside a small tolerance window before the
//!   nominal duration, because playback position is sampled on an interval
//!   and exact equality with the duration is unreliable.
//! - [`PlaybackWatcher`] wires the gate to a [`ProgressionEngine`] and a
//!   shared [`PlanSession`]: on fire it completes the selected stage exactly
//!   once and schedules a single deferred auto-advance. The deferral is a
//!   cancellable task; switching stages, stopping playback or dropping the
//!   watcher aborts it, and a stale task that fires anyway re-checks the
//!   activation counter before touching anything.

use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use log::debug;
use tokio::{sync::Mutex, task::JoinHandle};

use crate::{
    error::Result, params::CompleteStage, progression::ProgressionEngine, session::PlanSession,
};

/// Default slack, in seconds, between the observed position and the nominal
/// duration at which a stage counts as finished.
pub const DEFAULT_COMPLETION_TOLERANCE_SECS: u32 = 1;

/// Default pause between a completion firing and the auto-advance, so the
/// completed badge is visible before the selection moves.
pub const DEFAULT_ADVANCE_DELAY: Duration = Duration::from_secs(1);

/// Edge-triggered completion detector for a single stage activation.
#[derive(Debug, Clone)]
pub struct CompletionGate {
    tolerance_secs: u32,
    fired: bool,
}

impl CompletionGate {
    /// Creates a gate with the default tolerance.
    pub fn new() -> Self {
        Self::with_tolerance(DEFAULT_COMPLETION_TOLERANCE_SECS)
    }

    /// Creates a gate with a custom tolerance in seconds.
    pub fn with_tolerance(tolerance_secs: u32) -> Self {
        Self {
            tolerance_secs,
            fired: false,
        }
    }

    /// Feeds one observed playback position.
    ///
    /// Returns true exactly once per activation, when the position has
    /// reached `duration - tolerance`, the position is non-zero, and the
    /// stage is not already completed. Later observations return false until
    /// [`reset`](Self::reset) re-arms the gate for a new activation.
    pub fn observe(
        &mut self,
        elapsed_secs: u32,
        duration_secs: u32,
        already_completed: bool,
    ) -> bool {
        if self.fired || already_completed || elapsed_secs == 0 {
            return false;
        }

        if elapsed_secs >= duration_secs.saturating_sub(self.tolerance_secs) {
            self.fired = true;
            return true;
        }

        false
    }

    /// Whether this activation has already produced a completion.
    pub fn has_fired(&self) -> bool {
        self.fired
    }

    /// Re-arms the gate for a new stage activation.
    pub fn reset(&mut self) {
        self.fired = false;
    }
}

impl Default for CompletionGate {
    fn default() -> Self {
        Self::new()
    }
}

struct WatchState {
    gate: CompletionGate,
    // Bumped on every stage activation change; deferred tasks compare their
    // snapshot against it before applying effects.
    activation: u64,
}

/// Observes playback ticks for the selected stage of a shared session,
/// completing the stage when it effectively finishes and auto-advancing to
/// the next eligible stage after a short delay.
pub struct PlaybackWatcher {
    engine: Arc<ProgressionEngine>,
    session: Arc<Mutex<PlanSession>>,
    state: Arc<StdMutex<WatchState>>,
    advance_delay: Duration,
    pending: Option<JoinHandle<()>>,
}

impl PlaybackWatcher {
    /// Creates a watcher over a shared session.
    pub fn new(engine: Arc<ProgressionEngine>, session: Arc<Mutex<PlanSession>>) -> Self {
        Self {
            engine,
            session,
            state: Arc::new(StdMutex::new(WatchState {
                gate: CompletionGate::new(),
                activation: 0,
            })),
            advance_delay: DEFAULT_ADVANCE_DELAY,
            pending: None,
        }
    }

    /// Overrides the pause before the deferred auto-advance.
    pub fn with_advance_delay(mut self, delay: Duration) -> Self {
        self.advance_delay = delay;
        self
    }

    /// Marks a new stage activation: re-arms the gate and cancels any
    /// pending auto-advance from the previous stage. Call after the
    /// selection changes or playback restarts.
    pub fn begin_stage(&mut self) {
        self.invalidate();
    }

    /// Stops observing: cancels any pending auto-advance and invalidates
    /// deferred effects. Call on pause or teardown.
    pub fn stop(&mut self) {
        self.invalidate();
    }

    /// Feeds one observed playback position for the selected stage.
    ///
    /// Returns true when this observation completed the stage. On
    /// completion the session snapshot is refreshed and a single deferred
    /// auto-advance is scheduled.
    pub async fn observe(&mut self, elapsed_secs: u32) -> Result<bool> {
        let (plan_id, stage_id, duration_secs, already_completed, selected) = {
            let mut session = self.session.lock().await;
            session.set_position(elapsed_secs);
            let stage = session.selected_stage();
            (
                session.plan().id,
                stage.id,
                stage.duration_secs,
                stage.is_completed(),
                session.selected_index(),
            )
        };

        let fired = {
            let mut state = self.state.lock().expect("watcher state poisoned");
            state
                .gate
                .observe(elapsed_secs, duration_secs, already_completed)
        };

        if !fired {
            return Ok(false);
        }

        debug!("stage {stage_id} of plan {plan_id} finished at {elapsed_secs}s");

        let updated = self
            .engine
            .complete_stage(&CompleteStage { plan_id, stage_id })
            .await?;

        {
            let mut session = self.session.lock().await;
            session.refresh(updated);
        }

        self.schedule_advance(selected);

        Ok(true)
    }

    /// Schedules the single deferred auto-advance for the just-completed
    /// stage. Any previous pending advance is replaced.
    fn schedule_advance(&mut self, after_index: usize) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }

        let token = {
            let state = self.state.lock().expect("watcher state poisoned");
            state.activation
        };

        let engine = Arc::clone(&self.engine);
        let session = Arc::clone(&self.session);
        let state = Arc::clone(&self.state);
        let delay = self.advance_delay;

        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;

            // The user may have navigated away while we slept; a stale
            // advance must not move their selection.
            {
                let guard = state.lock().expect("watcher state poisoned");
                if guard.activation != token {
                    return;
                }
            }

            let now = engine.now();
            let mut session = session.lock().await;
            if let Some(target) = session.advance_after(after_index, now) {
                debug!("auto-advanced to stage index {target}");
                let mut guard = state.lock().expect("watcher state poisoned");
                guard.activation += 1;
                guard.gate.reset();
            }
        }));
    }

    fn invalidate(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
        let mut state = self.state.lock().expect("watcher state poisoned");
        state.activation += 1;
        state.gate.reset();
    }

    #[cfg(test)]
    async fn wait_pending(&mut self) {
        if let Some(handle) = self.pending.take() {
            // Aborted handles surface a JoinError; either outcome settles
            // the deferred work.
            let _ = handle.await;
        }
    }
}

impl Drop for PlaybackWatcher {
    fn drop(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;
    use tempfile::TempDir;

    use super::*;
    use crate::{
        clock::FixedClock,
        params::{CreatePlan, Id, StageSpec},
        progression::ProgressionBuilder,
    };

    fn ts(raw: &str) -> Timestamp {
        raw.parse().unwrap()
    }

    fn spec(title: &str, duration_secs: u32, scheduled_at: Option<&str>) -> StageSpec {
        StageSpec {
            title: title.to_string(),
            description: None,
            duration_secs,
            scheduled_at: scheduled_at.map(String::from),
        }
    }

    async fn engine_with_plan(
        stages: Vec<StageSpec>,
    ) -> (TempDir, Arc<ProgressionEngine>, u64, Arc<FixedClock>) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test.db");
        let clock = Arc::new(FixedClock::new(ts("2026-03-05T12:00:00Z")));
        let engine = ProgressionBuilder::new()
            .with_database_path(Some(&db_path))
            .with_clock(clock.clone())
            .build()
            .await
            .expect("Failed to create engine");

        let plan = engine
            .create_plan(&CreatePlan {
                title: "Deep Rest".to_string(),
                description: None,
                stages,
            })
            .await
            .expect("Failed to create plan");

        (temp_dir, Arc::new(engine), plan.id, clock)
    }

    async fn watcher_for(
        engine: &Arc<ProgressionEngine>,
        plan_id: u64,
    ) -> (Arc<Mutex<PlanSession>>, PlaybackWatcher) {
        let session = Arc::new(Mutex::new(
            engine.open_session(plan_id).await.expect("session opens"),
        ));
        let watcher = PlaybackWatcher::new(Arc::clone(engine), Arc::clone(&session));
        (session, watcher)
    }

    #[test]
    fn gate_fires_once_inside_tolerance() {
        let mut gate = CompletionGate::new();
        assert!(!gate.observe(598, 600, false));
        assert!(gate.observe(599, 600, false));
        // Later polls at higher positions stay quiet.
        assert!(!gate.observe(600, 600, false));
        assert!(!gate.observe(601, 600, false));
        assert!(gate.has_fired());
    }

    #[test]
    fn gate_ignores_zero_elapsed_and_completed_stages() {
        let mut gate = CompletionGate::with_tolerance(600);
        // Tolerance larger than the duration must not fire at 0.
        assert!(!gate.observe(0, 600, false));

        let mut gate = CompletionGate::new();
        assert!(!gate.observe(600, 600, true));
        assert!(!gate.has_fired());
    }

    #[test]
    fn gate_rearms_on_reset() {
        let mut gate = CompletionGate::new();
        assert!(gate.observe(600, 600, false));
        gate.reset();
        assert!(gate.observe(900, 900, false));
    }

    #[tokio::test(start_paused = true)]
    async fn completes_exactly_once_across_repeated_polls() {
        let (_tmp, engine, plan_id, _clock) =
            engine_with_plan(vec![spec("Breath", 600, None), spec("Body scan", 900, None)])
                .await;
        let (_session, mut watcher) = watcher_for(&engine, plan_id).await;

        assert!(!watcher.observe(598).await.unwrap());
        assert!(watcher.observe(601).await.unwrap());
        assert!(!watcher.observe(602).await.unwrap());
        assert!(!watcher.observe(603).await.unwrap());

        let plan = engine
            .get_plan(&Id { id: plan_id })
            .await
            .unwrap()
            .unwrap();
        assert_eq!(plan.completed_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn advances_to_next_stage_after_delay() {
        let (_tmp, engine, plan_id, _clock) =
            engine_with_plan(vec![spec("Breath", 600, None), spec("Body scan", 900, None)])
                .await;
        let (session, mut watcher) = watcher_for(&engine, plan_id).await;

        assert_eq!(session.lock().await.selected_index(), 0);
        assert!(watcher.observe(600).await.unwrap());

        // Selection holds until the deferred advance runs.
        assert_eq!(session.lock().await.selected_index(), 0);
        watcher.wait_pending().await;
        assert_eq!(session.lock().await.selected_index(), 1);
        assert_eq!(session.lock().await.position_secs(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn stage_switch_cancels_pending_advance() {
        let (_tmp, engine, plan_id, _clock) =
            engine_with_plan(vec![spec("Breath", 600, None), spec("Body scan", 900, None)])
                .await;
        let (session, mut watcher) = watcher_for(&engine, plan_id).await;

        assert!(watcher.observe(600).await.unwrap());

        // The user navigates back to the completed stage before the delay
        // elapses; the stale advance must not yank them forward.
        {
            let mut guard = session.lock().await;
            guard.select(0, engine.now()).unwrap();
        }
        watcher.begin_stage();

        watcher.wait_pending().await;
        assert_eq!(session.lock().await.selected_index(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn completed_plan_does_not_advance() {
        let (_tmp, engine, plan_id, _clock) =
            engine_with_plan(vec![spec("Breath", 600, None)]).await;
        let (session, mut watcher) = watcher_for(&engine, plan_id).await;

        assert!(watcher.observe(600).await.unwrap());
        watcher.wait_pending().await;

        // Single-stage plan: nothing to advance to, selection stays.
        assert_eq!(session.lock().await.selected_index(), 0);
        let plan = engine
            .get_plan(&Id { id: plan_id })
            .await
            .unwrap()
            .unwrap();
        assert!(plan.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn advance_skips_date_locked_stage() {
        let (_tmp, engine, plan_id, _clock) = engine_with_plan(vec![
            spec("Breath", 600, None),
            spec("Body scan", 900, Some("2099-01-01T00:00:00Z")),
            spec("Rest", 720, None),
        ])
        .await;
        let (session, mut watcher) = watcher_for(&engine, plan_id).await;

        assert!(watcher.observe(600).await.unwrap());
        watcher.wait_pending().await;

        // Stage 1 is calendar-locked; stage 2's prerequisite (stage 1) is
        // incomplete, so no advance happens at all.
        assert_eq!(session.lock().await.selected_index(), 0);
    }
}
