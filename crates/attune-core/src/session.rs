//! Transient listening session over a plan.
//!
//! A [`PlanSession`] is UI-session-scoped state: which stage the listener is
//! currently looking at and how far playback has progressed. It is
//! deliberately decoupled from the persisted progress counter (browsing
//! unlocked stages never implies completing them) and is never written to
//! storage.

use jiff::Timestamp;

use crate::{
    error::{ProgressionError, Result},
    models::{Plan, Stage},
    unlock,
};

/// Selection and playback-position state for one plan.
#[derive(Debug, Clone)]
pub struct PlanSession {
    plan: Plan,
    selected: usize,
    position_secs: u32,
}

impl PlanSession {
    /// Opens a session on a plan snapshot, selecting the next incomplete
    /// stage (or the last stage when the plan is finished).
    pub fn new(plan: Plan) -> Self {
        let last = plan.stages.len().saturating_sub(1);
        let selected = plan.current_stage_index().min(last);
        Self {
            plan,
            selected,
            position_secs: 0,
        }
    }

    /// The plan snapshot this session is browsing.
    pub fn plan(&self) -> &Plan {
        &self.plan
    }

    /// Currently selected stage index.
    pub fn selected_index(&self) -> usize {
        self.selected
    }

    /// Currently selected stage.
    pub fn selected_stage(&self) -> &Stage {
        &self.plan.stages[self.selected]
    }

    /// Current playback position within the selected stage.
    pub fn position_secs(&self) -> u32 {
        self.position_secs
    }

    /// Records the observed playback position.
    pub fn set_position(&mut self, secs: u32) {
        self.position_secs = secs;
    }

    /// Selects the stage at `index`, resetting the playback position.
    ///
    /// # Errors
    ///
    /// * `ProgressionError::InvalidInput` - `index` is out of range
    /// * `ProgressionError::StageLocked` - the stage's unlock conditions are
    ///   not met at `now`; the hint explains which
    pub fn select(&mut self, index: usize, now: Timestamp) -> Result<()> {
        let stage = self.plan.stages.get(index).ok_or_else(|| {
            ProgressionError::invalid_input("index").with_reason(format!(
                "Stage index {index} is out of range. Plan has {} stages",
                self.plan.stages.len()
            ))
        })?;

        if !unlock::is_unlocked(stage, index, &self.plan, now) {
            return Err(ProgressionError::StageLocked {
                plan_id: self.plan.id,
                index,
                hint: unlock::unlock_hint(stage, index, &self.plan, now),
            });
        }

        self.selected = index;
        self.position_secs = 0;
        Ok(())
    }

    /// Moves the selection one stage forward when that stage exists and is
    /// unlocked. Returns whether the selection moved; boundary and locked
    /// cases are silent no-ops, matching a disabled skip button.
    pub fn next(&mut self, now: Timestamp) -> bool {
        self.try_step(self.selected + 1, now)
    }

    /// Moves the selection one stage back when that stage exists and is
    /// unlocked. Silent no-op at the first stage.
    pub fn previous(&mut self, now: Timestamp) -> bool {
        match self.selected.checked_sub(1) {
            Some(index) => self.try_step(index, now),
            None => false,
        }
    }

    /// Advances to the first incomplete unlocked stage strictly after
    /// `index`, if any. The selection is left unchanged when nothing
    /// qualifies.
    pub fn advance_after(&mut self, index: usize, now: Timestamp) -> Option<usize> {
        let target = unlock::next_eligible(&self.plan, index, now)?;
        self.selected = target;
        self.position_secs = 0;
        Some(target)
    }

    /// Adopts a newer plan snapshot (e.g. after a completion was persisted),
    /// clamping the selection if the snapshot shrank.
    pub fn refresh(&mut self, plan: Plan) {
        let last = plan.stages.len().saturating_sub(1);
        self.selected = self.selected.min(last);
        self.plan = plan;
    }

    fn try_step(&mut self, index: usize, now: Timestamp) -> bool {
        match self.plan.stages.get(index) {
            Some(stage) if unlock::is_unlocked(stage, index, &self.plan, now) => {
                self.selected = index;
                self.position_secs = 0;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;

    use super::*;
    use crate::models::{PlanStatus, StageStatus};

    fn ts(raw: &str) -> Timestamp {
        raw.parse().unwrap()
    }

    fn now() -> Timestamp {
        ts("2026-03-05T12:00:00Z")
    }

    fn stage(id: u64, order: u32, status: StageStatus, scheduled_at: Option<&str>) -> Stage {
        Stage {
            id,
            plan_id: 1,
            title: format!("Stage {order}"),
            description: None,
            duration_secs: 600,
            scheduled_at: scheduled_at.map(ts),
            audio_ref: None,
            status,
            order,
            created_at: ts("2026-03-01T00:00:00Z"),
            updated_at: ts("2026-03-01T00:00:00Z"),
        }
    }

    fn plan(stages: Vec<Stage>) -> Plan {
        Plan {
            id: 1,
            title: "Deep Rest".to_string(),
            description: None,
            status: PlanStatus::Active,
            total_duration_secs: stages.iter().map(|s| s.duration_secs).sum(),
            created_at: ts("2026-03-01T00:00:00Z"),
            updated_at: ts("2026-03-01T00:00:00Z"),
            stages,
        }
    }

    #[test]
    fn opens_on_next_incomplete_stage() {
        let session = PlanSession::new(plan(vec![
            stage(10, 0, StageStatus::Completed, None),
            stage(11, 1, StageStatus::Ready, None),
            stage(12, 2, StageStatus::Pending, None),
        ]));
        assert_eq!(session.selected_index(), 1);
    }

    #[test]
    fn opens_on_last_stage_when_finished() {
        let session = PlanSession::new(plan(vec![
            stage(10, 0, StageStatus::Completed, None),
            stage(11, 1, StageStatus::Completed, None),
        ]));
        assert_eq!(session.selected_index(), 1);
    }

    #[test]
    fn select_locked_stage_fails_with_hint() {
        let mut session = PlanSession::new(plan(vec![
            stage(10, 0, StageStatus::Ready, None),
            stage(11, 1, StageStatus::Pending, Some("2099-01-01T00:00:00Z")),
        ]));

        let err = session.select(1, now()).unwrap_err();
        match err {
            ProgressionError::StageLocked { index, hint, .. } => {
                assert_eq!(index, 1);
                assert!(hint.contains("previous stage"));
                assert!(hint.contains("2099-01-01"));
            }
            other => panic!("Expected StageLocked, got {other:?}"),
        }
        assert_eq!(session.selected_index(), 0);
    }

    #[test]
    fn select_out_of_range_is_invalid_input() {
        let mut session = PlanSession::new(plan(vec![stage(10, 0, StageStatus::Ready, None)]));
        let err = session.select(5, now()).unwrap_err();
        assert!(matches!(err, ProgressionError::InvalidInput { .. }));
    }

    #[test]
    fn select_resets_playback_position() {
        let mut session = PlanSession::new(plan(vec![
            stage(10, 0, StageStatus::Completed, None),
            stage(11, 1, StageStatus::Ready, None),
        ]));
        session.set_position(123);
        session.select(0, now()).expect("completed stage is selectable");
        assert_eq!(session.position_secs(), 0);
    }

    #[test]
    fn navigation_is_a_noop_at_boundaries() {
        let mut session = PlanSession::new(plan(vec![stage(10, 0, StageStatus::Ready, None)]));
        assert!(!session.previous(now()));
        assert!(!session.next(now()));
        assert_eq!(session.selected_index(), 0);
    }

    #[test]
    fn next_refuses_locked_neighbor() {
        let mut session = PlanSession::new(plan(vec![
            stage(10, 0, StageStatus::Ready, None),
            stage(11, 1, StageStatus::Pending, None),
        ]));
        // Stage 1's prerequisite is incomplete; next must not move.
        assert!(!session.next(now()));
        assert_eq!(session.selected_index(), 0);
    }

    #[test]
    fn previous_moves_to_completed_stage() {
        let mut session = PlanSession::new(plan(vec![
            stage(10, 0, StageStatus::Completed, None),
            stage(11, 1, StageStatus::Ready, None),
        ]));
        assert_eq!(session.selected_index(), 1);
        assert!(session.previous(now()));
        assert_eq!(session.selected_index(), 0);
    }

    #[test]
    fn advance_after_skips_locked_gap() {
        let mut session = PlanSession::new(plan(vec![
            stage(10, 0, StageStatus::Completed, None),
            stage(11, 1, StageStatus::Pending, Some("2099-01-01T00:00:00Z")),
            stage(12, 2, StageStatus::Ready, None),
        ]));
        assert_eq!(session.advance_after(0, now()), Some(2));
        assert_eq!(session.selected_index(), 2);
        assert_eq!(session.position_secs(), 0);
    }

    #[test]
    fn advance_after_keeps_selection_when_nothing_eligible() {
        let mut session = PlanSession::new(plan(vec![
            stage(10, 0, StageStatus::Completed, None),
            stage(11, 1, StageStatus::Completed, None),
        ]));
        session.select(0, now()).unwrap();
        assert_eq!(session.advance_after(1, now()), None);
        assert_eq!(session.selected_index(), 0);
    }

    #[test]
    fn refresh_adopts_snapshot_and_clamps() {
        let mut session = PlanSession::new(plan(vec![
            stage(10, 0, StageStatus::Completed, None),
            stage(11, 1, StageStatus::Ready, None),
        ]));
        assert_eq!(session.selected_index(), 1);

        let mut updated = session.plan().clone();
        updated.stages[1].status = StageStatus::Completed;
        session.refresh(updated);
        assert_eq!(session.plan().completed_count(), 2);
        assert_eq!(session.selected_index(), 1);
    }
}
