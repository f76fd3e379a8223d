//! Tests for the data models.

use jiff::Timestamp;

use super::*;

fn ts() -> Timestamp {
    "2026-03-01T09:00:00Z".parse().unwrap()
}

fn stage(id: u64, order: u32, status: StageStatus) -> Stage {
    Stage {
        id,
        plan_id: 1,
        title: format!("Stage {order}"),
        description: None,
        duration_secs: 600,
        scheduled_at: None,
        audio_ref: None,
        status,
        order,
        created_at: ts(),
        updated_at: ts(),
    }
}

fn plan(stages: Vec<Stage>) -> Plan {
    let total: u32 = stages.iter().map(|s| s.duration_secs).sum();
    Plan {
        id: 1,
        title: "Deep Rest".to_string(),
        description: Some("A four week wind-down program".to_string()),
        status: PlanStatus::Active,
        total_duration_secs: total,
        created_at: ts(),
        updated_at: ts(),
        stages,
    }
}

#[test]
fn plan_status_round_trips_through_strings() {
    for status in [PlanStatus::Draft, PlanStatus::Active, PlanStatus::Completed] {
        assert_eq!(status.as_str().parse::<PlanStatus>(), Ok(status));
    }
    assert!("bogus".parse::<PlanStatus>().is_err());
}

#[test]
fn stage_status_round_trips_through_strings() {
    for status in [
        StageStatus::Pending,
        StageStatus::Generating,
        StageStatus::Ready,
        StageStatus::Completed,
    ] {
        assert_eq!(status.as_str().parse::<StageStatus>(), Ok(status));
    }
    assert!("archived".parse::<StageStatus>().is_err());
}

#[test]
fn stage_status_icons() {
    assert_eq!(StageStatus::Completed.with_icon(), "✓ Completed");
    assert_eq!(StageStatus::Ready.with_icon(), "▶ Ready");
    assert_eq!(StageStatus::Generating.with_icon(), "… Generating");
    assert_eq!(StageStatus::Pending.with_icon(), "○ Pending");
}

#[test]
fn playability_covers_ready_and_completed() {
    assert!(StageStatus::Ready.is_playable());
    assert!(StageStatus::Completed.is_playable());
    assert!(!StageStatus::Pending.is_playable());
    assert!(!StageStatus::Generating.is_playable());
}

#[test]
fn content_transitions_only_move_forward() {
    assert!(StageStatus::Pending.can_become(StageStatus::Generating));
    assert!(StageStatus::Pending.can_become(StageStatus::Ready));
    assert!(StageStatus::Generating.can_become(StageStatus::Ready));

    // No backward moves
    assert!(!StageStatus::Ready.can_become(StageStatus::Generating));
    assert!(!StageStatus::Generating.can_become(StageStatus::Pending));

    // Completion is never a content transition
    assert!(!StageStatus::Ready.can_become(StageStatus::Completed));
    assert!(!StageStatus::Completed.can_become(StageStatus::Ready));
}

#[test]
fn completed_count_and_current_index_follow_stage_statuses() {
    let p = plan(vec![
        stage(10, 0, StageStatus::Completed),
        stage(11, 1, StageStatus::Completed),
        stage(12, 2, StageStatus::Ready),
        stage(13, 3, StageStatus::Pending),
    ]);
    assert_eq!(p.completed_count(), 2);
    assert_eq!(p.current_stage_index(), 2);
    assert!(!p.is_finished());
    assert_eq!(p.derived_status(), PlanStatus::Active);
}

#[test]
fn plan_finishes_when_all_stages_complete() {
    let p = plan(vec![
        stage(10, 0, StageStatus::Completed),
        stage(11, 1, StageStatus::Completed),
    ]);
    assert!(p.is_finished());
    assert_eq!(p.current_stage_index(), 2);
    assert_eq!(p.derived_status(), PlanStatus::Completed);
}

#[test]
fn empty_plan_is_not_finished() {
    // Construction rejects empty stage lists; the derivation still has to be
    // total over the value.
    let p = plan(vec![]);
    assert!(!p.is_finished());
    assert_eq!(p.derived_status(), PlanStatus::Active);
}

#[test]
fn stage_by_id_returns_index_and_stage() {
    let p = plan(vec![
        stage(10, 0, StageStatus::Ready),
        stage(11, 1, StageStatus::Pending),
    ]);
    let (idx, found) = p.stage_by_id(11).expect("stage should exist");
    assert_eq!(idx, 1);
    assert_eq!(found.title, "Stage 1");
    assert!(p.stage_by_id(99).is_none());
}

#[test]
fn summary_counts_stages() {
    let p = plan(vec![
        stage(10, 0, StageStatus::Completed),
        stage(11, 1, StageStatus::Ready),
        stage(12, 2, StageStatus::Pending),
    ]);
    let summary = PlanSummary::from(&p);
    assert_eq!(summary.total_stages, 3);
    assert_eq!(summary.completed_stages, 1);
    assert_eq!(summary.remaining_stages, 2);
    assert_eq!(summary.total_duration_secs, 1800);
}

#[test]
fn list_params_convert_to_status_filter() {
    let filter = PlanFilter::from(&crate::params::ListPlans { completed: false });
    assert_eq!(filter.status, Some(PlanStatus::Active));

    let filter = PlanFilter::from(&crate::params::ListPlans { completed: true });
    assert_eq!(filter.status, Some(PlanStatus::Completed));
}
