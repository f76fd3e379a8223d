//! Stage eligibility policy.
//!
//! Pure predicates over `(stage, index, plan, now)` deciding whether a stage
//! may be entered and, when it may not, why. Gating is conjunctive: a stage
//! needs its predecessor completed AND its calendar gate (if any) passed.
//! Waiting alone never skips the program and rushing alone never outpaces
//! the schedule.
//!
//! All functions here are side-effect free and re-derivable at any instant;
//! nothing is memoized. The current time always arrives as an argument (see
//! [`crate::clock`]).

use jiff::Timestamp;

use crate::models::{Plan, Stage};

/// Decides whether the stage at `index` may be entered at `now`.
///
/// - Index 0 is always unlocked; the entry point has no prerequisite.
/// - A stage whose content is already playable (`ready` or `completed`)
///   stays unlocked no matter what the clock does, so prepared content never
///   flickers back to locked.
/// - Every other stage requires both the preceding stage to be completed and
///   the calendar gate (when present) to have passed.
pub fn is_unlocked(stage: &Stage, index: usize, plan: &Plan, now: Timestamp) -> bool {
    if index == 0 {
        return true;
    }

    if stage.status.is_playable() {
        return true;
    }

    prerequisite_met(index, plan) && calendar_met(stage, now)
}

/// Advisory text explaining why a stage is locked, for display next to a
/// disabled control. Empty when the stage is unlocked.
pub fn unlock_hint(stage: &Stage, index: usize, plan: &Plan, now: Timestamp) -> String {
    if is_unlocked(stage, index, plan, now) {
        return String::new();
    }

    let needs_prerequisite = !prerequisite_met(index, plan);
    let needs_date = !calendar_met(stage, now);

    match (needs_prerequisite, needs_date) {
        (true, true) => format!(
            "Finish the previous stage; unlocks on {}",
            format_gate(stage)
        ),
        (true, false) => "Finish the previous stage first".to_string(),
        (false, true) => format!("Unlocks on {}", format_gate(stage)),
        // is_unlocked returned false, so at least one condition failed
        (false, false) => String::new(),
    }
}

/// Finds the first stage strictly after `after_index` that is incomplete and
/// unlocked at `now`. Returns `None` when the plan is finished or every
/// remaining stage is locked; callers leave their selection unchanged in
/// that case (no forced advance).
pub fn next_eligible(plan: &Plan, after_index: usize, now: Timestamp) -> Option<usize> {
    plan.stages
        .iter()
        .enumerate()
        .skip(after_index + 1)
        .find(|(index, stage)| {
            !stage.is_completed() && is_unlocked(stage, *index, plan, now)
        })
        .map(|(index, _)| index)
}

fn prerequisite_met(index: usize, plan: &Plan) -> bool {
    match index.checked_sub(1).and_then(|i| plan.stages.get(i)) {
        Some(previous) => previous.is_completed(),
        // No predecessor to check means a malformed index; treat as locked.
        None => false,
    }
}

fn calendar_met(stage: &Stage, now: Timestamp) -> bool {
    match stage.scheduled_at {
        Some(gate) => now >= gate,
        None => true,
    }
}

fn format_gate(stage: &Stage) -> String {
    match stage.scheduled_at {
        Some(gate) => gate.strftime("%Y-%m-%d %H:%M UTC").to_string(),
        None => String::new(),
    }
}
