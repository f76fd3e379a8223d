//! End-to-end tests for the attune binary.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Helper to build a command against a temp database
fn attune(temp_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("attune").expect("binary builds");
    cmd.arg("--database-file")
        .arg(temp_dir.path().join("test.db"))
        .arg("--no-color");
    cmd
}

fn create_default_plan(temp_dir: &TempDir) {
    attune(temp_dir)
        .args([
            "plan",
            "create",
            "Deep Rest",
            "--description",
            "A wind-down program",
            "--stage",
            "Breath work,600",
            "--stage",
            "Body scan,900",
            "--stage",
            "Release,720,2099-01-01T00:00:00Z",
        ])
        .assert()
        .success();
}

#[test]
fn help_lists_command_categories() {
    Command::cargo_bin("attune")
        .expect("binary builds")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("plan"))
        .stdout(predicate::str::contains("stage"))
        .stdout(predicate::str::contains("serve"));
}

#[test]
fn create_plan_prints_created_plan() {
    let temp_dir = TempDir::new().unwrap();
    attune(&temp_dir)
        .args([
            "plan",
            "create",
            "Deep Rest",
            "--stage",
            "Breath work,600",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created plan with ID: 1"))
        .stdout(predicate::str::contains("Deep Rest"))
        .stdout(predicate::str::contains("Breath work"));
}

#[test]
fn create_plan_requires_at_least_one_stage() {
    let temp_dir = TempDir::new().unwrap();
    attune(&temp_dir)
        .args(["plan", "create", "Deep Rest"])
        .assert()
        .failure();
}

#[test]
fn create_plan_rejects_zero_duration() {
    let temp_dir = TempDir::new().unwrap();
    attune(&temp_dir)
        .args(["plan", "create", "Deep Rest", "--stage", "Breath work,0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("duration"));
}

#[test]
fn default_command_lists_active_plans() {
    let temp_dir = TempDir::new().unwrap();
    attune(&temp_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("No active plans found"));

    create_default_plan(&temp_dir);

    attune(&temp_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Active Plans"))
        .stdout(predicate::str::contains("Deep Rest"))
        .stdout(predicate::str::contains("(0/3)"));
}

#[test]
fn show_plan_marks_locked_stages() {
    let temp_dir = TempDir::new().unwrap();
    create_default_plan(&temp_dir);

    attune(&temp_dir)
        .args(["plan", "show", "1"])
        .assert()
        .success()
        // Stage 0 is open, stages 1 and 2 are still locked.
        .stdout(predicate::str::contains("Breath work"))
        .stdout(predicate::str::contains("🔒"))
        .stdout(predicate::str::contains("Finish the previous stage"))
        .stdout(predicate::str::contains("2099-01-01"));
}

#[test]
fn show_missing_plan_reports_not_found() {
    let temp_dir = TempDir::new().unwrap();
    attune(&temp_dir)
        .args(["plan", "show", "42"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Plan with ID 42 not found"));
}

#[test]
fn rename_plan_validates_title() {
    let temp_dir = TempDir::new().unwrap();
    create_default_plan(&temp_dir);

    attune(&temp_dir)
        .args(["plan", "rename", "1", "Evening Calm"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Updated plan with ID: 1"))
        .stdout(predicate::str::contains("Evening Calm"));

    attune(&temp_dir)
        .args(["plan", "rename", "1", "   "])
        .assert()
        .failure()
        .stderr(predicate::str::contains("title"));
}

#[test]
fn delete_plan_requires_confirmation() {
    let temp_dir = TempDir::new().unwrap();
    create_default_plan(&temp_dir);

    attune(&temp_dir)
        .args(["plan", "delete", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("confirmation"));

    attune(&temp_dir)
        .args(["plan", "delete", "1", "--confirm"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted plan"));

    attune(&temp_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("No active plans found"));
}

#[test]
fn complete_stage_updates_progress_and_is_idempotent() {
    let temp_dir = TempDir::new().unwrap();
    create_default_plan(&temp_dir);

    attune(&temp_dir)
        .args(["stage", "complete", "1", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1/3 stages done"));

    // Re-delivery of the completion is absorbed, not an error.
    attune(&temp_dir)
        .args(["stage", "complete", "1", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1/3 stages done"));

    // Stage 1 has no calendar gate, so finishing stage 0 unlocked it.
    attune(&temp_dir)
        .args(["plan", "show", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("✓ Completed"));
}

#[test]
fn complete_stage_unknown_plan_fails() {
    let temp_dir = TempDir::new().unwrap();
    create_default_plan(&temp_dir);

    attune(&temp_dir)
        .args(["stage", "complete", "42", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Plan with ID 42 not found"));
}

#[test]
fn stage_content_moves_forward_only() {
    let temp_dir = TempDir::new().unwrap();
    create_default_plan(&temp_dir);

    attune(&temp_dir)
        .args(["stage", "content", "1", "generating"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Content status is now 'generating'"));

    attune(&temp_dir)
        .args([
            "stage",
            "content",
            "1",
            "ready",
            "--audio-ref",
            "audio/breath-01.ogg",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Content status is now 'ready'"))
        .stdout(predicate::str::contains("audio/breath-01.ogg"));

    // Backward move is rejected.
    attune(&temp_dir)
        .args(["stage", "content", "1", "generating"])
        .assert()
        .failure();
}

#[test]
fn stage_list_shows_sequence_in_order() {
    let temp_dir = TempDir::new().unwrap();
    create_default_plan(&temp_dir);

    attune(&temp_dir)
        .args(["stage", "list", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1. Breath work"))
        .stdout(predicate::str::contains("2. Body scan"))
        .stdout(predicate::str::contains("3. Release"));

    attune(&temp_dir)
        .args(["stage", "list", "42"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Plan with ID 42 not found"));
}

#[test]
fn stage_show_displays_schedule() {
    let temp_dir = TempDir::new().unwrap();
    create_default_plan(&temp_dir);

    attune(&temp_dir)
        .args(["stage", "show", "3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Release"))
        .stdout(predicate::str::contains("Scheduled"));

    attune(&temp_dir)
        .args(["stage", "show", "42"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Stage with ID 42 not found"));
}

#[test]
fn completed_plan_moves_to_completed_list() {
    let temp_dir = TempDir::new().unwrap();
    attune(&temp_dir)
        .args(["plan", "create", "Short Sit", "--stage", "Sit,300"])
        .assert()
        .success();

    attune(&temp_dir)
        .args(["stage", "complete", "1", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1/1 stages done"));

    attune(&temp_dir)
        .args(["plan", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No active plans found"));

    attune(&temp_dir)
        .args(["plan", "list", "--completed"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Completed Plans"))
        .stdout(predicate::str::contains("Short Sit"));
}
