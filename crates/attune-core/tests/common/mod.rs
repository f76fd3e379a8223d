use std::sync::Arc;

use attune_core::{clock::FixedClock, ProgressionBuilder, ProgressionEngine};
use jiff::Timestamp;
use tempfile::TempDir;

/// Helper function to create a test engine pinned to a fixed instant
pub async fn create_test_engine(now: &str) -> (TempDir, ProgressionEngine, Arc<FixedClock>) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("test.db");
    let clock = Arc::new(FixedClock::new(
        now.parse::<Timestamp>().expect("valid timestamp"),
    ));
    let engine = ProgressionBuilder::new()
        .with_database_path(Some(&db_path))
        .with_clock(clock.clone())
        .build()
        .await
        .expect("Failed to create engine");
    (temp_dir, engine, clock)
}
