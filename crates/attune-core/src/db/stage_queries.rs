//! Stage queries and progression mutations.

use jiff::Timestamp;
use rusqlite::{params, types::Type, OptionalExtension, Row};

use crate::{
    error::{DatabaseResultExt, ProgressionError, Result},
    models::{Plan, PlanStatus, Stage, StageStatus},
};

// SQL queries as const strings
const SELECT_STAGES_BY_PLAN_SQL: &str = "SELECT id, plan_id, title, description, duration_secs, scheduled_at, audio_ref, status, stage_order, created_at, updated_at FROM stages WHERE plan_id = ?1 ORDER BY stage_order";
const SELECT_STAGE_BY_ID_SQL: &str = "SELECT id, plan_id, title, description, duration_secs, scheduled_at, audio_ref, status, stage_order, created_at, updated_at FROM stages WHERE id = ?1";
const SELECT_STAGE_STATE_SQL: &str = "SELECT plan_id, status FROM stages WHERE id = ?1";
const COMPLETE_STAGE_SQL: &str =
    "UPDATE stages SET status = ?1, updated_at = ?2 WHERE id = ?3";
const COUNT_INCOMPLETE_STAGES_SQL: &str =
    "SELECT COUNT(*) FROM stages WHERE plan_id = ?1 AND status != 'completed'";
const UPDATE_PLAN_STATUS_SQL: &str = "UPDATE plans SET status = ?1, updated_at = ?2 WHERE id = ?3";
const UPDATE_PLAN_TIMESTAMP_SQL: &str = "UPDATE plans SET updated_at = ?1 WHERE id = ?2";
const UPDATE_STAGE_CONTENT_SQL: &str = "UPDATE stages SET status = ?1, audio_ref = COALESCE(?2, audio_ref), updated_at = ?3 WHERE id = ?4";

/// Helper function to construct a Stage from a database row
fn build_stage_from_row(row: &Row) -> rusqlite::Result<Stage> {
    let status_str: String = row.get(7)?;
    let status = status_str.parse::<StageStatus>().map_err(|_| {
        rusqlite::Error::FromSqlConversionFailure(
            7,
            Type::Text,
            format!("Invalid stage status: {status_str}").into(),
        )
    })?;

    let scheduled_at = row
        .get::<_, Option<String>>(5)?
        .map(|raw| {
            raw.parse::<Timestamp>().map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(5, Type::Text, Box::new(e))
            })
        })
        .transpose()?;

    Ok(Stage {
        id: row.get::<_, i64>(0)? as u64,
        plan_id: row.get::<_, i64>(1)? as u64,
        title: row.get(2)?,
        description: row.get(3)?,
        duration_secs: row.get::<_, i64>(4)? as u32,
        scheduled_at,
        audio_ref: row.get(6)?,
        status,
        order: row.get::<_, i64>(8)? as u32,
        created_at: row
            .get::<_, String>(9)?
            .parse::<Timestamp>()
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(9, Type::Text, Box::new(e)))?,
        updated_at: row
            .get::<_, String>(10)?
            .parse::<Timestamp>()
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(10, Type::Text, Box::new(e)))?,
    })
}

impl super::Database {
    /// Retrieves all stages of a plan in stage order.
    pub fn get_stages(&self, plan_id: u64) -> Result<Vec<Stage>> {
        let mut stmt = self
            .connection
            .prepare(SELECT_STAGES_BY_PLAN_SQL)
            .map_err(|e| ProgressionError::database_error("Failed to prepare query", e))?;

        let stages = stmt
            .query_map(params![plan_id as i64], build_stage_from_row)
            .map_err(|e| ProgressionError::database_error("Failed to query stages", e))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| ProgressionError::database_error("Failed to fetch stages", e))?;

        Ok(stages)
    }

    /// Retrieves a single stage by its ID.
    pub fn get_stage(&self, stage_id: u64) -> Result<Option<Stage>> {
        self.connection
            .query_row(SELECT_STAGE_BY_ID_SQL, params![stage_id as i64], build_stage_from_row)
            .optional()
            .map_err(|e| ProgressionError::database_error("Failed to query stage", e))
    }

    /// Marks a stage completed and recomputes the owning plan's status in
    /// the same transaction. Completing an already-completed stage is a
    /// no-op, not an error; double delivery of a completion event must be
    /// absorbed silently.
    ///
    /// Returns the updated plan snapshot.
    pub fn complete_stage(&mut self, plan_id: u64, stage_id: u64, now: Timestamp) -> Result<Plan> {
        let tx = self
            .connection
            .transaction()
            .db_context("Failed to begin transaction")?;

        let state: Option<(i64, String)> = tx
            .query_row(SELECT_STAGE_STATE_SQL, params![stage_id as i64], |row| {
                Ok((row.get(0)?, row.get(1)?))
            })
            .optional()
            .map_err(|e| ProgressionError::database_error("Failed to query stage", e))?;

        let (owner_id, status_str) =
            state.ok_or(ProgressionError::StageNotFound { id: stage_id })?;

        if owner_id as u64 != plan_id {
            // The stage exists but not inside the referenced plan.
            return Err(ProgressionError::StageNotFound { id: stage_id });
        }

        let status = status_str
            .parse::<StageStatus>()
            .map_err(|reason| ProgressionError::Configuration { message: reason })?;

        if status != StageStatus::Completed {
            let now_str = now.to_string();

            tx.execute(
                COMPLETE_STAGE_SQL,
                params![
                    StageStatus::Completed.as_str(),
                    &now_str,
                    stage_id as i64
                ],
            )
            .map_err(|e| ProgressionError::database_error("Failed to complete stage", e))?;

            // Recompute the derived plan status from the stages themselves.
            let incomplete: i64 = tx
                .query_row(COUNT_INCOMPLETE_STAGES_SQL, params![plan_id as i64], |row| {
                    row.get(0)
                })
                .map_err(|e| {
                    ProgressionError::database_error("Failed to count incomplete stages", e)
                })?;

            let plan_status = if incomplete == 0 {
                PlanStatus::Completed
            } else {
                PlanStatus::Active
            };

            tx.execute(
                UPDATE_PLAN_STATUS_SQL,
                params![plan_status.as_str(), &now_str, plan_id as i64],
            )
            .map_err(|e| ProgressionError::database_error("Failed to update plan status", e))?;
        }

        tx.commit().db_context("Failed to commit transaction")?;

        self.get_plan(plan_id)?
            .ok_or(ProgressionError::PlanNotFound { id: plan_id })
    }

    /// Applies a content-preparation transition (`pending → generating →
    /// ready`) and records the audio handle. Backward moves and completed
    /// stages are rejected; completion is only reachable through
    /// [`Self::complete_stage`].
    pub fn update_stage_content(
        &mut self,
        stage_id: u64,
        new_status: StageStatus,
        audio_ref: Option<&str>,
        now: Timestamp,
    ) -> Result<Stage> {
        let tx = self
            .connection
            .transaction()
            .db_context("Failed to begin transaction")?;

        let state: Option<(i64, String)> = tx
            .query_row(SELECT_STAGE_STATE_SQL, params![stage_id as i64], |row| {
                Ok((row.get(0)?, row.get(1)?))
            })
            .optional()
            .map_err(|e| ProgressionError::database_error("Failed to query stage", e))?;

        let (plan_id, status_str) =
            state.ok_or(ProgressionError::StageNotFound { id: stage_id })?;

        let current = status_str
            .parse::<StageStatus>()
            .map_err(|reason| ProgressionError::Configuration { message: reason })?;

        if !current.can_become(new_status) {
            return Err(ProgressionError::invalid_input("status").with_reason(format!(
                "Stage content cannot move from '{}' to '{}'",
                current.as_str(),
                new_status.as_str()
            )));
        }

        let now_str = now.to_string();

        tx.execute(
            UPDATE_STAGE_CONTENT_SQL,
            params![new_status.as_str(), audio_ref, &now_str, stage_id as i64],
        )
        .map_err(|e| ProgressionError::database_error("Failed to update stage content", e))?;

        tx.execute(UPDATE_PLAN_TIMESTAMP_SQL, params![&now_str, plan_id])
            .map_err(|e| ProgressionError::database_error("Failed to update plan timestamp", e))?;

        tx.commit().db_context("Failed to commit transaction")?;

        self.get_stage(stage_id)?
            .ok_or(ProgressionError::StageNotFound { id: stage_id })
    }
}
