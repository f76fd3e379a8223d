//! Plan CRUD operations and queries.

use jiff::Timestamp;
use rusqlite::{params, types::Type, OptionalExtension, Row};

use crate::{
    error::{DatabaseResultExt, ProgressionError, Result},
    models::{Plan, PlanFilter, PlanStatus, PlanSummary},
    params::CreatePlan,
};

// SQL queries as const strings
const INSERT_PLAN_SQL: &str = "INSERT INTO plans (title, description, status, total_duration_secs, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6)";
const INSERT_STAGE_SQL: &str = "INSERT INTO stages (plan_id, title, description, duration_secs, scheduled_at, status, stage_order, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)";
const SELECT_PLAN_SQL: &str = "SELECT id, title, description, status, total_duration_secs, created_at, updated_at FROM plans WHERE id = ?1";
const CHECK_PLAN_EXISTS_SQL: &str = "SELECT EXISTS(SELECT 1 FROM plans WHERE id = ?1)";
const RENAME_PLAN_SQL: &str = "UPDATE plans SET title = ?1, updated_at = ?2 WHERE id = ?3";
const DELETE_PLAN_STAGES_SQL: &str = "DELETE FROM stages WHERE plan_id = ?1";
const DELETE_PLAN_SQL: &str = "DELETE FROM plans WHERE id = ?1";

const PLAN_SUMMARY_COLUMNS: &str = "id, title, description, status, total_duration_secs, created_at, updated_at, total_stages, completed_stages, remaining_stages";
const PLAN_SUMMARIES_VIEW: &str = "plan_summaries";

/// Maps a `plans` row (in `SELECT_PLAN_SQL` column order) to a [`Plan`] with
/// no stages loaded.
fn build_plan_from_row(row: &Row) -> rusqlite::Result<Plan> {
    let status_str: String = row.get(3)?;
    let status = status_str.parse::<PlanStatus>().map_err(|_| {
        rusqlite::Error::FromSqlConversionFailure(
            3,
            Type::Text,
            format!("Invalid plan status: {status_str}").into(),
        )
    })?;

    Ok(Plan {
        id: row.get::<_, i64>(0)? as u64,
        title: row.get(1)?,
        description: row.get(2)?,
        status,
        total_duration_secs: row.get::<_, i64>(4)? as u32,
        created_at: row
            .get::<_, String>(5)?
            .parse::<Timestamp>()
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(5, Type::Text, Box::new(e)))?,
        updated_at: row
            .get::<_, String>(6)?
            .parse::<Timestamp>()
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(6, Type::Text, Box::new(e)))?,
        stages: Vec::new(),
    })
}

impl super::Database {
    /// Creates a plan together with its full stage sequence in one
    /// transaction. `schedules` carries the parsed calendar gates in stage
    /// order; callers validate params before reaching this layer.
    pub fn create_plan(
        &mut self,
        plan: &CreatePlan,
        schedules: &[Option<Timestamp>],
        now: Timestamp,
    ) -> Result<Plan> {
        let tx = self
            .connection
            .transaction()
            .db_context("Failed to begin transaction")?;

        let now_str = now.to_string();
        let total_duration_secs: u32 = plan.stages.iter().map(|s| s.duration_secs).sum();

        tx.execute(
            INSERT_PLAN_SQL,
            params![
                &plan.title,
                plan.description.as_deref(),
                PlanStatus::Active.as_str(),
                i64::from(total_duration_secs),
                &now_str,
                &now_str
            ],
        )
        .map_err(|e| ProgressionError::database_error("Failed to insert plan", e))?;

        let plan_id = tx.last_insert_rowid() as u64;

        for (order, spec) in plan.stages.iter().enumerate() {
            tx.execute(
                INSERT_STAGE_SQL,
                params![
                    plan_id as i64,
                    &spec.title,
                    spec.description.as_deref(),
                    i64::from(spec.duration_secs),
                    schedules[order].map(|t| t.to_string()),
                    "pending",
                    order as i64,
                    &now_str,
                    &now_str
                ],
            )
            .map_err(|e| ProgressionError::database_error("Failed to insert stage", e))?;
        }

        tx.commit().db_context("Failed to commit transaction")?;

        self.get_plan(plan_id)?
            .ok_or(ProgressionError::PlanNotFound { id: plan_id })
    }

    /// Retrieves a plan by its ID with stages eagerly loaded.
    pub fn get_plan(&self, id: u64) -> Result<Option<Plan>> {
        let mut stmt = self
            .connection
            .prepare(SELECT_PLAN_SQL)
            .map_err(|e| ProgressionError::database_error("Failed to prepare query", e))?;

        let mut plan = stmt
            .query_row(params![id as i64], build_plan_from_row)
            .optional()
            .map_err(|e| ProgressionError::database_error("Failed to query plan", e))?;

        if let Some(ref mut plan) = plan {
            plan.stages = self.get_stages(plan.id)?;
        }

        Ok(plan)
    }

    /// Lists plan summaries with optional filtering, newest first.
    ///
    /// Counts come from the `plan_summaries` view, which derives them from
    /// stage statuses the same way [`Plan`] does in memory.
    pub fn list_plan_summaries(&self, filter: Option<&PlanFilter>) -> Result<Vec<PlanSummary>> {
        let mut query = format!("SELECT {PLAN_SUMMARY_COLUMNS} FROM {PLAN_SUMMARIES_VIEW}");

        let mut conditions = Vec::new();
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(f) = filter {
            if let Some(ref title) = f.title_contains {
                conditions.push("title LIKE ?");
                params_vec.push(Box::new(format!("%{title}%")));
            }

            if let Some(ref status) = f.status {
                conditions.push("status = ?");
                params_vec.push(Box::new(status.as_str().to_string()));
            }
        }

        if !conditions.is_empty() {
            query.push_str(" WHERE ");
            query.push_str(&conditions.join(" AND "));
        }

        query.push_str(" ORDER BY created_at DESC");

        let mut stmt = self
            .connection
            .prepare(&query)
            .map_err(|e| ProgressionError::database_error("Failed to prepare query", e))?;

        let params_refs: Vec<&dyn rusqlite::ToSql> = params_vec.iter().map(|b| &**b).collect();

        let summaries = stmt
            .query_map(&params_refs[..], |row| {
                let status_str: String = row.get(3)?;
                let status = status_str.parse::<PlanStatus>().map_err(|_| {
                    rusqlite::Error::FromSqlConversionFailure(
                        3,
                        Type::Text,
                        format!("Invalid plan status: {status_str}").into(),
                    )
                })?;

                Ok(PlanSummary {
                    id: row.get::<_, i64>(0)? as u64,
                    title: row.get(1)?,
                    description: row.get(2)?,
                    status,
                    total_duration_secs: row.get::<_, i64>(4)? as u32,
                    created_at: row.get::<_, String>(5)?.parse::<Timestamp>().map_err(
                        |e| rusqlite::Error::FromSqlConversionFailure(5, Type::Text, Box::new(e)),
                    )?,
                    updated_at: row.get::<_, String>(6)?.parse::<Timestamp>().map_err(
                        |e| rusqlite::Error::FromSqlConversionFailure(6, Type::Text, Box::new(e)),
                    )?,
                    total_stages: row.get::<_, i64>(7)? as u32,
                    completed_stages: row.get::<_, i64>(8)? as u32,
                    remaining_stages: row.get::<_, i64>(9)? as u32,
                })
            })
            .map_err(|e| ProgressionError::database_error("Failed to query plan summaries", e))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| ProgressionError::database_error("Failed to fetch plan summaries", e))?;

        Ok(summaries)
    }

    /// Replaces a plan's title. The title is validated by the caller.
    pub fn rename_plan(&mut self, id: u64, title: &str, now: Timestamp) -> Result<Plan> {
        let tx = self
            .connection
            .transaction()
            .db_context("Failed to begin transaction")?;

        let rows_affected = tx
            .execute(RENAME_PLAN_SQL, params![title, now.to_string(), id as i64])
            .map_err(|e| ProgressionError::database_error("Failed to rename plan", e))?;

        if rows_affected == 0 {
            return Err(ProgressionError::PlanNotFound { id });
        }

        tx.commit().db_context("Failed to commit transaction")?;

        self.get_plan(id)?
            .ok_or(ProgressionError::PlanNotFound { id })
    }

    /// Permanently deletes a plan and all its stages.
    /// This operation cannot be undone.
    pub fn delete_plan(&mut self, id: u64) -> Result<()> {
        let tx = self
            .connection
            .transaction()
            .db_context("Failed to begin transaction")?;

        let exists: bool = tx
            .query_row(CHECK_PLAN_EXISTS_SQL, params![id as i64], |row| row.get(0))
            .map_err(|e| ProgressionError::database_error("Failed to check plan existence", e))?;

        if !exists {
            return Err(ProgressionError::PlanNotFound { id });
        }

        // Foreign key constraints cascade this, but be explicit.
        tx.execute(DELETE_PLAN_STAGES_SQL, params![id as i64])
            .map_err(|e| ProgressionError::database_error("Failed to delete plan stages", e))?;

        tx.execute(DELETE_PLAN_SQL, params![id as i64])
            .map_err(|e| ProgressionError::database_error("Failed to delete plan", e))?;

        tx.commit().db_context("Failed to commit transaction")?;

        Ok(())
    }
}
