//! Plan operations for the ProgressionEngine.

use jiff::Timestamp;
use tokio::task;

use super::ProgressionEngine;
use crate::{
    db::Database,
    error::{ProgressionError, Result},
    models::{Plan, PlanFilter, PlanSummary},
    params::{CreatePlan, Id},
};

impl ProgressionEngine {
    /// Creates a new plan with its full, validated stage sequence.
    /// `schedules` carries the parsed calendar gates in stage order.
    pub(crate) async fn create_plan_with_schedules(
        &self,
        params: &CreatePlan,
        schedules: Vec<Option<Timestamp>>,
    ) -> Result<Plan> {
        let db_path = self.db_path.clone();
        let params = params.clone();
        let now = self.now();

        task::spawn_blocking(move || {
            let mut db = Database::new(&db_path)?;
            db.create_plan(&params, &schedules, now)
        })
        .await
        .map_err(|e| ProgressionError::Configuration {
            message: format!("Task join error: {e}"),
        })?
    }

    /// Retrieves a plan by its ID with stages eagerly loaded.
    pub async fn get_plan(&self, params: &Id) -> Result<Option<Plan>> {
        let db_path = self.db_path.clone();
        let plan_id = params.id;

        task::spawn_blocking(move || {
            let db = Database::new(&db_path)?;
            db.get_plan(plan_id)
        })
        .await
        .map_err(|e| ProgressionError::Configuration {
            message: format!("Task join error: {e}"),
        })?
    }

    /// Lists plan summaries with optional filtering.
    pub async fn list_plans(&self, filter: Option<PlanFilter>) -> Result<Vec<PlanSummary>> {
        let db_path = self.db_path.clone();

        task::spawn_blocking(move || {
            let db = Database::new(&db_path)?;
            db.list_plan_summaries(filter.as_ref())
        })
        .await
        .map_err(|e| ProgressionError::Configuration {
            message: format!("Task join error: {e}"),
        })?
    }

    /// Replaces a plan's title. The title is validated by the handler layer.
    pub(crate) async fn rename_plan_raw(&self, plan_id: u64, title: String) -> Result<Plan> {
        let db_path = self.db_path.clone();
        let now = self.now();

        task::spawn_blocking(move || {
            let mut db = Database::new(&db_path)?;
            db.rename_plan(plan_id, &title, now)
        })
        .await
        .map_err(|e| ProgressionError::Configuration {
            message: format!("Task join error: {e}"),
        })?
    }

    /// Permanently deletes a plan and all its stages.
    /// This operation cannot be undone.
    pub(crate) async fn delete_plan_by_id(&self, params: &Id) -> Result<()> {
        let db_path = self.db_path.clone();
        let plan_id = params.id;

        task::spawn_blocking(move || {
            let mut db = Database::new(&db_path)?;
            db.delete_plan(plan_id)
        })
        .await
        .map_err(|e| ProgressionError::Configuration {
            message: format!("Task join error: {e}"),
        })?
    }
}
