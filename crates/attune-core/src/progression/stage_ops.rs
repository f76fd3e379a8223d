//! Stage operations for the ProgressionEngine.

use tokio::task;

use super::ProgressionEngine;
use crate::{
    db::Database,
    error::{ProgressionError, Result},
    models::{Plan, Stage, StageStatus},
    params::Id,
};

impl ProgressionEngine {
    /// Marks a stage completed and returns the updated plan snapshot.
    /// Already-completed stages are absorbed as no-ops by the query layer.
    pub(crate) async fn complete_stage_raw(&self, plan_id: u64, stage_id: u64) -> Result<Plan> {
        let db_path = self.db_path.clone();
        let now = self.now();

        task::spawn_blocking(move || {
            let mut db = Database::new(&db_path)?;
            db.complete_stage(plan_id, stage_id, now)
        })
        .await
        .map_err(|e| ProgressionError::Configuration {
            message: format!("Task join error: {e}"),
        })?
    }

    /// Retrieves all stages of a plan in stage order.
    pub async fn get_stages(&self, params: &Id) -> Result<crate::display::Stages> {
        let db_path = self.db_path.clone();
        let plan_id = params.id;

        let stages = task::spawn_blocking(move || {
            let db = Database::new(&db_path)?;
            db.get_stages(plan_id)
        })
        .await
        .map_err(|e| ProgressionError::Configuration {
            message: format!("Task join error: {e}"),
        })??;

        Ok(crate::display::Stages(stages))
    }

    /// Retrieves a single stage by its ID.
    pub async fn get_stage(&self, params: &Id) -> Result<Option<Stage>> {
        let db_path = self.db_path.clone();
        let stage_id = params.id;

        task::spawn_blocking(move || {
            let db = Database::new(&db_path)?;
            db.get_stage(stage_id)
        })
        .await
        .map_err(|e| ProgressionError::Configuration {
            message: format!("Task join error: {e}"),
        })?
    }

    /// Applies a validated content-preparation transition to a stage.
    pub(crate) async fn update_stage_content_raw(
        &self,
        stage_id: u64,
        new_status: StageStatus,
        audio_ref: Option<String>,
    ) -> Result<Stage> {
        let db_path = self.db_path.clone();
        let now = self.now();

        task::spawn_blocking(move || {
            let mut db = Database::new(&db_path)?;
            db.update_stage_content(stage_id, new_status, audio_ref.as_deref(), now)
        })
        .await
        .map_err(|e| ProgressionError::Configuration {
            message: format!("Task join error: {e}"),
        })?
    }
}
