//! Stage progression handlers for the ProgressionEngine.

use log::debug;

use super::{PlanOverview, ProgressionEngine};
use crate::{
    error::{ProgressionError, Result},
    models::{Plan, Stage},
    params::{CompleteStage, Id, StageContentUpdate},
    session::PlanSession,
    unlock,
};

impl ProgressionEngine {
    /// Handle marking a stage as completed.
    ///
    /// Idempotent: completing an already-completed stage returns the
    /// unchanged plan snapshot rather than an error, so a playback watcher
    /// firing alongside a manual "mark done" control is absorbed safely.
    /// The plan's derived status and progress counters are recomputed in
    /// the same transaction that flips the stage.
    ///
    /// # Errors
    ///
    /// * `ProgressionError::PlanNotFound` - unknown plan ID
    /// * `ProgressionError::StageNotFound` - unknown stage ID, or a stage
    ///   that belongs to a different plan
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// # use attune_core::{params::CompleteStage, ProgressionBuilder};
    /// # async {
    /// let engine = ProgressionBuilder::new().build().await?;
    /// let params = CompleteStage { plan_id: 1, stage_id: 3 };
    /// let plan = engine.complete_stage(&params).await?;
    /// # Result::<(), attune_core::ProgressionError>::Ok(())
    /// # };
    /// ```
    pub async fn complete_stage(&self, params: &CompleteStage) -> Result<Plan> {
        // Distinguish an unknown plan from an unknown stage up front.
        if self
            .get_plan(&Id { id: params.plan_id })
            .await?
            .is_none()
        {
            return Err(ProgressionError::PlanNotFound { id: params.plan_id });
        }

        debug!(
            "complete_stage: plan {} stage {}",
            params.plan_id, params.stage_id
        );
        self.complete_stage_raw(params.plan_id, params.stage_id).await
    }

    /// Handle showing a specific stage.
    pub async fn show_stage_details(&self, params: &Id) -> Result<Option<Stage>> {
        self.get_stage(params).await
    }

    /// Handle the content source's write path with validation.
    ///
    /// Moves a stage along `pending → generating → ready` and records the
    /// audio handle. Backward moves, unknown statuses and completed stages
    /// are rejected; the progression path never runs through here.
    pub async fn update_stage_content(&self, params: &StageContentUpdate) -> Result<Stage> {
        let new_status = params.validate()?;
        self.update_stage_content_raw(params.stage_id, new_status, params.audio_ref.clone())
            .await
    }

    /// Finds the first incomplete, unlocked stage strictly after
    /// `after_index`, evaluated at the injected clock's current instant.
    ///
    /// Returns `None` when the plan is finished or every remaining stage is
    /// locked; callers leave their selection unchanged in that case.
    ///
    /// # Errors
    ///
    /// * `ProgressionError::PlanNotFound` - unknown plan ID
    pub async fn advance_to_next_eligible(
        &self,
        plan_id: u64,
        after_index: usize,
    ) -> Result<Option<usize>> {
        let plan = self
            .get_plan(&Id { id: plan_id })
            .await?
            .ok_or(ProgressionError::PlanNotFound { id: plan_id })?;

        Ok(unlock::next_eligible(&plan, after_index, self.now()))
    }

    /// Handle producing a plan overview with per-stage unlock evaluations
    /// at the injected clock's current instant.
    pub async fn plan_overview(&self, params: &Id) -> Result<Option<PlanOverview>> {
        let plan = self.get_plan(params).await?;
        Ok(plan.map(|p| PlanOverview::evaluate(p, self.now())))
    }

    /// Opens a transient listening session on a plan.
    ///
    /// The session starts at the next incomplete stage and tracks selection
    /// and playback position without persisting either.
    ///
    /// # Errors
    ///
    /// * `ProgressionError::PlanNotFound` - unknown plan ID
    pub async fn open_session(&self, plan_id: u64) -> Result<PlanSession> {
        let plan = self
            .get_plan(&Id { id: plan_id })
            .await?
            .ok_or(ProgressionError::PlanNotFound { id: plan_id })?;

        Ok(PlanSession::new(plan))
    }
}
