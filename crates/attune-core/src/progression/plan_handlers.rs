//! Plan handler operations that validate input and return formatted wrapper
//! types for the ProgressionEngine.

use log::debug;

use super::ProgressionEngine;
use crate::{
    error::{ProgressionError, Result},
    models::{Plan, PlanFilter},
    params::{CreatePlan, DeletePlan, Id, ListPlans, RenamePlan},
};

impl ProgressionEngine {
    /// Handle creating a new plan with its full stage sequence.
    ///
    /// Validates the title, stage list and durations, parses the stage
    /// schedules, and persists the plan with every stage in `pending`
    /// status.
    ///
    /// # Arguments
    ///
    /// * `params` - Creation parameters containing title, description and
    ///   ordered stage specs
    ///
    /// # Returns
    ///
    /// The newly created Plan with stages loaded
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// # use attune_core::{params::{CreatePlan, StageSpec}, ProgressionBuilder};
    /// # async {
    /// let engine = ProgressionBuilder::new().build().await?;
    /// let params = CreatePlan {
    ///     title: "Deep Rest".to_string(),
    ///     description: None,
    ///     stages: vec![StageSpec {
    ///         title: "Breath work".to_string(),
    ///         description: None,
    ///         duration_secs: 600,
    ///         scheduled_at: None,
    ///     }],
    /// };
    /// let plan = engine.create_plan(&params).await?;
    /// # Result::<(), attune_core::ProgressionError>::Ok(())
    /// # };
    /// ```
    pub async fn create_plan(&self, params: &CreatePlan) -> Result<Plan> {
        let schedules = params.validate()?;
        debug!("create_plan: {} stages", params.stages.len());
        self.create_plan_with_schedules(params, schedules).await
    }

    /// Handle listing plans with completed/active filtering.
    ///
    /// Returns summaries with stage count information for consistent list
    /// display across interfaces.
    pub async fn list_plans_summary(
        &self,
        params: &ListPlans,
    ) -> Result<crate::display::PlanSummaries> {
        let filter = Some(PlanFilter::from(params));
        let summaries = self.list_plans(filter).await?;
        Ok(crate::display::PlanSummaries(summaries))
    }

    /// Handle showing a complete plan with all its stages.
    ///
    /// # Returns
    ///
    /// An optional Plan containing the plan with its stages loaded,
    /// or None if the plan doesn't exist
    pub async fn show_plan_with_stages(&self, params: &Id) -> Result<Option<Plan>> {
        self.get_plan(params).await
    }

    /// Handle renaming a plan with validation.
    ///
    /// Rejects empty and whitespace-only titles before touching storage;
    /// unknown plan IDs surface as `PlanNotFound`.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// # use attune_core::{params::RenamePlan, ProgressionBuilder};
    /// # async {
    /// let engine = ProgressionBuilder::new().build().await?;
    /// let params = RenamePlan {
    ///     id: 1,
    ///     title: "Evening Calm".to_string(),
    /// };
    /// let renamed = engine.rename_plan(&params).await?;
    /// # Result::<(), attune_core::ProgressionError>::Ok(())
    /// # };
    /// ```
    pub async fn rename_plan(&self, params: &RenamePlan) -> Result<Plan> {
        params.validate()?;
        self.rename_plan_raw(params.id, params.title.clone()).await
    }

    /// Handle permanently deleting a plan with confirmation.
    ///
    /// Requires explicit confirmation via the `confirmed` field to prevent
    /// accidental deletion. Uses get-before-delete to return the deleted
    /// plan's details for confirmation, or None if the plan doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns `ProgressionError::InvalidInput` if `confirmed` is false
    pub async fn delete_plan(&self, params: &DeletePlan) -> Result<Option<Plan>> {
        if !params.confirmed {
            return Err(ProgressionError::invalid_input("confirmed").with_reason(
                "Plan deletion requires explicit confirmation. Set 'confirmed' to true to proceed with permanent deletion.",
            ));
        }

        let id_params = Id { id: params.id };
        let plan = self.get_plan(&id_params).await?;

        if plan.is_some() {
            self.delete_plan_by_id(&id_params).await?;
        }

        Ok(plan)
    }
}
