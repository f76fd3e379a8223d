//! Filter types for querying plans.

use super::PlanStatus;

/// Filter options for querying plans.
#[derive(Debug, Clone, Default)]
pub struct PlanFilter {
    /// Filter by plan title (case-insensitive partial match)
    pub title_contains: Option<String>,

    /// Filter by plan status
    /// If None, plans of every status are returned
    pub status: Option<PlanStatus>,
}

impl From<&crate::params::ListPlans> for PlanFilter {
    /// Convert ListPlans parameters to a PlanFilter for plan queries.
    ///
    /// - `completed: false` → active plans only
    /// - `completed: true` → completed plans only
    fn from(params: &crate::params::ListPlans) -> Self {
        Self {
            title_contains: None,
            status: Some(if params.completed {
                PlanStatus::Completed
            } else {
                PlanStatus::Active
            }),
        }
    }
}
