//! Collection wrapper types with Display implementations.

use std::fmt;

use crate::models::{PlanSummary, Stage};

/// Newtype wrapper for displaying a list of plan summaries.
pub struct PlanSummaries(pub Vec<PlanSummary>);

impl PlanSummaries {
    /// Whether the list contains no plans.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of plans in the list.
    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl fmt::Display for PlanSummaries {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for summary in &self.0 {
            write!(f, "{summary}")?;
        }
        Ok(())
    }
}

/// Newtype wrapper for displaying a list of stages.
pub struct Stages(pub Vec<Stage>);

impl Stages {
    /// Whether the list contains no stages.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of stages in the list.
    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl fmt::Display for Stages {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for stage in &self.0 {
            write!(f, "{stage}")?;
        }
        Ok(())
    }
}
