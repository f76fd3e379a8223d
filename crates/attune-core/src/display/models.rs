//! Display implementations for domain models.
//!
//! All Display trait implementations for the core domain models live here,
//! separated from the model definitions. They produce markdown with status
//! icons and structured sections for rich terminal display.

use std::fmt;

use super::datetime::{DurationSecs, LocalDateTime};
use crate::{
    models::{Plan, PlanStatus, PlanSummary, Stage, StageStatus},
    progression::PlanOverview,
};

impl fmt::Display for PlanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for StageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# {}. {}", self.id, self.title)?;
        writeln!(f)?;

        // Metadata section
        writeln!(f, "- Status: {}", self.status.as_str())?;
        writeln!(
            f,
            "- Progress: {}/{} stages",
            self.completed_count(),
            self.stages.len()
        )?;
        writeln!(
            f,
            "- Total length: {}",
            DurationSecs(self.total_duration_secs)
        )?;
        writeln!(f, "- Created: {}", LocalDateTime(&self.created_at))?;
        writeln!(f, "- Updated: {}", LocalDateTime(&self.updated_at))?;

        // Description as a paragraph
        if let Some(desc) = &self.description {
            writeln!(f)?;
            writeln!(f, "{desc}")?;
        }

        if self.stages.is_empty() {
            writeln!(f, "\nNo stages in this plan.")?;
        } else {
            writeln!(f, "\n## Stages")?;
            writeln!(f)?;
            for stage in &self.stages {
                write!(f, "{stage}")?;
            }
        }

        Ok(())
    }
}

impl Stage {
    /// Format the stage using the clean, compact display format.
    ///
    /// This uses the same format whether the stage is displayed standalone
    /// or within a plan context.
    fn fmt_stage(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "### {}. {} ({})",
            self.order + 1,
            self.title,
            self.status.with_icon()
        )?;
        writeln!(f)?;

        writeln!(f, "- Length: {}", DurationSecs(self.duration_secs))?;
        if let Some(scheduled_at) = &self.scheduled_at {
            writeln!(f, "- Scheduled: {}", LocalDateTime(scheduled_at))?;
        }
        if let Some(audio_ref) = &self.audio_ref {
            writeln!(f, "- Audio: {audio_ref}")?;
        }

        if let Some(desc) = &self.description {
            writeln!(f)?;
            writeln!(f, "{desc}")?;
        }
        writeln!(f)?;

        Ok(())
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_stage(f)
    }
}

impl fmt::Display for PlanSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let progress = if self.total_stages > 0 {
            format!(" ({}/{})", self.completed_stages, self.total_stages)
        } else {
            String::new()
        };

        writeln!(f, "## {} (ID: {}){progress}", self.title, self.id)?;
        writeln!(f)?;

        if let Some(desc) = &self.description {
            writeln!(f, "- **Description**: {desc}")?;
        }

        writeln!(
            f,
            "- **Total length**: {}",
            DurationSecs(self.total_duration_secs)
        )?;
        writeln!(f, "- **Created**: {}", LocalDateTime(&self.created_at))?;
        writeln!(f)?; // Add blank line after each plan

        Ok(())
    }
}

impl fmt::Display for PlanOverview {
    /// Renders the plan with a lock badge and unlock hint per stage,
    /// matching how a disabled stage control presents itself.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# {}. {}", self.plan.id, self.plan.title)?;
        writeln!(f)?;
        writeln!(f, "- Status: {}", self.plan.status.as_str())?;
        writeln!(
            f,
            "- Progress: {}/{} stages",
            self.plan.completed_count(),
            self.plan.stages.len()
        )?;

        if let Some(desc) = &self.plan.description {
            writeln!(f)?;
            writeln!(f, "{desc}")?;
        }

        writeln!(f, "\n## Stages")?;
        writeln!(f)?;

        for (stage, gate) in self.plan.stages.iter().zip(&self.gates) {
            let badge = if gate.unlocked { "" } else { " 🔒" };
            writeln!(
                f,
                "### {}. {}{badge} ({})",
                stage.order + 1,
                stage.title,
                stage.status.with_icon()
            )?;
            writeln!(f)?;
            writeln!(f, "- Length: {}", DurationSecs(stage.duration_secs))?;
            if !gate.hint.is_empty() {
                writeln!(f, "- {}", gate.hint)?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}
