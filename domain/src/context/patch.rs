//! Typed partial updates for [`DecisionContext`].
//!
//! A [`ContextPatch`] can only touch the fields collaborators own: plan,
//! progress, results and elapsed time. State, quality and the error log have
//! dedicated write paths on the state machine.

use super::entities::{DecisionContext, ResearchPlan, ResearchResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Partial update for a [`DecisionContext`]; `None` fields are left as they are.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextPatch {
    pub plan: Option<ResearchPlan>,
    /// New progress value; values above 100 are clamped
    pub progress: Option<u8>,
    /// Replaces the whole result list
    pub results: Option<Vec<ResearchResult>>,
    pub time_elapsed: Option<Duration>,
}

impl ContextPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_plan(mut self, plan: ResearchPlan) -> Self {
        self.plan = Some(plan);
        self
    }

    pub fn with_progress(mut self, progress: u8) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn with_results(mut self, results: Vec<ResearchResult>) -> Self {
        self.results = Some(results);
        self
    }

    pub fn with_time_elapsed(mut self, elapsed: Duration) -> Self {
        self.time_elapsed = Some(elapsed);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Apply the present fields to `context`.
    pub fn apply(self, context: &mut DecisionContext) {
        if let Some(plan) = self.plan {
            context.plan = Some(plan);
        }
        if let Some(progress) = self.progress {
            context.progress = progress.min(100);
        }
        if let Some(results) = self.results {
            context.results = results;
        }
        if let Some(elapsed) = self.time_elapsed {
            context.time_elapsed = elapsed;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::entities::AgentState;
    use crate::agent::value_objects::AgentError;

    #[test]
    fn test_apply_leaves_absent_fields() {
        let mut context = DecisionContext::new();
        context.results.push(ResearchResult::new("a", "first"));
        context.errors.push(AgentError::timeout("slow"));
        context.current_state = AgentState::Scraping;

        ContextPatch::new().with_progress(55).apply(&mut context);

        assert_eq!(context.progress, 55);
        assert_eq!(context.results.len(), 1);
        assert_eq!(context.errors.len(), 1);
        assert_eq!(context.current_state, AgentState::Scraping);
        assert!(context.plan.is_none());
    }

    #[test]
    fn test_progress_is_clamped() {
        let mut context = DecisionContext::new();
        ContextPatch::new().with_progress(250).apply(&mut context);
        assert_eq!(context.progress, 100);
    }

    #[test]
    fn test_plan_and_elapsed() {
        let mut context = DecisionContext::new();
        ContextPatch::new()
            .with_plan(ResearchPlan::new("topic"))
            .with_time_elapsed(Duration::from_secs(3))
            .apply(&mut context);

        assert!(context.has_plan());
        assert_eq!(context.time_elapsed, Duration::from_secs(3));
    }

    #[test]
    fn test_empty_patch() {
        assert!(ContextPatch::new().is_empty());
        assert!(!ContextPatch::new().with_progress(1).is_empty());
    }
}
