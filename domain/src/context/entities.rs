//! Decision context entities

use super::quality::QualityScore;
use crate::agent::entities::AgentState;
use crate::agent::value_objects::AgentError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// A research plan produced by the planner collaborator
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ResearchPlan {
    /// What the run is trying to find out
    pub objective: String,
    /// Search queries to issue
    pub queries: Vec<String>,
    /// Preferred sources (domains, feeds, archives)
    pub sources: Vec<String>,
    /// Upper bound on results to collect (if any)
    pub max_results: Option<usize>,
}

impl ResearchPlan {
    pub fn new(objective: impl Into<String>) -> Self {
        Self {
            objective: objective.into(),
            ..Default::default()
        }
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.queries.push(query.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.sources.push(source.into());
        self
    }

    pub fn with_max_results(mut self, max: usize) -> Self {
        self.max_results = Some(max);
        self
    }
}

/// One finding collected during a run
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ResearchResult {
    /// Where the finding came from (source name or domain)
    pub source: String,
    /// Short title
    pub title: String,
    /// Extracted content or summary
    pub content: String,
    /// Location of the original document
    pub url: Option<String>,
    /// Relevance estimate supplied by the reporter
    pub relevance: Option<f64>,
    /// Free-form collaborator metadata
    pub metadata: HashMap<String, serde_json::Value>,
}

impl ResearchResult {
    pub fn new(source: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_relevance(mut self, relevance: f64) -> Self {
        self.relevance = Some(relevance);
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// The record threaded through every phase of one research run (Entity).
///
/// Owned by the state machine. Callers only ever see copies; mutation goes
/// through the machine's mutators so observers are notified.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DecisionContext {
    /// Mirror of the machine's current state
    pub current_state: AgentState,
    /// The plan, once the planner has produced one
    pub plan: Option<ResearchPlan>,
    /// Overall progress, 0-100
    pub progress: u8,
    /// Findings in the order they were reported
    pub results: Vec<ResearchResult>,
    /// Quality metrics written by collaborators
    pub quality: QualityScore,
    /// Wall-clock time spent in the run so far
    pub time_elapsed: Duration,
    /// Every reported error, oldest first
    pub errors: Vec<AgentError>,
}

impl DecisionContext {
    /// A fresh context: idle, no plan, no progress, nothing collected.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_plan(&self) -> bool {
        self.plan.is_some()
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    pub fn last_error(&self) -> Option<&AgentError> {
        self.errors.last()
    }

    /// Raise progress to `floor` if it is below it. Never lowers progress.
    pub fn ratchet_progress(&mut self, floor: u8) {
        self.progress = self.progress.max(floor);
    }
}
