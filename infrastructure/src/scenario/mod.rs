//! Scripted research scenarios.
//!
//! A [`Scenario`] is an ordered list of collaborator responses, each tied to
//! the working state that should produce it. Scenarios are written in TOML:
//!
//! ```toml
//! name = "flaky scraper"
//!
//! [[steps]]
//! state = "planning"
//! plan = { objective = "compare async runtimes", queries = ["tokio vs smol"] }
//!
//! [[steps]]
//! state = "searching"
//! results = [{ source = "web", title = "tokio docs" }]
//!
//! [[steps]]
//! state = "scraping"
//! error = { kind = "timeout", message = "page took 30s", recoverable = true }
//! delay_ms = 200
//!
//! [[steps]]
//! state = "analyzing"
//! quality = { claim_verification = 0.8 }
//! signal = { kind = "revisit", target = "scraping" }
//! ```
//!
//! Responses for one state are replayed in file order by that state's
//! [`ScriptedCollaborator`]; once they run out it keeps answering
//! `Advance` with nothing attached.

mod collaborators;

pub use collaborators::ScriptedCollaborator;

use research_application::{Collaborators, PhaseOutcome, PhaseSignal};
use research_domain::{
    AgentError, AgentState, QualityPatch, ResearchPlan, ResearchResult,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScenarioError {
    #[error("Failed to read scenario {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse scenario: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Step {index} targets {state}, which has no collaborator")]
    InvalidStep { index: usize, state: AgentState },
}

/// One scripted collaborator response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioStep {
    /// Working state whose collaborator returns this response
    pub state: AgentState,
    #[serde(default)]
    pub plan: Option<ResearchPlan>,
    #[serde(default)]
    pub results: Vec<ResearchResult>,
    #[serde(default)]
    pub progress: Option<u8>,
    #[serde(default)]
    pub quality: Option<QualityPatch>,
    #[serde(default)]
    pub signal: PhaseSignal,
    /// Report this error instead of an outcome
    #[serde(default)]
    pub error: Option<AgentError>,
    /// Simulated work time
    #[serde(default)]
    pub delay_ms: u64,
}

impl ScenarioStep {
    pub fn new(state: AgentState) -> Self {
        Self {
            state,
            plan: None,
            results: Vec::new(),
            progress: None,
            quality: None,
            signal: PhaseSignal::Advance,
            error: None,
            delay_ms: 0,
        }
    }

    pub fn with_plan(mut self, plan: ResearchPlan) -> Self {
        self.plan = Some(plan);
        self
    }

    pub fn with_result(mut self, result: ResearchResult) -> Self {
        self.results.push(result);
        self
    }

    pub fn with_progress(mut self, progress: u8) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn with_quality(mut self, quality: QualityPatch) -> Self {
        self.quality = Some(quality);
        self
    }

    pub fn with_signal(mut self, signal: PhaseSignal) -> Self {
        self.signal = signal;
        self
    }

    pub fn with_error(mut self, error: AgentError) -> Self {
        self.error = Some(error);
        self
    }

    pub fn with_delay_ms(mut self, delay_ms: u64) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    /// What the collaborator hands back to the driver
    pub fn into_response(self) -> Result<PhaseOutcome, AgentError> {
        if let Some(error) = self.error {
            return Err(error);
        }
        Ok(PhaseOutcome {
            plan: self.plan,
            results: self.results,
            progress: self.progress,
            quality: self.quality,
            signal: self.signal,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scenario {
    pub name: String,
    pub description: Option<String>,
    pub steps: Vec<ScenarioStep>,
}

impl Scenario {
    pub fn load(path: &Path) -> Result<Self, ScenarioError> {
        let text = std::fs::read_to_string(path).map_err(|source| ScenarioError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut scenario = Self::from_toml(&text)?;
        if scenario.name.is_empty() {
            scenario.name = path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_default();
        }
        Ok(scenario)
    }

    pub fn from_toml(text: &str) -> Result<Self, ScenarioError> {
        let scenario: Scenario = toml::from_str(text)?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// Every step has to target a working state.
    pub fn validate(&self) -> Result<(), ScenarioError> {
        match self
            .steps
            .iter()
            .enumerate()
            .find(|(_, step)| !step.state.is_working())
        {
            Some((index, step)) => Err(ScenarioError::InvalidStep {
                index,
                state: step.state,
            }),
            None => Ok(()),
        }
    }

    /// Steps scripted for `state`, in file order
    pub fn steps_for(&self, state: AgentState) -> Vec<ScenarioStep> {
        self.steps
            .iter()
            .filter(|step| step.state == state)
            .cloned()
            .collect()
    }

    /// One [`ScriptedCollaborator`] per working state.
    pub fn collaborators(&self) -> Collaborators {
        let scripted = |state: AgentState| -> Arc<ScriptedCollaborator> {
            Arc::new(ScriptedCollaborator::new(state, self.steps_for(state)))
        };
        Collaborators {
            planner: scripted(AgentState::Planning),
            searcher: scripted(AgentState::Searching),
            scraper: scripted(AgentState::Scraping),
            analyzer: scripted(AgentState::Analyzing),
            verifier: scripted(AgentState::Verifying),
            compiler: scripted(AgentState::Compiling),
        }
    }

    /// Built-in scenario: a run that completes after one scraping timeout.
    pub fn demo() -> Self {
        let plan = ResearchPlan::new("How do Rust async runtimes compare for I/O-heavy services?")
            .with_query("tokio vs async-std vs smol benchmarks")
            .with_query("io_uring runtimes rust")
            .with_source("docs.rs")
            .with_source("github.com")
            .with_max_results(10);

        let steps = vec![
            ScenarioStep::new(AgentState::Planning)
                .with_plan(plan)
                .with_delay_ms(300),
            ScenarioStep::new(AgentState::Searching)
                .with_result(
                    ResearchResult::new("docs.rs", "tokio - An event-driven, non-blocking I/O platform")
                        .with_url("https://docs.rs/tokio")
                        .with_relevance(0.92),
                )
                .with_result(
                    ResearchResult::new("github.com", "smol-rs/smol: A small and fast async runtime")
                        .with_url("https://github.com/smol-rs/smol")
                        .with_relevance(0.81),
                )
                .with_result(
                    ResearchResult::new("github.com", "DataDog/glommio: thread-per-core io_uring runtime")
                        .with_url("https://github.com/DataDog/glommio")
                        .with_relevance(0.77),
                )
                .with_progress(22)
                .with_delay_ms(400),
            ScenarioStep::new(AgentState::Scraping)
                .with_error(AgentError::timeout("github.com did not answer within 10s"))
                .with_delay_ms(500),
            ScenarioStep::new(AgentState::Scraping)
                .with_progress(45)
                .with_delay_ms(400),
            ScenarioStep::new(AgentState::Analyzing)
                .with_progress(62)
                .with_quality(
                    QualityPatch::new()
                        .with_accuracy(0.82)
                        .with_completeness(0.74)
                        .with_freshness(0.9),
                )
                .with_delay_ms(400),
            ScenarioStep::new(AgentState::Verifying)
                .with_quality(
                    QualityPatch::new()
                        .with_claim_verification(0.78)
                        .with_source_quality(0.8),
                )
                .with_delay_ms(350),
            ScenarioStep::new(AgentState::Compiling)
                .with_progress(95)
                .with_quality(QualityPatch::new().with_overall(0.83))
                .with_delay_ms(300),
        ];

        Self {
            name: "demo".to_string(),
            description: Some(
                "Happy-path research run with one scraping timeout retried in place".to_string(),
            ),
            steps,
        }
    }
}
