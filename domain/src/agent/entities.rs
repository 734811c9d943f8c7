//! Agent domain entities

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Phase of a research run.
///
/// The working states (`Planning` through `Compiling`) each map to one
/// external collaborator. `Completed` and `Failed` are terminal for a run,
/// but both can be left again (`Failed → Planning`, `* → Idle`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AgentState {
    /// No run in progress
    #[default]
    Idle,
    /// Building the research plan
    Planning,
    /// Discovering candidate sources
    Searching,
    /// Fetching source content
    Scraping,
    /// Extracting findings from fetched content
    Analyzing,
    /// Cross-checking claims
    Verifying,
    /// Assembling the final report
    Compiling,
    /// Run finished successfully
    Completed,
    /// Run aborted
    Failed,
}

impl AgentState {
    /// Every state, in pipeline order.
    pub const ALL: [AgentState; 9] = [
        AgentState::Idle,
        AgentState::Planning,
        AgentState::Searching,
        AgentState::Scraping,
        AgentState::Analyzing,
        AgentState::Verifying,
        AgentState::Compiling,
        AgentState::Completed,
        AgentState::Failed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AgentState::Idle => "idle",
            AgentState::Planning => "planning",
            AgentState::Searching => "searching",
            AgentState::Scraping => "scraping",
            AgentState::Analyzing => "analyzing",
            AgentState::Verifying => "verifying",
            AgentState::Compiling => "compiling",
            AgentState::Completed => "completed",
            AgentState::Failed => "failed",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            AgentState::Idle => "Idle",
            AgentState::Planning => "Planning",
            AgentState::Searching => "Searching",
            AgentState::Scraping => "Scraping",
            AgentState::Analyzing => "Analyzing",
            AgentState::Verifying => "Verifying",
            AgentState::Compiling => "Compiling",
            AgentState::Completed => "Completed",
            AgentState::Failed => "Failed",
        }
    }

    /// Minimum progress (0-100) a context carries once this state is entered.
    ///
    /// `Failed` has no floor: failing keeps whatever progress was reached.
    pub fn progress_floor(&self) -> Option<u8> {
        match self {
            AgentState::Idle => Some(0),
            AgentState::Planning => Some(5),
            AgentState::Searching => Some(15),
            AgentState::Scraping => Some(30),
            AgentState::Analyzing => Some(50),
            AgentState::Verifying => Some(70),
            AgentState::Compiling => Some(85),
            AgentState::Completed => Some(100),
            AgentState::Failed => None,
        }
    }

    /// Happy-path successor in the research pipeline.
    pub fn forward_target(&self) -> Option<AgentState> {
        match self {
            AgentState::Idle => Some(AgentState::Planning),
            AgentState::Planning => Some(AgentState::Searching),
            AgentState::Searching => Some(AgentState::Scraping),
            AgentState::Scraping => Some(AgentState::Analyzing),
            AgentState::Analyzing => Some(AgentState::Verifying),
            AgentState::Verifying => Some(AgentState::Compiling),
            AgentState::Compiling => Some(AgentState::Completed),
            AgentState::Completed | AgentState::Failed => None,
        }
    }

    /// Returns `true` for states where a collaborator performs work.
    pub fn is_working(&self) -> bool {
        matches!(
            self,
            AgentState::Planning
                | AgentState::Searching
                | AgentState::Scraping
                | AgentState::Analyzing
                | AgentState::Verifying
                | AgentState::Compiling
        )
    }
}

impl std::fmt::Display for AgentState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AgentState {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        AgentState::ALL
            .into_iter()
            .find(|state| state.as_str() == normalized)
            .ok_or_else(|| DomainError::UnknownState(s.to_string()))
    }
}
