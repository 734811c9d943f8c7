//! Domain layer for research-agent
//!
//! This crate contains the rules of the research state machine: states,
//! the decision context, quality data contract, transition table and
//! recovery policy. It has no dependencies on infrastructure or
//! presentation concerns and performs no I/O.
//!
//! # Core Concepts
//!
//! ## Pipeline
//!
//! `idle → planning → searching → scraping → analyzing → verifying → compiling → completed`,
//! with `failed` reachable from every working state. Guards on the
//! transition table gate advancement on plan presence, result count,
//! progress and quality.
//!
//! ## Recovery
//!
//! Errors reported in a state are routed by that state's handler: retry in
//! place, step back, proceed degraded, or fail.

pub mod agent;
pub mod config;
pub mod context;
pub mod core;
pub mod transition;

// Re-export commonly used types
pub use agent::{
    entities::AgentState,
    handlers::{HandlerSet, PhaseHandler, StateHandler},
    policy::RecoveryPolicy,
    value_objects::{AgentError, ErrorKind, OtherTag},
};
pub use config::{ConfigIssue, OutputFormat, Severity};
pub use context::{
    ContextPatch, DecisionContext, QualityPatch, QualityScore, ResearchPlan, ResearchResult,
};
pub use core::error::DomainError;
pub use transition::{GateThresholds, StateTransition, TransitionTable};
