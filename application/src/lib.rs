//! Application layer for research-agent
//!
//! This crate contains the state machine engine, port definitions, the
//! driver use case and application configuration. It depends only on the
//! domain layer.

pub mod config;
pub mod machine;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::DriverParams;
pub use machine::{MachineError, SharedStateMachine, StateMachine, Subscription};
pub use ports::{
    collaborators::{Collaborator, Collaborators, PhaseOutcome, PhaseSignal},
    progress::{NoProgress, ResearchProgressNotifier},
    run_logger::{NoRunLogger, RunEvent, RunLogger},
};
pub use use_cases::run_research::{
    GATE_REJECTED, RunResearchError, RunResearchOutput, RunResearchUseCase,
};
