//! Agent domain module
//!
//! Contains the research states, reported errors, the recovery policy and
//! the per-state handlers the state machine drives.

pub mod entities;
pub mod handlers;
pub mod policy;
pub mod value_objects;

pub use entities::AgentState;
pub use handlers::{HandlerSet, PhaseHandler, StateHandler};
pub use policy::RecoveryPolicy;
pub use value_objects::{AgentError, ErrorKind, OtherTag};
