//! Transition domain module
//!
//! Legal `(from, to)` pairs with their guards, and the thresholds the
//! guards compare against.

pub mod gates;
pub mod table;

pub use gates::GateThresholds;
pub use table::{Action, Guard, StateTransition, TransitionTable};
