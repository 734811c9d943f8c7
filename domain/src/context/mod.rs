//! Decision context domain module
//!
//! Contains the record threaded through a research run, the quality score
//! data contract, and the typed patches collaborators write through.

pub mod entities;
pub mod patch;
pub mod quality;

pub use entities::{DecisionContext, ResearchPlan, ResearchResult};
pub use patch::ContextPatch;
pub use quality::{QualityPatch, QualityScore};
