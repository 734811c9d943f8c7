//! Observer that records state machine snapshots into a [`RunLogger`].

use research_application::ports::run_logger::{RunEvent, RunLogger};
use research_domain::{AgentState, DecisionContext};
use std::sync::Arc;

/// Build a listener for `StateMachine::subscribe` that logs a
/// `state_changed` event whenever the state differs from the previous
/// snapshot, and a `context_updated` event otherwise.
pub fn snapshot_listener(
    logger: Arc<dyn RunLogger>,
) -> impl FnMut(AgentState, &DecisionContext) + Send + 'static {
    let mut last: Option<AgentState> = None;
    move |state, context| {
        let event_type = if last == Some(state) {
            "context_updated"
        } else {
            "state_changed"
        };
        last = Some(state);
        logger.log(RunEvent::new(
            event_type,
            serde_json::json!({
                "state": state,
                "progress": context.progress,
                "results": context.results.len(),
                "errors": context.errors.len(),
                "has_plan": context.has_plan(),
                "quality": context.quality,
                "elapsed_ms": context.time_elapsed.as_millis() as u64,
            }),
        ));
    }
}
