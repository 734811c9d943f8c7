//! Transition table - the exhaustive set of legal state moves.

use super::gates::GateThresholds;
use crate::agent::entities::AgentState;
use crate::context::entities::DecisionContext;

/// Pure predicate over the current context.
pub type Guard = Box<dyn Fn(&DecisionContext) -> bool + Send + Sync>;

/// Side effect applied to the context while a transition executes.
pub type Action = Box<dyn Fn(&mut DecisionContext) + Send + Sync>;

/// A legal `(from, to)` pair with an optional guard and an optional action.
///
/// Guards receive `&DecisionContext` and therefore cannot mutate it; only
/// actions (and state hooks) get `&mut`.
pub struct StateTransition {
    pub from: AgentState,
    pub to: AgentState,
    condition: Option<Guard>,
    condition_label: Option<String>,
    action: Option<Action>,
}

impl StateTransition {
    /// An unguarded transition without an action.
    pub fn new(from: AgentState, to: AgentState) -> Self {
        Self {
            from,
            to,
            condition: None,
            condition_label: None,
            action: None,
        }
    }

    /// Guard the transition. `label` is a human-readable form of the
    /// condition used for introspection and tables.
    pub fn when<F>(mut self, label: impl Into<String>, guard: F) -> Self
    where
        F: Fn(&DecisionContext) -> bool + Send + Sync + 'static,
    {
        self.condition = Some(Box::new(guard));
        self.condition_label = Some(label.into());
        self
    }

    /// Attach an action run between the source's exit and the target's entry.
    pub fn then<F>(mut self, action: F) -> Self
    where
        F: Fn(&mut DecisionContext) + Send + Sync + 'static,
    {
        self.action = Some(Box::new(action));
        self
    }

    pub fn is_guarded(&self) -> bool {
        self.condition.is_some()
    }

    pub fn has_action(&self) -> bool {
        self.action.is_some()
    }

    pub fn condition_label(&self) -> Option<&str> {
        self.condition_label.as_deref()
    }

    /// Evaluate the guard against `context`. Unguarded transitions always pass.
    pub fn permits(&self, context: &DecisionContext) -> bool {
        self.condition.as_ref().is_none_or(|guard| guard(context))
    }

    pub fn run_action(&self, context: &mut DecisionContext) {
        if let Some(action) = &self.action {
            action(context);
        }
    }
}

impl std::fmt::Debug for StateTransition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateTransition")
            .field("from", &self.from)
            .field("to", &self.to)
            .field("condition", &self.condition_label)
            .field("action", &self.action.is_some())
            .finish()
    }
}

/// The set of legal transitions, in declaration order.
///
/// A `(from, to)` pair appears at most once. Several targets of one source
/// may be legal at the same time; picking among them is the driver's job.
#[derive(Debug, Default)]
pub struct TransitionTable {
    transitions: Vec<StateTransition>,
}

impl TransitionTable {
    /// A table with no legal moves.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The research pipeline table with default gate thresholds.
    pub fn canonical() -> Self {
        Self::with_gates(GateThresholds::default())
    }

    /// The research pipeline table with the given gate thresholds.
    pub fn with_gates(gates: GateThresholds) -> Self {
        use crate::agent::entities::AgentState::*;

        let max_planning_errors = gates.max_planning_errors;
        let min_scrape_progress = gates.min_scrape_progress;
        let min_analysis_progress = gates.min_analysis_progress;
        let min_claim_verification = gates.min_claim_verification;
        let min_overall_quality = gates.min_overall_quality;

        Self::empty()
            .with(StateTransition::new(Idle, Planning))
            .with(
                StateTransition::new(Planning, Searching)
                    .when("plan != null", |ctx| ctx.plan.is_some()),
            )
            .with(StateTransition::new(Planning, Failed).when(
                format!("errors.length > {}", max_planning_errors),
                move |ctx| ctx.errors.len() > max_planning_errors,
            ))
            .with(
                StateTransition::new(Searching, Scraping)
                    .when("results.length > 0", |ctx| !ctx.results.is_empty()),
            )
            .with(
                StateTransition::new(Searching, Planning)
                    .when("results.length == 0", |ctx| ctx.results.is_empty()),
            )
            .with(StateTransition::new(Searching, Failed))
            .with(StateTransition::new(Scraping, Analyzing).when(
                format!("progress >= {}", min_scrape_progress),
                move |ctx| ctx.progress >= min_scrape_progress,
            ))
            .with(StateTransition::new(Scraping, Searching))
            .with(StateTransition::new(Scraping, Failed))
            .with(StateTransition::new(Analyzing, Verifying).when(
                format!("progress >= {}", min_analysis_progress),
                move |ctx| ctx.progress >= min_analysis_progress,
            ))
            .with(StateTransition::new(Analyzing, Scraping))
            .with(StateTransition::new(Analyzing, Failed))
            .with(StateTransition::new(Verifying, Compiling).when(
                format!("quality.claim_verification >= {}", min_claim_verification),
                move |ctx| ctx.quality.claim_verification >= min_claim_verification,
            ))
            .with(StateTransition::new(Verifying, Searching))
            .with(StateTransition::new(Verifying, Analyzing))
            .with(StateTransition::new(Verifying, Failed))
            .with(StateTransition::new(Compiling, Completed).when(
                format!("quality.overall >= {}", min_overall_quality),
                move |ctx| ctx.quality.overall >= min_overall_quality,
            ))
            .with(StateTransition::new(Compiling, Verifying))
            .with(StateTransition::new(Compiling, Failed))
            .with(StateTransition::new(Failed, Planning))
            .with(StateTransition::new(Failed, Idle))
            .with(StateTransition::new(Completed, Idle))
    }

    /// Add a transition, replacing (and returning) any existing one for the same pair.
    pub fn insert(&mut self, transition: StateTransition) -> Option<StateTransition> {
        match self
            .transitions
            .iter()
            .position(|t| t.from == transition.from && t.to == transition.to)
        {
            Some(index) => Some(std::mem::replace(&mut self.transitions[index], transition)),
            None => {
                self.transitions.push(transition);
                None
            }
        }
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with(mut self, transition: StateTransition) -> Self {
        self.insert(transition);
        self
    }

    pub fn find(&self, from: AgentState, to: AgentState) -> Option<&StateTransition> {
        self.transitions
            .iter()
            .find(|t| t.from == from && t.to == to)
    }

    pub fn contains(&self, from: AgentState, to: AgentState) -> bool {
        self.find(from, to).is_some()
    }

    /// Every transition leaving `from`, in declaration order.
    pub fn transitions_from(&self, from: AgentState) -> impl Iterator<Item = &StateTransition> {
        self.transitions.iter().filter(move |t| t.from == from)
    }

    pub fn iter(&self) -> impl Iterator<Item = &StateTransition> {
        self.transitions.iter()
    }

    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }
}
