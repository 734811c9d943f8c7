//! Observer registry for state machine changes.
//!
//! Listeners are invoked synchronously, in no particular order, after every
//! state change and every context mutation. The registry lock is released
//! before any listener runs, so a listener may unsubscribe itself or others
//! while being notified.

use super::lock;
use research_domain::{AgentState, DecisionContext};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};
use std::thread::{self, ThreadId};

/// Callback invoked with the new state and a snapshot of the context.
pub type Listener = Box<dyn FnMut(AgentState, &DecisionContext) + Send>;

type SharedListener = Arc<Mutex<Listener>>;

#[derive(Default)]
struct Registry {
    next_id: u64,
    listeners: Vec<(u64, SharedListener)>,
}

/// What is being delivered on one thread.
struct Delivery {
    state: AgentState,
    context: DecisionContext,
}

/// Tracks in-progress notifications per thread so that callers on a
/// delivering thread can be told apart from everyone else.
///
/// Each thread keeps its own stack; ending a delivery only pops the calling
/// thread's entry.
#[derive(Clone, Default)]
pub struct DeliveryGuard {
    active: Arc<Mutex<HashMap<ThreadId, Vec<Delivery>>>>,
}

impl DeliveryGuard {
    /// Returns `true` while a listener is running on the calling thread.
    pub fn is_delivering_here(&self) -> bool {
        lock(&self.active).contains_key(&thread::current().id())
    }

    /// The state and context being delivered to the calling thread, if any.
    pub fn snapshot_here(&self) -> Option<(AgentState, DecisionContext)> {
        lock(&self.active)
            .get(&thread::current().id())
            .and_then(|stack| stack.last())
            .map(|d| (d.state, d.context.clone()))
    }

    fn enter(&self, state: AgentState, context: &DecisionContext) -> DeliveryScope<'_> {
        let thread = thread::current().id();
        lock(&self.active).entry(thread).or_default().push(Delivery {
            state,
            context: context.clone(),
        });
        DeliveryScope {
            guard: self,
            thread,
        }
    }
}

/// Pops the delivery marker of its own thread, including when a listener
/// panics.
struct DeliveryScope<'a> {
    guard: &'a DeliveryGuard,
    thread: ThreadId,
}

impl Drop for DeliveryScope<'_> {
    fn drop(&mut self) {
        let mut active = lock(&self.guard.active);
        if let Some(stack) = active.get_mut(&self.thread) {
            stack.pop();
            if stack.is_empty() {
                active.remove(&self.thread);
            }
        }
    }
}

/// Registry of state change listeners.
///
/// Cloning yields another handle to the same registry.
#[derive(Clone, Default)]
pub struct ObserverBus {
    registry: Arc<Mutex<Registry>>,
    guard: DeliveryGuard,
}

impl ObserverBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `listener` and return the handle that removes it.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: FnMut(AgentState, &DecisionContext) + Send + 'static,
    {
        let mut registry = lock(&self.registry);
        let id = registry.next_id;
        registry.next_id += 1;
        let boxed: Listener = Box::new(listener);
        registry.listeners.push((id, Arc::new(Mutex::new(boxed))));
        Subscription {
            id,
            registry: Arc::downgrade(&self.registry),
        }
    }

    /// Deliver `(state, context)` to every listener registered at the time
    /// of the call.
    pub(crate) fn notify(&self, state: AgentState, context: &DecisionContext) {
        let listeners: Vec<SharedListener> = lock(&self.registry)
            .listeners
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        if listeners.is_empty() {
            return;
        }

        let _scope = self.guard.enter(state, context);
        for listener in listeners {
            let mut callback = lock(&listener);
            (*callback)(state, context);
        }
    }

    pub fn len(&self) -> usize {
        lock(&self.registry).listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn delivery_guard(&self) -> DeliveryGuard {
        self.guard.clone()
    }
}

impl std::fmt::Debug for ObserverBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObserverBus")
            .field("listeners", &self.len())
            .finish()
    }
}

/// Handle returned by [`ObserverBus::subscribe`].
///
/// Dropping the handle does not remove the listener.
#[derive(Debug, Clone)]
pub struct Subscription {
    id: u64,
    registry: Weak<Mutex<Registry>>,
}

impl Subscription {
    /// Remove the listener. Returns `true` only for the call that actually
    /// removed it; later calls are no-ops.
    pub fn unsubscribe(&self) -> bool {
        let Some(registry) = self.registry.upgrade() else {
            return false;
        };
        let mut registry = lock(&registry);
        let before = registry.listeners.len();
        registry.listeners.retain(|(id, _)| *id != self.id);
        registry.listeners.len() != before
    }
}
