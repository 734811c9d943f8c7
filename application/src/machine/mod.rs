//! Research state machine engine.
//!
//! [`StateMachine`] owns the decision context, enforces the transition
//! table, dispatches state handlers and notifies observers. Use
//! [`SharedStateMachine`] when the machine has to be reachable from more
//! than one place, such as a driver loop and its observers.

pub mod engine;
pub mod error;
pub mod observer;
pub mod shared;

pub use engine::StateMachine;
pub use error::MachineError;
pub use observer::{Listener, Subscription};
pub use shared::SharedStateMachine;

use std::sync::{Mutex, MutexGuard, PoisonError};

/// Lock `mutex`, recovering the data if a listener panicked while holding it.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
