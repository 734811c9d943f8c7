//! Application-level configuration.
//!
//! - [`DriverParams`] - research loop control (steps, attempts, restarts)

pub mod driver_params;

pub use driver_params::DriverParams;
