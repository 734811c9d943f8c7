//! Output formatting for research runs

pub mod console;
