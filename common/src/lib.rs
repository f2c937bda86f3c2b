//! Shared utilities for the starmatch workspace.

mod float_ext;
mod log_setup;

pub use float_ext::FloatExt;
pub use log_setup::{setup_logging, LogSettings, LogSetupError};

/// Default absolute tolerance for approximate float comparison.
pub const EPSILON: f64 = 1e-6;
