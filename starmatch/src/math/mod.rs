//! Numeric building blocks: dense linear solver and robust statistics.

pub mod linear;
pub mod statistics;

pub use linear::{PIVOT_TOLERANCE, SingularMatrix, solve};
pub use statistics::{mean_and_std_dev, percentile};
