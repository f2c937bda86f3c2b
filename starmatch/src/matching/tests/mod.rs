//! End-to-end matching tests on synthetic star fields.
//!
//! - `scenarios`: identical lists, rotated and scaled lists with spurious
//!   points, too few points, degenerate geometry
//! - `session`: reusing one reference across targets, batch registration
