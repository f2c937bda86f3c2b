//! Testing utilities for starmatch.
//!
//! Synthetic star fields built from a seeded [`StdRng`], so every test sees
//! the same field on every run.

#![allow(dead_code)]

use glam::DVec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::matching::transform::Transform;
use crate::point::Point;

/// Initialize tracing subscriber for tests.
/// Safe to call multiple times - will only initialize once.
/// Respects RUST_LOG env var, defaults to "info".
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

/// `count` points spread uniformly over `width x height`.
///
/// Identifiers run from 0 and magnitudes from 8 to 16, all distinct, so the
/// brightness order is unambiguous.
pub fn random_field(count: usize, width: f64, height: f64, seed: u64) -> Vec<Point> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|i| {
            let x = rng.random_range(0.0..width);
            let y = rng.random_range(0.0..height);
            let magnitude = 8.0 + 8.0 * i as f64 / count as f64 + rng.random_range(0.0..1e-3);
            Point::new(i as u64, x, y, magnitude)
        })
        .collect()
}

/// Positions of `points`.
pub fn positions(points: &[Point]) -> Vec<DVec2> {
    points.iter().map(|p| p.pos).collect()
}

/// Map `points` through `transform`, shifting identifiers by `id_offset` so
/// the two lists can be told apart.
pub fn transform_points(points: &[Point], transform: &Transform, id_offset: u64) -> Vec<Point> {
    points
        .iter()
        .map(|p| Point {
            id: p.id + id_offset,
            ..p.with_pos(transform.apply(p.pos))
        })
        .collect()
}

/// Displace each point uniformly by up to `amplitude` on each axis.
pub fn add_noise(points: &[Point], amplitude: f64, seed: u64) -> Vec<Point> {
    let mut rng = StdRng::seed_from_u64(seed);
    points
        .iter()
        .map(|p| {
            let noise = DVec2::new(
                rng.random_range(-amplitude..=amplitude),
                rng.random_range(-amplitude..=amplitude),
            );
            p.with_pos(p.pos + noise)
        })
        .collect()
}

/// Append `count` unrelated points fainter than magnitude 20, with
/// identifiers starting at `first_id`.
pub fn with_spurious(
    points: &[Point],
    count: usize,
    width: f64,
    height: f64,
    first_id: u64,
    seed: u64,
) -> Vec<Point> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut out = points.to_vec();
    out.extend((0..count).map(|i| {
        Point::new(
            first_id + i as u64,
            rng.random_range(0.0..width),
            rng.random_range(0.0..height),
            20.0 + rng.random_range(0.0..2.0),
        )
    }));
    out
}

/// Drop each point with probability `fraction`.
pub fn remove_random(points: &[Point], fraction: f64, seed: u64) -> Vec<Point> {
    assert!(
        (0.0..=1.0).contains(&fraction),
        "fraction must be between 0.0 and 1.0"
    );
    let mut rng = StdRng::seed_from_u64(seed);
    points
        .iter()
        .filter(|_| rng.random::<f64>() >= fraction)
        .copied()
        .collect()
}

/// Regular `n x n` grid of positions with spacing `step`, starting at `origin`.
pub fn grid(n: usize, step: f64, origin: DVec2) -> Vec<DVec2> {
    (0..n * n)
        .map(|i| origin + DVec2::new((i % n) as f64 * step, (i / n) as f64 * step))
        .collect()
}
