//! Example: Match a synthetic star list against a rotated, scaled copy
//!
//! Builds a random reference field, maps it through a known similarity
//! transform, sprinkles in spurious detections and positional noise, then
//! registers the two lists and reports how well the transform was recovered.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example synthetic_match -- [star_count] [seed]
//! RUST_LOG=starmatch=debug cargo run --example synthetic_match
//! ```

use std::env;

use common::{FloatExt, LogSettings, setup_logging};
use glam::DVec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use starmatch::{MatchConfig, Point, Transform, register};

const FIELD_SIZE: f64 = 2000.0;
const SPURIOUS_FRACTION: f64 = 0.2;
const NOISE: f64 = 0.3;

fn main() -> anyhow::Result<()> {
    setup_logging(&LogSettings {
        directory: None,
        ..LogSettings::default()
    })?;

    let mut args = env::args().skip(1);
    let count: usize = args.next().map(|s| s.parse()).transpose()?.unwrap_or(150);
    let seed: u64 = args.next().map(|s| s.parse()).transpose()?.unwrap_or(42);

    let mut rng = StdRng::seed_from_u64(seed);
    let reference: Vec<Point> = (0..count)
        .map(|i| {
            Point::new(
                i as u64,
                rng.random_range(0.0..FIELD_SIZE),
                rng.random_range(0.0..FIELD_SIZE),
                rng.random_range(6.0..16.0),
            )
        })
        .collect();

    let truth = Transform::similarity(
        DVec2::new(rng.random_range(-200.0..200.0), rng.random_range(-200.0..200.0)),
        rng.random_range(-180.0..180.0),
        rng.random_range(0.8..1.25),
    );

    let mut target: Vec<Point> = reference
        .iter()
        .map(|p| {
            let noise = DVec2::new(rng.random_range(-NOISE..NOISE), rng.random_range(-NOISE..NOISE));
            Point {
                id: p.id + 100_000,
                ..p.with_pos(truth.apply(p.pos) + noise)
            }
        })
        .collect();
    let spurious = (count as f64 * SPURIOUS_FRACTION) as usize;
    target.extend((0..spurious).map(|i| {
        Point::new(
            200_000 + i as u64,
            rng.random_range(0.0..FIELD_SIZE),
            rng.random_range(0.0..FIELD_SIZE),
            rng.random_range(6.0..16.0),
        )
    }));

    tracing::info!(
        reference = reference.len(),
        target = target.len(),
        spurious,
        "generated lists, true transform {truth}"
    );

    let result = register(&reference, &target, &MatchConfig::default())?;
    let found = &result.transform;

    println!("true:      {truth}");
    println!("recovered: {found}");
    println!(
        "rotation error {:.4}°, scale error {:.2e}",
        (found.rotation_deg() - truth.rotation_deg()).wrap_degrees().abs(),
        (found.scale_factor() - truth.scale_factor()).abs()
    );
    println!(
        "matched {} of {} ({:.1}%), {} target points unmatched, {:.1} ms",
        result.lists.num_matched(),
        reference.len(),
        100.0 * result.match_fraction(),
        result.lists.unmatched_b.len(),
        result.elapsed_ms
    );

    let wrong = result
        .lists
        .matched_a
        .iter()
        .zip(&result.lists.matched_b)
        .filter(|(a, b)| a.id + 100_000 != b.id)
        .count();
    if wrong > 0 {
        tracing::warn!(wrong, "some matches pair the wrong points");
    }

    Ok(())
}
