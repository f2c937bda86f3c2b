//! Least-squares polynomial fitting with iterative outlier clipping.
//!
//! Each round fits the transform to the current pairs by ordinary least
//! squares (two decoupled normal-equation systems, one per output axis),
//! measures the squared residual of every pair, drops pairs beyond a hard
//! ceiling, takes the 68.3rd percentile of what remains as `sigma²`, and clips
//! pairs whose squared residual exceeds `clip_factor * sigma²` before the next
//! round.


use glam::DVec2;

use crate::math::{mean_and_std_dev, percentile, solve};
use crate::matching::config::FitConfig;
use crate::matching::error::MatchError;
use crate::matching::result::PairIndex;
use crate::matching::transform::{MAX_TERMS, Transform, TransformOrder, basis};

/// Statistics of one fit round.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitIteration {
    /// Percentile squared residual of the pairs kept this round.
    pub sigma_sq: f64,
    /// Pairs the statistic was computed over.
    pub pairs: usize,
}

/// The accepted fit, the pairs it was measured on, and the round history.
#[derive(Debug, Clone)]
pub struct FitOutcome {
    pub transform: Transform,
    pub pairs: Vec<PairIndex>,
    pub history: Vec<FitIteration>,
}

/// Solve the normal equations of an `N` term basis for both output axes.
fn solve_axes<const N: usize>(
    order: TransformOrder,
    a: &[DVec2],
    b: &[DVec2],
    pairs: &[PairIndex],
) -> Result<([f64; MAX_TERMS], [f64; MAX_TERMS]), MatchError> {
    let mut matrix = [[0.0f64; N]; N];
    let mut rhs_x = [0.0f64; N];
    let mut rhs_y = [0.0f64; N];

    for pair in pairs {
        let t = basis(order, a[pair.a]);
        let target = b[pair.b];
        for r in 0..N {
            for c in r..N {
                matrix[r][c] += t[r] * t[c];
            }
            rhs_x[r] += t[r] * target.x;
            rhs_y[r] += t[r] * target.y;
        }
    }
    for r in 0..N {
        for c in 0..r {
            matrix[r][c] = matrix[c][r];
        }
    }

    let sol_x = solve(matrix, rhs_x)?;
    let sol_y = solve(matrix, rhs_y)?;

    let mut x_coeffs = [0.0; MAX_TERMS];
    let mut y_coeffs = [0.0; MAX_TERMS];
    x_coeffs[..N].copy_from_slice(&sol_x);
    y_coeffs[..N].copy_from_slice(&sol_y);
    Ok((x_coeffs, y_coeffs))
}

/// Ordinary least-squares fit of `order` mapping `a[pair.a]` onto `b[pair.b]`.
///
/// The returned transform carries no statistics.
pub fn fit_polynomial(
    order: TransformOrder,
    a: &[DVec2],
    b: &[DVec2],
    pairs: &[PairIndex],
) -> Result<Transform, MatchError> {
    let required = order.min_pairs();
    if pairs.len() < required {
        return Err(MatchError::InsufficientPoints {
            found: pairs.len(),
            required,
        });
    }

    let (x_coeffs, y_coeffs) = match order {
        TransformOrder::Linear => solve_axes::<3>(order, a, b, pairs)?,
        TransformOrder::Quadratic => solve_axes::<6>(order, a, b, pairs)?,
        TransformOrder::Cubic => solve_axes::<8>(order, a, b, pairs)?,
    };

    let transform = Transform::from_coeffs(order, x_coeffs, y_coeffs);
    if transform.coefficients().iter().all(|v| v.is_finite()) {
        Ok(transform)
    } else {
        Err(MatchError::SingularSystem)
    }
}

/// Squared distance between the transformed A point and its B partner.
#[inline]
pub(crate) fn residual_sq(transform: &Transform, a: &[DVec2], b: &[DVec2], pair: PairIndex) -> f64 {
    transform.apply(a[pair.a]).distance_squared(b[pair.b])
}

/// Fill in `sigma`, `sigma_x`, `sigma_y` and `pairs_used` from `pairs`.
pub(crate) fn with_statistics(
    mut transform: Transform,
    a: &[DVec2],
    b: &[DVec2],
    pairs: &[PairIndex],
    sigma_sq: f64,
) -> Transform {
    let (dx, dy): (Vec<f64>, Vec<f64>) = pairs
        .iter()
        .map(|p| {
            let d = b[p.b] - transform.apply(a[p.a]);
            (d.x, d.y)
        })
        .unzip();
    transform.sigma = sigma_sq.max(0.0).sqrt();
    transform.sigma_x = mean_and_std_dev(&dx).1;
    transform.sigma_y = mean_and_std_dev(&dy).1;
    transform.pairs_used = pairs.len();
    transform
}

/// Drop pairs whose residual exceeds `limit_sq`, keeping `pairs` and
/// `residuals` aligned and in order.
fn retain_within(pairs: &mut Vec<PairIndex>, residuals: &mut Vec<f64>, limit_sq: f64) -> usize {
    let before = pairs.len();
    let mut keep = residuals.iter().map(|&r| r <= limit_sq);
    pairs.retain(|_| keep.next().unwrap_or(false));
    residuals.retain(|&r| r <= limit_sq);
    before - pairs.len()
}

/// Fit a transform to candidate correspondences while rejecting outliers.
///
/// With `recalc` every seed takes part in the first fit; otherwise only the
/// first [`FitConfig::start_pairs_for`] seeds do, which should be the most
/// trusted ones. Residuals are always measured over every surviving seed.
///
/// Iteration ends when sigma² drops to `halt_sigma`, when a round clips
/// nothing, or after `max_iterations` rounds. A round whose sigma² would
/// exceed the previous one is discarded and ends iteration, so the recorded
/// history never increases. Fails when fewer pairs than the order needs
/// remain.
pub fn robust_fit(
    order: TransformOrder,
    a: &[DVec2],
    b: &[DVec2],
    seeds: &[PairIndex],
    recalc: bool,
    config: &FitConfig,
) -> Result<FitOutcome, MatchError> {
    let required = order.min_pairs();
    if seeds.len() < required {
        return Err(MatchError::InsufficientPoints {
            found: seeds.len(),
            required,
        });
    }

    let mut current: Vec<PairIndex> = seeds.to_vec();
    let mut fit_set: Vec<PairIndex> = if recalc {
        current.clone()
    } else {
        current[..config.start_pairs_for(order).min(current.len())].to_vec()
    };

    let max_residual_sq = config.max_residual * config.max_residual;
    let mut history: Vec<FitIteration> = Vec::new();
    let mut accepted: Option<(Transform, Vec<PairIndex>, f64)> = None;

    for iteration in 0..config.max_iterations {
        let transform = match fit_polynomial(order, a, b, &fit_set) {
            Ok(transform) => transform,
            Err(error) if accepted.is_some() => {
                tracing::debug!(iteration, %error, "refit failed, keeping previous fit");
                break;
            }
            Err(error) => return Err(error),
        };

        let mut residuals: Vec<f64> = current
            .iter()
            .map(|&p| residual_sq(&transform, a, b, p))
            .collect();

        let discarded = retain_within(&mut current, &mut residuals, max_residual_sq);
        if current.len() < required {
            return Err(MatchError::InsufficientPoints {
                found: current.len(),
                required,
            });
        }

        // `retain_within` guarantees at least `required` residuals here.
        let sigma_sq = percentile(&residuals, config.percentile).unwrap_or(0.0);

        if let Some((_, _, prev_sigma_sq)) = &accepted {
            if sigma_sq > *prev_sigma_sq {
                tracing::debug!(
                    iteration,
                    sigma_sq,
                    prev_sigma_sq,
                    "sigma increased, keeping previous fit"
                );
                break;
            }
        }

        tracing::debug!(
            iteration,
            pairs = current.len(),
            discarded,
            sigma_sq,
            "fit iteration"
        );

        history.push(FitIteration {
            sigma_sq,
            pairs: current.len(),
        });
        accepted = Some((transform, current.clone(), sigma_sq));

        if sigma_sq <= config.halt_sigma {
            break;
        }

        let clipped = retain_within(&mut current, &mut residuals, config.clip_factor * sigma_sq);
        if current.len() < required {
            return Err(MatchError::InsufficientPoints {
                found: current.len(),
                required,
            });
        }
        if clipped == 0 && fit_set == current {
            break;
        }
        fit_set.clone_from(&current);
    }

    let Some((transform, pairs, sigma_sq)) = accepted else {
        return Err(MatchError::InsufficientPoints {
            found: 0,
            required,
        });
    };

    let transform = with_statistics(transform, a, b, &pairs, sigma_sq);
    Ok(FitOutcome {
        transform,
        pairs,
        history,
    })
}
