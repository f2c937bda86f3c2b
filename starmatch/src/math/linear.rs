//! Dense Gaussian elimination with scaled partial pivoting.
//!
//! Systems here are small (3, 6 or 8 unknowns for the polynomial fits), so the
//! matrix lives on the stack as `[[f64; N]; N]` and is consumed by the solve.

use thiserror::Error;

/// Smallest accepted ratio of a pivot to the largest magnitude in its row.
pub const PIVOT_TOLERANCE: f64 = 1e-12;

/// The system has no unique solution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("linear system is singular")]
pub struct SingularMatrix;

/// Solve `matrix * x = rhs`.
///
/// Row scales (largest magnitude per row) are computed once up front and travel
/// with their rows during swaps. Before eliminating column `i` the row at or
/// below `i` with the largest `|m[row][i]| / scale[row]` becomes the pivot row.
/// A zero row scale, a non-finite entry, or a pivot whose scaled magnitude
/// drops under [`PIVOT_TOLERANCE`] rejects the system.
pub fn solve<const N: usize>(
    mut matrix: [[f64; N]; N],
    mut rhs: [f64; N],
) -> Result<[f64; N], SingularMatrix> {
    let mut scale = [0.0f64; N];
    for (row, s) in matrix.iter().zip(scale.iter_mut()) {
        *s = row.iter().fold(0.0f64, |acc, v| acc.max(v.abs()));
        if *s == 0.0 || !s.is_finite() {
            return Err(SingularMatrix);
        }
    }

    for i in 0..N {
        let mut pivot_row = i;
        let mut best = matrix[i][i].abs() / scale[i];
        for row in (i + 1)..N {
            let ratio = matrix[row][i].abs() / scale[row];
            if ratio > best {
                best = ratio;
                pivot_row = row;
            }
        }

        if pivot_row != i {
            matrix.swap(i, pivot_row);
            rhs.swap(i, pivot_row);
            scale.swap(i, pivot_row);
        }

        if !(best >= PIVOT_TOLERANCE) {
            return Err(SingularMatrix);
        }

        let pivot = matrix[i][i];
        for row in (i + 1)..N {
            let factor = matrix[row][i] / pivot;
            if factor == 0.0 {
                continue;
            }
            matrix[row][i] = 0.0;
            for col in (i + 1)..N {
                matrix[row][col] -= factor * matrix[i][col];
            }
            rhs[row] -= factor * rhs[i];
        }
    }

    let mut solution = [0.0f64; N];
    for i in (0..N).rev() {
        let mut sum = rhs[i];
        for col in (i + 1)..N {
            sum -= matrix[i][col] * solution[col];
        }
        solution[i] = sum / matrix[i][i];
    }

    if solution.iter().all(|v| v.is_finite()) {
        Ok(solution)
    } else {
        Err(SingularMatrix)
    }
}
