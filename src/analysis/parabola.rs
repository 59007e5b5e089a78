// src/analysis/parabola.rs
//
// Least-squares quadratic fit y = a·x² + b·x + c over ball positions.
//
// Used twice:
//   - Launch angle: slope of the fitted curve at the newest tracked x.
//   - Overlay: sampled curve through the post-contact points in view space.
//
// The 3×3 normal equations are solved by Gauss-Jordan elimination that
// normalizes each pivot row in place. There is no row exchange: a pivot of
// exactly zero fails the solve, and near-singular systems come back with
// whatever precision the elimination leaves.

use crate::types::Point2;

/// Minimum number of points for a quadratic fit.
pub const MIN_FIT_POINTS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParabolaCoefficients {
    pub a: f64,
    pub b: f64,
    pub c: f64,
}

impl ParabolaCoefficients {
    pub fn evaluate(&self, x: f64) -> f64 {
        self.a * x * x + self.b * x + self.c
    }

    /// First derivative dy/dx at `x`.
    pub fn slope_at(&self, x: f64) -> f64 {
        2.0 * self.a * x + self.b
    }
}

// ============================================================================
// LINEAR SOLVER
// ============================================================================

/// Solve `matrix · v = rhs` for a 3×3 system.
///
/// Works on copies of the inputs. For each row i the pivot row is divided by
/// `matrix[i][i]` and column i is eliminated from every other row.
/// Returns None when a pivot is exactly zero.
pub fn solve_3x3(matrix: [[f64; 3]; 3], rhs: [f64; 3]) -> Option<[f64; 3]> {
    let mut m = matrix;
    let mut r = rhs;

    for i in 0..3 {
        let pivot = m[i][i];
        if pivot == 0.0 {
            return None;
        }

        for j in i..3 {
            m[i][j] /= pivot;
        }
        r[i] /= pivot;

        for k in 0..3 {
            if k == i {
                continue;
            }
            let factor = m[k][i];
            for j in i..3 {
                m[k][j] -= factor * m[i][j];
            }
            r[k] -= factor * r[i];
        }
    }

    Some(r)
}

// ============================================================================
// PARABOLA FIT
// ============================================================================

/// Fit y = a·x² + b·x + c to `points` by least squares.
///
/// Returns None for fewer than 3 points or when the normal equations hit a
/// zero pivot. Collinear or clustered x values are not screened here.
pub fn fit_parabola(points: &[Point2]) -> Option<ParabolaCoefficients> {
    if points.len() < MIN_FIT_POINTS {
        return None;
    }

    let mut sx = 0.0;
    let mut sy = 0.0;
    let mut sx2 = 0.0;
    let mut sx3 = 0.0;
    let mut sx4 = 0.0;
    let mut sxy = 0.0;
    let mut sx2y = 0.0;

    for p in points {
        let x2 = p.x * p.x;
        sx += p.x;
        sy += p.y;
        sx2 += x2;
        sx3 += x2 * p.x;
        sx4 += x2 * x2;
        sxy += p.x * p.y;
        sx2y += x2 * p.y;
    }

    let n = points.len() as f64;

    //   | Σx⁴ Σx³ Σx² | | a |   | Σx²y |
    //   | Σx³ Σx² Σx  | | b | = | Σxy  |
    //   | Σx² Σx  n   | | c |   | Σy   |
    let [a, b, c] = solve_3x3(
        [[sx4, sx3, sx2], [sx3, sx2, sx], [sx2, sx, n]],
        [sx2y, sxy, sy],
    )?;

    Some(ParabolaCoefficients { a, b, c })
}

/// Sample a fitted curve at `step` increments of x over `[x_start, x_end)`.
///
/// The first sample is `start` itself so the curve is anchored on the first
/// observed point. Walks right-to-left when `x_end < x_start`.
pub fn sample_curve(
    coefficients: &ParabolaCoefficients,
    start: Point2,
    x_end: f64,
    step: f64,
) -> Vec<Point2> {
    let step = step.abs();
    if step == 0.0 || !step.is_finite() {
        return vec![start];
    }

    let span = x_end - start.x;
    let count = (span.abs() / step).ceil() as usize;
    let dir = span.signum();

    let mut samples = Vec::with_capacity(count + 1);
    samples.push(start);
    for i in 0..count {
        let x = start.x + dir * step * i as f64;
        samples.push(Point2::new(x, coefficients.evaluate(x)));
    }
    samples
}
