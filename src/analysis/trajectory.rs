// src/analysis/trajectory.rs
//
// Visual trajectory reconstruction for overlays: a parabola through the
// post-contact points, fitted and sampled in view space.

use super::outlier_filter::{remove_outliers, DEFAULT_Z_THRESHOLD};
use super::parabola::{fit_parabola, sample_curve, ParabolaCoefficients, MIN_FIT_POINTS};
use crate::coordinates::ViewTransform;
use crate::types::{Point2, TrackedPoint};
use serde::Serialize;
use tracing::debug;

/// Pixel step between curve samples.
const CURVE_STEP_PX: f64 = 1.0;

#[derive(Debug, Clone, Serialize)]
pub struct TrajectoryCurve {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    /// View-space samples from the first to the last tracked x.
    pub samples: Vec<Point2>,
}

/// Fit and sample the trajectory of the active swing in view space.
///
/// The smash point is prepended when `tracked` does not already contain it.
/// Outliers are removed before fitting when at least 3 points survive.
pub fn trajectory_curve(
    tracked: &[TrackedPoint],
    smash: Option<TrackedPoint>,
    view: &ViewTransform,
) -> Option<TrajectoryCurve> {
    let mut points: Vec<Point2> = tracked.iter().map(|p| view.to_view(p.position)).collect();

    if let Some(smash) = smash {
        let converted = view.to_view(smash.position);
        if !points.contains(&converted) {
            points.insert(0, converted);
        }
    }

    if points.len() < MIN_FIT_POINTS {
        return None;
    }

    let filtered = remove_outliers(&points, DEFAULT_Z_THRESHOLD);
    let fit_input = if filtered.len() >= MIN_FIT_POINTS {
        &filtered
    } else {
        &points
    };

    let Some(ParabolaCoefficients { a, b, c }) = fit_parabola(fit_input) else {
        debug!("❌ Trajectory fit failed over {} points", fit_input.len());
        return None;
    };

    let first = *points.first()?;
    let last = *points.last()?;
    let samples = sample_curve(&ParabolaCoefficients { a, b, c }, first, last.x, CURVE_STEP_PX);

    Some(TrajectoryCurve { a, b, c, samples })
}
