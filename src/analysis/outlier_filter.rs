// src/analysis/outlier_filter.rs
//
// Z-score outlier rejection for the overlay trajectory. The numeric swing
// averages never pass through here.

use crate::types::Point2;

pub const DEFAULT_Z_THRESHOLD: f64 = 2.0;

/// Drop points whose x or y z-score reaches `z_threshold`.
///
/// Fewer than 3 points pass through unchanged. An axis with zero spread
/// scores every point as 0 on that axis.
pub fn remove_outliers(points: &[Point2], z_threshold: f64) -> Vec<Point2> {
    if points.len() < 3 {
        return points.to_vec();
    }

    let (mean_x, std_x) = mean_and_std(points.iter().map(|p| p.x));
    let (mean_y, std_y) = mean_and_std(points.iter().map(|p| p.y));

    points
        .iter()
        .filter(|p| {
            z_score(p.x, mean_x, std_x) < z_threshold && z_score(p.y, mean_y, std_y) < z_threshold
        })
        .copied()
        .collect()
}

/// Population mean and standard deviation.
fn mean_and_std(values: impl Iterator<Item = f64> + Clone) -> (f64, f64) {
    let n = values.clone().count() as f64;
    let mean = values.clone().sum::<f64>() / n;
    let variance = values.map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, variance.sqrt())
}

fn z_score(value: f64, mean: f64, std: f64) -> f64 {
    if std > 0.0 {
        (value - mean).abs() / std
    } else {
        0.0
    }
}
