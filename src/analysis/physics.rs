// src/analysis/physics.rs
//
// Swing physics from the post-contact trajectory.
//
//   speed:    displacement from the first-speed-calc point F to the newest
//              point P, per elapsed frame, scaled to mph.
//   angle:    atan of the fitted parabola's slope at the newest x, after a
//              fixed perspective correction.
//   distance: projectile range with launch height:
//                hf = sqrt(1 + 2gh / (v² sin²θ))
//                d  = (v² sin 2θ / g) · hf
//
// Degenerate inputs never produce NaN/∞ samples:
//   - zero displacement or zero elapsed frames → no speed sample
//   - θ ≤ 0 → 0 ft (ball driven into the ground)
//   - 0 < θ < min_launch_angle_deg → θ clamped to the minimum

use super::parabola::{fit_parabola, MIN_FIT_POINTS};
use crate::types::{PhysicsConfig, Point2, TrackedPoint};
use tracing::{debug, trace};

/// Samples derived from a single frame of the active swing.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PhysicsSample {
    pub speed_mph: Option<f64>,
    /// Angle accepted by the stability guard. Rejected angles are `None`.
    pub launch_angle_deg: Option<f64>,
    pub distance_ft: Option<f64>,
    /// Fitted angle was dropped as an unstable jump.
    pub angle_rejected: bool,
}

/// First tracked point showing confirmed rightward motion.
///
/// Only the first rightward step is considered: if `max_further_left` or more
/// later points sit left of it the swing has no reference point yet.
pub fn first_speed_calc_point(
    tracked: &[TrackedPoint],
    max_further_left: usize,
) -> Option<TrackedPoint> {
    if tracked.len() < 2 {
        return None;
    }

    let idx = (1..tracked.len()).find(|&i| tracked[i].position.x > tracked[i - 1].position.x)?;
    let candidate = tracked[idx];

    let further_left = tracked[idx + 1..]
        .iter()
        .filter(|p| p.position.x < candidate.position.x)
        .count();

    if further_left < max_further_left {
        Some(candidate)
    } else {
        trace!(
            "Speed reference at frame {} unstable ({} later points further left)",
            candidate.frame_index,
            further_left
        );
        None
    }
}

pub struct PhysicsEstimator {
    config: PhysicsConfig,
    last_valid_angle: Option<f64>,
}

impl PhysicsEstimator {
    pub fn new(config: PhysicsConfig) -> Self {
        Self {
            config,
            last_valid_angle: None,
        }
    }

    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    /// Exit speed in mph between reference `from` and later point `to`.
    pub fn exit_speed_mph(&self, from: &TrackedPoint, to: &TrackedPoint) -> Option<f64> {
        if to.frame_index <= from.frame_index {
            return None;
        }

        let distance = from.position.distance_to(&to.position);
        if distance == 0.0 {
            return None;
        }

        let frames = (to.frame_index - from.frame_index) as f64;
        let ft_per_frame = distance * self.config.feet_per_unit / frames;
        let ft_per_sec = ft_per_frame * self.config.frame_rate;
        let mph = ft_per_sec * self.config.mph_per_ft_per_sec;

        mph.is_finite().then_some(mph)
    }

    /// Launch angle in degrees from a quadratic fit over `points`, taken at
    /// the last point's x. No stability guard.
    pub fn fitted_launch_angle(&self, points: &[Point2]) -> Option<f64> {
        if points.len() < MIN_FIT_POINTS {
            return None;
        }
        let coeffs = fit_parabola(points)?;
        let final_x = points.last()?.x;
        let corrected = coeffs.slope_at(final_x) * self.config.perspective_correction;
        let angle = corrected.atan().to_degrees();

        angle.is_finite().then_some(angle)
    }

    /// Stability guard: the first angle is always accepted, later ones only
    /// within `max_angle_jump_deg` of the last accepted angle.
    pub fn accept_angle(&mut self, angle_deg: f64) -> bool {
        match self.last_valid_angle {
            Some(last) if (angle_deg - last).abs() > self.config.max_angle_jump_deg => {
                debug!(
                    "Launch angle {:.1}° rejected (last accepted {:.1}°)",
                    angle_deg, last
                );
                false
            }
            _ => {
                self.last_valid_angle = Some(angle_deg);
                true
            }
        }
    }

    pub fn last_valid_angle(&self) -> Option<f64> {
        self.last_valid_angle
    }

    /// Projected carry distance in feet.
    pub fn projected_distance_ft(&self, speed_mph: f64, angle_deg: f64) -> Option<f64> {
        if !(speed_mph.is_finite() && angle_deg.is_finite()) || speed_mph <= 0.0 {
            return None;
        }
        if angle_deg <= 0.0 {
            return Some(0.0);
        }

        let g = self.config.gravity_ft_s2;
        let h = self.config.initial_height_ft;
        let v = speed_mph * self.config.ft_per_sec_per_mph;
        let theta = angle_deg.max(self.config.min_launch_angle_deg).to_radians();

        let v2 = v * v;
        let sin_theta_sq = theta.sin().powi(2);
        let height_factor = (1.0 + (2.0 * g * h) / (v2 * sin_theta_sq)).sqrt();
        let distance = (v2 * (2.0 * theta).sin() / g) * height_factor;

        distance.is_finite().then_some(distance)
    }

    /// Evaluate the newest tracked point of the active swing.
    pub fn estimate(&mut self, tracked: &[TrackedPoint], speed_reference: &TrackedPoint) -> PhysicsSample {
        let mut sample = PhysicsSample::default();

        let Some(latest) = tracked.last() else {
            return sample;
        };
        if latest.frame_index <= speed_reference.frame_index {
            return sample;
        }
        if latest.position == speed_reference.position {
            trace!("Frame {} has not moved from the speed reference", latest.frame_index);
            return sample;
        }

        let Some(speed) = self.exit_speed_mph(speed_reference, latest) else {
            return sample;
        };
        sample.speed_mph = Some(speed);

        let positions: Vec<Point2> = tracked.iter().map(|p| p.position).collect();
        if let Some(angle) = self.fitted_launch_angle(&positions) {
            if self.accept_angle(angle) {
                sample.launch_angle_deg = Some(angle);
                sample.distance_ft = self.projected_distance_ft(speed, angle);
            } else {
                // Distance is sampled only for accepted angles.
                sample.angle_rejected = true;
            }
        }

        sample
    }

    pub fn reset(&mut self) {
        self.last_valid_angle = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tp(x: f64, y: f64, frame: u64) -> TrackedPoint {
        TrackedPoint::new(Point2::new(x, y), frame)
    }

    fn estimator() -> PhysicsEstimator {
        PhysicsEstimator::new(PhysicsConfig::default())
    }

    #[test]
    fn test_first_speed_calc_point_needs_two_points() {
        assert!(first_speed_calc_point(&[tp(0.1, 0.5, 1)], 1).is_none());
        assert!(first_speed_calc_point(&[], 1).is_none());
    }

    #[test]
    fn test_first_speed_calc_point_first_rightward_step() {
        let tracked = [tp(0.08, 0.45, 26), tp(0.09, 0.47, 27), tp(0.12, 0.52, 28)];
        let f = first_speed_calc_point(&tracked, 1).unwrap();
        assert_eq!(f.frame_index, 27);
    }

    #[test]
    fn test_first_speed_calc_point_unstable() {
        // Moves right then falls back left of the candidate
        let tracked = [tp(0.10, 0.5, 1), tp(0.12, 0.5, 2), tp(0.11, 0.5, 3)];
        assert!(first_speed_calc_point(&tracked, 1).is_none());
        // A looser guard tolerates one regression
        assert!(first_speed_calc_point(&tracked, 2).is_some());
    }

    #[test]
    fn test_exit_speed_conversion() {
        let est = estimator();
        let from = tp(0.0, 0.0, 10);
        let to = tp(0.03, 0.04, 12); // 0.05 units over 2 frames
        let speed = est.exit_speed_mph(&from, &to).unwrap();
        let expected = 0.05 * 6.0 / 2.0 * 240.0 * 0.681818;
        assert!((speed - expected).abs() < 1e-9);
    }

    #[test]
    fn test_exit_speed_rejects_degenerate_pairs() {
        let est = estimator();
        assert!(est.exit_speed_mph(&tp(0.1, 0.1, 5), &tp(0.1, 0.1, 6)).is_none());
        assert!(est.exit_speed_mph(&tp(0.1, 0.1, 5), &tp(0.2, 0.1, 5)).is_none());
    }

    #[test]
    fn test_distance_matches_closed_form() {
        let est = estimator();
        let distance = est.projected_distance_ft(60.0, 30.0).unwrap();

        let v: f64 = 60.0 * 1.46667;
        let theta = 30.0_f64.to_radians();
        let g = 32.174;
        let h = 4.0;
        let hf = (1.0 + 2.0 * g * h / (v * v * theta.sin().powi(2))).sqrt();
        let expected = v * v * (2.0 * theta).sin() / g * hf;

        assert!(((distance - expected) / expected).abs() < 1e-3);
        assert!(distance > 200.0 && distance < 240.0, "distance = {}", distance);
    }

    #[test]
    fn test_distance_zero_angle_policy() {
        let est = estimator();
        assert_eq!(est.projected_distance_ft(70.0, 0.0), Some(0.0));
        assert_eq!(est.projected_distance_ft(70.0, -12.0), Some(0.0));
        assert!(est.projected_distance_ft(0.0, 25.0).is_none());

        let tiny = est.projected_distance_ft(70.0, 1e-9).unwrap();
        let clamped = est.projected_distance_ft(70.0, 0.5).unwrap();
        assert!(tiny.is_finite());
        assert_eq!(tiny, clamped);
    }

    #[test]
    fn test_angle_guard_discards_large_jump() {
        let mut est = estimator();
        assert!(est.accept_angle(20.0));
        assert!(!est.accept_angle(65.0));
        assert_eq!(est.last_valid_angle(), Some(20.0));
        assert!(est.accept_angle(55.0));
        assert_eq!(est.last_valid_angle(), Some(55.0));
    }

    #[test]
    fn test_angle_guard_resets() {
        let mut est = estimator();
        est.accept_angle(10.0);
        est.reset();
        assert!(est.accept_angle(80.0));
    }

    #[test]
    fn test_fitted_launch_angle_rising_trajectory() {
        let est = estimator();
        let points = [
            Point2::new(0.1, 0.40),
            Point2::new(0.2, 0.50),
            Point2::new(0.3, 0.60),
        ];
        // Straight line, slope 1 → atan(0.7)
        let angle = est.fitted_launch_angle(&points).unwrap();
        assert!((angle - 0.7f64.atan().to_degrees()).abs() < 1e-6);
    }

    #[test]
    fn test_estimate_produces_all_samples() {
        let mut est = estimator();
        let tracked = [
            tp(0.08, 0.45, 26),
            tp(0.09, 0.47, 27),
            tp(0.12, 0.52, 28),
        ];
        let reference = tracked[1];
        let sample = est.estimate(&tracked, &reference);

        assert!(sample.speed_mph.unwrap() > 0.0);
        assert!(sample.launch_angle_deg.unwrap() > 0.0);
        assert!(sample.distance_ft.unwrap() > 0.0);
        assert!(!sample.angle_rejected);
    }

    #[test]
    fn test_rejected_angle_yields_no_distance() {
        let mut est = estimator();
        // Prior accepted angle far below the ~45° this fit produces
        assert!(est.accept_angle(-10.0));
        let tracked = [
            tp(0.08, 0.45, 26),
            tp(0.09, 0.47, 27),
            tp(0.12, 0.52, 28),
        ];
        let sample = est.estimate(&tracked, &tracked[1]);

        assert!(sample.speed_mph.is_some());
        assert!(sample.angle_rejected);
        assert!(sample.launch_angle_deg.is_none());
        assert!(sample.distance_ft.is_none());
        assert_eq!(est.last_valid_angle(), Some(-10.0));
    }

    #[test]
    fn test_estimate_skips_reference_frame() {
        let mut est = estimator();
        let tracked = [tp(0.08, 0.45, 26), tp(0.09, 0.47, 27)];
        let sample = est.estimate(&tracked, &tracked[1]);
        assert_eq!(sample, PhysicsSample::default());
    }
}
