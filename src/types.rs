// src/types.rs

use serde::{Deserialize, Serialize};

// ============================================================================
// CONFIGURATION
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub detection: DetectionConfig,
    pub tracking: TrackingConfig,
    pub physics: PhysicsConfig,
    pub session: SessionConfig,
    pub replay: ReplayConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Detector class label that counts as the ball.
    pub ball_label: String,
    /// Detections at or below this confidence are ignored.
    pub confidence_threshold: f32,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            ball_label: "sports ball".to_string(),
            confidence_threshold: 0.25,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingConfig {
    /// Smash candidate is rejected once this many later points sit further left.
    pub smash_max_further_left: usize,
    /// First-speed-calc candidate is rejected once this many later points sit further left.
    pub speed_calc_max_further_left: usize,
    /// Newest tracked x must exceed this before a frame yields samples.
    pub new_swing_min_x: f64,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            smash_max_further_left: 3,
            speed_calc_max_further_left: 1,
            new_swing_min_x: 0.1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Feet per normalized image unit.
    pub feet_per_unit: f64,
    /// Capture frame rate assumed for both video and live sources.
    pub frame_rate: f64,
    pub mph_per_ft_per_sec: f64,
    pub ft_per_sec_per_mph: f64,
    /// Applied to the fitted slope before taking atan.
    pub perspective_correction: f64,
    /// Later angles further than this from the last accepted one are dropped.
    pub max_angle_jump_deg: f64,
    pub gravity_ft_s2: f64,
    pub initial_height_ft: f64,
    /// Positive launch angles below this are clamped up to it for the range formula.
    pub min_launch_angle_deg: f64,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            feet_per_unit: 6.0,
            frame_rate: 240.0,
            mph_per_ft_per_sec: 0.681818,
            ft_per_sec_per_mph: 1.46667,
            perspective_correction: 0.7,
            max_angle_jump_deg: 40.0,
            gravity_ft_s2: 32.174,
            initial_height_ft: 4.0,
            min_launch_angle_deg: 0.5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Seconds without a detection before the active swing is finalized.
    pub quiet_period_s: f64,
    /// Only the first N samples of each kind enter the swing average.
    pub samples_per_swing: usize,
    /// Valid speed samples required before a swing can be finalized.
    pub min_speed_samples: usize,
    pub home_run_distance: HomeRunDistance,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            quiet_period_s: 1.0,
            samples_per_swing: 3,
            min_speed_samples: 3,
            home_run_distance: HomeRunDistance::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplayConfig {
    pub input_dir: String,
    pub output_dir: String,
    /// Rate at which the detection log was sampled.
    pub source_fps: f64,
    /// Pace frames at `source_fps` on the wall clock instead of a synthetic clock.
    pub realtime: bool,
    pub view_width: f64,
    pub view_height: f64,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            input_dir: "detections".to_string(),
            output_dir: "output".to_string(),
            source_fps: 60.0,
            realtime: false,
            view_width: 1920.0,
            view_height: 1080.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Selectable home-run thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HomeRunDistance {
    Rookie,
    #[default]
    LittleLeague,
    Varsity,
    Pro,
}

// ============================================================================
// GEOMETRY
// ============================================================================

/// Point in normalized image space: x to the right, y up, both in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2 {
    pub x: f64,
    pub y: f64,
}

impl Point2 {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &Point2) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

// ============================================================================
// DETECTIONS & TRACKING
// ============================================================================

/// Single ball observation for one frame, already class-filtered.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub position: Point2,
    pub frame_index: u64,
    pub confidence: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackedPoint {
    pub position: Point2,
    pub frame_index: u64,
}

impl TrackedPoint {
    pub fn new(position: Point2, frame_index: u64) -> Self {
        Self {
            position,
            frame_index,
        }
    }
}

impl From<Detection> for TrackedPoint {
    fn from(d: Detection) -> Self {
        Self::new(d.position, d.frame_index)
    }
}

// ============================================================================
// RESULTS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SwingResult {
    pub speed_mph: f64,
    pub launch_angle_deg: f64,
    pub distance_ft: f64,
    pub is_home_run: bool,
    /// Frame at which contact was confirmed.
    pub contact_frame: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SessionSummary {
    pub total_swings: usize,
    pub total_home_runs: usize,
    pub longest_distance_ft: f64,
    pub hardest_speed_mph: f64,
    pub avg_distance_ft: f64,
    pub avg_speed_mph: f64,
}

impl SessionSummary {
    /// Count, max and mean reductions over the swing history.
    pub fn from_results(results: &[SwingResult]) -> Self {
        let count = results.len();
        let divisor = count.max(1) as f64;

        Self {
            total_swings: count,
            total_home_runs: results.iter().filter(|r| r.is_home_run).count(),
            longest_distance_ft: results.iter().map(|r| r.distance_ft).fold(0.0, f64::max),
            hardest_speed_mph: results.iter().map(|r| r.speed_mph).fold(0.0, f64::max),
            avg_distance_ft: results.iter().map(|r| r.distance_ft).sum::<f64>() / divisor,
            avg_speed_mph: results.iter().map(|r| r.speed_mph).sum::<f64>() / divisor,
        }
    }
}
