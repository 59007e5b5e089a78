// src/detection/ball_filter.rs
//
// Reduces one frame of raw detector output to at most one ball observation.

use crate::types::{Detection, DetectionConfig, Point2};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::trace;

/// Detector output as produced by the host's model, in normalized coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawDetection {
    pub label: String,
    pub confidence: f32,
    /// [min_x, min_y, max_x, max_y]
    pub bbox: [f64; 4],
}

impl RawDetection {
    pub fn center(&self) -> Point2 {
        Point2::new(
            (self.bbox[0] + self.bbox[2]) / 2.0,
            (self.bbox[1] + self.bbox[3]) / 2.0,
        )
    }
}

pub struct BallFilter {
    config: DetectionConfig,
}

impl BallFilter {
    pub fn new(config: DetectionConfig) -> Self {
        Self { config }
    }

    /// Highest-confidence ball above the threshold, if any.
    pub fn select(&self, frame_index: u64, detections: &[RawDetection]) -> Option<Detection> {
        let best = detections
            .iter()
            .filter(|d| d.label == self.config.ball_label)
            .filter(|d| d.confidence > self.config.confidence_threshold)
            .filter(|d| d.bbox.iter().all(|v| v.is_finite()))
            .max_by(|a, b| {
                a.confidence
                    .partial_cmp(&b.confidence)
                    .unwrap_or(Ordering::Equal)
            })?;

        trace!(
            "Frame {}: ball at conf {:.2} from {} raw detections",
            frame_index,
            best.confidence,
            detections.len()
        );

        Some(Detection {
            position: best.center(),
            frame_index,
            confidence: best.confidence,
        })
    }
}
