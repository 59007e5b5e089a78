// src/pipeline/metrics.rs
//
// Per-session counters, bumped in place by the owning session.

use serde::Serialize;

#[derive(Debug, Clone, Default)]
pub struct TrackingMetrics {
    pub frames_processed: u64,
    pub frames_ignored: u64,
    pub duplicates_dropped: u64,
    pub contacts_detected: u64,
    pub speed_samples: u64,
    pub speed_samples_rejected: u64,
    pub angle_samples: u64,
    pub angle_samples_rejected: u64,
    pub distance_samples: u64,
    pub swings_finalized: u64,
    pub swings_discarded: u64,
}

impl TrackingMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn summary(&self) -> MetricsSummary {
        let frames = self.frames_processed.max(1) as f64;
        MetricsSummary {
            frames_processed: self.frames_processed,
            frames_ignored: self.frames_ignored,
            duplicates_dropped: self.duplicates_dropped,
            duplicate_rate: self.duplicates_dropped as f64 / frames,
            contacts_detected: self.contacts_detected,
            speed_samples: self.speed_samples,
            speed_samples_rejected: self.speed_samples_rejected,
            angle_samples: self.angle_samples,
            angle_samples_rejected: self.angle_samples_rejected,
            distance_samples: self.distance_samples,
            swings_finalized: self.swings_finalized,
            swings_discarded: self.swings_discarded,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricsSummary {
    pub frames_processed: u64,
    pub frames_ignored: u64,
    pub duplicates_dropped: u64,
    pub duplicate_rate: f64,
    pub contacts_detected: u64,
    pub speed_samples: u64,
    pub speed_samples_rejected: u64,
    pub angle_samples: u64,
    pub angle_samples_rejected: u64,
    pub distance_samples: u64,
    pub swings_finalized: u64,
    pub swings_discarded: u64,
}
