// src/pipeline/frame_result.rs
//
// Snapshot handed back from every processed frame. Everything the overlay
// needs for this frame, read from one place after the segmenter has run.

use crate::detection::{SegmentOutcome, SegmenterState};
use crate::types::TrackedPoint;
use serde::Serialize;

/// Points drawn as the speed-calculation triple.
const SPEED_CALC_POINTS: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameResult {
    pub frame_index: u64,
    pub state: SegmenterState,
    /// Raw ball stream of the current swing (pre- and post-contact).
    pub all_tracked_points: Vec<TrackedPoint>,
    /// Active swing trajectory, smash point first.
    pub tracked_points: Vec<TrackedPoint>,
    pub smash_point: Option<TrackedPoint>,
    /// First-speed-calc point and the tracked points right after it.
    pub speed_calc_points: Vec<TrackedPoint>,
    /// A speed/angle/distance sample was recorded on this frame.
    pub sampled: bool,
    #[serde(skip)]
    pub outcome: Option<SegmentOutcome>,
}

impl FrameResult {
    /// Result for a frame the session did not consume.
    pub fn ignored(frame_index: u64, state: SegmenterState) -> Self {
        Self {
            frame_index,
            state,
            all_tracked_points: Vec::new(),
            tracked_points: Vec::new(),
            smash_point: None,
            speed_calc_points: Vec::new(),
            sampled: false,
            outcome: None,
        }
    }

    pub fn is_tracking(&self) -> bool {
        matches!(self.state, SegmenterState::Tracking)
    }
}

/// Tracked points from `reference` onward, at most three.
pub fn speed_calc_points(
    tracked: &[TrackedPoint],
    reference: Option<TrackedPoint>,
) -> Vec<TrackedPoint> {
    let Some(reference) = reference else {
        return Vec::new();
    };
    tracked
        .iter()
        .skip_while(|p| p.frame_index < reference.frame_index)
        .take(SPEED_CALC_POINTS)
        .copied()
        .collect()
}
