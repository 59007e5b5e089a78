// src/detection/segmenter.rs
//
// Splits the per-frame ball stream into swings.
//
//   Idle → AwaitingContact → Tracking → (reset) → Idle
//
// Before contact every detection lands in `all_tracked` and the leftmost
// buffered point is the smash candidate. Contact is confirmed on the first
// rightward step while fewer than `smash_max_further_left` later points sit
// left of the candidate. From then on detections extend `tracked`, the
// active swing's trajectory, with exact-position repeats dropped.

use crate::types::{Point2, TrackingConfig, TrackedPoint};
use std::cmp::Ordering;
use tracing::{debug, info, trace, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum SegmenterState {
    Idle,
    AwaitingContact,
    Tracking,
}

impl SegmenterState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "IDLE",
            Self::AwaitingContact => "AWAITING_CONTACT",
            Self::Tracking => "TRACKING",
        }
    }
}

/// What a single `push` did to the buffers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SegmentOutcome {
    /// Frame index went backwards; nothing was buffered.
    OutOfOrder,
    /// Buffered while waiting for contact.
    Buffered,
    /// Contact confirmed on this frame. The smash point seeded `tracked`
    /// and the current point was appended after it.
    ContactConfirmed { smash: TrackedPoint },
    /// Appended to the active trajectory.
    Tracked,
    /// Same position as the last tracked point; dropped.
    DuplicateDropped,
}

pub struct TrajectorySegmenter {
    config: TrackingConfig,
    all_tracked: Vec<TrackedPoint>,
    tracked: Vec<TrackedPoint>,
    smash_point: Option<TrackedPoint>,
    previous_position: Option<Point2>,
    last_frame: Option<u64>,
}

impl TrajectorySegmenter {
    pub fn new(config: TrackingConfig) -> Self {
        Self {
            config,
            all_tracked: Vec::new(),
            tracked: Vec::new(),
            smash_point: None,
            previous_position: None,
            last_frame: None,
        }
    }

    pub fn push(&mut self, point: TrackedPoint) -> SegmentOutcome {
        if let Some(last) = self.last_frame {
            if point.frame_index < last {
                warn!(
                    "Out-of-order frame {} after {}, ignoring",
                    point.frame_index, last
                );
                return SegmentOutcome::OutOfOrder;
            }
        }
        self.last_frame = Some(point.frame_index);
        self.all_tracked.push(point);

        let mut contact = None;
        if let Some(previous) = self.previous_position {
            let moving_right = point.position.x - previous.x > 0.0;

            if self.smash_point.is_none() && moving_right {
                if let Some(candidate) = self.stable_smash_candidate() {
                    info!(
                        "🔥 Smash point confirmed: frame {} at ({:.3}, {:.3})",
                        candidate.frame_index, candidate.position.x, candidate.position.y
                    );
                    self.smash_point = Some(candidate);
                    self.tracked.push(candidate);
                    contact = Some(candidate);
                }
            }
        }

        if self.smash_point.is_none() {
            self.previous_position = Some(point.position);
            return SegmentOutcome::Buffered;
        }

        if self.tracked.last().map(|t| t.position) == Some(point.position) {
            trace!("Frame {} duplicates last tracked position", point.frame_index);
            return SegmentOutcome::DuplicateDropped;
        }

        debug!(
            "🟢 Frame {} tracked at ({:.3}, {:.3})",
            point.frame_index, point.position.x, point.position.y
        );
        self.tracked.push(point);
        self.previous_position = Some(point.position);

        match contact {
            Some(smash) => SegmentOutcome::ContactConfirmed { smash },
            None => SegmentOutcome::Tracked,
        }
    }

    /// Leftmost buffered point, if few enough later points undercut it.
    fn stable_smash_candidate(&self) -> Option<TrackedPoint> {
        let (idx, candidate) = self
            .all_tracked
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| {
                a.position
                    .x
                    .partial_cmp(&b.position.x)
                    .unwrap_or(Ordering::Equal)
            })?;

        let further_left = self.all_tracked[idx + 1..]
            .iter()
            .filter(|p| p.position.x < candidate.position.x)
            .count();

        (further_left < self.config.smash_max_further_left).then_some(*candidate)
    }

    /// Newest tracked point has moved right of the smash point and past the
    /// minimum x, so the frame counts toward the swing's samples.
    pub fn is_swing_motion(&self) -> bool {
        match (self.smash_point, self.tracked.last()) {
            (Some(smash), Some(latest)) => {
                latest.position.x - smash.position.x > 0.0
                    && latest.position.x > self.config.new_swing_min_x
            }
            _ => false,
        }
    }

    pub fn state(&self) -> SegmenterState {
        if self.smash_point.is_some() {
            SegmenterState::Tracking
        } else if self.all_tracked.is_empty() {
            SegmenterState::Idle
        } else {
            SegmenterState::AwaitingContact
        }
    }

    pub fn smash_point(&self) -> Option<TrackedPoint> {
        self.smash_point
    }

    pub fn all_tracked(&self) -> &[TrackedPoint] {
        &self.all_tracked
    }

    pub fn tracked(&self) -> &[TrackedPoint] {
        &self.tracked
    }

    pub fn config(&self) -> &TrackingConfig {
        &self.config
    }

    /// Clear every buffer and the smash point; back to `Idle`.
    pub fn reset(&mut self) {
        self.all_tracked.clear();
        self.tracked.clear();
        self.smash_point = None;
        self.previous_position = None;
        self.last_frame = None;
    }
}
