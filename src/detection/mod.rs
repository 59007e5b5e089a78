// src/detection/mod.rs

mod ball_filter;
mod segmenter;

// Re-export public APIs
pub use ball_filter::{BallFilter, RawDetection};
pub use segmenter::{SegmentOutcome, SegmenterState, TrajectorySegmenter};
