// src/lib.rs
//
// Swing metrics from a per-frame ball detection stream.
//
//   Detection → detection::TrajectorySegmenter (smash point, tracked swing)
//             → analysis::PhysicsEstimator (speed / launch angle / distance)
//             → swing_session::SwingSession (sample window, quiet-period
//               timeout, home-run classification, history)
//
// The host owns capture, inference and the clock; `replay` is one such host.

pub mod analysis;
pub mod config;
pub mod coordinates;
pub mod detection;
pub mod pipeline;
pub mod replay;
pub mod swing_session;
pub mod types;

pub use coordinates::ViewTransform;
pub use pipeline::{FrameResult, SessionEvent};
pub use swing_session::SwingSession;
pub use types::{Config, Detection, HomeRunDistance, Point2, SessionSummary, SwingResult};
