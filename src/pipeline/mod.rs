// src/pipeline/mod.rs

pub mod event_bus;
pub mod frame_result;
pub mod metrics;

pub use event_bus::{EventBus, SessionEvent};
pub use frame_result::FrameResult;
pub use metrics::{MetricsSummary, TrackingMetrics};
