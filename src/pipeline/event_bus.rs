// src/pipeline/event_bus.rs
//
// Outbound notifications from the session. The session publishes, the host
// drains after each call and dispatches wherever it likes.

use crate::types::{SessionSummary, SwingResult, TrackedPoint};
use std::collections::VecDeque;
use tracing::warn;

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    ContactDetected {
        smash: TrackedPoint,
    },

    SwingFinalized(SwingResult),

    SwingDiscarded {
        reason: String,
    },

    SessionStopped(SessionSummary),
}

pub struct EventBus {
    events: VecDeque<SessionEvent>,
    max_pending: usize,
}

impl EventBus {
    pub fn new(max_pending: usize) -> Self {
        Self {
            events: VecDeque::with_capacity(max_pending),
            max_pending,
        }
    }

    pub fn publish(&mut self, event: SessionEvent) {
        if self.events.len() >= self.max_pending {
            warn!(
                "Event bus full ({} events), dropping oldest",
                self.max_pending
            );
            self.events.pop_front();
        }
        self.events.push_back(event);
    }

    pub fn drain(&mut self) -> Vec<SessionEvent> {
        self.events.drain(..).collect()
    }

    pub fn pending_count(&self) -> usize {
        self.events.len()
    }
}
