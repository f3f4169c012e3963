//! # Outbox
//!
//! Message sink that records everything queued, in order.

use crate::domain::entities::OutboundMessage;
use crate::ports::outbound::MessageSink;

/// Records outbound messages for the host (or a test) to drain.
#[derive(Debug, Default, Clone)]
pub struct RecordingOutbox {
    queued: Vec<OutboundMessage>,
}

impl RecordingOutbox {
    /// Creates an empty outbox.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages queued so far.
    #[must_use]
    pub fn messages(&self) -> &[OutboundMessage] {
        &self.queued
    }

    /// Takes every queued message, leaving the outbox empty.
    pub fn drain(&mut self) -> Vec<OutboundMessage> {
        std::mem::take(&mut self.queued)
    }
}

impl MessageSink for RecordingOutbox {
    fn enqueue(&mut self, message: OutboundMessage) {
        self.queued.push(message);
    }
}
