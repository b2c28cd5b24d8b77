//! Outbound transport seam.
//!
//! The real socket lives in the host application; the synchronizer only
//! needs somewhere to push encoded events.
use async_trait::async_trait;
use client_frontend_core::OutboundEvent;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("transport closed")]
    Closed,
}

#[async_trait]
pub trait Transport: Send {
    async fn push(&mut self, event: &OutboundEvent) -> Result<(), TransportError>;
}

/// Keeps every pushed event in order. Used for replays and tests.
#[derive(Clone, Debug, Default)]
pub struct RecordingTransport {
    sent: Vec<OutboundEvent>,
    closed: bool,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> &[OutboundEvent] {
        &self.sent
    }

    pub fn into_sent(self) -> Vec<OutboundEvent> {
        self.sent
    }

    /// Reject every later push.
    pub fn close(&mut self) {
        self.closed = true;
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn push(&mut self, event: &OutboundEvent) -> Result<(), TransportError> {
        if self.closed {
            return Err(TransportError::Closed);
        }
        tracing::info!(event = event.event, payload = %event.payload, "push");
        self.sent.push(event.clone());
        Ok(())
    }
}
