//! Single-queue event loop.
//!
//! Server pushes, frame ticks and user input all arrive as [`HostEvent`]s on
//! one `mpsc` queue and are applied to the controller strictly in order.
//! Nothing else touches the controller while the loop runs.
use std::time::Duration;

use anyhow::Result;
use client_frontend_core::{
    InboundEvent, NodeId, OutboundEvent, ProtocolError, Scene, TableController,
};
use game_core::{ActionTarget, GameError};
use serde_json::Value;
use tokio::{
    sync::mpsc,
    task::JoinHandle,
    time::{self, MissedTickBehavior},
};

use crate::transport::Transport;

#[derive(Clone, Debug, PartialEq)]
pub enum HostEvent {
    /// Reply to the channel join.
    Joined(Value),
    /// Server push by event name.
    Push { event: String, payload: Value },
    /// Click on a named target.
    Click(ActionTarget),
    /// Pointer-down on a scene node.
    Pointer(NodeId),
    StartGame,
    /// Frame clock tick, in nominal frames.
    Tick(f32),
    Shutdown,
}

pub struct EventLoop<S: Scene, T: Transport> {
    controller: TableController<S>,
    transport: T,
    rx: mpsc::Receiver<HostEvent>,
    /// Inbound events that did not reach the table.
    rejected: u64,
}

impl<S, T> EventLoop<S, T>
where
    S: Scene + Send,
    T: Transport,
{
    pub fn new(controller: TableController<S>, transport: T, rx: mpsc::Receiver<HostEvent>) -> Self {
        Self {
            controller,
            transport,
            rx,
            rejected: 0,
        }
    }

    /// Run until [`HostEvent::Shutdown`] or until every sender is gone.
    ///
    /// Bad payloads and rejected updates are logged and skipped; only a
    /// failing transport ends the loop with an error.
    pub async fn run(mut self) -> Result<(TableController<S>, T)> {
        let mut handled = 0u64;
        while let Some(event) = self.rx.recv().await {
            if matches!(event, HostEvent::Shutdown) {
                tracing::debug!("shutdown requested");
                break;
            }
            if let Some(outbound) = self.apply(event) {
                self.transport.push(&outbound).await?;
            }
            handled += 1;
        }

        tracing::info!(handled, rejected = self.rejected, "event loop stopped");
        Ok((self.controller, self.transport))
    }

    fn apply(&mut self, event: HostEvent) -> Option<OutboundEvent> {
        match event {
            HostEvent::Joined(payload) => {
                self.handle_inbound(InboundEvent::join(payload));
                None
            }
            HostEvent::Push { event, payload } => {
                self.handle_inbound(InboundEvent::decode(&event, payload));
                None
            }
            HostEvent::Click(target) => self.controller.click(target),
            HostEvent::Pointer(node) => self.controller.pointer_down(node),
            HostEvent::StartGame => self.controller.start_game(),
            HostEvent::Tick(elapsed) => {
                self.controller.tick(elapsed);
                None
            }
            HostEvent::Shutdown => None,
        }
    }

    fn handle_inbound(&mut self, decoded: Result<InboundEvent, ProtocolError>) {
        let event = match decoded {
            Ok(event) => event,
            Err(ProtocolError::Configuration(err)) => {
                tracing::error!(
                    code = err.error_code(),
                    severity = err.severity().as_str(),
                    %err,
                    "inbound event rejected"
                );
                self.rejected += 1;
                return;
            }
            Err(err) => {
                tracing::warn!(code = err.error_code(), %err, "inbound event dropped");
                self.rejected += 1;
                return;
            }
        };

        match self.controller.handle(event) {
            Ok(scope) => {
                tracing::trace!(?scope, generation = self.controller.view().generation(), "table updated");
            }
            Err(err) => {
                // The controller logged it; the previous table and session stay.
                tracing::debug!(code = err.error_code(), "table update skipped");
                self.rejected += 1;
            }
        }
    }
}

/// Feed a [`HostEvent::Tick`] every `interval` until the loop goes away.
pub fn spawn_frame_clock(tx: mpsc::Sender<HostEvent>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut clock = time::interval(interval);
        clock.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            clock.tick().await;
            if tx.send(HostEvent::Tick(1.0)).await.is_err() {
                tracing::debug!("frame clock stopped");
                break;
            }
        }
    })
}
