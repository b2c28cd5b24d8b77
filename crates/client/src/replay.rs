//! Session replay from a JSON-lines script.
//!
//! Each non-empty line is one step:
//!
//! ```text
//! {"join": { "user_id": 11, "game": { ... }, "players": [ ... ], "playable_cards": { ... } }}
//! {"push": { "event": "game", "payload": { ... } }}
//! {"click": "hand_0"}
//! {"start_game": true}
//! {"ticks": 30}
//! ```
//!
//! Steps are fed through the regular event loop, so a replay exercises the
//! same path as a live session.
use std::path::Path;

use anyhow::Result;
use client_frontend_core::{Scene, TableController};
use game_core::ActionTarget;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::config::ClientConfig;
use crate::event_loop::{EventLoop, HostEvent, spawn_frame_clock};
use crate::transport::Transport;

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("failed to read replay script: {0}")]
    Io(#[from] std::io::Error),

    #[error("line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplayStep {
    Join(Value),
    Push { event: String, payload: Value },
    Click(ActionTarget),
    StartGame(bool),
    Ticks(u32),
}

impl ReplayStep {
    fn into_host_events(self) -> Vec<HostEvent> {
        match self {
            Self::Join(payload) => vec![HostEvent::Joined(payload)],
            Self::Push { event, payload } => vec![HostEvent::Push { event, payload }],
            Self::Click(target) => vec![HostEvent::Click(target)],
            Self::StartGame(true) => vec![HostEvent::StartGame],
            Self::StartGame(false) => Vec::new(),
            Self::Ticks(count) => (0..count).map(|_| HostEvent::Tick(1.0)).collect(),
        }
    }
}

/// Parse a script. Blank lines and lines starting with `//` are skipped.
pub fn parse(script: &str) -> Result<Vec<ReplayStep>, ReplayError> {
    script
        .lines()
        .enumerate()
        .map(|(index, line)| (index + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with("//"))
        .map(|(line, text)| {
            serde_json::from_str(text).map_err(|source| ReplayError::Parse { line, source })
        })
        .collect()
}

pub fn load(path: &Path) -> Result<Vec<ReplayStep>, ReplayError> {
    let script = std::fs::read_to_string(path)?;
    parse(&script)
}

/// Replay `steps` through a fresh event loop and hand back the controller
/// and transport once the script is exhausted.
pub async fn run<S, T>(
    steps: Vec<ReplayStep>,
    controller: TableController<S>,
    transport: T,
    config: &ClientConfig,
) -> Result<(TableController<S>, T)>
where
    S: Scene + Send + 'static,
    T: Transport + 'static,
{
    let (tx, rx) = mpsc::channel(config.queue_capacity());
    let event_loop = tokio::spawn(EventLoop::new(controller, transport, rx).run());

    let clock = config
        .frame_interval()
        .map(|interval| spawn_frame_clock(tx.clone(), interval));

    tracing::info!(steps = steps.len(), "replaying script");
    for event in steps.into_iter().flat_map(ReplayStep::into_host_events) {
        if tx.send(event).await.is_err() {
            tracing::warn!("event loop stopped before the script finished");
            break;
        }
    }
    // A closed loop means it already failed; its result carries the error.
    let _ = tx.send(HostEvent::Shutdown).await;

    let result = event_loop.await?;
    if let Some(clock) = clock {
        clock.abort();
    }
    result
}
