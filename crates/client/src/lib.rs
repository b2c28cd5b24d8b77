//! Headless host for the Golf table synchronizer.
//!
//! # Architecture
//!
//! ```text
//! transport ◄── EventLoop ◄── mpsc<HostEvent> ◄── server pushes
//!                  │                          ◄── frame clock
//!                  ▼                          ◄── user input / replay
//!           TableController ──► Scene
//! ```
//!
//! The binary wires a [`MemoryScene`](client_frontend_core::MemoryScene) and a
//! [`RecordingTransport`] together and replays a JSON-lines session script.
pub mod config;
pub mod event_loop;
pub mod logging;
pub mod replay;
pub mod transport;

pub use config::ClientConfig;
pub use event_loop::{EventLoop, HostEvent, spawn_frame_clock};
pub use replay::{ReplayError, ReplayStep};
pub use transport::{RecordingTransport, Transport, TransportError};
