//! Renderer-agnostic table view synchronizer.
//!
//! Turns server pushes into scene mutations and clicks into outbound events.
//! The host supplies a [`Scene`] and a transport; everything between the two
//! lives here:
//!
//! - [`protocol`] decodes inbound pushes into validated snapshots.
//! - [`reconciler`] stages a new generation of visuals and swaps it in against a [`ViewState`].
//! - [`animation`] drives the deck entry from the host's frame clock.
//! - [`router`] and [`encoder`] turn a click into a wire message.
//! - [`controller`] ties them together behind one owner.
pub mod animation;
pub mod config;
pub mod controller;
pub mod encoder;
pub mod protocol;
pub mod reconciler;
pub mod router;
pub mod scene;
pub mod view_state;

pub use animation::{Animation, AnimationId, AnimationStatus, DeckEntry, Ticker};
pub use config::{AnimationConfig, FrontendConfig, TableConfig};
pub use controller::{ControllerError, Session, TableController};
pub use encoder::{GAME_EVENT, OutboundEvent, START_GAME, encode};
pub use protocol::{InboundEvent, ProtocolError, TableUpdate};
pub use reconciler::{Reconciler, UpdateScope};
pub use router::{ClickContext, InteractionRouter};
pub use scene::{MemoryScene, NodeId, Scene, SceneError, Visual};
pub use view_state::ViewState;
