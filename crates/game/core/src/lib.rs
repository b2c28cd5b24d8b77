//! Table model for the six-card Golf client.
//!
//! `game-core` holds the pure, renderer-agnostic half of the table view
//! synchronizer: the snapshot the server pushes, the viewer's derived
//! perspective, seat layout and geometry, action targets and the actions a
//! click can produce. Nothing here touches a scene or a transport; those
//! live in `client-frontend-core`.
pub mod action;
pub mod card;
pub mod error;
pub mod ids;
pub mod perspective;
pub mod seat;
pub mod snapshot;
pub mod target;

pub use action::{Action, ActionKind};
pub use card::{CardCode, HAND_SIZE, HandCard};
pub use error::{ConfigurationError, ErrorSeverity, GameError};
pub use ids::{GameId, PlayerId, UserId};
pub use perspective::{LegalTargetsByPlayer, ViewerPerspective, derive_perspective, rotate};
pub use seat::{Placement, SeatPosition, Slot, TableGeometry, seats_for};
pub use snapshot::{GameSnapshot, GameStatus, Hand, PlayerSnapshot};
pub use target::{ActionTarget, HandIndex, LegalTargets};
