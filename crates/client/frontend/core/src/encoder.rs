//! Outbound event encoder.
//!
//! Every in-game action travels as one `game_event` message; starting the
//! game has its own event name and an empty payload.
use game_core::{Action, ActionKind};
use serde::Serialize;
use serde_json::{Value, json};

pub const GAME_EVENT: &str = "game_event";
pub const START_GAME: &str = "start_game";

/// One message for the transport: an event name plus a JSON payload.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OutboundEvent {
    pub event: &'static str,
    pub payload: Value,
}

/// Encode `action` for the wire.
///
/// `hand_index` is only present for flip and swap.
pub fn encode(action: &Action) -> OutboundEvent {
    if action.kind == ActionKind::StartGame {
        return OutboundEvent {
            event: START_GAME,
            payload: json!({}),
        };
    }

    let mut payload = json!({
        "action": action.kind.to_string(),
        "game_id": action.game_id.0,
        "player_id": action.player_id.0,
    });
    if action.kind.targets_hand()
        && let Some(index) = action.hand_index
        && let Some(fields) = payload.as_object_mut()
    {
        fields.insert("hand_index".to_owned(), json!(index.get()));
    }

    OutboundEvent {
        event: GAME_EVENT,
        payload,
    }
}
