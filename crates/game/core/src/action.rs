//! Semantic actions a viewer can ask the server to perform.
use strum::{AsRefStr, Display};

use crate::ids::{GameId, PlayerId};
use crate::target::HandIndex;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, AsRefStr, Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case")]
pub enum ActionKind {
    StartGame,
    TakeFromDeck,
    TakeFromTable,
    Discard,
    Flip,
    Swap,
}

impl ActionKind {
    /// Whether this action addresses one hand slot.
    pub fn targets_hand(self) -> bool {
        matches!(self, Self::Flip | Self::Swap)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Action {
    pub kind: ActionKind,
    pub game_id: GameId,
    pub player_id: PlayerId,
    pub hand_index: Option<HandIndex>,
}

impl Action {
    pub fn new(kind: ActionKind, game_id: GameId, player_id: PlayerId) -> Self {
        Self {
            kind,
            game_id,
            player_id,
            hand_index: None,
        }
    }

    pub fn with_hand_index(mut self, index: HandIndex) -> Self {
        self.hand_index = Some(index);
        self
    }
}
