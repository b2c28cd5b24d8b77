//! Authoritative game snapshot pushed by the server.
//!
//! A snapshot is replaced wholesale on every push and never mutated in
//! place; the client keeps the most recent one only to derive the viewer's
//! perspective and to gate clicks.
use strum::{AsRefStr, Display};

use crate::card::{CardCode, HAND_SIZE, HandCard};
use crate::ids::{GameId, PlayerId, UserId};
use crate::target::HandIndex;

/// Phase of the rule engine, as reported by the server.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, AsRefStr, Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case")]
pub enum GameStatus {
    /// Waiting for the host to start; the deck has not been dealt.
    Init,
    /// Every player flips two cards of their choice.
    #[cfg_attr(feature = "serde", serde(alias = "flip_2"))]
    Flip2,
    /// Current player draws from the deck or the discard pile.
    Take,
    /// Current player holds a drawn card: swap it into the hand or discard it.
    Hold,
    /// Current player flips one face-down card.
    Flip,
    Finished,
}

impl GameStatus {
    pub fn is_flip_phase(self) -> bool {
        matches!(self, Self::Flip2 | Self::Flip)
    }
}

/// Six fixed hand slots, each optionally holding a card.
pub type Hand = [Option<HandCard>; HAND_SIZE];

/// One seated player as seen by this viewer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlayerSnapshot {
    pub id: PlayerId,
    pub user_id: UserId,
    pub username: String,
    pub score: i32,
    pub is_host: bool,
    pub hand: Hand,
    /// Present only while this player holds a just-drawn card.
    pub held_card: Option<CardCode>,
}

impl PlayerSnapshot {
    pub fn new(id: PlayerId, user_id: UserId, username: impl Into<String>) -> Self {
        Self {
            id,
            user_id,
            username: username.into(),
            score: 0,
            is_host: false,
            hand: [None; HAND_SIZE],
            held_card: None,
        }
    }

    pub fn card(&self, index: HandIndex) -> Option<&HandCard> {
        self.hand[index.get()].as_ref()
    }

    /// Scoreboard text for this player.
    pub fn score_label(&self) -> String {
        format!("{}: {}", self.username, self.score)
    }
}

/// Complete, immutable description of the table at one point in time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameSnapshot {
    pub id: GameId,
    pub status: GameStatus,
    /// `None` when the server does not report a count; the deck is then
    /// assumed present.
    pub deck_count: Option<u32>,
    /// Face-up discards, most recent last. At most two are kept.
    pub table_cards: Vec<CardCode>,
    /// Canonical server seating order. Seat 0 is not necessarily the viewer.
    pub players: Vec<PlayerSnapshot>,
}

impl GameSnapshot {
    /// Maximum number of discards rendered on the table.
    pub const TABLE_DEPTH: usize = 2;

    pub fn new(id: GameId, status: GameStatus) -> Self {
        Self {
            id,
            status,
            deck_count: None,
            table_cards: Vec::new(),
            players: Vec::new(),
        }
    }

    pub fn has_deck(&self) -> bool {
        self.deck_count.is_none_or(|count| count > 0)
    }

    /// The visible part of the discard pile, oldest first.
    pub fn visible_table_cards(&self) -> &[CardCode] {
        let skip = self.table_cards.len().saturating_sub(Self::TABLE_DEPTH);
        &self.table_cards[skip..]
    }

    pub fn player_index_of(&self, user_id: UserId) -> Option<usize> {
        self.players
            .iter()
            .position(|player| player.user_id == user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(code: &str) -> CardCode {
        CardCode::parse(code).unwrap()
    }

    #[test]
    fn only_the_two_most_recent_discards_are_visible() {
        let mut snapshot = GameSnapshot::new(GameId(1), GameStatus::Take);
        snapshot.table_cards = vec![card("AS"), card("2H"), card("3D")];
        assert_eq!(snapshot.visible_table_cards(), &[card("2H"), card("3D")]);

        snapshot.table_cards.truncate(1);
        assert_eq!(snapshot.visible_table_cards(), &[card("AS")]);
    }

    #[test]
    fn deck_is_present_unless_reported_empty() {
        let mut snapshot = GameSnapshot::new(GameId(1), GameStatus::Take);
        assert!(snapshot.has_deck());
        snapshot.deck_count = Some(12);
        assert!(snapshot.has_deck());
        snapshot.deck_count = Some(0);
        assert!(!snapshot.has_deck());
    }

    #[test]
    fn score_label_joins_name_and_score() {
        let mut player = PlayerSnapshot::new(PlayerId(3), UserId(9), "alice");
        player.score = -4;
        assert_eq!(player.score_label(), "alice: -4");
    }

    #[test]
    fn status_tags_are_snake_case() {
        assert_eq!(GameStatus::Flip2.as_ref(), "flip2");
        assert_eq!(GameStatus::Hold.to_string(), "hold");
        assert!(GameStatus::Flip2.is_flip_phase());
        assert!(!GameStatus::Hold.is_flip_phase());
    }
}
