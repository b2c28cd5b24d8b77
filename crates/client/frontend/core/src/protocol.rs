//! Inbound wire protocol.
//!
//! The server pushes the whole table on every change. Payloads are decoded
//! in two steps: serde maps JSON onto the `Wire*` DTOs, which keep cards and
//! targets as plain strings, then `TryFrom` validates them into `game_core`
//! types. Shape problems surface as [`ProtocolError::Malformed`], bad values
//! as [`ProtocolError::Configuration`].
use std::collections::BTreeMap;

use arrayvec::ArrayVec;
use game_core::{
    ActionTarget, CardCode, ConfigurationError, ErrorSeverity, GameError, GameId, GameSnapshot,
    GameStatus, HAND_SIZE, HandCard, LegalTargets, LegalTargetsByPlayer, PlayerId, PlayerSnapshot,
    UserId,
};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// Event name of the push that follows a successful `start_game`.
pub const GAME_STARTED: &str = "game_started";
/// Event name of every other table push.
pub const GAME: &str = "game";

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("unknown inbound event `{0}`")]
    UnknownEvent(String),

    #[error("malformed payload: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
}

impl GameError for ProtocolError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::UnknownEvent(_) => ErrorSeverity::Validation,
            Self::Malformed(_) => ErrorSeverity::Validation,
            Self::Configuration(err) => err.severity(),
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownEvent(_) => "UNKNOWN_EVENT",
            Self::Malformed(_) => "MALFORMED_PAYLOAD",
            Self::Configuration(err) => err.error_code(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct WireCard {
    pub name: String,
    #[serde(default)]
    pub face_up: bool,
}

#[derive(Clone, Debug, Deserialize)]
pub struct WirePlayer {
    pub id: u64,
    pub user_id: u64,
    pub username: String,
    #[serde(default)]
    pub score: i32,
    #[serde(default, alias = "host")]
    pub is_host: bool,
    /// Slots in order; `null` marks an empty slot.
    #[serde(default)]
    pub hand: Vec<Option<WireCard>>,
    #[serde(default)]
    pub held_card: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct WireGame {
    pub id: u64,
    pub status: GameStatus,
    #[serde(default)]
    pub deck_count: Option<u32>,
    #[serde(default)]
    pub table_cards: Vec<String>,
}

/// Body of a `game` / `game_started` push.
#[derive(Clone, Debug, Deserialize)]
pub struct PushPayload {
    pub game: WireGame,
    #[serde(default)]
    pub players: Vec<WirePlayer>,
    /// Target tags keyed by stringified player id.
    #[serde(default)]
    pub playable_cards: BTreeMap<String, Vec<String>>,
}

/// Reply to a successful channel join.
#[derive(Clone, Debug, Deserialize)]
pub struct JoinReply {
    pub user_id: u64,
    #[serde(flatten)]
    pub push: PushPayload,
}

/// A validated table push: the snapshot plus every player's legal targets.
#[derive(Clone, Debug, PartialEq)]
pub struct TableUpdate {
    pub snapshot: GameSnapshot,
    pub legal: LegalTargetsByPlayer,
}

#[derive(Clone, Debug, PartialEq)]
pub enum InboundEvent {
    /// Join reply; establishes who the viewer is.
    Joined { user_id: UserId, update: TableUpdate },
    GameStarted(TableUpdate),
    Game(TableUpdate),
}

impl InboundEvent {
    /// Decode a join reply.
    pub fn join(payload: Value) -> Result<Self, ProtocolError> {
        let reply: JoinReply = serde_json::from_value(payload)?;
        Ok(Self::Joined {
            user_id: UserId(reply.user_id),
            update: reply.push.try_into()?,
        })
    }

    /// Decode a server push by event name.
    pub fn decode(event: &str, payload: Value) -> Result<Self, ProtocolError> {
        let wrap: fn(TableUpdate) -> Self = match event {
            GAME_STARTED => Self::GameStarted,
            GAME => Self::Game,
            other => return Err(ProtocolError::UnknownEvent(other.to_owned())),
        };
        let push: PushPayload = serde_json::from_value(payload)?;
        Ok(wrap(push.try_into()?))
    }

    pub fn update(&self) -> &TableUpdate {
        match self {
            Self::Joined { update, .. } | Self::GameStarted(update) | Self::Game(update) => update,
        }
    }

    pub fn into_update(self) -> TableUpdate {
        match self {
            Self::Joined { update, .. } | Self::GameStarted(update) | Self::Game(update) => update,
        }
    }
}

impl TryFrom<WireCard> for HandCard {
    type Error = ConfigurationError;

    fn try_from(card: WireCard) -> Result<Self, Self::Error> {
        Ok(HandCard::new(CardCode::parse(&card.name)?, card.face_up))
    }
}

impl TryFrom<WirePlayer> for PlayerSnapshot {
    type Error = ConfigurationError;

    fn try_from(wire: WirePlayer) -> Result<Self, Self::Error> {
        let id = PlayerId(wire.id);
        let len = wire.hand.len();

        let mut slots: ArrayVec<Option<HandCard>, HAND_SIZE> = ArrayVec::new();
        for card in wire.hand {
            let card = card.map(HandCard::try_from).transpose()?;
            slots
                .try_push(card)
                .map_err(|_| ConfigurationError::HandOverflow { player: id, len })?;
        }

        let mut player = PlayerSnapshot::new(id, UserId(wire.user_id), wire.username);
        player.score = wire.score;
        player.is_host = wire.is_host;
        for (slot, card) in player.hand.iter_mut().zip(slots) {
            *slot = card;
        }
        player.held_card = wire.held_card.as_deref().map(CardCode::parse).transpose()?;
        Ok(player)
    }
}

impl TryFrom<PushPayload> for TableUpdate {
    type Error = ConfigurationError;

    fn try_from(push: PushPayload) -> Result<Self, Self::Error> {
        let mut snapshot = GameSnapshot::new(GameId(push.game.id), push.game.status);
        snapshot.deck_count = push.game.deck_count;

        let table_cards = push
            .game
            .table_cards
            .iter()
            .map(|code| CardCode::parse(code))
            .collect::<Result<Vec<_>, _>>()?;
        snapshot.table_cards = table_cards;

        snapshot.players = push
            .players
            .into_iter()
            .map(PlayerSnapshot::try_from)
            .collect::<Result<_, _>>()?;

        let mut legal = LegalTargetsByPlayer::new();
        for (key, tags) in push.playable_cards {
            let player = key
                .parse::<u64>()
                .map(PlayerId)
                .map_err(|_| ConfigurationError::InvalidPlayerKey { key: key.clone() })?;
            let targets = tags
                .iter()
                .map(|tag| tag.parse::<ActionTarget>())
                .collect::<Result<LegalTargets, _>>()?;
            legal.insert(player, targets);
        }

        Ok(Self { snapshot, legal })
    }
}
