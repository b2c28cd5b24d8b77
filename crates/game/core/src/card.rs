//! Card identifiers as sent by the server.
use std::{fmt, str::FromStr};

use crate::error::ConfigurationError;

/// Number of fixed slots in every player's hand.
pub const HAND_SIZE: usize = 6;

const RANKS: &[u8] = b"A23456789TJQK";
const SUITS: &[u8] = b"CDHS";

/// Two-character card identifier: rank followed by suit (`AS`, `TD`, `QH`),
/// or the reserved [`CardCode::BACK`] code used for any face-down card.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "String", into = "String"))]
pub struct CardCode([u8; 2]);

impl CardCode {
    /// Generic card back. Also used for the deck.
    pub const BACK: Self = Self(*b"2B");

    pub fn parse(code: &str) -> Result<Self, ConfigurationError> {
        let invalid = || ConfigurationError::InvalidCardCode {
            code: code.to_owned(),
        };

        let bytes: [u8; 2] = code.as_bytes().try_into().map_err(|_| invalid())?;
        let card = Self(bytes);
        if card == Self::BACK || (RANKS.contains(&bytes[0]) && SUITS.contains(&bytes[1])) {
            Ok(card)
        } else {
            Err(invalid())
        }
    }

    pub fn is_back(self) -> bool {
        self == Self::BACK
    }

    pub fn rank(self) -> char {
        char::from(self.0[0])
    }

    pub fn suit(self) -> char {
        char::from(self.0[1])
    }
}

impl fmt::Display for CardCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.rank(), self.suit())
    }
}

impl FromStr for CardCode {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for CardCode {
    type Error = ConfigurationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<CardCode> for String {
    fn from(card: CardCode) -> Self {
        card.to_string()
    }
}

/// A card occupying one hand slot.
///
/// `name` is rendered literally when `face_up`; the server is trusted to
/// mask the names of face-down cards it sends to other viewers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HandCard {
    pub name: CardCode,
    pub face_up: bool,
}

impl HandCard {
    pub fn new(name: CardCode, face_up: bool) -> Self {
        Self { name, face_up }
    }

    /// The code a viewer should see for this card.
    pub fn visible_code(&self) -> CardCode {
        if self.face_up { self.name } else { CardCode::BACK }
    }
}
