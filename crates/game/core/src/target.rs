//! Clickable regions of the table and the per-viewer legality set.
use std::{fmt, str::FromStr};

use bitflags::bitflags;

use crate::card::HAND_SIZE;
use crate::error::ConfigurationError;

/// Index of one of the six fixed hand slots.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HandIndex(u8);

impl HandIndex {
    pub fn new(index: usize) -> Result<Self, ConfigurationError> {
        if index < HAND_SIZE {
            Ok(Self(index as u8))
        } else {
            Err(ConfigurationError::HandIndexOutOfRange { index })
        }
    }

    pub const fn get(self) -> usize {
        self.0 as usize
    }

    /// All six slots in ascending order.
    pub fn all() -> impl Iterator<Item = Self> {
        (0..HAND_SIZE as u8).map(Self)
    }
}

impl fmt::Display for HandIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A clickable region, tagged the way the server names it
/// (`deck`, `table`, `held`, `hand_0` .. `hand_5`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "String", into = "String"))]
pub enum ActionTarget {
    Deck,
    Table,
    Held,
    Hand(HandIndex),
}

impl ActionTarget {
    pub fn hand(index: usize) -> Result<Self, ConfigurationError> {
        HandIndex::new(index).map(Self::Hand)
    }

    pub fn hand_index(self) -> Option<HandIndex> {
        match self {
            Self::Hand(index) => Some(index),
            _ => None,
        }
    }

    fn flag(self) -> LegalTargets {
        match self {
            Self::Deck => LegalTargets::DECK,
            Self::Table => LegalTargets::TABLE,
            Self::Held => LegalTargets::HELD,
            Self::Hand(index) => LegalTargets::from_bits_truncate(LegalTargets::HAND_0.bits() << index.0),
        }
    }
}

impl fmt::Display for ActionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Deck => f.write_str("deck"),
            Self::Table => f.write_str("table"),
            Self::Held => f.write_str("held"),
            Self::Hand(index) => write!(f, "hand_{index}"),
        }
    }
}

impl FromStr for ActionTarget {
    type Err = ConfigurationError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        match tag {
            "deck" => Ok(Self::Deck),
            "table" => Ok(Self::Table),
            "held" => Ok(Self::Held),
            _ => {
                let unknown = || ConfigurationError::UnknownTarget {
                    tag: tag.to_owned(),
                };
                let index = tag
                    .strip_prefix("hand_")
                    .and_then(|digits| digits.parse::<usize>().ok())
                    .ok_or_else(unknown)?;
                Self::hand(index)
            }
        }
    }
}

impl TryFrom<String> for ActionTarget {
    type Error = ConfigurationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ActionTarget> for String {
    fn from(target: ActionTarget) -> Self {
        target.to_string()
    }
}

bitflags! {
    /// Set of targets the viewer may act on right now.
    ///
    /// Computed by the server's rules engine; the client only filters
    /// interactivity by membership and never derives legality itself.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct LegalTargets: u16 {
        const DECK   = 1 << 0;
        const TABLE  = 1 << 1;
        const HELD   = 1 << 2;
        const HAND_0 = 1 << 3;
        const HAND_1 = 1 << 4;
        const HAND_2 = 1 << 5;
        const HAND_3 = 1 << 6;
        const HAND_4 = 1 << 7;
        const HAND_5 = 1 << 8;

        const HAND = Self::HAND_0.bits()
                   | Self::HAND_1.bits()
                   | Self::HAND_2.bits()
                   | Self::HAND_3.bits()
                   | Self::HAND_4.bits()
                   | Self::HAND_5.bits();
    }
}

impl LegalTargets {
    pub fn allows(&self, target: ActionTarget) -> bool {
        self.contains(target.flag())
    }

    pub fn insert_target(&mut self, target: ActionTarget) {
        self.insert(target.flag());
    }

    /// Individual targets in the set, table regions first, then hand slots.
    pub fn targets(&self) -> impl Iterator<Item = ActionTarget> + '_ {
        [ActionTarget::Deck, ActionTarget::Table, ActionTarget::Held]
            .into_iter()
            .chain(HandIndex::all().map(ActionTarget::Hand))
            .filter(|target| self.allows(*target))
    }
}

impl FromIterator<ActionTarget> for LegalTargets {
    fn from_iter<I: IntoIterator<Item = ActionTarget>>(iter: I) -> Self {
        let mut legal = Self::empty();
        for target in iter {
            legal.insert_target(target);
        }
        legal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_round_trip_through_display() {
        for tag in ["deck", "table", "held", "hand_0", "hand_5"] {
            let target: ActionTarget = tag.parse().unwrap();
            assert_eq!(target.to_string(), tag);
        }
    }

    #[test]
    fn hand_tags_past_the_sixth_slot_are_configuration_errors() {
        assert_eq!(
            "hand_6".parse::<ActionTarget>(),
            Err(ConfigurationError::HandIndexOutOfRange { index: 6 })
        );
        assert!(matches!(
            "hand_x".parse::<ActionTarget>(),
            Err(ConfigurationError::UnknownTarget { .. })
        ));
        assert!(matches!(
            "discard".parse::<ActionTarget>(),
            Err(ConfigurationError::UnknownTarget { .. })
        ));
    }

    #[test]
    fn legal_set_membership_is_per_target() {
        let legal: LegalTargets = [ActionTarget::hand(0).unwrap(), ActionTarget::hand(1).unwrap()]
            .into_iter()
            .collect();

        assert!(legal.allows(ActionTarget::hand(0).unwrap()));
        assert!(legal.allows(ActionTarget::hand(1).unwrap()));
        assert!(!legal.allows(ActionTarget::hand(3).unwrap()));
        assert!(!legal.allows(ActionTarget::Deck));
        assert!(LegalTargets::HAND.contains(legal));
        assert_eq!(legal.targets().count(), 2);
    }
}
