//! Seat assignment and table geometry.
//!
//! Seats are assigned from a fixed table keyed on player count; the first
//! seat is always [`SeatPosition::Bottom`], which is where the viewer sits
//! once the player list has been rotated. Screen placement is defined once
//! for the bottom seat and rotated about the table centre for the others,
//! so hand, held-card and score placement is shared by every seat.
use std::f32::consts::{FRAC_PI_2, PI};

use strum::{AsRefStr, Display, EnumIter};

use crate::error::ConfigurationError;
use crate::target::HandIndex;

/// Side of the table a player is drawn on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, AsRefStr, Display, EnumIter)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case")]
pub enum SeatPosition {
    Bottom,
    Left,
    Top,
    Right,
}

impl SeatPosition {
    /// Rotation applied to the bottom seat's geometry to obtain this seat's.
    pub const fn angle(self) -> f32 {
        match self {
            Self::Bottom => 0.0,
            Self::Left => FRAC_PI_2,
            Self::Top => PI,
            Self::Right => 3.0 * FRAC_PI_2,
        }
    }
}

const ONE: &[SeatPosition] = &[SeatPosition::Bottom];
const TWO: &[SeatPosition] = &[SeatPosition::Bottom, SeatPosition::Top];
const THREE: &[SeatPosition] = &[SeatPosition::Bottom, SeatPosition::Left, SeatPosition::Right];
const FOUR: &[SeatPosition] = &[
    SeatPosition::Bottom,
    SeatPosition::Left,
    SeatPosition::Top,
    SeatPosition::Right,
];

/// Ordered seats for `player_count` players.
pub fn seats_for(player_count: usize) -> Result<&'static [SeatPosition], ConfigurationError> {
    match player_count {
        1 => Ok(ONE),
        2 => Ok(TWO),
        3 => Ok(THREE),
        4 => Ok(FOUR),
        count => Err(ConfigurationError::InvalidPlayerCount { count }),
    }
}

/// Semantic placeholder on the table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Slot {
    Deck,
    Table,
    Hand(HandIndex),
    Held,
    Score,
}

/// Screen position (node centre) and rotation in radians.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Placement {
    pub x: f32,
    pub y: f32,
    pub rotation: f32,
}

impl Placement {
    pub const fn new(x: f32, y: f32, rotation: f32) -> Self {
        Self { x, y, rotation }
    }
}

/// Size of the card artwork before scaling.
pub const CARD_ART_WIDTH: f32 = 240.0;
pub const CARD_ART_HEIGHT: f32 = 336.0;

const HAND_COLUMNS: usize = 3;

/// Pure lookup of slot placements for a table of a given size.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TableGeometry {
    pub width: f32,
    pub height: f32,
    pub card_width: f32,
    pub card_height: f32,
    /// Spacing between neighbouring cards and from the table edge.
    pub gap: f32,
}

impl Default for TableGeometry {
    fn default() -> Self {
        Self::new(800.0, 800.0, 0.3)
    }
}

impl TableGeometry {
    pub fn new(width: f32, height: f32, card_scale: f32) -> Self {
        Self {
            width,
            height,
            card_width: CARD_ART_WIDTH * card_scale,
            card_height: CARD_ART_HEIGHT * card_scale,
            gap: 6.0,
        }
    }

    pub fn center(&self) -> (f32, f32) {
        (self.width / 2.0, self.height / 2.0)
    }

    /// Where the deck starts before its entry animation: horizontally
    /// centred, fully above the visible table.
    pub fn deck_entry_origin(&self) -> Placement {
        Placement::new(self.width / 2.0, -self.card_height / 2.0, 0.0)
    }

    /// Where the entry animation stops: the table centre.
    pub fn deck_entry_target(&self) -> Placement {
        let (cx, cy) = self.center();
        Placement::new(cx, cy, 0.0)
    }

    pub fn coordinates_for(&self, seat: SeatPosition, slot: Slot) -> Placement {
        let (cx, cy) = self.center();
        let half_pitch = (self.card_width + self.gap) / 2.0;

        let (dx, dy) = match slot {
            Slot::Deck => return Placement::new(cx - half_pitch, cy, 0.0),
            Slot::Table => return Placement::new(cx + half_pitch, cy, 0.0),
            Slot::Hand(index) => self.hand_offset(index),
            Slot::Held => (self.side_offset(), self.hand_mid_row()),
            Slot::Score => (-self.side_offset(), self.hand_mid_row()),
        };

        let angle = seat.angle();
        let (sin, cos) = angle.sin_cos();
        Placement::new(cx + dx * cos - dy * sin, cy + dx * sin + dy * cos, angle)
    }

    /// Bottom-seat offset from the centre for a hand slot (two rows of three).
    fn hand_offset(&self, index: HandIndex) -> (f32, f32) {
        let column = (index.get() % HAND_COLUMNS) as f32;
        let row = (index.get() / HAND_COLUMNS) as f32;
        let pitch_x = self.card_width + self.gap;
        let pitch_y = self.card_height + self.gap;
        (
            (column - 1.0) * pitch_x,
            self.hand_first_row() + row * pitch_y,
        )
    }

    fn hand_first_row(&self) -> f32 {
        let last_row = self.height / 2.0 - self.gap - self.card_height / 2.0;
        last_row - (self.card_height + self.gap)
    }

    fn hand_mid_row(&self) -> f32 {
        self.hand_first_row() + (self.card_height + self.gap) / 2.0
    }

    fn side_offset(&self) -> f32 {
        2.5 * (self.card_width + self.gap)
    }
}
