//! Client-owned visual state that persists across snapshots.
//!
//! Every semantic slot on the table is a [`SlotCell`] holding at most one
//! scene node. A cell only ever swaps occupants after the replacement is
//! already in the scene, so a slot with content is never observed empty.
use std::collections::BTreeMap;

use game_core::{GameSnapshot, HAND_SIZE, HandIndex, SeatPosition};

use crate::animation::{AnimationId, Ticker};
use crate::scene::{NodeId, Scene};

/// One slot's current occupant.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SlotCell {
    occupant: Option<NodeId>,
}

impl SlotCell {
    pub fn occupant(&self) -> Option<NodeId> {
        self.occupant
    }

    /// Record `node` as the new occupant, then retire the previous one.
    ///
    /// `node` must already be inserted into `scene`.
    pub(crate) fn swap_in<S: Scene + ?Sized>(&mut self, scene: &mut S, node: NodeId) {
        if let Some(previous) = self.occupant.replace(node) {
            retire(scene, previous);
        }
    }

    /// Retire the occupant, if any. Returns true when something was retired.
    pub(crate) fn clear<S: Scene + ?Sized>(&mut self, scene: &mut S) -> bool {
        match self.occupant.take() {
            Some(previous) => {
                retire(scene, previous);
                true
            }
            None => false,
        }
    }

    /// Forget the occupant without touching the scene.
    pub(crate) fn forget(&mut self) {
        self.occupant = None;
    }
}

/// Retire `node`, tolerating nodes the scene no longer knows about.
///
/// A missing node means the view state and the scene disagree; the frame
/// goes on without that retirement.
pub(crate) fn retire<S: Scene + ?Sized>(scene: &mut S, node: NodeId) {
    if let Err(err) = scene.retire(node) {
        tracing::warn!(%node, %err, "stale visual mismatch, skipping retirement");
    }
}

/// Address of one slot, used to stage changes before they are applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum SlotKey {
    Deck,
    /// Discard pile, `0` is the older visible card.
    Table(usize),
    Hand(SeatPosition, HandIndex),
    Held(SeatPosition),
    Score(SeatPosition),
}

/// Deck slot plus the bookkeeping of its entry animation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DeckCell {
    pub(crate) cell: SlotCell,
    /// Entry animation registered for the current occupant, if any.
    pub(crate) entry: Option<AnimationId>,
    /// Current occupant was placed for an `init` snapshot.
    pub(crate) entry_placed: bool,
}

/// Visual slots owned by one seat.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SeatVisuals {
    pub(crate) hand: [SlotCell; HAND_SIZE],
    pub(crate) held: SlotCell,
    pub(crate) score: SlotCell,
}

impl SeatVisuals {
    pub(crate) fn clear<S: Scene + ?Sized>(&mut self, scene: &mut S) {
        for cell in &mut self.hand {
            cell.clear(scene);
        }
        self.held.clear(scene);
        self.score.clear(scene);
    }

    fn occupants(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.hand
            .iter()
            .chain([&self.held, &self.score])
            .filter_map(SlotCell::occupant)
    }
}

/// Everything the reconciler owns between snapshots.
///
/// Created once per table and passed by reference into every
/// reconciliation pass; no other component mutates it.
#[derive(Debug, Default)]
pub struct ViewState {
    pub(crate) deck: DeckCell,
    pub(crate) table: [SlotCell; GameSnapshot::TABLE_DEPTH],
    pub(crate) seats: BTreeMap<SeatPosition, SeatVisuals>,
    pub(crate) ticker: Ticker,
    pub(crate) generation: u64,
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of completed reconciliation passes.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn ticker(&self) -> &Ticker {
        &self.ticker
    }

    pub fn deck_node(&self) -> Option<NodeId> {
        self.deck.cell.occupant()
    }

    /// Whether the deck is still sliding into place.
    pub fn deck_entry_running(&self) -> bool {
        self.deck
            .entry
            .is_some_and(|id| self.ticker.is_registered(id))
    }

    /// Discard pile nodes, older first.
    pub fn table_nodes(&self) -> [Option<NodeId>; 2] {
        [self.table[0].occupant(), self.table[1].occupant()]
    }

    pub fn seats(&self) -> impl Iterator<Item = SeatPosition> + '_ {
        self.seats.keys().copied()
    }

    pub fn hand_node(&self, seat: SeatPosition, index: HandIndex) -> Option<NodeId> {
        self.seats
            .get(&seat)
            .and_then(|visuals| visuals.hand[index.get()].occupant())
    }

    pub fn held_node(&self, seat: SeatPosition) -> Option<NodeId> {
        self.seats
            .get(&seat)
            .and_then(|visuals| visuals.held.occupant())
    }

    pub fn score_node(&self, seat: SeatPosition) -> Option<NodeId> {
        self.seats
            .get(&seat)
            .and_then(|visuals| visuals.score.occupant())
    }

    pub(crate) fn occupant_of(&self, key: SlotKey) -> Option<NodeId> {
        match key {
            SlotKey::Deck => self.deck.cell.occupant(),
            SlotKey::Table(depth) => self.table.get(depth).and_then(SlotCell::occupant),
            SlotKey::Hand(seat, index) => self.hand_node(seat, index),
            SlotKey::Held(seat) => self.held_node(seat),
            SlotKey::Score(seat) => self.score_node(seat),
        }
    }

    /// Cell for `key`, creating the seat's visuals on first use.
    ///
    /// Table depths past the pile are clamped to its top.
    pub(crate) fn slot_mut(&mut self, key: SlotKey) -> &mut SlotCell {
        match key {
            SlotKey::Deck => &mut self.deck.cell,
            SlotKey::Table(depth) => {
                let top = self.table.len() - 1;
                &mut self.table[depth.min(top)]
            }
            SlotKey::Hand(seat, index) => &mut self.seats.entry(seat).or_default().hand[index.get()],
            SlotKey::Held(seat) => &mut self.seats.entry(seat).or_default().held,
            SlotKey::Score(seat) => &mut self.seats.entry(seat).or_default().score,
        }
    }

    /// Every node currently recorded as a slot occupant.
    pub fn occupants(&self) -> Vec<NodeId> {
        let mut nodes: Vec<NodeId> = self
            .deck
            .cell
            .occupant()
            .into_iter()
            .chain(self.table.iter().filter_map(SlotCell::occupant))
            .collect();
        for visuals in self.seats.values() {
            nodes.extend(visuals.occupants());
        }
        nodes
    }
}
