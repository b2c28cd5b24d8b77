//! Render reconciler: brings the scene in line with a new snapshot.
//!
//! # Staged passes
//!
//! A pass runs in two phases:
//! 1. **Stage.** Insert and bind a node for every slot that has content in
//!    the new snapshot. Nothing already on screen is touched.
//! 2. **Commit.** Once every insert has succeeded, swap the staged nodes into
//!    their slots, retiring the previous occupants, and clear the slots the
//!    snapshot left empty.
//!
//! If staging fails, the staged nodes are retired again and the view state is
//! left as it was, so the scene keeps showing exactly the previous generation.
//! Staging order is paint order: the newer discard is inserted after the
//! older one so it occludes it.
use bitflags::bitflags;
use game_core::{
    ActionTarget, CardCode, GameSnapshot, GameStatus, HandIndex, LegalTargets, Placement, SeatPosition,
    Slot, TableGeometry, ViewerPerspective,
};

use crate::animation::DeckEntry;
use crate::scene::{NodeId, Scene, SceneError, Visual};
use crate::view_state::{SlotKey, ViewState, retire};

bitflags! {
    /// Slot groups touched by a reconciliation pass.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct UpdateScope: u8 {
        const DECK   = 0b00001;
        const TABLE  = 0b00010;
        const HANDS  = 0b00100;
        const HELD   = 0b01000;
        const SCORES = 0b10000;

        const ALL = Self::DECK.bits()
                  | Self::TABLE.bits()
                  | Self::HANDS.bits()
                  | Self::HELD.bits()
                  | Self::SCORES.bits();
    }
}

/// Stateless apart from layout parameters; all mutable state lives in
/// [`ViewState`].
#[derive(Clone, Copy, Debug)]
pub struct Reconciler {
    geometry: TableGeometry,
    deck_step_rate: f32,
}

/// What happens to the deck slot besides its staged occupant.
#[derive(Clone, Copy, Debug, PartialEq)]
enum DeckPlan {
    /// No deck in the snapshot.
    Remove,
    /// Keep the sliding `init` deck and only update its binding.
    Rebind {
        node: NodeId,
        binding: Option<ActionTarget>,
    },
    /// A fresh `init` deck that slides in. `stale` marks a previous entry
    /// deck the scene no longer knows about.
    Enter { node: NodeId, stale: bool },
    /// Deck resting beside the pile.
    Settle,
}

/// Slot changes collected while staging, applied by [`Reconciler::commit`].
#[derive(Debug, Default)]
struct Plan {
    /// New occupants, inserted and bound, in paint order.
    staged: Vec<(SlotKey, NodeId)>,
    cleared: Vec<SlotKey>,
    vacated: Vec<SeatPosition>,
    scope: UpdateScope,
}

impl Plan {
    /// Insert a node for `key` and bind it.
    ///
    /// The node is recorded before binding so [`Plan::abandon`] also removes
    /// a node whose binding failed.
    fn stage<S: Scene>(
        &mut self,
        scene: &mut S,
        key: SlotKey,
        visual: Visual,
        placement: Placement,
        binding: Option<ActionTarget>,
    ) -> Result<NodeId, SceneError> {
        let node = scene.insert(visual, placement)?;
        self.staged.push((key, node));
        if binding.is_some() {
            scene.set_binding(node, binding)?;
        }
        Ok(node)
    }

    /// Schedule `key` to be emptied. Returns true when it has an occupant.
    fn clear(&mut self, view: &ViewState, key: SlotKey) -> bool {
        let occupied = view.occupant_of(key).is_some();
        if occupied {
            self.cleared.push(key);
        }
        occupied
    }

    /// Retire every staged node, newest first.
    fn abandon<S: Scene>(self, scene: &mut S) {
        for (_, node) in self.staged.into_iter().rev() {
            retire(scene, node);
        }
    }
}

impl Reconciler {
    pub fn new(geometry: TableGeometry, deck_step_rate: f32) -> Self {
        Self {
            geometry,
            deck_step_rate,
        }
    }

    pub fn geometry(&self) -> &TableGeometry {
        &self.geometry
    }

    /// Run one reconciliation pass.
    ///
    /// `perspective` must have been derived from `snapshot`. On error the
    /// scene and `view` are exactly as they were before the call.
    pub fn reconcile<S: Scene>(
        &self,
        view: &mut ViewState,
        scene: &mut S,
        snapshot: &GameSnapshot,
        perspective: &ViewerPerspective,
    ) -> Result<UpdateScope, SceneError> {
        let mut plan = Plan::default();
        let deck = match self.stage(&mut plan, view, scene, snapshot, perspective) {
            Ok(deck) => deck,
            Err(err) => {
                tracing::warn!(staged = plan.staged.len(), %err, "reconciliation aborted, keeping previous table");
                plan.abandon(scene);
                return Err(err);
            }
        };

        let scope = plan.scope;
        self.commit(plan, deck, view, scene);

        view.generation += 1;
        tracing::debug!(
            generation = view.generation,
            status = %snapshot.status,
            ?scope,
            "reconciled table"
        );
        Ok(scope)
    }

    fn stage<S: Scene>(
        &self,
        plan: &mut Plan,
        view: &ViewState,
        scene: &mut S,
        snapshot: &GameSnapshot,
        perspective: &ViewerPerspective,
    ) -> Result<DeckPlan, SceneError> {
        let legal = perspective.legal_targets;
        let deck = self.stage_deck(plan, view, scene, snapshot, legal)?;
        self.stage_table(plan, view, scene, snapshot, legal)?;
        self.stage_seats(plan, view, scene, perspective)?;
        Ok(deck)
    }

    fn stage_deck<S: Scene>(
        &self,
        plan: &mut Plan,
        view: &ViewState,
        scene: &mut S,
        snapshot: &GameSnapshot,
        legal: LegalTargets,
    ) -> Result<DeckPlan, SceneError> {
        if !snapshot.has_deck() {
            if plan.clear(view, SlotKey::Deck) {
                plan.scope |= UpdateScope::DECK;
            }
            return Ok(DeckPlan::Remove);
        }

        let binding = binding_for(legal, ActionTarget::Deck);

        if snapshot.status != GameStatus::Init {
            let placement = self.geometry.coordinates_for(SeatPosition::Bottom, Slot::Deck);
            plan.stage(scene, SlotKey::Deck, Visual::Card(CardCode::BACK), placement, binding)?;
            plan.scope |= UpdateScope::DECK;
            return Ok(DeckPlan::Settle);
        }

        // Keep a deck that is already sliding in; only its binding can change.
        let mut stale = false;
        if view.deck.entry_placed
            && let Some(node) = view.deck.cell.occupant()
        {
            if scene.is_visible(node) {
                return Ok(DeckPlan::Rebind { node, binding });
            }
            tracing::warn!(%node, "entry deck vanished, placing a new one");
            stale = true;
        }

        let origin = self.geometry.deck_entry_origin();
        let node = plan.stage(scene, SlotKey::Deck, Visual::Card(CardCode::BACK), origin, binding)?;
        plan.scope |= UpdateScope::DECK;
        Ok(DeckPlan::Enter { node, stale })
    }

    fn stage_table<S: Scene>(
        &self,
        plan: &mut Plan,
        view: &ViewState,
        scene: &mut S,
        snapshot: &GameSnapshot,
        legal: LegalTargets,
    ) -> Result<(), SceneError> {
        let cards = snapshot.visible_table_cards();
        let placement = self.geometry.coordinates_for(SeatPosition::Bottom, Slot::Table);

        for depth in 0..GameSnapshot::TABLE_DEPTH {
            let key = SlotKey::Table(depth);
            match cards.get(depth) {
                Some(card) => {
                    let is_top = depth + 1 == cards.len();
                    let binding = if is_top {
                        binding_for(legal, ActionTarget::Table)
                    } else {
                        None
                    };
                    plan.stage(scene, key, Visual::Card(*card), placement, binding)?;
                    plan.scope |= UpdateScope::TABLE;
                }
                None => {
                    if plan.clear(view, key) {
                        plan.scope |= UpdateScope::TABLE;
                    }
                }
            }
        }

        Ok(())
    }

    fn stage_seats<S: Scene>(
        &self,
        plan: &mut Plan,
        view: &ViewState,
        scene: &mut S,
        perspective: &ViewerPerspective,
    ) -> Result<(), SceneError> {
        // Seats that disappeared (player count changed) lose all their visuals.
        plan.vacated = view
            .seats()
            .filter(|seat| !perspective.seats.contains(seat))
            .collect();
        if !plan.vacated.is_empty() {
            plan.scope |= UpdateScope::HANDS | UpdateScope::HELD | UpdateScope::SCORES;
        }

        let viewer_seat = perspective.viewer_seat();
        for (seat, player) in perspective.seated() {
            let legal = if viewer_seat == Some(seat) {
                perspective.legal_targets
            } else {
                LegalTargets::empty()
            };

            for index in HandIndex::all() {
                let key = SlotKey::Hand(seat, index);
                match player.card(index) {
                    Some(card) => {
                        let placement = self.geometry.coordinates_for(seat, Slot::Hand(index));
                        let binding = binding_for(legal, ActionTarget::Hand(index));
                        plan.stage(scene, key, Visual::Card(card.visible_code()), placement, binding)?;
                        plan.scope |= UpdateScope::HANDS;
                    }
                    None => {
                        if plan.clear(view, key) {
                            plan.scope |= UpdateScope::HANDS;
                        }
                    }
                }
            }

            let key = SlotKey::Held(seat);
            match player.held_card {
                Some(card) => {
                    let placement = self.geometry.coordinates_for(seat, Slot::Held);
                    let binding = binding_for(legal, ActionTarget::Held);
                    plan.stage(scene, key, Visual::Card(card), placement, binding)?;
                    plan.scope |= UpdateScope::HELD;
                }
                None => {
                    if plan.clear(view, key) {
                        plan.scope |= UpdateScope::HELD;
                    }
                }
            }

            let placement = self.geometry.coordinates_for(seat, Slot::Score);
            plan.stage(scene, SlotKey::Score(seat), Visual::Label(player.score_label()), placement, None)?;
            plan.scope |= UpdateScope::SCORES;
        }

        Ok(())
    }

    /// Apply a fully staged plan. Nothing here inserts, so nothing can fail
    /// halfway; stale retirements are logged and skipped.
    fn commit<S: Scene>(&self, plan: Plan, deck: DeckPlan, view: &mut ViewState, scene: &mut S) {
        match deck {
            DeckPlan::Remove | DeckPlan::Settle => {
                stop_deck_entry(view);
                view.deck.entry_placed = false;
            }
            DeckPlan::Rebind { node, binding } => {
                if let Err(err) = scene.set_binding(node, binding) {
                    tracing::warn!(%node, %err, "failed to rebind entry deck");
                }
            }
            DeckPlan::Enter { node, stale } => {
                if stale {
                    view.deck.cell.forget();
                }
                stop_deck_entry(view);
                let target_y = self.geometry.deck_entry_target().y;
                view.deck.entry = Some(view.ticker.register(Box::new(DeckEntry::new(
                    node,
                    target_y,
                    self.deck_step_rate,
                ))));
                view.deck.entry_placed = true;
            }
        }

        for (key, node) in plan.staged {
            view.slot_mut(key).swap_in(scene, node);
        }
        for key in plan.cleared {
            view.slot_mut(key).clear(scene);
        }
        for seat in plan.vacated {
            if let Some(mut visuals) = view.seats.remove(&seat) {
                tracing::debug!(%seat, "seat vacated");
                visuals.clear(scene);
            }
        }
    }
}

fn stop_deck_entry(view: &mut ViewState) {
    if let Some(id) = view.deck.entry.take() {
        view.ticker.cancel(id);
    }
}

fn binding_for(legal: LegalTargets, target: ActionTarget) -> Option<ActionTarget> {
    legal.allows(target).then_some(target)
}

#[cfg(test)]
mod tests {
    use game_core::{
        CardCode, GameId, GameSnapshot, HandCard, LegalTargetsByPlayer, PlayerId, PlayerSnapshot,
        UserId, derive_perspective,
    };

    use super::*;
    use crate::scene::MemoryScene;

    const VIEWER: UserId = UserId(100);

    fn card(code: &str) -> CardCode {
        CardCode::parse(code).unwrap()
    }

    fn snapshot(status: GameStatus, players: u64) -> GameSnapshot {
        let mut snapshot = GameSnapshot::new(GameId(7), status);
        snapshot.players = (0..players)
            .map(|i| {
                let mut player = PlayerSnapshot::new(PlayerId(10 + i), UserId(100 + i), format!("p{i}"));
                for index in HandIndex::all() {
                    player.hand[index.get()] = Some(HandCard::new(card("5H"), index.get() == 0));
                }
                player
            })
            .collect();
        snapshot
    }

    struct Harness {
        reconciler: Reconciler,
        view: ViewState,
        scene: MemoryScene,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                reconciler: Reconciler::new(TableGeometry::default(), 6.0),
                view: ViewState::new(),
                scene: MemoryScene::new(),
            }
        }

        fn apply(&mut self, snapshot: &GameSnapshot, legal: LegalTargets) -> Result<UpdateScope, SceneError> {
            let mut by_player = LegalTargetsByPlayer::new();
            by_player.insert(PlayerId(10), legal);
            let perspective = derive_perspective(snapshot, Some(VIEWER), &by_player).unwrap();
            self.reconciler
                .reconcile(&mut self.view, &mut self.scene, snapshot, &perspective)
        }

        fn visual(&self, node: Option<NodeId>) -> Visual {
            self.scene.node(node.unwrap()).unwrap().visual.clone()
        }

        fn assert_one_node_per_slot(&self) {
            let mut occupants = self.view.occupants();
            occupants.sort();
            let mut painted: Vec<NodeId> = self.scene.nodes().map(|node| node.id).collect();
            painted.sort();
            assert_eq!(occupants, painted);
        }
    }

    #[test]
    fn newer_discard_is_painted_over_the_older_one() {
        let mut harness = Harness::new();
        let mut state = snapshot(GameStatus::Take, 2);
        state.table_cards = vec![card("AS"), card("KD")];
        harness.apply(&state, LegalTargets::TABLE).unwrap();
        let [old_bottom, old_top] = harness.view.table_nodes();

        state.table_cards = vec![card("AS"), card("KD"), card("QC")];
        let scope = harness.apply(&state, LegalTargets::TABLE).unwrap();
        assert!(scope.contains(UpdateScope::TABLE));

        let [bottom, top] = harness.view.table_nodes();
        assert_eq!(harness.visual(bottom), Visual::Card(card("KD")));
        assert_eq!(harness.visual(top), Visual::Card(card("QC")));
        assert!(harness.scene.z_index(top.unwrap()) > harness.scene.z_index(bottom.unwrap()));
        assert!(!harness.scene.is_visible(old_bottom.unwrap()));
        assert!(!harness.scene.is_visible(old_top.unwrap()));

        assert_eq!(harness.scene.binding(top.unwrap()), Some(ActionTarget::Table));
        assert_eq!(harness.scene.binding(bottom.unwrap()), None);
        harness.assert_one_node_per_slot();
    }

    #[test]
    fn held_card_disappears_once_absent() {
        let mut harness = Harness::new();
        let mut state = snapshot(GameStatus::Hold, 2);
        state.players[0].held_card = Some(card("7C"));
        harness.apply(&state, LegalTargets::HELD).unwrap();

        let held = harness.view.held_node(SeatPosition::Bottom).unwrap();
        assert_eq!(harness.scene.binding(held), Some(ActionTarget::Held));

        state.status = GameStatus::Take;
        state.players[0].held_card = None;
        let scope = harness.apply(&state, LegalTargets::DECK).unwrap();

        assert!(scope.contains(UpdateScope::HELD));
        assert!(!harness.scene.is_visible(held));
        assert_eq!(harness.view.held_node(SeatPosition::Bottom), None);
        harness.assert_one_node_per_slot();
    }

    #[test]
    fn only_the_viewers_slots_are_interactive() {
        let mut harness = Harness::new();
        let state = snapshot(GameStatus::Flip2, 4);
        let legal = LegalTargets::HAND_1 | LegalTargets::HAND_4;
        harness.apply(&state, legal).unwrap();

        let bound: Vec<ActionTarget> = harness
            .scene
            .interactive()
            .filter_map(|node| node.binding)
            .collect();
        assert_eq!(bound.len(), 2);
        for seat in [SeatPosition::Left, SeatPosition::Top, SeatPosition::Right] {
            for index in HandIndex::all() {
                let node = harness.view.hand_node(seat, index).unwrap();
                assert_eq!(harness.scene.binding(node), None);
            }
        }
        let own = harness
            .view
            .hand_node(SeatPosition::Bottom, HandIndex::new(4).unwrap())
            .unwrap();
        assert_eq!(harness.scene.binding(own), Some(ActionTarget::hand(4).unwrap()));
    }

    #[test]
    fn face_down_cards_show_their_back() {
        let mut harness = Harness::new();
        harness.apply(&snapshot(GameStatus::Flip2, 1), LegalTargets::empty()).unwrap();

        let first = harness.view.hand_node(SeatPosition::Bottom, HandIndex::new(0).unwrap());
        let second = harness.view.hand_node(SeatPosition::Bottom, HandIndex::new(1).unwrap());
        assert_eq!(harness.visual(first), Visual::Card(card("5H")));
        assert_eq!(harness.visual(second), Visual::Card(CardCode::BACK));
        assert_eq!(
            harness.visual(harness.view.score_node(SeatPosition::Bottom)),
            Visual::Label("p0: 0".into())
        );
    }

    #[test]
    fn init_deck_slides_to_the_centre_and_is_kept_across_init_pushes() {
        let mut harness = Harness::new();
        let state = snapshot(GameStatus::Init, 2);
        harness.apply(&state, LegalTargets::empty()).unwrap();

        let deck = harness.view.deck_node().unwrap();
        let origin = harness.reconciler.geometry().deck_entry_origin();
        assert_eq!(harness.scene.position(deck), Some(origin));
        assert!(harness.view.deck_entry_running());

        for _ in 0..10 {
            harness.view.ticker.tick(&mut harness.scene, 1.0);
        }
        let scope = harness.apply(&state, LegalTargets::empty()).unwrap();
        assert!(!scope.contains(UpdateScope::DECK));
        assert_eq!(harness.view.deck_node(), Some(deck));

        let mut frames = 0;
        while harness.view.ticker.tick(&mut harness.scene, 1.0) > 0 {
            frames += 1;
            assert!(frames < 1_000);
        }
        let (_, cy) = harness.reconciler.geometry().center();
        assert_eq!(harness.scene.position(deck).unwrap().y, cy);
        assert!(!harness.view.deck_entry_running());
        assert!(harness.view.ticker().is_empty());
    }

    #[test]
    fn leaving_init_moves_the_deck_beside_the_pile_and_stops_the_entry() {
        let mut harness = Harness::new();
        let mut state = snapshot(GameStatus::Init, 2);
        harness.apply(&state, LegalTargets::empty()).unwrap();
        let entry_deck = harness.view.deck_node().unwrap();

        state.status = GameStatus::Take;
        harness.apply(&state, LegalTargets::DECK).unwrap();

        let deck = harness.view.deck_node().unwrap();
        assert_ne!(deck, entry_deck);
        assert!(!harness.scene.is_visible(entry_deck));
        assert!(harness.view.ticker().is_empty());
        assert_eq!(
            harness.scene.position(deck),
            Some(harness.reconciler.geometry().coordinates_for(SeatPosition::Bottom, Slot::Deck))
        );
        assert_eq!(harness.scene.binding(deck), Some(ActionTarget::Deck));
    }

    #[test]
    fn exhausted_deck_is_removed() {
        let mut harness = Harness::new();
        let mut state = snapshot(GameStatus::Take, 2);
        harness.apply(&state, LegalTargets::empty()).unwrap();
        let deck = harness.view.deck_node().unwrap();

        state.deck_count = Some(0);
        harness.apply(&state, LegalTargets::empty()).unwrap();

        assert!(!harness.scene.is_visible(deck));
        assert_eq!(harness.view.deck_node(), None);
        harness.assert_one_node_per_slot();
    }

    #[test]
    fn failed_insert_keeps_the_previous_occupants() {
        let mut harness = Harness::new();
        let mut state = snapshot(GameStatus::Take, 2);
        state.table_cards = vec![card("AS")];
        harness.apply(&state, LegalTargets::DECK).unwrap();
        let before = harness.view.occupants();
        let generation = harness.view.generation();

        state.table_cards.push(card("2D"));
        harness.scene.set_reject_inserts(true);
        assert!(matches!(
            harness.apply(&state, LegalTargets::DECK),
            Err(SceneError::Rejected { .. })
        ));

        for node in &before {
            assert!(harness.scene.is_visible(*node));
        }
        assert_eq!(harness.view.generation(), generation);
        harness.assert_one_node_per_slot();
    }

    #[test]
    fn insert_failure_midway_leaves_the_previous_generation_whole() {
        let mut harness = Harness::new();
        let mut state = snapshot(GameStatus::Take, 2);
        state.table_cards = vec![card("AS")];
        harness.apply(&state, LegalTargets::DECK).unwrap();
        let before = harness.view.occupants();
        let generation = harness.view.generation();
        let first_hand = HandIndex::new(0).unwrap();
        let deck = harness.view.deck_node();

        // deck and discard go through, the first hand card does not
        harness.scene.reject_inserts_after(2);
        state.status = GameStatus::Hold;
        state.table_cards = vec![card("KD")];
        state.players[0].held_card = Some(card("7C"));
        for player in &mut state.players {
            player.hand = std::array::from_fn(|_| Some(HandCard::new(card("9S"), true)));
        }
        assert!(matches!(
            harness.apply(&state, LegalTargets::HELD),
            Err(SceneError::Rejected { .. })
        ));

        assert_eq!(harness.view.deck_node(), deck);
        assert_eq!(harness.scene.binding(deck.unwrap()), Some(ActionTarget::Deck));
        let [discard, _] = harness.view.table_nodes();
        assert_eq!(harness.visual(discard), Visual::Card(card("AS")));
        assert_eq!(
            harness.visual(harness.view.hand_node(SeatPosition::Bottom, first_hand)),
            Visual::Card(card("5H"))
        );
        assert_eq!(harness.view.held_node(SeatPosition::Bottom), None);
        assert_eq!(harness.view.occupants(), before);
        assert_eq!(harness.view.generation(), generation);
        assert_eq!(harness.scene.len(), before.len());
        harness.assert_one_node_per_slot();

        harness.scene.set_reject_inserts(false);
        harness.apply(&state, LegalTargets::HELD).unwrap();
        let [discard, _] = harness.view.table_nodes();
        assert_eq!(harness.visual(discard), Visual::Card(card("KD")));
        assert_eq!(
            harness.visual(harness.view.hand_node(SeatPosition::Bottom, first_hand)),
            Visual::Card(card("9S"))
        );
        assert_eq!(harness.view.generation(), generation + 1);
        harness.assert_one_node_per_slot();
    }

    #[test]
    fn failed_init_pass_keeps_the_sliding_deck_and_its_animation() {
        let mut harness = Harness::new();
        let mut state = snapshot(GameStatus::Init, 2);
        harness.apply(&state, LegalTargets::empty()).unwrap();
        let deck = harness.view.deck_node().unwrap();

        harness.scene.reject_inserts_after(0);
        state.status = GameStatus::Take;
        assert!(harness.apply(&state, LegalTargets::DECK).is_err());

        assert_eq!(harness.view.deck_node(), Some(deck));
        assert!(harness.view.deck_entry_running());
        assert_eq!(harness.scene.binding(deck), None);
        harness.assert_one_node_per_slot();
    }

    #[test]
    fn vacated_seats_lose_their_visuals() {
        let mut harness = Harness::new();
        harness.apply(&snapshot(GameStatus::Init, 4), LegalTargets::empty()).unwrap();
        assert_eq!(harness.view.seats().count(), 4);

        harness.apply(&snapshot(GameStatus::Init, 2), LegalTargets::empty()).unwrap();

        let seats: Vec<SeatPosition> = harness.view.seats().collect();
        assert_eq!(seats, vec![SeatPosition::Bottom, SeatPosition::Top]);
        harness.assert_one_node_per_slot();
    }

    #[test]
    fn repeated_pushes_never_accumulate_nodes() {
        let mut harness = Harness::new();
        let mut state = snapshot(GameStatus::Take, 3);
        state.table_cards = vec![card("AS"), card("KD")];
        for _ in 0..5 {
            harness.apply(&state, LegalTargets::DECK | LegalTargets::TABLE).unwrap();
        }
        // deck + two discards + three seats of six cards and a score label
        assert_eq!(harness.scene.len(), 3 + 3 * 7);
        harness.assert_one_node_per_slot();
    }
}
