//! Viewer-relative view of a snapshot.
//!
//! The viewer always sits at the bottom of the table. Rotation is recomputed
//! from the snapshot's canonical player order on every push; an already
//! rotated list is never rotated again.
use std::collections::BTreeMap;

use crate::error::ConfigurationError;
use crate::ids::{PlayerId, UserId};
use crate::seat::{SeatPosition, seats_for};
use crate::snapshot::{GameSnapshot, PlayerSnapshot};
use crate::target::LegalTargets;

/// Legal targets per player, as computed by the server.
pub type LegalTargetsByPlayer = BTreeMap<PlayerId, LegalTargets>;

#[derive(Clone, Debug, PartialEq)]
pub struct ViewerPerspective {
    pub viewer: Option<UserId>,
    /// Viewer's index in the canonical (unrotated) order; `None` for spectators.
    pub viewer_player_index: Option<usize>,
    /// Players rotated so the viewer is first. Unrotated for spectators.
    pub rotated_players: Vec<PlayerSnapshot>,
    /// Seat of `rotated_players[i]`.
    pub seats: Vec<SeatPosition>,
    /// The viewer's own legal targets. Empty for spectators.
    pub legal_targets: LegalTargets,
}

impl ViewerPerspective {
    pub fn is_spectator(&self) -> bool {
        self.viewer_player_index.is_none()
    }

    /// The viewer's own player record, if seated.
    pub fn viewer_player(&self) -> Option<&PlayerSnapshot> {
        self.viewer_player_index
            .and_then(|_| self.rotated_players.first())
    }

    /// The seat actions can be taken from; only a seated viewer has one.
    pub fn viewer_seat(&self) -> Option<SeatPosition> {
        self.viewer_player().map(|_| SeatPosition::Bottom)
    }

    /// Seats paired with the player drawn there.
    pub fn seated(&self) -> impl Iterator<Item = (SeatPosition, &PlayerSnapshot)> {
        self.seats.iter().copied().zip(self.rotated_players.iter())
    }
}

/// Rotate `items` left by `n`, returning a new vector.
pub fn rotate<T: Clone>(items: &[T], n: usize) -> Vec<T> {
    if items.is_empty() {
        return Vec::new();
    }
    let mut rotated = items.to_vec();
    rotated.rotate_left(n % items.len());
    rotated
}

/// Derive the viewer's perspective from a canonical snapshot.
pub fn derive_perspective(
    snapshot: &GameSnapshot,
    viewer: Option<UserId>,
    legal_by_player: &LegalTargetsByPlayer,
) -> Result<ViewerPerspective, ConfigurationError> {
    let seats = seats_for(snapshot.players.len())?;
    let viewer_player_index = viewer.and_then(|user| snapshot.player_index_of(user));

    let (rotated_players, legal_targets) = match viewer_player_index {
        Some(index) => {
            let player_id = snapshot.players[index].id;
            let legal = legal_by_player
                .get(&player_id)
                .copied()
                .unwrap_or_default();
            (rotate(&snapshot.players, index), legal)
        }
        None => (snapshot.players.clone(), LegalTargets::empty()),
    };

    Ok(ViewerPerspective {
        viewer,
        viewer_player_index,
        rotated_players,
        seats: seats.to_vec(),
        legal_targets,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::GameId;
    use crate::snapshot::GameStatus;
    use crate::target::ActionTarget;

    fn snapshot_with(count: u64) -> GameSnapshot {
        let mut snapshot = GameSnapshot::new(GameId(1), GameStatus::Flip2);
        snapshot.players = (0..count)
            .map(|i| PlayerSnapshot::new(PlayerId(10 + i), UserId(100 + i), format!("p{i}")))
            .collect();
        snapshot
    }

    fn ids(perspective: &ViewerPerspective) -> Vec<u64> {
        perspective.rotated_players.iter().map(|p| p.id.0).collect()
    }

    #[test]
    fn viewer_is_rotated_to_the_bottom_seat() {
        let snapshot = snapshot_with(4);
        let perspective =
            derive_perspective(&snapshot, Some(UserId(102)), &LegalTargetsByPlayer::new()).unwrap();

        assert_eq!(ids(&perspective), vec![12, 13, 10, 11]);
        assert_eq!(perspective.viewer_player_index, Some(2));
        assert_eq!(perspective.seats[0], SeatPosition::Bottom);
        assert_eq!(perspective.viewer_player().unwrap().id, PlayerId(12));
        assert_eq!(perspective.viewer_seat(), Some(SeatPosition::Bottom));
    }

    #[test]
    fn derivation_is_idempotent_on_the_canonical_order() {
        let snapshot = snapshot_with(3);
        let legal = LegalTargetsByPlayer::new();

        let first = derive_perspective(&snapshot, Some(UserId(101)), &legal).unwrap();
        let second = derive_perspective(&snapshot, Some(UserId(101)), &legal).unwrap();

        assert_eq!(first, second);
        assert_eq!(ids(&first), vec![11, 12, 10]);
    }

    #[test]
    fn spectators_see_the_canonical_order_without_legal_targets() {
        let snapshot = snapshot_with(2);
        let mut legal = LegalTargetsByPlayer::new();
        legal.insert(PlayerId(10), LegalTargets::DECK);

        let perspective = derive_perspective(&snapshot, Some(UserId(999)), &legal).unwrap();

        assert!(perspective.is_spectator());
        assert_eq!(ids(&perspective), vec![10, 11]);
        assert!(perspective.legal_targets.is_empty());
        assert!(perspective.viewer_player().is_none());
        assert!(perspective.viewer_seat().is_none());
    }

    #[test]
    fn only_the_viewers_legal_targets_are_copied() {
        let snapshot = snapshot_with(2);
        let mut legal = LegalTargetsByPlayer::new();
        legal.insert(PlayerId(10), LegalTargets::DECK | LegalTargets::TABLE);
        legal.insert(PlayerId(11), LegalTargets::HELD);

        let perspective = derive_perspective(&snapshot, Some(UserId(101)), &legal).unwrap();

        assert!(perspective.legal_targets.allows(ActionTarget::Held));
        assert!(!perspective.legal_targets.allows(ActionTarget::Deck));
    }

    #[test]
    fn empty_or_crowded_tables_are_configuration_errors() {
        let legal = LegalTargetsByPlayer::new();
        assert_eq!(
            derive_perspective(&snapshot_with(0), None, &legal),
            Err(ConfigurationError::InvalidPlayerCount { count: 0 })
        );
        assert_eq!(
            derive_perspective(&snapshot_with(5), None, &legal),
            Err(ConfigurationError::InvalidPlayerCount { count: 5 })
        );
    }

    #[test]
    fn rotate_wraps_and_copies() {
        let items = [1, 2, 3];
        assert_eq!(rotate(&items, 1), vec![2, 3, 1]);
        assert_eq!(rotate(&items, 4), vec![2, 3, 1]);
        assert_eq!(rotate::<i32>(&[], 3), Vec::<i32>::new());
        assert_eq!(items, [1, 2, 3]);
    }
}
