//! Interaction router: turns a click on a bound node into an [`Action`].
//!
//! Routing reads only the node's binding and an immutable [`ClickContext`]
//! captured from the latest snapshot. It never consults server rules; the
//! legal set already encodes them. Anything that cannot become an action is
//! a silent no-op, logged at debug level.
use game_core::{
    Action, ActionKind, ActionTarget, GameId, GameSnapshot, GameStatus, LegalTargets, PlayerId,
    ViewerPerspective,
};

/// Read-only state a click is resolved against.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClickContext {
    pub game_id: GameId,
    /// The viewer's player id; `None` for spectators.
    pub player_id: Option<PlayerId>,
    pub status: GameStatus,
    pub legal: LegalTargets,
    pub viewer_is_host: bool,
}

impl ClickContext {
    pub fn capture(snapshot: &GameSnapshot, perspective: &ViewerPerspective) -> Self {
        let viewer = perspective.viewer_player();
        Self {
            game_id: snapshot.id,
            player_id: viewer.map(|player| player.id),
            status: snapshot.status,
            legal: perspective.legal_targets,
            viewer_is_host: viewer.is_some_and(|player| player.is_host),
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct InteractionRouter;

impl InteractionRouter {
    pub fn new() -> Self {
        Self
    }

    /// Resolve a click on `target`.
    pub fn route(&self, context: &ClickContext, target: ActionTarget) -> Option<Action> {
        let Some(player_id) = context.player_id else {
            tracing::debug!(%target, "spectator click ignored");
            return None;
        };
        if !context.legal.allows(target) {
            tracing::debug!(%target, status = %context.status, "click on illegal target ignored");
            return None;
        }

        let action = |kind| Action::new(kind, context.game_id, player_id);
        let routed = match target {
            ActionTarget::Deck => Some(action(ActionKind::TakeFromDeck)),
            ActionTarget::Table => Some(action(ActionKind::TakeFromTable)),
            ActionTarget::Held if context.status == GameStatus::Hold => {
                Some(action(ActionKind::Discard))
            }
            ActionTarget::Held => None,
            ActionTarget::Hand(index) => match context.status {
                GameStatus::Flip2 | GameStatus::Flip => {
                    Some(action(ActionKind::Flip).with_hand_index(index))
                }
                GameStatus::Hold => Some(action(ActionKind::Swap).with_hand_index(index)),
                _ => None,
            },
        };

        match &routed {
            Some(action) => tracing::debug!(%target, kind = %action.kind, "click routed"),
            None => tracing::debug!(%target, status = %context.status, "no action for click in this phase"),
        }
        routed
    }

    /// Resolve the host's start request; only valid before the deal.
    pub fn start_game(&self, context: &ClickContext) -> Option<Action> {
        let player_id = context.player_id?;
        if !context.viewer_is_host || context.status != GameStatus::Init {
            tracing::debug!(
                host = context.viewer_is_host,
                status = %context.status,
                "start request ignored"
            );
            return None;
        }
        Some(Action::new(ActionKind::StartGame, context.game_id, player_id))
    }
}
