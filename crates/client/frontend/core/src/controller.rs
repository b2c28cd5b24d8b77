//! Table controller: the single owner of the scene and everything derived
//! from the latest push.
//!
//! Inbound events, frame ticks and user input all go through one controller
//! instance. The host serializes them; the controller itself never shares
//! state.
use game_core::{
    ActionTarget, ConfigurationError, ErrorSeverity, GameError, GameSnapshot, UserId,
    ViewerPerspective, derive_perspective,
};
use thiserror::Error;

use crate::config::FrontendConfig;
use crate::encoder::{OutboundEvent, encode};
use crate::protocol::{InboundEvent, TableUpdate};
use crate::reconciler::{Reconciler, UpdateScope};
use crate::router::{ClickContext, InteractionRouter};
use crate::scene::{NodeId, Scene, SceneError};
use crate::view_state::ViewState;

#[derive(Debug, Error)]
pub enum ControllerError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Scene(#[from] SceneError),
}

impl GameError for ControllerError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Configuration(err) => err.severity(),
            Self::Scene(err) => err.severity(),
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Configuration(err) => err.error_code(),
            Self::Scene(err) => err.error_code(),
        }
    }
}

/// The latest successfully rendered push.
#[derive(Clone, Debug)]
pub struct Session {
    pub snapshot: GameSnapshot,
    pub perspective: ViewerPerspective,
    pub click: ClickContext,
}

pub struct TableController<S: Scene> {
    scene: S,
    view: ViewState,
    reconciler: Reconciler,
    router: InteractionRouter,
    viewer: Option<UserId>,
    session: Option<Session>,
}

impl<S: Scene> TableController<S> {
    pub fn new(scene: S, config: &FrontendConfig) -> Self {
        Self {
            scene,
            view: ViewState::new(),
            reconciler: Reconciler::new(config.geometry(), config.animation.deck_step_rate),
            router: InteractionRouter::new(),
            viewer: None,
            session: None,
        }
    }

    pub fn scene(&self) -> &S {
        &self.scene
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn viewer(&self) -> Option<UserId> {
        self.viewer
    }

    /// Apply an inbound event and reconcile the scene.
    ///
    /// On error nothing changes: payload and perspective errors are caught
    /// before the scene is touched, and a reconciliation pass that fails
    /// midway retires whatever it had staged. The scene keeps showing the
    /// previous table and the session stays on the previous snapshot.
    pub fn handle(&mut self, event: InboundEvent) -> Result<UpdateScope, ControllerError> {
        let update = match event {
            InboundEvent::Joined { user_id, update } => {
                tracing::info!(%user_id, game = %update.snapshot.id, "joined table");
                self.viewer = Some(user_id);
                update
            }
            InboundEvent::GameStarted(update) => {
                tracing::info!(game = %update.snapshot.id, "game started");
                update
            }
            InboundEvent::Game(update) => update,
        };

        self.apply(update).inspect_err(|err| {
            tracing::error!(code = err.error_code(), severity = err.severity().as_str(), %err, "table update rejected");
        })
    }

    fn apply(&mut self, update: TableUpdate) -> Result<UpdateScope, ControllerError> {
        let TableUpdate { snapshot, legal } = update;
        let perspective = derive_perspective(&snapshot, self.viewer, &legal)?;
        if perspective.is_spectator() {
            tracing::debug!(viewer = ?self.viewer, "viewer is not seated, rendering as spectator");
        }

        let scope = self
            .reconciler
            .reconcile(&mut self.view, &mut self.scene, &snapshot, &perspective)?;

        let click = ClickContext::capture(&snapshot, &perspective);
        self.session = Some(Session {
            snapshot,
            perspective,
            click,
        });
        Ok(scope)
    }

    /// Advance running animations by `elapsed` frames. Returns how many are
    /// still running.
    pub fn tick(&mut self, elapsed: f32) -> usize {
        self.view.ticker.tick(&mut self.scene, elapsed)
    }

    /// Route a click on `target` and encode the resulting action.
    pub fn click(&mut self, target: ActionTarget) -> Option<OutboundEvent> {
        let Some(session) = &self.session else {
            tracing::warn!(%target, "click before the first table update dropped");
            return None;
        };
        self.router.route(&session.click, target).map(|action| encode(&action))
    }

    /// Resolve a pointer-down on a scene node through its binding.
    pub fn pointer_down(&mut self, node: NodeId) -> Option<OutboundEvent> {
        match self.scene.binding(node) {
            Some(target) => self.click(target),
            None => {
                tracing::debug!(%node, "pointer down on inert node");
                None
            }
        }
    }

    /// The host's start button.
    pub fn start_game(&mut self) -> Option<OutboundEvent> {
        let Some(session) = &self.session else {
            tracing::warn!("start request before the first table update dropped");
            return None;
        };
        let action = self.router.start_game(&session.click)?;
        tracing::info!(game = %action.game_id, "requesting game start");
        Some(encode(&action))
    }
}
