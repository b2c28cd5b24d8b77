//! Presentation host seam.
//!
//! The reconciler never talks to a renderer directly; it drives a [`Scene`]
//! which the host implements on top of its sprite engine. Nodes are painted
//! in insertion order, so a node inserted later occludes earlier nodes at the
//! same anchor.
//!
//! Click handling is data, not closures: each interactive node carries the
//! [`ActionTarget`] it was bound for, and the host reports pointer-downs by
//! node id. Routing then only needs the node's binding and an immutable
//! click context.
pub mod memory;

use std::fmt;

use game_core::{ActionTarget, CardCode, ErrorSeverity, GameError, Placement};
use thiserror::Error;

pub use memory::MemoryScene;

/// Handle to a node owned by a [`Scene`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

/// What a node shows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Visual {
    Card(CardCode),
    Label(String),
}

impl fmt::Display for Visual {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Visual::Card(code) => write!(f, "card {code}"),
            Visual::Label(text) => write!(f, "label {text:?}"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SceneError {
    #[error("{0} is not part of the scene")]
    UnknownNode(NodeId),

    #[error("scene rejected {visual}: {reason}")]
    Rejected { visual: String, reason: String },
}

impl GameError for SceneError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Internal
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownNode(_) => "UNKNOWN_NODE",
            Self::Rejected { .. } => "NODE_REJECTED",
        }
    }
}

/// Mutable scene graph provided by the presentation host.
pub trait Scene {
    /// Add a visible node on top of every existing node. New nodes are inert
    /// until [`Scene::set_binding`] makes them clickable.
    fn insert(&mut self, visual: Visual, placement: Placement) -> Result<NodeId, SceneError>;

    /// Remove a node from the scene. After this call the node is neither
    /// painted nor clickable.
    fn retire(&mut self, node: NodeId) -> Result<(), SceneError>;

    fn set_position(&mut self, node: NodeId, x: f32, y: f32) -> Result<(), SceneError>;

    /// Make a node clickable for `binding`, or inert with `None`.
    fn set_binding(&mut self, node: NodeId, binding: Option<ActionTarget>)
    -> Result<(), SceneError>;

    fn position(&self, node: NodeId) -> Option<Placement>;

    fn binding(&self, node: NodeId) -> Option<ActionTarget>;

    fn is_visible(&self, node: NodeId) -> bool;
}
