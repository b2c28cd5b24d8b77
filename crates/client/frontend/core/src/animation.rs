//! Frame-driven animations.
//!
//! Animations are registered with a [`Ticker`] and advanced once per frame.
//! An animation reports [`AnimationStatus::Finished`] when it is done and the
//! ticker drops it in the same tick, so nothing stays registered after
//! reaching its target.
use std::fmt;

use crate::scene::{NodeId, Scene};

/// Result of advancing an animation by one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnimationStatus {
    /// More frames are needed.
    Running,
    /// Target reached; the ticker unregisters the animation.
    Finished,
}

impl AnimationStatus {
    #[inline]
    pub fn is_finished(self) -> bool {
        matches!(self, AnimationStatus::Finished)
    }
}

/// Per-frame callback.
pub trait Animation: fmt::Debug + Send {
    /// Advance by `elapsed` frame ticks (1.0 is one nominal frame).
    fn advance(&mut self, scene: &mut dyn Scene, elapsed: f32) -> AnimationStatus;
}

/// Registration handle returned by [`Ticker::register`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AnimationId(u64);

/// Registry of running animations.
#[derive(Debug, Default)]
pub struct Ticker {
    active: Vec<(AnimationId, Box<dyn Animation>)>,
    next_id: u64,
}

impl Ticker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, animation: Box<dyn Animation>) -> AnimationId {
        self.next_id += 1;
        let id = AnimationId(self.next_id);
        tracing::debug!(?id, ?animation, "animation registered");
        self.active.push((id, animation));
        id
    }

    /// Drop a running animation. Returns false if it already finished.
    pub fn cancel(&mut self, id: AnimationId) -> bool {
        let before = self.active.len();
        self.active.retain(|(active, _)| *active != id);
        let cancelled = self.active.len() != before;
        if cancelled {
            tracing::debug!(?id, "animation cancelled");
        }
        cancelled
    }

    pub fn is_registered(&self, id: AnimationId) -> bool {
        self.active.iter().any(|(active, _)| *active == id)
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Advance every animation and unregister the finished ones.
    ///
    /// Returns the number of animations still running.
    pub fn tick(&mut self, scene: &mut dyn Scene, elapsed: f32) -> usize {
        self.active.retain_mut(|(id, animation)| {
            let status = animation.advance(scene, elapsed);
            if status.is_finished() {
                tracing::debug!(?id, "animation finished");
            }
            !status.is_finished()
        });
        self.active.len()
    }
}

/// Slides the deck straight down from above the table to its resting y.
#[derive(Debug, Clone, PartialEq)]
pub struct DeckEntry {
    node: NodeId,
    target_y: f32,
    step_rate: f32,
}

impl DeckEntry {
    pub fn new(node: NodeId, target_y: f32, step_rate: f32) -> Self {
        Self {
            node,
            target_y,
            step_rate,
        }
    }

    pub fn node(&self) -> NodeId {
        self.node
    }
}

impl Animation for DeckEntry {
    fn advance(&mut self, scene: &mut dyn Scene, elapsed: f32) -> AnimationStatus {
        let Some(current) = scene.position(self.node) else {
            tracing::debug!(node = %self.node, "deck retired before entry finished");
            return AnimationStatus::Finished;
        };

        let next = current.y + self.step_rate * elapsed.max(0.0);
        let (y, status) = if next >= self.target_y {
            (self.target_y, AnimationStatus::Finished)
        } else {
            (next, AnimationStatus::Running)
        };

        match scene.set_position(self.node, current.x, y) {
            Ok(()) => status,
            Err(err) => {
                tracing::warn!(%err, "deck entry lost its node");
                AnimationStatus::Finished
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use game_core::{CardCode, Placement};

    use super::*;
    use crate::scene::{MemoryScene, Visual};

    fn deck_at(scene: &mut MemoryScene, y: f32) -> NodeId {
        scene
            .insert(Visual::Card(CardCode::BACK), Placement::new(400.0, y, 0.0))
            .unwrap()
    }

    #[test]
    fn deck_entry_snaps_to_target_and_unregisters() {
        let mut scene = MemoryScene::new();
        let deck = deck_at(&mut scene, -50.0);
        let mut ticker = Ticker::new();
        let id = ticker.register(Box::new(DeckEntry::new(deck, 400.0, 6.0)));

        let mut frames = 0;
        while ticker.tick(&mut scene, 1.0) > 0 {
            frames += 1;
            assert!(frames < 1_000, "entry animation never finished");
        }

        assert_eq!(scene.position(deck).unwrap().y, 400.0);
        assert!(!ticker.is_registered(id));

        ticker.tick(&mut scene, 5.0);
        assert_eq!(scene.position(deck).unwrap().y, 400.0);
    }

    #[test]
    fn deck_entry_moves_by_rate_times_elapsed() {
        let mut scene = MemoryScene::new();
        let deck = deck_at(&mut scene, 0.0);
        let mut entry = DeckEntry::new(deck, 100.0, 6.0);

        assert_eq!(entry.advance(&mut scene, 2.5), AnimationStatus::Running);
        assert_eq!(scene.position(deck).unwrap().y, 15.0);
        assert_eq!(scene.position(deck).unwrap().x, 400.0);
    }

    #[test]
    fn retired_deck_finishes_the_animation() {
        let mut scene = MemoryScene::new();
        let deck = deck_at(&mut scene, 0.0);
        let mut ticker = Ticker::new();
        ticker.register(Box::new(DeckEntry::new(deck, 100.0, 6.0)));

        scene.retire(deck).unwrap();
        assert_eq!(ticker.tick(&mut scene, 1.0), 0);
    }

    #[test]
    fn cancel_only_reports_running_animations() {
        let mut scene = MemoryScene::new();
        let deck = deck_at(&mut scene, 0.0);
        let mut ticker = Ticker::new();
        let id = ticker.register(Box::new(DeckEntry::new(deck, 100.0, 6.0)));

        assert!(ticker.cancel(id));
        assert!(!ticker.cancel(id));
        assert!(ticker.is_empty());
    }

    #[test]
    fn other_nodes_are_untouched() {
        let mut scene = MemoryScene::new();
        let deck = deck_at(&mut scene, 0.0);
        let other = deck_at(&mut scene, 10.0);
        let mut ticker = Ticker::new();
        ticker.register(Box::new(DeckEntry::new(deck, 100.0, 6.0)));

        ticker.tick(&mut scene, 3.0);
        assert_eq!(scene.position(other).unwrap().y, 10.0);
    }
}
