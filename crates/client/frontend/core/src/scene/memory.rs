//! Headless scene used by the replay host and by tests.
use game_core::{ActionTarget, Placement};

use super::{NodeId, Scene, SceneError, Visual};

#[derive(Clone, Debug, PartialEq)]
pub struct SceneNode {
    pub id: NodeId,
    pub visual: Visual,
    pub placement: Placement,
    pub binding: Option<ActionTarget>,
}

/// In-memory scene graph. The node list is kept in paint order.
#[derive(Clone, Debug, Default)]
pub struct MemoryScene {
    nodes: Vec<SceneNode>,
    next_id: u64,
    inserted: u64,
    retired: u64,
    /// Inserts still allowed before the scene starts rejecting them.
    insert_budget: Option<u64>,
}

impl MemoryScene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Nodes in paint order, bottom first.
    pub fn nodes(&self) -> impl Iterator<Item = &SceneNode> {
        self.nodes.iter()
    }

    pub fn node(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.iter().find(|node| node.id == id)
    }

    /// Paint order of a node; higher values are drawn on top.
    pub fn z_index(&self, id: NodeId) -> Option<usize> {
        self.nodes.iter().position(|node| node.id == id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes currently clickable, in paint order.
    pub fn interactive(&self) -> impl Iterator<Item = &SceneNode> {
        self.nodes.iter().filter(|node| node.binding.is_some())
    }

    /// Lifetime insert and retire counts.
    pub fn churn(&self) -> (u64, u64) {
        (self.inserted, self.retired)
    }

    /// Make subsequent inserts fail, emulating a host that cannot build a node.
    pub fn set_reject_inserts(&mut self, reject: bool) {
        self.insert_budget = reject.then_some(0);
    }

    /// Accept `count` more inserts, then reject every later one.
    pub fn reject_inserts_after(&mut self, count: u64) {
        self.insert_budget = Some(count);
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut SceneNode, SceneError> {
        self.nodes
            .iter_mut()
            .find(|node| node.id == id)
            .ok_or(SceneError::UnknownNode(id))
    }
}

impl Scene for MemoryScene {
    fn insert(&mut self, visual: Visual, placement: Placement) -> Result<NodeId, SceneError> {
        if let Some(budget) = self.insert_budget.as_mut() {
            if *budget == 0 {
                return Err(SceneError::Rejected {
                    visual: visual.to_string(),
                    reason: "inserts disabled".to_owned(),
                });
            }
            *budget -= 1;
        }

        self.next_id += 1;
        self.inserted += 1;
        let id = NodeId(self.next_id);
        self.nodes.push(SceneNode {
            id,
            visual,
            placement,
            binding: None,
        });
        Ok(id)
    }

    fn retire(&mut self, node: NodeId) -> Result<(), SceneError> {
        let index = self
            .z_index(node)
            .ok_or(SceneError::UnknownNode(node))?;
        self.nodes.remove(index);
        self.retired += 1;
        Ok(())
    }

    fn set_position(&mut self, node: NodeId, x: f32, y: f32) -> Result<(), SceneError> {
        let node = self.node_mut(node)?;
        node.placement.x = x;
        node.placement.y = y;
        Ok(())
    }

    fn set_binding(
        &mut self,
        node: NodeId,
        binding: Option<ActionTarget>,
    ) -> Result<(), SceneError> {
        self.node_mut(node)?.binding = binding;
        Ok(())
    }

    fn position(&self, node: NodeId) -> Option<Placement> {
        self.node(node).map(|node| node.placement)
    }

    fn binding(&self, node: NodeId) -> Option<ActionTarget> {
        self.node(node).and_then(|node| node.binding)
    }

    fn is_visible(&self, node: NodeId) -> bool {
        self.node(node).is_some()
    }
}

#[cfg(test)]
mod tests {
    use game_core::CardCode;

    use super::*;

    #[test]
    fn later_inserts_paint_on_top() {
        let mut scene = MemoryScene::new();
        let a = scene
            .insert(Visual::Card(CardCode::BACK), Placement::default())
            .unwrap();
        let b = scene
            .insert(Visual::Label("x: 0".into()), Placement::default())
            .unwrap();

        assert!(scene.z_index(a) < scene.z_index(b));
        scene.retire(a).unwrap();
        assert!(!scene.is_visible(a));
        assert_eq!(scene.z_index(b), Some(0));
        assert_eq!(scene.churn(), (2, 1));
    }

    #[test]
    fn unknown_nodes_are_reported() {
        let mut scene = MemoryScene::new();
        let ghost = NodeId(42);
        assert_eq!(scene.retire(ghost), Err(SceneError::UnknownNode(ghost)));
        assert_eq!(
            scene.set_binding(ghost, Some(ActionTarget::Deck)),
            Err(SceneError::UnknownNode(ghost))
        );
        assert!(scene.position(ghost).is_none());
    }

    #[test]
    fn rejected_inserts_leave_the_scene_untouched() {
        let mut scene = MemoryScene::new();
        scene.set_reject_inserts(true);
        assert!(matches!(
            scene.insert(Visual::Card(CardCode::BACK), Placement::default()),
            Err(SceneError::Rejected { .. })
        ));
        assert!(scene.is_empty());
    }

    #[test]
    fn insert_budget_runs_out() {
        let mut scene = MemoryScene::new();
        scene.reject_inserts_after(1);
        assert!(scene.insert(Visual::Card(CardCode::BACK), Placement::default()).is_ok());
        assert!(scene.insert(Visual::Card(CardCode::BACK), Placement::default()).is_err());
        assert_eq!(scene.len(), 1);
    }
}
