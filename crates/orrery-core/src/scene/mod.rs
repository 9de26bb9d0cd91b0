//! Scene graph.
//!
//! Nodes live in an arena keyed by [`NodeId`]; parent/child links are stored on
//! the nodes themselves. The scene is the single source of truth for what gets
//! drawn, and the renderer only ever reads it (or, during the bloom pass,
//! temporarily swaps materials on it).

mod layers;
mod node;

pub use layers::*;
pub use node::*;

use std::collections::HashMap;

use glam::Mat4;

use crate::skybox::CubeMapHandle;

/// Scene background drawn behind all geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Background {
    CubeMap(CubeMapHandle),
}

/// Scene graph errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum SceneError {
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),
}

/// Scene containing all nodes.
pub struct Scene {
    nodes: HashMap<NodeId, Node>,
    roots: Vec<NodeId>,
    background: Option<Background>,
}

impl Scene {
    /// Creates a new empty scene.
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
            roots: Vec::new(),
            background: None,
        }
    }

    /// Adds a node under `parent`, or as a root when `parent` is `None`.
    pub fn add_node(&mut self, parent: Option<NodeId>, mut node: Node) -> Result<NodeId, SceneError> {
        let id = node.id;
        match parent {
            Some(parent_id) => {
                let parent_node = self
                    .nodes
                    .get_mut(&parent_id)
                    .ok_or(SceneError::NodeNotFound(parent_id))?;
                parent_node.children.push(id);
                node.parent = Some(parent_id);
            }
            None => {
                node.parent = None;
                self.roots.push(id);
            }
        }
        self.nodes.insert(id, node);
        Ok(id)
    }

    /// Removes a node and all of its descendants.
    ///
    /// Returns the removed nodes, the requested one first.
    pub fn remove_node(&mut self, id: NodeId) -> Result<Vec<Node>, SceneError> {
        let node = self.nodes.get(&id).ok_or(SceneError::NodeNotFound(id))?;
        match node.parent {
            Some(parent_id) => {
                if let Some(parent) = self.nodes.get_mut(&parent_id) {
                    parent.children.retain(|child| *child != id);
                }
            }
            None => self.roots.retain(|root| *root != id),
        }

        // Collect all descendants
        let mut to_remove = vec![id];
        let mut i = 0;
        while i < to_remove.len() {
            if let Some(node) = self.nodes.get(&to_remove[i]) {
                to_remove.extend(node.children.iter().copied());
            }
            i += 1;
        }

        Ok(to_remove
            .into_iter()
            .filter_map(|node_id| self.nodes.remove(&node_id))
            .collect())
    }

    /// Gets a node by ID.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    /// Gets a mutable reference to a node by ID.
    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    /// Returns true if the scene contains a node with the given ID.
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Root node IDs in insertion order.
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Returns the number of nodes in the scene.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the scene is empty.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns the number of mesh nodes.
    pub fn mesh_count(&self) -> usize {
        self.nodes.values().filter(|n| n.is_mesh()).count()
    }

    /// Clears all nodes and the background.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.roots.clear();
        self.background = None;
    }

    pub fn background(&self) -> Option<Background> {
        self.background
    }

    pub fn set_background(&mut self, background: Option<Background>) {
        self.background = background;
    }

    /// Removes the background, returning what was set.
    pub fn take_background(&mut self) -> Option<Background> {
        self.background.take()
    }

    /// Node IDs in depth-first pre-order, roots in insertion order.
    pub fn traversal_order(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<NodeId> = self.roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            if let Some(node) = self.nodes.get(&id) {
                order.push(id);
                stack.extend(node.children.iter().rev().copied());
            }
        }
        order
    }

    /// Visits every node depth-first, parents before children.
    pub fn traverse(&self, mut f: impl FnMut(&Node)) {
        for id in self.traversal_order() {
            if let Some(node) = self.nodes.get(&id) {
                f(node);
            }
        }
    }

    /// Mutable variant of [`Scene::traverse`].
    pub fn traverse_mut(&mut self, mut f: impl FnMut(&mut Node)) {
        for id in self.traversal_order() {
            if let Some(node) = self.nodes.get_mut(&id) {
                f(node);
            }
        }
    }

    /// World transform of a node (parent chain applied).
    pub fn world_transform(&self, id: NodeId) -> Option<Mat4> {
        let mut node = self.nodes.get(&id)?;
        let mut matrix = node.transform.to_mat4();
        while let Some(parent_id) = node.parent {
            node = self.nodes.get(&parent_id)?;
            matrix = node.transform.to_mat4() * matrix;
        }
        Some(matrix)
    }

    /// World transforms of all nodes, computed in one traversal.
    pub fn world_transforms(&self) -> HashMap<NodeId, Mat4> {
        let mut result = HashMap::with_capacity(self.nodes.len());
        for id in self.traversal_order() {
            let Some(node) = self.nodes.get(&id) else {
                continue;
            };
            let parent_matrix = node
                .parent
                .and_then(|p| result.get(&p).copied())
                .unwrap_or(Mat4::IDENTITY);
            result.insert(id, parent_matrix * node.transform.to_mat4());
        }
        result
    }

    /// Returns true if the node and all its ancestors are visible.
    pub fn is_visible(&self, id: NodeId) -> bool {
        let mut current = self.nodes.get(&id);
        while let Some(node) = current {
            if !node.visible {
                return false;
            }
            current = node.parent.and_then(|p| self.nodes.get(&p));
        }
        true
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::MeshHandle;
    use crate::types::Transform;
    use glam::Vec3;

    #[test]
    fn test_add_and_traverse_order() {
        let mut scene = Scene::new();
        let a = scene.add_node(None, Node::group("a")).unwrap();
        let b = scene.add_node(None, Node::group("b")).unwrap();
        let a1 = scene.add_node(Some(a), Node::group("a1")).unwrap();
        let a2 = scene.add_node(Some(a), Node::group("a2")).unwrap();
        let a1x = scene.add_node(Some(a1), Node::group("a1x")).unwrap();

        assert_eq!(scene.traversal_order(), vec![a, a1, a1x, a2, b]);

        let mut names = Vec::new();
        scene.traverse(|n| names.push(n.name.clone()));
        assert_eq!(names, vec!["a", "a1", "a1x", "a2", "b"]);
    }

    #[test]
    fn test_add_to_missing_parent() {
        let mut scene = Scene::new();
        let result = scene.add_node(Some(NodeId::new()), Node::group("orphan"));
        assert!(matches!(result, Err(SceneError::NodeNotFound(_))));
        assert!(scene.is_empty());
    }

    #[test]
    fn test_remove_node_recursive() {
        let mut scene = Scene::new();
        let root = scene.add_node(None, Node::group("root")).unwrap();
        let child = scene.add_node(Some(root), Node::group("child")).unwrap();
        scene.add_node(Some(child), Node::group("grandchild")).unwrap();
        let other = scene.add_node(None, Node::group("other")).unwrap();

        let removed = scene.remove_node(root).unwrap();
        assert_eq!(removed.len(), 3);
        assert_eq!(removed[0].id, root);
        assert_eq!(scene.len(), 1);
        assert_eq!(scene.roots(), &[other]);
    }

    #[test]
    fn test_remove_child_detaches_from_parent() {
        let mut scene = Scene::new();
        let root = scene.add_node(None, Node::group("root")).unwrap();
        let child = scene.add_node(Some(root), Node::group("child")).unwrap();

        scene.remove_node(child).unwrap();
        assert!(scene.node(root).unwrap().children().is_empty());
    }

    #[test]
    fn test_world_transform_chain() {
        let mut scene = Scene::new();
        let parent = scene
            .add_node(
                None,
                Node::group("parent").with_transform(Transform::from_position(Vec3::X * 10.0)),
            )
            .unwrap();
        let child = scene
            .add_node(
                Some(parent),
                Node::mesh("child", MeshHandle::from_raw(1), None)
                    .with_transform(Transform::from_position(Vec3::Y)),
            )
            .unwrap();

        let p = scene.world_transform(child).unwrap().transform_point3(Vec3::ZERO);
        assert_eq!(p, Vec3::new(10.0, 1.0, 0.0));

        let all = scene.world_transforms();
        assert_eq!(all[&child].transform_point3(Vec3::ZERO), p);
    }

    #[test]
    fn test_visibility_inherits() {
        let mut scene = Scene::new();
        let parent = scene.add_node(None, Node::group("parent")).unwrap();
        let child = scene.add_node(Some(parent), Node::group("child")).unwrap();
        assert!(scene.is_visible(child));

        scene.node_mut(parent).unwrap().visible = false;
        assert!(!scene.is_visible(child));
    }

    #[test]
    fn test_take_background() {
        let mut scene = Scene::new();
        let bg = Background::CubeMap(CubeMapHandle::from_raw(3));
        scene.set_background(Some(bg));
        assert_eq!(scene.take_background(), Some(bg));
        assert_eq!(scene.background(), None);
    }
}
