//! Material swap record and the darkened-scene guard.

use std::collections::HashMap;

use orrery_core::{Background, MaterialHandle, NodeId, Scene, TagTestable};

/// Original materials of nodes darkened for the bloom pass.
///
/// Lives as long as the compositor and is drained at the end of every bloom
/// pass, so it is empty between frames.
#[derive(Debug, Default)]
pub struct SwapRecord {
    originals: HashMap<NodeId, MaterialHandle>,
}

impl SwapRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.originals.is_empty()
    }

    pub fn len(&self) -> usize {
        self.originals.len()
    }

    /// Original material of a darkened node.
    pub fn original(&self, id: NodeId) -> Option<MaterialHandle> {
        self.originals.get(&id).copied()
    }
}

/// A scene with every non-glowing mesh darkened and the background removed.
///
/// Holds the scene's only mutable borrow, so a second darken cannot start
/// before this one is dropped. Dropping restores materials and background,
/// including when a bloom pass returns early with an error.
pub struct DarkenedScene<'a> {
    scene: &'a mut Scene,
    swap: &'a mut SwapRecord,
    background: Option<Background>,
}

impl<'a> DarkenedScene<'a> {
    pub fn darken(scene: &'a mut Scene, swap: &'a mut SwapRecord, dark: MaterialHandle) -> Self {
        debug_assert!(swap.is_empty(), "swap record not drained by the previous frame");

        let originals = &mut swap.originals;
        scene.traverse_mut(|node| {
            if node.is_glowing() {
                return;
            }
            let id = node.id;
            if let Some(mesh) = node.as_mesh_mut() {
                // Meshes without a material draw nothing and are left alone
                if let Some(material) = mesh.material {
                    originals.insert(id, material);
                    mesh.material = Some(dark);
                }
            }
        });
        let background = scene.take_background();

        tracing::trace!("Darkened {} meshes for bloom", swap.len());
        Self {
            scene,
            swap,
            background,
        }
    }

    pub fn scene(&self) -> &Scene {
        self.scene
    }

    pub fn darkened_count(&self) -> usize {
        self.swap.len()
    }
}

impl Drop for DarkenedScene<'_> {
    fn drop(&mut self) {
        for (id, material) in self.swap.originals.drain() {
            if let Some(mesh) = self.scene.node_mut(id).and_then(|n| n.as_mesh_mut()) {
                mesh.material = Some(material);
            }
        }
        self.scene.set_background(self.background.take());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orrery_core::{Layers, MaterialLibrary, MeshHandle, Node};

    #[test]
    fn test_darken_and_restore() {
        let materials = MaterialLibrary::new();
        let mut scene = Scene::new();
        let lit = MaterialHandle::from_raw(42);
        let plain = scene
            .add_node(None, Node::mesh("plain", MeshHandle::from_raw(1), Some(lit)))
            .unwrap();
        let bare = scene
            .add_node(None, Node::mesh("bare", MeshHandle::from_raw(2), None))
            .unwrap();
        let glow = scene
            .add_node(
                None,
                Node::mesh("glow", MeshHandle::from_raw(3), Some(lit)).with_layers(Layers::glow()),
            )
            .unwrap();

        let mut swap = SwapRecord::new();
        {
            let darkened = DarkenedScene::darken(&mut scene, &mut swap, materials.dark());
            assert_eq!(darkened.darkened_count(), 1);
            let scene = darkened.scene();
            assert_eq!(scene.node(plain).unwrap().material(), Some(materials.dark()));
            assert_eq!(scene.node(bare).unwrap().material(), None);
            assert_eq!(scene.node(glow).unwrap().material(), Some(lit));
        }

        assert!(swap.is_empty());
        assert_eq!(scene.node(plain).unwrap().material(), Some(lit));
        assert_eq!(scene.node(bare).unwrap().material(), None);
    }
}
