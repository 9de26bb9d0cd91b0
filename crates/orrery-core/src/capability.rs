//! Small capability traits shared by scene entities.
//!
//! Instead of a light-is-a-node-is-an-element hierarchy, code that only
//! needs one facet of an entity asks for that facet.

use glam::Vec3;

use crate::light::Light;
use crate::scene::{Layers, Node};
use crate::types::{Color, Transform};

/// Something with a local transform.
pub trait Positionable {
    fn transform(&self) -> &Transform;
    fn transform_mut(&mut self) -> &mut Transform;

    fn position(&self) -> Vec3 {
        self.transform().position
    }

    fn set_position(&mut self, position: Vec3) {
        self.transform_mut().position = position;
    }

    fn set_rotation(&mut self, rotation: Vec3) {
        self.transform_mut().rotation = rotation;
    }

    fn set_scale(&mut self, scale: Vec3) {
        self.transform_mut().scale = scale;
    }
}

/// Something with layer membership.
pub trait TagTestable {
    fn layers(&self) -> &Layers;

    /// Returns true if this belongs to the glow layer.
    fn is_glowing(&self) -> bool {
        Layers::glow().test(self.layers())
    }
}

/// Something that emits light.
pub trait Lightable {
    fn light_color(&self) -> Color;
    fn light_intensity(&self) -> f32;
    fn set_light_color(&mut self, color: Color);
    fn set_light_intensity(&mut self, intensity: f32);
}

impl Positionable for Node {
    fn transform(&self) -> &Transform {
        &self.transform
    }

    fn transform_mut(&mut self) -> &mut Transform {
        &mut self.transform
    }
}

impl TagTestable for Node {
    fn layers(&self) -> &Layers {
        &self.layers
    }
}

impl Lightable for Light {
    fn light_color(&self) -> Color {
        self.color()
    }

    fn light_intensity(&self) -> f32 {
        self.intensity()
    }

    fn set_light_color(&mut self, color: Color) {
        self.set_color(color);
    }

    fn set_light_intensity(&mut self, intensity: f32) {
        self.set_intensity(intensity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::GLOW_LAYER;

    #[test]
    fn test_node_glow_query() {
        let mut node = Node::group("sun");
        assert!(!node.is_glowing());
        node.layers.toggle(GLOW_LAYER);
        assert!(node.is_glowing());
    }

    #[test]
    fn test_positionable_node() {
        let mut node = Node::group("planet");
        node.set_position(Vec3::new(1.0, 2.0, 3.0));
        node.set_scale(Vec3::splat(2.0));
        assert_eq!(node.position(), Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(node.transform.scale, Vec3::splat(2.0));
    }
}
