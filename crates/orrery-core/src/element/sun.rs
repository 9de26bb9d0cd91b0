//! Sun: a glowing geodesic sphere

use serde::{Deserialize, Serialize};

use super::{AttachContext, Element, ElementError, ElementKind};
use crate::material::Material;
use crate::mesh::icosahedron;
use crate::scene::{GLOW_LAYER, Layers, Node};
use crate::types::{Color, Transform};

pub const DEFAULT_RADIUS: f32 = 20.0;
const DETAIL: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SunSpec {
    pub radius: f32,
    pub color: Color,
    pub transform: Transform,
}

impl Default for SunSpec {
    fn default() -> Self {
        Self {
            radius: DEFAULT_RADIUS,
            color: Color::WHITE,
            transform: Transform::IDENTITY,
        }
    }
}

pub(super) fn attach(spec: &SunSpec, ctx: &mut AttachContext<'_>) -> Result<Element, ElementError> {
    let mesh = ctx.meshes.add(icosahedron(spec.radius, DETAIL));
    let material = ctx.materials.add(Material::unlit("sun", spec.color));

    let mut layers = Layers::default();
    layers.toggle(GLOW_LAYER);

    let node = Node::mesh("sun", mesh, Some(material))
        .with_transform(spec.transform)
        .with_layers(layers);
    let root = ctx.scene.add_node(None, node)?;

    tracing::info!("Attached sun (radius {})", spec.radius);
    Ok(Element::new(ElementKind::Sun, "sun", Some(root)).with_resources(vec![mesh], vec![material]))
}
