//! Ambient and point lights

use serde::{Deserialize, Serialize};

use super::{AttachContext, Element, ElementError, ElementKind};
use crate::light::{DEFAULT_COLOR, DEFAULT_DECAY, DEFAULT_DISTANCE, DEFAULT_INTENSITY, Light};
use crate::scene::Node;
use crate::types::{Color, Transform};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AmbientLightSpec {
    pub color: Color,
    pub intensity: f32,
}

impl Default for AmbientLightSpec {
    fn default() -> Self {
        Self {
            color: Color::from_hex(DEFAULT_COLOR),
            intensity: DEFAULT_INTENSITY,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PointLightSpec {
    pub color: Color,
    pub intensity: f32,
    pub distance: f32,
    pub decay: f32,
    pub transform: Transform,
}

impl Default for PointLightSpec {
    fn default() -> Self {
        Self {
            color: Color::from_hex(DEFAULT_COLOR),
            intensity: DEFAULT_INTENSITY,
            distance: DEFAULT_DISTANCE,
            decay: DEFAULT_DECAY,
            transform: Transform::IDENTITY,
        }
    }
}

pub(super) fn attach_ambient(
    spec: &AmbientLightSpec,
    ctx: &mut AttachContext<'_>,
) -> Result<Element, ElementError> {
    let node = Node::light("ambient light", Light::ambient(spec.color, spec.intensity));
    let root = ctx.scene.add_node(None, node)?;
    Ok(Element::new(ElementKind::AmbientLight, "ambient light", Some(root)))
}

pub(super) fn attach_point(
    spec: &PointLightSpec,
    ctx: &mut AttachContext<'_>,
) -> Result<Element, ElementError> {
    let light = Light::point(spec.color, spec.intensity, spec.distance, spec.decay);
    let node = Node::light("point light", light).with_transform(spec.transform);
    let root = ctx.scene.add_node(None, node)?;
    Ok(Element::new(ElementKind::PointLight, "point light", Some(root)))
}
