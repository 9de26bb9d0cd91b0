//! Models and planets (models that orbit)

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::{AttachContext, Element, ElementError, ElementKind};
use crate::material::{Material, MaterialHandle};
use crate::mesh::{MeshHandle, ModelData, load_model};
use crate::motion::{DEFAULT_ORBIT_PERIOD, DEFAULT_ORBIT_RADIUS, Motion, Orbit};
use crate::scene::{Node, NodeId};
use crate::types::Transform;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSpec {
    pub src: PathBuf,
    #[serde(default)]
    pub transform: Transform,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanetSpec {
    pub src: PathBuf,
    #[serde(default = "default_orbit_radius")]
    pub orbit_radius: f32,
    /// Seconds per revolution
    #[serde(default = "default_speed")]
    pub speed: f32,
    #[serde(default)]
    pub offset: f32,
    /// Position is driven by the orbit; rotation and scale apply as given.
    #[serde(default)]
    pub transform: Transform,
}

fn default_orbit_radius() -> f32 {
    DEFAULT_ORBIT_RADIUS
}

fn default_speed() -> f32 {
    DEFAULT_ORBIT_PERIOD
}

impl PlanetSpec {
    pub fn orbit(&self) -> Orbit {
        Orbit {
            radius: self.orbit_radius,
            period: self.speed,
            offset: self.offset,
        }
    }
}

pub(super) fn attach_model(
    spec: &ModelSpec,
    ctx: &mut AttachContext<'_>,
) -> Result<Element, ElementError> {
    let model = load_model(ctx.base_dir.join(&spec.src))?;
    let (root, meshes, materials) = instantiate(&model, spec.transform, ctx)?;
    Ok(Element::new(ElementKind::Model, model.name, Some(root)).with_resources(meshes, materials))
}

pub(super) fn attach_planet(
    spec: &PlanetSpec,
    ctx: &mut AttachContext<'_>,
) -> Result<Element, ElementError> {
    let model = load_model(ctx.base_dir.join(&spec.src))?;
    let orbit = spec.orbit();
    let transform = Transform {
        position: orbit.position_at(0.0),
        ..spec.transform
    };
    let (root, meshes, materials) = instantiate(&model, transform, ctx)?;

    tracing::info!(
        "Attached planet {} (orbit radius {}, {}s per revolution)",
        model.name,
        orbit.radius,
        orbit.period
    );
    Ok(Element::new(ElementKind::Planet, model.name, Some(root))
        .with_motion(Motion::Orbit(orbit))
        .with_resources(meshes, materials))
}

/// Adds a group node for the model with one mesh child per primitive.
fn instantiate(
    model: &ModelData,
    transform: Transform,
    ctx: &mut AttachContext<'_>,
) -> Result<(NodeId, Vec<MeshHandle>, Vec<MaterialHandle>), ElementError> {
    let root = ctx
        .scene
        .add_node(None, Node::group(&model.name).with_transform(transform))?;

    let mut meshes = Vec::with_capacity(model.primitives.len());
    let mut materials = Vec::with_capacity(model.primitives.len());
    for primitive in &model.primitives {
        let mesh = ctx.meshes.add(primitive.mesh.clone());
        let material = ctx.materials.add(
            Material::lit(&primitive.name, primitive.color).with_emissive(primitive.emissive),
        );
        let node = Node::mesh(&primitive.name, mesh, Some(material))
            .with_transform(Transform::from_mat4(primitive.transform))
            .with_cast_shadow(true);
        ctx.scene.add_node(Some(root), node)?;
        meshes.push(mesh);
        materials.push(material);
    }

    Ok((root, meshes, materials))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::ElementSpec;

    #[test]
    fn test_planet_spec_defaults() {
        let spec: ElementSpec = ron::from_str(r#"Planet((src: "earth.glb"))"#).unwrap();
        let ElementSpec::Planet(planet) = spec else {
            panic!("expected a planet");
        };
        assert_eq!(planet.orbit_radius, 404.0);
        assert_eq!(planet.speed, 20.0);
        assert_eq!(planet.offset, 0.0);
        assert_eq!(planet.transform, Transform::IDENTITY);
    }

    #[test]
    fn test_model_requires_src() {
        let result: Result<ElementSpec, _> = ron::from_str("Model(())");
        assert!(result.is_err());
    }
}
