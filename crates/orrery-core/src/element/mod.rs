//! Scene elements.
//!
//! An element is the unit a scene document is written in: a sun, a model, a
//! planet, a light or a skybox. Each [`ElementSpec`] is plain typed data; it is
//! attached to a world (creating nodes, meshes and materials), can be updated
//! through string attributes, and detached again (releasing everything it
//! created).

mod light;
mod model;
mod skybox;
mod sun;

pub use light::{AmbientLightSpec, PointLightSpec};
pub use model::{ModelSpec, PlanetSpec};
pub use sun::SunSpec;

use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::attributes::{self, AttributeError};
use crate::capability::{Lightable, Positionable};
use crate::light::Light;
use crate::material::{MaterialHandle, MaterialLibrary};
use crate::mesh::{MeshHandle, MeshLibrary, ModelError};
use crate::motion::Motion;
use crate::scene::{NodeId, Scene, SceneError};
use crate::skybox::{CubeMapHandle, CubeMapLibrary, SkyboxError, SkyboxSpec};

/// Identifies an attached element within a world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementId(Uuid);

impl ElementId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ElementId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Typed description of one element in a scene document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ElementSpec {
    Sun(SunSpec),
    Model(ModelSpec),
    Planet(PlanetSpec),
    AmbientLight(AmbientLightSpec),
    PointLight(PointLightSpec),
    Skybox(SkyboxSpec),
}

impl ElementSpec {
    /// Creates this element's nodes and resources.
    pub fn attach(&self, ctx: &mut AttachContext<'_>) -> Result<Element, ElementError> {
        match self {
            ElementSpec::Sun(spec) => sun::attach(spec, ctx),
            ElementSpec::Model(spec) => model::attach_model(spec, ctx),
            ElementSpec::Planet(spec) => model::attach_planet(spec, ctx),
            ElementSpec::AmbientLight(spec) => light::attach_ambient(spec, ctx),
            ElementSpec::PointLight(spec) => light::attach_point(spec, ctx),
            ElementSpec::Skybox(spec) => skybox::attach(spec, ctx),
        }
    }

    pub fn kind(&self) -> ElementKind {
        match self {
            ElementSpec::Sun(_) => ElementKind::Sun,
            ElementSpec::Model(_) => ElementKind::Model,
            ElementSpec::Planet(_) => ElementKind::Planet,
            ElementSpec::AmbientLight(_) => ElementKind::AmbientLight,
            ElementSpec::PointLight(_) => ElementKind::PointLight,
            ElementSpec::Skybox(_) => ElementKind::Skybox,
        }
    }
}

/// Mutable world state an element attaches into.
pub struct AttachContext<'a> {
    pub scene: &'a mut Scene,
    pub materials: &'a mut MaterialLibrary,
    pub meshes: &'a mut MeshLibrary,
    pub cube_maps: &'a mut CubeMapLibrary,
    /// Directory relative asset paths resolve against
    pub base_dir: &'a Path,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Sun,
    Model,
    Planet,
    AmbientLight,
    PointLight,
    Skybox,
}

impl ElementKind {
    pub fn tag(&self) -> &'static str {
        match self {
            ElementKind::Sun => "sun",
            ElementKind::Model => "model",
            ElementKind::Planet => "planet",
            ElementKind::AmbientLight => "ambient-light",
            ElementKind::PointLight => "point-light",
            ElementKind::Skybox => "skybox",
        }
    }

    /// Attribute names accepted by [`Element::update_attribute`].
    pub fn attribute_names(&self) -> &'static [&'static str] {
        match self {
            ElementKind::Sun | ElementKind::Model => &["position", "rotation", "scale"],
            ElementKind::Planet => &["position", "rotation", "scale", "orbit-radius", "speed", "offset"],
            ElementKind::AmbientLight => &["position", "rotation", "scale", "color", "intensity"],
            ElementKind::PointLight => &[
                "position",
                "rotation",
                "scale",
                "color",
                "intensity",
                "distance",
                "decay",
            ],
            ElementKind::Skybox => &[],
        }
    }
}

/// Element attach/update/detach errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum ElementError {
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error(transparent)]
    Skybox(#[from] SkyboxError),
    #[error(transparent)]
    Scene(#[from] SceneError),
    #[error(transparent)]
    Attribute(#[from] AttributeError),
    #[error("Element not found: {0}")]
    NotFound(ElementId),
}

/// An element attached to a world.
#[derive(Debug, Clone)]
pub struct Element {
    id: ElementId,
    kind: ElementKind,
    name: String,
    root: Option<NodeId>,
    motion: Motion,
    meshes: Vec<MeshHandle>,
    materials: Vec<MaterialHandle>,
    cube_map: Option<CubeMapHandle>,
}

impl Element {
    pub(crate) fn new(kind: ElementKind, name: impl Into<String>, root: Option<NodeId>) -> Self {
        Self {
            id: ElementId::new(),
            kind,
            name: name.into(),
            root,
            motion: Motion::Static,
            meshes: Vec::new(),
            materials: Vec::new(),
            cube_map: None,
        }
    }

    pub(crate) fn with_motion(mut self, motion: Motion) -> Self {
        self.motion = motion;
        self
    }

    pub(crate) fn with_resources(
        mut self,
        meshes: Vec<MeshHandle>,
        materials: Vec<MaterialHandle>,
    ) -> Self {
        self.meshes = meshes;
        self.materials = materials;
        self
    }

    pub(crate) fn with_cube_map(mut self, cube_map: CubeMapHandle) -> Self {
        self.cube_map = Some(cube_map);
        self
    }

    pub fn id(&self) -> ElementId {
        self.id
    }

    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Node holding this element's transform, if it has one.
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn motion(&self) -> &Motion {
        &self.motion
    }

    pub fn cube_map(&self) -> Option<CubeMapHandle> {
        self.cube_map
    }

    /// Moves the element along its motion path.
    pub fn apply_motion(&self, scene: &mut Scene, elapsed: f32) {
        let (Some(position), Some(root)) = (self.motion.position_at(elapsed), self.root) else {
            return;
        };
        if let Some(node) = scene.node_mut(root) {
            node.set_position(position);
        }
    }

    /// Applies a string attribute update.
    ///
    /// Invalid values are rejected and leave the element unchanged.
    pub fn update_attribute(
        &mut self,
        scene: &mut Scene,
        name: &str,
        value: &str,
    ) -> Result<(), AttributeError> {
        if !self.kind.attribute_names().iter().any(|n| *n == name) {
            return Err(AttributeError::Unknown(name.to_string()));
        }

        match name {
            "position" | "rotation" | "scale" => {
                let v = attributes::parse_vec3(value)
                    .ok_or_else(|| AttributeError::invalid(name, value))?;
                let node = self
                    .root
                    .and_then(|root| scene.node_mut(root))
                    .ok_or_else(|| AttributeError::Unknown(name.to_string()))?;
                match name {
                    "position" => node.set_position(v),
                    "rotation" => node.set_rotation(v),
                    _ => node.set_scale(v),
                }
            }
            "orbit-radius" | "speed" | "offset" => {
                let v = attributes::parse_number(value)
                    .ok_or_else(|| AttributeError::invalid(name, value))?;
                let Motion::Orbit(orbit) = &mut self.motion else {
                    return Err(AttributeError::Unknown(name.to_string()));
                };
                match name {
                    "orbit-radius" => orbit.radius = v,
                    "speed" => orbit.period = v,
                    _ => orbit.offset = v,
                }
            }
            _ => {
                let light = self
                    .root
                    .and_then(|root| scene.node_mut(root))
                    .and_then(|node| node.as_light_mut())
                    .ok_or_else(|| AttributeError::Unknown(name.to_string()))?;
                update_light_attribute(light, name, value)?;
            }
        }

        tracing::debug!("{} {}: {} = {}", self.kind.tag(), self.name, name, value);
        Ok(())
    }

    /// Current attribute values, formatted the way they are parsed.
    pub fn attributes(&self, scene: &Scene) -> Vec<(&'static str, String)> {
        let node = self.root.and_then(|root| scene.node(root));
        self.kind
            .attribute_names()
            .iter()
            .filter_map(|&name| {
                let value = match name {
                    "position" => node.map(|n| format_vec3(n.transform.position)),
                    "rotation" => node.map(|n| format_vec3(n.transform.rotation)),
                    "scale" => node.map(|n| format_vec3(n.transform.scale)),
                    "orbit-radius" | "speed" | "offset" => match &self.motion {
                        Motion::Orbit(orbit) => Some(
                            match name {
                                "orbit-radius" => orbit.radius,
                                "speed" => orbit.period,
                                _ => orbit.offset,
                            }
                            .to_string(),
                        ),
                        Motion::Static => None,
                    },
                    _ => node
                        .and_then(|n| n.as_light())
                        .and_then(|light| light_attribute(light, name)),
                };
                value.map(|v| (name, v))
            })
            .collect()
    }

    /// Removes the element's nodes and releases its resources.
    pub fn detach(self, ctx: &mut AttachContext<'_>) -> Result<(), ElementError> {
        if let Some(root) = self.root {
            ctx.scene.remove_node(root)?;
        }
        for mesh in &self.meshes {
            ctx.meshes.remove(*mesh);
        }
        for material in &self.materials {
            ctx.materials.remove(*material);
        }
        if let Some(cube_map) = self.cube_map {
            ctx.cube_maps.remove(cube_map);
            if ctx.scene.background() == Some(crate::scene::Background::CubeMap(cube_map)) {
                ctx.scene.set_background(None);
            }
        }
        tracing::info!("Detached {} '{}'", self.kind.tag(), self.name);
        Ok(())
    }
}

fn update_light_attribute(light: &mut Light, name: &str, value: &str) -> Result<(), AttributeError> {
    match name {
        "color" => {
            let color =
                attributes::parse_color(value).ok_or_else(|| AttributeError::invalid(name, value))?;
            light.set_light_color(color);
        }
        "intensity" => {
            let v = attributes::parse_number(value)
                .ok_or_else(|| AttributeError::invalid(name, value))?;
            light.set_light_intensity(v);
        }
        "distance" | "decay" => {
            let v = attributes::parse_number(value)
                .ok_or_else(|| AttributeError::invalid(name, value))?;
            let Light::Point {
                distance, decay, ..
            } = light
            else {
                return Err(AttributeError::Unknown(name.to_string()));
            };
            if name == "distance" {
                *distance = v;
            } else {
                *decay = v;
            }
        }
        _ => return Err(AttributeError::Unknown(name.to_string())),
    }
    Ok(())
}

fn light_attribute(light: &Light, name: &str) -> Option<String> {
    match (name, light) {
        ("color", _) => Some(format!("0x{:06X}", light.light_color().to_hex())),
        ("intensity", _) => Some(light.light_intensity().to_string()),
        ("distance", Light::Point { distance, .. }) => Some(distance.to_string()),
        ("decay", Light::Point { decay, .. }) => Some(decay.to_string()),
        _ => None,
    }
}

fn format_vec3(v: Vec3) -> String {
    format!("{} {} {}", v.x, v.y, v.z)
}
