//! Orrery Core Data Structures
//!
//! This crate contains everything about a scene that does not touch the GPU:
//! - Scene: node arena with layers, transforms and an optional background
//! - Materials and meshes: handle-based CPU libraries
//! - Elements: typed sun/planet/model/light/skybox descriptions
//! - World: a scene document brought to life, with a clock driving motion

pub mod attributes;
pub mod capability;
pub mod document;
pub mod element;
pub mod light;
pub mod material;
pub mod mesh;
pub mod motion;
pub mod scene;
pub mod skybox;
pub mod types;
pub mod world;

pub use attributes::AttributeError;
pub use capability::{Lightable, Positionable, TagTestable};
pub use document::{CameraSpec, DocumentError, SceneDocument};
pub use element::{ElementId, ElementSpec};
pub use light::Light;
pub use material::{Material, MaterialHandle, MaterialKind, MaterialLibrary};
pub use mesh::{MeshData, MeshHandle, MeshLibrary, ModelData, ModelError};
pub use motion::{Clock, Motion, Orbit};
pub use scene::{Background, Layers, MeshNode, Node, NodeId, NodeKind, Scene, SceneError};
pub use skybox::{CubeMapData, CubeMapHandle, CubeMapLibrary, SkyboxError, SkyboxFaces, SkyboxSpec};
pub use types::{Color, Transform};
pub use world::World;
