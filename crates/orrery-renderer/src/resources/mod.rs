//! GPU copies of the scene's CPU resources.
//!
//! Each cache mirrors one core library by handle: new entries are uploaded,
//! entries gone from the library are dropped.

mod cube_map;
mod light;
mod mesh;

pub use cube_map::{CubeMapCache, GpuCubeMap};
pub use light::{LightsUniform, MAX_POINT_LIGHTS, PointLightUniform, collect_lights};
pub use mesh::{GpuMesh, MeshCache, MeshVertex};
