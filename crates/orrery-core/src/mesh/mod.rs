//! Mesh data, the mesh library and model file loading (glTF, OBJ)

mod gltf;
mod obj;
mod primitives;

use std::collections::HashMap;
use std::path::Path;

use glam::{Mat4, Vec3};

use crate::types::Color;

pub use self::gltf::load_gltf;
pub use obj::load_obj;
pub use primitives::icosahedron;

/// Handle to a mesh stored in a [`MeshLibrary`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct MeshHandle(u64);

impl MeshHandle {
    /// Returns the raw handle value.
    pub fn raw(&self) -> u64 {
        self.0
    }

    /// Creates a handle from a raw value.
    pub fn from_raw(value: u64) -> Self {
        Self(value)
    }
}

/// Indexed triangle mesh on the CPU.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub positions: Vec<[f32; 3]>,
    /// One normal per position
    pub normals: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
}

impl MeshData {
    /// Creates mesh data, computing smooth normals when none are supplied.
    pub fn new(positions: Vec<[f32; 3]>, normals: Vec<[f32; 3]>, indices: Vec<u32>) -> Self {
        let normals = if normals.len() == positions.len() {
            normals
        } else {
            compute_vertex_normals(&positions, &indices)
        };
        Self {
            positions,
            normals,
            indices,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty() || self.indices.is_empty()
    }

    /// Axis-aligned bounds as (min, max), or `None` for an empty mesh.
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        if self.positions.is_empty() {
            return None;
        }
        let mut min = Vec3::splat(f32::INFINITY);
        let mut max = Vec3::splat(f32::NEG_INFINITY);
        for p in &self.positions {
            let p = Vec3::from(*p);
            min = min.min(p);
            max = max.max(p);
        }
        Some((min, max))
    }
}

/// Smooth per-vertex normals from area-weighted face normals.
pub fn compute_vertex_normals(positions: &[[f32; 3]], indices: &[u32]) -> Vec<[f32; 3]> {
    let mut accum = vec![Vec3::ZERO; positions.len()];
    for tri in indices.chunks_exact(3) {
        let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        if a >= positions.len() || b >= positions.len() || c >= positions.len() {
            continue;
        }
        let (pa, pb, pc) = (
            Vec3::from(positions[a]),
            Vec3::from(positions[b]),
            Vec3::from(positions[c]),
        );
        let face = (pb - pa).cross(pc - pa);
        accum[a] += face;
        accum[b] += face;
        accum[c] += face;
    }
    accum
        .into_iter()
        .map(|n| n.try_normalize().unwrap_or(Vec3::Y).to_array())
        .collect()
}

/// Owns all CPU meshes of a world.
pub struct MeshLibrary {
    meshes: HashMap<MeshHandle, MeshData>,
    next_handle: u64,
}

impl MeshLibrary {
    pub fn new() -> Self {
        Self {
            meshes: HashMap::new(),
            next_handle: 1,
        }
    }

    pub fn add(&mut self, mesh: MeshData) -> MeshHandle {
        let handle = MeshHandle(self.next_handle);
        self.next_handle += 1;
        self.meshes.insert(handle, mesh);
        handle
    }

    pub fn get(&self, handle: MeshHandle) -> Option<&MeshData> {
        self.meshes.get(&handle)
    }

    pub fn remove(&mut self, handle: MeshHandle) -> Option<MeshData> {
        self.meshes.remove(&handle)
    }

    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (MeshHandle, &MeshData)> {
        self.meshes.iter().map(|(h, m)| (*h, m))
    }
}

impl Default for MeshLibrary {
    fn default() -> Self {
        Self::new()
    }
}

/// One drawable piece of a loaded model.
#[derive(Debug, Clone)]
pub struct ModelPrimitive {
    pub name: String,
    pub mesh: MeshData,
    /// Transform relative to the model root
    pub transform: Mat4,
    pub color: Color,
    pub emissive: Color,
}

/// A model file flattened into primitives.
#[derive(Debug, Clone, Default)]
pub struct ModelData {
    pub name: String,
    pub primitives: Vec<ModelPrimitive>,
}

/// Detect model format from file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelFormat {
    Gltf,
    Obj,
    Unknown,
}

impl ModelFormat {
    /// Detect format from file path
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|s| s.to_lowercase())
            .as_deref()
        {
            Some("gltf") | Some("glb") => ModelFormat::Gltf,
            Some("obj") => ModelFormat::Obj,
            _ => ModelFormat::Unknown,
        }
    }

    /// Get format name
    pub fn name(&self) -> &'static str {
        match self {
            ModelFormat::Gltf => "glTF",
            ModelFormat::Obj => "OBJ",
            ModelFormat::Unknown => "Unknown",
        }
    }
}

/// Load any supported model format
pub fn load_model(path: impl AsRef<Path>) -> Result<ModelData, ModelError> {
    let path = path.as_ref();
    let model = match ModelFormat::from_path(path) {
        ModelFormat::Gltf => load_gltf(path)?,
        ModelFormat::Obj => load_obj(path)?,
        ModelFormat::Unknown => {
            return Err(ModelError::UnsupportedFormat(
                path.extension()
                    .and_then(|e| e.to_str())
                    .unwrap_or("unknown")
                    .to_string(),
            ));
        }
    };

    if model.primitives.is_empty() {
        return Err(ModelError::EmptyModel(path.display().to_string()));
    }

    tracing::info!(
        "Loaded model {} ({} primitives)",
        path.display(),
        model.primitives.len()
    );
    Ok(model)
}

pub(crate) fn model_name(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("unnamed")
        .to_string()
}

/// Model-loading errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum ModelError {
    #[error("error while loading {path}: {reason}")]
    Load { path: String, reason: String },
    #[error("Empty model: no geometry found in {0}")]
    EmptyModel(String),
    #[error("Unsupported model format: {0}")]
    UnsupportedFormat(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_detection() {
        assert_eq!(ModelFormat::from_path(Path::new("a/earth.glb")), ModelFormat::Gltf);
        assert_eq!(ModelFormat::from_path(Path::new("mars.GLTF")), ModelFormat::Gltf);
        assert_eq!(ModelFormat::from_path(Path::new("moon.obj")), ModelFormat::Obj);
        assert_eq!(ModelFormat::from_path(Path::new("ship.stl")), ModelFormat::Unknown);
    }

    #[test]
    fn test_load_unsupported() {
        let result = load_model("ship.stl");
        assert!(matches!(result, Err(ModelError::UnsupportedFormat(ext)) if ext == "stl"));
    }

    #[test]
    fn test_load_missing_file() {
        let result = load_model("does/not/exist.glb");
        assert!(matches!(result, Err(ModelError::Load { .. })));
    }

    #[test]
    fn test_computed_normals() {
        let mesh = MeshData::new(
            vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            Vec::new(),
            vec![0, 1, 2],
        );
        assert_eq!(mesh.normals, vec![[0.0, 0.0, 1.0]; 3]);
        assert_eq!(mesh.triangle_count(), 1);
    }

    #[test]
    fn test_bounds() {
        let mesh = MeshData::new(
            vec![[-1.0, 2.0, 0.0], [3.0, -4.0, 5.0]],
            vec![[0.0, 1.0, 0.0]; 2],
            Vec::new(),
        );
        let (min, max) = mesh.bounds().unwrap();
        assert_eq!(min, Vec3::new(-1.0, -4.0, 0.0));
        assert_eq!(max, Vec3::new(3.0, 2.0, 5.0));
        assert!(MeshData::default().bounds().is_none());
    }

    #[test]
    fn test_library_handles() {
        let mut library = MeshLibrary::new();
        let a = library.add(MeshData::default());
        let b = library.add(MeshData::default());
        assert_ne!(a, b);
        assert!(library.remove(a).is_some());
        assert!(library.get(a).is_none());
        assert_eq!(library.len(), 1);
    }
}
