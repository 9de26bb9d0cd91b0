//! Wavefront OBJ loading

use std::path::Path;

use glam::Mat4;

use super::{MeshData, ModelData, ModelError, ModelPrimitive, model_name};
use crate::types::Color;

const DEFAULT_COLOR: Color = Color::rgb(0.7, 0.7, 0.7);

/// Load an OBJ file; each OBJ object becomes one primitive.
pub fn load_obj(path: impl AsRef<Path>) -> Result<ModelData, ModelError> {
    let path = path.as_ref();
    let (models, materials) =
        tobj::load_obj(path, &tobj::GPU_LOAD_OPTIONS).map_err(|e| ModelError::Load {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

    let materials = materials.unwrap_or_else(|e| {
        tracing::warn!("Ignoring materials of {}: {}", path.display(), e);
        Vec::new()
    });

    let primitives = models
        .into_iter()
        .filter(|m| !m.mesh.positions.is_empty())
        .map(|m| {
            let positions: Vec<[f32; 3]> = m
                .mesh
                .positions
                .chunks_exact(3)
                .map(|p| [p[0], p[1], p[2]])
                .collect();
            let normals: Vec<[f32; 3]> = m
                .mesh
                .normals
                .chunks_exact(3)
                .map(|n| [n[0], n[1], n[2]])
                .collect();

            let color = m
                .mesh
                .material_id
                .and_then(|id| materials.get(id))
                .and_then(|mat| mat.diffuse)
                .map(|[r, g, b]| Color::rgb(r, g, b))
                .unwrap_or(DEFAULT_COLOR);

            ModelPrimitive {
                name: m.name,
                mesh: MeshData::new(positions, normals, m.mesh.indices),
                transform: Mat4::IDENTITY,
                color,
                emissive: Color::BLACK,
            }
        })
        .collect();

    Ok(ModelData {
        name: model_name(path),
        primitives,
    })
}
