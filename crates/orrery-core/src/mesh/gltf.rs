//! glTF 2.0 loading (`.gltf` and `.glb`)

use std::path::Path;

use glam::Mat4;

use super::{MeshData, ModelData, ModelError, ModelPrimitive, model_name};
use crate::types::Color;

/// Load a glTF file, flattening the default scene's node tree.
pub fn load_gltf(path: impl AsRef<Path>) -> Result<ModelData, ModelError> {
    let path = path.as_ref();
    let (document, buffers, _images) = ::gltf::import(path).map_err(|e| ModelError::Load {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;

    let mut model = ModelData {
        name: model_name(path),
        primitives: Vec::new(),
    };

    let Some(scene) = document.default_scene().or_else(|| document.scenes().next()) else {
        return Ok(model);
    };

    for node in scene.nodes() {
        collect_node(&node, Mat4::IDENTITY, &buffers, &mut model.primitives);
    }

    Ok(model)
}

fn collect_node(
    node: &::gltf::Node,
    parent: Mat4,
    buffers: &[::gltf::buffer::Data],
    out: &mut Vec<ModelPrimitive>,
) {
    let local = Mat4::from_cols_array_2d(&node.transform().matrix());
    let transform = parent * local;

    if let Some(mesh) = node.mesh() {
        let base_name = mesh
            .name()
            .or(node.name())
            .unwrap_or("mesh")
            .to_string();

        for (index, primitive) in mesh.primitives().enumerate() {
            if primitive.mode() != ::gltf::mesh::Mode::Triangles {
                tracing::debug!("Skipping non-triangle primitive in {}", base_name);
                continue;
            }

            let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|d| &d.0[..]));
            let Some(positions) = reader.read_positions() else {
                continue;
            };
            let positions: Vec<[f32; 3]> = positions.collect();
            let normals: Vec<[f32; 3]> = reader
                .read_normals()
                .map(|n| n.collect())
                .unwrap_or_default();
            let indices: Vec<u32> = match reader.read_indices() {
                Some(indices) => indices.into_u32().collect(),
                None => (0..positions.len() as u32).collect(),
            };

            let material = primitive.material();
            let color = Color::from(material.pbr_metallic_roughness().base_color_factor());
            let [er, eg, eb] = material.emissive_factor();

            out.push(ModelPrimitive {
                name: format!("{base_name}.{index}"),
                mesh: MeshData::new(positions, normals, indices),
                transform,
                color,
                emissive: Color::rgb(er, eg, eb),
            });
        }
    }

    for child in node.children() {
        collect_node(&child, transform, buffers, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use glam::Vec3;

    // One triangle at (0,0,0), (1,0,0), (0,1,0), drawn once as triangles and
    // once as points, under a parent node at (5,0,0) and a child at (0,2,0).
    const NESTED_TRIANGLE: &str = r#"{
        "asset": { "version": "2.0" },
        "scene": 0,
        "scenes": [ { "nodes": [0] } ],
        "nodes": [
            { "name": "parent", "translation": [5.0, 0.0, 0.0], "children": [1] },
            { "name": "child", "translation": [0.0, 2.0, 0.0], "mesh": 0 }
        ],
        "meshes": [ {
            "name": "tri",
            "primitives": [
                { "attributes": { "POSITION": 0 }, "material": 0 },
                { "attributes": { "POSITION": 0 }, "mode": 0 }
            ]
        } ],
        "materials": [ {
            "pbrMetallicRoughness": { "baseColorFactor": [1.0, 0.0, 0.0, 1.0] },
            "emissiveFactor": [0.0, 0.0, 1.0]
        } ],
        "accessors": [ {
            "bufferView": 0,
            "componentType": 5126,
            "count": 3,
            "type": "VEC3",
            "min": [0.0, 0.0, 0.0],
            "max": [1.0, 1.0, 0.0]
        } ],
        "bufferViews": [ { "buffer": 0, "byteLength": 36 } ],
        "buffers": [ {
            "byteLength": 36,
            "uri": "data:application/octet-stream;base64,AAAAAAAAAAAAAAAAAACAPwAAAAAAAAAAAAAAAAAAgD8AAAAA"
        } ]
    }"#;

    fn write_fixture(name: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("orrery-gltf-{}-{}", std::process::id(), name));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("tri.gltf");
        std::fs::write(&path, NESTED_TRIANGLE).unwrap();
        path
    }

    #[test]
    fn test_nested_node_transforms_and_materials() {
        let path = write_fixture("nested");
        let model = load_gltf(&path).unwrap();

        assert_eq!(model.name, "tri");
        // The points primitive is skipped
        assert_eq!(model.primitives.len(), 1);

        let primitive = &model.primitives[0];
        assert_eq!(primitive.name, "tri.0");
        let origin = primitive.transform.transform_point3(Vec3::ZERO);
        assert_relative_eq!(origin.x, 5.0);
        assert_relative_eq!(origin.y, 2.0);
        assert_relative_eq!(origin.z, 0.0);

        assert_eq!(primitive.color, Color::rgb(1.0, 0.0, 0.0));
        assert_eq!(primitive.emissive, Color::rgb(0.0, 0.0, 1.0));

        assert_eq!(primitive.mesh.triangle_count(), 1);
        assert_eq!(primitive.mesh.normals.len(), 3);
        assert_relative_eq!(primitive.mesh.normals[0][2], 1.0, epsilon = 1e-5);

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_missing_file_is_load_error() {
        let result = load_gltf("/nonexistent/model.gltf");
        assert!(matches!(result, Err(ModelError::Load { .. })));
    }
}
