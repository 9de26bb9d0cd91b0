//! Skybox cube-map loading

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Handle to cube-map image data owned by a [`crate::World`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct CubeMapHandle(u64);

impl CubeMapHandle {
    /// Returns the raw handle value.
    pub fn raw(&self) -> u64 {
        self.0
    }

    /// Creates a handle from a raw value.
    pub fn from_raw(value: u64) -> Self {
        Self(value)
    }
}

/// Skybox face paths as written in a scene document; any may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkyboxSpec {
    pub front: Option<PathBuf>,
    pub back: Option<PathBuf>,
    pub top: Option<PathBuf>,
    pub down: Option<PathBuf>,
    pub right: Option<PathBuf>,
    pub left: Option<PathBuf>,
}

impl SkyboxSpec {
    /// All six faces, or [`SkyboxError::MissingFaces`] if any is absent.
    pub fn faces(&self) -> Result<SkyboxFaces, SkyboxError> {
        let face = |f: &Option<PathBuf>| f.clone().ok_or(SkyboxError::MissingFaces);
        Ok(SkyboxFaces {
            front: face(&self.front)?,
            back: face(&self.back)?,
            top: face(&self.top)?,
            down: face(&self.down)?,
            right: face(&self.right)?,
            left: face(&self.left)?,
        })
    }
}

/// Image paths of the six skybox faces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkyboxFaces {
    pub front: PathBuf,
    pub back: PathBuf,
    pub top: PathBuf,
    pub down: PathBuf,
    pub right: PathBuf,
    pub left: PathBuf,
}

impl SkyboxFaces {
    /// Faces in GPU cube layer order: +X, -X, +Y, -Y, +Z, -Z.
    pub fn in_layer_order(&self) -> [&Path; 6] {
        [
            self.front.as_path(),
            self.back.as_path(),
            self.top.as_path(),
            self.down.as_path(),
            self.right.as_path(),
            self.left.as_path(),
        ]
    }
}

/// Decoded RGBA8 cube map, faces in layer order.
#[derive(Debug, Clone)]
pub struct CubeMapData {
    /// Edge length of each square face in pixels
    pub size: u32,
    pub faces: [Vec<u8>; 6],
}

impl CubeMapData {
    /// Single-color cube map, useful as a placeholder.
    pub fn solid(size: u32, rgba: [u8; 4]) -> Self {
        let face: Vec<u8> = rgba
            .iter()
            .copied()
            .cycle()
            .take((size * size * 4) as usize)
            .collect();
        Self {
            size,
            faces: std::array::from_fn(|_| face.clone()),
        }
    }
}

/// Owns decoded cube maps by handle.
pub struct CubeMapLibrary {
    maps: HashMap<CubeMapHandle, CubeMapData>,
    next_handle: u64,
}

impl CubeMapLibrary {
    pub fn new() -> Self {
        Self {
            maps: HashMap::new(),
            next_handle: 1,
        }
    }

    pub fn add(&mut self, data: CubeMapData) -> CubeMapHandle {
        let handle = CubeMapHandle(self.next_handle);
        self.next_handle += 1;
        self.maps.insert(handle, data);
        handle
    }

    pub fn get(&self, handle: CubeMapHandle) -> Option<&CubeMapData> {
        self.maps.get(&handle)
    }

    pub fn remove(&mut self, handle: CubeMapHandle) -> Option<CubeMapData> {
        self.maps.remove(&handle)
    }

    pub fn len(&self) -> usize {
        self.maps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.maps.is_empty()
    }
}

impl Default for CubeMapLibrary {
    fn default() -> Self {
        Self::new()
    }
}

/// Load and validate the six face images, resolving relative paths against `base_dir`.
pub fn load_cube_map(faces: &SkyboxFaces, base_dir: &Path) -> Result<CubeMapData, SkyboxError> {
    let mut size = None;
    let mut decoded: Vec<Vec<u8>> = Vec::with_capacity(6);

    for face in faces.in_layer_order() {
        let path = base_dir.join(face);
        let image = image::open(&path)
            .map_err(|e| SkyboxError::Image {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?
            .to_rgba8();

        let (width, height) = image.dimensions();
        if width != height {
            return Err(SkyboxError::NotSquare {
                path: path.display().to_string(),
                width,
                height,
            });
        }
        match size {
            None => size = Some(width),
            Some(expected) if expected != width => {
                return Err(SkyboxError::SizeMismatch {
                    path: path.display().to_string(),
                    expected,
                    actual: width,
                });
            }
            Some(_) => {}
        }
        decoded.push(image.into_raw());
    }

    let size = size.unwrap_or(0);
    let faces: [Vec<u8>; 6] = decoded
        .try_into()
        .map_err(|_| SkyboxError::MissingFaces)?;
    tracing::info!("Loaded skybox cube map ({}x{} per face)", size, size);
    Ok(CubeMapData { size, faces })
}

/// Skybox errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum SkyboxError {
    #[error("skybox needs all six faces: front, back, top, down, right, left")]
    MissingFaces,
    #[error("Failed to load skybox face '{path}': {reason}")]
    Image { path: String, reason: String },
    #[error("Skybox face '{path}' is not square ({width}x{height})")]
    NotSquare {
        path: String,
        width: u32,
        height: u32,
    },
    #[error("Skybox face '{path}' is {actual}px, expected {expected}px")]
    SizeMismatch {
        path: String,
        expected: u32,
        actual: u32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn faces() -> SkyboxFaces {
        SkyboxFaces {
            front: "px.png".into(),
            back: "nx.png".into(),
            top: "py.png".into(),
            down: "ny.png".into(),
            right: "pz.png".into(),
            left: "nz.png".into(),
        }
    }

    #[test]
    fn test_layer_order() {
        let faces = faces();
        let order = faces.in_layer_order();
        assert_eq!(order[0], Path::new("px.png"));
        assert_eq!(order[2], Path::new("py.png"));
        assert_eq!(order[3], Path::new("ny.png"));
        assert_eq!(order[5], Path::new("nz.png"));
    }

    #[test]
    fn test_missing_face_file() {
        let result = load_cube_map(&faces(), Path::new("/nonexistent"));
        assert!(matches!(result, Err(SkyboxError::Image { .. })));
    }

    #[test]
    fn test_spec_requires_all_faces() {
        let mut spec = SkyboxSpec {
            front: Some("px.png".into()),
            back: Some("nx.png".into()),
            top: Some("py.png".into()),
            down: Some("ny.png".into()),
            right: Some("pz.png".into()),
            left: None,
        };
        assert!(matches!(spec.faces(), Err(SkyboxError::MissingFaces)));

        spec.left = Some("nz.png".into());
        assert_eq!(spec.faces().unwrap(), faces());
    }

    #[test]
    fn test_solid_cube_map() {
        let cube = CubeMapData::solid(2, [1, 2, 3, 4]);
        assert_eq!(cube.faces[5], vec![1, 2, 3, 4, 1, 2, 3, 4, 1, 2, 3, 4, 1, 2, 3, 4]);
    }
}
