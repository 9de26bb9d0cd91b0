//! Scene documents: the RON file a scene is authored in.
//!
//! ```ron
//! (
//!     camera: (position: (200.0, 50.0, 0.0)),
//!     elements: [
//!         Sun((radius: 20.0)),
//!         Planet((src: "models/earth.glb", orbit_radius: 404.0, speed: 20.0)),
//!         AmbientLight((intensity: 0.3)),
//!     ],
//! )
//! ```

use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::element::ElementSpec;
use crate::types::Color;

/// Initial camera placement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSpec {
    pub position: Vec3,
    pub target: Vec3,
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraSpec {
    fn default() -> Self {
        Self {
            position: Vec3::new(200.0, 50.0, 0.0),
            target: Vec3::ZERO,
            fov_degrees: 75.0,
            near: 1.0,
            far: 1000.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneDocument {
    pub camera: CameraSpec,
    /// Clear color used when no skybox is present
    pub background_color: Color,
    pub elements: Vec<ElementSpec>,
}

impl Default for SceneDocument {
    fn default() -> Self {
        Self {
            camera: CameraSpec::default(),
            background_color: Color::BLACK,
            elements: Vec::new(),
        }
    }
}

impl SceneDocument {
    /// Parse a document. Optional fields such as skybox faces may be written
    /// bare (`front: "px.png"`) as well as `Some(..)`.
    pub fn from_ron_str(source: &str) -> Result<Self, DocumentError> {
        ron::Options::default()
            .with_default_extension(ron::extensions::Extensions::IMPLICIT_SOME)
            .from_str(source)
            .map_err(|e| DocumentError::Parse(e.to_string()))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, DocumentError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| DocumentError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let document = Self::from_ron_str(&source)?;
        tracing::info!(
            "Loaded scene document {} ({} elements)",
            path.display(),
            document.elements.len()
        );
        Ok(document)
    }

    pub fn to_ron_string(&self) -> Result<String, DocumentError> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| DocumentError::Serialize(e.to_string()))
    }
}

/// Scene document errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum DocumentError {
    #[error("Failed to read scene document '{path}': {reason}")]
    Io { path: String, reason: String },
    #[error("Failed to parse scene document: {0}")]
    Parse(String),
    #[error("Failed to serialize scene document: {0}")]
    Serialize(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{PointLightSpec, SunSpec};

    const SAMPLE: &str = r#"(
        camera: (position: (0.0, 100.0, 300.0), fov_degrees: 60.0),
        background_color: 0x101020,
        elements: [
            Sun((radius: 30.0, color: 0xFFCC00)),
            Planet((src: "earth.glb", orbit_radius: 150.0, speed: 10.0, offset: 2.5)),
            PointLight((intensity: 2.0, distance: 800.0)),
            AmbientLight(()),
            Skybox((front: "px.png", back: "nx.png")),
        ],
    )"#;

    #[test]
    fn test_parse_sample_document() {
        let doc = SceneDocument::from_ron_str(SAMPLE).unwrap();
        assert_eq!(doc.camera.position, Vec3::new(0.0, 100.0, 300.0));
        assert_eq!(doc.camera.fov_degrees, 60.0);
        assert_eq!(doc.camera.far, 1000.0);
        assert_eq!(doc.background_color.to_hex(), 0x101020);
        assert_eq!(doc.elements.len(), 5);

        let ElementSpec::Sun(sun) = &doc.elements[0] else {
            panic!("expected a sun first");
        };
        assert_eq!(sun.radius, 30.0);
        assert_eq!(sun.color.to_hex(), 0xFFCC00);

        let ElementSpec::Planet(planet) = &doc.elements[1] else {
            panic!("expected a planet second");
        };
        assert_eq!(planet.orbit().offset, 2.5);

        let ElementSpec::PointLight(light) = &doc.elements[2] else {
            panic!("expected a point light third");
        };
        assert_eq!(light.distance, 800.0);
        assert_eq!(light.decay, PointLightSpec::default().decay);
        let ElementSpec::Skybox(skybox) = &doc.elements[4] else {
            panic!("expected a skybox last");
        };
        assert_eq!(skybox.front.as_deref(), Some(Path::new("px.png")));
        assert_eq!(skybox.top, None);
    }

    #[test]
    fn test_explicit_some_still_parses() {
        let doc = SceneDocument::from_ron_str(r#"(elements: [Skybox((left: Some("nz.png")))])"#)
            .unwrap();
        let ElementSpec::Skybox(skybox) = &doc.elements[0] else {
            panic!("expected a skybox");
        };
        assert_eq!(skybox.left.as_deref(), Some(Path::new("nz.png")));
    }

    #[test]
    fn test_empty_document_defaults() {
        let doc = SceneDocument::from_ron_str("()").unwrap();
        assert_eq!(doc, SceneDocument::default());
        assert_eq!(doc.camera.position, Vec3::new(200.0, 50.0, 0.0));
    }

    #[test]
    fn test_unknown_element_is_parse_error() {
        let result = SceneDocument::from_ron_str("(elements: [Comet(())])");
        assert!(matches!(result, Err(DocumentError::Parse(_))));
    }

    #[test]
    fn test_document_survives_serialization() {
        let doc = SceneDocument {
            elements: vec![ElementSpec::Sun(SunSpec::default())],
            ..Default::default()
        };
        let text = doc.to_ron_string().unwrap();
        assert_eq!(SceneDocument::from_ron_str(&text).unwrap(), doc);
    }

    #[test]
    fn test_missing_file() {
        let result = SceneDocument::load("/nonexistent/scene.ron");
        assert!(matches!(result, Err(DocumentError::Io { .. })));
    }
}
