//! A scene document brought to life.

use std::path::{Path, PathBuf};

use crate::document::{CameraSpec, DocumentError, SceneDocument};
use crate::element::{AttachContext, Element, ElementError, ElementId, ElementSpec};
use crate::material::MaterialLibrary;
use crate::mesh::MeshLibrary;
use crate::motion::Clock;
use crate::scene::Scene;
use crate::skybox::CubeMapLibrary;
use crate::types::Color;

/// Owns the scene graph, its resources, the attached elements and the clock.
pub struct World {
    scene: Scene,
    materials: MaterialLibrary,
    meshes: MeshLibrary,
    cube_maps: CubeMapLibrary,
    clock: Clock,
    elements: Vec<Element>,
    base_dir: PathBuf,
    camera: CameraSpec,
    background_color: Color,
}

impl World {
    /// Empty world resolving asset paths against `base_dir`.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            scene: Scene::new(),
            materials: MaterialLibrary::new(),
            meshes: MeshLibrary::new(),
            cube_maps: CubeMapLibrary::new(),
            clock: Clock::new(),
            elements: Vec::new(),
            base_dir: base_dir.into(),
            camera: CameraSpec::default(),
            background_color: Color::BLACK,
        }
    }

    /// Builds a world from a document.
    ///
    /// Elements that fail to attach are logged and skipped; the rest of the
    /// scene still loads.
    pub fn from_document(document: &SceneDocument, base_dir: impl Into<PathBuf>) -> Self {
        let mut world = Self::new(base_dir);
        world.camera = document.camera;
        world.background_color = document.background_color;

        for spec in &document.elements {
            if let Err(e) = world.attach(spec) {
                tracing::warn!("Skipping {} element: {}", spec.kind().tag(), e);
            }
        }
        world
    }

    /// Loads a document from disk; assets resolve relative to its directory.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DocumentError> {
        let path = path.as_ref();
        let document = SceneDocument::load(path)?;
        let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Ok(Self::from_document(&document, base_dir))
    }

    /// Attaches a new element and places it according to the current time.
    pub fn attach(&mut self, spec: &ElementSpec) -> Result<ElementId, ElementError> {
        let mut ctx = AttachContext {
            scene: &mut self.scene,
            materials: &mut self.materials,
            meshes: &mut self.meshes,
            cube_maps: &mut self.cube_maps,
            base_dir: &self.base_dir,
        };
        let element = spec.attach(&mut ctx)?;
        element.apply_motion(&mut self.scene, self.clock.elapsed());

        let id = element.id();
        tracing::debug!("World now has {} elements", self.elements.len() + 1);
        self.elements.push(element);
        Ok(id)
    }

    pub fn detach(&mut self, id: ElementId) -> Result<(), ElementError> {
        let index = self
            .elements
            .iter()
            .position(|e| e.id() == id)
            .ok_or(ElementError::NotFound(id))?;
        let element = self.elements.remove(index);
        let mut ctx = AttachContext {
            scene: &mut self.scene,
            materials: &mut self.materials,
            meshes: &mut self.meshes,
            cube_maps: &mut self.cube_maps,
            base_dir: &self.base_dir,
        };
        element.detach(&mut ctx)
    }

    pub fn element(&self, id: ElementId) -> Option<&Element> {
        self.elements.iter().find(|e| e.id() == id)
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// Applies a string attribute to an element.
    pub fn update_attribute(
        &mut self,
        id: ElementId,
        name: &str,
        value: &str,
    ) -> Result<(), ElementError> {
        let element = self
            .elements
            .iter_mut()
            .find(|e| e.id() == id)
            .ok_or(ElementError::NotFound(id))?;
        element.update_attribute(&mut self.scene, name, value)?;
        // Orbit changes take effect immediately rather than on the next tick
        element.apply_motion(&mut self.scene, self.clock.elapsed());
        Ok(())
    }

    /// Advances every element's motion to the clock's current time.
    pub fn tick(&mut self) {
        let elapsed = self.clock.elapsed();
        self.tick_at(elapsed);
    }

    /// Advances every element's motion to `elapsed` seconds.
    pub fn tick_at(&mut self, elapsed: f32) {
        for element in &self.elements {
            element.apply_motion(&mut self.scene, elapsed);
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn materials(&self) -> &MaterialLibrary {
        &self.materials
    }

    pub fn meshes(&self) -> &MeshLibrary {
        &self.meshes
    }

    pub fn cube_maps(&self) -> &CubeMapLibrary {
        &self.cube_maps
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut Clock {
        &mut self.clock
    }

    pub fn camera(&self) -> &CameraSpec {
        &self.camera
    }

    pub fn background_color(&self) -> Color {
        self.background_color
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Mutable scene alongside the read-only libraries, for rendering.
    pub fn split_mut(&mut self) -> (&mut Scene, &MaterialLibrary, &MeshLibrary, &CubeMapLibrary) {
        (&mut self.scene, &self.materials, &self.meshes, &self.cube_maps)
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new(PathBuf::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::Positionable;
    use crate::element::{ElementKind, SunSpec};
    use crate::motion::{Motion, Orbit};
    use crate::scene::Node;
    use glam::Vec3;

    #[test]
    fn test_from_document_skips_broken_elements() {
        let doc = SceneDocument::from_ron_str(
            r#"(elements: [Sun(()), Model((src: "missing.glb")), PointLight(())])"#,
        )
        .unwrap();
        let world = World::from_document(&doc, "/nonexistent");

        let kinds: Vec<_> = world.elements().iter().map(|e| e.kind()).collect();
        assert_eq!(kinds, vec![ElementKind::Sun, ElementKind::PointLight]);
        assert_eq!(world.scene().len(), 2);
    }

    #[test]
    fn test_skybox_document_sets_background() {
        let dir = std::env::temp_dir().join(format!("orrery-skybox-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        for face in ["px", "nx", "py", "ny", "pz", "nz"] {
            image::RgbaImage::from_pixel(4, 4, image::Rgba([10, 20, 30, 255]))
                .save(dir.join(format!("{face}.png")))
                .unwrap();
        }

        let doc = SceneDocument::from_ron_str(
            r#"(elements: [
                Sun(()),
                Skybox((
                    front: "px.png", back: "nx.png", top: "py.png",
                    down: "ny.png", right: "pz.png", left: "nz.png",
                )),
            ])"#,
        )
        .unwrap();
        let world = World::from_document(&doc, &dir);

        assert_eq!(world.elements().len(), 2);
        let cube_map = world.elements()[1].cube_map().unwrap();
        assert_eq!(
            world.scene().background(),
            Some(crate::scene::Background::CubeMap(cube_map))
        );
        assert_eq!(world.cube_maps().get(cube_map).unwrap().size, 4);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_attach_and_detach() {
        let mut world = World::default();
        let id = world.attach(&ElementSpec::Sun(SunSpec::default())).unwrap();
        assert!(world.element(id).is_some());
        assert_eq!(world.scene().mesh_count(), 1);

        world.detach(id).unwrap();
        assert!(world.element(id).is_none());
        assert!(world.scene().is_empty());
        assert!(matches!(world.detach(id), Err(ElementError::NotFound(_))));
    }

    #[test]
    fn test_tick_moves_orbiting_elements() {
        let mut world = World::default();
        let root = world.scene_mut().add_node(None, Node::group("planet")).unwrap();
        let orbit = Orbit {
            radius: 100.0,
            period: 20.0,
            offset: 0.0,
        };
        world.elements.push(
            Element::new(ElementKind::Planet, "planet", Some(root)).with_motion(Motion::Orbit(orbit)),
        );

        world.tick_at(5.0);
        let p = world.scene().node(root).unwrap().position();
        assert!(p.x.abs() < 1e-3);
        assert!((p.z - 100.0).abs() < 1e-3);
    }

    #[test]
    fn test_update_attribute_by_id() {
        let mut world = World::default();
        let id = world.attach(&ElementSpec::Sun(SunSpec::default())).unwrap();
        world.update_attribute(id, "scale", "2 2 2").unwrap();

        let root = world.element(id).unwrap().root().unwrap();
        assert_eq!(world.scene().node(root).unwrap().transform.scale, Vec3::splat(2.0));
        assert!(matches!(
            world.update_attribute(id, "speed", "3"),
            Err(ElementError::Attribute(_))
        ));
    }

    #[test]
    fn test_manual_clock_drives_tick() {
        let mut world = World::default();
        *world.clock_mut() = Clock::manual();
        let root = world.scene_mut().add_node(None, Node::group("planet")).unwrap();
        world.elements.push(
            Element::new(ElementKind::Planet, "planet", Some(root))
                .with_motion(Motion::Orbit(Orbit::default())),
        );

        world.clock_mut().advance(std::time::Duration::from_secs(10));
        world.tick();
        // Half a revolution of the default 20 s orbit
        let p = world.scene().node(root).unwrap().position();
        assert!((p.x + 404.0).abs() < 1e-2);
    }
}
