//! Dual-pass glow compositor.
//!
//! Every frame runs the same fixed sequence:
//!
//! 1. darken: each mesh outside the glow layer gets the shared dark material,
//!    and the background is taken off the scene
//! 2. bloom pass: the backend renders the darkened scene into its bloom target
//! 3. restore: original materials and background go back (guard drop)
//! 4. final pass: the backend renders the scene normally and composites bloom
//!
//! The compositor itself owns no GPU state; that sits behind [`FrameBackend`].

mod swap;

pub use swap::{DarkenedScene, SwapRecord};

use orrery_core::{MaterialLibrary, Scene};

use crate::camera::Camera;
use crate::config::BloomConfig;
use crate::error::RenderError;

/// The two passes a compositor frame drives.
pub trait FrameBackend {
    /// Resize the off-screen targets. Called before the next bloom pass.
    fn resize(&mut self, width: u32, height: u32);

    /// Render the (darkened, background-less) scene into the bloom target.
    fn render_bloom(&mut self, scene: &Scene, camera: &Camera) -> Result<(), RenderError>;

    /// Render the scene normally and composite the bloom target on top.
    fn render_final(
        &mut self,
        scene: &Scene,
        camera: &Camera,
        with_bloom: bool,
    ) -> Result<(), RenderError>;
}

pub struct GlowCompositor {
    config: BloomConfig,
    swap: SwapRecord,
    size: (u32, u32),
    pending_resize: Option<(u32, u32)>,
}

impl GlowCompositor {
    pub fn new(config: BloomConfig) -> Self {
        Self {
            config,
            swap: SwapRecord::new(),
            size: (0, 0),
            pending_resize: None,
        }
    }

    pub fn config(&self) -> &BloomConfig {
        &self.config
    }

    pub fn is_bloom_enabled(&self) -> bool {
        self.config.enabled
    }

    pub fn set_bloom_enabled(&mut self, enabled: bool) {
        self.config.enabled = enabled;
    }

    pub fn swap_record(&self) -> &SwapRecord {
        &self.swap
    }

    /// Record a new viewport size; targets follow on the next frame.
    pub fn resize(&mut self, width: u32, height: u32) {
        let size = (width.max(1), height.max(1));
        if size != self.size {
            tracing::debug!("Compositor resize to {}x{}", size.0, size.1);
            self.size = size;
            self.pending_resize = Some(size);
        }
    }

    /// Render one frame.
    ///
    /// On return, successful or not, every node has the material it had on
    /// entry and the background is back in place. A backend error drops the
    /// frame and is returned as is.
    pub fn render_frame<B: FrameBackend>(
        &mut self,
        backend: &mut B,
        scene: &mut Scene,
        materials: &MaterialLibrary,
        camera: &Camera,
    ) -> Result<(), RenderError> {
        if let Some((width, height)) = self.pending_resize.take() {
            backend.resize(width, height);
        }

        if self.config.enabled {
            let bloom = {
                let darkened = DarkenedScene::darken(scene, &mut self.swap, materials.dark());
                backend.render_bloom(darkened.scene(), camera)
            };
            debug_assert!(self.swap.is_empty());
            bloom?;
        }

        backend.render_final(scene, camera, self.config.enabled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use orrery_core::{
        Background, Color, CubeMapHandle, Layers, Material, MaterialHandle, MeshHandle, Node,
        NodeId, Scene,
    };

    #[derive(Debug, Clone, PartialEq)]
    struct Snapshot {
        materials: HashMap<NodeId, Option<MaterialHandle>>,
        background: Option<Background>,
    }

    impl Snapshot {
        fn of(scene: &Scene) -> Self {
            let mut materials = HashMap::new();
            scene.traverse(|node| {
                if node.is_mesh() {
                    materials.insert(node.id, node.material());
                }
            });
            Self {
                materials,
                background: scene.background(),
            }
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    enum Event {
        Resize(u32, u32),
        Bloom(Snapshot),
        Final(Snapshot, bool),
    }

    #[derive(Default)]
    struct RecordingBackend {
        events: Vec<Event>,
        fail_bloom: bool,
    }

    impl FrameBackend for RecordingBackend {
        fn resize(&mut self, width: u32, height: u32) {
            self.events.push(Event::Resize(width, height));
        }

        fn render_bloom(&mut self, scene: &Scene, _camera: &Camera) -> Result<(), RenderError> {
            self.events.push(Event::Bloom(Snapshot::of(scene)));
            if self.fail_bloom {
                return Err(RenderError::SurfaceLost);
            }
            Ok(())
        }

        fn render_final(
            &mut self,
            scene: &Scene,
            _camera: &Camera,
            with_bloom: bool,
        ) -> Result<(), RenderError> {
            self.events.push(Event::Final(Snapshot::of(scene), with_bloom));
            Ok(())
        }
    }

    struct Fixture {
        scene: Scene,
        materials: MaterialLibrary,
        sun: NodeId,
        planet: NodeId,
        sun_material: MaterialHandle,
        planet_material: MaterialHandle,
        sky: Background,
    }

    /// Glowing sun plus a plain planet under a group, with a skybox.
    fn fixture() -> Fixture {
        let mut materials = MaterialLibrary::new();
        let sun_material = materials.add(Material::unlit("sun", Color::WHITE));
        let planet_material = materials.add(Material::lit("planet", Color::from_hex(0x3366FF)));

        let mut scene = Scene::new();
        let sun = scene
            .add_node(
                None,
                Node::mesh("sun", MeshHandle::from_raw(1), Some(sun_material))
                    .with_layers(Layers::glow()),
            )
            .unwrap();
        let group = scene.add_node(None, Node::group("planet")).unwrap();
        let planet = scene
            .add_node(
                Some(group),
                Node::mesh("planet-body", MeshHandle::from_raw(2), Some(planet_material)),
            )
            .unwrap();
        let sky = Background::CubeMap(CubeMapHandle::from_raw(1));
        scene.set_background(Some(sky));

        Fixture {
            scene,
            materials,
            sun,
            planet,
            sun_material,
            planet_material,
            sky,
        }
    }

    #[test]
    fn test_materials_unchanged_after_frame() {
        let mut fx = fixture();
        let before = Snapshot::of(&fx.scene);
        let mut backend = RecordingBackend::default();
        let mut compositor = GlowCompositor::new(BloomConfig::default());

        for _ in 0..3 {
            compositor
                .render_frame(&mut backend, &mut fx.scene, &fx.materials, &Camera::default())
                .unwrap();
            assert_eq!(Snapshot::of(&fx.scene), before);
            assert!(compositor.swap_record().is_empty());
        }
    }

    #[test]
    fn test_glow_isolation_in_bloom_pass() {
        let mut fx = fixture();
        let mut backend = RecordingBackend::default();
        let mut compositor = GlowCompositor::new(BloomConfig::default());
        compositor
            .render_frame(&mut backend, &mut fx.scene, &fx.materials, &Camera::default())
            .unwrap();

        let [Event::Bloom(bloom), Event::Final(final_pass, true)] = backend.events.as_slice() else {
            panic!("unexpected pass sequence: {:?}", backend.events);
        };
        assert_eq!(bloom.materials[&fx.sun], Some(fx.sun_material));
        assert_eq!(bloom.materials[&fx.planet], Some(fx.materials.dark()));
        assert_eq!(final_pass.materials[&fx.sun], Some(fx.sun_material));
        assert_eq!(final_pass.materials[&fx.planet], Some(fx.planet_material));
    }

    #[test]
    fn test_background_hidden_only_during_bloom() {
        let mut fx = fixture();
        let mut backend = RecordingBackend::default();
        let mut compositor = GlowCompositor::new(BloomConfig::default());
        compositor
            .render_frame(&mut backend, &mut fx.scene, &fx.materials, &Camera::default())
            .unwrap();

        let [Event::Bloom(bloom), Event::Final(final_pass, _)] = backend.events.as_slice() else {
            panic!("unexpected pass sequence: {:?}", backend.events);
        };
        assert_eq!(bloom.background, None);
        assert_eq!(final_pass.background, Some(fx.sky));
        assert_eq!(fx.scene.background(), Some(fx.sky));
    }

    #[test]
    fn test_empty_scene() {
        let mut scene = Scene::new();
        let materials = MaterialLibrary::new();
        let mut backend = RecordingBackend::default();
        let mut compositor = GlowCompositor::new(BloomConfig::default());
        compositor
            .render_frame(&mut backend, &mut scene, &materials, &Camera::default())
            .unwrap();

        let empty = Snapshot {
            materials: HashMap::new(),
            background: None,
        };
        assert_eq!(
            backend.events,
            vec![Event::Bloom(empty.clone()), Event::Final(empty, true)]
        );
        assert!(compositor.swap_record().is_empty());
    }

    #[test]
    fn test_resize_before_next_bloom() {
        let mut fx = fixture();
        let mut backend = RecordingBackend::default();
        let mut compositor = GlowCompositor::new(BloomConfig::default());
        let camera = Camera::default();

        compositor.resize(800, 600);
        compositor
            .render_frame(&mut backend, &mut fx.scene, &fx.materials, &camera)
            .unwrap();
        compositor.resize(800, 600);
        compositor.resize(1024, 0);
        compositor
            .render_frame(&mut backend, &mut fx.scene, &fx.materials, &camera)
            .unwrap();

        let kinds: Vec<&str> = backend
            .events
            .iter()
            .map(|e| match e {
                Event::Resize(..) => "resize",
                Event::Bloom(_) => "bloom",
                Event::Final(..) => "final",
            })
            .collect();
        assert_eq!(kinds, ["resize", "bloom", "final", "resize", "bloom", "final"]);
        assert_eq!(backend.events[0], Event::Resize(800, 600));
        assert_eq!(backend.events[3], Event::Resize(1024, 1));
    }

    #[test]
    fn test_bloom_error_restores_scene() {
        let mut fx = fixture();
        let before = Snapshot::of(&fx.scene);
        let mut backend = RecordingBackend {
            fail_bloom: true,
            ..Default::default()
        };
        let mut compositor = GlowCompositor::new(BloomConfig::default());

        let result =
            compositor.render_frame(&mut backend, &mut fx.scene, &fx.materials, &Camera::default());
        assert!(matches!(result, Err(RenderError::SurfaceLost)));
        assert_eq!(backend.events.len(), 1);
        assert_eq!(Snapshot::of(&fx.scene), before);
        assert!(compositor.swap_record().is_empty());

        // The next frame retries from a clean state
        backend.fail_bloom = false;
        compositor
            .render_frame(&mut backend, &mut fx.scene, &fx.materials, &Camera::default())
            .unwrap();
        assert_eq!(Snapshot::of(&fx.scene), before);
    }

    #[test]
    fn test_bloom_disabled_skips_darken() {
        let mut fx = fixture();
        let mut backend = RecordingBackend::default();
        let mut compositor = GlowCompositor::new(BloomConfig::default());
        compositor.set_bloom_enabled(false);
        compositor
            .render_frame(&mut backend, &mut fx.scene, &fx.materials, &Camera::default())
            .unwrap();

        assert!(matches!(backend.events.as_slice(), [Event::Final(_, false)]));
    }

    #[test]
    fn test_mesh_without_material_is_skipped() {
        let mut scene = Scene::new();
        let materials = MaterialLibrary::new();
        let bare = scene
            .add_node(None, Node::mesh("bare", MeshHandle::from_raw(7), None))
            .unwrap();
        let mut backend = RecordingBackend::default();
        let mut compositor = GlowCompositor::new(BloomConfig::default());
        compositor
            .render_frame(&mut backend, &mut scene, &materials, &Camera::default())
            .unwrap();

        let Event::Bloom(bloom) = &backend.events[0] else {
            panic!("expected bloom first");
        };
        assert_eq!(bloom.materials[&bare], None);
        assert_eq!(scene.node(bare).unwrap().material(), None);
    }
}
