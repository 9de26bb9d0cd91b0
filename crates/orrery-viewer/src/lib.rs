//! Orrery Viewer
//!
//! egui desktop application that loads a scene document and shows it through
//! the glow compositor.

mod app;
pub mod config;
mod viewport_state;

pub use app::{LaunchOptions, OrreryApp};

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use orrery_core::{World, element::ElementKind};

    #[test]
    fn test_demo_scene_loads() {
        let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../demos/solar.ron");
        let world = World::load(&path).unwrap();

        let kinds: Vec<ElementKind> = world.elements().iter().map(|e| e.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                ElementKind::Sun,
                ElementKind::PointLight,
                ElementKind::AmbientLight,
                ElementKind::Planet,
                ElementKind::Planet,
            ]
        );
        assert_eq!(world.camera().fov_degrees, 75.0);
    }
}
