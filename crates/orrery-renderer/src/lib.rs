//! Orrery Renderer
//!
//! wgpu rendering for Orrery scenes, built around a dual-pass glow compositor.
//!
//! # Architecture
//!
//! - [`compositor::GlowCompositor`] - per-frame darken / bloom / restore / final sequence
//! - [`compositor::FrameBackend`] - the two passes the compositor drives
//! - [`backend::WgpuRenderer`] - GPU implementation of those passes
//! - [`context::RenderContext`] - device, queue and shared camera binding
//! - [`camera::Camera`] and [`controls::OrbitControls`] - view setup and input
//!
//! # Example
//!
//! ```ignore
//! let mut renderer = WgpuRenderer::new(device, queue, format, width, height, &config);
//! let mut compositor = GlowCompositor::new(config.bloom);
//!
//! // Each display frame
//! world.tick();
//! let (scene, materials, meshes, cube_maps) = world.split_mut();
//! let mut frame = renderer.begin_frame(&mut encoder, &output_view, materials, meshes, cube_maps);
//! compositor.render_frame(&mut frame, scene, materials, &camera)?;
//! ```

pub mod backend;
pub mod camera;
pub mod compositor;
pub mod config;
pub mod context;
pub mod controls;
pub mod error;
pub mod passes;
pub mod resources;
pub mod targets;

pub use backend::{WgpuFrame, WgpuRenderer};
pub use camera::{Camera, CameraUniform};
pub use compositor::{FrameBackend, GlowCompositor};
pub use config::{BloomConfig, CameraConfig, ControlsConfig, RendererConfig};
pub use context::RenderContext;
pub use controls::OrbitControls;
pub use error::RenderError;
pub use targets::fit_extent;
