//! Off-screen viewport rendering

use std::sync::Arc;

use glam::Vec2;
use orrery_core::{CameraSpec, World};
use orrery_renderer::{
    Camera, CameraConfig, GlowCompositor, OrbitControls, RenderError, RendererConfig,
    WgpuRenderer, fit_extent,
};

/// Texture the compositor draws into and egui displays.
struct RenderTexture {
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
    egui_texture_id: egui::TextureId,
    width: u32,
    height: u32,
}

pub struct ViewportState {
    renderer: WgpuRenderer,
    compositor: GlowCompositor,
    camera: Camera,
    controls: OrbitControls,
    camera_config: CameraConfig,
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    render_texture: Option<RenderTexture>,
}

impl ViewportState {
    pub fn new(
        device: Arc<wgpu::Device>,
        queue: Arc<wgpu::Queue>,
        format: wgpu::TextureFormat,
        config: &RendererConfig,
    ) -> Self {
        let renderer = WgpuRenderer::new(device.clone(), queue.clone(), format, 800, 600, config);
        let camera = Camera::new(800.0 / 600.0);
        let controls = OrbitControls::new(config.controls, &camera);
        Self {
            renderer,
            compositor: GlowCompositor::new(config.bloom),
            camera,
            controls,
            camera_config: config.camera,
            device,
            queue,
            render_texture: None,
        }
    }

    /// Point the camera the way a freshly loaded world asks for.
    ///
    /// A projection configured away from the defaults wins over the document's.
    pub fn reset_for_world(&mut self, world: &World) {
        self.renderer.set_clear_color(world.background_color());
        self.reset_camera(world.camera());
    }

    pub fn reset_camera(&mut self, spec: &CameraSpec) {
        let mut camera = Camera::from_spec(spec, self.camera.aspect);
        if self.camera_config != CameraConfig::default() {
            camera.apply_config(&self.camera_config);
        }
        self.controls = OrbitControls::new(*self.controls.config(), &camera);
        self.camera = camera;
    }

    pub fn is_bloom_enabled(&self) -> bool {
        self.compositor.is_bloom_enabled()
    }

    pub fn set_bloom_enabled(&mut self, enabled: bool) {
        self.compositor.set_bloom_enabled(enabled);
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn controls(&self) -> &OrbitControls {
        &self.controls
    }

    /// Feed pointer drag (in points) and scroll into the orbit controls.
    pub fn handle_input(&mut self, drag: Vec2, scroll: f32) {
        let height = self
            .render_texture
            .as_ref()
            .map_or(self.renderer.height(), |rt| rt.height) as f32;
        if drag != Vec2::ZERO {
            self.controls.rotate(drag, height);
        }
        if scroll != 0.0 {
            self.controls.zoom(scroll);
        }
    }

    /// Make sure the render texture matches the viewport size.
    ///
    /// Sizes beyond the device's texture limit are scaled down; egui stretches
    /// the texture back over the panel.
    pub fn ensure_texture(
        &mut self,
        width: u32,
        height: u32,
        egui_renderer: &mut egui_wgpu::Renderer,
    ) -> egui::TextureId {
        let (width, height) = fit_extent(
            width,
            height,
            self.device.limits().max_texture_dimension_2d,
        );

        if let Some(rt) = &self.render_texture {
            if rt.width == width && rt.height == height {
                return rt.egui_texture_id;
            }
        }

        if let Some(old) = self.render_texture.take() {
            egui_renderer.free_texture(&old.egui_texture_id);
        }

        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Viewport Render Texture"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: self.renderer.output_format(),
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let egui_texture_id =
            egui_renderer.register_native_texture(&self.device, &view, wgpu::FilterMode::Linear);

        self.compositor.resize(width, height);
        self.camera.update_aspect(width as f32 / height as f32);

        self.render_texture = Some(RenderTexture {
            _texture: texture,
            view,
            egui_texture_id,
            width,
            height,
        });
        egui_texture_id
    }

    /// Render one frame of `world` into the viewport texture.
    ///
    /// A failed frame is not submitted; the scene is left as it was.
    pub fn render(&mut self, world: &mut World) -> Result<(), RenderError> {
        let Some(rt) = &self.render_texture else {
            return Ok(());
        };

        self.controls.update(&mut self.camera);

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Viewport Render Encoder"),
            });

        let (scene, materials, meshes, cube_maps) = world.split_mut();
        let result = {
            let mut frame =
                self.renderer
                    .begin_frame(&mut encoder, &rt.view, materials, meshes, cube_maps);
            self.compositor
                .render_frame(&mut frame, scene, materials, &self.camera)
        };
        result?;

        self.queue.submit(std::iter::once(encoder.finish()));
        Ok(())
    }
}
