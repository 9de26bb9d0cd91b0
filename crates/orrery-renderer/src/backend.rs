//! wgpu implementation of the compositor backend.

use std::future::Future;
use std::sync::Arc;
use std::task::{Context, Poll, Waker};

use orrery_core::{Background, Color, CubeMapLibrary, MaterialLibrary, MeshLibrary, Scene};

use crate::camera::Camera;
use crate::compositor::FrameBackend;
use crate::config::RendererConfig;
use crate::context::RenderContext;
use crate::error::RenderError;
use crate::passes::{BloomPass, CompositePass, PassSlot, ScenePass, SkyboxPass, collect_draws};
use crate::resources::{CubeMapCache, MeshCache, collect_lights};
use crate::targets::{RenderTargets, fit_extent};

/// GPU state that outlives frames: pipelines, targets and uploaded resources.
pub struct WgpuRenderer {
    ctx: RenderContext,
    targets: RenderTargets,
    scene_pass: ScenePass,
    skybox_pass: SkyboxPass,
    bloom_pass: BloomPass,
    composite_pass: CompositePass,
    meshes: MeshCache,
    cube_maps: CubeMapCache,
    clear_color: Color,
}

impl WgpuRenderer {
    pub fn new(
        device: Arc<wgpu::Device>,
        queue: Arc<wgpu::Queue>,
        output_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
        config: &RendererConfig,
    ) -> Self {
        let ctx = RenderContext::new(device, queue, output_format);
        let targets = RenderTargets::new(ctx.device(), width, height);
        let scene_pass = ScenePass::new(&ctx);
        let skybox_pass = SkyboxPass::new(&ctx);
        let bloom_pass = BloomPass::new(&ctx, &targets, config.bloom);
        let composite_pass = CompositePass::new(&ctx, &targets, config.bloom.strength);

        tracing::info!(
            "Renderer initialized ({}x{}, output {:?})",
            targets.width(),
            targets.height(),
            output_format
        );

        Self {
            ctx,
            targets,
            scene_pass,
            skybox_pass,
            bloom_pass,
            composite_pass,
            meshes: MeshCache::new(),
            cube_maps: CubeMapCache::new(),
            clear_color: config.clear_color,
        }
    }

    pub fn context(&self) -> &RenderContext {
        &self.ctx
    }

    pub fn output_format(&self) -> wgpu::TextureFormat {
        self.ctx.output_format()
    }

    pub fn width(&self) -> u32 {
        self.targets.width()
    }

    pub fn height(&self) -> u32 {
        self.targets.height()
    }

    pub fn set_clear_color(&mut self, color: Color) {
        self.clear_color = color;
    }

    /// Recreate the off-screen targets at a new size.
    pub fn resize(&mut self, width: u32, height: u32) {
        let (width, height) = fit_extent(
            width,
            height,
            self.ctx.device().limits().max_texture_dimension_2d,
        );
        if width == self.targets.width() && height == self.targets.height() {
            return;
        }
        self.targets = RenderTargets::new(self.ctx.device(), width, height);
        self.bloom_pass.resize(&self.ctx, &self.targets);
        self.composite_pass.resize(&self.ctx, &self.targets);
        tracing::debug!("Render targets resized to {}x{}", width, height);
    }

    /// Start a frame that records into `encoder` and composites into `output`.
    ///
    /// Uploads any meshes and cube maps the libraries gained since the last frame.
    pub fn begin_frame<'a>(
        &'a mut self,
        encoder: &'a mut wgpu::CommandEncoder,
        output: &'a wgpu::TextureView,
        materials: &'a MaterialLibrary,
        meshes: &'a MeshLibrary,
        cube_maps: &'a CubeMapLibrary,
    ) -> WgpuFrame<'a> {
        self.meshes.sync(self.ctx.device(), meshes);
        self.cube_maps.prune(cube_maps);
        self.skybox_pass.prune(cube_maps);

        WgpuFrame {
            renderer: self,
            encoder,
            output,
            materials,
            cube_map_library: cube_maps,
        }
    }

    fn update_camera(&self, camera: &Camera) {
        let mut camera = *camera;
        camera.update_aspect(self.targets.width() as f32 / self.targets.height() as f32);
        self.ctx.update_camera(&camera.uniform());
    }

    /// Record the scene pass for `slot` into the scene color target.
    fn record_scene(
        &mut self,
        encoder: &mut wgpu::CommandEncoder,
        scene: &Scene,
        materials: &MaterialLibrary,
        cube_map_library: &CubeMapLibrary,
        slot: PassSlot,
    ) {
        let draws = collect_draws(scene, materials);
        let lights = collect_lights(scene);
        self.scene_pass.prepare(&self.ctx, slot, &draws, &lights);

        let background = match scene.background() {
            Some(Background::CubeMap(handle)) => {
                match self.cube_maps.ensure(
                    self.ctx.device(),
                    self.ctx.queue(),
                    cube_map_library,
                    handle,
                ) {
                    Some(cube_map) => {
                        self.skybox_pass.prepare(&self.ctx, handle, cube_map);
                        Some(handle)
                    }
                    None => None,
                }
            }
            None => None,
        };

        let clear = match slot {
            PassSlot::Bloom => Color::BLACK,
            PassSlot::Final => self.clear_color,
        };
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some(match slot {
                PassSlot::Bloom => "Bloom Scene Pass",
                PassSlot::Final => "Final Scene Pass",
            }),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &self.targets.scene_color.view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color {
                        r: clear.r as f64,
                        g: clear.g as f64,
                        b: clear.b as f64,
                        a: 1.0,
                    }),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.targets.depth.view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        if let Some(handle) = background {
            self.skybox_pass.draw(&mut render_pass, &self.ctx, handle);
        }
        self.scene_pass
            .draw(&mut render_pass, &self.ctx, slot, &self.meshes);
    }
}

/// One frame's recording state, handed to the compositor.
pub struct WgpuFrame<'a> {
    renderer: &'a mut WgpuRenderer,
    encoder: &'a mut wgpu::CommandEncoder,
    output: &'a wgpu::TextureView,
    materials: &'a MaterialLibrary,
    cube_map_library: &'a CubeMapLibrary,
}

impl FrameBackend for WgpuFrame<'_> {
    fn resize(&mut self, width: u32, height: u32) {
        self.renderer.resize(width, height);
    }

    fn render_bloom(&mut self, scene: &Scene, camera: &Camera) -> Result<(), RenderError> {
        let device = self.renderer.ctx.device_handle();
        with_error_scope(&device, || {
            self.renderer.update_camera(camera);
            self.renderer.record_scene(
                self.encoder,
                scene,
                self.materials,
                self.cube_map_library,
                PassSlot::Bloom,
            );
            self.renderer
                .bloom_pass
                .run(self.encoder, &self.renderer.targets);
        })
    }

    fn render_final(
        &mut self,
        scene: &Scene,
        camera: &Camera,
        with_bloom: bool,
    ) -> Result<(), RenderError> {
        let device = self.renderer.ctx.device_handle();
        with_error_scope(&device, || {
            self.renderer.update_camera(camera);
            self.renderer.record_scene(
                self.encoder,
                scene,
                self.materials,
                self.cube_map_library,
                PassSlot::Final,
            );
            self.renderer
                .composite_pass
                .run(&self.renderer.ctx, self.encoder, self.output, with_bloom);
        })
    }
}

/// Run `f` inside validation and out-of-memory error scopes.
///
/// Native wgpu resolves the scope future immediately, so it is polled once
/// rather than awaited.
fn with_error_scope(device: &wgpu::Device, f: impl FnOnce()) -> Result<(), RenderError> {
    device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
    device.push_error_scope(wgpu::ErrorFilter::Validation);
    f();
    let validation = poll_ready(device.pop_error_scope());
    let out_of_memory = poll_ready(device.pop_error_scope());

    match out_of_memory.or(validation) {
        Some(error) => Err(error.into()),
        None => Ok(()),
    }
}

fn poll_ready<F: Future<Output = Option<wgpu::Error>>>(future: F) -> Option<wgpu::Error> {
    let mut future = std::pin::pin!(future);
    let mut cx = Context::from_waker(Waker::noop());
    match future.as_mut().poll(&mut cx) {
        Poll::Ready(error) => error,
        Poll::Pending => None,
    }
}
