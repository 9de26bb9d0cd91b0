//! Skybox background pass.

use std::collections::HashMap;

use orrery_core::{CubeMapHandle, CubeMapLibrary};

use crate::context::{DEPTH_FORMAT, HDR_FORMAT, RenderContext, sampler_entry, texture_entry};
use crate::resources::GpuCubeMap;

pub struct SkyboxPass {
    pipeline: wgpu::RenderPipeline,
    layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    bind_groups: HashMap<CubeMapHandle, wgpu::BindGroup>,
}

impl SkyboxPass {
    pub fn new(ctx: &RenderContext) -> Self {
        let device = ctx.device();
        let shader = ctx.create_shader(include_str!("../shaders/skybox.wgsl"), "Skybox Shader");

        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Skybox Bind Group Layout"),
            entries: &[
                texture_entry(0, wgpu::TextureViewDimension::Cube),
                sampler_entry(1),
            ],
        });
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Skybox Pipeline Layout"),
            bind_group_layouts: &[ctx.camera_bind_group_layout(), &layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Skybox Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: HDR_FORMAT,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState::default(),
            // Drawn first and never written to depth, so geometry always covers it
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: false,
                depth_compare: wgpu::CompareFunction::Always,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        Self {
            pipeline,
            layout,
            sampler: ctx.create_linear_sampler("Skybox Sampler"),
            bind_groups: HashMap::new(),
        }
    }

    /// Create the bind group for a cube map once.
    pub fn prepare(&mut self, ctx: &RenderContext, handle: CubeMapHandle, cube_map: &GpuCubeMap) {
        self.bind_groups.entry(handle).or_insert_with(|| {
            ctx.device().create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Skybox Bind Group"),
                layout: &self.layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(&cube_map.view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::Sampler(&self.sampler),
                    },
                ],
            })
        });
    }

    /// Forget bind groups of cube maps no longer in the library.
    pub fn prune(&mut self, library: &CubeMapLibrary) {
        self.bind_groups.retain(|handle, _| library.get(*handle).is_some());
    }

    /// Draw the background. Does nothing if `handle` was never prepared.
    pub fn draw(
        &self,
        render_pass: &mut wgpu::RenderPass<'_>,
        ctx: &RenderContext,
        handle: CubeMapHandle,
    ) -> bool {
        let Some(bind_group) = self.bind_groups.get(&handle) else {
            return false;
        };
        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(0, ctx.camera_bind_group(), &[]);
        render_pass.set_bind_group(1, bind_group, &[]);
        render_pass.draw(0..3, 0..1);
        true
    }
}
