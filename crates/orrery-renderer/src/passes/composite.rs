//! Final composite of base scene and bloom onto the output texture.

use crate::context::{RenderContext, sampler_entry, texture_entry, uniform_entry};
use crate::passes::{cleared_attachment, fullscreen_pipeline};
use crate::targets::RenderTargets;

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CompositeUniforms {
    pub strength: f32,
    /// 1.0 to add bloom, 0.0 to show the base image only
    pub bloom_enabled: f32,
    pub _padding: [f32; 2],
}

pub struct CompositePass {
    pipeline: wgpu::RenderPipeline,
    layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    strength: f32,
}

impl CompositePass {
    pub fn new(ctx: &RenderContext, targets: &RenderTargets, strength: f32) -> Self {
        let device = ctx.device();
        let shader = ctx.create_shader(include_str!("../shaders/composite.wgsl"), "Composite Shader");

        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Composite Bind Group Layout"),
            entries: &[
                uniform_entry(0, wgpu::ShaderStages::FRAGMENT),
                texture_entry(1, wgpu::TextureViewDimension::D2),
                texture_entry(2, wgpu::TextureViewDimension::D2),
                sampler_entry(3),
            ],
        });
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Composite Pipeline Layout"),
            bind_group_layouts: &[&layout],
            push_constant_ranges: &[],
        });
        let pipeline = fullscreen_pipeline(
            device,
            "Composite Pipeline",
            &shader,
            "vs_fullscreen",
            "fs_main",
            &pipeline_layout,
            ctx.output_format(),
        );

        let sampler = ctx.create_linear_sampler("Composite Sampler");
        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Composite Uniforms"),
            size: std::mem::size_of::<CompositeUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = Self::create_bind_group(ctx, &layout, &uniform_buffer, &sampler, targets);

        Self {
            pipeline,
            layout,
            sampler,
            uniform_buffer,
            bind_group,
            strength,
        }
    }

    fn create_bind_group(
        ctx: &RenderContext,
        layout: &wgpu::BindGroupLayout,
        uniform_buffer: &wgpu::Buffer,
        sampler: &wgpu::Sampler,
        targets: &RenderTargets,
    ) -> wgpu::BindGroup {
        ctx.device().create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Composite Bind Group"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&targets.scene_color.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(&targets.bloom_a.view),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        })
    }

    pub fn resize(&mut self, ctx: &RenderContext, targets: &RenderTargets) {
        self.bind_group =
            Self::create_bind_group(ctx, &self.layout, &self.uniform_buffer, &self.sampler, targets);
    }

    /// Record the composite into `output`.
    pub fn run(
        &self,
        ctx: &RenderContext,
        encoder: &mut wgpu::CommandEncoder,
        output: &wgpu::TextureView,
        with_bloom: bool,
    ) {
        let uniforms = CompositeUniforms {
            strength: self.strength,
            bloom_enabled: if with_bloom { 1.0 } else { 0.0 },
            _padding: [0.0; 2],
        };
        ctx.queue()
            .write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Composite Pass"),
            color_attachments: &[Some(cleared_attachment(output))],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.bind_group, &[]);
        pass.draw(0..3, 0..1);
    }
}
