//! Bloom post-processing: threshold extract, then a separable Gaussian blur.
//!
//! scene color -> threshold -> bloom A -> horizontal -> bloom B -> vertical -> bloom A

use crate::config::BloomConfig;
use crate::context::{HDR_FORMAT, RenderContext, sampler_entry, texture_entry, uniform_entry};
use crate::passes::{cleared_attachment, fullscreen_pipeline};
use crate::targets::RenderTargets;

/// Per-pass bloom uniforms (32 bytes)
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct BloomUniforms {
    /// 1.0 / texture_width, 1.0 / texture_height
    pub texel_size: [f32; 2],
    /// Blur axis, zero for the threshold pass
    pub direction: [f32; 2],
    pub threshold: f32,
    pub radius: f32,
    pub strength: f32,
    pub _padding: f32,
}

impl BloomUniforms {
    pub fn new(config: &BloomConfig, texel_size: [f32; 2], direction: [f32; 2]) -> Self {
        Self {
            texel_size,
            direction,
            threshold: config.threshold,
            radius: config.radius.max(0.0),
            strength: config.strength,
            _padding: 0.0,
        }
    }
}

struct Step {
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    direction: [f32; 2],
}

pub struct BloomPass {
    threshold_pipeline: wgpu::RenderPipeline,
    blur_pipeline: wgpu::RenderPipeline,
    layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    config: BloomConfig,
    threshold: Step,
    blur_h: Step,
    blur_v: Step,
}

impl BloomPass {
    pub fn new(ctx: &RenderContext, targets: &RenderTargets, config: BloomConfig) -> Self {
        let device = ctx.device();
        let shader = ctx.create_shader(include_str!("../shaders/bloom.wgsl"), "Bloom Shader");

        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Bloom Bind Group Layout"),
            entries: &[
                uniform_entry(0, wgpu::ShaderStages::FRAGMENT),
                texture_entry(1, wgpu::TextureViewDimension::D2),
                sampler_entry(2),
            ],
        });
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Bloom Pipeline Layout"),
            bind_group_layouts: &[&layout],
            push_constant_ranges: &[],
        });

        let threshold_pipeline = fullscreen_pipeline(
            device,
            "Bloom Threshold Pipeline",
            &shader,
            "vs_fullscreen",
            "fs_threshold",
            &pipeline_layout,
            HDR_FORMAT,
        );
        let blur_pipeline = fullscreen_pipeline(
            device,
            "Bloom Blur Pipeline",
            &shader,
            "vs_fullscreen",
            "fs_blur",
            &pipeline_layout,
            HDR_FORMAT,
        );
        let sampler = ctx.create_linear_sampler("Bloom Sampler");

        let (threshold, blur_h, blur_v) = Self::create_steps(ctx, &layout, &sampler, targets);

        let pass = Self {
            threshold_pipeline,
            blur_pipeline,
            layout,
            sampler,
            config,
            threshold,
            blur_h,
            blur_v,
        };
        pass.write_uniforms(ctx, targets);
        pass
    }

    fn create_steps(
        ctx: &RenderContext,
        layout: &wgpu::BindGroupLayout,
        sampler: &wgpu::Sampler,
        targets: &RenderTargets,
    ) -> (Step, Step, Step) {
        let step = |source, direction, label| {
            Self::create_step(ctx, layout, sampler, source, direction, label)
        };
        (
            step(&targets.scene_color.view, [0.0, 0.0], "Bloom Threshold"),
            step(&targets.bloom_a.view, [1.0, 0.0], "Bloom Blur H"),
            step(&targets.bloom_b.view, [0.0, 1.0], "Bloom Blur V"),
        )
    }

    fn create_step(
        ctx: &RenderContext,
        layout: &wgpu::BindGroupLayout,
        sampler: &wgpu::Sampler,
        source: &wgpu::TextureView,
        direction: [f32; 2],
        label: &str,
    ) -> Step {
        let uniform_buffer = ctx.device().create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: std::mem::size_of::<BloomUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = ctx.device().create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(source),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        });
        Step {
            uniform_buffer,
            bind_group,
            direction,
        }
    }

    fn write_uniforms(&self, ctx: &RenderContext, targets: &RenderTargets) {
        for step in [&self.threshold, &self.blur_h, &self.blur_v] {
            let uniforms = BloomUniforms::new(&self.config, targets.texel_size(), step.direction);
            ctx.queue()
                .write_buffer(&step.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));
        }
    }

    pub fn config(&self) -> &BloomConfig {
        &self.config
    }

    /// Rebind to freshly created targets.
    pub fn resize(&mut self, ctx: &RenderContext, targets: &RenderTargets) {
        (self.threshold, self.blur_h, self.blur_v) =
            Self::create_steps(ctx, &self.layout, &self.sampler, targets);
        self.write_uniforms(ctx, targets);
    }

    /// Record threshold and blur; the result lands in `targets.bloom_a`.
    pub fn run(&self, encoder: &mut wgpu::CommandEncoder, targets: &RenderTargets) {
        let passes = [
            (
                "Bloom Threshold Pass",
                &self.threshold_pipeline,
                &self.threshold,
                &targets.bloom_a.view,
            ),
            (
                "Bloom Blur H Pass",
                &self.blur_pipeline,
                &self.blur_h,
                &targets.bloom_b.view,
            ),
            (
                "Bloom Blur V Pass",
                &self.blur_pipeline,
                &self.blur_v,
                &targets.bloom_a.view,
            ),
        ];
        for (label, pipeline, step, target) in passes {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some(label),
                color_attachments: &[Some(cleared_attachment(target))],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            pass.set_pipeline(pipeline);
            pass.set_bind_group(0, &step.bind_group, &[]);
            pass.draw(0..3, 0..1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bloom_uniforms_size() {
        assert_eq!(std::mem::size_of::<BloomUniforms>(), 32);
    }

    #[test]
    fn test_negative_radius_clamped() {
        let config = BloomConfig {
            radius: -2.0,
            ..Default::default()
        };
        let uniforms = BloomUniforms::new(&config, [0.5, 0.25], [1.0, 0.0]);
        assert_eq!(uniforms.radius, 0.0);
        assert_eq!(uniforms.strength, 3.0);
        assert_eq!(uniforms.texel_size, [0.5, 0.25]);
    }
}
