//! Scene mesh pass.
//!
//! The same pass runs twice per frame, once for bloom and once for the final
//! image. Each run writes its per-object uniforms into its own slot so the two
//! runs recorded into one encoder do not overwrite each other.

use std::num::NonZeroU64;

use glam::Mat4;
use orrery_core::{MaterialKind, MaterialLibrary, MeshHandle, Scene};

use crate::context::{DEPTH_FORMAT, HDR_FORMAT, RenderContext, align_to, uniform_entry};
use crate::resources::{LightsUniform, MeshCache, MeshVertex};

const INITIAL_CAPACITY: u64 = 64;

/// Per-draw uniform (160 bytes)
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ObjectUniform {
    pub model: [[f32; 4]; 4],
    pub normal: [[f32; 4]; 4],
    pub color: [f32; 4],
    pub emissive: [f32; 4],
}

/// Which run of the scene pass a frame is recording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassSlot {
    Bloom = 0,
    Final = 1,
}

/// One mesh to draw with its resolved material.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Draw {
    pub mesh: MeshHandle,
    pub kind: MaterialKind,
    pub uniform: ObjectUniform,
}

/// Resolve visible mesh nodes into draws, parents before children.
///
/// Meshes without a material, or whose material is not in the library, are
/// skipped.
pub fn collect_draws(scene: &Scene, materials: &MaterialLibrary) -> Vec<Draw> {
    let transforms = scene.world_transforms();
    let mut draws = Vec::new();

    scene.traverse(|node| {
        let Some(mesh) = node.as_mesh() else {
            return;
        };
        let Some(material) = mesh.material.and_then(|m| materials.get(m)) else {
            return;
        };
        if !scene.is_visible(node.id) {
            return;
        }

        let model = transforms.get(&node.id).copied().unwrap_or(Mat4::IDENTITY);
        let normal = if model.determinant().abs() > f32::EPSILON {
            model.inverse().transpose()
        } else {
            Mat4::IDENTITY
        };
        draws.push(Draw {
            mesh: mesh.mesh,
            kind: material.kind,
            uniform: ObjectUniform {
                model: model.to_cols_array_2d(),
                normal: normal.to_cols_array_2d(),
                color: material.color.to_rgba(1.0),
                emissive: material.emissive.to_rgba(0.0),
            },
        });
    });
    draws
}

struct SlotBuffers {
    object_buffer: wgpu::Buffer,
    object_bind_group: wgpu::BindGroup,
    capacity: u64,
    light_buffer: wgpu::Buffer,
    light_bind_group: wgpu::BindGroup,
}

pub struct ScenePass {
    unlit_pipeline: wgpu::RenderPipeline,
    lit_pipeline: wgpu::RenderPipeline,
    lights_layout: wgpu::BindGroupLayout,
    object_layout: wgpu::BindGroupLayout,
    stride: u64,
    slots: [SlotBuffers; 2],
    draws: [Vec<(MeshHandle, MaterialKind)>; 2],
}

impl ScenePass {
    pub fn new(ctx: &RenderContext) -> Self {
        let device = ctx.device();
        let shader = ctx.create_shader(include_str!("../shaders/scene.wgsl"), "Scene Shader");

        let lights_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Lights Bind Group Layout"),
            entries: &[uniform_entry(0, wgpu::ShaderStages::FRAGMENT)],
        });
        let object_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Object Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: NonZeroU64::new(std::mem::size_of::<ObjectUniform>() as u64),
                },
                count: None,
            }],
        });

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Scene Pipeline Layout"),
            bind_group_layouts: &[ctx.camera_bind_group_layout(), &lights_layout, &object_layout],
            push_constant_ranges: &[],
        });

        let create_pipeline = |label: &str, fragment_entry: &str| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(&layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs_main"),
                    buffers: &[MeshVertex::layout()],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some(fragment_entry),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: HDR_FORMAT,
                        blend: None,
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: Some(wgpu::Face::Back),
                    ..Default::default()
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: DEPTH_FORMAT,
                    depth_write_enabled: true,
                    depth_compare: wgpu::CompareFunction::Less,
                    stencil: wgpu::StencilState::default(),
                    bias: wgpu::DepthBiasState::default(),
                }),
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            })
        };
        let unlit_pipeline = create_pipeline("Scene Unlit Pipeline", "fs_unlit");
        let lit_pipeline = create_pipeline("Scene Lit Pipeline", "fs_lit");

        let stride = align_to(
            std::mem::size_of::<ObjectUniform>() as u64,
            ctx.uniform_alignment(),
        );
        let slots = [
            Self::create_slot(device, &lights_layout, &object_layout, stride, INITIAL_CAPACITY, "Bloom"),
            Self::create_slot(device, &lights_layout, &object_layout, stride, INITIAL_CAPACITY, "Final"),
        ];

        Self {
            unlit_pipeline,
            lit_pipeline,
            lights_layout,
            object_layout,
            stride,
            slots,
            draws: [Vec::new(), Vec::new()],
        }
    }

    fn create_slot(
        device: &wgpu::Device,
        lights_layout: &wgpu::BindGroupLayout,
        object_layout: &wgpu::BindGroupLayout,
        stride: u64,
        capacity: u64,
        label: &str,
    ) -> SlotBuffers {
        let object_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(&format!("{label} Object Buffer")),
            size: stride * capacity,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let object_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("{label} Object Bind Group")),
            layout: object_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &object_buffer,
                    offset: 0,
                    size: NonZeroU64::new(std::mem::size_of::<ObjectUniform>() as u64),
                }),
            }],
        });
        let light_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(&format!("{label} Light Buffer")),
            size: std::mem::size_of::<LightsUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let light_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("{label} Light Bind Group")),
            layout: lights_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: light_buffer.as_entire_binding(),
            }],
        });

        SlotBuffers {
            object_buffer,
            object_bind_group,
            capacity,
            light_buffer,
            light_bind_group,
        }
    }

    /// Upload draws and lights for one run of the pass.
    pub fn prepare(&mut self, ctx: &RenderContext, slot: PassSlot, draws: &[Draw], lights: &LightsUniform) {
        let index = slot as usize;
        let needed = draws.len() as u64;
        if needed > self.slots[index].capacity {
            let capacity = needed.next_power_of_two();
            let label = match slot {
                PassSlot::Bloom => "Bloom",
                PassSlot::Final => "Final",
            };
            self.slots[index] = Self::create_slot(
                ctx.device(),
                &self.lights_layout,
                &self.object_layout,
                self.stride,
                capacity,
                label,
            );
            tracing::debug!("Grew {} object buffer to {} draws", label, capacity);
        }

        let buffers = &self.slots[index];
        if !draws.is_empty() {
            let object_size = std::mem::size_of::<ObjectUniform>();
            let mut bytes = vec![0u8; self.stride as usize * draws.len()];
            for (i, draw) in draws.iter().enumerate() {
                let start = i * self.stride as usize;
                bytes[start..start + object_size].copy_from_slice(bytemuck::bytes_of(&draw.uniform));
            }
            ctx.queue().write_buffer(&buffers.object_buffer, 0, &bytes);
        }
        ctx.queue()
            .write_buffer(&buffers.light_buffer, 0, bytemuck::bytes_of(lights));

        self.draws[index] = draws.iter().map(|d| (d.mesh, d.kind)).collect();
    }

    /// Record the draws prepared for `slot`.
    pub fn draw(
        &self,
        render_pass: &mut wgpu::RenderPass<'_>,
        ctx: &RenderContext,
        slot: PassSlot,
        meshes: &MeshCache,
    ) {
        let index = slot as usize;
        let buffers = &self.slots[index];
        render_pass.set_bind_group(0, ctx.camera_bind_group(), &[]);
        render_pass.set_bind_group(1, &buffers.light_bind_group, &[]);

        let mut current = None;
        for (i, (mesh, kind)) in self.draws[index].iter().enumerate() {
            let Some(gpu_mesh) = meshes.get(*mesh) else {
                tracing::trace!("Mesh {} not uploaded, skipping", mesh.raw());
                continue;
            };
            if current != Some(*kind) {
                render_pass.set_pipeline(match kind {
                    MaterialKind::Unlit => &self.unlit_pipeline,
                    MaterialKind::Lit => &self.lit_pipeline,
                });
                current = Some(*kind);
            }
            let offset = (i as u64 * self.stride) as u32;
            render_pass.set_bind_group(2, &buffers.object_bind_group, &[offset]);
            render_pass.set_vertex_buffer(0, gpu_mesh.vertex_buffer.slice(..));
            render_pass.set_index_buffer(gpu_mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            render_pass.draw_indexed(0..gpu_mesh.index_count, 0, 0..1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use orrery_core::{Color, Material, Node, Transform};

    #[test]
    fn test_object_uniform_size() {
        assert_eq!(std::mem::size_of::<ObjectUniform>(), 160);
    }

    #[test]
    fn test_collect_draws() {
        let mut materials = MaterialLibrary::new();
        let lit = materials.add(Material::lit("rock", Color::from_hex(0x808080)));
        let mut scene = Scene::new();

        let group = scene
            .add_node(
                None,
                Node::group("planet").with_transform(Transform::from_position(Vec3::new(5.0, 0.0, 0.0))),
            )
            .unwrap();
        scene
            .add_node(Some(group), Node::mesh("body", MeshHandle::from_raw(1), Some(lit)))
            .unwrap();
        scene
            .add_node(None, Node::mesh("bare", MeshHandle::from_raw(2), None))
            .unwrap();
        let hidden = scene
            .add_node(None, Node::mesh("hidden", MeshHandle::from_raw(3), Some(lit)))
            .unwrap();
        scene.node_mut(hidden).unwrap().visible = false;

        let draws = collect_draws(&scene, &materials);
        assert_eq!(draws.len(), 1);
        assert_eq!(draws[0].mesh, MeshHandle::from_raw(1));
        assert_eq!(draws[0].kind, MaterialKind::Lit);
        assert_eq!(draws[0].uniform.model[3][..3], [5.0, 0.0, 0.0]);
    }

    #[test]
    fn test_dark_material_draws_unlit_black() {
        let materials = MaterialLibrary::new();
        let mut scene = Scene::new();
        scene
            .add_node(None, Node::mesh("planet", MeshHandle::from_raw(1), Some(materials.dark())))
            .unwrap();

        let draws = collect_draws(&scene, &materials);
        assert_eq!(draws[0].kind, MaterialKind::Unlit);
        assert_eq!(draws[0].uniform.color, [0.0, 0.0, 0.0, 1.0]);
    }
}
