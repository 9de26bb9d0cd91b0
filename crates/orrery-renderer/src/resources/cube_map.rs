//! Cube-map textures for skybox backgrounds.

use std::collections::HashMap;

use orrery_core::{CubeMapData, CubeMapHandle, CubeMapLibrary};

pub struct GpuCubeMap {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
}

impl GpuCubeMap {
    pub fn upload(device: &wgpu::Device, queue: &wgpu::Queue, data: &CubeMapData) -> Self {
        let size = wgpu::Extent3d {
            width: data.size.max(1),
            height: data.size.max(1),
            depth_or_array_layers: 6,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Skybox Cube Map"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        for (layer, face) in data.faces.iter().enumerate() {
            queue.write_texture(
                wgpu::ImageCopyTexture {
                    texture: &texture,
                    mip_level: 0,
                    origin: wgpu::Origin3d {
                        x: 0,
                        y: 0,
                        z: layer as u32,
                    },
                    aspect: wgpu::TextureAspect::All,
                },
                face,
                wgpu::ImageDataLayout {
                    offset: 0,
                    bytes_per_row: Some(4 * data.size),
                    rows_per_image: Some(data.size),
                },
                wgpu::Extent3d {
                    width: data.size,
                    height: data.size,
                    depth_or_array_layers: 1,
                },
            );
        }

        let view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some("Skybox Cube View"),
            dimension: Some(wgpu::TextureViewDimension::Cube),
            ..Default::default()
        });
        Self { texture, view }
    }
}

#[derive(Default)]
pub struct CubeMapCache {
    maps: HashMap<CubeMapHandle, GpuCubeMap>,
}

impl CubeMapCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop textures whose cube map left the library.
    pub fn prune(&mut self, library: &CubeMapLibrary) {
        self.maps.retain(|handle, _| library.get(*handle).is_some());
    }

    /// Upload `handle` if the library has it and it is not on the GPU yet.
    pub fn ensure(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        library: &CubeMapLibrary,
        handle: CubeMapHandle,
    ) -> Option<&GpuCubeMap> {
        if !self.maps.contains_key(&handle) {
            let data = library.get(handle)?;
            if data.size == 0 {
                return None;
            }
            self.maps.insert(handle, GpuCubeMap::upload(device, queue, data));
            tracing::debug!("Uploaded cube map {} ({}px faces)", handle.raw(), data.size);
        }
        self.maps.get(&handle)
    }

    pub fn get(&self, handle: CubeMapHandle) -> Option<&GpuCubeMap> {
        self.maps.get(&handle)
    }
}
