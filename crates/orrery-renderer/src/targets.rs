//! Off-screen render targets, created once and recreated on resize.

use crate::context::{DEPTH_FORMAT, HDR_FORMAT};

pub struct Target {
    _texture: wgpu::Texture,
    pub view: wgpu::TextureView,
}

impl Target {
    fn new(
        device: &wgpu::Device,
        width: u32,
        height: u32,
        format: wgpu::TextureFormat,
        usage: wgpu::TextureUsages,
        label: &str,
    ) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            _texture: texture,
            view,
        }
    }
}

/// Fit `width` x `height` inside `max_dimension` on both axes, keeping the
/// aspect ratio. Zero sizes become 1.
pub fn fit_extent(width: u32, height: u32, max_dimension: u32) -> (u32, u32) {
    let max_dimension = max_dimension.max(1);
    let (width, height) = (width.max(1), height.max(1));
    let largest = width.max(height);
    if largest <= max_dimension {
        return (width, height);
    }
    let scale = max_dimension as f64 / largest as f64;
    let fit = |v: u32| ((v as f64 * scale).round() as u32).clamp(1, max_dimension);
    (fit(width), fit(height))
}

/// Scene color and depth, plus the bloom ping-pong pair.
///
/// The blurred glow ends up in `bloom_a`; `bloom_b` only holds the
/// intermediate horizontal blur.
pub struct RenderTargets {
    width: u32,
    height: u32,
    pub scene_color: Target,
    pub depth: Target,
    pub bloom_a: Target,
    pub bloom_b: Target,
}

impl RenderTargets {
    /// Targets are shrunk to fit the device's 2D texture limit.
    pub fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let (width, height) = fit_extent(width, height, device.limits().max_texture_dimension_2d);
        let color_usage =
            wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING;

        Self {
            width,
            height,
            scene_color: Target::new(device, width, height, HDR_FORMAT, color_usage, "Scene Color"),
            depth: Target::new(
                device,
                width,
                height,
                DEPTH_FORMAT,
                wgpu::TextureUsages::RENDER_ATTACHMENT,
                "Scene Depth",
            ),
            bloom_a: Target::new(device, width, height, HDR_FORMAT, color_usage, "Bloom A"),
            bloom_b: Target::new(device, width, height, HDR_FORMAT, color_usage, "Bloom B"),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// 1 / size, for shader texel offsets.
    pub fn texel_size(&self) -> [f32; 2] {
        [1.0 / self.width as f32, 1.0 / self.height as f32]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_extent_within_limit() {
        assert_eq!(fit_extent(1280, 720, 2048), (1280, 720));
        assert_eq!(fit_extent(2048, 2048, 2048), (2048, 2048));
        assert_eq!(fit_extent(0, 0, 2048), (1, 1));
    }

    #[test]
    fn test_fit_extent_keeps_aspect() {
        // 1400pt panel at 2x scale
        assert_eq!(fit_extent(2800, 1600, 2048), (2048, 1170));
        assert_eq!(fit_extent(1000, 4096, 2048), (500, 2048));
    }

    #[test]
    fn test_fit_extent_thin_strip() {
        let (width, height) = fit_extent(100_000, 1, 2048);
        assert_eq!(width, 2048);
        assert_eq!(height, 1);
    }
}
