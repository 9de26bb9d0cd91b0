//! Scene lights packed for the lit pipeline.

use bytemuck::{Pod, Zeroable};
use orrery_core::{Light, NodeKind, Scene};

/// Point lights beyond this count are ignored.
pub const MAX_POINT_LIGHTS: usize = 8;

#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct PointLightUniform {
    /// xyz = world position, w = cutoff distance (0 = none)
    pub position_range: [f32; 4],
    /// rgb = color * intensity, a = decay exponent
    pub color_decay: [f32; 4],
}

/// Light uniform buffer data (288 bytes)
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct LightsUniform {
    /// Sum of ambient lights, rgb = color * intensity
    pub ambient: [f32; 4],
    /// x = number of valid point lights
    pub counts: [u32; 4],
    pub point_lights: [PointLightUniform; MAX_POINT_LIGHTS],
}

impl Default for LightsUniform {
    fn default() -> Self {
        Self::zeroed()
    }
}

/// Gather visible lights from the scene.
pub fn collect_lights(scene: &Scene) -> LightsUniform {
    let transforms = scene.world_transforms();
    let mut uniform = LightsUniform::default();
    let mut count = 0usize;
    let mut dropped = 0usize;

    scene.traverse(|node| {
        let NodeKind::Light(light) = &node.kind else {
            return;
        };
        if !scene.is_visible(node.id) {
            return;
        }
        match *light {
            Light::Ambient { color, intensity } => {
                for (sum, c) in uniform.ambient.iter_mut().zip(color.to_array()) {
                    *sum += c * intensity;
                }
            }
            Light::Point {
                color,
                intensity,
                distance,
                decay,
            } => {
                if count == MAX_POINT_LIGHTS {
                    dropped += 1;
                    return;
                }
                let position = transforms
                    .get(&node.id)
                    .map(|m| m.w_axis.truncate())
                    .unwrap_or(node.transform.position);
                let c = color.to_array();
                uniform.point_lights[count] = PointLightUniform {
                    position_range: [position.x, position.y, position.z, distance],
                    color_decay: [c[0] * intensity, c[1] * intensity, c[2] * intensity, decay],
                };
                count += 1;
            }
        }
    });

    if dropped > 0 {
        tracing::warn!(
            "{} point lights exceed the limit of {} and are ignored",
            dropped,
            MAX_POINT_LIGHTS
        );
    }
    uniform.counts[0] = count as u32;
    uniform
}
