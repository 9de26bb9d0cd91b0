//! Light sources.

use serde::{Deserialize, Serialize};

use crate::types::Color;

pub const DEFAULT_COLOR: u32 = 0xFFFFFF;
pub const DEFAULT_INTENSITY: f32 = 1.0;
/// Zero means the light reaches infinitely far.
pub const DEFAULT_DISTANCE: f32 = 0.0;
pub const DEFAULT_DECAY: f32 = 1.0;

/// A light attached to a scene node.
///
/// Point lights take their position from the node's world transform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Light {
    Ambient {
        color: Color,
        intensity: f32,
    },
    Point {
        color: Color,
        intensity: f32,
        /// Cutoff range; 0 disables the cutoff
        distance: f32,
        decay: f32,
    },
}

impl Light {
    pub fn ambient(color: Color, intensity: f32) -> Self {
        Light::Ambient { color, intensity }
    }

    pub fn point(color: Color, intensity: f32, distance: f32, decay: f32) -> Self {
        Light::Point {
            color,
            intensity,
            distance,
            decay,
        }
    }

    pub fn color(&self) -> Color {
        match self {
            Light::Ambient { color, .. } | Light::Point { color, .. } => *color,
        }
    }

    pub fn intensity(&self) -> f32 {
        match self {
            Light::Ambient { intensity, .. } | Light::Point { intensity, .. } => *intensity,
        }
    }

    pub fn set_color(&mut self, new_color: Color) {
        match self {
            Light::Ambient { color, .. } | Light::Point { color, .. } => *color = new_color,
        }
    }

    pub fn set_intensity(&mut self, new_intensity: f32) {
        match self {
            Light::Ambient { intensity, .. } | Light::Point { intensity, .. } => {
                *intensity = new_intensity
            }
        }
    }

    /// Attenuation factor at `distance_to_light` for point lights, 1 for ambient.
    ///
    /// Mirrors the shader: `pow(saturate(1 - (d / range)^4), decay)` with a
    /// range of 0 meaning no cutoff.
    pub fn attenuation(&self, distance_to_light: f32) -> f32 {
        match self {
            Light::Ambient { .. } => 1.0,
            Light::Point {
                distance, decay, ..
            } => {
                if *distance <= 0.0 {
                    return 1.0;
                }
                let ratio = distance_to_light / distance;
                (1.0 - ratio.powi(4)).clamp(0.0, 1.0).powf(*decay)
            }
        }
    }
}
