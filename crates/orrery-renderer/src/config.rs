//! Renderer configuration

use orrery_core::Color;
use serde::{Deserialize, Serialize};

/// Bloom parameters, fixed when the compositor is created.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BloomConfig {
    pub enabled: bool,
    /// Multiplier applied to the blurred glow at composite time
    pub strength: f32,
    /// Spread of the blur, 0.0 keeps it tight around the source
    pub radius: f32,
    /// Luminance below which pixels do not bloom
    pub threshold: f32,
}

impl Default for BloomConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            strength: 3.0,
            radius: 0.0,
            threshold: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub fov_degrees: f32,
    pub near_plane: f32,
    pub far_plane: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 75.0,
            near_plane: 1.0,
            far_plane: 1000.0,
        }
    }
}

/// Orbit controls tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlsConfig {
    /// Fraction of the pending rotation applied per update
    pub damping: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub min_polar_angle: f32,
    pub max_polar_angle: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            damping: 0.05,
            min_distance: 200.0,
            max_distance: 1000.0,
            min_polar_angle: 0.0,
            max_polar_angle: std::f32::consts::FRAC_PI_2,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    pub bloom: BloomConfig,
    /// Used when the scene has no skybox
    pub clear_color: Color,
    pub camera: CameraConfig,
    pub controls: ControlsConfig,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            bloom: BloomConfig::default(),
            clear_color: Color::BLACK,
            camera: CameraConfig::default(),
            controls: ControlsConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bloom_defaults() {
        let bloom = BloomConfig::default();
        assert!(bloom.enabled);
        assert_eq!(bloom.strength, 3.0);
        assert_eq!(bloom.radius, 0.0);
        assert_eq!(bloom.threshold, 0.0);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: RendererConfig = ron::from_str("(bloom: (strength: 1.5))").unwrap();
        assert_eq!(config.bloom.strength, 1.5);
        assert!(config.bloom.enabled);
        assert_eq!(config.controls.min_distance, 200.0);
        assert_eq!(config.camera.fov_degrees, 75.0);
    }
}
