//! Viewer configuration
//!
//! Renderer tuning plus window and UI preferences, persisted as RON in the
//! platform config directory.

mod manager;

pub use manager::{ConfigError, ConfigManager, SharedConfig, create_shared_config};

use std::path::PathBuf;

use orrery_renderer::RendererConfig;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    pub width: f32,
    pub height: f32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 800.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct UiConfig {
    /// Show the element side panel on startup
    pub show_elements_panel: bool,
    pub zoom_factor: f32,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            show_elements_panel: true,
            zoom_factor: 1.0,
        }
    }
}

/// Complete viewer configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub version: u32,
    #[serde(default)]
    pub renderer: RendererConfig,
    #[serde(default)]
    pub window: WindowConfig,
    #[serde(default)]
    pub ui: UiConfig,
    /// Scene opened most recently, reopened when none is given on the command line
    #[serde(default)]
    pub last_scene: Option<PathBuf>,
}

impl AppConfig {
    pub const CURRENT_VERSION: u32 = 1;

    pub fn new() -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: AppConfig = ron::from_str("(renderer: (bloom: (strength: 1.5)))").unwrap();
        assert_eq!(config.renderer.bloom.strength, 1.5);
        assert!(config.renderer.bloom.enabled);
        assert_eq!(config.window, WindowConfig::default());
        assert_eq!(config.last_scene, None);
    }

    #[test]
    fn test_new_sets_version() {
        assert_eq!(AppConfig::new().version, AppConfig::CURRENT_VERSION);
    }
}
