//! Layer membership masks.

use serde::{Deserialize, Serialize};

/// Layer every node starts in.
pub const BASE_LAYER: u32 = 0;
/// Layer marking nodes that feed the bloom pass.
pub const GLOW_LAYER: u32 = 1;

/// A 32-bit layer membership mask.
///
/// Two masks "test" positive when they share at least one layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Layers(u32);

impl Default for Layers {
    fn default() -> Self {
        Self::base()
    }
}

impl Layers {
    /// Mask containing only the base layer.
    pub fn base() -> Self {
        Self(1 << BASE_LAYER)
    }

    /// Mask containing only the glow layer; used to query glow membership.
    pub fn glow() -> Self {
        Self(1 << GLOW_LAYER)
    }

    /// Mask with no layers.
    pub fn none() -> Self {
        Self(0)
    }

    pub fn mask(&self) -> u32 {
        self.0
    }

    /// Replaces the mask with membership in `layer` only.
    pub fn set(&mut self, layer: u32) {
        self.0 = 1 << (layer % 32);
    }

    pub fn enable(&mut self, layer: u32) {
        self.0 |= 1 << (layer % 32);
    }

    pub fn disable(&mut self, layer: u32) {
        self.0 &= !(1 << (layer % 32));
    }

    pub fn toggle(&mut self, layer: u32) {
        self.0 ^= 1 << (layer % 32);
    }

    pub fn is_enabled(&self, layer: u32) -> bool {
        self.0 & (1 << (layer % 32)) != 0
    }

    /// Returns true if the two masks share a layer.
    pub fn test(&self, other: &Layers) -> bool {
        self.0 & other.0 != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_base_only() {
        let layers = Layers::default();
        assert!(layers.is_enabled(BASE_LAYER));
        assert!(!layers.is_enabled(GLOW_LAYER));
        assert!(!Layers::glow().test(&layers));
    }

    #[test]
    fn test_toggle_glow() {
        let mut layers = Layers::default();
        layers.toggle(GLOW_LAYER);
        assert!(Layers::glow().test(&layers));
        assert!(layers.is_enabled(BASE_LAYER));

        layers.toggle(GLOW_LAYER);
        assert!(!Layers::glow().test(&layers));
    }

    #[test]
    fn test_set_replaces_mask() {
        let mut layers = Layers::default();
        layers.set(GLOW_LAYER);
        assert_eq!(layers, Layers::glow());
        layers.disable(GLOW_LAYER);
        assert_eq!(layers, Layers::none());
    }
}
