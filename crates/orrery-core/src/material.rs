//! Materials and the handle-based material library.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::types::Color;

/// Handle to a material stored in a [`MaterialLibrary`].
///
/// Handles are lightweight and compared by identity: two materials with
/// identical parameters still have distinct handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct MaterialHandle(u64);

impl MaterialHandle {
    /// Returns the raw handle value.
    pub fn raw(&self) -> u64 {
        self.0
    }

    /// Creates a handle from a raw value.
    pub fn from_raw(value: u64) -> Self {
        Self(value)
    }
}

/// Shading model of a material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MaterialKind {
    /// Flat color, unaffected by lights.
    Unlit,
    /// Ambient + point-light diffuse shading.
    #[default]
    Lit,
}

/// Surface description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub name: String,
    pub kind: MaterialKind,
    pub color: Color,
    /// Added on top of the shaded color.
    pub emissive: Color,
}

impl Material {
    pub fn unlit(name: impl Into<String>, color: Color) -> Self {
        Self {
            name: name.into(),
            kind: MaterialKind::Unlit,
            color,
            emissive: Color::BLACK,
        }
    }

    pub fn lit(name: impl Into<String>, color: Color) -> Self {
        Self {
            name: name.into(),
            kind: MaterialKind::Lit,
            color,
            emissive: Color::BLACK,
        }
    }

    pub fn with_emissive(mut self, emissive: Color) -> Self {
        self.emissive = emissive;
        self
    }
}

/// Owns all materials of a world.
///
/// The library creates the shared dark material on construction; the glow
/// compositor assigns it to every non-glowing mesh during the bloom pass.
pub struct MaterialLibrary {
    materials: HashMap<MaterialHandle, Material>,
    next_handle: u64,
    dark: MaterialHandle,
}

impl MaterialLibrary {
    pub fn new() -> Self {
        let mut library = Self {
            materials: HashMap::new(),
            next_handle: 1,
            dark: MaterialHandle::default(),
        };
        library.dark = library.add(Material::unlit("dark", Color::BLACK));
        library
    }

    /// The shared opaque black material.
    pub fn dark(&self) -> MaterialHandle {
        self.dark
    }

    pub fn add(&mut self, material: Material) -> MaterialHandle {
        let handle = MaterialHandle(self.next_handle);
        self.next_handle += 1;
        self.materials.insert(handle, material);
        handle
    }

    pub fn get(&self, handle: MaterialHandle) -> Option<&Material> {
        self.materials.get(&handle)
    }

    pub fn get_mut(&mut self, handle: MaterialHandle) -> Option<&mut Material> {
        self.materials.get_mut(&handle)
    }

    /// Removes a material. The dark material cannot be removed.
    pub fn remove(&mut self, handle: MaterialHandle) -> Option<Material> {
        if handle == self.dark {
            return None;
        }
        self.materials.remove(&handle)
    }

    pub fn contains(&self, handle: MaterialHandle) -> bool {
        self.materials.contains_key(&handle)
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (MaterialHandle, &Material)> {
        self.materials.iter().map(|(h, m)| (*h, m))
    }
}

impl Default for MaterialLibrary {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dark_material_exists() {
        let library = MaterialLibrary::new();
        let dark = library.get(library.dark()).unwrap();
        assert_eq!(dark.kind, MaterialKind::Unlit);
        assert_eq!(dark.color, Color::BLACK);
    }

    #[test]
    fn test_handles_are_distinct() {
        let mut library = MaterialLibrary::new();
        let a = library.add(Material::lit("a", Color::WHITE));
        let b = library.add(Material::lit("a", Color::WHITE));
        assert_ne!(a, b);
        assert_ne!(a, library.dark());
        assert_eq!(library.len(), 3);
    }

    #[test]
    fn test_dark_cannot_be_removed() {
        let mut library = MaterialLibrary::new();
        let dark = library.dark();
        assert!(library.remove(dark).is_none());
        assert!(library.contains(dark));
    }
}
