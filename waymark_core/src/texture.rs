// Copyright 2026 the Waymark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Named texture lookup with a solid placeholder fallback.
//!
//! Feature renderers ask for textures by name (`"pin"`, `"largeCircle"`,
//! `"viewfield"`, icon names). A name that is not registered never fails a
//! frame: [`TextureAtlas::resolve`] and [`TextureAtlas::resolve_icon`] return
//! [`Texture::WHITE`] instead.

use std::collections::BTreeMap;

use kurbo::Size;

use crate::scene::TextureId;

/// A drawable resource and its natural size in scene units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Texture {
    /// Backend resource identity.
    pub id: TextureId,
    /// Natural (unscaled) size.
    pub size: Size,
}

impl Texture {
    /// The 16×16 solid-fill placeholder used when a name cannot be resolved.
    pub const WHITE: Self = Self {
        id: TextureId::PLACEHOLDER,
        size: Size::new(16.0, 16.0),
    };

    /// Creates a texture descriptor.
    #[must_use]
    pub const fn new(id: TextureId, size: Size) -> Self {
        Self { id, size }
    }
}

/// Standard marker textures and their sizes, as registered by
/// [`TextureAtlas::with_builtin_markers`].
const BUILTIN_MARKERS: &[(&str, f64, f64)] = &[
    ("pin", 17.0, 22.0),
    ("boldPin", 17.0, 22.0),
    ("improveosm", 17.0, 22.0),
    ("osmose", 17.0, 22.0),
    ("smallCircle", 10.0, 10.0),
    ("largeCircle", 16.0, 16.0),
    ("taggedCircle", 10.0, 10.0),
    ("midpoint", 8.0, 8.0),
    ("viewfield", 16.0, 32.0),
    ("viewfieldDark", 16.0, 32.0),
];

/// Maps texture and icon names to [`Texture`] descriptors.
#[derive(Clone, Debug)]
pub struct TextureAtlas {
    textures: BTreeMap<String, Texture>,
    icons: BTreeMap<String, Texture>,
    next_id: u32,
}

impl Default for TextureAtlas {
    fn default() -> Self {
        Self::new()
    }
}

impl TextureAtlas {
    /// Creates an atlas with no registered names.
    #[must_use]
    pub fn new() -> Self {
        Self {
            textures: BTreeMap::new(),
            icons: BTreeMap::new(),
            next_id: TextureId::PLACEHOLDER.0 + 1,
        }
    }

    /// Creates an atlas pre-populated with the standard marker textures.
    #[must_use]
    pub fn with_builtin_markers() -> Self {
        let mut atlas = Self::new();
        for &(name, w, h) in BUILTIN_MARKERS {
            atlas.register(name, Size::new(w, h));
        }
        atlas
    }

    /// Registers (or replaces) a named texture and returns its descriptor.
    pub fn register(&mut self, name: &str, size: Size) -> Texture {
        let texture = self.allocate(size);
        self.textures.insert(name.to_owned(), texture);
        texture
    }

    /// Registers (or replaces) a named icon and returns its descriptor.
    pub fn register_icon(&mut self, name: &str, size: Size) -> Texture {
        let texture = self.allocate(size);
        self.icons.insert(name.to_owned(), texture);
        texture
    }

    /// Looks up a texture by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Texture> {
        self.textures.get(name).copied()
    }

    /// Looks up an icon by name.
    #[must_use]
    pub fn get_icon(&self, name: &str) -> Option<Texture> {
        self.icons.get(name).copied()
    }

    /// Looks up a texture by name, falling back to [`Texture::WHITE`].
    #[must_use]
    pub fn resolve(&self, name: &str) -> Texture {
        self.get(name).unwrap_or(Texture::WHITE)
    }

    /// Looks up an icon by name, falling back to [`Texture::WHITE`].
    #[must_use]
    pub fn resolve_icon(&self, name: &str) -> Texture {
        self.get_icon(name).unwrap_or(Texture::WHITE)
    }

    fn allocate(&mut self, size: Size) -> Texture {
        let id = TextureId(self.next_id);
        self.next_id += 1;
        Texture::new(id, size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_names_fall_back_to_white() {
        let atlas = TextureAtlas::new();
        assert_eq!(atlas.resolve("nope"), Texture::WHITE);
        assert_eq!(atlas.resolve_icon("nope"), Texture::WHITE);
    }

    #[test]
    fn registered_names_get_distinct_ids() {
        let mut atlas = TextureAtlas::new();
        let a = atlas.register("a", Size::new(1.0, 1.0));
        let b = atlas.register_icon("a", Size::new(2.0, 2.0));
        assert_ne!(a.id, b.id);
        assert!(!a.id.is_placeholder(), "registered ids skip the placeholder");
        assert!(Texture::WHITE.id.is_placeholder(), "WHITE uses the placeholder id");
        assert_eq!(format!("{:?}", Texture::WHITE.id), "TextureId(placeholder)");
        assert_eq!(atlas.resolve("a"), a);
        assert_eq!(atlas.resolve_icon("a"), b);
    }

    #[test]
    fn builtin_markers_include_pins_and_circles() {
        let atlas = TextureAtlas::with_builtin_markers();
        for name in ["pin", "largeCircle", "smallCircle", "viewfield"] {
            assert!(atlas.get(name).is_some(), "missing builtin {name}");
        }
    }
}
