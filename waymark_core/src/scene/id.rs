// Copyright 2026 the Waymark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Node handles and texture atlas indices.

use core::fmt;

/// Sentinel value indicating "no node" in index fields.
pub const INVALID: u32 = u32::MAX;

/// A handle to a node in a [`NodeStore`](super::NodeStore).
///
/// Contains both a slot index and a generation counter so that stale handles
/// can be detected after a node is destroyed and the slot is reused.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    /// Slot index into the store's arrays.
    pub(crate) idx: u32,
    /// Generation counter; must match the store's generation for this slot.
    pub(crate) generation: u32,
}

impl NodeId {
    /// Returns the raw slot index (for diagnostics only).
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.idx
    }

    /// Returns the generation counter.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({}@gen{})", self.idx, self.generation)
    }
}

/// Index of a texture within a [`TextureAtlas`](crate::texture::TextureAtlas).
///
/// The atlas hands out ids in registration order starting at 1. Id 0 is
/// [`PLACEHOLDER`](Self::PLACEHOLDER), the solid fill behind
/// [`Texture::WHITE`](crate::texture::Texture::WHITE) that unresolved names
/// draw with. Presenters map ids to their own GPU or canvas resources.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TextureId(pub u32);

impl TextureId {
    /// The placeholder texture used for unresolved names.
    pub const PLACEHOLDER: Self = Self(0);

    /// Returns `true` for the placeholder texture.
    #[must_use]
    pub const fn is_placeholder(self) -> bool {
        self.0 == Self::PLACEHOLDER.0
    }
}

impl fmt::Debug for TextureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_placeholder() {
            f.write_str("TextureId(placeholder)")
        } else {
            write!(f, "TextureId({})", self.0)
        }
    }
}
