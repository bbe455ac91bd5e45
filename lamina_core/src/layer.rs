// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Named depth buckets.

use core::fmt;

/// Identity of a layer within its panel.
///
/// Ids are never reused by a panel, so a widget holding the id of a destroyed
/// layer can not end up in a newer layer of the same name.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LayerId(pub(crate) u32);

impl LayerId {
    /// Returns the raw id.
    #[inline]
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LayerId({})", self.0)
    }
}

/// A named depth bucket widgets may join.
///
/// Depth orders widgets for input priority (higher is nearer) and offsets
/// their scenegraph nodes along z. Layers are owned by a
/// [`Panel`](crate::Panel) and looked up by name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Layer {
    pub(crate) id: LayerId,
    pub(crate) depth: i32,
}

impl Layer {
    /// Returns the layer's id.
    #[must_use]
    pub fn id(&self) -> LayerId {
        self.id
    }

    /// Returns the layer's depth.
    #[must_use]
    pub fn depth(&self) -> i32 {
        self.depth
    }
}
