// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layout and element identity types.

use core::fmt;
use core::sync::atomic::{AtomicU32, Ordering};

/// Sentinel value indicating "no element" in index fields.
pub(crate) const INVALID: u32 = u32::MAX;

static NEXT_LAYOUT: AtomicU32 = AtomicU32::new(1);

/// Identifies one [`Layout`](crate::Layout).
///
/// Every layout gets a process-unique id on creation, so an [`ElementId`] can
/// be checked for membership without holding a reference to its layout.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LayoutId(u32);

impl LayoutId {
    pub(crate) fn next() -> Self {
        Self(NEXT_LAYOUT.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the raw id (for diagnostics only).
    #[inline]
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for LayoutId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LayoutId({})", self.0)
    }
}

/// A handle to an element in a [`Layout`](crate::Layout).
///
/// Elements are never removed from a layout, so the slot index alone is
/// stable; the owning [`LayoutId`] is carried along to reject handles from
/// other layouts.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementId {
    pub(crate) layout: LayoutId,
    pub(crate) idx: u32,
}

impl ElementId {
    /// Returns the layout this element belongs to.
    #[inline]
    #[must_use]
    pub const fn layout(self) -> LayoutId {
        self.layout
    }

    /// Returns the raw slot index (for diagnostics only).
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.idx
    }
}

impl fmt::Debug for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ElementId({}@layout{})", self.idx, self.layout.0)
    }
}
