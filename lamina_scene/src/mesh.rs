// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Mesh descriptors and mesh ownership.
//!
//! Widgets describe each visual part with a [`MeshDesc`] and hand it to a
//! [`MeshManager`], keeping only the returned [`MeshId`]. The manager owns the
//! mesh until the widget asks for it to be destroyed.

use alloc::collections::BTreeMap;
use alloc::string::String;
use core::fmt;

use kurbo::Rect;

use crate::font::FontId;

/// An opaque handle to a mesh owned by a [`MeshManager`].
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MeshId(pub u32);

impl fmt::Debug for MeshId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MeshId({})", self.0)
    }
}

/// A linear RGBA color.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rgba {
    /// Red.
    pub r: f32,
    /// Green.
    pub g: f32,
    /// Blue.
    pub b: f32,
    /// Alpha.
    pub a: f32,
}

impl Rgba {
    /// Opaque white.
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0, 1.0);

    /// Opaque mid gray.
    pub const GRAY: Self = Self::new(0.5, 0.5, 0.5, 1.0);

    /// Creates a color from its components.
    #[inline]
    #[must_use]
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }
}

impl Default for Rgba {
    fn default() -> Self {
        Self::WHITE
    }
}

/// Whether a shape is drawn as an outline or filled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FillMode {
    /// Only the edges are drawn.
    #[default]
    Outline,
    /// The interior is filled.
    Fill,
}

/// Describes the geometry of one mesh.
///
/// Coordinates are local to the transform node the mesh is attached under.
#[derive(Clone, Debug, PartialEq)]
pub enum MeshDesc {
    /// An axis-aligned rectangle.
    Rectangle {
        /// Local bounds.
        rect: Rect,
        /// Outline or fill.
        fill: FillMode,
        /// Color.
        color: Rgba,
    },
    /// A circle centered on the local origin.
    Circle {
        /// Radius.
        radius: f64,
        /// Outline or fill.
        fill: FillMode,
        /// Color.
        color: Rgba,
    },
    /// A run of text with its top-left corner at the local origin.
    Text {
        /// The text.
        text: String,
        /// Font, or the renderer's default when `None`.
        font: Option<FontId>,
        /// Line height.
        height: f64,
        /// Color.
        color: Rgba,
    },
}

/// Creates and destroys meshes on behalf of widgets.
pub trait MeshManager {
    /// Creates a mesh and returns its handle.
    fn create_mesh(&mut self, desc: MeshDesc) -> MeshId;

    /// Destroys a mesh previously returned by
    /// [`create_mesh`](Self::create_mesh).
    fn destroy_mesh(&mut self, mesh: MeshId);
}

/// An in-memory [`MeshManager`] that keeps every live descriptor.
///
/// Handles are never reused, so a destroyed [`MeshId`] can not alias a newer
/// mesh.
#[derive(Debug, Default)]
pub struct MeshStore {
    meshes: BTreeMap<MeshId, MeshDesc>,
    next: u32,
    created: u64,
    destroyed: u64,
}

impl MeshStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the descriptor of a live mesh.
    #[must_use]
    pub fn get(&self, mesh: MeshId) -> Option<&MeshDesc> {
        self.meshes.get(&mesh)
    }

    /// Returns whether `mesh` is live.
    #[must_use]
    pub fn contains(&self, mesh: MeshId) -> bool {
        self.meshes.contains_key(&mesh)
    }

    /// Returns the number of live meshes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    /// Returns whether no mesh is live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    /// Returns how many meshes were created over the store's lifetime.
    #[must_use]
    pub fn created_count(&self) -> u64 {
        self.created
    }

    /// Returns how many meshes were destroyed over the store's lifetime.
    #[must_use]
    pub fn destroyed_count(&self) -> u64 {
        self.destroyed
    }
}

impl MeshManager for MeshStore {
    fn create_mesh(&mut self, desc: MeshDesc) -> MeshId {
        let id = MeshId(self.next);
        self.next += 1;
        self.meshes.insert(id, desc);
        self.created += 1;
        id
    }

    /// # Panics
    ///
    /// Panics if `mesh` is not live.
    fn destroy_mesh(&mut self, mesh: MeshId) {
        assert!(
            self.meshes.remove(&mesh).is_some(),
            "unknown MeshId: {mesh:?}"
        );
        self.destroyed += 1;
    }
}
