// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scenegraph node tree.
//!
//! Nodes live in a [`NodeStore`] and are addressed by generational [`NodeId`]
//! handles. A node has a [`NodeKind`] (what it contributes to rendering), a
//! local [`Offset`](crate::transform::Offset) and a [`NodeMask`]. A node whose
//! mask, or any ancestor's mask, contains [`NodeMask::DISABLED`] is skipped by
//! renderers.

mod evaluate;
mod id;
mod store;
mod traverse;

pub use evaluate::SceneChanges;
pub use id::{INVALID, MaterialId, NodeId};
pub use store::{NodeKind, NodeMask, NodeStore};
pub use traverse::Children;
