// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scenegraph nodes, meshes and the generator capability used by widgets.
//!
//! Widgets never construct renderer objects directly. They describe meshes
//! through a [`MeshManager`](mesh::MeshManager) and build node trees through
//! a [`ScenegraphGenerator`](generator::ScenegraphGenerator), holding only the
//! opaque handles they get back.
//!
//! ```text
//!   Widget ──► MeshManager::create_mesh(MeshDesc) ──► MeshId
//!      │
//!      └────► ScenegraphGenerator::create_*_node ──► NodeId
//!                         │
//!                         ▼
//!   NodeStore::evaluate() ──► SceneChanges ──► renderer
//! ```
//!
//! **[`node`]**: Struct-of-arrays node tree with generational handles. Nodes
//! carry a local [`Offset`](transform::Offset) and a
//! [`NodeMask`](node::NodeMask); world offsets and effective visibility are
//! computed by evaluation.
//!
//! **[`dirty`]**: Dirty tracking channels via `understory_dirty`.
//!
//! **[`mesh`]**: Mesh descriptors and the reference [`MeshStore`](mesh::MeshStore).
//!
//! **[`font`]**: Font name to [`FontId`](font::FontId) mapping.
//!
//! **[`generator`]**: The [`ScenegraphGenerator`](generator::ScenegraphGenerator)
//! trait and the [`SceneGenerator`](generator::SceneGenerator) implementation.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod dirty;
pub mod font;
pub mod generator;
pub mod mesh;
pub mod node;
pub mod transform;
