// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dirty-tracking channel constants.
//!
//! # Propagation semantics
//!
//! - **Propagating**: [`OFFSET`] and [`MASK`] use
//!   [`EagerPolicy`](understory_dirty::EagerPolicy) and have dependency edges
//!   from child to parent, because world offsets and effective visibility are
//!   inherited.
//! - **Local-only**: [`MESH`] covers mesh and material rebinding of a single
//!   node.
//! - **Structural**: [`TOPOLOGY`] is marked on create, destroy and reparent
//!   and triggers a traversal-order rebuild during evaluation.
//!
//! All channels are drained by
//! [`NodeStore::evaluate`](crate::node::NodeStore::evaluate), which reports
//! the results as [`SceneChanges`](crate::node::SceneChanges).

use understory_dirty::Channel;

/// Local offset changed; descendants need their world offset recomputed.
pub const OFFSET: Channel = Channel::new(0);

/// Type mask changed; descendants need their effective visibility recomputed.
pub const MASK: Channel = Channel::new(1);

/// Mesh or material binding changed.
pub const MESH: Channel = Channel::new(2);

/// Tree topology changed.
pub const TOPOLOGY: Channel = Channel::new(3);
