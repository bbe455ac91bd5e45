// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scene evaluation and change tracking.
//!
//! Evaluation drains each dirty channel in turn:
//!
//! 1. **OFFSET**: recompute `world_offset` as `parent_world + local_offset`.
//! 2. **MASK**: recompute `effective_disabled` as
//!    `parent_effective_disabled || mask.contains(DISABLED)` and record
//!    transitions.
//! 3. **MESH**: collect rebound nodes (renderers read the binding from the
//!    store).
//! 4. **TOPOLOGY**: consume; the traversal order was rebuilt up front.
//!
//! [`SceneChanges`] holds raw slot indices so renderers can use the `*_at()`
//! accessors on [`NodeStore`] directly.

use alloc::vec::Vec;

use super::id::INVALID;
use super::store::{NodeMask, NodeStore};
use crate::dirty;
use crate::transform::Offset;

/// The set of changes produced by a single [`NodeStore::evaluate`] call.
#[derive(Clone, Debug, Default)]
pub struct SceneChanges {
    /// Nodes whose world offset was recomputed.
    pub offsets: Vec<u32>,
    /// Nodes that became effectively disabled.
    pub disabled: Vec<u32>,
    /// Nodes that stopped being effectively disabled.
    pub enabled: Vec<u32>,
    /// Nodes whose mesh or material binding changed.
    pub meshes: Vec<u32>,
    /// Nodes created since the last evaluate.
    pub added: Vec<u32>,
    /// Nodes destroyed since the last evaluate.
    pub removed: Vec<u32>,
    /// Whether the tree topology changed (traversal order was rebuilt).
    pub topology_changed: bool,
}

impl SceneChanges {
    /// Clears all change lists.
    pub fn clear(&mut self) {
        self.offsets.clear();
        self.disabled.clear();
        self.enabled.clear();
        self.meshes.clear();
        self.added.clear();
        self.removed.clear();
        self.topology_changed = false;
    }

    /// Returns whether nothing changed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
            && self.disabled.is_empty()
            && self.enabled.is_empty()
            && self.meshes.is_empty()
            && self.added.is_empty()
            && self.removed.is_empty()
            && !self.topology_changed
    }
}

impl NodeStore {
    /// Evaluates the node tree, recomputing dirty properties and returning the
    /// set of changes.
    pub fn evaluate(&mut self) -> SceneChanges {
        let mut changes = SceneChanges::default();
        self.evaluate_into(&mut changes);
        changes
    }

    /// Like [`evaluate`](Self::evaluate), but reuses a caller-provided buffer.
    pub fn evaluate_into(&mut self, changes: &mut SceneChanges) {
        changes.clear();

        if self.traversal_dirty {
            self.rebuild_traversal_order();
            changes.topology_changed = true;
            self.traversal_dirty = false;
        }

        let dirty_offsets: Vec<u32> = self
            .dirty
            .drain(dirty::OFFSET)
            .affected()
            .deterministic()
            .run()
            .collect();
        for &idx in &dirty_offsets {
            let parent_idx = self.parent[idx as usize];
            let parent_world = if parent_idx != INVALID {
                self.world_offset[parent_idx as usize]
            } else {
                Offset::ZERO
            };
            self.world_offset[idx as usize] = parent_world + self.local_offset[idx as usize];
        }
        changes.offsets = dirty_offsets;

        let dirty_masks: Vec<u32> = self
            .dirty
            .drain(dirty::MASK)
            .affected()
            .deterministic()
            .run()
            .collect();
        for idx in dirty_masks {
            let parent_idx = self.parent[idx as usize];
            let parent_disabled =
                parent_idx != INVALID && self.effective_disabled[parent_idx as usize];
            let now = parent_disabled || self.mask[idx as usize].contains(NodeMask::DISABLED);
            if now != self.effective_disabled[idx as usize] {
                if now {
                    changes.disabled.push(idx);
                } else {
                    changes.enabled.push(idx);
                }
                self.effective_disabled[idx as usize] = now;
            }
        }

        changes.meshes = self
            .dirty
            .drain(dirty::MESH)
            .deterministic()
            .run()
            .collect();

        let _: Vec<u32> = self
            .dirty
            .drain(dirty::TOPOLOGY)
            .deterministic()
            .run()
            .collect();

        core::mem::swap(&mut self.pending_added, &mut changes.added);
        core::mem::swap(&mut self.pending_removed, &mut changes.removed);
    }

    /// Returns the current traversal order (depth-first pre-order).
    ///
    /// Only valid after [`evaluate`](Self::evaluate) has been called at least
    /// once.
    #[must_use]
    pub fn traversal_order(&self) -> &[u32] {
        &self.traversal_order
    }

    fn rebuild_traversal_order(&mut self) {
        self.traversal_order.clear();
        for idx in 0..self.len {
            if self.parent[idx as usize] == INVALID && !self.free_list.contains(&idx) {
                self.dfs_collect(idx);
            }
        }
    }

    fn dfs_collect(&mut self, idx: u32) {
        self.traversal_order.push(idx);
        let mut child = self.first_child[idx as usize];
        while child != INVALID {
            self.dfs_collect(child);
            child = self.next_sibling[child as usize];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::MeshId;
    use crate::node::NodeKind;

    #[test]
    fn evaluate_computes_world_offsets() {
        let mut store = NodeStore::new();
        let parent = store.create_node(NodeKind::Transform);
        let child = store.create_node(NodeKind::Transform);

        store.set_offset(parent, Offset::new(10.0, 0.0, 1.0));
        store.set_offset(child, Offset::new(0.0, 5.0, 0.0));
        store.add_child(parent, child);

        let _ = store.evaluate();

        assert_eq!(store.world_offset(parent), Offset::new(10.0, 0.0, 1.0));
        assert_eq!(store.world_offset(child), Offset::new(10.0, 5.0, 1.0));
    }

    #[test]
    fn moving_a_parent_moves_descendants() {
        let mut store = NodeStore::new();
        let a = store.create_node(NodeKind::Transform);
        let b = store.create_node(NodeKind::Transform);
        let c = store.create_node(NodeKind::Mesh(None));
        store.add_child(a, b);
        store.add_child(b, c);
        store.set_offset(b, Offset::new(1.0, 1.0, 0.0));
        let _ = store.evaluate();

        store.set_offset(a, Offset::new(4.0, 0.0, 0.0));
        let changes = store.evaluate();
        assert!(changes.offsets.contains(&c.idx));
        assert_eq!(store.world_offset(c), Offset::new(5.0, 1.0, 0.0));
    }

    #[test]
    fn no_change_evaluate_returns_empty() {
        let mut store = NodeStore::new();
        let _root = store.create_node(NodeKind::Group);
        let _ = store.evaluate();

        let changes = store.evaluate();
        assert!(changes.is_empty());
    }

    #[test]
    fn reapplying_the_same_state_is_not_a_change() {
        let mut store = NodeStore::new();
        let node = store.create_node(NodeKind::Mesh(Some(MeshId(1))));
        store.set_offset(node, Offset::new(2.0, 2.0, 0.0));
        store.set_type_mask(node, NodeMask::DISABLED);
        let _ = store.evaluate();

        store.set_offset(node, Offset::new(2.0, 2.0, 0.0));
        store.set_type_mask(node, NodeMask::DISABLED);
        store.set_mesh(node, Some(MeshId(1)));
        assert!(store.evaluate().is_empty());
    }

    #[test]
    fn disabled_mask_propagates_to_children() {
        let mut store = NodeStore::new();
        let parent = store.create_node(NodeKind::Group);
        let child = store.create_node(NodeKind::Mesh(None));
        store.add_child(parent, child);
        let _ = store.evaluate();

        store.set_type_mask(parent, NodeMask::DISABLED);
        let changes = store.evaluate();
        assert!(store.effective_disabled(parent));
        assert!(store.effective_disabled(child));
        assert!(changes.disabled.contains(&parent.idx));
        assert!(changes.disabled.contains(&child.idx));

        store.set_type_mask(parent, NodeMask::empty());
        let changes = store.evaluate();
        assert!(!store.effective_disabled(child));
        assert!(changes.enabled.contains(&child.idx));
    }

    #[test]
    fn child_mask_survives_parent_enable() {
        let mut store = NodeStore::new();
        let parent = store.create_node(NodeKind::Group);
        let child = store.create_node(NodeKind::Mesh(None));
        store.add_child(parent, child);
        store.set_type_mask(child, NodeMask::DISABLED);
        store.set_type_mask(parent, NodeMask::DISABLED);
        let _ = store.evaluate();

        store.set_type_mask(parent, NodeMask::empty());
        let _ = store.evaluate();
        assert!(!store.effective_disabled(parent));
        assert!(store.effective_disabled(child));
    }

    #[test]
    fn traversal_order_is_depth_first() {
        let mut store = NodeStore::new();
        let a = store.create_node(NodeKind::Group);
        let b = store.create_node(NodeKind::Group);
        let c = store.create_node(NodeKind::Group);
        let d = store.create_node(NodeKind::Group);
        store.add_child(a, b);
        store.add_child(a, c);
        store.add_child(b, d);

        let _ = store.evaluate();
        assert_eq!(store.traversal_order(), &[a.idx, b.idx, d.idx, c.idx]);
    }

    #[test]
    fn evaluate_tracks_mesh_rebinding() {
        let mut store = NodeStore::new();
        let node = store.create_node(NodeKind::Mesh(None));
        let _ = store.evaluate();

        store.set_mesh(node, Some(MeshId(4)));
        let changes = store.evaluate();
        assert_eq!(changes.meshes, [node.idx]);
    }

    #[test]
    fn evaluate_added_and_removed_lifecycle() {
        let mut store = NodeStore::new();
        let id = store.create_node(NodeKind::Group);

        let changes = store.evaluate();
        assert!(changes.added.contains(&id.idx));
        assert!(changes.removed.is_empty());

        let changes = store.evaluate();
        assert!(changes.added.is_empty());

        store.destroy_node(id);
        let changes = store.evaluate();
        assert!(changes.removed.contains(&id.idx));
        assert!(changes.topology_changed);
    }
}
