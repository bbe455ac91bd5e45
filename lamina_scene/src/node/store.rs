// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Struct-of-arrays node storage with allocation, topology and property management.

use alloc::vec::Vec;

use understory_dirty::{CycleHandling, DirtyTracker, EagerPolicy};

use super::id::{INVALID, MaterialId, NodeId};
use super::traverse::Children;
use crate::dirty;
use crate::mesh::MeshId;
use crate::transform::Offset;

bitflags::bitflags! {
    /// Per-node type mask.
    ///
    /// Renderers skip any node whose mask, or an ancestor's mask, contains
    /// [`DISABLED`](Self::DISABLED). Properties can still be mutated while
    /// disabled.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct NodeMask: u32 {
        /// The node and its subtree are not drawn.
        const DISABLED = 1 << 0;
    }
}

/// What a node contributes to rendering.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Plain grouping node.
    #[default]
    Group,
    /// Root of one widget's subtree.
    Widget,
    /// Binds a material for the meshes below it.
    Material(Option<MaterialId>),
    /// Binds a text material for the glyph meshes below it.
    TextMaterial(Option<MaterialId>),
    /// Positions its subtree; the translation is the node's offset.
    Transform,
    /// Draws a mesh, or nothing while unbound.
    Mesh(Option<MeshId>),
}

/// Struct-of-arrays storage for all scenegraph nodes.
///
/// Nodes are addressed by [`NodeId`] handles. Destroyed nodes are recycled via
/// a free list, and generation counters reject stale handles.
#[derive(Debug)]
pub struct NodeStore {
    // -- Topology --
    pub(crate) parent: Vec<u32>,
    pub(crate) first_child: Vec<u32>,
    pub(crate) next_sibling: Vec<u32>,
    pub(crate) prev_sibling: Vec<u32>,

    // -- Local properties (set by callers) --
    pub(crate) kind: Vec<NodeKind>,
    pub(crate) local_offset: Vec<Offset>,
    pub(crate) mask: Vec<NodeMask>,

    // -- Computed properties (written by evaluate) --
    pub(crate) world_offset: Vec<Offset>,
    pub(crate) effective_disabled: Vec<bool>,

    // -- Allocation --
    pub(crate) generation: Vec<u32>,
    pub(crate) free_list: Vec<u32>,
    pub(crate) len: u32,

    // -- Dirty tracking --
    pub(crate) dirty: DirtyTracker<u32>,

    // -- Traversal cache --
    pub(crate) traversal_order: Vec<u32>,
    pub(crate) traversal_dirty: bool,

    // -- Lifecycle tracking --
    pub(crate) pending_added: Vec<u32>,
    pub(crate) pending_removed: Vec<u32>,
}

impl Default for NodeStore {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeStore {
    /// Creates an empty node store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            parent: Vec::new(),
            first_child: Vec::new(),
            next_sibling: Vec::new(),
            prev_sibling: Vec::new(),
            kind: Vec::new(),
            local_offset: Vec::new(),
            mask: Vec::new(),
            world_offset: Vec::new(),
            effective_disabled: Vec::new(),
            generation: Vec::new(),
            free_list: Vec::new(),
            len: 0,
            dirty: DirtyTracker::with_cycle_handling(CycleHandling::Error),
            traversal_order: Vec::new(),
            traversal_dirty: true,
            pending_added: Vec::new(),
            pending_removed: Vec::new(),
        }
    }

    /// Returns the number of live nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.len as usize - self.free_list.len()
    }

    // -- Allocation API --

    /// Creates a detached node of the given kind and returns its handle.
    ///
    /// The node starts with a zero offset and an empty mask.
    pub fn create_node(&mut self, kind: NodeKind) -> NodeId {
        let idx = if let Some(idx) = self.free_list.pop() {
            let i = idx as usize;
            self.generation[i] += 1;
            self.parent[i] = INVALID;
            self.first_child[i] = INVALID;
            self.next_sibling[i] = INVALID;
            self.prev_sibling[i] = INVALID;
            self.kind[i] = kind;
            self.local_offset[i] = Offset::ZERO;
            self.mask[i] = NodeMask::empty();
            self.world_offset[i] = Offset::ZERO;
            self.effective_disabled[i] = false;
            idx
        } else {
            let idx = self.len;
            self.len += 1;
            self.parent.push(INVALID);
            self.first_child.push(INVALID);
            self.next_sibling.push(INVALID);
            self.prev_sibling.push(INVALID);
            self.kind.push(kind);
            self.local_offset.push(Offset::ZERO);
            self.mask.push(NodeMask::empty());
            self.world_offset.push(Offset::ZERO);
            self.effective_disabled.push(false);
            self.generation.push(0);
            idx
        };

        self.traversal_dirty = true;
        self.pending_added.push(idx);
        self.dirty.mark(idx, dirty::TOPOLOGY);

        self.handle(idx)
    }

    /// Destroys a leaf node, freeing its slot for reuse.
    ///
    /// # Panics
    ///
    /// Panics if the node has children or if the handle is stale.
    pub fn destroy_node(&mut self, id: NodeId) {
        self.validate(id);
        let idx = id.idx;
        assert!(
            self.first_child[idx as usize] == INVALID,
            "cannot destroy node with children"
        );

        if self.parent[idx as usize] != INVALID {
            let p = self.parent[idx as usize];
            self.unlink_from_parent(idx);
            self.dirty.mark(p, dirty::TOPOLOGY);
        }

        self.dirty.remove_key(idx);
        self.generation[idx as usize] += 1;

        self.free_list.push(idx);
        self.traversal_dirty = true;
        self.pending_removed.push(idx);
        self.dirty.mark(idx, dirty::TOPOLOGY);
    }

    /// Destroys a node together with all of its descendants.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn destroy_subtree(&mut self, id: NodeId) {
        let nodes = self.subtree(id);
        // Children before parents.
        for &node in nodes.iter().rev() {
            self.destroy_node(node);
        }
    }

    /// Returns whether the given handle refers to a live node.
    #[must_use]
    pub fn is_alive(&self, id: NodeId) -> bool {
        (id.idx < self.len)
            && self.generation[id.idx as usize] == id.generation
            && !self.free_list.contains(&id.idx)
    }

    // -- Topology API --

    /// Adds `child` as the last child of `parent`.
    ///
    /// Marks the inherited channels for `child`'s subtree so world offsets and
    /// effective visibility are recomputed under the new ancestry.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale, or if `child` already has a parent.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) {
        self.validate(parent);
        self.validate(child);
        let p = parent.idx;
        let c = child.idx;
        assert!(
            self.parent[c as usize] == INVALID,
            "child already has a parent"
        );

        self.parent[c as usize] = p;
        self.prev_sibling[c as usize] = INVALID;
        self.next_sibling[c as usize] = INVALID;

        if self.first_child[p as usize] == INVALID {
            self.first_child[p as usize] = c;
        } else {
            let mut last = self.first_child[p as usize];
            while self.next_sibling[last as usize] != INVALID {
                last = self.next_sibling[last as usize];
            }
            self.next_sibling[last as usize] = c;
            self.prev_sibling[c as usize] = last;
        }

        let _ = self.dirty.add_dependency(c, p, dirty::OFFSET);
        let _ = self.dirty.add_dependency(c, p, dirty::MASK);

        self.mark_subtree_inherited_dirty(c);
        self.traversal_dirty = true;
        self.dirty.mark(p, dirty::TOPOLOGY);
    }

    /// Detaches `child` from its current parent, making it a root.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or the node has no parent.
    pub fn remove_from_parent(&mut self, child: NodeId) {
        self.validate(child);
        let c = child.idx;
        assert!(self.parent[c as usize] != INVALID, "node has no parent");

        let p = self.parent[c as usize];
        self.unlink_from_parent(c);

        self.dirty.remove_dependency(c, p, dirty::OFFSET);
        self.dirty.remove_dependency(c, p, dirty::MASK);

        self.mark_subtree_inherited_dirty(c);
        self.traversal_dirty = true;
        self.dirty.mark(p, dirty::TOPOLOGY);
    }

    /// Returns the parent of a node, if any.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.validate(id);
        let p = self.parent[id.idx as usize];
        (p != INVALID).then(|| self.handle(p))
    }

    /// Returns an iterator over the direct children of a node.
    #[must_use]
    pub fn children(&self, id: NodeId) -> Children<'_> {
        self.validate(id);
        Children::new(self, self.first_child[id.idx as usize])
    }

    /// Returns `id` and all of its descendants in depth-first pre-order.
    #[must_use]
    pub fn subtree(&self, id: NodeId) -> Vec<NodeId> {
        self.validate(id);
        let mut out = Vec::new();
        self.collect_subtree(id.idx, &mut out);
        out
    }

    /// Returns the root nodes (those with no parent).
    #[must_use]
    pub fn roots(&self) -> Vec<NodeId> {
        (0..self.len)
            .filter(|&idx| self.parent[idx as usize] == INVALID && !self.free_list.contains(&idx))
            .map(|idx| self.handle(idx))
            .collect()
    }

    // -- Property getters (read-only, no dirty marking) --

    /// Returns the kind of a node.
    #[must_use]
    pub fn kind(&self, id: NodeId) -> NodeKind {
        self.validate(id);
        self.kind[id.idx as usize]
    }

    /// Returns the mesh bound to a mesh node.
    ///
    /// Returns `None` for unbound mesh nodes and for every other kind.
    #[must_use]
    pub fn mesh(&self, id: NodeId) -> Option<MeshId> {
        match self.kind(id) {
            NodeKind::Mesh(mesh) => mesh,
            _ => None,
        }
    }

    /// Returns the local offset of a node.
    #[must_use]
    pub fn local_offset(&self, id: NodeId) -> Offset {
        self.validate(id);
        self.local_offset[id.idx as usize]
    }

    /// Returns the type mask of a node.
    #[must_use]
    pub fn type_mask(&self, id: NodeId) -> NodeMask {
        self.validate(id);
        self.mask[id.idx as usize]
    }

    /// Returns the computed world offset of a node.
    ///
    /// Only valid after [`evaluate`](Self::evaluate) has been called.
    #[must_use]
    pub fn world_offset(&self, id: NodeId) -> Offset {
        self.validate(id);
        self.world_offset[id.idx as usize]
    }

    /// Returns whether the node is disabled by its own mask or an ancestor's.
    ///
    /// Only valid after [`evaluate`](Self::evaluate) has been called.
    #[must_use]
    pub fn effective_disabled(&self, id: NodeId) -> bool {
        self.validate(id);
        self.effective_disabled[id.idx as usize]
    }

    // -- Mutation API (auto-marks dirty) --
    //
    // Setting a property to its current value is a no-op, so widgets can
    // re-apply their whole state every pass without producing changes.

    /// Sets the local offset of a node.
    ///
    /// Marks the OFFSET channel dirty with eager propagation to descendants.
    pub fn set_offset(&mut self, id: NodeId, offset: Offset) {
        self.validate(id);
        if self.local_offset[id.idx as usize] == offset {
            return;
        }
        self.local_offset[id.idx as usize] = offset;
        self.dirty.mark_with(id.idx, dirty::OFFSET, &EagerPolicy);
    }

    /// Sets the type mask of a node.
    ///
    /// Marks the MASK channel dirty with eager propagation to descendants.
    pub fn set_type_mask(&mut self, id: NodeId, mask: NodeMask) {
        self.validate(id);
        if self.mask[id.idx as usize] == mask {
            return;
        }
        self.mask[id.idx as usize] = mask;
        self.dirty.mark_with(id.idx, dirty::MASK, &EagerPolicy);
    }

    /// Binds a mesh to a mesh node.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or the node is not a mesh node.
    pub fn set_mesh(&mut self, id: NodeId, mesh: Option<MeshId>) {
        self.validate(id);
        let slot = &mut self.kind[id.idx as usize];
        assert!(matches!(slot, NodeKind::Mesh(_)), "node is not a mesh node");
        if *slot == NodeKind::Mesh(mesh) {
            return;
        }
        *slot = NodeKind::Mesh(mesh);
        self.dirty.mark(id.idx, dirty::MESH);
    }

    /// Binds a material to a material or text material node.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or the node is not a material node.
    pub fn set_material(&mut self, id: NodeId, material: Option<MaterialId>) {
        self.validate(id);
        let next = match self.kind[id.idx as usize] {
            NodeKind::Material(_) => NodeKind::Material(material),
            NodeKind::TextMaterial(_) => NodeKind::TextMaterial(material),
            _ => panic!("node is not a material node"),
        };
        if self.kind[id.idx as usize] == next {
            return;
        }
        self.kind[id.idx as usize] = next;
        self.dirty.mark(id.idx, dirty::MESH);
    }

    // -- Raw-index accessors for renderers --
    //
    // These accept raw slot indices (as found in `SceneChanges`) rather than
    // `NodeId` handles, skipping generation validation.

    /// Returns the kind at raw slot `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= self.len`.
    #[must_use]
    pub fn kind_at(&self, idx: u32) -> NodeKind {
        assert!(
            idx < self.len,
            "slot index {idx} out of range (len {})",
            self.len
        );
        self.kind[idx as usize]
    }

    /// Returns the computed world offset at raw slot `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= self.len`.
    #[must_use]
    pub fn world_offset_at(&self, idx: u32) -> Offset {
        assert!(
            idx < self.len,
            "slot index {idx} out of range (len {})",
            self.len
        );
        self.world_offset[idx as usize]
    }

    /// Returns whether the node at raw slot `idx` is effectively disabled.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= self.len`.
    #[must_use]
    pub fn effective_disabled_at(&self, idx: u32) -> bool {
        assert!(
            idx < self.len,
            "slot index {idx} out of range (len {})",
            self.len
        );
        self.effective_disabled[idx as usize]
    }

    // -- Internal helpers --

    pub(crate) fn handle(&self, idx: u32) -> NodeId {
        NodeId {
            idx,
            generation: self.generation[idx as usize],
        }
    }

    /// Panics if the handle is stale.
    fn validate(&self, id: NodeId) {
        assert!(
            id.idx < self.len && self.generation[id.idx as usize] == id.generation,
            "stale NodeId: {id:?} (current gen: {})",
            if id.idx < self.len {
                self.generation[id.idx as usize]
            } else {
                u32::MAX
            }
        );
    }

    /// Removes `idx` from its parent's child list without touching dirty state.
    fn unlink_from_parent(&mut self, idx: u32) {
        let p = self.parent[idx as usize];
        let prev = self.prev_sibling[idx as usize];
        let next = self.next_sibling[idx as usize];

        if prev != INVALID {
            self.next_sibling[prev as usize] = next;
        } else {
            self.first_child[p as usize] = next;
        }

        if next != INVALID {
            self.prev_sibling[next as usize] = prev;
        }

        self.parent[idx as usize] = INVALID;
        self.prev_sibling[idx as usize] = INVALID;
        self.next_sibling[idx as usize] = INVALID;
    }

    fn collect_subtree(&self, idx: u32, out: &mut Vec<NodeId>) {
        out.push(self.handle(idx));
        let mut child = self.first_child[idx as usize];
        while child != INVALID {
            self.collect_subtree(child, out);
            child = self.next_sibling[child as usize];
        }
    }

    fn mark_subtree_inherited_dirty(&mut self, idx: u32) {
        self.dirty.mark_with(idx, dirty::OFFSET, &EagerPolicy);
        self.dirty.mark_with(idx, dirty::MASK, &EagerPolicy);
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;

    #[test]
    fn create_and_destroy() {
        let mut store = NodeStore::new();
        let id = store.create_node(NodeKind::Group);
        assert!(store.is_alive(id));
        assert_eq!(store.node_count(), 1);
        store.destroy_node(id);
        assert!(!store.is_alive(id));
        assert_eq!(store.node_count(), 0);
    }

    #[test]
    fn generation_prevents_stale_access() {
        let mut store = NodeStore::new();
        let id1 = store.create_node(NodeKind::Group);
        store.destroy_node(id1);
        let id2 = store.create_node(NodeKind::Transform);
        assert!(!store.is_alive(id1));
        assert!(store.is_alive(id2));
        assert_eq!(id1.idx, id2.idx);
        assert_ne!(id1.generation, id2.generation);
        assert_eq!(store.kind(id2), NodeKind::Transform);
    }

    #[test]
    fn add_child_and_query() {
        let mut store = NodeStore::new();
        let parent = store.create_node(NodeKind::Widget);
        let a = store.create_node(NodeKind::Transform);
        let b = store.create_node(NodeKind::Mesh(None));

        store.add_child(parent, a);
        store.add_child(parent, b);

        assert_eq!(store.parent(a), Some(parent));
        let kids: Vec<_> = store.children(parent).collect();
        assert_eq!(kids, vec![a, b]);
        assert_eq!(store.roots(), vec![parent]);
    }

    #[test]
    fn remove_from_parent_makes_a_root() {
        let mut store = NodeStore::new();
        let parent = store.create_node(NodeKind::Group);
        let child = store.create_node(NodeKind::Group);
        store.add_child(parent, child);

        store.remove_from_parent(child);
        assert_eq!(store.parent(child), None);
        assert!(store.children(parent).next().is_none());
        assert!(store.roots().contains(&child));
    }

    #[test]
    fn subtree_is_pre_order() {
        let mut store = NodeStore::new();
        let a = store.create_node(NodeKind::Group);
        let b = store.create_node(NodeKind::Group);
        let c = store.create_node(NodeKind::Group);
        let d = store.create_node(NodeKind::Group);

        // Tree: a -> [b -> [d], c]
        store.add_child(a, b);
        store.add_child(a, c);
        store.add_child(b, d);

        assert_eq!(store.subtree(a), vec![a, b, d, c]);
    }

    #[test]
    fn destroy_subtree_frees_descendants() {
        let mut store = NodeStore::new();
        let root = store.create_node(NodeKind::Group);
        let widget = store.create_node(NodeKind::Widget);
        let xf = store.create_node(NodeKind::Transform);
        let mesh = store.create_node(NodeKind::Mesh(None));
        store.add_child(root, widget);
        store.add_child(widget, xf);
        store.add_child(xf, mesh);

        store.destroy_subtree(widget);
        assert!(store.is_alive(root));
        assert!(!store.is_alive(widget));
        assert!(!store.is_alive(xf));
        assert!(!store.is_alive(mesh));
        assert!(store.children(root).next().is_none());
        assert_eq!(store.node_count(), 1);
    }

    #[test]
    fn set_mesh_rebinds() {
        let mut store = NodeStore::new();
        let node = store.create_node(NodeKind::Mesh(None));
        assert_eq!(store.mesh(node), None);
        store.set_mesh(node, Some(MeshId(7)));
        assert_eq!(store.mesh(node), Some(MeshId(7)));
    }

    #[test]
    fn set_material_keeps_text_kind() {
        let mut store = NodeStore::new();
        let node = store.create_node(NodeKind::TextMaterial(None));
        store.set_material(node, Some(MaterialId(3)));
        assert_eq!(store.kind(node), NodeKind::TextMaterial(Some(MaterialId(3))));
    }

    #[test]
    #[should_panic(expected = "node is not a mesh node")]
    fn set_mesh_on_group_panics() {
        let mut store = NodeStore::new();
        let node = store.create_node(NodeKind::Group);
        store.set_mesh(node, Some(MeshId(1)));
    }

    #[test]
    #[should_panic(expected = "cannot destroy node with children")]
    fn destroy_with_children_panics() {
        let mut store = NodeStore::new();
        let parent = store.create_node(NodeKind::Group);
        let child = store.create_node(NodeKind::Group);
        store.add_child(parent, child);
        store.destroy_node(parent);
    }

    #[test]
    #[should_panic(expected = "stale NodeId")]
    fn destroyed_handle_panics_on_set_offset() {
        let mut store = NodeStore::new();
        let id = store.create_node(NodeKind::Transform);
        store.destroy_node(id);
        store.set_offset(id, Offset::new(1.0, 0.0, 0.0));
    }

    #[test]
    #[should_panic(expected = "child already has a parent")]
    fn double_parenting_panics() {
        let mut store = NodeStore::new();
        let a = store.create_node(NodeKind::Group);
        let b = store.create_node(NodeKind::Group);
        let child = store.create_node(NodeKind::Group);
        store.add_child(a, child);
        store.add_child(b, child);
    }
}
