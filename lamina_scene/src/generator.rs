// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The scenegraph capability handed to widgets.
//!
//! A widget builds its node subtree once through the `create_*` methods and
//! afterwards only calls [`set_offset`](ScenegraphGenerator::set_offset),
//! [`set_mesh`](ScenegraphGenerator::set_mesh),
//! [`set_material`](ScenegraphGenerator::set_material) and
//! [`set_type_mask`](ScenegraphGenerator::set_type_mask). Every created node
//! is attached to the given parent immediately.

use crate::mesh::MeshId;
use crate::node::{MaterialId, NodeId, NodeKind, NodeMask, NodeStore, SceneChanges};
use crate::transform::Offset;

/// Builds and mutates scenegraph nodes on behalf of widgets.
pub trait ScenegraphGenerator {
    /// Creates the root node of a widget's subtree under `parent`, or under
    /// the generator's scene root when `parent` is `None`.
    fn create_widget_node(&mut self, parent: Option<NodeId>) -> NodeId;

    /// Creates a node binding `material` for the meshes below it.
    fn create_material_node(&mut self, parent: NodeId, material: Option<MaterialId>) -> NodeId;

    /// Creates a node binding a text material for the glyph meshes below it.
    fn create_text_material_node(&mut self, parent: NodeId, material: Option<MaterialId>)
    -> NodeId;

    /// Creates a transform node at `offset`.
    fn create_transform_node(&mut self, parent: NodeId, offset: Offset) -> NodeId;

    /// Creates a plain grouping node.
    fn create_group_node(&mut self, parent: NodeId) -> NodeId;

    /// Creates a node drawing `mesh`, or nothing while `None`.
    fn create_mesh_node(&mut self, parent: NodeId, mesh: Option<MeshId>) -> NodeId;

    /// Moves a node.
    fn set_offset(&mut self, node: NodeId, offset: Offset);

    /// Rebinds the mesh of a mesh node.
    fn set_mesh(&mut self, node: NodeId, mesh: Option<MeshId>);

    /// Rebinds the material of a material or text material node.
    fn set_material(&mut self, node: NodeId, material: Option<MaterialId>);

    /// Replaces the type mask of a node.
    fn set_type_mask(&mut self, node: NodeId, mask: NodeMask);

    /// Destroys a node and its whole subtree.
    fn destroy_node(&mut self, node: NodeId);
}

/// A [`ScenegraphGenerator`] backed by a [`NodeStore`].
///
/// The store starts with a single group node, the scene root, under which
/// parentless widget nodes are attached.
#[derive(Debug)]
pub struct SceneGenerator {
    store: NodeStore,
    root: NodeId,
}

impl Default for SceneGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneGenerator {
    /// Creates a generator over an empty scene.
    #[must_use]
    pub fn new() -> Self {
        let mut store = NodeStore::new();
        let root = store.create_node(NodeKind::Group);
        Self { store, root }
    }

    /// Returns the scene root.
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Returns the underlying node store.
    #[must_use]
    pub fn store(&self) -> &NodeStore {
        &self.store
    }

    /// Evaluates the scene and returns what changed since the last call.
    pub fn evaluate(&mut self) -> SceneChanges {
        self.store.evaluate()
    }

    fn create(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
        let node = self.store.create_node(kind);
        self.store.add_child(parent, node);
        node
    }
}

impl ScenegraphGenerator for SceneGenerator {
    fn create_widget_node(&mut self, parent: Option<NodeId>) -> NodeId {
        self.create(parent.unwrap_or(self.root), NodeKind::Widget)
    }

    fn create_material_node(&mut self, parent: NodeId, material: Option<MaterialId>) -> NodeId {
        self.create(parent, NodeKind::Material(material))
    }

    fn create_text_material_node(
        &mut self,
        parent: NodeId,
        material: Option<MaterialId>,
    ) -> NodeId {
        self.create(parent, NodeKind::TextMaterial(material))
    }

    fn create_transform_node(&mut self, parent: NodeId, offset: Offset) -> NodeId {
        let node = self.create(parent, NodeKind::Transform);
        self.store.set_offset(node, offset);
        node
    }

    fn create_group_node(&mut self, parent: NodeId) -> NodeId {
        self.create(parent, NodeKind::Group)
    }

    fn create_mesh_node(&mut self, parent: NodeId, mesh: Option<MeshId>) -> NodeId {
        self.create(parent, NodeKind::Mesh(mesh))
    }

    fn set_offset(&mut self, node: NodeId, offset: Offset) {
        self.store.set_offset(node, offset);
    }

    fn set_mesh(&mut self, node: NodeId, mesh: Option<MeshId>) {
        self.store.set_mesh(node, mesh);
    }

    fn set_material(&mut self, node: NodeId, material: Option<MaterialId>) {
        self.store.set_material(node, material);
    }

    fn set_type_mask(&mut self, node: NodeId, mask: NodeMask) {
        self.store.set_type_mask(node, mask);
    }

    fn destroy_node(&mut self, node: NodeId) {
        self.store.destroy_subtree(node);
    }
}
