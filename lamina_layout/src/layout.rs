// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Struct-of-arrays element storage and the flow solver.

use alloc::vec::Vec;

use kurbo::{Point, Rect};

use crate::id::{ElementId, INVALID, LayoutId};
use crate::length::{Margin, Size};

/// How an element arranges its children.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ElementKind {
    /// No children.
    #[default]
    Leaf,
    /// Children are placed left to right.
    HorizontalFlow,
    /// Children are placed top to bottom.
    VerticalFlow,
}

/// The resolved rectangle of one element, produced by [`Layout::generate`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Block {
    /// The element this block was generated for.
    pub id: ElementId,
    /// Absolute bounds, excluding margins.
    pub bounds: Rect,
}

/// Returns the bounds of the block generated for `id`, if any.
#[must_use]
pub fn bounds_of(blocks: &[Block], id: ElementId) -> Option<Rect> {
    blocks.iter().find(|b| b.id == id).map(|b| b.bounds)
}

/// A tree of layout elements plus the target rectangle it is solved against.
///
/// Elements are appended and never removed; handles stay valid for the
/// lifetime of the layout.
#[derive(Debug)]
pub struct Layout {
    id: LayoutId,

    // -- Topology --
    parent: Vec<u32>,
    first_child: Vec<u32>,
    last_child: Vec<u32>,
    next_sibling: Vec<u32>,
    root: u32,

    // -- Element properties --
    kind: Vec<ElementKind>,
    size: Vec<Size>,
    margin: Vec<Margin>,

    // -- Target --
    target: kurbo::Size,
    offset: Point,
}

impl Default for Layout {
    fn default() -> Self {
        Self::new()
    }
}

impl Layout {
    /// Creates an empty layout with a zero target size at the origin.
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: LayoutId::next(),
            parent: Vec::new(),
            first_child: Vec::new(),
            last_child: Vec::new(),
            next_sibling: Vec::new(),
            root: INVALID,
            kind: Vec::new(),
            size: Vec::new(),
            margin: Vec::new(),
            target: kurbo::Size::ZERO,
            offset: Point::ORIGIN,
        }
    }

    /// Returns this layout's identity.
    #[must_use]
    pub fn id(&self) -> LayoutId {
        self.id
    }

    /// Returns whether `id` is an element of this layout.
    #[must_use]
    pub fn contains(&self, id: ElementId) -> bool {
        id.layout == self.id && (id.idx as usize) < self.kind.len()
    }

    /// Returns the number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.kind.len()
    }

    /// Returns whether the layout has no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.kind.is_empty()
    }

    // -- Construction --

    /// Creates the root element.
    ///
    /// # Panics
    ///
    /// Panics if the layout already has a root.
    pub fn set_root(&mut self, kind: ElementKind) -> ElementId {
        assert!(self.root == INVALID, "layout already has a root");
        let id = self.push(kind, INVALID);
        self.root = id.idx;
        id
    }

    /// Returns the root element, if one was created.
    #[must_use]
    pub fn root(&self) -> Option<ElementId> {
        (self.root != INVALID).then(|| self.handle(self.root))
    }

    /// Appends a new element as the last child of `parent`.
    ///
    /// # Panics
    ///
    /// Panics if `parent` belongs to another layout or is a
    /// [`Leaf`](ElementKind::Leaf).
    pub fn append(&mut self, parent: ElementId, kind: ElementKind) -> ElementId {
        self.validate(parent);
        let p = parent.idx;
        assert!(
            self.kind[p as usize] != ElementKind::Leaf,
            "leaf elements cannot have children"
        );
        let id = self.push(kind, p);
        let c = id.idx;
        if self.first_child[p as usize] == INVALID {
            self.first_child[p as usize] = c;
        } else {
            let last = self.last_child[p as usize];
            self.next_sibling[last as usize] = c;
        }
        self.last_child[p as usize] = c;
        id
    }

    /// Returns the parent of an element, if any.
    #[must_use]
    pub fn parent(&self, id: ElementId) -> Option<ElementId> {
        self.validate(id);
        let p = self.parent[id.idx as usize];
        (p != INVALID).then(|| self.handle(p))
    }

    /// Returns an iterator over the direct children of an element.
    #[must_use]
    pub fn children(&self, id: ElementId) -> Children<'_> {
        self.validate(id);
        Children {
            layout: self,
            current: self.first_child[id.idx as usize],
        }
    }

    // -- Element properties --

    /// Returns the kind of an element.
    #[must_use]
    pub fn kind(&self, id: ElementId) -> ElementKind {
        self.validate(id);
        self.kind[id.idx as usize]
    }

    /// Returns the size of an element.
    #[must_use]
    pub fn element_size(&self, id: ElementId) -> Size {
        self.validate(id);
        self.size[id.idx as usize]
    }

    /// Sets the size of an element.
    pub fn set_element_size(&mut self, id: ElementId, size: Size) {
        self.validate(id);
        self.size[id.idx as usize] = size;
    }

    /// Returns the margin of an element.
    #[must_use]
    pub fn element_margin(&self, id: ElementId) -> Margin {
        self.validate(id);
        self.margin[id.idx as usize]
    }

    /// Sets the margin of an element.
    pub fn set_element_margin(&mut self, id: ElementId, margin: Margin) {
        self.validate(id);
        self.margin[id.idx as usize] = margin;
    }

    // -- Target --

    /// Returns the target size the root is resolved against.
    #[must_use]
    pub fn size(&self) -> kurbo::Size {
        self.target
    }

    /// Sets the target size.
    pub fn set_size(&mut self, size: kurbo::Size) {
        self.target = size;
    }

    /// Returns the top-left corner of the target rectangle.
    #[must_use]
    pub fn offset(&self) -> Point {
        self.offset
    }

    /// Sets the top-left corner of the target rectangle.
    pub fn set_offset(&mut self, offset: Point) {
        self.offset = offset;
    }

    /// Returns the target rectangle.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        Rect::from_origin_size(self.offset, self.target)
    }

    // -- Solving --

    /// Resolves every element and returns its block, in depth-first pre-order.
    ///
    /// An empty layout produces no blocks.
    #[must_use]
    pub fn generate(&self) -> Vec<Block> {
        let mut blocks = Vec::with_capacity(self.kind.len());
        self.generate_into(&mut blocks);
        blocks
    }

    /// Like [`generate`](Self::generate), but reuses a caller-provided buffer.
    pub fn generate_into(&self, blocks: &mut Vec<Block>) {
        blocks.clear();
        if self.root != INVALID {
            self.place(self.root, self.offset, self.target, blocks);
        }
    }

    /// Places `idx` with its margin box starting at `origin`, resolving
    /// relative lengths against `extent`. Returns the margin box size.
    fn place(
        &self,
        idx: u32,
        origin: Point,
        extent: kurbo::Size,
        blocks: &mut Vec<Block>,
    ) -> kurbo::Size {
        let size = self.size[idx as usize];
        let margin = self.margin[idx as usize];
        let width = size.width.resolve(extent.width);
        let height = size.height.resolve(extent.height);
        let left = margin.left.resolve(extent.width);
        let right = margin.right.resolve(extent.width);
        let top = margin.top.resolve(extent.height);
        let bottom = margin.bottom.resolve(extent.height);

        let bounds = Rect::from_origin_size(
            (origin.x + left, origin.y + top),
            (width, height),
        );
        blocks.push(Block {
            id: self.handle(idx),
            bounds,
        });

        let kind = self.kind[idx as usize];
        let mut cursor = bounds.origin();
        let mut child = self.first_child[idx as usize];
        while child != INVALID {
            let outer = self.place(child, cursor, bounds.size(), blocks);
            match kind {
                ElementKind::HorizontalFlow => cursor.x += outer.width,
                ElementKind::VerticalFlow => cursor.y += outer.height,
                ElementKind::Leaf => unreachable!("leaf elements cannot have children"),
            }
            child = self.next_sibling[child as usize];
        }

        kurbo::Size::new(left + width + right, top + height + bottom)
    }

    // -- Internal helpers --

    fn push(&mut self, kind: ElementKind, parent: u32) -> ElementId {
        let idx = u32::try_from(self.kind.len()).unwrap_or(INVALID);
        assert!(idx != INVALID, "too many layout elements");
        self.parent.push(parent);
        self.first_child.push(INVALID);
        self.last_child.push(INVALID);
        self.next_sibling.push(INVALID);
        self.kind.push(kind);
        self.size.push(Size::default());
        self.margin.push(Margin::default());
        self.handle(idx)
    }

    fn handle(&self, idx: u32) -> ElementId {
        ElementId {
            layout: self.id,
            idx,
        }
    }

    /// Panics if the handle does not belong to this layout.
    fn validate(&self, id: ElementId) {
        assert!(
            self.contains(id),
            "foreign ElementId: {id:?} (layout is {:?})",
            self.id
        );
    }
}

/// An iterator over the direct children of an element.
///
/// Created by [`Layout::children`].
#[derive(Debug)]
pub struct Children<'a> {
    layout: &'a Layout,
    current: u32,
}

impl Iterator for Children<'_> {
    type Item = ElementId;

    fn next(&mut self) -> Option<ElementId> {
        if self.current == INVALID {
            return None;
        }
        let idx = self.current;
        self.current = self.layout.next_sibling[idx as usize];
        Some(self.layout.handle(idx))
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use super::*;
    use crate::length::Length;

    fn sized(layout: &mut Layout, id: ElementId, width: Length, height: Length) {
        layout.set_element_size(id, Size::new(width, height));
    }

    #[test]
    fn empty_layout_generates_nothing() {
        let layout = Layout::new();
        assert!(layout.generate().is_empty());
    }

    #[test]
    fn root_fills_target() {
        let mut layout = Layout::new();
        let root = layout.set_root(ElementKind::Leaf);
        layout.set_size(kurbo::Size::new(200.0, 40.0));
        layout.set_offset(Point::new(10.0, 5.0));

        let blocks = layout.generate();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].id, root);
        assert_eq!(blocks[0].bounds, Rect::new(10.0, 5.0, 210.0, 45.0));
    }

    #[test]
    fn horizontal_flow_splits_relative_widths() {
        let mut layout = Layout::new();
        let root = layout.set_root(ElementKind::HorizontalFlow);
        let a = layout.append(root, ElementKind::Leaf);
        let b = layout.append(root, ElementKind::Leaf);
        sized(&mut layout, a, Length::Relative(0.1), Length::FULL);
        sized(&mut layout, b, Length::Relative(0.9), Length::FULL);
        layout.set_size(kurbo::Size::new(200.0, 20.0));

        let blocks = layout.generate();
        assert_eq!(bounds_of(&blocks, a), Some(Rect::new(0.0, 0.0, 20.0, 20.0)));
        assert_eq!(bounds_of(&blocks, b), Some(Rect::new(20.0, 0.0, 200.0, 20.0)));
    }

    #[test]
    fn vertical_flow_stacks_children() {
        let mut layout = Layout::new();
        let root = layout.set_root(ElementKind::VerticalFlow);
        let a = layout.append(root, ElementKind::Leaf);
        let b = layout.append(root, ElementKind::Leaf);
        sized(&mut layout, a, Length::FULL, Length::Absolute(10.0));
        sized(&mut layout, b, Length::Relative(0.5), Length::FULL * 3.0);
        layout.set_size(kurbo::Size::new(100.0, 10.0));

        let blocks = layout.generate();
        assert_eq!(bounds_of(&blocks, a), Some(Rect::new(0.0, 0.0, 100.0, 10.0)));
        // Overflowing children extend past their parent.
        assert_eq!(bounds_of(&blocks, b), Some(Rect::new(0.0, 10.0, 50.0, 40.0)));
    }

    #[test]
    fn margins_offset_blocks_and_advance_the_cursor() {
        let mut layout = Layout::new();
        let root = layout.set_root(ElementKind::HorizontalFlow);
        let a = layout.append(root, ElementKind::Leaf);
        let b = layout.append(root, ElementKind::Leaf);
        sized(&mut layout, a, Length::Absolute(10.0), Length::Absolute(10.0));
        sized(&mut layout, b, Length::Absolute(10.0), Length::Absolute(10.0));
        layout.set_element_margin(a, Margin::uniform(Length::Absolute(2.0)));
        layout.set_size(kurbo::Size::new(100.0, 100.0));

        let blocks = layout.generate();
        assert_eq!(bounds_of(&blocks, a), Some(Rect::new(2.0, 2.0, 12.0, 12.0)));
        assert_eq!(bounds_of(&blocks, b), Some(Rect::new(14.0, 0.0, 24.0, 10.0)));
    }

    #[test]
    fn blocks_are_depth_first_pre_order() {
        let mut layout = Layout::new();
        let root = layout.set_root(ElementKind::VerticalFlow);
        let row = layout.append(root, ElementKind::HorizontalFlow);
        let cell = layout.append(row, ElementKind::Leaf);
        let footer = layout.append(root, ElementKind::Leaf);

        let order: Vec<_> = layout.generate().iter().map(|b| b.id).collect();
        assert_eq!(order, [root, row, cell, footer]);
        let kids: Vec<_> = layout.children(root).collect();
        assert_eq!(kids, [row, footer]);
        assert_eq!(layout.parent(cell), Some(row));
    }

    #[test]
    fn contains_rejects_foreign_elements() {
        let mut a = Layout::new();
        let mut b = Layout::new();
        let root_a = a.set_root(ElementKind::Leaf);
        let root_b = b.set_root(ElementKind::Leaf);
        assert!(a.contains(root_a));
        assert!(!a.contains(root_b));
        assert_ne!(a.id(), b.id());
    }

    #[test]
    #[should_panic(expected = "leaf elements cannot have children")]
    fn append_to_leaf_panics() {
        let mut layout = Layout::new();
        let root = layout.set_root(ElementKind::Leaf);
        layout.append(root, ElementKind::Leaf);
    }

    #[test]
    #[should_panic(expected = "layout already has a root")]
    fn second_root_panics() {
        let mut layout = Layout::new();
        layout.set_root(ElementKind::Leaf);
        layout.set_root(ElementKind::Leaf);
    }

    #[test]
    #[should_panic(expected = "foreign ElementId")]
    fn foreign_handle_panics() {
        let mut a = Layout::new();
        let mut b = Layout::new();
        a.set_root(ElementKind::Leaf);
        let root_b = b.set_root(ElementKind::HorizontalFlow);
        let _ = a.kind(root_b);
    }
}
