// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A labelled selection box with a scrollable item list.
//!
//! The private layout is a vertical flow of the *active* row (box and label,
//! side by side) and the item list below it. The list is `items.max` rows
//! tall and only shown while the dropdown is open.
//!
//! Item rows are a fixed pool of `items.max` scenegraph nodes. Row `r` shows
//! item `scroll + r`; scrolling rebinds row meshes instead of creating nodes.
//!
//! ```text
//! widget node
//! ├── material node
//! │   ├── transform (box centre)
//! │   │   ├── frame
//! │   │   └── highlight          hidden unless hovered
//! │   └── list group             hidden unless open
//! │       ├── transform (list centre, behind)
//! │       │   └── backdrop
//! │       └── transform (highlighted row, behind)
//! │           └── row highlight  hidden unless a visible row is highlighted
//! └── text material node
//!     ├── transform (box origin)
//!     │   └── value
//!     ├── transform (label origin)
//!     │   └── label
//!     └── rows group             hidden unless open
//!         └── transform (row r) × items.max
//!             └── item scroll + r
//! ```

use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;

use kurbo::{Point, Rect};
use lamina_layout::{ElementId, ElementKind, Length, Margin, Size};
use lamina_scene::font::FontMap;
use lamina_scene::generator::ScenegraphGenerator;
use lamina_scene::mesh::{FillMode, MeshDesc, MeshId, MeshManager, Rgba};
use lamina_scene::node::NodeId;
use lamina_scene::transform::Offset;

use super::toggle::{
    BOX_WIDTH_DEFAULT, LABEL_WIDTH_DEFAULT, common, rebuild_mesh, style_color, style_font,
    style_length, style_material, visibility,
};
use super::{Retired, Widget, WidgetBase, WidgetContext, WidgetKind};
use crate::data::{IntegralValueDataSource, ListDataSource};
use crate::error::Error;
use crate::input::{InputResult, MouseClickEvent, MouseMoveEvent, MouseScrollEvent};
use crate::stale::{Change, StaleData};

const BOX_WIDTH: &str = "dropdown.box.width";
const BOX_HEIGHT: &str = "dropdown.box.height";
const BOX_SIZE: &str = "dropdown.box.size";
const BOX_MARGIN: &str = "dropdown.box.margin";
const LABEL_WIDTH: &str = "dropdown.label.width";
const LABEL_HEIGHT: &str = "dropdown.label.height";
const LABEL_SIZE: &str = "dropdown.label.size";
const LABEL_MARGIN: &str = "dropdown.label.margin";
const ITEMS_HEIGHT: &str = "dropdown.items.height";
const ITEMS_MAX: &str = "dropdown.items.max";
const MATERIAL_WIDGET: &str = "dropdown.material.widget";
const MATERIAL_TEXT: &str = "dropdown.material.text";

/// Number of visible rows without an `items.max` style.
pub const ITEMS_MAX_DEFAULT: usize = 20;

const BOX_INSET: f64 = 2.0;
const BACKDROP_DEPTH: f64 = -0.2;
const ROW_HIGHLIGHT_DEPTH: f64 = -0.1;

#[derive(Clone, Copy, Debug)]
struct DropdownElements {
    root: ElementId,
    active: ElementId,
    boxed: ElementId,
    label: ElementId,
    items: ElementId,
}

#[derive(Clone, Copy, Debug)]
struct DropdownBounds {
    boxed: Rect,
    label: Rect,
    items: Rect,
}

/// Mesh handles of a dropdown.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DropdownMeshes {
    /// Box outline.
    pub frame: MeshId,
    /// Filled box shown while hovered.
    pub highlight: MeshId,
    /// Text of the selected item.
    pub value: MeshId,
    /// Label text.
    pub label: MeshId,
    /// Backdrop of the item list.
    pub backdrop: MeshId,
    /// Outline of the highlighted row.
    pub row_highlight: MeshId,
    /// One text mesh per item.
    pub items: Vec<MeshId>,
}

/// One pooled item row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DropdownRow {
    /// Transform placing the row.
    pub transform: NodeId,
    /// Mesh node showing the row's item.
    pub mesh: NodeId,
}

/// Scenegraph node handles of a dropdown.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DropdownNodes {
    /// Widget root.
    pub root: NodeId,
    /// Material for the box and list meshes.
    pub material: NodeId,
    /// Material for text.
    pub text_material: NodeId,
    /// Transform placing the box meshes.
    pub box_transform: NodeId,
    /// Box outline.
    pub frame: NodeId,
    /// Hover highlight.
    pub highlight: NodeId,
    /// Group of the list backdrop and row highlight.
    pub list: NodeId,
    /// Transform placing the backdrop.
    pub backdrop_transform: NodeId,
    /// List backdrop.
    pub backdrop: NodeId,
    /// Transform placing the row highlight.
    pub row_highlight_transform: NodeId,
    /// Row highlight.
    pub row_highlight: NodeId,
    /// Transform placing the value text.
    pub value_transform: NodeId,
    /// Value text.
    pub value: NodeId,
    /// Transform placing the label.
    pub label_transform: NodeId,
    /// Label text.
    pub label: NodeId,
    /// Group of the item rows.
    pub rows_group: NodeId,
    /// The row pool.
    pub rows: Vec<DropdownRow>,
}

/// A dropdown.
///
/// Items come from a [`ListDataSource`], the selection from an
/// [`IntegralValueDataSource`] holding an item index. A left press opens the
/// list; while open, moving the cursor or turning the wheel highlights the
/// row under the cursor, and a press on an item row commits that item before
/// closing. A press anywhere else closes the list without committing.
#[derive(Debug)]
pub struct Dropdown {
    base: WidgetBase,
    label: String,
    items_source: Option<Rc<dyn ListDataSource>>,
    index_source: Option<Rc<dyn IntegralValueDataSource>>,

    // -- Interaction --
    opened: bool,
    /// Absolute item index.
    highlighted: Option<usize>,
    scroll: usize,

    // -- Generated --
    items_max: usize,
    elements: Option<DropdownElements>,
    meshes: Option<DropdownMeshes>,
    nodes: Option<DropdownNodes>,
}

impl Dropdown {
    /// Creates an unbound, closed dropdown.
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            base: WidgetBase::new(),
            label: label.into(),
            items_source: None,
            index_source: None,
            opened: false,
            highlighted: None,
            scroll: 0,
            items_max: ITEMS_MAX_DEFAULT,
            elements: None,
            meshes: None,
            nodes: None,
        }
    }

    /// Returns the label.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Replaces the label.
    pub fn set_label(&mut self, label: impl Into<String>) {
        let label = label.into();
        if self.label != label {
            self.label = label;
            self.base.invalidate(Change::LABEL);
        }
    }

    /// Returns the item source.
    #[must_use]
    pub fn items_data_source(&self) -> Option<&Rc<dyn ListDataSource>> {
        self.items_source.as_ref()
    }

    /// Binds the item source. Returns whether the binding changed.
    pub fn set_items_data_source(&mut self, source: Option<Rc<dyn ListDataSource>>) -> bool {
        self.base
            .replace_data_source(&mut self.items_source, source, Change::LIST_ITEMS)
    }

    /// Returns the selection source.
    #[must_use]
    pub fn index_data_source(&self) -> Option<&Rc<dyn IntegralValueDataSource>> {
        self.index_source.as_ref()
    }

    /// Binds the selection source. Returns whether the binding changed.
    pub fn set_index_data_source(
        &mut self,
        source: Option<Rc<dyn IntegralValueDataSource>>,
    ) -> bool {
        self.base
            .replace_data_source(&mut self.index_source, source, Change::INDEX_VALUE)
    }

    /// Returns the number of items.
    #[must_use]
    pub fn item_count(&self) -> usize {
        self.items_source.as_ref().map_or(0, |s| s.len())
    }

    /// Returns the selected item index, if it names an item.
    #[must_use]
    pub fn selected(&self) -> Option<usize> {
        let index = usize::try_from(self.index_source.as_ref()?.get()).ok()?;
        (index < self.item_count()).then_some(index)
    }

    /// Returns whether the item list is open.
    #[must_use]
    pub fn is_opened(&self) -> bool {
        self.opened
    }

    /// Returns the highlighted item index.
    #[must_use]
    pub fn highlighted(&self) -> Option<usize> {
        self.highlighted
    }

    /// Returns the index of the item shown in the first row.
    #[must_use]
    pub fn scroll(&self) -> usize {
        self.scroll
    }

    /// Returns the number of rows, as resolved by the last layout pass.
    #[must_use]
    pub fn items_max(&self) -> usize {
        self.items_max
    }

    /// Returns the generated meshes.
    #[must_use]
    pub fn meshes(&self) -> Option<&DropdownMeshes> {
        self.meshes.as_ref()
    }

    /// Returns the generated scenegraph nodes.
    #[must_use]
    pub fn nodes(&self) -> Option<&DropdownNodes> {
        self.nodes.as_ref()
    }

    // -- Internal helpers --

    fn max_scroll(&self) -> usize {
        self.item_count().saturating_sub(self.items_max)
    }

    fn set_scroll(&mut self, scroll: usize) {
        let scroll = scroll.min(self.max_scroll());
        if self.scroll != scroll {
            self.scroll = scroll;
            self.base.invalidate(Change::SCROLL);
        }
    }

    fn set_highlighted(&mut self, highlighted: Option<usize>) {
        if self.highlighted != highlighted {
            self.highlighted = highlighted;
            self.base.invalidate(Change::HIGHLIGHT);
        }
    }

    fn set_opened(&mut self, opened: bool) {
        if self.opened != opened {
            self.opened = opened;
            self.base.invalidate(Change::OPENED);
        }
    }

    /// Pulls scroll and highlight back into the current item range.
    fn clamp_to_items(&mut self) {
        self.set_scroll(self.scroll);
        if self.highlighted.is_some_and(|h| h >= self.item_count()) {
            self.set_highlighted(None);
        }
    }

    /// Scrolls the least amount that brings `index` into view.
    fn reveal(&mut self, index: usize) {
        if index < self.scroll {
            self.set_scroll(index);
        } else if index >= self.scroll + self.items_max {
            self.set_scroll(index + 1 - self.items_max);
        }
    }

    fn bounds(&self) -> Result<DropdownBounds, Error> {
        let elements = self.elements.ok_or(Error::LayoutNotGenerated)?;
        let block = |id| self.base.block(id).ok_or(Error::LayoutNotGenerated);
        Ok(DropdownBounds {
            boxed: block(elements.boxed)?,
            label: block(elements.label)?,
            items: block(elements.items)?,
        })
    }

    fn row_height(&self, items: Rect) -> f64 {
        let rows = self.items_max as f64;
        items.height() / rows
    }

    /// Returns the item under `position`, if the list is open and a row with
    /// an item is hit.
    fn item_at(&self, position: Point) -> Option<usize> {
        let items = self.bounds().ok()?.items;
        if !self.opened || !items.contains(position) {
            return None;
        }
        #[expect(
            clippy::cast_possible_truncation,
            reason = "the quotient is non-negative and below items_max"
        )]
        let row = ((position.y - items.y0) / self.row_height(items)) as usize;
        let index = self.scroll + row;
        (row < self.items_max && index < self.item_count()).then_some(index)
    }

    fn item_text(&self, index: usize) -> String {
        self.items_source
            .as_ref()
            .and_then(|s| s.get_string(index))
            .unwrap_or_default()
    }

    fn value_text(&self) -> String {
        self.selected()
            .map(|index| self.item_text(index))
            .unwrap_or_default()
    }
}

impl Widget for Dropdown {
    fn base(&self) -> &WidgetBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut WidgetBase {
        &mut self.base
    }

    fn kind(&self) -> WidgetKind {
        WidgetKind::Dropdown
    }

    fn generate_layout(
        &mut self,
        cx: &WidgetContext<'_>,
        size: kurbo::Size,
        offset: Point,
    ) -> Result<(), Error> {
        let base = &self.base;
        let box_width = style_length(base, cx, BOX_WIDTH, BOX_SIZE, |s| s.width, BOX_WIDTH_DEFAULT);
        let box_size = Size::new(
            box_width,
            style_length(base, cx, BOX_HEIGHT, BOX_SIZE, |s| s.height, Length::FULL),
        );
        let box_margin = base.style::<Margin>(cx, BOX_MARGIN).unwrap_or(Margin::ZERO);
        let label_size = Size::new(
            style_length(base, cx, LABEL_WIDTH, LABEL_SIZE, |s| s.width, LABEL_WIDTH_DEFAULT),
            style_length(base, cx, LABEL_HEIGHT, LABEL_SIZE, |s| s.height, Length::FULL),
        );
        let label_margin = base.style::<Margin>(cx, LABEL_MARGIN).unwrap_or(Margin::ZERO);
        let items_height = base.style::<Length>(cx, ITEMS_HEIGHT).unwrap_or(Length::FULL);
        self.items_max = base
            .style::<usize>(cx, ITEMS_MAX)
            .unwrap_or(ITEMS_MAX_DEFAULT)
            .max(1);

        let layout = self.base.layout_mut();
        let elements = *self.elements.get_or_insert_with(|| {
            let root = layout.set_root(ElementKind::VerticalFlow);
            let active = layout.append(root, ElementKind::HorizontalFlow);
            DropdownElements {
                root,
                active,
                boxed: layout.append(active, ElementKind::Leaf),
                label: layout.append(active, ElementKind::Leaf),
                items: layout.append(root, ElementKind::Leaf),
            }
        });

        let rows = self.items_max as f64;
        layout.set_element_size(elements.root, Size::FULL);
        layout.set_element_size(elements.active, Size::FULL);
        layout.set_element_size(elements.boxed, box_size);
        layout.set_element_margin(elements.boxed, box_margin);
        layout.set_element_size(elements.label, label_size);
        layout.set_element_margin(elements.label, label_margin);
        layout.set_element_size(elements.items, Size::new(box_width, items_height * rows));

        self.base.generate_layout(size, offset);
        let max_scroll = self.max_scroll();
        self.set_scroll(self.scroll.min(max_scroll));
        Ok(())
    }

    fn generate_geometry(
        &mut self,
        cx: &WidgetContext<'_>,
        meshes: &mut dyn MeshManager,
        fonts: &FontMap,
    ) -> Result<(), Error> {
        self.base.require(StaleData::GEOMETRY)?;
        let bounds = self.bounds()?;
        let changes = self.base.take_geometry_changes();
        if changes.contains(Change::LIST_ITEMS) {
            self.clamp_to_items();
        }
        let color = style_color(&self.base, cx);
        let font = style_font(&self.base, cx, fonts);
        let row_height = self.row_height(bounds.items);

        let text = |text: String, height: f64| MeshDesc::Text {
            text,
            font,
            height,
            color,
        };
        let item_texts: Vec<String> = (0..self.item_count()).map(|i| self.item_text(i)).collect();
        let item_meshes = |meshes: &mut dyn MeshManager| -> Vec<MeshId> {
            item_texts
                .iter()
                .map(|t| meshes.create_mesh(text(t.clone(), row_height)))
                .collect()
        };
        let value = text(self.value_text(), bounds.boxed.height());
        let label = text(self.label.clone(), bounds.label.height());

        match &mut self.meshes {
            Some(current) if !changes.intersects(Change::STYLESHEET | Change::ANCHOR) => {
                if changes.contains(Change::LIST_ITEMS) {
                    for mesh in current.items.drain(..) {
                        meshes.destroy_mesh(mesh);
                    }
                    current.items = item_meshes(meshes);
                }
                if changes.intersects(Change::LIST_ITEMS | Change::INDEX_VALUE) {
                    rebuild_mesh(meshes, &mut current.value, value);
                }
                if changes.contains(Change::LABEL) {
                    rebuild_mesh(meshes, &mut current.label, label);
                }
            }
            slot => {
                if let Some(old) = slot.take() {
                    for mesh in [
                        old.frame,
                        old.highlight,
                        old.value,
                        old.label,
                        old.backdrop,
                        old.row_highlight,
                    ]
                    .into_iter()
                    .chain(old.items)
                    {
                        meshes.destroy_mesh(mesh);
                    }
                }
                let half_w = (bounds.boxed.width() * 0.5 - BOX_INSET).max(0.0);
                let half_h = (bounds.boxed.height() * 0.5 - BOX_INSET).max(0.0);
                let frame = Rect::new(-half_w, -half_h, half_w, half_h);
                let list = bounds.items.size();
                *slot = Some(DropdownMeshes {
                    frame: meshes.create_mesh(MeshDesc::Rectangle {
                        rect: frame,
                        fill: FillMode::Outline,
                        color,
                    }),
                    highlight: meshes.create_mesh(MeshDesc::Rectangle {
                        rect: frame,
                        fill: FillMode::Fill,
                        color: Rgba { a: 0.25, ..color },
                    }),
                    value: meshes.create_mesh(value),
                    label: meshes.create_mesh(label),
                    backdrop: meshes.create_mesh(MeshDesc::Rectangle {
                        rect: Rect::from_center_size(Point::ZERO, list).inset(-BOX_INSET),
                        fill: FillMode::Fill,
                        color: Rgba::GRAY,
                    }),
                    row_highlight: meshes.create_mesh(MeshDesc::Rectangle {
                        rect: Rect::new(0.0, 0.0, list.width, row_height),
                        fill: FillMode::Outline,
                        color,
                    }),
                    items: item_meshes(meshes),
                });
            }
        }

        self.base.finish(StaleData::GEOMETRY);
        Ok(())
    }

    fn generate_scenegraph(
        &mut self,
        cx: &WidgetContext<'_>,
        generator: &mut dyn ScenegraphGenerator,
    ) -> Result<(), Error> {
        self.base.require(StaleData::SCENEGRAPH)?;
        let bounds = self.bounds()?;
        let meshes = self.meshes.clone().ok_or(Error::GeometryNotGenerated)?;
        let z = cx.z();
        let row_height = self.row_height(bounds.items);
        let row_offset = |row: usize| {
            let row = row as f64;
            Offset::new(bounds.items.x0, bounds.items.y0 + row * row_height, z)
        };
        let material = style_material(&self.base, cx, MATERIAL_WIDGET, common::MATERIAL_WIDGET);
        let text_material = style_material(&self.base, cx, MATERIAL_TEXT, common::MATERIAL_TEXT);
        let box_offset = Offset::at(bounds.boxed.center(), z);
        let backdrop_offset = Offset::at(bounds.items.center(), z + BACKDROP_DEPTH);
        let value_offset = Offset::at(bounds.boxed.origin(), z);
        let label_offset = Offset::at(bounds.label.origin(), z);

        let nodes = self.nodes.get_or_insert_with(|| {
            let root = generator.create_widget_node(cx.panel_node);
            let material_node = generator.create_material_node(root, material);
            let box_transform = generator.create_transform_node(material_node, box_offset);
            let frame = generator.create_mesh_node(box_transform, Some(meshes.frame));
            let highlight = generator.create_mesh_node(box_transform, Some(meshes.highlight));
            let list = generator.create_group_node(material_node);
            let backdrop_transform = generator.create_transform_node(list, backdrop_offset);
            let backdrop = generator.create_mesh_node(backdrop_transform, Some(meshes.backdrop));
            let row_highlight_transform = generator.create_transform_node(list, row_offset(0));
            let row_highlight =
                generator.create_mesh_node(row_highlight_transform, Some(meshes.row_highlight));
            let text_material_node = generator.create_text_material_node(root, text_material);
            let value_transform = generator.create_transform_node(text_material_node, value_offset);
            let value = generator.create_mesh_node(value_transform, Some(meshes.value));
            let label_transform = generator.create_transform_node(text_material_node, label_offset);
            let label = generator.create_mesh_node(label_transform, Some(meshes.label));
            let rows_group = generator.create_group_node(text_material_node);
            DropdownNodes {
                root,
                material: material_node,
                text_material: text_material_node,
                box_transform,
                frame,
                highlight,
                list,
                backdrop_transform,
                backdrop,
                row_highlight_transform,
                row_highlight,
                value_transform,
                value,
                label_transform,
                label,
                rows_group,
                rows: Vec::new(),
            }
        });

        // The pool follows `items.max`, which only a restyle changes.
        while nodes.rows.len() > self.items_max {
            if let Some(row) = nodes.rows.pop() {
                generator.destroy_node(row.transform);
            }
        }
        while nodes.rows.len() < self.items_max {
            let transform = generator.create_transform_node(nodes.rows_group, row_offset(nodes.rows.len()));
            let mesh = generator.create_mesh_node(transform, None);
            nodes.rows.push(DropdownRow { transform, mesh });
        }

        generator.set_material(nodes.material, material);
        generator.set_material(nodes.text_material, text_material);
        generator.set_offset(nodes.box_transform, box_offset);
        generator.set_offset(nodes.backdrop_transform, backdrop_offset);
        generator.set_offset(nodes.value_transform, value_offset);
        generator.set_offset(nodes.label_transform, label_offset);
        generator.set_mesh(nodes.frame, Some(meshes.frame));
        generator.set_mesh(nodes.highlight, Some(meshes.highlight));
        generator.set_mesh(nodes.backdrop, Some(meshes.backdrop));
        generator.set_mesh(nodes.row_highlight, Some(meshes.row_highlight));
        generator.set_mesh(nodes.value, Some(meshes.value));
        generator.set_mesh(nodes.label, Some(meshes.label));

        for (r, row) in nodes.rows.iter().enumerate() {
            let item = meshes.items.get(self.scroll + r).copied();
            generator.set_offset(row.transform, row_offset(r));
            generator.set_mesh(row.mesh, item);
            generator.set_type_mask(row.mesh, visibility(item.is_some()));
        }

        let visible_row = self
            .highlighted
            .filter(|&h| h < meshes.items.len())
            .and_then(|h| h.checked_sub(self.scroll))
            .filter(|&r| r < self.items_max);
        if let Some(r) = visible_row {
            generator.set_offset(
                nodes.row_highlight_transform,
                row_offset(r) + Offset::new(0.0, 0.0, ROW_HIGHLIGHT_DEPTH),
            );
        }
        generator.set_type_mask(nodes.row_highlight, visibility(visible_row.is_some()));
        generator.set_type_mask(nodes.highlight, visibility(self.base.is_hovered()));
        generator.set_type_mask(nodes.list, visibility(self.opened));
        generator.set_type_mask(nodes.rows_group, visibility(self.opened));

        self.base.finish(StaleData::SCENEGRAPH);
        Ok(())
    }

    /// Hits the box, and the item list while open.
    fn intersect(&self, point: Point) -> bool {
        let Ok(bounds) = self.bounds() else {
            return false;
        };
        bounds.boxed.contains(point) || (self.opened && bounds.items.contains(point))
    }

    fn on_mouse_click(&mut self, event: &MouseClickEvent) -> InputResult {
        if !event.is_left_press() {
            return InputResult::claim_if(self.opened);
        }

        if self.opened {
            if let Some(index) = self.item_at(event.position) {
                if let (Some(source), Ok(value)) = (&self.index_source, i64::try_from(index)) {
                    source.set(value);
                }
            }
            self.set_highlighted(None);
            self.set_opened(false);
            return InputResult::IGNORED;
        }

        self.set_opened(true);
        if let Some(selected) = self.selected() {
            self.reveal(selected);
        }
        InputResult::CLAIMED
    }

    fn on_mouse_move(&mut self, event: &MouseMoveEvent) -> InputResult {
        if self.opened {
            let hit = self.item_at(event.position);
            self.set_highlighted(hit);
        }
        InputResult::claim_if(self.opened)
    }

    fn on_mouse_scroll(&mut self, event: &MouseScrollEvent) -> InputResult {
        if self.opened {
            let target = i64::try_from(self.scroll)
                .unwrap_or(i64::MAX)
                .saturating_add(i64::from(event.delta))
                .max(0);
            self.set_scroll(usize::try_from(target).unwrap_or(usize::MAX));
            let hit = self.item_at(event.position);
            self.set_highlighted(hit);
        }
        InputResult::claim_if(self.opened)
    }

    fn retire(&mut self) -> Retired {
        let mut retired = Retired::default();
        if let Some(m) = self.meshes.take() {
            retired.meshes.extend([
                m.frame,
                m.highlight,
                m.value,
                m.label,
                m.backdrop,
                m.row_highlight,
            ]);
            retired.meshes.extend(m.items);
        }
        if let Some(n) = self.nodes.take() {
            retired.nodes.push(n.root);
        }
        retired
    }
}

#[cfg(test)]
mod tests {
    use lamina_scene::generator::SceneGenerator;
    use lamina_scene::mesh::MeshStore;
    use lamina_scene::node::NodeMask;

    use super::*;
    use crate::data::{IntegralValue, ListValue};
    use crate::style::Stylesheet;

    fn items(count: usize) -> Rc<ListValue> {
        Rc::new(ListValue::new((0..count).map(|i| alloc::format!("item {i}"))))
    }

    fn bound(count: usize, index: i64) -> (Dropdown, Rc<ListValue>, Rc<IntegralValue>) {
        let list = items(count);
        let selection = Rc::new(IntegralValue::new(index));
        let mut dropdown = Dropdown::new("Mode");
        let items: Rc<dyn ListDataSource> = list.clone();
        let index: Rc<dyn IntegralValueDataSource> = selection.clone();
        dropdown.set_items_data_source(Some(items));
        dropdown.set_index_data_source(Some(index));
        (dropdown, list, selection)
    }

    /// Four rows of 10 units below a 100 × 10 active row at the origin.
    fn small_sheet() -> Stylesheet {
        Stylesheet::new().with(ITEMS_MAX, 4_usize)
    }

    fn generate_all(
        dropdown: &mut Dropdown,
        sheet: &Stylesheet,
        meshes: &mut MeshStore,
        generator: &mut SceneGenerator,
    ) {
        let cx = WidgetContext {
            stylesheet: Some(sheet),
            ..WidgetContext::default()
        };
        dropdown
            .generate_layout(&cx, kurbo::Size::new(100.0, 10.0), Point::ZERO)
            .unwrap();
        dropdown
            .generate_geometry(&cx, meshes, &FontMap::new())
            .unwrap();
        dropdown.generate_scenegraph(&cx, generator).unwrap();
    }

    #[test]
    fn scroll_is_clamped() {
        let (mut dropdown, _list, _selection) = bound(25, 0);
        assert_eq!(dropdown.items_max(), 20);
        let _ = dropdown.on_mouse_click(&MouseClickEvent::left_press((0.0, 0.0)));
        assert!(dropdown.is_opened());

        let scroll = |dropdown: &mut Dropdown, delta| {
            let _ = dropdown.on_mouse_scroll(&MouseScrollEvent {
                position: Point::ZERO,
                delta,
            });
            dropdown.scroll()
        };
        assert_eq!(scroll(&mut dropdown, 3), 3);
        assert_eq!(scroll(&mut dropdown, 100), 5);
        assert_eq!(scroll(&mut dropdown, -1), 4);
        assert_eq!(scroll(&mut dropdown, i32::MIN), 0);
        assert_eq!(scroll(&mut dropdown, i32::MAX), 5);
    }

    #[test]
    fn closed_dropdown_ignores_scroll() {
        let (mut dropdown, _list, _selection) = bound(25, 0);
        let result = dropdown.on_mouse_scroll(&MouseScrollEvent {
            position: Point::ZERO,
            delta: 2,
        });
        assert_eq!(result, InputResult::IGNORED);
        assert_eq!(dropdown.scroll(), 0);
    }

    #[test]
    fn opening_reveals_the_selection() {
        let (mut dropdown, _list, _selection) = bound(25, 22);
        let result = dropdown.on_mouse_click(&MouseClickEvent::left_press((0.0, 0.0)));
        assert_eq!(result, InputResult::CLAIMED);
        assert_eq!(dropdown.scroll(), 3);
    }

    #[test]
    fn move_highlights_and_click_commits() {
        let (mut dropdown, _list, selection) = bound(6, 0);
        let sheet = small_sheet();
        let mut meshes = MeshStore::new();
        let mut generator = SceneGenerator::new();
        generate_all(&mut dropdown, &sheet, &mut meshes, &mut generator);

        let _ = dropdown.on_mouse_click(&MouseClickEvent::left_press((5.0, 5.0)));
        let _ = dropdown.on_mouse_scroll(&MouseScrollEvent {
            position: Point::new(5.0, 15.0),
            delta: 1,
        });
        // Rows start at y = 10; row 2 shows item 3 after scrolling by one.
        let _ = dropdown.on_mouse_move(&MouseMoveEvent {
            position: Point::new(5.0, 35.0),
        });
        assert_eq!(dropdown.highlighted(), Some(3));

        let result = dropdown.on_mouse_click(&MouseClickEvent::left_press((5.0, 35.0)));
        assert_eq!(result, InputResult::IGNORED);
        assert!(!dropdown.is_opened());
        assert_eq!(selection.get(), 3);
        assert_eq!(dropdown.highlighted(), None);
    }

    #[test]
    fn scrolling_under_the_cursor_moves_the_highlight() {
        let (mut dropdown, _list, selection) = bound(6, 0);
        let sheet = small_sheet();
        let mut meshes = MeshStore::new();
        let mut generator = SceneGenerator::new();
        generate_all(&mut dropdown, &sheet, &mut meshes, &mut generator);

        let _ = dropdown.on_mouse_click(&MouseClickEvent::left_press((5.0, 5.0)));
        let _ = dropdown.on_mouse_move(&MouseMoveEvent {
            position: Point::new(5.0, 25.0),
        });
        assert_eq!(dropdown.highlighted(), Some(1));

        // Row 1 shows item 2 once the list scrolled by one.
        let _ = dropdown.on_mouse_scroll(&MouseScrollEvent {
            position: Point::new(5.0, 25.0),
            delta: 1,
        });
        assert_eq!(dropdown.scroll(), 1);
        assert_eq!(dropdown.highlighted(), Some(2));

        let _ = dropdown.on_mouse_click(&MouseClickEvent::left_press((5.0, 25.0)));
        assert!(!dropdown.is_opened());
        assert_eq!(selection.get(), 2);
    }

    #[test]
    fn click_outside_the_list_closes_without_committing() {
        let (mut dropdown, _list, selection) = bound(6, 0);
        let sheet = small_sheet();
        let mut meshes = MeshStore::new();
        let mut generator = SceneGenerator::new();
        generate_all(&mut dropdown, &sheet, &mut meshes, &mut generator);

        let _ = dropdown.on_mouse_click(&MouseClickEvent::left_press((5.0, 5.0)));
        let _ = dropdown.on_mouse_move(&MouseMoveEvent {
            position: Point::new(5.0, 25.0),
        });
        assert_eq!(dropdown.highlighted(), Some(1));

        let _ = dropdown.on_mouse_click(&MouseClickEvent::left_press((80.0, 5.0)));
        assert!(!dropdown.is_opened());
        assert_eq!(dropdown.highlighted(), None);
        assert_eq!(selection.get(), 0);
    }

    #[test]
    fn shrinking_the_list_pulls_scroll_back() {
        let (mut dropdown, list, _selection) = bound(6, 0);
        let sheet = small_sheet();
        let cx = WidgetContext {
            stylesheet: Some(&sheet),
            ..WidgetContext::default()
        };
        let mut meshes = MeshStore::new();
        let mut generator = SceneGenerator::new();
        generate_all(&mut dropdown, &sheet, &mut meshes, &mut generator);

        let _ = dropdown.on_mouse_click(&MouseClickEvent::left_press((5.0, 5.0)));
        let _ = dropdown.on_mouse_scroll(&MouseScrollEvent {
            position: Point::new(5.0, 45.0),
            delta: 2,
        });
        assert_eq!(dropdown.scroll(), 2);
        assert_eq!(dropdown.highlighted(), Some(5));

        list.set_items(["a", "b", "c"]);
        assert_eq!(
            dropdown.base().stale(),
            StaleData::GEOMETRY | StaleData::SCENEGRAPH
        );
        // Layout stays clean; only geometry and scenegraph run.
        dropdown
            .generate_geometry(&cx, &mut meshes, &FontMap::new())
            .unwrap();
        dropdown.generate_scenegraph(&cx, &mut generator).unwrap();

        assert_eq!(dropdown.scroll(), 0);
        assert_eq!(dropdown.highlighted(), None);
        let rows = &dropdown.nodes().unwrap().rows;
        let items = &dropdown.meshes().unwrap().items;
        assert_eq!(generator.store().mesh(rows[0].mesh), Some(items[0]));
        assert_eq!(generator.store().type_mask(rows[2].mesh), NodeMask::empty());
        assert_eq!(generator.store().type_mask(rows[3].mesh), NodeMask::DISABLED);
    }

    #[test]
    fn rows_are_pooled() {
        let (mut dropdown, _list, _selection) = bound(6, 0);
        let sheet = small_sheet();
        let mut meshes = MeshStore::new();
        let mut generator = SceneGenerator::new();
        generate_all(&mut dropdown, &sheet, &mut meshes, &mut generator);

        let nodes = dropdown.nodes().unwrap().clone();
        assert_eq!(nodes.rows.len(), 4);
        assert_eq!(generator.store().type_mask(nodes.list), NodeMask::DISABLED);
        let items = dropdown.meshes().unwrap().items.clone();
        assert_eq!(generator.store().mesh(nodes.rows[0].mesh), Some(items[0]));

        let node_count = generator.store().node_count();
        let _ = dropdown.on_mouse_click(&MouseClickEvent::left_press((5.0, 5.0)));
        let _ = dropdown.on_mouse_scroll(&MouseScrollEvent {
            position: Point::ZERO,
            delta: 2,
        });
        assert_eq!(dropdown.base().stale(), StaleData::SCENEGRAPH);
        generate_all(&mut dropdown, &sheet, &mut meshes, &mut generator);

        assert_eq!(generator.store().node_count(), node_count);
        assert_eq!(generator.store().type_mask(nodes.list), NodeMask::empty());
        assert_eq!(generator.store().mesh(nodes.rows[0].mesh), Some(items[2]));
        assert_eq!(generator.store().mesh(nodes.rows[3].mesh), Some(items[5]));
    }

    #[test]
    fn short_lists_disable_unused_rows() {
        let (mut dropdown, _list, _selection) = bound(2, 0);
        let sheet = small_sheet();
        let mut meshes = MeshStore::new();
        let mut generator = SceneGenerator::new();
        generate_all(&mut dropdown, &sheet, &mut meshes, &mut generator);

        let rows = &dropdown.nodes().unwrap().rows;
        assert_eq!(generator.store().type_mask(rows[1].mesh), NodeMask::empty());
        assert_eq!(generator.store().type_mask(rows[2].mesh), NodeMask::DISABLED);
        assert_eq!(generator.store().mesh(rows[3].mesh), None);
    }

    #[test]
    fn index_change_rebuilds_only_the_value() {
        let (mut dropdown, _list, selection) = bound(3, 0);
        let sheet = small_sheet();
        let mut meshes = MeshStore::new();
        let mut generator = SceneGenerator::new();
        generate_all(&mut dropdown, &sheet, &mut meshes, &mut generator);
        let before = dropdown.meshes().unwrap().clone();

        selection.set(2);
        assert_eq!(
            dropdown.base().stale(),
            StaleData::GEOMETRY | StaleData::SCENEGRAPH
        );
        generate_all(&mut dropdown, &sheet, &mut meshes, &mut generator);
        let after = dropdown.meshes().unwrap();

        assert_ne!(after.value, before.value);
        assert_eq!(after.label, before.label);
        assert_eq!(after.items, before.items);
        assert!(matches!(
            meshes.get(after.value),
            Some(MeshDesc::Text { text, .. }) if text == "item 2"
        ));
    }

    #[test]
    fn item_change_rebuilds_items_and_value() {
        let (mut dropdown, list, _selection) = bound(3, 0);
        let sheet = small_sheet();
        let mut meshes = MeshStore::new();
        let mut generator = SceneGenerator::new();
        generate_all(&mut dropdown, &sheet, &mut meshes, &mut generator);
        let before = dropdown.meshes().unwrap().clone();

        list.set_items(["a", "b", "c", "d", "e"]);
        generate_all(&mut dropdown, &sheet, &mut meshes, &mut generator);
        let after = dropdown.meshes().unwrap();

        assert_eq!(after.items.len(), 5);
        assert_ne!(after.value, before.value);
        assert_eq!(after.frame, before.frame);
        assert!(before.items.iter().all(|&m| !meshes.contains(m)));
    }

    #[test]
    fn items_max_is_at_least_one() {
        let (mut dropdown, _list, _selection) = bound(3, 0);
        let sheet = Stylesheet::new().with(ITEMS_MAX, 0_usize);
        let cx = WidgetContext {
            stylesheet: Some(&sheet),
            ..WidgetContext::default()
        };
        dropdown
            .generate_layout(&cx, kurbo::Size::new(100.0, 10.0), Point::ZERO)
            .unwrap();
        assert_eq!(dropdown.items_max(), 1);
    }
}
