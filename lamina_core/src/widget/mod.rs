// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The widget contract and the built-in widgets.
//!
//! Every widget embeds a [`WidgetBase`] holding what all widgets share: the
//! private layout and its blocks, the stale mask, panel and layer
//! back-references, the anchor element, an optional stylesheet and the data
//! source bindings. The [`Widget`] trait adds the three generation phases and
//! input handling on top.
//!
//! Widgets are owned by a [`Panel`](crate::Panel) and addressed by
//! [`WidgetId`]. Cross-widget references (radio groups) are ids, never
//! pointers.
//!
//! # Generation
//!
//! Each phase checks that its predecessor is up to date, does its work and
//! then clears only its own [`StaleData`] bit:
//!
//! | Phase | Fails with |
//! |---|---|
//! | [`generate_layout`](Widget::generate_layout) | never |
//! | [`generate_geometry`](Widget::generate_geometry) | [`Error::LayoutNotGenerated`] |
//! | [`generate_scenegraph`](Widget::generate_scenegraph) | [`Error::GeometryNotGenerated`] |
//!
//! The built-in widgets construct their layout tree and scenegraph nodes once
//! and afterwards only restyle, rebind and re-mask them.

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::any::Any;
use core::cell::{Cell, RefCell};
use core::fmt;

use kurbo::{Point, Rect};
use lamina_layout::{Block, ElementId, Layout, bounds_of};
use lamina_scene::font::FontMap;
use lamina_scene::generator::ScenegraphGenerator;
use lamina_scene::mesh::{MeshId, MeshManager};
use lamina_scene::node::NodeId;

use crate::data::{DataListener, DataSource, IntoDataSource, SourceId};
use crate::error::Error;
use crate::input::{InputResult, MouseClickEvent, MouseMoveEvent, MouseScrollEvent};
use crate::layer::LayerId;
use crate::panel::PanelId;
use crate::stale::{Change, StaleData};
use crate::style::{FromStyleValue, Stylesheet};

mod checkbox;
mod dropdown;
mod radio_button;
mod toggle;

pub use checkbox::Checkbox;
pub use dropdown::{Dropdown, DropdownMeshes, DropdownNodes, DropdownRow, ITEMS_MAX_DEFAULT};
pub use radio_button::RadioButton;
pub use toggle::{ToggleMeshes, ToggleNodes};

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// A handle to a widget owned by a panel.
///
/// Indices are never reused within a panel, so the handle of a destroyed
/// widget stays invalid.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WidgetId {
    pub(crate) panel: PanelId,
    pub(crate) index: u32,
}

impl WidgetId {
    /// Returns the owning panel.
    #[inline]
    #[must_use]
    pub const fn panel(self) -> PanelId {
        self.panel
    }

    /// Returns the index of this widget within its panel.
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.index
    }
}

impl fmt::Debug for WidgetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WidgetId({}@panel{})", self.index, self.panel.get())
    }
}

/// The concrete type of a widget, for diagnostics.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WidgetKind {
    /// A [`Checkbox`].
    Checkbox,
    /// A [`Dropdown`].
    Dropdown,
    /// A [`RadioButton`].
    RadioButton,
    /// A widget defined outside this crate.
    Custom,
}

impl WidgetKind {
    /// Returns a short lowercase name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Checkbox => "checkbox",
            Self::Dropdown => "dropdown",
            Self::RadioButton => "radio_button",
            Self::Custom => "custom",
        }
    }
}

// ---------------------------------------------------------------------------
// Context
// ---------------------------------------------------------------------------

/// Panel state a widget may read while generating.
#[derive(Clone, Copy, Debug, Default)]
pub struct WidgetContext<'a> {
    /// The panel's stylesheet.
    pub stylesheet: Option<&'a Stylesheet>,
    /// Depth of the widget's layer, or 0 without one.
    pub depth: i32,
    /// Node under which widget root nodes are created.
    pub panel_node: Option<NodeId>,
}

impl WidgetContext<'_> {
    /// Returns the layer depth as a z coordinate.
    #[must_use]
    pub fn z(&self) -> f64 {
        f64::from(self.depth)
    }
}

/// Handles a widget gives up when it is destroyed.
///
/// Node handles are widget roots; destroying one destroys its subtree.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Retired {
    /// Meshes to destroy.
    pub meshes: Vec<MeshId>,
    /// Root nodes to destroy.
    pub nodes: Vec<NodeId>,
}

impl Retired {
    /// Returns whether there is nothing to release.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty() && self.nodes.is_empty()
    }

    /// Moves everything from `other` into `self`.
    pub fn append(&mut self, other: &mut Self) {
        self.meshes.append(&mut other.meshes);
        self.nodes.append(&mut other.nodes);
    }
}

// ---------------------------------------------------------------------------
// Widget trait
// ---------------------------------------------------------------------------

/// A retained-mode widget.
///
/// Implementors embed a [`WidgetBase`] and expose it through
/// [`base`](Self::base) and [`base_mut`](Self::base_mut).
///
/// Widgets are `'static`: a panel owns them and downcasts on request.
pub trait Widget: Any + fmt::Debug + 'static {
    /// Returns the shared widget state.
    fn base(&self) -> &WidgetBase;

    /// Returns the shared widget state mutably.
    fn base_mut(&mut self) -> &mut WidgetBase;

    /// Returns what kind of widget this is.
    fn kind(&self) -> WidgetKind {
        WidgetKind::Custom
    }

    /// Solves the widget's private layout into the rectangle at `offset` with
    /// `size`, then clears [`StaleData::LAYOUT`].
    ///
    /// # Errors
    ///
    /// Implementations may fail; the built-in widgets never do.
    fn generate_layout(
        &mut self,
        cx: &WidgetContext<'_>,
        size: kurbo::Size,
        offset: Point,
    ) -> Result<(), Error>;

    /// Creates or refreshes meshes from the current blocks, then clears
    /// [`StaleData::GEOMETRY`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::LayoutNotGenerated`] while the layout is stale.
    fn generate_geometry(
        &mut self,
        cx: &WidgetContext<'_>,
        meshes: &mut dyn MeshManager,
        fonts: &FontMap,
    ) -> Result<(), Error>;

    /// Creates or updates scenegraph nodes from the current meshes and
    /// interaction state, then clears [`StaleData::SCENEGRAPH`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::GeometryNotGenerated`] while geometry is stale.
    fn generate_scenegraph(
        &mut self,
        cx: &WidgetContext<'_>,
        generator: &mut dyn ScenegraphGenerator,
    ) -> Result<(), Error>;

    /// Returns whether `point` hits the widget.
    fn intersect(&self, point: Point) -> bool {
        self.base()
            .blocks()
            .iter()
            .any(|block| block.bounds.contains(point))
    }

    /// The cursor entered the widget.
    fn on_mouse_enter(&mut self) -> InputResult {
        self.base_mut().set_hovered(true);
        InputResult::IGNORED
    }

    /// The cursor left the widget.
    fn on_mouse_exit(&mut self) -> InputResult {
        self.base_mut().set_hovered(false);
        InputResult::IGNORED
    }

    /// A button was pressed or released over the widget.
    fn on_mouse_click(&mut self, event: &MouseClickEvent) -> InputResult {
        _ = event;
        InputResult::IGNORED
    }

    /// The cursor moved over the widget.
    fn on_mouse_move(&mut self, event: &MouseMoveEvent) -> InputResult {
        _ = event;
        InputResult::IGNORED
    }

    /// The wheel turned over the widget.
    fn on_mouse_scroll(&mut self, event: &MouseScrollEvent) -> InputResult {
        _ = event;
        InputResult::IGNORED
    }

    /// Gives up every mesh and root node the widget created.
    ///
    /// Called once, when the widget is destroyed. The widget is not used
    /// afterwards.
    fn retire(&mut self) -> Retired {
        Retired::default()
    }
}

impl dyn Widget {
    /// Returns whether the widget is a `W`.
    #[must_use]
    pub fn is<W: Widget>(&self) -> bool {
        (self as &dyn Any).is::<W>()
    }

    /// Downcasts to a concrete widget type.
    #[must_use]
    pub fn downcast_ref<W: Widget>(&self) -> Option<&W> {
        (self as &dyn Any).downcast_ref::<W>()
    }

    /// Downcasts to a concrete widget type, mutably.
    #[must_use]
    pub fn downcast_mut<W: Widget>(&mut self) -> Option<&mut W> {
        (self as &mut dyn Any).downcast_mut::<W>()
    }
}

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

/// The part of a widget data sources can reach.
#[derive(Debug)]
struct WidgetState {
    stale: Cell<StaleData>,
    /// Changes that invalidated geometry since the last geometry pass.
    geometry_changes: Cell<Change>,
    /// Which change each bound source reports.
    bindings: RefCell<Vec<(SourceId, Change)>>,
}

impl WidgetState {
    fn invalidate(&self, change: Change) {
        let stale = change.stale_data();
        self.stale.set(self.stale.get() | stale);
        if stale.contains(StaleData::GEOMETRY) {
            self.geometry_changes
                .set(self.geometry_changes.get() | change);
        }
    }
}

impl DataListener for WidgetState {
    fn on_data_source_update(&self, source: SourceId) {
        let change = self
            .bindings
            .borrow()
            .iter()
            .filter(|(id, _)| *id == source)
            .fold(Change::empty(), |acc, (_, change)| acc | *change);
        self.invalidate(change);
    }
}

/// State shared by every widget.
pub struct WidgetBase {
    id: Option<WidgetId>,
    layer: Option<LayerId>,
    hovered: bool,

    // -- Layout --
    layout: Layout,
    blocks: Vec<Block>,
    anchor: Option<ElementId>,
    anchor_bounds: Option<Rect>,

    // -- Style --
    stylesheet: Option<Rc<Stylesheet>>,

    // -- Invalidation --
    state: Rc<WidgetState>,
    /// `state`, as registered with data sources.
    listener: Rc<dyn DataListener>,
    sources: Vec<Rc<dyn DataSource>>,
}

impl fmt::Debug for WidgetBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WidgetBase")
            .field("id", &self.id)
            .field("layer", &self.layer)
            .field("anchor", &self.anchor)
            .field("stale", &self.stale())
            .field("blocks", &self.blocks.len())
            .field("sources", &self.sources.len())
            .finish_non_exhaustive()
    }
}

impl Default for WidgetBase {
    fn default() -> Self {
        Self::new()
    }
}

impl WidgetBase {
    /// Creates a fully stale, unattached base.
    #[must_use]
    pub fn new() -> Self {
        let state = Rc::new(WidgetState {
            stale: Cell::new(StaleData::ALL),
            geometry_changes: Cell::new(Change::empty()),
            bindings: RefCell::new(Vec::new()),
        });
        let listener: Rc<dyn DataListener> = state.clone();
        Self {
            id: None,
            layer: None,
            hovered: false,
            layout: Layout::new(),
            blocks: Vec::new(),
            anchor: None,
            anchor_bounds: None,
            stylesheet: None,
            state,
            listener,
            sources: Vec::new(),
        }
    }

    // -- Back-references --

    /// Returns the widget's id, once it was added to a panel.
    #[must_use]
    pub fn id(&self) -> Option<WidgetId> {
        self.id
    }

    /// Returns the owning panel.
    #[must_use]
    pub fn panel(&self) -> Option<PanelId> {
        self.id.map(WidgetId::panel)
    }

    /// Returns the layer the widget joined.
    #[must_use]
    pub fn layer(&self) -> Option<LayerId> {
        self.layer
    }

    /// Returns the panel layout element the widget is anchored to.
    #[must_use]
    pub fn anchor(&self) -> Option<ElementId> {
        self.anchor
    }

    /// Returns whether the cursor is over the widget.
    #[must_use]
    pub fn is_hovered(&self) -> bool {
        self.hovered
    }

    /// Records hover state, invalidating on change.
    pub fn set_hovered(&mut self, hovered: bool) {
        if self.hovered != hovered {
            self.hovered = hovered;
            self.invalidate(Change::HOVER);
        }
    }

    /// Returns the block the anchor resolved to in the latest panel layout.
    #[must_use]
    pub fn anchor_bounds(&self) -> Option<Rect> {
        self.anchor_bounds
    }

    pub(crate) fn attach(&mut self, id: WidgetId, layer: Option<LayerId>) {
        self.id = Some(id);
        self.layer = layer;
    }

    pub(crate) fn set_layer(&mut self, layer: Option<LayerId>) {
        if self.layer != layer {
            self.layer = layer;
            self.invalidate(Change::LAYER);
        }
    }

    pub(crate) fn set_anchor(&mut self, anchor: Option<ElementId>, bounds: Option<Rect>) {
        if self.anchor != anchor || self.anchor_bounds != bounds {
            self.anchor = anchor;
            self.anchor_bounds = bounds;
            self.invalidate(Change::ANCHOR);
        }
    }

    /// Records the block the anchor resolved to in the latest panel layout.
    ///
    /// Returns `true` and invalidates when the block moved or resized.
    pub(crate) fn update_anchor_bounds(&mut self, bounds: Option<Rect>) -> bool {
        if self.anchor_bounds == bounds {
            return false;
        }
        self.anchor_bounds = bounds;
        self.invalidate(Change::ANCHOR);
        true
    }

    // -- Layout --

    /// Returns the private layout.
    #[must_use]
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Returns the private layout mutably.
    pub fn layout_mut(&mut self) -> &mut Layout {
        &mut self.layout
    }

    /// Returns the blocks of the last layout pass.
    #[must_use]
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Returns the bounds generated for one element of the private layout.
    #[must_use]
    pub fn block(&self, element: ElementId) -> Option<Rect> {
        bounds_of(&self.blocks, element)
    }

    /// Solves the private layout at `offset` with `size`, replaces the stored
    /// blocks and clears [`StaleData::LAYOUT`].
    pub fn generate_layout(&mut self, size: kurbo::Size, offset: Point) {
        self.layout.set_size(size);
        self.layout.set_offset(offset);
        self.layout.generate_into(&mut self.blocks);
        self.finish(StaleData::LAYOUT);
    }

    // -- Staleness --

    /// Returns the stale mask.
    #[must_use]
    pub fn stale(&self) -> StaleData {
        self.state.stale.get()
    }

    /// Marks the phases `change` invalidates.
    pub fn invalidate(&self, change: Change) {
        self.state.invalidate(change);
    }

    /// Returns and resets the changes that invalidated geometry since the last
    /// call.
    pub fn take_geometry_changes(&self) -> Change {
        self.state.geometry_changes.take()
    }

    /// Clears `phase` from the stale mask.
    pub fn finish(&self, phase: StaleData) {
        self.state.stale.set(self.stale() - phase);
    }

    /// Checks that the phases before `phase` are up to date.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LayoutNotGenerated`] or
    /// [`Error::GeometryNotGenerated`] for the first stale predecessor.
    pub fn require(&self, phase: StaleData) -> Result<(), Error> {
        let stale = self.stale();
        if phase.intersects(StaleData::GEOMETRY | StaleData::SCENEGRAPH)
            && stale.contains(StaleData::LAYOUT)
        {
            return Err(Error::LayoutNotGenerated);
        }
        if phase.contains(StaleData::SCENEGRAPH) && stale.contains(StaleData::GEOMETRY) {
            return Err(Error::GeometryNotGenerated);
        }
        Ok(())
    }

    // -- Style --

    /// Returns the widget's own stylesheet.
    #[must_use]
    pub fn stylesheet(&self) -> Option<&Rc<Stylesheet>> {
        self.stylesheet.as_ref()
    }

    /// Replaces the widget's own stylesheet.
    pub fn set_stylesheet(&mut self, stylesheet: Option<Rc<Stylesheet>>) {
        self.stylesheet = stylesheet;
        self.invalidate(Change::STYLESHEET);
    }

    /// Looks a style property up in the widget's stylesheet, then the
    /// panel's.
    #[must_use]
    pub fn style<T: FromStyleValue>(&self, cx: &WidgetContext<'_>, name: &str) -> Option<T> {
        self.stylesheet
            .as_deref()
            .and_then(|sheet| sheet.get(name))
            .or_else(|| cx.stylesheet.and_then(|sheet| sheet.get(name)))
    }

    // -- Data sources --

    /// Swaps the source in `current` for `replacement`.
    ///
    /// Deregisters from the old source, registers with the new one and
    /// invalidates `change`. Returns `false`, doing nothing, when both are the
    /// same source.
    pub fn replace_data_source<S>(
        &mut self,
        current: &mut Option<Rc<S>>,
        replacement: Option<Rc<S>>,
        change: Change,
    ) -> bool
    where
        S: IntoDataSource + ?Sized,
    {
        let old_id = current.as_ref().map(|s| s.source_id());
        let new_id = replacement.as_ref().map(|s| s.source_id());
        if old_id == new_id {
            return false;
        }

        if let Some(old) = current.take() {
            self.unbind(old.source_id(), change);
        }
        if let Some(new) = &replacement {
            self.bind(Rc::clone(new).into_data_source(), change);
        }
        *current = replacement;
        self.invalidate(change);
        true
    }

    /// Returns the number of bound sources.
    #[must_use]
    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    fn bind(&mut self, source: Rc<dyn DataSource>, change: Change) {
        source.add_data_listener(&self.listener);
        self.state
            .bindings
            .borrow_mut()
            .push((source.source_id(), change));
        self.sources.push(source);
    }

    fn unbind(&mut self, id: SourceId, change: Change) {
        let still_bound = {
            let mut bindings = self.state.bindings.borrow_mut();
            if let Some(pos) = bindings.iter().position(|b| *b == (id, change)) {
                bindings.remove(pos);
            }
            bindings.iter().any(|(bound, _)| *bound == id)
        };
        if let Some(pos) = self.sources.iter().position(|s| s.source_id() == id) {
            let source = self.sources.remove(pos);
            if !still_bound {
                source.remove_data_listener(&self.listener);
            }
        }
    }
}

impl Drop for WidgetBase {
    fn drop(&mut self) {
        for source in &self.sources {
            source.remove_data_listener(&self.listener);
        }
    }
}
