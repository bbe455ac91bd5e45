// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Panels: the owners of widgets, layers and the panel layout.
//!
//! A [`Panel`] owns a root [`Layout`] whose elements widgets anchor to, a set
//! of named [`Layer`]s and an arena of boxed widgets addressed by
//! [`WidgetId`]. It drives the generation pipeline over its widgets and
//! dispatches input to them.
//!
//! # Deferred release
//!
//! Destroying a widget does not touch the mesh manager or the scenegraph:
//! the panel only holds those during a generation call. The widget's handles
//! are parked and destroyed at the start of the next
//! [`generate_geometry`](Panel::generate_geometry) (meshes) and
//! [`generate_scenegraph`](Panel::generate_scenegraph) (nodes), or by
//! [`release`](Panel::release).

use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::rc::Rc;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;
use core::sync::atomic::{AtomicU32, Ordering};

use kurbo::Point;
use lamina_layout::{Block, ElementId, Layout, bounds_of};
use lamina_scene::font::FontMap;
use lamina_scene::generator::ScenegraphGenerator;
use lamina_scene::mesh::MeshManager;
use lamina_scene::node::NodeId;

use crate::error::Error;
use crate::input::{
    InputContext, InputResult, InputTarget, MouseClickEvent, MouseMoveEvent, MouseScrollEvent,
};
use crate::layer::{Layer, LayerId};
use crate::stale::{Change, StaleData};
use crate::style::Stylesheet;
use crate::trace::{
    PassBeginEvent, PassEndEvent, PhaseBeginEvent, PhaseEndEvent, PhaseKind, ReleaseEvent,
    Tracer, WidgetGeneratedEvent,
};
use crate::widget::{RadioButton, Retired, Widget, WidgetContext, WidgetId};

static NEXT_PANEL: AtomicU32 = AtomicU32::new(1);

/// Process-unique identity of a panel.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PanelId(u32);

impl PanelId {
    fn next() -> Self {
        Self(NEXT_PANEL.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the raw id.
    #[inline]
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for PanelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PanelId({})", self.0)
    }
}

struct WidgetEntry {
    id: WidgetId,
    widget: Box<dyn Widget>,
}

/// A container of widgets laid out against one root layout.
pub struct Panel {
    id: PanelId,
    layout: Layout,
    blocks: Vec<Block>,

    // -- Layers --
    layers: BTreeMap<String, Layer>,
    next_layer: u32,

    // -- Widgets, in insertion order --
    widgets: Vec<WidgetEntry>,
    next_widget: u32,

    input: Box<dyn InputContext>,
    stylesheet: Option<Rc<Stylesheet>>,
    node: Option<NodeId>,
    retired: Retired,
    pass: u64,
}

impl fmt::Debug for Panel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Panel")
            .field("id", &self.id)
            .field("layers", &self.layers)
            .field("widgets", &self.widgets.len())
            .field("retired", &self.retired)
            .field("pass", &self.pass)
            .finish_non_exhaustive()
    }
}

impl Panel {
    /// Creates an empty panel and registers it with `input` as a root
    /// element.
    #[must_use]
    pub fn new(input: impl InputContext + 'static) -> Self {
        let id = PanelId::next();
        let mut input: Box<dyn InputContext> = Box::new(input);
        input.add_element(InputTarget::Panel(id), None);
        Self {
            id,
            layout: Layout::new(),
            blocks: Vec::new(),
            layers: BTreeMap::new(),
            next_layer: 0,
            widgets: Vec::new(),
            next_widget: 0,
            input,
            stylesheet: None,
            node: None,
            retired: Retired::default(),
            pass: 0,
        }
    }

    /// Returns the panel's id.
    #[must_use]
    pub fn id(&self) -> PanelId {
        self.id
    }

    /// Returns the panel layout.
    #[must_use]
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Returns the panel layout mutably. Changes take effect on the next
    /// [`generate_panel_layout`](Self::generate_panel_layout).
    pub fn layout_mut(&mut self) -> &mut Layout {
        &mut self.layout
    }

    /// Returns the blocks of the last panel layout pass.
    #[must_use]
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Returns whether `point` lies within the panel layout's target
    /// rectangle.
    #[must_use]
    pub fn intersect(&self, point: Point) -> bool {
        self.layout.bounds().contains(point)
    }

    // -- Style and scene placement --

    /// Returns the panel stylesheet.
    #[must_use]
    pub fn stylesheet(&self) -> Option<&Rc<Stylesheet>> {
        self.stylesheet.as_ref()
    }

    /// Replaces the panel stylesheet and invalidates every widget.
    pub fn set_stylesheet(&mut self, stylesheet: Option<Rc<Stylesheet>>) {
        self.stylesheet = stylesheet;
        for entry in &self.widgets {
            entry.widget.base().invalidate(Change::STYLESHEET);
        }
    }

    /// Sets the node widget root nodes are created under.
    ///
    /// Only affects widgets that have not built their scenegraph yet.
    pub fn set_panel_node(&mut self, node: Option<NodeId>) {
        self.node = node;
    }

    // -----------------------------------------------------------------------
    // Layers
    // -----------------------------------------------------------------------

    /// Creates a layer.
    ///
    /// # Errors
    ///
    /// [`Error::EmptyLayerName`] for `""`, [`Error::DuplicateLayer`] when the
    /// name is taken.
    pub fn create_layer(&mut self, name: &str, depth: i32) -> Result<LayerId, Error> {
        if name.is_empty() {
            return Err(Error::EmptyLayerName);
        }
        if self.layers.contains_key(name) {
            return Err(Error::DuplicateLayer(name.to_string()));
        }
        let id = LayerId(self.next_layer);
        self.next_layer += 1;
        self.layers.insert(name.to_string(), Layer { id, depth });
        Ok(id)
    }

    /// Looks a layer up by name.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownLayer`] when no layer has that name.
    pub fn layer(&self, name: &str) -> Result<&Layer, Error> {
        self.layers
            .get(name)
            .ok_or_else(|| Error::UnknownLayer(name.to_string()))
    }

    /// Iterates over the layers by name.
    pub fn layers(&self) -> impl Iterator<Item = (&str, &Layer)> {
        self.layers.iter().map(|(name, layer)| (name.as_str(), layer))
    }

    /// Destroys a layer. Widgets in it stay in the panel without a layer.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownLayer`] when no layer has that name.
    pub fn destroy_layer(&mut self, name: &str) -> Result<(), Error> {
        let layer = self
            .layers
            .remove(name)
            .ok_or_else(|| Error::UnknownLayer(name.to_string()))?;
        for entry in &mut self.widgets {
            if entry.widget.base().layer() == Some(layer.id) {
                entry.widget.base_mut().set_layer(None);
            }
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Widgets
    // -----------------------------------------------------------------------

    /// Takes ownership of `widget` and returns its id.
    ///
    /// The widget is registered with the input context as a child of the
    /// panel. Radio buttons created with
    /// [`RadioButton::grouped`] join their group here.
    pub fn add_widget<W: Widget>(&mut self, widget: W) -> WidgetId {
        self.insert(Box::new(widget), None)
    }

    /// Like [`add_widget`](Self::add_widget), placing the widget in a layer.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownLayer`] when no layer has that name; the widget is
    /// dropped.
    pub fn add_widget_to_layer<W: Widget>(
        &mut self,
        widget: W,
        layer: &str,
    ) -> Result<WidgetId, Error> {
        let layer = self.layer(layer)?.id;
        Ok(self.insert(Box::new(widget), Some(layer)))
    }

    fn insert(&mut self, mut widget: Box<dyn Widget>, layer: Option<LayerId>) -> WidgetId {
        let id = WidgetId {
            panel: self.id,
            index: self.next_widget,
        };
        self.next_widget += 1;
        widget.base_mut().attach(id, layer);
        self.input
            .add_element(InputTarget::Widget(id), Some(InputTarget::Panel(self.id)));
        self.widgets.push(WidgetEntry { id, widget });
        self.join_radio_group(id);
        id
    }

    /// Destroys a widget.
    ///
    /// The widget leaves the input context, its radio group and every data
    /// source it listens to. Its meshes and nodes are released on the next
    /// generation pass.
    ///
    /// # Errors
    ///
    /// [`Error::ForeignWidget`] or [`Error::UnknownWidget`].
    pub fn destroy_widget(&mut self, id: WidgetId) -> Result<(), Error> {
        let pos = self.position(id)?;
        let WidgetEntry { mut widget, .. } = self.widgets.remove(pos);
        self.input.remove_element(InputTarget::Widget(id));
        if let Some(button) = widget.downcast_mut::<RadioButton>() {
            self.leave_radio_group(button, id);
        }
        let mut retired = widget.retire();
        self.retired.append(&mut retired);
        Ok(())
    }

    /// Returns a widget.
    ///
    /// # Errors
    ///
    /// [`Error::ForeignWidget`] or [`Error::UnknownWidget`].
    pub fn widget(&self, id: WidgetId) -> Result<&dyn Widget, Error> {
        let pos = self.position(id)?;
        Ok(&*self.widgets[pos].widget)
    }

    /// Returns a widget mutably.
    ///
    /// # Errors
    ///
    /// [`Error::ForeignWidget`] or [`Error::UnknownWidget`].
    pub fn widget_mut(&mut self, id: WidgetId) -> Result<&mut dyn Widget, Error> {
        let pos = self.position(id)?;
        Ok(&mut *self.widgets[pos].widget)
    }

    /// Returns a widget as its concrete type.
    ///
    /// # Errors
    ///
    /// As [`widget`](Self::widget), plus [`Error::WidgetKindMismatch`].
    pub fn get<W: Widget>(&self, id: WidgetId) -> Result<&W, Error> {
        self.widget(id)?
            .downcast_ref::<W>()
            .ok_or(Error::WidgetKindMismatch {
                widget: id,
                expected: core::any::type_name::<W>(),
            })
    }

    /// Returns a widget as its concrete type, mutably.
    ///
    /// # Errors
    ///
    /// As [`widget`](Self::widget), plus [`Error::WidgetKindMismatch`].
    pub fn get_mut<W: Widget>(&mut self, id: WidgetId) -> Result<&mut W, Error> {
        self.widget_mut(id)?
            .downcast_mut::<W>()
            .ok_or(Error::WidgetKindMismatch {
                widget: id,
                expected: core::any::type_name::<W>(),
            })
    }

    /// Iterates over widget ids in insertion order.
    pub fn widget_ids(&self) -> impl Iterator<Item = WidgetId> + '_ {
        self.widgets.iter().map(|entry| entry.id)
    }

    /// Returns the number of widgets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    /// Returns whether the panel has no widgets.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }

    /// Anchors a widget to an element of the panel layout, or detaches it
    /// with `None`. Unanchored widgets are skipped by generation.
    ///
    /// # Errors
    ///
    /// [`Error::ForeignElement`] when `anchor` belongs to another layout,
    /// plus the lookup errors of [`widget`](Self::widget).
    pub fn set_widget_anchor(
        &mut self,
        id: WidgetId,
        anchor: Option<ElementId>,
    ) -> Result<(), Error> {
        if let Some(element) = anchor {
            if !self.layout.contains(element) {
                return Err(Error::ForeignElement(element));
            }
        }
        let bounds = anchor.and_then(|element| bounds_of(&self.blocks, element));
        let pos = self.position(id)?;
        self.widgets[pos].widget.base_mut().set_anchor(anchor, bounds);
        Ok(())
    }

    /// Moves a widget into a layer, or out of any with `None`.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownLayer`], plus the lookup errors of
    /// [`widget`](Self::widget).
    pub fn set_widget_layer(&mut self, id: WidgetId, layer: Option<&str>) -> Result<(), Error> {
        let layer = match layer {
            Some(name) => Some(self.layer(name)?.id),
            None => None,
        };
        self.widget_mut(id)?.base_mut().set_layer(layer);
        Ok(())
    }

    /// Returns the depth of a widget's layer, or 0 without one.
    ///
    /// # Errors
    ///
    /// The lookup errors of [`widget`](Self::widget).
    pub fn input_layer(&self, id: WidgetId) -> Result<i32, Error> {
        let layer = self.widget(id)?.base().layer();
        Ok(depth_of(&self.layers, layer))
    }

    fn position(&self, id: WidgetId) -> Result<usize, Error> {
        if id.panel != self.id {
            return Err(Error::ForeignWidget(id));
        }
        // Indices only grow, so the arena is sorted by id.
        self.widgets
            .binary_search_by_key(&id.index, |entry| entry.id.index)
            .map_err(|_| Error::UnknownWidget(id))
    }

    // -----------------------------------------------------------------------
    // Generation
    // -----------------------------------------------------------------------

    /// Solves the panel layout.
    ///
    /// Widgets whose anchor block moved or resized since the last call are
    /// invalidated with [`Change::ANCHOR`].
    pub fn generate_panel_layout(&mut self) {
        let _ = self.panel_layout_pass();
    }

    /// Lays out every layout-stale widget inside its anchor block. Widgets
    /// without an anchor, or whose anchor has no block yet, are skipped.
    ///
    /// # Errors
    ///
    /// The first error a widget returns.
    pub fn generate_widget_layouts(&mut self) -> Result<(), Error> {
        self.widget_layout_pass(0, &mut Tracer::none()).map(drop)
    }

    /// Releases the meshes of destroyed widgets, then builds geometry for
    /// every widget whose geometry is stale and whose layout is not.
    ///
    /// # Errors
    ///
    /// The first error a widget returns.
    pub fn generate_geometry(
        &mut self,
        meshes: &mut dyn MeshManager,
        fonts: &FontMap,
    ) -> Result<(), Error> {
        let _ = self.release_meshes(meshes);
        self.geometry_pass(meshes, fonts, 0, &mut Tracer::none())
            .map(drop)
    }

    /// Releases the nodes of destroyed widgets, then builds or updates the
    /// scenegraph of every widget whose scenegraph is stale and whose layout
    /// and geometry are not.
    ///
    /// # Errors
    ///
    /// The first error a widget returns.
    pub fn generate_scenegraph(
        &mut self,
        generator: &mut dyn ScenegraphGenerator,
    ) -> Result<(), Error> {
        let _ = self.release_nodes(generator);
        self.scenegraph_pass(generator, 0, &mut Tracer::none())
            .map(drop)
    }

    /// Runs a whole pass: panel layout, widget layouts, release of destroyed
    /// widgets' handles, geometry and scenegraph, reporting to `tracer`.
    ///
    /// # Errors
    ///
    /// The first error a widget returns. Earlier phases keep their results.
    pub fn generate(
        &mut self,
        meshes: &mut dyn MeshManager,
        fonts: &FontMap,
        generator: &mut dyn ScenegraphGenerator,
        tracer: &mut Tracer<'_>,
    ) -> Result<(), Error> {
        let pass = self.pass;
        self.pass += 1;
        tracer.pass_begin(&PassBeginEvent {
            pass,
            panel: self.id,
            widgets: count(self.widgets.len()),
        });

        tracer.phase_begin(&PhaseBeginEvent {
            pass,
            phase: PhaseKind::PanelLayout,
        });
        let moved = self.panel_layout_pass();
        tracer.phase_end(&PhaseEndEvent {
            pass,
            phase: PhaseKind::PanelLayout,
            generated: moved,
        });

        let _ = self.widget_layout_pass(pass, tracer)?;

        let released = ReleaseEvent {
            pass,
            meshes: self.release_meshes(meshes),
            nodes: self.release_nodes(generator),
        };
        if released.meshes > 0 || released.nodes > 0 {
            tracer.release(&released);
        }

        let _ = self.geometry_pass(meshes, fonts, pass, tracer)?;
        let _ = self.scenegraph_pass(generator, pass, tracer)?;

        let stale_widgets = self
            .widgets
            .iter()
            .filter(|entry| !entry.widget.base().stale().is_empty())
            .count();
        tracer.pass_end(&PassEndEvent {
            pass,
            panel: self.id,
            stale_widgets: count(stale_widgets),
        });
        Ok(())
    }

    /// Destroys every parked mesh and node now.
    pub fn release(
        &mut self,
        meshes: &mut dyn MeshManager,
        generator: &mut dyn ScenegraphGenerator,
    ) {
        let _ = self.release_meshes(meshes);
        let _ = self.release_nodes(generator);
    }

    /// Tears the panel down, destroying the meshes and root nodes of every
    /// live widget along with anything still waiting for release.
    ///
    /// Dropping a panel only deregisters its input elements; the managers
    /// keep whatever it generated.
    pub fn destroy(
        mut self,
        meshes: &mut dyn MeshManager,
        generator: &mut dyn ScenegraphGenerator,
    ) {
        for entry in &mut self.widgets {
            let mut retired = entry.widget.retire();
            self.retired.append(&mut retired);
        }
        self.release(meshes, generator);
    }

    /// Returns the handles waiting for release.
    #[must_use]
    pub fn retired(&self) -> &Retired {
        &self.retired
    }

    // -- Passes --

    /// Returns the number of widgets whose anchor block changed.
    fn panel_layout_pass(&mut self) -> u32 {
        self.layout.generate_into(&mut self.blocks);
        let mut moved = 0;
        for entry in &mut self.widgets {
            let base = entry.widget.base_mut();
            if let Some(anchor) = base.anchor() {
                if base.update_anchor_bounds(bounds_of(&self.blocks, anchor)) {
                    moved += 1;
                }
            }
        }
        moved
    }

    fn widget_layout_pass(&mut self, pass: u64, tracer: &mut Tracer<'_>) -> Result<u32, Error> {
        let phase = PhaseKind::WidgetLayout;
        tracer.phase_begin(&PhaseBeginEvent { pass, phase });
        let mut generated = 0;
        for entry in &mut self.widgets {
            let base = entry.widget.base();
            if !base.stale().contains(StaleData::LAYOUT) {
                continue;
            }
            let Some(bounds) = base.anchor_bounds() else {
                continue;
            };
            let cx = widget_context(&self.layers, self.stylesheet.as_deref(), self.node, entry);
            entry
                .widget
                .generate_layout(&cx, bounds.size(), bounds.origin())?;
            generated += 1;
            trace_widget(tracer, pass, phase, entry);
        }
        tracer.phase_end(&PhaseEndEvent {
            pass,
            phase,
            generated,
        });
        Ok(generated)
    }

    fn geometry_pass(
        &mut self,
        meshes: &mut dyn MeshManager,
        fonts: &FontMap,
        pass: u64,
        tracer: &mut Tracer<'_>,
    ) -> Result<u32, Error> {
        let phase = PhaseKind::Geometry;
        tracer.phase_begin(&PhaseBeginEvent { pass, phase });
        let mut generated = 0;
        for entry in &mut self.widgets {
            let stale = entry.widget.base().stale();
            if !stale.contains(StaleData::GEOMETRY) || stale.contains(StaleData::LAYOUT) {
                continue;
            }
            let cx = widget_context(&self.layers, self.stylesheet.as_deref(), self.node, entry);
            entry.widget.generate_geometry(&cx, meshes, fonts)?;
            generated += 1;
            trace_widget(tracer, pass, phase, entry);
        }
        tracer.phase_end(&PhaseEndEvent {
            pass,
            phase,
            generated,
        });
        Ok(generated)
    }

    fn scenegraph_pass(
        &mut self,
        generator: &mut dyn ScenegraphGenerator,
        pass: u64,
        tracer: &mut Tracer<'_>,
    ) -> Result<u32, Error> {
        let phase = PhaseKind::Scenegraph;
        tracer.phase_begin(&PhaseBeginEvent { pass, phase });
        let mut generated = 0;
        for entry in &mut self.widgets {
            let stale = entry.widget.base().stale();
            if !stale.contains(StaleData::SCENEGRAPH)
                || stale.intersects(StaleData::LAYOUT | StaleData::GEOMETRY)
            {
                continue;
            }
            let cx = widget_context(&self.layers, self.stylesheet.as_deref(), self.node, entry);
            entry.widget.generate_scenegraph(&cx, generator)?;
            generated += 1;
            trace_widget(tracer, pass, phase, entry);
        }
        tracer.phase_end(&PhaseEndEvent {
            pass,
            phase,
            generated,
        });
        Ok(generated)
    }

    fn release_meshes(&mut self, meshes: &mut dyn MeshManager) -> u32 {
        let released = count(self.retired.meshes.len());
        for mesh in self.retired.meshes.drain(..) {
            meshes.destroy_mesh(mesh);
        }
        released
    }

    fn release_nodes(&mut self, generator: &mut dyn ScenegraphGenerator) -> u32 {
        let released = count(self.retired.nodes.len());
        for node in self.retired.nodes.drain(..) {
            generator.destroy_node(node);
        }
        released
    }

    // -----------------------------------------------------------------------
    // Input
    // -----------------------------------------------------------------------

    /// Returns the widget under `point`.
    ///
    /// The widget in the deepest layer wins; among equal depths the widget
    /// added last wins.
    #[must_use]
    pub fn widget_at(&self, point: Point) -> Option<WidgetId> {
        self.widgets
            .iter()
            .filter(|entry| entry.widget.intersect(point))
            .max_by_key(|entry| depth_of(&self.layers, entry.widget.base().layer()))
            .map(|entry| entry.id)
    }

    /// Delivers a cursor-enter to a widget.
    ///
    /// # Errors
    ///
    /// The lookup errors of [`widget`](Self::widget).
    pub fn on_mouse_enter(&mut self, id: WidgetId) -> Result<InputResult, Error> {
        Ok(self.widget_mut(id)?.on_mouse_enter())
    }

    /// Delivers a cursor-exit to a widget.
    ///
    /// # Errors
    ///
    /// The lookup errors of [`widget`](Self::widget).
    pub fn on_mouse_exit(&mut self, id: WidgetId) -> Result<InputResult, Error> {
        Ok(self.widget_mut(id)?.on_mouse_exit())
    }

    /// Delivers a click to a widget. A left press on a radio button also
    /// selects it within its group.
    ///
    /// # Errors
    ///
    /// The lookup errors of [`widget`](Self::widget).
    pub fn on_mouse_click(
        &mut self,
        id: WidgetId,
        event: &MouseClickEvent,
    ) -> Result<InputResult, Error> {
        let widget = self.widget_mut(id)?;
        let result = widget.on_mouse_click(event);
        if event.is_left_press() && widget.is::<RadioButton>() {
            self.set_main(id)?;
        }
        Ok(result)
    }

    /// Delivers a cursor move to a widget.
    ///
    /// # Errors
    ///
    /// The lookup errors of [`widget`](Self::widget).
    pub fn on_mouse_move(
        &mut self,
        id: WidgetId,
        event: &MouseMoveEvent,
    ) -> Result<InputResult, Error> {
        Ok(self.widget_mut(id)?.on_mouse_move(event))
    }

    /// Delivers a wheel turn to a widget.
    ///
    /// # Errors
    ///
    /// The lookup errors of [`widget`](Self::widget).
    pub fn on_mouse_scroll(
        &mut self,
        id: WidgetId,
        event: &MouseScrollEvent,
    ) -> Result<InputResult, Error> {
        Ok(self.widget_mut(id)?.on_mouse_scroll(event))
    }
}

impl Drop for Panel {
    fn drop(&mut self) {
        for entry in &self.widgets {
            self.input.remove_element(InputTarget::Widget(entry.id));
        }
        self.input.remove_element(InputTarget::Panel(self.id));
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn depth_of(layers: &BTreeMap<String, Layer>, layer: Option<LayerId>) -> i32 {
    layer
        .and_then(|id| layers.values().find(|l| l.id == id))
        .map_or(0, |l| l.depth)
}

fn widget_context<'a>(
    layers: &BTreeMap<String, Layer>,
    stylesheet: Option<&'a Stylesheet>,
    panel_node: Option<NodeId>,
    entry: &WidgetEntry,
) -> WidgetContext<'a> {
    WidgetContext {
        stylesheet,
        depth: depth_of(layers, entry.widget.base().layer()),
        panel_node,
    }
}

fn trace_widget(tracer: &mut Tracer<'_>, pass: u64, phase: PhaseKind, entry: &WidgetEntry) {
    tracer.widget_generated(&WidgetGeneratedEvent {
        pass,
        phase,
        widget: entry.id,
        kind: entry.widget.kind(),
        remaining: entry.widget.base().stale(),
    });
}

fn count(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use core::cell::RefCell;

    use kurbo::Rect;
    use lamina_layout::{ElementKind, Length, Size};
    use lamina_scene::generator::SceneGenerator;
    use lamina_scene::mesh::MeshStore;

    use super::*;
    use crate::input::NullInput;
    use crate::widget::Checkbox;

    /// A panel of `rows` full-width rows, 10 units tall, in a 100 × 100 area.
    fn panel_with_rows(rows: usize) -> (Panel, Vec<ElementId>) {
        let mut panel = Panel::new(NullInput);
        let layout = panel.layout_mut();
        let root = layout.set_root(ElementKind::VerticalFlow);
        layout.set_element_size(root, Size::FULL);
        let rows = (0..rows)
            .map(|_| {
                let row = layout.append(root, ElementKind::Leaf);
                layout.set_element_size(row, Size::new(Length::FULL, Length::Absolute(10.0)));
                row
            })
            .collect();
        layout.set_size(kurbo::Size::new(100.0, 100.0));
        (panel, rows)
    }

    fn anchored(panel: &mut Panel, row: ElementId, label: &str) -> WidgetId {
        let id = panel.add_widget(Checkbox::new(label));
        panel.set_widget_anchor(id, Some(row)).unwrap();
        id
    }

    fn run(panel: &mut Panel, meshes: &mut MeshStore, generator: &mut SceneGenerator) {
        panel
            .generate(meshes, &FontMap::new(), generator, &mut Tracer::none())
            .unwrap();
    }

    #[derive(Debug, Default)]
    struct RecordingInput {
        elements: Vec<(InputTarget, Option<InputTarget>)>,
    }

    impl InputContext for RecordingInput {
        fn add_element(&mut self, target: InputTarget, parent: Option<InputTarget>) {
            self.elements.push((target, parent));
        }

        fn remove_element(&mut self, target: InputTarget) {
            self.elements.retain(|(t, _)| *t != target);
        }
    }

    #[test]
    fn layer_names_are_validated() {
        let mut panel = Panel::new(NullInput);
        assert_eq!(panel.create_layer("", 0), Err(Error::EmptyLayerName));
        panel.create_layer("top", 5).unwrap();
        assert_eq!(
            panel.create_layer("top", 1),
            Err(Error::DuplicateLayer("top".into()))
        );
        assert_eq!(panel.layer("top").unwrap().depth(), 5);
        assert_eq!(
            panel.layer("missing").map(Layer::depth),
            Err(Error::UnknownLayer("missing".into()))
        );
        assert_eq!(
            panel.destroy_layer("missing"),
            Err(Error::UnknownLayer("missing".into()))
        );
    }

    #[test]
    fn destroying_a_layer_keeps_its_widgets() {
        let mut panel = Panel::new(NullInput);
        let top = panel.create_layer("top", 3).unwrap();
        let a = panel.add_widget_to_layer(Checkbox::new("A"), "top").unwrap();
        let b = panel.add_widget_to_layer(Checkbox::new("B"), "top").unwrap();
        assert_eq!(panel.widget(a).unwrap().base().layer(), Some(top));
        assert_eq!(panel.input_layer(b), Ok(3));

        panel.destroy_layer("top").unwrap();
        assert_eq!(panel.len(), 2);
        for id in [a, b] {
            assert_eq!(panel.widget(id).unwrap().base().layer(), None);
            assert_eq!(panel.input_layer(id), Ok(0));
        }
        assert!(panel.layer("top").is_err());
    }

    #[test]
    fn adding_to_a_missing_layer_fails() {
        let mut panel = Panel::new(NullInput);
        assert_eq!(
            panel.add_widget_to_layer(Checkbox::new("A"), "nope"),
            Err(Error::UnknownLayer("nope".into()))
        );
        assert!(panel.is_empty());
    }

    #[test]
    fn widget_lookup_checks_ownership() {
        let mut panel = Panel::new(NullInput);
        let mut other = Panel::new(NullInput);
        let foreign = other.add_widget(Checkbox::new("X"));
        let id = panel.add_widget(Checkbox::new("A"));
        assert_eq!(id.panel(), panel.id());

        assert_eq!(
            panel.destroy_widget(foreign),
            Err(Error::ForeignWidget(foreign))
        );
        panel.destroy_widget(id).unwrap();
        assert_eq!(panel.destroy_widget(id), Err(Error::UnknownWidget(id)));
        assert!(panel.widget(id).is_err());
        assert_eq!(other.len(), 1);
    }

    #[test]
    fn typed_lookup_reports_the_expected_type() {
        let mut panel = Panel::new(NullInput);
        let id = panel.add_widget(Checkbox::new("A"));
        assert!(panel.get::<Checkbox>(id).is_ok());
        assert!(matches!(
            panel.get::<RadioButton>(id),
            Err(Error::WidgetKindMismatch { widget, .. }) if widget == id
        ));
    }

    #[test]
    fn ids_are_not_reused() {
        let mut panel = Panel::new(NullInput);
        let a = panel.add_widget(Checkbox::new("A"));
        panel.destroy_widget(a).unwrap();
        let b = panel.add_widget(Checkbox::new("B"));
        assert_ne!(a, b);
        assert!(panel.widget(a).is_err());
    }

    #[test]
    fn anchors_must_belong_to_the_panel_layout() {
        let (mut panel, rows) = panel_with_rows(1);
        let id = panel.add_widget(Checkbox::new("A"));
        let mut foreign = Layout::new();
        let element = foreign.set_root(ElementKind::Leaf);
        assert_eq!(
            panel.set_widget_anchor(id, Some(element)),
            Err(Error::ForeignElement(element))
        );
        panel.set_widget_anchor(id, Some(rows[0])).unwrap();
        assert_eq!(panel.widget(id).unwrap().base().anchor(), Some(rows[0]));
    }

    #[test]
    fn pipeline_skips_unanchored_widgets() {
        let (mut panel, rows) = panel_with_rows(2);
        let a = anchored(&mut panel, rows[1], "A");
        let b = panel.add_widget(Checkbox::new("B"));
        let mut meshes = MeshStore::new();
        let mut generator = SceneGenerator::new();
        run(&mut panel, &mut meshes, &mut generator);

        assert_eq!(panel.widget(a).unwrap().base().stale(), StaleData::empty());
        assert_eq!(panel.widget(b).unwrap().base().stale(), StaleData::ALL);
        let base = panel.widget(a).unwrap().base();
        assert_eq!(base.anchor_bounds(), Some(Rect::new(0.0, 10.0, 100.0, 20.0)));
        assert_eq!(base.blocks()[0].bounds, Rect::new(0.0, 10.0, 100.0, 20.0));
    }

    #[test]
    fn phases_only_clear_their_own_bit() {
        let (mut panel, rows) = panel_with_rows(1);
        let a = anchored(&mut panel, rows[0], "A");
        let mut meshes = MeshStore::new();
        let mut generator = SceneGenerator::new();

        panel.generate_panel_layout();
        panel.generate_widget_layouts().unwrap();
        let stale = panel.widget(a).unwrap().base().stale();
        assert_eq!(stale, StaleData::GEOMETRY | StaleData::SCENEGRAPH);

        // Scenegraph waits for geometry instead of failing.
        panel.generate_scenegraph(&mut generator).unwrap();
        assert_eq!(panel.widget(a).unwrap().base().stale(), stale);

        panel.generate_geometry(&mut meshes, &FontMap::new()).unwrap();
        assert_eq!(
            panel.widget(a).unwrap().base().stale(),
            StaleData::SCENEGRAPH
        );
        panel.generate_scenegraph(&mut generator).unwrap();
        assert!(panel.widget(a).unwrap().base().stale().is_empty());
    }

    #[test]
    fn moved_anchor_blocks_invalidate() {
        let (mut panel, rows) = panel_with_rows(2);
        let a = anchored(&mut panel, rows[0], "A");
        let b = anchored(&mut panel, rows[1], "B");
        let mut meshes = MeshStore::new();
        let mut generator = SceneGenerator::new();
        run(&mut panel, &mut meshes, &mut generator);

        // Growing the second row leaves the first in place.
        panel
            .layout_mut()
            .set_element_size(rows[1], Size::new(Length::FULL, Length::Absolute(30.0)));
        panel.generate_panel_layout();
        assert!(panel.widget(a).unwrap().base().stale().is_empty());
        assert_eq!(panel.widget(b).unwrap().base().stale(), StaleData::ALL);

        run(&mut panel, &mut meshes, &mut generator);
        let base = panel.widget(b).unwrap().base();
        assert_eq!(base.anchor_bounds(), Some(Rect::new(0.0, 10.0, 100.0, 40.0)));
        assert!(base.stale().is_empty());
    }

    #[test]
    fn stylesheet_change_invalidates_every_widget() {
        let (mut panel, rows) = panel_with_rows(2);
        let a = anchored(&mut panel, rows[0], "A");
        let b = anchored(&mut panel, rows[1], "B");
        let mut meshes = MeshStore::new();
        let mut generator = SceneGenerator::new();
        run(&mut panel, &mut meshes, &mut generator);

        let sheet = Stylesheet::new().with("checkbox.box.width", Length::Relative(0.2));
        panel.set_stylesheet(Some(Rc::new(sheet)));
        for id in [a, b] {
            assert_eq!(panel.widget(id).unwrap().base().stale(), StaleData::ALL);
        }
        run(&mut panel, &mut meshes, &mut generator);
        let checkbox = panel.get::<Checkbox>(a).unwrap();
        assert_eq!(
            checkbox.base().blocks()[1].bounds,
            Rect::new(0.0, 0.0, 20.0, 10.0)
        );
    }

    #[test]
    fn destroyed_widgets_are_released_on_the_next_pass() {
        let (mut panel, rows) = panel_with_rows(1);
        let a = anchored(&mut panel, rows[0], "A");
        let mut meshes = MeshStore::new();
        let mut generator = SceneGenerator::new();
        run(&mut panel, &mut meshes, &mut generator);
        assert_eq!(meshes.len(), 4);
        let nodes = generator.store().node_count();
        assert!(nodes > 1);

        panel.destroy_widget(a).unwrap();
        assert_eq!(meshes.len(), 4);
        assert_eq!(panel.retired().meshes.len(), 4);
        assert_eq!(panel.retired().nodes.len(), 1);

        run(&mut panel, &mut meshes, &mut generator);
        assert!(meshes.is_empty());
        assert_eq!(generator.store().node_count(), 1);
        assert!(panel.retired().is_empty());
    }

    #[test]
    fn explicit_release_flushes_everything() {
        let (mut panel, rows) = panel_with_rows(1);
        let a = anchored(&mut panel, rows[0], "A");
        let mut meshes = MeshStore::new();
        let mut generator = SceneGenerator::new();
        run(&mut panel, &mut meshes, &mut generator);

        panel.destroy_widget(a).unwrap();
        panel.release(&mut meshes, &mut generator);
        assert_eq!(meshes.destroyed_count(), 4);
        assert_eq!(generator.store().node_count(), 1);
    }

    #[test]
    fn destroy_hands_everything_back() {
        let (mut panel, rows) = panel_with_rows(2);
        let a = anchored(&mut panel, rows[0], "A");
        let _ = anchored(&mut panel, rows[1], "B");
        let mut meshes = MeshStore::new();
        let mut generator = SceneGenerator::new();
        run(&mut panel, &mut meshes, &mut generator);
        assert_eq!(meshes.len(), 8);

        // One widget parked, one still live.
        panel.destroy_widget(a).unwrap();
        panel.destroy(&mut meshes, &mut generator);
        assert!(meshes.is_empty());
        assert_eq!(meshes.destroyed_count(), 8);
        assert_eq!(generator.store().node_count(), 1);
    }

    #[test]
    fn widget_nodes_hang_off_the_panel_node() {
        let (mut panel, rows) = panel_with_rows(1);
        let a = anchored(&mut panel, rows[0], "A");
        let mut meshes = MeshStore::new();
        let mut generator = SceneGenerator::new();
        let panel_node = generator.create_widget_node(None);
        panel.set_panel_node(Some(panel_node));
        run(&mut panel, &mut meshes, &mut generator);

        let root = panel.get::<Checkbox>(a).unwrap().nodes().unwrap().root;
        assert_eq!(generator.store().parent(root), Some(panel_node));
    }

    #[test]
    fn deeper_layers_win_hit_tests() {
        let (mut panel, rows) = panel_with_rows(1);
        panel.create_layer("top", 5).unwrap();
        let top = panel.add_widget_to_layer(Checkbox::new("Top"), "top").unwrap();
        panel.set_widget_anchor(top, Some(rows[0])).unwrap();
        let a = anchored(&mut panel, rows[0], "A");
        let b = anchored(&mut panel, rows[0], "B");
        let mut meshes = MeshStore::new();
        let mut generator = SceneGenerator::new();
        run(&mut panel, &mut meshes, &mut generator);

        assert_eq!(panel.widget_at(Point::new(5.0, 5.0)), Some(top));
        panel.set_widget_layer(top, None).unwrap();
        assert_eq!(panel.widget_at(Point::new(5.0, 5.0)), Some(b));
        panel.destroy_widget(b).unwrap();
        assert_eq!(panel.widget_at(Point::new(5.0, 5.0)), Some(a));
        assert_eq!(panel.widget_at(Point::new(5.0, 50.0)), None);
    }

    #[test]
    fn layers_offset_widget_depth() {
        let (mut panel, rows) = panel_with_rows(1);
        panel.create_layer("top", 4).unwrap();
        let a = panel.add_widget_to_layer(Checkbox::new("A"), "top").unwrap();
        panel.set_widget_anchor(a, Some(rows[0])).unwrap();
        let mut meshes = MeshStore::new();
        let mut generator = SceneGenerator::new();
        run(&mut panel, &mut meshes, &mut generator);
        let _ = generator.evaluate();

        let frame = panel.get::<Checkbox>(a).unwrap().nodes().unwrap().frame;
        assert_eq!(generator.store().world_offset(frame).z, 4.0);
    }

    #[test]
    fn panel_intersects_its_target_rectangle() {
        let (panel, _rows) = panel_with_rows(1);
        assert!(panel.intersect(Point::new(50.0, 99.0)));
        assert!(!panel.intersect(Point::new(50.0, 101.0)));
    }

    #[test]
    fn input_registration_follows_widget_lifetime() {
        let input = Rc::new(RefCell::new(RecordingInput::default()));
        let mut panel = Panel::new(Rc::clone(&input));
        let panel_id = panel.id();
        let a = panel.add_widget(Checkbox::new("A"));
        let b = panel.add_widget(Checkbox::new("B"));
        assert_eq!(
            input.borrow().elements,
            [
                (InputTarget::Panel(panel_id), None),
                (InputTarget::Widget(a), Some(InputTarget::Panel(panel_id))),
                (InputTarget::Widget(b), Some(InputTarget::Panel(panel_id))),
            ]
        );

        panel.destroy_widget(a).unwrap();
        assert_eq!(input.borrow().elements.len(), 2);
        drop(panel);
        assert!(input.borrow().elements.is_empty());
    }

    #[test]
    fn events_reach_the_widget() {
        let (mut panel, rows) = panel_with_rows(1);
        let a = anchored(&mut panel, rows[0], "A");
        assert_eq!(panel.on_mouse_enter(a), Ok(InputResult::IGNORED));
        assert!(panel.widget(a).unwrap().base().is_hovered());
        assert_eq!(
            panel.on_mouse_click(a, &MouseClickEvent::left_press((1.0, 1.0))),
            Ok(InputResult::CLAIMED)
        );
        let _ = panel.on_mouse_exit(a).unwrap();
        assert!(!panel.widget(a).unwrap().base().is_hovered());
    }
}
