// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A labelled on/off box bound to a boolean source.

use alloc::rc::Rc;
use alloc::string::String;

use kurbo::Point;
use lamina_scene::font::FontMap;
use lamina_scene::generator::ScenegraphGenerator;
use lamina_scene::mesh::MeshManager;

use super::toggle::{CHECKBOX, ToggleMeshes, ToggleNodes, ToggleVisual};
use super::{Retired, Widget, WidgetBase, WidgetContext, WidgetKind};
use crate::data::BoolDataSource;
use crate::error::Error;
use crate::input::{InputResult, MouseClickEvent};
use crate::stale::Change;

/// A checkbox.
///
/// The check mark shows the bound source's value; without a source it is
/// never shown. A left press toggles the source.
#[derive(Debug)]
pub struct Checkbox {
    base: WidgetBase,
    visual: ToggleVisual,
    label: String,
    source: Option<Rc<dyn BoolDataSource>>,
}

impl Checkbox {
    /// Creates an unbound checkbox.
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            base: WidgetBase::new(),
            visual: ToggleVisual::new(&CHECKBOX),
            label: label.into(),
            source: None,
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

    /// Returns the bound source.
    #[must_use]
    pub fn data_source(&self) -> Option<&Rc<dyn BoolDataSource>> {
        self.source.as_ref()
    }

    /// Binds a source, or unbinds with `None`.
    ///
    /// Returns whether the binding changed.
    pub fn set_data_source(&mut self, source: Option<Rc<dyn BoolDataSource>>) -> bool {
        self.base
            .replace_data_source(&mut self.source, source, Change::BOOL_VALUE)
    }

    /// Returns the bound value, or `false` without a source.
    #[must_use]
    pub fn is_checked(&self) -> bool {
        self.source.as_ref().is_some_and(|s| s.get())
    }

    /// Returns the generated meshes.
    #[must_use]
    pub fn meshes(&self) -> Option<&ToggleMeshes> {
        self.visual.meshes.as_ref()
    }

    /// Returns the generated scenegraph nodes.
    #[must_use]
    pub fn nodes(&self) -> Option<&ToggleNodes> {
        self.visual.nodes.as_ref()
    }
}

impl Widget for Checkbox {
    fn base(&self) -> &WidgetBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut WidgetBase {
        &mut self.base
    }

    fn kind(&self) -> WidgetKind {
        WidgetKind::Checkbox
    }

    fn generate_layout(
        &mut self,
        cx: &WidgetContext<'_>,
        size: kurbo::Size,
        offset: Point,
    ) -> Result<(), Error> {
        self.visual.generate_layout(&mut self.base, cx, size, offset);
        Ok(())
    }

    fn generate_geometry(
        &mut self,
        cx: &WidgetContext<'_>,
        meshes: &mut dyn MeshManager,
        fonts: &FontMap,
    ) -> Result<(), Error> {
        self.visual
            .generate_geometry(&self.base, cx, meshes, fonts, &self.label)
    }

    fn generate_scenegraph(
        &mut self,
        cx: &WidgetContext<'_>,
        generator: &mut dyn ScenegraphGenerator,
    ) -> Result<(), Error> {
        let checked = self.is_checked();
        self.visual
            .generate_scenegraph(&self.base, cx, generator, checked)
    }

    fn on_mouse_click(&mut self, event: &MouseClickEvent) -> InputResult {
        if !event.is_left_press() {
            return InputResult::IGNORED;
        }
        if let Some(source) = &self.source {
            source.set(!source.get());
        }
        InputResult::CLAIMED
    }

    fn retire(&mut self) -> Retired {
        self.visual.retire()
    }
}
