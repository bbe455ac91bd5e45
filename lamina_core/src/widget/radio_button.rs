// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Mutually exclusive buttons.
//!
//! A group has one *main* button; every other button of the group is a
//! *member* that records its main's [`WidgetId`]. The main in turn lists its
//! members. Both directions are ids into the owning panel, maintained by the
//! panel as buttons are added and destroyed:
//!
//! - adding a member registers it with its main, or turns it into a main of
//!   its own when the main no longer exists;
//! - destroying a member unregisters it from its main;
//! - destroying a main turns each of its members into a main of its own.
//!
//! Exclusivity is enforced on click by [`Panel::set_main`], not continuously.

use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;

use kurbo::Point;
use lamina_scene::font::FontMap;
use lamina_scene::generator::ScenegraphGenerator;
use lamina_scene::mesh::MeshManager;

use super::toggle::{RADIO_BUTTON, ToggleMeshes, ToggleNodes, ToggleVisual};
use super::{Retired, Widget, WidgetBase, WidgetContext, WidgetId, WidgetKind};
use crate::data::BoolDataSource;
use crate::error::Error;
use crate::input::{InputResult, MouseClickEvent};
use crate::panel::Panel;
use crate::stale::Change;

#[derive(Clone, Debug, PartialEq, Eq)]
enum Role {
    Main { members: Vec<WidgetId> },
    Member { main: WidgetId },
}

/// A radio button.
///
/// The check mark shows the bound source's value. A left press delivered
/// through [`Panel::on_mouse_click`] selects the button within its group.
#[derive(Debug)]
pub struct RadioButton {
    base: WidgetBase,
    visual: ToggleVisual,
    label: String,
    source: Option<Rc<dyn BoolDataSource>>,
    role: Role,
}

impl RadioButton {
    /// Creates the main button of a new group.
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            base: WidgetBase::new(),
            visual: ToggleVisual::new(&RADIO_BUTTON),
            label: label.into(),
            source: None,
            role: Role::Main {
                members: Vec::new(),
            },
        }
    }

    /// Creates a member of the group whose main is `main`.
    ///
    /// The button joins the group when it is added to `panel`.
    ///
    /// # Errors
    ///
    /// Fails when `main` is not a widget of `panel`
    /// ([`Error::ForeignWidget`], [`Error::UnknownWidget`]), is not a radio
    /// button ([`Error::NotARadioButton`]) or is itself a member
    /// ([`Error::NotAMainButton`]).
    pub fn grouped(panel: &Panel, main: WidgetId, label: impl Into<String>) -> Result<Self, Error> {
        let widget = panel.widget(main)?;
        let main_button = widget
            .downcast_ref::<Self>()
            .ok_or(Error::NotARadioButton(main))?;
        if !main_button.is_main_button() {
            return Err(Error::NotAMainButton(main));
        }
        Ok(Self {
            role: Role::Member { main },
            ..Self::new(label)
        })
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

    /// Returns whether this button is the main of its group.
    #[must_use]
    pub fn is_main_button(&self) -> bool {
        matches!(self.role, Role::Main { .. })
    }

    /// Returns the main of this button's group, or `None` if this button is
    /// the main.
    #[must_use]
    pub fn main_button(&self) -> Option<WidgetId> {
        match self.role {
            Role::Main { .. } => None,
            Role::Member { main } => Some(main),
        }
    }

    /// Returns the members of the group this button is the main of.
    #[must_use]
    pub fn members(&self) -> &[WidgetId] {
        match &self.role {
            Role::Main { members } => members,
            Role::Member { .. } => &[],
        }
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

    // -- Group maintenance --

    fn add_member(&mut self, member: WidgetId) {
        if let Role::Main { members } = &mut self.role {
            if !members.contains(&member) {
                members.push(member);
            }
        }
    }

    fn remove_member(&mut self, member: WidgetId) {
        if let Role::Main { members } = &mut self.role {
            members.retain(|&m| m != member);
        }
    }

    /// Makes this button the main of a group of its own, returning the
    /// members it had as a main.
    fn detach(&mut self) -> Vec<WidgetId> {
        match core::mem::replace(
            &mut self.role,
            Role::Main {
                members: Vec::new(),
            },
        ) {
            Role::Main { members } => members,
            Role::Member { .. } => Vec::new(),
        }
    }
}

impl Widget for RadioButton {
    fn base(&self) -> &WidgetBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut WidgetBase {
        &mut self.base
    }

    fn kind(&self) -> WidgetKind {
        WidgetKind::RadioButton
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

    /// Only the box is clickable.
    fn intersect(&self, point: Point) -> bool {
        self.visual
            .box_bounds(&self.base)
            .is_some_and(|bounds| bounds.contains(point))
    }

    /// Claims left presses; selection happens in [`Panel::set_main`], which
    /// the panel calls after delivering the press.
    fn on_mouse_click(&mut self, event: &MouseClickEvent) -> InputResult {
        InputResult::claim_if(event.is_left_press())
    }

    fn retire(&mut self) -> Retired {
        self.visual.retire()
    }
}

// ---------------------------------------------------------------------------
// Panel integration
// ---------------------------------------------------------------------------

impl Panel {
    /// Returns every button of the group `button` belongs to, main first.
    ///
    /// # Errors
    ///
    /// Fails when `button` is not a radio button of this panel.
    pub fn radio_group(&self, button: WidgetId) -> Result<Vec<WidgetId>, Error> {
        let radio = self.radio(button)?;
        let main = radio.main_button().unwrap_or(button);
        let mut group = Vec::from([main]);
        group.extend_from_slice(self.radio(main)?.members());
        Ok(group)
    }

    /// Selects `clicked` within its group.
    ///
    /// The clicked button's source becomes `true` and every other bound
    /// source of the group `false`. Buttons without a source are left alone,
    /// and nothing happens when the clicked button has none.
    ///
    /// # Errors
    ///
    /// Fails when `clicked` is not a radio button of this panel.
    pub fn set_main(&mut self, clicked: WidgetId) -> Result<(), Error> {
        if self.radio(clicked)?.data_source().is_none() {
            return Ok(());
        }
        let group = self.radio_group(clicked)?;
        let sources: Vec<(WidgetId, Rc<dyn BoolDataSource>)> = group
            .iter()
            .filter_map(|&id| {
                let source = self.radio(id).ok()?.data_source()?;
                Some((id, Rc::clone(source)))
            })
            .collect();

        // Clear first so listeners never observe two selected buttons.
        for (id, source) in &sources {
            if *id != clicked {
                source.set(false);
            }
        }
        for (id, source) in &sources {
            if *id == clicked {
                source.set(true);
            }
        }
        Ok(())
    }

    fn radio(&self, id: WidgetId) -> Result<&RadioButton, Error> {
        self.widget(id)?
            .downcast_ref::<RadioButton>()
            .ok_or(Error::NotARadioButton(id))
    }

    /// Registers a freshly added button with its group.
    pub(crate) fn join_radio_group(&mut self, id: WidgetId) {
        let Some(main) = self.radio(id).ok().and_then(RadioButton::main_button) else {
            return;
        };
        let joined = match self.get_mut::<RadioButton>(main) {
            Ok(main_button) if main_button.is_main_button() => {
                main_button.add_member(id);
                true
            }
            _ => false,
        };
        if !joined {
            if let Ok(button) = self.get_mut::<RadioButton>(id) {
                button.detach();
            }
        }
    }

    /// Repairs the group of a button that is being destroyed.
    pub(crate) fn leave_radio_group(&mut self, button: &mut RadioButton, id: WidgetId) {
        match button.main_button() {
            Some(main) => {
                if let Ok(main_button) = self.get_mut::<RadioButton>(main) {
                    main_button.remove_member(id);
                }
            }
            None => {
                for member in button.detach() {
                    if let Ok(member_button) = self.get_mut::<RadioButton>(member) {
                        member_button.detach();
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::BoolValue;
    use crate::input::{MouseAction, MouseButton, NullInput};

    fn bound(
        panel: &mut Panel,
        mut button: RadioButton,
        value: bool,
    ) -> (WidgetId, Rc<dyn BoolDataSource>) {
        let source: Rc<dyn BoolDataSource> = Rc::new(BoolValue::new(value));
        button.set_data_source(Some(source.clone()));
        (panel.add_widget(button), source)
    }

    #[test]
    fn members_register_with_their_main() {
        let mut panel = Panel::new(NullInput);
        let main = panel.add_widget(RadioButton::new("M"));
        let a = panel.add_widget(RadioButton::grouped(&panel, main, "A").unwrap());
        let b = panel.add_widget(RadioButton::grouped(&panel, main, "B").unwrap());

        let main_button = panel.get::<RadioButton>(main).unwrap();
        assert!(main_button.is_main_button());
        assert_eq!(main_button.members(), &[a, b]);
        assert_eq!(panel.get::<RadioButton>(a).unwrap().main_button(), Some(main));
        assert_eq!(panel.radio_group(b).unwrap(), [main, a, b]);
    }

    #[test]
    fn grouping_requires_a_main_radio_button() {
        let mut panel = Panel::new(NullInput);
        let main = panel.add_widget(RadioButton::new("M"));
        let a = panel.add_widget(RadioButton::grouped(&panel, main, "A").unwrap());
        let checkbox = panel.add_widget(crate::widget::Checkbox::new("C"));

        assert_eq!(
            RadioButton::grouped(&panel, a, "B").unwrap_err(),
            Error::NotAMainButton(a)
        );
        assert_eq!(
            RadioButton::grouped(&panel, checkbox, "B").unwrap_err(),
            Error::NotARadioButton(checkbox)
        );

        let other = Panel::new(NullInput);
        assert_eq!(
            RadioButton::grouped(&other, main, "B").unwrap_err(),
            Error::ForeignWidget(main)
        );
    }

    #[test]
    fn clicking_a_member_is_exclusive() {
        let mut panel = Panel::new(NullInput);
        let (main, m) = bound(&mut panel, RadioButton::new("M"), true);
        let a_button = RadioButton::grouped(&panel, main, "A").unwrap();
        let (a, a_src) = bound(&mut panel, a_button, false);
        let b_button = RadioButton::grouped(&panel, main, "B").unwrap();
        let (_b, b_src) = bound(&mut panel, b_button, true);

        panel.set_main(a).unwrap();
        assert!(!m.get());
        assert!(a_src.get());
        assert!(!b_src.get());

        panel.set_main(a).unwrap();
        assert!(a_src.get());
        assert!(!m.get());

        panel.set_main(main).unwrap();
        assert!(m.get());
        assert!(!a_src.get());
    }

    #[test]
    fn unbound_buttons_are_left_alone() {
        let mut panel = Panel::new(NullInput);
        let (main, m) = bound(&mut panel, RadioButton::new("M"), true);
        let unbound = panel.add_widget(RadioButton::grouped(&panel, main, "A").unwrap());
        let b_button = RadioButton::grouped(&panel, main, "B").unwrap();
        let (b, b_src) = bound(&mut panel, b_button, false);

        panel.set_main(unbound).unwrap();
        assert!(m.get());
        assert!(!b_src.get());

        panel.set_main(b).unwrap();
        assert!(!m.get());
        assert!(b_src.get());
    }

    #[test]
    fn destroying_a_member_unregisters_it() {
        let mut panel = Panel::new(NullInput);
        let main = panel.add_widget(RadioButton::new("M"));
        let a = panel.add_widget(RadioButton::grouped(&panel, main, "A").unwrap());
        let b = panel.add_widget(RadioButton::grouped(&panel, main, "B").unwrap());

        panel.destroy_widget(a).unwrap();
        assert_eq!(panel.get::<RadioButton>(main).unwrap().members(), &[b]);
    }

    #[test]
    fn destroying_the_main_splits_the_group() {
        let mut panel = Panel::new(NullInput);
        let main = panel.add_widget(RadioButton::new("M"));
        let a = panel.add_widget(RadioButton::grouped(&panel, main, "A").unwrap());
        let b = panel.add_widget(RadioButton::grouped(&panel, main, "B").unwrap());

        panel.destroy_widget(main).unwrap();
        for id in [a, b] {
            let button = panel.get::<RadioButton>(id).unwrap();
            assert!(button.is_main_button());
            assert!(button.members().is_empty());
        }
    }

    #[test]
    fn member_of_a_vanished_main_becomes_a_main() {
        let mut panel = Panel::new(NullInput);
        let main = panel.add_widget(RadioButton::new("M"));
        let orphan = RadioButton::grouped(&panel, main, "A").unwrap();
        panel.destroy_widget(main).unwrap();

        let a = panel.add_widget(orphan);
        assert!(panel.get::<RadioButton>(a).unwrap().is_main_button());
    }

    #[test]
    fn click_dispatch_selects() {
        let mut panel = Panel::new(NullInput);
        let (main, m) = bound(&mut panel, RadioButton::new("M"), true);
        let a_button = RadioButton::grouped(&panel, main, "A").unwrap();
        let (a, a_src) = bound(&mut panel, a_button, false);

        let result = panel
            .on_mouse_click(a, &MouseClickEvent::left_press((0.0, 0.0)))
            .unwrap();
        assert!(result.claim);
        assert!(a_src.get());
        assert!(!m.get());
    }

    #[test]
    fn only_left_presses_are_claimed() {
        let mut panel = Panel::new(NullInput);
        let (main, m) = bound(&mut panel, RadioButton::new("M"), false);

        let right = MouseClickEvent {
            button: MouseButton::Right,
            action: MouseAction::Press,
            position: Point::ZERO,
        };
        assert_eq!(panel.on_mouse_click(main, &right), Ok(InputResult::IGNORED));
        let release = MouseClickEvent {
            action: MouseAction::Release,
            ..MouseClickEvent::left_press(Point::ZERO)
        };
        assert_eq!(panel.on_mouse_click(main, &release), Ok(InputResult::IGNORED));
        assert!(!m.get());

        let press = MouseClickEvent::left_press(Point::ZERO);
        assert_eq!(panel.on_mouse_click(main, &press), Ok(InputResult::CLAIMED));
        assert!(m.get());
    }
}
