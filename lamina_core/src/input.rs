// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Input registration and mouse events.
//!
//! The host's hit-testing system learns about panels and widgets through an
//! [`InputContext`]. Panels register themselves as roots and their widgets as
//! children, so events a widget does not claim can bubble up to its panel.
//!
//! Events are delivered by the host through the `Panel::on_mouse_*` methods.
//! Each returns an [`InputResult`]; a claimed event must not be offered to
//! other elements.

use alloc::rc::Rc;
use core::cell::RefCell;

use kurbo::Point;

use crate::panel::PanelId;
use crate::widget::WidgetId;

/// An element known to the input system.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InputTarget {
    /// A panel.
    Panel(PanelId),
    /// A widget inside a panel.
    Widget(WidgetId),
}

/// The host's element registry.
pub trait InputContext {
    /// Registers `target`, with `parent` receiving events it does not claim.
    fn add_element(&mut self, target: InputTarget, parent: Option<InputTarget>);

    /// Removes `target`. Unknown targets are ignored.
    fn remove_element(&mut self, target: InputTarget);
}

impl<C: InputContext + ?Sized> InputContext for Rc<RefCell<C>> {
    fn add_element(&mut self, target: InputTarget, parent: Option<InputTarget>) {
        self.borrow_mut().add_element(target, parent);
    }

    fn remove_element(&mut self, target: InputTarget) {
        self.borrow_mut().remove_element(target);
    }
}

/// An [`InputContext`] that ignores every registration.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullInput;

impl InputContext for NullInput {
    fn add_element(&mut self, _target: InputTarget, _parent: Option<InputTarget>) {}

    fn remove_element(&mut self, _target: InputTarget) {}
}

/// A mouse button.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Primary button.
    Left,
    /// Secondary button.
    Right,
    /// Wheel button.
    Middle,
}

/// Whether a button went down or up.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MouseAction {
    /// The button was pressed.
    Press,
    /// The button was released.
    Release,
}

/// A button press or release.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MouseClickEvent {
    /// Which button.
    pub button: MouseButton,
    /// Press or release.
    pub action: MouseAction,
    /// Cursor position in panel coordinates.
    pub position: Point,
}

impl MouseClickEvent {
    /// A left-button press at `position`.
    #[must_use]
    pub fn left_press(position: impl Into<Point>) -> Self {
        Self {
            button: MouseButton::Left,
            action: MouseAction::Press,
            position: position.into(),
        }
    }

    /// Returns whether this is a left-button press.
    #[must_use]
    pub fn is_left_press(&self) -> bool {
        self.button == MouseButton::Left && self.action == MouseAction::Press
    }
}

/// The cursor moved.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MouseMoveEvent {
    /// Cursor position in panel coordinates.
    pub position: Point,
}

/// The wheel was turned.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MouseScrollEvent {
    /// Cursor position in panel coordinates.
    pub position: Point,
    /// Notches turned; positive values scroll towards later items.
    pub delta: i32,
}

/// The outcome of delivering one event.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InputResult {
    /// The element consumed the event.
    pub claim: bool,
}

impl InputResult {
    /// The event was consumed.
    pub const CLAIMED: Self = Self { claim: true };

    /// The event should bubble to the parent.
    pub const IGNORED: Self = Self { claim: false };

    /// Claims the event if `claim` is true.
    #[must_use]
    pub const fn claim_if(claim: bool) -> Self {
        Self { claim }
    }
}
