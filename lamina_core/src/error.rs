// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Errors reported by panels and widgets.

use alloc::string::String;
use core::fmt;

use lamina_layout::ElementId;

use crate::widget::WidgetId;

/// Misuse of the panel or widget API.
///
/// None of these are transient: the call that returned the error had no
/// effect beyond what its documentation states and retrying it unchanged
/// fails again.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// A layer name was empty.
    EmptyLayerName,
    /// A layer with this name already exists in the panel.
    DuplicateLayer(String),
    /// No layer with this name exists in the panel.
    UnknownLayer(String),
    /// The widget belongs to this panel but no longer exists.
    UnknownWidget(WidgetId),
    /// The widget belongs to another panel.
    ForeignWidget(WidgetId),
    /// The element does not belong to the panel's layout.
    ForeignElement(ElementId),
    /// Geometry was requested before layout was ever generated.
    LayoutNotGenerated,
    /// A scenegraph was requested before geometry was ever generated.
    GeometryNotGenerated,
    /// The widget is not a radio button.
    NotARadioButton(WidgetId),
    /// The radio button is itself a member of another button's group.
    NotAMainButton(WidgetId),
    /// The widget exists but is not of the requested type.
    WidgetKindMismatch {
        /// The widget that was looked up.
        widget: WidgetId,
        /// The requested type.
        expected: &'static str,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyLayerName => f.write_str("layer name must not be empty"),
            Self::DuplicateLayer(name) => write!(f, "a layer named {name:?} already exists"),
            Self::UnknownLayer(name) => write!(f, "there is no layer named {name:?}"),
            Self::UnknownWidget(id) => write!(f, "{id:?} does not exist"),
            Self::ForeignWidget(id) => write!(f, "{id:?} is not part of this panel"),
            Self::ForeignElement(id) => {
                write!(f, "{id:?} is not an element of the panel layout")
            }
            Self::LayoutNotGenerated => f.write_str("layout has not been generated"),
            Self::GeometryNotGenerated => f.write_str("geometry has not been generated"),
            Self::NotARadioButton(id) => write!(f, "{id:?} is not a radio button"),
            Self::NotAMainButton(id) => write!(f, "{id:?} is not a main radio button"),
            Self::WidgetKindMismatch { widget, expected } => {
                write!(f, "{widget:?} is not a {expected}")
            }
        }
    }
}

impl core::error::Error for Error {}
