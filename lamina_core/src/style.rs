// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Typed stylesheets.
//!
//! A [`Stylesheet`] maps dotted property names such as `"checkbox.box.width"`
//! to [`StyleValue`]s. Widgets look properties up through
//! [`WidgetBase::style`](crate::widget::WidgetBase::style), which consults the
//! widget's own stylesheet first and the panel's second. A missing property,
//! or one stored with an incompatible type, reads as `None` and the widget
//! applies its hard default.

use alloc::collections::BTreeMap;
use alloc::string::String;

use lamina_layout::{Length, Margin, Size};
use lamina_scene::mesh::Rgba;
use lamina_scene::node::MaterialId;

/// A single stylesheet property value.
#[derive(Clone, Debug, PartialEq)]
pub enum StyleValue {
    /// A length.
    Length(Length),
    /// A width/height pair.
    Size(Size),
    /// Four margins.
    Margin(Margin),
    /// A non-negative count.
    Count(usize),
    /// A plain number.
    Number(f64),
    /// A color.
    Color(Rgba),
    /// A material handle.
    Material(MaterialId),
    /// A string, e.g. a font name.
    Text(String),
}

impl From<Length> for StyleValue {
    fn from(value: Length) -> Self {
        Self::Length(value)
    }
}

impl From<Size> for StyleValue {
    fn from(value: Size) -> Self {
        Self::Size(value)
    }
}

impl From<Margin> for StyleValue {
    fn from(value: Margin) -> Self {
        Self::Margin(value)
    }
}

impl From<usize> for StyleValue {
    fn from(value: usize) -> Self {
        Self::Count(value)
    }
}

impl From<f64> for StyleValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<Rgba> for StyleValue {
    fn from(value: Rgba) -> Self {
        Self::Color(value)
    }
}

impl From<MaterialId> for StyleValue {
    fn from(value: MaterialId) -> Self {
        Self::Material(value)
    }
}

impl From<&str> for StyleValue {
    fn from(value: &str) -> Self {
        Self::Text(value.into())
    }
}

impl From<String> for StyleValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Types that can be read out of a [`StyleValue`].
pub trait FromStyleValue: Sized {
    /// Extracts `Self`, or `None` when the value holds another type.
    fn from_style_value(value: &StyleValue) -> Option<Self>;
}

impl FromStyleValue for Length {
    fn from_style_value(value: &StyleValue) -> Option<Self> {
        match value {
            StyleValue::Length(length) => Some(*length),
            _ => None,
        }
    }
}

impl FromStyleValue for Size {
    fn from_style_value(value: &StyleValue) -> Option<Self> {
        match value {
            StyleValue::Size(size) => Some(*size),
            _ => None,
        }
    }
}

impl FromStyleValue for Margin {
    /// A single length is accepted as a uniform margin.
    fn from_style_value(value: &StyleValue) -> Option<Self> {
        match value {
            StyleValue::Margin(margin) => Some(*margin),
            StyleValue::Length(length) => Some(Self::uniform(*length)),
            _ => None,
        }
    }
}

impl FromStyleValue for usize {
    fn from_style_value(value: &StyleValue) -> Option<Self> {
        match value {
            StyleValue::Count(count) => Some(*count),
            _ => None,
        }
    }
}

impl FromStyleValue for f64 {
    fn from_style_value(value: &StyleValue) -> Option<Self> {
        match value {
            StyleValue::Number(number) => Some(*number),
            _ => None,
        }
    }
}

impl FromStyleValue for Rgba {
    fn from_style_value(value: &StyleValue) -> Option<Self> {
        match value {
            StyleValue::Color(color) => Some(*color),
            _ => None,
        }
    }
}

impl FromStyleValue for MaterialId {
    fn from_style_value(value: &StyleValue) -> Option<Self> {
        match value {
            StyleValue::Material(material) => Some(*material),
            _ => None,
        }
    }
}

impl FromStyleValue for String {
    fn from_style_value(value: &StyleValue) -> Option<Self> {
        match value {
            StyleValue::Text(text) => Some(text.clone()),
            _ => None,
        }
    }
}

/// A set of named style properties.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Stylesheet {
    values: BTreeMap<String, StyleValue>,
}

impl Stylesheet {
    /// Creates an empty stylesheet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a property, returning the previous value.
    pub fn set(&mut self, name: &str, value: impl Into<StyleValue>) -> Option<StyleValue> {
        self.values.insert(name.into(), value.into())
    }

    /// Builder form of [`set`](Self::set).
    #[must_use]
    pub fn with(mut self, name: &str, value: impl Into<StyleValue>) -> Self {
        self.set(name, value);
        self
    }

    /// Reads a property as `T`.
    #[must_use]
    pub fn get<T: FromStyleValue>(&self, name: &str) -> Option<T> {
        self.values.get(name).and_then(T::from_style_value)
    }

    /// Returns whether the property is set, regardless of its type.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Removes a property, returning its value.
    pub fn remove(&mut self, name: &str) -> Option<StyleValue> {
        self.values.remove(name)
    }

    /// Returns the number of properties.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns whether no property is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_lookup() {
        let sheet = Stylesheet::new()
            .with("checkbox.box.width", Length::Relative(0.2))
            .with("dropdown.items.max", 5_usize)
            .with("font", "mono");

        assert_eq!(
            sheet.get::<Length>("checkbox.box.width"),
            Some(Length::Relative(0.2))
        );
        assert_eq!(sheet.get::<usize>("dropdown.items.max"), Some(5));
        assert_eq!(sheet.get::<String>("font").as_deref(), Some("mono"));
        assert_eq!(sheet.get::<Length>("missing"), None);
    }

    #[test]
    fn type_mismatch_reads_as_missing() {
        let sheet = Stylesheet::new().with("color", 3.0);
        assert!(sheet.contains("color"));
        assert_eq!(sheet.get::<Rgba>("color"), None);
    }

    #[test]
    fn length_is_a_uniform_margin() {
        let sheet = Stylesheet::new().with("checkbox.label.margin", Length::Absolute(2.0));
        assert_eq!(
            sheet.get::<Margin>("checkbox.label.margin"),
            Some(Margin::uniform(Length::Absolute(2.0)))
        );
    }

    #[test]
    fn set_replaces_and_remove_clears() {
        let mut sheet = Stylesheet::new();
        assert_eq!(sheet.set("material.widget", MaterialId(1)), None);
        assert_eq!(
            sheet.set("material.widget", MaterialId(2)),
            Some(StyleValue::Material(MaterialId(1)))
        );
        assert_eq!(sheet.len(), 1);
        assert!(sheet.remove("material.widget").is_some());
        assert!(sheet.is_empty());
    }
}
