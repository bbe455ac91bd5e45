// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Font name resolution for text meshes.

use alloc::collections::BTreeMap;
use alloc::string::String;
use core::fmt;

/// An opaque handle to a font known to the renderer.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FontId(pub u32);

impl fmt::Debug for FontId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FontId({})", self.0)
    }
}

/// Maps font names to [`FontId`]s.
///
/// The first registered font is the default until
/// [`set_default`](Self::set_default) says otherwise.
#[derive(Debug, Default)]
pub struct FontMap {
    fonts: BTreeMap<String, FontId>,
    default: Option<FontId>,
    next: u32,
}

impl FontMap {
    /// Creates an empty font map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a font name, returning its id.
    ///
    /// Registering a name twice returns the existing id.
    pub fn register(&mut self, name: &str) -> FontId {
        if let Some(&id) = self.fonts.get(name) {
            return id;
        }
        let id = FontId(self.next);
        self.next += 1;
        self.fonts.insert(name.into(), id);
        self.default.get_or_insert(id);
        id
    }

    /// Makes `font` the default.
    pub fn set_default(&mut self, font: FontId) {
        self.default = Some(font);
    }

    /// Returns the id registered under `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<FontId> {
        self.fonts.get(name).copied()
    }

    /// Returns the default font.
    #[must_use]
    pub fn default_font(&self) -> Option<FontId> {
        self.default
    }

    /// Resolves an optional font name, falling back to the default font.
    #[must_use]
    pub fn resolve(&self, name: Option<&str>) -> Option<FontId> {
        name.and_then(|n| self.get(n)).or(self.default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_registration_becomes_default() {
        let mut fonts = FontMap::new();
        let sans = fonts.register("sans");
        let mono = fonts.register("mono");
        assert_eq!(fonts.register("sans"), sans);
        assert_eq!(fonts.default_font(), Some(sans));
        assert_eq!(fonts.resolve(Some("mono")), Some(mono));
        assert_eq!(fonts.resolve(Some("serif")), Some(sans));
        assert_eq!(fonts.resolve(None), Some(sans));
    }

    #[test]
    fn empty_map_resolves_to_none() {
        assert_eq!(FontMap::new().resolve(Some("sans")), None);
    }
}
