// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Staleness flags and the invalidation table.
//!
//! Every widget starts fully stale. Mutations never touch [`StaleData`]
//! directly; they report a [`Change`] and [`Change::stale_data`] decides which
//! phases have to run again. Phases clear only their own bit.

bitflags::bitflags! {
    /// Which generation phases are out of date for a widget.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct StaleData: u8 {
        /// Layout blocks must be regenerated.
        const LAYOUT = 1 << 0;
        /// Meshes must be regenerated.
        const GEOMETRY = 1 << 1;
        /// Scenegraph nodes must be updated.
        const SCENEGRAPH = 1 << 2;
        /// Every phase.
        const ALL = Self::LAYOUT.bits() | Self::GEOMETRY.bits() | Self::SCENEGRAPH.bits();
    }
}

bitflags::bitflags! {
    /// What changed about a widget.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Change: u16 {
        /// The label text.
        const LABEL = 1 << 0;
        /// The widget's or its panel's stylesheet.
        const STYLESHEET = 1 << 1;
        /// The anchor element, or the block it resolved to.
        const ANCHOR = 1 << 2;
        /// The input layer, or that layer's existence.
        const LAYER = 1 << 3;
        /// Pointer entered or left the widget.
        const HOVER = 1 << 4;
        /// A bound boolean value, or which source is bound.
        const BOOL_VALUE = 1 << 5;
        /// A bound index value, or which source is bound.
        const INDEX_VALUE = 1 << 6;
        /// Bound list items, or which source is bound.
        const LIST_ITEMS = 1 << 7;
        /// A popup opened or closed.
        const OPENED = 1 << 8;
        /// The highlighted popup entry.
        const HIGHLIGHT = 1 << 9;
        /// The popup scroll position.
        const SCROLL = 1 << 10;
    }
}

const GEOMETRY_AND_SCENEGRAPH: StaleData = StaleData::GEOMETRY.union(StaleData::SCENEGRAPH);

/// The invalidation table.
const TABLE: [(Change, StaleData); 11] = [
    (Change::LABEL, GEOMETRY_AND_SCENEGRAPH),
    (Change::STYLESHEET, StaleData::ALL),
    (Change::ANCHOR, StaleData::ALL),
    (Change::LAYER, StaleData::SCENEGRAPH),
    (Change::HOVER, StaleData::SCENEGRAPH),
    (Change::BOOL_VALUE, StaleData::SCENEGRAPH),
    (Change::INDEX_VALUE, GEOMETRY_AND_SCENEGRAPH),
    (Change::LIST_ITEMS, GEOMETRY_AND_SCENEGRAPH),
    (Change::OPENED, StaleData::SCENEGRAPH),
    (Change::HIGHLIGHT, StaleData::SCENEGRAPH),
    (Change::SCROLL, StaleData::SCENEGRAPH),
];

impl Change {
    /// Returns the phases invalidated by this set of changes.
    #[must_use]
    pub fn stale_data(self) -> StaleData {
        TABLE
            .iter()
            .filter(|(change, _)| self.intersects(*change))
            .fold(StaleData::empty(), |acc, (_, stale)| acc | *stale)
    }
}
