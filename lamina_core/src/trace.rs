// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for the generation pipeline.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that
//! [`Panel::generate`](crate::Panel::generate) calls at each step. All method
//! bodies default to no-ops, so implementing only the events you care about is
//! fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace` feature
//! is **off**, every `Tracer` method compiles to nothing. When **on**, each
//! method performs a single `Option` branch before dispatching.
//!
//! A *pass* is one `Panel::generate` call. Pass numbers are per panel and
//! start at zero.

use crate::panel::PanelId;
use crate::stale::StaleData;
use crate::widget::{WidgetId, WidgetKind};

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Which step of a pass is being measured.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PhaseKind {
    /// Solving the panel layout.
    PanelLayout,
    /// Solving widget layouts.
    WidgetLayout,
    /// Building meshes.
    Geometry,
    /// Building and updating scenegraph nodes.
    Scenegraph,
}

impl PhaseKind {
    /// Every phase, in pipeline order.
    pub const ALL: [Self; 4] = [
        Self::PanelLayout,
        Self::WidgetLayout,
        Self::Geometry,
        Self::Scenegraph,
    ];

    /// Returns a short lowercase name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::PanelLayout => "panel_layout",
            Self::WidgetLayout => "widget_layout",
            Self::Geometry => "geometry",
            Self::Scenegraph => "scenegraph",
        }
    }
}

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted when a pass starts.
#[derive(Clone, Copy, Debug)]
pub struct PassBeginEvent {
    /// Pass counter.
    pub pass: u64,
    /// The panel being generated.
    pub panel: PanelId,
    /// Number of widgets in the panel.
    pub widgets: u32,
}

/// Emitted when a pass finished successfully.
#[derive(Clone, Copy, Debug)]
pub struct PassEndEvent {
    /// Pass counter.
    pub pass: u64,
    /// The panel that was generated.
    pub panel: PanelId,
    /// Widgets left with stale bits, typically because they are unanchored.
    pub stale_widgets: u32,
}

/// Marks the beginning of a phase.
#[derive(Clone, Copy, Debug)]
pub struct PhaseBeginEvent {
    /// Pass counter.
    pub pass: u64,
    /// Which phase is starting.
    pub phase: PhaseKind,
}

/// Marks the end of a phase.
#[derive(Clone, Copy, Debug)]
pub struct PhaseEndEvent {
    /// Pass counter.
    pub pass: u64,
    /// Which phase is ending.
    pub phase: PhaseKind,
    /// Number of widgets the phase regenerated.
    pub generated: u32,
}

/// Emitted after one widget finished a phase.
#[derive(Clone, Copy, Debug)]
pub struct WidgetGeneratedEvent {
    /// Pass counter.
    pub pass: u64,
    /// Which phase ran.
    pub phase: PhaseKind,
    /// The widget.
    pub widget: WidgetId,
    /// What kind of widget it is.
    pub kind: WidgetKind,
    /// Stale bits left after the phase.
    pub remaining: StaleData,
}

/// Emitted when handles of destroyed widgets were handed back to the managers.
#[derive(Clone, Copy, Debug)]
pub struct ReleaseEvent {
    /// Pass counter.
    pub pass: u64,
    /// Meshes destroyed.
    pub meshes: u32,
    /// Widget root nodes destroyed (each with its subtree).
    pub nodes: u32,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from the generation pipeline.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called when a pass starts.
    fn on_pass_begin(&mut self, e: &PassBeginEvent) {
        _ = e;
    }

    /// Called when a pass ends.
    fn on_pass_end(&mut self, e: &PassEndEvent) {
        _ = e;
    }

    /// Called at the beginning of a phase.
    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        _ = e;
    }

    /// Called at the end of a phase.
    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        _ = e;
    }

    /// Called after a widget ran a phase.
    fn on_widget_generated(&mut self, e: &WidgetGeneratedEvent) {
        _ = e;
    }

    /// Called after retired handles were released.
    fn on_release(&mut self, e: &ReleaseEvent) {
        _ = e;
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing. When
/// **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Emits a [`PassBeginEvent`].
    #[inline]
    pub fn pass_begin(&mut self, e: &PassBeginEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_pass_begin(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`PassEndEvent`].
    #[inline]
    pub fn pass_end(&mut self, e: &PassEndEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_pass_end(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`PhaseBeginEvent`].
    #[inline]
    pub fn phase_begin(&mut self, e: &PhaseBeginEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_phase_begin(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`PhaseEndEvent`].
    #[inline]
    pub fn phase_end(&mut self, e: &PhaseEndEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_phase_end(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`WidgetGeneratedEvent`].
    #[inline]
    pub fn widget_generated(&mut self, e: &WidgetGeneratedEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_widget_generated(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`ReleaseEvent`].
    #[inline]
    pub fn release(&mut self, e: &ReleaseEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_release(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
