// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Retained-mode widgets with staleness-tracked generation.
//!
//! `lamina_core` sits between a box layout ([`lamina_layout`]) and a
//! scenegraph/mesh renderer ([`lamina_scene`]). Callers build a [`Panel`] of
//! widgets, bind the widgets to shared data sources and, whenever something
//! may have changed, run the generation pipeline:
//!
//! ```text
//!   Panel::generate_panel_layout() ──► panel Blocks
//!                │
//!                ▼
//!   Panel::generate_widget_layouts() ──► Widget::generate_layout()     (LAYOUT)
//!                │
//!                ▼
//!   Panel::generate_geometry() ──► Widget::generate_geometry()         (GEOMETRY)
//!                │                        └─► MeshManager
//!                ▼
//!   Panel::generate_scenegraph() ──► Widget::generate_scenegraph()     (SCENEGRAPH)
//!                                           └─► ScenegraphGenerator
//! ```
//!
//! Each widget carries a [`StaleData`](stale::StaleData) mask. A phase only
//! visits widgets whose bit for that phase is set and clears it on success.
//! Mutations mark bits through one invalidation table,
//! [`Change::stale_data`](stale::Change::stale_data).
//!
//! **[`data`]**: Observer-style data sources and the listener protocol.
//!
//! **[`style`]**: Typed stylesheets with widget → panel fallback.
//!
//! **[`widget`]**: The [`Widget`](widget::Widget) trait, shared widget state
//! and the built-in widgets.
//!
//! **[`panel`]**: [`Panel`], its [`Layer`](layer::Layer)s and input
//! dispatch.
//!
//! **[`input`]**: Input registration and mouse events.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) and the zero-overhead
//! [`Tracer`](trace::Tracer) used to instrument the pipeline.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod data;
pub mod error;
pub mod input;
pub mod layer;
pub mod panel;
pub mod stale;
pub mod style;
pub mod trace;
pub mod widget;

pub use error::Error;
pub use panel::{Panel, PanelId};
