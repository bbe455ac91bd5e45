// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Declarative box layout for Lamina panels and widgets.
//!
//! A [`Layout`] is a small tree of elements. Each element has a [`Size`] and a
//! [`Margin`] expressed in [`Length`]s, which are either absolute or relative
//! to the parent's extent. Flow elements place their children one after the
//! other along their axis:
//!
//! ```text
//!   HorizontalFlow                 VerticalFlow
//!   ┌────┬──────────────┐          ┌───────────────┐
//!   │ a  │      b       │          │       a       │
//!   └────┴──────────────┘          ├───────────────┤
//!                                  │       b       │
//!                                  └───────────────┘
//! ```
//!
//! [`Layout::generate`] resolves the tree against the layout's target size and
//! offset and returns one [`Block`] per element, in depth-first pre-order.
//! This is deliberately not a constraint solver: lengths never shrink to fit
//! and overflowing children simply extend past their parent.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

mod id;
mod layout;
mod length;

pub use id::{ElementId, LayoutId};
pub use layout::{Block, Children, ElementKind, Layout, bounds_of};
pub use length::{Length, Margin, Size};
