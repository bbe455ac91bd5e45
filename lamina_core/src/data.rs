// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shared data sources and the listener protocol.
//!
//! A data source is an external value shared through [`Rc`] between the
//! application and any number of widgets. Sources keep *weak* references to
//! their [`DataListener`]s and call
//! [`on_data_source_update`](DataListener::on_data_source_update)
//! synchronously whenever their value actually changes. A listener is never
//! kept alive by a source.
//!
//! Three kinds of value are provided, each as a trait plus a ready-made
//! implementation:
//!
//! | Trait | Implementation | Value |
//! |---|---|---|
//! | [`BoolDataSource`] | [`BoolValue`] | `bool` |
//! | [`IntegralValueDataSource`] | [`IntegralValue`] | `i64` |
//! | [`ListDataSource`] | [`ListValue`] | list of strings |
//!
//! Custom sources embed a [`Listeners`] registry and a [`SourceId`].

use alloc::rc::{Rc, Weak};
use alloc::string::String;
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};
use core::fmt;
use core::sync::atomic::{AtomicU32, Ordering};

static NEXT_SOURCE: AtomicU32 = AtomicU32::new(1);

/// Identity of a data source.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SourceId(u32);

impl SourceId {
    /// Allocates a process-unique id.
    #[must_use]
    pub fn next() -> Self {
        Self(NEXT_SOURCE.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Debug for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SourceId({})", self.0)
    }
}

/// Receives change notifications from data sources.
pub trait DataListener {
    /// Called after the value of `source` changed.
    fn on_data_source_update(&self, source: SourceId);
}

/// A registry of weakly held listeners.
///
/// Adding the same listener twice keeps a single registration. Listeners that
/// were dropped without deregistering are pruned on the next mutation.
#[derive(Default)]
pub struct Listeners {
    entries: RefCell<Vec<Weak<dyn DataListener>>>,
}

impl fmt::Debug for Listeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners")
            .field("len", &self.len())
            .finish()
    }
}

impl Listeners {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `listener`.
    pub fn add(&self, listener: &Rc<dyn DataListener>) {
        let mut entries = self.entries.borrow_mut();
        entries.retain(|w| w.strong_count() > 0);
        if !entries.iter().any(|w| same_listener(w, listener)) {
            entries.push(Rc::downgrade(listener));
        }
    }

    /// Deregisters `listener`. Unknown listeners are ignored.
    pub fn remove(&self, listener: &Rc<dyn DataListener>) {
        self.entries
            .borrow_mut()
            .retain(|w| w.strong_count() > 0 && !same_listener(w, listener));
    }

    /// Returns the number of live registrations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .borrow()
            .iter()
            .filter(|w| w.strong_count() > 0)
            .count()
    }

    /// Returns whether no live listener is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Notifies every live listener that `source` changed.
    ///
    /// Listeners may add or remove registrations while being notified; such
    /// changes take effect from the next notification.
    pub fn notify(&self, source: SourceId) {
        let live: Vec<Rc<dyn DataListener>> = self
            .entries
            .borrow()
            .iter()
            .filter_map(Weak::upgrade)
            .collect();
        for listener in live {
            listener.on_data_source_update(source);
        }
    }
}

fn same_listener(weak: &Weak<dyn DataListener>, listener: &Rc<dyn DataListener>) -> bool {
    core::ptr::addr_eq(weak.as_ptr(), Rc::as_ptr(listener))
}

// ---------------------------------------------------------------------------
// Source traits
// ---------------------------------------------------------------------------

/// The listener side shared by every data source.
pub trait DataSource {
    /// Returns this source's identity.
    fn source_id(&self) -> SourceId;

    /// Registers `listener` for change notifications.
    fn add_data_listener(&self, listener: &Rc<dyn DataListener>);

    /// Deregisters `listener`.
    fn remove_data_listener(&self, listener: &Rc<dyn DataListener>);

    /// Returns the number of registered listeners.
    fn listener_count(&self) -> usize;
}

/// A shared boolean.
pub trait BoolDataSource: DataSource {
    /// Returns the current value.
    fn get(&self) -> bool;

    /// Sets the value, notifying listeners if it changed.
    fn set(&self, value: bool);
}

/// A shared integer, typically an index into a list.
pub trait IntegralValueDataSource: DataSource {
    /// Returns the current value.
    fn get(&self) -> i64;

    /// Sets the value, notifying listeners if it changed.
    fn set(&self, value: i64);
}

/// A shared, read-only view of a list of strings.
pub trait ListDataSource: DataSource {
    /// Returns the number of items.
    fn len(&self) -> usize;

    /// Returns whether the list is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the item at `index`, if it exists.
    fn get_string(&self, index: usize) -> Option<String>;
}

/// Converts a shared source into the common [`DataSource`] view.
///
/// Implemented for the trait objects widgets store, so bindings of any kind
/// can be tracked together.
pub trait IntoDataSource: DataSource {
    /// Upcasts the shared handle.
    fn into_data_source(self: Rc<Self>) -> Rc<dyn DataSource>;
}

impl IntoDataSource for dyn BoolDataSource {
    fn into_data_source(self: Rc<Self>) -> Rc<dyn DataSource> {
        self
    }
}

impl IntoDataSource for dyn IntegralValueDataSource {
    fn into_data_source(self: Rc<Self>) -> Rc<dyn DataSource> {
        self
    }
}

impl IntoDataSource for dyn ListDataSource {
    fn into_data_source(self: Rc<Self>) -> Rc<dyn DataSource> {
        self
    }
}

impl fmt::Debug for dyn BoolDataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoolDataSource")
            .field("id", &self.source_id())
            .field("value", &self.get())
            .finish()
    }
}

impl fmt::Debug for dyn IntegralValueDataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntegralValueDataSource")
            .field("id", &self.source_id())
            .field("value", &self.get())
            .finish()
    }
}

impl fmt::Debug for dyn ListDataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListDataSource")
            .field("id", &self.source_id())
            .field("len", &self.len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Implementations
// ---------------------------------------------------------------------------

/// A [`BoolDataSource`] holding its value in a cell.
#[derive(Debug)]
pub struct BoolValue {
    id: SourceId,
    value: Cell<bool>,
    listeners: Listeners,
}

impl BoolValue {
    /// Creates a source with an initial value.
    #[must_use]
    pub fn new(value: bool) -> Self {
        Self {
            id: SourceId::next(),
            value: Cell::new(value),
            listeners: Listeners::new(),
        }
    }
}

impl DataSource for BoolValue {
    fn source_id(&self) -> SourceId {
        self.id
    }

    fn add_data_listener(&self, listener: &Rc<dyn DataListener>) {
        self.listeners.add(listener);
    }

    fn remove_data_listener(&self, listener: &Rc<dyn DataListener>) {
        self.listeners.remove(listener);
    }

    fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl BoolDataSource for BoolValue {
    fn get(&self) -> bool {
        self.value.get()
    }

    fn set(&self, value: bool) {
        if self.value.replace(value) != value {
            self.listeners.notify(self.id);
        }
    }
}

/// An [`IntegralValueDataSource`] holding its value in a cell.
#[derive(Debug)]
pub struct IntegralValue {
    id: SourceId,
    value: Cell<i64>,
    listeners: Listeners,
}

impl IntegralValue {
    /// Creates a source with an initial value.
    #[must_use]
    pub fn new(value: i64) -> Self {
        Self {
            id: SourceId::next(),
            value: Cell::new(value),
            listeners: Listeners::new(),
        }
    }
}

impl DataSource for IntegralValue {
    fn source_id(&self) -> SourceId {
        self.id
    }

    fn add_data_listener(&self, listener: &Rc<dyn DataListener>) {
        self.listeners.add(listener);
    }

    fn remove_data_listener(&self, listener: &Rc<dyn DataListener>) {
        self.listeners.remove(listener);
    }

    fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl IntegralValueDataSource for IntegralValue {
    fn get(&self) -> i64 {
        self.value.get()
    }

    fn set(&self, value: i64) {
        if self.value.replace(value) != value {
            self.listeners.notify(self.id);
        }
    }
}

/// A [`ListDataSource`] backed by a vector the application can replace.
#[derive(Debug)]
pub struct ListValue {
    id: SourceId,
    items: RefCell<Vec<String>>,
    listeners: Listeners,
}

impl ListValue {
    /// Creates a source with initial items.
    #[must_use]
    pub fn new<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: SourceId::next(),
            items: RefCell::new(items.into_iter().map(Into::into).collect()),
            listeners: Listeners::new(),
        }
    }

    /// Replaces all items, notifying listeners if anything changed.
    pub fn set_items<I, S>(&self, items: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let items: Vec<String> = items.into_iter().map(Into::into).collect();
        let changed = *self.items.borrow() != items;
        if changed {
            *self.items.borrow_mut() = items;
            self.listeners.notify(self.id);
        }
    }

    /// Appends an item and notifies listeners.
    pub fn push(&self, item: impl Into<String>) {
        self.items.borrow_mut().push(item.into());
        self.listeners.notify(self.id);
    }

    /// Returns a copy of the items.
    #[must_use]
    pub fn items(&self) -> Vec<String> {
        self.items.borrow().clone()
    }
}

impl DataSource for ListValue {
    fn source_id(&self) -> SourceId {
        self.id
    }

    fn add_data_listener(&self, listener: &Rc<dyn DataListener>) {
        self.listeners.add(listener);
    }

    fn remove_data_listener(&self, listener: &Rc<dyn DataListener>) {
        self.listeners.remove(listener);
    }

    fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl ListDataSource for ListValue {
    fn len(&self) -> usize {
        self.items.borrow().len()
    }

    fn get_string(&self, index: usize) -> Option<String> {
        self.items.borrow().get(index).cloned()
    }
}
