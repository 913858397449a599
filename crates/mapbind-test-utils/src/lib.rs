//! Test utilities for mapbind.
//!
//! Mock parents record every capability call so tests can assert on exactly
//! what a controller asked of its parent:
//!
//! - [`MockLayerGroup`] - plain multi-instance container
//! - [`MockMarker`] - container that also binds singleton content
//! - [`MockLayer`] - evented instance with no content
//! - [`CountingHandler`] - event handler that counts its invocations
//!
//! ```rust
//! use mapbind::Parent;
//! use mapbind_test_utils::{MockLayer, MockMarker, ParentCall};
//!
//! let mut marker = MockMarker::new();
//! let layer = MockLayer::shared();
//! marker.add_instance(layer.clone());
//! assert!(marker.has_instance(&layer));
//! assert_eq!(marker.count(|c| matches!(c, ParentCall::AddInstance)), 1);
//! ```
//!
//! # Interior Mutability
//!
//! `has_instance` takes `&self` but still has to be recorded, so calls live in
//! a `parking_lot::Mutex`.

mod parents;

pub use parents::{MockLayerGroup, MockMarker, ParentCall};

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use mapbind::{EventHandler, EventListeners, Evented, InstanceRef, MapEvent, MapObject};

/// Evented instance without content.
#[derive(Debug, Default)]
pub struct MockLayer {
    listeners: EventListeners,
}

impl MockLayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// A fresh layer behind a type-erased handle.
    pub fn shared() -> InstanceRef {
        Rc::new(RefCell::new(Self::new()))
    }

    pub fn fire(&self, name: &str) {
        self.listeners.fire(&MapEvent::new(name));
    }
}

impl MapObject for MockLayer {
    fn debug_name(&self) -> &str {
        "MockLayer"
    }

    fn as_evented(&self) -> Option<&dyn Evented> {
        Some(&self.listeners)
    }

    fn as_evented_mut(&mut self) -> Option<&mut dyn Evented> {
        Some(&mut self.listeners)
    }
}

/// Event handler that counts how often it ran.
#[derive(Debug, Clone)]
pub struct CountingHandler {
    hits: Rc<Cell<usize>>,
    handler: EventHandler,
}

impl CountingHandler {
    pub fn new() -> Self {
        let hits = Rc::new(Cell::new(0));
        let counter = Rc::clone(&hits);
        let handler = EventHandler::new(move |_| counter.set(counter.get() + 1));
        Self { hits, handler }
    }

    pub fn handler(&self) -> EventHandler {
        self.handler.clone()
    }

    pub fn hits(&self) -> usize {
        self.hits.get()
    }
}

impl Default for CountingHandler {
    fn default() -> Self {
        Self::new()
    }
}

/// Fire `name` on `instance` if it is evented.
pub fn fire(instance: &InstanceRef, name: &str) {
    if let Some(evented) = instance.borrow().as_evented() {
        evented.fire(&MapEvent::new(name));
    }
}

/// Listener count for `name` on `instance`; zero when it is not evented.
pub fn listener_count(instance: &InstanceRef, name: &str) -> usize {
    instance
        .borrow()
        .as_evented()
        .map_or(0, |evented| evented.listener_count(name))
}
