//! Capability traits for wrapped map primitives.
//!
//! Every primitive a controller manages, and every object handlers can be
//! registered against, implements [`MapObject`]. Optional behaviour is exposed
//! through capability queries instead of being inspected at call time:
//!
//! ```rust,ignore
//! fn listen(object: &mut dyn MapObject, handler: EventHandler) {
//!     if let Some(evented) = object.as_evented_mut() {
//!         evented.on("open", handler);
//!     }
//! }
//! ```

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use indexmap::IndexMap;

/// An event emitted by a map primitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapEvent {
    pub name: String,
}

impl MapEvent {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Shared event callback.
///
/// Handlers compare equal only when they are clones of the same handler, which
/// is what lets [`Evented::off`] remove exactly the callback that was registered.
#[derive(Clone)]
pub struct EventHandler(Rc<dyn Fn(&MapEvent)>);

impl EventHandler {
    pub fn new(f: impl Fn(&MapEvent) + 'static) -> Self {
        Self(Rc::new(f))
    }

    pub fn call(&self, event: &MapEvent) {
        (self.0)(event)
    }
}

impl PartialEq for EventHandler {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::addr_eq(Rc::as_ptr(&self.0), Rc::as_ptr(&other.0))
    }
}

impl Eq for EventHandler {}

impl fmt::Debug for EventHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EventHandler")
            .field(&Rc::as_ptr(&self.0).cast::<()>())
            .finish()
    }
}

/// Base trait for wrapped primitives and event targets.
pub trait MapObject: 'static {
    /// Name used in logs.
    fn debug_name(&self) -> &str {
        "MapObject"
    }

    /// Query if this object accepts event handlers.
    fn as_evented(&self) -> Option<&dyn Evented> {
        None
    }

    /// Query if this object accepts event handlers (mutable).
    fn as_evented_mut(&mut self) -> Option<&mut dyn Evented> {
        None
    }

    /// Query if this object renders markup content.
    fn as_renderable(&self) -> Option<&dyn Renderable> {
        None
    }

    /// Query if this object renders markup content (mutable).
    fn as_renderable_mut(&mut self) -> Option<&mut dyn Renderable> {
        None
    }

    /// Told when this object becomes, or stops being, a parent's bound content.
    fn set_content_bound(&mut self, _bound: bool) {}
}

/// Capability: object that handlers can be registered against.
pub trait Evented {
    fn on(&mut self, name: &str, handler: EventHandler);

    /// Remove a previously registered handler. Returns `false` if it was not registered.
    fn off(&mut self, name: &str, handler: &EventHandler) -> bool;

    fn fire(&self, event: &MapEvent);

    fn listener_count(&self, name: &str) -> usize;
}

/// Capability: object that displays generated markup.
pub trait Renderable {
    fn set_content(&mut self, markup: String);

    fn content(&self) -> &str;

    /// Ask the primitive to re-layout after its content changed.
    fn update(&mut self);
}

/// Shared handle to a type-erased primitive.
pub type InstanceRef = Rc<RefCell<dyn MapObject>>;

/// Non-owning handle to a type-erased primitive.
pub type WeakInstanceRef = Weak<RefCell<dyn MapObject>>;

/// Erase a typed instance handle.
pub fn instance_ref<T: MapObject>(instance: &Rc<RefCell<T>>) -> InstanceRef {
    Rc::clone(instance) as InstanceRef
}

/// Identity comparison of two instance handles.
pub fn same_instance(a: &InstanceRef, b: &InstanceRef) -> bool {
    std::ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b))
}

/// Listener table that primitives embed to implement [`Evented`].
///
/// Handlers for one event name fire in registration order.
#[derive(Debug, Default)]
pub struct EventListeners {
    listeners: IndexMap<String, Vec<EventHandler>>,
}

impl EventListeners {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total handlers across all event names.
    pub fn len(&self) -> usize {
        self.listeners.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl Evented for EventListeners {
    fn on(&mut self, name: &str, handler: EventHandler) {
        self.listeners
            .entry(name.to_string())
            .or_default()
            .push(handler);
    }

    fn off(&mut self, name: &str, handler: &EventHandler) -> bool {
        let Some(handlers) = self.listeners.get_mut(name) else {
            return false;
        };
        let Some(pos) = handlers.iter().position(|h| h == handler) else {
            return false;
        };
        handlers.remove(pos);
        if handlers.is_empty() {
            self.listeners.shift_remove(name);
        }
        true
    }

    fn fire(&self, event: &MapEvent) {
        if let Some(handlers) = self.listeners.get(&event.name) {
            for handler in handlers {
                handler.call(event);
            }
        }
    }

    fn listener_count(&self, name: &str) -> usize {
        self.listeners.get(name).map_or(0, Vec::len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_handler_identity() {
        let a = EventHandler::new(|_| {});
        let b = EventHandler::new(|_| {});
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
    }

    #[test]
    fn test_listeners_fire_and_off() {
        let hits = Rc::new(Cell::new(0));
        let counter = Rc::clone(&hits);
        let handler = EventHandler::new(move |_| counter.set(counter.get() + 1));

        let mut listeners = EventListeners::new();
        listeners.on("open", handler.clone());
        listeners.fire(&MapEvent::new("open"));
        listeners.fire(&MapEvent::new("close"));
        assert_eq!(hits.get(), 1);

        assert!(listeners.off("open", &handler));
        assert!(!listeners.off("open", &handler));
        listeners.fire(&MapEvent::new("open"));
        assert_eq!(hits.get(), 1);
        assert!(listeners.is_empty());
    }

    #[test]
    fn test_off_removes_only_matching_handler() {
        let first = EventHandler::new(|_| {});
        let second = EventHandler::new(|_| {});
        let mut listeners = EventListeners::new();
        listeners.on("click", first.clone());
        listeners.on("click", second.clone());

        assert!(listeners.off("click", &first));
        assert_eq!(listeners.listener_count("click"), 1);
        assert_eq!(listeners.len(), 1);
    }

    struct Plain;
    impl MapObject for Plain {}

    #[test]
    fn test_same_instance() {
        let a = instance_ref(&Rc::new(RefCell::new(Plain)));
        let b = instance_ref(&Rc::new(RefCell::new(Plain)));
        assert!(same_instance(&a, &a.clone()));
        assert!(!same_instance(&a, &b));
        assert!(a.borrow().as_evented().is_none());
    }
}
