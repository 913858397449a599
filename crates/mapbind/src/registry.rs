//! Event binding registry.
//!
//! Tracks every handler a controller registers so that all of them can be
//! released in one call. Bindings are kept in registration order. Each
//! distinct target gets one slot in a side table of weak handles, indexed by
//! object identity, so the registry never extends a target's lifetime.

use std::rc::Rc;

use mapbind_core::alloc::{HashMap, SideTable, SlotKey};
use mapbind_core::profiling::profile_function;
use tracing::{debug, trace, warn};

use crate::object::{EventHandler, InstanceRef, WeakInstanceRef};

/// Key of a tracked target.
pub type TargetKey = SlotKey;

/// A tracked `(event name, handler)` registration.
#[derive(Debug, Clone)]
pub struct EventBinding {
    target: TargetKey,
    name: String,
    handler: EventHandler,
}

impl EventBinding {
    /// Key of the target this binding was registered on.
    pub fn target(&self) -> TargetKey {
        self.target
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn handler(&self) -> &EventHandler {
        &self.handler
    }
}

/// Address of the shared allocation, stable while any handle to it exists.
fn identity(target: &InstanceRef) -> usize {
    Rc::as_ptr(target).cast::<()>() as usize
}

/// Registry of live handler registrations.
///
/// Dropping the registry releases everything it still tracks.
#[derive(Default)]
pub struct EventBindingRegistry {
    bindings: Vec<EventBinding>,
    targets: SideTable<WeakInstanceRef>,
    // The weak handles in `targets` keep each allocation, and so each
    // address, reserved until the slot is removed.
    by_identity: HashMap<usize, TargetKey>,
}

impl EventBindingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register each `(name, handler)` pair on `target` and track it.
    ///
    /// A target without the evented capability, or one that is currently
    /// borrowed, is skipped without error. Returns the number of bindings
    /// added.
    pub fn bind<I, N>(&mut self, events: I, target: &InstanceRef) -> usize
    where
        I: IntoIterator<Item = (N, EventHandler)>,
        N: Into<String>,
    {
        profile_function!();
        let Ok(mut object) = target.try_borrow_mut() else {
            warn!("binding target is borrowed, nothing bound");
            return 0;
        };
        let debug_name = object.debug_name().to_string();
        let Some(evented) = object.as_evented_mut() else {
            trace!(object = %debug_name, "target is not evented, nothing bound");
            return 0;
        };

        let mut added = 0;
        let mut key = self.by_identity.get(&identity(target)).copied();
        for (name, handler) in events {
            let target_key = *key.get_or_insert_with(|| {
                let key = self.targets.insert(Rc::downgrade(target));
                self.by_identity.insert(identity(target), key);
                key
            });
            let name = name.into();
            evented.on(&name, handler.clone());
            self.bindings.push(EventBinding {
                target: target_key,
                name,
                handler,
            });
            added += 1;
        }

        if added > 0 {
            debug!(object = %debug_name, added, total = self.bindings.len(), "events bound");
        }
        added
    }

    /// Deregister every tracked handler, in registration order.
    ///
    /// Targets that have been dropped or are no longer evented are skipped.
    /// Bindings on a target that is borrowed right now stay tracked so a
    /// later call can release them; otherwise the registry is left empty.
    /// Returns the number of handlers actually removed from a live target.
    pub fn unbind_all(&mut self) -> usize {
        profile_function!();
        if self.bindings.is_empty() {
            return 0;
        }

        let bindings = std::mem::take(&mut self.bindings);
        let tracked = bindings.len();
        let mut released = 0;

        for binding in bindings {
            let Some(target) = self.targets.get(binding.target).and_then(|weak| weak.upgrade())
            else {
                trace!(event = %binding.name, "binding target already dropped");
                continue;
            };
            let Ok(mut object) = target.try_borrow_mut() else {
                warn!(event = %binding.name, "binding target is borrowed, binding kept");
                self.bindings.push(binding);
                continue;
            };
            if let Some(evented) = object.as_evented_mut() {
                if evented.off(&binding.name, &binding.handler) {
                    released += 1;
                }
            }
        }
        self.release_untracked_targets();

        debug!(tracked, released, kept = self.bindings.len(), "events unbound");
        released
    }

    /// Number of tracked bindings.
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Tracked bindings in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &EventBinding> + '_ {
        self.bindings.iter()
    }

    /// Number of distinct targets with tracked bindings.
    pub fn target_count(&self) -> usize {
        self.targets.len()
    }

    /// The target behind `key`, if it is still alive.
    pub fn target_of(&self, key: TargetKey) -> Option<InstanceRef> {
        self.targets.get(key).and_then(|weak| weak.upgrade())
    }

    /// Drop target slots no remaining binding refers to.
    fn release_untracked_targets(&mut self) {
        if self.bindings.is_empty() {
            self.targets.clear();
            self.by_identity.clear();
            return;
        }
        let bindings = &self.bindings;
        let targets = &mut self.targets;
        self.by_identity.retain(|_, key| {
            let keep = bindings.iter().any(|binding| binding.target == *key);
            if !keep {
                targets.remove(*key);
            }
            keep
        });
    }
}

impl Drop for EventBindingRegistry {
    fn drop(&mut self) {
        self.unbind_all();
    }
}

impl std::fmt::Debug for EventBindingRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBindingRegistry")
            .field("bindings", &self.bindings)
            .field("targets", &self.targets.len())
            .finish()
    }
}
