//! Instance lifecycle controller.
//!
//! An [`InstanceController`] is owned by one host element. The host reports
//! attachment, detachment and property changes; the controller decides when
//! the wrapped instance is created, attached, updated or torn down.
//!
//! # States
//!
//! ```text
//! Uncreated ──ensure_attached──▶ Created ──▶ Attached ⇄ Detached
//!                                   │            │          │
//!                                   └────────teardown───────┴──▶ TornDown
//! TornDown ──ensure_attached──▶ Created (a fresh instance)
//! ```
//!
//! `ensure_detached` releases every event binding and detaches the instance
//! but keeps it alive, so moving a host between parents reuses one instance.
//! The state only leaves `Attached` when the behaviour reports that the
//! instance was actually removed from a parent. Only
//! [`teardown`](InstanceController::teardown) drops the instance, and it
//! refuses to while the instance is still attached.

use std::cell::RefCell;
use std::rc::Rc;

use mapbind_core::profiling::profile_function;
use tracing::{debug, trace};

use crate::config::ControllerConfig;
use crate::error::{LifecycleError, Result};
use crate::object::{EventHandler, InstanceRef, MapObject, instance_ref};
use crate::options::OptionsSnapshot;
use crate::parent::Parent;
use crate::registry::EventBindingRegistry;

/// Behaviour a concrete instance kind plugs into the controller.
///
/// The first five methods are required overrides. The controller never calls
/// them out of order: `create_instance` runs at most once per instance, and
/// `update_instance` always receives the snapshot applied by the previous call.
pub trait InstanceBehavior {
    type Instance: MapObject;

    /// Build the wrapped primitive from the initial snapshot.
    fn create_instance(&mut self, options: &OptionsSnapshot) -> Result<Self::Instance>;

    /// Snapshot of the host's current configuration.
    fn instance_options(&self) -> OptionsSnapshot;

    fn attach_to_parent(
        &mut self,
        instance: &Rc<RefCell<Self::Instance>>,
        parent: &mut dyn Parent,
    ) -> Result<()>;

    /// Detach from `parent`, or from wherever the instance is when `parent` is `None`.
    ///
    /// Returns `true` only if the instance was removed from a parent.
    fn detach_from_parent(
        &mut self,
        instance: &Rc<RefCell<Self::Instance>>,
        parent: Option<&mut dyn Parent>,
    ) -> Result<bool>;

    /// Apply the fields that differ between `previous` and `next`.
    fn update_instance(
        &mut self,
        instance: &Rc<RefCell<Self::Instance>>,
        previous: &OptionsSnapshot,
        next: &OptionsSnapshot,
    ) -> Result<()>;

    /// Whether the host has what it needs to create an instance.
    fn can_create(&self) -> bool {
        true
    }

    /// Handlers bound on the instance every time it is attached.
    fn instance_events(&self) -> Vec<(String, EventHandler)> {
        Vec::new()
    }
}

/// Lifecycle state of a controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleState {
    /// No instance has been created yet.
    Uncreated,
    /// An instance exists but has not been attached.
    Created,
    /// The instance is attached to a parent.
    Attached,
    /// The instance exists but was detached.
    Detached,
    /// The instance was dropped; the next attach creates a new one.
    TornDown,
}

impl LifecycleState {
    pub fn has_instance(&self) -> bool {
        matches!(
            self,
            LifecycleState::Created | LifecycleState::Attached | LifecycleState::Detached
        )
    }
}

/// Fire-and-forget notification delivered to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notification {
    InstanceCreated,
    InstanceReady { ready: bool },
}

impl Notification {
    /// Event name the host re-emits this notification under.
    pub fn event_name<'a>(&self, config: &'a ControllerConfig) -> &'a str {
        match self {
            Notification::InstanceCreated => &config.created_event,
            Notification::InstanceReady { .. } => &config.ready_event,
        }
    }
}

type NotificationSink = Box<dyn FnMut(&Notification)>;

/// Drives one wrapped instance on behalf of a host element.
pub struct InstanceController<B: InstanceBehavior> {
    behavior: B,
    config: ControllerConfig,
    instance: Option<Rc<RefCell<B::Instance>>>,
    /// Snapshot the instance was created from.
    initial_options: Option<OptionsSnapshot>,
    /// Snapshot applied by the last successful update.
    last_options: Option<OptionsSnapshot>,
    registry: EventBindingRegistry,
    state: LifecycleState,
    mounted: bool,
    sink: Option<NotificationSink>,
}

impl<B: InstanceBehavior> InstanceController<B> {
    pub fn new(behavior: B) -> Self {
        Self::with_config(behavior, ControllerConfig::default())
    }

    pub fn with_config(behavior: B, config: ControllerConfig) -> Self {
        Self {
            behavior,
            config,
            instance: None,
            initial_options: None,
            last_options: None,
            registry: EventBindingRegistry::new(),
            state: LifecycleState::Uncreated,
            mounted: false,
            sink: None,
        }
    }

    /// Route notifications to `sink`, replacing any previous sink.
    pub fn on_notification(&mut self, sink: impl FnMut(&Notification) + 'static) {
        self.sink = Some(Box::new(sink));
    }

    pub fn behavior(&self) -> &B {
        &self.behavior
    }

    /// Mutable access for host property changes; follow with [`ensure_updated`](Self::ensure_updated).
    pub fn behavior_mut(&mut self) -> &mut B {
        &mut self.behavior
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn instance(&self) -> Option<&Rc<RefCell<B::Instance>>> {
        self.instance.as_ref()
    }

    pub fn instance_ref(&self) -> Option<InstanceRef> {
        self.instance.as_ref().map(instance_ref)
    }

    pub fn bindings(&self) -> &EventBindingRegistry {
        &self.registry
    }

    /// Snapshot the next update will diff against.
    pub fn baseline(&self) -> Option<&OptionsSnapshot> {
        self.last_options.as_ref().or(self.initial_options.as_ref())
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Host reports whether its element is mounted in the document.
    pub fn set_mounted(&mut self, mounted: bool) {
        self.mounted = mounted;
    }

    /// Create the instance if needed and attach it to `parent`.
    ///
    /// With `parent = None` the instance is created but not attached. An
    /// instance that `parent` already holds is left alone. Instance events
    /// are bound only once the instance ends up where it was asked to be, so
    /// a failed attach leaves no handlers behind.
    pub fn ensure_attached(&mut self, parent: Option<&mut dyn Parent>) -> Result<()> {
        profile_function!();
        let instance = self.ensure_instance()?;
        let handle = instance_ref(&instance);

        let Some(parent) = parent else {
            trace!("no parent supplied, skipping attach");
            self.bind_instance_events(&handle);
            return Ok(());
        };

        if parent.has_instance(&handle) {
            trace!(parent = parent.debug_name(), "instance already attached");
            self.state = LifecycleState::Attached;
            self.bind_instance_events(&handle);
            return Ok(());
        }

        if self.state == LifecycleState::Attached {
            return Err(LifecycleError::AlreadyAttached {
                parent: parent.debug_name().to_string(),
            });
        }

        self.behavior.attach_to_parent(&instance, parent)?;
        self.state = LifecycleState::Attached;
        self.bind_instance_events(&handle);
        debug!(
            instance = instance.borrow().debug_name(),
            parent = parent.debug_name(),
            "instance attached"
        );
        Ok(())
    }

    /// Release all event bindings, then detach the instance if one exists.
    ///
    /// If the behaviour removed nothing (no parent given, or a parent that
    /// does not hold the instance) the state is left unchanged.
    pub fn ensure_detached(&mut self, parent: Option<&mut dyn Parent>) -> Result<()> {
        profile_function!();
        self.registry.unbind_all();

        let Some(instance) = self.instance.clone() else {
            return Ok(());
        };

        if self.behavior.detach_from_parent(&instance, parent)? {
            self.state = LifecycleState::Detached;
            debug!(instance = instance.borrow().debug_name(), "instance detached");
        } else {
            trace!(
                instance = instance.borrow().debug_name(),
                state = ?self.state,
                "nothing detached"
            );
        }
        Ok(())
    }

    /// Push the host's current options to the instance.
    ///
    /// Before the instance exists this only emits a ready notification when
    /// the host is mounted and able to create one.
    pub fn ensure_updated(&mut self) -> Result<()> {
        profile_function!();
        let Some(instance) = self.instance.clone() else {
            if self.mounted && self.behavior.can_create() {
                self.notify(Notification::InstanceReady { ready: true });
            }
            return Ok(());
        };

        let next = self.behavior.instance_options();
        let previous = self.baseline().cloned().unwrap_or_default();
        self.behavior.update_instance(&instance, &previous, &next)?;

        // Only advanced once the hook succeeded; a failed update is retried
        // against the same baseline.
        self.last_options = Some(next);
        Ok(())
    }

    /// Detach and drop the instance along with both option baselines.
    ///
    /// Fails with [`LifecycleError::StillAttached`] if the instance is still
    /// attached afterwards; the instance and baselines are then kept so the
    /// host can retry with the parent that holds it.
    pub fn teardown(&mut self, parent: Option<&mut dyn Parent>) -> Result<()> {
        profile_function!();
        self.ensure_detached(parent)?;

        if self.state == LifecycleState::Attached {
            let instance = self
                .instance
                .as_ref()
                .map(|instance| instance.borrow().debug_name().to_string())
                .unwrap_or_default();
            return Err(LifecycleError::StillAttached { instance });
        }

        if let Some(instance) = self.instance.take() {
            debug!(instance = instance.borrow().debug_name(), "instance torn down");
            self.state = LifecycleState::TornDown;
        }
        self.initial_options = None;
        self.last_options = None;
        Ok(())
    }

    /// Register handlers through the registry.
    ///
    /// `target = None` means the current instance; without one nothing is bound.
    pub fn bind_events<I, N>(&mut self, events: I, target: Option<&InstanceRef>) -> usize
    where
        I: IntoIterator<Item = (N, EventHandler)>,
        N: Into<String>,
    {
        match target {
            Some(target) => self.registry.bind(events, target),
            None => match self.instance_ref() {
                Some(instance) => self.registry.bind(events, &instance),
                None => 0,
            },
        }
    }

    fn bind_instance_events(&mut self, handle: &InstanceRef) {
        if !self.registry.is_empty() {
            return;
        }
        let events = self.behavior.instance_events();
        if !events.is_empty() {
            self.registry.bind(events, handle);
        }
    }

    fn ensure_instance(&mut self) -> Result<Rc<RefCell<B::Instance>>> {
        if let Some(instance) = &self.instance {
            return Ok(Rc::clone(instance));
        }

        let options = self.behavior.instance_options();
        let instance = Rc::new(RefCell::new(self.behavior.create_instance(&options)?));
        self.initial_options = Some(options);
        self.last_options = None;
        self.instance = Some(Rc::clone(&instance));
        self.state = LifecycleState::Created;

        debug!(instance = instance.borrow().debug_name(), "instance created");
        self.notify(Notification::InstanceCreated);
        Ok(instance)
    }

    fn notify(&mut self, notification: Notification) {
        trace!(event = notification.event_name(&self.config), ?notification, "notify host");
        if let Some(sink) = self.sink.as_mut() {
            sink(&notification);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::{EventListeners, Evented};
    use std::cell::Cell;

    #[derive(Default)]
    struct Layer {
        listeners: EventListeners,
        applied: Vec<OptionsSnapshot>,
    }

    impl MapObject for Layer {
        fn debug_name(&self) -> &str {
            "Layer"
        }

        fn as_evented(&self) -> Option<&dyn Evented> {
            Some(&self.listeners)
        }

        fn as_evented_mut(&mut self) -> Option<&mut dyn Evented> {
            Some(&mut self.listeners)
        }
    }

    #[derive(Default)]
    struct Group {
        layers: Vec<InstanceRef>,
    }

    impl Parent for Group {
        fn has_instance(&self, instance: &InstanceRef) -> bool {
            self.layers
                .iter()
                .any(|layer| crate::object::same_instance(layer, instance))
        }

        fn add_instance(&mut self, instance: InstanceRef) {
            self.layers.push(instance);
        }

        fn remove_instance(&mut self, instance: &InstanceRef) {
            self.layers
                .retain(|layer| !crate::object::same_instance(layer, instance));
        }
    }

    #[derive(Default)]
    struct LayerBehavior {
        opacity: f64,
        created: usize,
        ready: bool,
    }

    impl InstanceBehavior for LayerBehavior {
        type Instance = Layer;

        fn create_instance(&mut self, _options: &OptionsSnapshot) -> Result<Layer> {
            self.created += 1;
            Ok(Layer::default())
        }

        fn instance_options(&self) -> OptionsSnapshot {
            OptionsSnapshot::new().with("opacity", self.opacity)
        }

        fn attach_to_parent(
            &mut self,
            instance: &Rc<RefCell<Layer>>,
            parent: &mut dyn Parent,
        ) -> Result<()> {
            parent.add_instance(instance_ref(instance));
            Ok(())
        }

        fn detach_from_parent(
            &mut self,
            instance: &Rc<RefCell<Layer>>,
            parent: Option<&mut dyn Parent>,
        ) -> Result<bool> {
            let handle = instance_ref(instance);
            match parent {
                Some(parent) if parent.has_instance(&handle) => {
                    parent.remove_instance(&handle);
                    Ok(true)
                }
                _ => Ok(false),
            }
        }

        fn update_instance(
            &mut self,
            instance: &Rc<RefCell<Layer>>,
            previous: &OptionsSnapshot,
            next: &OptionsSnapshot,
        ) -> Result<()> {
            instance.borrow_mut().applied.push(previous.diff(next));
            Ok(())
        }

        fn can_create(&self) -> bool {
            self.ready
        }
    }

    #[test]
    fn test_attach_creates_once() {
        let mut group = Group::default();
        let mut controller = InstanceController::new(LayerBehavior::default());
        assert_eq!(controller.state(), LifecycleState::Uncreated);

        controller.ensure_attached(Some(&mut group)).unwrap();
        controller.ensure_attached(Some(&mut group)).unwrap();

        assert_eq!(controller.behavior().created, 1);
        assert_eq!(group.layers.len(), 1);
        assert_eq!(controller.state(), LifecycleState::Attached);
    }

    #[test]
    fn test_attach_without_parent_only_creates() {
        let mut controller = InstanceController::new(LayerBehavior::default());
        controller.ensure_attached(None).unwrap();
        assert_eq!(controller.state(), LifecycleState::Created);
        assert!(controller.instance().is_some());
    }

    #[test]
    fn test_created_notification_fires_once() {
        let created = Rc::new(Cell::new(0));
        let seen = Rc::clone(&created);
        let mut controller = InstanceController::new(LayerBehavior::default());
        controller.on_notification(move |n| {
            if *n == Notification::InstanceCreated {
                seen.set(seen.get() + 1);
            }
        });

        controller.ensure_attached(None).unwrap();
        controller.ensure_attached(None).unwrap();
        assert_eq!(created.get(), 1);
    }

    #[test]
    fn test_update_before_creation_emits_ready() {
        let ready = Rc::new(Cell::new(None));
        let seen = Rc::clone(&ready);
        let behavior = LayerBehavior {
            ready: true,
            ..Default::default()
        };
        let mut controller = InstanceController::new(behavior);
        controller.on_notification(move |n| {
            if let Notification::InstanceReady { ready } = n {
                seen.set(Some(*ready));
            }
        });

        controller.ensure_updated().unwrap();
        assert_eq!(ready.get(), None, "not mounted yet");

        controller.set_mounted(true);
        controller.ensure_updated().unwrap();
        assert_eq!(ready.get(), Some(true));
        assert!(controller.instance().is_none());
    }

    #[test]
    fn test_update_diffs_pairwise() {
        let mut controller = InstanceController::new(LayerBehavior::default());
        controller.ensure_attached(None).unwrap();

        controller.behavior_mut().opacity = 0.5;
        controller.ensure_updated().unwrap();
        controller.behavior_mut().opacity = 0.8;
        controller.ensure_updated().unwrap();
        controller.ensure_updated().unwrap();

        let instance = controller.instance().unwrap().borrow();
        assert_eq!(instance.applied.len(), 3);
        assert_eq!(
            instance.applied[0].get("opacity").and_then(|v| v.as_number()),
            Some(0.5)
        );
        assert_eq!(
            instance.applied[1].get("opacity").and_then(|v| v.as_number()),
            Some(0.8)
        );
        assert!(instance.applied[2].is_empty());
    }

    #[test]
    fn test_detach_drains_bindings_and_keeps_instance() {
        let mut group = Group::default();
        let mut controller = InstanceController::new(LayerBehavior::default());
        controller.ensure_attached(Some(&mut group)).unwrap();
        controller.bind_events([("click", EventHandler::new(|_| {}))], None);
        assert_eq!(controller.bindings().len(), 1);

        controller.ensure_detached(Some(&mut group)).unwrap();
        assert!(controller.bindings().is_empty());
        assert!(group.layers.is_empty());
        assert_eq!(controller.state(), LifecycleState::Detached);
        assert!(controller.instance().is_some());
    }

    #[test]
    fn test_attach_to_second_parent_requires_detach() {
        let mut first = Group::default();
        let mut second = Group::default();
        let mut controller = InstanceController::new(LayerBehavior::default());
        controller.ensure_attached(Some(&mut first)).unwrap();

        let err = controller.ensure_attached(Some(&mut second)).unwrap_err();
        assert!(matches!(err, LifecycleError::AlreadyAttached { .. }));
        assert!(second.layers.is_empty());

        controller.ensure_detached(Some(&mut first)).unwrap();
        controller.ensure_attached(Some(&mut second)).unwrap();
        assert_eq!(second.layers.len(), 1);
        assert!(first.layers.is_empty());
    }

    #[test]
    fn test_teardown_then_attach_recreates() {
        let mut group = Group::default();
        let mut controller = InstanceController::new(LayerBehavior::default());
        controller.ensure_attached(Some(&mut group)).unwrap();
        controller.teardown(Some(&mut group)).unwrap();

        assert_eq!(controller.state(), LifecycleState::TornDown);
        assert!(controller.instance().is_none());
        assert!(controller.baseline().is_none());

        controller.ensure_attached(Some(&mut group)).unwrap();
        assert_eq!(controller.behavior().created, 2);
        assert_eq!(group.layers.len(), 1);
    }

    #[test]
    fn test_detach_without_parent_keeps_attached_state() {
        let mut first = Group::default();
        let mut second = Group::default();
        let mut controller = InstanceController::new(LayerBehavior::default());
        controller.ensure_attached(Some(&mut first)).unwrap();

        controller.ensure_detached(None).unwrap();
        assert_eq!(controller.state(), LifecycleState::Attached);

        let err = controller.ensure_attached(Some(&mut second)).unwrap_err();
        assert!(matches!(err, LifecycleError::AlreadyAttached { .. }));
        assert_eq!(first.layers.len(), 1);
        assert!(second.layers.is_empty());
    }

    #[test]
    fn test_detach_from_wrong_parent_keeps_attached_state() {
        let mut first = Group::default();
        let mut second = Group::default();
        let mut controller = InstanceController::new(LayerBehavior::default());
        controller.ensure_attached(Some(&mut first)).unwrap();

        controller.ensure_detached(Some(&mut second)).unwrap();
        assert_eq!(controller.state(), LifecycleState::Attached);

        assert!(controller.ensure_attached(Some(&mut second)).is_err());
        assert_eq!(first.layers.len(), 1);
        assert!(second.layers.is_empty());
    }

    #[test]
    fn test_teardown_without_parent_refuses_while_attached() {
        let mut group = Group::default();
        let mut controller = InstanceController::new(LayerBehavior::default());
        controller.ensure_attached(Some(&mut group)).unwrap();

        let err = controller.teardown(None).unwrap_err();
        assert!(matches!(err, LifecycleError::StillAttached { .. }));
        assert_eq!(controller.state(), LifecycleState::Attached);
        assert!(controller.instance().is_some());
        assert!(controller.baseline().is_some());

        controller.ensure_attached(Some(&mut group)).unwrap();
        assert_eq!(controller.behavior().created, 1);
        assert_eq!(group.layers.len(), 1);

        controller.teardown(Some(&mut group)).unwrap();
        assert!(group.layers.is_empty());
        assert_eq!(controller.state(), LifecycleState::TornDown);
    }

    #[test]
    fn test_teardown_of_unattached_instance_needs_no_parent() {
        let mut controller = InstanceController::new(LayerBehavior::default());
        controller.ensure_attached(None).unwrap();
        controller.teardown(None).unwrap();
        assert_eq!(controller.state(), LifecycleState::TornDown);
        assert!(controller.instance().is_none());
    }
}
