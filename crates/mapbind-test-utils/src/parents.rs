//! Call-recording mock parents.

use mapbind::{ContentHost, ContentSlot, InstanceRef, Parent, same_instance};
use parking_lot::Mutex;

/// Records a parent capability call for verification in tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParentCall {
    HasInstance,
    AddInstance,
    RemoveInstance,
    BoundContent,
    BindContent,
    UnbindContent,
}

#[derive(Default)]
struct CallLog(Mutex<Vec<ParentCall>>);

impl CallLog {
    fn record(&self, call: ParentCall) {
        self.0.lock().push(call);
    }

    fn snapshot(&self) -> Vec<ParentCall> {
        self.0.lock().clone()
    }

    fn clear(&self) {
        self.0.lock().clear();
    }
}

/// Multi-instance container.
#[derive(Default)]
pub struct MockLayerGroup {
    layers: Vec<InstanceRef>,
    calls: CallLog,
}

impl MockLayerGroup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn calls(&self) -> Vec<ParentCall> {
        self.calls.snapshot()
    }

    pub fn count(&self, filter: impl Fn(&ParentCall) -> bool) -> usize {
        self.calls.snapshot().iter().filter(|c| filter(*c)).count()
    }

    pub fn clear_calls(&self) {
        self.calls.clear();
    }
}

impl Parent for MockLayerGroup {
    fn debug_name(&self) -> &str {
        "MockLayerGroup"
    }

    fn has_instance(&self, instance: &InstanceRef) -> bool {
        self.calls.record(ParentCall::HasInstance);
        self.layers.iter().any(|layer| same_instance(layer, instance))
    }

    fn add_instance(&mut self, instance: InstanceRef) {
        self.calls.record(ParentCall::AddInstance);
        if !self.layers.iter().any(|layer| same_instance(layer, &instance)) {
            self.layers.push(instance);
        }
    }

    fn remove_instance(&mut self, instance: &InstanceRef) {
        self.calls.record(ParentCall::RemoveInstance);
        self.layers.retain(|layer| !same_instance(layer, instance));
    }
}

/// Marker: holds child layers and binds at most one content item.
///
/// `has_instance` is true for both child layers and the bound content.
#[derive(Default)]
pub struct MockMarker {
    layers: Vec<InstanceRef>,
    content: ContentSlot,
    calls: CallLog,
}

impl MockMarker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn content(&self) -> Option<InstanceRef> {
        self.content.get()
    }

    pub fn calls(&self) -> Vec<ParentCall> {
        self.calls.snapshot()
    }

    pub fn count(&self, filter: impl Fn(&ParentCall) -> bool) -> usize {
        self.calls.snapshot().iter().filter(|c| filter(*c)).count()
    }

    pub fn binds(&self) -> usize {
        self.count(|c| *c == ParentCall::BindContent)
    }

    pub fn unbinds(&self) -> usize {
        self.count(|c| *c == ParentCall::UnbindContent)
    }

    pub fn clear_calls(&self) {
        self.calls.clear();
    }
}

impl Parent for MockMarker {
    fn debug_name(&self) -> &str {
        "MockMarker"
    }

    fn has_instance(&self, instance: &InstanceRef) -> bool {
        self.calls.record(ParentCall::HasInstance);
        self.layers.iter().any(|layer| same_instance(layer, instance))
            || self
                .content
                .get()
                .is_some_and(|bound| same_instance(&bound, instance))
    }

    fn add_instance(&mut self, instance: InstanceRef) {
        self.calls.record(ParentCall::AddInstance);
        self.layers.push(instance);
    }

    fn remove_instance(&mut self, instance: &InstanceRef) {
        self.calls.record(ParentCall::RemoveInstance);
        self.layers.retain(|layer| !same_instance(layer, instance));
    }

    fn as_content_host(&self) -> Option<&dyn ContentHost> {
        Some(self)
    }

    fn as_content_host_mut(&mut self) -> Option<&mut dyn ContentHost> {
        Some(self)
    }
}

impl ContentHost for MockMarker {
    fn bound_content(&self) -> Option<InstanceRef> {
        self.calls.record(ParentCall::BoundContent);
        self.content.get()
    }

    fn bind_content(&mut self, content: InstanceRef) {
        self.calls.record(ParentCall::BindContent);
        self.content.bind(content);
    }

    fn unbind_content(&mut self, content: &InstanceRef) {
        self.calls.record(ParentCall::UnbindContent);
        self.content.unbind(content);
    }
}
