//! Parent container capabilities.
//!
//! A [`Parent`] holds instances attached by controllers. Controllers never own
//! a parent; they borrow it for the duration of one attach or detach call.
//! Parents that carry a single bound content item (a marker and its popup)
//! additionally expose [`ContentHost`].

use tracing::warn;

use crate::object::{InstanceRef, same_instance};

/// Container capable of holding instances.
pub trait Parent {
    /// Name used in logs and errors.
    fn debug_name(&self) -> &str {
        "Parent"
    }

    fn has_instance(&self, instance: &InstanceRef) -> bool;

    fn add_instance(&mut self, instance: InstanceRef);

    fn remove_instance(&mut self, instance: &InstanceRef);

    /// Query if this parent binds singleton content.
    fn as_content_host(&self) -> Option<&dyn ContentHost> {
        None
    }

    /// Query if this parent binds singleton content (mutable).
    fn as_content_host_mut(&mut self) -> Option<&mut dyn ContentHost> {
        None
    }
}

/// Capability: parent holding at most one bound content item.
pub trait ContentHost {
    fn bound_content(&self) -> Option<InstanceRef>;

    /// Bind `content`, replacing whatever was bound before.
    ///
    /// Displaced content must be told through
    /// [`MapObject::set_content_bound`](crate::MapObject::set_content_bound);
    /// [`ContentSlot::bind`] does this.
    fn bind_content(&mut self, content: InstanceRef);

    fn unbind_content(&mut self, content: &InstanceRef);

    fn is_bound(&self, content: &InstanceRef) -> bool {
        self.bound_content()
            .is_some_and(|bound| same_instance(&bound, content))
    }
}

/// Singleton content storage for [`ContentHost`] implementations.
#[derive(Default)]
pub struct ContentSlot {
    content: Option<InstanceRef>,
}

impl ContentSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<InstanceRef> {
        self.content.clone()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_none()
    }

    /// Store `content`, returning the item it replaced.
    ///
    /// Replaced content is notified that it is no longer bound.
    pub fn bind(&mut self, content: InstanceRef) -> Option<InstanceRef> {
        let replaced = self.content.replace(content);
        if let (Some(old), Some(new)) = (&replaced, &self.content) {
            if !same_instance(old, new) {
                match old.try_borrow_mut() {
                    Ok(mut old) => old.set_content_bound(false),
                    Err(_) => warn!("displaced content is borrowed, not notified"),
                }
            }
        }
        replaced
    }

    /// Clear the slot if it currently holds `content`.
    pub fn unbind(&mut self, content: &InstanceRef) -> bool {
        match &self.content {
            Some(bound) if same_instance(bound, content) => {
                self.content = None;
                true
            }
            _ => false,
        }
    }
}

impl std::fmt::Debug for ContentSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentSlot")
            .field("bound", &self.content.as_ref().map(|c| c.borrow().debug_name().to_string()))
            .finish()
    }
}
