//! Popup content renderers.
//!
//! Two popup kinds plug into [`InstanceController`](crate::InstanceController):
//! [`InfoPopup`] (title, description, thumbnail) and [`DataPopup`] (title plus
//! a label/value table). Both attach by binding themselves as their parent's
//! singleton content, and both apply updates by merging the changed fields
//! into their retained settings and regenerating their markup.

pub mod content;
pub mod data;
pub mod info;

pub use data::{DataPopup, DataPopupBehavior, DataSettings};
pub use info::{InfoPopup, InfoPopupBehavior, InfoSettings};

use std::cell::Cell;
use std::rc::Rc;

use tracing::trace;

use crate::config::PopupConfig;
use crate::error::{LifecycleError, Result};
use crate::object::{EventHandler, EventListeners, Evented, InstanceRef, MapEvent, Renderable};
use crate::options::{DataTable, OptionValue};
use crate::parent::Parent;

/// Option field names used by the popup kinds.
pub mod fields {
    pub const TITLE: &str = "title";
    pub const DESCRIPTION: &str = "description";
    pub const IMAGE_SOURCE: &str = "image_source";
    pub const DATA: &str = "data";
}

/// Fired when a popup opens.
pub const OPEN_EVENT: &str = "open";
/// Fired when a popup closes.
pub const CLOSE_EVENT: &str = "close";

/// State shared by every popup kind: presentation config, current markup,
/// listeners and open state.
#[derive(Debug)]
pub struct PopupCore {
    config: PopupConfig,
    content: String,
    revision: u64,
    open: bool,
    bound: bool,
    listeners: EventListeners,
}

impl PopupCore {
    pub fn new(config: PopupConfig) -> Self {
        Self {
            config,
            content: String::new(),
            revision: 0,
            open: false,
            bound: false,
            listeners: EventListeners::new(),
        }
    }

    pub fn config(&self) -> &PopupConfig {
        &self.config
    }

    /// Number of times the popup was asked to re-layout.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn open(&mut self) {
        if !self.open {
            self.open = true;
            self.listeners.fire(&MapEvent::new(OPEN_EVENT));
        }
    }

    pub fn close(&mut self) {
        if self.open {
            self.open = false;
            self.listeners.fire(&MapEvent::new(CLOSE_EVENT));
        }
    }

    /// Whether a parent currently holds the popup as its content.
    pub fn is_bound(&self) -> bool {
        self.bound
    }

    /// Record a bind or unbind; an unbound popup is closed.
    pub fn set_bound(&mut self, bound: bool) {
        self.bound = bound;
        if !bound {
            self.close();
        }
    }

    pub fn listeners(&self) -> &EventListeners {
        &self.listeners
    }

    pub fn listeners_mut(&mut self) -> &mut EventListeners {
        &mut self.listeners
    }
}

impl Renderable for PopupCore {
    fn set_content(&mut self, markup: String) {
        self.content = markup;
    }

    fn content(&self) -> &str {
        &self.content
    }

    fn update(&mut self) {
        self.revision += 1;
        trace!(revision = self.revision, "popup re-rendered");
    }
}

/// Host-visible `active` flag, driven by the popup's open/close events.
#[derive(Debug, Clone, Default)]
pub struct PopupActivity(Rc<Cell<bool>>);

impl PopupActivity {
    pub fn is_active(&self) -> bool {
        self.0.get()
    }

    fn reset(&self) {
        self.0.set(false);
    }

    /// Handlers that keep the flag in sync with the popup.
    fn handlers(&self) -> Vec<(String, EventHandler)> {
        let on_open = Rc::clone(&self.0);
        let on_close = Rc::clone(&self.0);
        vec![
            (
                OPEN_EVENT.to_string(),
                EventHandler::new(move |_| on_open.set(true)),
            ),
            (
                CLOSE_EVENT.to_string(),
                EventHandler::new(move |_| on_close.set(false)),
            ),
        ]
    }
}

/// Bind `popup` as `parent`'s content unless it is already bound there.
fn bind_popup(popup: InstanceRef, parent: &mut dyn Parent) -> Result<()> {
    let parent_name = parent.debug_name().to_string();
    let Some(host) = parent.as_content_host_mut() else {
        return Err(LifecycleError::UnsupportedParent {
            parent: parent_name,
            capability: "content binding",
        });
    };
    if host.is_bound(&popup) {
        trace!(parent = %parent_name, "popup already bound");
        return Ok(());
    }
    host.bind_content(popup.clone());
    popup.borrow_mut().set_content_bound(true);
    Ok(())
}

/// Unbind `popup` from `parent` if `parent` currently holds it.
///
/// Returns whether anything was unbound.
fn unbind_popup(popup: &InstanceRef, parent: Option<&mut dyn Parent>) -> bool {
    let Some(host) = parent.and_then(|parent| parent.as_content_host_mut()) else {
        return false;
    };
    if !host.is_bound(popup) {
        return false;
    }
    host.unbind_content(popup);
    popup.borrow_mut().set_content_bound(false);
    true
}

fn text_field(field: &str, value: Option<&OptionValue>) -> Result<Option<String>> {
    match value {
        None => Ok(None),
        Some(OptionValue::Text(text)) => Ok(Some(text.clone())),
        Some(other) => Err(LifecycleError::MalformedUpdate {
            field: field.to_string(),
            expected: "text",
            found: other.kind(),
        }),
    }
}

fn table_field(field: &str, value: Option<&OptionValue>) -> Result<Option<DataTable>> {
    match value {
        None => Ok(None),
        Some(OptionValue::Table(table)) => Ok(Some(table.clone())),
        Some(other) => Err(LifecycleError::MalformedUpdate {
            field: field.to_string(),
            expected: "table",
            found: other.kind(),
        }),
    }
}
