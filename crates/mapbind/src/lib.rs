//! Mapbind - lifecycle control for imperative map primitives
//!
//! This crate lets a declarative host element drive an imperative map
//! primitive (a popup, a marker, a layer) supplied by a mapping library:
//! - [`InstanceController`] lazily creates the wrapped instance, diffs option
//!   snapshots between updates and attaches/detaches it to a [`Parent`]
//! - [`EventBindingRegistry`] tracks every handler registered on an instance so
//!   all of them can be released at once
//! - [`popup`] provides two content renderers, an info card and a data table
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use mapbind::{InstanceController, popup::InfoPopupBehavior};
//!
//! let mut controller = InstanceController::new(InfoPopupBehavior::new());
//! controller.behavior_mut().set_title(Some("Alpha".into()));
//!
//! // Host element was attached under a marker:
//! controller.ensure_attached(Some(&mut marker))?;
//!
//! // A property changed:
//! controller.behavior_mut().set_description(Some("First site".into()));
//! controller.ensure_updated()?;
//!
//! // Host element was removed:
//! controller.ensure_detached(Some(&mut marker))?;
//! ```

pub mod config;
pub mod controller;
pub mod error;
pub mod object;
pub mod options;
pub mod parent;
pub mod popup;
pub mod registry;

pub use config::{ControllerConfig, PopupConfig};
pub use controller::{InstanceBehavior, InstanceController, LifecycleState, Notification};
pub use error::{LifecycleError, Result};
pub use object::{
    EventHandler, EventListeners, Evented, InstanceRef, MapEvent, MapObject, Renderable,
    WeakInstanceRef, instance_ref, same_instance,
};
pub use options::{DataTable, OptionValue, OptionsSnapshot};
pub use parent::{ContentHost, ContentSlot, Parent};
pub use registry::{EventBinding, EventBindingRegistry, TargetKey};
