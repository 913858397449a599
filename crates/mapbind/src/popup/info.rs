//! Info popup: a card with an optional thumbnail, title and description.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::{debug, trace};

use super::{
    PopupActivity, PopupCore, bind_popup, content, fields, text_field, unbind_popup,
};
use crate::config::PopupConfig;
use crate::controller::InstanceBehavior;
use crate::error::Result;
use crate::object::{EventHandler, Evented, MapObject, Renderable, instance_ref};
use crate::options::OptionsSnapshot;
use crate::parent::Parent;

/// Settings retained by an [`InfoPopup`]. Each field is independently optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InfoSettings {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image_source: Option<String>,
}

impl InfoSettings {
    pub fn from_options(options: &OptionsSnapshot) -> Result<Self> {
        let mut settings = Self::default();
        settings.merge(options)?;
        Ok(settings)
    }

    /// Merge the fields listed in `updates`, leaving the others untouched.
    ///
    /// All fields are validated before any is written.
    pub fn merge(&mut self, updates: &OptionsSnapshot) -> Result<()> {
        let mut merged = self.clone();
        for (field, value) in updates.iter() {
            match field {
                fields::TITLE => merged.title = text_field(field, value)?,
                fields::DESCRIPTION => merged.description = text_field(field, value)?,
                fields::IMAGE_SOURCE => merged.image_source = text_field(field, value)?,
                other => trace!(field = other, "ignoring unknown info popup field"),
            }
        }
        *self = merged;
        Ok(())
    }

    fn markup(&self) -> String {
        content::info_markup(
            self.title.as_deref(),
            self.description.as_deref(),
            self.image_source.as_deref(),
        )
    }
}

/// Info-style popup instance.
#[derive(Debug)]
pub struct InfoPopup {
    core: PopupCore,
    settings: InfoSettings,
}

impl InfoPopup {
    /// Create a popup; `config` is layered over [`PopupConfig::info_defaults`].
    pub fn new(settings: InfoSettings, config: &PopupConfig) -> Self {
        let mut core = PopupCore::new(config.merged_over(&PopupConfig::info_defaults()));
        core.set_content(settings.markup());
        Self { core, settings }
    }

    pub fn settings(&self) -> &InfoSettings {
        &self.settings
    }

    pub fn core(&self) -> &PopupCore {
        &self.core
    }

    pub fn content(&self) -> &str {
        self.core.content()
    }

    pub fn open(&mut self) {
        self.core.open();
    }

    pub fn close(&mut self) {
        self.core.close();
    }

    /// Merge `updates` into the retained settings, regenerate and re-render.
    pub fn update_settings(&mut self, updates: &OptionsSnapshot) -> Result<()> {
        self.settings.merge(updates)?;
        self.core.set_content(self.settings.markup());
        self.core.update();
        Ok(())
    }
}

impl MapObject for InfoPopup {
    fn debug_name(&self) -> &str {
        "InfoPopup"
    }

    fn as_evented(&self) -> Option<&dyn Evented> {
        Some(self.core.listeners())
    }

    fn as_evented_mut(&mut self) -> Option<&mut dyn Evented> {
        Some(self.core.listeners_mut())
    }

    fn as_renderable(&self) -> Option<&dyn Renderable> {
        Some(&self.core)
    }

    fn as_renderable_mut(&mut self) -> Option<&mut dyn Renderable> {
        Some(&mut self.core)
    }

    fn set_content_bound(&mut self, bound: bool) {
        self.core.set_bound(bound);
    }
}

/// Host-side state of an info popup element.
#[derive(Debug, Default)]
pub struct InfoPopupBehavior {
    title: Option<String>,
    description: Option<String>,
    image_source: Option<String>,
    config: PopupConfig,
    activity: PopupActivity,
}

impl InfoPopupBehavior {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: PopupConfig) -> Self {
        self.config = config;
        self
    }

    pub fn set_title(&mut self, title: Option<String>) {
        self.title = title;
    }

    pub fn set_description(&mut self, description: Option<String>) {
        self.description = description;
    }

    pub fn set_image_source(&mut self, image_source: Option<String>) {
        self.image_source = image_source;
    }

    /// `true` while the popup is open.
    pub fn is_active(&self) -> bool {
        self.activity.is_active()
    }
}

impl InstanceBehavior for InfoPopupBehavior {
    type Instance = InfoPopup;

    fn create_instance(&mut self, options: &OptionsSnapshot) -> Result<InfoPopup> {
        Ok(InfoPopup::new(
            InfoSettings::from_options(options)?,
            &self.config,
        ))
    }

    fn instance_options(&self) -> OptionsSnapshot {
        OptionsSnapshot::new()
            .with_opt(fields::TITLE, self.title.clone())
            .with_opt(fields::DESCRIPTION, self.description.clone())
            .with_opt(fields::IMAGE_SOURCE, self.image_source.clone())
    }

    fn attach_to_parent(
        &mut self,
        instance: &Rc<RefCell<InfoPopup>>,
        parent: &mut dyn Parent,
    ) -> Result<()> {
        bind_popup(instance_ref(instance), parent)
    }

    fn detach_from_parent(
        &mut self,
        instance: &Rc<RefCell<InfoPopup>>,
        parent: Option<&mut dyn Parent>,
    ) -> Result<bool> {
        // A popup another one displaced is no longer held by any parent.
        let detached = unbind_popup(&instance_ref(instance), parent)
            || !instance.borrow().core().is_bound();
        if detached {
            instance.borrow_mut().close();
            self.activity.reset();
        }
        Ok(detached)
    }

    fn update_instance(
        &mut self,
        instance: &Rc<RefCell<InfoPopup>>,
        previous: &OptionsSnapshot,
        next: &OptionsSnapshot,
    ) -> Result<()> {
        let updates = previous.diff(next);
        if updates.is_empty() {
            return Ok(());
        }
        debug!(fields = ?updates.field_names().collect::<Vec<_>>(), "updating info popup");
        instance.borrow_mut().update_settings(&updates)
    }

    fn instance_events(&self) -> Vec<(String, EventHandler)> {
        self.activity.handlers()
    }
}
