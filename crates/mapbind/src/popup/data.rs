//! Data popup: an optional title over a label/value table.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::{debug, trace};

use super::{
    PopupActivity, PopupCore, bind_popup, content, fields, table_field, text_field, unbind_popup,
};
use crate::config::PopupConfig;
use crate::controller::InstanceBehavior;
use crate::error::Result;
use crate::object::{EventHandler, Evented, MapObject, Renderable, instance_ref};
use crate::options::{DataTable, OptionsSnapshot};
use crate::parent::Parent;

/// Settings retained by a [`DataPopup`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataSettings {
    pub title: Option<String>,
    /// Rows in insertion order. `None` renders no table at all.
    pub data: Option<DataTable>,
}

impl DataSettings {
    pub fn from_options(options: &OptionsSnapshot) -> Result<Self> {
        let mut settings = Self::default();
        settings.merge(options)?;
        Ok(settings)
    }

    /// Merge the fields listed in `updates`, leaving the others untouched.
    pub fn merge(&mut self, updates: &OptionsSnapshot) -> Result<()> {
        let mut merged = self.clone();
        for (field, value) in updates.iter() {
            match field {
                fields::TITLE => merged.title = text_field(field, value)?,
                fields::DATA => merged.data = table_field(field, value)?,
                other => trace!(field = other, "ignoring unknown data popup field"),
            }
        }
        *self = merged;
        Ok(())
    }

    fn markup(&self) -> String {
        content::data_markup(self.title.as_deref(), self.data.as_ref())
    }
}

/// Data-table popup instance.
#[derive(Debug)]
pub struct DataPopup {
    core: PopupCore,
    settings: DataSettings,
}

impl DataPopup {
    /// Create a popup; `config` is layered over [`PopupConfig::data_defaults`].
    pub fn new(settings: DataSettings, config: &PopupConfig) -> Self {
        let mut core = PopupCore::new(config.merged_over(&PopupConfig::data_defaults()));
        core.set_content(settings.markup());
        Self { core, settings }
    }

    pub fn settings(&self) -> &DataSettings {
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

impl MapObject for DataPopup {
    fn debug_name(&self) -> &str {
        "DataPopup"
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

/// Host-side state of a data popup element. `data` starts as an empty table.
#[derive(Debug, Default)]
pub struct DataPopupBehavior {
    title: Option<String>,
    data: DataTable,
    config: PopupConfig,
    activity: PopupActivity,
}

impl DataPopupBehavior {
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

    pub fn set_data(&mut self, data: DataTable) {
        self.data = data;
    }

    pub fn data(&self) -> &DataTable {
        &self.data
    }

    /// `true` while the popup is open.
    pub fn is_active(&self) -> bool {
        self.activity.is_active()
    }
}

impl InstanceBehavior for DataPopupBehavior {
    type Instance = DataPopup;

    fn create_instance(&mut self, options: &OptionsSnapshot) -> Result<DataPopup> {
        Ok(DataPopup::new(
            DataSettings::from_options(options)?,
            &self.config,
        ))
    }

    fn instance_options(&self) -> OptionsSnapshot {
        OptionsSnapshot::new()
            .with_opt(fields::TITLE, self.title.clone())
            .with(fields::DATA, self.data.clone())
    }

    fn attach_to_parent(
        &mut self,
        instance: &Rc<RefCell<DataPopup>>,
        parent: &mut dyn Parent,
    ) -> Result<()> {
        bind_popup(instance_ref(instance), parent)
    }

    fn detach_from_parent(
        &mut self,
        instance: &Rc<RefCell<DataPopup>>,
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
        instance: &Rc<RefCell<DataPopup>>,
        previous: &OptionsSnapshot,
        next: &OptionsSnapshot,
    ) -> Result<()> {
        let updates = previous.diff(next);
        if updates.is_empty() {
            return Ok(());
        }
        debug!(fields = ?updates.field_names().collect::<Vec<_>>(), "updating data popup");
        instance.borrow_mut().update_settings(&updates)
    }

    fn instance_events(&self) -> Vec<(String, EventHandler)> {
        self.activity.handlers()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_uses_data_defaults() {
        let popup = DataPopup::new(DataSettings::default(), &PopupConfig::default());
        let config = popup.core().config();
        assert_eq!(config.class_name.as_deref(), Some("map-popup-data"));
        assert_eq!((config.min_width, config.max_width), (Some(300), Some(400)));
    }

    #[test]
    fn test_default_behavior_renders_empty_table() {
        let behavior = DataPopupBehavior::new();
        let settings = DataSettings::from_options(&behavior.instance_options()).unwrap();
        let popup = DataPopup::new(settings, &PopupConfig::default());
        assert!(popup.content().contains("map-data-box__table"));
        assert!(!popup.content().contains("map-data-box__table__cell"));
    }

    #[test]
    fn test_merge_rejects_text_as_data() {
        let mut settings = DataSettings::default();
        let err = settings
            .merge(&OptionsSnapshot::new().with(fields::DATA, "Tokyo"))
            .unwrap_err();
        assert!(err.to_string().contains("expected table"));
        assert!(settings.data.is_none());
    }
}
