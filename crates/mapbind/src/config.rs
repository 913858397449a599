//! Configuration for controllers and popup instances.

/// Names of the notifications a controller emits to its host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerConfig {
    /// Emitted once when the wrapped instance is created.
    pub created_event: String,
    /// Emitted when an update arrives before the instance exists but the host can create one.
    pub ready_event: String,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        ControllerConfig {
            created_event: "instance-created".to_string(),
            ready_event: "instance-ready".to_string(),
        }
    }
}

/// Presentation settings applied to a popup when it is created.
///
/// Every field is optional so a caller-supplied config can be layered over
/// the variant's defaults with [`PopupConfig::merged_over`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PopupConfig {
    /// CSS class put on the popup container.
    pub class_name: Option<String>,
    /// Maximum popup width in pixels.
    pub max_width: Option<u32>,
    /// Minimum popup width in pixels.
    pub min_width: Option<u32>,
}

impl PopupConfig {
    /// Defaults for info-style popups.
    pub fn info_defaults() -> Self {
        PopupConfig {
            class_name: Some("map-popup-info".to_string()),
            max_width: None,
            min_width: None,
        }
    }

    /// Defaults for data-table popups.
    pub fn data_defaults() -> Self {
        PopupConfig {
            class_name: Some("map-popup-data".to_string()),
            max_width: Some(400),
            min_width: Some(300),
        }
    }

    pub fn with_class_name(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = Some(class_name.into());
        self
    }

    pub fn with_max_width(mut self, max_width: u32) -> Self {
        self.max_width = Some(max_width);
        self
    }

    pub fn with_min_width(mut self, min_width: u32) -> Self {
        self.min_width = Some(min_width);
        self
    }

    /// Layer `self` over `base`: fields set on `self` win.
    pub fn merged_over(&self, base: &PopupConfig) -> PopupConfig {
        PopupConfig {
            class_name: self.class_name.clone().or_else(|| base.class_name.clone()),
            max_width: self.max_width.or(base.max_width),
            min_width: self.min_width.or(base.min_width),
        }
    }
}
