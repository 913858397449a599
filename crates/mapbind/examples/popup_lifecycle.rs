//! Walks an info popup and a data popup through a full host lifecycle.
//!
//! Run with `RUST_LOG=trace` to see every transition. Each lifecycle phase
//! is one puffin frame; connect `puffin_viewer` to port 8585 to inspect them.

use std::cell::RefCell;
use std::rc::Rc;

use mapbind::popup::{DataPopupBehavior, InfoPopupBehavior};
use mapbind::{
    ContentHost, ContentSlot, DataTable, InstanceController, InstanceRef, Parent, same_instance,
};
use mapbind_core::{logging, profiling};

/// Minimal marker: a layer list plus one bound popup.
#[derive(Default)]
struct Marker {
    name: String,
    layers: Vec<InstanceRef>,
    popup: ContentSlot,
}

impl Parent for Marker {
    fn debug_name(&self) -> &str {
        &self.name
    }

    fn has_instance(&self, instance: &InstanceRef) -> bool {
        self.layers.iter().any(|l| same_instance(l, instance))
            || self.popup.get().is_some_and(|p| same_instance(&p, instance))
    }

    fn add_instance(&mut self, instance: InstanceRef) {
        self.layers.push(instance);
    }

    fn remove_instance(&mut self, instance: &InstanceRef) {
        self.layers.retain(|l| !same_instance(l, instance));
    }

    fn as_content_host(&self) -> Option<&dyn ContentHost> {
        Some(self)
    }

    fn as_content_host_mut(&mut self) -> Option<&mut dyn ContentHost> {
        Some(self)
    }
}

impl ContentHost for Marker {
    fn bound_content(&self) -> Option<InstanceRef> {
        self.popup.get()
    }

    fn bind_content(&mut self, content: InstanceRef) {
        self.popup.bind(content);
    }

    fn unbind_content(&mut self, content: &InstanceRef) {
        self.popup.unbind(content);
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();
    profiling::init_profiling();

    let mut depot = Marker {
        name: "depot".into(),
        ..Default::default()
    };
    let mut harbour = Marker {
        name: "harbour".into(),
        ..Default::default()
    };

    let mut info = InstanceController::new(InfoPopupBehavior::new());
    let created = Rc::new(RefCell::new(0));
    let counter = Rc::clone(&created);
    info.on_notification(move |n| {
        tracing::info!(?n, "host notified");
        *counter.borrow_mut() += 1;
    });

    info.behavior_mut().set_title(Some("Depot".into()));
    info.ensure_attached(Some(&mut depot))?;

    info.behavior_mut()
        .set_description(Some("Fuel and spares".into()));
    info.ensure_updated()?;
    profiling::new_frame();

    if let Some(popup) = info.instance() {
        popup.borrow_mut().open();
        tracing::info!(active = info.behavior().is_active(), "popup opened");
        tracing::info!(markup = popup.borrow().content(), "info popup content");
    }

    // Move the host element to another marker.
    info.ensure_detached(Some(&mut depot))?;
    info.ensure_attached(Some(&mut harbour))?;
    profiling::new_frame();

    let mut data = InstanceController::new(DataPopupBehavior::new());
    data.behavior_mut().set_title(Some("Harbour".into()));
    data.behavior_mut().set_data(
        DataTable::new()
            .with_entry("Name", "Tokyo")
            .with_entry("Location", "Japan"),
    );
    // Replaces the info popup as the harbour marker's content.
    data.ensure_attached(Some(&mut harbour))?;
    if let Some(popup) = data.instance() {
        tracing::info!(markup = popup.borrow().content(), "data popup content");
    }

    profiling::new_frame();

    // The info popup was displaced by the data popup, so it is already detached.
    info.teardown(Some(&mut harbour))?;
    data.teardown(Some(&mut harbour))?;
    profiling::new_frame();
    tracing::info!(notifications = *created.borrow(), "done");
    Ok(())
}
