//! Mapbind Core
//!
//! Shared utilities for the mapbind crates: hash collection aliases, the
//! generational [`alloc::SideTable`], logging bootstrap and profiling hooks.

pub mod alloc;
pub mod logging;
pub mod profiling;
