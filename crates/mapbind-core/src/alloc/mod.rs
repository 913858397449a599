//! Allocation and collection types for mapbind.
//!
//! This module provides:
//! - Re-exports of hash collections using AHash
//! - [`SideTable`], a generational slot table for non-owning lookups

pub mod side_table;

pub use ahash::{AHashMap as HashMap, AHashSet as HashSet, RandomState};
pub use side_table::{SideTable, SlotKey};
