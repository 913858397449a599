//! Option snapshots and per-field diffing.
//!
//! A host produces an [`OptionsSnapshot`] each time the controller asks for
//! the current configuration. Snapshots are compared field by field; a field
//! that is absent and a field explicitly set to `None` are the same thing.

use std::rc::Rc;

use indexmap::IndexMap;

/// A single configuration value.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    Text(String),
    Number(f64),
    Flag(bool),
    Table(DataTable),
}

impl OptionValue {
    /// Human readable kind, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            OptionValue::Text(_) => "text",
            OptionValue::Number(_) => "number",
            OptionValue::Flag(_) => "flag",
            OptionValue::Table(_) => "table",
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            OptionValue::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            OptionValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_flag(&self) -> Option<bool> {
        match self {
            OptionValue::Flag(flag) => Some(*flag),
            _ => None,
        }
    }

    pub fn as_table(&self) -> Option<&DataTable> {
        match self {
            OptionValue::Table(table) => Some(table),
            _ => None,
        }
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        OptionValue::Text(value.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(value: String) -> Self {
        OptionValue::Text(value)
    }
}

impl From<f64> for OptionValue {
    fn from(value: f64) -> Self {
        OptionValue::Number(value)
    }
}

impl From<bool> for OptionValue {
    fn from(value: bool) -> Self {
        OptionValue::Flag(value)
    }
}

impl From<DataTable> for OptionValue {
    fn from(value: DataTable) -> Self {
        OptionValue::Table(value)
    }
}

/// Immutable label → value table that keeps insertion order.
///
/// Clones share storage. Since a table cannot be mutated after it is built,
/// two snapshots holding the same table always agree on its contents.
#[derive(Debug, Clone, Default)]
pub struct DataTable(Rc<IndexMap<String, String>>);

impl DataTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a table with `label` set to `value`.
    ///
    /// An existing label keeps its position; a new label is appended.
    pub fn with_entry(mut self, label: impl Into<String>, value: impl Into<String>) -> Self {
        Rc::make_mut(&mut self.0).insert(label.into(), value.into());
        self
    }

    pub fn get(&self, label: &str) -> Option<&str> {
        self.0.get(label).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn shares_storage(&self, other: &DataTable) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for DataTable {
    fn eq(&self, other: &Self) -> bool {
        // Order is part of a table's value: a reordered table renders differently.
        self.shares_storage(other) || self.iter().eq(other.iter())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for DataTable {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(Rc::new(
            iter.into_iter()
                .map(|(k, v)| -> (String, String) { (k.into(), v.into()) })
                .collect(),
        ))
    }
}

/// Point-in-time mapping of configuration field → value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OptionsSnapshot {
    fields: IndexMap<String, Option<OptionValue>>,
}

impl OptionsSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`set`](Self::set) for a present value.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<OptionValue>) -> Self {
        self.set(field, Some(value.into()));
        self
    }

    /// Builder form of [`set`](Self::set) for an optional value.
    pub fn with_opt<V: Into<OptionValue>>(mut self, field: impl Into<String>, value: Option<V>) -> Self {
        self.set(field, value.map(Into::into));
        self
    }

    pub fn set(&mut self, field: impl Into<String>, value: Option<OptionValue>) {
        self.fields.insert(field.into(), value);
    }

    /// Value of `field`, or `None` when absent or null.
    pub fn get(&self, field: &str) -> Option<&OptionValue> {
        self.fields.get(field).and_then(Option::as_ref)
    }

    /// Whether `field` is listed, even with a null value.
    pub fn contains_field(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&OptionValue>)> + '_ {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_ref()))
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.fields.keys().map(String::as_str)
    }

    /// Fields whose value differs between `self` (previous) and `next`.
    ///
    /// The result carries `next`'s values. A field that `next` drops is
    /// reported with a null value.
    pub fn diff(&self, next: &OptionsSnapshot) -> OptionsSnapshot {
        let mut delta = OptionsSnapshot::new();
        for (field, value) in next.iter() {
            if self.get(field) != value {
                delta.set(field, value.cloned());
            }
        }
        for (field, value) in self.iter() {
            if value.is_some() && !next.contains_field(field) {
                delta.set(field, None);
            }
        }
        delta
    }
}
