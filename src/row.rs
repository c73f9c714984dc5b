//! The logical row: a column-name to value mapping for one primary key.
//!
//! A row only exists in memory. What the index stores is one entry per
//! column revision; see [`crate::key`].

use std::collections::btree_map;
use std::collections::BTreeMap;

use crate::value::Value;

/// A logical row.
///
/// Columns iterate in name order, which is also the order their entries
/// take in the index.
///
/// ```
/// use sparsedb::{Row, Value};
///
/// let row = Row::new().with("id", 12).with("Name", "Bryan");
/// assert_eq!(row.get("Name"), Some(&Value::from("Bryan")));
/// assert_eq!(row.columns().collect::<Vec<_>>(), vec!["Name", "id"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    columns: BTreeMap<String, Value>,
}

impl Row {
    /// Creates an empty row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a column, builder style.
    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(column, value);
        self
    }

    /// Sets a column, returning the previous value.
    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.columns.insert(column.into(), value.into())
    }

    /// Returns the value of a column.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns.get(column)
    }

    /// Removes a column, returning its value.
    pub fn remove(&mut self, column: &str) -> Option<Value> {
        self.columns.remove(column)
    }

    /// Returns true if the row has the column.
    pub fn contains(&self, column: &str) -> bool {
        self.columns.contains_key(column)
    }

    /// Returns the number of columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Returns true if the row has no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Iterates over the columns in name order.
    pub fn iter(&self) -> btree_map::Iter<'_, String, Value> {
        self.columns.iter()
    }

    /// Iterates over the column names in order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    /// Consumes the row, returning its map.
    pub fn into_inner(self) -> BTreeMap<String, Value> {
        self.columns
    }
}

impl From<BTreeMap<String, Value>> for Row {
    fn from(columns: BTreeMap<String, Value>) -> Self {
        Self { columns }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self { columns: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect() }
    }
}

impl IntoIterator for Row {
    type Item = (String, Value);
    type IntoIter = btree_map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.columns.into_iter()
    }
}

impl<'a> IntoIterator for &'a Row {
    type Item = (&'a String, &'a Value);
    type IntoIter = btree_map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.columns.iter()
    }
}
