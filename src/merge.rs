//! Row reconstruction from a single forward scan.
//!
//! A row's entries arrive grouped by column, oldest revision first, so a
//! later entry for a column always supersedes an earlier one. Merging is a
//! single pass with no sorting and no buffering beyond the row itself.

use std::collections::BTreeMap;

use crate::key::KeyCodec;
use crate::row::Row;
use crate::value::{Value, ValueCodec};
use crate::Result;

/// Folds decoded `(column, timestamp, value)` revisions into a logical row.
///
/// # Example
///
/// ```
/// use sparsedb::{RowMerger, Value};
///
/// let mut merger = RowMerger::new(Some(150));
/// merger.accept("Employer", 100, Value::from("SAIC"));
/// merger.accept("Employer", 200, Value::from("SYSTAP")); // after the filter
/// let row = merger.finish().unwrap();
/// assert_eq!(row.get("Employer"), Some(&Value::from("SAIC")));
/// ```
#[derive(Debug)]
pub struct RowMerger {
    max_timestamp: Option<i64>,
    columns: BTreeMap<String, Value>,
}

impl RowMerger {
    /// Creates a merger. Revisions newer than `max_timestamp` are ignored;
    /// `None` keeps every revision.
    pub fn new(max_timestamp: Option<i64>) -> Self {
        Self { max_timestamp, columns: BTreeMap::new() }
    }

    /// Applies one revision. Revisions must arrive in composite-key order.
    pub fn accept(&mut self, column: &str, timestamp: i64, value: Value) {
        if let Some(max) = self.max_timestamp {
            if timestamp > max {
                log::debug!("Ignoring newer revision: col={}, timestamp={}", column, timestamp);
                return;
            }
        }

        if value.is_absent() {
            if let Some(old) = self.columns.remove(column) {
                log::debug!("Removing revision for {} from the row (was {})", column, old);
            }
        } else if let Some(old) = self.columns.insert(column.to_string(), value) {
            log::trace!("Overwriting revision for {} (was {})", column, old);
        }
    }

    /// Decodes one raw index entry of the row and applies it.
    ///
    /// `prefix_len` is the length of the row's lower bound.
    pub fn accept_entry(&mut self, key: &[u8], value: &[u8], prefix_len: usize) -> Result<()> {
        let decoded = KeyCodec::decode(key, prefix_len)?;
        if let Some(max) = self.max_timestamp {
            // Skip before decoding a value that would be thrown away.
            if decoded.timestamp > max {
                log::debug!(
                    "Ignoring newer revision: col={}, timestamp={}",
                    decoded.column,
                    decoded.timestamp
                );
                return Ok(());
            }
        }
        let value = ValueCodec::decode(value)?;
        self.accept(&decoded.column, decoded.timestamp, value);
        Ok(())
    }

    /// Returns the row, or `None` if no column survived the merge.
    pub fn finish(self) -> Option<Row> {
        if self.columns.is_empty() {
            return None;
        }
        Some(Row::from(self.columns))
    }

    /// Merges a row's raw entries in one pass.
    pub fn merge<I>(entries: I, prefix_len: usize, max_timestamp: Option<i64>) -> Result<Option<Row>>
    where
        I: IntoIterator<Item = Result<(Vec<u8>, Vec<u8>)>>,
    {
        let mut merger = RowMerger::new(max_timestamp);
        for entry in entries {
            let (key, value) = entry?;
            merger.accept_entry(&key, &value, prefix_len)?;
        }
        Ok(merger.finish())
    }
}
