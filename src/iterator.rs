//! Row iterator for scanning logical rows.
//!
//! Chains per-row reconstruction across one multi-row range scan. Row
//! boundaries are found by measuring the encoded primary key that follows
//! the schema prefix; the key encodings are prefix-free, so every entry that
//! starts with the same `schemaBytes ‖ encodedPrimaryKey` belongs to the same
//! row.

use std::iter::Peekable;

use crate::index::EntryIter;
use crate::key::KeyCodec;
use crate::merge::RowMerger;
use crate::row::Row;
use crate::schema::KeyType;
use crate::Result;

/// A lazy iterator over the logical rows of a primary-key range.
///
/// Rows come out in primary-key order. Rows that merge to nothing (all
/// columns deleted, or only revisions newer than the filter) are skipped.
///
/// After yielding an error the iterator is exhausted.
///
/// # Example
///
/// ```rust
/// use sparsedb::{KeyType, MemIndex, Row, RowStore, Schema, Value, WriteTimestamp};
///
/// # fn main() -> Result<(), sparsedb::Error> {
/// let schema = Schema::new("employee", "id", KeyType::Integer)?;
/// let store = RowStore::new(MemIndex::new(), schema)?;
///
/// for id in 0..5 {
///     store.write(&Row::new().with("id", id), WriteTimestamp::At(100))?;
/// }
///
/// let ids: Vec<_> = store
///     .scan(Some(&Value::Int(1)), Some(&Value::Int(4)))?
///     .map(|row| row.map(|r| r.get("id").cloned()))
///     .collect::<Result<_, _>>()?;
/// assert_eq!(ids, vec![Some(Value::Int(1)), Some(Value::Int(2)), Some(Value::Int(3))]);
/// # Ok(())
/// # }
/// ```
pub struct RowIterator<'a> {
    /// Entries of the scanned range
    entries: Peekable<EntryIter<'a>>,

    /// Length of `schemaBytes`
    schema_len: usize,

    /// Encoding of the primary keys in the range
    key_type: KeyType,

    /// Revisions newer than this are ignored
    max_timestamp: Option<i64>,

    /// Set once the range is exhausted or an error was returned
    done: bool,
}

impl<'a> RowIterator<'a> {
    pub(crate) fn new(
        entries: EntryIter<'a>,
        schema_len: usize,
        key_type: KeyType,
        max_timestamp: Option<i64>,
    ) -> Self {
        Self { entries: entries.peekable(), schema_len, key_type, max_timestamp, done: false }
    }

    /// Reads entries until one non-empty row has been merged.
    fn next_row(&mut self) -> Result<Option<Row>> {
        while let Some(entry) = self.entries.next() {
            let (key, value) = entry?;
            let prefix_len = self.schema_len
                + KeyCodec::primary_key_len(self.key_type, &key[self.schema_len.min(key.len())..])?;

            let mut merger = RowMerger::new(self.max_timestamp);
            merger.accept_entry(&key, &value, prefix_len)?;

            let prefix = &key[..prefix_len];
            while let Some(Ok((next_key, _))) = self.entries.peek() {
                if !next_key.starts_with(prefix) {
                    break;
                }
                if let Some(Ok((next_key, next_value))) = self.entries.next() {
                    merger.accept_entry(&next_key, &next_value, prefix_len)?;
                }
            }

            match merger.finish() {
                Some(row) => return Ok(Some(row)),
                None => log::debug!("Skipping empty row at {:?}", prefix),
            }
        }
        Ok(None)
    }
}

impl Iterator for RowIterator<'_> {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.next_row() {
            Ok(Some(row)) => Some(Ok(row)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
