//! # SparseDb - A Sparse, Multi-Version Row Store
//!
//! SparseDb stores logical rows of a schema on top of an ordered key-value
//! index. Every column revision of a row is one index entry, so rows are
//! sparse (a row holds only the columns ever written to it) and keep their
//! full history (every write adds a revision at a new timestamp).
//!
//! ## Architecture
//!
//! The row store consists of several key components:
//!
//! - **KeyCodec**: order-preserving composite keys, one range per row
//! - **ValueCodec**: typed column values with an explicit tombstone
//! - **RowMerger**: folds a row's revisions into its state at a timestamp
//! - **OrderedIndex**: the sorted index underneath ([`MemIndex`] in memory)
//! - **RowStore**: the façade tying them together
//!
//! ## Example Usage
//!
//! ```rust
//! use sparsedb::{KeyType, MemIndex, Row, RowStore, Schema, Value, WriteTimestamp};
//!
//! # fn main() -> Result<(), sparsedb::Error> {
//! let schema = Schema::new("employee", "id", KeyType::Integer)?;
//! let store = RowStore::new(MemIndex::new(), schema)?;
//!
//! // Write operations
//! let row = Row::new().with("id", 12).with("Name", "Bryan").with("Employer", "SAIC");
//! store.write(&row, WriteTimestamp::At(100))?;
//! store.write(&Row::new().with("id", 12).with("Employer", "SYSTAP"), WriteTimestamp::At(200))?;
//!
//! // Read operations
//! let latest = store.read(&Value::Int(12))?.expect("row exists");
//! assert_eq!(latest.get("Employer"), Some(&Value::from("SYSTAP")));
//!
//! let before = store.read_at(&Value::Int(12), Some(100))?.expect("row exists");
//! assert_eq!(before.get("Employer"), Some(&Value::from("SAIC")));
//!
//! // Delete a column
//! store.write(&Row::new().with("id", 12).with("Employer", Value::Absent), WriteTimestamp::Auto)?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

// Module declarations
pub mod clock;
pub mod config;
pub mod error;
pub mod index;
pub mod iterator;
pub mod key;
pub mod merge;
pub mod name;
pub mod row;
pub mod schema;
pub mod value;
pub mod write_batch;

// Re-exports
pub use clock::WriteTimestamp;
pub use config::{AutoTimestamp, Options};
pub use error::{Error, Result};
pub use index::{EntryIter, MemIndex, OrderedIndex};
pub use iterator::RowIterator;
pub use key::{DecodedKey, KeyBuilder, KeyCodec};
pub use merge::RowMerger;
pub use row::Row;
pub use schema::{KeyType, Schema};
pub use value::{Value, ValueCodec};
pub use write_batch::WriteBatch;

/// The row store handle.
///
/// This is the primary interface for reading and writing the logical rows of
/// one schema. It supports row writes, point reads, and range scans, all of
/// them optionally as of an earlier timestamp.
///
/// # Thread Safety
///
/// `RowStore` holds no mutable state: every operation builds its keys in a
/// buffer of its own. It can be shared across threads using `Arc<RowStore>`
/// whenever its index can.
pub struct RowStore<I> {
    /// The ordered index holding every column revision
    index: I,

    /// The schema of every row in this store
    schema: Schema,

    /// Configuration options
    options: Options,

    /// `schemaBytes`, shared by every key of the namespace
    schema_bytes: Vec<u8>,
}

impl<I: OrderedIndex> RowStore<I> {
    /// Creates a row store over `index` with default options.
    ///
    /// # Example
    ///
    /// ```rust
    /// use sparsedb::{KeyType, MemIndex, RowStore, Schema};
    ///
    /// # fn main() -> Result<(), sparsedb::Error> {
    /// let schema = Schema::new("employee", "id", KeyType::Integer)?;
    /// let store = RowStore::new(MemIndex::new(), schema)?;
    /// assert_eq!(store.schema().primary_key(), "id");
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(index: I, schema: Schema) -> Result<Self> {
        Self::with_options(index, schema, Options::default())
    }

    /// Creates a row store over `index` with the given options.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if the options are invalid.
    pub fn with_options(index: I, schema: Schema, options: Options) -> Result<Self> {
        options.validate()?;

        let schema_bytes = schema.schema_bytes();
        log::debug!("Opened row store for {}", schema);
        Ok(Self { index, schema, options, schema_bytes })
    }

    /// Returns the schema.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Returns the options.
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Returns the underlying index.
    pub fn index(&self) -> &I {
        &self.index
    }

    fn key_builder(&self) -> KeyBuilder {
        KeyBuilder::with_capacity(self.options.key_capacity)
    }

    /// Encodes one revision of `row` into the batch `write` would submit.
    ///
    /// Resolves the timestamp, then builds one entry per column in column
    /// name order. A column holding [`Value::Absent`] becomes a tombstone.
    /// Nothing is sent to the index.
    ///
    /// Returns the batch and the effective timestamp.
    ///
    /// # Errors
    ///
    /// - `MissingPrimaryKey` if the row has no value for the primary-key column
    /// - `InvalidColumnName` if a column name is empty or contains NUL
    /// - `Encoding` if the primary key does not fit the schema's key type
    pub fn encode(&self, row: &Row, timestamp: WriteTimestamp) -> Result<(WriteBatch, i64)> {
        let primary_key = match row.get(self.schema.primary_key()) {
            Some(value) if !value.is_absent() => value,
            _ => {
                return Err(Error::MissingPrimaryKey(format!(
                    "row has no value for {:?} in {}",
                    self.schema.primary_key(),
                    self.schema.name()
                )))
            }
        };

        let timestamp = timestamp.resolve(self.options.auto_timestamp);

        let mut key = self.key_builder();
        KeyCodec::append_lower_bound(&mut key, &self.schema, primary_key)?;
        let prefix_len = key.len();

        let mut batch = WriteBatch::with_capacity(row.len());
        for (column, value) in row {
            name::assert_valid_column_name(column)?;

            key.truncate(prefix_len);
            KeyCodec::append_column_and_timestamp(&mut key, column, timestamp);
            log::trace!("Encoded key {:?} for column {}", key.as_slice(), column);

            batch.push(key.to_key(), ValueCodec::encode(value)?);
        }

        if self.options.verify_batch_order && !batch.is_sorted() {
            return Err(Error::internal(format!(
                "batch for primary key {} is not strictly ascending",
                primary_key
            )));
        }

        Ok((batch, timestamp))
    }

    /// Writes one revision of a row and returns its effective timestamp.
    ///
    /// Only the columns present in `row` are written; other columns of the
    /// stored row keep their values. All columns become visible together.
    ///
    /// # Errors
    ///
    /// Fails as [`RowStore::encode`] does, in which case nothing is written,
    /// or with whatever the index reports.
    ///
    /// # Example
    ///
    /// ```rust
    /// # use sparsedb::{KeyType, MemIndex, Row, RowStore, Schema, Value, WriteTimestamp};
    /// # fn main() -> Result<(), sparsedb::Error> {
    /// # let store = RowStore::new(MemIndex::new(), Schema::new("t", "id", KeyType::Long)?)?;
    /// let ts = store.write(&Row::new().with("id", 1i64).with("a", true), WriteTimestamp::Auto)?;
    /// assert!(store.read_at(&Value::Long(1), Some(ts - 1))?.is_none());
    /// # Ok(())
    /// # }
    /// ```
    pub fn write(&self, row: &Row, timestamp: WriteTimestamp) -> Result<i64> {
        let (batch, timestamp) = self.encode(row, timestamp)?;
        let entries = batch.len();
        let bytes = batch.approximate_size();

        self.index.batch_insert(batch)?;

        if let Some(primary_key) = row.get(self.schema.primary_key()) {
            log::info!(
                "Wrote row: schema={}, pk={}, timestamp={}, entries={}, bytes={}",
                self.schema.name(),
                primary_key,
                timestamp,
                entries,
                bytes
            );
        }
        Ok(timestamp)
    }

    /// Reads the latest state of a row.
    ///
    /// Returns `None` if the row does not exist or all of its columns have
    /// been deleted.
    pub fn read(&self, primary_key: &Value) -> Result<Option<Row>> {
        self.read_at(primary_key, None)
    }

    /// Reads the state of a row as of `max_timestamp`.
    ///
    /// Revisions newer than `max_timestamp` are ignored; `None` reads the
    /// latest state.
    ///
    /// # Errors
    ///
    /// Returns `Encoding` if the primary key does not fit the schema's key
    /// type, or `Corruption` if a stored entry cannot be decoded.
    pub fn read_at(&self, primary_key: &Value, max_timestamp: Option<i64>) -> Result<Option<Row>> {
        let mut lower = self.key_builder();
        KeyCodec::append_lower_bound(&mut lower, &self.schema, primary_key)?;
        let mut upper = self.key_builder();
        KeyCodec::append_upper_bound(&mut upper, &self.schema, primary_key)?;

        log::debug!(
            "Reading {}: from={:?}, to={:?}, max_timestamp={:?}",
            primary_key,
            lower.as_slice(),
            upper.as_slice(),
            max_timestamp
        );

        let entries = self.index.range_scan(lower.as_slice(), upper.as_slice())?;
        let row = RowMerger::merge(entries, lower.len(), max_timestamp)?;
        if row.is_none() {
            log::debug!("Row {} not found in {}", primary_key, self.schema.name());
        }
        Ok(row)
    }

    /// Scans the latest state of the rows in `[from, to)`.
    ///
    /// `None` bounds extend the range to the start or end of the schema.
    pub fn scan(&self, from: Option<&Value>, to: Option<&Value>) -> Result<RowIterator<'_>> {
        self.scan_at(from, to, None)
    }

    /// Scans the state of the rows in `[from, to)` as of `max_timestamp`.
    ///
    /// Rows without any column at that time are skipped.
    ///
    /// # Errors
    ///
    /// Returns `Encoding` if a bound does not fit the schema's key type.
    /// Errors met while iterating are yielded by the iterator.
    pub fn scan_at(
        &self,
        from: Option<&Value>,
        to: Option<&Value>,
        max_timestamp: Option<i64>,
    ) -> Result<RowIterator<'_>> {
        let lower = match from {
            Some(pk) => KeyCodec::build_lower_bound(&self.schema, pk)?,
            None => self.schema_bytes.clone(),
        };
        let upper = match to {
            Some(pk) => KeyCodec::build_lower_bound(&self.schema, pk)?,
            None => self.schema.namespace_end(),
        };

        log::debug!("Scanning {}: from={:?}, to={:?}", self.schema.name(), lower, upper);

        let entries = self.index.range_scan(&lower, &upper)?;
        Ok(RowIterator::new(
            entries,
            self.schema_bytes.len(),
            self.schema.primary_key_type(),
            max_timestamp,
        ))
    }
}
