//! WriteBatch carries one atomic write to the ordered index.
//!
//! A row store write encodes every column of the row into one batch, so the
//! revision becomes visible all at once or not at all.
//!
//! # Example
//!
//! ```rust
//! use sparsedb::{MemIndex, OrderedIndex, WriteBatch};
//!
//! # fn main() -> Result<(), sparsedb::Error> {
//! let index = MemIndex::new();
//! let mut batch = WriteBatch::new();
//!
//! batch.put(b"key1", b"value1");
//! batch.put(b"key2", b"value2");
//!
//! // Apply all entries atomically
//! index.batch_insert(batch)?;
//! # Ok(())
//! # }
//! ```

/// A sequence of key/value entries to be inserted atomically.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct WriteBatch {
    entries: Vec<(Vec<u8>, Vec<u8>)>,
    approximate_size: usize,
}

impl WriteBatch {
    /// Creates a new empty WriteBatch.
    ///
    /// # Example
    ///
    /// ```
    /// use sparsedb::WriteBatch;
    ///
    /// let batch = WriteBatch::new();
    /// assert!(batch.is_empty());
    /// ```
    pub fn new() -> Self {
        Self { entries: Vec::new(), approximate_size: 0 }
    }

    /// Creates an empty batch with room for `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self { entries: Vec::with_capacity(capacity), approximate_size: 0 }
    }

    /// Adds an entry to the batch.
    ///
    /// # Example
    ///
    /// ```
    /// use sparsedb::WriteBatch;
    ///
    /// let mut batch = WriteBatch::new();
    /// batch.put(b"key", b"value");
    /// assert_eq!(batch.len(), 1);
    /// ```
    pub fn put(&mut self, key: &[u8], value: &[u8]) {
        self.push(key.to_vec(), value.to_vec());
    }

    /// Adds an owned entry to the batch.
    pub fn push(&mut self, key: Vec<u8>, value: Vec<u8>) {
        self.approximate_size += key.len() + value.len() + 8; // Approximate overhead
        self.entries.push((key, value));
    }

    /// Returns the number of entries in the batch.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the batch contains no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the approximate size of the batch in bytes.
    ///
    /// This is an estimate and may not reflect the exact memory usage.
    pub fn approximate_size(&self) -> usize {
        self.approximate_size
    }

    /// Returns true if the keys are strictly ascending.
    pub fn is_sorted(&self) -> bool {
        self.entries.windows(2).all(|pair| pair[0].0 < pair[1].0)
    }

    /// Returns an iterator over the entries in the batch.
    pub fn iter(&self) -> impl Iterator<Item = (&[u8], &[u8])> {
        self.entries.iter().map(|(k, v)| (k.as_slice(), v.as_slice()))
    }

    /// Consumes the batch, returning its entries.
    pub fn into_entries(self) -> Vec<(Vec<u8>, Vec<u8>)> {
        self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_batch_new() {
        let batch = WriteBatch::new();
        assert!(batch.is_empty());
        assert_eq!(batch.len(), 0);
        assert!(batch.is_sorted());
    }

    #[test]
    fn test_write_batch_put() {
        let mut batch = WriteBatch::new();
        batch.put(b"key1", b"value1");
        batch.put(b"key2", b"value2");

        assert_eq!(batch.len(), 2);
        assert!(!batch.is_empty());
        assert!(batch.approximate_size() > 0);
    }

    #[test]
    fn test_write_batch_sorted() {
        let mut batch = WriteBatch::new();
        batch.put(b"a", b"1");
        batch.put(b"b", b"2");
        assert!(batch.is_sorted());

        batch.put(b"b", b"3");
        assert!(!batch.is_sorted(), "duplicate keys are not strictly ascending");
    }

    #[test]
    fn test_write_batch_iter() {
        let mut batch = WriteBatch::new();
        batch.push(b"key1".to_vec(), b"value1".to_vec());
        batch.put(b"key3", b"value3");

        let entries: Vec<_> = batch.iter().collect();
        assert_eq!(entries[0], (&b"key1"[..], &b"value1"[..]));
        assert_eq!(batch.into_entries()[1].0, b"key3".to_vec());
    }
}
