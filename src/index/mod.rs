//! # Ordered Index
//!
//! The row store sits on top of any sorted byte-key to byte-value index that
//! can do two things: scan a half-open key range in ascending order, and apply
//! a batch of inserts atomically. [`OrderedIndex`] is that seam.
//!
//! [`MemIndex`] is the in-memory implementation shipped with the crate.
//!
//! ## Design
//!
//! - Based on crossbeam-skiplist, so readers never take a lock
//! - Every batch is stamped with one sequence number under a commit lock
//! - The sequence is published only after the whole batch is inserted
//! - Scans skip versions newer than the published sequence
//!
//! ## Thread Safety
//!
//! MemIndex is safe to share across threads. Writers serialize on the commit
//! lock; readers run concurrently with them. A scan that starts after a batch
//! commits sees all of it. A scan already running when a batch commits may see
//! the batch's keys it has not passed yet and miss the ones behind it.

mod versioned_key;

pub use versioned_key::VersionedKey;

use std::ops::Bound;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crossbeam_skiplist::SkipMap;
use parking_lot::Mutex;

use crate::write_batch::WriteBatch;
use crate::Result;

/// A lazy ascending walk over `(key, value)` entries.
pub type EntryIter<'a> = Box<dyn Iterator<Item = Result<(Vec<u8>, Vec<u8>)>> + 'a>;

/// A sorted byte-key index the row store writes to and reads from.
pub trait OrderedIndex: Send + Sync {
    /// Returns the entries whose keys lie in `[from, to)`, ascending.
    ///
    /// Returns an empty walk when `from >= to`.
    fn range_scan(&self, from: &[u8], to: &[u8]) -> Result<EntryIter<'_>>;

    /// Inserts every entry of `batch` atomically.
    ///
    /// Every scan started after this returns sees the whole batch. Scans
    /// already in progress may see only part of it.
    fn batch_insert(&self, batch: WriteBatch) -> Result<()>;
}

impl<T: OrderedIndex + ?Sized> OrderedIndex for Arc<T> {
    fn range_scan(&self, from: &[u8], to: &[u8]) -> Result<EntryIter<'_>> {
        (**self).range_scan(from, to)
    }

    fn batch_insert(&self, batch: WriteBatch) -> Result<()> {
        (**self).batch_insert(batch)
    }
}

impl<T: OrderedIndex + ?Sized> OrderedIndex for &T {
    fn range_scan(&self, from: &[u8], to: &[u8]) -> Result<EntryIter<'_>> {
        (**self).range_scan(from, to)
    }

    fn batch_insert(&self, batch: WriteBatch) -> Result<()> {
        (**self).batch_insert(batch)
    }
}

/// In-memory ordered index backed by a SkipList.
///
/// Rewriting a key keeps the older version in place; scans only ever return
/// the newest committed one.
///
/// # Example
///
/// ```rust
/// use sparsedb::{MemIndex, OrderedIndex, WriteBatch};
///
/// # fn main() -> Result<(), sparsedb::Error> {
/// let index = MemIndex::new();
/// let mut batch = WriteBatch::new();
/// batch.put(b"key1", b"value1");
/// index.batch_insert(batch)?;
///
/// let entries: Vec<_> = index.range_scan(b"key", b"kez")?.collect::<Result<_, _>>()?;
/// assert_eq!(entries, vec![(b"key1".to_vec(), b"value1".to_vec())]);
/// # Ok(())
/// # }
/// ```
pub struct MemIndex {
    /// The underlying SkipList storing VersionedKey -> Value
    data: SkipMap<VersionedKey, Vec<u8>>,

    /// Last sequence handed to a batch; held while the batch is inserted
    commit_lock: Mutex<u64>,

    /// Highest sequence whose batch is fully inserted
    committed: AtomicU64,
}

impl MemIndex {
    /// Creates a new empty MemIndex.
    pub fn new() -> Self {
        Self {
            data: SkipMap::new(),
            commit_lock: Mutex::new(0),
            committed: AtomicU64::new(0),
        }
    }

    /// Returns the number of physical versions stored.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the index contains no entries.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the sequence of the last batch made visible.
    pub fn committed_sequence(&self) -> u64 {
        self.committed.load(Ordering::Acquire)
    }
}

impl Default for MemIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl OrderedIndex for MemIndex {
    fn range_scan(&self, from: &[u8], to: &[u8]) -> Result<EntryIter<'_>> {
        Ok(Box::new(MemIndexIterator::new(self, from, to)))
    }

    fn batch_insert(&self, batch: WriteBatch) -> Result<()> {
        if batch.is_empty() {
            return Ok(());
        }

        let mut last_sequence = self.commit_lock.lock();
        let seq = *last_sequence + 1;
        let count = batch.len();
        let batch_size = batch.approximate_size();

        for (key, value) in batch.into_entries() {
            self.data.insert(VersionedKey::new(key, seq), value);
        }

        // Publish only after every entry is in place
        self.committed.store(seq, Ordering::Release);
        *last_sequence = seq;

        log::trace!("Committed batch: seq={}, entries={}, bytes={}", seq, count, batch_size);
        Ok(())
    }
}

/// Lazy range walk over a [`MemIndex`].
///
/// Each step re-reads the published sequence, so a walk also returns keys from
/// batches that commit while it runs, as long as it has not passed them yet.
struct MemIndexIterator<'a> {
    index: &'a MemIndex,
    cursor: Bound<VersionedKey>,
    to: Vec<u8>,
    done: bool,
}

impl<'a> MemIndexIterator<'a> {
    fn new(index: &'a MemIndex, from: &[u8], to: &[u8]) -> Self {
        Self {
            index,
            cursor: Bound::Included(VersionedKey::first_version_of(from)),
            to: to.to_vec(),
            done: from >= to,
        }
    }
}

impl Iterator for MemIndexIterator<'_> {
    type Item = Result<(Vec<u8>, Vec<u8>)>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            let visible = self.index.committed.load(Ordering::Acquire);
            let Some(entry) = self.index.data.lower_bound(self.cursor.as_ref()) else {
                self.done = true;
                break;
            };

            let key = entry.key();
            if key.user_key() >= self.to.as_slice() {
                self.done = true;
                break;
            }

            if key.sequence() > visible {
                // Part of a batch still being inserted
                self.cursor = Bound::Excluded(key.clone());
                continue;
            }

            self.cursor = Bound::Excluded(VersionedKey::past_versions_of(key.user_key()));
            return Some(Ok((key.user_key().to_vec(), entry.value().clone())));
        }
        None
    }
}
