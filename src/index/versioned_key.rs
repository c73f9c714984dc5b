//! # Versioned Key Format
//!
//! Every physical entry of a [`MemIndex`](super::MemIndex) is stored under
//! its user key plus the sequence number of the batch that wrote it.
//!
//! ## Ordering
//!
//! VersionedKeys are ordered by:
//! 1. user_key (ascending)
//! 2. sequence (descending - newer first)

use std::cmp::Ordering;

/// A user key stamped with the sequence of the batch that inserted it.
///
/// Because sequences sort descending, the first version a range walk meets
/// for a user key is the newest one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionedKey {
    user_key: Vec<u8>,
    sequence: u64,
}

impl VersionedKey {
    /// Creates a new VersionedKey.
    pub fn new(user_key: Vec<u8>, sequence: u64) -> Self {
        Self { user_key, sequence }
    }

    /// Returns the key sorting before every version of `user_key`.
    pub(crate) fn first_version_of(user_key: &[u8]) -> Self {
        Self::new(user_key.to_vec(), u64::MAX)
    }

    /// Returns the key sorting after every version of `user_key`.
    ///
    /// Sequence zero is never assigned to a batch.
    pub(crate) fn past_versions_of(user_key: &[u8]) -> Self {
        Self::new(user_key.to_vec(), 0)
    }

    /// Returns the user key.
    pub fn user_key(&self) -> &[u8] {
        &self.user_key
    }

    /// Returns the sequence number.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }
}

impl PartialOrd for VersionedKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for VersionedKey {
    fn cmp(&self, other: &Self) -> Ordering {
        // User keys ascending, then sequence numbers descending
        self.user_key
            .cmp(&other.user_key)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}
