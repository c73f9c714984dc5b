//! # Composite Key Format
//!
//! Every column revision of a logical row is one index entry whose key is:
//!
//! ```text
//! [schema name][0x00][primary key][column name][0x00][timestamp: 8 bytes]
//! ```
//!
//! ## Ordering
//!
//! Keys compare as plain bytes, which yields:
//! 1. schema (the NUL-terminated name is prefix-free)
//! 2. primary key (order-preserving encoding per [`KeyType`])
//! 3. column name (the NUL terminator sorts before any continuation)
//! 4. timestamp (ascending, sign-flipped big-endian)
//!
//! All entries of one row therefore lie in `[lower_bound, upper_bound)`, grouped
//! by column, oldest revision first.

mod builder;
mod primary;

pub use builder::KeyBuilder;

use crate::schema::{KeyType, Schema};
use crate::value::Value;
use crate::{Error, Result};

/// Width of the encoded timestamp at the end of every composite key.
pub const TIMESTAMP_WIDTH: usize = 8;

/// The column and timestamp recovered from a composite key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedKey {
    /// The column name.
    pub column: String,
    /// The revision timestamp.
    pub timestamp: i64,
}

/// Builds and decodes composite keys.
pub struct KeyCodec;

impl KeyCodec {
    /// Encodes a primary key with the order-preserving encoding of `key_type`.
    ///
    /// # Errors
    ///
    /// Returns `Encoding` if the value does not fit the key type.
    pub fn encode_primary_key(value: &Value, key_type: KeyType) -> Result<Vec<u8>> {
        let mut key = KeyBuilder::new();
        primary::encode(key_type, value, &mut key)?;
        Ok(key.to_key())
    }

    /// Returns the encoding of the primary key that immediately follows `value`.
    ///
    /// # Errors
    ///
    /// - `UnsupportedOperation` for text key types; their upper bounds exist
    ///   only as bytes, see [`KeyCodec::build_upper_bound`].
    /// - `KeySpaceExhausted` if `value` is already the largest key.
    pub fn successor(value: &Value, key_type: KeyType) -> Result<Vec<u8>> {
        primary::successor(key_type, value)
    }

    /// Returns the length of the encoded primary key at the front of `bytes`.
    pub fn primary_key_len(key_type: KeyType, bytes: &[u8]) -> Result<usize> {
        primary::encoded_len(key_type, bytes)
    }

    /// Appends `schemaBytes ‖ encodedPrimaryKey`, the inclusive lower bound
    /// of the row's entries.
    pub fn append_lower_bound(
        key: &mut KeyBuilder,
        schema: &Schema,
        primary_key: &Value,
    ) -> Result<()> {
        key.append(schema.name().as_bytes()).append_nul();
        primary::encode(schema.primary_key_type(), primary_key, key)
    }

    /// Appends the exclusive upper bound of the row's entries.
    pub fn append_upper_bound(
        key: &mut KeyBuilder,
        schema: &Schema,
        primary_key: &Value,
    ) -> Result<()> {
        key.append(schema.name().as_bytes()).append_nul();
        primary::encode_successor(schema.primary_key_type(), primary_key, key)
    }

    /// Returns the inclusive lower bound of the row's entries.
    pub fn build_lower_bound(schema: &Schema, primary_key: &Value) -> Result<Vec<u8>> {
        let mut key = KeyBuilder::new();
        Self::append_lower_bound(&mut key, schema, primary_key)?;
        Ok(key.to_key())
    }

    /// Returns the exclusive upper bound of the row's entries.
    ///
    /// Fixed-width keys use the next key in key space. Text keys, and
    /// fixed-width keys at their maximum, append `0xFF` to the encoded key.
    pub fn build_upper_bound(schema: &Schema, primary_key: &Value) -> Result<Vec<u8>> {
        let mut key = KeyBuilder::new();
        Self::append_upper_bound(&mut key, schema, primary_key)?;
        Ok(key.to_key())
    }

    /// Appends `utf8(column) ‖ 0x00 ‖ timestamp`.
    ///
    /// The column name must already have been validated.
    pub fn append_column_and_timestamp(key: &mut KeyBuilder, column: &str, timestamp: i64) {
        debug_assert!(!column.is_empty() && !column.as_bytes().contains(&0));
        key.append(column.as_bytes()).append_nul().append_i64(timestamp);
    }

    /// Decodes the column name and timestamp of a composite key, given the
    /// length of its `schemaBytes ‖ encodedPrimaryKey` prefix.
    ///
    /// # Errors
    ///
    /// Returns `Corruption` if the key is too short, the column name is
    /// unterminated or not UTF-8, or the timestamp is not exactly 8 bytes.
    pub fn decode(key: &[u8], prefix_len: usize) -> Result<DecodedKey> {
        let rest = key.get(prefix_len..).ok_or_else(|| {
            Error::corruption(format!(
                "key of {} bytes is shorter than its {} byte prefix",
                key.len(),
                prefix_len
            ))
        })?;
        let nul = rest
            .iter()
            .position(|&b| b == 0)
            .ok_or_else(|| Error::corruption("column name is not NUL-terminated"))?;
        let column = std::str::from_utf8(&rest[..nul])
            .map_err(|e| Error::corruption(format!("column name is not UTF-8: {}", e)))?;
        let timestamp = decode_timestamp(&rest[nul + 1..])?;
        Ok(DecodedKey { column: column.to_string(), timestamp })
    }
}

/// Decodes an 8-byte sign-flipped big-endian timestamp.
pub fn decode_timestamp(bytes: &[u8]) -> Result<i64> {
    let raw: [u8; TIMESTAMP_WIDTH] = bytes.try_into().map_err(|_| {
        Error::corruption(format!(
            "timestamp must be {} bytes, found {}",
            TIMESTAMP_WIDTH,
            bytes.len()
        ))
    })?;
    Ok((u64::from_be_bytes(raw) ^ (1 << 63)) as i64)
}
