//! Column values and their storage encoding.
//!
//! ## Format
//!
//! ```text
//! tombstone:  [0x00]
//! value:      [0x01] [bincode(Value)]
//! ```
//!
//! The leading format byte keeps "no value" apart from every real value,
//! including the empty string and the empty binary. Encoded values are
//! only stored and retrieved, never compared, so no ordering applies here.

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use bincode::Options;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

const FORMAT_TOMBSTONE: u8 = 0x00;
const FORMAT_VALUE: u8 = 0x01;

/// A typed column value.
///
/// `Absent` is the deletion marker: writing it for a column retires that
/// column as of the write's timestamp. Rows returned by reads never contain it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// No value; encodes to the tombstone.
    Absent,
    /// A boolean.
    Bool(bool),
    /// A 32-bit signed integer.
    Int(i32),
    /// A 64-bit signed integer.
    Long(i64),
    /// A 32-bit float.
    Float(f32),
    /// A 64-bit float.
    Double(f64),
    /// Unicode text.
    Text(String),
    /// A point in time, in milliseconds since the Unix epoch.
    Date(i64),
    /// Opaque bytes.
    Binary(Vec<u8>),
}

impl Value {
    /// Creates a date value from milliseconds since the Unix epoch.
    pub fn date(millis: i64) -> Self {
        Value::Date(millis)
    }

    /// Returns true for the deletion marker.
    pub fn is_absent(&self) -> bool {
        matches!(self, Value::Absent)
    }

    /// Returns the text if this is a `Text` value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the integer if this is an `Int`, `Long` or `Date` value.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(i64::from(*v)),
            Value::Long(v) | Value::Date(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the name of this value's variant, for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Absent => "Absent",
            Value::Bool(_) => "Bool",
            Value::Int(_) => "Int",
            Value::Long(_) => "Long",
            Value::Float(_) => "Float",
            Value::Double(_) => "Double",
            Value::Text(_) => "Text",
            Value::Date(_) => "Date",
            Value::Binary(_) => "Binary",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Absent => write!(f, "<absent>"),
            Value::Bool(v) => write!(f, "{}", v),
            Value::Int(v) => write!(f, "{}", v),
            Value::Long(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Double(v) => write!(f, "{}", v),
            Value::Text(v) => write!(f, "{}", v),
            Value::Date(v) => write!(f, "@{}ms", v),
            Value::Binary(v) => write!(f, "{:?}", v),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Long(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Binary(v)
    }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Value::Binary(v.to_vec())
    }
}

impl From<SystemTime> for Value {
    fn from(t: SystemTime) -> Self {
        let millis = match t.duration_since(UNIX_EPOCH) {
            Ok(d) => d.as_millis() as i64,
            Err(e) => -(e.duration().as_millis() as i64),
        };
        Value::Date(millis)
    }
}

/// Encodes and decodes column values for storage in index entries.
pub struct ValueCodec;

impl ValueCodec {
    /// Encodes a value. `Value::Absent` becomes the tombstone.
    pub fn encode(value: &Value) -> Result<Vec<u8>> {
        if value.is_absent() {
            return Ok(vec![FORMAT_TOMBSTONE]);
        }
        let mut buf = Vec::with_capacity(16);
        buf.push(FORMAT_VALUE);
        bincode::serialize_into(&mut buf, value)?;
        Ok(buf)
    }

    /// Decodes a value. The tombstone decodes to `Value::Absent`.
    pub fn decode(data: &[u8]) -> Result<Value> {
        match data.split_first() {
            None => Err(Error::corruption("empty value")),
            Some((&FORMAT_TOMBSTONE, [])) => Ok(Value::Absent),
            Some((&FORMAT_TOMBSTONE, rest)) => Err(Error::corruption(format!(
                "tombstone followed by {} trailing bytes",
                rest.len()
            ))),
            Some((&FORMAT_VALUE, payload)) => match decode_payload(payload)? {
                Value::Absent => Err(Error::corruption("absent value stored as a value")),
                value => Ok(value),
            },
            Some((format, _)) => {
                Err(Error::corruption(format!("unknown value format: {:#04x}", format)))
            }
        }
    }

    /// Returns true if the encoded bytes are the tombstone.
    pub fn is_tombstone(data: &[u8]) -> bool {
        data == [FORMAT_TOMBSTONE]
    }
}

/// Decodes a value payload, which must be consumed exactly.
fn decode_payload(payload: &[u8]) -> Result<Value> {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .reject_trailing_bytes()
        .deserialize(payload)
        .map_err(|e| Error::corruption(format!("undecodable value payload: {}", e)))
}
