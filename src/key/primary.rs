//! Order-preserving primary-key encodings, one per [`KeyType`].
//!
//! ```text
//! Integer      4 bytes   i32 sign-flipped, big-endian
//! Long, Date   8 bytes   i64 sign-flipped, big-endian
//! Float        4 bytes   IEEE-754, negatives inverted, positives sign-set
//! Double       8 bytes   IEEE-754, negatives inverted, positives sign-set
//! *Text        n bytes   UTF-8, NUL escaped as 0x00 0xFF, then 0x00 0x00
//! ```

use super::builder::{increment_be, KeyBuilder, TEXT_ESCAPE};
use crate::schema::KeyType;
use crate::value::Value;
use crate::{Error, Result};

/// Appended after an encoded key to bound every key that extends it.
///
/// Never appears in UTF-8, so no column name can start with it.
const CONTINUATION_MAX: u8 = 0xFF;

/// The encoding of one primary-key type.
pub(crate) trait KeyEncoding {
    /// Appends the order-preserving encoding of `value`.
    fn encode(value: &Value, key: &mut KeyBuilder) -> Result<()>;

    /// Appends an exclusive upper bound for every key that starts with
    /// the encoding of `value`.
    fn encode_successor(value: &Value, key: &mut KeyBuilder) -> Result<()>;

    /// Returns the encoding of the next value in key space.
    fn successor(value: &Value) -> Result<Vec<u8>>;

    /// Returns the length of the encoded key at the front of `bytes`.
    fn encoded_len(bytes: &[u8]) -> Result<usize>;
}

/// A primary-key type whose encoding has a fixed width.
pub(crate) trait FixedWidth {
    const KEY_TYPE: KeyType;
    const WIDTH: usize;

    fn append(value: &Value, key: &mut KeyBuilder) -> Result<()>;

    /// Returns the encoding of the smallest key greater than `value`'s.
    ///
    /// For integer types that is the encoding plus one unit.
    fn next_key(value: &Value) -> Result<Vec<u8>> {
        let mut key = KeyBuilder::with_capacity(Self::WIDTH);
        Self::append(value, &mut key)?;
        let mut bytes = key.to_key();
        if !increment_be(&mut bytes) {
            return Err(exhausted(Self::KEY_TYPE, value));
        }
        Ok(bytes)
    }
}

impl<T: FixedWidth> KeyEncoding for T {
    fn encode(value: &Value, key: &mut KeyBuilder) -> Result<()> {
        T::append(value, key)
    }

    fn encode_successor(value: &Value, key: &mut KeyBuilder) -> Result<()> {
        let start = key.len();
        T::append(value, key)?;
        if !key.increment_from(start) {
            // Already the maximum in key space: bound by the continuation byte instead.
            key.append_u8(CONTINUATION_MAX);
        }
        Ok(())
    }

    fn successor(value: &Value) -> Result<Vec<u8>> {
        T::next_key(value)
    }

    fn encoded_len(bytes: &[u8]) -> Result<usize> {
        if bytes.len() < T::WIDTH {
            return Err(Error::corruption(format!(
                "{:?} key needs {} bytes, found {}",
                T::KEY_TYPE,
                T::WIDTH,
                bytes.len()
            )));
        }
        Ok(T::WIDTH)
    }
}

fn exhausted(key_type: KeyType, value: &Value) -> Error {
    Error::KeySpaceExhausted(format!("{:?} key {} has no successor", key_type, value))
}

fn mismatch(key_type: KeyType, value: &Value) -> Error {
    Error::encoding(format!(
        "{:?} primary key cannot hold a {} value",
        key_type,
        value.type_name()
    ))
}

fn reject_nan(key_type: KeyType, is_nan: bool) -> Result<()> {
    if is_nan {
        return Err(Error::encoding(format!("{:?} primary key cannot be NaN", key_type)));
    }
    Ok(())
}

pub(crate) struct IntegerKey;

impl FixedWidth for IntegerKey {
    const KEY_TYPE: KeyType = KeyType::Integer;
    const WIDTH: usize = 4;

    fn append(value: &Value, key: &mut KeyBuilder) -> Result<()> {
        match value {
            Value::Int(v) => {
                key.append_i32(*v);
                Ok(())
            }
            other => Err(mismatch(Self::KEY_TYPE, other)),
        }
    }
}

pub(crate) struct LongKey;

impl FixedWidth for LongKey {
    const KEY_TYPE: KeyType = KeyType::Long;
    const WIDTH: usize = 8;

    fn append(value: &Value, key: &mut KeyBuilder) -> Result<()> {
        match value {
            Value::Int(v) => key.append_i64(i64::from(*v)),
            Value::Long(v) => key.append_i64(*v),
            other => return Err(mismatch(Self::KEY_TYPE, other)),
        };
        Ok(())
    }
}

pub(crate) struct FloatKey;

impl FixedWidth for FloatKey {
    const KEY_TYPE: KeyType = KeyType::Float;
    const WIDTH: usize = 4;

    fn append(value: &Value, key: &mut KeyBuilder) -> Result<()> {
        key.append_f32(float_value(value)?);
        Ok(())
    }

    fn next_key(value: &Value) -> Result<Vec<u8>> {
        let v = float_value(value)?;
        if v == f32::INFINITY {
            return Err(exhausted(Self::KEY_TYPE, value));
        }
        // Zero is the only value whose neighbours straddle the sign bit.
        let next = match v.to_bits() {
            _ if v == 0.0 => f32::from_bits(1),
            bits if v > 0.0 => f32::from_bits(bits + 1),
            bits => f32::from_bits(bits - 1),
        };
        let mut key = KeyBuilder::with_capacity(Self::WIDTH);
        key.append_f32(next);
        Ok(key.to_key())
    }
}

fn float_value(value: &Value) -> Result<f32> {
    match value {
        Value::Float(v) => {
            reject_nan(KeyType::Float, v.is_nan())?;
            Ok(*v)
        }
        other => Err(mismatch(KeyType::Float, other)),
    }
}

pub(crate) struct DoubleKey;

impl FixedWidth for DoubleKey {
    const KEY_TYPE: KeyType = KeyType::Double;
    const WIDTH: usize = 8;

    fn append(value: &Value, key: &mut KeyBuilder) -> Result<()> {
        key.append_f64(double_value(value)?);
        Ok(())
    }

    fn next_key(value: &Value) -> Result<Vec<u8>> {
        let v = double_value(value)?;
        if v == f64::INFINITY {
            return Err(exhausted(Self::KEY_TYPE, value));
        }
        let next = match v.to_bits() {
            _ if v == 0.0 => f64::from_bits(1),
            bits if v > 0.0 => f64::from_bits(bits + 1),
            bits => f64::from_bits(bits - 1),
        };
        let mut key = KeyBuilder::with_capacity(Self::WIDTH);
        key.append_f64(next);
        Ok(key.to_key())
    }
}

fn double_value(value: &Value) -> Result<f64> {
    let v = match value {
        Value::Float(v) => f64::from(*v),
        Value::Double(v) => *v,
        other => return Err(mismatch(KeyType::Double, other)),
    };
    reject_nan(KeyType::Double, v.is_nan())?;
    Ok(v)
}

pub(crate) struct DateKey;

impl FixedWidth for DateKey {
    const KEY_TYPE: KeyType = KeyType::Date;
    const WIDTH: usize = 8;

    fn append(value: &Value, key: &mut KeyBuilder) -> Result<()> {
        match value {
            Value::Date(v) | Value::Long(v) => {
                key.append_i64(*v);
                Ok(())
            }
            other => Err(mismatch(Self::KEY_TYPE, other)),
        }
    }
}

fn text_value(key_type: KeyType, value: &Value) -> Result<&str> {
    let text = value.as_str().ok_or_else(|| mismatch(key_type, value))?;
    if key_type == KeyType::AsciiText && !text.is_ascii() {
        return Err(Error::encoding(format!("AsciiText primary key is not ASCII: {:?}", text)));
    }
    Ok(text)
}

/// Walks escaped text up to and including its terminator.
fn text_encoded_len(bytes: &[u8]) -> Result<usize> {
    let mut pos = 0;
    while let Some(offset) = bytes[pos..].iter().position(|&b| b == 0) {
        let nul = pos + offset;
        match bytes.get(nul + 1) {
            Some(0) => return Ok(nul + 2),
            Some(&TEXT_ESCAPE) => pos = nul + 2,
            Some(other) => {
                return Err(Error::corruption(format!(
                    "invalid byte {:#04x} after NUL in text key",
                    other
                )))
            }
            None => break,
        }
    }
    Err(Error::corruption("unterminated text key"))
}

macro_rules! text_key {
    ($name:ident, $key_type:expr) => {
        pub(crate) struct $name;

        impl KeyEncoding for $name {
            fn encode(value: &Value, key: &mut KeyBuilder) -> Result<()> {
                key.append_text(text_value($key_type, value)?);
                Ok(())
            }

            fn encode_successor(value: &Value, key: &mut KeyBuilder) -> Result<()> {
                Self::encode(value, key)?;
                key.append_u8(CONTINUATION_MAX);
                Ok(())
            }

            fn successor(_value: &Value) -> Result<Vec<u8>> {
                Err(Error::UnsupportedOperation(format!(
                    "successor of a {:?} key is only defined while building an upper bound",
                    $key_type
                )))
            }

            fn encoded_len(bytes: &[u8]) -> Result<usize> {
                text_encoded_len(bytes)
            }
        }
    };
}

text_key!(UnicodeKey, KeyType::UnicodeText);
text_key!(AsciiKey, KeyType::AsciiText);

/// Calls a [`KeyEncoding`] function on the implementation for `$key_type`.
macro_rules! dispatch {
    ($key_type:expr, $func:ident($($arg:expr),*)) => {
        match $key_type {
            KeyType::Integer => IntegerKey::$func($($arg),*),
            KeyType::Long => LongKey::$func($($arg),*),
            KeyType::Float => FloatKey::$func($($arg),*),
            KeyType::Double => DoubleKey::$func($($arg),*),
            KeyType::Date => DateKey::$func($($arg),*),
            KeyType::UnicodeText => UnicodeKey::$func($($arg),*),
            KeyType::AsciiText => AsciiKey::$func($($arg),*),
        }
    };
}

pub(crate) fn encode(key_type: KeyType, value: &Value, key: &mut KeyBuilder) -> Result<()> {
    dispatch!(key_type, encode(value, key))
}

pub(crate) fn encode_successor(
    key_type: KeyType,
    value: &Value,
    key: &mut KeyBuilder,
) -> Result<()> {
    dispatch!(key_type, encode_successor(value, key))
}

pub(crate) fn successor(key_type: KeyType, value: &Value) -> Result<Vec<u8>> {
    dispatch!(key_type, successor(value))
}

pub(crate) fn encoded_len(key_type: KeyType, bytes: &[u8]) -> Result<usize> {
    dispatch!(key_type, encoded_len(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enc(key_type: KeyType, value: impl Into<Value>) -> Vec<u8> {
        let mut key = KeyBuilder::new();
        encode(key_type, &value.into(), &mut key).unwrap();
        key.to_key()
    }

    fn upper(key_type: KeyType, value: impl Into<Value>) -> Vec<u8> {
        let mut key = KeyBuilder::new();
        encode_successor(key_type, &value.into(), &mut key).unwrap();
        key.to_key()
    }

    #[test]
    fn test_fixed_width_successor() {
        assert_eq!(successor(KeyType::Integer, &Value::Int(12)).unwrap(), enc(KeyType::Integer, 13));
        assert_eq!(successor(KeyType::Long, &Value::Long(-1)).unwrap(), enc(KeyType::Long, 0i64));
        assert_eq!(
            successor(KeyType::Date, &Value::date(999)).unwrap(),
            enc(KeyType::Date, Value::date(1000))
        );
        assert_eq!(
            successor(KeyType::Double, &Value::Double(1.0)).unwrap(),
            enc(KeyType::Double, f64::from_bits(1.0f64.to_bits() + 1))
        );
    }

    #[test]
    fn test_successor_at_maximum() {
        assert!(matches!(
            successor(KeyType::Integer, &Value::Int(i32::MAX)),
            Err(Error::KeySpaceExhausted(_))
        ));
        assert!(matches!(
            successor(KeyType::Long, &Value::Long(i64::MAX)),
            Err(Error::KeySpaceExhausted(_))
        ));

        // Bound building never fails: it falls back to the continuation byte.
        let bound = upper(KeyType::Integer, i32::MAX);
        assert_eq!(bound, vec![0xFF, 0xFF, 0xFF, 0xFF, CONTINUATION_MAX]);
        assert!(enc(KeyType::Integer, i32::MAX) < bound);
    }

    #[test]
    fn test_float_successor_at_edges() {
        assert!(matches!(
            successor(KeyType::Float, &Value::Float(f32::INFINITY)),
            Err(Error::KeySpaceExhausted(_))
        ));
        assert!(matches!(
            successor(KeyType::Double, &Value::Double(f64::INFINITY)),
            Err(Error::KeySpaceExhausted(_))
        ));

        assert_eq!(
            successor(KeyType::Float, &Value::Float(f32::MAX)).unwrap(),
            enc(KeyType::Float, f32::INFINITY)
        );
        assert_eq!(
            successor(KeyType::Float, &Value::Float(f32::NEG_INFINITY)).unwrap(),
            enc(KeyType::Float, f32::MIN)
        );

        // The value after the largest negative subnormal is zero, which encodes as +0.0.
        let below_zero = -f32::from_bits(1);
        assert_eq!(
            successor(KeyType::Float, &Value::Float(below_zero)).unwrap(),
            enc(KeyType::Float, 0.0f32)
        );
        assert_eq!(
            successor(KeyType::Double, &Value::Double(-f64::from_bits(1))).unwrap(),
            enc(KeyType::Double, 0.0f64)
        );

        for zero in [0.0f32, -0.0] {
            assert_eq!(
                successor(KeyType::Float, &Value::Float(zero)).unwrap(),
                enc(KeyType::Float, f32::from_bits(1))
            );
        }
        assert_eq!(
            successor(KeyType::Float, &Value::Float(-1.0)).unwrap(),
            enc(KeyType::Float, f32::from_bits((-1.0f32).to_bits() - 1))
        );
    }

    #[test]
    fn test_text_successor_is_unsupported() {
        for key_type in [KeyType::UnicodeText, KeyType::AsciiText] {
            assert!(matches!(
                successor(key_type, &Value::from("abc")),
                Err(Error::UnsupportedOperation(_))
            ));
        }
    }

    #[test]
    fn test_text_upper_bound() {
        let key = enc(KeyType::UnicodeText, "ab");
        let bound = upper(KeyType::UnicodeText, "ab");
        let mut expected = key.clone();
        expected.push(CONTINUATION_MAX);
        assert_eq!(bound, expected);

        // "abc" extends "ab" as text but not as an encoded key.
        let longer = enc(KeyType::UnicodeText, "abc");
        assert!(longer > bound);
    }

    #[test]
    fn test_type_mismatch_and_nan() {
        let mut key = KeyBuilder::new();
        assert!(matches!(
            encode(KeyType::Integer, &Value::Long(1), &mut key),
            Err(Error::Encoding(_))
        ));
        assert!(matches!(
            encode(KeyType::UnicodeText, &Value::Int(1), &mut key),
            Err(Error::Encoding(_))
        ));
        assert!(matches!(
            encode(KeyType::Float, &Value::Float(f32::NAN), &mut key),
            Err(Error::Encoding(_))
        ));
        assert!(matches!(
            encode(KeyType::AsciiText, &Value::from("naïve"), &mut key),
            Err(Error::Encoding(_))
        ));
    }

    #[test]
    fn test_widening_coercions() {
        assert_eq!(enc(KeyType::Long, 5i32), enc(KeyType::Long, 5i64));
        assert_eq!(enc(KeyType::Double, 0.5f32), enc(KeyType::Double, 0.5f64));
        assert_eq!(enc(KeyType::Date, 77i64), enc(KeyType::Date, Value::date(77)));
    }

    #[test]
    fn test_encoded_len() {
        let mut bytes = enc(KeyType::UnicodeText, "a\0b");
        let text_len = bytes.len();
        bytes.extend_from_slice(b"Name\0");
        assert_eq!(encoded_len(KeyType::UnicodeText, &bytes).unwrap(), text_len);

        assert_eq!(encoded_len(KeyType::Long, &[0; 12]).unwrap(), 8);
        assert!(matches!(encoded_len(KeyType::Long, &[0; 3]), Err(Error::Corruption(_))));
        assert!(matches!(encoded_len(KeyType::AsciiText, b"abc\0"), Err(Error::Corruption(_))));
        assert!(matches!(encoded_len(KeyType::AsciiText, b"a\0\x01"), Err(Error::Corruption(_))));
    }
}
