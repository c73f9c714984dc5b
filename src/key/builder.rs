//! A reusable buffer for building composite keys.

use bytes::{BufMut, BytesMut};

const SIGN_BIT_32: u32 = 1 << 31;
const SIGN_BIT_64: u64 = 1 << 63;

/// Escape byte that follows a NUL inside encoded text.
pub(crate) const TEXT_ESCAPE: u8 = 0xFF;

/// Builds composite keys from order-preserving components.
///
/// A builder is owned by exactly one operation at a time. The row store
/// allocates a fresh one per call, so no buffer is ever shared between
/// concurrent callers.
///
/// ```
/// use sparsedb::KeyBuilder;
///
/// let mut a = KeyBuilder::new();
/// a.append_i32(-1);
/// let mut b = KeyBuilder::new();
/// b.append_i32(1);
/// assert!(a.as_slice() < b.as_slice());
/// ```
#[derive(Debug, Default)]
pub struct KeyBuilder {
    buf: BytesMut,
}

impl KeyBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self { buf: BytesMut::new() }
    }

    /// Creates an empty builder with room for `capacity` bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self { buf: BytesMut::with_capacity(capacity) }
    }

    /// Clears the buffer, keeping its allocation.
    pub fn reset(&mut self) -> &mut Self {
        self.buf.clear();
        self
    }

    /// Returns the number of bytes built so far.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Returns true if nothing has been appended.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Shortens the key to `len` bytes.
    pub fn truncate(&mut self, len: usize) {
        self.buf.truncate(len);
    }

    /// Appends raw bytes.
    pub fn append(&mut self, bytes: &[u8]) -> &mut Self {
        self.buf.put_slice(bytes);
        self
    }

    /// Appends a single byte.
    pub fn append_u8(&mut self, byte: u8) -> &mut Self {
        self.buf.put_u8(byte);
        self
    }

    /// Appends a NUL byte.
    pub fn append_nul(&mut self) -> &mut Self {
        self.append_u8(0)
    }

    /// Appends a signed 32-bit integer, sign-flipped big-endian.
    pub fn append_i32(&mut self, v: i32) -> &mut Self {
        self.buf.put_u32((v as u32) ^ SIGN_BIT_32);
        self
    }

    /// Appends a signed 64-bit integer, sign-flipped big-endian.
    pub fn append_i64(&mut self, v: i64) -> &mut Self {
        self.buf.put_u64((v as u64) ^ SIGN_BIT_64);
        self
    }

    /// Appends a 32-bit float so that byte order matches numeric order.
    ///
    /// `-0.0` is written as `+0.0`. NaN must be rejected by the caller.
    pub fn append_f32(&mut self, v: f32) -> &mut Self {
        let v = if v == 0.0 { 0.0 } else { v };
        let bits = v.to_bits();
        let sortable = if bits & SIGN_BIT_32 != 0 { !bits } else { bits | SIGN_BIT_32 };
        self.buf.put_u32(sortable);
        self
    }

    /// Appends a 64-bit float so that byte order matches numeric order.
    ///
    /// `-0.0` is written as `+0.0`. NaN must be rejected by the caller.
    pub fn append_f64(&mut self, v: f64) -> &mut Self {
        let v = if v == 0.0 { 0.0 } else { v };
        let bits = v.to_bits();
        let sortable = if bits & SIGN_BIT_64 != 0 { !bits } else { bits | SIGN_BIT_64 };
        self.buf.put_u64(sortable);
        self
    }

    /// Appends text as escaped UTF-8 followed by a `0x00 0x00` terminator.
    ///
    /// Each NUL inside the text becomes `0x00 0xFF`. The result is prefix-free
    /// and orders exactly like the text's code points.
    pub fn append_text(&mut self, text: &str) -> &mut Self {
        for &b in text.as_bytes() {
            self.buf.put_u8(b);
            if b == 0 {
                self.buf.put_u8(TEXT_ESCAPE);
            }
        }
        self.buf.put_slice(&[0, 0]);
        self
    }

    /// Increments the bytes from `start` to the end as one big-endian
    /// unsigned integer.
    ///
    /// Returns false, leaving the bytes unchanged, if they are all `0xFF`.
    pub(crate) fn increment_from(&mut self, start: usize) -> bool {
        increment_be(&mut self.buf[start..])
    }

    /// Returns the key built so far.
    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    /// Copies the key built so far.
    pub fn to_key(&self) -> Vec<u8> {
        self.buf.to_vec()
    }
}

/// Increments `bytes` as a big-endian unsigned integer.
///
/// Returns false and leaves `bytes` unchanged on overflow.
pub(crate) fn increment_be(bytes: &mut [u8]) -> bool {
    match bytes.iter().rposition(|&b| b != 0xFF) {
        Some(pos) => {
            bytes[pos] += 1;
            for b in &mut bytes[pos + 1..] {
                *b = 0;
            }
            true
        }
        None => false,
    }
}
