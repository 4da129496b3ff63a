//! Wire primitives: little-endian fixed-width fields, LEB128 varints and
//! zigzag mapping for signed values.
//!
//! Writers append to a `Vec<u8>`; `WireReader` reads from a borrowed slice
//! and reports `Truncated` instead of reading past its end.

use crate::utils::error::CodecError;

/// Longest LEB128 encoding of a u32
pub const MAX_VARINT32_LEN: usize = 5;
/// Longest LEB128 encoding of a u64
pub const MAX_VARINT64_LEN: usize = 10;

#[inline]
pub fn zigzag_encode32(v: i32) -> u32 {
    ((v << 1) ^ (v >> 31)) as u32
}

#[inline]
pub fn zigzag_decode32(v: u32) -> i32 {
    ((v >> 1) as i32) ^ -((v & 1) as i32)
}

#[inline]
pub fn zigzag_encode64(v: i64) -> u64 {
    ((v << 1) ^ (v >> 63)) as u64
}

#[inline]
pub fn zigzag_decode64(v: u64) -> i64 {
    ((v >> 1) as i64) ^ -((v & 1) as i64)
}

pub fn put_u8(buf: &mut Vec<u8>, v: u8) {
    buf.push(v);
}

pub fn put_u64(buf: &mut Vec<u8>, v: u64) {
    buf.extend_from_slice(&v.to_le_bytes());
}

pub fn put_i64(buf: &mut Vec<u8>, v: i64) {
    buf.extend_from_slice(&v.to_le_bytes());
}

pub fn put_uvarint(buf: &mut Vec<u8>, mut v: u64) {
    while v >= 0x80 {
        buf.push((v as u8) | 0x80);
        v >>= 7;
    }
    buf.push(v as u8);
}

pub fn put_varint32(buf: &mut Vec<u8>, v: i32) {
    put_uvarint(buf, u64::from(zigzag_encode32(v)));
}

pub fn put_varint64(buf: &mut Vec<u8>, v: i64) {
    put_uvarint(buf, zigzag_encode64(v));
}

/// Length-prefixed raw bytes
pub fn put_string(buf: &mut Vec<u8>, s: &str) {
    put_uvarint(buf, s.len() as u64);
    buf.extend_from_slice(s.as_bytes());
}

/// Bounds-checked cursor over one decoding window
#[derive(Debug)]
pub struct WireReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> WireReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Bytes consumed so far
    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn take(&mut self, n: usize, context: &'static str) -> Result<&'a [u8], CodecError> {
        if self.remaining() < n {
            return Err(CodecError::Truncated {
                context,
                needed: n,
                available: self.remaining(),
            });
        }
        let bytes = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(bytes)
    }

    fn array<const N: usize>(&mut self, context: &'static str) -> Result<[u8; N], CodecError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N, context)?);
        Ok(out)
    }

    pub fn u8(&mut self, context: &'static str) -> Result<u8, CodecError> {
        Ok(self.take(1, context)?[0])
    }

    pub fn u64(&mut self, context: &'static str) -> Result<u64, CodecError> {
        Ok(u64::from_le_bytes(self.array(context)?))
    }

    pub fn i64(&mut self, context: &'static str) -> Result<i64, CodecError> {
        Ok(i64::from_le_bytes(self.array(context)?))
    }

    fn uvarint(&mut self, max_len: usize, bits: u32, context: &'static str) -> Result<u64, CodecError> {
        let mut value = 0u64;
        for i in 0..max_len {
            let byte = self.u8(context)?;
            let shift = 7 * i as u32;
            let payload = u64::from(byte & 0x7f);
            // Final byte may only carry the bits the type has left.
            if i == max_len - 1 && (byte & 0x80 != 0 || payload >> (bits - shift) != 0) {
                return Err(CodecError::InvalidVarint { context });
            }
            value |= payload << shift;
            if byte & 0x80 == 0 {
                return Ok(value);
            }
        }
        Err(CodecError::InvalidVarint { context })
    }

    pub fn uvarint64(&mut self, context: &'static str) -> Result<u64, CodecError> {
        self.uvarint(MAX_VARINT64_LEN, 64, context)
    }

    pub fn uvarint32(&mut self, context: &'static str) -> Result<u32, CodecError> {
        // Bounded to 32 bits by the final-byte check.
        Ok(self.uvarint(MAX_VARINT32_LEN, 32, context)? as u32)
    }

    pub fn varint32(&mut self, context: &'static str) -> Result<i32, CodecError> {
        Ok(zigzag_decode32(self.uvarint32(context)?))
    }

    pub fn varint64(&mut self, context: &'static str) -> Result<i64, CodecError> {
        Ok(zigzag_decode64(self.uvarint64(context)?))
    }

    /// Read an element count and check that `count * min_elem_size` bytes
    /// can still follow
    pub fn length(&mut self, min_elem_size: usize, context: &'static str) -> Result<usize, CodecError> {
        let length = self.uvarint64(context)?;
        let remaining = self.remaining();
        let fits = usize::try_from(length)
            .ok()
            .and_then(|n| n.checked_mul(min_elem_size))
            .is_some_and(|bytes| bytes <= remaining);
        if !fits {
            return Err(CodecError::LengthOverflow {
                context,
                length,
                remaining,
            });
        }
        Ok(length as usize)
    }

    pub fn string(&mut self, context: &'static str) -> Result<String, CodecError> {
        let len = self.length(1, context)?;
        let bytes = self.take(len, context)?;
        std::str::from_utf8(bytes)
            .map(str::to_owned)
            .map_err(|_| CodecError::InvalidUtf8 { context })
    }
}

impl CodecError {
    /// Errors that may disappear once more input is visible
    pub(crate) fn is_incomplete(&self) -> bool {
        matches!(
            self,
            CodecError::Truncated { .. } | CodecError::LengthOverflow { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip_u64(v: u64) -> u64 {
        let mut buf = Vec::new();
        put_uvarint(&mut buf, v);
        let mut r = WireReader::new(&buf);
        let out = r.uvarint64("test").unwrap();
        assert_eq!(r.remaining(), 0);
        out
    }

    #[test]
    fn test_zigzag_small_values_stay_small() {
        assert_eq!(zigzag_encode32(0), 0);
        assert_eq!(zigzag_encode32(-1), 1);
        assert_eq!(zigzag_encode32(1), 2);
        assert_eq!(zigzag_encode32(-2), 3);
        assert_eq!(zigzag_encode64(-1), 1);

        let mut buf = Vec::new();
        put_varint64(&mut buf, -1);
        assert_eq!(buf, vec![1]);
    }

    #[test]
    fn test_boundary_values_round_trip() {
        for v in [0, 1, 0x7f, 0x80, u64::from(u32::MAX), u64::MAX - 1, u64::MAX] {
            assert_eq!(round_trip_u64(v), v);
        }
        for v in [i32::MIN, i32::MIN + 1, -1, 0, 1, i32::MAX - 1, i32::MAX] {
            let mut buf = Vec::new();
            put_varint32(&mut buf, v);
            assert!(buf.len() <= MAX_VARINT32_LEN);
            assert_eq!(WireReader::new(&buf).varint32("test").unwrap(), v);
        }
        for v in [i64::MIN, i64::MIN + 1, -1, 0, 1, i64::MAX - 1, i64::MAX] {
            let mut buf = Vec::new();
            put_varint64(&mut buf, v);
            assert!(buf.len() <= MAX_VARINT64_LEN);
            assert_eq!(WireReader::new(&buf).varint64("test").unwrap(), v);
        }
        let mut buf = Vec::new();
        put_uvarint(&mut buf, u64::from(u32::MAX));
        assert_eq!(WireReader::new(&buf).uvarint32("test").unwrap(), u32::MAX);
    }

    #[test]
    fn test_overlong_varints_rejected() {
        // 33 significant bits in a 32-bit field
        let buf = [0xff, 0xff, 0xff, 0xff, 0x1f];
        assert!(matches!(
            WireReader::new(&buf).uvarint32("p"),
            Err(CodecError::InvalidVarint { .. })
        ));
        // continuation bit on the 10th byte
        let buf = [0x80u8; 11];
        assert!(matches!(
            WireReader::new(&buf).uvarint64("link"),
            Err(CodecError::InvalidVarint { .. })
        ));
    }

    #[test]
    fn test_truncated_varint() {
        let buf = [0x80, 0x80];
        let err = WireReader::new(&buf).uvarint64("off").unwrap_err();
        assert!(err.is_incomplete());
    }

    #[test]
    fn test_fixed_width_truncation() {
        let buf = [1, 2, 3];
        let err = WireReader::new(&buf).u64("ts").unwrap_err();
        assert!(matches!(err, CodecError::Truncated { needed: 8, available: 3, .. }));
    }

    #[test]
    fn test_string_length_beyond_buffer() {
        let mut buf = Vec::new();
        put_uvarint(&mut buf, 10);
        buf.extend_from_slice(b"abc");
        assert!(matches!(
            WireReader::new(&buf).string("fn"),
            Err(CodecError::LengthOverflow { length: 10, remaining: 3, .. })
        ));
    }

    #[test]
    fn test_string_rejects_invalid_utf8() {
        let buf = [2, 0xff, 0xfe];
        assert!(matches!(
            WireReader::new(&buf).string("file"),
            Err(CodecError::InvalidUtf8 { .. })
        ));
    }

    #[test]
    fn test_little_endian_layout() {
        let mut buf = Vec::new();
        put_u64(&mut buf, 0x0102_0304_0506_0708);
        assert_eq!(buf, vec![8, 7, 6, 5, 4, 3, 2, 1]);
        put_i64(&mut buf, -2);
        let mut r = WireReader::new(&buf);
        assert_eq!(r.u64("a").unwrap(), 0x0102_0304_0506_0708);
        assert_eq!(r.i64("b").unwrap(), -2);
    }
}
