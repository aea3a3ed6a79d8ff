//! Prefix integer encoding and decoding.
//!
//! Implements the variable-length integer encoding defined in RFC 7541 Section 5.1,
//! used for every index, length and prefix field in QPACK.
//!
//! ## Format
//!
//! An integer is represented in two parts:
//! - A prefix that fills the low N bits of a byte (1 ≤ N ≤ 8)
//! - Optional continuation bytes if the value doesn't fit in the prefix
//!
//! If I < 2^N - 1, the integer is encoded in the N-bit prefix.
//! Otherwise, the prefix bits are all set to 1, and `I - (2^N - 1)` is
//! written in 7-bit groups, least significant first, with the high bit set
//! on every byte but the last.

use bytes::{BufMut, BytesMut};

use crate::error::{Error, Result};

#[inline]
fn prefix_max(prefix_bits: u8) -> u64 {
    debug_assert!((1..=8).contains(&prefix_bits), "prefix_bits must be 1-8");
    (1u64 << prefix_bits) - 1
}

/// Appends `value` encoded with an N-bit prefix to `buf`.
///
/// The bits of the first byte above the prefix are written as zero; callers
/// OR their representation flags into that byte afterwards.
///
/// # Example
///
/// ```
/// use bytes::BytesMut;
/// use qpack_static::integer::{decode, encode};
///
/// let mut buf = BytesMut::new();
/// encode(1337, 5, &mut buf);
/// assert_eq!(&buf[..], &[0x1f, 0x9a, 0x0a]);
/// assert_eq!(decode(5, &buf).unwrap(), (1337, 3));
/// ```
pub fn encode(value: u64, prefix_bits: u8, buf: &mut BytesMut) {
    let max_prefix = prefix_max(prefix_bits);

    if value < max_prefix {
        buf.put_u8(value as u8);
        return;
    }

    buf.put_u8(max_prefix as u8);
    let mut remaining = value - max_prefix;
    while remaining >= 0x80 {
        buf.put_u8(0x80 | (remaining & 0x7f) as u8);
        remaining >>= 7;
    }
    buf.put_u8(remaining as u8);
}

/// Returns the number of bytes [`encode`] produces for `value`.
pub fn encoded_len(value: u64, prefix_bits: u8) -> usize {
    let max_prefix = prefix_max(prefix_bits);
    if value < max_prefix {
        return 1;
    }
    let mut remaining = value - max_prefix;
    let mut len = 2;
    while remaining >= 0x80 {
        remaining >>= 7;
        len += 1;
    }
    len
}

/// Decodes an integer with an N-bit prefix from the start of `data`.
///
/// Returns the value and the number of bytes consumed. Bits of the first
/// byte above the prefix are ignored.
///
/// # Errors
///
/// * [`Error::Incomplete`] if `data` ends before the terminating byte.
/// * [`Error::IntegerOverflow`] if the value does not fit in a `u64`.
pub fn decode(prefix_bits: u8, data: &[u8]) -> Result<(u64, usize)> {
    let Some(&first) = data.first() else {
        return Err(Error::Incomplete(1));
    };

    let max_prefix = prefix_max(prefix_bits);
    let mut value = first as u64 & max_prefix;
    if value < max_prefix {
        return Ok((value, 1));
    }

    let mut pos = 1;
    let mut shift = 0u32;
    loop {
        let Some(&byte) = data.get(pos) else {
            return Err(Error::Incomplete(1));
        };
        pos += 1;

        if shift > 63 {
            return Err(Error::IntegerOverflow);
        }
        let group = (byte & 0x7f) as u64;
        if group > (u64::MAX >> shift) {
            return Err(Error::IntegerOverflow);
        }
        value = value
            .checked_add(group << shift)
            .ok_or(Error::IntegerOverflow)?;

        if byte & 0x80 == 0 {
            return Ok((value, pos));
        }
        shift += 7;
    }
}
