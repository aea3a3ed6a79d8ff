//! Header field representation.
//!
//! Represents an HTTP header or trailer field as a name-value pair.

use bytes::Bytes;
use std::fmt;

/// Per-field overhead in field section size accounting (RFC 9114 Section 4.2.2).
pub const FIELD_OVERHEAD: u64 = 32;

/// An HTTP header field (name-value pair).
///
/// Names and values are raw bytes: the decoder hands back exactly what the
/// peer sent, whether or not it is valid UTF-8.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct HeaderField {
    pub name: Bytes,
    pub value: Bytes,
}

impl HeaderField {
    /// Creates a new header field.
    pub fn new(name: impl Into<Bytes>, value: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Returns true for pseudo-header fields such as `:method`.
    pub fn is_pseudo(&self) -> bool {
        self.name.first() == Some(&b':')
    }

    /// Returns the size of this field for field section size limits.
    ///
    /// size = name_len + value_len + 32
    pub fn size(&self) -> u64 {
        (self.name.len() + self.value.len()) as u64 + FIELD_OVERHEAD
    }
}

impl fmt::Debug for HeaderField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "HeaderField({:?}: {:?})",
            String::from_utf8_lossy(&self.name),
            String::from_utf8_lossy(&self.value)
        )
    }
}

impl From<(&'static str, &'static str)> for HeaderField {
    fn from((name, value): (&'static str, &'static str)) -> Self {
        Self::new(name, value)
    }
}

impl From<(String, String)> for HeaderField {
    fn from((name, value): (String, String)) -> Self {
        Self::new(name, value)
    }
}
