//! Error types for QPACK operations.
//!
//! Every fatal condition maps to the HTTP/3 error code
//! `QPACK_DECOMPRESSION_FAILED` (RFC 9204 Section 6). The single
//! non-fatal condition is [`Error::Incomplete`], which only the streaming
//! decoder ever surfaces internally: it means "feed more bytes".

use thiserror::Error;

/// Result type for QPACK operations.
pub type Result<T> = std::result::Result<T, Error>;

/// HTTP/3 error code for a failed field section decode.
pub const QPACK_DECOMPRESSION_FAILED: u64 = 0x0200;

/// Errors that can occur while decoding a header block.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The block prefix announced dynamic table insertions.
    #[error("decoding error: expected Required Insert Count to be zero")]
    RequiredInsertCountNotZero,

    /// The block prefix carried a non-zero Base.
    #[error("decoding error: expected Base to be zero")]
    BaseNotZero,

    /// A field line started with a bit pattern this decoder does not handle.
    #[error("unexpected type byte: {0:#x}")]
    UnexpectedTypeByte(u8),

    /// A field line referenced the dynamic table.
    #[error("no dynamic table")]
    NoDynamicTable,

    /// A static table reference was out of range.
    #[error("decoding error: invalid indexed representation index {0}")]
    InvalidIndex(u64),

    /// The buffer ended in the middle of a field line.
    #[error("decoding error: truncated headers")]
    TruncatedHeaders,

    /// A Huffman-coded string literal was malformed.
    #[error("huffman decoding error: {0}")]
    Huffman(String),

    /// A prefixed integer does not fit in 64 bits.
    #[error("integer overflow")]
    IntegerOverflow,

    /// The decoded field section exceeds the configured limit.
    #[error("field section exceeds {limit} bytes")]
    FieldSectionTooLarge { limit: u64 },

    /// Incomplete data - need more bytes.
    #[error("incomplete data: need {0} more bytes")]
    Incomplete(usize),
}

impl Error {
    /// Returns the HTTP/3 error code for this error.
    pub fn error_code(&self) -> u64 {
        QPACK_DECOMPRESSION_FAILED
    }

    /// Returns true if more input may resolve this error.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::Incomplete(_))
    }

    /// Returns true for errors that invalidate the current header block.
    pub fn is_decoding_error(&self) -> bool {
        !self.is_recoverable()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            Error::RequiredInsertCountNotZero.to_string(),
            "decoding error: expected Required Insert Count to be zero"
        );
        assert_eq!(
            Error::BaseNotZero.to_string(),
            "decoding error: expected Base to be zero"
        );
        assert_eq!(
            Error::UnexpectedTypeByte(0x10).to_string(),
            "unexpected type byte: 0x10"
        );
        assert_eq!(
            Error::InvalidIndex(10000).to_string(),
            "decoding error: invalid indexed representation index 10000"
        );
        assert_eq!(
            Error::TruncatedHeaders.to_string(),
            "decoding error: truncated headers"
        );
    }

    #[test]
    fn test_incomplete_error() {
        let err = Error::Incomplete(10);
        assert!(err.is_recoverable());
        assert!(!err.is_decoding_error());
    }

    #[test]
    fn test_fatal_errors() {
        for err in [
            Error::NoDynamicTable,
            Error::InvalidIndex(99),
            Error::IntegerOverflow,
            Error::Huffman("invalid padding".into()),
        ] {
            assert!(err.is_decoding_error());
            assert_eq!(err.error_code(), 0x0200);
        }
    }
}
