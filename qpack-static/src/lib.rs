//! QPACK: Header Compression for HTTP/3 (RFC 9204), static table only.
//!
//! This crate encodes header lists into QPACK header blocks and decodes them
//! back, using only the 99-entry static table. It never inserts into or
//! references a dynamic table and rejects peers that do, so no encoder or
//! decoder stream is needed.
//!
//! # Features
//!
//! - **Streaming decoder**: accepts a header block in chunks of any size,
//!   down to one byte at a time, and emits each field as soon as it is complete.
//! - **Whole-buffer decoder**: decodes a complete block into a list, or
//!   iterates over its fields.
//! - **Huffman input**: string literals compressed by peers are decoded;
//!   this encoder always writes raw literals.
//! - **Bounded**: an optional field section size limit caps what a
//!   malicious block can make the decoder buffer.
//!
//! # Example
//!
//! ```rust
//! use qpack_static::{Decoder, Encoder, HeaderField};
//!
//! let headers = vec![
//!     HeaderField::from((":method", "GET")),
//!     HeaderField::from((":path", "/index.html")),
//!     HeaderField::from(("x-request-id", "42")),
//! ];
//!
//! let mut encoder = Encoder::new(Vec::new());
//! encoder.write_fields(&headers).unwrap();
//! encoder.close();
//! let encoded = encoder.into_inner();
//!
//! // Whole buffer
//! let decoder = Decoder::new();
//! assert_eq!(decoder.decode_full(&encoded).unwrap(), headers);
//!
//! // Streaming, one byte at a time
//! let mut decoder = Decoder::new();
//! let mut decoded = Vec::new();
//! for byte in &encoded {
//!     decoder.write(&[*byte], &mut decoded).unwrap();
//! }
//! decoder.close().unwrap();
//! assert_eq!(decoded, headers);
//! ```

pub mod config;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod field;
pub mod huffman;
pub mod integer;
pub mod static_table;

// Re-export main types
pub use config::QpackConfig;
pub use decoder::{Decoder, FieldLines, FieldSink};
pub use encoder::{encode_field_section, Encoder};
pub use error::{Error, Result};
pub use field::HeaderField;
