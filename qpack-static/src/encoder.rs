//! QPACK encoder that only references the static table.
//!
//! Each field gets the most compact representation available without a
//! dynamic table:
//!
//! 1. Indexed field line, when the static table holds the exact pair.
//! 2. Literal field line with a static name reference, when only the name
//!    is known.
//! 3. Literal field line with a literal name otherwise.
//!
//! String literals are always written raw. The decoder still accepts
//! Huffman-coded input from peers.

use std::io::{self, Write};

use bytes::{BufMut, Bytes, BytesMut};

use crate::{config::QpackConfig, field::HeaderField, integer, static_table};

/// QPACK encoder writing header blocks to `W`.
///
/// The block prefix is written together with the first field of every
/// block; [`close`](Encoder::close) ends the block.
#[derive(Debug)]
pub struct Encoder<W> {
    writer: W,
    /// Scratch buffer, cleared after every field.
    buf: BytesMut,
    wrote_prefix: bool,
}

impl<W: Write> Encoder<W> {
    /// Creates an encoder with the default configuration.
    pub fn new(writer: W) -> Self {
        Self::with_config(writer, &QpackConfig::default())
    }

    /// Creates an encoder with the given configuration.
    pub fn with_config(writer: W, config: &QpackConfig) -> Self {
        Self {
            writer,
            buf: BytesMut::with_capacity(config.encoder_buffer_capacity),
            wrote_prefix: false,
        }
    }

    /// Encodes `field` and flushes it with a single `write_all` call.
    ///
    /// The first field of a block is preceded by the block prefix. One
    /// `write_all` per field, not one `write`: a writer that accepts short
    /// writes sees as many `write` calls as it needs to take the field.
    ///
    /// # Errors
    ///
    /// Returns the writer's error unchanged. The block prefix stays pending,
    /// but bytes the writer accepted before failing are not taken back.
    pub fn write_field(&mut self, field: &HeaderField) -> io::Result<()> {
        if !self.wrote_prefix {
            write_prefix(&mut self.buf);
        }
        encode_field(field, &mut self.buf);

        let result = self.writer.write_all(&self.buf);
        self.buf.clear();
        if result.is_ok() {
            self.wrote_prefix = true;
        }
        result
    }

    /// Encodes every field in `fields`, stopping at the first write error.
    pub fn write_fields<'a, I>(&mut self, fields: I) -> io::Result<()>
    where
        I: IntoIterator<Item = &'a HeaderField>,
    {
        fields
            .into_iter()
            .try_for_each(|field| self.write_field(field))
    }

    /// Ends the current header block; the next field starts a new one.
    pub fn close(&mut self) {
        self.wrote_prefix = false;
    }

    /// Returns a reference to the underlying writer.
    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    /// Consumes the encoder, returning the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// Encodes `fields` as one complete header block.
///
/// An empty list still produces the two-byte block prefix.
pub fn encode_field_section(fields: &[HeaderField]) -> Bytes {
    let mut buf = BytesMut::new();
    write_prefix(&mut buf);
    for field in fields {
        encode_field(field, &mut buf);
    }
    buf.freeze()
}

/// Required Insert Count = 0, Base = 0.
fn write_prefix(buf: &mut BytesMut) {
    integer::encode(0, 8, buf);
    integer::encode(0, 7, buf);
}

/// Appends the most compact static-only representation of `field`.
fn encode_field(field: &HeaderField, buf: &mut BytesMut) {
    match static_table::name_entry(&field.name) {
        Some(entry) if entry.is_name_only() && field.value.is_empty() => {
            write_indexed(entry.default_index, buf);
        }
        Some(entry) => match entry.values.get(&field.value[..]) {
            Some(&index) => write_indexed(index, buf),
            None => write_literal_with_name_ref(entry.default_index, &field.value, buf),
        },
        None => write_literal(&field.name, &field.value, buf),
    }
}

/// Indexed field line: 1T + index (6+), T = 1.
fn write_indexed(index: usize, buf: &mut BytesMut) {
    let start = buf.len();
    integer::encode(index as u64, 6, buf);
    buf[start] |= 0xc0;
}

/// Literal field line with name reference: 01NT + index (4+), N = 0, T = 1.
fn write_literal_with_name_ref(index: usize, value: &[u8], buf: &mut BytesMut) {
    let start = buf.len();
    integer::encode(index as u64, 4, buf);
    buf[start] |= 0x50;
    write_string(value, 7, buf);
}

/// Literal field line with literal name: 001NH + name length (3+), N = 0, H = 0.
fn write_literal(name: &[u8], value: &[u8], buf: &mut BytesMut) {
    let start = buf.len();
    write_string(name, 3, buf);
    buf[start] |= 0x20;
    write_string(value, 7, buf);
}

/// Raw string literal; the Huffman bit above the prefix stays clear.
fn write_string(text: &[u8], prefix_bits: u8, buf: &mut BytesMut) {
    integer::encode(text.len() as u64, prefix_bits, buf);
    buf.put_slice(text);
}
