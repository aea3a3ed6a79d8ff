//! QPACK decoder for static-table-only header blocks.
//!
//! Decodes QPACK-compressed field sections per RFC 9204. Any reference to
//! the dynamic table is rejected, so a header block must open with a zero
//! Required Insert Count and a zero Base.
//!
//! Two modes share one parser:
//!
//! - Streaming: [`Decoder::write`] accepts chunks of any size, carries
//!   unconsumed bytes over to the next call and pushes each field into a
//!   [`FieldSink`] as soon as it is complete.
//! - Whole-buffer: [`Decoder::decode`] and [`Decoder::decode_full`] parse one
//!   complete block and report a block that ends mid-line as
//!   [`Error::TruncatedHeaders`]. They never touch the streaming state.

use bytes::{Buf, Bytes, BytesMut};
use tracing::{debug, trace};

use crate::{
    config::QpackConfig,
    error::{Error, Result},
    field::{HeaderField, FIELD_OVERHEAD},
    static_table::{self, StaticEntry},
    {huffman, integer},
};

/// Receives header fields from a streaming decoder, in block order.
pub trait FieldSink {
    fn on_field(&mut self, field: HeaderField);
}

impl FieldSink for Vec<HeaderField> {
    fn on_field(&mut self, field: HeaderField) {
        self.push(field);
    }
}

impl<F: FnMut(HeaderField)> FieldSink for F {
    fn on_field(&mut self, field: HeaderField) {
        self(field)
    }
}

/// Position of a streaming decoder within the current header block.
#[derive(Debug, Clone, PartialEq, Eq)]
enum State {
    RequiredInsertCount,
    Base,
    FieldLines,
    Failed(Error),
}

/// QPACK decoder.
///
/// One instance decodes one header block at a time. It is not meant to be
/// shared between streams; use one decoder per stream and call
/// [`reset`](Decoder::reset) or [`close`](Decoder::close) between blocks.
#[derive(Debug)]
pub struct Decoder {
    config: QpackConfig,
    state: State,
    /// Bytes of an unfinished prefix or field line.
    buf: BytesMut,
    /// `buf` must hold at least this many bytes before parsing is retried.
    needed: usize,
    /// Field section size emitted so far in this block.
    section_size: u64,
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder {
    /// Creates a decoder with the default configuration.
    pub fn new() -> Self {
        Self::with_config(QpackConfig::default())
    }

    /// Creates a decoder with the given configuration.
    pub fn with_config(config: QpackConfig) -> Self {
        Self {
            buf: BytesMut::with_capacity(config.decoder_buffer_capacity),
            config,
            state: State::RequiredInsertCount,
            needed: 0,
            section_size: 0,
        }
    }

    /// Returns the decoder configuration.
    pub fn config(&self) -> &QpackConfig {
        &self.config
    }

    /// Returns the number of bytes held back for an unfinished field line.
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    /// Feeds the next chunk of the current header block.
    ///
    /// Every field completed by this chunk is passed to `sink` before the
    /// call returns. Incomplete trailing data is kept for the next call and
    /// is never an error. Returns the number of bytes accepted, which is
    /// always `chunk.len()` on success.
    ///
    /// # Errors
    ///
    /// Any decoding error aborts the block: the rest of the chunk is
    /// dropped and every later call returns the same error until
    /// [`reset`](Decoder::reset).
    pub fn write<S>(&mut self, chunk: &[u8], sink: &mut S) -> Result<usize>
    where
        S: FieldSink + ?Sized,
    {
        if let State::Failed(err) = &self.state {
            return Err(err.clone());
        }

        let result = if self.buf.is_empty() {
            // Fast path: parse straight from the caller's chunk.
            let (consumed, result) = self.process(chunk, sink);
            if result.is_ok() {
                self.buf.extend_from_slice(&chunk[consumed..]);
            }
            result
        } else {
            self.buf.extend_from_slice(chunk);
            if self.buf.len() < self.needed {
                return Ok(chunk.len());
            }
            let mut buf = std::mem::take(&mut self.buf);
            let (consumed, result) = self.process(&buf, sink);
            buf.advance(consumed);
            self.buf = buf;
            result
        };

        match result {
            Ok(()) => Ok(chunk.len()),
            Err(err) => {
                debug!(error = %err, "header block decoding failed");
                self.buf.clear();
                self.needed = 0;
                self.state = State::Failed(err.clone());
                Err(err)
            }
        }
    }

    /// Feeds a chunk and returns the fields it completed.
    pub fn feed(&mut self, chunk: &[u8]) -> Result<Vec<HeaderField>> {
        let mut fields = Vec::new();
        self.write(chunk, &mut fields)?;
        Ok(fields)
    }

    /// Ends the current header block and prepares for the next one.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TruncatedHeaders`] if the block stopped inside the
    /// prefix or a field line, or the error that failed the block.
    pub fn close(&mut self) -> Result<()> {
        let result = match &self.state {
            State::Failed(err) => Err(err.clone()),
            _ if !self.buf.is_empty() => Err(Error::TruncatedHeaders),
            State::Base => Err(Error::TruncatedHeaders),
            _ => Ok(()),
        };
        self.reset();
        result
    }

    /// Discards all state of the current header block.
    pub fn reset(&mut self) {
        self.state = State::RequiredInsertCount;
        self.buf.clear();
        self.needed = 0;
        self.section_size = 0;
    }

    /// Returns an iterator over the fields of one complete header block.
    ///
    /// An empty buffer yields nothing. A buffer ending mid-line yields
    /// [`Error::TruncatedHeaders`]. Iteration stops after the first error.
    pub fn decode<'a>(&self, data: &'a [u8]) -> FieldLines<'a> {
        FieldLines {
            data,
            limit: self.config.section_limit(),
            section_size: 0,
            prefix_done: false,
            done: false,
        }
    }

    /// Decodes one complete header block.
    pub fn decode_full(&self, data: &[u8]) -> Result<Vec<HeaderField>> {
        self.decode(data).collect()
    }

    /// Runs the state machine over `data`.
    ///
    /// Returns the bytes consumed, which always end on a prefix or field
    /// line boundary, and whether a fatal error stopped parsing.
    fn process<S>(&mut self, data: &[u8], sink: &mut S) -> (usize, Result<()>)
    where
        S: FieldSink + ?Sized,
    {
        let limit = self.config.section_limit();
        let mut pos = 0;

        while pos < data.len() {
            let rest = &data[pos..];
            let step = match self.state {
                State::RequiredInsertCount => parse_required_insert_count(rest).map(|n| (None, n)),
                State::Base => parse_base(rest).map(|n| (None, n)),
                State::FieldLines => {
                    let budget = Budget {
                        limit,
                        used: self.section_size,
                    };
                    parse_field_line(rest, budget).map(|(f, n)| (Some(f), n))
                }
                State::Failed(ref err) => Err(err.clone()),
            };

            match step {
                Ok((field, consumed)) => {
                    pos += consumed;
                    match field {
                        None if self.state == State::RequiredInsertCount => {
                            self.state = State::Base;
                        }
                        None => {
                            trace!("header block prefix validated");
                            self.state = State::FieldLines;
                        }
                        Some(field) => {
                            if let Err(err) = account(&mut self.section_size, &field, limit) {
                                return (pos, Err(err));
                            }
                            trace!(?field, "decoded field");
                            sink.on_field(field);
                        }
                    }
                }
                Err(Error::Incomplete(more)) => {
                    self.needed = rest.len().saturating_add(more);
                    return (pos, Ok(()));
                }
                Err(err) => return (pos, Err(err)),
            }
        }

        self.needed = 0;
        (pos, Ok(()))
    }
}

/// Iterator over the fields of a complete header block.
///
/// Created by [`Decoder::decode`].
#[derive(Debug)]
pub struct FieldLines<'a> {
    data: &'a [u8],
    limit: Option<u64>,
    section_size: u64,
    prefix_done: bool,
    done: bool,
}

impl FieldLines<'_> {
    fn next_field(&mut self) -> Result<Option<HeaderField>> {
        if !self.prefix_done {
            if self.data.is_empty() {
                return Ok(None);
            }
            let n = parse_required_insert_count(self.data).map_err(truncated)?;
            self.data = &self.data[n..];
            let n = parse_base(self.data).map_err(truncated)?;
            self.data = &self.data[n..];
            self.prefix_done = true;
        }

        if self.data.is_empty() {
            return Ok(None);
        }

        let budget = Budget {
            limit: self.limit,
            used: self.section_size,
        };
        let (field, n) = parse_field_line(self.data, budget).map_err(truncated)?;
        self.data = &self.data[n..];
        account(&mut self.section_size, &field, self.limit)?;
        Ok(Some(field))
    }
}

impl Iterator for FieldLines<'_> {
    type Item = Result<HeaderField>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.next_field() {
            Ok(Some(field)) => Some(Ok(field)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

/// In whole-buffer mode running out of bytes is fatal.
fn truncated(err: Error) -> Error {
    match err {
        Error::Incomplete(_) => Error::TruncatedHeaders,
        err => err,
    }
}

/// Field section size still available to the line being parsed.
#[derive(Debug, Clone, Copy)]
struct Budget {
    limit: Option<u64>,
    used: u64,
}

impl Budget {
    /// Fails if a line of `line_size` bytes cannot fit in the section.
    ///
    /// Called with declared string lengths, before the strings arrive.
    fn check(&self, line_size: u64) -> Result<()> {
        match self.limit {
            Some(limit) if self.used.saturating_add(line_size) > limit => {
                Err(Error::FieldSectionTooLarge { limit })
            }
            _ => Ok(()),
        }
    }
}

/// Adds `field` to the running field section size.
fn account(section_size: &mut u64, field: &HeaderField, limit: Option<u64>) -> Result<()> {
    *section_size = section_size.saturating_add(field.size());
    match limit {
        Some(limit) if *section_size > limit => Err(Error::FieldSectionTooLarge { limit }),
        _ => Ok(()),
    }
}

/// Decodes the Required Insert Count, which must be zero.
fn parse_required_insert_count(data: &[u8]) -> Result<usize> {
    let (required_insert_count, consumed) = integer::decode(8, data)?;
    if required_insert_count != 0 {
        return Err(Error::RequiredInsertCountNotZero);
    }
    Ok(consumed)
}

/// Decodes the sign bit and Delta Base, which must be zero.
fn parse_base(data: &[u8]) -> Result<usize> {
    let (base, consumed) = integer::decode(7, data)?;
    if base != 0 {
        return Err(Error::BaseNotZero);
    }
    Ok(consumed)
}

fn static_entry(index: u64) -> Result<&'static StaticEntry> {
    static_table::get(index).ok_or(Error::InvalidIndex(index))
}

/// Decodes a single field line representation.
fn parse_field_line(data: &[u8], budget: Budget) -> Result<(HeaderField, usize)> {
    let Some(&first) = data.first() else {
        return Err(Error::Incomplete(1));
    };

    if first & 0x80 != 0 {
        // Indexed field line (1T)
        if first & 0x40 == 0 {
            return Err(Error::NoDynamicTable);
        }
        let (index, consumed) = integer::decode(6, data)?;
        let entry = static_entry(index)?;
        let field = HeaderField::new(
            Bytes::from_static(entry.name),
            Bytes::from_static(entry.value),
        );
        Ok((field, consumed))
    } else if first & 0xc0 == 0x40 {
        // Literal field line with name reference (01NT). N only matters to
        // intermediaries that keep a dynamic table.
        if first & 0x10 == 0 {
            return Err(Error::NoDynamicTable);
        }
        let (index, mut pos) = integer::decode(4, data)?;
        let entry = static_entry(index)?;
        let reserved = FIELD_OVERHEAD + entry.name.len() as u64;
        let (value, consumed) = parse_string(&data[pos..], 7, budget, reserved)?;
        pos += consumed;
        Ok((HeaderField::new(Bytes::from_static(entry.name), value), pos))
    } else if first & 0xe0 == 0x20 {
        // Literal field line with literal name (001NH)
        let (name, mut pos) = parse_string(data, 3, budget, FIELD_OVERHEAD)?;
        let reserved = FIELD_OVERHEAD + name.len() as u64;
        let (value, consumed) = parse_string(&data[pos..], 7, budget, reserved)?;
        pos += consumed;
        Ok((HeaderField::new(name, value), pos))
    } else {
        Err(Error::UnexpectedTypeByte(first))
    }
}

/// Decodes a string literal whose length has an N-bit prefix.
///
/// The Huffman flag is the bit just above the prefix. `reserved` is the
/// size of the line without this string; the declared length is charged
/// against `budget` on top of it before any string bytes are required.
fn parse_string(
    data: &[u8],
    prefix_bits: u8,
    budget: Budget,
    reserved: u64,
) -> Result<(Bytes, usize)> {
    let Some(&first) = data.first() else {
        return Err(Error::Incomplete(1));
    };

    let huffman = first & (1u8 << prefix_bits) != 0;
    let (len, consumed) = integer::decode(prefix_bits, data)?;

    budget.check(reserved.saturating_add(len))?;

    let end = usize::try_from(len)
        .ok()
        .and_then(|len| consumed.checked_add(len))
        .ok_or(Error::Incomplete(usize::MAX))?;
    if data.len() < end {
        return Err(Error::Incomplete(end - data.len()));
    }

    let raw = &data[consumed..end];
    let text = if huffman {
        Bytes::from(huffman::decode(raw)?)
    } else {
        Bytes::copy_from_slice(raw)
    };

    Ok((text, end))
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOREM_IPSUM_1: &str = "lorem ipsum dolor sit amet";
    const LOREM_IPSUM_2: &str = "consectetur adipiscing elit";

    fn int(value: u64, prefix_bits: u8, flags: u8) -> BytesMut {
        let mut buf = BytesMut::new();
        integer::encode(value, prefix_bits, &mut buf);
        buf[0] |= flags;
        buf
    }

    fn with_prefix(lines: &[u8]) -> Vec<u8> {
        let mut data = vec![0x00, 0x00];
        data.extend_from_slice(lines);
        data
    }

    fn literal_with_name_ref(index: u64, flags: u8, value: &str) -> Vec<u8> {
        let mut data = int(index, 4, 0x50 | flags).to_vec();
        data.extend_from_slice(&int(value.len() as u64, 7, 0));
        data.extend_from_slice(value.as_bytes());
        data
    }

    fn literal_without_name_ref(name: &str, value: &str) -> Vec<u8> {
        let mut data = int(name.len() as u64, 3, 0x20).to_vec();
        data.extend_from_slice(name.as_bytes());
        data.extend_from_slice(&int(value.len() as u64, 7, 0));
        data.extend_from_slice(value.as_bytes());
        data
    }

    fn huffman_string(text: &str) -> Vec<u8> {
        let mut coded = Vec::new();
        huffman::encode(text.as_bytes(), &mut coded);
        let mut data = int(coded.len() as u64, 7, 0x80).to_vec();
        data.extend_from_slice(&coded);
        data
    }

    fn write_bytewise(decoder: &mut Decoder, data: &[u8]) -> Vec<HeaderField> {
        let mut fields = Vec::new();
        for (i, byte) in data.iter().enumerate() {
            let before = fields.len();
            assert_eq!(decoder.write(&[*byte], &mut fields).unwrap(), 1);
            // at most one field can complete per byte
            assert!(fields.len() - before <= 1, "byte {i}");
        }
        fields
    }

    #[test]
    fn test_decode_static_indexed() {
        let decoder = Decoder::new();
        let fields = decoder.decode_full(&[0x00, 0x00, 0xd1]).unwrap();
        assert_eq!(fields, vec![HeaderField::from((":method", "GET"))]);
    }

    #[test]
    fn test_decode_indexed_bytewise() {
        let mut lines = int(20, 6, 0xc0).to_vec();
        lines.extend_from_slice(&int(42, 6, 0xc0));
        let mut decoder = Decoder::new();
        let fields = write_bytewise(&mut decoder, &with_prefix(&lines));
        assert_eq!(
            fields,
            vec![
                HeaderField::from((":method", "POST")),
                HeaderField::from(("content-encoding", "br")),
            ]
        );
        assert!(decoder.close().is_ok());
    }

    #[test]
    fn test_decode_literal_with_name_ref() {
        let mut lines = literal_with_name_ref(49, 0, LOREM_IPSUM_1);
        // N bit set: accepted and ignored
        lines.extend_from_slice(&literal_with_name_ref(82, 0x20, LOREM_IPSUM_2));
        let data = with_prefix(&lines);
        let expected = vec![
            HeaderField::from(("content-type", LOREM_IPSUM_1)),
            HeaderField::from(("access-control-request-method", LOREM_IPSUM_2)),
        ];

        assert_eq!(Decoder::new().decode_full(&data).unwrap(), expected);
        assert_eq!(write_bytewise(&mut Decoder::new(), &data), expected);
    }

    #[test]
    fn test_decode_literal_with_huffman_value() {
        let mut lines = int(49, 4, 0x50).to_vec();
        lines.extend_from_slice(&huffman_string(LOREM_IPSUM_1));
        lines.extend_from_slice(&int(82, 4, 0x50));
        lines.extend_from_slice(&huffman_string(LOREM_IPSUM_2));
        let data = with_prefix(&lines);

        let fields = write_bytewise(&mut Decoder::new(), &data);
        assert_eq!(
            fields,
            vec![
                HeaderField::from(("content-type", LOREM_IPSUM_1)),
                HeaderField::from(("access-control-request-method", LOREM_IPSUM_2)),
            ]
        );
    }

    #[test]
    fn test_decode_literal_without_name_ref() {
        let mut lines = literal_without_name_ref("foo", LOREM_IPSUM_1);
        lines.extend_from_slice(&literal_without_name_ref("bar", LOREM_IPSUM_2));
        let data = with_prefix(&lines);

        let fields = write_bytewise(&mut Decoder::new(), &data);
        assert_eq!(
            fields,
            vec![
                HeaderField::from(("foo", LOREM_IPSUM_1)),
                HeaderField::from(("bar", LOREM_IPSUM_2)),
            ]
        );
    }

    #[test]
    fn test_decode_huffman_name() {
        let mut coded = Vec::new();
        huffman::encode(b"custom-key", &mut coded);
        let mut lines = int(coded.len() as u64, 3, 0x28).to_vec();
        lines.extend_from_slice(&coded);
        lines.extend_from_slice(&huffman_string("custom-value"));

        let fields = Decoder::new().decode_full(&with_prefix(&lines)).unwrap();
        assert_eq!(fields, vec![HeaderField::from(("custom-key", "custom-value"))]);
    }

    #[test]
    fn test_invalid_prefix() {
        let decoder = Decoder::new();
        assert_eq!(
            decoder.decode_full(&[0x01, 0x00]),
            Err(Error::RequiredInsertCountNotZero)
        );
        assert_eq!(decoder.decode_full(&[0x00, 0x01]), Err(Error::BaseNotZero));
        // sign bit alone still means a non-zero Delta Base is absent
        assert!(decoder.decode_full(&[0x00, 0x80]).is_ok());
    }

    #[test]
    fn test_required_insert_count_checked_first() {
        // fails before the Base is even present
        let mut decoder = Decoder::new();
        assert_eq!(decoder.feed(&[0x01]), Err(Error::RequiredInsertCountNotZero));
        assert_eq!(
            Decoder::new().decode_full(&[0x01]),
            Err(Error::RequiredInsertCountNotZero)
        );
    }

    #[test]
    fn test_unexpected_type_byte() {
        let err = Decoder::new().decode_full(&with_prefix(&[0x10])).unwrap_err();
        assert_eq!(err, Error::UnexpectedTypeByte(0x10));
        assert_eq!(err.to_string(), "unexpected type byte: 0x10");
    }

    #[test]
    fn test_dynamic_table_references_rejected() {
        let decoder = Decoder::new();
        // indexed, T = 0
        assert_eq!(
            decoder.decode_full(&with_prefix(&int(20, 6, 0x80))),
            Err(Error::NoDynamicTable)
        );
        // literal with name reference, T = 0
        let mut lines = int(49, 4, 0x40).to_vec();
        lines.extend_from_slice(&int(6, 7, 0));
        lines.extend_from_slice(b"foobar");
        assert_eq!(
            decoder.decode_full(&with_prefix(&lines)),
            Err(Error::NoDynamicTable)
        );
    }

    #[test]
    fn test_invalid_static_index() {
        let mut decoder = Decoder::new();
        let data = with_prefix(&int(10000, 6, 0xc0));
        let mut fields = Vec::new();
        let err = decoder.write(&data, &mut fields).unwrap_err();
        assert_eq!(
            err.to_string(),
            "decoding error: invalid indexed representation index 10000"
        );
        assert!(fields.is_empty());

        assert_eq!(
            decoder.decode_full(&with_prefix(&int(99, 6, 0xc0))),
            Err(Error::InvalidIndex(99))
        );
        assert!(decoder.decode_full(&with_prefix(&int(98, 6, 0xc0))).is_ok());
    }

    #[test]
    fn test_invalid_name_ref_fails_before_value() {
        // the value never arrives; the bad index is reported anyway
        let mut decoder = Decoder::new();
        let data = with_prefix(&int(200, 4, 0x50));
        assert_eq!(decoder.feed(&data), Err(Error::InvalidIndex(200)));
    }

    #[test]
    fn test_malformed_huffman() {
        let lines = [0x51, 0x81, 0x00];
        assert!(matches!(
            Decoder::new().decode_full(&with_prefix(&lines)),
            Err(Error::Huffman(_))
        ));
    }

    #[test]
    fn test_decode_full_empty() {
        assert!(Decoder::new().decode_full(&[]).unwrap().is_empty());
        assert!(Decoder::new().decode_full(&[0x00, 0x00]).unwrap().is_empty());
    }

    #[test]
    fn test_decode_full_truncated() {
        let data = with_prefix(&literal_without_name_ref("foo", "bar"));
        for len in 1..data.len() {
            if len == 2 {
                // prefix only: a valid empty block
                continue;
            }
            assert_eq!(
                Decoder::new().decode_full(&data[..len]),
                Err(Error::TruncatedHeaders),
                "prefix of length {len}"
            );
        }
    }

    #[test]
    fn test_decode_full_leaves_streaming_state() {
        let mut decoder = Decoder::new();
        let mut calls = 0;
        let mut count = |_: HeaderField| calls += 1;

        // half a block in flight
        let data = with_prefix(&literal_without_name_ref("foo", "bar"));
        decoder.write(&data[..4], &mut count).unwrap();
        let buffered = decoder.buffered();

        let fields = decoder.decode_full(&data).unwrap();
        assert_eq!(fields.len(), 1);
        assert_eq!(decoder.buffered(), buffered);

        decoder.write(&data[4..], &mut count).unwrap();
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_streaming_incomplete_never_errors() {
        let data = with_prefix(&literal_with_name_ref(49, 0, LOREM_IPSUM_1));
        for split in 0..data.len() {
            let mut decoder = Decoder::new();
            assert!(decoder.feed(&data[..split]).unwrap().is_empty());
            let fields = decoder.feed(&data[split..]).unwrap();
            assert_eq!(fields, vec![HeaderField::from(("content-type", LOREM_IPSUM_1))]);
            assert_eq!(decoder.buffered(), 0);
        }
    }

    #[test]
    fn test_failed_decoder_stays_failed() {
        let mut decoder = Decoder::new();
        assert_eq!(decoder.feed(&[0x01]), Err(Error::RequiredInsertCountNotZero));
        assert_eq!(decoder.feed(&[0x00, 0xd1]), Err(Error::RequiredInsertCountNotZero));

        decoder.reset();
        assert_eq!(decoder.feed(&[0x00, 0x00, 0xd1]).unwrap().len(), 1);
    }

    #[test]
    fn test_error_drops_rest_of_chunk() {
        let mut lines = vec![0xd1, 0x10];
        lines.push(0xd1);
        let mut decoder = Decoder::new();
        let mut fields = Vec::new();
        let err = decoder.write(&with_prefix(&lines), &mut fields).unwrap_err();
        assert_eq!(err, Error::UnexpectedTypeByte(0x10));
        // the field before the bad byte was already emitted
        assert_eq!(fields.len(), 1);
        assert_eq!(decoder.buffered(), 0);
    }

    #[test]
    fn test_close() {
        let mut decoder = Decoder::new();
        decoder.feed(&[0x00, 0x00, 0xd1, 0x5f]).unwrap();
        assert_eq!(decoder.close(), Err(Error::TruncatedHeaders));

        // the next block starts fresh
        assert_eq!(decoder.feed(&[0x00, 0x00, 0xd1]).unwrap().len(), 1);
        assert!(decoder.close().is_ok());

        decoder.feed(&[0x00]).unwrap();
        assert_eq!(decoder.close(), Err(Error::TruncatedHeaders));
        assert!(decoder.close().is_ok());
    }

    #[test]
    fn test_field_section_limit() {
        let config = QpackConfig::default().with_max_field_section_size(64);
        let mut decoder = Decoder::with_config(config);

        // 7 + 3 + 32 = 42
        let ok = with_prefix(&int(17, 6, 0xc0));
        assert_eq!(decoder.feed(&ok).unwrap().len(), 1);
        // a second one crosses 64
        assert_eq!(
            decoder.feed(&int(17, 6, 0xc0)),
            Err(Error::FieldSectionTooLarge { limit: 64 })
        );

        // declared string length over the limit fails without waiting
        let mut decoder = Decoder::with_config(QpackConfig::default().with_max_field_section_size(64));
        let mut header = int(49, 4, 0x50).to_vec();
        header.extend_from_slice(&int(1000, 7, 0));
        assert_eq!(
            decoder.feed(&with_prefix(&header)),
            Err(Error::FieldSectionTooLarge { limit: 64 })
        );
    }

    #[test]
    fn test_field_section_limit_checked_before_strings_arrive() {
        let limit = 64;
        let config = || QpackConfig::default().with_max_field_section_size(limit);

        // literal name of 64 bytes: 64 + 32 already exceeds the limit
        let mut decoder = Decoder::with_config(config());
        let mut line = int(64, 3, 0x20).to_vec();
        line.extend_from_slice(&[b'a'; 64]);
        line.extend_from_slice(&int(64, 7, 0));
        line.extend_from_slice(&[b'b'; 63]);
        let data = with_prefix(&line);
        assert_eq!(
            decoder.feed(&data[..4]),
            Err(Error::FieldSectionTooLarge { limit })
        );
        assert_eq!(decoder.buffered(), 0);
        assert_eq!(
            Decoder::with_config(config()).decode_full(&data),
            Err(Error::FieldSectionTooLarge { limit })
        );

        // name fits, value length pushes the line over: 10 + 30 + 32 = 72
        let mut decoder = Decoder::with_config(config());
        let mut line = int(10, 3, 0x20).to_vec();
        line.extend_from_slice(b"x-trace-id");
        line.extend_from_slice(&int(30, 7, 0));
        let data = with_prefix(&line);
        for byte in &data[..data.len() - 1] {
            assert!(decoder.feed(&[*byte]).unwrap().is_empty());
            assert!(decoder.buffered() as u64 <= limit);
        }
        assert_eq!(
            decoder.feed(&data[data.len() - 1..]),
            Err(Error::FieldSectionTooLarge { limit })
        );

        // earlier fields count: 42 used, :method + 1-byte value needs 40 more
        let mut decoder = Decoder::with_config(config());
        let mut lines = int(17, 6, 0xc0).to_vec();
        lines.extend_from_slice(&int(15, 4, 0x50));
        lines.extend_from_slice(&int(1, 7, 0));
        let fields = decoder.feed(&with_prefix(&lines[..1])).unwrap();
        assert_eq!(fields.len(), 1);
        assert_eq!(
            decoder.feed(&lines[1..]),
            Err(Error::FieldSectionTooLarge { limit })
        );

        // a line that fits exactly is still accepted: 7 + 25 + 32 = 64
        let mut line = int(15, 4, 0x50).to_vec();
        line.extend_from_slice(&int(25, 7, 0));
        line.extend_from_slice(&[b'x'; 25]);
        let fields = Decoder::with_config(config())
            .decode_full(&with_prefix(&line))
            .unwrap();
        assert_eq!(fields[0].size(), limit);
    }

    #[test]
    fn test_huge_string_length_is_truncated() {
        let mut lines = int(49, 4, 0x50).to_vec();
        lines.extend_from_slice(&int(u64::MAX, 7, 0));
        assert_eq!(
            Decoder::new().decode_full(&with_prefix(&lines)),
            Err(Error::TruncatedHeaders)
        );
        let mut decoder = Decoder::new();
        assert!(decoder.feed(&with_prefix(&lines)).unwrap().is_empty());
    }

    #[test]
    fn test_iterator_stops_after_error() {
        let data = with_prefix(&[0xd1, 0x10, 0xd1]);
        let decoder = Decoder::new();
        let mut iter = decoder.decode(&data);
        assert!(matches!(iter.next(), Some(Ok(_))));
        assert_eq!(iter.next(), Some(Err(Error::UnexpectedTypeByte(0x10))));
        assert_eq!(iter.next(), None);
    }
}
