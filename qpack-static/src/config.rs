//! Codec configuration and tunable limits.
//!
//! Header blocks come from the peer, so every length in them is
//! attacker-controlled. The limits here bound how much a single block may
//! make a decoder buffer or emit.

/// Configuration shared by [`Decoder`](crate::Decoder) and [`Encoder`](crate::Encoder).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QpackConfig {
    /// Maximum decoded field section size in bytes (default: 0, unlimited).
    ///
    /// RFC 9114 Section 4.2.2: the size of a field section is the sum of
    /// `name.len() + value.len() + 32` over its fields. Each declared string
    /// length is charged against what is left of the limit as soon as it is
    /// read, so a line that cannot fit fails before its bytes are buffered.
    /// Huffman-coded strings are charged at their encoded length until
    /// decoded.
    pub max_field_section_size: u64,

    /// Initial capacity of the streaming decoder's carry buffer (default: 1 KB).
    pub decoder_buffer_capacity: usize,

    /// Initial capacity of the encoder's scratch buffer (default: 256 bytes).
    ///
    /// The buffer is cleared, not reallocated, after every field.
    pub encoder_buffer_capacity: usize,
}

impl Default for QpackConfig {
    fn default() -> Self {
        Self {
            max_field_section_size: 0,
            decoder_buffer_capacity: 1024,
            encoder_buffer_capacity: 256,
        }
    }
}

impl QpackConfig {
    /// Configuration for decoding input from untrusted peers.
    ///
    /// Caps field sections at 64 KB, the default HTTP/3 servers advertise in
    /// SETTINGS_MAX_FIELD_SECTION_SIZE.
    pub fn hardened() -> Self {
        Self {
            max_field_section_size: 64 * 1024,
            ..Self::default()
        }
    }

    /// Sets the field section size limit.
    pub fn with_max_field_section_size(mut self, limit: u64) -> Self {
        self.max_field_section_size = limit;
        self
    }

    /// Returns the field section size limit, if any.
    pub(crate) fn section_limit(&self) -> Option<u64> {
        (self.max_field_section_size != 0).then_some(self.max_field_section_size)
    }
}
