//! Huffman coding for QPACK string literals.
//!
//! Implements the static Huffman code defined in RFC 7541 Appendix B, which
//! QPACK reuses unchanged. The encoder in this crate never Huffman-codes its
//! own output, but peers do, so decoding is on the hot path.
//!
//! Decoding walks a binary tree built once from the code table on first use.

use std::sync::OnceLock;

use crate::error::{Error, Result};

/// Huffman code entry: code bits (right-aligned) and their count.
struct HuffmanCode {
    code: u32,
    len: u8,
}

// RFC 7541 Appendix B: symbols 0-255, then EOS (256).
static ENCODE_TABLE: [HuffmanCode; 257] = include!("huffman_table.inc");

const EOS: u16 = 256;

// Child slot encoding: 0 = no child, LEAF | symbol = leaf, otherwise the
// index of an internal node. The root is node 0 and never a child.
const LEAF: u16 = 0x8000;

static DECODE_TREE: OnceLock<Vec<[u16; 2]>> = OnceLock::new();

fn decode_tree() -> &'static [[u16; 2]] {
    DECODE_TREE.get_or_init(|| {
        // A complete prefix code over 257 symbols has 256 internal nodes.
        let mut tree: Vec<[u16; 2]> = Vec::with_capacity(256);
        tree.push([0, 0]);

        for (sym, entry) in ENCODE_TABLE.iter().enumerate() {
            let mut node = 0usize;
            for depth in (0..entry.len).rev() {
                let bit = ((entry.code >> depth) & 1) as usize;
                if depth == 0 {
                    tree[node][bit] = LEAF | sym as u16;
                } else {
                    if tree[node][bit] == 0 {
                        tree.push([0, 0]);
                        tree[node][bit] = (tree.len() - 1) as u16;
                    }
                    node = tree[node][bit] as usize;
                }
            }
        }

        tree
    })
}

/// Appends the Huffman encoding of `data` to `output`.
///
/// Returns the number of bytes written. The final byte is padded with the
/// most significant bits of EOS (all ones).
pub fn encode(data: &[u8], output: &mut Vec<u8>) -> usize {
    let initial_len = output.len();
    let mut acc: u64 = 0;
    let mut bits: u32 = 0;

    for &byte in data {
        let entry = &ENCODE_TABLE[byte as usize];
        acc = (acc << entry.len) | entry.code as u64;
        bits += entry.len as u32;

        while bits >= 8 {
            bits -= 8;
            output.push((acc >> bits) as u8);
        }
    }

    if bits > 0 {
        let pad = 8 - bits;
        output.push(((acc << pad) | ((1 << pad) - 1)) as u8);
    }

    output.len() - initial_len
}

/// Returns the number of bytes the Huffman encoding of `data` occupies.
pub fn encoded_len(data: &[u8]) -> usize {
    let bits: usize = data
        .iter()
        .map(|&b| ENCODE_TABLE[b as usize].len as usize)
        .sum();
    (bits + 7) / 8
}

/// Decodes a Huffman-coded string.
///
/// # Errors
///
/// Returns [`Error::Huffman`] if the input contains the EOS symbol, a bit
/// sequence that is not a code, or padding that is longer than 7 bits or
/// not a prefix of EOS.
pub fn decode(data: &[u8]) -> Result<Vec<u8>> {
    let tree = decode_tree();
    // Decoded text is never longer than 8/5 of the input.
    let mut output = Vec::with_capacity(data.len() * 8 / 5);
    let mut node = 0usize;
    // Bits consumed since the last emitted symbol, and whether all were ones.
    let mut pending_bits = 0u32;
    let mut pending_ones = true;

    for &byte in data {
        for shift in (0..8).rev() {
            let bit = ((byte >> shift) & 1) as usize;
            pending_bits += 1;
            pending_ones &= bit == 1;

            match tree[node][bit] {
                0 => return Err(Error::Huffman("invalid huffman code".into())),
                next if next & LEAF != 0 => {
                    let sym = next & !LEAF;
                    if sym == EOS {
                        return Err(Error::Huffman("unexpected EOS symbol".into()));
                    }
                    output.push(sym as u8);
                    node = 0;
                    pending_bits = 0;
                    pending_ones = true;
                }
                next => node = next as usize,
            }
        }
    }

    if pending_bits > 7 {
        return Err(Error::Huffman("padding longer than 7 bits".into()));
    }
    if !pending_ones {
        return Err(Error::Huffman("invalid padding".into()));
    }

    Ok(output)
}
