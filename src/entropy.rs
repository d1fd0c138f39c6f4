//! Lossless coding: Huffman with a serializable code tree, and LZW
//!
//! Both coders report a compression ratio with the same model: every input
//! sample is assumed to occupy two bytes (16-bit PCM or short integers), and
//! the encoded size is the number of whole bytes needed for its bits.
pub mod bits;
pub mod huffman;
pub mod lzw;
pub mod stats;
pub mod tree;

pub use huffman::HuffmanCodec;
pub use lzw::LzwCodec;
pub use stats::SymbolFrequencyTable;
pub use tree::{CodeTree, LeafWidth, SerializedTree, TreeToken};

/// Bytes assumed per unencoded sample
pub const BYTES_PER_SAMPLE: usize = 2;

/// `unencoded_samples * 2 / max(1, ceil(encoded_bits / 8))`, rounded to 4 decimals.
pub fn compression_ratio(unencoded_samples: usize, encoded_bits: usize) -> f64 {
    let unencoded_bytes = unencoded_samples * BYTES_PER_SAMPLE;
    let encoded_bytes = encoded_bits.div_ceil(8).max(1);
    round4(unencoded_bytes as f64 / encoded_bytes as f64)
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}
