//! Side-by-side lossless compression of a sample sequence
//!
//! Runs Huffman and LZW on their own and chained both ways. Every ratio in
//! the report is measured against the original samples at two bytes each.
use crate::config::CodecConfig;
use crate::entropy::lzw::code_text_len;
use crate::entropy::stats::{self, SymbolFrequencyTable};
use crate::entropy::{compression_ratio, HuffmanCodec, LzwCodec};
use crate::error::{CodecError, Result};
use crate::Symbol;

#[derive(Debug, Clone, PartialEq)]
pub struct CompressionReport {
    pub samples: usize,
    pub huffman_ratio: f64,
    pub lzw_ratio: f64,
    /// LZW codes fed into Huffman
    pub lzw_huffman_ratio: f64,
    /// Huffman codes fed into LZW, each code string being one symbol
    pub huffman_lzw_ratio: f64,
    /// First-order entropy of the samples in bits per sample
    pub entropy: f64,
    /// Mean Huffman code length in bits per sample
    pub average_code_length: f64,
}

#[derive(Debug, Clone, Default)]
pub struct SampleCompressor {
    config: CodecConfig,
}

impl SampleCompressor {
    pub fn new(config: &CodecConfig) -> Self {
        SampleCompressor { config: config.clone() }
    }

    pub fn compress(&self, samples: &[Symbol]) -> Result<CompressionReport> {
        if samples.is_empty() {
            return Err(CodecError::EmptyInput { context: "sample compression" });
        }
        let mut huffman: HuffmanCodec<Symbol> = HuffmanCodec::new(&self.config);
        let huffman_codes = huffman.encode(samples)?;

        let mut lzw: LzwCodec<Symbol> = LzwCodec::new(&self.config);
        let lzw_codes = lzw.encode(samples)?;

        let mut lzw_huffman: HuffmanCodec<u32> = HuffmanCodec::new(&self.config);
        let lzw_huffman_bits: usize = lzw_huffman.encode(&lzw_codes)?.iter().map(String::len).sum();

        let mut huffman_lzw: LzwCodec<String> = LzwCodec::new(&self.config);
        let huffman_lzw_codes = huffman_lzw.encode(&huffman_codes)?;

        let table = SymbolFrequencyTable::from_samples(samples);
        let average_code_length = match huffman.tree() {
            Some(tree) => stats::average_code_length(tree, &table),
            None => return Err(CodecError::TreeNotBuilt),
        };

        let report = CompressionReport {
            samples: samples.len(),
            huffman_ratio: huffman.compression_ratio(None),
            lzw_ratio: lzw.compression_ratio(None),
            lzw_huffman_ratio: compression_ratio(samples.len(), lzw_huffman_bits),
            huffman_lzw_ratio: compression_ratio(samples.len(), code_text_len(&huffman_lzw_codes)),
            entropy: stats::entropy(&table),
            average_code_length,
        };
        self.config.diagnostics.info(format_args!(
            "Compressed {} samples: huffman {}, lzw {}, lzw+huffman {}, huffman+lzw {}",
            report.samples, report.huffman_ratio, report.lzw_ratio,
            report.lzw_huffman_ratio, report.huffman_lzw_ratio
        ));
        Ok(report)
    }
}
