//! Huffman coding of integer sample sequences.
//!
//! A codec starts without a tree. `encode` builds one from the frequencies of
//! its input and keeps it for later `decode`/`serialize_tree` calls;
//! `deserialize_tree` installs a tree read back from storage instead.
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

use crate::config::{CodecConfig, Diagnostics};
use crate::entropy::compression_ratio;
use crate::entropy::stats::{self, SymbolFrequencyTable};
use crate::entropy::tree::{CodeTree, LeafWidth, SerializedTree, TreeToken};
use crate::error::{CodecError, Result};
use crate::Symbol;

#[derive(Debug, Clone)]
pub struct HuffmanCodec<S = Symbol> {
    tree: Option<CodeTree<S>>,
    codes: HashMap<S, String>,
    unencoded_len: usize,
    encoded: Vec<String>,
    leaf_width: LeafWidth,
    diagnostics: Diagnostics,
}

impl<S: Clone + Eq + Hash + Debug> Default for HuffmanCodec<S> {
    fn default() -> Self {
        Self::new(&CodecConfig::default())
    }
}

impl<S: Clone + Eq + Hash + Debug> HuffmanCodec<S> {
    pub fn new(config: &CodecConfig) -> Self {
        HuffmanCodec {
            tree: None,
            codes: HashMap::new(),
            unencoded_len: 0,
            encoded: vec![],
            leaf_width: config.leaf_width,
            diagnostics: config.diagnostics.clone(),
        }
    }

    /// Build a tree from `samples` and return one code per sample, in input order.
    pub fn encode(&mut self, samples: &[S]) -> Result<Vec<String>> {
        if samples.is_empty() {
            return Err(CodecError::EmptyInput { context: "huffman encode" });
        }
        let table = SymbolFrequencyTable::from_samples(samples);
        if table.len() == 1 {
            self.diagnostics.warn(format_args!(
                "Only one distinct symbol ({:?}), padding the code tree with a twin leaf", samples[0]
            ));
        }
        let tree = CodeTree::build(&table)?;
        let codes = tree.code_table();
        self.diagnostics.debug(format_args!(
            "Huffman tree over {} samples: {} distinct symbols, {} nodes, entropy {:.4} bits",
            samples.len(), table.len(), tree.len(), stats::entropy(&table)
        ));

        let mut encoded = Vec::with_capacity(samples.len());
        for sample in samples {
            // every sample is a key of the table the tree was built from
            let code = codes.get(sample)
                .ok_or_else(|| CodecError::malformed_tree(format!("no code for {:?}", sample)))?;
            encoded.push(code.clone());
        }

        self.tree = Some(tree);
        self.codes = codes;
        self.unencoded_len = samples.len();
        self.encoded = encoded.clone();
        Ok(encoded)
    }

    /// Encode and concatenate the codes into one bit string.
    pub fn encode_to_bits(&mut self, samples: &[S]) -> Result<String> {
        Ok(self.encode(samples)?.concat())
    }

    /// Walk the tree bit by bit, emitting a symbol on every arrival at a leaf.
    pub fn decode(&self, bits: &str) -> Result<Vec<S>> {
        let tree = self.tree.as_ref().ok_or(CodecError::TreeNotBuilt)?;
        let root = tree.root();
        let mut decoded = vec![];
        let mut current = root;

        for (position, bit) in bits.chars().enumerate() {
            if let Some(symbol) = tree.symbol(current) {
                decoded.push(symbol.clone());
                current = root;
            }
            let step = match bit {
                '0' => false,
                '1' => true,
                found => return Err(CodecError::IllegalCode { position, found }),
            };
            current = tree.child(current, step)
                .ok_or_else(|| CodecError::malformed_tree("root of the code tree is a leaf"))?;
        }

        match tree.symbol(current) {
            Some(symbol) => decoded.push(symbol.clone()),
            None if current != root => self.diagnostics.warn(format_args!(
                "Bit string ends inside a code, dropping the incomplete symbol"
            )),
            None => {}
        }
        self.diagnostics.debug(format_args!("Decoded {} bits into {} symbols", bits.len(), decoded.len()));
        Ok(decoded)
    }

    /// Decode per-symbol codes as returned by [`HuffmanCodec::encode`].
    pub fn decode_codes(&self, codes: &[String]) -> Result<Vec<S>> {
        self.decode(&codes.concat())
    }

    /// Ratio of the 16-bit input size to the encoded size in whole bytes.
    ///
    /// Uses the codes of the last `encode` unless `encoded` is given.
    pub fn compression_ratio(&self, encoded: Option<&[String]>) -> f64 {
        let encoded = encoded.unwrap_or(&self.encoded);
        let bits: usize = encoded.iter().map(String::len).sum();
        compression_ratio(self.unencoded_len, bits)
    }

    pub fn encoded_samples(&self) -> &[String] {
        &self.encoded
    }

    pub fn tree(&self) -> Option<&CodeTree<S>> {
        self.tree.as_ref()
    }

    pub fn code_for(&self, symbol: &S) -> Option<&str> {
        self.codes.get(symbol).map(String::as_str)
    }

    pub fn leaf_width(&self) -> LeafWidth {
        self.leaf_width
    }
}

impl HuffmanCodec<Symbol> {
    pub fn serialize_tree(&self) -> Result<SerializedTree> {
        self.serialize_tree_with(self.leaf_width)
    }

    pub fn serialize_tree_with(&self, leaf_width: LeafWidth) -> Result<SerializedTree> {
        let tree = self.tree.as_ref().ok_or(CodecError::TreeNotBuilt)?;
        tree.serialize(leaf_width)
    }

    /// Install a tree read from storage. The leading root marker is consumed here.
    pub fn deserialize_tree(&mut self, serialized: &SerializedTree) -> Result<()> {
        let body = match serialized.tokens.split_first() {
            Some((TreeToken::Branch, body)) => body,
            Some((TreeToken::Leaf(_), _)) => {
                return Err(CodecError::malformed_tree("tree does not start with a root marker"))
            }
            None => return Err(CodecError::malformed_tree("serialized tree is empty")),
        };
        let tree = CodeTree::deserialize(body)?;
        self.diagnostics.debug(format_args!(
            "Read code tree with {} leaves from {} tokens", tree.leaf_count(), serialized.tokens.len()
        ));
        self.codes = tree.code_table();
        self.tree = Some(tree);
        self.leaf_width = serialized.leaf_width;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec() -> HuffmanCodec<Symbol> {
        HuffmanCodec::default()
    }

    #[test]
    fn test_two_samples() {
        let mut huffman = codec();
        let encoded = huffman.encode(&[1, 10]).unwrap();
        assert_eq!(encoded, vec!["0", "1"]);
        assert_eq!(huffman.compression_ratio(None), 4.0);
    }

    #[test]
    fn test_skewed_samples() {
        let mut huffman = codec();
        let encoded = huffman.encode(&[1, 1, 1, 1, 10]).unwrap();
        assert_eq!(encoded, vec!["1", "1", "1", "1", "0"]);
        assert_eq!(huffman.compression_ratio(None), 10.0);
    }

    #[test]
    fn test_encode_decode() {
        let cases: Vec<Vec<Symbol>> = vec![
            vec![0, 123, 2, 1],
            vec![123, 121, 1, 4, 5, 3, 98, 54, 32, 12, 58, 98, 178, 20, 1, 3, 5, 85],
            vec![1, 2, 1, 2, 10, 2, 1, 4, 3, 6, 7, 4, 34, 3, 3, 6, 6, 7],
        ];
        for case in cases {
            let mut huffman = codec();
            let encoded = huffman.encode(&case).unwrap();
            assert_eq!(encoded.len(), case.len());
            assert_eq!(huffman.decode_codes(&encoded).unwrap(), case);
        }
    }

    #[test]
    fn test_generic_symbols() {
        let sentence = ["A", "A", "B", "B", "B", "B", "C", "C", "D", "E"];
        let mut huffman: HuffmanCodec<&str> = HuffmanCodec::default();
        let bits = huffman.encode_to_bits(&sentence).unwrap();
        assert_eq!(bits.len(), 22);
        assert_eq!(huffman.decode(&bits).unwrap(), sentence);
    }

    #[test]
    fn test_decode_illegal_bit() {
        let mut huffman = codec();
        huffman.encode(&[1, 10]).unwrap();
        assert!(matches!(
            huffman.decode("0120"),
            Err(CodecError::IllegalCode { position: 2, found: '2' })
        ));
    }

    #[test]
    fn test_decode_without_tree() {
        assert!(matches!(codec().decode("01"), Err(CodecError::TreeNotBuilt)));
        assert!(matches!(codec().serialize_tree(), Err(CodecError::TreeNotBuilt)));
    }

    #[test]
    fn test_decode_empty_and_truncated() {
        let mut huffman = codec();
        huffman.encode(&[0, 0, 1, 1, 1, 1, 2, 2, 3, 4]).unwrap();
        assert!(huffman.decode("").unwrap().is_empty());
        // "11" is symbol 1, the trailing "10" stops inside the codes of 3 and 4
        assert_eq!(huffman.decode("1110").unwrap(), vec![1]);
    }

    #[test]
    fn test_encode_empty() {
        assert!(matches!(codec().encode(&[]), Err(CodecError::EmptyInput { .. })));
    }

    #[test]
    fn test_single_symbol() {
        let mut huffman = codec();
        let encoded = huffman.encode(&[42, 42, 42]).unwrap();
        assert_eq!(encoded, vec!["0", "0", "0"]);
        assert_eq!(huffman.decode("000").unwrap(), vec![42, 42, 42]);
    }

    #[test]
    fn test_tree_round_trip_through_new_codec() {
        let samples = vec![5, 5, 5, 200, 17, 17, 0, 255, 5, 17];
        let mut encoder = codec();
        let bits = encoder.encode_to_bits(&samples).unwrap();
        let serialized = encoder.serialize_tree().unwrap();

        let mut decoder = codec();
        decoder.deserialize_tree(&serialized).unwrap();
        assert_eq!(decoder.serialize_tree().unwrap(), serialized);
        assert_eq!(decoder.decode(&bits).unwrap(), samples);
    }

    #[test]
    fn test_deserialize_requires_root_marker() {
        let serialized = SerializedTree {
            tokens: vec![TreeToken::Leaf(1), TreeToken::Leaf(2)],
            leaf_width: LeafWidth::Byte,
        };
        assert!(matches!(codec().deserialize_tree(&serialized), Err(CodecError::MalformedTree { .. })));
    }

    #[test]
    fn test_ratio_of_other_codes() {
        let mut huffman = codec();
        huffman.encode(&[1, 2, 3, 4, 5, 6, 7, 8]).unwrap();
        let other = vec!["1111111111".to_string(); 8];
        // 16 bytes over ceil(80 / 8) bytes
        assert_eq!(huffman.compression_ratio(Some(&other)), 1.6);
    }
}
