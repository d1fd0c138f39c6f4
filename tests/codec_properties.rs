//! Property tests for the lossless coders and the block transforms

use proptest::prelude::*;
use sigpress::entropy::{LeafWidth, SerializedTree};
use sigpress::quantization::{self, QuantizationLevel};
use sigpress::{zigzag, CodecConfig, HuffmanCodec, LzwCodec, Plane, Symbol};

fn level_strategy() -> impl Strategy<Value = QuantizationLevel> {
    prop_oneof![
        Just(QuantizationLevel::Low),
        Just(QuantizationLevel::Medium),
        Just(QuantizationLevel::High),
    ]
}

fn square_block_strategy() -> impl Strategy<Value = Plane<i32>> {
    (1usize..10).prop_flat_map(|n| {
        prop::collection::vec(-4096i32..4096, n * n)
            .prop_map(move |data| Plane::from_vec(data, n, n).unwrap())
    })
}

proptest! {
    #[test]
    fn prop_huffman_round_trip(samples in prop::collection::vec(-2000i32..2000, 1..300)) {
        let mut huffman: HuffmanCodec = HuffmanCodec::default();
        let codes = huffman.encode(&samples).unwrap();
        prop_assert_eq!(codes.len(), samples.len());
        prop_assert_eq!(huffman.decode_codes(&codes).unwrap(), samples);
    }

    #[test]
    fn prop_huffman_codes_are_prefix_free(samples in prop::collection::vec(0i32..40, 2..200)) {
        let mut huffman: HuffmanCodec = HuffmanCodec::default();
        huffman.encode(&samples).unwrap();
        let mut distinct = samples.clone();
        distinct.sort_unstable();
        distinct.dedup();
        let codes: Vec<&str> = distinct.iter().filter_map(|s| huffman.code_for(s)).collect();
        prop_assert_eq!(codes.len(), distinct.len());
        for (i, a) in codes.iter().enumerate() {
            for (j, b) in codes.iter().enumerate() {
                prop_assert!(i == j || !b.starts_with(a));
            }
        }
    }

    #[test]
    fn prop_lzw_round_trip(samples in prop::collection::vec(0i32..6, 1..400)) {
        let mut lzw: LzwCodec = LzwCodec::default();
        let codes = lzw.encode(&samples).unwrap();
        prop_assert!(codes.len() <= samples.len());
        prop_assert_eq!(lzw.decode(&codes).unwrap(), samples.clone());
        prop_assert_eq!(LzwCodec::decode_with_alphabet(lzw.alphabet(), &codes).unwrap(), samples);
    }

    #[test]
    fn prop_tree_serialization_round_trip(
        samples in prop::collection::vec(any::<i16>(), 1..200),
        leaf_bytes in prop::collection::vec(any::<u8>(), 1..200),
    ) {
        let cases: [(Vec<Symbol>, LeafWidth); 2] = [
            (samples.into_iter().map(Symbol::from).collect(), LeafWidth::Short),
            (leaf_bytes.into_iter().map(Symbol::from).collect(), LeafWidth::Byte),
        ];
        for (symbols, leaf_width) in cases {
            let config = CodecConfig::builder().leaf_width(leaf_width).build().unwrap();
            let mut encoder: HuffmanCodec = HuffmanCodec::new(&config);
            let bits = encoder.encode_to_bits(&symbols).unwrap();
            let serialized = encoder.serialize_tree().unwrap();

            let parsed = SerializedTree::parse(&serialized.to_bits(), leaf_width).unwrap();
            prop_assert_eq!(&parsed, &serialized);
            let mut decoder: HuffmanCodec = HuffmanCodec::new(&config);
            decoder.deserialize_tree(&parsed).unwrap();
            prop_assert_eq!(decoder.serialize_tree().unwrap(), serialized);
            prop_assert_eq!(decoder.decode(&bits).unwrap(), symbols);
        }
    }

    #[test]
    fn prop_zigzag_round_trip(block in square_block_strategy()) {
        let vector = zigzag::zigzag(&block).unwrap();
        prop_assert_eq!(vector.len(), block.width * block.height);
        prop_assert_eq!(vector[0], block.get(0, 0));
        prop_assert_eq!(zigzag::un_zigzag(&vector).unwrap(), block);
    }

    #[test]
    fn prop_quantization_error_is_bounded(
        data in prop::collection::vec(-8192i32..8192, 64),
        level in level_strategy(),
    ) {
        let block = Plane::from_vec(data, 8, 8).unwrap();
        let restored = quantization::dequantize(&quantization::quantize(&block, level).unwrap(), level).unwrap();
        let matrix = level.matrix();
        for row in 0..8 {
            for col in 0..8 {
                let error = (block.get(row, col) - restored.get(row, col)).abs();
                prop_assert!(error < matrix[row][col]);
            }
        }
    }
}
