//! LZW dictionary coding of sample sequences.
//!
//! The dictionary is seeded with every distinct sample of the input, numbered
//! in order of first occurrence, so the whole input is scanned once before
//! coding starts. Longer phrases are stored as `(prefix code, next sample)`
//! pairs, which keeps distinct sample sequences apart no matter how their
//! values would print.
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

use crate::config::{CodecConfig, Diagnostics};
use crate::entropy::compression_ratio;
use crate::error::{CodecError, Result};
use crate::Symbol;

#[derive(Debug, Clone)]
pub struct LzwCodec<S = Symbol> {
    alphabet: Vec<S>,
    unencoded_len: usize,
    encoded: Vec<u32>,
    diagnostics: Diagnostics,
}

impl<S: Clone + Eq + Hash + Debug> Default for LzwCodec<S> {
    fn default() -> Self {
        Self::new(&CodecConfig::default())
    }
}

impl<S: Clone + Eq + Hash + Debug> LzwCodec<S> {
    pub fn new(config: &CodecConfig) -> Self {
        LzwCodec {
            alphabet: vec![],
            unencoded_len: 0,
            encoded: vec![],
            diagnostics: config.diagnostics.clone(),
        }
    }

    pub fn encode(&mut self, samples: &[S]) -> Result<Vec<u32>> {
        let Some((first, rest)) = samples.split_first() else {
            return Err(CodecError::EmptyInput { context: "lzw encode" });
        };

        let mut singles: HashMap<&S, u32> = HashMap::new();
        let mut alphabet = vec![];
        for sample in samples {
            if !singles.contains_key(sample) {
                singles.insert(sample, alphabet.len() as u32);
                alphabet.push(sample.clone());
            }
        }
        let mut phrases: HashMap<(u32, &S), u32> = HashMap::new();
        let mut next_code = alphabet.len() as u32;

        let mut encoded = vec![];
        let mut current = singles[first];
        for sample in rest {
            match phrases.get(&(current, sample)) {
                Some(&code) => current = code,
                None => {
                    encoded.push(current);
                    phrases.insert((current, sample), next_code);
                    next_code += 1;
                    current = singles[sample];
                }
            }
        }
        encoded.push(current);

        self.diagnostics.debug(format_args!(
            "LZW coded {} samples into {} codes ({} seed symbols, {} dictionary entries)",
            samples.len(), encoded.len(), alphabet.len(), next_code
        ));
        self.alphabet = alphabet;
        self.unencoded_len = samples.len();
        self.encoded = encoded.clone();
        Ok(encoded)
    }

    /// Invert the last `encode`, using the seed alphabet it recorded.
    pub fn decode(&self, codes: &[u32]) -> Result<Vec<S>> {
        Self::decode_with_alphabet(&self.alphabet, codes)
    }

    /// Rebuild the phrase table from `alphabet` while decoding `codes`.
    pub fn decode_with_alphabet(alphabet: &[S], codes: &[u32]) -> Result<Vec<S>> {
        let Some((&first, rest)) = codes.split_first() else {
            return Ok(vec![]);
        };
        let mut phrases: Vec<Vec<S>> = alphabet.iter().map(|s| vec![s.clone()]).collect();
        let mut previous = phrases
            .get(first as usize)
            .cloned()
            .ok_or(CodecError::InvalidLzwCode { code: first })?;
        let mut decoded = previous.clone();

        for &code in rest {
            let phrase = match phrases.get(code as usize) {
                Some(phrase) => phrase.clone(),
                // the phrase being defined by this very step: previous + its own first sample
                None if code as usize == phrases.len() => {
                    let mut phrase = previous.clone();
                    phrase.push(previous[0].clone());
                    phrase
                }
                None => return Err(CodecError::InvalidLzwCode { code }),
            };
            decoded.extend(phrase.iter().cloned());
            let mut entry = previous;
            entry.push(phrase[0].clone());
            phrases.push(entry);
            previous = phrase;
        }
        Ok(decoded)
    }

    /// Same formula as Huffman, counting the decimal text of each code as its bit length.
    pub fn compression_ratio(&self, encoded: Option<&[u32]>) -> f64 {
        let encoded = encoded.unwrap_or(&self.encoded);
        compression_ratio(self.unencoded_len, code_text_len(encoded))
    }

    pub fn encoded_samples(&self) -> &[u32] {
        &self.encoded
    }

    /// Seed symbols of the last `encode`, indexed by their code.
    pub fn alphabet(&self) -> &[S] {
        &self.alphabet
    }
}

/// Total length of the codes written out as decimal strings.
pub fn code_text_len(codes: &[u32]) -> usize {
    codes.iter().map(|code| code.to_string().len()).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec() -> LzwCodec<Symbol> {
        LzwCodec::default()
    }

    #[test]
    fn test_two_samples() {
        let mut lzw = codec();
        assert_eq!(lzw.encode(&[1, 10]).unwrap(), vec![0, 1]);
        assert_eq!(lzw.compression_ratio(None), 4.0);
    }

    #[test]
    fn test_from_notes() {
        let mut lzw = codec();
        let encoded = lzw.encode(&[123, 123, 100, 100, 100, 100, 99, 99, 50, 10]).unwrap();
        let printed: Vec<String> = encoded.iter().map(u32::to_string).collect();
        assert_eq!(printed, vec!["0", "0", "1", "7", "1", "2", "2", "3", "4"]);
        assert_eq!(lzw.alphabet(), &[123, 100, 99, 50, 10]);
        // 20 bytes over ceil(9 / 8) bytes
        assert_eq!(lzw.compression_ratio(None), 10.0);
    }

    #[test]
    fn test_single_sample() {
        let mut lzw = codec();
        assert_eq!(lzw.encode(&[7]).unwrap(), vec![0]);
        assert_eq!(lzw.decode(&[0]).unwrap(), vec![7]);
    }

    #[test]
    fn test_empty() {
        assert!(matches!(codec().encode(&[]), Err(CodecError::EmptyInput { .. })));
        assert!(codec().decode(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_round_trip() {
        let samples = vec![123, 123, 100, 100, 100, 100, 99, 99, 50, 10];
        let mut lzw = codec();
        let encoded = lzw.encode(&samples).unwrap();
        assert_eq!(lzw.decode(&encoded).unwrap(), samples);
    }

    #[test]
    fn test_code_defined_by_itself() {
        // a run emits each new phrase right after defining it
        let samples = vec![3, 3, 3, 3, 3, 3, 3];
        let mut lzw = codec();
        let encoded = lzw.encode(&samples).unwrap();
        assert_eq!(encoded, vec![0, 1, 2, 0]);
        assert_eq!(lzw.decode(&encoded).unwrap(), samples);
    }

    #[test]
    fn test_no_separator_collisions() {
        // 1 followed by 12 and 11 followed by 2 print alike but are distinct phrases
        let samples = vec![1, 12, 11, 2, 1, 12, 11, 2];
        let mut lzw = codec();
        let encoded = lzw.encode(&samples).unwrap();
        assert_eq!(lzw.decode(&encoded).unwrap(), samples);
    }

    #[test]
    fn test_invalid_code() {
        assert!(matches!(
            LzwCodec::decode_with_alphabet(&[1, 2], &[0, 9]),
            Err(CodecError::InvalidLzwCode { code: 9 })
        ));
        assert!(matches!(
            LzwCodec::decode_with_alphabet(&[1, 2], &[5]),
            Err(CodecError::InvalidLzwCode { code: 5 })
        ));
    }

    #[test]
    fn test_string_symbols() {
        let codes = vec!["10", "0", "10", "10", "11"].into_iter().map(String::from).collect::<Vec<_>>();
        let mut lzw: LzwCodec<String> = LzwCodec::default();
        let encoded = lzw.encode(&codes).unwrap();
        assert_eq!(lzw.decode(&encoded).unwrap(), codes);
    }
}
