//! Symbol statistics: relative frequencies, entropy and average code length
use std::collections::HashMap;
use std::hash::Hash;

use crate::entropy::tree::CodeTree;

/// Relative frequency of every distinct symbol, in order of first occurrence.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolFrequencyTable<S> {
    entries: Vec<(S, usize)>,
    total: usize,
}

impl<S: Clone + Eq + Hash> SymbolFrequencyTable<S> {
    pub fn from_samples(samples: &[S]) -> Self {
        let mut index: HashMap<&S, usize> = HashMap::new();
        let mut entries: Vec<(S, usize)> = vec![];
        for sample in samples {
            match index.get(sample) {
                Some(&slot) => entries[slot].1 += 1,
                None => {
                    index.insert(sample, entries.len());
                    entries.push((sample.clone(), 1));
                }
            }
        }
        SymbolFrequencyTable { entries, total: samples.len() }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn count(&self, symbol: &S) -> usize {
        self.entries.iter()
            .find(|(candidate, _)| candidate == symbol)
            .map_or(0, |(_, count)| *count)
    }

    /// `(symbol, count / total)` pairs in first-occurrence order.
    pub fn iter(&self) -> impl Iterator<Item = (&S, f64)> + '_ {
        let total = self.total as f64;
        self.entries.iter().map(move |(symbol, count)| (symbol, *count as f64 / total))
    }

    pub fn probabilities(&self) -> Vec<f64> {
        self.iter().map(|(_, p)| p).collect()
    }
}

/// First-order Shannon entropy in bits per symbol.
pub fn entropy<S: Clone + Eq + Hash>(table: &SymbolFrequencyTable<S>) -> f64 {
    table.iter().map(|(_, p)| p * (1.0 / p).log2()).sum()
}

/// Expected code length in bits per symbol; a lone root leaf still costs one bit.
pub fn average_code_length<S: Clone + Eq + Hash>(tree: &CodeTree<S>, table: &SymbolFrequencyTable<S>) -> f64 {
    let lengths = tree.code_lengths();
    table.iter()
        .map(|(symbol, p)| p * lengths.get(symbol).copied().unwrap_or(0).max(1) as f64)
        .sum()
}
