//! Binary prefix-code tree built from a symbol frequency table.
//!
//! Nodes live in an arena and refer to their children by index; a node is
//! either a leaf carrying one symbol or a branch with exactly two children.
//! The serialized form is a pre-order token stream where a branch is written
//! as `1` and a leaf as `0` followed by its value in a fixed number of bits.
use std::collections::HashMap;
use std::hash::Hash;

use crate::entropy::bits;
use crate::entropy::stats::SymbolFrequencyTable;
use crate::error::{CodecError, Result};
use crate::Symbol;

pub type NodeId = usize;

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind<S> {
    Leaf(S),
    Branch([NodeId; 2]),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node<S> {
    /// Sum of the leaf probabilities below this node; 0 for trees read back from storage.
    pub probability: f64,
    pub kind: NodeKind<S>,
}

/// Number of bits used to store a leaf value in a serialized tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LeafWidth {
    /// 8-bit unsigned leaves, values 0..=255
    Byte,
    /// 16-bit two's complement leaves, values -32768..=32767
    Short,
}

impl LeafWidth {
    pub fn bits(self) -> u32 {
        match self {
            LeafWidth::Byte => 8,
            LeafWidth::Short => 16,
        }
    }

    fn signed(self) -> bool {
        matches!(self, LeafWidth::Short)
    }

    pub fn fits(self, symbol: Symbol) -> bool {
        match self {
            LeafWidth::Byte => (0..=u8::MAX as Symbol).contains(&symbol),
            LeafWidth::Short => (i16::MIN as Symbol..=i16::MAX as Symbol).contains(&symbol),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeToken {
    Branch,
    Leaf(Symbol),
}

/// Pre-order token stream of a code tree, including the root marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerializedTree {
    pub tokens: Vec<TreeToken>,
    pub leaf_width: LeafWidth,
}

impl SerializedTree {
    pub fn to_bits(&self) -> String {
        let mut out = String::new();
        for token in &self.tokens {
            match token {
                TreeToken::Branch => out.push('1'),
                TreeToken::Leaf(symbol) => {
                    out.push('0');
                    out.push_str(&bits::to_fixed_bits(*symbol as i64, self.leaf_width.bits()));
                }
            }
        }
        out
    }

    /// Tokenize a bit string produced by [`SerializedTree::to_bits`] (padding already removed).
    pub fn parse(serialized: &str, leaf_width: LeafWidth) -> Result<Self> {
        let width = leaf_width.bits() as usize;
        let raw = serialized.as_bytes();
        let mut tokens = vec![];
        let mut position = 0;
        while position < raw.len() {
            match raw[position] {
                b'1' => {
                    tokens.push(TreeToken::Branch);
                    position += 1;
                }
                b'0' => {
                    let end = position + 1 + width;
                    if end > raw.len() {
                        return Err(CodecError::malformed_tree(format!(
                            "leaf at bit {} is cut short", position
                        )));
                    }
                    let field = &raw[position + 1..end];
                    if let Some(offset) = field.iter().position(|b| !matches!(b, b'0' | b'1')) {
                        return Err(CodecError::malformed_tree(format!(
                            "leaf at bit {} has a non-binary byte at bit {}",
                            position,
                            position + 1 + offset
                        )));
                    }
                    // only ASCII digits remain, so this is a valid str
                    let field = std::str::from_utf8(field)
                        .map_err(|e| CodecError::malformed_tree(e.to_string()))?;
                    let value = bits::from_fixed_bits(field, leaf_width.signed())
                        .map_err(|e| CodecError::malformed_tree(e.to_string()))?;
                    tokens.push(TreeToken::Leaf(value as Symbol));
                    position = end;
                }
                other => {
                    return Err(CodecError::malformed_tree(format!(
                        "token {:?} at bit {} is neither 1 nor 0", other as char, position
                    )))
                }
            }
        }
        Ok(SerializedTree { tokens, leaf_width })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CodeTree<S> {
    nodes: Vec<Node<S>>,
    root: NodeId,
    /// Leaves in frequency table order (built trees) or pre-order (read trees).
    leaves: Vec<NodeId>,
}

impl<S: Clone + Eq + Hash> CodeTree<S> {
    /// Repeatedly merge the two least probable nodes until one root remains.
    ///
    /// The working set is re-sorted with a stable sort before every merge and
    /// the merged node is appended at the end, so ties keep their table order.
    pub fn build(table: &SymbolFrequencyTable<S>) -> Result<CodeTree<S>> {
        if table.is_empty() {
            return Err(CodecError::EmptyInput { context: "code tree build" });
        }
        let mut nodes: Vec<Node<S>> = table.iter()
            .map(|(symbol, probability)| Node { probability, kind: NodeKind::Leaf(symbol.clone()) })
            .collect();
        let mut leaves: Vec<NodeId> = (0..nodes.len()).collect();

        if nodes.len() == 1 {
            let twin = nodes[0].clone();
            let probability = twin.probability;
            nodes.push(twin);
            leaves.push(1);
            nodes.push(Node { probability, kind: NodeKind::Branch([0, 1]) });
            return Ok(CodeTree { nodes, root: 2, leaves });
        }

        let mut working = leaves.clone();
        while working.len() > 1 {
            working.sort_by(|a, b| nodes[*a].probability.total_cmp(&nodes[*b].probability));
            let (first, second) = (working[0], working[1]);
            let merged = nodes.len();
            let probability = nodes[first].probability + nodes[second].probability;
            nodes.push(Node { probability, kind: NodeKind::Branch([first, second]) });
            working.drain(..2);
            working.push(merged);
        }
        let root = working[0];
        Ok(CodeTree { nodes, root, leaves })
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &Node<S> {
        &self.nodes[id]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn leaf_count(&self) -> usize {
        self.leaves.len()
    }

    pub fn symbol(&self, id: NodeId) -> Option<&S> {
        match &self.nodes[id].kind {
            NodeKind::Leaf(symbol) => Some(symbol),
            NodeKind::Branch(_) => None,
        }
    }

    /// Follow one edge: `false` takes the first child, `true` the second.
    pub fn child(&self, id: NodeId, bit: bool) -> Option<NodeId> {
        match self.nodes[id].kind {
            NodeKind::Branch(children) => Some(children[bit as usize]),
            NodeKind::Leaf(_) => None,
        }
    }

    /// Code of every node: the root gets the empty string, and each child
    /// appends `0` (first) or `1` (second) to its parent's code.
    pub fn assign_codes(&self) -> Vec<String> {
        let mut codes = vec![String::new(); self.nodes.len()];
        let mut stack = vec![(self.root, String::new())];
        while let Some((id, code)) = stack.pop() {
            if let NodeKind::Branch([first, second]) = self.nodes[id].kind {
                stack.push((second, format!("{code}1")));
                stack.push((first, format!("{code}0")));
            }
            codes[id] = code;
        }
        codes
    }

    /// Symbol to code lookup; with duplicate leaves the first one wins.
    pub fn code_table(&self) -> HashMap<S, String> {
        let codes = self.assign_codes();
        let mut table = HashMap::with_capacity(self.leaves.len());
        for &leaf in &self.leaves {
            if let Some(symbol) = self.symbol(leaf) {
                table.entry(symbol.clone()).or_insert_with(|| codes[leaf].clone());
            }
        }
        table
    }

    /// Number of edges between every node and the root.
    pub fn depths(&self) -> Vec<usize> {
        let mut depths = vec![0; self.nodes.len()];
        let mut stack = vec![(self.root, 0usize)];
        while let Some((id, depth)) = stack.pop() {
            depths[id] = depth;
            if let NodeKind::Branch(children) = self.nodes[id].kind {
                stack.extend(children.iter().map(|&child| (child, depth + 1)));
            }
        }
        depths
    }

    pub fn depth(&self, id: NodeId) -> usize {
        self.depths()[id]
    }

    pub fn code_lengths(&self) -> HashMap<S, usize> {
        let depths = self.depths();
        let mut lengths = HashMap::with_capacity(self.leaves.len());
        for &leaf in &self.leaves {
            if let Some(symbol) = self.symbol(leaf) {
                lengths.entry(symbol.clone()).or_insert(depths[leaf]);
            }
        }
        lengths
    }
}

impl CodeTree<Symbol> {
    pub fn serialize(&self, leaf_width: LeafWidth) -> Result<SerializedTree> {
        let mut tokens = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            match self.nodes[id].kind {
                NodeKind::Branch([first, second]) => {
                    tokens.push(TreeToken::Branch);
                    stack.push(second);
                    stack.push(first);
                }
                NodeKind::Leaf(symbol) => {
                    if !leaf_width.fits(symbol) {
                        return Err(CodecError::SymbolOutOfRange {
                            symbol: symbol as i64,
                            bits: leaf_width.bits(),
                        });
                    }
                    tokens.push(TreeToken::Leaf(symbol));
                }
            }
        }
        Ok(SerializedTree { tokens, leaf_width })
    }

    /// Rebuild a tree from the tokens that follow the root marker.
    ///
    /// The root is implicitly a branch; every branch must receive exactly two
    /// children and no token may follow the last child of the root.
    pub fn deserialize(body: &[TreeToken]) -> Result<CodeTree<Symbol>> {
        let mut nodes = vec![Node { probability: 0.0, kind: NodeKind::Branch([0, 0]) }];
        let mut leaves = vec![];
        // (branch, children attached so far)
        let mut pending: Vec<(NodeId, usize)> = vec![(0, 0)];

        for (index, token) in body.iter().enumerate() {
            let id = nodes.len();
            let kind = match token {
                TreeToken::Branch => NodeKind::Branch([0, 0]),
                TreeToken::Leaf(symbol) => {
                    leaves.push(id);
                    NodeKind::Leaf(*symbol)
                }
            };
            nodes.push(Node { probability: 0.0, kind });

            let Some(top) = pending.last_mut() else {
                return Err(CodecError::malformed_tree(format!(
                    "token {} follows a complete tree", index
                )));
            };
            let (parent, slot) = *top;
            if let NodeKind::Branch(children) = &mut nodes[parent].kind {
                children[slot] = id;
            }
            top.1 += 1;
            if top.1 == 2 {
                pending.pop();
            }
            if matches!(token, TreeToken::Branch) {
                pending.push((id, 0));
            }
        }

        if let Some((branch, filled)) = pending.last() {
            return Err(CodecError::malformed_tree(format!(
                "internal node {} has {} of 2 children", branch, filled
            )));
        }
        Ok(CodeTree { nodes, root: 0, leaves })
    }
}
