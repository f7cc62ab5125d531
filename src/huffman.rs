use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};
use std::fmt;

use log::{debug, trace};

use crate::error::{Error, Result};
use crate::frequency::{FrequencyTable, Symbol};

/// A node of a Huffman tree. Children are owned by their parent.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Node<S> {
    Leaf {
        symbol: S,
        freq: u64,
    },
    Internal {
        freq: u64,
        left: Box<Node<S>>,
        right: Box<Node<S>>,
    },
}

impl<S> Node<S> {
    pub fn freq(&self) -> u64 {
        match self {
            Node::Leaf { freq, .. } => *freq,
            Node::Internal { freq, .. } => *freq,
        }
    }

    pub fn symbol(&self) -> Option<&S> {
        match self {
            Node::Leaf { symbol, .. } => Some(symbol),
            Node::Internal { .. } => None,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf { .. })
    }

    /// Merges two subtrees; `left` is the one taken off the heap first.
    pub fn merge(left: Node<S>, right: Node<S>) -> Result<Node<S>> {
        let freq = left.freq().checked_add(right.freq()).ok_or_else(|| {
            Error::InvalidInput(format!(
                "combined weight {} + {} overflows u64",
                left.freq(),
                right.freq()
            ))
        })?;
        Ok(Node::Internal {
            freq,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    pub fn leaf_count(&self) -> usize {
        match self {
            Node::Leaf { .. } => 1,
            Node::Internal { left, right, .. } => left.leaf_count() + right.leaf_count(),
        }
    }

    /// Length of the longest root-to-leaf path. A lone leaf has depth 0.
    pub fn depth(&self) -> usize {
        match self {
            Node::Leaf { .. } => 0,
            Node::Internal { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }
}

impl<S: Symbol> Node<S> {
    /// Checks the invariants a builder-made tree always satisfies: every
    /// internal weight is the sum of its children and no symbol labels two
    /// leaves.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        self.validate_into(&mut seen)
    }

    fn validate_into<'a>(&'a self, seen: &mut HashSet<&'a S>) -> Result<()> {
        match self {
            Node::Leaf { symbol, .. } => {
                if !seen.insert(symbol) {
                    return Err(Error::InvalidTree(format!(
                        "symbol {:?} appears on more than one leaf",
                        symbol
                    )));
                }
                Ok(())
            }
            Node::Internal { freq, left, right } => {
                let sum = left.freq().checked_add(right.freq());
                if sum != Some(*freq) {
                    return Err(Error::InvalidTree(format!(
                        "internal node weight {} does not match children {} + {}",
                        freq,
                        left.freq(),
                        right.freq()
                    )));
                }
                left.validate_into(seen)?;
                right.validate_into(seen)
            }
        }
    }
}

impl<S: fmt::Debug> Node<S> {
    fn fmt_indented(&self, f: &mut fmt::Formatter<'_>, depth: usize, label: &str) -> fmt::Result {
        let indent = "  ".repeat(depth);
        match self {
            Node::Leaf { symbol, freq } => {
                writeln!(f, "{}{}-> Leaf {:?} [weight: {}]", indent, label, symbol, freq)
            }
            Node::Internal { freq, left, right } => {
                writeln!(f, "{}{}-> Internal [weight: {}]", indent, label, freq)?;
                left.fmt_indented(f, depth + 1, "0")?;
                right.fmt_indented(f, depth + 1, "1")
            }
        }
    }
}

impl<S: fmt::Debug> fmt::Display for Node<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_indented(f, 0, "root")
    }
}

pub type HuffmanTree<S> = Node<S>;

/// Heap entry keyed by `(freq, seq)`.
///
/// `seq` is the insertion position for leaves and a running counter for
/// merged nodes, so equal weights pop in the order they were created.
struct HeapNode<S> {
    freq: u64,
    seq: usize,
    node: Node<S>,
}

impl<S> Ord for HeapNode<S> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for Min-Heap behavior in BinaryHeap (which is max-heap by default)
        other
            .freq
            .cmp(&self.freq)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl<S> PartialOrd for HeapNode<S> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<S> PartialEq for HeapNode<S> {
    fn eq(&self, other: &Self) -> bool {
        self.freq == other.freq && self.seq == other.seq
    }
}

impl<S> Eq for HeapNode<S> {}

/// Builds an optimal prefix-code tree by repeatedly merging the two lightest
/// nodes. The node popped first becomes the left child.
pub fn build_huffman_tree<S: Symbol>(frequencies: &FrequencyTable<S>) -> Result<HuffmanTree<S>> {
    let total = frequencies.validate()?;
    debug!(
        "Building Huffman Tree from {} unique symbols (total weight {})",
        frequencies.len(),
        total
    );

    let mut heap = BinaryHeap::with_capacity(frequencies.len());
    for (seq, (symbol, freq)) in frequencies.iter().enumerate() {
        // validate() has already rejected negatives
        let freq = freq.unsigned_abs();
        heap.push(HeapNode {
            freq,
            seq,
            node: Node::Leaf {
                symbol: symbol.clone(),
                freq,
            },
        });
    }
    debug!("Initial heap size: {}", heap.len());

    let mut next_seq = heap.len();
    while let Some(left) = heap.pop() {
        let Some(right) = heap.pop() else {
            debug!("Tree construction complete.");
            return Ok(left.node);
        };

        trace!(
            "Merging weights {} (seq {}) and {} (seq {})",
            left.freq, left.seq, right.freq, right.seq
        );
        let node = Node::merge(left.node, right.node)?;
        heap.push(HeapNode {
            freq: node.freq(),
            seq: next_seq,
            node,
        });
        next_seq += 1;
    }

    Err(Error::InvalidInput("frequency table is empty".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(entries: &[(char, i64)]) -> FrequencyTable<char> {
        entries.iter().copied().collect()
    }

    fn leaf(symbol: char, freq: u64) -> Node<char> {
        Node::Leaf { symbol, freq }
    }

    fn merge(left: Node<char>, right: Node<char>) -> Node<char> {
        Node::merge(left, right).unwrap()
    }

    #[test]
    fn empty_table_is_rejected() {
        let err = build_huffman_tree(&table(&[])).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn negative_frequency_is_rejected() {
        let err = build_huffman_tree(&table(&[('a', 4), ('b', -2)])).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn single_symbol_yields_lone_leaf() {
        let tree = build_huffman_tree(&table(&[('z', 0)])).unwrap();
        assert_eq!(tree, leaf('z', 0));
        assert_eq!(tree.depth(), 0);
    }

    #[test]
    fn root_weight_is_total_and_leaves_are_the_alphabet() {
        let tree = build_huffman_tree(&table(&[('a', 3), ('b', 1), ('c', 7), ('d', 1)])).unwrap();
        assert_eq!(tree.freq(), 12);
        assert_eq!(tree.leaf_count(), 4);
        tree.validate().unwrap();
    }

    #[test]
    fn ties_merge_first_inserted_first() {
        // all equal: (a,b) then (c,d) then the two pairs
        let tree = build_huffman_tree(&table(&[('a', 1), ('b', 1), ('c', 1), ('d', 1)])).unwrap();
        let expected = merge(
            merge(leaf('a', 1), leaf('b', 1)),
            merge(leaf('c', 1), leaf('d', 1)),
        );
        assert_eq!(tree, expected);
    }

    #[test]
    fn leaves_precede_merged_nodes_of_equal_weight() {
        // a+b = 2 ties with c = 2; the leaf c was created first
        let tree = build_huffman_tree(&table(&[('a', 1), ('b', 1), ('c', 2)])).unwrap();
        let expected = merge(leaf('c', 2), merge(leaf('a', 1), leaf('b', 1)));
        assert_eq!(tree, expected);
    }

    #[test]
    fn insertion_order_decides_equal_weights() {
        let forward = build_huffman_tree(&table(&[('x', 5), ('y', 5)])).unwrap();
        let backward = build_huffman_tree(&table(&[('y', 5), ('x', 5)])).unwrap();
        assert_eq!(forward, merge(leaf('x', 5), leaf('y', 5)));
        assert_eq!(backward, merge(leaf('y', 5), leaf('x', 5)));
    }

    #[test]
    fn merge_rejects_overflowing_weight() {
        let err = Node::merge(leaf('a', u64::MAX), leaf('b', 1)).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
        assert_eq!(merge(leaf('a', u64::MAX - 1), leaf('b', 1)).freq(), u64::MAX);
    }

    #[test]
    fn validate_reports_weight_mismatch() {
        let bad = Node::Internal {
            freq: 10,
            left: Box::new(leaf('a', 1)),
            right: Box::new(leaf('b', 2)),
        };
        assert!(matches!(bad.validate(), Err(Error::InvalidTree(_))));
    }

    #[test]
    fn validate_reports_duplicate_symbol() {
        let bad = merge(leaf('a', 1), leaf('a', 2));
        assert!(matches!(bad.validate(), Err(Error::InvalidTree(_))));
    }

    #[test]
    fn display_lists_every_node() {
        let tree = merge(leaf('a', 1), leaf('b', 2));
        let text = tree.to_string();
        assert_eq!(text.lines().count(), 3);
        assert!(text.starts_with("root-> Internal [weight: 3]"));
        assert!(text.contains("0-> Leaf 'a' [weight: 1]"));
    }
}
