//! # huffman_codebook
//!
//! Static Huffman coding: build an optimal prefix-free code from a table of
//! symbol weights, derive per-symbol bit strings, and decode them again.
//!
//! ```rust
//! use huffman_codebook::{FrequencyTable, HuffmanCode};
//!
//! let freq: FrequencyTable<char> = [('a', 5), ('b', 9), ('c', 12), ('d', 13), ('e', 16), ('f', 45)]
//!     .into_iter()
//!     .collect();
//! let code = HuffmanCode::from_frequencies(&freq)?;
//!
//! assert_eq!(code.codes().get(&'f'), Some("0"));
//! let bits = code.encode(&['f', 'a', 'c', 'e'])?;
//! assert_eq!(code.decode(&bits)?, vec!['f', 'a', 'c', 'e']);
//! # Ok::<(), huffman_codebook::Error>(())
//! ```
//!
//! Equal weights are broken by insertion order into the [`FrequencyTable`]:
//! the symbol inserted first is merged first, and original leaves are merged
//! before merged nodes of the same weight. Other tie-break rules give trees
//! of the same total cost but possibly different code lengths.

pub mod code_table;
pub mod decoder;
pub mod error;
pub mod frequency;
pub mod huffman;

pub use code_table::{CodeTable, build_code_table};
pub use decoder::{decode, decode_with_table};
pub use error::{Error, Result};
pub use frequency::{FrequencyTable, Symbol};
pub use huffman::{HuffmanTree, Node, build_huffman_tree};

/// A finished tree together with the code table derived from it.
///
/// Immutable once built; share it behind an `Arc` to encode and decode from
/// several threads.
#[derive(Debug, Clone)]
pub struct HuffmanCode<S: Symbol> {
    tree: HuffmanTree<S>,
    codes: CodeTable<S>,
}

impl<S: Symbol> HuffmanCode<S> {
    pub fn from_frequencies(frequencies: &FrequencyTable<S>) -> Result<Self> {
        let tree = build_huffman_tree(frequencies)?;
        let codes = build_code_table(&tree)?;
        Ok(Self { tree, codes })
    }

    /// Counts `symbols` and builds the code for exactly that alphabet.
    pub fn from_symbols<I>(symbols: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
    {
        Self::from_frequencies(&FrequencyTable::from_symbols(symbols))
    }

    pub fn tree(&self) -> &HuffmanTree<S> {
        &self.tree
    }

    pub fn codes(&self) -> &CodeTable<S> {
        &self.codes
    }

    pub fn encode(&self, symbols: &[S]) -> Result<String> {
        self.codes.encode(symbols)
    }

    pub fn decode(&self, bits: &str) -> Result<Vec<S>> {
        decode(&self.tree, bits)
    }
}
