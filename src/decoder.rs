use std::time::Instant;

use log::{debug, trace};

use crate::code_table::CodeTable;
use crate::error::{Error, Result};
use crate::frequency::Symbol;
use crate::huffman::Node;

/// Decodes a string of `'0'`/`'1'` by walking `root`, restarting at the
/// root after every leaf.
///
/// A lone-leaf tree decodes each `'0'` to its symbol; a `'1'` selects no
/// branch there and is reported as [`Error::InvalidBit`].
pub fn decode<S: Symbol>(root: &Node<S>, bits: &str) -> Result<Vec<S>> {
    debug!("Starting bitstream decoding...");
    let start_time = Instant::now();

    if let Node::Leaf { symbol, .. } = root {
        return bits
            .chars()
            .enumerate()
            .map(|(position, bit)| match bit {
                '0' => Ok(symbol.clone()),
                _ => Err(Error::InvalidBit { bit, position }),
            })
            .collect();
    }

    let mut result = Vec::new();
    let mut node = root;
    let mut pending = 0;
    let mut consumed = 0;

    for (position, bit) in bits.chars().enumerate() {
        node = match (node, bit) {
            (Node::Internal { left, .. }, '0') => left.as_ref(),
            (Node::Internal { right, .. }, '1') => right.as_ref(),
            (Node::Internal { .. }, _) => return Err(Error::InvalidBit { bit, position }),
            // root is internal and the walk restarts there after every leaf
            (Node::Leaf { .. }, _) => unreachable!(),
        };
        pending += 1;
        consumed = position + 1;

        if let Node::Leaf { symbol, .. } = node {
            trace!("Decoded {:?} from {} bits", symbol, pending);
            result.push(symbol.clone());
            node = root;
            pending = 0;
        }
    }

    if pending > 0 {
        return Err(Error::TruncatedInput { consumed, pending });
    }

    debug!(
        "Bitstream decoding finished in {:.2?}. Decoded {} symbols.",
        start_time.elapsed(),
        result.len()
    );
    Ok(result)
}

/// Decodes using only a code table, by growing a prefix until it matches a
/// code.
pub fn decode_with_table<S: Symbol>(table: &CodeTable<S>, bits: &str) -> Result<Vec<S>> {
    let reverse_table = table.inverse();
    let max_len = table.max_code_length();
    debug!(
        "Reverse lookup table created. Entries: {}",
        reverse_table.len()
    );

    let mut result = Vec::new();
    let mut current_code = String::with_capacity(max_len);
    let mut consumed = 0;

    for (position, bit) in bits.chars().enumerate() {
        if bit != '0' && bit != '1' {
            return Err(Error::InvalidBit { bit, position });
        }
        current_code.push(bit);
        consumed = position + 1;

        if let Some(&symbol) = reverse_table.get(current_code.as_str()) {
            result.push(symbol.clone());
            current_code.clear();
        } else if current_code.len() >= max_len {
            // no code extends this prefix
            return Err(Error::InvalidBit { bit, position });
        }
    }

    if !current_code.is_empty() {
        return Err(Error::TruncatedInput {
            consumed,
            pending: current_code.len(),
        });
    }
    Ok(result)
}
