use std::collections::HashMap;

use log::{debug, error, trace};

use crate::error::{Error, Result};
use crate::frequency::{FrequencyTable, Symbol};
use crate::huffman::Node;

/// Per-symbol bit strings of `'0'` and `'1'`, derived once from a finished
/// tree. No code is a prefix of another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeTable<S: Symbol> {
    codes: HashMap<S, String>,
}

impl<S: Symbol> CodeTable<S> {
    pub fn get(&self, symbol: &S) -> Option<&str> {
        self.codes.get(symbol).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Entries ordered by code length, then lexicographically by code.
    pub fn iter(&self) -> impl Iterator<Item = (&S, &str)> {
        let mut entries: Vec<_> = self.codes.iter().map(|(s, c)| (s, c.as_str())).collect();
        entries.sort_by(|a, b| a.1.len().cmp(&b.1.len()).then(a.1.cmp(b.1)));
        entries.into_iter()
    }

    pub fn max_code_length(&self) -> usize {
        self.codes.values().map(String::len).max().unwrap_or(0)
    }

    /// Sum over `frequencies` of weight times code length, or `None` if it
    /// does not fit in a `u64`. Symbols without a code, or with a negative
    /// weight, contribute nothing.
    pub fn weighted_path_length(&self, frequencies: &FrequencyTable<S>) -> Option<u64> {
        let mut total: u64 = 0;
        for (symbol, freq) in frequencies.iter() {
            let (Some(code), Ok(freq)) = (self.codes.get(symbol), u64::try_from(freq)) else {
                continue;
            };
            total = total.checked_add(freq.checked_mul(code.len() as u64)?)?;
        }
        Some(total)
    }

    /// Weighted path length divided by total weight, in bits per symbol.
    pub fn average_code_length(&self, frequencies: &FrequencyTable<S>) -> f64 {
        let total = match frequencies.total() {
            Some(total) if total > 0 => total as f64,
            _ => return 0.0,
        };

        let weighted: f64 = frequencies
            .iter()
            .filter_map(|(symbol, freq)| {
                let code = self.codes.get(symbol)?;
                let freq = u64::try_from(freq).ok()?;
                Some(freq as f64 * code.len() as f64)
            })
            .sum();
        weighted / total
    }

    /// `Σ 2^-len(code)`; at most 1 for any prefix code.
    pub fn kraft_sum(&self) -> f64 {
        self.codes
            .values()
            .map(|code| 0.5f64.powi(code.len() as i32))
            .sum()
    }

    pub fn is_prefix_free(&self) -> bool {
        // after sorting, a prefix sits directly before some word it prefixes
        let mut codes: Vec<&str> = self.codes.values().map(String::as_str).collect();
        codes.sort_unstable();
        codes.windows(2).all(|pair| !pair[1].starts_with(pair[0]))
    }

    /// Concatenates the codes of `symbols`.
    pub fn encode(&self, symbols: &[S]) -> Result<String> {
        debug!("Encoding {} symbols...", symbols.len());
        let mut bits = String::with_capacity(symbols.len() * self.max_code_length());

        for symbol in symbols {
            match self.codes.get(symbol) {
                Some(code) => bits.push_str(code),
                None => {
                    error!("Symbol {:?} found in data but not in code table!", symbol);
                    return Err(Error::UnknownSymbol(format!("{:?}", symbol)));
                }
            }
        }

        debug!("Encoded into {} bits", bits.len());
        Ok(bits)
    }

    pub(crate) fn inverse(&self) -> HashMap<&str, &S> {
        self.codes.iter().map(|(s, c)| (c.as_str(), s)).collect()
    }
}

/// Derives the code of every leaf from its path: `0` for a left step, `1`
/// for a right step. A tree that is a single leaf gets the code `"0"`.
pub fn build_code_table<S: Symbol>(root: &Node<S>) -> Result<CodeTable<S>> {
    let mut codes = HashMap::new();
    assign_codes(root, String::new(), &mut codes)?;
    debug!("Code table built with {} entries.", codes.len());
    Ok(CodeTable { codes })
}

fn assign_codes<S: Symbol>(
    node: &Node<S>,
    prefix: String,
    table: &mut HashMap<S, String>,
) -> Result<()> {
    match node {
        Node::Leaf { symbol, .. } => {
            let code = if prefix.is_empty() {
                "0".to_string()
            } else {
                prefix
            };
            trace!("Assigning code to {:?} : '{}'", symbol, code);
            if table.insert(symbol.clone(), code).is_some() {
                return Err(Error::InvalidTree(format!(
                    "symbol {:?} appears on more than one leaf",
                    symbol
                )));
            }
            Ok(())
        }
        Node::Internal { freq, left, right } => {
            if left.freq().checked_add(right.freq()) != Some(*freq) {
                return Err(Error::InvalidTree(format!(
                    "internal node weight {} does not match children {} + {}",
                    freq,
                    left.freq(),
                    right.freq()
                )));
            }
            assign_codes(left, format!("{}0", prefix), table)?;
            assign_codes(right, format!("{}1", prefix), table)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::huffman::build_huffman_tree;

    fn leaf(symbol: char, freq: u64) -> Node<char> {
        Node::Leaf { symbol, freq }
    }

    fn merge(left: Node<char>, right: Node<char>) -> Node<char> {
        Node::merge(left, right).unwrap()
    }

    fn codes_for(entries: &[(char, i64)]) -> CodeTable<char> {
        let freq: FrequencyTable<char> = entries.iter().copied().collect();
        build_code_table(&build_huffman_tree(&freq).unwrap()).unwrap()
    }

    #[test]
    fn left_is_zero_right_is_one() {
        let tree = merge(leaf('a', 1), merge(leaf('b', 1), leaf('c', 1)));
        let table = build_code_table(&tree).unwrap();
        assert_eq!(table.get(&'a'), Some("0"));
        assert_eq!(table.get(&'b'), Some("10"));
        assert_eq!(table.get(&'c'), Some("11"));
    }

    #[test]
    fn lone_leaf_gets_zero() {
        let table = build_code_table(&leaf('q', 42)).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.get(&'q'), Some("0"));
        assert_eq!(table.kraft_sum(), 0.5);
    }

    #[test]
    fn malformed_trees_are_rejected() {
        let mismatch = Node::Internal {
            freq: 1,
            left: Box::new(leaf('a', 1)),
            right: Box::new(leaf('b', 1)),
        };
        assert!(matches!(build_code_table(&mismatch), Err(Error::InvalidTree(_))));

        let duplicate = merge(leaf('a', 1), merge(leaf('b', 1), leaf('a', 1)));
        assert!(matches!(build_code_table(&duplicate), Err(Error::InvalidTree(_))));
    }

    #[test]
    fn iter_orders_by_length_then_code() {
        let table = codes_for(&[('d', 1), ('a', 1), ('b', 1), ('c', 3)]);
        let sorted: Vec<_> = table.iter().map(|(s, c)| (*s, c)).collect();
        assert_eq!(sorted, vec![('c', "0"), ('b', "10"), ('d', "110"), ('a', "111")]);
    }

    #[test]
    fn complete_code_has_kraft_sum_one() {
        let table = codes_for(&[('a', 1), ('b', 2), ('c', 4), ('d', 8), ('e', 16)]);
        assert!(table.is_prefix_free());
        assert!((table.kraft_sum() - 1.0).abs() < 1e-12);
        assert_eq!(table.max_code_length(), 4);
    }

    #[test]
    fn prefix_check_detects_violations() {
        let table = CodeTable {
            codes: [('a', "0".to_string()), ('b', "01".to_string())]
                .into_iter()
                .collect(),
        };
        assert!(!table.is_prefix_free());
    }

    #[test]
    fn encode_concatenates_codes() {
        let table = codes_for(&[('a', 1), ('b', 1), ('c', 2)]);
        assert_eq!(table.encode(&['c', 'a', 'b', 'c']).unwrap(), "010110");
        assert_eq!(table.encode(&[]).unwrap(), "");
    }

    #[test]
    fn encode_unknown_symbol_fails() {
        let table = codes_for(&[('a', 1), ('b', 1)]);
        assert!(matches!(table.encode(&['a', 'z']), Err(Error::UnknownSymbol(_))));
    }

    #[test]
    fn weighted_path_length_and_average() {
        let freq: FrequencyTable<char> = [('a', 1), ('b', 1), ('c', 2)].into_iter().collect();
        let table = build_code_table(&build_huffman_tree(&freq).unwrap()).unwrap();
        assert_eq!(table.weighted_path_length(&freq), Some(6));
        assert!((table.average_code_length(&freq) - 1.5).abs() < 1e-12);
    }

    #[test]
    fn weighted_path_length_overflow_is_none() {
        // total weight is exactly u64::MAX, so the table itself is valid
        let freq: FrequencyTable<char> = [('a', i64::MAX), ('b', i64::MAX), ('c', 1)]
            .into_iter()
            .collect();
        assert_eq!(freq.total(), Some(u64::MAX));

        let table = build_code_table(&build_huffman_tree(&freq).unwrap()).unwrap();
        assert_eq!(table.weighted_path_length(&freq), None);

        let average = table.average_code_length(&freq);
        assert!(average.is_finite());
        assert!((1.0..=2.0).contains(&average));
    }
}
