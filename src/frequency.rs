use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

use log::debug;

use crate::error::{Error, Result};

/// Anything that can label a leaf of the tree.
pub trait Symbol: Clone + Eq + Hash + Debug {}

impl<T: Clone + Eq + Hash + Debug> Symbol for T {}

/// Symbol weights in insertion order.
///
/// Insertion order is the tie-break order used by the tree builder: among
/// equal frequencies the symbol inserted first is merged first. Frequencies
/// are signed so that callers can hand over raw counts; [`validate`] rejects
/// anything negative before a tree is built.
///
/// [`validate`]: FrequencyTable::validate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencyTable<S: Symbol> {
    entries: Vec<(S, i64)>,
    index: HashMap<S, usize>,
}

impl<S: Symbol> FrequencyTable<S> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Counts every occurrence in `symbols`. A symbol's position is fixed by
    /// its first occurrence.
    pub fn from_symbols<I>(symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
    {
        let mut table = Self::new();
        for symbol in symbols {
            table.increment(symbol);
        }
        debug!("Counted {} unique symbols", table.len());
        table
    }

    /// Sets the frequency of `symbol`, returning the previous one. A symbol
    /// that is already present keeps its original position.
    pub fn insert(&mut self, symbol: S, freq: i64) -> Option<i64> {
        match self.index.get(&symbol) {
            Some(&i) => Some(std::mem::replace(&mut self.entries[i].1, freq)),
            None => {
                self.index.insert(symbol.clone(), self.entries.len());
                self.entries.push((symbol, freq));
                None
            }
        }
    }

    fn increment(&mut self, symbol: S) {
        match self.index.get(&symbol) {
            Some(&i) => self.entries[i].1 = self.entries[i].1.saturating_add(1),
            None => {
                self.insert(symbol, 1);
            }
        }
    }

    pub fn get(&self, symbol: &S) -> Option<i64> {
        self.index.get(symbol).map(|&i| self.entries[i].1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&S, i64)> {
        self.entries.iter().map(|(s, f)| (s, *f))
    }

    /// Checks that a tree can be built from this table and returns the total
    /// weight.
    pub fn validate(&self) -> Result<u64> {
        if self.entries.is_empty() {
            return Err(Error::InvalidInput(
                "frequency table is empty".to_string(),
            ));
        }

        let mut total: u64 = 0;
        for (symbol, freq) in &self.entries {
            let freq = u64::try_from(*freq).map_err(|_| {
                Error::InvalidInput(format!(
                    "negative frequency {} for symbol {:?}",
                    freq, symbol
                ))
            })?;
            total = total.checked_add(freq).ok_or_else(|| {
                Error::InvalidInput("sum of frequencies overflows u64".to_string())
            })?;
        }
        Ok(total)
    }

    /// Sum of all frequencies, or `None` if the table does not validate.
    pub fn total(&self) -> Option<u64> {
        self.validate().ok()
    }

    /// Shannon entropy in bits per symbol. Zero for an empty or zero-weight
    /// table.
    pub fn entropy(&self) -> f64 {
        let total = match self.total() {
            Some(t) if t > 0 => t as f64,
            _ => return 0.0,
        };

        let entropy: f64 = self
            .entries
            .iter()
            .filter(|(_, count)| *count > 0)
            .map(|(_, count)| {
                let p = *count as f64 / total;
                -p * p.log2()
            })
            .sum();

        debug!(
            "Calculated entropy: {:.4} bits/symbol (Total samples: {})",
            entropy, total
        );
        entropy
    }
}

impl<S: Symbol> Default for FrequencyTable<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Symbol> Extend<(S, i64)> for FrequencyTable<S> {
    fn extend<I: IntoIterator<Item = (S, i64)>>(&mut self, iter: I) {
        for (symbol, freq) in iter {
            self.insert(symbol, freq);
        }
    }
}

impl<S: Symbol> FromIterator<(S, i64)> for FrequencyTable<S> {
    fn from_iter<I: IntoIterator<Item = (S, i64)>>(iter: I) -> Self {
        let mut table = Self::new();
        table.extend(iter);
        table
    }
}
