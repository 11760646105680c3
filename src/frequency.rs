//! Word frequency table and its sorted report.
//!
//! The client tallies every word it receives into a [`FrequencyTable`].
//! Storage order is irrelevant; [`FrequencyTable::sorted`] orders entries by
//! byte-wise comparison of the word, which is what `str`'s `Ord` does.

use std::collections::HashMap;
use std::io::{self, Write};

/// Word → occurrence count.  Every stored count is at least 1.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrequencyTable {
    counts: HashMap<String, u64>,
    total: u64,
}

impl FrequencyTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one occurrence of `word`.  Empty words are ignored.
    pub fn add(&mut self, word: &str) {
        if word.is_empty() {
            return;
        }
        *self.counts.entry(word.to_owned()).or_insert(0) += 1;
        self.total += 1;
    }

    pub fn extend<'a, I: IntoIterator<Item = &'a str>>(&mut self, words: I) {
        for word in words {
            self.add(word);
        }
    }

    pub fn get(&self, word: &str) -> Option<u64> {
        self.counts.get(word).copied()
    }

    /// Number of distinct words.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Sum of all counts.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// `(word, count)` pairs in ascending byte-wise order of `word`.
    pub fn sorted(&self) -> Vec<(&str, u64)> {
        let mut entries: Vec<(&str, u64)> =
            self.counts.iter().map(|(w, &c)| (w.as_str(), c)).collect();
        entries.sort_unstable_by(|a, b| a.0.cmp(b.0));
        entries
    }
}

/// Emit one `word, count` line per entry, sorted by word.
pub fn write_report<W: Write>(table: &FrequencyTable, out: &mut W) -> io::Result<()> {
    for (word, count) in table.sorted() {
        writeln!(out, "{word}, {count}")?;
    }
    out.flush()
}
