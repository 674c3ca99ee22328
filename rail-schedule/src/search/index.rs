//! Approximate string index over station records.
//!
//! Each record exposes a fixed set of keys (for stations: display name and
//! code). A query is scored against every key with an approximate substring
//! match: the number of edits needed to find the pattern somewhere in the
//! key, normalised by pattern length, plus a penalty for how far from the
//! start of the key the match begins. Lower scores are better; a key only
//! matches when its score is within the threshold.

use std::sync::Arc;

use crate::domain::Station;

/// Records that can be placed in a [`FuzzyIndex`].
pub trait SearchKeys {
    /// The fields a query is matched against, in priority order.
    fn search_keys(&self) -> Vec<&str>;
}

impl SearchKeys for Station {
    fn search_keys(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.code.as_str()]
    }
}

/// Tuning for approximate matching.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchConfig {
    /// Highest score that still counts as a match (0.0 = exact only).
    pub threshold: f64,

    /// Position in the key where matches are expected to start.
    pub location: usize,

    /// How far from `location` a match may start before the position
    /// penalty alone reaches 1.0.
    pub distance: usize,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            threshold: 0.3,
            location: 0,
            distance: 100,
        }
    }
}

/// One ranked query result.
#[derive(Debug, Clone, PartialEq)]
pub struct Match<T> {
    /// The matched record.
    pub item: T,

    /// Position of the record in the collection the index was built from.
    pub ref_index: usize,

    /// Match score; lower is better, 0.0 is an exact match at the start.
    pub score: f64,
}

/// Immutable approximate-match index.
///
/// Built once from a record collection. There is no incremental update:
/// a changed collection means building a new index.
#[derive(Debug, Clone)]
pub struct FuzzyIndex<T = Station> {
    records: Arc<[T]>,
    /// Lowercased characters of each record's keys.
    keys: Vec<Vec<Vec<char>>>,
    config: MatchConfig,
}

impl<T: SearchKeys + Clone> FuzzyIndex<T> {
    /// Build an index with the default matching configuration.
    pub fn build(records: impl IntoIterator<Item = T>) -> Self {
        Self::with_config(records, MatchConfig::default())
    }

    /// Build an index with a custom matching configuration.
    pub fn with_config(records: impl IntoIterator<Item = T>, config: MatchConfig) -> Self {
        let records: Arc<[T]> = records.into_iter().collect();
        let keys = records
            .iter()
            .map(|r| r.search_keys().into_iter().map(lowercase_chars).collect())
            .collect();

        Self {
            records,
            keys,
            config,
        }
    }

    /// Number of indexed records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the index holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The record collection this index was built from.
    pub fn records(&self) -> &Arc<[T]> {
        &self.records
    }

    /// Query the index, returning at most `limit` matches best-first.
    ///
    /// An empty or whitespace-only query matches nothing. Records with equal
    /// scores keep their collection order.
    pub fn query(&self, text: &str, limit: usize) -> Vec<Match<T>> {
        if text.trim().is_empty() || limit == 0 {
            return Vec::new();
        }

        let pattern = lowercase_chars(text);

        let mut scored: Vec<(usize, f64)> = self
            .keys
            .iter()
            .enumerate()
            .filter_map(|(idx, keys)| {
                keys.iter()
                    .filter_map(|key| score_key(&pattern, key, &self.config))
                    .min_by(f64::total_cmp)
                    .map(|score| (idx, score))
            })
            .collect();

        // Stable: equal scores stay in collection order.
        scored.sort_by(|a, b| a.1.total_cmp(&b.1));
        scored.truncate(limit);

        scored
            .into_iter()
            .map(|(ref_index, score)| Match {
                item: self.records[ref_index].clone(),
                ref_index,
                score,
            })
            .collect()
    }
}

fn lowercase_chars(s: &str) -> Vec<char> {
    s.chars().flat_map(char::to_lowercase).collect()
}

/// Cell of the approximate-substring edit table.
#[derive(Clone, Copy)]
struct Cell {
    errors: usize,
    /// Position in the key where the alignment ending here begins.
    start: usize,
}

impl Cell {
    fn better(self, other: Cell) -> Cell {
        if (other.errors, other.start) < (self.errors, self.start) {
            other
        } else {
            self
        }
    }
}

/// Score `pattern` against one key, or `None` if it does not match.
///
/// Runs the classic approximate substring edit table (free leading and
/// trailing key characters) while tracking where each alignment starts.
fn score_key(pattern: &[char], key: &[char], config: &MatchConfig) -> Option<f64> {
    let m = pattern.len();
    let n = key.len();
    if m == 0 || n == 0 {
        return None;
    }

    let mut prev: Vec<Cell> = (0..=n).map(|j| Cell { errors: 0, start: j }).collect();
    let mut cur = prev.clone();

    for i in 1..=m {
        cur[0] = Cell {
            errors: i,
            start: 0,
        };
        for j in 1..=n {
            let substitute = Cell {
                errors: prev[j - 1].errors + usize::from(pattern[i - 1] != key[j - 1]),
                start: prev[j - 1].start,
            };
            let skip_pattern = Cell {
                errors: prev[j].errors + 1,
                start: prev[j].start,
            };
            let skip_key = Cell {
                errors: cur[j - 1].errors + 1,
                start: cur[j - 1].start,
            };
            cur[j] = substitute.better(skip_pattern).better(skip_key);
        }
        std::mem::swap(&mut prev, &mut cur);
    }

    let distance = config.distance.max(1) as f64;
    prev[1..]
        .iter()
        .filter(|cell| cell.errors < m)
        .map(|cell| {
            let accuracy = cell.errors as f64 / m as f64;
            let proximity = cell.start.abs_diff(config.location) as f64 / distance;
            accuracy + proximity
        })
        .filter(|score| *score <= config.threshold)
        .min_by(f64::total_cmp)
}
