//! Identifier typo detection
//!
//! Frequency-and-similarity heuristic: a name that is rare in the file but
//! highly similar to a much more common one is likely a misspelling of it.
//! Plain-name and attribute-member counts pool into one table so
//! `self.recieve` and bare `recieve` reinforce each other.

use indexmap::IndexMap;
use std::cmp::Ordering;
use std::collections::HashMap;

const DEFAULT_SIMILARITY_CUTOFF: f64 = 0.85;
const DEFAULT_FREQUENCY_MARGIN: f64 = 1.5;
const DEFAULT_MAX_CANDIDATES: usize = 5;
const DEFAULT_MIN_LENGTH: usize = 2;

/// Thresholds for the typo heuristic.
#[derive(Debug, Clone)]
pub struct TypoConfig {
    /// Minimum similarity ratio for a candidate pair
    pub similarity_cutoff: f64,
    /// Candidate must be used more than `count * margin` times
    pub frequency_margin: f64,
    /// Candidates considered per name, most similar first
    pub max_candidates: usize,
    /// Names shorter than this are never paired
    pub min_length: usize,
}

impl Default for TypoConfig {
    fn default() -> Self {
        Self {
            similarity_cutoff: DEFAULT_SIMILARITY_CUTOFF,
            frequency_margin: DEFAULT_FREQUENCY_MARGIN,
            max_candidates: DEFAULT_MAX_CANDIDATES,
            min_length: DEFAULT_MIN_LENGTH,
        }
    }
}

/// Normalized sequence similarity between two names: `2*LCS / (|a|+|b|)`
/// over characters. Symmetric, 1.0 for identical strings.
pub fn similarity_ratio(a: &str, b: &str) -> f64 {
    if a == b {
        return 1.0;
    }
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    if a_chars.is_empty() || b_chars.is_empty() {
        return 0.0;
    }

    // Two-row LCS table.
    let mut prev = vec![0usize; b_chars.len() + 1];
    let mut curr = vec![0usize; b_chars.len() + 1];
    for ca in &a_chars {
        for (j, cb) in b_chars.iter().enumerate() {
            curr[j + 1] = if ca == cb {
                prev[j] + 1
            } else {
                prev[j + 1].max(curr[j])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    let lcs = prev[b_chars.len()];
    (2.0 * lcs as f64) / ((a_chars.len() + b_chars.len()) as f64)
}

/// `str::is_lowercase` in the Python sense: at least one cased character
/// and no uppercase ones. Names with digits and underscores still qualify.
fn is_all_lowercase(name: &str) -> bool {
    name.chars().any(|c| c.is_lowercase()) && !name.chars().any(|c| c.is_uppercase())
}

/// Propose renames for likely-misspelled identifiers.
///
/// For each pooled name, the most similar names above the cutoff are
/// considered (at most `max_candidates`); a candidate qualifies when both
/// names are all-lowercase, at least `min_length` long, and the candidate
/// is used more than `frequency_margin` times as often. The winner is the
/// qualifying candidate with the highest similarity, then the highest
/// count, then the lexicographically smallest name. At most one proposal
/// per name; the returned map iterates in sorted from-name order.
pub fn detect_typos(
    pooled: &HashMap<String, usize>,
    config: &TypoConfig,
) -> IndexMap<String, String> {
    let mut names: Vec<&str> = pooled.keys().map(String::as_str).collect();
    names.sort_unstable();

    let mut proposals = IndexMap::new();
    for &name in &names {
        let count = pooled[name];
        if name.chars().count() < config.min_length || !is_all_lowercase(name) {
            continue;
        }

        // The similarity cut happens before the frequency and casing
        // filters, so a crowd of close-but-unqualified names can mask a
        // qualifying one further down. That keeps proposals conservative.
        let mut candidates: Vec<(f64, &str, usize)> = names
            .iter()
            .filter(|&&other| other != name)
            .filter_map(|&other| {
                let ratio = similarity_ratio(name, other);
                (ratio >= config.similarity_cutoff).then_some((ratio, other, pooled[other]))
            })
            .collect();
        candidates.sort_by(|a, b| {
            b.0.partial_cmp(&a.0)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.1.cmp(b.1))
        });
        candidates.truncate(config.max_candidates);

        let winner = candidates
            .into_iter()
            .filter(|&(_, other, other_count)| {
                other.chars().count() >= config.min_length
                    && is_all_lowercase(other)
                    && other_count as f64 > count as f64 * config.frequency_margin
            })
            .max_by(|a, b| {
                a.0.partial_cmp(&b.0)
                    .unwrap_or(Ordering::Equal)
                    .then(a.2.cmp(&b.2))
                    .then(b.1.cmp(a.1))
            });
        if let Some((_, to, _)) = winner {
            proposals.insert(name.to_string(), to.to_string());
        }
    }
    proposals
}
