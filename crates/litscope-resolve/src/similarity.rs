//! Fuzzy matching of records that share no identifier.
//!
//! Scores are pure functions of two records, so candidate pairs can be scored
//! in any order (or in parallel with the `parallel` feature); the returned
//! edges are always sorted before the cluster builder sees them.

use std::collections::{BTreeMap, BTreeSet};

use litscope_core::{Author, CandidateWindow, MatchingConfig, NormalizedRecord, RecordBatch};
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use crate::edge::MatchEdge;
use crate::index::IdentifierIndex;

const STOP_WORDS: [&str; 14] = [
    "a", "an", "the", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by",
];

/// Lowercase, strip diacritics and punctuation, collapse whitespace.
pub fn fold_text(text: &str) -> String {
    let cleaned: String = text
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Title comparison form: [`fold_text`] without stop words.
pub fn normalize_title(title: &str) -> String {
    fold_text(title)
        .split(' ')
        .filter(|word| !word.is_empty() && !STOP_WORDS.contains(word))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Similarity of two normalized titles in [0, 1]: the better of token-set
/// Jaccard (robust to reordering) and normalized Levenshtein (robust to typos).
pub fn title_similarity(a: &str, b: &str) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    if a == b {
        return 1.0;
    }

    let tokens_a: BTreeSet<&str> = a.split(' ').collect();
    let tokens_b: BTreeSet<&str> = b.split(' ').collect();
    let shared = tokens_a.intersection(&tokens_b).count();
    let union = tokens_a.union(&tokens_b).count();
    let jaccard = if union == 0 {
        0.0
    } else {
        shared as f64 / union as f64
    };

    jaccard.max(strsim::normalized_levenshtein(a, b))
}

fn surnames(authors: &[Author]) -> BTreeSet<String> {
    authors
        .iter()
        .filter_map(Author::last_name)
        .map(fold_text)
        .filter(|name| !name.is_empty())
        .collect()
}

/// Fraction of shared normalized last names, relative to the longer list.
/// `None` when either side lists no usable author.
pub fn author_overlap(a: &[Author], b: &[Author]) -> Option<f64> {
    overlap(&surnames(a), &surnames(b))
}

fn overlap(a: &BTreeSet<String>, b: &BTreeSet<String>) -> Option<f64> {
    if a.is_empty() || b.is_empty() {
        return None;
    }
    let shared = a.intersection(b).count();
    Some(shared as f64 / a.len().max(b.len()) as f64)
}

/// Per-record values computed once per pass.
#[derive(Debug, Clone)]
struct Prepared {
    title: String,
    surnames: BTreeSet<String>,
    year: Option<i32>,
}

impl Prepared {
    fn new(record: &NormalizedRecord) -> Self {
        let publication = &record.publication;
        Self {
            title: normalize_title(&publication.title),
            surnames: surnames(&publication.authors),
            year: publication
                .publication_year
                .or_else(|| publication.publication_date.map(|d| chrono::Datelike::year(&d))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SimilarityMatcher {
    config: MatchingConfig,
}

impl SimilarityMatcher {
    pub fn new(config: MatchingConfig) -> Self {
        Self { config }
    }

    /// Accepted fuzzy edges for pairs not already linked by an identifier,
    /// best score first.
    pub fn fuzzy_edges(&self, batch: &RecordBatch, index: &IdentifierIndex) -> Vec<MatchEdge> {
        let prepared: Vec<Prepared> = batch.iter().map(Prepared::new).collect();

        if self.config.candidate_window == CandidateWindow::AllPairs
            && prepared.len() > self.config.scaling_warn_threshold
        {
            tracing::warn!(
                records = prepared.len(),
                threshold = self.config.scaling_warn_threshold,
                "all-pairs similarity window is quadratic; consider year_bucket or title_prefix"
            );
        }

        let pairs: Vec<(usize, usize)> = self
            .candidate_pairs(&prepared)
            .into_iter()
            .filter(|&(a, b)| !index.shares_identifier(a, b))
            .collect();

        tracing::debug!(candidates = pairs.len(), "scoring fuzzy candidate pairs");

        let mut edges = self.score_pairs(&prepared, &pairs);
        edges.sort_by(MatchEdge::cmp_fuzzy);
        edges
    }

    #[cfg(not(feature = "parallel"))]
    fn score_pairs(&self, prepared: &[Prepared], pairs: &[(usize, usize)]) -> Vec<MatchEdge> {
        pairs
            .iter()
            .filter_map(|&(a, b)| self.score(&prepared[a], &prepared[b], a, b))
            .collect()
    }

    #[cfg(feature = "parallel")]
    fn score_pairs(&self, prepared: &[Prepared], pairs: &[(usize, usize)]) -> Vec<MatchEdge> {
        use rayon::prelude::*;

        pairs
            .par_iter()
            .filter_map(|&(a, b)| self.score(&prepared[a], &prepared[b], a, b))
            .collect()
    }

    /// Score two records directly, without candidate windowing.
    pub fn compare(&self, a: &NormalizedRecord, b: &NormalizedRecord) -> Option<MatchEdge> {
        self.score(&Prepared::new(a), &Prepared::new(b), 0, 1)
    }

    fn score(&self, a: &Prepared, b: &Prepared, ia: usize, ib: usize) -> Option<MatchEdge> {
        if !self.years_compatible(a.year, b.year) {
            return None;
        }

        let title = title_similarity(&a.title, &b.title);
        let authors = overlap(&a.surnames, &b.surnames);

        let combined = match authors {
            Some(author_score) => {
                let total = self.config.title_weight + self.config.author_weight;
                (self.config.title_weight * title + self.config.author_weight * author_score)
                    / total
            }
            None => {
                if title < self.config.missing_author_title_threshold {
                    return None;
                }
                title
            }
        };

        (combined >= self.config.score_threshold)
            .then(|| MatchEdge::fuzzy(ia, ib, combined, title, authors))
    }

    fn years_compatible(&self, a: Option<i32>, b: Option<i32>) -> bool {
        match (a, b) {
            (Some(a), Some(b)) => a.abs_diff(b) <= self.config.year_tolerance,
            _ => true,
        }
    }

    fn candidate_pairs(&self, prepared: &[Prepared]) -> Vec<(usize, usize)> {
        let mut pairs = match self.config.candidate_window {
            CandidateWindow::AllPairs => all_pairs(prepared.len()),
            CandidateWindow::YearBucket => self.year_bucket_pairs(prepared),
            CandidateWindow::TitlePrefix { tokens } => title_prefix_pairs(prepared, tokens),
        };
        pairs.sort_unstable();
        pairs.dedup();
        pairs
    }

    fn year_bucket_pairs(&self, prepared: &[Prepared]) -> Vec<(usize, usize)> {
        let mut dated: Vec<(i32, usize)> = Vec::new();
        let mut undated: Vec<usize> = Vec::new();
        for (idx, record) in prepared.iter().enumerate() {
            match record.year {
                Some(year) => dated.push((year, idx)),
                None => undated.push(idx),
            }
        }
        dated.sort_unstable();

        let mut pairs = Vec::new();
        for (pos, &(year, a)) in dated.iter().enumerate() {
            for &(other_year, b) in &dated[pos + 1..] {
                if other_year.abs_diff(year) > self.config.year_tolerance {
                    break;
                }
                pairs.push(ordered(a, b));
            }
        }
        for &a in &undated {
            for b in 0..prepared.len() {
                if a != b {
                    pairs.push(ordered(a, b));
                }
            }
        }
        pairs
    }
}

fn all_pairs(n: usize) -> Vec<(usize, usize)> {
    (0..n)
        .flat_map(|a| ((a + 1)..n).map(move |b| (a, b)))
        .collect()
}

fn title_prefix_pairs(prepared: &[Prepared], tokens: usize) -> Vec<(usize, usize)> {
    let mut blocks: BTreeMap<String, Vec<usize>> = BTreeMap::new();
    for (idx, record) in prepared.iter().enumerate() {
        let key = record
            .title
            .split(' ')
            .take(tokens)
            .collect::<Vec<_>>()
            .join(" ");
        if !key.is_empty() {
            blocks.entry(key).or_default().push(idx);
        }
    }

    let mut pairs = Vec::new();
    for members in blocks.values() {
        for (pos, &a) in members.iter().enumerate() {
            for &b in &members[pos + 1..] {
                pairs.push((a, b));
            }
        }
    }
    pairs
}

fn ordered(a: usize, b: usize) -> (usize, usize) {
    if a <= b { (a, b) } else { (b, a) }
}
