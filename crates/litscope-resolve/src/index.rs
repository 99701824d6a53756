use std::collections::{BTreeMap, BTreeSet, HashSet};

use litscope_core::{IdentifierType, PriorityConfig, RecordBatch};

use crate::edge::MatchEdge;
use crate::identifiers::normalize_identifier;

pub type IdentifierKey = (IdentifierType, String);

/// Exact-match index over the normalized identifiers of one batch.
#[derive(Debug, Clone, Default)]
pub struct IdentifierIndex {
    keys: Vec<BTreeSet<IdentifierKey>>,
    buckets: BTreeMap<IdentifierKey, Vec<usize>>,
    linked: HashSet<(usize, usize)>,
}

impl IdentifierIndex {
    pub fn build(batch: &RecordBatch) -> Self {
        let keys: Vec<BTreeSet<IdentifierKey>> = batch
            .iter()
            .map(|record| {
                record
                    .publication
                    .identifiers
                    .iter()
                    .filter_map(|id| normalize_identifier(id).map(|value| (id.kind, value)))
                    .collect()
            })
            .collect();

        let mut buckets: BTreeMap<IdentifierKey, Vec<usize>> = BTreeMap::new();
        for (idx, record_keys) in keys.iter().enumerate() {
            for key in record_keys {
                buckets.entry(key.clone()).or_default().push(idx);
            }
        }

        let mut linked = HashSet::new();
        for members in buckets.values() {
            for (pos, &a) in members.iter().enumerate() {
                for &b in &members[pos + 1..] {
                    linked.insert((a, b));
                }
            }
        }

        Self {
            keys,
            buckets,
            linked,
        }
    }

    /// Normalized identifiers of one record.
    pub fn keys_of(&self, index: usize) -> Option<&BTreeSet<IdentifierKey>> {
        self.keys.get(index)
    }

    /// Records carrying a given normalized identifier, in input order.
    pub fn records_with(&self, kind: IdentifierType, normalized: &str) -> &[usize] {
        self.buckets
            .get(&(kind, normalized.to_string()))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn shares_identifier(&self, a: usize, b: usize) -> bool {
        let pair = if a <= b { (a, b) } else { (b, a) };
        self.linked.contains(&pair)
    }

    /// One exact edge per record pair per shared identifier, highest-priority
    /// identifier type first, then input order.
    pub fn exact_edges(&self, priority: &PriorityConfig) -> Vec<MatchEdge> {
        let mut shared: Vec<(&IdentifierKey, &Vec<usize>)> = self
            .buckets
            .iter()
            .filter(|(_, members)| members.len() > 1)
            .collect();
        shared.sort_by(|(ka, ma), (kb, mb)| {
            priority
                .identifier_rank(ka.0)
                .cmp(&priority.identifier_rank(kb.0))
                .then(ma[0].cmp(&mb[0]))
                .then(ka.1.cmp(&kb.1))
        });

        let mut edges = Vec::new();
        for ((kind, value), members) in shared {
            for (pos, &a) in members.iter().enumerate() {
                for &b in &members[pos + 1..] {
                    edges.push(MatchEdge::exact(a, b, *kind, value.clone()));
                }
            }
        }
        edges
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use litscope_core::{Identifier, NormalizedRecord, Source};

    fn batch(records: Vec<NormalizedRecord>) -> RecordBatch {
        RecordBatch::new(records).unwrap()
    }

    #[test]
    fn shared_doi_yields_exact_edge() {
        let b = batch(vec![
            NormalizedRecord::new(Source::Pubmed, "A").with_identifier(Identifier::doi("10.1/ABC")),
            NormalizedRecord::new(Source::Arxiv, "B").with_identifier(Identifier::doi("https://doi.org/10.1/abc")),
            NormalizedRecord::new(Source::Wos, "C").with_identifier(Identifier::doi("10.1/other")),
        ]);
        let index = IdentifierIndex::build(&b);
        let edges = index.exact_edges(&PriorityConfig::default());

        assert_eq!(edges.len(), 1);
        assert_eq!((edges[0].left, edges[0].right), (0, 1));
        assert!(index.shares_identifier(1, 0));
        assert!(!index.shares_identifier(0, 2));
        assert_eq!(index.records_with(IdentifierType::Doi, "10.1/abc"), &[0, 1]);
    }

    #[test]
    fn every_pair_in_a_bucket_is_linked() {
        let b = batch(
            (0..3)
                .map(|i| {
                    NormalizedRecord::new(Source::Pubmed, format!("T{i}"))
                        .with_identifier(Identifier::pmid("42"))
                })
                .collect(),
        );
        let edges = IdentifierIndex::build(&b).exact_edges(&PriorityConfig::default());
        let pairs: Vec<_> = edges.iter().map(|e| (e.left, e.right)).collect();
        assert_eq!(pairs, vec![(0, 1), (0, 2), (1, 2)]);
    }

    #[test]
    fn higher_priority_identifier_edges_come_first() {
        let b = batch(vec![
            NormalizedRecord::new(Source::Pubmed, "A").with_identifier(Identifier::pmid("7")),
            NormalizedRecord::new(Source::Crossref, "B")
                .with_identifier(Identifier::pmid("7"))
                .with_identifier(Identifier::doi("10.5/z")),
            NormalizedRecord::new(Source::Openalex, "C").with_identifier(Identifier::doi("10.5/Z")),
        ]);
        let edges = IdentifierIndex::build(&b).exact_edges(&PriorityConfig::default());
        assert_eq!(edges.len(), 2);
        assert!(matches!(
            &edges[0].evidence,
            crate::edge::MatchEvidence::Identifier { kind: IdentifierType::Doi, .. }
        ));
        assert_eq!((edges[0].left, edges[0].right), (1, 2));
    }

    #[test]
    fn blank_and_absent_identifiers_never_link() {
        let b = batch(vec![
            NormalizedRecord::new(Source::Pubmed, "A").with_identifier(Identifier::doi("  ")),
            NormalizedRecord::new(Source::Arxiv, "B").with_identifier(Identifier::doi("")),
            NormalizedRecord::new(Source::Wos, "C"),
        ]);
        let index = IdentifierIndex::build(&b);
        assert!(index.exact_edges(&PriorityConfig::default()).is_empty());
        assert!(index.keys_of(0).unwrap().is_empty());
    }

    #[test]
    fn same_value_under_different_types_does_not_link() {
        let b = batch(vec![
            NormalizedRecord::new(Source::Pubmed, "A").with_identifier(Identifier::pmid("123")),
            NormalizedRecord::new(Source::SemanticScholar, "B")
                .with_identifier(Identifier::new(IdentifierType::CorpusId, "123")),
        ]);
        assert!(IdentifierIndex::build(&b).exact_edges(&PriorityConfig::default()).is_empty());
    }
}
