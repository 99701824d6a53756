//! End-to-end resolution tests
//!
//! Scenario tests go through the JSON boundary; the properties run the whole
//! pass on generated batches drawn from small value pools so that shared
//! identifiers, near-duplicate titles and conflicts actually occur.

use std::collections::{BTreeSet, HashSet};

use litscope_core::{
    Author, Identifier, IdentifierType, LitscopeError, NormalizedRecord, RecordBatch,
    ResolverConfig, Source,
};
use litscope_resolve::identifiers::normalize_identifier;
use litscope_resolve::{Resolution, ResolveError, Resolver, Severity, Validator};
use proptest::prelude::*;

fn resolver() -> Resolver {
    let mut config = ResolverConfig::default();
    config.validation.current_year = Some(2025);
    Resolver::new(config).unwrap()
}

fn member_sets(resolution: &Resolution) -> Vec<Vec<usize>> {
    resolution
        .records
        .iter()
        .map(|record| record.members.clone())
        .collect()
}

// === Scenarios ===

#[test]
fn test_doi_and_pmid_records_become_one() {
    let batch = RecordBatch::from_json(
        r#"[
            {"source": "crossref", "title": "Deep Learning for X",
             "identifiers": [{"kind": "doi", "value": "10.1/abc"}],
             "publication_year": 2020,
             "authors": [{"full_name": "Jane Doe"}, {"full_name": "Wei Li"}]},
            {"source": "pubmed", "title": "Deep learning for X",
             "identifiers": [{"kind": "pmid", "value": "123"}],
             "publication_year": 2020,
             "authors": [{"full_name": "Doe, Jane"}, {"full_name": "Li, Wei"}]}
        ]"#,
    )
    .unwrap();

    let resolution = resolver().resolve(&batch);
    assert_eq!(member_sets(&resolution), vec![vec![0, 1]]);

    let canonical = &resolution.records[0].canonical;
    let kinds: BTreeSet<IdentifierType> = canonical
        .publication
        .identifiers
        .iter()
        .map(|id| id.kind)
        .collect();
    assert_eq!(
        kinds,
        BTreeSet::from([IdentifierType::Doi, IdentifierType::Pmid])
    );
    assert_eq!(canonical.merge_metadata.primary_source, Source::Pubmed);
    assert_eq!(canonical.sources.len(), 2);
    assert!(resolution.records[0].edges.iter().all(|e| !e.is_exact()));
}

#[test]
fn test_doi_mismatch_blocks_merge() {
    let batch = RecordBatch::from_json(
        r#"[
            {"source": "crossref", "title": "Study of Y",
             "identifiers": [{"kind": "doi", "value": "10.1/aaa"}]},
            {"source": "openalex", "title": "Study of Y",
             "identifiers": [{"kind": "doi", "value": "10.1/bbb"}]}
        ]"#,
    )
    .unwrap();

    let resolution = resolver().resolve(&batch);
    assert_eq!(member_sets(&resolution), vec![vec![0], vec![1]]);
    let rejected = &resolution.records[0].rejected_edges[0];
    assert_eq!(rejected.kind, IdentifierType::Doi);
    assert_eq!(resolution.stats.fuzzy_edges_rejected, 1);
}

#[test]
fn test_empty_title_rejected_at_boundary() {
    let result = RecordBatch::from_json(r#"[{"source": "pubmed", "title": "   "}]"#);
    assert!(matches!(
        result,
        Err(LitscopeError::EmptyTitle { index: 0, origin: Source::Pubmed })
    ));

    let (batch, rejected) = RecordBatch::partition(vec![
        NormalizedRecord::new(Source::Pubmed, "A perfectly good title"),
        NormalizedRecord::new(Source::Arxiv, ""),
    ]);
    assert_eq!(batch.len(), 1);
    assert_eq!(rejected.len(), 1);
    assert_eq!(resolver().resolve(&batch).len(), 1);
}

#[test]
fn test_year_3050_is_an_error() {
    let resolution = resolver()
        .resolve_records(vec![
            NormalizedRecord::new(Source::Pubmed, "Time travel considered harmful")
                .with_year(3050)
                .with_identifier(Identifier::pmid("77")),
        ])
        .unwrap();
    let report = &resolution.records[0].validation;
    assert!(!report.is_valid);
    assert!(report
        .errors()
        .any(|issue| issue.field == "publication_year"));
}

#[test]
fn test_labelled_pmid_merges_into_valid_record() {
    let resolution = resolver()
        .resolve_records(vec![
            NormalizedRecord::new(Source::Pubmed, "Labelled identifiers in the wild")
                .with_identifier(Identifier::pmid("PMID: 123")),
            NormalizedRecord::new(Source::Crossref, "Labelled identifiers in the wild")
                .with_identifier(Identifier::pmid("123")),
        ])
        .unwrap();
    assert_eq!(member_sets(&resolution), vec![vec![0, 1]]);
    let record = &resolution.records[0];
    assert_eq!(record.canonical.publication.identifiers, vec![Identifier::pmid("123")]);
    assert!(record.validation.is_valid, "{:?}", record.validation.issues);
}

#[test]
fn test_identifier_chain_overrides_doi_contradiction() {
    // A and B disagree on DOI but share a PMID: identifiers win, and the
    // contradiction shows up as a warning on the merged record.
    let resolution = resolver()
        .resolve_records(vec![
            NormalizedRecord::new(Source::Crossref, "Chained record one")
                .with_identifier(Identifier::doi("10.1/a"))
                .with_identifier(Identifier::pmid("5")),
            NormalizedRecord::new(Source::Pubmed, "Chained record two")
                .with_identifier(Identifier::doi("10.1/b"))
                .with_identifier(Identifier::pmid("5")),
        ])
        .unwrap();
    assert_eq!(member_sets(&resolution), vec![vec![0, 1]]);
    let report = &resolution.records[0].validation;
    assert!(report.is_valid);
    assert!(report
        .warnings()
        .any(|issue| issue.field == "identifiers.doi"));
}

#[test]
fn test_invalid_config_is_refused() {
    let mut config = ResolverConfig::default();
    config.matching.score_threshold = 1.5;
    assert!(matches!(
        Resolver::new(config),
        Err(ResolveError::Core(LitscopeError::ConfigError(_)))
    ));
}

// === Property tests ===

const TITLES: [&str; 5] = [
    "Deep learning for protein folding",
    "Deep Learning for Protein Folding.",
    "Graph neural networks in chemistry",
    "A survey of sparse attention",
    "Sparse attention: a survey",
];
const DOIS: [&str; 3] = ["10.1/a", "10.1/B", "https://doi.org/10.1/b"];
const PMIDS: [&str; 2] = ["100", "200"];
const AUTHORS: [&str; 4] = ["Jane Doe", "Wei Li", "Doe, Jane", "Ana Silva"];

fn arb_source() -> impl Strategy<Value = Source> {
    prop::sample::select(Source::ALL.to_vec())
}

fn arb_record() -> impl Strategy<Value = NormalizedRecord> {
    (
        arb_source(),
        prop::sample::select(TITLES.to_vec()),
        prop::option::of(prop::sample::select(DOIS.to_vec())),
        prop::option::of(prop::sample::select(PMIDS.to_vec())),
        prop::option::of(2018i32..2022),
        prop::sample::subsequence(AUTHORS.to_vec(), 0..=3),
        prop::option::of(0u32..500),
    )
        .prop_map(|(source, title, doi, pmid, year, authors, citations)| {
            let mut record = NormalizedRecord::new(source, title).with_authors(authors);
            if let Some(doi) = doi {
                record = record.with_identifier(Identifier::doi(doi));
            }
            if let Some(pmid) = pmid {
                record = record.with_identifier(Identifier::pmid(pmid));
            }
            record.publication.publication_year = year;
            record.publication.citation_count = citations;
            record
        })
}

fn arb_batch() -> impl Strategy<Value = RecordBatch> {
    prop::collection::vec(arb_record(), 0..12)
        .prop_map(|records| RecordBatch::new(records).unwrap())
}

/// Only DOIs, no other identifier type, so nothing can chain across a DOI
/// contradiction.
fn arb_doi_only_batch() -> impl Strategy<Value = RecordBatch> {
    prop::collection::vec(
        (
            arb_source(),
            prop::sample::select(TITLES.to_vec()),
            prop::option::of(prop::sample::select(DOIS.to_vec())),
        ),
        0..12,
    )
    .prop_map(|rows| {
        let records = rows
            .into_iter()
            .map(|(source, title, doi)| {
                let record = NormalizedRecord::new(source, title);
                match doi {
                    Some(doi) => record.with_identifier(Identifier::doi(doi)),
                    None => record,
                }
            })
            .collect();
        RecordBatch::new(records).unwrap()
    })
}

fn arb_identifier_free_batch() -> impl Strategy<Value = Vec<NormalizedRecord>> {
    prop::collection::vec(
        (
            arb_source(),
            prop::sample::select(TITLES.to_vec()),
            prop::option::of(2018i32..2022),
            prop::sample::subsequence(AUTHORS.to_vec(), 0..=2),
        )
            .prop_map(|(source, title, year, authors)| {
                let mut record = NormalizedRecord::new(source, title).with_authors(authors);
                record.publication.publication_year = year;
                record
            }),
        0..10,
    )
}

fn normalized_keys<'a>(
    identifiers: impl IntoIterator<Item = &'a Identifier>,
) -> HashSet<(IdentifierType, String)> {
    identifiers
        .into_iter()
        .filter_map(|id| normalize_identifier(id).map(|value| (id.kind, value)))
        .collect()
}

proptest! {
    #[test]
    fn test_every_record_lands_in_exactly_one_cluster(batch in arb_batch()) {
        let resolution = resolver().resolve(&batch);
        let mut seen: Vec<usize> = resolution
            .records
            .iter()
            .flat_map(|record| record.members.iter().copied())
            .collect();
        seen.sort_unstable();
        prop_assert_eq!(seen, (0..batch.len()).collect::<Vec<_>>());

        let firsts: Vec<usize> = resolution.records.iter().map(|r| r.members[0]).collect();
        let mut sorted = firsts.clone();
        sorted.sort_unstable();
        prop_assert_eq!(firsts, sorted, "output must follow first-member order");
    }

    #[test]
    fn test_idempotence(batch in arb_batch()) {
        let resolver = resolver();
        for record in resolver.resolve(&batch).records {
            let again = resolver.resolve(&RecordBatch::new(vec![record.canonical.to_normalized()]).unwrap());
            prop_assert_eq!(again.records.len(), 1);
            prop_assert_eq!(&again.records[0].canonical.publication, &record.canonical.publication);
            prop_assert_eq!(&again.records[0].canonical.sources, &record.canonical.sources);
        }
    }

    #[test]
    fn test_identifier_transitivity(batch in arb_batch()) {
        let resolution = resolver().resolve(&batch);
        let mut cluster_of = vec![usize::MAX; batch.len()];
        for (slot, record) in resolution.records.iter().enumerate() {
            for &member in &record.members {
                cluster_of[member] = slot;
            }
        }
        for a in 0..batch.len() {
            let keys_a = normalized_keys(&batch.records()[a].publication.identifiers);
            for b in (a + 1)..batch.len() {
                let keys_b = normalized_keys(&batch.records()[b].publication.identifiers);
                if !keys_a.is_disjoint(&keys_b) {
                    prop_assert_eq!(cluster_of[a], cluster_of[b], "records {} and {} share an identifier", a, b);
                }
            }
        }
    }

    #[test]
    fn test_conflict_safety(batch in arb_doi_only_batch()) {
        let resolution = resolver().resolve(&batch);
        for record in &resolution.records {
            let dois: HashSet<String> = record
                .members
                .iter()
                .flat_map(|&m| batch.records()[m].publication.identifiers.iter())
                .filter_map(normalize_identifier)
                .collect();
            prop_assert!(dois.len() <= 1, "cluster {:?} mixes DOIs {:?}", record.members, dois);
        }
    }

    #[test]
    fn test_merge_completeness(batch in arb_batch()) {
        for record in resolver().resolve(&batch).records {
            let expected = normalized_keys(
                record
                    .members
                    .iter()
                    .flat_map(|&m| batch.records()[m].publication.identifiers.iter()),
            );
            let merged = &record.canonical.publication.identifiers;
            prop_assert_eq!(normalized_keys(merged), expected);
            prop_assert_eq!(normalized_keys(merged).len(), merged.len(), "no duplicate identifiers");
        }
    }

    #[test]
    fn test_validator_determinism(batch in arb_batch()) {
        let resolution = resolver().resolve(&batch);
        let validator = Validator::new(ResolverConfig::default().validation);
        for record in &resolution.records {
            let first = validator.validate(&record.canonical);
            let second = validator.validate(&record.canonical);
            prop_assert!((0.0..=1.0).contains(&first.score));
            prop_assert!((0.0..=100.0).contains(&first.quality_score));
            prop_assert!((0.0..=100.0).contains(&first.completeness_score));
            prop_assert_eq!(
                first.is_valid,
                first.issues.iter().all(|issue| issue.severity != Severity::Error)
            );
            prop_assert_eq!(first, second);
        }
    }

    #[test]
    fn test_input_order_does_not_change_grouping(records in arb_identifier_free_batch()) {
        let n = records.len();
        let forward = resolver().resolve(&RecordBatch::new(records.clone()).unwrap());
        let mut reversed_records = records;
        reversed_records.reverse();
        let backward = resolver().resolve(&RecordBatch::new(reversed_records).unwrap());

        let canonical_groups = |resolution: &Resolution, map: &dyn Fn(usize) -> usize| {
            let mut groups: Vec<Vec<usize>> = resolution
                .records
                .iter()
                .map(|record| {
                    let mut members: Vec<usize> = record.members.iter().map(|&m| map(m)).collect();
                    members.sort_unstable();
                    members
                })
                .collect();
            groups.sort();
            groups
        };

        prop_assert_eq!(
            canonical_groups(&forward, &|m| m),
            canonical_groups(&backward, &|m| n - 1 - m)
        );
    }

    #[test]
    fn test_author_names_survive_merge(batch in arb_batch()) {
        for record in resolver().resolve(&batch).records {
            let authors: &Vec<Author> = &record.canonical.publication.authors;
            prop_assert!(authors.iter().all(|a| !a.full_name.trim().is_empty()));
        }
    }
}
