use litscope_core::{CanonicalRecord, NormalizedRecord, RecordBatch, ResolverConfig};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::cluster::{ClusterBuilder, RejectedEdge};
use crate::edge::MatchEdge;
use crate::error::Result;
use crate::index::IdentifierIndex;
use crate::merge::MergeEngine;
use crate::similarity::SimilarityMatcher;
use crate::validate::{Severity, ValidationReport, Validator};

/// One canonical record with everything that explains it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedRecord {
    pub canonical: CanonicalRecord,
    pub validation: ValidationReport,
    /// Batch positions of the merged records, ascending.
    pub members: Vec<usize>,
    pub edges: Vec<MatchEdge>,
    pub rejected_edges: Vec<RejectedEdge>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionStats {
    pub total_records: usize,
    pub clusters: usize,
    pub duplicates_merged: usize,
    pub exact_edges: usize,
    pub fuzzy_edges_proposed: usize,
    pub fuzzy_edges_accepted: usize,
    pub fuzzy_edges_rejected: usize,
    pub valid_records: usize,
    pub invalid_records: usize,
    pub error_count: usize,
    pub warning_count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    /// Ordered by the first input position of each cluster.
    pub records: Vec<ResolvedRecord>,
    pub stats: ResolutionStats,
}

impl Resolution {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn canonical_records(&self) -> impl Iterator<Item = &CanonicalRecord> {
        self.records.iter().map(|record| &record.canonical)
    }

    pub fn into_pairs(self) -> Vec<(CanonicalRecord, ValidationReport)> {
        self.records
            .into_iter()
            .map(|record| (record.canonical, record.validation))
            .collect()
    }
}

/// Runs one resolution pass: index, match, cluster, merge, validate.
#[derive(Debug, Clone)]
pub struct Resolver {
    config: ResolverConfig,
    matcher: SimilarityMatcher,
    clusters: ClusterBuilder,
    merger: MergeEngine,
    validator: Validator,
}

impl Resolver {
    pub fn new(config: ResolverConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            matcher: SimilarityMatcher::new(config.matching.clone()),
            clusters: ClusterBuilder::new(config.priority.clone()),
            merger: MergeEngine::new(config.priority.clone()),
            validator: Validator::new(config.validation.clone()),
            config,
        })
    }

    /// Resolver built from `ResolverConfig::load()`.
    pub fn from_config_file() -> Result<Self> {
        Self::new(ResolverConfig::load()?)
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    pub fn validator(&self) -> &Validator {
        &self.validator
    }

    /// Check raw records at the boundary, then resolve them.
    pub fn resolve_records(&self, records: Vec<NormalizedRecord>) -> Result<Resolution> {
        let batch = RecordBatch::new(records)?;
        Ok(self.resolve(&batch))
    }

    pub fn resolve(&self, batch: &RecordBatch) -> Resolution {
        info!(records = batch.len(), "resolving record batch");

        let index = IdentifierIndex::build(batch);
        let exact = index.exact_edges(&self.config.priority);
        let fuzzy = self.matcher.fuzzy_edges(batch, &index);
        let fuzzy_edges_proposed = fuzzy.len();

        let clustering = self.clusters.build(batch.len(), &index, exact, fuzzy);

        let mut stats = ResolutionStats {
            total_records: batch.len(),
            clusters: clustering.clusters.len(),
            duplicates_merged: batch.len() - clustering.clusters.len(),
            exact_edges: clustering.exact_edges,
            fuzzy_edges_proposed,
            fuzzy_edges_accepted: clustering.fuzzy_accepted,
            fuzzy_edges_rejected: clustering.rejected.len(),
            ..ResolutionStats::default()
        };

        let mut records = Vec::with_capacity(clustering.clusters.len());
        for cluster in clustering.clusters {
            let members = cluster
                .members
                .iter()
                .filter_map(|&idx| batch.get(idx).map(|record| (idx, record)));
            let Some(canonical) = self.merger.merge(members) else {
                continue;
            };
            if !cluster.is_singleton() {
                debug!(
                    members = ?cluster.members,
                    sources = ?canonical.merge_metadata.merged_from_sources,
                    "merged cluster"
                );
            }

            let validation = self.validator.validate(&canonical);
            if validation.is_valid {
                stats.valid_records += 1;
            } else {
                stats.invalid_records += 1;
            }
            for issue in &validation.issues {
                match issue.severity {
                    Severity::Error => stats.error_count += 1,
                    Severity::Warning => stats.warning_count += 1,
                }
            }

            records.push(ResolvedRecord {
                canonical,
                validation,
                members: cluster.members,
                edges: cluster.edges,
                rejected_edges: cluster.rejected,
            });
        }

        info!(
            records = stats.total_records,
            clusters = stats.clusters,
            merged = stats.duplicates_merged,
            rejected = stats.fuzzy_edges_rejected,
            invalid = stats.invalid_records,
            "resolution finished"
        );

        Resolution { records, stats }
    }
}
