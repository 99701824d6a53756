//! litscope-resolve — identifier matching, fuzzy matching, clustering, merge and validation.

pub mod error;
pub mod identifiers;
pub mod edge;
pub mod index;
pub mod similarity;
pub mod cluster;
pub mod merge;
pub mod validate;
pub mod engine;

pub use error::{ResolveError, Result};
pub use edge::{Confidence, MatchEdge, MatchEvidence};
pub use index::IdentifierIndex;
pub use similarity::SimilarityMatcher;
pub use cluster::{Cluster, ClusterBuilder, Clustering, RejectedEdge};
pub use merge::MergeEngine;
pub use validate::{Severity, ValidationIssue, ValidationReport, Validator};
pub use engine::{ResolutionStats, Resolution, ResolvedRecord, Resolver};
