use std::cmp::Ordering;

use litscope_core::IdentifierType;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    Exact,
    Fuzzy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MatchEvidence {
    /// Both records carry this normalized identifier.
    Identifier { kind: IdentifierType, value: String },
    /// Title similarity and, when both records list authors, surname overlap.
    Similarity { title: f64, authors: Option<f64> },
}

/// Undirected match between two records of a batch; `left < right`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchEdge {
    pub left: usize,
    pub right: usize,
    pub score: f64,
    pub evidence: MatchEvidence,
}

impl MatchEdge {
    pub fn exact(a: usize, b: usize, kind: IdentifierType, value: impl Into<String>) -> Self {
        let (left, right) = ordered(a, b);
        Self {
            left,
            right,
            score: 1.0,
            evidence: MatchEvidence::Identifier {
                kind,
                value: value.into(),
            },
        }
    }

    pub fn fuzzy(a: usize, b: usize, score: f64, title: f64, authors: Option<f64>) -> Self {
        let (left, right) = ordered(a, b);
        Self {
            left,
            right,
            score,
            evidence: MatchEvidence::Similarity { title, authors },
        }
    }

    pub fn confidence(&self) -> Confidence {
        match self.evidence {
            MatchEvidence::Identifier { .. } => Confidence::Exact,
            MatchEvidence::Similarity { .. } => Confidence::Fuzzy,
        }
    }

    pub fn is_exact(&self) -> bool {
        self.confidence() == Confidence::Exact
    }

    /// Application order for fuzzy edges: best score first, then input order.
    pub(crate) fn cmp_fuzzy(&self, other: &Self) -> Ordering {
        other
            .score
            .total_cmp(&self.score)
            .then(self.left.cmp(&other.left))
            .then(self.right.cmp(&other.right))
    }
}

fn ordered(a: usize, b: usize) -> (usize, usize) {
    if a <= b { (a, b) } else { (b, a) }
}
