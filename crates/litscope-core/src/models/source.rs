use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::LitscopeError;

/// A literature source whose results have already been normalized into
/// [`NormalizedRecord`](crate::models::NormalizedRecord)s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    Pubmed,
    Arxiv,
    Biorxiv,
    SemanticScholar,
    Wos,
    Crossref,
    Openalex,
}

impl Source {
    pub const ALL: [Source; 7] = [
        Source::Pubmed,
        Source::Arxiv,
        Source::Biorxiv,
        Source::SemanticScholar,
        Source::Wos,
        Source::Crossref,
        Source::Openalex,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Pubmed => "pubmed",
            Source::Arxiv => "arxiv",
            Source::Biorxiv => "biorxiv",
            Source::SemanticScholar => "semantic_scholar",
            Source::Wos => "wos",
            Source::Crossref => "crossref",
            Source::Openalex => "openalex",
        }
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Source {
    type Err = LitscopeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        Source::ALL
            .into_iter()
            .find(|source| source.as_str() == tag)
            .ok_or_else(|| LitscopeError::UnknownSource(s.to_string()))
    }
}
