use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::LitscopeError;

/// External identifier schemes a literature source may report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentifierType {
    Doi,
    Pmid,
    ArxivId,
    SemanticScholarId,
    WosUid,
    PmcId,
    Pii,
    CorpusId,
}

impl IdentifierType {
    pub const ALL: [IdentifierType; 8] = [
        IdentifierType::Doi,
        IdentifierType::Pmid,
        IdentifierType::ArxivId,
        IdentifierType::SemanticScholarId,
        IdentifierType::WosUid,
        IdentifierType::PmcId,
        IdentifierType::Pii,
        IdentifierType::CorpusId,
    ];

    /// Highest-confidence type first.
    pub fn default_priority() -> Vec<IdentifierType> {
        Self::ALL.to_vec()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            IdentifierType::Doi => "doi",
            IdentifierType::Pmid => "pmid",
            IdentifierType::ArxivId => "arxiv_id",
            IdentifierType::SemanticScholarId => "semantic_scholar_id",
            IdentifierType::WosUid => "wos_uid",
            IdentifierType::PmcId => "pmc_id",
            IdentifierType::Pii => "pii",
            IdentifierType::CorpusId => "corpus_id",
        }
    }
}

impl std::fmt::Display for IdentifierType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IdentifierType {
    type Err = LitscopeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim().to_ascii_lowercase();
        IdentifierType::ALL
            .into_iter()
            .find(|kind| kind.as_str() == tag)
            .ok_or_else(|| LitscopeError::UnknownIdentifierType(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identifier {
    pub kind: IdentifierType,
    pub value: String,
}

impl Identifier {
    pub fn new(kind: IdentifierType, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }

    pub fn doi(value: impl Into<String>) -> Self {
        Self::new(IdentifierType::Doi, value)
    }

    pub fn pmid(value: impl Into<String>) -> Self {
        Self::new(IdentifierType::Pmid, value)
    }

    pub fn arxiv(value: impl Into<String>) -> Self {
        Self::new(IdentifierType::ArxivId, value)
    }

    pub fn is_blank(&self) -> bool {
        self.value.trim().is_empty()
    }
}
