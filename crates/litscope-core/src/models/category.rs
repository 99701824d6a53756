use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryType {
    MeshDescriptor,
    ArxivCategory,
    FieldOfStudy,
    WosCategory,
    #[default]
    Other,
}

/// Subject classification attached by a source (MeSH heading, arXiv class, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    #[serde(default)]
    pub category_type: CategoryType,
}

impl Category {
    pub fn new(name: impl Into<String>, category_type: CategoryType) -> Self {
        Self {
            name: name.into(),
            code: None,
            category_type,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PublicationTypeSource {
    Pubmed,
    SemanticScholar,
    Wos,
    #[default]
    General,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicationType {
    pub name: String,

    #[serde(default)]
    pub source: PublicationTypeSource,
}

impl PublicationType {
    pub fn new(name: impl Into<String>, source: PublicationTypeSource) -> Self {
        Self {
            name: name.into(),
            source,
        }
    }
}
