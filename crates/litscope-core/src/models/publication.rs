use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Author, Category, Identifier, IdentifierType, PublicationType, Venue};

/// The bibliographic body shared by source records and canonical records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Publication {
    pub title: String,

    #[serde(rename = "abstract", default, skip_serializing_if = "Option::is_none")]
    pub abstract_text: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publication_year: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publication_date: Option<NaiveDate>,

    #[serde(default)]
    pub authors: Vec<Author>,

    #[serde(default)]
    pub identifiers: Vec<Identifier>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub venue: Option<Venue>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<Category>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub publication_types: Vec<PublicationType>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub citation_count: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_count: Option<u32>,

    #[serde(default)]
    pub is_open_access: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_access_url: Option<String>,
}

impl Publication {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn has_title(&self) -> bool {
        !self.title.trim().is_empty()
    }

    /// Non-blank identifiers of one type, in record order.
    pub fn identifiers_of(&self, kind: IdentifierType) -> impl Iterator<Item = &Identifier> {
        self.identifiers
            .iter()
            .filter(move |id| id.kind == kind && !id.is_blank())
    }

    pub fn first_identifier(&self, kind: IdentifierType) -> Option<&str> {
        self.identifiers_of(kind).next().map(|id| id.value.as_str())
    }

    pub fn venue_name(&self) -> Option<&str> {
        self.venue
            .as_ref()
            .map(|venue| venue.name.trim())
            .filter(|name| !name.is_empty())
    }
}
