use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Author, Category, Identifier, Publication, PublicationType, Source, Venue};
use crate::error::{LitscopeError, Result};

/// One source's view of a publication.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRecord {
    pub source: Source,

    #[serde(flatten)]
    pub publication: Publication,

    /// Original source payload, kept verbatim.
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub raw: Value,
}

impl NormalizedRecord {
    pub fn new(source: Source, title: impl Into<String>) -> Self {
        Self {
            source,
            publication: Publication::new(title),
            raw: Value::Null,
        }
    }

    pub fn with_identifier(mut self, identifier: Identifier) -> Self {
        self.publication.identifiers.push(identifier);
        self
    }

    pub fn with_author(mut self, author: Author) -> Self {
        self.publication.authors.push(author);
        self
    }

    pub fn with_authors<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.publication
            .authors
            .extend(names.into_iter().map(Author::new));
        self
    }

    pub fn with_year(mut self, year: i32) -> Self {
        self.publication.publication_year = Some(year);
        self
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.publication.publication_date = Some(date);
        self
    }

    pub fn with_abstract(mut self, text: impl Into<String>) -> Self {
        self.publication.abstract_text = Some(text.into());
        self
    }

    pub fn with_venue(mut self, venue: Venue) -> Self {
        self.publication.venue = Some(venue);
        self
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.publication.categories.push(category);
        self
    }

    pub fn with_publication_type(mut self, publication_type: PublicationType) -> Self {
        self.publication.publication_types.push(publication_type);
        self
    }

    pub fn with_citations(mut self, citation_count: u32) -> Self {
        self.publication.citation_count = Some(citation_count);
        self
    }

    pub fn with_references(mut self, reference_count: u32) -> Self {
        self.publication.reference_count = Some(reference_count);
        self
    }

    pub fn with_open_access(mut self, url: Option<&str>) -> Self {
        self.publication.is_open_access = true;
        self.publication.open_access_url = url.map(str::to_string);
        self
    }

    pub fn with_raw(mut self, raw: Value) -> Self {
        self.raw = raw;
        self
    }

    fn check(&self, index: usize) -> Result<()> {
        if self.publication.has_title() {
            Ok(())
        } else {
            Err(LitscopeError::EmptyTitle {
                index,
                origin: self.source,
            })
        }
    }
}

/// An ordered set of records that satisfy the engine's input contract.
///
/// Constructing a batch is the only way into the resolver, so a blank title
/// is refused here rather than somewhere inside clustering.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordBatch {
    records: Vec<NormalizedRecord>,
}

impl RecordBatch {
    /// Accept every record or fail on the first one that breaks the contract.
    pub fn new(records: Vec<NormalizedRecord>) -> Result<Self> {
        for (index, record) in records.iter().enumerate() {
            record.check(index)?;
        }
        Ok(Self { records })
    }

    /// Keep the acceptable records in order and hand back a rejection for each
    /// of the others (indices refer to the input vector).
    pub fn partition(records: Vec<NormalizedRecord>) -> (Self, Vec<LitscopeError>) {
        let mut accepted = Vec::with_capacity(records.len());
        let mut rejected = Vec::new();
        for (index, record) in records.into_iter().enumerate() {
            match record.check(index) {
                Ok(()) => accepted.push(record),
                Err(err) => rejected.push(err),
            }
        }
        (Self { records: accepted }, rejected)
    }

    /// Parse a JSON array of records and apply [`RecordBatch::new`].
    pub fn from_json(json: &str) -> Result<Self> {
        let records: Vec<NormalizedRecord> = serde_json::from_str(json)?;
        Self::new(records)
    }

    pub fn records(&self) -> &[NormalizedRecord] {
        &self.records
    }

    pub fn get(&self, index: usize) -> Option<&NormalizedRecord> {
        self.records.get(index)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, NormalizedRecord> {
        self.records.iter()
    }

    pub fn into_records(self) -> Vec<NormalizedRecord> {
        self.records
    }
}

impl<'a> IntoIterator for &'a RecordBatch {
    type Item = &'a NormalizedRecord;
    type IntoIter = std::slice::Iter<'a, NormalizedRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
