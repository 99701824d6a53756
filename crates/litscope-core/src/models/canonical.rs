use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{NormalizedRecord, Publication, Source};

/// Field of a canonical record whose value was picked during merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeField {
    Title,
    Abstract,
    PublicationYear,
    PublicationDate,
    Authors,
    Identifiers,
    VenueName,
    VenueType,
    VenueIssnPrint,
    VenueIssnElectronic,
    VenuePublisher,
    Categories,
    PublicationTypes,
    CitationCount,
    ReferenceCount,
    OpenAccess,
    OpenAccessUrl,
}

impl std::fmt::Display for MergeField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use MergeField::*;
        let s = match self {
            Title => "title",
            Abstract => "abstract",
            PublicationYear => "publication_year",
            PublicationDate => "publication_date",
            Authors => "authors",
            Identifiers => "identifiers",
            VenueName => "venue.name",
            VenueType => "venue.venue_type",
            VenueIssnPrint => "venue.issn_print",
            VenueIssnElectronic => "venue.issn_electronic",
            VenuePublisher => "venue.publisher",
            Categories => "categories",
            PublicationTypes => "publication_types",
            CitationCount => "citation_count",
            ReferenceCount => "reference_count",
            OpenAccess => "is_open_access",
            OpenAccessUrl => "open_access_url",
        };
        write!(f, "{s}")
    }
}

/// Which input record supplied a merged value. `item` is the position in
/// the canonical list for list-valued fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldProvenance {
    pub field: MergeField,
    pub source: Source,
    pub record: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeMetadata {
    pub merged_from_sources: Vec<Source>,
    pub source_counts: BTreeMap<Source, usize>,
    pub total_records: usize,
    pub primary_source: Source,
}

/// The single record produced for one cluster of matching source records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalRecord {
    pub publication: Publication,
    /// One raw payload per source, first seen wins.
    pub sources: BTreeMap<Source, Value>,
    pub merge_provenance: Vec<FieldProvenance>,
    pub merge_metadata: MergeMetadata,
}

impl CanonicalRecord {
    pub fn provenance_for(&self, field: MergeField) -> impl Iterator<Item = &FieldProvenance> {
        self.merge_provenance
            .iter()
            .filter(move |entry| entry.field == field)
    }

    /// Source of a scalar field, if any source supplied it.
    pub fn source_of(&self, field: MergeField) -> Option<Source> {
        self.provenance_for(field).next().map(|entry| entry.source)
    }

    /// Wrap the canonical record as a single-source record, e.g. to feed a
    /// previously merged result back through resolution. `raw` maps each
    /// source name to its payload; the merge spreads such an object back into
    /// per-source payloads, so `sources` survives the round trip. Provenance
    /// and merge metadata describe the latest pass only.
    pub fn to_normalized(&self) -> NormalizedRecord {
        let raw = self
            .sources
            .iter()
            .map(|(source, payload)| (source.as_str().to_string(), payload.clone()))
            .collect::<serde_json::Map<_, _>>();

        NormalizedRecord {
            source: self.merge_metadata.primary_source,
            publication: self.publication.clone(),
            raw: Value::Object(raw),
        }
    }
}
