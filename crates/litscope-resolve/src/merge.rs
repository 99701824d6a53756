//! Reduction of one cluster to a canonical record.
//!
//! Members are visited highest-priority source first, then in input order.
//! Every chosen value leaves a [`FieldProvenance`] entry naming the record
//! it came from.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::Datelike;
use litscope_core::{
    Author, CanonicalRecord, Category, FieldProvenance, Identifier, IdentifierType, MergeField,
    MergeMetadata, NormalizedRecord, PriorityConfig, Publication, PublicationType, Source, Venue,
    VenueType,
};

use crate::identifiers::{has_valid_shape, normalize_identifier};
use crate::similarity::fold_text;

#[derive(Debug, Clone)]
pub struct MergeEngine {
    priority: PriorityConfig,
}

/// One cluster member with its batch position.
type Member<'a> = (usize, &'a NormalizedRecord);

impl MergeEngine {
    pub fn new(priority: PriorityConfig) -> Self {
        Self { priority }
    }

    /// Merge the given members; `None` for an empty cluster.
    pub fn merge<'a, I>(&self, members: I) -> Option<CanonicalRecord>
    where
        I: IntoIterator<Item = Member<'a>>,
    {
        let mut members: Vec<Member<'a>> = members.into_iter().collect();
        if members.is_empty() {
            return None;
        }
        members.sort_by_key(|(index, record)| (self.priority.source_rank(record.source), *index));

        let mut merge = Merge::default();
        merge.text(&members, MergeField::Title, |p| Some(p.title.as_str()));
        merge.text(&members, MergeField::Abstract, |p| p.abstract_text.as_deref());
        merge.dates(&members);
        merge.authors(&members);
        merge.identifiers(&members);
        merge.venue(&members);
        merge.categories(&members);
        merge.publication_types(&members);
        merge.counter(&members, MergeField::CitationCount, |p| p.citation_count);
        merge.counter(&members, MergeField::ReferenceCount, |p| p.reference_count);
        merge.open_access(&members);

        let mut sources: BTreeMap<Source, serde_json::Value> = BTreeMap::new();
        let mut source_counts: BTreeMap<Source, usize> = BTreeMap::new();
        let mut merged_from_sources: Vec<Source> = Vec::new();
        for (_, record) in &members {
            match source_keyed(&record.raw) {
                // A canonical record fed back in carries its payloads keyed by source.
                Some(payloads) => {
                    for (source, payload) in payloads {
                        sources.entry(source).or_insert_with(|| payload.clone());
                    }
                }
                None => {
                    sources
                        .entry(record.source)
                        .or_insert_with(|| record.raw.clone());
                }
            }
            *source_counts.entry(record.source).or_default() += 1;
            if !merged_from_sources.contains(&record.source) {
                merged_from_sources.push(record.source);
            }
        }

        Some(CanonicalRecord {
            publication: merge.publication,
            sources,
            merge_provenance: merge.provenance,
            merge_metadata: MergeMetadata {
                merged_from_sources,
                source_counts,
                total_records: members.len(),
                primary_source: members[0].1.source,
            },
        })
    }
}

#[derive(Debug, Default)]
struct Merge {
    publication: Publication,
    provenance: Vec<FieldProvenance>,
}

impl Merge {
    fn record(&mut self, field: MergeField, member: &Member<'_>, item: Option<usize>) {
        self.provenance.push(FieldProvenance {
            field,
            source: member.1.source,
            record: member.0,
            item,
        });
    }

    fn text<F>(&mut self, members: &[Member<'_>], field: MergeField, get: F)
    where
        F: Fn(&Publication) -> Option<&str>,
    {
        let Some((value, member)) = longest(members, |r| get(&r.publication)) else {
            return;
        };
        match field {
            MergeField::Title => self.publication.title = value,
            MergeField::Abstract => self.publication.abstract_text = Some(value),
            _ => return,
        }
        self.record(field, &member, None);
    }

    fn dates(&mut self, members: &[Member<'_>]) {
        let earliest_date = members
            .iter()
            .filter_map(|m| m.1.publication.publication_date.map(|d| (d, m)))
            .min_by_key(|(date, _)| *date);

        if let Some((date, member)) = earliest_date {
            self.publication.publication_date = Some(date);
            self.publication.publication_year = Some(date.year());
            self.record(MergeField::PublicationDate, member, None);
            self.record(MergeField::PublicationYear, member, None);
            return;
        }

        let earliest_year = members
            .iter()
            .filter_map(|m| m.1.publication.publication_year.map(|y| (y, m)))
            .min_by_key(|(year, _)| *year);
        if let Some((year, member)) = earliest_year {
            self.publication.publication_year = Some(year);
            self.record(MergeField::PublicationYear, member, None);
        }
    }

    fn authors(&mut self, members: &[Member<'_>]) {
        let mut merged: Vec<(Author, String)> = Vec::new();
        for member in members {
            for author in &member.1.publication.authors {
                let name_key = fold_text(&author.full_name);
                match find_author(&merged, author, &name_key) {
                    Some(pos) => {
                        let known = &mut merged[pos].0;
                        if known.orcid.is_none() {
                            known.orcid = author.orcid.clone();
                        }
                        if known.affiliation.is_none() {
                            known.affiliation = author.affiliation.clone();
                        }
                    }
                    None => {
                        let item = merged.len();
                        merged.push((author.clone(), name_key));
                        self.record(MergeField::Authors, member, Some(item));
                    }
                }
            }
        }
        self.publication.authors = merged.into_iter().map(|(author, _)| author).collect();
    }

    /// Union on (type, normalized value). Of the raw values sharing a key the
    /// first one passing its shape check is kept; if none does, the
    /// normalized value stands in.
    fn identifiers(&mut self, members: &[Member<'_>]) {
        let mut slots: HashMap<(IdentifierType, String), usize> = HashMap::new();
        let mut merged: Vec<(Identifier, String, bool, Member<'_>)> = Vec::new();
        for member in members {
            for identifier in &member.1.publication.identifiers {
                let Some(normalized) = normalize_identifier(identifier) else {
                    continue;
                };
                let valid = has_valid_shape(identifier);
                match slots.get(&(identifier.kind, normalized.clone())) {
                    Some(&slot) => {
                        let kept = &mut merged[slot];
                        if !kept.2 && valid {
                            *kept = (identifier.clone(), normalized, true, *member);
                        }
                    }
                    None => {
                        slots.insert((identifier.kind, normalized.clone()), merged.len());
                        merged.push((identifier.clone(), normalized, valid, *member));
                    }
                }
            }
        }

        let mut identifiers = Vec::with_capacity(merged.len());
        for (item, (mut identifier, normalized, valid, member)) in merged.into_iter().enumerate() {
            if !valid {
                identifier.value = normalized;
            }
            self.record(MergeField::Identifiers, &member, Some(item));
            identifiers.push(identifier);
        }
        self.publication.identifiers = identifiers;
    }

    fn venue(&mut self, members: &[Member<'_>]) {
        if members.iter().all(|m| m.1.publication.venue.is_none()) {
            return;
        }
        let mut venue = Venue::default();

        let name = longest(members, |r| venue_of(r).map(|v| v.name.as_str()));
        let name_type = name
            .as_ref()
            .and_then(|(_, member)| venue_of(member.1))
            .map(|v| v.venue_type)
            .filter(|t| *t != VenueType::Other)
            .zip(name.as_ref().map(|(_, member)| *member));
        if let Some((value, member)) = name {
            venue.name = value;
            self.record(MergeField::VenueName, &member, None);
        }

        let typed = name_type.or_else(|| {
            members.iter().find_map(|m| {
                venue_of(m.1)
                    .map(|v| v.venue_type)
                    .filter(|t| *t != VenueType::Other)
                    .map(|t| (t, *m))
            })
        });
        if let Some((venue_type, member)) = typed {
            venue.venue_type = venue_type;
            self.record(MergeField::VenueType, &member, None);
        }

        if let Some((value, member)) =
            longest(members, |r| venue_of(r).and_then(|v| v.issn_print.as_deref()))
        {
            venue.issn_print = Some(value);
            self.record(MergeField::VenueIssnPrint, &member, None);
        }
        if let Some((value, member)) =
            longest(members, |r| venue_of(r).and_then(|v| v.issn_electronic.as_deref()))
        {
            venue.issn_electronic = Some(value);
            self.record(MergeField::VenueIssnElectronic, &member, None);
        }
        if let Some((value, member)) =
            longest(members, |r| venue_of(r).and_then(|v| v.publisher.as_deref()))
        {
            venue.publisher = Some(value);
            self.record(MergeField::VenuePublisher, &member, None);
        }

        self.publication.venue = Some(venue);
    }

    fn categories(&mut self, members: &[Member<'_>]) {
        let mut seen = HashSet::new();
        let mut merged: Vec<Category> = Vec::new();
        for member in members {
            for category in &member.1.publication.categories {
                let key = (category.category_type, category.name.trim().to_lowercase());
                if seen.insert(key) {
                    self.record(MergeField::Categories, member, Some(merged.len()));
                    merged.push(category.clone());
                }
            }
        }
        self.publication.categories = merged;
    }

    fn publication_types(&mut self, members: &[Member<'_>]) {
        let mut seen = HashSet::new();
        let mut merged: Vec<PublicationType> = Vec::new();
        for member in members {
            for publication_type in &member.1.publication.publication_types {
                let key = (
                    publication_type.source,
                    publication_type.name.trim().to_lowercase(),
                );
                if seen.insert(key) {
                    self.record(MergeField::PublicationTypes, member, Some(merged.len()));
                    merged.push(publication_type.clone());
                }
            }
        }
        self.publication.publication_types = merged;
    }

    fn counter<F>(&mut self, members: &[Member<'_>], field: MergeField, get: F)
    where
        F: Fn(&Publication) -> Option<u32>,
    {
        let mut best: Option<(u32, &Member<'_>)> = None;
        for member in members {
            if let Some(value) = get(&member.1.publication)
                && best.is_none_or(|(current, _)| value > current)
            {
                best = Some((value, member));
            }
        }
        let Some((value, member)) = best else {
            return;
        };
        match field {
            MergeField::CitationCount => self.publication.citation_count = Some(value),
            _ => self.publication.reference_count = Some(value),
        }
        self.record(field, member, None);
    }

    fn open_access(&mut self, members: &[Member<'_>]) {
        if let Some(member) = members.iter().find(|m| m.1.publication.is_open_access) {
            self.publication.is_open_access = true;
            self.record(MergeField::OpenAccess, member, None);
        }
        if let Some((url, member)) =
            longest(members, |r| r.publication.open_access_url.as_deref())
        {
            self.publication.open_access_url = Some(url);
            self.record(MergeField::OpenAccessUrl, &member, None);
        }
    }
}

/// Entries of a raw payload whose keys are all source names, as produced by
/// [`CanonicalRecord::to_normalized`].
fn source_keyed(raw: &serde_json::Value) -> Option<Vec<(Source, &serde_json::Value)>> {
    let object = raw.as_object().filter(|object| !object.is_empty())?;
    object
        .iter()
        .map(|(key, payload)| {
            Source::ALL
                .into_iter()
                .find(|source| source.as_str() == key)
                .map(|source| (source, payload))
        })
        .collect()
}

fn venue_of(record: &NormalizedRecord) -> Option<&Venue> {
    record.publication.venue.as_ref()
}

/// Longest non-blank trimmed value; the first member wins ties.
fn longest<'a, F>(members: &[Member<'a>], get: F) -> Option<(String, Member<'a>)>
where
    F: Fn(&'a NormalizedRecord) -> Option<&'a str>,
{
    let mut best: Option<(&str, Member<'a>)> = None;
    for member in members {
        let Some(value) = get(member.1).map(str::trim).filter(|s| !s.is_empty()) else {
            continue;
        };
        let longer = best
            .as_ref()
            .is_none_or(|(current, _)| value.chars().count() > current.chars().count());
        if longer {
            best = Some((value, *member));
        }
    }
    best.map(|(value, member)| (value.to_string(), member))
}

/// An ORCID match wins; otherwise the same normalized name, provided the
/// ORCIDs do not contradict.
fn find_author(merged: &[(Author, String)], incoming: &Author, name_key: &str) -> Option<usize> {
    let orcid = incoming.orcid_key();
    if let Some(orcid) = &orcid
        && let Some(pos) = merged
            .iter()
            .position(|(known, _)| known.orcid_key().as_ref() == Some(orcid))
    {
        return Some(pos);
    }
    if name_key.is_empty() {
        return None;
    }
    merged.iter().position(|(known, known_key)| {
        known_key == name_key
            && match (known.orcid_key(), &orcid) {
                (Some(a), Some(b)) => a == *b,
                _ => true,
            }
    })
}
