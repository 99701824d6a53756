//! Quality checks on canonical records.
//!
//! Every check carries a severity; the score is the weighted share of checks
//! that passed. Errors make a record invalid, warnings only lower its score.
//! Two coarser 0-100 figures ride along: `quality_score` rewards rich field
//! content, `completeness_score` counts which fields are filled at all.

use std::collections::{BTreeMap, BTreeSet};

use chrono::Datelike;
use litscope_core::{CanonicalRecord, IdentifierType, Publication, ValidationConfig};
use serde::{Deserialize, Serialize};

use crate::identifiers::{check_shape, normalize_identifier};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub field: String,
    pub severity: Severity,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub is_valid: bool,
    /// Weighted share of passed checks, in [0, 1].
    pub score: f64,
    /// In check order.
    pub issues: Vec<ValidationIssue>,
    /// Field richness, 0-100.
    pub quality_score: f64,
    /// Share of core and optional fields present, 0-100.
    pub completeness_score: f64,
}

impl ValidationReport {
    pub fn errors(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues
            .iter()
            .filter(|issue| issue.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues
            .iter()
            .filter(|issue| issue.severity == Severity::Warning)
    }
}

#[derive(Debug, Clone)]
pub struct Validator {
    config: ValidationConfig,
    current_year: i32,
}

impl Validator {
    /// The reference year is fixed here, so one validator always gives the
    /// same verdict for the same record.
    pub fn new(config: ValidationConfig) -> Self {
        let current_year = config
            .current_year
            .unwrap_or_else(|| chrono::Utc::now().year());
        Self {
            config,
            current_year,
        }
    }

    pub fn current_year(&self) -> i32 {
        self.current_year
    }

    pub fn validate(&self, record: &CanonicalRecord) -> ValidationReport {
        self.validate_publication(&record.publication)
    }

    pub fn validate_batch(&self, records: &[CanonicalRecord]) -> Vec<ValidationReport> {
        records.iter().map(|record| self.validate(record)).collect()
    }

    pub fn validate_publication(&self, publication: &Publication) -> ValidationReport {
        let mut checks = Checks::new(&self.config);

        self.check_title(&mut checks, publication);
        check_identifier_shapes(&mut checks, publication);
        self.check_dates(&mut checks, publication);
        self.check_authors(&mut checks, publication);
        check_identifier_presence(&mut checks, publication);
        self.check_abstract(&mut checks, publication);
        self.check_venue(&mut checks, publication);

        checks.finish(publication)
    }

    fn check_title(&self, checks: &mut Checks<'_>, publication: &Publication) {
        let title = publication.title.trim();
        let present = checks.check(!title.is_empty(), Severity::Error, "title", || {
            "title is empty".to_string()
        });
        if !present {
            return;
        }

        let len = title.chars().count();
        let (min, max) = (self.config.title_min_len, self.config.title_max_len);
        checks.check(
            (min..=max).contains(&len),
            Severity::Warning,
            "title",
            || format!("title length {len} outside {min}..={max}"),
        );
    }

    fn check_dates(&self, checks: &mut Checks<'_>, publication: &Publication) {
        let date = publication.publication_date;
        let (field, year) = match (publication.publication_year, date) {
            (Some(year), _) => ("publication_year", year),
            (None, Some(date)) => ("publication_date", date.year()),
            (None, None) => return,
        };
        let (min, max) = (
            self.config.min_year,
            self.current_year.saturating_add(self.config.future_year_slack),
        );
        checks.check((min..=max).contains(&year), Severity::Error, field, || {
            format!("publication year {year} outside [{min}, {max}]")
        });

        if let (Some(date), Some(year)) = (date, publication.publication_year) {
            checks.check(
                date.year() == year,
                Severity::Warning,
                "publication_date",
                || format!("publication date {date} disagrees with year {year}"),
            );
        }
    }

    fn check_authors(&self, checks: &mut Checks<'_>, publication: &Publication) {
        checks.check(
            !publication.authors.is_empty(),
            Severity::Warning,
            "authors",
            || "no authors listed".to_string(),
        );
        let min = self.config.author_name_min_len;
        for (idx, author) in publication.authors.iter().enumerate() {
            let field = format!("authors[{idx}].full_name");
            let name = author.full_name.trim();
            let present = checks.check(!name.is_empty(), Severity::Error, &field, || {
                format!("author {idx} has an empty name")
            });
            if present {
                let len = name.chars().count();
                checks.check(len >= min, Severity::Warning, &field, || {
                    format!("author {idx} name length {len} below {min}")
                });
            }
        }
    }

    fn check_abstract(&self, checks: &mut Checks<'_>, publication: &Publication) {
        let text = publication.abstract_text.as_deref().map(str::trim).unwrap_or("");
        let present = checks.check(!text.is_empty(), Severity::Warning, "abstract", || {
            "abstract is missing".to_string()
        });
        if !present {
            return;
        }

        let len = text.chars().count();
        let (min, max) = (self.config.abstract_min_len, self.config.abstract_max_len);
        checks.check(
            (min..=max).contains(&len),
            Severity::Warning,
            "abstract",
            || format!("abstract length {len} outside {min}..={max}"),
        );
    }

    fn check_venue(&self, checks: &mut Checks<'_>, publication: &Publication) {
        let name = publication.venue_name();
        checks.check(name.is_some(), Severity::Warning, "venue.name", || {
            "venue is missing".to_string()
        });
        if let Some(name) = name {
            let (len, min) = (name.chars().count(), self.config.venue_name_min_len);
            checks.check(len >= min, Severity::Warning, "venue.name", || {
                format!("venue name length {len} below {min}")
            });
        }
    }
}

fn check_identifier_shapes(checks: &mut Checks<'_>, publication: &Publication) {
    for identifier in &publication.identifiers {
        let field = format!("identifiers.{}", identifier.kind);
        let Some(outcome) = check_shape(identifier) else {
            continue;
        };
        checks.check(outcome.is_ok(), Severity::Error, &field, || {
            outcome
                .as_ref()
                .err()
                .map(ToString::to_string)
                .unwrap_or_default()
        });
    }
}

fn check_identifier_presence(checks: &mut Checks<'_>, publication: &Publication) {
    let mut values: BTreeMap<IdentifierType, BTreeSet<String>> = BTreeMap::new();
    for identifier in &publication.identifiers {
        if let Some(normalized) = normalize_identifier(identifier) {
            values.entry(identifier.kind).or_default().insert(normalized);
        }
    }

    checks.check(!values.is_empty(), Severity::Warning, "identifiers", || {
        "no identifiers".to_string()
    });

    // Identifier chains can join records that disagree on another type.
    for (kind, distinct) in &values {
        checks.check(
            distinct.len() == 1,
            Severity::Warning,
            &format!("identifiers.{kind}"),
            || {
                let listed: Vec<&str> = distinct.iter().map(String::as_str).collect();
                format!("{} distinct {kind} values: {}", distinct.len(), listed.join(", "))
            },
        );
    }
}

/// Running tally of evaluated checks.
struct Checks<'a> {
    config: &'a ValidationConfig,
    total: f64,
    passed: f64,
    issues: Vec<ValidationIssue>,
}

impl<'a> Checks<'a> {
    fn new(config: &'a ValidationConfig) -> Self {
        Self {
            config,
            total: 0.0,
            passed: 0.0,
            issues: Vec::new(),
        }
    }

    fn weight(&self, severity: Severity) -> f64 {
        match severity {
            Severity::Error => self.config.error_weight,
            Severity::Warning => self.config.warning_weight,
        }
    }

    /// Record one check; returns whether it passed.
    fn check<M>(&mut self, ok: bool, severity: Severity, field: &str, message: M) -> bool
    where
        M: FnOnce() -> String,
    {
        let weight = self.weight(severity);
        self.total += weight;
        if ok {
            self.passed += weight;
        } else {
            self.issues.push(ValidationIssue {
                field: field.to_string(),
                severity,
                message: message(),
            });
        }
        ok
    }

    fn finish(self, publication: &Publication) -> ValidationReport {
        let score = if self.total > 0.0 {
            (self.passed / self.total).clamp(0.0, 1.0)
        } else {
            1.0
        };
        let is_valid = self
            .issues
            .iter()
            .all(|issue| issue.severity != Severity::Error);
        ValidationReport {
            is_valid,
            score,
            issues: self.issues,
            quality_score: quality_score(publication),
            completeness_score: completeness_score(publication),
        }
    }
}

/// Points for content: title 20, abstract 25, authors 15, identifiers 20,
/// date 10, venue 10. Short titles and abstracts earn partial credit.
fn quality_score(publication: &Publication) -> f64 {
    let mut score = 0.0;

    let title_len = publication.title.trim().chars().count() as f64;
    score += title_len.min(20.0);

    let abstract_len = publication
        .abstract_text
        .as_deref()
        .map_or(0, |text| text.trim().chars().count()) as f64;
    score += if abstract_len >= 100.0 {
        25.0
    } else {
        (abstract_len / 4.0).min(25.0)
    };

    score += (publication.authors.len() as f64 * 3.0).min(15.0);

    let identifiers = publication
        .identifiers
        .iter()
        .filter(|id| !id.is_blank())
        .count();
    score += (identifiers as f64 * 5.0).min(20.0);

    if publication.publication_date.is_some() || publication.publication_year.is_some() {
        score += 10.0;
    }
    if publication.venue_name().is_some() {
        score += 10.0;
    }

    score.min(100.0)
}

/// Percentage of six core and four optional fields that are filled.
fn completeness_score(publication: &Publication) -> f64 {
    let filled = |text: Option<&str>| text.is_some_and(|t| !t.trim().is_empty());
    let fields = [
        publication.has_title(),
        filled(publication.abstract_text.as_deref()),
        publication.publication_date.is_some(),
        !publication.authors.is_empty(),
        publication.identifiers.iter().any(|id| !id.is_blank()),
        publication.venue_name().is_some(),
        publication.citation_count.is_some(),
        publication.reference_count.is_some(),
        publication.is_open_access || filled(publication.open_access_url.as_deref()),
        !publication.publication_types.is_empty(),
    ];
    let present = fields.iter().filter(|present| **present).count();
    present as f64 * 100.0 / fields.len() as f64
}
