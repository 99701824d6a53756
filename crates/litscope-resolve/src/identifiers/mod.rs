//! Identifier parsing and the comparison form used by the identifier index.

pub mod arxiv;
pub mod doi;

use litscope_core::{Identifier, IdentifierType};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{ResolveError, Result};

pub use arxiv::ArxivId;
pub use doi::Doi;

static ARXIV_VERSION: Lazy<Regex> = Lazy::new(|| Regex::new(r"v\d+$").expect("valid regex"));
static PMID_SHAPE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{1,9}$").expect("valid regex"));

/// Comparison form of an identifier value: case and whitespace folded, known
/// prefixes and version suffixes removed. `None` when nothing is left.
pub fn normalize(kind: IdentifierType, raw: &str) -> Option<String> {
    let compact: String = raw
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase();

    let value = match kind {
        IdentifierType::Doi => doi::strip_doi_prefix(&compact)
            .trim_matches('/')
            .to_string(),
        IdentifierType::Pmid => compact.chars().filter(char::is_ascii_digit).collect(),
        IdentifierType::ArxivId => match ArxivId::parse(&compact) {
            Ok(parsed) => parsed.id.to_lowercase(),
            Err(_) => {
                let bare = arxiv::strip_arxiv_prefix(&compact);
                ARXIV_VERSION.replace(bare, "").into_owned()
            }
        },
        IdentifierType::PmcId => {
            if compact.chars().all(|c| c.is_ascii_digit()) && !compact.is_empty() {
                format!("pmc{compact}")
            } else {
                compact
            }
        }
        IdentifierType::SemanticScholarId
        | IdentifierType::WosUid
        | IdentifierType::Pii
        | IdentifierType::CorpusId => compact,
    };

    (!value.is_empty()).then_some(value)
}

pub fn normalize_identifier(identifier: &Identifier) -> Option<String> {
    normalize(identifier.kind, &identifier.value)
}

/// PubMed IDs are one to nine digits, nothing else.
pub fn parse_pmid(value: &str) -> Result<u32> {
    let value = value.trim();
    if !PMID_SHAPE.is_match(value) {
        return Err(ResolveError::InvalidPmid(value.to_string()));
    }
    value
        .parse()
        .map_err(|_| ResolveError::InvalidPmid(value.to_string()))
}

pub fn is_valid_pmid(value: &str) -> bool {
    parse_pmid(value).is_ok()
}

/// Shape check for the identifier types that have one; `None` for the rest.
pub fn check_shape(identifier: &Identifier) -> Option<Result<()>> {
    let outcome = match identifier.kind {
        IdentifierType::Doi => Doi::parse(&identifier.value).map(|_| ()),
        IdentifierType::Pmid => parse_pmid(&identifier.value).map(|_| ()),
        IdentifierType::ArxivId => ArxivId::parse(&identifier.value).map(|_| ()),
        _ => return None,
    };
    Some(outcome)
}

/// True unless the identifier's type has a shape rule and the value breaks it.
pub fn has_valid_shape(identifier: &Identifier) -> bool {
    check_shape(identifier).is_none_or(|outcome| outcome.is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn doi_case_and_prefix_folded() {
        assert_eq!(
            normalize(IdentifierType::Doi, " https://doi.org/10.1000/ABC "),
            Some("10.1000/abc".to_string())
        );
        assert_eq!(
            normalize(IdentifierType::Doi, "DOI: 10.1000/abc"),
            Some("10.1000/abc".to_string())
        );
    }

    #[test]
    fn pmid_keeps_digits_only() {
        assert_eq!(
            normalize(IdentifierType::Pmid, "PMID: 123 456"),
            Some("123456".to_string())
        );
        assert_eq!(normalize(IdentifierType::Pmid, "n/a"), None);
    }

    #[test]
    fn arxiv_version_dropped() {
        assert_eq!(
            normalize(IdentifierType::ArxivId, "arXiv:1706.03762v5"),
            Some("1706.03762".to_string())
        );
        assert_eq!(
            normalize(IdentifierType::ArxivId, "1706.03762"),
            normalize(IdentifierType::ArxivId, "1706.03762v1")
        );
    }

    #[test]
    fn pmc_prefix_added() {
        assert_eq!(
            normalize(IdentifierType::PmcId, "12345"),
            Some("pmc12345".to_string())
        );
        assert_eq!(
            normalize(IdentifierType::PmcId, "PMC12345"),
            Some("pmc12345".to_string())
        );
    }

    #[test]
    fn blank_values_produce_nothing() {
        for kind in IdentifierType::ALL {
            assert_eq!(normalize(kind, "  \t "), None, "{kind}");
        }
    }

    #[test]
    fn pmid_shape() {
        assert_eq!(parse_pmid(" 31452104 ").unwrap(), 31452104);
        assert!(matches!(parse_pmid("12a"), Err(ResolveError::InvalidPmid(_))));
        assert!(is_valid_pmid("31452104"));
        assert!(!is_valid_pmid("PMC123"));
        assert!(!is_valid_pmid(""));
    }

    #[test]
    fn shape_rules_apply_per_type() {
        assert!(has_valid_shape(&Identifier::pmid("123")));
        assert!(!has_valid_shape(&Identifier::pmid("PMID: 123")));
        assert!(has_valid_shape(&Identifier::doi("https://doi.org/10.1000/abc")));
        assert!(!has_valid_shape(&Identifier::doi("doi-less")));
        assert!(check_shape(&Identifier::new(IdentifierType::CorpusId, "anything")).is_none());
    }

    #[test]
    fn normalized_values_keep_their_shape() {
        for identifier in [
            Identifier::pmid("PMID: 123"),
            Identifier::doi("DOI: 10.1000/ABC"),
            Identifier::arxiv("arXiv:1706.03762v5"),
        ] {
            let normalized = normalize_identifier(&identifier).unwrap();
            assert!(has_valid_shape(&Identifier::new(identifier.kind, normalized)));
        }
    }
}
