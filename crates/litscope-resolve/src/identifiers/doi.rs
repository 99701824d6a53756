use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{ResolveError, Result};

// "10." + registrant code (dot-separated digit groups) + "/" + non-blank suffix
static DOI_SHAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^10\.\d+(\.\d+)*/\S+$").expect("valid regex"));

const DOI_PREFIXES: [&str; 6] = [
    "https://doi.org/",
    "http://doi.org/",
    "https://dx.doi.org/",
    "http://dx.doi.org/",
    "doi:",
    "doi ",
];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Doi {
    pub raw: String,
    pub normalized: String,
    pub url: String,
}

impl Doi {
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();
        let stripped = strip_doi_prefix(input);

        if !DOI_SHAPE.is_match(stripped) {
            return Err(ResolveError::InvalidDoi(input.to_string()));
        }

        let normalized = stripped.to_lowercase();
        let url = format!("https://doi.org/{normalized}");

        Ok(Self {
            raw: input.to_string(),
            normalized,
            url,
        })
    }

    pub fn is_valid(input: &str) -> bool {
        Self::parse(input).is_ok()
    }
}

/// Strip resolver URLs and `doi:` labels, case-insensitively.
pub(crate) fn strip_doi_prefix(input: &str) -> &str {
    let lower = input.to_ascii_lowercase();
    for prefix in DOI_PREFIXES {
        if lower.starts_with(prefix) {
            return input[prefix.len()..].trim_start();
        }
    }
    input
}
