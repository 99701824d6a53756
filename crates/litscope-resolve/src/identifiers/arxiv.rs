use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{ResolveError, Result};

// New format: YYMM.NNNN or YYMM.NNNNN (with optional version)
static NEW_FORMAT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4}\.\d{4,5})(v(\d+))?$").expect("valid regex"));

// Old format: category/YYMMNNN
static OLD_FORMAT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([a-zA-Z\-]+(?:\.[A-Za-z]{2})?/\d{7})(v(\d+))?$").expect("valid regex")
});

const ARXIV_PREFIXES: [&str; 5] = [
    "https://arxiv.org/abs/",
    "http://arxiv.org/abs/",
    "https://arxiv.org/pdf/",
    "http://arxiv.org/pdf/",
    "arxiv:",
];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ArxivId {
    pub raw: String,
    /// Identifier without version, e.g. `2301.12345` or `hep-th/9901001`.
    pub id: String,
    pub version: Option<u32>,
    pub category: Option<String>,
}

impl ArxivId {
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();
        let stripped = strip_arxiv_prefix(input);

        if let Some(caps) = NEW_FORMAT.captures(stripped) {
            let id = caps[1].to_string();
            let version = caps.get(3).and_then(|v| v.as_str().parse::<u32>().ok());
            return Ok(Self {
                raw: input.to_string(),
                id,
                version,
                category: None,
            });
        }

        if let Some(caps) = OLD_FORMAT.captures(stripped) {
            let id = caps[1].to_string();
            let version = caps.get(3).and_then(|v| v.as_str().parse::<u32>().ok());
            let category = id.split_once('/').map(|(category, _)| category.to_string());
            return Ok(Self {
                raw: input.to_string(),
                id,
                version,
                category,
            });
        }

        Err(ResolveError::InvalidArxivId(input.to_string()))
    }

    pub fn is_valid(input: &str) -> bool {
        Self::parse(input).is_ok()
    }
}

pub(crate) fn strip_arxiv_prefix(input: &str) -> &str {
    let lower = input.to_ascii_lowercase();
    for prefix in ARXIV_PREFIXES {
        if lower.starts_with(prefix) {
            return input[prefix.len()..].trim_end_matches(".pdf");
        }
    }
    input
}
