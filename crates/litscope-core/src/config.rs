use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{LitscopeError, Result};
use crate::models::{IdentifierType, Source};

/// Resolver configuration, loaded from `~/.config/litscope/resolver.toml`.
///
/// Everything the engine decides is a function of its input batch and this
/// value; nothing is read from process-wide state during a pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ResolverConfig {
    pub priority: PriorityConfig,
    pub matching: MatchingConfig,
    pub validation: ValidationConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriorityConfig {
    /// Highest-confidence identifier type first.
    pub identifier_priority: Vec<IdentifierType>,
    /// Preferred source first; used to break merge ties.
    pub source_priority: Vec<Source>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    pub score_threshold: f64,
    pub year_tolerance: u32,
    pub title_weight: f64,
    pub author_weight: f64,
    pub missing_author_title_threshold: f64,
    pub scaling_warn_threshold: usize,
    pub candidate_window: CandidateWindow,
}

/// How the similarity matcher picks record pairs to score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum CandidateWindow {
    /// Every pair. Quadratic; fine for a few thousand records per pass.
    AllPairs,
    /// Only pairs whose years are within tolerance, plus year-less records.
    #[default]
    YearBucket,
    /// Only pairs sharing their first `tokens` normalized title words.
    TitlePrefix { tokens: usize },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    pub error_weight: f64,
    pub warning_weight: f64,
    pub min_year: i32,
    pub future_year_slack: i32,
    pub title_min_len: usize,
    pub title_max_len: usize,
    pub abstract_min_len: usize,
    pub abstract_max_len: usize,
    pub venue_name_min_len: usize,
    pub author_name_min_len: usize,
    /// Pin the reference year; the current UTC year is used when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_year: Option<i32>,
}

// ─── Defaults ──────────────────────────────────────────────

impl Default for PriorityConfig {
    fn default() -> Self {
        Self {
            identifier_priority: IdentifierType::default_priority(),
            source_priority: vec![
                Source::Pubmed,
                Source::SemanticScholar,
                Source::Wos,
                Source::Crossref,
                Source::Openalex,
                Source::Arxiv,
                Source::Biorxiv,
            ],
        }
    }
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            score_threshold: 0.85,
            year_tolerance: 1,
            title_weight: 0.7,
            author_weight: 0.3,
            missing_author_title_threshold: 0.95,
            scaling_warn_threshold: 5000,
            candidate_window: CandidateWindow::default(),
        }
    }
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            error_weight: 1.0,
            warning_weight: 0.3,
            min_year: 1000,
            future_year_slack: 5,
            title_min_len: 10,
            title_max_len: 500,
            abstract_min_len: 50,
            abstract_max_len: 5000,
            venue_name_min_len: 3,
            author_name_min_len: 2,
            current_year: None,
        }
    }
}

// ─── Priority lookups ──────────────────────────────────────

impl PriorityConfig {
    /// Rank of a source; unlisted sources sort after every listed one.
    pub fn source_rank(&self, source: Source) -> usize {
        self.source_priority
            .iter()
            .position(|s| *s == source)
            .unwrap_or(self.source_priority.len())
    }

    /// Rank of an identifier type; unlisted types sort last.
    pub fn identifier_rank(&self, kind: IdentifierType) -> usize {
        self.identifier_priority
            .iter()
            .position(|k| *k == kind)
            .unwrap_or(self.identifier_priority.len())
    }
}

// ─── Load / Save ───────────────────────────────────────────

impl ResolverConfig {
    /// Standard config file path: `~/.config/litscope/resolver.toml`
    pub fn config_path() -> PathBuf {
        if let Ok(path) = std::env::var("LITSCOPE_CONFIG") {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("litscope")
            .join("resolver.toml")
    }

    /// Load config from disk, falling back to defaults if the file doesn't exist.
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        Self::load_from(&path)
    }

    /// Load config from a specific path and check it.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save config to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let toml_str = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_str)?;
        Ok(())
    }

    /// Reject settings that would make a resolution pass meaningless.
    pub fn validate(&self) -> Result<()> {
        if self.priority.identifier_priority.is_empty() {
            return Err(LitscopeError::ConfigError(
                "identifier_priority must list at least one identifier type".to_string(),
            ));
        }

        let m = &self.matching;
        for (name, value) in [
            ("score_threshold", m.score_threshold),
            ("missing_author_title_threshold", m.missing_author_title_threshold),
            ("title_weight", m.title_weight),
            ("author_weight", m.author_weight),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(LitscopeError::ConfigError(format!(
                    "{name} must be within [0, 1], got {value}"
                )));
            }
        }
        if m.title_weight + m.author_weight <= 0.0 {
            return Err(LitscopeError::ConfigError(
                "title_weight and author_weight cannot both be zero".to_string(),
            ));
        }
        if let CandidateWindow::TitlePrefix { tokens: 0 } = m.candidate_window {
            return Err(LitscopeError::ConfigError(
                "title_prefix window needs at least one token".to_string(),
            ));
        }

        let v = &self.validation;
        if v.error_weight < 0.0 || v.warning_weight < 0.0 {
            return Err(LitscopeError::ConfigError(
                "validation weights cannot be negative".to_string(),
            ));
        }
        if v.title_min_len > v.title_max_len {
            return Err(LitscopeError::ConfigError(format!(
                "title_min_len ({}) exceeds title_max_len ({})",
                v.title_min_len, v.title_max_len
            )));
        }
        if v.abstract_min_len > v.abstract_max_len {
            return Err(LitscopeError::ConfigError(format!(
                "abstract_min_len ({}) exceeds abstract_max_len ({})",
                v.abstract_min_len, v.abstract_max_len
            )));
        }
        if v.future_year_slack < 0 {
            return Err(LitscopeError::ConfigError(format!(
                "future_year_slack cannot be negative, got {}",
                v.future_year_slack
            )));
        }

        Ok(())
    }
}
