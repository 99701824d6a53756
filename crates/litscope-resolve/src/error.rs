use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("invalid DOI: {0}")]
    InvalidDoi(String),

    #[error("invalid arXiv ID: {0}")]
    InvalidArxivId(String),

    #[error("invalid PMID: {0}")]
    InvalidPmid(String),

    #[error(transparent)]
    Core(#[from] litscope_core::LitscopeError),
}

pub type Result<T> = std::result::Result<T, ResolveError>;
