//! litscope-core — literature record models, the resolver input boundary, config.

pub mod config;
pub mod error;
pub mod models;

pub use config::{CandidateWindow, MatchingConfig, PriorityConfig, ResolverConfig, ValidationConfig};
pub use error::{LitscopeError, Result};
pub use models::*;
