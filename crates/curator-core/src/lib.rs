//! Shared domain types, errors and configuration for the curation workspace.
//!
//! Config uses Figment to merge defaults + `config.toml` + `config.<env>.toml`
//! + `APP_*` env vars. Path helpers expand `~` and `${VAR}`.
pub mod config;
pub mod error;
pub mod traits;
pub mod types;

pub use config::{Config, CurationConfig, DataConfig};
pub use error::{Error, Result};
pub use types::{
    validate_sources, CandidateId, CandidateRef, Curation, FillReport, Payload, SelectedItem,
    SourceContribution, SourceId, SourceList, Tier, TierCounts,
};
