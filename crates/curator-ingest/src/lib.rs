//! curator-ingest
//!
//! Loads persisted per-variant search results into `SourceList`s and writes
//! curated subsets back to disk. See `loader` and `export`.
pub mod export;
pub mod loader;

pub use export::{write_mapping_csv, write_report_json, write_subset_csv, write_subset_json, write_unique_json};
pub use loader::{discover_sources, fetch_all, load_source, load_sources, FolderSource, DEFAULT_PREFIX, RESULTS_FILE};
