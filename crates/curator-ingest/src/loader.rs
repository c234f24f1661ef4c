//! Reads the per-variant folders written by the search collaborator.
//!
//! Layout under a run root:
//!
//! ```text
//! <root>/search_1/search_results.json
//! <root>/search_2/search_results.json
//! ...
//! ```
//!
//! Each `search_results.json` is `{timestamp, query, parameters_used,
//! results: {total, images: [..]}}`; every image must carry an `art_id`.
use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use curator_core::error::Error;
use curator_core::traits::SourceProvider;
use curator_core::types::{CandidateRef, SourceId, SourceList};

pub const RESULTS_FILE: &str = "search_results.json";
pub const DEFAULT_PREFIX: &str = "search_";

#[derive(Debug, Deserialize)]
struct SearchResultsFile {
    #[serde(default)]
    query: Option<String>,
    #[serde(default)]
    results: Option<ResultsBody>,
}

#[derive(Debug, Deserialize)]
struct ResultsBody {
    #[serde(default)]
    total: Option<u64>,
    #[serde(default)]
    images: Option<Vec<Value>>,
}

/// Variant folders directly under `root` whose name starts with `prefix`,
/// ordered by numeric suffix (`search_2` before `search_10`), then by name.
pub fn discover_sources(root: &Path, prefix: &str) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        return Err(Error::NotFound(format!("search root {}", root.display())).into());
    }
    let mut dirs: Vec<PathBuf> = walkdir::WalkDir::new(root)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_dir())
        .filter(|e| e.file_name().to_str().is_some_and(|n| n.starts_with(prefix)))
        .map(|e| e.into_path())
        .collect();
    dirs.sort_by_cached_key(|d| {
        let name = folder_name(d);
        let suffix = name.strip_prefix(prefix).and_then(|s| s.parse::<u64>().ok()).unwrap_or(u64::MAX);
        (suffix, name)
    });
    info!("Found {} search folders under {}", dirs.len(), root.display());
    Ok(dirs)
}

fn folder_name(dir: &Path) -> String {
    dir.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_default()
}

/// Parses one variant folder. A missing results file or an empty `images`
/// list gives an empty source; unreadable JSON is an error.
pub fn load_source(dir: &Path) -> Result<SourceList> {
    let source_id = folder_name(dir);
    let results_path = dir.join(RESULTS_FILE);
    if !results_path.exists() {
        warn!("{} does not exist", results_path.display());
        return Ok(SourceList::new(source_id, Vec::new()));
    }
    let content = fs::read_to_string(&results_path)
        .with_context(|| format!("Failed to read {}", results_path.display()))?;
    let file: SearchResultsFile = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {}", results_path.display()))?;

    let (total, images) = match file.results {
        Some(body) => (body.total, body.images.unwrap_or_default()),
        None => (None, Vec::new()),
    };
    if images.is_empty() {
        warn!("No images found in {}", results_path.display());
    }

    let mut items = Vec::with_capacity(images.len());
    for image in images {
        match art_id(&image) {
            Some(id) => items.push(CandidateRef::new(id, image)),
            None => warn!("{}: skipping image without art_id", source_id),
        }
    }
    let available_total = total.map_or(items.len(), |t| usize::try_from(t).unwrap_or(usize::MAX));
    debug!("{}: {} items, {} available", source_id, items.len(), available_total);

    let mut source = SourceList::new(source_id, items).with_available_total(available_total);
    source.label = file.query;
    Ok(source)
}

fn art_id(image: &Value) -> Option<String> {
    match image.get("art_id")? {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        _ => None,
    }
}

/// One variant folder on disk.
#[derive(Debug, Clone)]
pub struct FolderSource {
    dir: PathBuf,
}

impl FolderSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self { Self { dir: dir.into() } }

    pub fn dir(&self) -> &Path { &self.dir }
}

impl SourceProvider for FolderSource {
    fn source_id(&self) -> SourceId { folder_name(&self.dir) }
    fn fetch(&self) -> Result<SourceList> { load_source(&self.dir) }
}

/// Fan-out: every provider runs on the blocking pool at once. Fan-in: results
/// come back in provider order, first failure wins.
pub async fn fetch_all<P>(providers: Vec<P>) -> Result<Vec<SourceList>>
where
    P: SourceProvider + 'static,
{
    let handles: Vec<_> = providers
        .into_iter()
        .map(|provider| {
            let source_id = provider.source_id();
            let handle = tokio::task::spawn_blocking(move || provider.fetch());
            (source_id, handle)
        })
        .collect();
    let (ids, handles): (Vec<_>, Vec<_>) = handles.into_iter().unzip();
    let joined = futures::future::join_all(handles).await;

    let mut sources = Vec::with_capacity(joined.len());
    for (source_id, outcome) in ids.into_iter().zip(joined) {
        let source = outcome
            .with_context(|| format!("loader task for {} did not complete", source_id))?
            .with_context(|| format!("Failed to load {}", source_id))?;
        sources.push(source);
    }
    Ok(sources)
}

/// Discovers and loads every variant folder under `root`.
pub async fn load_sources(root: &Path, prefix: &str) -> Result<Vec<SourceList>> {
    let providers: Vec<FolderSource> =
        discover_sources(root, prefix)?.into_iter().map(FolderSource::new).collect();
    let sources = fetch_all(providers).await?;
    let total: usize = sources.iter().map(SourceList::len).sum();
    info!("Loaded {} sources with {} items in total", sources.len(), total);
    Ok(sources)
}
