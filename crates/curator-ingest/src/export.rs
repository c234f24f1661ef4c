//! Writers for curated subsets, the id-to-sources mapping and the fill report.
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

use curator_core::types::{Curation, FillReport};
use curator_engine::CandidatePool;

#[derive(Debug, Serialize)]
struct SelectionMetadata {
    original_total: usize,
    selected_count: usize,
    target_size: usize,
    guarantees_scaled_down: bool,
    fill_to_target_invoked: bool,
    generated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
struct SubsetFile<'a> {
    total_unique_artworks: usize,
    selection_metadata: SelectionMetadata,
    artworks: Vec<&'a Value>,
}

#[derive(Debug, Serialize)]
struct UniqueFile<'a> {
    total_unique_artworks: usize,
    artworks: Vec<&'a Value>,
}

fn create(path: &Path) -> Result<BufWriter<File>> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    Ok(BufWriter::new(file))
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let mut out = create(path)?;
    serde_json::to_writer_pretty(&mut out, value)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    out.flush()?;
    Ok(())
}

/// Payloads in curated order plus selection metadata. `original_total` is the
/// size of the unique pool the subset was drawn from.
pub fn write_subset_json(path: &Path, curation: &Curation, original_total: usize) -> Result<()> {
    let report = &curation.report;
    let file = SubsetFile {
        total_unique_artworks: curation.len(),
        selection_metadata: SelectionMetadata {
            original_total,
            selected_count: report.selected,
            target_size: report.target_size,
            guarantees_scaled_down: report.guarantees_scaled_down,
            fill_to_target_invoked: report.fill_to_target_invoked,
            generated_at: Utc::now(),
        },
        artworks: curation.items.iter().map(|i| &i.payload).collect(),
    };
    write_json(path, &file)?;
    info!("Subset JSON saved to {} ({} artworks)", path.display(), curation.len());
    Ok(())
}

/// `art_id,search_folders,selection_reason`, one row per curated item.
pub fn write_subset_csv(path: &Path, curation: &Curation) -> Result<()> {
    let mut writer = csv::Writer::from_writer(create(path)?);
    writer.write_record(["art_id", "search_folders", "selection_reason"])?;
    for item in &curation.items {
        writer.write_record([item.id.as_str(), item.sources.join(";").as_str(), item.tier.reason()])?;
    }
    writer.flush()?;
    info!("Subset CSV saved to {}", path.display());
    Ok(())
}

/// `art_id,search_folders` for every unique candidate, numeric ids ascending
/// first, other ids after them in lexical order.
pub fn write_mapping_csv(path: &Path, pool: &CandidatePool) -> Result<()> {
    let mut rows: Vec<(&str, String)> = pool
        .candidates()
        .iter()
        .map(|c| {
            let mut folders = pool.source_ids_of(c);
            folders.sort();
            (c.id.as_str(), folders.join(";"))
        })
        .collect();
    rows.sort_by_cached_key(|(id, _)| id_sort_key(id));

    let mut writer = csv::Writer::from_writer(create(path)?);
    writer.write_record(["art_id", "search_folders"])?;
    for (id, folders) in &rows {
        writer.write_record([*id, folders.as_str()])?;
    }
    writer.flush()?;
    info!("Saved art id mapping for {} artworks to {}", rows.len(), path.display());
    Ok(())
}

fn id_sort_key(id: &str) -> (bool, u64, String) {
    match id.parse::<u64>() {
        Ok(n) => (false, n, String::new()),
        Err(_) => (true, 0, id.to_string()),
    }
}

/// Every unique candidate payload, in pool insertion order.
pub fn write_unique_json(path: &Path, pool: &CandidatePool) -> Result<()> {
    let file = UniqueFile {
        total_unique_artworks: pool.len(),
        artworks: pool.candidates().iter().map(|c| &c.payload).collect(),
    };
    write_json(path, &file)?;
    info!("Saved {} unique artworks to {}", pool.len(), path.display());
    Ok(())
}

pub fn write_report_json(path: &Path, report: &FillReport) -> Result<()> {
    write_json(path, report)?;
    info!("Fill report saved to {}", path.display());
    Ok(())
}
