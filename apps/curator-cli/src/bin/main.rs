use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use curator_core::config::{resolve_with_base, Config, CurationConfig, DataConfig};
use curator_core::types::{FillReport, SourceList, Tier};
use curator_engine::{CandidatePool, Curator};
use curator_ingest::{
    load_sources, write_mapping_csv, write_report_json, write_subset_csv, write_subset_json, write_unique_json,
};

#[derive(Debug, Parser)]
#[command(name = "curator", version, about = "Merge multi-query search results into one curated subset")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Pool, plan, select and shuffle the search folders under ROOT
    Curate {
        /// Run directory holding the search_* folders (default: data.search_root)
        root: Option<PathBuf>,
        /// Output directory (default: <data.output_dir>/<run name>)
        #[arg(long)]
        out: Option<PathBuf>,
        #[arg(long)]
        target: Option<usize>,
        #[arg(long)]
        min_per_source: Option<usize>,
        #[arg(long)]
        seed: Option<u64>,
        /// Folder name prefix (default: data.folder_prefix)
        #[arg(long)]
        prefix: Option<String>,
    },
    /// Print pool statistics; with --out also write the id mapping and unique artworks
    Inspect {
        root: Option<PathBuf>,
        #[arg(long)]
        out: Option<PathBuf>,
        #[arg(long)]
        prefix: Option<String>,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = Config::load().map_err(|e| {
        eprintln!("Error loading config: {}", e);
        e
    })?;
    let data = config.data()?;

    match cli.command {
        Command::Curate { root, out, target, min_per_source, seed, prefix } => {
            let mut curation_config = config.curation()?;
            apply_overrides(&mut curation_config, target, min_per_source, seed);
            let root = search_root(&config, &data, root);
            let out_dir = output_dir(&config, &data, &root, out);
            let prefix = prefix.unwrap_or_else(|| data.folder_prefix.clone());
            run_curate(&root, &out_dir, &prefix, curation_config)
        }
        Command::Inspect { root, out, prefix } => {
            let root = search_root(&config, &data, root);
            let prefix = prefix.unwrap_or_else(|| data.folder_prefix.clone());
            run_inspect(&root, out.as_deref(), &prefix)
        }
    }
}

fn apply_overrides(config: &mut CurationConfig, target: Option<usize>, min_per_source: Option<usize>, seed: Option<u64>) {
    if let Some(target) = target { config.target_size = target; }
    if let Some(min) = min_per_source { config.minimum_per_source = min; }
    if seed.is_some() { config.shuffle_seed = seed; }
}

fn search_root(config: &Config, data: &DataConfig, root: Option<PathBuf>) -> PathBuf {
    root.unwrap_or_else(|| resolve_with_base(config.base_dir(), &data.search_root))
}

fn output_dir(config: &Config, data: &DataConfig, root: &Path, out: Option<PathBuf>) -> PathBuf {
    out.unwrap_or_else(|| resolve_with_base(config.base_dir(), &data.output_dir).join(run_name(root)))
}

fn run_name(root: &Path) -> String {
    root.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_else(|| "run".to_string())
}

fn load(root: &Path, prefix: &str) -> anyhow::Result<Vec<SourceList>> {
    tokio::runtime::Runtime::new()?
        .block_on(load_sources(root, prefix))
        .with_context(|| format!("Failed to load search results from {}", root.display()))
}

fn run_curate(root: &Path, out_dir: &Path, prefix: &str, config: CurationConfig) -> anyhow::Result<()> {
    println!("Curating search results in {}", root.display());
    let sources = load(root, prefix)?;
    let target = config.target_size;
    let curation = Curator::new(config).curate(&sources)?;

    let name = run_name(root);
    let json_path = out_dir.join(format!("{name}_subset_{target}.json"));
    let csv_path = out_dir.join(format!("{name}_subset_{target}.csv"));
    let report_path = out_dir.join(format!("{name}_fill_report.json"));
    write_subset_json(&json_path, &curation, curation.report.unique_candidates)?;
    write_subset_csv(&csv_path, &curation)?;
    write_report_json(&report_path, &curation.report)?;

    print_summary(&curation.report);
    println!("📄 JSON subset: {}", json_path.display());
    println!("📊 CSV subset: {}", csv_path.display());
    println!("🧾 Fill report: {}", report_path.display());
    Ok(())
}

fn print_summary(report: &FillReport) {
    println!("{}", "=".repeat(60));
    println!("Target size: {}", report.target_size);
    println!("Unique candidates: {}", report.unique_candidates);
    println!("Selected: {}", report.selected);
    if report.shortfall > 0 {
        println!("⚠️  Shortfall: {} (not enough unique candidates)", report.shortfall);
    }
    println!("Cross-query candidates: {}", report.relevance_tier_size);
    if report.guarantees_scaled_down {
        println!("⚠️  Minimum-per-source guarantees were scaled down to fit the target");
    }
    if report.fill_to_target_invoked {
        println!("⚠️  Fill-to-target tier used");
    }
    println!("Selection reasons:");
    for tier in Tier::ALL {
        println!("  {}: {}", tier, report.tiers.get(tier));
    }
    println!("Per-source contribution:");
    for s in &report.sources {
        println!(
            "  {}: {} (guaranteed {}, share {}, listed {}, available {})",
            s.source_id, s.contributed, s.guaranteed, s.proportional_share, s.listed, s.available_total
        );
    }
}

fn run_inspect(root: &Path, out: Option<&Path>, prefix: &str) -> anyhow::Result<()> {
    let sources = load(root, prefix)?;
    let pool = CandidatePool::build(&sources);
    println!("Sources: {}", sources.len());
    for s in &sources {
        println!("  {}: {} artworks ({} available){}", s.source_id, s.len(), s.available_total,
            s.label.as_deref().map(|l| format!(" \"{l}\"")).unwrap_or_default());
    }
    println!("Total unique artworks: {}", pool.len());
    println!("Artwork appearance distribution:");
    for (count, artworks) in pool.appearance_distribution() {
        println!("  {} artworks appeared in {} folder(s)", artworks, count);
    }

    if let Some(out) = out {
        let name = run_name(root);
        write_mapping_csv(&out.join(format!("{name}_art_id_mapping.csv")), &pool)?;
        write_unique_json(&out.join(format!("{name}_unique_artworks.json")), &pool)?;
        info!("Wrote mapping and unique artworks to {}", out.display());
    }
    Ok(())
}
