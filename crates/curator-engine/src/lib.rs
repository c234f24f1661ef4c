//! curator-engine
//!
//! Merges the ranked result lists of several query variants into one
//! target-sized curated set: pool -> plan -> select -> shuffle. Pure and
//! synchronous; every stage is a plain function of its inputs.
use tracing::{info, instrument, warn};

use curator_core::config::CurationConfig;
use curator_core::error::Result;
use curator_core::types::{validate_sources, Curation, FillReport, SelectedItem, SourceContribution, SourceList};

pub mod plan;
pub mod pool;
pub mod select;
pub mod shuffle;

pub use plan::{apportion, AllocationPlan};
pub use pool::{Candidate, CandidatePool, Membership};
pub use select::{select, Pick, Selection};
pub use shuffle::Randomizer;

#[derive(Debug, Clone, Default)]
pub struct Curator {
    config: CurationConfig,
}

impl Curator {
    pub fn new(config: CurationConfig) -> Self { Self { config } }

    pub fn config(&self) -> &CurationConfig { &self.config }

    /// Runs the full pipeline. Input is validated up front; nothing is built
    /// from a batch that fails validation.
    #[instrument(skip_all, fields(sources = sources.len(), target = self.config.target_size))]
    pub fn curate(&self, sources: &[SourceList]) -> Result<Curation> {
        self.config.validate()?;
        validate_sources(sources)?;

        let target_size = self.config.target_size;
        let pool = CandidatePool::build(sources);
        let plan = AllocationPlan::compute(sources, target_size, self.config.minimum_per_source);
        let selection = select(&pool, &plan, target_size);

        let report = build_report(sources, &pool, &plan, &selection, target_size);
        if report.shortfall > 0 {
            info!(
                selected = report.selected,
                target_size,
                shortfall = report.shortfall,
                "fewer unique candidates than target"
            );
        }
        if report.fill_to_target_invoked {
            warn!(filled = report.tiers.fill_to_target, "fill-to-target tier used, upstream results lack diversity");
        }

        let ordered: Vec<SelectedItem> = selection
            .chosen
            .iter()
            .map(|pick| {
                let candidate = pool.candidate(pick.candidate);
                SelectedItem {
                    id: candidate.id.clone(),
                    payload: candidate.payload.clone(),
                    sources: pool.source_ids_of(candidate),
                    tier: pick.tier,
                }
            })
            .collect();
        let items = Randomizer::from_seed(self.config.shuffle_seed).shuffle(ordered);

        info!(
            unique = report.unique_candidates,
            selected = report.selected,
            relevance_tier = report.relevance_tier_size,
            "curation complete"
        );
        Ok(Curation { items, report })
    }
}

/// Convenience wrapper around [`Curator::curate`].
pub fn curate(sources: &[SourceList], config: &CurationConfig) -> Result<Curation> {
    Curator::new(config.clone()).curate(sources)
}

fn build_report(
    sources: &[SourceList],
    pool: &CandidatePool,
    plan: &AllocationPlan,
    selection: &Selection,
    target_size: usize,
) -> FillReport {
    let selected = selection.chosen.len();
    FillReport {
        target_size,
        unique_candidates: pool.len(),
        selected,
        shortfall: target_size.saturating_sub(selected),
        relevance_tier_size: selection.relevance_tier_size,
        guarantees_scaled_down: plan.guarantees_scaled_down,
        fill_to_target_invoked: selection.fill_to_target_invoked,
        tiers: selection.tiers,
        sources: sources
            .iter()
            .enumerate()
            .map(|(s, list)| SourceContribution {
                source_id: list.source_id.clone(),
                label: list.label.clone(),
                listed: list.len(),
                available_total: list.available_total,
                guaranteed: plan.guaranteed[s],
                proportional_share: selection.proportional_share[s],
                contributed: selection.contributions[s],
            })
            .collect(),
    }
}
