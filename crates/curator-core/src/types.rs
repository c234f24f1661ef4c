//! Domain types shared by the engine, ingest and the CLI.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

use crate::error::{Error, Result};

pub type SourceId = String;
pub type CandidateId = String;
pub type Payload = Value;

/// One item as returned by a query variant.
///
/// `payload` is the catalog record (title, artist, license, preview URLs, ...)
/// and is carried through untouched. Only `id` is ever inspected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateRef {
    pub id: CandidateId,
    pub payload: Payload,
}

impl CandidateRef {
    pub fn new(id: impl Into<CandidateId>, payload: Payload) -> Self {
        Self { id: id.into(), payload }
    }
}

/// The result set of one executed query variant.
///
/// - `source_id`: stable identity of the variant (e.g. `search_3`)
/// - `label`: the variant's configuration label, diagnostics only
/// - `items`: rank order preserved, index 0 is the best match
/// - `available_total`: what the catalog reported as available, may exceed `items.len()`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceList {
    pub source_id: SourceId,
    #[serde(default)]
    pub label: Option<String>,
    pub items: Vec<CandidateRef>,
    #[serde(default)]
    pub available_total: usize,
}

impl SourceList {
    pub fn new(source_id: impl Into<SourceId>, items: Vec<CandidateRef>) -> Self {
        let available_total = items.len();
        Self { source_id: source_id.into(), label: None, items, available_total }
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    #[must_use]
    pub fn with_available_total(mut self, total: usize) -> Self {
        self.available_total = total;
        self
    }

    pub fn len(&self) -> usize { self.items.len() }

    pub fn is_empty(&self) -> bool { self.items.is_empty() }

    /// Rejects items whose id is blank or whose payload is absent.
    pub fn validate(&self) -> Result<()> {
        if self.source_id.trim().is_empty() {
            return Err(Error::Validation("source list with an empty source_id".to_string()));
        }
        for (rank, item) in self.items.iter().enumerate() {
            if item.id.trim().is_empty() {
                return Err(Error::Validation(format!(
                    "{}: item at rank {} has an empty id",
                    self.source_id, rank
                )));
            }
            if item.payload.is_null() {
                return Err(Error::Validation(format!(
                    "{}: item '{}' at rank {} has no payload",
                    self.source_id, item.id, rank
                )));
            }
        }
        Ok(())
    }
}

/// Validates a whole batch: every list individually, plus unique source ids.
pub fn validate_sources(sources: &[SourceList]) -> Result<()> {
    let mut seen = HashSet::new();
    for source in sources {
        source.validate()?;
        if !seen.insert(source.source_id.as_str()) {
            return Err(Error::Validation(format!("duplicate source_id '{}'", source.source_id)));
        }
    }
    Ok(())
}

/// The priority tier that put an item into the curated set.
///
/// Serialized names match the `selection_reason` column of the subset CSV.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    #[serde(rename = "multi_folder")]
    Relevance,
    #[serde(rename = "min_requirement")]
    Minimum,
    Proportional,
    FillToTarget,
}

impl Tier {
    pub const ALL: [Tier; 4] = [Tier::Relevance, Tier::Minimum, Tier::Proportional, Tier::FillToTarget];

    pub fn reason(self) -> &'static str {
        match self {
            Tier::Relevance => "multi_folder",
            Tier::Minimum => "min_requirement",
            Tier::Proportional => "proportional",
            Tier::FillToTarget => "fill_to_target",
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.reason())
    }
}

/// One entry of the curated output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectedItem {
    pub id: CandidateId,
    pub payload: Payload,
    /// Every source the candidate appeared in, in source input order.
    pub sources: Vec<SourceId>,
    pub tier: Tier,
}

/// Per-source view of the plan and of what the source actually contributed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceContribution {
    pub source_id: SourceId,
    pub label: Option<String>,
    pub listed: usize,
    pub available_total: usize,
    pub guaranteed: usize,
    /// Proportional-tier share applied, split from the slots open after the
    /// minimum tier.
    pub proportional_share: usize,
    /// Chosen candidates that are members of this source, relevance picks included.
    pub contributed: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierCounts {
    pub relevance: usize,
    pub minimum: usize,
    pub proportional: usize,
    pub fill_to_target: usize,
}

impl TierCounts {
    pub fn bump(&mut self, tier: Tier) {
        match tier {
            Tier::Relevance => self.relevance += 1,
            Tier::Minimum => self.minimum += 1,
            Tier::Proportional => self.proportional += 1,
            Tier::FillToTarget => self.fill_to_target += 1,
        }
    }

    pub fn get(&self, tier: Tier) -> usize {
        match tier {
            Tier::Relevance => self.relevance,
            Tier::Minimum => self.minimum,
            Tier::Proportional => self.proportional,
            Tier::FillToTarget => self.fill_to_target,
        }
    }

    pub fn total(&self) -> usize {
        self.relevance + self.minimum + self.proportional + self.fill_to_target
    }
}

/// Diagnostics describing how the curated set was assembled.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FillReport {
    pub target_size: usize,
    pub unique_candidates: usize,
    pub selected: usize,
    /// `target_size - selected`; non-zero when the pool was too small.
    pub shortfall: usize,
    /// Candidates eligible for the relevance tier (present in two or more sources).
    pub relevance_tier_size: usize,
    pub guarantees_scaled_down: bool,
    pub fill_to_target_invoked: bool,
    pub tiers: TierCounts,
    pub sources: Vec<SourceContribution>,
}

impl FillReport {
    pub fn contribution(&self, source_id: &str) -> Option<&SourceContribution> {
        self.sources.iter().find(|s| s.source_id == source_id)
    }
}

/// Final output of one pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Curation {
    pub items: Vec<SelectedItem>,
    pub report: FillReport,
}

impl Curation {
    pub fn len(&self) -> usize { self.items.len() }

    pub fn is_empty(&self) -> bool { self.items.is_empty() }

    pub fn ids(&self) -> impl Iterator<Item = &str> + '_ {
        self.items.iter().map(|i| i.id.as_str())
    }
}
