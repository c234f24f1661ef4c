//! Deduplicated candidate index built from all source lists.

use std::collections::{BTreeMap, HashMap};

use curator_core::types::{CandidateId, Payload, SourceId, SourceList};

/// One appearance of a candidate: which source (index into the pool's
/// `source_order`) and at which rank inside that source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Membership {
    pub source: usize,
    pub rank: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub id: CandidateId,
    /// Taken from the first source that listed the id.
    pub payload: Payload,
    /// In source input order, at most one entry per source.
    pub memberships: Vec<Membership>,
    /// Position at which the pool first created this candidate.
    pub first_seen: usize,
}

impl Candidate {
    pub fn membership_count(&self) -> usize { self.memberships.len() }

    pub fn best_rank(&self) -> usize {
        self.memberships.iter().map(|m| m.rank).min().unwrap_or(usize::MAX)
    }

    pub fn is_member_of(&self, source: usize) -> bool {
        self.memberships.iter().any(|m| m.source == source)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CandidatePool {
    candidates: Vec<Candidate>,
    index: HashMap<CandidateId, usize>,
    source_order: Vec<SourceId>,
    /// Per source, candidate indices in that source's rank order.
    ranked: Vec<Vec<usize>>,
}

impl CandidatePool {
    pub fn build(sources: &[SourceList]) -> Self {
        let mut pool = Self {
            candidates: Vec::new(),
            index: HashMap::new(),
            source_order: sources.iter().map(|s| s.source_id.clone()).collect(),
            ranked: Vec::with_capacity(sources.len()),
        };
        for (source, list) in sources.iter().enumerate() {
            let mut ranked = Vec::with_capacity(list.items.len());
            for (rank, item) in list.items.iter().enumerate() {
                let idx = match pool.index.get(&item.id) {
                    Some(&idx) => idx,
                    None => {
                        let idx = pool.candidates.len();
                        pool.candidates.push(Candidate {
                            id: item.id.clone(),
                            payload: item.payload.clone(),
                            memberships: Vec::new(),
                            first_seen: idx,
                        });
                        pool.index.insert(item.id.clone(), idx);
                        idx
                    }
                };
                let candidate = &mut pool.candidates[idx];
                // repeated id inside one list: keep the best rank only
                if candidate.memberships.last().is_some_and(|m| m.source == source) {
                    continue;
                }
                candidate.memberships.push(Membership { source, rank });
                ranked.push(idx);
            }
            pool.ranked.push(ranked);
        }
        pool
    }

    pub fn len(&self) -> usize { self.candidates.len() }

    pub fn is_empty(&self) -> bool { self.candidates.is_empty() }

    pub fn candidates(&self) -> &[Candidate] { &self.candidates }

    pub fn candidate(&self, idx: usize) -> &Candidate { &self.candidates[idx] }

    pub fn get(&self, id: &str) -> Option<&Candidate> {
        self.index.get(id).map(|&idx| &self.candidates[idx])
    }

    pub fn source_order(&self) -> &[SourceId] { &self.source_order }

    pub fn source_count(&self) -> usize { self.source_order.len() }

    /// Distinct candidates of one source, in that source's rank order.
    pub fn ranked(&self, source: usize) -> &[usize] { &self.ranked[source] }

    pub fn source_ids_of(&self, candidate: &Candidate) -> Vec<SourceId> {
        candidate
            .memberships
            .iter()
            .map(|m| self.source_order[m.source].clone())
            .collect()
    }

    /// Candidates present in two or more sources, ordered by membership count
    /// desc, then best rank asc, then first-seen asc.
    pub fn relevance_tier(&self) -> Vec<usize> {
        let mut tier: Vec<usize> = (0..self.candidates.len())
            .filter(|&idx| self.candidates[idx].membership_count() >= 2)
            .collect();
        tier.sort_by(|&a, &b| {
            let (a, b) = (&self.candidates[a], &self.candidates[b]);
            b.membership_count()
                .cmp(&a.membership_count())
                .then(a.best_rank().cmp(&b.best_rank()))
                .then(a.first_seen.cmp(&b.first_seen))
        });
        tier
    }

    /// Number of candidates per membership count.
    pub fn appearance_distribution(&self) -> BTreeMap<usize, usize> {
        let mut dist = BTreeMap::new();
        for c in &self.candidates {
            *dist.entry(c.membership_count()).or_insert(0) += 1;
        }
        dist
    }
}
