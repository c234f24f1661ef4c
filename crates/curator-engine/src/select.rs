//! Four-tier assembly of the curated set.
//!
//! 1. relevance: candidates seen in two or more sources
//! 2. minimum representation, round-robin up to each source's guarantee
//! 3. proportional fill: the slots still open are split over sources by list
//!    length, and each source adds up to its share, round-robin
//! 4. fill to target in pool insertion order
//!
//! A source's contribution counts every chosen candidate that is a member of
//! it, whichever tier picked it. Tier 2 measures the guarantee against that
//! contribution; tier 3 counts only its own additions.

use tracing::debug;

use curator_core::types::{Tier, TierCounts};

use crate::plan::{apportion, AllocationPlan};
use crate::pool::CandidatePool;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pick {
    /// Index into the pool's candidates.
    pub candidate: usize,
    pub tier: Tier,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    /// Pre-shuffle order.
    pub chosen: Vec<Pick>,
    pub tiers: TierCounts,
    /// Indexed like the pool's `source_order`.
    pub contributions: Vec<usize>,
    /// Tier-3 share each source was actually given.
    pub proportional_share: Vec<usize>,
    pub relevance_tier_size: usize,
    pub fill_to_target_invoked: bool,
}

pub fn select(pool: &CandidatePool, plan: &AllocationPlan, target_size: usize) -> Selection {
    let mut selector = Selector::new(pool, target_size);

    let relevance_tier_size = selector.relevance();

    let guaranteed = &plan.guaranteed;
    selector.round_robin(Tier::Minimum, |sel, source, _| sel.contributions[source] < guaranteed[source]);

    let proportional_share = selector.proportional();

    let fill_to_target_invoked = selector.fill_to_target();

    debug!(
        chosen = selector.chosen.len(),
        relevance = selector.tiers.relevance,
        minimum = selector.tiers.minimum,
        proportional = selector.tiers.proportional,
        fill_to_target = selector.tiers.fill_to_target,
        "selection complete"
    );

    Selection {
        chosen: selector.chosen,
        tiers: selector.tiers,
        contributions: selector.contributions,
        proportional_share,
        relevance_tier_size,
        fill_to_target_invoked,
    }
}

struct Selector<'a> {
    pool: &'a CandidatePool,
    target: usize,
    taken: Vec<bool>,
    chosen: Vec<Pick>,
    contributions: Vec<usize>,
    tiers: TierCounts,
}

impl<'a> Selector<'a> {
    fn new(pool: &'a CandidatePool, target: usize) -> Self {
        Self {
            pool,
            target,
            taken: vec![false; pool.len()],
            chosen: Vec::with_capacity(target.min(pool.len())),
            contributions: vec![0; pool.source_count()],
            tiers: TierCounts::default(),
        }
    }

    fn is_full(&self) -> bool { self.chosen.len() >= self.target }

    fn take(&mut self, candidate: usize, tier: Tier) {
        self.taken[candidate] = true;
        for m in &self.pool.candidate(candidate).memberships {
            self.contributions[m.source] += 1;
        }
        self.tiers.bump(tier);
        self.chosen.push(Pick { candidate, tier });
    }

    /// Returns the size of the eligible tier, which may exceed what was taken.
    fn relevance(&mut self) -> usize {
        let tier = self.pool.relevance_tier();
        for &candidate in &tier {
            if self.is_full() { break; }
            self.take(candidate, Tier::Relevance);
        }
        tier.len()
    }

    /// One candidate per source per pass, in source order, while `wants`
    /// holds for the source and it has candidates left. `wants` sees the
    /// number of picks this pass loop already made for the source.
    fn round_robin<F>(&mut self, tier: Tier, wants: F)
    where
        F: Fn(&Self, usize, usize) -> bool,
    {
        let sources = self.pool.source_count();
        let mut cursors = vec![0usize; sources];
        let mut added = vec![0usize; sources];
        loop {
            let mut progressed = false;
            for source in 0..sources {
                if self.is_full() { return; }
                if !wants(self, source, added[source]) { continue; }
                if let Some(candidate) = self.next_untaken(source, &mut cursors[source]) {
                    self.take(candidate, tier);
                    added[source] += 1;
                    progressed = true;
                }
            }
            if !progressed { break; }
        }
    }

    /// Splits the open slots by list length, so overlap already consumed by
    /// the relevance tier never shrinks what the other sources may add.
    fn proportional(&mut self) -> Vec<usize> {
        let open = self.target.saturating_sub(self.chosen.len());
        let lens: Vec<usize> = (0..self.pool.source_count()).map(|s| self.pool.ranked(s).len()).collect();
        let shares = apportion(open, &lens);
        debug!(open, ?shares, "proportional split");
        self.round_robin(Tier::Proportional, |_, source, added| added < shares[source]);
        shares
    }

    fn next_untaken(&self, source: usize, cursor: &mut usize) -> Option<usize> {
        let ranked = self.pool.ranked(source);
        while *cursor < ranked.len() {
            let candidate = ranked[*cursor];
            *cursor += 1;
            if !self.taken[candidate] {
                return Some(candidate);
            }
        }
        None
    }

    /// Returns whether the tier was entered (short of target with candidates left).
    fn fill_to_target(&mut self) -> bool {
        if self.is_full() || self.chosen.len() == self.pool.len() {
            return false;
        }
        for candidate in 0..self.pool.len() {
            if self.is_full() { break; }
            if !self.taken[candidate] {
                self.take(candidate, Tier::FillToTarget);
            }
        }
        true
    }
}
