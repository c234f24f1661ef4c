//! Per-source slot allocation: minimum representation first, then a
//! proportional split of whatever budget is left.

use tracing::{debug, warn};

use curator_core::types::SourceList;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocationPlan {
    /// Indexed like the input sources.
    pub guaranteed: Vec<usize>,
    /// Planned split of the budget left after guarantees. The selector reruns
    /// the same split over the slots actually open after tier 2.
    pub proportional_share: Vec<usize>,
    /// True when `sum(min(M, len))` exceeded the target and guarantees were cut.
    pub guarantees_scaled_down: bool,
}

impl AllocationPlan {
    pub fn compute(sources: &[SourceList], target_size: usize, minimum_per_source: usize) -> Self {
        let lens: Vec<usize> = sources.iter().map(SourceList::len).collect();

        let mut guaranteed: Vec<usize> = lens.iter().map(|&len| len.min(minimum_per_source)).collect();
        let requested: usize = guaranteed.iter().sum();
        let guarantees_scaled_down = requested > target_size;
        if guarantees_scaled_down {
            warn!(requested, target_size, "minimum representation exceeds target, scaling guarantees down");
            guaranteed = apportion(target_size, &guaranteed);
        }

        let remaining = target_size - guaranteed.iter().sum::<usize>();
        let proportional_share = apportion(remaining, &lens);
        debug!(?guaranteed, ?proportional_share, remaining, "allocation plan");

        Self { guaranteed, proportional_share, guarantees_scaled_down }
    }

    pub fn total(&self) -> usize {
        self.guaranteed.iter().sum::<usize>() + self.proportional_share.iter().sum::<usize>()
    }
}

/// Largest-remainder apportionment of `seats` over `weights`.
///
/// Every weight first gets `floor(seats * w / sum(w))`; the leftover seats go
/// one each to the largest remainders, equal remainders resolved by index.
/// A zero total weight yields all zeros.
pub fn apportion(seats: usize, weights: &[usize]) -> Vec<usize> {
    let total: usize = weights.iter().sum();
    if total == 0 || seats == 0 {
        return vec![0; weights.len()];
    }
    let total = total as u128;

    let mut shares = Vec::with_capacity(weights.len());
    let mut remainders: Vec<(u128, usize)> = Vec::with_capacity(weights.len());
    for (idx, &weight) in weights.iter().enumerate() {
        let numerator = seats as u128 * weight as u128;
        shares.push((numerator / total) as usize);
        remainders.push((numerator % total, idx));
    }

    let leftover = seats - shares.iter().sum::<usize>();
    remainders.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
    for &(_, idx) in remainders.iter().take(leftover) {
        shares[idx] += 1;
    }
    shares
}
