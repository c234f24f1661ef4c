use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

/// Final order scrambling so tier order (relevance first, early sources
/// first) does not leak into output positions.
pub struct Randomizer {
    rng: StdRng,
}

impl Default for Randomizer {
    fn default() -> Self {
        Self { rng: StdRng::from_entropy() }
    }
}

impl Randomizer {
    /// Deterministic: the same input order and seed always give the same output.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self { rng: StdRng::seed_from_u64(seed) }
    }

    pub fn from_seed(seed: Option<u64>) -> Self {
        seed.map_or_else(Self::default, Self::seeded)
    }

    /// Uniform Fisher-Yates permutation; membership is never changed.
    pub fn shuffle<T>(&mut self, mut items: Vec<T>) -> Vec<T> {
        items.shuffle(&mut self.rng);
        items
    }
}
