//! Deterministic random number generation for card flow.
//!
//! The whole card economy (stock shuffle, randomizer replacements) must be
//! reproducible from the game seed so a finished game can be replayed from
//! its inputs alone.

/// PCG random number generator (Permuted Congruential Generator).
///
/// PCG-XSH-RR: 64-bit LCG state, 32-bit permuted output. Small, fast and
/// statistically solid, which is all the card shuffle needs.
#[derive(Debug, Clone, Copy)]
pub struct PcgRng {
    state: u64,
}

impl PcgRng {
    const MULTIPLIER: u64 = 6364136223846793005;
    const INCREMENT: u64 = 1442695040888963407;

    pub fn new(seed: u64) -> Self {
        // run the mixed seed through one step so nearby seeds diverge
        let mut rng = Self {
            state: mix_seed(seed),
        };
        rng.step();
        rng
    }

    #[inline]
    fn step(&mut self) {
        self.state = self
            .state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT);
    }

    /// XSH-RR output permutation over the current state.
    #[inline]
    fn output(state: u64) -> u32 {
        let xorshifted = (((state >> 18) ^ state) >> 27) as u32;
        let rot = (state >> 59) as u32;
        xorshifted.rotate_right(rot)
    }

    pub fn next_u32(&mut self) -> u32 {
        self.step();
        Self::output(self.state)
    }

    /// Uniform value in `[0, bound)`; `bound` must be non-zero.
    pub fn below(&mut self, bound: u32) -> u32 {
        self.next_u32() % bound
    }

    /// Uniform value in `[min, max]` inclusive.
    pub fn range_inclusive(&mut self, min: u32, max: u32) -> u32 {
        if min >= max {
            return min;
        }
        min + self.below(max - min + 1)
    }
}

/// Avalanche the raw seed so that counter-like seeds (1, 2, 3, ...) do not
/// produce correlated streams. Constants from SplitMix64.
fn mix_seed(seed: u64) -> u64 {
    let mut hash = seed;
    hash ^= hash >> 33;
    hash = hash.wrapping_mul(0xff51afd7ed558ccd);
    hash ^= hash >> 33;
    hash = hash.wrapping_mul(0xc4ceb9fe1a85ec53);
    hash ^= hash >> 33;
    hash
}
