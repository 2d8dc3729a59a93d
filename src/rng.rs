use rand::seq::SliceRandom;
use rand::{RngCore, SeedableRng};

use crate::constants::rng::{SPLITMIX_GAMMA, SPLITMIX_MIX_1, SPLITMIX_MIX_2};
use crate::types::Seed;

/// Small deterministic RNG whose output is stable across `rand` releases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitMix64 {
    state: u64,
}

impl SplitMix64 {
    /// Create a generator whose internal state starts at `seed`.
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    /// Raw internal state, usable with `from_state` to resume the stream.
    pub fn state(&self) -> u64 {
        self.state
    }

    /// Rebuild a generator from a previously observed `state()`.
    pub fn from_state(state: u64) -> Self {
        Self { state }
    }

    /// State reached from `start` after `steps` outputs, without drawing them.
    pub fn state_after(start: u64, steps: u64) -> u64 {
        start.wrapping_add(steps.wrapping_mul(SPLITMIX_GAMMA))
    }

    fn next_u64_internal(&mut self) -> u64 {
        let mut z = self.state.wrapping_add(SPLITMIX_GAMMA);
        self.state = z;
        z = (z ^ (z >> 30)).wrapping_mul(SPLITMIX_MIX_1);
        z = (z ^ (z >> 27)).wrapping_mul(SPLITMIX_MIX_2);
        z ^ (z >> 31)
    }
}

impl RngCore for SplitMix64 {
    fn next_u32(&mut self) -> u32 {
        self.next_u64_internal() as u32
    }

    fn next_u64(&mut self) -> u64 {
        self.next_u64_internal()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        let mut offset = 0;
        while offset < dest.len() {
            let bytes = self.next_u64_internal().to_le_bytes();
            let copy_len = (dest.len() - offset).min(bytes.len());
            dest[offset..offset + copy_len].copy_from_slice(&bytes[..copy_len]);
            offset += copy_len;
        }
    }
}

impl SeedableRng for SplitMix64 {
    type Seed = [u8; 8];

    fn from_seed(seed: Self::Seed) -> Self {
        Self::new(u64::from_le_bytes(seed))
    }

    fn seed_from_u64(state: u64) -> Self {
        Self::new(state)
    }
}

/// The single random stream owned by a split generator.
///
/// A counting `RngCore` adapter around `SplitMix64`: every 64-bit output
/// pulled from the underlying generator is one draw. `rand` algorithms
/// (`SliceRandom::shuffle`, `Rng::random_range`) run directly on it, and the
/// counter records what they consumed. Since `SplitMix64` advances its state
/// by a fixed increment per output, `(seed, draws_consumed)` and `state()`
/// always agree (see `SplitMix64::state_after`).
#[derive(Debug, Clone)]
pub struct RandomSequenceSource {
    seed: Seed,
    rng: SplitMix64,
    draws: u64,
}

impl RandomSequenceSource {
    /// Start a fresh stream for `seed`.
    pub fn new(seed: Seed) -> Self {
        Self {
            seed,
            rng: SplitMix64::seed_from_u64(seed as u64),
            draws: 0,
        }
    }

    /// Rebuild a stream from a recorded `state()` and draw count.
    ///
    /// Returns `None` when `state` is not the position `draws` outputs into
    /// the stream for `seed`.
    pub fn restore(seed: Seed, state: u64, draws: u64) -> Option<Self> {
        if SplitMix64::state_after(seed as u64, draws) != state {
            return None;
        }
        Some(Self {
            seed,
            rng: SplitMix64::from_state(state),
            draws,
        })
    }

    /// Seed this stream was created with.
    pub fn seed(&self) -> Seed {
        self.seed
    }

    /// Number of draws consumed since construction.
    pub fn draws_consumed(&self) -> u64 {
        self.draws
    }

    /// Raw state of the underlying generator.
    pub fn state(&self) -> u64 {
        self.rng.state()
    }

    /// Shuffle `items` in place with `SliceRandom::shuffle`. Returns the draws consumed.
    pub fn shuffle<T>(&mut self, items: &mut [T]) -> u64 {
        let before = self.draws;
        items.shuffle(self);
        self.draws - before
    }
}

impl RngCore for RandomSequenceSource {
    fn next_u32(&mut self) -> u32 {
        self.draws += 1;
        self.rng.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.draws += 1;
        self.rng.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.draws += dest.len().div_ceil(8) as u64;
        self.rng.fill_bytes(dest);
    }
}
