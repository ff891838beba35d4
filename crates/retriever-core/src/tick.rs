use crate::{rng, SplitMix64};

/// Per-frame timing handed to every tree node.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TickContext {
    pub tick: u64,
    pub dt_seconds: f32,
    /// Simulated time at the start of this tick.
    pub elapsed_seconds: f32,
    pub seed: u64,
}

impl TickContext {
    pub fn new(tick: u64, dt_seconds: f32, elapsed_seconds: f32, seed: u64) -> Self {
        Self {
            tick,
            dt_seconds,
            elapsed_seconds,
            seed,
        }
    }

    /// Context for the frame after this one, advancing the clock by `dt_seconds`.
    pub fn next(&self, dt_seconds: f32) -> Self {
        Self {
            tick: self.tick.wrapping_add(1),
            dt_seconds,
            elapsed_seconds: self.elapsed_seconds + self.dt_seconds.max(0.0),
            seed: self.seed,
        }
    }

    /// A stream-specific generator, stable for a given `(seed, tick, stream)`.
    pub fn rng(&self, stream: u64) -> SplitMix64 {
        SplitMix64::new(rng::derive_seed(self.seed, self.tick, stream))
    }
}

impl Default for TickContext {
    fn default() -> Self {
        Self::new(0, 1.0 / 60.0, 0.0, 0)
    }
}
