//! Deterministic RNG helpers.
//!
//! Small and dependency-free; **not** cryptographic. Used to script throws in headless runs so
//! two runs with the same seed produce the same arena.

pub trait DeterministicRng {
    fn next_u64(&mut self) -> u64;

    fn next_u32(&mut self) -> u32 {
        (self.next_u64() >> 32) as u32
    }

    /// Uniform in `[0, 1)` using 24 bits of mantissa.
    fn next_f32_unit(&mut self) -> f32 {
        let x = self.next_u32() >> 8;
        (x as f32) / ((1u32 << 24) as f32)
    }

    /// Uniform in `[min, max)`. Returns `min` when the range is empty.
    fn next_f32_range(&mut self, min: f32, max: f32) -> f32 {
        if max <= min {
            return min;
        }
        min + (max - min) * self.next_f32_unit()
    }

    /// Uniform index in `0..len`. `len` must be non-zero.
    fn next_index(&mut self, len: usize) -> usize {
        debug_assert!(len > 0);
        (self.next_u64() % (len.max(1) as u64)) as usize
    }
}

/// SplitMix64: a tiny generator that is also a good seeder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitMix64 {
    state: u64,
}

impl SplitMix64 {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }
}

impl DeterministicRng for SplitMix64 {
    fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        mix64(self.state)
    }
}

pub fn mix64(mut x: u64) -> u64 {
    x = (x ^ (x >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    x = (x ^ (x >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    x ^ (x >> 31)
}

pub fn derive_seed(global_seed: u64, tick: u64, stream: u64) -> u64 {
    mix64(global_seed ^ mix64(tick.wrapping_add(0x9E37_79B9_7F4A_7C15)) ^ mix64(stream))
}
