#![forbid(unsafe_code)]

//! Deterministic xorshift32 PRNG.
//!
//! Every source of randomness in glitch components (idle jitter, scramble
//! glyphs, particle spawns) draws from a seeded [`XorShift32`], so a given
//! seed and frame sequence always produce the same output.

/// Seed used when a caller passes zero (a fixed point of xorshift).
pub const FALLBACK_SEED: u32 = 0x9E37_79B9;

/// Deterministic xorshift32 generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XorShift32 {
    state: u32,
}

impl XorShift32 {
    /// Create a generator. A zero seed is replaced with [`FALLBACK_SEED`].
    #[must_use]
    pub const fn new(seed: u32) -> Self {
        Self {
            state: if seed == 0 { FALLBACK_SEED } else { seed },
        }
    }

    /// Next raw value. Never zero.
    #[inline]
    pub fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }

    /// Uniform value in `[0, 1)`.
    #[inline]
    pub fn next_f64(&mut self) -> f64 {
        f64::from(self.next_u32() - 1) / f64::from(u32::MAX)
    }

    /// Uniform value in `[0, 1)` as `f32`.
    #[inline]
    pub fn next_f32(&mut self) -> f32 {
        unit_f32(self.next_u32())
    }

    /// Uniform index in `0..len`. Returns 0 when `len` is 0.
    #[inline]
    pub fn next_index(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        (self.next_u32() as usize) % len
    }
}

/// Top 24 bits scaled by `2^-24`, exact in `f32` and always below 1.
#[inline]
fn unit_f32(bits: u32) -> f32 {
    (bits >> 8) as f32 * (1.0 / 16_777_216.0)
}

impl Default for XorShift32 {
    fn default() -> Self {
        Self::new(FALLBACK_SEED)
    }
}
