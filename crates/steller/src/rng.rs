//! Small seeded generator for tie-breaking. Layouts must be reproducible, so nothing in the
//! engine touches OS randomness.

use std::f64::consts::TAU;

#[derive(Debug, Clone)]
pub(crate) struct XorShift64Star {
    state: u64,
}

impl XorShift64Star {
    pub(crate) fn new(seed: u64) -> Self {
        Self { state: seed.max(1) }
    }

    /// One-way mix to decorrelate streams derived from the same seed.
    pub(crate) fn mix_u64(&mut self, v: u64) {
        self.state ^= v.wrapping_mul(0x9E3779B97F4A7C15_u64);
        if self.state == 0 {
            self.state = 1;
        }
        let _ = self.next_u64();
    }

    pub(crate) fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545F4914F6CDD1D_u64)
    }

    /// Uniform in `[0, 1)` with 53 bits of precision.
    pub(crate) fn next_f64_unit(&mut self) -> f64 {
        let u = self.next_u64() >> 11;
        (u as f64) / ((1u64 << 53) as f64)
    }
}

/// Unit vector used when two centers coincide. Depends only on the seed and the pair.
pub(crate) fn jitter_direction(seed: u64, a: usize, b: usize) -> (f64, f64) {
    let mut rng = XorShift64Star::new(seed);
    rng.mix_u64(a as u64);
    rng.mix_u64(((b as u64) << 32) | 0x5555);
    let angle = rng.next_f64_unit() * TAU;
    (angle.cos(), angle.sin())
}
