//! Seedable xorshift64 generator.
//! Deterministic so a seeded session replays the same obstacle pattern.

#[derive(Debug, Clone)]
pub struct Rng {
    state: u64,
}

impl Rng {
    /// Seeds are scrambled first, so 0 and neighbouring seeds are fine.
    pub fn new(seed: u64) -> Self {
        let mut z = seed.wrapping_add(0x9e37_79b9_7f4a_7c15);
        z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
        z ^= z >> 31;
        Self { state: z.max(1) }
    }

    fn step(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    /// Uniform integer in [0, upper). 0 for an empty range.
    pub fn next_int(&mut self, upper: u32) -> u32 {
        match upper {
            0 => 0,
            n => (self.step() % u64::from(n)) as u32,
        }
    }
}
