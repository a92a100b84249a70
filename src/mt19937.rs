//! 32-bit Mersenne Twister (MT19937) with array seeding.
//!
//! The generator follows the reference `mt19937ar.c` construction, including
//! `init_by_array`, so that a given key reproduces the same stream as any
//! other conforming implementation. On top of the raw 32-bit output it offers
//! `getrandbits`-style draws of arbitrary width and an unbiased `below(n)`
//! based on rejection sampling, which together drive the square shuffle.

const N: usize = 624;
const M: usize = 397;
const MATRIX_A: u32 = 0x9908_B0DF;
const UPPER_MASK: u32 = 0x8000_0000;
const LOWER_MASK: u32 = 0x7FFF_FFFF;

/// Seed used by `init_by_array` before mixing in the key.
const ARRAY_SEED: u32 = 19_650_218;

pub struct Mt19937 {
    mt: [u32; N],
    mti: usize,
}

impl Mt19937 {
    /// Creates a generator seeded from a single 32-bit value.
    pub fn new(seed: u32) -> Self {
        let mut mt = [0u32; N];
        mt[0] = seed;
        for i in 1..N {
            let prev = mt[i - 1];
            mt[i] = 1_812_433_253u32
                .wrapping_mul(prev ^ (prev >> 30))
                .wrapping_add(i as u32);
        }
        Self { mt, mti: N }
    }

    /// Creates a generator seeded from an array of 32-bit words.
    ///
    /// An empty key behaves like the single word `[0]`.
    pub fn from_key(key: &[u32]) -> Self {
        let key: &[u32] = if key.is_empty() { &[0] } else { key };
        let mut rng = Self::new(ARRAY_SEED);
        let mt = &mut rng.mt;

        let mut i = 1usize;
        let mut j = 0usize;
        for _ in 0..N.max(key.len()) {
            let prev = mt[i - 1];
            mt[i] = (mt[i] ^ (prev ^ (prev >> 30)).wrapping_mul(1_664_525))
                .wrapping_add(key[j])
                .wrapping_add(j as u32);
            i += 1;
            j += 1;
            if i >= N {
                mt[0] = mt[N - 1];
                i = 1;
            }
            if j >= key.len() {
                j = 0;
            }
        }
        for _ in 0..N - 1 {
            let prev = mt[i - 1];
            mt[i] = (mt[i] ^ (prev ^ (prev >> 30)).wrapping_mul(1_566_083_941))
                .wrapping_sub(i as u32);
            i += 1;
            if i >= N {
                mt[0] = mt[N - 1];
                i = 1;
            }
        }
        // MSB is 1, assuring a non-zero initial state.
        mt[0] = UPPER_MASK;
        rng
    }

    fn twist(&mut self) {
        let mag01 = [0u32, MATRIX_A];
        for k in 0..N {
            let y = (self.mt[k] & UPPER_MASK) | (self.mt[(k + 1) % N] & LOWER_MASK);
            self.mt[k] = self.mt[(k + M) % N] ^ (y >> 1) ^ mag01[(y & 1) as usize];
        }
        self.mti = 0;
    }

    /// Generates the next 32-bit pseudorandom value.
    pub fn next_u32(&mut self) -> u32 {
        if self.mti >= N {
            self.twist();
        }
        let mut y = self.mt[self.mti];
        self.mti += 1;

        // Tempering
        y ^= y >> 11;
        y ^= (y << 7) & 0x9D2C_5680;
        y ^= (y << 15) & 0xEFC6_0000;
        y ^= y >> 18;
        y
    }

    /// Draws a `k`-bit value, `k <= 64`.
    ///
    /// Widths above 32 are assembled from consecutive words, least
    /// significant word first, with the final word shifted down to the
    /// remaining width.
    pub fn getrandbits(&mut self, k: u32) -> u64 {
        debug_assert!(k <= 64, "getrandbits supports at most 64 bits");
        let mut remaining = k;
        let mut shift = 0u32;
        let mut out = 0u64;
        while remaining > 0 {
            let mut word = self.next_u32();
            if remaining < 32 {
                word >>= 32 - remaining;
            }
            out |= u64::from(word) << shift;
            shift += 32;
            remaining = remaining.saturating_sub(32);
        }
        out
    }

    /// Draws a uniform value in `[0, n)`. Returns 0 when `n` is 0.
    pub fn below(&mut self, n: u64) -> u64 {
        if n == 0 {
            return 0;
        }
        let k = u64::BITS - n.leading_zeros();
        loop {
            let r = self.getrandbits(k);
            if r < n {
                return r;
            }
        }
    }
}
