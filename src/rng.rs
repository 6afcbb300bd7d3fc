//! Seeded random number generation
//!
//! Runs are pinned to the exact bit stream of NumPy's `default_rng(seed)`:
//! the seed is expanded by a SeedSequence-style entropy pool into the 128-bit
//! state and stream of a PCG64 (XSL-RR 128/64) generator, and uniform doubles
//! take the top 53 bits of each 64-bit output. Published pass fractions such
//! as `f_bg = 0.0064` depend on this.

use rand::Rng;
use rand_pcg::Pcg64;

/// Number of 32-bit words in the entropy pool
const POOL_SIZE: usize = 4;

const INIT_A: u32 = 0x43b0_d7e5;
const MULT_A: u32 = 0x931e_8875;
const INIT_B: u32 = 0x8b51_f9dd;
const MULT_B: u32 = 0x58f3_8ded;
const MIX_MULT_L: u32 = 0xca01_f9dd;
const MIX_MULT_R: u32 = 0x4973_f715;
const XSHIFT: u32 = 16;

/// Entropy pool that turns a small integer seed into well-mixed state words
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedSequence {
    pool: [u32; POOL_SIZE],
}

/// Running multiplier shared by successive `hashmix` calls
struct HashConst(u32);

impl HashConst {
    fn hashmix(&mut self, value: u32) -> u32 {
        let mut value = value ^ self.0;
        self.0 = self.0.wrapping_mul(MULT_A);
        value = value.wrapping_mul(self.0);
        value ^ (value >> XSHIFT)
    }
}

fn mix(x: u32, y: u32) -> u32 {
    let result = MIX_MULT_L
        .wrapping_mul(x)
        .wrapping_sub(MIX_MULT_R.wrapping_mul(y));
    result ^ (result >> XSHIFT)
}

/// Split a seed into little-endian 32-bit words (zero still yields one word)
fn seed_words(seed: u64) -> Vec<u32> {
    if seed == 0 {
        return vec![0];
    }
    let mut words = Vec::with_capacity(2);
    let mut n = seed;
    while n > 0 {
        words.push(n as u32);
        n >>= 32;
    }
    words
}

impl SeedSequence {
    /// Mix `seed` into a fresh entropy pool
    pub fn new(seed: u64) -> Self {
        let entropy = seed_words(seed);
        let mut pool = [0u32; POOL_SIZE];
        let mut hash = HashConst(INIT_A);

        for (i, slot) in pool.iter_mut().enumerate() {
            *slot = hash.hashmix(entropy.get(i).copied().unwrap_or(0));
        }
        for src in 0..POOL_SIZE {
            for dst in 0..POOL_SIZE {
                if src != dst {
                    let mixed = hash.hashmix(pool[src]);
                    pool[dst] = mix(pool[dst], mixed);
                }
            }
        }
        for &word in entropy.iter().skip(POOL_SIZE) {
            for dst in 0..POOL_SIZE {
                let mixed = hash.hashmix(word);
                pool[dst] = mix(pool[dst], mixed);
            }
        }

        Self { pool }
    }

    /// Produce `n_words` 32-bit state words by cycling over the pool
    pub fn generate_u32(&self, n_words: usize) -> Vec<u32> {
        let mut hash_const = INIT_B;
        self.pool
            .iter()
            .cycle()
            .take(n_words)
            .map(|&word| {
                let mut value = word ^ hash_const;
                hash_const = hash_const.wrapping_mul(MULT_B);
                value = value.wrapping_mul(hash_const);
                value ^ (value >> XSHIFT)
            })
            .collect()
    }

    /// Produce `n_words` 64-bit state words (pairs of 32-bit words, low first)
    pub fn generate_u64(&self, n_words: usize) -> Vec<u64> {
        self.generate_u32(n_words * 2)
            .chunks_exact(2)
            .map(|pair| u64::from(pair[0]) | (u64::from(pair[1]) << 32))
            .collect()
    }
}

/// Create the PCG64 generator used by every simulation run
pub fn seeded_rng(seed: u64) -> Pcg64 {
    let words = SeedSequence::new(seed).generate_u64(4);
    let state = (u128::from(words[0]) << 64) | u128::from(words[1]);
    let stream = (u128::from(words[2]) << 64) | u128::from(words[3]);
    Pcg64::new(state, stream)
}

/// Uniform draw on `[low, high)`, computed as `low + (high - low) * u`
pub fn uniform<R: Rng + ?Sized>(rng: &mut R, low: f64, high: f64) -> f64 {
    let u: f64 = rng.gen();
    low + (high - low) * u
}

/// Draw `n` uniform samples on `[low, high)`
pub fn uniform_vec<R: Rng + ?Sized>(rng: &mut R, low: f64, high: f64, n: usize) -> Vec<f64> {
    (0..n).map(|_| uniform(rng, low, high)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_draw_matches_numpy_seed_42() {
        let mut rng = seeded_rng(42);
        let u: f64 = rng.gen();
        assert_eq!(u, 0.773_956_048_555_963_3);
    }

    #[test]
    fn test_first_draw_matches_numpy_seed_0() {
        let mut rng = seeded_rng(0);
        let u: f64 = rng.gen();
        assert_eq!(u, 0.636_961_687_321_454_3);
    }

    #[test]
    fn test_seed_words_split() {
        assert_eq!(seed_words(0), vec![0]);
        assert_eq!(seed_words(99), vec![99]);
        assert_eq!(seed_words(1 << 32), vec![0, 1]);
    }

    #[test]
    fn test_generate_u64_pairs_low_word_first() {
        let seq = SeedSequence::new(7);
        let words32 = seq.generate_u32(4);
        let words64 = seq.generate_u64(2);
        assert_eq!(words64[0] as u32, words32[0]);
        assert_eq!((words64[0] >> 32) as u32, words32[1]);
        assert_eq!(words64[1] as u32, words32[2]);
    }

    #[test]
    fn test_same_seed_same_stream() {
        let a = uniform_vec(&mut seeded_rng(5), -1.0, 1.0, 64);
        let b = uniform_vec(&mut seeded_rng(5), -1.0, 1.0, 64);
        assert_eq!(a, b);
    }

    #[test]
    fn test_different_seeds_diverge() {
        let a = uniform_vec(&mut seeded_rng(1), 0.0, 1.0, 8);
        let b = uniform_vec(&mut seeded_rng(2), 0.0, 1.0, 8);
        assert_ne!(a, b);
    }

    #[test]
    fn test_uniform_stays_in_range() {
        let mut rng = seeded_rng(3);
        for x in uniform_vec(&mut rng, -100.0, 100.0, 10_000) {
            assert!((-100.0..100.0).contains(&x));
        }
    }
}
