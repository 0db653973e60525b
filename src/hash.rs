//! Seeded hash functions shared by every estimator.
//!
//! Each hash function is a pure function of `(seed, bytes)`; a [`HashFamily`] is
//! nothing more than the list of seeds.

use rand::Rng;
use xxhash_rust::xxh32::xxh32;
use xxhash_rust::xxh64::xxh64;

pub fn hash64(seed: u64, bytes: &[u8]) -> u64 {
    xxh64(bytes, seed)
}

pub fn hash32(seed: u64, bytes: &[u8]) -> u32 {
    xxh32(bytes, (seed ^ (seed >> 32)) as u32)
}

/// `k` independently seeded hash functions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HashFamily {
    seeds: Vec<u64>,
}

impl HashFamily {
    /// Draws `k` seeds from the thread-local random source.
    pub fn new(k: usize) -> Self {
        Self::with_rng(k, &mut rand::thread_rng())
    }

    pub fn with_rng<R: Rng + ?Sized>(k: usize, rng: &mut R) -> Self {
        Self {
            seeds: (0..k).map(|_| rng.gen()).collect(),
        }
    }

    pub fn from_seeds(seeds: Vec<u64>) -> Self {
        Self { seeds }
    }

    pub fn len(&self) -> usize {
        self.seeds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seeds.is_empty()
    }

    pub fn seeds(&self) -> &[u64] {
        &self.seeds
    }

    /// Output of the `i`-th function. Panics if `i >= len()`.
    pub fn digest(&self, i: usize, bytes: &[u8]) -> u64 {
        hash64(self.seeds[i], bytes)
    }

    pub fn digest32(&self, i: usize, bytes: &[u8]) -> u32 {
        hash32(self.seeds[i], bytes)
    }

    /// Bucket index of `bytes` under every function, in family order.
    pub fn indices<'a>(
        &'a self,
        bytes: &'a [u8],
        modulus: usize,
    ) -> impl Iterator<Item = usize> + 'a {
        debug_assert!(modulus > 0);
        self.seeds
            .iter()
            .map(move |&seed| (hash64(seed, bytes) % modulus as u64) as usize)
    }
}
