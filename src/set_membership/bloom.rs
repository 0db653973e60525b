use crate::error::{Error, Result};
use crate::hash::HashFamily;
use crate::set_membership::SetMembership;
use fixedbitset::FixedBitSet;
use rand::Rng;
use std::f64::consts::LN_2;
use std::fmt::{Debug, Formatter};
use tracing::{debug, trace};

/// Approximate set membership over a fixed array of `num_bits` bits.
///
/// Inserted items are always reported as present. Items never inserted are
/// reported as present with a probability that grows with the fill ratio of
/// the bit array and with the number of hash functions.
#[derive(Clone)]
pub struct BloomFilter {
    bits: FixedBitSet,
    hashes: HashFamily,
}

impl BloomFilter {
    pub fn new(num_bits: usize, num_hashes: usize) -> Result<Self> {
        Self::with_rng(num_bits, num_hashes, &mut rand::thread_rng())
    }

    pub fn with_rng<R: Rng + ?Sized>(
        num_bits: usize,
        num_hashes: usize,
        rng: &mut R,
    ) -> Result<Self> {
        if num_hashes == 0 {
            return Err(Error::invalid("num_hashes", "must be > 0"));
        }
        Self::with_hash_family(num_bits, HashFamily::with_rng(num_hashes, rng))
    }

    pub fn with_hash_family(num_bits: usize, hashes: HashFamily) -> Result<Self> {
        if num_bits == 0 {
            return Err(Error::invalid("num_bits", "must be > 0"));
        }
        if hashes.is_empty() {
            return Err(Error::invalid("num_hashes", "must be > 0"));
        }
        debug!(num_bits, num_hashes = hashes.len(), "created bloom filter");
        Ok(Self {
            bits: FixedBitSet::with_capacity(num_bits),
            hashes,
        })
    }

    /// Sizes the filter for `num_items` insertions at false positive rate `probability`.
    pub fn with_probability(num_items: usize, probability: f64) -> Result<Self> {
        if num_items == 0 {
            return Err(Error::invalid("num_items", "must be > 0"));
        }
        if !(0. < probability && probability < 1.) {
            return Err(Error::invalid(
                "probability",
                format!("{probability} is not in the range (0, 1)"),
            ));
        }
        let n = num_items as f64;
        let num_bits = (-n * probability.ln() / (LN_2 * LN_2)).ceil() as usize;
        let num_hashes = ((num_bits as f64 / n * LN_2).round() as usize).max(1);
        Self::new(num_bits, num_hashes)
    }

    pub fn num_bits(&self) -> usize {
        self.bits.len()
    }

    pub fn num_hashes(&self) -> usize {
        self.hashes.len()
    }

    pub fn count_ones(&self) -> usize {
        self.bits.count_ones(..)
    }

    pub fn is_empty(&self) -> bool {
        self.count_ones() == 0
    }

    /// Number of distinct insertions inferred from the fill ratio.
    pub fn estimated_len(&self) -> usize {
        let m = self.bits.len() as f64;
        let k = self.hashes.len() as f64;
        let ones = self.count_ones() as f64;
        if ones >= m {
            return usize::MAX;
        }
        (-m / k * (1. - ones / m).ln()).round() as usize
    }

    pub fn estimated_false_positive_rate(&self) -> f64 {
        let fill = self.count_ones() as f64 / self.bits.len() as f64;
        fill.powi(self.hashes.len() as i32)
    }

    pub fn insert<T: AsRef<[u8]> + ?Sized>(&mut self, item: &T) {
        let num_bits = self.bits.len();
        for index in self.hashes.indices(item.as_ref(), num_bits) {
            self.bits.insert(index);
        }
    }

    pub fn contains<T: AsRef<[u8]> + ?Sized>(&self, item: &T) -> bool {
        let num_bits = self.bits.len();
        self.hashes
            .indices(item.as_ref(), num_bits)
            .all(|index| self.bits.contains(index))
    }

    /// Unsets every bit; the size and hash functions are kept.
    pub fn clear(&mut self) {
        trace!(num_bits = self.bits.len(), "clearing bloom filter");
        self.bits.clear();
    }
}

impl<T: AsRef<[u8]> + ?Sized> SetMembership<T> for BloomFilter {
    fn contains(&self, item: &T) -> bool {
        BloomFilter::contains(self, item)
    }

    fn insert(&mut self, item: &T) {
        BloomFilter::insert(self, item)
    }
}

impl Debug for BloomFilter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "BloomFilter {{ num_bits: {}, num_hashes: {} }}",
            self.bits.len(),
            self.hashes.len()
        )
    }
}
