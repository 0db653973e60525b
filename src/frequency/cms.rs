use crate::error::{Error, Result};
use crate::frequency::{Counter, Frequency};
use crate::hash::HashFamily;
use rand::Rng;
use std::f64::consts::E;
use std::fmt::{Debug, Formatter};
use tracing::{debug, trace};

/// Approximate item frequencies in `depth` rows of `width` counters.
///
/// Row `i` is addressed by the `i`-th hash function. Collisions can only
/// inflate a counter, so the minimum over the rows never undercounts.
#[derive(Clone)]
pub struct CountMinSketch<C = u64> {
    counters: Vec<C>,
    width: usize,
    hashes: HashFamily,
}

impl CountMinSketch {
    pub fn new(width: usize, depth: usize) -> Result<Self> {
        Self::with_rng(width, depth, &mut rand::thread_rng())
    }

    /// Overcounts by at most `epsilon` times the total count, with probability `1 - delta`.
    pub fn with_error_bounds(epsilon: f64, delta: f64) -> Result<Self> {
        if !(0. < epsilon && epsilon <= 1.) {
            return Err(Error::invalid(
                "epsilon",
                format!("{epsilon} is not in the range (0, 1]"),
            ));
        }
        if !(0. < delta && delta < 1.) {
            return Err(Error::invalid(
                "delta",
                format!("{delta} is not in the range (0, 1)"),
            ));
        }
        let width = (E / epsilon).ceil() as usize;
        let depth = ((1. / delta).ln().ceil() as usize).max(1);
        Self::new(width, depth)
    }
}

impl<C: Counter> CountMinSketch<C> {
    pub fn with_rng<R: Rng + ?Sized>(width: usize, depth: usize, rng: &mut R) -> Result<Self> {
        if depth == 0 {
            return Err(Error::invalid("depth", "must be > 0"));
        }
        Self::with_hash_family(width, HashFamily::with_rng(depth, rng))
    }

    pub fn with_hash_family(width: usize, hashes: HashFamily) -> Result<Self> {
        if width == 0 {
            return Err(Error::invalid("width", "must be > 0"));
        }
        if hashes.is_empty() {
            return Err(Error::invalid("depth", "must be > 0"));
        }
        let size = width
            .checked_mul(hashes.len())
            .filter(|size| {
                size.checked_mul(size_of::<C>())
                    .is_some_and(|bytes| bytes <= isize::MAX as usize)
            })
            .ok_or_else(|| Error::invalid("width", "width * depth counters do not fit in memory"))?;
        debug!(width, depth = hashes.len(), "created count-min sketch");
        Ok(Self {
            counters: vec![C::zero(); size],
            width,
            hashes,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn depth(&self) -> usize {
        self.hashes.len()
    }

    pub fn insert<T: AsRef<[u8]> + ?Sized>(&mut self, item: &T) {
        self.increment(item, C::one());
    }

    pub fn increment<T: AsRef<[u8]> + ?Sized>(&mut self, item: &T, count: C) {
        for (row, hash) in self.hashes.indices(item.as_ref(), self.width).enumerate() {
            let idx = self.width * row + hash;
            self.counters[idx] = self.counters[idx].saturating_add(&count);
        }
    }

    pub fn count<T: AsRef<[u8]> + ?Sized>(&self, item: &T) -> C {
        let mut min = C::max_value();
        for (row, hash) in self.hashes.indices(item.as_ref(), self.width).enumerate() {
            let value = self.counters[self.width * row + hash];
            if value.is_zero() {
                // Nothing was ever routed here, no row can go lower.
                return value;
            }
            min = min.min(value);
        }
        min
    }

    pub fn clear(&mut self) {
        trace!(width = self.width, depth = self.depth(), "clearing count-min sketch");
        self.counters.fill(C::zero());
    }
}

impl<T: AsRef<[u8]> + ?Sized, C: Counter> Frequency<T> for CountMinSketch<C> {
    type Count = C;

    fn count(&self, item: &T) -> C {
        CountMinSketch::count(self, item)
    }

    fn insert(&mut self, item: &T) {
        CountMinSketch::insert(self, item)
    }
}

impl<C> Debug for CountMinSketch<C> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "CountMinSketch {{ width: {}, depth: {} }}",
            self.width,
            self.hashes.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashMap;

    const PASSAGE: &str = "as he crossed toward the pharmacy at the corner he involuntarily \
        turned his head because of a burst of light that had ricocheted from his temple and \
        saw with that quick smile with which we greet a rainbow or a rose a blindingly white \
        parallelogram of sky being unloaded from the van a dresser with mirrors across which \
        as across a cinema screen, passed a flawlessly clear reflection of boughs sliding and \
        swaying not arboreally but with a human vacillation produced by the nature of those \
        who were carrying this sky these boughs this gliding facade";

    fn fixed_hashes(depth: usize) -> HashFamily {
        HashFamily::with_rng(depth, &mut StdRng::seed_from_u64(0xc0ffee))
    }

    #[test]
    fn test_invalid_parameters() {
        assert!(matches!(
            CountMinSketch::new(0, 3),
            Err(Error::InvalidParameter { name: "width", .. })
        ));
        assert!(matches!(
            CountMinSketch::new(16, 0),
            Err(Error::InvalidParameter { name: "depth", .. })
        ));
        assert!(CountMinSketch::with_error_bounds(0., 0.01).is_err());
        assert!(CountMinSketch::with_error_bounds(0.01, 1.).is_err());
        assert!(matches!(
            CountMinSketch::with_error_bounds(1e-300, 0.5),
            Err(Error::InvalidParameter { name: "width", .. })
        ));
        assert!(CountMinSketch::<u32>::with_hash_family(usize::MAX / 2, fixed_hashes(1)).is_err());
    }

    #[test]
    fn test_with_error_bounds() {
        let cms = CountMinSketch::with_error_bounds(0.01, 0.001).unwrap();

        assert_eq!(cms.width(), 272);
        assert_eq!(cms.depth(), 7);
    }

    #[test]
    fn test_passage_word_counts() {
        let mut cms: CountMinSketch =
            CountMinSketch::with_hash_family(1024, fixed_hashes(3)).unwrap();
        for word in PASSAGE.split(' ') {
            cms.insert(word);
        }

        for (word, expected) in [("a", 8), ("of", 5), ("with", 4), ("the", 4), ("which", 2)] {
            assert_eq!(cms.count(word), expected, "count of {word:?}");
        }
    }

    #[test]
    fn test_count_unseen_is_zero() {
        let cms = CountMinSketch::new(64, 4).unwrap();

        assert_eq!(cms.count("anything"), 0);
    }

    #[test]
    fn test_repeated_inserts_scale_linearly() {
        let mut cms = CountMinSketch::new(1024, 3).unwrap();

        for n in 1..=10 {
            cms.insert("apple");
            assert_eq!(cms.count("apple"), n);
        }
        cms.increment("apple", 5);
        assert_eq!(cms.count("apple"), 15);
    }

    #[test]
    fn test_never_undercounts() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut cms: CountMinSketch = CountMinSketch::with_rng(16, 2, &mut rng).unwrap();
        let mut exact = HashMap::new();

        for _ in 0..2000 {
            let key = rng.gen_range(0u32..200).to_be_bytes();
            cms.insert(&key);
            *exact.entry(key).or_insert(0u64) += 1;
        }

        for (key, count) in exact {
            assert!(cms.count(&key) >= count);
        }
    }

    #[test]
    fn test_counters_saturate() {
        let mut cms = CountMinSketch::<u8>::with_hash_family(4, fixed_hashes(2)).unwrap();

        cms.increment("apple", 200);
        cms.increment("apple", 200);

        assert_eq!(cms.count("apple"), u8::MAX);
    }

    #[test]
    fn test_clear() {
        let mut cms = CountMinSketch::new(128, 3).unwrap();
        for word in PASSAGE.split(' ') {
            cms.insert(word);
        }

        cms.clear();

        assert_eq!((cms.width(), cms.depth()), (128, 3));
        for word in PASSAGE.split(' ') {
            assert_eq!(cms.count(word), 0);
        }
    }

    #[test]
    fn test_trait_object() {
        let mut cms = CountMinSketch::new(64, 2).unwrap();
        let freq: &mut dyn Frequency<[u8], Count = u64> = &mut cms;

        freq.insert(b"apple".as_slice());
        freq.insert(b"apple".as_slice());
        assert_eq!(freq.count(b"apple".as_slice()), 2);
    }

    #[test]
    fn test_debug() {
        let cms = CountMinSketch::new(100, 3).unwrap();
        assert_eq!(format!("{cms:?}"), "CountMinSketch { width: 100, depth: 3 }");
    }
}
