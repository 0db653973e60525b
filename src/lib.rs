//! Approximate streaming estimators for membership, frequency and cardinality.
//!
//! Every structure is sized once at construction, hashes items as byte strings
//! with independently seeded hash functions and never grows afterwards.
//!
//! ```
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//! use streamsketch::{BloomFilter, CountMinSketch, HyperLogLog};
//!
//! let mut rng = StdRng::seed_from_u64(42);
//! let mut seen = BloomFilter::with_rng(8 * 1024, 5, &mut rng)?;
//! let mut freq: CountMinSketch = CountMinSketch::with_rng(1024, 3, &mut rng)?;
//! let mut distinct = HyperLogLog::with_rng(11, &mut rng)?;
//!
//! for word in "the quick brown fox jumps over the lazy dog".split(' ') {
//!     seen.insert(word);
//!     freq.insert(word);
//!     distinct.insert(word);
//! }
//!
//! assert!(seen.contains("fox"));
//! assert!(freq.count("the") >= 2);
//! assert!((7..=9).contains(&distinct.count()));
//! # Ok::<(), streamsketch::Error>(())
//! ```
//!
//! None of the structures synchronize internally. Share them across threads
//! behind a lock, or keep one instance per writer.

pub mod cardinality;
pub mod error;
pub mod frequency;
pub mod hash;
pub mod set_membership;

pub use cardinality::hll::HyperLogLog;
pub use cardinality::Cardinality;
pub use error::{Error, Result};
pub use frequency::cms::CountMinSketch;
pub use frequency::{Counter, Frequency};
pub use hash::HashFamily;
pub use set_membership::bloom::BloomFilter;
pub use set_membership::SetMembership;
