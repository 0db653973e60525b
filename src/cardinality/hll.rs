use crate::cardinality::registers::Registers;
use crate::cardinality::Cardinality;
use crate::error::{Error, Result};
use crate::hash::HashFamily;
use rand::Rng;
use std::fmt::{Debug, Formatter};
use tracing::{debug, trace};

const MIN_PRECISION: usize = 4;
// Leaves at least two rank bits and caps the registers at 640 MiB.
const MAX_PRECISION: usize = 30;
const HASH_BITS: u32 = u32::BITS;
const TWO_POW_32: f64 = (1u64 << 32) as f64;

/// Distinct-count estimator over `2^precision` registers and a 32-bit hash.
///
/// The top `precision` bits of an item's hash pick a register, the rest of the
/// hash gives a rank (position of its left-most set bit) and the register keeps
/// the largest rank seen. The relative standard error is about
/// `1.04 / sqrt(2^precision)`.
#[derive(Clone)]
pub struct HyperLogLog {
    registers: Registers,
    precision: usize,
    alpha: f64,
    hashes: HashFamily,
}

impl HyperLogLog {
    pub fn new(precision: usize) -> Result<Self> {
        Self::with_rng(precision, &mut rand::thread_rng())
    }

    pub fn with_rng<R: Rng + ?Sized>(precision: usize, rng: &mut R) -> Result<Self> {
        Self::with_hash_family(precision, HashFamily::with_rng(1, rng))
    }

    /// Only the first function of `hashes` is used.
    pub fn with_hash_family(precision: usize, hashes: HashFamily) -> Result<Self> {
        if !(MIN_PRECISION..=MAX_PRECISION).contains(&precision) {
            return Err(Error::invalid(
                "precision",
                format!("{precision} is not in the range [{MIN_PRECISION}, {MAX_PRECISION}]"),
            ));
        }
        if hashes.is_empty() {
            return Err(Error::invalid("hashes", "needs at least one hash function"));
        }
        let num_registers = 1 << precision;
        debug!(precision, num_registers, "created hyperloglog");
        Ok(Self {
            registers: Registers::new(num_registers),
            precision,
            alpha: alpha(num_registers),
            hashes,
        })
    }

    /// Smallest precision whose relative standard error is at most `epsilon`.
    pub fn with_error(epsilon: f64) -> Result<Self> {
        if !(0. < epsilon && epsilon < 1.) {
            return Err(Error::invalid(
                "epsilon",
                format!("{epsilon} is not in the range (0, 1)"),
            ));
        }
        let m = (1.04 / epsilon).powi(2);
        let precision = (m.log2().ceil() as usize).max(MIN_PRECISION);
        Self::new(precision)
    }

    pub fn precision(&self) -> usize {
        self.precision
    }

    pub fn num_registers(&self) -> usize {
        self.registers.len()
    }

    pub fn relative_error(&self) -> f64 {
        1.04 / (self.registers.len() as f64).sqrt()
    }

    pub fn insert<T: AsRef<[u8]> + ?Sized>(&mut self, item: &T) {
        let hash = self.hashes.digest32(0, item.as_ref());
        let (index, rank) = register_and_rank(hash, self.precision);
        self.registers.update_max(index, rank);
    }

    pub fn count(&self) -> u64 {
        let (zeros, sum) = self
            .registers
            .iter()
            .fold((0usize, 0f64), |(zeros, sum), register| {
                (
                    zeros + usize::from(register == 0),
                    sum + (-f64::from(register)).exp2(),
                )
            });
        let m = self.registers.len() as f64;
        let estimate = self.alpha * m * m / sum;

        let corrected = if estimate <= 2.5 * m && zeros > 0 {
            m * (m / zeros as f64).ln()
        } else if estimate >= TWO_POW_32 {
            debug!(estimate, "estimate saturated the 32-bit hash space");
            TWO_POW_32
        } else if estimate > TWO_POW_32 / 30. {
            -TWO_POW_32 * (1. - estimate / TWO_POW_32).ln()
        } else {
            estimate
        };
        corrected.round() as u64
    }

    /// Resets every register to zero.
    pub fn clear(&mut self) {
        trace!(precision = self.precision, "clearing hyperloglog");
        self.registers.clear();
    }
}

impl<T: AsRef<[u8]> + ?Sized> Cardinality<T> for HyperLogLog {
    fn count(&self) -> u64 {
        HyperLogLog::count(self)
    }

    fn insert(&mut self, item: &T) {
        HyperLogLog::insert(self, item)
    }
}

impl Debug for HyperLogLog {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "HyperLogLog {{ precision: {} }}", self.precision)
    }
}

fn alpha(num_registers: usize) -> f64 {
    match num_registers {
        16 => 0.673,
        32 => 0.697,
        64 => 0.709,
        m => 0.7213 / (1. + 1.079 / m as f64),
    }
}

/// Splits a hash into its register index (top `precision` bits) and the
/// 1-based position of the left-most set bit among the remaining bits.
/// A remainder of all zeros ranks one past its width.
fn register_and_rank(hash: u32, precision: usize) -> (usize, u8) {
    let precision = precision as u32;
    let index = (hash >> (HASH_BITS - precision)) as usize;
    let rank = ((hash << precision).leading_zeros() + 1).min(HASH_BITS - precision + 1);
    (index, rank as u8)
}
