//! Bloom filter over text items.
//!
//! The filter is sized from an expected number of items `n` and a target
//! false positive rate `p`:
//!
//! - `m = ceil(-n * ln(p) / ln(2)^2)` bits
//! - `k = max(1, round(m / n * ln(2)))` hash functions
//!
//! Each item is hashed once with SHA-256 and once with MD5, and the `k` bit
//! indices are derived from the two digests by double hashing (see
//! [`Indices`]). With the default digests the indices are reproducible
//! across processes and platforms.
//!
//! ```
//! use bloomset::BloomFilter;
//!
//! let mut filter = BloomFilter::new(100, 0.01).unwrap();
//! filter.add("apple");
//! filter.add("banana");
//!
//! assert!(filter.contains("apple"));
//! assert!(!filter.contains("cherry"));
//! assert_eq!((filter.num_bits(), filter.num_hashes()), (959, 7));
//! ```

use crate::bit_array::BitArray;
use crate::config::Config;
use crate::error::Error;
use crate::hash::Indices;
use md5::Md5;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::f64::consts::LN_2;
use std::fmt::{Debug, Formatter};
use std::marker::PhantomData;
use tracing::{debug, trace, warn};

/// Largest bit array a filter may request. Requests below this can still
/// fail with [`Error::Allocation`].
pub const MAX_NUM_BITS: usize = isize::MAX as usize;

pub struct BloomFilter<H1 = Sha256, H2 = Md5> {
    capacity: usize,
    error_rate: f64,
    bits: BitArray<u8>,
    num_hashes: u32,
    count: usize,
    _phantom: PhantomData<fn() -> (H1, H2)>,
}

impl BloomFilter {
    /// Creates a filter sized for `capacity` items at `error_rate` false
    /// positives, hashing with SHA-256 and MD5.
    pub fn new(capacity: usize, error_rate: f64) -> Result<Self, Error> {
        Self::with_rate(capacity, error_rate)
    }

    pub fn from_config(config: &Config) -> Result<Self, Error> {
        Self::with_rate(config.capacity, config.error_rate)
    }
}

impl<H1, H2> BloomFilter<H1, H2> {
    /// Like [`BloomFilter::new`], with the two digests chosen by the caller.
    pub fn with_rate(capacity: usize, error_rate: f64) -> Result<Self, Error> {
        let num_bits = optimal_num_bits(capacity, error_rate)?;
        let num_hashes = optimal_num_hashes(capacity, num_bits)?;
        debug!(capacity, error_rate, num_bits, num_hashes, "created bloom filter");
        Ok(Self {
            capacity,
            error_rate,
            bits: BitArray::new(num_bits)?,
            num_hashes,
            count: 0,
            _phantom: PhantomData,
        })
    }

    /// Creates a filter with explicit parameters. The error rate reported by
    /// [`error_rate`](Self::error_rate) is the theoretical rate once
    /// `capacity` items have been added.
    pub fn with_size(capacity: usize, num_bits: usize, num_hashes: u32) -> Result<Self, Error> {
        if capacity == 0 {
            return Err(Error::InvalidArgument("capacity must be > 0".into()));
        }
        if num_hashes == 0 {
            return Err(Error::InvalidArgument("num_hashes must be > 0".into()));
        }
        let bits = BitArray::new(num_bits)?;
        let error_rate = theoretical_fpp(capacity, num_bits, num_hashes);
        debug!(capacity, error_rate, num_bits, num_hashes, "created bloom filter");
        Ok(Self {
            capacity,
            error_rate,
            bits,
            num_hashes,
            count: 0,
            _phantom: PhantomData,
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn error_rate(&self) -> f64 {
        self.error_rate
    }

    /// Size `m` of the underlying bit array.
    pub fn num_bits(&self) -> usize {
        self.bits.len()
    }

    /// Number `k` of indices set per item.
    pub fn num_hashes(&self) -> u32 {
        self.num_hashes
    }

    /// Number of `add` calls, including repeated items.
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn bits(&self) -> &BitArray<u8> {
        &self.bits
    }

    pub fn bit_count(&self) -> usize {
        self.bits.count_ones()
    }

    pub fn fill_ratio(&self) -> f64 {
        self.bits.fill_ratio()
    }

    /// Estimated false positive rate from the current fill, `fill^k`.
    pub fn estimated_fpp(&self) -> f64 {
        self.fill_ratio().powi(self.num_hashes as i32)
    }

    /// Estimated number of distinct items added, `-(m / k) * ln(1 - x / m)`.
    pub fn estimated_count(&self) -> f64 {
        let m = self.bits.len() as f64;
        let k = self.num_hashes as f64;
        let ones = self.bits.count_ones() as f64;
        if ones >= m {
            return f64::INFINITY;
        }
        -m / k * (1. - ones / m).ln()
    }

    /// Copies the first `limit` bits along with the array totals.
    pub fn snapshot(&self, limit: usize) -> Snapshot {
        let bits: Vec<bool> = self.bits.iter().take(limit).collect();
        let sample_ones = bits.iter().filter(|&&bit| bit).count();
        let sample_fill_rate = if bits.is_empty() {
            0.
        } else {
            round2(sample_ones as f64 / bits.len() as f64 * 100.)
        };
        Snapshot {
            sample_size: bits.len(),
            sample_fill_rate,
            bits,
            total_size: self.bits.len(),
            ones_count: self.bits.count_ones(),
            elements_added: self.count,
        }
    }

    pub fn stats(&self) -> Stats {
        Stats {
            capacity: self.capacity,
            error_rate: self.error_rate,
            bits_total: self.bits.len(),
            bits_on: self.bits.count_ones(),
            fill_ratio: round2(self.fill_ratio() * 100.),
            hash_functions: self.num_hashes,
            elements_added: self.count,
            bits_per_item: round2(self.bits.len() as f64 / self.capacity as f64),
            estimated_fpp: self.estimated_fpp(),
            estimated_count: self.estimated_count(),
        }
    }
}

impl<H1, H2> BloomFilter<H1, H2>
where
    H1: Digest,
    H2: Digest,
{
    /// The `k` bit indices `item` maps to, all in `[0, m)`.
    pub fn indices<I>(&self, item: &I) -> Indices
    where
        I: AsRef<[u8]> + ?Sized,
    {
        Indices::new::<H1, H2>(item.as_ref(), self.bits.len(), self.num_hashes)
    }

    pub fn add<I>(&mut self, item: &I)
    where
        I: AsRef<[u8]> + ?Sized,
    {
        for index in self.indices(item) {
            self.bits.set_in_bounds(index);
        }
        self.count = self.count.saturating_add(1);
        trace!(count = self.count, "added item");
        if self.capacity.checked_add(1) == Some(self.count) {
            warn!(
                capacity = self.capacity,
                "filter holds more items than its capacity"
            );
        }
    }

    /// Returns `true` if `item` may have been added, `false` if it definitely
    /// was not.
    pub fn contains<I>(&self, item: &I) -> bool
    where
        I: AsRef<[u8]> + ?Sized,
    {
        self.indices(item).all(|index| self.bits.get_in_bounds(index))
    }

    /// Membership result together with each index and the state of its bit.
    pub fn probe<I>(&self, item: &I) -> Probe
    where
        I: AsRef<[u8]> + ?Sized,
    {
        let indices: Vec<usize> = self.indices(item).collect();
        let bits: Vec<bool> = indices
            .iter()
            .map(|&index| self.bits.get_in_bounds(index))
            .collect();
        Probe {
            result: bits.iter().all(|&bit| bit),
            indices,
            bits,
        }
    }
}

impl<H1, H2> Clone for BloomFilter<H1, H2> {
    fn clone(&self) -> Self {
        Self {
            capacity: self.capacity,
            error_rate: self.error_rate,
            bits: self.bits.clone(),
            num_hashes: self.num_hashes,
            count: self.count,
            _phantom: PhantomData,
        }
    }
}

impl<H1, H2> Debug for BloomFilter<H1, H2> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "BloomFilter {{ capacity: {}, error_rate: {}, num_bits: {}, num_hashes: {}, count: {} }}",
            self.capacity,
            self.error_rate,
            self.bits.len(),
            self.num_hashes,
            self.count
        )
    }
}

/// Bounded view of the bit array for display.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Snapshot {
    pub bits: Vec<bool>,
    pub sample_size: usize,
    /// Percentage of the sampled bits that are set, two decimals.
    pub sample_fill_rate: f64,
    pub total_size: usize,
    pub ones_count: usize,
    pub elements_added: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Stats {
    pub capacity: usize,
    pub error_rate: f64,
    pub bits_total: usize,
    pub bits_on: usize,
    /// Percentage of bits set, two decimals.
    pub fill_ratio: f64,
    pub hash_functions: u32,
    pub elements_added: usize,
    pub bits_per_item: f64,
    pub estimated_fpp: f64,
    pub estimated_count: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Probe {
    pub indices: Vec<usize>,
    pub bits: Vec<bool>,
    pub result: bool,
}

/// Optimal bit count `m = ceil(-n * ln(p) / ln(2)^2)`.
pub fn optimal_num_bits(capacity: usize, error_rate: f64) -> Result<usize, Error> {
    if capacity == 0 {
        return Err(Error::InvalidArgument("capacity must be > 0".into()));
    }
    if !(0. < error_rate && error_rate < 1.) {
        return Err(Error::InvalidArgument(format!(
            "error_rate must be in the range (0, 1), got {error_rate}"
        )));
    }
    let bits = (-(capacity as f64) * error_rate.ln() / (LN_2 * LN_2)).ceil();
    if bits > MAX_NUM_BITS as f64 {
        return Err(Error::InvalidArgument(format!(
            "{capacity} items at error_rate {error_rate} need more than {MAX_NUM_BITS} bits"
        )));
    }
    Ok((bits as usize).max(1))
}

/// Optimal hash count `k = max(1, round(m / n * ln(2)))`.
pub fn optimal_num_hashes(capacity: usize, num_bits: usize) -> Result<u32, Error> {
    if capacity == 0 {
        return Err(Error::InvalidArgument("capacity must be > 0".into()));
    }
    if num_bits == 0 {
        return Err(Error::InvalidArgument("num_bits must be > 0".into()));
    }
    let k = (num_bits as f64 / capacity as f64 * LN_2).round();
    Ok((k as u32).max(1))
}

/// `(1 - e^(-k * n / m))^k`
fn theoretical_fpp(capacity: usize, num_bits: usize, num_hashes: u32) -> f64 {
    let exponent = -(num_hashes as f64) * capacity as f64 / num_bits as f64;
    (1. - exponent.exp()).powi(num_hashes as i32)
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.).round() / 100.
}
