use crate::error::Error;
use num_traits::{PrimInt, Unsigned};
use std::fmt::{Debug, Formatter};

/// A fixed-length array of single-bit flags packed into words of type `W`.
///
/// Bits are stored least-significant-bit first: bit `i` lives in word
/// `i / W::BITS` under the mask `1 << (i % W::BITS)`. With the default `u8`
/// word the backing storage is exactly `ceil(size / 8)` bytes.
#[derive(Clone, PartialEq, Eq)]
pub struct BitArray<W = u8> {
    buf: Vec<W>,
    size: usize,
}

impl<W> BitArray<W>
where
    W: PrimInt + Unsigned,
{
    const WORD_SIZE: usize = 8 * size_of::<W>();

    /// Creates an array of `size` cleared bits. Fails with
    /// [`Error::Allocation`] instead of aborting when the storage cannot be
    /// allocated.
    pub fn new(size: usize) -> Result<Self, Error> {
        if size == 0 {
            return Err(Error::InvalidArgument("size must be > 0".into()));
        }
        let num_words = size.div_ceil(Self::WORD_SIZE);
        let mut buf = Vec::new();
        buf.try_reserve_exact(num_words).map_err(|_| Error::Allocation(size))?;
        buf.resize(num_words, W::zero());
        Ok(Self { buf, size })
    }

    /// Number of addressable bits.
    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    pub fn get(&self, index: usize) -> Result<bool, Error> {
        self.check_index(index)?;
        Ok(self.get_in_bounds(index))
    }

    /// Sets the bit at `index` to 1. Setting an already set bit is a no-op.
    pub fn set(&mut self, index: usize) -> Result<(), Error> {
        self.check_index(index)?;
        self.set_in_bounds(index);
        Ok(())
    }

    pub fn clear(&mut self, index: usize) -> Result<(), Error> {
        self.check_index(index)?;
        let (word_index, mask) = Self::index_and_mask(index);
        self.buf[word_index] = self.buf[word_index] & !mask;
        Ok(())
    }

    pub fn clear_all(&mut self) {
        self.buf.fill(W::zero());
    }

    /// Total number of bits set to 1, computed on demand.
    pub fn count_ones(&self) -> usize {
        self.buf.iter().map(|word| word.count_ones() as usize).sum()
    }

    /// Fraction of bits set to 1, in `[0, 1]`.
    pub fn fill_ratio(&self) -> f64 {
        self.count_ones() as f64 / self.size as f64
    }

    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        (0..self.size).map(move |index| self.get_in_bounds(index))
    }

    /// Raw backing words. Padding bits past `len()` are always 0.
    pub fn as_words(&self) -> &[W] {
        &self.buf
    }

    pub(crate) fn get_in_bounds(&self, index: usize) -> bool {
        debug_assert!(index < self.size, "index out of bounds");
        let (word_index, mask) = Self::index_and_mask(index);
        self.buf[word_index] & mask != W::zero()
    }

    pub(crate) fn set_in_bounds(&mut self, index: usize) {
        debug_assert!(index < self.size, "index out of bounds");
        let (word_index, mask) = Self::index_and_mask(index);
        self.buf[word_index] = self.buf[word_index] | mask;
    }

    fn check_index(&self, index: usize) -> Result<(), Error> {
        if index < self.size {
            Ok(())
        } else {
            Err(Error::IndexOutOfRange {
                index,
                size: self.size,
            })
        }
    }

    fn index_and_mask(index: usize) -> (usize, W) {
        (
            index / Self::WORD_SIZE,
            W::one() << (index % Self::WORD_SIZE),
        )
    }
}

impl<W> Debug for BitArray<W> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "BitArray {{ size: {}, words: {} }}",
            self.size,
            self.buf.len()
        )
    }
}
