use sha2::Digest;
use std::iter::FusedIterator;

/// The `k` bit indices of one item, derived by double hashing.
///
/// Both digests are read as big-endian unsigned integers `h1` and `h2`, and
/// the `i`-th index is `(h1 + i * h2) mod m`. The digests are reduced modulo
/// `m` byte by byte, which yields the same values as the full-width integer
/// arithmetic without needing big integers.
///
/// The iterator is cheap to clone, so the same sequence can be replayed.
#[derive(Clone, Debug)]
pub struct Indices {
    h1: u128,
    h2: u128,
    num_bits: u128,
    next: u32,
    num_hashes: u32,
}

impl Indices {
    pub(crate) fn new<H1, H2>(item: &[u8], num_bits: usize, num_hashes: u32) -> Self
    where
        H1: Digest,
        H2: Digest,
    {
        assert!(num_bits > 0, "num_bits must be > 0");
        let num_bits = num_bits as u128;
        Self {
            h1: reduce_be(&H1::digest(item), num_bits),
            h2: reduce_be(&H2::digest(item), num_bits),
            num_bits,
            next: 0,
            num_hashes,
        }
    }
}

impl Iterator for Indices {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.next >= self.num_hashes {
            return None;
        }
        // h1, h2 < m <= 2^64 and i < 2^32, so this cannot overflow u128.
        let index = (self.h1 + self.next as u128 * self.h2) % self.num_bits;
        self.next += 1;
        Some(index as usize)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.num_hashes - self.next) as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Indices {}

impl FusedIterator for Indices {}

/// Interprets `bytes` as a big-endian integer and returns it modulo `modulus`.
fn reduce_be(bytes: &[u8], modulus: u128) -> u128 {
    bytes
        .iter()
        .fold(0, |acc, &byte| ((acc << 8) | byte as u128) % modulus)
}

#[cfg(test)]
mod tests {
    use super::*;
    use md5::Md5;
    use sha2::Sha256;

    fn indices(item: &str, num_bits: usize, num_hashes: u32) -> Vec<usize> {
        Indices::new::<Sha256, Md5>(item.as_bytes(), num_bits, num_hashes).collect()
    }

    #[test]
    fn test_reduce_be() {
        assert_eq!(reduce_be(&[], 7), 0);
        assert_eq!(reduce_be(&[0x01, 0x00], 1000), 256);
        assert_eq!(reduce_be(&[0x01, 0x00], 7), 256 % 7);
        assert_eq!(reduce_be(&[0xff; 16], u128::MAX >> 65), u128::MAX % (u128::MAX >> 65));
        assert_eq!(reduce_be(&[0xab, 0xcd, 0xef], 1), 0);
    }

    #[test]
    fn test_known_indices() {
        assert_eq!(
            indices("apple", 959, 7),
            vec![764, 936, 149, 321, 493, 665, 837]
        );
        assert_eq!(
            indices("banana", 959, 7),
            vec![164, 267, 370, 473, 576, 679, 782]
        );
        assert_eq!(indices("", 959, 7), vec![659, 163, 626, 130, 593, 97, 560]);
        assert_eq!(
            indices("héllo", 959, 7),
            vec![425, 31, 596, 202, 767, 373, 938]
        );
    }

    #[test]
    fn test_exact_size() {
        let it = Indices::new::<Sha256, Md5>(b"item", 100, 5);
        assert_eq!(it.len(), 5);
        assert_eq!(it.clone().count(), 5);

        let mut it = it;
        it.next();
        assert_eq!(it.len(), 4);
    }

    #[test]
    fn test_restartable() {
        let it = Indices::new::<Sha256, Md5>(b"item", 1000, 8);
        assert_eq!(it.clone().collect::<Vec<_>>(), it.collect::<Vec<_>>());
    }

    #[test]
    fn test_single_bit() {
        assert_eq!(indices("anything", 1, 3), vec![0, 0, 0]);
    }
}
