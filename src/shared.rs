use crate::bloom::{BloomFilter, Probe, Snapshot, Stats};
use crate::config::Config;
use crate::error::Error;
use md5::Md5;
use sha2::{Digest, Sha256};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Cloneable handle to one filter shared between threads.
///
/// `add` takes the write lock. Queries take the read lock, so they always
/// observe every bit of an `add` or none of it.
pub struct SharedFilter<H1 = Sha256, H2 = Md5> {
    inner: Arc<RwLock<BloomFilter<H1, H2>>>,
    sample_size: usize,
}

impl SharedFilter {
    pub fn from_config(config: &Config) -> Result<Self, Error> {
        Ok(Self::new(BloomFilter::from_config(config)?, config.sample_size))
    }
}

impl<H1, H2> SharedFilter<H1, H2>
where
    H1: Digest,
    H2: Digest,
{
    /// Wraps `filter`; snapshots include its first `sample_size` bits.
    pub fn new(filter: BloomFilter<H1, H2>, sample_size: usize) -> Self {
        Self {
            inner: Arc::new(RwLock::new(filter)),
            sample_size,
        }
    }

    pub fn add(&self, item: &str) {
        self.write().add(item);
    }

    pub fn contains(&self, item: &str) -> bool {
        self.read().contains(item)
    }

    pub fn probe(&self, item: &str) -> Probe {
        self.read().probe(item)
    }

    pub fn snapshot(&self) -> Snapshot {
        self.read().snapshot(self.sample_size)
    }

    pub fn stats(&self) -> Stats {
        self.read().stats()
    }

    /// `(m, k)` of the shared filter.
    pub fn params(&self) -> (usize, u32) {
        let filter = self.read();
        (filter.num_bits(), filter.num_hashes())
    }

    // A panic while holding the lock cannot leave a half-written filter:
    // bits are only ever set, so recovering the guard is sound.
    fn read(&self) -> RwLockReadGuard<'_, BloomFilter<H1, H2>> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, BloomFilter<H1, H2>> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<H1, H2> Clone for SharedFilter<H1, H2> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            sample_size: self.sample_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn make_shared() -> SharedFilter {
        SharedFilter::from_config(&Config {
            capacity: 1_000,
            error_rate: 0.01,
            sample_size: 64,
        })
        .unwrap()
    }

    #[test]
    fn test_from_config() {
        let shared = make_shared();
        assert_eq!(shared.params(), (9_586, 7));
        assert_eq!(shared.snapshot().sample_size, 64);

        let config = Config {
            capacity: 0,
            ..Config::default()
        };
        assert!(SharedFilter::from_config(&config).is_err());
    }

    #[test]
    fn test_clones_share_state() {
        let shared = make_shared();
        let other = shared.clone();

        shared.add("apple");

        assert!(other.contains("apple"));
        assert_eq!(other.stats().elements_added, 1);
        assert!(other.probe("apple").result);
    }

    #[test]
    fn test_concurrent_adds() {
        let shared = make_shared();
        let words: Vec<String> = (0..1_000).map(|i| format!("word-{i}")).collect();

        thread::scope(|s| {
            for chunk in words.chunks(250) {
                let shared = shared.clone();
                s.spawn(move || {
                    for word in chunk {
                        shared.add(word);
                        assert!(shared.contains(word));
                    }
                });
            }
            let reader = shared.clone();
            s.spawn(move || {
                for _ in 0..100 {
                    let snapshot = reader.snapshot();
                    assert!(snapshot.ones_count <= snapshot.total_size);
                }
            });
        });

        assert_eq!(shared.stats().elements_added, 1_000);
        assert!(words.iter().all(|word| shared.contains(word)));
    }

    #[test]
    fn test_poisoned_lock() {
        let shared = make_shared();
        shared.add("apple");

        let poisoner = shared.clone();
        let result = thread::spawn(move || {
            let _guard = poisoner.write();
            panic!("poison");
        })
        .join();
        assert!(result.is_err());

        assert!(shared.contains("apple"));
        shared.add("banana");
        assert!(shared.contains("banana"));
    }
}
