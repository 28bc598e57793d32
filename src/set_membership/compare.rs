//! Side-by-side comparison of a Bloom filter and an exact set fed the same
//! items, to observe false positives and the memory trade-off.

use crate::bloom::{round2, BloomFilter};
use crate::error::Error;
use crate::set_membership::SetMembership;
use md5::Md5;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::time::{Duration, Instant};
use tracing::debug;

/// Rough per-entry footprint of a short string in the exact set.
pub const EXACT_BYTES_PER_ITEM: usize = 50;

/// Number of indices reported per verdict.
pub const VERDICT_INDICES: usize = 10;

#[derive(Clone, Debug)]
pub struct Comparison<H1 = Sha256, H2 = Md5> {
    filter: BloomFilter<H1, H2>,
    exact: HashSet<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct InsertReport {
    pub words_added: usize,
    pub time_filter: Duration,
    pub time_exact: Duration,
    /// Filter `count` after the insertion.
    pub filter_count: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Verdict {
    pub item: String,
    pub filter_result: bool,
    pub exact_result: bool,
    pub is_false_positive: bool,
    pub indices: Vec<usize>,
    pub bits: Vec<bool>,
    pub time_filter: Duration,
    pub time_exact: Duration,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MemoryReport {
    pub filter_items: usize,
    pub exact_items: usize,
    pub filter_bytes: f64,
    pub exact_bytes: usize,
    /// `exact_bytes / filter_bytes`, two decimals.
    pub ratio: f64,
}

impl<H1, H2> Comparison<H1, H2>
where
    H1: Digest,
    H2: Digest,
{
    pub fn new(filter: BloomFilter<H1, H2>) -> Self {
        Self {
            filter,
            exact: HashSet::new(),
        }
    }

    pub fn filter(&self) -> &BloomFilter<H1, H2> {
        &self.filter
    }

    pub fn exact(&self) -> &HashSet<String> {
        &self.exact
    }

    pub fn insert_all<'a, I>(&mut self, items: I) -> InsertReport
    where
        I: IntoIterator<Item = &'a str>,
    {
        let items: Vec<&str> = items.into_iter().collect();
        let time_filter = timed(|| insert_each(&mut self.filter, &items));
        let time_exact = timed(|| insert_each(&mut self.exact, &items));
        debug!(words = items.len(), ?time_filter, ?time_exact, "inserted words");
        InsertReport {
            words_added: items.len(),
            time_filter,
            time_exact,
            filter_count: self.filter.count(),
        }
    }

    /// Queries both sets. Blank items (empty or whitespace only) are
    /// rejected; other items are checked exactly as given.
    pub fn check(&self, item: &str) -> Result<Verdict, Error> {
        if item.trim().is_empty() {
            return Err(Error::InvalidArgument("item must not be blank".into()));
        }
        let mut filter_result = false;
        let time_filter =
            timed(|| filter_result = SetMembership::<str>::contains(&self.filter, item));
        let mut exact_result = false;
        let time_exact = timed(|| exact_result = SetMembership::contains(&self.exact, item));

        let probe = self.filter.probe(item);
        Ok(Verdict {
            item: item.to_owned(),
            filter_result,
            exact_result,
            is_false_positive: filter_result && !exact_result,
            indices: probe.indices.into_iter().take(VERDICT_INDICES).collect(),
            bits: probe.bits.into_iter().take(VERDICT_INDICES).collect(),
            time_filter,
            time_exact,
        })
    }

    /// Fraction of `queries` absent from the exact set that the filter still
    /// reports as present. Returns 0 when every query is a member.
    pub fn false_positive_rate<'a, I>(&self, queries: I) -> f64
    where
        I: IntoIterator<Item = &'a str>,
    {
        let (negatives, false_positives) = queries
            .into_iter()
            .filter(|item| !self.exact.contains(*item))
            .fold((0usize, 0usize), |(negatives, fps), item| {
                (negatives + 1, fps + self.filter.contains(item) as usize)
            });
        if negatives == 0 {
            0.
        } else {
            false_positives as f64 / negatives as f64
        }
    }

    pub fn memory(&self) -> MemoryReport {
        let filter_bytes = self.filter.num_bits() as f64 / 8.;
        let exact_bytes = self.exact.len() * EXACT_BYTES_PER_ITEM;
        MemoryReport {
            filter_items: self.filter.count(),
            exact_items: self.exact.len(),
            filter_bytes,
            exact_bytes,
            ratio: round2(exact_bytes as f64 / filter_bytes),
        }
    }
}

fn insert_each<S>(set: &mut S, items: &[&str])
where
    S: SetMembership<str>,
{
    for item in items {
        set.insert(item);
    }
}

fn timed(f: impl FnOnce()) -> Duration {
    let start = Instant::now();
    f();
    start.elapsed()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_comparison() -> Comparison {
        let mut cmp = Comparison::new(BloomFilter::new(100, 0.01).unwrap());
        cmp.insert_all(["apple", "banana"]);
        cmp
    }

    #[test]
    fn test_insert_all() {
        let mut cmp = Comparison::new(BloomFilter::new(100, 0.01).unwrap());

        let report = cmp.insert_all(["apple", "banana", "apple"]);

        assert_eq!(report.words_added, 3);
        assert_eq!(report.filter_count, 3);
        assert_eq!(cmp.filter().count(), 3);
        assert_eq!(cmp.exact().len(), 2);
    }

    #[test]
    fn test_check_member() {
        let cmp = make_comparison();

        let verdict = cmp.check("apple").unwrap();
        assert!(verdict.filter_result);
        assert!(verdict.exact_result);
        assert!(!verdict.is_false_positive);
        assert_eq!(verdict.indices, vec![764, 936, 149, 321, 493, 665, 837]);
        assert_eq!(verdict.bits, vec![true; 7]);
    }

    #[test]
    fn test_check_non_member() {
        let cmp = make_comparison();

        let verdict = cmp.check("cherry").unwrap();
        assert!(!verdict.filter_result);
        assert!(!verdict.exact_result);
        assert!(!verdict.is_false_positive);
    }

    #[test]
    fn test_false_positive_flag() {
        // One bit, one hash: every query hits once anything was added.
        let mut cmp: Comparison = Comparison::new(BloomFilter::with_size(1, 1, 1).unwrap());
        cmp.insert_all(["apple"]);

        let verdict = cmp.check("cherry").unwrap();
        assert!(verdict.filter_result);
        assert!(!verdict.exact_result);
        assert!(verdict.is_false_positive);
        assert_eq!(cmp.false_positive_rate(["cherry", "grape", "apple"]), 1.);
    }

    #[test]
    fn test_verdict_indices_truncated() {
        let cmp: Comparison = Comparison::new(BloomFilter::with_size(10, 1000, 20).unwrap());

        let verdict = cmp.check("apple").unwrap();
        assert_eq!(verdict.indices.len(), VERDICT_INDICES);
        assert_eq!(verdict.bits.len(), VERDICT_INDICES);
    }

    #[test]
    fn test_check_blank() {
        let cmp = make_comparison();

        for item in ["", " ", "\t\n"] {
            assert!(matches!(cmp.check(item), Err(Error::InvalidArgument(_))));
        }
        assert_eq!(cmp.check(" apple").unwrap().item, " apple");
    }

    #[test]
    fn test_false_positive_rate() {
        let cmp = make_comparison();

        assert_eq!(cmp.false_positive_rate(["apple", "banana"]), 0.);
        assert_eq!(cmp.false_positive_rate(["apple", "cherry"]), 0.);
    }

    #[test]
    fn test_memory() {
        let cmp = make_comparison();

        let memory = cmp.memory();
        assert_eq!(memory.filter_items, 2);
        assert_eq!(memory.exact_items, 2);
        assert_eq!(memory.filter_bytes, 119.875);
        assert_eq!(memory.exact_bytes, 100);
        assert_eq!(memory.ratio, 0.83);
    }
}
