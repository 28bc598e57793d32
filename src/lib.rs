//! A Bloom filter over a byte-packed bit array.
//!
//! [`BloomFilter`] derives its size and hash count from an expected number
//! of items and a target false positive rate, and maps each item to its bits
//! by double hashing two digests (SHA-256 and MD5 by default).
//! [`SharedFilter`] wraps one filter for concurrent use, and
//! [`Comparison`] runs a filter next to an exact set to observe false
//! positives.

pub mod bit_array;
pub mod bloom;
pub mod config;
pub mod error;
pub mod hash;
pub mod set_membership;
pub mod shared;

pub use bit_array::BitArray;
pub use bloom::{BloomFilter, Probe, Snapshot, Stats};
pub use config::Config;
pub use error::Error;
pub use set_membership::compare::Comparison;
pub use set_membership::SetMembership;
pub use shared::SharedFilter;
