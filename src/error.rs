//! Error types for bit array and filter operations

use thiserror::Error;

/// Error type returned by fallible `bloomset` operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("cannot allocate {0} bits")]
    Allocation(usize),
    #[error("index out of range: {index} >= {size}")]
    IndexOutOfRange { index: usize, size: usize },
    #[error("invalid config: {0}")]
    Config(String),
}
