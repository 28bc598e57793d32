use crate::error::Error;
use serde::{Deserialize, Serialize};

/// Construction parameters for a filter, loadable from JSON.
///
/// Missing fields fall back to [`Config::default`].
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Expected number of items.
    pub capacity: usize,
    /// Target false positive rate, in `(0, 1)`.
    pub error_rate: f64,
    /// Number of leading bits included in snapshots.
    pub sample_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            capacity: 1000,
            error_rate: 0.01,
            sample_size: 500,
        }
    }
}

impl Config {
    pub fn from_json(json: &str) -> Result<Self, Error> {
        serde_json::from_str(json).map_err(|e| Error::Config(e.to_string()))
    }
}
