//! Dataset fingerprinting.
//!
//! A BLAKE3 hash over the dates, column names, and the raw bit patterns of
//! every feature and target. Two builds over identical inputs hash equal;
//! any bit-level difference changes the hash.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::features::Dataset;

/// Hex-encoded BLAKE3 digest of a dataset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DatasetHash(pub String);

impl DatasetHash {
    pub fn of_dataset(dataset: &Dataset) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(dataset.schema.fingerprint().as_bytes());
        hasher.update(&(dataset.len() as u64).to_le_bytes());
        for date in &dataset.dates {
            hasher.update(date.to_string().as_bytes());
        }
        for v in dataset.features.as_slice() {
            hasher.update(&v.to_bits().to_le_bytes());
        }
        for v in &dataset.targets {
            hasher.update(&v.to_bits().to_le_bytes());
        }
        Self(hasher.finalize().to_hex().to_string())
    }

    /// First 12 hex characters, for logs and file names.
    pub fn short(&self) -> &str {
        &self.0[..self.0.len().min(12)]
    }
}

impl fmt::Display for DatasetHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
