//! Error types surfaced by raw bucket access and table construction.

use core::fmt;

/// Failure of an indexed bucket access (`bucket`, `bucket_mut`, `bucket_entry`,
/// `chain_len`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BucketError {
    /// The index is not below the current capacity.
    OutOfRange { index: usize, capacity: usize },
    /// The bucket exists but its chain holds no entries.
    Empty { index: usize },
}

impl fmt::Display for BucketError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BucketError::OutOfRange { index, capacity } => {
                write!(f, "bucket index {index} out of range for capacity {capacity}")
            }
            BucketError::Empty { index } => write!(f, "bucket {index} is empty"),
        }
    }
}

impl std::error::Error for BucketError {}

/// Rejected table configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    ZeroCapacity,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ZeroCapacity => f.write_str("initial capacity must be greater than zero"),
        }
    }
}

impl std::error::Error for ConfigError {}
