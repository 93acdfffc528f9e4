//! TableConfig: construction options for `ChainedHashMap`.
//!
//! Recognized options are the initial bucket count, the load-factor
//! threshold above which the bucket array doubles, and the hash builder.
//! A threshold outside `(0, 1]` is not an error: it is replaced by
//! [`DEFAULT_LOAD_FACTOR_THRESHOLD`] when the table is built.

use crate::error::ConfigError;
use crate::table::ChainedHashMap;
use core::hash::{BuildHasher, Hash};
use hashbrown::hash_map::DefaultHashBuilder;

/// Bucket count used when none is configured.
pub const DEFAULT_CAPACITY: usize = 100;

/// Load factor above which an insert grows the table, unless configured.
pub const DEFAULT_LOAD_FACTOR_THRESHOLD: f64 = 0.5;

#[derive(Clone, Debug)]
pub struct TableConfig<S = DefaultHashBuilder> {
    capacity: usize,
    load_factor_threshold: f64,
    hasher: S,
}

impl TableConfig {
    pub fn new() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            load_factor_threshold: DEFAULT_LOAD_FACTOR_THRESHOLD,
            hasher: DefaultHashBuilder::default(),
        }
    }
}

impl Default for TableConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> TableConfig<S> {
    /// Initial number of buckets. Must be non-zero by the time `build` runs.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn load_factor_threshold(mut self, threshold: f64) -> Self {
        self.load_factor_threshold = threshold;
        self
    }

    /// Swap the hash builder, keeping the other options.
    pub fn hasher<T>(self, hasher: T) -> TableConfig<T> {
        TableConfig {
            capacity: self.capacity,
            load_factor_threshold: self.load_factor_threshold,
            hasher,
        }
    }

    pub fn build<K, V>(self) -> Result<ChainedHashMap<K, V, S>, ConfigError>
    where
        K: Eq + Hash,
        S: BuildHasher,
    {
        if self.capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        let threshold = effective_threshold(self.load_factor_threshold);
        Ok(ChainedHashMap::from_parts(self.capacity, threshold, self.hasher))
    }
}

/// Map a configured threshold onto `(0, 1]`, falling back to the default.
pub(crate) fn effective_threshold(threshold: f64) -> f64 {
    // NaN fails both comparisons and lands in the fallback.
    if threshold > 0.0 && threshold <= 1.0 {
        threshold
    } else {
        tracing::debug!(
            configured = threshold,
            fallback = DEFAULT_LOAD_FACTOR_THRESHOLD,
            "load factor threshold outside (0, 1], using default"
        );
        DEFAULT_LOAD_FACTOR_THRESHOLD
    }
}
