//! The running tally of records assigned to each sample.
//!
//! A [`CountTable`] is seeded with every sample identifier plus the unmatched key before
//! streaming starts, and is the value returned to the caller when a run completes. Incrementing
//! a key that was never seeded is a contract violation and surfaces as a typed error rather
//! than silently inserting the key.

use ahash::AHashMap;

use crate::demux::DemuxError;
use crate::matcher::UNMATCHED_NAME;
use crate::sample_list::SampleMetadata;

/// A mapping from sample identifier (plus the literal unmatched key) to the number of records
/// routed to it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CountTable {
    counts: AHashMap<String, u64>,
}

impl CountTable {
    /// Create a table seeded with a zero count for every sample and for the unmatched key.
    pub fn with_samples(samples: &[SampleMetadata]) -> Self {
        let mut counts = AHashMap::with_capacity(samples.len() + 1);
        for sample in samples {
            counts.insert(sample.sample_id.clone(), 0);
        }
        counts.insert(UNMATCHED_NAME.to_string(), 0);
        Self { counts }
    }

    /// Add one to the count for `key`.
    ///
    /// # Errors
    ///
    /// - [`DemuxError::UnseededCountKey`] if `key` was not seeded at construction time
    pub fn increment(&mut self, key: &str) -> Result<(), DemuxError> {
        match self.counts.get_mut(key) {
            Some(count) => {
                *count += 1;
                Ok(())
            }
            None => Err(DemuxError::UnseededCountKey { key: key.to_owned() }),
        }
    }

    /// The count for `key`, or `None` if the key was never seeded.
    pub fn get(&self, key: &str) -> Option<u64> {
        self.counts.get(key).copied()
    }

    /// The sum of all counts; equals the number of records processed on a successful run.
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    /// The number of seeded keys, including the unmatched key.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}
