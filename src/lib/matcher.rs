//! Match sample identifiers against FASTQ record headers.
//!
//! A sample matches a header when its identifier, bracketed by the delimiter character on both
//! sides (`<delim><id><delim>`), occurs anywhere in the header. Samples are scanned in the
//! caller-supplied list order and the scan stops at the first hit; this first-match policy is
//! what makes an ambiguous header (one containing more than one sample's token) resolve
//! deterministically.

use bstr::ByteSlice;

use crate::sample_list::SampleMetadata;

/// The name given to the output that collects records matching no sample.
pub const UNMATCHED_NAME: &str = "unmatched";

/// The delimiter that bounds sample identifiers in read headers, unless overridden.
pub const DEFAULT_DELIMITER: u8 = b'_';

/// The outcome of scanning one header against the sample list.
#[derive(Debug, Hash, PartialEq, Eq, Clone, Copy)]
pub enum MatchResult {
    Match { sample_index: usize },
    NoMatch,
}

impl MatchResult {
    pub fn is_match(&self) -> bool {
        matches!(self, Self::Match { .. })
    }

    pub fn is_no_match(&self) -> bool {
        !self.is_match()
    }
}

/// The base trait for all matching algorithms.
pub trait Matcher {
    fn find(&self, header: &[u8]) -> MatchResult;
}

/// Matches by scanning the delimiter-bounded identifier patterns in list order.
///
/// Linear in the number of samples per record, which is the intended trade-off for the small
/// sample lists this tool is built for.
pub struct DelimitedIdMatcher {
    /// One `<delim><id><delim>` byte pattern per sample, in sample list order.
    patterns: Vec<Vec<u8>>,
}

impl DelimitedIdMatcher {
    /// Create a new [`DelimitedIdMatcher`] for the given samples and delimiter.
    pub fn new(samples: &[SampleMetadata], delimiter: u8) -> Self {
        let patterns = samples
            .iter()
            .map(|sample| {
                let id = sample.sample_id.as_bytes();
                let mut pattern = Vec::with_capacity(id.len() + 2);
                pattern.push(delimiter);
                pattern.extend_from_slice(id);
                pattern.push(delimiter);
                pattern
            })
            .collect();
        Self { patterns }
    }
}

impl Matcher for DelimitedIdMatcher {
    fn find(&self, header: &[u8]) -> MatchResult {
        for (sample_index, pattern) in self.patterns.iter().enumerate() {
            if header.find(pattern).is_some() {
                return MatchResult::Match { sample_index };
            }
        }
        MatchResult::NoMatch
    }
}
