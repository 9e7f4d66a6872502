//! The orchestrator that wires the record source, matcher, writers, and counts together.
//!
//! A run proceeds through fixed phases: every destination is opened up front, the record
//! source is driven to exhaustion (each record is matched, routed, and counted exactly once),
//! and then every destination is finalized. Finalization happens on every exit path; an error
//! raised while finalizing after an earlier failure is logged rather than allowed to mask the
//! failure already in flight.

use std::io::Write;
use std::path::PathBuf;

use log::error;
use seq_io::fastq::{OwnedRecord, Record};
use thiserror::Error;

use crate::counts::CountTable;
use crate::matcher::{MatchResult, Matcher, UNMATCHED_NAME};
use crate::sample_list::SampleMetadata;
use crate::sample_writer::SampleWriters;

/// The error that may occur while demultiplexing.
#[derive(Error, Debug)]
pub enum DemuxError {
    #[error("Failed to open input FASTQ {path}")]
    InputOpen { path: PathBuf, source: std::io::Error },

    #[error("Failed to read record {record_number} from input (malformed or unreadable stream)")]
    InputStream { record_number: u64, source: seq_io::fastq::Error },

    #[error("Failed to create the output destination for `{sample_id}`")]
    DestinationOpen { sample_id: String, source: std::io::Error },

    #[error("Failed to write record {record_number} to the output destination for `{sample_id}`")]
    DestinationWrite { sample_id: String, record_number: u64, source: std::io::Error },

    #[error("Failed to finalize the output destination for `{sample_id}`")]
    DestinationClose { sample_id: String, source: std::io::Error },

    #[error("Count table has no entry for key `{key}`")]
    UnseededCountKey { key: String },
}

/// Demultiplexes a stream of records into per-sample destinations, tallying as it goes.
pub struct Demultiplexer<'a, M: Matcher> {
    samples: &'a [SampleMetadata],
    matcher: M,
}

impl<'a, M: Matcher> Demultiplexer<'a, M> {
    /// Create a new [`Demultiplexer`] over the given samples and matching algorithm.
    pub fn new(samples: &'a [SampleMetadata], matcher: M) -> Self {
        Self { samples, matcher }
    }

    /// Run the full pipeline over `records` and return the completed [`CountTable`].
    ///
    /// `new_writer` maps a destination name (a sample ID, or the unmatched name) to an opened
    /// destination; all destinations are opened before the first record is read and finalized
    /// exactly once before this returns, on success and failure alike.
    ///
    /// On failure the count table is not returned; destinations written before the failure are
    /// left on disk as-is.
    pub fn demultiplex<W, F, I>(&self, records: I, new_writer: F) -> Result<CountTable, DemuxError>
    where
        W: Write,
        F: FnMut(&str) -> std::io::Result<W>,
        I: IntoIterator<Item = Result<OwnedRecord, DemuxError>>,
    {
        let mut counts = CountTable::with_samples(self.samples);
        let mut writers = SampleWriters::open_all(self.samples, new_writer)?;

        let streamed = self.stream(records, &mut writers, &mut counts);
        let finalized = writers.finish();

        match (streamed, finalized) {
            (Ok(()), Ok(())) => Ok(counts),
            (Ok(()), Err(close_err)) => Err(close_err),
            (Err(err), Ok(())) => Err(err),
            (Err(err), Err(close_err)) => {
                error!("While aborting the run: {}", close_err);
                Err(err)
            }
        }
    }

    /// Drive the record source to exhaustion, matching, routing, and counting each record.
    fn stream<W, I>(
        &self,
        records: I,
        writers: &mut SampleWriters<W>,
        counts: &mut CountTable,
    ) -> Result<(), DemuxError>
    where
        W: Write,
        I: IntoIterator<Item = Result<OwnedRecord, DemuxError>>,
    {
        let mut record_number: u64 = 0;
        for record in records {
            let record = record?;
            record_number += 1;
            let key = match self.matcher.find(record.head()) {
                MatchResult::Match { sample_index } => {
                    writers.write_record(sample_index, &record, record_number)?;
                    self.samples[sample_index].sample_id.as_str()
                }
                MatchResult::NoMatch => {
                    writers.write_unmatched(&record, record_number)?;
                    UNMATCHED_NAME
                }
            };
            counts.increment(key)?;
        }
        Ok(())
    }
}
