//! Ownership and lifecycle of the per-sample output destinations.
//!
//! All destinations (one per sample, plus the unmatched destination) are opened once up front
//! and held for the whole run, so that routing a record is a pure append with no per-record
//! open/close overhead. Opening is scoped: if any destination fails to open, the ones opened
//! before it are released before the error propagates.

use std::io::Write;

use log::error;
use seq_io::fastq::{OwnedRecord, Record};

use crate::demux::DemuxError;
use crate::matcher::UNMATCHED_NAME;
use crate::sample_list::SampleMetadata;

/// A struct that owns one writable destination per sample plus the unmatched destination.
///
/// Generic over the destination type so tests can substitute in-memory fakes for files.
#[derive(Debug)]
pub struct SampleWriters<W: Write> {
    /// Destination names, parallel to `writers`; the last entry is the unmatched output.
    sample_ids: Vec<String>,
    writers: Vec<W>,
}

impl<W: Write> SampleWriters<W> {
    /// Open one destination per sample, in list order, followed by the unmatched destination.
    ///
    /// `new_writer` maps a destination name to an opened destination. If it fails, every
    /// destination opened so far is dropped (and thereby released) before the error is
    /// returned.
    pub fn open_all<F>(samples: &[SampleMetadata], mut new_writer: F) -> Result<Self, DemuxError>
    where
        F: FnMut(&str) -> std::io::Result<W>,
    {
        let mut sample_ids = Vec::with_capacity(samples.len() + 1);
        let mut writers = Vec::with_capacity(samples.len() + 1);
        for sample in samples {
            let writer = new_writer(&sample.sample_id).map_err(|source| {
                DemuxError::DestinationOpen { sample_id: sample.sample_id.clone(), source }
            })?;
            sample_ids.push(sample.sample_id.clone());
            writers.push(writer);
        }
        let writer = new_writer(UNMATCHED_NAME).map_err(|source| DemuxError::DestinationOpen {
            sample_id: UNMATCHED_NAME.to_string(),
            source,
        })?;
        sample_ids.push(UNMATCHED_NAME.to_string());
        writers.push(writer);
        Ok(Self { sample_ids, writers })
    }

    /// The number of destinations held open, including the unmatched destination.
    pub fn len(&self) -> usize {
        self.writers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.writers.is_empty()
    }

    /// Serialize `record` back to its 4-line form and append it to the destination for the
    /// sample at `sample_index` (in sample list order).
    pub fn write_record(
        &mut self,
        sample_index: usize,
        record: &OwnedRecord,
        record_number: u64,
    ) -> Result<(), DemuxError> {
        debug_assert!(sample_index < self.writers.len() - 1);
        self.write_to(sample_index, record, record_number)
    }

    /// Append `record` to the unmatched destination.
    pub fn write_unmatched(
        &mut self,
        record: &OwnedRecord,
        record_number: u64,
    ) -> Result<(), DemuxError> {
        self.write_to(self.writers.len() - 1, record, record_number)
    }

    fn write_to(
        &mut self,
        index: usize,
        record: &OwnedRecord,
        record_number: u64,
    ) -> Result<(), DemuxError> {
        record.write(&mut self.writers[index]).map_err(|source| DemuxError::DestinationWrite {
            sample_id: self.sample_ids[index].clone(),
            record_number,
            source,
        })
    }

    /// Consumes [`Self`], flushing every destination exactly once.
    ///
    /// Every destination is flushed even when an earlier one fails; the first failure is
    /// returned and any further failures are logged so they are not silently dropped.
    pub fn finish(mut self) -> Result<(), DemuxError> {
        let mut first_err: Option<DemuxError> = None;
        for (sample_id, writer) in self.sample_ids.iter().zip(self.writers.iter_mut()) {
            if let Err(source) = writer.flush() {
                let err = DemuxError::DestinationClose { sample_id: sample_id.clone(), source };
                if first_err.is_none() {
                    first_err = Some(err);
                } else {
                    error!("{}", err);
                }
            }
        }
        match first_err {
            None => Ok(()),
            Some(err) => Err(err),
        }
    }
}
