//! Loading and validation of the sample list.
//!
//! The sample list is a headered CSV file whose `Sample_ID` column holds one unique, non-empty
//! identifier per sample. The order of rows is significant: it is the order in which the
//! [`crate::matcher`] scans identifiers, and the order in which counts are reported.

use std::{fmt::Display, path::Path};

use ahash::AHashSet;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::matcher::UNMATCHED_NAME;

/// The optional line number from the sample list file where an error occurred.
#[derive(Debug)]
pub struct ErrorLine(pub Option<usize>);

impl Display for ErrorLine {
    /// Writes the line number if present, nothing if it is not None.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            Some(number) => write!(f, "Line {}", number),
            None => Ok(()),
        }
    }
}

/// The error that may occur when loading the sample list.
#[derive(Error, Debug)]
pub enum SampleListError {
    #[error("Io error occurred")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Deserialize(#[from] csv::Error),

    #[error("Sample ID is an empty string. {line}")]
    EmptySampleId { line: ErrorLine },

    #[error("Duplicate Sample_ID found: {id}")]
    DuplicateSampleId { id: String },

    #[error("Sample ID `{id}` is reserved for the unmatched output. {line}")]
    ReservedSampleId { id: String, line: ErrorLine },
}

/// Metadata about a sample.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Hash, Eq)]
pub struct SampleMetadata {
    /// The unique identifier for the sample, as embedded in read headers.
    #[serde(alias = "Sample_ID", rename(serialize = "Sample_ID"))]
    pub sample_id: String,

    /// The number of the sample in the sample list (corresponds to the row number), starts at 0.
    #[serde(skip)]
    pub ordinal: usize,

    /// The line number in the input in which this sample was defined.
    #[serde(skip)]
    pub line_number: Option<usize>,
}

impl SampleMetadata {
    /// Create a new [`SampleMetadata`] object.
    ///
    /// # Errors
    ///
    /// - [`SampleListError::EmptySampleId`] if the identifier is empty
    /// - [`SampleListError::ReservedSampleId`] if the identifier is the unmatched output name
    pub fn new(
        sample_id: String,
        ordinal: usize,
        line_number: usize,
    ) -> Result<Self, SampleListError> {
        Self::validate_id(&sample_id, Some(line_number))?;
        Ok(Self { sample_id, ordinal, line_number: Some(line_number) })
    }

    /// Run a set of validations on a single identifier to ensure that it is well formed.
    pub fn validate_id(sample_id: &str, line_number: Option<usize>) -> Result<(), SampleListError> {
        if sample_id.is_empty() {
            Err(SampleListError::EmptySampleId { line: ErrorLine(line_number) })
        } else if sample_id == UNMATCHED_NAME {
            Err(SampleListError::ReservedSampleId {
                id: sample_id.to_owned(),
                line: ErrorLine(line_number),
            })
        } else {
            Ok(())
        }
    }
}

/// Validates a collection of [`SampleMetadata`] objects: each identifier must be well formed and
/// no identifier may occur twice.
///
/// An empty collection is allowed; every record then routes to the unmatched output.
pub fn validate_samples(samples: &[SampleMetadata]) -> Result<(), SampleListError> {
    let mut ids = AHashSet::with_capacity(samples.len());
    for sample in samples {
        SampleMetadata::validate_id(&sample.sample_id, sample.line_number)?;
        if !ids.insert(sample.sample_id.as_str()) {
            return Err(SampleListError::DuplicateSampleId { id: sample.sample_id.clone() });
        }
    }
    Ok(())
}

/// Read and validate the sample list from a headered CSV file.
///
/// Blank lines are skipped. Ordinals are assigned in row order.
pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<SampleMetadata>, SampleListError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(b',')
        .trim(csv::Trim::All)
        .from_path(path.as_ref())?;

    let mut samples = Vec::new();
    for (row, record) in reader.deserialize::<SampleMetadata>().enumerate() {
        let mut sample = record?;
        sample.ordinal = samples.len();
        // Header occupies line 1; blank lines are not counted.
        sample.line_number = Some(row + 2);
        samples.push(sample);
    }
    validate_samples(&samples)?;
    Ok(samples)
}
