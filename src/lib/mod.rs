//! A library for demultiplexing a pooled FASTQ file on header-embedded sample identifiers.
//!
//! # Overview
//!
//! The flow of data is as follows:
//!
//! - The [`record_source::RecordSource`] decompresses the gzipped input and yields one owned
//!   FASTQ record at a time.
//! - The [`matcher::DelimitedIdMatcher`] scans each record header for the first sample whose
//!   delimiter-bounded identifier occurs in it.
//! - The [`sample_writer::SampleWriters`] own one output destination per sample plus an
//!   `unmatched` destination, opened up front and appended to for the life of the run.
//! - The [`counts::CountTable`] tallies one count per record and is returned to the caller by
//!   the [`demux::Demultiplexer`] once every destination has been finalized.
#![deny(unsafe_code)]
#![allow(
    clippy::must_use_candidate,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc,
    clippy::module_name_repetitions
)]
pub mod counts;
pub mod demux;
pub mod matcher;
pub mod record_source;
pub mod run;
pub mod sample_list;
pub mod sample_writer;
pub mod utils;
