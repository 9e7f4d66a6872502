use std::{fs::File, io::BufWriter, path::PathBuf};

use anyhow::{ensure, Context, Result};
use clap::Parser;
use env_logger::Env;
use fgoxide::io::DelimFile;
use itertools::Itertools;
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::{
    counts::CountTable,
    demux::Demultiplexer,
    matcher::{DelimitedIdMatcher, UNMATCHED_NAME},
    record_source::RecordSource,
    sample_list::{self, SampleMetadata},
    utils::{output_filename, BUFSIZE},
};

pub static TOOL_NAME: &str = "iddemux";

static SHORT_USAGE: &str =
    "Splits a pooled gzip-compressed FASTQ into per-sample FASTQs by embedded sample ID.";

static LONG_USAGE: &str = "
Splits a pooled gzip-compressed FASTQ into per-sample FASTQs by embedded sample ID.

Each read whose header contains a sample's identifier bracketed by the delimiter character
(e.g. `_Sample1_` with the default delimiter) is written to that sample's output file; reads
matching no sample are written to the `unmatched` output.  When a header contains more than one
sample's identifier the sample listed first in the sample list wins.

The output directory specified with --output-dir must exist.  One plain-text FASTQ per sample
plus the unmatched file will be written there, along with a `demux_counts.tsv` summary of how
many reads were assigned to each sample.

The sample list must be a CSV file with headers.  The `Sample_ID` column must contain a unique,
non-empty identifier for each sample.

Example invocation:

iddemux \\
  --fastq pooled.fastq.gz \\
  --sample-metadata samples.csv \\
  --output-dir demuxed-fastqs/
";

/// The name of the per-sample count summary written to the output directory.
pub const COUNTS_FILE_NAME: &str = "demux_counts.tsv";

#[derive(Parser, Debug)]
#[clap(name = TOOL_NAME, version, about = SHORT_USAGE, long_about = LONG_USAGE, term_width = 0)]
pub struct Opts {
    /// Path to the pooled gzip-compressed input FASTQ.
    #[clap(long, short = 'f', display_order = 1)]
    pub fastq: PathBuf,

    /// Path to the sample list CSV.
    #[clap(long, short = 's', display_order = 2)]
    pub sample_metadata: PathBuf,

    /// The directory to write outputs, the directory must exist.
    ///
    /// This tool will overwrite existing files.
    #[clap(long, short = 'o', display_order = 3)]
    pub output_dir: PathBuf,

    /// Prefix prepended to each output file name.
    #[clap(long, short = 'p', default_value = "", display_order = 11)]
    pub file_prefix: String,

    /// Suffix appended to each output file name.
    #[clap(long, short = 'x', default_value = ".fastq", display_order = 11)]
    pub file_suffix: String,

    /// The character bounding sample identifiers in read headers.
    #[clap(long, short = 'd', default_value = "_", display_order = 11)]
    pub delimiter: char,
}

/// Implement defaults that match the CLI options to allow for easier testing.
///
/// Note that these defaults exist only within test code.
#[cfg(test)]
impl Default for Opts {
    fn default() -> Self {
        Self {
            fastq: PathBuf::default(),
            sample_metadata: PathBuf::default(),
            output_dir: PathBuf::default(),
            file_prefix: String::new(),
            file_suffix: String::from(".fastq"),
            delimiter: crate::matcher::DEFAULT_DELIMITER as char,
        }
    }
}

/// One row of the per-sample count summary.
#[derive(Debug, Serialize, Deserialize)]
struct SampleCount {
    sample_id: String,
    records: u64,
}

/// Write the count summary to `demux_counts.tsv`, one row per sample in sample list order with
/// the unmatched row last.
fn write_counts(
    counts: &CountTable,
    samples: &[SampleMetadata],
    output_dir: &std::path::Path,
) -> Result<()> {
    let mut rows = Vec::with_capacity(samples.len() + 1);
    for sample in samples {
        rows.push(SampleCount {
            sample_id: sample.sample_id.clone(),
            records: counts.get(&sample.sample_id).unwrap_or(0),
        });
    }
    rows.push(SampleCount {
        sample_id: UNMATCHED_NAME.to_string(),
        records: counts.get(UNMATCHED_NAME).unwrap_or(0),
    });

    let output_path = output_dir.join(COUNTS_FILE_NAME);
    let delim = DelimFile::default();
    delim
        .write_tsv(&output_path, rows)
        .with_context(|| format!("Failed to write {}", output_path.to_string_lossy()))?;
    Ok(())
}

/// Run demultiplexing.
pub fn run(opts: Opts) -> Result<(), anyhow::Error> {
    // Preflight checks
    ensure!(
        opts.output_dir.exists(),
        "Output directory does not exist: {}",
        &opts.output_dir.to_string_lossy()
    );
    ensure!(
        opts.delimiter.is_ascii(),
        "Delimiter must be a single ASCII character, found: {}",
        opts.delimiter
    );

    let samples = sample_list::from_path(&opts.sample_metadata).with_context(|| {
        format!("Failed to load sample list: {}", opts.sample_metadata.to_string_lossy())
    })?;
    if samples.is_empty() {
        warn!("Sample list is empty; every read will be routed to the unmatched output");
    } else {
        info!(
            "Loaded {} samples: {}",
            samples.len(),
            samples.iter().map(|s| s.sample_id.as_str()).join(", ")
        );
    }

    let source = RecordSource::from_path(&opts.fastq)?;
    let matcher = DelimitedIdMatcher::new(&samples, opts.delimiter as u8);
    let demuxer = Demultiplexer::new(&samples, matcher);

    info!("Demultiplexing {}", opts.fastq.to_string_lossy());
    let counts = demuxer.demultiplex(source, |name| {
        let path = opts.output_dir.join(output_filename(&opts.file_prefix, name, &opts.file_suffix));
        File::create(path).map(|f| BufWriter::with_capacity(BUFSIZE, f))
    })?;

    info!(
        "Processed {} records, {} unmatched",
        counts.total(),
        counts.get(UNMATCHED_NAME).unwrap_or(0)
    );

    info!("Writing counts");
    write_counts(&counts, &samples, &opts.output_dir)?;

    Ok(())
}

/// Parse args and set up logging / tracing
pub fn setup() -> Opts {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info");
    }
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    Opts::parse()
}
