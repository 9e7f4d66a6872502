//! Streaming access to the pooled, gzip-compressed input FASTQ.
//!
//! The input is read once, front to back, one record at a time; no record is buffered beyond
//! the one currently in flight. Decompression is layered over a buffered file handle so the
//! caller only ever sees parsed records.

use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use flate2::read::MultiGzDecoder;
use seq_io::fastq::{self, OwnedRecord};

use crate::demux::DemuxError;
use crate::utils::BUFSIZE;

/// An iterator over the records of a gzip-compressed FASTQ file.
pub struct RecordSource {
    reader: fastq::Reader<MultiGzDecoder<BufReader<File>>>,
    path: PathBuf,
    records_read: u64,
}

impl RecordSource {
    /// Open the FASTQ file at `path` for streaming.
    ///
    /// # Errors
    ///
    /// - [`DemuxError::InputOpen`] if the file cannot be opened
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, DemuxError> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path)
            .map_err(|source| DemuxError::InputOpen { path: path.clone(), source })?;
        let decoder = MultiGzDecoder::new(BufReader::with_capacity(BUFSIZE, file));
        Ok(Self { reader: fastq::Reader::new(decoder), path, records_read: 0 })
    }

    /// The path this source is reading from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The number of records successfully yielded so far.
    pub fn records_read(&self) -> u64 {
        self.records_read
    }
}

impl Iterator for RecordSource {
    type Item = Result<OwnedRecord, DemuxError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.reader.next() {
            None => None,
            Some(Ok(record)) => {
                self.records_read += 1;
                Some(Ok(record.to_owned_record()))
            }
            Some(Err(source)) => Some(Err(DemuxError::InputStream {
                record_number: self.records_read + 1,
                source,
            })),
        }
    }
}

#[cfg(test)]
mod test {
    use std::{fs::File, io::Write};

    use flate2::{write::GzEncoder, Compression};
    use matches::assert_matches;
    use tempfile::tempdir;

    use super::RecordSource;
    use crate::demux::DemuxError;
    use crate::utils::test_commons::{assert_reads_eq, fq, write_gzipped_reads};

    #[test]
    fn test_reads_all_records_in_order() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("input.fastq.gz");
        let reads = vec![fq("readA_S1_x", b"ACGT"), fq("readB_S2_x", b"GGCC"), fq("readC", b"TTAA")];
        write_gzipped_reads(&reads, &path);

        let source = RecordSource::from_path(&path).unwrap();
        let records: Vec<_> = source.map(Result::unwrap).collect();
        assert_reads_eq(&records, &reads);
    }

    #[test]
    fn test_empty_input_yields_no_records() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.fastq.gz");
        write_gzipped_reads(&[], &path);

        let mut source = RecordSource::from_path(&path).unwrap();
        assert!(source.next().is_none());
        assert_eq!(source.records_read(), 0);
    }

    #[test]
    fn test_missing_file_is_an_open_error() {
        let dir = tempdir().unwrap();
        let result = RecordSource::from_path(dir.path().join("does_not_exist.fastq.gz"));
        assert_matches!(result.err(), Some(DemuxError::InputOpen { .. }));
    }

    #[test]
    fn test_malformed_record_is_a_stream_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("malformed.fastq.gz");
        let mut writer = GzEncoder::new(File::create(&path).unwrap(), Compression::new(3));
        // A valid record followed by one that does not start with '@'.
        writer.write_all(b"@readA_S1_x\nACGT\n+\nIIII\nnot-a-record\n").unwrap();
        writer.finish().unwrap();

        let mut source = RecordSource::from_path(&path).unwrap();
        let first = source.next().unwrap().unwrap();
        assert_eq!(first.head, b"readA_S1_x".to_vec());

        let second = source.next().unwrap();
        assert_matches!(second, Err(DemuxError::InputStream { record_number: 2, .. }));
    }

    #[test]
    fn test_truncated_record_is_a_stream_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("truncated.fastq.gz");
        let mut writer = GzEncoder::new(File::create(&path).unwrap(), Compression::new(3));
        writer.write_all(b"@readA_S1_x\nACGT\n+\n").unwrap();
        writer.finish().unwrap();

        let mut source = RecordSource::from_path(&path).unwrap();
        let result = source.next().unwrap();
        assert_matches!(result, Err(DemuxError::InputStream { record_number: 1, .. }));
    }
}
