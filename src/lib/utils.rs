//! Small helpers shared across the crate.

/// Buffer size for reading the input and writing the per-sample outputs.
pub const BUFSIZE: usize = 64 * 1024;

/// Build the file name for a per-sample output: `<prefix><sample_id><suffix>`.
pub fn output_filename(prefix: &str, sample_id: &str, suffix: &str) -> String {
    format!("{}{}{}", prefix, sample_id, suffix)
}

#[cfg(test)]
pub mod test_commons {
    use std::{
        fs::File,
        io::{BufReader, Write},
        path::Path,
    };

    use flate2::{write::GzEncoder, Compression};
    use seq_io::fastq::{OwnedRecord, Reader, Record};

    /// Build an [`OwnedRecord`] with the given read name and bases.
    pub fn fq(name: &str, bases: &[u8]) -> OwnedRecord {
        OwnedRecord {
            head: name.as_bytes().to_vec(),
            seq: bases.to_vec(),
            qual: vec![b'I'; bases.len()],
        }
    }

    /// Write reads to a gzip-compressed FASTQ file, returning the number written.
    pub fn write_gzipped_reads(reads: &[OwnedRecord], path: impl AsRef<Path>) -> usize {
        let mut writer =
            GzEncoder::new(File::create(path.as_ref()).unwrap(), Compression::new(3));
        for read in reads {
            read.write(&mut writer).unwrap();
        }
        writer.finish().unwrap();
        reads.len()
    }

    /// Assert that two collections of reads are identical, field by field.
    pub fn assert_reads_eq(actual: &[OwnedRecord], expected: &[OwnedRecord]) {
        assert_eq!(actual.len(), expected.len(), "differing number of reads");
        for (a, e) in actual.iter().zip(expected.iter()) {
            assert_eq!(a.head, e.head);
            assert_eq!(a.seq, e.seq);
            assert_eq!(a.qual, e.qual);
        }
    }

    /// Slurp all records out of a plain-text FASTQ file.
    pub fn slurp_fastq(path: impl AsRef<Path>) -> Vec<OwnedRecord> {
        let file = File::open(path.as_ref())
            .unwrap_or_else(|_| panic!("Unable to open {:?}", path.as_ref()));
        let mut reader = Reader::new(BufReader::new(file));
        let mut records = Vec::new();
        while let Some(record) = reader.next() {
            records.push(record.unwrap().to_owned_record());
        }
        records
    }
}
