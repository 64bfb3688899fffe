//! Reading NIST-style MSP spectral libraries.
//!
//! Records are separated by blank lines and written as `key: value` lines followed by
//! one `mz intensity` pair per line.
use std::fs;
use std::io::{self, prelude::*};
use std::path::Path;

use lazy_static::lazy_static;
use log::warn;
use regex::bytes::Regex;

use crate::record::RawRecord;

use super::block::{BlockDelimiter, BlockLayout, BlockReader};

lazy_static! {
    static ref MSP_HEADER: Regex = Regex::new(r"(?im)^\s*(?:name|synon|precursormz|num peaks)\s*:").unwrap();
}

/// Check whether a buffer looks like the start of an MSP file
pub fn is_msp(buf: &[u8]) -> bool {
    MSP_HEADER.is_match(buf)
}

/// Parse one MSP record block
pub fn parse_msp_block(block: &str) -> Option<RawRecord> {
    BlockLayout::MSP.parse_block(block)
}

/// An iterator over the [`RawRecord`]s of an MSP file. Blocks that do not hold a
/// spectrum are skipped.
pub struct MSPReader<R: io::Read> {
    blocks: BlockReader<io::BufReader<R>>,
    /// The number of blocks read that did not produce a record
    pub skipped: usize,
}

impl<R: io::Read> MSPReader<R> {
    /// Create a new MSP reader over `file`
    pub fn new(file: R) -> MSPReader<R> {
        let handle = io::BufReader::new(file);
        MSPReader {
            blocks: BlockReader::new(handle, BlockDelimiter::BlankLine),
            skipped: 0,
        }
    }

    /// Read the next record from the file, if there is one
    pub fn read_next(&mut self) -> Option<RawRecord> {
        loop {
            match self.blocks.read_block() {
                Ok(Some(block)) => match parse_msp_block(&block) {
                    Some(record) => return Some(record),
                    None => self.skipped += 1,
                },
                Ok(None) => return None,
                Err(err) => {
                    warn!("An error was encountered while reading MSP: {err}");
                    return None;
                }
            }
        }
    }

    /// Split the rest of the file into unparsed record blocks
    pub fn read_blocks(&mut self) -> io::Result<Vec<String>> {
        self.blocks.read_all()
    }
}

impl MSPReader<fs::File> {
    pub fn open_path<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        Ok(Self::new(fs::File::open(path)?))
    }
}

impl<R: io::Read> Iterator for MSPReader<R> {
    type Item = RawRecord;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_next()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_reader() {
        let reader = MSPReader::open_path("./test/data/small.msp").unwrap();
        let records: Vec<_> = reader.collect();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].get("Name"), Some("Caffeine"));
        assert_eq!(records[0].peaks.len(), 4);
        assert_eq!(records[2].get("collision_energy"), Some("35"));
    }

    #[test]
    fn test_skips_blocks_without_peaks() {
        let text = b"NAME: a\n50 1\n\nNAME: no peaks\n\nNAME: b\n60 2\n";
        let mut reader = MSPReader::new(&text[..]);
        let names: Vec<_> = reader
            .by_ref()
            .map(|r| r.get("NAME").unwrap_or_default().to_string())
            .collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(reader.skipped, 1);
    }

    #[test]
    fn test_is_msp() {
        assert!(is_msp(b"Name: Caffeine\nNum Peaks: 1\n"));
        assert!(!is_msp(b"BEGIN IONS\nTITLE=x\n"));
    }
}
