//! Reading Mascot Generic Format (MGF) files.
//!
//! Records are enclosed in `BEGIN IONS`/`END IONS` and written as `KEY=value` lines
//! followed by peak lines. Files without the markers fall back to blank line separation.
use std::fs;
use std::io::{self, prelude::*};
use std::path::Path;

use log::warn;

use crate::record::RawRecord;

use super::block::{BlockDelimiter, BlockLayout, BlockReader};

/// Check whether a buffer contains an MGF record marker
pub fn is_mgf(buf: &[u8]) -> bool {
    let needle = b"BEGIN IONS";
    buf.windows(needle.len()).any(|window| window == needle)
}

/// Parse the body of one MGF record
pub fn parse_mgf_block(block: &str) -> Option<RawRecord> {
    BlockLayout::MGF.parse_block(block)
}

/// An iterator over the [`RawRecord`]s of an MGF file. Blocks that do not hold a
/// spectrum are skipped.
pub struct MGFReader<R: io::Read> {
    blocks: BlockReader<io::BufReader<R>>,
    /// The number of blocks read that did not produce a record
    pub skipped: usize,
}

impl<R: io::Read> MGFReader<R> {
    /// Create a new MGF reader over `file`
    pub fn new(file: R) -> MGFReader<R> {
        let handle = io::BufReader::new(file);
        MGFReader {
            blocks: BlockReader::new(handle, BlockDelimiter::Ions),
            skipped: 0,
        }
    }

    /// Read the next record from the file, if there is one
    pub fn read_next(&mut self) -> Option<RawRecord> {
        loop {
            match self.blocks.read_block() {
                Ok(Some(block)) => match parse_mgf_block(&block) {
                    Some(record) => return Some(record),
                    None => self.skipped += 1,
                },
                Ok(None) => return None,
                Err(err) => {
                    warn!("An error was encountered while reading MGF: {err}");
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

impl MGFReader<fs::File> {
    pub fn open_path<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        Ok(Self::new(fs::File::open(path)?))
    }
}

impl<R: io::Read> Iterator for MGFReader<R> {
    type Item = RawRecord;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_next()
    }
}
