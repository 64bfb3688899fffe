//! The metadata/peak block layout shared by MSP and MGF.
//!
//! Both formats write a spectrum as a run of `key<sep>value` lines followed by one peak per
//! line. They differ only in the separator (`:` for MSP, `=` for MGF) and in how records are
//! delimited in a file (blank lines for MSP, `BEGIN IONS`/`END IONS` for MGF).
use std::collections::VecDeque;
use std::io::{self, prelude::*};

use log::{debug, warn};

use crate::patterns;
use crate::record::{Peak, PeakList, RawRecord};

use super::RecordParser;

/// How the lines of one block are read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockLayout {
    pub separator: char,
}

impl BlockLayout {
    pub const MSP: BlockLayout = BlockLayout { separator: ':' };
    pub const MGF: BlockLayout = BlockLayout { separator: '=' };

    pub const fn new(separator: char) -> Self {
        Self { separator }
    }

    fn is_metadata_line(&self, line: &str) -> bool {
        !patterns::is_peak_line(line) && patterns::metadata_line(line, self.separator).is_some()
    }

    /// Add one metadata line to `record`, decomposing comment fields that embed
    /// `sub=field` pairs
    fn add_metadata(&self, record: &mut RawRecord, line: &str) {
        let Some((key, value)) = patterns::metadata_line(line, self.separator) else {
            return;
        };
        let key = patterns::clean_field_name(key);
        if patterns::is_comment_field(key) {
            let sub_fields = patterns::comment_sub_fields(value);
            if !sub_fields.is_empty() {
                for (sub_key, sub_value) in sub_fields {
                    let sub_key = patterns::clean_field_name(&sub_key);
                    if !sub_key.is_empty() {
                        record.add_field(sub_key, patterns::strip_value_quotes(&sub_value));
                    }
                }
                return;
            }
        }
        record.add_field(key, patterns::strip_value_quotes(value));
    }

    /**
    Split one block into a [`RawRecord`].

    The metadata region runs up to and including the last metadata-shaped line, and every
    peak-shaped line after it becomes a peak. Other lines in the peak region, like MGF's
    `END IONS` or stray annotations, are ignored. A block without a single valid peak is
    not a spectrum and yields `None`.
    */
    pub fn parse_block(&self, block: &str) -> Option<RawRecord> {
        let lines: Vec<&str> = block.lines().map(|l| l.trim_end_matches('\r')).collect();
        let peaks_start = lines
            .iter()
            .rposition(|line| self.is_metadata_line(line))
            .map(|i| i + 1)
            .unwrap_or_default();

        let peaks: PeakList = lines[peaks_start..]
            .iter()
            .filter_map(|line| patterns::peak_pair(line))
            .filter_map(|(mz, intensity)| {
                let peak = Peak::checked(mz, intensity);
                if peak.is_none() {
                    warn!("Dropping invalid peak ({mz}, {intensity})");
                }
                peak
            })
            .collect();
        if peaks.is_empty() {
            return None;
        }

        let mut record = RawRecord::new(Default::default(), peaks);
        for line in lines[..peaks_start].iter() {
            self.add_metadata(&mut record, line);
        }
        Some(record)
    }
}

impl RecordParser for BlockLayout {
    type Input = str;

    fn parse(&self, input: &str) -> Option<RawRecord> {
        self.parse_block(input)
    }
}

/// How records are delimited within a file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockDelimiter {
    /// Records are separated by one or more blank lines
    BlankLine,
    /// Records are enclosed in `BEGIN IONS` and `END IONS`. Text before the first
    /// `BEGIN IONS`, like a global header, is dropped. A file with no markers at all is
    /// split on blank lines instead.
    Ions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockReaderState {
    Start,
    Block,
    Between,
    Done,
}

/// Splits a text stream into record blocks without parsing them
#[derive(Debug)]
pub struct BlockReader<R: BufRead> {
    handle: R,
    delimiter: BlockDelimiter,
    state: BlockReaderState,
    line: String,
    /// Blank line separated blocks seen before any `BEGIN IONS`, held back until it is
    /// known whether the stream has markers
    pending: VecDeque<String>,
}

impl<R: BufRead> BlockReader<R> {
    pub fn new(handle: R, delimiter: BlockDelimiter) -> Self {
        Self {
            handle,
            delimiter,
            state: BlockReaderState::Start,
            line: String::new(),
            pending: VecDeque::new(),
        }
    }

    fn holds_back(&self) -> bool {
        self.delimiter == BlockDelimiter::Ions && self.state == BlockReaderState::Start
    }

    /// Read the next block, or `None` at the end of the stream
    pub fn read_block(&mut self) -> io::Result<Option<String>> {
        let mut block = String::new();
        while self.state != BlockReaderState::Done {
            self.line.clear();
            if self.handle.read_line(&mut self.line)? == 0 {
                if self.holds_back() && !block.is_empty() {
                    self.pending.push_back(std::mem::take(&mut block));
                }
                self.state = BlockReaderState::Done;
                break;
            }
            let line = self.line.trim();
            match (self.delimiter, self.state) {
                (BlockDelimiter::Ions, _) if line == "BEGIN IONS" => {
                    if self.state == BlockReaderState::Start
                        && (!self.pending.is_empty() || !block.is_empty())
                    {
                        debug!(
                            "Dropping {} header block(s) before the first BEGIN IONS",
                            self.pending.len() + usize::from(!block.is_empty())
                        );
                        self.pending.clear();
                    }
                    self.state = BlockReaderState::Block;
                    block.clear();
                }
                (BlockDelimiter::Ions, BlockReaderState::Block) if line == "END IONS" => {
                    self.state = BlockReaderState::Between;
                    return Ok(Some(block));
                }
                (BlockDelimiter::Ions, BlockReaderState::Between) => {}
                (BlockDelimiter::Ions, BlockReaderState::Block) => {
                    if !line.is_empty() {
                        block.push_str(line);
                        block.push('\n');
                    }
                }
                (_, _) => {
                    if line.is_empty() {
                        if block.is_empty() {
                            continue;
                        }
                        if self.holds_back() {
                            self.pending.push_back(std::mem::take(&mut block));
                        } else {
                            return Ok(Some(block));
                        }
                    } else {
                        block.push_str(line);
                        block.push('\n');
                    }
                }
            }
        }
        if let Some(held) = self.pending.pop_front() {
            return Ok(Some(held));
        }
        if block.is_empty() {
            Ok(None)
        } else {
            Ok(Some(block))
        }
    }

    /// Read every remaining block
    pub fn read_all(&mut self) -> io::Result<Vec<String>> {
        let mut blocks = Vec::new();
        while let Some(block) = self.read_block()? {
            blocks.push(block);
        }
        Ok(blocks)
    }

    pub fn into_inner(self) -> R {
        self.handle
    }
}

impl<R: BufRead> Iterator for BlockReader<R> {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_block().transpose()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_msp_block() {
        let record = BlockLayout::MSP
            .parse_block("NAME: Test\nPRECURSORMZ: 100.0\n50.0 10\n150.0 20\n")
            .unwrap();
        assert_eq!(record.get("NAME"), Some("Test"));
        assert_eq!(record.get("PRECURSORMZ"), Some("100.0"));
        assert_eq!(record.peaks, vec![Peak::new(50.0, 10.0), Peak::new(150.0, 20.0)]);
    }

    #[test]
    fn test_peak_annotations_and_bad_peaks() {
        let record = BlockLayout::MSP
            .parse_block(
                "Name: X\nNum Peaks: 3\n50.0 10 \"b2\"\n60,5\t20\nnot a peak\n70.0 -5\n80.0:40\n",
            )
            .unwrap();
        assert_eq!(
            record.peaks,
            vec![Peak::new(50.0, 10.0), Peak::new(60.5, 20.0), Peak::new(80.0, 40.0)]
        );
    }

    #[test]
    fn test_no_peaks_is_not_a_record() {
        assert!(BlockLayout::MSP.parse_block("NAME: Test\nCOMMENT: none\n").is_none());
        assert!(BlockLayout::MSP
            .parse_block("NAME: Test\n50.0 10\nSMILES: CCO\n")
            .is_none());
        assert!(BlockLayout::MGF.parse_block("").is_none());
    }

    #[test]
    fn test_comment_decomposition() {
        let record = BlockLayout::MSP
            .parse_block("Name: A\nComment: collision_energy=30; note=\"hi there\"\n50 1\n")
            .unwrap();
        assert_eq!(record.get("collision_energy"), Some("30"));
        assert_eq!(record.get("note"), Some("hi there"));
        assert_eq!(record.get("Comment"), None);

        let record = BlockLayout::MSP
            .parse_block("Name: A\nComments: acquired on a Tuesday\n50 1\n")
            .unwrap();
        assert_eq!(record.get("Comments"), Some("acquired on a Tuesday"));
    }

    #[test]
    fn test_mgf_block() {
        let record = BlockLayout::MGF
            .parse_block("TITLE=\"Scan 5\"\nPEPMASS=445.12 12000\nCHARGE=1+\n100.5 20\n200.25 1e3\n")
            .unwrap();
        assert_eq!(record.get("TITLE"), Some("Scan 5"));
        assert_eq!(record.get("PEPMASS"), Some("445.12 12000"));
        assert_eq!(record.peaks.len(), 2);
        assert_eq!(record.peaks[1], Peak::new(200.25, 1000.0));
    }

    #[test]
    fn test_blank_line_blocks() {
        let text = "NAME: a\n1 1\n\n\n\nNAME: b\n2 2\n\n";
        let blocks = BlockReader::new(text.as_bytes(), BlockDelimiter::BlankLine)
            .read_all()
            .unwrap();
        assert_eq!(blocks, vec!["NAME: a\n1 1\n", "NAME: b\n2 2\n"]);
    }

    #[test]
    fn test_ions_blocks() {
        let text = "COM=header\n\nBEGIN IONS\nTITLE=a\n\n1 1\nEND IONS\njunk\nBEGIN IONS\nTITLE=b\n2 2\nEND IONS\n";
        let blocks = BlockReader::new(text.as_bytes(), BlockDelimiter::Ions)
            .read_all()
            .unwrap();
        assert_eq!(blocks, vec!["TITLE=a\n1 1\n", "TITLE=b\n2 2\n"]);

        // A header that is itself split by blank lines is dropped too
        let text = "COM=header\n\nCHARSET=utf-8\n\nBEGIN IONS\nTITLE=a\n1 1\nEND IONS\n";
        let blocks = BlockReader::new(text.as_bytes(), BlockDelimiter::Ions)
            .read_all()
            .unwrap();
        assert_eq!(blocks, vec!["TITLE=a\n1 1\n"]);

        let text = "TITLE=a\n1 1\n\nTITLE=b\n2 2\n";
        let blocks = BlockReader::new(text.as_bytes(), BlockDelimiter::Ions)
            .read_all()
            .unwrap();
        assert_eq!(blocks, vec!["TITLE=a\n1 1\n", "TITLE=b\n2 2\n"]);
    }
}
