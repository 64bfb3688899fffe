//! Reading spectral library files into [`RawRecord`]s.
use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::record::RawRecord;

pub mod block;
pub(crate) mod compression;
mod infer_format;
#[cfg(feature = "json")]
pub mod json;
pub mod mgf;
pub mod msp;

pub use crate::io::block::{BlockDelimiter, BlockLayout, BlockReader};
pub use crate::io::compression::{is_gzipped, is_gzipped_extension};
pub use crate::io::infer_format::{
    infer_format, infer_from_bytes, infer_from_path, infer_from_stream, is_json, open_file,
    SpectralFormat,
};
#[cfg(feature = "json")]
pub use crate::io::json::{read_json_records, read_json_values, JSONRecordParser};
pub use crate::io::mgf::{is_mgf, MGFReader};
pub use crate::io::msp::{is_msp, MSPReader};

/// A parser that turns one unit of input, a text block or a JSON object, into at most one
/// record. `None` means the input does not hold a spectrum, which is not an error.
pub trait RecordParser {
    type Input: ?Sized;

    fn parse(&self, input: &Self::Input) -> Option<RawRecord>;
}

/// File-level failures. Malformed records never raise these; they are skipped.
#[derive(Debug, Error)]
pub enum SpectrumFileError {
    #[error("Encountered an IO error: {0}")]
    IOError(
        #[from]
        #[source]
        io::Error,
    ),
    #[cfg(feature = "json")]
    #[error("Failed to read JSON: {0}")]
    JSONError(
        #[from]
        #[source]
        serde_json::Error,
    ),
    #[error("Could not determine the spectral format of {0}")]
    UnknownFormat(PathBuf),
    #[error("Support for the {0} format was not enabled")]
    UnsupportedFormat(SpectralFormat),
}
