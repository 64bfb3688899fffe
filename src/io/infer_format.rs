use std::fmt::Display;
use std::fs;
use std::io::{self, prelude::*, BufReader, SeekFrom};
use std::path;

use flate2::bufread::GzDecoder;

use super::compression::{buffered_reader, is_gzipped, is_gzipped_extension};
use super::mgf::is_mgf;
use super::msp::is_msp;
use super::SpectrumFileError;

/// How many leading bytes are sniffed when the extension does not give the format away
const SNIFF_LENGTH: u64 = 4096;

/// Spectral library file formats that [`fraghub`](crate) reads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpectralFormat {
    MSP,
    MGF,
    JSON,
    Unknown,
}

impl SpectralFormat {
    /// The label used for this format's parsing stage
    pub fn stage_prefix(&self) -> &'static str {
        match self {
            Self::MSP => "Parsing MSP spectrums:",
            Self::MGF => "Parsing MGF spectrums:",
            Self::JSON => "Parsing JSON spectrums:",
            Self::Unknown => "Parsing spectrums:",
        }
    }
}

impl Display for SpectralFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Given a path, infer the file format and whether or not the file at that path is
/// GZIP compressed
pub fn infer_from_path<P: Into<path::PathBuf>>(path: P) -> (SpectralFormat, bool) {
    let path: path::PathBuf = path.into();
    let (is_gzipped, path) = is_gzipped_extension(path);
    let form = match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .as_deref()
    {
        Some("msp") => SpectralFormat::MSP,
        Some("mgf") => SpectralFormat::MGF,
        Some("json") => SpectralFormat::JSON,
        _ => SpectralFormat::Unknown,
    };
    (form, is_gzipped)
}

/// Check whether a buffer looks like the start of a JSON document
pub fn is_json(buf: &[u8]) -> bool {
    matches!(
        buf.iter().find(|b| !b.is_ascii_whitespace()),
        Some(b'{') | Some(b'[')
    )
}

/// Infer the format of a decompressed buffer from its content
pub fn infer_from_bytes(buf: &[u8]) -> SpectralFormat {
    if is_json(buf) {
        SpectralFormat::JSON
    } else if is_mgf(buf) {
        SpectralFormat::MGF
    } else if is_msp(buf) {
        SpectralFormat::MSP
    } else {
        SpectralFormat::Unknown
    }
}

/// Given a stream of bytes, infer the file format and whether or not the
/// stream is GZIP compressed. This assumes the stream is seekable.
pub fn infer_from_stream<R: Read + Seek>(stream: &mut R) -> io::Result<(SpectralFormat, bool)> {
    let current_pos = stream.stream_position()?;
    let mut buf = Vec::new();
    stream.by_ref().take(SNIFF_LENGTH).read_to_end(&mut buf)?;
    let is_stream_gzipped = is_gzipped(&buf);
    if is_stream_gzipped {
        stream.seek(SeekFrom::Start(current_pos))?;
        buf.clear();
        GzDecoder::new(BufReader::new(stream.by_ref()))
            .take(SNIFF_LENGTH)
            .read_to_end(&mut buf)?;
    }
    stream.seek(SeekFrom::Start(current_pos))?;
    Ok((infer_from_bytes(&buf), is_stream_gzipped))
}

/// Given a path, infer the file format and whether or not the file at that path is
/// GZIP compressed, using both the file name and by trying to open and read the file
/// header
pub fn infer_format<P: Into<path::PathBuf>>(path: P) -> io::Result<(SpectralFormat, bool)> {
    let path: path::PathBuf = path.into();

    let (format, is_gzipped) = infer_from_path(&path);
    match format {
        SpectralFormat::Unknown => {
            let mut handle = fs::File::open(path)?;
            infer_from_stream(&mut handle)
        }
        _ => Ok((format, is_gzipped)),
    }
}

/// Given a local file system path, infer the file format, and open it for reading,
/// decompressing it if needed
pub fn open_file<P: Into<path::PathBuf>>(
    path: P,
) -> Result<(SpectralFormat, Box<dyn BufRead + Send>), SpectrumFileError> {
    let path = path.into();
    let (format, is_gzipped) = infer_format(path.clone())?;
    if format == SpectralFormat::Unknown {
        return Err(SpectrumFileError::UnknownFormat(path));
    }
    let handle = fs::File::open(&path)?;
    Ok((format, buffered_reader(handle, is_gzipped)))
}
