use std::io::{self, prelude::*};
use std::path::{Path, PathBuf};

use flate2::bufread::GzDecoder;

/// Check for the GZIP magic bytes
pub fn is_gzipped(header: &[u8]) -> bool {
    header.starts_with(b"\x1f\x8b")
}

/// Check whether a path ends in `.gz`, returning the path with that extension removed
pub fn is_gzipped_extension<P: AsRef<Path>>(path: P) -> (bool, PathBuf) {
    let path = path.as_ref();
    match path.extension() {
        Some(ext) if ext.eq_ignore_ascii_case("gz") => (true, path.with_extension("")),
        _ => (false, path.to_path_buf()),
    }
}

/// Wrap `handle` in a buffered reader, decompressing it on the fly if `gzipped`
pub fn buffered_reader<R: Read + Send + 'static>(
    handle: R,
    gzipped: bool,
) -> Box<dyn BufRead + Send> {
    let handle = io::BufReader::new(handle);
    if gzipped {
        Box::new(io::BufReader::new(GzDecoder::new(handle)))
    } else {
        Box::new(handle)
    }
}
