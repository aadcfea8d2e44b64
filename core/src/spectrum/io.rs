//! Utilities for reading and writing spectra.
//!
//! Spectra are stored as plain text, see [`text`], optionally gzip-compressed.

use std::path::Path;

use crate::{Error, Spectrum};

pub mod read;
pub mod text;
pub mod write;

/// Supported compression of spectrum files.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Compression {
    /// Uncompressed.
    #[default]
    Plain,
    /// Gzip-compressed.
    Gzip,
}

impl Compression {
    const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

    /// Returns the compression implied by the file extension, gzip for `.gz` and plain otherwise.
    pub fn from_path<P>(path: P) -> Self
    where
        P: AsRef<Path>,
    {
        match path.as_ref().extension() {
            Some(ext) if ext == "gz" => Self::Gzip,
            _ => Self::Plain,
        }
    }

    fn detect(bytes: &[u8]) -> Self {
        if bytes.starts_with(&Self::GZIP_MAGIC) {
            Self::Gzip
        } else {
            Self::Plain
        }
    }
}

/// Reads a spectrum from path.
///
/// Gzip-compressed files are detected automatically.
pub fn load<P>(path: P) -> Result<Spectrum, Error>
where
    P: AsRef<Path>,
{
    read::Builder::default().read_from_path(path)
}

/// Writes a spectrum to path, one value per line.
///
/// If the path ends in `.gz`, the output is gzip-compressed. If the path already exists, it will
/// be overwritten.
pub fn save<P>(spectrum: &Spectrum, path: P) -> Result<(), Error>
where
    P: AsRef<Path>,
{
    write::Builder::default()
        .write_to_path(path, spectrum)
        .map_err(Error::from)
}
