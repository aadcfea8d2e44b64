//! Utilities for reading spectra.

use std::{
    fs,
    io::{self, BufRead},
    path::Path,
};

use flate2::bufread::MultiGzDecoder;

use crate::{Error, Spectrum};

use super::{text, Compression};

/// A builder to read a spectrum.
#[derive(Debug, Default)]
pub struct Builder {
    compression: Option<Compression>,
}

impl Builder {
    /// Read spectrum from reader.
    pub fn read<R>(self, reader: R) -> Result<Spectrum, Error>
    where
        R: io::Read,
    {
        let mut reader = io::BufReader::new(reader);

        let compression = match self.compression {
            Some(compression) => compression,
            None => Compression::detect(reader.fill_buf()?),
        };

        match compression {
            Compression::Plain => text::read_spectrum(&mut reader),
            Compression::Gzip => text::read_spectrum(&mut MultiGzDecoder::new(reader)),
        }
    }

    /// Read spectrum from path.
    ///
    /// A missing file is reported as [`Error::NotFound`].
    pub fn read_from_path<P>(self, path: P) -> Result<Spectrum, Error>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();

        let file = fs::File::open(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => Error::NotFound(path.to_path_buf()),
            _ => Error::Io(e),
        })?;

        self.read(file)
    }

    /// Read spectrum from path or stdin.
    ///
    /// If the provided path is `None`, read from stdin.
    pub fn read_from_path_or_stdin<P>(self, path: Option<P>) -> Result<Spectrum, Error>
    where
        P: AsRef<Path>,
    {
        match path {
            Some(path) => self.read_from_path(path),
            None => self.read_from_stdin(),
        }
    }

    /// Read spectrum from stdin.
    pub fn read_from_stdin(self) -> Result<Spectrum, Error> {
        self.read(io::stdin().lock())
    }

    /// Set compression to read.
    ///
    /// If unset, gzip compression will automatically be detected when reading.
    pub fn set_compression(mut self, compression: Compression) -> Self {
        self.compression = Some(compression);
        self
    }
}
