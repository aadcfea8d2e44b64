//! Utilities for writing spectra.

use std::{
    fs,
    io::{self, Write},
    path::Path,
};

use flate2::write::GzEncoder;

use crate::Spectrum;

use super::{text, Compression};

/// A builder to write a spectrum.
#[derive(Debug, Default)]
pub struct Builder {
    compression: Option<Compression>,
    precision: Option<usize>,
}

impl Builder {
    /// Set compression to write.
    ///
    /// If unset, output is compressed when writing to a path ending in `.gz`, and is plain
    /// otherwise.
    pub fn set_compression(mut self, compression: Compression) -> Self {
        self.compression = Some(compression);
        self
    }

    /// Set precision.
    ///
    /// If set, values are written in scientific notation with the given number of digits after
    /// the decimal point. If unset, values are written in the shortest form that reads back to
    /// the same value.
    pub fn set_precision(mut self, precision: Option<usize>) -> Self {
        self.precision = precision;
        self
    }

    /// Write spectrum to writer.
    pub fn write<W>(self, writer: &mut W, spectrum: &Spectrum) -> io::Result<()>
    where
        W: io::Write,
    {
        match self.compression.unwrap_or_default() {
            Compression::Plain => text::write_spectrum(writer, spectrum, self.precision),
            Compression::Gzip => {
                let mut encoder = GzEncoder::new(writer, flate2::Compression::default());
                text::write_spectrum(&mut encoder, spectrum, self.precision)?;
                encoder.finish()?.flush()
            }
        }
    }

    /// Write spectrum to stdout.
    pub fn write_to_stdout(self, spectrum: &Spectrum) -> io::Result<()> {
        self.write(&mut io::stdout().lock(), spectrum)
    }

    /// Write spectrum to path.
    ///
    /// If path already exists, it will be overwritten.
    pub fn write_to_path<P>(mut self, path: P, spectrum: &Spectrum) -> io::Result<()>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        self.compression = self
            .compression
            .or_else(|| Some(Compression::from_path(path)));

        let mut writer = io::BufWriter::new(fs::File::create(path)?);
        self.write(&mut writer, spectrum)?;
        writer.flush()
    }

    /// Write spectrum to path or stdout.
    ///
    /// If the provided path is `None`, write to stdout.
    /// If path already exists, it will be overwritten.
    pub fn write_to_path_or_stdout<P>(
        self,
        path: Option<P>,
        spectrum: &Spectrum,
    ) -> io::Result<()>
    where
        P: AsRef<Path>,
    {
        match path {
            Some(path) => self.write_to_path(path, spectrum),
            None => self.write_to_stdout(spectrum),
        }
    }
}
