use std::{fmt, io};

use anyhow::Error;

/// Writes delimited rows of numbers.
#[derive(Debug)]
pub struct Table<W> {
    writer: W,
    delimiter: char,
    precision: usize,
}

impl<W> Table<W>
where
    W: io::Write,
{
    pub fn new(writer: W, delimiter: char, precision: usize) -> Self {
        Self {
            writer,
            delimiter,
            precision,
        }
    }

    pub fn write_header(&mut self, names: &[&str]) -> Result<(), Error> {
        self.write_with_delimiter(names)
    }

    pub fn write_row(&mut self, values: &[f64]) -> Result<(), Error> {
        let precision = self.precision;

        self.write_with_delimiter(values.iter().map(|x| format!("{x:.precision$}")))
    }

    /// Writes rows from columns of equal length.
    pub fn write_columns(&mut self, columns: &[&[f64]]) -> Result<(), Error> {
        let rows = columns.iter().map(|c| c.len()).min().unwrap_or(0);

        for i in 0..rows {
            let row = columns.iter().map(|c| c[i]).collect::<Vec<_>>();
            self.write_row(&row)?;
        }

        Ok(())
    }

    fn write_with_delimiter<I>(&mut self, items: I) -> Result<(), Error>
    where
        I: IntoIterator,
        I::Item: fmt::Display,
    {
        for (i, x) in items.into_iter().enumerate() {
            if i > 0 {
                write!(self.writer, "{}", self.delimiter)?;
            }
            write!(self.writer, "{x}")?;
        }
        writeln!(self.writer)?;

        Ok(())
    }
}

impl Table<io::StdoutLock<'static>> {
    pub fn stdout(delimiter: char, precision: usize) -> Self {
        Self::new(io::stdout().lock(), delimiter, precision)
    }
}
