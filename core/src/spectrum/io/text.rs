//! Reading and writing for the text format.
//!
//! The text format holds one value per line, from derived allele count 0 to n. When reading, any
//! whitespace may separate values as long as they form a single row or a single column, and lines
//! starting with `#` are ignored.

use std::io;

use crate::{error::FormatError, Spectrum};

/// The start of a comment line.
pub(crate) const COMMENT: char = '#';

/// Parses the values of a spectrum.
pub fn parse_spectrum(s: &str) -> Result<Spectrum, FormatError> {
    let rows = s
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with(COMMENT))
        .map(|line| line.split_ascii_whitespace().collect::<Vec<_>>())
        .collect::<Vec<_>>();

    let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
    if rows.len() > 1 && columns > 1 {
        return Err(FormatError::NotOneDimensional {
            rows: rows.len(),
            columns,
        });
    }

    let values = rows
        .into_iter()
        .flatten()
        .map(|token| {
            token.parse::<f64>().map_err(|_| FormatError::InvalidValue {
                token: token.to_string(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    for (index, &value) in values.iter().enumerate() {
        if !value.is_finite() {
            return Err(FormatError::NonFinite { index, value });
        } else if value < 0.0 {
            return Err(FormatError::Negative { index, value });
        }
    }

    match values.len() {
        0 => Err(FormatError::Empty),
        len @ 1 => Err(FormatError::TooShort { len }),
        _ => Ok(Spectrum::from_vec(values)),
    }
}

/// Reads a spectrum in text format from a reader.
pub fn read_spectrum<R>(reader: &mut R) -> Result<Spectrum, crate::Error>
where
    R: io::Read,
{
    let mut buf = String::new();
    let _bytes_read = reader.read_to_string(&mut buf)?;

    parse_spectrum(&buf).map_err(crate::Error::from)
}

/// Writes a spectrum in text format to a writer.
///
/// Without a precision, each value is written in the shortest form that reads back exactly.
/// Otherwise, values are written in scientific notation with `precision` digits after the point.
pub fn write_spectrum<W>(
    writer: &mut W,
    spectrum: &Spectrum,
    precision: Option<usize>,
) -> io::Result<()>
where
    W: io::Write,
{
    for value in spectrum.values() {
        match precision {
            Some(precision) => writeln!(writer, "{value:.precision$e}")?,
            None => writeln!(writer, "{value}")?,
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_column() {
        let spectrum = parse_spectrum("0\n2.5\n1e-3\n0\n").unwrap();

        assert_eq!(spectrum.values(), [0.0, 2.5, 0.001, 0.0]);
        assert_eq!(spectrum.sample_size(), 3);
    }

    #[test]
    fn test_parse_row_and_comments() {
        let spectrum = parse_spectrum("# sfs\n0.0 1.0  2.0\t0.0\n\n").unwrap();

        assert_eq!(spectrum.values(), [0.0, 1.0, 2.0, 0.0]);
    }

    #[test]
    fn test_parse_two_dimensional() {
        assert_eq!(
            parse_spectrum("0 1\n2 3\n4 5\n"),
            Err(FormatError::NotOneDimensional {
                rows: 3,
                columns: 2
            })
        );
    }

    #[test]
    fn test_parse_invalid_value() {
        assert_eq!(
            parse_spectrum("0\n1.0\nfoo\n"),
            Err(FormatError::InvalidValue {
                token: String::from("foo")
            })
        );
    }

    #[test]
    fn test_parse_negative() {
        assert_eq!(
            parse_spectrum("0\n-1.0\n2\n"),
            Err(FormatError::Negative {
                index: 1,
                value: -1.0
            })
        );
    }

    #[test]
    fn test_parse_non_finite() {
        assert_eq!(
            parse_spectrum("0\ninf\n1\n"),
            Err(FormatError::NonFinite {
                index: 1,
                value: f64::INFINITY
            })
        );
        assert_eq!(
            parse_spectrum("0\n-inf\n1\n"),
            Err(FormatError::NonFinite {
                index: 1,
                value: f64::NEG_INFINITY
            })
        );
        assert!(matches!(
            parse_spectrum("NaN 1 0"),
            Err(FormatError::NonFinite { index: 0, value }) if value.is_nan()
        ));

        let message = parse_spectrum("0\ninf\n1\n").unwrap_err().to_string();
        assert!(!message.contains("negative"), "{message}");
    }

    #[test]
    fn test_parse_empty_and_short() {
        assert_eq!(parse_spectrum(""), Err(FormatError::Empty));
        assert_eq!(parse_spectrum("# nothing\n\n"), Err(FormatError::Empty));
        assert_eq!(parse_spectrum("1.0\n"), Err(FormatError::TooShort { len: 1 }));
    }

    #[test]
    fn test_write_shortest() -> io::Result<()> {
        let mut dest = Vec::new();
        write_spectrum(&mut dest, &Spectrum::from_vec([0.0, 0.1, 2.0]), None)?;

        assert_eq!(dest, b"0\n0.1\n2\n");

        Ok(())
    }

    #[test]
    fn test_write_precision() -> io::Result<()> {
        let mut dest = Vec::new();
        write_spectrum(&mut dest, &Spectrum::from_vec([0.0, 0.125, 2.0]), Some(2))?;

        assert_eq!(dest, b"0.00e0\n1.25e-1\n2.00e0\n");
        assert_eq!(
            parse_spectrum(std::str::from_utf8(&dest).unwrap()).unwrap(),
            Spectrum::from_vec([0.0, 0.125, 2.0])
        );

        Ok(())
    }
}
