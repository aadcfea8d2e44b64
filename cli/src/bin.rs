use std::path::PathBuf;

use anyhow::Error;

use clap::{Parser, ValueEnum};
use coalsfs_core::spectrum::{self, Bins};

use crate::{input, output::Table};

/// Bin a site frequency spectrum by derived allele frequency.
///
/// Prints one row per bin with the bin center, the bin width, and the spectrum mass in the bin
/// divided by its width.
#[derive(Debug, Parser)]
pub struct Bin {
    /// Input spectrum.
    ///
    /// The input spectrum can be provided here or read from stdin, and may be gzip-compressed.
    #[arg(value_name = "PATH")]
    input: Option<PathBuf>,

    /// Scale of the bins.
    ///
    /// Generated log edges run from n^(-0.9) to 1, and logit edges from n^(-0.9) to n^0.9 in odds.
    /// With explicit edges, the scale only decides whether centers are arithmetic (linear) or
    /// geometric means of the edges.
    #[arg(long, value_enum, default_value_t = Scale::Linear)]
    scale: Scale,

    /// Number of bins.
    #[arg(short = 'b', long, default_value_t = 10, value_name = "INT")]
    bins: usize,

    /// Explicit bin edges.
    ///
    /// Edges must be strictly increasing. Use comma to separate edges.
    #[arg(
        short = 'e',
        long,
        conflicts_with = "bins",
        use_value_delimiter = true,
        value_delimiter = ',',
        value_name = "FLOAT,..."
    )]
    edges: Option<Vec<f64>>,

    /// Delimiter between columns.
    #[arg(short = 'd', long, default_value_t = ',', value_name = "CHAR")]
    delimiter: char,

    /// Include a header with the names of columns.
    #[arg(short = 'H', long)]
    header: bool,

    /// Precision to use when printing values.
    #[arg(short = 'p', long, default_value_t = 6, value_name = "INT")]
    precision: usize,
}

#[derive(ValueEnum, Clone, Copy, Debug, Eq, PartialEq)]
pub enum Scale {
    /// Equal-width bins on [0, 1].
    Linear,
    /// Bins equally spaced in log frequency.
    Log,
    /// Bins equally spaced in log-odds.
    Logit,
}

impl From<Scale> for spectrum::Scale {
    fn from(scale: Scale) -> Self {
        match scale {
            Scale::Linear => spectrum::Scale::Linear,
            Scale::Log => spectrum::Scale::Log,
            Scale::Logit => spectrum::Scale::Logit,
        }
    }
}

impl Bin {
    pub fn run(self) -> Result<(), Error> {
        input::check(self.input.as_ref())?;

        let spectrum = spectrum::io::read::Builder::default()
            .read_from_path_or_stdin(self.input.as_ref())?;
        log::debug!(
            "Read spectrum with sample size {}.",
            spectrum.sample_size()
        );

        let bins = match self.edges {
            Some(edges) => Bins::Edges(edges),
            None => Bins::Count(self.bins),
        };
        let binned = spectrum
            .bin(self.scale.into(), bins)
            .map_err(coalsfs_core::Error::from)?;

        if binned.underflow() > 0.0 || binned.overflow() > 0.0 {
            log::info!(
                "Spectrum mass outside bins: {} below first edge, {} above last edge.",
                binned.underflow(),
                binned.overflow(),
            );
        }

        let mut table = Table::stdout(self.delimiter, self.precision);
        if self.header {
            table.write_header(&["center", "width", "value"])?;
        }
        table.write_columns(&[binned.centers(), binned.widths(), binned.values()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use clap::error::ErrorKind as ClapErrorKind;

    use crate::tests::{parse_subcmd, try_parse_subcmd};

    #[test]
    fn test_defaults() {
        let args = parse_subcmd::<Bin>("coalsfs bin spectrum.txt");

        assert_eq!(args.input, Some(PathBuf::from("spectrum.txt")));
        assert_eq!(args.scale, Scale::Linear);
        assert_eq!(args.bins, 10);
        assert_eq!(args.edges, None);
        assert_eq!(args.delimiter, ',');
    }

    #[test]
    fn test_parse_edges() {
        let args = parse_subcmd::<Bin>("coalsfs bin --scale log --edges 0.1,0.5,1 spectrum.txt");

        assert_eq!(args.scale, Scale::Log);
        assert_eq!(args.edges, Some(vec![0.1, 0.5, 1.0]));
    }

    #[test]
    fn test_bins_and_edges_conflict() {
        let result = try_parse_subcmd::<Bin>("coalsfs bin -b 4 -e 0,1 spectrum.txt");

        assert_eq!(result.unwrap_err().kind(), ClapErrorKind::ArgumentConflict);
    }

    #[test]
    fn test_unknown_scale() {
        let result = try_parse_subcmd::<Bin>("coalsfs bin --scale loglog spectrum.txt");

        assert_eq!(result.unwrap_err().kind(), ClapErrorKind::InvalidValue);
    }
}
