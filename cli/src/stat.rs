use std::fmt;

use anyhow::Error;

use clap::{Parser, ValueEnum};
use coalsfs_core::{
    distribution::{self, EmpiricalDistribution, Estimator},
    sweep, BetaCoalescent, Params, ShapeStatistic,
};

use crate::{output::Table, simulation::Simulation};

/// Estimate the distribution of a tree shape statistic.
///
/// By default, prints one row per histogram bin with the left edge, right edge, and density.
/// With '--curve', prints the kernel density estimate evaluated at each histogram edge instead.
/// When more than one selection duration is given, one block of rows is printed per duration,
/// with the duration in an extra first column.
#[derive(Debug, Parser)]
pub struct Stat {
    /// Statistic to estimate.
    #[arg(short = 's', long, value_enum, value_name = "STAT")]
    statistic: Statistic,

    #[command(flatten)]
    simulation: Simulation,

    /// Durations of selection before neutral coalescence.
    ///
    /// During selection, lineages merge under the Bolthausen-Sznitman coalescent. Use comma to
    /// separate durations, for example '0,0.1,0.2', to estimate one distribution per duration.
    #[arg(
        long,
        use_value_delimiter = true,
        value_delimiter = ',',
        value_name = "FLOAT,..."
    )]
    selection: Vec<f64>,

    /// Number of histogram bins.
    #[arg(short = 'b', long, default_value_t = 20, value_name = "INT")]
    bins: usize,

    /// Rule for the kernel density bandwidth.
    #[arg(long, value_enum, default_value_t = Bandwidth::Scott)]
    bandwidth: Bandwidth,

    /// Print the kernel density curve rather than the histogram.
    #[arg(long)]
    curve: bool,

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
pub enum Statistic {
    /// Number of pairs of leaves that are each other's only siblings.
    Cherries,
    /// Sum over binary splits of the difference in number of leaves below each side.
    Colless,
    /// Mean number of edges from a leaf to the root.
    Sackin,
    /// Fractions of leaves below each of the two root children. Trees whose root is not binary are
    /// discarded and regenerated, and both fractions of a tree are kept as separate observations.
    Balance,
}

impl From<Statistic> for ShapeStatistic {
    fn from(statistic: Statistic) -> Self {
        match statistic {
            Statistic::Cherries => ShapeStatistic::Cherries,
            Statistic::Colless => ShapeStatistic::Colless,
            Statistic::Sackin => ShapeStatistic::Sackin,
            Statistic::Balance => ShapeStatistic::BalanceRatios,
        }
    }
}

impl fmt::Display for Statistic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&ShapeStatistic::from(*self), f)
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, Eq, PartialEq)]
pub enum Bandwidth {
    /// Scott's rule.
    Scott,
    /// Silverman's rule.
    Silverman,
}

impl From<Bandwidth> for distribution::Bandwidth {
    fn from(bandwidth: Bandwidth) -> Self {
        match bandwidth {
            Bandwidth::Scott => distribution::Bandwidth::Scott,
            Bandwidth::Silverman => distribution::Bandwidth::Silverman,
        }
    }
}

impl Stat {
    pub fn run(self) -> Result<(), Error> {
        let params = self.params();
        let seed = self.simulation.seed();
        let trials = self.simulation.trials;
        let statistic = ShapeStatistic::from(self.statistic);
        let estimator = Estimator::new(self.bins).set_bandwidth(self.bandwidth.into());

        let distributions = self.simulation.install(|| {
            sweep::distributions(
                BetaCoalescent::seed_from_u64,
                &statistic,
                &params,
                trials,
                seed,
                &estimator,
            )
        })??;

        let swept = self.selection.len() > 1;
        let mut table = Table::stdout(self.delimiter, self.precision);
        if self.header {
            let mut names = if self.curve {
                vec!["x", "density"]
            } else {
                vec!["left", "right", "density"]
            };
            if swept {
                names.insert(0, "selection");
            }
            table.write_header(&names)?;
        }

        for distribution in distributions.iter() {
            let selection = distribution
                .params()
                .and_then(Params::selection_duration)
                .unwrap_or(0.0);
            log::debug!(
                "Using kernel bandwidth {} for selection duration {selection}.",
                distribution.kde().bandwidth()
            );

            self.write_distribution(&mut table, distribution, swept.then_some(selection))?;
        }

        Ok(())
    }

    fn params(&self) -> Vec<Params> {
        let base = self.simulation.params();

        match self.selection.as_slice() {
            [] => vec![base],
            durations => sweep::selection_durations(base, durations),
        }
    }

    fn write_distribution<W>(
        &self,
        table: &mut Table<W>,
        distribution: &EmpiricalDistribution,
        selection: Option<f64>,
    ) -> Result<(), Error>
    where
        W: std::io::Write,
    {
        let histogram = distribution.histogram();
        let edges = histogram.edges();
        let tag = selection.map(|selection| vec![selection; edges.len()]);

        let mut columns = if self.curve {
            vec![edges, distribution.curve()]
        } else {
            vec![&edges[..edges.len() - 1], &edges[1..], histogram.density()]
        };

        if let Some(tag) = &tag {
            columns.insert(0, tag.as_slice());
        }

        table.write_columns(&columns)
    }
}
