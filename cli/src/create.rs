use std::path::PathBuf;

use anyhow::Error;

use clap::Parser;
use coalsfs_core::{
    spectrum::{self, io::write},
    BetaCoalescent, Params,
};

use crate::simulation::Simulation;

/// Create a site frequency spectrum from simulated trees.
///
/// Entry k of the spectrum is the average total length of branches with k leaves below them.
#[derive(Debug, Parser)]
pub struct Create {
    #[command(flatten)]
    simulation: Simulation,

    /// Duration of selection before neutral coalescence.
    ///
    /// During selection, lineages merge under the Bolthausen-Sznitman coalescent.
    #[arg(long, value_name = "FLOAT")]
    selection: Option<f64>,

    /// Output path.
    ///
    /// If the path ends in '.gz', the output is gzip-compressed. If unset, the spectrum is written
    /// to stdout.
    #[arg(short = 'o', long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Output precision.
    ///
    /// If set, values are written in scientific notation with this many digits after the decimal
    /// point. By default, values are written in the shortest form that reads back exactly.
    #[arg(short = 'p', long, value_name = "INT")]
    precision: Option<usize>,
}

impl Create {
    pub fn run(self) -> Result<(), Error> {
        let params = self.params();
        let seed = self.simulation.seed();
        let trials = self.simulation.trials;

        let spectrum = self
            .simulation
            .install(|| {
                spectrum::accumulate_parallel(BetaCoalescent::seed_from_u64, &params, trials, seed)
            })?
            .map_err(coalsfs_core::Error::from)?;

        write::Builder::default()
            .set_precision(self.precision)
            .write_to_path_or_stdout(self.output.as_ref(), &spectrum)?;

        Ok(())
    }

    fn params(&self) -> Params {
        self.simulation
            .params()
            .set_selection_duration(self.selection)
    }
}
