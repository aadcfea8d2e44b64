use std::num::NonZeroUsize;

use anyhow::Error;

use clap::Args;
use coalsfs_core::Params;

/// Arguments shared by commands that generate trees.
#[derive(Args, Debug)]
pub struct Simulation {
    /// Number of leaves in each tree.
    #[arg(short = 'n', long, value_name = "INT")]
    pub sample_size: usize,

    /// Skew parameter of the Beta coalescent.
    ///
    /// Must lie in [1, 2]. The default of 2 gives Kingman's coalescent, and 1 gives the
    /// Bolthausen-Sznitman coalescent.
    #[arg(short = 'a', long, default_value_t = Params::KINGMAN, value_name = "FLOAT")]
    pub skew: f64,

    /// Number of trials.
    #[arg(short = 't', long, value_name = "INT")]
    pub trials: usize,

    /// Seed for the random number generator.
    ///
    /// If unset, a random seed will be used and logged at the info level. Results for a given seed
    /// do not depend on the number of threads.
    #[arg(long, value_name = "INT")]
    pub seed: Option<u64>,

    /// Number of threads to use.
    ///
    /// If unset, one thread per core will be used.
    #[arg(long, value_name = "INT")]
    pub threads: Option<NonZeroUsize>,
}

impl Simulation {
    /// Returns the parameters without selection.
    pub fn params(&self) -> Params {
        Params::new(self.sample_size).set_skew(self.skew)
    }

    pub fn seed(&self) -> u64 {
        let seed = self.seed.unwrap_or_else(rand::random);
        log::info!("Using seed {seed}.");
        seed
    }

    /// Runs the operation in a thread pool of the requested size.
    pub fn install<OP, R>(&self, op: OP) -> Result<R, Error>
    where
        OP: FnOnce() -> R + Send,
        R: Send,
    {
        match self.threads {
            Some(threads) => {
                log::debug!("Using {threads} threads.");

                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(threads.get())
                    .build()?;

                Ok(pool.install(op))
            }
            None => Ok(op()),
        }
    }
}
