//! Repeating a simulation over a range of selection durations.
//!
//! Each configuration is run with its own master seed, drawn from a single sweep seed, so that
//! results are reproducible and the result for a configuration does not depend on those after
//! it. Results are tagged with the parameters they were generated from.
//!
//! # Example
//!
//! ```
//! use coalsfs_core::{sweep, BetaCoalescent, Params};
//!
//! let params = sweep::selection_durations(Params::new(10), &sweep::linspace(0.0, 1.0, 3));
//! let spectra = sweep::spectra(BetaCoalescent::seed_from_u64, &params, 100, 1)?;
//!
//! assert_eq!(spectra.len(), 3);
//! assert_eq!(spectra[2].0.selection_duration(), Some(1.0));
//! # Ok::<(), coalsfs_core::error::ConfigError>(())
//! ```

use crate::{
    distribution::{EmpiricalDistribution, Estimator},
    error::{ConfigError, Error},
    generate::{Generator, Params},
    parallel,
    spectrum::{self, Spectrum},
    tree::stat::Statistic,
    trial::{self, Sample},
};

/// Returns `num` evenly spaced values from `start` to `stop`, both included.
pub fn linspace(start: f64, stop: f64, num: usize) -> Vec<f64> {
    match num {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (num - 1) as f64;

            (0..num)
                .map(|i| if i + 1 == num { stop } else { start + step * i as f64 })
                .collect()
        }
    }
}

/// Returns copies of `base`, one for each selection duration.
pub fn selection_durations(base: Params, durations: &[f64]) -> Vec<Params> {
    durations
        .iter()
        .map(|&duration| base.set_selection_duration(Some(duration)))
        .collect()
}

fn validate_all(params: &[Params], trials: usize) -> Result<(), ConfigError> {
    params.iter().try_for_each(Params::validate)?;

    if trials == 0 {
        Err(ConfigError::NoTrials)
    } else {
        Ok(())
    }
}

/// Averages the spectra of `trials` trees for each configuration.
///
/// All parameters are validated before any tree is generated.
pub fn spectra<G, F>(
    make_generator: F,
    params: &[Params],
    trials: usize,
    seed: u64,
) -> Result<Vec<(Params, Spectrum)>, ConfigError>
where
    F: Fn(u64) -> G + Sync,
    G: Generator,
{
    validate_all(params, trials)?;

    params
        .iter()
        .zip(parallel::seeds(params.len(), seed))
        .map(|(config, seed)| {
            log::debug!(
                "Accumulating spectrum with selection duration {:?}.",
                config.selection_duration()
            );

            spectrum::accumulate_parallel(&make_generator, config, trials, seed)
                .map(|spectrum| (*config, spectrum))
        })
        .collect()
}

/// Collects a sample of `trials` accepted values for each configuration.
///
/// Each sample carries its parameters, see [`Sample::params`].
pub fn samples<G, F, S>(
    make_generator: F,
    statistic: &S,
    params: &[Params],
    trials: usize,
    seed: u64,
) -> Result<Vec<Sample>, ConfigError>
where
    F: Fn(u64) -> G + Sync,
    G: Generator,
    S: Statistic + Clone + Send + Sync,
{
    validate_all(params, trials)?;

    params
        .iter()
        .zip(parallel::seeds(params.len(), seed))
        .map(|(config, seed)| {
            trial::run_parallel(&make_generator, statistic, *config, trials, seed)
        })
        .collect()
}

/// Estimates the distribution of a statistic for each configuration.
///
/// Each distribution carries its parameters, see [`EmpiricalDistribution::params`].
pub fn distributions<G, F, S>(
    make_generator: F,
    statistic: &S,
    params: &[Params],
    trials: usize,
    seed: u64,
    estimator: &Estimator,
) -> Result<Vec<EmpiricalDistribution>, Error>
where
    F: Fn(u64) -> G + Sync,
    G: Generator,
    S: Statistic + Clone + Send + Sync,
{
    samples(make_generator, statistic, params, trials, seed)?
        .iter()
        .map(|sample| estimator.estimate(sample))
        .collect()
}
