//! Repeated trials of generating a tree and evaluating a statistic on it.

use rayon::prelude::*;

use crate::{
    error::ConfigError,
    generate::{Generator, Params},
    parallel,
    tree::stat::{Observation, Outcome, Statistic},
};

/// Observations from accepted trials.
///
/// Vector-valued results are flattened, so there may be more values than trials.
#[derive(Clone, Debug, PartialEq)]
pub struct Sample {
    values: Vec<f64>,
    trials: usize,
    params: Option<Params>,
}

impl Sample {
    /// Creates a sample from raw values, treating each value as one trial.
    pub fn from_values(values: Vec<f64>) -> Self {
        Self {
            trials: values.len(),
            values,
            params: None,
        }
    }

    /// Returns the number of distinct values.
    pub fn distinct(&self) -> usize {
        let mut sorted = self.values.clone();
        sorted.sort_by(f64::total_cmp);
        sorted.dedup();
        sorted.len()
    }

    /// Returns the values of the sample.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Returns `true` if the sample has no values.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns the number of values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns the parameters of the trees the sample was generated from, if known.
    pub fn params(&self) -> Option<&Params> {
        self.params.as_ref()
    }

    /// Returns the number of accepted trials that contributed to the sample.
    pub fn trials(&self) -> usize {
        self.trials
    }

    fn concat<I>(params: Params, samples: I) -> Self
    where
        I: IntoIterator<Item = Sample>,
    {
        samples.into_iter().fold(
            Self {
                values: Vec::new(),
                trials: 0,
                params: Some(params),
            },
            |mut acc, sample| {
                acc.values.extend(sample.values);
                acc.trials += sample.trials;
                acc
            },
        )
    }
}

/// Counts of accepted and rejected trials.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Tally {
    /// Number of trees for which the statistic was defined.
    pub accepted: usize,
    /// Number of trees discarded because the statistic was undefined.
    pub rejected: usize,
}

impl Tally {
    fn log(&self, level: log::Level) {
        let Tally { accepted, rejected } = self;
        let total = accepted + rejected;

        log::log!(
            level,
            "Accepted {accepted} of {total} generated trees ({rejected} rejected)."
        );
    }
}

impl std::ops::Add for Tally {
    type Output = Self;

    fn add(self, other: Self) -> Self::Output {
        Self {
            accepted: self.accepted + other.accepted,
            rejected: self.rejected + other.rejected,
        }
    }
}

/// Runs trials until a target number of them is accepted.
///
/// A rejected trial is discarded and a fresh tree is generated in its place. There is no limit on
/// the number of retries, so a statistic that always rejects will never finish.
#[derive(Debug)]
pub struct TrialRunner<G> {
    generator: G,
    params: Params,
    tally: Tally,
}

impl<G> TrialRunner<G>
where
    G: Generator,
{
    /// Creates a new runner, validating the generator parameters.
    pub fn new(generator: G, params: Params) -> Result<Self, ConfigError> {
        params.validate()?;

        Ok(Self {
            generator,
            params,
            tally: Tally::default(),
        })
    }

    /// Returns exactly `trials` accepted results, without flattening them.
    pub fn collect<S>(
        &mut self,
        statistic: &mut S,
        trials: usize,
    ) -> Result<Vec<S::Value>, ConfigError>
    where
        S: Statistic,
    {
        if trials == 0 {
            return Err(ConfigError::NoTrials);
        }

        let before = self.tally;
        let results = (0..trials).map(|_| self.next_accepted(statistic)).collect();

        Tally {
            accepted: self.tally.accepted - before.accepted,
            rejected: self.tally.rejected - before.rejected,
        }
        .log(log::Level::Trace);

        Ok(results)
    }

    /// Returns the flattened results of exactly `trials` accepted trials.
    pub fn run<S>(&mut self, statistic: &mut S, trials: usize) -> Result<Sample, ConfigError>
    where
        S: Statistic,
    {
        let mut values = Vec::with_capacity(trials);

        for result in self.collect(statistic, trials)? {
            result.flatten_into(&mut values);
        }

        Ok(Sample {
            values,
            trials,
            params: Some(self.params),
        })
    }

    /// Returns the counts of accepted and rejected trials so far.
    pub fn tally(&self) -> Tally {
        self.tally
    }

    /// Returns the generator.
    pub fn into_inner(self) -> G {
        self.generator
    }

    fn next_accepted<S>(&mut self, statistic: &mut S) -> S::Value
    where
        S: Statistic,
    {
        loop {
            let tree = self.generator.generate(&self.params);

            match statistic.evaluate(&tree) {
                Outcome::Accepted(value) => {
                    self.tally.accepted += 1;
                    return value;
                }
                Outcome::Rejected => self.tally.rejected += 1,
            }
        }
    }
}

/// Runs trials in parallel, see [`TrialRunner::run`].
///
/// Trials are split into chunks, each with its own generator created by `make_generator` from a
/// seed derived from `seed`, and its own clone of the statistic. Chunks are concatenated in a
/// fixed order, so the result does not depend on the number of threads.
pub fn run_parallel<G, F, S>(
    make_generator: F,
    statistic: &S,
    params: Params,
    trials: usize,
    seed: u64,
) -> Result<Sample, ConfigError>
where
    F: Fn(u64) -> G + Sync,
    G: Generator,
    S: Statistic + Clone + Send + Sync,
{
    params.validate()?;
    if trials == 0 {
        return Err(ConfigError::NoTrials);
    }

    let results = parallel::chunks(trials, seed)
        .into_par_iter()
        .map(|chunk| -> Result<_, ConfigError> {
            let mut runner = TrialRunner::new(make_generator(chunk.seed), params)?;
            let sample = runner.run(&mut statistic.clone(), chunk.trials)?;
            Ok((sample, runner.tally()))
        })
        .collect::<Result<Vec<_>, ConfigError>>()?;

    let tally = results
        .iter()
        .fold(Tally::default(), |acc, (_, tally)| acc + *tally);
    tally.log(log::Level::Debug);

    Ok(Sample::concat(params, results.into_iter().map(|(sample, _)| sample)))
}

#[cfg(test)]
mod tests {
    use super::*;

    use rand::{Rng, SeedableRng};
    use rand_xoshiro::Xoshiro256PlusPlus;

    use crate::{
        generate::BetaCoalescent,
        tree::stat::{balance_ratios, colless_index, ShapeStatistic},
        Tree,
    };

    fn runner(params: Params, seed: u64) -> TrialRunner<BetaCoalescent> {
        TrialRunner::new(BetaCoalescent::seed_from_u64(seed), params).unwrap()
    }

    #[test]
    fn test_invalid_params() {
        let result = TrialRunner::new(BetaCoalescent::seed_from_u64(0), Params::new(1));

        assert_eq!(
            result.unwrap_err(),
            ConfigError::SampleSizeTooSmall { sample_size: 1 }
        );
    }

    #[test]
    fn test_no_trials() {
        let result = runner(Params::new(5), 0).run(&mut ShapeStatistic::Sackin, 0);

        assert_eq!(result.unwrap_err(), ConfigError::NoTrials);
    }

    #[test]
    fn test_sample_has_one_value_per_trial() {
        let mut runner = runner(Params::new(10), 1);

        for trials in [1, 2, 17, 100] {
            let sample = runner.run(&mut ShapeStatistic::Sackin, trials).unwrap();

            assert_eq!(sample.len(), trials);
            assert_eq!(sample.trials(), trials);
            assert_eq!(sample.params(), Some(&Params::new(10)));
        }
    }

    #[test]
    fn test_cherries_and_colless_non_negative_integers() {
        let mut runner = runner(Params::new(25).set_skew(1.5), 2);

        for mut statistic in [ShapeStatistic::Cherries, ShapeStatistic::Colless] {
            let sample = runner.run(&mut statistic, 50).unwrap();

            assert!(sample
                .values()
                .iter()
                .all(|&x| x >= 0.0 && x.fract() == 0.0));
        }
    }

    #[test]
    fn test_balance_ratio_pairs_sum_to_one() {
        let mut runner = runner(Params::new(30).set_skew(1.2), 3);

        let pairs = runner.collect(&mut balance_ratios, 200).unwrap();

        assert_eq!(pairs.len(), 200);
        for [left, right] in pairs {
            assert!(0.0 < left && left < 1.0);
            assert!(0.0 < right && right < 1.0);
            assert_approx_eq!(left + right, 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_balance_ratios_flattened() {
        let mut runner = runner(Params::new(30).set_skew(1.2), 4);

        let sample = runner.run(&mut ShapeStatistic::BalanceRatios, 100).unwrap();

        assert_eq!(sample.trials(), 100);
        assert_eq!(sample.len(), 200);
        assert!(sample.values().iter().all(|&x| 0.0 < x && x < 1.0));
        assert!(sample
            .values()
            .chunks(2)
            .all(|pair| (pair[0] + pair[1] - 1.0).abs() < 1e-12));
    }

    #[test]
    fn test_rejections_are_retried() {
        let mut runner = runner(Params::new(10).set_skew(1.0), 5);

        let sample = runner.run(&mut ShapeStatistic::BalanceRatios, 300).unwrap();
        let tally = runner.tally();

        assert_eq!(sample.trials(), 300);
        assert_eq!(tally.accepted, 300);
        assert!(tally.rejected > 0);
    }

    #[test]
    fn test_random_rejection_terminates() {
        // Rejects with probability 0.9, so 100 acceptances need about 1000 trees, and far more
        // than 5000 is astronomically unlikely
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(6);
        let mut statistic = |tree: &Tree| {
            if rng.random::<f64>() < 0.9 {
                Outcome::Rejected
            } else {
                Outcome::Accepted(colless_index(tree))
            }
        };

        let mut runner = runner(Params::new(5), 7);
        let sample = runner.run(&mut statistic, 100).unwrap();

        assert_eq!(sample.len(), 100);
        assert!(runner.tally().rejected + 100 < 5000);
    }

    #[test]
    fn test_run_parallel() {
        let params = Params::new(12).set_skew(1.4);

        let sample = run_parallel(
            BetaCoalescent::seed_from_u64,
            &ShapeStatistic::BalanceRatios,
            params,
            150,
            8,
        )
        .unwrap();

        assert_eq!(sample.trials(), 150);
        assert_eq!(sample.len(), 300);
        assert_eq!(sample.params(), Some(&params));
    }

    #[test]
    fn test_run_parallel_reproducible() {
        let run = || {
            run_parallel(
                BetaCoalescent::seed_from_u64,
                &ShapeStatistic::Colless,
                Params::new(8),
                100,
                9,
            )
            .unwrap()
        };

        assert_eq!(run(), run());
    }

    #[test]
    fn test_run_parallel_invalid() {
        let result = run_parallel(
            BetaCoalescent::seed_from_u64,
            &ShapeStatistic::Colless,
            Params::new(8).set_skew(0.5),
            100,
            0,
        );

        assert_eq!(result.unwrap_err(), ConfigError::InvalidSkew { skew: 0.5 });
    }

    #[test]
    fn test_distinct() {
        let sample = Sample::from_values(vec![1.0, 2.0, 1.0, 3.0, 2.0]);

        assert_eq!(sample.distinct(), 3);
        assert_eq!(sample.trials(), 5);
        assert_eq!(sample.params(), None);
    }
}
