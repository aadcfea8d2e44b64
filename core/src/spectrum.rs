//! Site frequency spectra of generated trees.
//!
//! A [`Spectrum`] of sample size n has n + 1 entries, where entry k is the expected total length
//! of branches subtending exactly k leaves. A mutation falling on such a branch is carried by k
//! of the n sampled individuals, so up to a mutation rate this is the expected SFS.
//!
//! Spectra are built by an [`Accumulator`], rebinned with [`Spectrum::bin`], and read and written
//! with the builders in [`io`].

use rayon::prelude::*;

use crate::{
    error::ConfigError,
    generate::{Generator, Params},
    parallel, Tree,
};

pub mod bin;
pub use bin::{BinnedSpectrum, Bins, Scale};

pub mod io;

/// An averaged, unbinned site frequency spectrum.
#[derive(Clone, Debug, PartialEq)]
pub struct Spectrum {
    values: Vec<f64>,
}

impl Spectrum {
    /// Creates a spectrum from its entries, indexed by derived allele count.
    ///
    /// # Panics
    ///
    /// If fewer than two entries are provided.
    pub fn from_vec<V>(values: V) -> Self
    where
        Vec<f64>: From<V>,
    {
        let values = Vec::from(values);
        assert!(values.len() >= 2, "spectrum requires at least two entries");

        Self { values }
    }

    /// Returns an iterator over the pairs of normalized frequency k/n and entry k.
    pub fn iter_frequencies(&self) -> impl ExactSizeIterator<Item = (f64, f64)> + '_ {
        let n = self.sample_size() as f64;

        self.values
            .iter()
            .enumerate()
            .map(move |(k, &v)| (k as f64 / n, v))
    }

    /// Combines two spectra averaged over `trials` and `other_trials` trees, respectively.
    ///
    /// The result is the average over all trees, (a·t₁ + b·t₂) / (t₁ + t₂).
    pub fn merge_weighted(
        &self,
        trials: usize,
        other: &Self,
        other_trials: usize,
    ) -> Result<Self, ConfigError> {
        if self.sample_size() != other.sample_size() {
            return Err(ConfigError::SampleSizeMismatch {
                expected: self.sample_size(),
                found: other.sample_size(),
            });
        }

        let total = trials + other_trials;
        if total == 0 {
            return Err(ConfigError::NoTrials);
        }

        let (t1, t2, total) = (trials as f64, other_trials as f64, total as f64);
        let values = self
            .values
            .iter()
            .zip(other.values.iter())
            .map(|(a, b)| (a * t1 + b * t2) / total)
            .collect();

        Ok(Self { values })
    }

    /// Returns the number of sampled leaves n.
    pub fn sample_size(&self) -> usize {
        self.values.len() - 1
    }

    /// Returns the sum of all entries, which is the average total tree length.
    pub fn sum(&self) -> f64 {
        self.values.iter().sum()
    }

    /// Returns the entries.
    pub fn values(&self) -> &[f64] {
        &self.values
    }
}

/// Running sums of branch lengths per clade weight.
///
/// Every clade of every added tree contributes, including leaves and the root. Generated trees
/// have a root branch of length zero, so entry n stays zero for them, while entry 0 is never
/// reached by any clade.
#[derive(Clone, Debug, PartialEq)]
pub struct Accumulator {
    totals: Vec<f64>,
    trials: usize,
}

impl Accumulator {
    /// Creates a new, empty accumulator for trees with the provided number of leaves.
    pub fn new(sample_size: usize) -> Self {
        Self {
            totals: vec![0.0; sample_size + 1],
            trials: 0,
        }
    }

    /// Adds the branch lengths of a tree.
    ///
    /// # Panics
    ///
    /// If the tree has more leaves than the sample size of the accumulator.
    pub fn add(&mut self, tree: &Tree) {
        for clade in tree.clades() {
            self.totals[clade.weight()] += clade.branch_length();
        }

        self.trials += 1;
    }

    /// Adds the sums of another accumulator.
    pub fn merge(&mut self, other: &Self) -> Result<(), ConfigError> {
        if self.totals.len() != other.totals.len() {
            return Err(ConfigError::SampleSizeMismatch {
                expected: self.totals.len() - 1,
                found: other.totals.len() - 1,
            });
        }

        self.totals
            .iter_mut()
            .zip(other.totals.iter())
            .for_each(|(x, y)| *x += y);
        self.trials += other.trials;

        Ok(())
    }

    /// Returns the number of trees added.
    pub fn trials(&self) -> usize {
        self.trials
    }

    /// Averages the sums over the number of trees added.
    pub fn finish(self) -> Result<Spectrum, ConfigError> {
        if self.trials == 0 {
            return Err(ConfigError::NoTrials);
        }

        let trials = self.trials as f64;
        let values = self.totals.into_iter().map(|x| x / trials).collect();

        Ok(Spectrum { values })
    }
}

/// Averages the spectra of `trials` trees from the provided generator.
pub fn accumulate<G>(
    mut generator: G,
    params: &Params,
    trials: usize,
) -> Result<Spectrum, ConfigError>
where
    G: Generator,
{
    params.validate()?;
    if trials == 0 {
        return Err(ConfigError::NoTrials);
    }

    let mut accumulator = Accumulator::new(params.sample_size());
    for _ in 0..trials {
        accumulator.add(&generator.generate(params));
    }

    log::debug!(
        "Accumulated spectrum over {trials} trees with {} leaves.",
        params.sample_size()
    );

    accumulator.finish()
}

/// Averages the spectra of `trials` trees in parallel.
///
/// See [`run_parallel`](crate::trial::run_parallel) for how trials are split and seeded. Partial
/// sums are merged in a fixed order before a single division by the total number of trials.
pub fn accumulate_parallel<G, F>(
    make_generator: F,
    params: &Params,
    trials: usize,
    seed: u64,
) -> Result<Spectrum, ConfigError>
where
    F: Fn(u64) -> G + Sync,
    G: Generator,
{
    params.validate()?;
    if trials == 0 {
        return Err(ConfigError::NoTrials);
    }

    let partials = parallel::chunks(trials, seed)
        .into_par_iter()
        .map(|chunk| {
            let mut generator = make_generator(chunk.seed);
            let mut accumulator = Accumulator::new(params.sample_size());
            for _ in 0..chunk.trials {
                accumulator.add(&generator.generate(params));
            }
            accumulator
        })
        .collect::<Vec<_>>();

    let mut accumulator = Accumulator::new(params.sample_size());
    for partial in partials.iter() {
        accumulator.merge(partial)?;
    }

    log::debug!(
        "Accumulated spectrum over {trials} trees with {} leaves in {} chunks.",
        params.sample_size(),
        partials.len(),
    );

    accumulator.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::{
        generate::BetaCoalescent,
        tree::{tests::five_leaves, TreeBuilder},
    };

    #[test]
    fn test_accumulate_single_tree() {
        let mut accumulator = Accumulator::new(5);
        accumulator.add(&five_leaves());

        let spectrum = accumulator.finish().unwrap();

        assert_eq!(spectrum.sample_size(), 5);
        assert_eq!(spectrum.values(), [0.0, 3.0, 2.25, 2.5, 0.0, 0.0]);
        assert_eq!(spectrum.sum(), five_leaves().total_length());
    }

    #[test]
    fn test_root_branch_counts_towards_last_entry() {
        let mut builder = TreeBuilder::with_leaves(2);
        let a = builder.add_leaf(1.0);
        let b = builder.add_leaf(1.0);
        let root = builder.add_internal(vec![a, b], 0.5);
        let tree = builder.build(root);

        let mut accumulator = Accumulator::new(2);
        accumulator.add(&tree);

        assert_eq!(accumulator.finish().unwrap().values(), [0.0, 2.0, 0.5]);
    }

    #[test]
    fn test_finish_empty() {
        assert_eq!(Accumulator::new(4).finish(), Err(ConfigError::NoTrials));
    }

    #[test]
    fn test_sum_is_average_tree_length() {
        let params = Params::new(12).set_skew(1.5);
        let trials = 200;

        let spectrum = accumulate(BetaCoalescent::seed_from_u64(0), &params, trials).unwrap();

        let mut generator = BetaCoalescent::seed_from_u64(0);
        let mean_length = (0..trials)
            .map(|_| generator.generate(&params).total_length())
            .sum::<f64>()
            / trials as f64;

        assert_approx_eq!(spectrum.sum(), mean_length, epsilon = 1e-9);
        assert_eq!(spectrum.values()[0], 0.0);
        assert_eq!(spectrum.values()[12], 0.0);
    }

    #[test]
    fn test_accumulate_invalid() {
        let generator = BetaCoalescent::seed_from_u64(0);

        assert_eq!(
            accumulate(generator, &Params::new(1), 10),
            Err(ConfigError::SampleSizeTooSmall { sample_size: 1 })
        );
        assert_eq!(
            accumulate(BetaCoalescent::seed_from_u64(0), &Params::new(4), 0),
            Err(ConfigError::NoTrials)
        );
    }

    #[test]
    fn test_kingman_expectation() {
        // Under Kingman's coalescent the expected entry k is 2/k
        let spectrum =
            accumulate(BetaCoalescent::seed_from_u64(1), &Params::new(10), 5000).unwrap();

        assert_approx_eq!(spectrum.values()[1], 2.0, epsilon = 0.1);
        assert_approx_eq!(spectrum.values()[2], 1.0, epsilon = 0.1);
        assert_approx_eq!(spectrum.values()[5], 0.4, epsilon = 0.1);
    }

    #[test]
    fn test_merge_weighted() {
        let a = Spectrum::from_vec([0.0, 3.0, 1.0, 0.0]);
        let b = Spectrum::from_vec([0.0, 1.0, 2.0, 0.0]);

        let merged = a.merge_weighted(1, &b, 3).unwrap();

        assert_eq!(merged.values(), [0.0, 1.5, 1.75, 0.0]);
    }

    #[test]
    fn test_merge_weighted_mismatch() {
        let a = Spectrum::from_vec([0.0, 3.0, 1.0, 0.0]);
        let b = Spectrum::from_vec([0.0, 1.0, 0.0]);

        assert_eq!(
            a.merge_weighted(1, &b, 1),
            Err(ConfigError::SampleSizeMismatch {
                expected: 3,
                found: 2
            })
        );
        assert_eq!(a.merge_weighted(0, &a, 0), Err(ConfigError::NoTrials));
    }

    #[test]
    fn test_accumulator_merge_equals_sequential() {
        let params = Params::new(8).set_skew(1.7);
        let mut generator = BetaCoalescent::seed_from_u64(2);
        let trees = (0..30).map(|_| generator.generate(&params)).collect::<Vec<_>>();

        let mut first = Accumulator::new(8);
        let mut second = Accumulator::new(8);
        let mut all = Accumulator::new(8);
        for (i, tree) in trees.iter().enumerate() {
            if i < 10 {
                first.add(tree);
            } else {
                second.add(tree);
            }
            all.add(tree);
        }

        let a = first.clone().finish().unwrap();
        let b = second.clone().finish().unwrap();
        let expected = all.finish().unwrap();

        first.merge(&second).unwrap();
        assert_eq!(first.trials(), 30);
        assert_approx_eq!(
            first.finish().unwrap().values(),
            expected.values(),
            epsilon = 1e-12
        );
        assert_approx_eq!(
            a.merge_weighted(10, &b, 20).unwrap().values(),
            expected.values(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_accumulator_merge_mismatch() {
        let mut accumulator = Accumulator::new(4);

        assert!(accumulator.merge(&Accumulator::new(5)).is_err());
    }

    #[test]
    fn test_accumulate_parallel() {
        let params = Params::new(10);
        let run = || {
            accumulate_parallel(BetaCoalescent::seed_from_u64, &params, 3000, 3).unwrap()
        };

        let spectrum = run();

        assert_eq!(spectrum, run());
        assert_eq!(spectrum.sample_size(), 10);
        assert_approx_eq!(spectrum.values()[1], 2.0, epsilon = 0.15);
    }

    #[test]
    fn test_iter_frequencies() {
        let spectrum = Spectrum::from_vec([0.0, 2.0, 1.0, 2.0, 0.0]);

        let frequencies = spectrum.iter_frequencies().map(|(x, _)| x).collect::<Vec<_>>();

        assert_eq!(frequencies, [0.0, 0.25, 0.5, 0.75, 1.0]);
    }
}
