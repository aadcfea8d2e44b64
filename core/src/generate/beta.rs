use rand::{Rng, SeedableRng};
use rand_distr::Exp1;
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::{
    tree::{CladeId, TreeBuilder},
    utils::{ln_beta, ln_binomial},
    Tree,
};

use super::{Generator, Params};

/// Skew used while selection is acting: the Bolthausen-Sznitman coalescent.
const SELECTIVE_SKEW: f64 = 1.0;

/// The Beta-coalescent.
///
/// Lineages are merged backwards in time, starting from the sampled leaves at time zero. With b
/// lineages present, each particular group of k of them merges at rate
///
/// λ(b, k) = B(k − α, b − k + α) / B(2 − α, α),
///
/// where α is the skew parameter. At α = 2 this is Kingman's coalescent with only pairwise
/// mergers, and at α = 1 it is the Bolthausen-Sznitman coalescent.
///
/// If the parameters specify a selection duration s, merging follows the Bolthausen-Sznitman
/// coalescent until time s, and the coalescent with the configured skew afterwards.
///
/// Branch lengths are in coalescent time units, and the root branch has length zero.
#[derive(Debug)]
pub struct BetaCoalescent<R = Xoshiro256PlusPlus> {
    rng: R,
    cache: RateCache,
}

impl BetaCoalescent<Xoshiro256PlusPlus> {
    /// Creates a new generator seeded from a number.
    pub fn seed_from_u64(seed: u64) -> Self {
        Self::new(Xoshiro256PlusPlus::seed_from_u64(seed))
    }

    /// Creates a new generator seeded from system entropy.
    pub fn from_entropy() -> Self {
        Self::new(Xoshiro256PlusPlus::from_rng(&mut rand::rng()))
    }
}

impl<R> BetaCoalescent<R>
where
    R: Rng,
{
    /// Creates a new generator using the provided source of randomness.
    pub fn new(rng: R) -> Self {
        Self {
            rng,
            cache: RateCache::default(),
        }
    }
}

impl<R> Generator for BetaCoalescent<R>
where
    R: Rng,
{
    fn generate(&mut self, params: &Params) -> Tree {
        let n = params.sample_size();
        let selection = params.selection_duration().unwrap_or(0.0);

        let mut builder = TreeBuilder::with_leaves(n);
        let mut lineages = (0..n)
            .map(|_| Lineage {
                id: builder.add_leaf(0.0),
                birth: 0.0,
            })
            .collect::<Vec<_>>();

        let mut time = 0.0;
        while lineages.len() > 1 {
            let selective = time < selection;
            let skew = if selective {
                SELECTIVE_SKEW
            } else {
                params.skew()
            };

            let rates = self.cache.get(skew, lineages.len());
            let wait = self.rng.sample::<f64, _>(Exp1) / rates.total;

            if selective && time + wait >= selection {
                // Memoryless, so we can restart from the boundary with the neutral rates
                time = selection;
                continue;
            }
            time += wait;

            let merging = rates.sample_merger_size(&mut self.rng);
            let children = (0..merging)
                .map(|_| {
                    let lineage = lineages.swap_remove(self.rng.random_range(0..lineages.len()));
                    builder.set_branch_length(lineage.id, time - lineage.birth);
                    lineage.id
                })
                .collect();

            lineages.push(Lineage {
                id: builder.add_internal(children, 0.0),
                birth: time,
            });
        }

        builder.build(lineages[0].id)
    }
}

#[derive(Clone, Copy, Debug)]
struct Lineage {
    id: CladeId,
    birth: f64,
}

/// Merger rates with a given number of lineages.
#[derive(Clone, Debug, PartialEq)]
struct Rates {
    total: f64,
    // Cumulative total rate of mergers of size 2, 3, ..., b
    cumulative: Vec<f64>,
}

impl Rates {
    fn new(skew: f64, lineages: usize) -> Self {
        let b = lineages as u64;

        let cumulative = if skew >= Params::KINGMAN {
            vec![(b * (b - 1) / 2) as f64]
        } else {
            let ln_norm = ln_beta(2.0 - skew, skew);

            (2..=b)
                .map(|k| {
                    let k_f = k as f64;
                    let ln_rate = ln_beta(k_f - skew, (b - k) as f64 + skew) - ln_norm;
                    (ln_binomial(b, k) + ln_rate).exp()
                })
                .scan(0.0, |acc, rate| {
                    *acc += rate;
                    Some(*acc)
                })
                .collect()
        };

        Self {
            total: cumulative.last().copied().unwrap_or(0.0),
            cumulative,
        }
    }

    fn sample_merger_size<R>(&self, rng: &mut R) -> usize
    where
        R: Rng,
    {
        let target = rng.random::<f64>() * self.total;
        let index = self
            .cumulative
            .partition_point(|&acc| acc <= target)
            .min(self.cumulative.len() - 1);

        index + 2
    }
}

#[derive(Debug, Default)]
struct RateCache {
    tables: Vec<RateTable>,
}

impl RateCache {
    fn get(&mut self, skew: f64, lineages: usize) -> &Rates {
        let index = match self.tables.iter().position(|table| table.skew == skew) {
            Some(index) => index,
            None => {
                self.tables.push(RateTable {
                    skew,
                    rates: Vec::new(),
                });
                self.tables.len() - 1
            }
        };

        self.tables[index].get(lineages)
    }
}

#[derive(Debug)]
struct RateTable {
    skew: f64,
    rates: Vec<Option<Rates>>,
}

impl RateTable {
    fn get(&mut self, lineages: usize) -> &Rates {
        if self.rates.len() <= lineages {
            self.rates.resize(lineages + 1, None);
        }

        let skew = self.skew;
        self.rates[lineages].get_or_insert_with(|| Rates::new(skew, lineages))
    }
}
