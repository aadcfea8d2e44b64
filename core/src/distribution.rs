//! Empirical distributions of samples.
//!
//! An [`EmpiricalDistribution`] holds both a normalized histogram and a Gaussian kernel density
//! estimate evaluated at the histogram edges, so that either can be rendered.

use std::f64::consts::PI;

use crate::{
    error::{ConfigError, Error, EstimationError},
    generate::Params,
    trial::Sample,
};

/// Rule for choosing the kernel bandwidth relative to the sample standard deviation.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Bandwidth {
    /// Scott's rule, n^(-1/5).
    #[default]
    Scott,
    /// Silverman's rule, (3n/4)^(-1/5).
    Silverman,
}

impl Bandwidth {
    /// Returns the factor the standard deviation is multiplied by, for a sample of size `n`.
    pub fn factor(&self, n: usize) -> f64 {
        let n = n as f64;

        match self {
            Bandwidth::Scott => n.powf(-0.2),
            Bandwidth::Silverman => (0.75 * n).powf(-0.2),
        }
    }
}

/// A histogram with equal-width bins, normalized to integrate to one.
#[derive(Clone, Debug, PartialEq)]
pub struct Histogram {
    edges: Vec<f64>,
    density: Vec<f64>,
}

impl Histogram {
    /// Bins values into equal-width bins spanning their range.
    ///
    /// All bins are half-open, except the last, which includes the maximum.
    fn from_values(values: &[f64], bins: usize) -> Self {
        let (min, max) = values
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), &x| {
                (min.min(x), max.max(x))
            });
        let span = max - min;

        let mut edges = (0..bins)
            .map(|i| min + span * i as f64 / bins as f64)
            .collect::<Vec<_>>();
        edges.push(max);

        let mut counts = vec![0usize; bins];
        for &x in values {
            let mut i = (((x - min) / span) * bins as f64) as usize;
            i = i.min(bins - 1);

            // Guard against rounding putting values next to an edge in the wrong bin
            if i > 0 && x < edges[i] {
                i -= 1;
            } else if i + 1 < bins && x >= edges[i + 1] {
                i += 1;
            }

            counts[i] += 1;
        }

        let total = values.len() as f64;
        let density = counts
            .iter()
            .zip(edges.windows(2))
            .map(|(&count, edge)| count as f64 / (total * (edge[1] - edge[0])))
            .collect();

        Self { edges, density }
    }

    /// Returns the density of each bin.
    pub fn density(&self) -> &[f64] {
        &self.density
    }

    /// Returns the bin edges, one more than the number of bins.
    pub fn edges(&self) -> &[f64] {
        &self.edges
    }

    /// Returns the number of bins.
    pub fn len(&self) -> usize {
        self.density.len()
    }

    /// Returns `true` if there are no bins.
    pub fn is_empty(&self) -> bool {
        self.density.is_empty()
    }
}

/// A Gaussian kernel density estimate.
#[derive(Clone, Debug, PartialEq)]
pub struct Kde {
    points: Vec<f64>,
    bandwidth: f64,
}

impl Kde {
    fn new(values: &[f64], rule: Bandwidth) -> Self {
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1.0);

        Self {
            points: values.to_vec(),
            bandwidth: rule.factor(values.len()) * variance.sqrt(),
        }
    }

    /// Returns the kernel bandwidth.
    pub fn bandwidth(&self) -> f64 {
        self.bandwidth
    }

    /// Evaluates the density at `x`.
    pub fn evaluate(&self, x: f64) -> f64 {
        let h = self.bandwidth;
        let norm = self.points.len() as f64 * h * (2.0 * PI).sqrt();

        self.points
            .iter()
            .map(|point| (-0.5 * ((x - point) / h).powi(2)).exp())
            .sum::<f64>()
            / norm
    }
}

/// The distribution of a sample.
#[derive(Clone, Debug, PartialEq)]
pub struct EmpiricalDistribution {
    histogram: Histogram,
    kde: Kde,
    curve: Vec<f64>,
    params: Option<Params>,
}

impl EmpiricalDistribution {
    /// Returns the kernel density evaluated at each histogram edge.
    pub fn curve(&self) -> &[f64] {
        &self.curve
    }

    /// Returns the histogram.
    pub fn histogram(&self) -> &Histogram {
        &self.histogram
    }

    /// Returns the kernel density estimate.
    pub fn kde(&self) -> &Kde {
        &self.kde
    }

    /// Returns the parameters of the trees the sample was generated from, if known.
    pub fn params(&self) -> Option<&Params> {
        self.params.as_ref()
    }
}

/// Estimates empirical distributions.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Estimator {
    bins: usize,
    bandwidth: Bandwidth,
}

impl Estimator {
    /// Creates a new estimator with the provided number of histogram bins.
    ///
    /// The bandwidth defaults to Scott's rule.
    pub fn new(bins: usize) -> Self {
        Self {
            bins,
            bandwidth: Bandwidth::default(),
        }
    }

    /// Set the bandwidth rule.
    pub fn set_bandwidth(mut self, bandwidth: Bandwidth) -> Self {
        self.bandwidth = bandwidth;
        self
    }

    /// Estimates the distribution of a sample.
    pub fn estimate(&self, sample: &Sample) -> Result<EmpiricalDistribution, Error> {
        if self.bins == 0 {
            return Err(ConfigError::NoBins.into());
        }

        match sample.distinct() {
            0 => return Err(EstimationError::EmptySample.into()),
            distinct @ 1 => return Err(EstimationError::Degenerate { distinct }.into()),
            _ => (),
        }

        let histogram = Histogram::from_values(sample.values(), self.bins);
        let kde = Kde::new(sample.values(), self.bandwidth);
        let curve = histogram.edges.iter().map(|&x| kde.evaluate(x)).collect();

        Ok(EmpiricalDistribution {
            histogram,
            kde,
            curve,
            params: sample.params().copied(),
        })
    }
}

/// Estimates the distribution of a sample, using Scott's rule for the bandwidth.
pub fn estimate(sample: &Sample, bins: usize) -> Result<EmpiricalDistribution, Error> {
    Estimator::new(bins).estimate(sample)
}
