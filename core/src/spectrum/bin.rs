//! Rebinning spectra onto a frequency grid.

use std::{fmt, str::FromStr};

use crate::error::ConfigError;

use super::Spectrum;

/// Fraction of the log-frequency range covered by generated log and logit edges.
const LOG_RANGE: f64 = 0.9;

/// The scale of a frequency grid.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Scale {
    /// Equal-width bins on [0, 1].
    #[default]
    Linear,
    /// Bins equally spaced in log frequency, up to 1.
    Log,
    /// Bins equally spaced in log-odds, symmetric around 1/2.
    Logit,
}

impl Scale {
    fn edges(&self, bins: usize, sample_size: usize) -> Vec<f64> {
        let b = bins as f64;
        let ln_n = (sample_size as f64).ln();

        (0..=bins)
            .map(|i| {
                let i = i as f64;

                match self {
                    Scale::Linear => i / b,
                    Scale::Log => (LOG_RANGE * ln_n * (-1.0 + i / b)).exp(),
                    Scale::Logit => {
                        let x = (LOG_RANGE * ln_n * (-1.0 + 2.0 * i / b)).exp();
                        x / (1.0 + x)
                    }
                }
            })
            .collect()
    }

    fn center(&self, left: f64, right: f64) -> f64 {
        match self {
            Scale::Linear => (left + right) / 2.0,
            Scale::Log | Scale::Logit => (left * right).sqrt(),
        }
    }

    /// Returns the name of the scale.
    pub fn name(&self) -> &'static str {
        match self {
            Scale::Linear => "linear",
            Scale::Log => "log",
            Scale::Logit => "logit",
        }
    }
}

impl fmt::Display for Scale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Scale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "linear" => Ok(Scale::Linear),
            "log" => Ok(Scale::Log),
            "logit" => Ok(Scale::Logit),
            _ => Err(format!("unknown scale '{s}'")),
        }
    }
}

/// How to choose bin edges.
#[derive(Clone, Debug, PartialEq)]
pub enum Bins {
    /// The number of bins, with edges generated from the scale.
    Count(usize),
    /// Explicit edges, which must be finite and strictly increasing.
    Edges(Vec<f64>),
}

impl From<usize> for Bins {
    fn from(count: usize) -> Self {
        Bins::Count(count)
    }
}

impl From<Vec<f64>> for Bins {
    fn from(edges: Vec<f64>) -> Self {
        Bins::Edges(edges)
    }
}

/// A spectrum averaged over frequency bins.
///
/// Bins are right-closed, except the first which also includes its left edge. The value of a bin
/// is its mass divided by its width, so that mass is recovered by multiplying back. Mass at
/// frequencies outside the outer edges is kept separately as underflow and overflow.
#[derive(Clone, Debug, PartialEq)]
pub struct BinnedSpectrum {
    scale: Scale,
    edges: Vec<f64>,
    centers: Vec<f64>,
    widths: Vec<f64>,
    values: Vec<f64>,
    underflow: f64,
    overflow: f64,
}

impl BinnedSpectrum {
    /// Returns the bin centers.
    pub fn centers(&self) -> &[f64] {
        &self.centers
    }

    /// Returns the bin edges, one more than the number of bins.
    pub fn edges(&self) -> &[f64] {
        &self.edges
    }

    /// Returns `true` if there are no bins.
    ///
    /// This can never happen for a successfully binned spectrum.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns the number of bins.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns the mass above the last edge.
    pub fn overflow(&self) -> f64 {
        self.overflow
    }

    /// Returns the scale used for the bins.
    pub fn scale(&self) -> Scale {
        self.scale
    }

    /// Returns the total mass, including underflow and overflow.
    pub fn total_mass(&self) -> f64 {
        self.values
            .iter()
            .zip(self.widths.iter())
            .map(|(v, w)| v * w)
            .sum::<f64>()
            + self.underflow
            + self.overflow
    }

    /// Returns the mass below the first edge.
    pub fn underflow(&self) -> f64 {
        self.underflow
    }

    /// Returns the bin values.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Returns the bin widths.
    pub fn widths(&self) -> &[f64] {
        &self.widths
    }
}

fn check_edges(edges: &[f64]) -> Result<(), ConfigError> {
    if edges.len() < 2 {
        return Err(ConfigError::TooFewEdges { edges: edges.len() });
    }

    let first_invalid = edges
        .iter()
        .enumerate()
        .position(|(i, e)| !e.is_finite() || (i > 0 && *e <= edges[i - 1]));

    match first_invalid {
        Some(index) => Err(ConfigError::UnsortedEdges { index }),
        None => Ok(()),
    }
}

impl Spectrum {
    /// Bins the spectrum by normalized frequency k/n.
    ///
    /// For explicit edges, the scale only determines how bin centers are computed: arithmetic
    /// means for the linear scale, geometric means otherwise. Generated log and logit edges
    /// require a sample size of at least two.
    pub fn bin<B>(&self, scale: Scale, bins: B) -> Result<BinnedSpectrum, ConfigError>
    where
        B: Into<Bins>,
    {
        let edges = match bins.into() {
            Bins::Count(0) => return Err(ConfigError::NoBins),
            Bins::Count(_) if scale != Scale::Linear && self.sample_size() < 2 => {
                // ln(1) = 0 collapses every generated edge onto the same point
                return Err(ConfigError::SampleSizeTooSmall {
                    sample_size: self.sample_size(),
                });
            }
            Bins::Count(count) => scale.edges(count, self.sample_size()),
            Bins::Edges(edges) => {
                check_edges(&edges)?;
                edges
            }
        };

        let (first, last) = (edges[0], edges[edges.len() - 1]);
        let mut masses = vec![0.0; edges.len() - 1];
        let (mut underflow, mut overflow) = (0.0, 0.0);

        for (x, v) in self.iter_frequencies() {
            if x < first {
                underflow += v;
            } else if x > last {
                overflow += v;
            } else {
                let i = edges.partition_point(|&e| e < x).max(1) - 1;
                masses[i] += v;
            }
        }

        let widths = edges.windows(2).map(|w| w[1] - w[0]).collect::<Vec<_>>();
        let centers = edges
            .windows(2)
            .map(|w| scale.center(w[0], w[1]))
            .collect();
        let values = masses
            .into_iter()
            .zip(widths.iter())
            .map(|(mass, width)| mass / width)
            .collect();

        Ok(BinnedSpectrum {
            scale,
            edges,
            centers,
            widths,
            values,
            underflow,
            overflow,
        })
    }
}
