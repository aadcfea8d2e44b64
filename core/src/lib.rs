#![deny(unsafe_code)]
#![warn(missing_docs)]

//! Monte Carlo estimation of coalescent tree shapes and site frequency spectra.
//!
//! This serves as the core library implementation for the `coalsfs` CLI, but can also be used as
//! a free-standing library.
//!
//! # Overview
//!
//! Random genealogies are produced by a [`Generator`], of which [`BetaCoalescent`] is the built-in
//! implementation. From many such trees, two kinds of summaries can be estimated:
//!
//! - The distribution of a shape statistic, such as the Colless index, by collecting a [`Sample`]
//!   with a [`TrialRunner`] and passing it to an [`Estimator`](distribution::Estimator).
//! - The expected site frequency spectrum, by averaging branch lengths per clade size into a
//!   [`Spectrum`], which can then be rebinned or stored.
//!
//! Either summary can be repeated over a range of selection durations with [`sweep`].
//!
//! # Example
//!
//! Let's estimate the spectrum under Kingman's coalescent, where entry k is known to be 2/k.
//!
//! ```
//! use coalsfs_core::{spectrum, BetaCoalescent, Params};
//!
//! let generator = BetaCoalescent::seed_from_u64(0);
//! let spectrum = spectrum::accumulate(generator, &Params::new(10), 5000)?;
//!
//! assert_eq!(spectrum.sample_size(), 10);
//! assert!((spectrum.values()[1] - 2.0).abs() < 0.1);
//! # Ok::<(), coalsfs_core::error::ConfigError>(())
//! ```

#[cfg(test)]
#[macro_use]
pub(crate) mod approx;

pub mod distribution;

pub mod error;
pub use error::Error;

pub mod generate;
pub use generate::{BetaCoalescent, Generator, Params};

mod parallel;

pub mod spectrum;
pub use spectrum::{BinnedSpectrum, Spectrum};

pub mod sweep;

pub mod trial;
pub use trial::{Sample, TrialRunner};

pub mod tree;
pub use tree::{stat::ShapeStatistic, Tree};

pub mod utils;
