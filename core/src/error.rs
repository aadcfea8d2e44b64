//! Error types.
//!
//! Failures fall into four categories, see [`ErrorKind`]. Rejected trials are not errors: they are
//! handled by retrying inside [`TrialRunner`](crate::TrialRunner) and never surface here.

use std::{fmt, io, path::PathBuf};

/// The category of an [`Error`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    /// Invalid parameters, detected before any simulation starts.
    Configuration,
    /// A statistical estimate is undefined for the given sample.
    Estimation,
    /// A persisted spectrum has the wrong shape or content.
    Format,
    /// A persisted spectrum does not exist.
    NotFound,
    /// Any other I/O failure.
    Io,
}

/// Any error produced by this crate.
#[derive(Debug)]
pub enum Error {
    /// See [`ConfigError`].
    Config(ConfigError),
    /// See [`EstimationError`].
    Estimation(EstimationError),
    /// See [`FormatError`].
    Format(FormatError),
    /// No file at the given path.
    NotFound(PathBuf),
    /// Underlying I/O error.
    Io(io::Error),
}

impl Error {
    /// Returns the category of the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Config(_) => ErrorKind::Configuration,
            Error::Estimation(_) => ErrorKind::Estimation,
            Error::Format(_) => ErrorKind::Format,
            Error::NotFound(_) => ErrorKind::NotFound,
            Error::Io(_) => ErrorKind::Io,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(e) => write!(f, "invalid configuration: {e}"),
            Error::Estimation(e) => write!(f, "estimation failed: {e}"),
            Error::Format(e) => write!(f, "invalid spectrum file: {e}"),
            Error::NotFound(path) => write!(f, "no spectrum file at '{}'", path.display()),
            Error::Io(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Config(e) => Some(e),
            Error::Estimation(e) => Some(e),
            Error::Format(e) => Some(e),
            Error::NotFound(_) => None,
            Error::Io(e) => Some(e),
        }
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<EstimationError> for Error {
    fn from(e: EstimationError) -> Self {
        Self::Estimation(e)
    }
}

impl From<FormatError> for Error {
    fn from(e: FormatError) -> Self {
        Self::Format(e)
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

/// Invalid parameters.
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigError {
    /// Trees need at least two leaves.
    SampleSizeTooSmall {
        /// The requested number of leaves.
        sample_size: usize,
    },
    /// Skew must lie in [1, 2].
    InvalidSkew {
        /// The requested skew.
        skew: f64,
    },
    /// Selection duration must be finite and non-negative.
    InvalidSelectionDuration {
        /// The requested duration.
        duration: f64,
    },
    /// At least one trial is required.
    NoTrials,
    /// At least one bin is required.
    NoBins,
    /// Explicit binning needs at least two edges.
    TooFewEdges {
        /// The number of edges provided.
        edges: usize,
    },
    /// Explicit edges must be finite and strictly increasing.
    UnsortedEdges {
        /// Index of the first edge that is not finite or not above its predecessor.
        index: usize,
    },
    /// Spectra to be combined must have the same sample size.
    SampleSizeMismatch {
        /// Sample size of the left-hand spectrum.
        expected: usize,
        /// Sample size of the right-hand spectrum.
        found: usize,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::SampleSizeTooSmall { sample_size } => {
                write!(f, "sample size must be at least 2 (found {sample_size})")
            }
            ConfigError::InvalidSkew { skew } => {
                write!(f, "skew parameter must lie in [1, 2] (found {skew})")
            }
            ConfigError::InvalidSelectionDuration { duration } => write!(
                f,
                "selection duration must be finite and non-negative (found {duration})"
            ),
            ConfigError::NoTrials => f.write_str("number of trials must be at least 1"),
            ConfigError::NoBins => f.write_str("number of bins must be at least 1"),
            ConfigError::TooFewEdges { edges } => {
                write!(f, "at least 2 bin edges are required (found {edges})")
            }
            ConfigError::UnsortedEdges { index } => write!(
                f,
                "bin edges must be finite and strictly increasing (violated at edge {index})"
            ),
            ConfigError::SampleSizeMismatch { expected, found } => write!(
                f,
                "cannot combine spectra with sample sizes {expected} and {found}"
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

/// A statistical estimate that is undefined for the sample at hand.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum EstimationError {
    /// The sample contains no observations.
    EmptySample,
    /// Kernel density estimation needs at least two distinct values.
    Degenerate {
        /// Number of distinct values in the sample.
        distinct: usize,
    },
}

impl fmt::Display for EstimationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EstimationError::EmptySample => f.write_str("sample is empty"),
            EstimationError::Degenerate { distinct } => write!(
                f,
                "kernel density requires at least 2 distinct values (found {distinct})"
            ),
        }
    }
}

impl std::error::Error for EstimationError {}

/// A persisted spectrum with the wrong shape or content.
#[derive(Clone, Debug, PartialEq)]
pub enum FormatError {
    /// No values.
    Empty,
    /// Fewer than two values, so no sample size can be derived.
    TooShort {
        /// Number of values found.
        len: usize,
    },
    /// A two-dimensional payload.
    NotOneDimensional {
        /// Number of non-empty lines.
        rows: usize,
        /// Largest number of values on a line.
        columns: usize,
    },
    /// A token that does not parse as a float.
    InvalidValue {
        /// The offending token.
        token: String,
    },
    /// A negative value.
    Negative {
        /// Position of the value.
        index: usize,
        /// The value.
        value: f64,
    },
    /// An infinite or NaN value.
    NonFinite {
        /// Position of the value.
        index: usize,
        /// The value.
        value: f64,
    },
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatError::Empty => f.write_str("file contains no values"),
            FormatError::TooShort { len } => {
                write!(f, "expected at least 2 values, found {len}")
            }
            FormatError::NotOneDimensional { rows, columns } => write!(
                f,
                "expected a one-dimensional vector, found object with shape ({rows}, {columns})"
            ),
            FormatError::InvalidValue { token } => {
                write!(f, "failed to parse '{token}' as a number")
            }
            FormatError::Negative { index, value } => {
                write!(f, "expected non-negative values, found {value} at index {index}")
            }
            FormatError::NonFinite { index, value } => {
                write!(f, "expected finite values, found {value} at index {index}")
            }
        }
    }
}

impl std::error::Error for FormatError {}
