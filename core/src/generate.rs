//! Random tree generation.
//!
//! Generation is a capability: anything implementing [`Generator`] can feed the
//! [`TrialRunner`](crate::TrialRunner) and the [`Accumulator`](crate::spectrum::Accumulator).
//! A reference implementation is provided by [`BetaCoalescent`].

use crate::{error::ConfigError, Tree};

mod beta;
pub use beta::BetaCoalescent;

/// Parameters for generating a tree.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Params {
    sample_size: usize,
    skew: f64,
    selection_duration: Option<f64>,
}

impl Params {
    /// The skew parameter of Kingman's coalescent.
    pub const KINGMAN: f64 = 2.0;

    /// Creates new parameters for trees with the provided number of leaves.
    ///
    /// The skew parameter defaults to [`Params::KINGMAN`], with no selection.
    pub fn new(sample_size: usize) -> Self {
        Self {
            sample_size,
            skew: Self::KINGMAN,
            selection_duration: None,
        }
    }

    /// Returns the number of leaves.
    pub fn sample_size(&self) -> usize {
        self.sample_size
    }

    /// Returns the duration of selection, if any.
    pub fn selection_duration(&self) -> Option<f64> {
        self.selection_duration
    }

    /// Set the duration of the period of selection preceding neutral coalescence.
    pub fn set_selection_duration(mut self, duration: Option<f64>) -> Self {
        self.selection_duration = duration;
        self
    }

    /// Set the skew parameter.
    ///
    /// Smaller values give heavier multiple mergers, see [`BetaCoalescent`].
    pub fn set_skew(mut self, skew: f64) -> Self {
        self.skew = skew;
        self
    }

    /// Returns the skew parameter.
    pub fn skew(&self) -> f64 {
        self.skew
    }

    /// Checks that the parameters describe a valid coalescent.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sample_size < 2 {
            return Err(ConfigError::SampleSizeTooSmall {
                sample_size: self.sample_size,
            });
        }

        if !(1.0..=2.0).contains(&self.skew) {
            return Err(ConfigError::InvalidSkew { skew: self.skew });
        }

        match self.selection_duration {
            Some(duration) if !duration.is_finite() || duration < 0.0 => {
                Err(ConfigError::InvalidSelectionDuration { duration })
            }
            _ => Ok(()),
        }
    }
}

/// A source of random trees.
///
/// Each call must produce a fresh tree, independent of previous calls.
pub trait Generator {
    /// Generates a tree with `params.sample_size()` leaves.
    ///
    /// The parameters are assumed to have been validated.
    fn generate(&mut self, params: &Params) -> Tree;
}

impl<G> Generator for &mut G
where
    G: Generator + ?Sized,
{
    fn generate(&mut self, params: &Params) -> Tree {
        (**self).generate(params)
    }
}

impl<G> Generator for Box<G>
where
    G: Generator + ?Sized,
{
    fn generate(&mut self, params: &Params) -> Tree {
        (**self).generate(params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_params() {
        let params = Params::new(10);

        assert_eq!(params.sample_size(), 10);
        assert_eq!(params.skew(), 2.0);
        assert_eq!(params.selection_duration(), None);
        assert_eq!(params.validate(), Ok(()));
    }

    #[test]
    fn test_validate_sample_size() {
        assert_eq!(
            Params::new(1).validate(),
            Err(ConfigError::SampleSizeTooSmall { sample_size: 1 })
        );
        assert!(Params::new(2).validate().is_ok());
    }

    #[test]
    fn test_validate_skew() {
        assert!(Params::new(5).set_skew(1.0).validate().is_ok());
        assert!(Params::new(5).set_skew(1.5).validate().is_ok());
        assert_eq!(
            Params::new(5).set_skew(2.5).validate(),
            Err(ConfigError::InvalidSkew { skew: 2.5 })
        );
        assert!(Params::new(5).set_skew(f64::NAN).validate().is_err());
    }

    #[test]
    fn test_validate_selection_duration() {
        assert!(Params::new(5)
            .set_selection_duration(Some(0.0))
            .validate()
            .is_ok());
        assert_eq!(
            Params::new(5).set_selection_duration(Some(-1.0)).validate(),
            Err(ConfigError::InvalidSelectionDuration { duration: -1.0 })
        );
        assert!(Params::new(5)
            .set_selection_duration(Some(f64::INFINITY))
            .validate()
            .is_err());
    }
}
