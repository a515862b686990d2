//! A builder for a [`Config`].

use std::sync::Arc;

use omics::coordinate::position::Number;

use crate::config::Config;
use crate::config::MinSupport;
use crate::config::DEFAULT_BOUNDARY_MERGE_TOLERANCE;
use crate::config::DEFAULT_CONFIDENCE_FLOOR;
use crate::config::DEFAULT_INTRON_RETENTION_CUTOFF;
use crate::config::DEFAULT_MAX_PATHS_PER_LOCUS;
use crate::config::DEFAULT_MIN_SUPPORT;
use crate::isoform::abundance::Normalizer;
use crate::isoform::abundance::Raw;

/// An error related to a [`Builder`].
#[derive(Debug, PartialEq)]
pub enum Error {
    /// The boundary merge tolerance was negative.
    NegativeTolerance(i64),

    /// The minimum support was negative or not a finite number.
    InvalidMinSupport(MinSupport),

    /// The maximum number of paths per locus was zero.
    ZeroPathCap,

    /// The confidence floor was outside of `[0, 1]`.
    InvalidConfidenceFloor(f64),

    /// The intron retention cutoff was outside of `[0, 1]`.
    InvalidRetentionCutoff(f64),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::NegativeTolerance(value) => {
                write!(f, "boundary merge tolerance cannot be negative: {value}")
            }
            Error::InvalidMinSupport(value) => write!(
                f,
                "minimum support must be a finite, non-negative number: {}",
                value.value()
            ),
            Error::ZeroPathCap => write!(f, "maximum paths per locus must be greater than zero"),
            Error::InvalidConfidenceFloor(value) => {
                write!(f, "confidence floor must be within [0, 1]: {value}")
            }
            Error::InvalidRetentionCutoff(value) => {
                write!(f, "intron retention cutoff must be within [0, 1]: {value}")
            }
        }
    }
}

impl std::error::Error for Error {}

/// A [`Result`](std::result::Result) with an [`Error`].
type Result<T> = std::result::Result<T, Error>;

/// A builder for a [`Config`].
#[derive(Debug)]
pub struct Builder {
    /// The boundary merge tolerance as provided by the caller.
    boundary_merge_tolerance: i64,

    /// The minimum support.
    min_support: MinSupport,

    /// The maximum number of paths per locus.
    max_paths_per_locus: usize,

    /// The confidence floor.
    confidence_floor: f64,

    /// The intron retention cutoff.
    intron_retention_cutoff: f64,

    /// The abundance normalizer.
    normalizer: Arc<dyn Normalizer>,
}

impl Builder {
    /// Sets the boundary merge tolerance (in bases).
    ///
    /// The value is accepted as signed so that values coming from the outside
    /// world can be validated rather than silently wrapped.
    pub fn boundary_merge_tolerance(mut self, bases: i64) -> Self {
        self.boundary_merge_tolerance = bases;
        self
    }

    /// Sets the minimum support for evidence edges.
    pub fn min_support(mut self, min_support: MinSupport) -> Self {
        self.min_support = min_support;
        self
    }

    /// Sets the maximum number of paths assembled per locus.
    pub fn max_paths_per_locus(mut self, cap: usize) -> Self {
        self.max_paths_per_locus = cap;
        self
    }

    /// Sets the confidence floor.
    pub fn confidence_floor(mut self, floor: f64) -> Self {
        self.confidence_floor = floor;
        self
    }

    /// Sets the intron retention cutoff.
    pub fn intron_retention_cutoff(mut self, cutoff: f64) -> Self {
        self.intron_retention_cutoff = cutoff;
        self
    }

    /// Sets the abundance normalizer.
    pub fn normalizer(mut self, normalizer: impl Normalizer + 'static) -> Self {
        self.normalizer = Arc::new(normalizer);
        self
    }

    /// Consumes `self` to attempt to build a [`Config`].
    ///
    /// # Examples
    ///
    /// ```
    /// use splicegraph::config::Builder;
    /// use splicegraph::config::MinSupport;
    ///
    /// let config = Builder::default()
    ///     .boundary_merge_tolerance(3)
    ///     .min_support(MinSupport::Relative(0.05))
    ///     .max_paths_per_locus(10)
    ///     .confidence_floor(0.2)
    ///     .try_build()?;
    ///
    /// assert_eq!(config.boundary_merge_tolerance(), 3);
    /// assert_eq!(config.max_paths_per_locus(), 10);
    ///
    /// let err = Builder::default()
    ///     .boundary_merge_tolerance(-1)
    ///     .try_build()
    ///     .unwrap_err();
    /// assert_eq!(err.to_string(), "boundary merge tolerance cannot be negative: -1");
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn try_build(self) -> Result<Config> {
        let boundary_merge_tolerance = Number::try_from(self.boundary_merge_tolerance)
            .map_err(|_| Error::NegativeTolerance(self.boundary_merge_tolerance))?;

        let support = self.min_support.value();
        if !support.is_finite() || support < 0.0 {
            return Err(Error::InvalidMinSupport(self.min_support));
        }

        if self.max_paths_per_locus == 0 {
            return Err(Error::ZeroPathCap);
        }

        if !(0.0..=1.0).contains(&self.confidence_floor) {
            return Err(Error::InvalidConfidenceFloor(self.confidence_floor));
        }

        if !(0.0..=1.0).contains(&self.intron_retention_cutoff) {
            return Err(Error::InvalidRetentionCutoff(self.intron_retention_cutoff));
        }

        Ok(Config {
            boundary_merge_tolerance,
            min_support: self.min_support,
            max_paths_per_locus: self.max_paths_per_locus,
            confidence_floor: self.confidence_floor,
            intron_retention_cutoff: self.intron_retention_cutoff,
            normalizer: self.normalizer,
        })
    }
}

impl Default for Builder {
    fn default() -> Self {
        Self {
            boundary_merge_tolerance: DEFAULT_BOUNDARY_MERGE_TOLERANCE as i64,
            min_support: DEFAULT_MIN_SUPPORT,
            max_paths_per_locus: DEFAULT_MAX_PATHS_PER_LOCUS,
            confidence_floor: DEFAULT_CONFIDENCE_FLOOR,
            intron_retention_cutoff: DEFAULT_INTRON_RETENTION_CUTOFF,
            normalizer: Arc::new(Raw),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_builds_the_default_configuration() -> std::result::Result<(), Box<dyn std::error::Error>>
    {
        let config = Builder::default().try_build()?;

        assert_eq!(config.boundary_merge_tolerance(), 5);
        assert_eq!(config.min_support(), MinSupport::Absolute(3.0));
        assert_eq!(config.max_paths_per_locus(), 100);
        assert_eq!(config.confidence_floor(), 0.1);
        assert_eq!(config.intron_retention_cutoff(), 0.1);

        Ok(())
    }

    #[test]
    fn it_rejects_negative_tolerances() {
        let err = Builder::default()
            .boundary_merge_tolerance(-4)
            .try_build()
            .unwrap_err();
        assert_eq!(err, Error::NegativeTolerance(-4));
    }

    #[test]
    fn it_rejects_invalid_minimum_support() {
        let err = Builder::default()
            .min_support(MinSupport::Absolute(-1.0))
            .try_build()
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "minimum support must be a finite, non-negative number: -1"
        );

        let err = Builder::default()
            .min_support(MinSupport::Relative(f64::NAN))
            .try_build()
            .unwrap_err();
        assert!(matches!(err, Error::InvalidMinSupport(_)));
    }

    #[test]
    fn it_rejects_a_zero_path_cap() {
        let err = Builder::default()
            .max_paths_per_locus(0)
            .try_build()
            .unwrap_err();
        assert_eq!(err, Error::ZeroPathCap);
    }

    #[test]
    fn it_rejects_confidence_floors_outside_the_unit_interval() {
        for floor in [-0.1, 1.5, f64::NAN] {
            let err = Builder::default()
                .confidence_floor(floor)
                .try_build()
                .unwrap_err();
            assert!(matches!(err, Error::InvalidConfidenceFloor(_)));
        }
    }

    #[test]
    fn it_rejects_retention_cutoffs_outside_the_unit_interval(
    ) -> std::result::Result<(), Box<dyn std::error::Error>> {
        for cutoff in [-0.5, 1.01, f64::INFINITY] {
            let err = Builder::default()
                .intron_retention_cutoff(cutoff)
                .try_build()
                .unwrap_err();
            assert!(matches!(err, Error::InvalidRetentionCutoff(_)));
        }

        let err = Builder::default()
            .intron_retention_cutoff(2.0)
            .try_build()
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "intron retention cutoff must be within [0, 1]: 2"
        );

        let config = Builder::default().intron_retention_cutoff(0.5).try_build()?;
        assert_eq!(config.intron_retention_cutoff(), 0.5);

        Ok(())
    }
}
