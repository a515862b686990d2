//! Read-only configuration for a run of the assembler.
//!
//! A [`Config`] cannot be instantiated directly. Instead, use a
//! [`builder::Builder`], which validates every option before any locus is
//! processed. Once built, a [`Config`] is immutable and may be shared by
//! reference across any number of parallel locus assemblies.

use std::sync::Arc;

use omics::coordinate::position::Number;

use crate::isoform::abundance::Normalizer;

pub mod builder;

pub use builder::Builder;

/// The default boundary merge tolerance (in bases).
pub const DEFAULT_BOUNDARY_MERGE_TOLERANCE: Number = 5;

/// The default minimum edge support.
pub const DEFAULT_MIN_SUPPORT: MinSupport = MinSupport::Absolute(3.0);

/// The default maximum number of paths assembled per locus.
pub const DEFAULT_MAX_PATHS_PER_LOCUS: usize = 100;

/// The default confidence floor for reported isoforms.
pub const DEFAULT_CONFIDENCE_FLOOR: f64 = 0.1;

/// The default intron retention cutoff.
pub const DEFAULT_INTRON_RETENTION_CUTOFF: f64 = 0.1;

/// The minimum support an evidence edge needs to survive simplification.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MinSupport {
    /// An absolute weight (read count or depth).
    Absolute(f64),

    /// A fraction of the local coverage, which is the larger of the mean
    /// coverages of the two segments joined by the edge.
    Relative(f64),
}

impl MinSupport {
    /// Resolves the threshold for an edge joining two segments with the
    /// provided mean coverages.
    ///
    /// # Examples
    ///
    /// ```
    /// use splicegraph::config::MinSupport;
    ///
    /// assert_eq!(MinSupport::Absolute(5.0).threshold(10.0, 100.0), 5.0);
    /// assert_eq!(MinSupport::Relative(0.1).threshold(10.0, 100.0), 10.0);
    /// ```
    pub fn threshold(&self, from_coverage: f64, to_coverage: f64) -> f64 {
        match self {
            MinSupport::Absolute(value) => *value,
            MinSupport::Relative(fraction) => fraction * from_coverage.max(to_coverage),
        }
    }

    /// Gets the raw value configured for the threshold.
    pub fn value(&self) -> f64 {
        match self {
            MinSupport::Absolute(value) => *value,
            MinSupport::Relative(value) => *value,
        }
    }
}

impl std::fmt::Display for MinSupport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MinSupport::Absolute(value) => write!(f, "{value}"),
            MinSupport::Relative(value) => write!(f, "{value}x local coverage"),
        }
    }
}

/// The configuration for assembling isoforms.
#[derive(Clone, Debug)]
pub struct Config {
    /// Boundaries closer than or equal to this many bases are merged.
    boundary_merge_tolerance: Number,

    /// The minimum support for evidence edges.
    min_support: MinSupport,

    /// The maximum number of paths assembled for a single locus.
    max_paths_per_locus: usize,

    /// Isoforms with a confidence below this value are not reported.
    confidence_floor: f64,

    /// Intronic coverage below this fraction of the flanking exon coverage is
    /// treated as noise rather than a retained intron.
    intron_retention_cutoff: f64,

    /// The abundance normalization.
    normalizer: Arc<dyn Normalizer>,
}

impl Config {
    /// Gets the boundary merge tolerance (in bases).
    pub fn boundary_merge_tolerance(&self) -> Number {
        self.boundary_merge_tolerance
    }

    /// Gets the minimum support for evidence edges.
    pub fn min_support(&self) -> MinSupport {
        self.min_support
    }

    /// Gets the maximum number of paths assembled per locus.
    pub fn max_paths_per_locus(&self) -> usize {
        self.max_paths_per_locus
    }

    /// Gets the confidence floor.
    pub fn confidence_floor(&self) -> f64 {
        self.confidence_floor
    }

    /// Gets the intron retention cutoff.
    ///
    /// A covered segment lying inside a junction is only considered a
    /// retained intron when its mean coverage is at least this fraction of the
    /// mean coverage of the two exons the junction joins.
    pub fn intron_retention_cutoff(&self) -> f64 {
        self.intron_retention_cutoff
    }

    /// Gets the abundance normalizer.
    pub fn normalizer(&self) -> &dyn Normalizer {
        self.normalizer.as_ref()
    }

    /// Indicates whether two positions are within the boundary merge
    /// tolerance of one another.
    pub fn within_tolerance(&self, a: Number, b: Number) -> bool {
        a.abs_diff(b) <= self.boundary_merge_tolerance
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            boundary_merge_tolerance: DEFAULT_BOUNDARY_MERGE_TOLERANCE,
            min_support: DEFAULT_MIN_SUPPORT,
            max_paths_per_locus: DEFAULT_MAX_PATHS_PER_LOCUS,
            confidence_floor: DEFAULT_CONFIDENCE_FLOOR,
            intron_retention_cutoff: DEFAULT_INTRON_RETENTION_CUTOFF,
            normalizer: Arc::new(crate::isoform::abundance::Raw),
        }
    }
}
