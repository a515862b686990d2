//! Elementary exonic segments.
//!
//! A locus is partitioned, without gaps, into a sequence of [`Segment`]s whose
//! boundaries are justified by the evidence: a change in coverage depth or a
//! splice site. See [`builder::build`] for how boundaries are chosen.

use crate::core::GenomicInterval;
use crate::core::Number;

pub mod builder;

pub use builder::build;

/// A stable identifier for a segment within its locus.
///
/// Identifiers are assigned in ascending genomic order, starting at zero.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct SegmentId(usize);

impl SegmentId {
    /// Creates a new segment identifier.
    pub fn new(value: usize) -> Self {
        Self(value)
    }

    /// Gets the inner value of the identifier.
    pub fn get(&self) -> usize {
        self.0
    }
}

impl std::fmt::Display for SegmentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "s{}", self.0)
    }
}

/// An elementary exonic interval with its mean coverage.
#[derive(Clone, Debug, PartialEq)]
pub struct Segment {
    /// The identifier of the segment within the locus.
    id: SegmentId,

    /// The interval covered by the segment.
    interval: GenomicInterval,

    /// The mean coverage depth across the segment.
    mean_coverage: f64,
}

impl Segment {
    /// Creates a new segment.
    pub fn new(id: SegmentId, interval: GenomicInterval, mean_coverage: f64) -> Self {
        Self {
            id,
            interval,
            mean_coverage,
        }
    }

    /// Gets the identifier of the segment.
    pub fn id(&self) -> SegmentId {
        self.id
    }

    /// Gets the interval of the segment.
    pub fn interval(&self) -> &GenomicInterval {
        &self.interval
    }

    /// Gets the 0-based, inclusive start position.
    pub fn start(&self) -> Number {
        self.interval.start()
    }

    /// Gets the 0-based, exclusive end position.
    pub fn end(&self) -> Number {
        self.interval.end()
    }

    /// Gets the mean coverage depth across the segment.
    pub fn mean_coverage(&self) -> f64 {
        self.mean_coverage
    }

    /// Indicates whether any base of the segment is covered.
    pub fn is_covered(&self) -> bool {
        self.mean_coverage > 0.0
    }
}

impl std::fmt::Display for Segment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} [{}-{}) x{:.2}",
            self.id,
            self.start(),
            self.end(),
            self.mean_coverage
        )
    }
}
