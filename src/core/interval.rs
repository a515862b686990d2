//! A 0-based, half-open genomic interval on a single contig and strand.
//!
//! A [`GenomicInterval`] always stores its coordinates in ascending genomic
//! order (`start < end`), regardless of the strand it sits on. The strand is
//! carried alongside as an annotation, and splice graphs for both strands are
//! built left to right.
//!
//! ```text
//! ================ seq0 ===============
//!
//! | 0 | 1 | 2 | 3 | 4 | 5 | 6 | 7 | 8 |
//! -------------------------------------
//! |   |   | X | X | X | X | O |   |   |  <= seq0:+:2-6
//! |   |   | X | X | X | X | O |   |   |  <= seq0:-:2-6
//! ```
//!
//! ## Parsing intervals
//!
//! Intervals are parsed from the form `<contig>:<strand>:<start>-<end>` (e.g.,
//! `chr1:+:100-1000`). The start must be strictly less than the end for both
//! strands.

use std::collections::VecDeque;
use std::str::FromStr;

use omics::coordinate::interval::interbase;
use omics::coordinate::position::Number;

use crate::core::Strand;

/// An error related to a [`GenomicInterval`].
#[derive(Debug, Eq, PartialEq)]
pub enum Error {
    /// The contig name was empty.
    EmptyContig,

    /// The start position equals the end position, which would result in a
    /// zero-sized interval.
    ZeroSizedInterval,

    /// The start position is greater than the end position.
    StartGreaterThanEnd(Number, Number),

    /// Could not parse an interval from the given value.
    Parse(String),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::EmptyContig => write!(f, "contig name cannot be empty"),
            Error::ZeroSizedInterval => write!(
                f,
                "start position equals end position, which is a zero-sized interval"
            ),
            Error::StartGreaterThanEnd(start, end) => write!(
                f,
                "start position ({start}) cannot be greater than the end position ({end})"
            ),
            Error::Parse(value) => write!(f, "could not parse interval from the value: {value}"),
        }
    }
}

impl std::error::Error for Error {}

/// A [`Result`](std::result::Result) with an [`Error`].
type Result<T> = std::result::Result<T, Error>;

/// A half-open, 0-based interval with an associated strand.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct GenomicInterval {
    /// The contig upon which the interval sits.
    contig: String,

    /// The 0-based, inclusive start position.
    start: Number,

    /// The 0-based, exclusive end position.
    end: Number,

    /// The strand.
    strand: Strand,
}

impl GenomicInterval {
    /// Attempts to create a new [`GenomicInterval`].
    ///
    /// # Examples
    ///
    /// ```
    /// use splicegraph::core::GenomicInterval;
    /// use splicegraph::core::Strand;
    ///
    /// let interval = GenomicInterval::try_new("chr1", 100, 1000, Strand::Negative)?;
    /// assert_eq!(interval.len(), 900);
    ///
    /// let err = GenomicInterval::try_new("chr1", 1000, 100, Strand::Positive).unwrap_err();
    /// assert_eq!(
    ///     err.to_string(),
    ///     "start position (1000) cannot be greater than the end position (100)"
    /// );
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn try_new(
        contig: impl Into<String>,
        start: Number,
        end: Number,
        strand: Strand,
    ) -> Result<Self> {
        let contig = contig.into();

        if contig.is_empty() {
            return Err(Error::EmptyContig);
        }

        if start == end {
            return Err(Error::ZeroSizedInterval);
        }

        if start > end {
            return Err(Error::StartGreaterThanEnd(start, end));
        }

        Ok(Self {
            contig,
            start,
            end,
            strand,
        })
    }

    /// Gets the contig by reference.
    pub fn contig(&self) -> &str {
        &self.contig
    }

    /// Gets the 0-based, inclusive start position.
    pub fn start(&self) -> Number {
        self.start
    }

    /// Gets the 0-based, exclusive end position.
    pub fn end(&self) -> Number {
        self.end
    }

    /// Gets the strand.
    pub fn strand(&self) -> Strand {
        self.strand
    }

    /// Gets the number of bases within the interval.
    ///
    /// This is never zero, as zero-sized intervals cannot be constructed.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> Number {
        self.end - self.start
    }

    /// Indicates whether the two intervals share at least one base on the same
    /// contig. Strand is not considered.
    ///
    /// # Examples
    ///
    /// ```
    /// use splicegraph::core::GenomicInterval;
    ///
    /// let a = "chr1:+:100-200".parse::<GenomicInterval>()?;
    /// let b = "chr1:-:199-300".parse::<GenomicInterval>()?;
    /// let c = "chr1:+:200-300".parse::<GenomicInterval>()?;
    ///
    /// assert!(a.overlaps(&b));
    /// assert!(!a.overlaps(&c));
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn overlaps(&self, other: &GenomicInterval) -> bool {
        self.contig == other.contig && self.start < other.end && other.start < self.end
    }

    /// Indicates whether `other` falls completely within this interval on the
    /// same contig. Strand is not considered.
    pub fn contains(&self, other: &GenomicInterval) -> bool {
        self.contig == other.contig && self.start <= other.start && other.end <= self.end
    }

    /// Indicates whether a position on this interval's contig falls within the
    /// interval.
    pub fn contains_position(&self, position: Number) -> bool {
        self.start <= position && position < self.end
    }

    /// Clamps the span `[start, end)` to this interval, returning the clamped
    /// bounds if any bases remain.
    pub fn clamp_span(&self, start: Number, end: Number) -> Option<(Number, Number)> {
        let start = start.max(self.start);
        let end = end.min(self.end);

        match start < end {
            true => Some((start, end)),
            false => None,
        }
    }

    /// Creates a new interval on the same contig and strand with different
    /// bounds.
    pub fn with_span(&self, start: Number, end: Number) -> Result<GenomicInterval> {
        GenomicInterval::try_new(self.contig.clone(), start, end, self.strand)
    }

    /// Gets the smallest interval on this interval's contig and strand that
    /// covers both intervals.
    pub fn hull(&self, other: &GenomicInterval) -> GenomicInterval {
        GenomicInterval {
            contig: self.contig.clone(),
            start: self.start.min(other.start),
            end: self.end.max(other.end),
            strand: self.strand,
        }
    }

    /// Gets the bases lying strictly between this interval and a downstream
    /// interval, if there are any.
    ///
    /// # Examples
    ///
    /// ```
    /// use splicegraph::core::GenomicInterval;
    ///
    /// let a = "chr1:+:100-300".parse::<GenomicInterval>()?;
    /// let b = "chr1:+:500-700".parse::<GenomicInterval>()?;
    ///
    /// assert_eq!(a.gap(&b), Some("chr1:+:300-500".parse::<GenomicInterval>()?));
    /// assert_eq!(b.gap(&a), None);
    /// assert_eq!(a.hull(&b), "chr1:+:100-700".parse::<GenomicInterval>()?);
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn gap(&self, downstream: &GenomicInterval) -> Option<GenomicInterval> {
        match self.end < downstream.start {
            true => Some(GenomicInterval {
                contig: self.contig.clone(),
                start: self.end,
                end: downstream.start,
                strand: self.strand,
            }),
            false => None,
        }
    }
}

impl TryFrom<interbase::Interval> for GenomicInterval {
    type Error = Error;

    fn try_from(interval: interbase::Interval) -> Result<Self> {
        let strand = Strand::from(interval.strand());
        let contig = interval.contig().as_str().to_string();

        let (start, end) = interval.into_coordinates();
        let (_, _, start) = start.into_parts();
        let (_, _, end) = end.into_parts();

        // NOTE: negative-stranded interbase intervals run from the higher
        // position down to the lower one.
        let (start, end) = match strand {
            Strand::Positive => (start.get(), end.get()),
            Strand::Negative => (end.get(), start.get()),
        };

        GenomicInterval::try_new(contig, start, end, strand)
    }
}

impl FromStr for GenomicInterval {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut parts = s.split(':').collect::<VecDeque<_>>();

        if parts.len() != 3 {
            return Err(Error::Parse(s.to_string()));
        }

        // SAFETY: we checked that there are three parts above.
        let contig = parts.pop_front().unwrap();
        let strand = parts
            .pop_front()
            .unwrap()
            .parse::<Strand>()
            .map_err(|_| Error::Parse(s.to_string()))?;

        let (start, end) = parts
            .pop_front()
            .unwrap()
            .split_once('-')
            .ok_or_else(|| Error::Parse(s.to_string()))?;

        let start = start
            .parse::<Number>()
            .map_err(|_| Error::Parse(s.to_string()))?;
        let end = end
            .parse::<Number>()
            .map_err(|_| Error::Parse(s.to_string()))?;

        GenomicInterval::try_new(contig, start, end, strand)
    }
}

impl std::fmt::Display for GenomicInterval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}:{}-{}",
            self.contig, self.strand, self.start, self.end
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_rejects_zero_sized_intervals() {
        let err = GenomicInterval::try_new("chr1", 10, 10, Strand::Positive).unwrap_err();
        assert_eq!(err, Error::ZeroSizedInterval);
    }

    #[test]
    fn it_rejects_empty_contigs() {
        let err = GenomicInterval::try_new("", 0, 10, Strand::Positive).unwrap_err();
        assert_eq!(err.to_string(), "contig name cannot be empty");
    }

    #[test]
    fn it_parses_and_displays_intervals() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let interval = "chr2:-:500-700".parse::<GenomicInterval>()?;

        assert_eq!(interval.contig(), "chr2");
        assert_eq!(interval.strand(), Strand::Negative);
        assert_eq!(interval.start(), 500);
        assert_eq!(interval.end(), 700);
        assert_eq!(interval.to_string(), "chr2:-:500-700");

        Ok(())
    }

    #[test]
    fn it_fails_to_parse_malformed_intervals() {
        for value in ["chr1:100-200", "chr1:?:100-200", "chr1:+:100", "chr1:+:a-200"] {
            let err = value.parse::<GenomicInterval>().unwrap_err();
            assert_eq!(err, Error::Parse(value.to_string()));
        }
    }

    #[test]
    fn it_converts_from_omics_intervals() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let interval = "seq0:+:100-200".parse::<interbase::Interval>()?;
        let interval = GenomicInterval::try_from(interval)?;
        assert_eq!(interval, GenomicInterval::try_new("seq0", 100, 200, Strand::Positive)?);

        let interval = "seq0:-:200-100".parse::<interbase::Interval>()?;
        let interval = GenomicInterval::try_from(interval)?;
        assert_eq!(interval, GenomicInterval::try_new("seq0", 100, 200, Strand::Negative)?);

        Ok(())
    }

    #[test]
    fn it_clamps_spans() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let locus = GenomicInterval::try_new("chr1", 100, 1000, Strand::Positive)?;

        assert_eq!(locus.clamp_span(50, 150), Some((100, 150)));
        assert_eq!(locus.clamp_span(900, 1200), Some((900, 1000)));
        assert_eq!(locus.clamp_span(0, 100), None);
        assert!(locus.contains_position(999));
        assert!(!locus.contains_position(1000));

        Ok(())
    }
}
