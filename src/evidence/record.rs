//! A single normalized observation derived from aligned reads.

use crate::core::GenomicInterval;
use crate::core::Strand;

/// The kind of an evidence [`Record`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Kind {
    /// Exonic coverage.
    Coverage,

    /// A spliced-read junction.
    Junction,

    /// A paired-end link.
    Pairing,
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Kind::Coverage => write!(f, "coverage"),
            Kind::Junction => write!(f, "junction"),
            Kind::Pairing => write!(f, "pairing"),
        }
    }
}

/// One normalized observation.
///
/// No further evidence types are anticipated, so this is a closed set of
/// variants rather than an extensible trait.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Record {
    /// A run of bases covered to a given depth.
    Coverage {
        /// The covered interval.
        interval: GenomicInterval,

        /// The depth of coverage across the interval.
        depth: u32,
    },

    /// A splice junction observed in spliced reads.
    ///
    /// The flanks are given in genomic order: the donor flank ends at the
    /// donor site and the acceptor flank begins at the acceptor site. On the
    /// negative strand this means the "donor" is the biological acceptor;
    /// graphs are always built in ascending genomic order.
    Junction {
        /// The aligned block ending at the donor site.
        donor: GenomicInterval,

        /// The aligned block beginning at the acceptor site.
        acceptor: GenomicInterval,

        /// The number of supporting reads.
        count: u32,
    },

    /// A link between the two mates of paired-end fragments.
    Pairing {
        /// The interval of the first mate.
        first: GenomicInterval,

        /// The interval of the second mate.
        second: GenomicInterval,

        /// The number of supporting fragments.
        count: u32,
    },
}

impl Record {
    /// Gets the kind of the record.
    pub fn kind(&self) -> Kind {
        match self {
            Record::Coverage { .. } => Kind::Coverage,
            Record::Junction { .. } => Kind::Junction,
            Record::Pairing { .. } => Kind::Pairing,
        }
    }

    /// Gets the support carried by the record (depth or count).
    pub fn support(&self) -> u32 {
        match self {
            Record::Coverage { depth, .. } => *depth,
            Record::Junction { count, .. } => *count,
            Record::Pairing { count, .. } => *count,
        }
    }

    /// Gets every interval referenced by the record.
    ///
    /// # Examples
    ///
    /// ```
    /// use splicegraph::evidence::Record;
    ///
    /// let record = Record::Junction {
    ///     donor: "chr1:+:250-300".parse()?,
    ///     acceptor: "chr1:+:500-550".parse()?,
    ///     count: 20,
    /// };
    ///
    /// assert_eq!(record.intervals().len(), 2);
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn intervals(&self) -> Vec<&GenomicInterval> {
        match self {
            Record::Coverage { interval, .. } => vec![interval],
            Record::Junction {
                donor, acceptor, ..
            } => vec![donor, acceptor],
            Record::Pairing { first, second, .. } => vec![first, second],
        }
    }

    /// Indicates whether any interval of the record overlaps `locus`.
    pub fn overlaps(&self, locus: &GenomicInterval) -> bool {
        self.intervals()
            .into_iter()
            .any(|interval| interval.overlaps(locus))
    }

    /// Gets the first strand referenced by the record that differs from
    /// `strand`, if there is one.
    pub fn conflicting_strand(&self, strand: Strand) -> Option<Strand> {
        self.intervals()
            .into_iter()
            .map(|interval| interval.strand())
            .find(|other| *other != strand)
    }
}

impl std::fmt::Display for Record {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Record::Coverage { interval, depth } => write!(f, "coverage {interval} x{depth}"),
            Record::Junction {
                donor,
                acceptor,
                count,
            } => write!(f, "junction {donor} -> {acceptor} x{count}"),
            Record::Pairing {
                first,
                second,
                count,
            } => write!(f, "pairing {first} <-> {second} x{count}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_accessors() -> Result<(), Box<dyn std::error::Error>> {
        let locus = "chr1:+:100-1000".parse::<GenomicInterval>()?;

        let record = Record::Coverage {
            interval: "chr1:+:50-150".parse()?,
            depth: 7,
        };
        assert_eq!(record.kind(), Kind::Coverage);
        assert_eq!(record.support(), 7);
        assert!(record.overlaps(&locus));
        assert_eq!(record.conflicting_strand(Strand::Positive), None);

        let record = Record::Pairing {
            first: "chr1:+:1000-1100".parse()?,
            second: "chr1:-:1200-1300".parse()?,
            count: 2,
        };
        assert_eq!(record.kind(), Kind::Pairing);
        assert!(!record.overlaps(&locus));
        assert_eq!(
            record.conflicting_strand(Strand::Positive),
            Some(Strand::Negative)
        );

        Ok(())
    }

    #[test]
    fn test_record_display() -> Result<(), Box<dyn std::error::Error>> {
        let record = Record::Junction {
            donor: "chr1:+:250-300".parse()?,
            acceptor: "chr1:+:500-550".parse()?,
            count: 20,
        };

        assert_eq!(
            record.to_string(),
            "junction chr1:+:250-300 -> chr1:+:500-550 x20"
        );

        Ok(())
    }
}
