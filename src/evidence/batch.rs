//! The aggregated evidence for a single locus.

use std::collections::BTreeMap;

use omics::coordinate::position::Number;
use rust_lapper as lapper;

use crate::core::GenomicInterval;
use crate::warning::Warning;

/// The inner value of the coverage lookup data structure.
type Iv = lapper::Interval<Number, u64>;

/// A maximal run of bases covered to the same, non-zero depth.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Run {
    /// The 0-based, inclusive start position.
    pub start: Number,

    /// The 0-based, exclusive end position.
    pub end: Number,

    /// The depth of coverage.
    pub depth: u64,
}

/// A splice junction, identified by its splice sites.
///
/// Sites are positions on the genomic axis: `donor` is the exclusive end of
/// the upstream exon and `acceptor` is the inclusive start of the downstream
/// exon. A well-formed junction has `donor < acceptor`.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Junction {
    /// The donor site.
    pub donor: Number,

    /// The acceptor site.
    pub acceptor: Number,
}

impl std::fmt::Display for Junction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}^{}", self.donor, self.acceptor)
    }
}

/// A paired-end link between two mate spans, stored in ascending order.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Link {
    /// The `[start, end)` span of the upstream mate.
    pub first: (Number, Number),

    /// The `[start, end)` span of the downstream mate.
    pub second: (Number, Number),
}

impl Link {
    /// Creates a new link, ordering the two mate spans.
    pub fn new(a: (Number, Number), b: (Number, Number)) -> Self {
        match a <= b {
            true => Self {
                first: a,
                second: b,
            },
            false => Self {
                first: b,
                second: a,
            },
        }
    }
}

/// The normalized evidence for one locus.
///
/// A batch is immutable once the [collector](crate::evidence::collector) hands
/// it downstream.
#[derive(Debug)]
pub struct Batch {
    /// The locus.
    locus: GenomicInterval,

    /// Sorted, non-overlapping coverage runs within the locus.
    runs: Vec<Run>,

    /// An interval lookup over `runs`.
    lookup: lapper::Lapper<Number, u64>,

    /// Junction read counts keyed by splice sites.
    junctions: BTreeMap<Junction, u64>,

    /// Paired-end fragment counts keyed by mate spans.
    links: BTreeMap<Link, u64>,

    /// Warnings raised while collecting.
    warnings: Vec<Warning>,
}

impl Batch {
    /// Creates a new batch.
    ///
    /// `runs` must be sorted and non-overlapping.
    pub(crate) fn new(
        locus: GenomicInterval,
        runs: Vec<Run>,
        junctions: BTreeMap<Junction, u64>,
        links: BTreeMap<Link, u64>,
        warnings: Vec<Warning>,
    ) -> Self {
        let lookup = lapper::Lapper::new(
            runs.iter()
                .map(|run| Iv {
                    start: run.start,
                    stop: run.end,
                    val: run.depth,
                })
                .collect(),
        );

        Self {
            locus,
            runs,
            lookup,
            junctions,
            links,
            warnings,
        }
    }

    /// Gets the locus.
    pub fn locus(&self) -> &GenomicInterval {
        &self.locus
    }

    /// Gets the coverage runs.
    pub fn runs(&self) -> &[Run] {
        &self.runs
    }

    /// Gets the junction counts keyed by splice sites.
    pub fn junctions(&self) -> &BTreeMap<Junction, u64> {
        &self.junctions
    }

    /// Gets the paired-end link counts.
    pub fn links(&self) -> &BTreeMap<Link, u64> {
        &self.links
    }

    /// Gets the warnings raised while collecting.
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Gets the coverage depth at a single position.
    ///
    /// # Examples
    ///
    /// ```
    /// use splicegraph::evidence::collect;
    /// use splicegraph::evidence::Record;
    ///
    /// let locus = "chr1:+:100-1000".parse()?;
    /// let records = vec![Record::Coverage {
    ///     interval: "chr1:+:100-500".parse()?,
    ///     depth: 10,
    /// }];
    ///
    /// let batch = collect(&locus, records)?;
    /// assert_eq!(batch.depth_at(100), 10);
    /// assert_eq!(batch.depth_at(500), 0);
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn depth_at(&self, position: Number) -> u64 {
        self.lookup
            .find(position, position + 1)
            .map(|iv| iv.val)
            .sum()
    }

    /// Gets the mean coverage depth across `[start, end)`.
    pub fn mean_coverage(&self, start: Number, end: Number) -> f64 {
        if start >= end {
            return 0.0;
        }

        let total = self
            .lookup
            .find(start, end)
            .map(|iv| (iv.stop.min(end) - iv.start.max(start)) * iv.val)
            .sum::<u64>();

        total as f64 / (end - start) as f64
    }
}
