//! Candidate isoform paths through a splice graph.

use nonempty::NonEmpty;

use crate::graph::SpliceGraph;
use crate::segment::Segment;
use crate::segment::SegmentId;

pub mod assembler;

pub use assembler::assemble;

/// An error related to a [`CandidatePath`].
#[derive(Debug, Eq, PartialEq)]
pub enum Error {
    /// The path contained no segments.
    Empty,

    /// Two consecutive segments are not joined by any edge in the graph.
    MissingEdge(SegmentId, SegmentId),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Empty => write!(f, "a path must contain at least one segment"),
            Error::MissingEdge(from, to) => {
                write!(f, "no edge joins segment {from} to segment {to}")
            }
        }
    }
}

impl std::error::Error for Error {}

/// A [`Result`](std::result::Result) with an [`Error`].
type Result<T> = std::result::Result<T, Error>;

/// An ordered sequence of segments from the source to the sink of a splice
/// graph, representing the exon structure of one isoform.
///
/// Every consecutive pair of segments is joined by an edge of the graph the
/// path was assembled from.
#[derive(Clone, Debug, PartialEq)]
pub struct CandidatePath {
    /// The segments, in genomic order.
    segments: NonEmpty<Segment>,
}

impl CandidatePath {
    /// Attempts to create a new [`CandidatePath`] through `graph`.
    ///
    /// # Examples
    ///
    /// ```
    /// use splicegraph::config::Config;
    /// use splicegraph::evidence::collect;
    /// use splicegraph::evidence::Record;
    /// use splicegraph::graph::construct;
    /// use splicegraph::path::CandidatePath;
    /// use splicegraph::segment::build;
    ///
    /// let config = Config::default();
    /// let locus = "chr1:+:100-700".parse()?;
    /// let records = vec![
    ///     Record::Coverage {
    ///         interval: "chr1:+:100-300".parse()?,
    ///         depth: 10,
    ///     },
    ///     Record::Coverage {
    ///         interval: "chr1:+:500-700".parse()?,
    ///         depth: 10,
    ///     },
    ///     Record::Junction {
    ///         donor: "chr1:+:250-300".parse()?,
    ///         acceptor: "chr1:+:500-550".parse()?,
    ///         count: 20,
    ///     },
    /// ];
    ///
    /// let batch = collect(&locus, records)?;
    /// let segments = build(&batch, &config);
    /// let (graph, _) = construct(segments.clone(), &batch, &config);
    ///
    /// let path = CandidatePath::try_new(
    ///     vec![segments[0].clone(), segments[2].clone()],
    ///     &graph,
    /// )?;
    /// assert_eq!(path.len(), 2);
    ///
    /// let err = CandidatePath::try_new(
    ///     vec![segments[0].clone(), segments[1].clone()],
    ///     &graph,
    /// )
    /// .unwrap_err();
    /// assert_eq!(err.to_string(), "no edge joins segment s0 to segment s1");
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn try_new(segments: Vec<Segment>, graph: &SpliceGraph) -> Result<Self> {
        let segments = NonEmpty::from_vec(segments).ok_or(Error::Empty)?;

        for (from, to) in segments.iter().zip(segments.iter().skip(1)) {
            if !graph.connects(from.id(), to.id()) {
                return Err(Error::MissingEdge(from.id(), to.id()));
            }
        }

        Ok(Self { segments })
    }

    /// Creates a path from segments already known to be joined in the graph.
    pub(crate) fn new_unchecked(segments: NonEmpty<Segment>) -> Self {
        Self { segments }
    }

    /// Gets the segments.
    pub fn segments(&self) -> &NonEmpty<Segment> {
        &self.segments
    }

    /// Gets the identifiers of the segments.
    pub fn ids(&self) -> Vec<SegmentId> {
        self.segments.iter().map(|segment| segment.id()).collect()
    }

    /// Gets the number of segments.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Gets the first segment.
    pub fn first(&self) -> &Segment {
        self.segments.first()
    }

    /// Gets the last segment.
    pub fn last(&self) -> &Segment {
        self.segments.last()
    }
}

impl std::fmt::Display for CandidatePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let ids = self
            .segments
            .iter()
            .map(|segment| segment.id().to_string())
            .collect::<Vec<_>>();

        write!(f, "{}", ids.join(" -> "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_paths_are_rejected() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let locus = "chr1:+:100-200".parse()?;
        let graph = SpliceGraph::new(locus);

        let err = CandidatePath::try_new(Vec::new(), &graph).unwrap_err();
        assert_eq!(err, Error::Empty);
        assert_eq!(err.to_string(), "a path must contain at least one segment");

        Ok(())
    }
}
