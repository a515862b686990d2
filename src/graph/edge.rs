//! Edges of a splice graph.

/// The kind of an [`Edge`].
///
/// Variants are ordered so that sorting edges groups structural edges apart
/// from evidence edges.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Kind {
    /// An edge from the source sentinel to a segment where coverage begins.
    Source,

    /// An edge between physically adjacent segments with continuous coverage.
    Adjacency,

    /// An edge between two segments joined by spliced reads.
    Junction,

    /// An edge from a segment where coverage ends to the sink sentinel.
    Sink,
}

impl Kind {
    /// Indicates whether edges of this kind are backed by observed evidence
    /// (adjacency or junction) rather than being structural sentinel edges.
    pub fn is_evidence(&self) -> bool {
        matches!(self, Kind::Adjacency | Kind::Junction)
    }
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Kind::Source => write!(f, "source"),
            Kind::Adjacency => write!(f, "adjacency"),
            Kind::Junction => write!(f, "junction"),
            Kind::Sink => write!(f, "sink"),
        }
    }
}

/// A directed, weighted edge in a splice graph.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Edge {
    /// The kind of edge.
    kind: Kind,

    /// The support weight: a junction read count, the coverage continuity
    /// across an adjacency, or the coverage where a sentinel edge attaches.
    weight: f64,
}

impl Edge {
    /// Creates a new edge.
    ///
    /// # Examples
    ///
    /// ```
    /// use splicegraph::graph::edge::Kind;
    /// use splicegraph::graph::Edge;
    ///
    /// let edge = Edge::new(Kind::Junction, 20.0);
    /// assert!(edge.is_evidence());
    /// assert_eq!(edge.weight(), 20.0);
    /// ```
    pub fn new(kind: Kind, weight: f64) -> Self {
        Self { kind, weight }
    }

    /// Gets the kind of edge.
    pub fn kind(&self) -> Kind {
        self.kind
    }

    /// Gets the support weight.
    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// Indicates whether the edge is backed by observed evidence.
    pub fn is_evidence(&self) -> bool {
        self.kind.is_evidence()
    }

    /// Adds further support to the edge.
    pub(crate) fn reinforce(&mut self, weight: f64) {
        self.weight += weight;
    }
}
