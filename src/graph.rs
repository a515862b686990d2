//! Splice graphs.
//!
//! A [`SpliceGraph`] is a directed acyclic graph whose nodes are the
//! [`Segment`]s of a locus plus two sentinels (a source and a sink) and whose
//! edges are adjacencies, junctions, or sentinel attachments. Edges only ever
//! point towards increasing genomic coordinates, so the graph is acyclic by
//! construction.
//!
//! Graphs are built by the [`constructor`] and pruned by the [`simplifier`].

use std::collections::BTreeMap;
use std::collections::HashSet;

use petgraph::algo::is_cyclic_directed;
use petgraph::stable_graph::EdgeIndex;
use petgraph::stable_graph::NodeIndex;
use petgraph::stable_graph::StableDiGraph;
use petgraph::visit::Bfs;
use petgraph::visit::EdgeRef;
use petgraph::visit::IntoEdgeReferences as _;
use petgraph::visit::Reversed;
use petgraph::Direction;

use crate::core::GenomicInterval;
use crate::core::Number;
use crate::evidence::Link;
use crate::segment::Segment;
use crate::segment::SegmentId;

pub mod constructor;
pub mod edge;
pub mod simplifier;

pub use constructor::construct;
pub use edge::Edge;
pub use simplifier::simplify;

/// A node within a [`SpliceGraph`].
#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    /// The source sentinel.
    Source,

    /// An exonic segment.
    Segment(Segment),

    /// The sink sentinel.
    Sink,
}

impl Node {
    /// Gets the segment behind the node, if it is not a sentinel.
    pub fn segment(&self) -> Option<&Segment> {
        match self {
            Node::Segment(segment) => Some(segment),
            _ => None,
        }
    }

    /// Gets the mean coverage of the node (zero for sentinels).
    pub fn coverage(&self) -> f64 {
        self.segment()
            .map(|segment| segment.mean_coverage())
            .unwrap_or_default()
    }

    /// Gets a key that orders nodes by genomic coordinate.
    pub fn key(&self) -> Key {
        match self {
            Node::Source => Key::Source,
            Node::Segment(segment) => Key::Segment(segment.id()),
            Node::Sink => Key::Sink,
        }
    }
}

/// A key identifying a node independently of its graph index.
///
/// Keys order the source first, then segments in genomic order, then the
/// sink.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Key {
    /// The source sentinel.
    Source,

    /// A segment.
    Segment(SegmentId),

    /// The sink sentinel.
    Sink,
}

impl std::fmt::Display for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Key::Source => write!(f, "source"),
            Key::Segment(id) => write!(f, "{id}"),
            Key::Sink => write!(f, "sink"),
        }
    }
}

/// A neighbouring node reached through an edge.
#[derive(Clone, Copy, Debug)]
pub struct Neighbour<'a> {
    /// The index of the edge.
    pub id: EdgeIndex,

    /// The index of the neighbouring node.
    pub node: NodeIndex,

    /// The edge itself.
    pub edge: &'a Edge,
}

/// A splice graph for a single locus.
#[derive(Clone, Debug)]
pub struct SpliceGraph {
    /// The locus.
    locus: GenomicInterval,

    /// The inner graph.
    inner: StableDiGraph<Node, Edge>,

    /// The source sentinel.
    source: NodeIndex,

    /// The sink sentinel.
    sink: NodeIndex,

    /// Node indices of the segments, by segment identifier.
    segments: BTreeMap<SegmentId, NodeIndex>,

    /// Paired-end links observed within the locus and their fragment counts.
    links: BTreeMap<Link, u64>,
}

impl SpliceGraph {
    /// Creates a new graph containing only the two sentinels.
    pub(crate) fn new(locus: GenomicInterval) -> Self {
        let mut inner = StableDiGraph::new();
        let source = inner.add_node(Node::Source);
        let sink = inner.add_node(Node::Sink);

        Self {
            locus,
            inner,
            source,
            sink,
            segments: BTreeMap::new(),
            links: BTreeMap::new(),
        }
    }

    /// Attaches the paired-end links observed within the locus.
    pub(crate) fn with_links(mut self, links: BTreeMap<Link, u64>) -> Self {
        self.links = links;
        self
    }

    /// Adds a segment node.
    pub(crate) fn add_segment(&mut self, segment: Segment) -> NodeIndex {
        let id = segment.id();
        let index = self.inner.add_node(Node::Segment(segment));
        self.segments.insert(id, index);
        index
    }

    /// Adds an edge, or reinforces an existing edge of the same kind between
    /// the same nodes.
    pub(crate) fn add_edge(&mut self, from: NodeIndex, to: NodeIndex, edge: Edge) {
        let existing = self
            .inner
            .edges_directed(from, Direction::Outgoing)
            .find(|e| e.target() == to && e.weight().kind() == edge.kind())
            .map(|e| e.id());

        match existing.and_then(|id| self.inner.edge_weight_mut(id)) {
            Some(current) => current.reinforce(edge.weight()),
            None => {
                self.inner.add_edge(from, to, edge);
            }
        }
    }

    /// Removes an edge.
    pub(crate) fn remove_edge(&mut self, edge: EdgeIndex) {
        self.inner.remove_edge(edge);
    }

    /// Removes a segment node along with every incident edge.
    ///
    /// Sentinels are never removed.
    pub(crate) fn remove_segment(&mut self, node: NodeIndex) {
        if let Some(Node::Segment(segment)) = self.inner.remove_node(node) {
            self.segments.remove(&segment.id());
        }
    }

    /// Gets the locus.
    pub fn locus(&self) -> &GenomicInterval {
        &self.locus
    }

    /// Gets the inner graph.
    pub fn inner(&self) -> &StableDiGraph<Node, Edge> {
        &self.inner
    }

    /// Gets the index of the source sentinel.
    pub fn source(&self) -> NodeIndex {
        self.source
    }

    /// Gets the index of the sink sentinel.
    pub fn sink(&self) -> NodeIndex {
        self.sink
    }

    /// Gets a node by index.
    pub fn node(&self, index: NodeIndex) -> Option<&Node> {
        self.inner.node_weight(index)
    }

    /// Gets the index of the node for a segment, if it is still present.
    pub fn index_of(&self, id: SegmentId) -> Option<NodeIndex> {
        self.segments.get(&id).copied()
    }

    /// Gets the node indices of every segment in genomic order.
    pub fn segment_indices(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.segments.values().copied()
    }

    /// Gets every segment in genomic order.
    pub fn segments(&self) -> impl Iterator<Item = &Segment> + '_ {
        self.segment_indices()
            .filter_map(|index| self.node(index).and_then(Node::segment))
    }

    /// Gets the number of segment nodes (excluding sentinels).
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Gets the number of edges.
    pub fn edge_count(&self) -> usize {
        self.inner.edge_count()
    }

    /// Gets the coordinate key of a node.
    ///
    /// Removed nodes sort after every live node.
    pub fn key(&self, index: NodeIndex) -> Key {
        self.node(index).map(Node::key).unwrap_or(Key::Sink)
    }

    /// Gets the mean coverage of a node (zero for sentinels).
    pub fn coverage(&self, index: NodeIndex) -> f64 {
        self.node(index).map(Node::coverage).unwrap_or_default()
    }

    /// Gets the neighbours of a node in the given direction.
    pub fn neighbours(
        &self,
        node: NodeIndex,
        direction: Direction,
    ) -> impl Iterator<Item = Neighbour<'_>> + '_ {
        self.inner.edges_directed(node, direction).map(move |e| {
            let other = match e.source() == node {
                true => e.target(),
                false => e.source(),
            };

            Neighbour {
                id: e.id(),
                node: other,
                edge: e.weight(),
            }
        })
    }

    /// Gets the neighbours of a node in the given direction that are reached
    /// through evidence edges.
    pub fn evidence_neighbours(
        &self,
        node: NodeIndex,
        direction: Direction,
    ) -> impl Iterator<Item = Neighbour<'_>> + '_ {
        self.neighbours(node, direction)
            .filter(|neighbour| neighbour.edge.is_evidence())
    }

    /// Gets every evidence edge.
    pub fn evidence_edges(&self) -> impl Iterator<Item = EdgeIndex> + '_ {
        self.inner
            .edge_indices()
            .filter(|index| self.inner[*index].is_evidence())
    }

    /// Gets the endpoints of an edge.
    pub fn endpoints(&self, edge: EdgeIndex) -> Option<(NodeIndex, NodeIndex)> {
        self.inner.edge_endpoints(edge)
    }

    /// Indicates whether any edge connects the two segments, in that order.
    pub fn connects(&self, from: SegmentId, to: SegmentId) -> bool {
        match (self.index_of(from), self.index_of(to)) {
            (Some(from), Some(to)) => self.inner.contains_edge(from, to),
            _ => false,
        }
    }

    /// Counts the paired-end fragments with one mate inside each of two
    /// segments.
    ///
    /// Sentinels and removed nodes are linked to nothing.
    pub fn linkage(&self, a: NodeIndex, b: NodeIndex) -> u64 {
        let (Some(a), Some(b)) = (
            self.node(a).and_then(Node::segment),
            self.node(b).and_then(Node::segment),
        ) else {
            return 0;
        };

        let inside = |segment: &Segment, (start, end): (Number, Number)| {
            segment.start() <= start && end <= segment.end()
        };

        self.links
            .iter()
            .filter(|(link, _)| {
                (inside(a, link.first) && inside(b, link.second))
                    || (inside(b, link.first) && inside(a, link.second))
            })
            .map(|(_, count)| *count)
            .sum()
    }

    /// Gets the set of nodes lying on at least one source-to-sink path.
    pub fn connected(&self) -> HashSet<NodeIndex> {
        let mut forward = HashSet::new();
        let mut bfs = Bfs::new(&self.inner, self.source);

        while let Some(node) = bfs.next(&self.inner) {
            forward.insert(node);
        }

        let reversed = Reversed(&self.inner);
        let mut backward = HashSet::new();
        let mut bfs = Bfs::new(reversed, self.sink);

        while let Some(node) = bfs.next(reversed) {
            backward.insert(node);
        }

        forward.intersection(&backward).copied().collect()
    }

    /// Indicates whether the graph is free of cycles.
    pub fn is_acyclic(&self) -> bool {
        !is_cyclic_directed(&self.inner)
    }

    /// Summarizes every edge by the keys of its endpoints, in sorted order.
    ///
    /// Two graphs with the same summary are structurally identical.
    pub fn summary(&self) -> Vec<(Key, Key, Edge)> {
        let mut summary = self
            .inner
            .edge_references()
            .map(|e| (self.key(e.source()), self.key(e.target()), *e.weight()))
            .collect::<Vec<_>>();

        summary.sort_by_key(|(from, to, edge)| (*from, *to, edge.kind()));
        summary
    }
}

impl PartialEq for SpliceGraph {
    fn eq(&self, other: &Self) -> bool {
        self.locus == other.locus
            && self.segments().eq(other.segments())
            && self.summary() == other.summary()
    }
}
