//! Pruning noise from a splice graph.
//!
//! Simplification repeats the following rounds until the graph stops
//! changing:
//!
//! 1. Evidence edges whose weight falls below the resolved [`MinSupport`]
//!    threshold are marked as weak. Sentinel edges are never weak.
//! 2. A segment whose incoming (or outgoing) edges are all weak would be cut
//!    off from the source (or the sink), so it keeps its strongest edge on
//!    that side.
//! 3. The remaining weak edges are removed.
//! 4. Segments that lost every evidence edge in this round are removed.
//! 5. Segments that no longer lie on any source-to-sink path are removed.
//!
//! The result is a fixed point of the rounds above, so simplifying an already
//! simplified graph with the same threshold changes nothing.

use std::cmp::Ordering;
use std::collections::HashSet;

use petgraph::stable_graph::EdgeIndex;
use petgraph::stable_graph::NodeIndex;
use petgraph::Direction;
use tracing::debug;

use crate::config::MinSupport;
use crate::graph::Neighbour;
use crate::graph::SpliceGraph;

/// Simplifies a splice graph.
///
/// # Examples
///
/// ```
/// use splicegraph::config::Config;
/// use splicegraph::config::MinSupport;
/// use splicegraph::evidence::collect;
/// use splicegraph::evidence::Record;
/// use splicegraph::graph::construct;
/// use splicegraph::graph::simplify;
/// use splicegraph::segment::build;
///
/// let config = Config::default();
/// let locus = "chr1:+:100-1000".parse()?;
/// let records = vec![
///     Record::Coverage {
///         interval: "chr1:+:100-300".parse()?,
///         depth: 10,
///     },
///     Record::Coverage {
///         interval: "chr1:+:500-700".parse()?,
///         depth: 10,
///     },
///     Record::Coverage {
///         interval: "chr1:+:800-900".parse()?,
///         depth: 10,
///     },
///     Record::Junction {
///         donor: "chr1:+:250-300".parse()?,
///         acceptor: "chr1:+:500-550".parse()?,
///         count: 20,
///     },
///     Record::Junction {
///         donor: "chr1:+:650-700".parse()?,
///         acceptor: "chr1:+:800-850".parse()?,
///         count: 1,
///     },
/// ];
///
/// let batch = collect(&locus, records)?;
/// let (graph, _) = construct(build(&batch, &config), &batch, &config);
/// assert_eq!(graph.evidence_edges().count(), 2);
///
/// let graph = simplify(graph, MinSupport::Absolute(5.0));
/// assert_eq!(graph.evidence_edges().count(), 1);
/// assert_eq!(graph.segment_count(), 2);
///
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn simplify(mut graph: SpliceGraph, min_support: MinSupport) -> SpliceGraph {
    let mut rounds = 0usize;

    loop {
        let before = (graph.segment_count(), graph.edge_count());
        prune(&mut graph, min_support);
        rounds += 1;

        if (graph.segment_count(), graph.edge_count()) == before {
            break;
        }
    }

    debug!(
        "simplified the graph to {} segment(s) and {} edge(s) in {} round(s)",
        graph.segment_count(),
        graph.edge_count(),
        rounds
    );

    graph
}

/// Runs a single round of simplification.
///
/// Rounds only ever remove nodes and edges, so comparing counts is enough to
/// detect a fixed point.
fn prune(graph: &mut SpliceGraph, min_support: MinSupport) {
    let weak = weak_edges(graph, min_support);

    // Rescue the strongest edge on every side of a segment left with only
    // weak edges on that side.
    let mut rescued = HashSet::new();

    for node in graph.segment_indices() {
        for direction in [Direction::Incoming, Direction::Outgoing] {
            let edges = graph.neighbours(node, direction).collect::<Vec<_>>();

            if edges.is_empty() || !edges.iter().all(|n| weak.contains(&n.id)) {
                continue;
            }

            if let Some(best) = edges.into_iter().max_by(|a, b| compare(graph, a, b)) {
                rescued.insert(best.id);
            }
        }
    }

    let had_evidence = graph
        .segment_indices()
        .filter(|node| incident(graph, *node).iter().any(|n| n.edge.is_evidence()))
        .collect::<Vec<_>>();

    for edge in weak.difference(&rescued) {
        graph.remove_edge(*edge);
    }

    let orphaned = had_evidence
        .into_iter()
        .filter(|node| !incident(graph, *node).iter().any(|n| n.edge.is_evidence()))
        .collect::<Vec<_>>();

    for node in orphaned {
        graph.remove_segment(node);
    }

    let connected = graph.connected();
    let disconnected = graph
        .segment_indices()
        .filter(|node| !connected.contains(node))
        .collect::<Vec<_>>();

    for node in disconnected {
        graph.remove_segment(node);
    }
}

/// Gets the evidence edges that fall below the support threshold.
fn weak_edges(graph: &SpliceGraph, min_support: MinSupport) -> HashSet<EdgeIndex> {
    graph
        .evidence_edges()
        .filter(|edge| {
            let Some((from, to)) = graph.endpoints(*edge) else {
                return false;
            };

            let threshold = min_support.threshold(graph.coverage(from), graph.coverage(to));
            graph.inner()[*edge].weight() < threshold
        })
        .collect()
}

/// Gets every edge incident to a node, in both directions.
fn incident(graph: &SpliceGraph, node: NodeIndex) -> Vec<Neighbour<'_>> {
    graph
        .neighbours(node, Direction::Incoming)
        .chain(graph.neighbours(node, Direction::Outgoing))
        .collect()
}

/// Orders edges so that the strongest compares greatest: higher
/// weight first, then the better covered neighbour, then the neighbour with
/// the lower coordinate.
fn compare(graph: &SpliceGraph, a: &Neighbour<'_>, b: &Neighbour<'_>) -> Ordering {
    a.edge
        .weight()
        .total_cmp(&b.edge.weight())
        .then_with(|| graph.coverage(a.node).total_cmp(&graph.coverage(b.node)))
        .then_with(|| graph.key(b.node).cmp(&graph.key(a.node)))
}
