//! Greedy path-cover assembly.
//!
//! Every evidence edge retained in a simplified splice graph represents
//! something that some isoform must explain. The assembler repeatedly takes
//! the strongest edge not yet explained by a path, extends it greedily towards
//! the source and the sink along the strongest evidence at each node, and
//! records the result as a new path. Segments left on no path after every
//! edge is explained (for example, the lone segment of an unspliced locus)
//! then seed paths of their own.
//!
//! Extension only ever follows evidence edges. A walk ends at a segment only
//! when that segment has no evidence edge in the direction of travel; sentinel
//! edges are ignored whenever an evidence edge exists. A segment with its own
//! source edge that is also entered by an evidence edge (an alternative start
//! inside the locus) therefore never begins a path, and likewise a segment with
//! its own sink edge that also continues along an evidence edge never ends
//! one.
//!
//! Among competing evidence edges, extension prefers the higher weight, then
//! the neighbour sharing the most paired-end fragments with the segments
//! already on the walk, then the better covered neighbour, then the neighbour
//! with the lower coordinate.
//!
//! Exhaustive enumeration of source-to-sink paths is exponential in the
//! number of branches, so the number of paths is capped at
//! [`Config::max_paths_per_locus`]. Anything left unexplained when the cap is
//! reached is dropped with a [`Warning::PathCapExceeded`].

use std::cmp::Ordering;
use std::collections::HashSet;
use std::collections::VecDeque;

use nonempty::NonEmpty;
use petgraph::stable_graph::EdgeIndex;
use petgraph::stable_graph::NodeIndex;
use petgraph::Direction;
use tracing::debug;
use tracing::warn;

use crate::config::Config;
use crate::graph::Neighbour;
use crate::graph::Node;
use crate::graph::SpliceGraph;
use crate::path::CandidatePath;
use crate::warning::Warning;

/// The bookkeeping for a single assembly.
struct Cover<'a> {
    /// The graph being covered.
    graph: &'a SpliceGraph,

    /// The walks found so far, as node indices exclusive of the sentinels.
    walks: Vec<Vec<NodeIndex>>,

    /// Evidence edges explained by at least one walk.
    edges: HashSet<EdgeIndex>,

    /// Segments lying on at least one walk.
    nodes: HashSet<NodeIndex>,
}

impl<'a> Cover<'a> {
    /// Creates an empty cover.
    fn new(graph: &'a SpliceGraph) -> Self {
        Self {
            graph,
            walks: Vec::new(),
            edges: HashSet::new(),
            nodes: HashSet::new(),
        }
    }

    /// Extends a seed walk in both directions and records the result.
    fn extend(&mut self, seed: &[NodeIndex]) {
        let mut walk = seed.iter().copied().collect::<VecDeque<_>>();

        while let Some(previous) = self.step(&walk, Direction::Incoming) {
            walk.push_front(previous);
        }

        while let Some(next) = self.step(&walk, Direction::Outgoing) {
            walk.push_back(next);
        }

        let graph = self.graph;
        let walk = walk.into_iter().collect::<Vec<_>>();

        for (from, to) in walk.iter().zip(walk.iter().skip(1)) {
            for neighbour in graph.evidence_neighbours(*from, Direction::Outgoing) {
                if neighbour.node == *to {
                    self.edges.insert(neighbour.id);
                }
            }
        }

        self.nodes.extend(walk.iter().copied());

        if !self.walks.contains(&walk) {
            self.walks.push(walk);
        }
    }

    /// Takes one step from the end of `walk` facing `direction` along its
    /// strongest evidence edge.
    ///
    /// Returns [`None`] when that end only has sentinel edges in that
    /// direction, meaning the walk has reached the source or the sink.
    fn step(&self, walk: &VecDeque<NodeIndex>, direction: Direction) -> Option<NodeIndex> {
        let node = match direction {
            Direction::Incoming => walk.front(),
            Direction::Outgoing => walk.back(),
        }?;

        self.graph
            .evidence_neighbours(*node, direction)
            .max_by(|a, b| compare(self.graph, walk, a, b))
            .map(|neighbour| neighbour.node)
    }

    /// Converts the walks into candidate paths.
    fn into_paths(self) -> Vec<CandidatePath> {
        let graph = self.graph;

        self.walks
            .into_iter()
            .filter_map(|walk| {
                let segments = walk
                    .into_iter()
                    .filter_map(|node| graph.node(node).and_then(Node::segment).cloned())
                    .collect::<Vec<_>>();

                NonEmpty::from_vec(segments).map(CandidatePath::new_unchecked)
            })
            .collect()
    }
}

/// Orders neighbours so that the preferred one compares greatest: higher edge
/// weight first, then more paired-end fragments shared with `walk`, then the
/// better covered neighbour, then the neighbour with the lower coordinate.
fn compare(
    graph: &SpliceGraph,
    walk: &VecDeque<NodeIndex>,
    a: &Neighbour<'_>,
    b: &Neighbour<'_>,
) -> Ordering {
    let linkage = |neighbour: &Neighbour<'_>| {
        walk.iter()
            .map(|node| graph.linkage(*node, neighbour.node))
            .sum::<u64>()
    };

    a.edge
        .weight()
        .total_cmp(&b.edge.weight())
        .then_with(|| linkage(a).cmp(&linkage(b)))
        .then_with(|| graph.coverage(a.node).total_cmp(&graph.coverage(b.node)))
        .then_with(|| graph.key(b.node).cmp(&graph.key(a.node)))
}

/// Indicates whether a node has any evidence edge.
fn has_evidence(graph: &SpliceGraph, node: NodeIndex) -> bool {
    graph
        .evidence_neighbours(node, Direction::Incoming)
        .chain(graph.evidence_neighbours(node, Direction::Outgoing))
        .next()
        .is_some()
}

/// Gets the evidence edges in the order they seed paths: weight descending,
/// then target coverage descending, then target coordinate ascending, then
/// source coordinate ascending.
fn targets(graph: &SpliceGraph) -> Vec<(EdgeIndex, NodeIndex, NodeIndex)> {
    let mut targets = graph
        .evidence_edges()
        .filter_map(|edge| {
            graph
                .endpoints(edge)
                .map(|(from, to)| (edge, from, to))
        })
        .collect::<Vec<_>>();

    targets.sort_by(|(a, a_from, a_to), (b, b_from, b_to)| {
        let weight = |edge: &EdgeIndex| graph.inner()[*edge].weight();

        weight(b)
            .total_cmp(&weight(a))
            .then_with(|| graph.coverage(*b_to).total_cmp(&graph.coverage(*a_to)))
            .then_with(|| graph.key(*a_to).cmp(&graph.key(*b_to)))
            .then_with(|| graph.key(*a_from).cmp(&graph.key(*b_from)))
    });

    targets
}

/// Assembles a set of structurally distinct candidate paths covering the
/// evidence edges of `graph`.
///
/// The graph is expected to have been [simplified](crate::graph::simplify) so
/// that every segment lies on some source-to-sink path.
///
/// # Examples
///
/// ```
/// use splicegraph::config::Config;
/// use splicegraph::evidence::collect;
/// use splicegraph::evidence::Record;
/// use splicegraph::graph::construct;
/// use splicegraph::graph::simplify;
/// use splicegraph::path::assemble;
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
/// let (graph, _) = construct(build(&batch, &config), &batch, &config);
/// let graph = simplify(graph, config.min_support());
///
/// let (paths, warnings) = assemble(&graph, &config);
/// assert_eq!(paths.len(), 1);
/// assert_eq!(paths[0].to_string(), "s0 -> s2");
/// assert!(warnings.is_empty());
///
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn assemble(graph: &SpliceGraph, config: &Config) -> (Vec<CandidatePath>, Vec<Warning>) {
    let cap = config.max_paths_per_locus();
    let targets = targets(graph);

    let mut cover = Cover::new(graph);
    let mut capped = false;

    for (edge, from, to) in &targets {
        if cover.edges.contains(edge) {
            continue;
        }

        if cover.walks.len() >= cap {
            capped = true;
            break;
        }

        cover.extend(&[*from, *to]);
    }

    if !capped {
        let mut seeds = graph
            .segment_indices()
            .filter(|node| !cover.nodes.contains(node))
            .collect::<Vec<_>>();

        seeds.sort_by(|a, b| {
            graph
                .coverage(*b)
                .total_cmp(&graph.coverage(*a))
                .then_with(|| graph.key(*a).cmp(&graph.key(*b)))
        });

        for node in seeds {
            if cover.nodes.contains(&node) {
                continue;
            }

            if cover.walks.len() >= cap {
                capped = true;
                break;
            }

            cover.extend(&[node]);
        }
    }

    let mut warnings = Vec::new();
    let covered = targets
        .iter()
        .filter(|(edge, _, _)| cover.edges.contains(edge))
        .count();

    if capped {
        // Unexplained evidence edges, plus segments with no evidence edges
        // that would otherwise have seeded paths of their own.
        let dropped = (targets.len() - covered)
            + graph
                .segment_indices()
                .filter(|node| {
                    !cover.nodes.contains(node) && !has_evidence(graph, *node)
                })
                .count();

        let warning = Warning::PathCapExceeded { cap, dropped };
        warn!("{}", warning);
        warnings.push(warning);
    }

    let paths = cover.into_paths();

    debug!(
        "assembled {} path(s) covering {} of {} evidence edge(s)",
        paths.len(),
        covered,
        targets.len()
    );

    (paths, warnings)
}
