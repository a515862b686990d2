//! Building a splice graph from segments and evidence.

use std::collections::HashSet;

use tracing::debug;
use tracing::warn;

use crate::config::Config;
use crate::core::Number;
use crate::evidence::Batch;
use crate::evidence::Junction;
use crate::graph::edge::Kind;
use crate::graph::Edge;
use crate::graph::SpliceGraph;
use crate::segment::Segment;
use crate::warning::Inconsistency;
use crate::warning::Warning;

/// Constructs the splice graph for `segments` using the evidence in `batch`.
///
/// - Each junction is anchored on the segment ending nearest its donor site
///   and the segment starting nearest its acceptor site (both within the
///   [boundary merge tolerance](Config::boundary_merge_tolerance)). The weight
///   is the junction read count.
/// - A covered segment lying inside an anchored junction, with no junction of
///   its own, is spliced out when its mean coverage falls below the
///   [intron retention cutoff](Config::intron_retention_cutoff) as a fraction
///   of the mean coverage of the two exons the junction joins. Spliced out
///   segments get no adjacency or sentinel edges.
/// - Physically adjacent segments are joined when both are covered and
///   neither is spliced out. Continuity is judged on the merged segments, not
///   the raw depth at their shared boundary, so coverage that spills a few
///   bases past a merged boundary does not count. The weight is the mean of
///   the two mean coverages.
/// - The source is joined to every covered segment where coverage begins and
///   every covered segment where coverage ends is joined to the sink.
///
/// Junctions that are reversed, leave the locus, or cannot be anchored are not
/// inserted; each one is logged and returned as a [`Warning`].
///
/// # Examples
///
/// ```
/// use splicegraph::config::Config;
/// use splicegraph::evidence::collect;
/// use splicegraph::evidence::Record;
/// use splicegraph::graph::construct;
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
/// let (graph, warnings) = construct(segments, &batch, &config);
///
/// assert_eq!(graph.segment_count(), 3);
/// assert_eq!(graph.evidence_edges().count(), 1);
/// assert!(graph.is_acyclic());
/// assert!(warnings.is_empty());
///
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn construct(
    segments: Vec<Segment>,
    batch: &Batch,
    config: &Config,
) -> (SpliceGraph, Vec<Warning>) {
    let mut graph = SpliceGraph::new(batch.locus().clone()).with_links(batch.links().clone());
    let mut warnings = Vec::new();

    let nodes = segments
        .iter()
        .cloned()
        .map(|segment| graph.add_segment(segment))
        .collect::<Vec<_>>();

    //////////////////////////////////////////////////////////////////////////
    // Junction anchors
    //////////////////////////////////////////////////////////////////////////

    let mut anchors = Vec::new();

    for (junction, count) in batch.junctions() {
        match anchor(junction, &segments, batch, config) {
            Ok((from, to)) => anchors.push(Anchor {
                from,
                to,
                count: *count,
            }),
            Err(inconsistency) => {
                warn!("discarding junction {}: {}", junction, inconsistency);
                warnings.push(Warning::StructuralInconsistency(inconsistency));
            }
        }
    }

    let spliced = spliced_out(&segments, &anchors, config);

    //////////////////////////////////////////////////////////////////////////
    // Adjacency edges
    //////////////////////////////////////////////////////////////////////////

    // `continuous[i]` records whether coverage runs from segment `i` into
    // segment `i + 1`.
    let mut continuous = vec![false; segments.len().saturating_sub(1)];

    for (i, pair) in segments.windows(2).enumerate() {
        let (upstream, downstream) = (&pair[0], &pair[1]);

        if !upstream.is_covered() || !downstream.is_covered() || spliced[i] || spliced[i + 1] {
            continue;
        }

        let weight = (upstream.mean_coverage() + downstream.mean_coverage()) / 2.0;
        graph.add_edge(nodes[i], nodes[i + 1], Edge::new(Kind::Adjacency, weight));
        continuous[i] = true;
    }

    //////////////////////////////////////////////////////////////////////////
    // Junction edges
    //////////////////////////////////////////////////////////////////////////

    for anchor in &anchors {
        graph.add_edge(
            nodes[anchor.from],
            nodes[anchor.to],
            Edge::new(Kind::Junction, anchor.count as f64),
        );
    }

    //////////////////////////////////////////////////////////////////////////
    // Sentinel edges
    //////////////////////////////////////////////////////////////////////////

    let (source, sink) = (graph.source(), graph.sink());

    for (i, segment) in segments.iter().enumerate() {
        if !segment.is_covered() || spliced[i] {
            continue;
        }

        let weight = segment.mean_coverage();
        let continued_from = i > 0 && continuous[i - 1];
        let continues_into = i < continuous.len() && continuous[i];

        if !continued_from {
            graph.add_edge(source, nodes[i], Edge::new(Kind::Source, weight));
        }

        if !continues_into {
            graph.add_edge(nodes[i], sink, Edge::new(Kind::Sink, weight));
        }
    }

    debug!(
        "constructed a graph with {} segment(s) and {} edge(s), splicing out {} segment(s)",
        graph.segment_count(),
        graph.edge_count(),
        spliced.iter().filter(|spliced| **spliced).count()
    );

    (graph, warnings)
}

/// A junction anchored on two segments.
#[derive(Clone, Copy, Debug)]
struct Anchor {
    /// The index of the donor segment.
    from: usize,

    /// The index of the acceptor segment.
    to: usize,

    /// The junction read count.
    count: u64,
}

/// Flags every segment that is spliced out as intronic noise.
///
/// A segment qualifies when it is covered, is not itself the donor or
/// acceptor of any anchored junction, and lies inside some anchored junction
/// whose flanking exons it covers at less than the intron retention cutoff.
fn spliced_out(segments: &[Segment], anchors: &[Anchor], config: &Config) -> Vec<bool> {
    let cutoff = config.intron_retention_cutoff();
    let anchored = anchors
        .iter()
        .flat_map(|anchor| [anchor.from, anchor.to])
        .collect::<HashSet<_>>();

    segments
        .iter()
        .enumerate()
        .map(|(i, segment)| {
            if !segment.is_covered() || anchored.contains(&i) {
                return false;
            }

            anchors
                .iter()
                .filter(|anchor| anchor.from < i && i < anchor.to)
                .any(|anchor| {
                    let flanks = (segments[anchor.from].mean_coverage()
                        + segments[anchor.to].mean_coverage())
                        / 2.0;

                    flanks > 0.0 && segment.mean_coverage() / flanks < cutoff
                })
        })
        .collect()
}

/// Resolves the donor and acceptor segments of a junction, returning their
/// indices within `segments`.
fn anchor(
    junction: &Junction,
    segments: &[Segment],
    batch: &Batch,
    config: &Config,
) -> Result<(usize, usize), Inconsistency> {
    let locus = batch.locus();
    let inside = |site: Number| locus.start() < site && site < locus.end();

    if !inside(junction.donor) || !inside(junction.acceptor) {
        return Err(Inconsistency::TransLocus {
            donor: junction.donor,
            acceptor: junction.acceptor,
        });
    }

    let reversed = Inconsistency::ReversedOrder {
        donor: junction.donor,
        acceptor: junction.acceptor,
    };

    if junction.donor >= junction.acceptor {
        return Err(reversed);
    }

    let from = nearest(segments, junction.donor, config, Segment::end).ok_or(
        Inconsistency::UnanchoredSite {
            site: junction.donor,
        },
    )?;

    let to = nearest(segments, junction.acceptor, config, Segment::start).ok_or(
        Inconsistency::UnanchoredSite {
            site: junction.acceptor,
        },
    )?;

    if from >= to {
        return Err(reversed);
    }

    Ok((from, to))
}

/// Finds the segment whose boundary (as given by `boundary`) lies nearest to
/// `site` and within tolerance. Ties go to the lower coordinate.
fn nearest(
    segments: &[Segment],
    site: Number,
    config: &Config,
    boundary: fn(&Segment) -> Number,
) -> Option<usize> {
    segments
        .iter()
        .enumerate()
        .filter(|(_, segment)| config.within_tolerance(boundary(segment), site))
        .min_by_key(|(_, segment)| (boundary(segment).abs_diff(site), boundary(segment)))
        .map(|(i, _)| i)
}
