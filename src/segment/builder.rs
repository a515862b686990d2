//! Partitioning a locus into segments.

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use tracing::debug;

use crate::config::Config;
use crate::core::Number;
use crate::evidence::Batch;
use crate::segment::Segment;
use crate::segment::SegmentId;

/// A candidate segment boundary and its supporting evidence.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
struct Candidate {
    /// The position of the boundary.
    position: Number,

    /// The amount of evidence supporting the boundary.
    support: u64,
}

/// Builds the segments partitioning the locus of `batch`.
///
/// Boundaries are placed at every coverage-depth change and every junction
/// site within the locus. Candidates closer than or equal to the
/// [boundary merge tolerance](Config::boundary_merge_tolerance) are merged
/// into the best-supported one (the lowest coordinate wins on ties), and
/// candidates within tolerance of either edge of the locus are absorbed into
/// that edge. No two boundaries of the result lie within tolerance of one
/// another.
///
/// # Examples
///
/// ```
/// use splicegraph::config::Config;
/// use splicegraph::evidence::collect;
/// use splicegraph::evidence::Record;
/// use splicegraph::segment::build;
///
/// let locus = "chr1:+:100-1000".parse()?;
/// let records = vec![Record::Coverage {
///     interval: "chr1:+:100-1000".parse()?,
///     depth: 10,
/// }];
///
/// let batch = collect(&locus, records)?;
/// let segments = build(&batch, &Config::default());
///
/// assert_eq!(segments.len(), 1);
/// assert_eq!(segments[0].start(), 100);
/// assert_eq!(segments[0].end(), 1000);
/// assert_eq!(segments[0].mean_coverage(), 10.0);
///
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn build(batch: &Batch, config: &Config) -> Vec<Segment> {
    let locus = batch.locus();
    let candidates = candidates(batch);
    let tolerance = config.boundary_merge_tolerance();

    let representatives = cluster(&candidates, tolerance)
        .into_iter()
        .filter(|cluster| {
            !cluster.iter().any(|candidate| {
                config.within_tolerance(candidate.position, locus.start())
                    || config.within_tolerance(candidate.position, locus.end())
            })
        })
        .map(representative)
        .collect::<Vec<_>>();

    let mut boundaries = vec![locus.start()];
    boundaries.extend(
        dedup(representatives, config)
            .into_iter()
            .map(|candidate| candidate.position),
    );
    boundaries.push(locus.end());

    let segments = boundaries
        .windows(2)
        .enumerate()
        .map(|(i, window)| {
            let (start, end) = (window[0], window[1]);

            // SAFETY: boundaries are strictly increasing and the span lies
            // within the locus, so this always describes a valid interval.
            let interval = locus.with_span(start, end).unwrap();

            Segment::new(SegmentId::new(i), interval, batch.mean_coverage(start, end))
        })
        .collect::<Vec<_>>();

    debug!(
        "built {} segment(s) from {} candidate boundaries",
        segments.len(),
        candidates.len()
    );

    segments
}

/// Gathers every candidate boundary strictly inside the locus, in ascending
/// order.
///
/// The support of a candidate is the absolute change in coverage depth at the
/// position plus the count of every junction with a site there.
fn candidates(batch: &Batch) -> Vec<Candidate> {
    let locus = batch.locus();
    let inside = |position: &Number| locus.start() < *position && *position < locus.end();

    let mut sites = BTreeMap::<Number, u64>::new();

    for (junction, count) in batch.junctions() {
        for position in [junction.donor, junction.acceptor] {
            *sites.entry(position).or_default() += count;
        }
    }

    let positions = batch
        .runs()
        .iter()
        .flat_map(|run| [run.start, run.end])
        .chain(sites.keys().copied())
        .filter(inside)
        .collect::<BTreeSet<_>>();

    positions
        .into_iter()
        .map(|position| {
            let change = batch
                .depth_at(position)
                .abs_diff(batch.depth_at(position - 1));
            let junctions = sites.get(&position).copied().unwrap_or_default();

            Candidate {
                position,
                support: change + junctions,
            }
        })
        .filter(|candidate| candidate.support > 0)
        .collect()
}

/// Groups ascending candidates into clusters anchored on their first member.
fn cluster(candidates: &[Candidate], tolerance: Number) -> Vec<&[Candidate]> {
    let mut clusters = Vec::new();
    let mut i = 0;

    while i < candidates.len() {
        let anchor = candidates[i].position;
        let mut j = i + 1;

        while j < candidates.len() && candidates[j].position - anchor <= tolerance {
            j += 1;
        }

        clusters.push(&candidates[i..j]);
        i = j;
    }

    clusters
}

/// Picks the best-supported member of a non-empty cluster, preferring the
/// lowest coordinate on ties.
fn representative(cluster: &[Candidate]) -> Candidate {
    let mut best = cluster[0];

    for candidate in &cluster[1..] {
        if candidate.support > best.support {
            best = *candidate;
        }
    }

    best
}

/// Merges neighbouring representatives that still lie within tolerance of
/// one another, keeping the better supported of each pair (the lower
/// coordinate on ties).
///
/// Clusters are anchored on their first member, so the representatives of two
/// consecutive clusters may sit closer together than the tolerance.
fn dedup(representatives: Vec<Candidate>, config: &Config) -> Vec<Candidate> {
    let mut retained: Vec<Candidate> = Vec::with_capacity(representatives.len());

    for candidate in representatives {
        match retained.last_mut() {
            Some(last) if config.within_tolerance(last.position, candidate.position) => {
                if candidate.support > last.support {
                    *last = candidate;
                }
            }
            _ => retained.push(candidate),
        }
    }

    retained
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Builder;
    use crate::core::GenomicInterval;
    use crate::evidence::collect;
    use crate::evidence::Record;

    fn spans(segments: &[Segment]) -> Vec<(Number, Number)> {
        segments
            .iter()
            .map(|segment| (segment.start(), segment.end()))
            .collect()
    }

    #[test]
    fn test_two_exons_and_a_junction() -> Result<(), Box<dyn std::error::Error>> {
        let locus = "chr1:+:100-700".parse::<GenomicInterval>()?;
        let records = vec![
            Record::Coverage {
                interval: "chr1:+:100-300".parse()?,
                depth: 10,
            },
            Record::Coverage {
                interval: "chr1:+:500-700".parse()?,
                depth: 10,
            },
            Record::Junction {
                donor: "chr1:+:250-300".parse()?,
                acceptor: "chr1:+:500-550".parse()?,
                count: 20,
            },
        ];

        let batch = collect(&locus, records)?;
        let segments = build(&batch, &Config::default());

        assert_eq!(spans(&segments), vec![(100, 300), (300, 500), (500, 700)]);
        assert_eq!(
            segments.iter().map(|s| s.id().get()).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
        assert_eq!(segments[0].mean_coverage(), 10.0);
        assert!(!segments[1].is_covered());

        Ok(())
    }

    #[test]
    fn test_boundaries_within_tolerance_are_merged() -> Result<(), Box<dyn std::error::Error>> {
        let locus = "chr1:+:100-1000".parse::<GenomicInterval>()?;
        let records = vec![
            Record::Coverage {
                interval: "chr1:+:100-302".parse()?,
                depth: 5,
            },
            Record::Junction {
                donor: "chr1:+:250-300".parse()?,
                acceptor: "chr1:+:600-650".parse()?,
                count: 40,
            },
            Record::Coverage {
                interval: "chr1:+:600-1000".parse()?,
                depth: 5,
            },
        ];

        let batch = collect(&locus, records)?;
        let segments = build(&batch, &Config::default());

        // The junction site carries more support than the coverage drop.
        assert_eq!(spans(&segments), vec![(100, 300), (300, 600), (600, 1000)]);

        Ok(())
    }

    #[test]
    fn test_ties_prefer_the_lower_coordinate() -> Result<(), Box<dyn std::error::Error>> {
        let locus = "chr1:+:100-1000".parse::<GenomicInterval>()?;
        let records = vec![
            Record::Coverage {
                interval: "chr1:+:100-500".parse()?,
                depth: 4,
            },
            Record::Coverage {
                interval: "chr1:+:500-503".parse()?,
                depth: 4,
            },
            Record::Coverage {
                interval: "chr1:+:503-1000".parse()?,
                depth: 4,
            },
            Record::Coverage {
                interval: "chr1:+:500-1000".parse()?,
                depth: 4,
            },
        ];

        // Depth steps 4 -> 8 at 500 and stays 8, so only one change exists.
        let batch = collect(&locus, records)?;
        let segments = build(&batch, &Config::default());
        assert_eq!(spans(&segments), vec![(100, 500), (500, 1000)]);

        let locus = "chr1:+:100-1000".parse::<GenomicInterval>()?;
        let records = vec![
            Record::Coverage {
                interval: "chr1:+:100-400".parse()?,
                depth: 6,
            },
            Record::Coverage {
                interval: "chr1:+:403-1000".parse()?,
                depth: 6,
            },
        ];

        // Equal drops at 400 and rises at 403: the lower coordinate wins.
        let batch = collect(&locus, records)?;
        let segments = build(&batch, &Config::default());
        assert_eq!(spans(&segments), vec![(100, 400), (400, 1000)]);

        Ok(())
    }

    #[test]
    fn test_boundaries_near_the_locus_edges_are_absorbed(
    ) -> Result<(), Box<dyn std::error::Error>> {
        let locus = "chr1:+:100-1000".parse::<GenomicInterval>()?;
        let records = vec![Record::Coverage {
            interval: "chr1:+:103-998".parse()?,
            depth: 10,
        }];

        let batch = collect(&locus, records)?;
        let segments = build(&batch, &Config::default());
        assert_eq!(spans(&segments), vec![(100, 1000)]);

        let config = Builder::default().boundary_merge_tolerance(0).try_build()?;
        let segments = build(&batch, &config);
        assert_eq!(spans(&segments), vec![(100, 103), (103, 998), (998, 1000)]);

        Ok(())
    }

    #[test]
    fn test_building_is_idempotent() -> Result<(), Box<dyn std::error::Error>> {
        let locus = "chr1:+:100-1000".parse::<GenomicInterval>()?;
        let records = vec![
            Record::Coverage {
                interval: "chr1:+:100-300".parse()?,
                depth: 10,
            },
            Record::Coverage {
                interval: "chr1:+:297-520".parse()?,
                depth: 3,
            },
            Record::Coverage {
                interval: "chr1:+:700-900".parse()?,
                depth: 8,
            },
            Record::Junction {
                donor: "chr1:+:250-298".parse()?,
                acceptor: "chr1:+:701-750".parse()?,
                count: 7,
            },
        ];

        let batch = collect(&locus, records)?;
        let config = Config::default();

        assert_eq!(build(&batch, &config), build(&batch, &config));

        Ok(())
    }

    #[test]
    fn test_neighbouring_clusters_are_merged() -> Result<(), Box<dyn std::error::Error>> {
        let locus = "chr1:+:100-1000".parse::<GenomicInterval>()?;
        let records = vec![
            Record::Coverage {
                interval: "chr1:+:100-305".parse()?,
                depth: 10,
            },
            Record::Coverage {
                interval: "chr1:+:100-300".parse()?,
                depth: 1,
            },
            Record::Coverage {
                interval: "chr1:+:310-1000".parse()?,
                depth: 10,
            },
        ];

        // The clusters [300, 305] and [310] elect 305 and 310, which tie on
        // support and sit within tolerance, so only 305 survives.
        let batch = collect(&locus, records)?;
        let segments = build(&batch, &Config::default());
        assert_eq!(spans(&segments), vec![(100, 305), (305, 1000)]);

        for pair in segments.windows(2) {
            assert!(pair[1].start() - pair[0].start() > 5);
        }

        let config = Builder::default().boundary_merge_tolerance(0).try_build()?;
        let segments = build(&batch, &config);
        assert_eq!(
            spans(&segments),
            vec![(100, 300), (300, 305), (305, 310), (310, 1000)]
        );

        Ok(())
    }

    #[test]
    fn test_the_better_supported_neighbour_survives() -> Result<(), Box<dyn std::error::Error>> {
        let locus = "chr1:+:100-1000".parse::<GenomicInterval>()?;
        let records = vec![
            Record::Coverage {
                interval: "chr1:+:100-500".parse()?,
                depth: 1,
            },
            Record::Coverage {
                interval: "chr1:+:100-505".parse()?,
                depth: 2,
            },
            Record::Coverage {
                interval: "chr1:+:508-1000".parse()?,
                depth: 3,
            },
            Record::Junction {
                donor: "chr1:+:450-508".parse()?,
                acceptor: "chr1:+:900-950".parse()?,
                count: 6,
            },
        ];

        // The clusters [500, 505] and [508] elect 505 (support 2) and 508
        // (support 9). They sit within tolerance and 508 is better supported.
        let batch = collect(&locus, records)?;
        let segments = build(&batch, &Config::default());
        assert_eq!(spans(&segments), vec![(100, 508), (508, 900), (900, 1000)]);

        Ok(())
    }
}
