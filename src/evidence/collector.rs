//! Restricts a stream of evidence records to one locus.

use std::collections::BTreeMap;

use omics::coordinate::position::Number;
use tracing::debug;
use tracing::warn;

use crate::core::GenomicInterval;
use crate::evidence::Batch;
use crate::evidence::Junction;
use crate::evidence::Link;
use crate::evidence::Record;
use crate::evidence::Run;
use crate::warning::Inconsistency;
use crate::warning::Warning;

/// An error related to collecting evidence.
#[derive(Debug, Eq, PartialEq)]
pub enum Error {
    /// No usable observation overlaps the locus.
    ///
    /// This signals the caller to skip assembly for the locus; it is not a
    /// failure of the run.
    EmptyEvidence(GenomicInterval),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::EmptyEvidence(locus) => write!(f, "no evidence overlaps the locus {locus}"),
        }
    }
}

impl std::error::Error for Error {}

/// A [`Result`](std::result::Result) with an [`Error`].
type Result<T> = std::result::Result<T, Error>;

/// Collects the records overlapping `locus` into a [`Batch`].
///
/// - Records that do not overlap the locus are ignored.
/// - Records on a strand other than the locus strand are discarded and a
///   [`Warning::StructuralInconsistency`] is recorded.
/// - Records with zero depth or count carry no evidence and are ignored.
/// - Coverage is clipped to the locus and swept into maximal runs of constant
///   depth.
///
/// # Examples
///
/// ```
/// use splicegraph::evidence::collect;
/// use splicegraph::evidence::Record;
///
/// let locus = "chr1:+:100-1000".parse()?;
/// let records = vec![
///     Record::Coverage {
///         interval: "chr1:+:50-600".parse()?,
///         depth: 4,
///     },
///     Record::Coverage {
///         interval: "chr1:+:400-1200".parse()?,
///         depth: 6,
///     },
/// ];
///
/// let batch = collect(&locus, records)?;
/// let depths = batch.runs().iter().map(|run| run.depth).collect::<Vec<_>>();
/// assert_eq!(depths, vec![4, 10, 6]);
///
/// let err = collect(&"chr2:+:0-10".parse()?, Vec::new()).unwrap_err();
/// assert_eq!(err.to_string(), "no evidence overlaps the locus chr2:+:0-10");
///
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn collect<I>(locus: &GenomicInterval, records: I) -> Result<Batch>
where
    I: IntoIterator<Item = Record>,
{
    let mut deltas = BTreeMap::<Number, i64>::new();
    let mut junctions = BTreeMap::<Junction, u64>::new();
    let mut links = BTreeMap::<Link, u64>::new();
    let mut warnings = Vec::new();
    let mut observations = 0usize;

    for record in records {
        if !record.overlaps(locus) || record.support() == 0 {
            continue;
        }

        if let Some(found) = record.conflicting_strand(locus.strand()) {
            let inconsistency = Inconsistency::CrossStrand {
                expected: locus.strand(),
                found,
            };
            warn!("discarding {}: {}", record, inconsistency);
            warnings.push(Warning::StructuralInconsistency(inconsistency));
            continue;
        }

        match record {
            Record::Coverage { interval, depth } => {
                let Some((start, end)) = locus.clamp_span(interval.start(), interval.end())
                else {
                    continue;
                };

                *deltas.entry(start).or_default() += i64::from(depth);
                *deltas.entry(end).or_default() -= i64::from(depth);
            }
            Record::Junction {
                donor,
                acceptor,
                count,
            } => {
                let junction = Junction {
                    donor: donor.end(),
                    acceptor: acceptor.start(),
                };

                *junctions.entry(junction).or_default() += u64::from(count);
            }
            Record::Pairing {
                first,
                second,
                count,
            } => {
                let link = Link::new(
                    (first.start(), first.end()),
                    (second.start(), second.end()),
                );

                *links.entry(link).or_default() += u64::from(count);
            }
        }

        observations += 1;
    }

    if observations == 0 {
        return Err(Error::EmptyEvidence(locus.clone()));
    }

    let runs = sweep(deltas);

    debug!(
        "collected {} observation(s): {} coverage run(s), {} junction(s), {} link(s)",
        observations,
        runs.len(),
        junctions.len(),
        links.len()
    );

    Ok(Batch::new(locus.clone(), runs, junctions, links, warnings))
}

/// Sweeps depth change events into maximal runs of constant, positive depth.
fn sweep(deltas: BTreeMap<Number, i64>) -> Vec<Run> {
    let mut runs = Vec::new();
    let mut depth = 0i64;
    let mut last = None;

    for (position, delta) in deltas {
        if delta == 0 {
            continue;
        }

        if let Some(previous) = last {
            if depth > 0 && previous < position {
                runs.push(Run {
                    start: previous,
                    end: position,
                    depth: depth as u64,
                });
            }
        }

        depth += delta;
        last = Some(position);
    }

    runs
}
