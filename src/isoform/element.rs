//! Structural elements shared by the isoforms of a locus.
//!
//! The exons and introns of every isoform are pooled into a single,
//! deduplicated set of [`Element`]s. Exons are classified by their position
//! within the isoform in transcription order, so on the negative strand the
//! exon with the highest coordinates is the one carrying the transcription
//! start site.

use std::collections::BTreeSet;

use crate::core::GenomicInterval;
use crate::core::Strand;
use crate::isoform::Isoform;

/// The kind of an [`Element`].
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Kind {
    /// An intron between two consecutive exons.
    Intron,

    /// An exon that neither starts nor ends its isoform.
    InternalExon,

    /// The exon carrying the transcription start site.
    TssExon,

    /// The exon carrying the transcription end site.
    TesExon,
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Kind::Intron => write!(f, "intron"),
            Kind::InternalExon => write!(f, "internal_exon"),
            Kind::TssExon => write!(f, "tss_exon"),
            Kind::TesExon => write!(f, "tes_exon"),
        }
    }
}

/// An intron or a classified exon.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Element {
    /// The interval.
    interval: GenomicInterval,

    /// The kind.
    kind: Kind,
}

impl Element {
    /// Gets the interval.
    pub fn interval(&self) -> &GenomicInterval {
        &self.interval
    }

    /// Gets the kind.
    pub fn kind(&self) -> Kind {
        self.kind
    }
}

/// Elements display as BED6 lines named after their kind.
impl std::fmt::Display for Element {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}\t0\t{}",
            self.interval.contig(),
            self.interval.start(),
            self.interval.end(),
            self.kind,
            self.interval.strand()
        )
    }
}

/// Gathers the elements of a set of isoforms, sorted by interval and then by
/// kind.
///
/// An exon that both starts and ends a single-exon isoform is reported as both
/// a [`Kind::TssExon`] and a [`Kind::TesExon`]. The same interval may appear
/// under several kinds when isoforms disagree on its role.
///
/// # Examples
///
/// ```
/// use splicegraph::config::Config;
/// use splicegraph::evidence::Record;
/// use splicegraph::isoform::element::elements;
/// use splicegraph::pipeline::LocusInput;
/// use splicegraph::pipeline::Pipeline;
///
/// let config = Config::default();
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
/// let input = LocusInput::new("chr1:+:100-700".parse()?, records);
/// let assembly = Pipeline::new(&config).run(input);
/// let lines = elements(assembly.isoforms())
///     .iter()
///     .map(|element| element.to_string())
///     .collect::<Vec<_>>();
///
/// assert_eq!(
///     lines,
///     vec![
///         "chr1\t100\t300\ttss_exon\t0\t+",
///         "chr1\t300\t500\tintron\t0\t+",
///         "chr1\t500\t700\ttes_exon\t0\t+",
///     ]
/// );
///
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn elements(isoforms: &[Isoform]) -> Vec<Element> {
    let mut elements = BTreeSet::new();

    for isoform in isoforms {
        let exons = isoform.exons();
        let last = exons.len().saturating_sub(1);

        let (upstream, downstream) = match isoform.strand() {
            Strand::Positive => (Kind::TssExon, Kind::TesExon),
            Strand::Negative => (Kind::TesExon, Kind::TssExon),
        };

        for (i, exon) in exons.iter().enumerate() {
            let mut kinds = Vec::with_capacity(2);

            if i == 0 {
                kinds.push(upstream);
            }

            if i == last {
                kinds.push(downstream);
            }

            if kinds.is_empty() {
                kinds.push(Kind::InternalExon);
            }

            for kind in kinds {
                elements.insert(Element {
                    interval: exon.clone(),
                    kind,
                });
            }
        }

        for intron in isoform.introns() {
            elements.insert(Element {
                interval: intron,
                kind: Kind::Intron,
            });
        }
    }

    elements.into_iter().collect()
}
