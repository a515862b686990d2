//! Scored isoforms.
//!
//! An [`Isoform`] is the terminal entity produced for a locus: a
//! [`CandidatePath`] together with its structural confidence and abundance
//! estimate. Isoforms are created by the [`scorer`] and are immutable
//! thereafter. The [`element`]s of a locus pool the exons and introns of its
//! isoforms.

use crate::core::GenomicInterval;
use crate::core::Strand;
use crate::evidence::Link;
use crate::path::CandidatePath;
use crate::segment::Segment;

pub mod abundance;
pub mod element;
pub mod scorer;

pub use element::Element;
pub use scorer::Scorer;

/// An assembled isoform.
#[derive(Clone, Debug, PartialEq)]
pub struct Isoform {
    /// The name of the isoform, once it has been placed in output order.
    name: Option<String>,

    /// The path through the splice graph.
    path: CandidatePath,

    /// The exons, formed by merging physically adjacent segments.
    exons: Vec<GenomicInterval>,

    /// The structural confidence within `[0, 1]`.
    confidence: f64,

    /// The normalized abundance estimate.
    abundance: f64,

    /// The number of paired-end fragments with both mates inside exons of the
    /// isoform.
    pairing_support: u64,
}

impl Isoform {
    /// Creates a new, unnamed isoform.
    pub(crate) fn new(path: CandidatePath, confidence: f64, abundance: f64) -> Self {
        let exons = exons(path.segments().iter());

        Self {
            name: None,
            path,
            exons,
            confidence,
            abundance,
            pairing_support: 0,
        }
    }

    /// Sets the name of the isoform.
    pub(crate) fn with_name(mut self, name: String) -> Self {
        self.name = Some(name);
        self
    }

    /// Replaces the abundance estimate.
    pub(crate) fn with_abundance(mut self, abundance: f64) -> Self {
        self.abundance = abundance;
        self
    }

    /// Counts the paired-end links whose mates each fall inside an exon.
    pub(crate) fn with_pairing_support<'a, I>(mut self, links: I) -> Self
    where
        I: IntoIterator<Item = (&'a Link, &'a u64)>,
    {
        let inside = |(start, end): (u64, u64)| {
            self.exons
                .iter()
                .any(|exon| exon.start() <= start && end <= exon.end())
        };

        let support = links
            .into_iter()
            .filter(|(link, _)| inside(link.first) && inside(link.second))
            .map(|(_, count)| *count)
            .sum();

        self.pairing_support = support;
        self
    }

    /// Gets the name of the isoform.
    ///
    /// Names take the form `<locus>.<n>`, numbered from one in output order.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Gets the path through the splice graph.
    pub fn path(&self) -> &CandidatePath {
        &self.path
    }

    /// Gets the exons in genomic order.
    pub fn exons(&self) -> &[GenomicInterval] {
        &self.exons
    }

    /// Gets the introns in genomic order.
    ///
    /// # Examples
    ///
    /// ```
    /// use splicegraph::config::Config;
    /// use splicegraph::evidence::Record;
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
    /// let isoform = &assembly.isoforms()[0];
    ///
    /// let introns = isoform
    ///     .introns()
    ///     .iter()
    ///     .map(|intron| intron.to_string())
    ///     .collect::<Vec<_>>();
    /// assert_eq!(introns, vec!["chr1:+:300-500"]);
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn introns(&self) -> Vec<GenomicInterval> {
        self.exons
            .iter()
            .zip(self.exons.iter().skip(1))
            .filter_map(|(upstream, downstream)| upstream.gap(downstream))
            .collect()
    }

    /// Gets the extent of the isoform, from the start of its first exon to the
    /// end of its last exon.
    pub fn span(&self) -> GenomicInterval {
        let first = self.path.first().interval();
        first.hull(self.path.last().interval())
    }

    /// Gets the strand.
    pub fn strand(&self) -> Strand {
        self.path.first().interval().strand()
    }

    /// Gets the structural confidence within `[0, 1]`.
    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    /// Gets the normalized abundance estimate.
    pub fn abundance(&self) -> f64 {
        self.abundance
    }

    /// Gets the number of paired-end fragments whose mates both fall inside
    /// exons of the isoform.
    pub fn pairing_support(&self) -> u64 {
        self.pairing_support
    }
}

impl std::fmt::Display for Isoform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let exons = self
            .exons
            .iter()
            .map(|exon| format!("{}-{}", exon.start(), exon.end()))
            .collect::<Vec<_>>();

        write!(
            f,
            "{}\t{}\t{}\t{}\t{:.4}\t{:.2}",
            self.name.as_deref().unwrap_or("."),
            self.span().contig(),
            self.strand(),
            exons.join(","),
            self.confidence,
            self.abundance
        )
    }
}

/// Merges physically adjacent segments into exons.
fn exons<'a>(segments: impl Iterator<Item = &'a Segment>) -> Vec<GenomicInterval> {
    let mut exons: Vec<GenomicInterval> = Vec::new();

    for segment in segments {
        match exons.last_mut() {
            Some(exon) if exon.end() == segment.start() => {
                *exon = exon.hull(segment.interval());
            }
            _ => exons.push(segment.interval().clone()),
        }
    }

    exons
}

#[cfg(test)]
mod tests {
    use nonempty::NonEmpty;

    use super::*;
    use crate::segment::SegmentId;

    fn segment(id: usize, start: u64, end: u64) -> Result<Segment, Box<dyn std::error::Error>> {
        Ok(Segment::new(
            SegmentId::new(id),
            GenomicInterval::try_new("chr1", start, end, Strand::Positive)?,
            10.0,
        ))
    }

    #[test]
    fn test_exons_and_introns() -> Result<(), Box<dyn std::error::Error>> {
        let segments = NonEmpty::from_vec(vec![
            segment(0, 100, 200)?,
            segment(1, 200, 300)?,
            segment(3, 500, 600)?,
        ])
        .ok_or("empty path")?;

        let isoform = Isoform::new(CandidatePath::new_unchecked(segments), 0.5, 12.0)
            .with_name(String::from("locus.1"));

        assert_eq!(isoform.name(), Some("locus.1"));
        assert_eq!(
            isoform.exons(),
            &[
                GenomicInterval::try_new("chr1", 100, 300, Strand::Positive)?,
                GenomicInterval::try_new("chr1", 500, 600, Strand::Positive)?,
            ]
        );
        assert_eq!(
            isoform.introns(),
            vec![GenomicInterval::try_new("chr1", 300, 500, Strand::Positive)?]
        );
        assert_eq!(
            isoform.span(),
            GenomicInterval::try_new("chr1", 100, 600, Strand::Positive)?
        );
        assert_eq!(
            isoform.to_string(),
            "locus.1\tchr1\t+\t100-300,500-600\t0.5000\t12.00"
        );

        Ok(())
    }

    #[test]
    fn test_pairing_support() -> Result<(), Box<dyn std::error::Error>> {
        let segments = NonEmpty::from_vec(vec![segment(0, 100, 300)?, segment(2, 500, 700)?])
            .ok_or("empty path")?;
        let links = [
            (Link::new((150, 250), (550, 650)), 4),
            (Link::new((150, 250), (350, 450)), 9),
            (Link::new((520, 560), (600, 690)), 2),
        ];

        let isoform = Isoform::new(CandidatePath::new_unchecked(segments), 1.0, 20.0)
            .with_pairing_support(links.iter().map(|(link, count)| (link, count)));

        assert_eq!(isoform.pairing_support(), 6);

        Ok(())
    }
}
