//! Per-locus assembly, from evidence to isoforms.
//!
//! Each locus moves through the stages below strictly in order:
//!
//! ```text
//! Collected -> Segmented -> Graphed -> Simplified -> PathsAssembled -> Scored -> Done
//! ```
//!
//! A locus may finish at any stage with zero isoforms (for example, when no
//! evidence overlaps it or when every path falls below the confidence floor).
//! This never fails the run; the [`Assembly`] records how far the locus got
//! and why it stopped.
//!
//! Loci share nothing but the read-only [`Config`], so [`assemble_all`]
//! distributes them across a thread pool.

use rayon::prelude::*;
use tracing::debug;
use tracing::debug_span;

use crate::config::Config;
use crate::core::GenomicInterval;
use crate::evidence::collect;
use crate::evidence::Record;
use crate::graph::construct;
use crate::graph::simplify;
use crate::isoform::element;
use crate::isoform::Element;
use crate::isoform::Isoform;
use crate::isoform::Scorer;
use crate::path::assemble;
use crate::segment;
use crate::warning::Warning;

/// A stage of the per-locus pipeline.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Stage {
    /// No stage has completed.
    Pending,

    /// Evidence has been collected into a batch.
    Collected,

    /// The locus has been partitioned into segments.
    Segmented,

    /// The splice graph has been constructed.
    Graphed,

    /// The splice graph has been simplified.
    Simplified,

    /// Candidate paths have been assembled.
    PathsAssembled,

    /// Candidate paths have been scored into isoforms.
    Scored,

    /// The locus is finished.
    Done,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Pending => write!(f, "pending"),
            Stage::Collected => write!(f, "collected"),
            Stage::Segmented => write!(f, "segmented"),
            Stage::Graphed => write!(f, "graphed"),
            Stage::Simplified => write!(f, "simplified"),
            Stage::PathsAssembled => write!(f, "paths assembled"),
            Stage::Scored => write!(f, "scored"),
            Stage::Done => write!(f, "done"),
        }
    }
}

/// The input for a single locus.
#[derive(Clone, Debug)]
pub struct LocusInput {
    /// The locus.
    locus: GenomicInterval,

    /// The evidence records overlapping the locus.
    records: Vec<Record>,

    /// The name of the locus, if one was provided.
    name: Option<String>,
}

impl LocusInput {
    /// Creates a new [`LocusInput`].
    ///
    /// Unless a name is provided with [`LocusInput::with_name()`], the locus
    /// is named `<contig>:<start>-<end>`.
    ///
    /// # Examples
    ///
    /// ```
    /// use splicegraph::pipeline::LocusInput;
    ///
    /// let input = LocusInput::new("chr1:+:100-1000".parse()?, Vec::new());
    /// assert_eq!(input.name(), "chr1:100-1000");
    ///
    /// let input = input.with_name("GENE1");
    /// assert_eq!(input.name(), "GENE1");
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn new(locus: GenomicInterval, records: Vec<Record>) -> Self {
        Self {
            locus,
            records,
            name: None,
        }
    }

    /// Sets the name of the locus.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Gets the locus.
    pub fn locus(&self) -> &GenomicInterval {
        &self.locus
    }

    /// Gets the evidence records.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Gets the name of the locus.
    pub fn name(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => format!(
                "{}:{}-{}",
                self.locus.contig(),
                self.locus.start(),
                self.locus.end()
            ),
        }
    }
}

/// The result of assembling a single locus.
#[derive(Clone, Debug)]
pub struct Assembly {
    /// The name of the locus.
    name: String,

    /// The locus.
    locus: GenomicInterval,

    /// The isoforms, in genomic-coordinate order.
    isoforms: Vec<Isoform>,

    /// The warnings raised while assembling the locus.
    warnings: Vec<Warning>,

    /// The last stage completed before the locus finished.
    completed: Stage,

    /// The reason the locus was skipped, if it was.
    skipped: Option<String>,
}

impl Assembly {
    /// Creates a new, pending assembly.
    fn new(name: String, locus: GenomicInterval) -> Self {
        Self {
            name,
            locus,
            isoforms: Vec::new(),
            warnings: Vec::new(),
            completed: Stage::Pending,
            skipped: None,
        }
    }

    /// Records the completion of a stage.
    fn advance(&mut self, stage: Stage) {
        debug!("{} -> {}", self.completed, stage);
        self.completed = stage;
    }

    /// Finishes the assembly.
    fn finish(self) -> Self {
        debug!(
            "{} -> {} with {} isoform(s)",
            self.completed,
            Stage::Done,
            self.isoforms.len()
        );
        self
    }

    /// Gets the name of the locus.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Gets the locus.
    pub fn locus(&self) -> &GenomicInterval {
        &self.locus
    }

    /// Gets the isoforms in genomic-coordinate order.
    pub fn isoforms(&self) -> &[Isoform] {
        &self.isoforms
    }

    /// Consumes `self` to return the isoforms.
    pub fn into_isoforms(self) -> Vec<Isoform> {
        self.isoforms
    }

    /// Gets the introns and classified exons of every isoform, deduplicated
    /// and in genomic order.
    ///
    /// See [`element::elements()`] for how exons are classified.
    pub fn elements(&self) -> Vec<Element> {
        element::elements(&self.isoforms)
    }

    /// Gets the warnings raised while assembling the locus.
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Gets the last stage completed before the locus finished.
    pub fn completed(&self) -> Stage {
        self.completed
    }

    /// Gets the reason the locus was skipped, if it was.
    pub fn skip_reason(&self) -> Option<&str> {
        self.skipped.as_deref()
    }
}

/// Runs the per-locus pipeline.
#[derive(Debug)]
pub struct Pipeline<'a> {
    /// The configuration.
    config: &'a Config,
}

impl<'a> Pipeline<'a> {
    /// Creates a new [`Pipeline`].
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    /// Assembles a single locus.
    ///
    /// # Examples
    ///
    /// ```
    /// use splicegraph::config::Config;
    /// use splicegraph::evidence::Record;
    /// use splicegraph::pipeline::LocusInput;
    /// use splicegraph::pipeline::Pipeline;
    /// use splicegraph::pipeline::Stage;
    ///
    /// let config = Config::default();
    /// let records = vec![Record::Coverage {
    ///     interval: "chr1:+:100-1000".parse()?,
    ///     depth: 10,
    /// }];
    ///
    /// let input = LocusInput::new("chr1:+:100-1000".parse()?, records).with_name("GENE1");
    /// let assembly = Pipeline::new(&config).run(input);
    ///
    /// assert_eq!(assembly.completed(), Stage::Scored);
    /// assert_eq!(assembly.isoforms().len(), 1);
    /// assert_eq!(
    ///     assembly.isoforms()[0].to_string(),
    ///     "GENE1.1\tchr1\t+\t100-1000\t1.0000\t10.00"
    /// );
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn run(&self, input: LocusInput) -> Assembly {
        let name = input.name();
        let LocusInput { locus, records, .. } = input;

        let span = debug_span!("locus", locus = %name);
        let _entered = span.enter();

        let mut assembly = Assembly::new(name, locus);

        let batch = match collect(&assembly.locus, records) {
            Ok(batch) => batch,
            Err(err) => {
                debug!("skipping the locus: {err}");
                assembly.skipped = Some(err.to_string());
                return assembly.finish();
            }
        };

        assembly.warnings.extend(batch.warnings().iter().cloned());
        assembly.advance(Stage::Collected);

        let segments = segment::build(&batch, self.config);
        assembly.advance(Stage::Segmented);

        let (graph, warnings) = construct(segments, &batch, self.config);
        assembly.warnings.extend(warnings);
        assembly.advance(Stage::Graphed);

        let graph = simplify(graph, self.config.min_support());
        assembly.advance(Stage::Simplified);

        if graph.segment_count() == 0 {
            debug!("no segments survived simplification");
            return assembly.finish();
        }

        let (paths, warnings) = assemble(&graph, self.config);
        assembly.warnings.extend(warnings);
        assembly.advance(Stage::PathsAssembled);

        assembly.isoforms =
            Scorer::new(self.config, &batch).score_all(paths, &graph, &assembly.name);
        assembly.advance(Stage::Scored);

        assembly.finish()
    }
}

/// Assembles every locus in parallel.
///
/// The assemblies are returned in the same order as `inputs`.
pub fn assemble_all(config: &Config, inputs: Vec<LocusInput>) -> Vec<Assembly> {
    debug!("assembling {} loci", inputs.len());

    let pipeline = Pipeline::new(config);

    inputs
        .into_par_iter()
        .map(|input| pipeline.run(input))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Builder;
    use crate::config::MinSupport;
    use crate::core::Strand;
    use crate::isoform::element::Kind;
    use crate::warning::Inconsistency;

    fn coverage(interval: &str, depth: u32) -> Result<Record, Box<dyn std::error::Error>> {
        Ok(Record::Coverage {
            interval: interval.parse()?,
            depth,
        })
    }

    fn junction(
        donor: &str,
        acceptor: &str,
        count: u32,
    ) -> Result<Record, Box<dyn std::error::Error>> {
        Ok(Record::Junction {
            donor: donor.parse()?,
            acceptor: acceptor.parse()?,
            count,
        })
    }

    fn exons(isoform: &Isoform) -> Vec<String> {
        isoform
            .exons()
            .iter()
            .map(|exon| format!("{}-{}", exon.start(), exon.end()))
            .collect()
    }

    fn two_exons() -> Result<Vec<Record>, Box<dyn std::error::Error>> {
        Ok(vec![
            coverage("chr1:+:100-300", 10)?,
            coverage("chr1:+:500-700", 10)?,
            junction("chr1:+:250-300", "chr1:+:500-550", 20)?,
        ])
    }

    #[test]
    fn test_uniform_coverage_yields_one_isoform() -> Result<(), Box<dyn std::error::Error>> {
        let config = Config::default();
        let input = LocusInput::new(
            "chr1:+:100-1000".parse()?,
            vec![coverage("chr1:+:100-1000", 10)?],
        );

        let assembly = Pipeline::new(&config).run(input);

        assert_eq!(assembly.name(), "chr1:100-1000");
        assert_eq!(assembly.isoforms().len(), 1);
        assert_eq!(exons(&assembly.isoforms()[0]), vec!["100-1000"]);
        assert_eq!(assembly.isoforms()[0].path().len(), 1);
        assert!(assembly.warnings().is_empty());

        Ok(())
    }

    #[test]
    fn test_two_exons_yield_one_confident_isoform() -> Result<(), Box<dyn std::error::Error>> {
        let config = Config::default();
        let input = LocusInput::new("chr1:+:100-700".parse()?, two_exons()?);

        let assembly = Pipeline::new(&config).run(input);

        assert_eq!(assembly.completed(), Stage::Scored);
        assert_eq!(assembly.isoforms().len(), 1);

        let isoform = &assembly.isoforms()[0];
        assert_eq!(exons(isoform), vec!["100-300", "500-700"]);
        assert_eq!(isoform.confidence(), 1.0);
        assert_eq!(isoform.abundance(), 20.0);
        assert_eq!(isoform.name(), Some("chr1:100-700.1"));

        Ok(())
    }

    #[test]
    fn test_low_count_junctions_are_pruned() -> Result<(), Box<dyn std::error::Error>> {
        let config = Builder::default()
            .min_support(MinSupport::Absolute(5.0))
            .try_build()?;

        let mut records = two_exons()?;
        records.push(coverage("chr1:+:800-900", 10)?);
        records.push(junction("chr1:+:650-700", "chr1:+:800-850", 1)?);

        let input = LocusInput::new("chr1:+:100-900".parse()?, records);
        let assembly = Pipeline::new(&config).run(input);

        assert_eq!(assembly.isoforms().len(), 1);

        let isoform = &assembly.isoforms()[0];
        assert_eq!(exons(isoform), vec!["100-300", "500-700"]);
        assert_eq!(isoform.confidence(), 1.0);

        Ok(())
    }

    #[test]
    fn test_coverage_spilling_past_a_donor_is_not_an_isoform(
    ) -> Result<(), Box<dyn std::error::Error>> {
        let config = Config::default();
        let records = vec![
            coverage("chr1:+:100-302", 5)?,
            coverage("chr1:+:600-1000", 5)?,
            junction("chr1:+:250-300", "chr1:+:600-650", 40)?,
        ];

        let input = LocusInput::new("chr1:+:100-1000".parse()?, records);
        let assembly = Pipeline::new(&config).run(input);

        assert_eq!(assembly.isoforms().len(), 1);
        assert_eq!(
            assembly.isoforms()[0].to_string(),
            "chr1:100-1000.1\tchr1\t+\t100-300,600-1000\t1.0000\t40.00"
        );

        Ok(())
    }

    #[test]
    fn test_a_noise_gap_within_tolerance_does_not_split_a_transcript(
    ) -> Result<(), Box<dyn std::error::Error>> {
        let config = Config::default();
        let records = vec![
            coverage("chr1:+:100-305", 10)?,
            coverage("chr1:+:100-300", 1)?,
            coverage("chr1:+:310-1000", 10)?,
        ];

        let input = LocusInput::new("chr1:+:100-1000".parse()?, records);
        let assembly = Pipeline::new(&config).run(input);

        assert_eq!(assembly.isoforms().len(), 1);

        let isoform = &assembly.isoforms()[0];
        assert_eq!(exons(isoform), vec!["100-1000"]);
        assert_eq!(isoform.path().len(), 2);
        assert_eq!(isoform.confidence(), 1.0);

        Ok(())
    }

    #[test]
    fn test_weakly_retained_introns_follow_the_cutoff() -> Result<(), Box<dyn std::error::Error>>
    {
        let records = || -> Result<Vec<Record>, Box<dyn std::error::Error>> {
            let mut records = two_exons()?;
            records.push(coverage("chr1:+:300-500", 3)?);
            Ok(records)
        };

        let config = Config::default();
        let input = LocusInput::new("chr1:+:100-700".parse()?, records()?);
        let assembly = Pipeline::new(&config).run(input);

        let rendered = assembly.isoforms().iter().map(exons).collect::<Vec<_>>();
        assert_eq!(
            rendered,
            vec![vec!["100-300", "500-700"], vec!["100-700"]]
        );

        let config = Builder::default().intron_retention_cutoff(0.5).try_build()?;
        let input = LocusInput::new("chr1:+:100-700".parse()?, records()?);
        let assembly = Pipeline::new(&config).run(input);

        let rendered = assembly.isoforms().iter().map(exons).collect::<Vec<_>>();
        assert_eq!(rendered, vec![vec!["100-300", "500-700"]]);

        Ok(())
    }

    #[test]
    fn test_elements_pool_every_isoform() -> Result<(), Box<dyn std::error::Error>> {
        let config = Config::default();
        let mut records = Vec::new();

        for exon in ["100-200", "300-400", "500-600"] {
            records.push(coverage(&format!("chr1:-:{exon}"), 10)?);
        }

        records.push(junction("chr1:-:150-200", "chr1:-:300-350", 40)?);
        records.push(junction("chr1:-:350-400", "chr1:-:500-550", 30)?);
        records.push(junction("chr1:-:150-200", "chr1:-:500-550", 10)?);

        let input = LocusInput::new("chr1:-:100-600".parse()?, records);
        let assembly = Pipeline::new(&config).run(input);
        assert_eq!(assembly.isoforms().len(), 2);

        let elements = assembly
            .elements()
            .iter()
            .map(|element| {
                (
                    element.interval().start(),
                    element.interval().end(),
                    element.kind(),
                )
            })
            .collect::<Vec<_>>();

        assert_eq!(
            elements,
            vec![
                (100, 200, Kind::TesExon),
                (200, 300, Kind::Intron),
                (200, 500, Kind::Intron),
                (300, 400, Kind::InternalExon),
                (400, 500, Kind::Intron),
                (500, 600, Kind::TssExon),
            ]
        );

        Ok(())
    }

    #[test]
    fn test_exclusive_exons_yield_three_isoforms() -> Result<(), Box<dyn std::error::Error>> {
        let config = Config::default();
        let mut records = Vec::new();

        for exon in ["100-200", "300-400", "500-600", "700-800", "900-1000"] {
            records.push(coverage(&format!("chr1:+:{exon}"), 10)?);
        }

        for middle in [300, 500, 700] {
            records.push(junction(
                "chr1:+:150-200",
                &format!("chr1:+:{}-{}", middle, middle + 50),
                10,
            )?);
            records.push(junction(
                &format!("chr1:+:{}-{}", middle + 50, middle + 100),
                "chr1:+:900-950",
                10,
            )?);
        }

        let input = LocusInput::new("chr1:+:100-1000".parse()?, records).with_name("MXE");
        let assembly = Pipeline::new(&config).run(input);

        let rendered = assembly
            .isoforms()
            .iter()
            .map(|isoform| (isoform.name().map(String::from), exons(isoform)))
            .collect::<Vec<_>>();

        assert_eq!(
            rendered,
            vec![
                (
                    Some(String::from("MXE.1")),
                    vec![
                        String::from("100-200"),
                        String::from("300-400"),
                        String::from("900-1000")
                    ]
                ),
                (
                    Some(String::from("MXE.2")),
                    vec![
                        String::from("100-200"),
                        String::from("500-600"),
                        String::from("900-1000")
                    ]
                ),
                (
                    Some(String::from("MXE.3")),
                    vec![
                        String::from("100-200"),
                        String::from("700-800"),
                        String::from("900-1000")
                    ]
                ),
            ]
        );

        for isoform in assembly.isoforms() {
            assert!((0.0..=1.0).contains(&isoform.confidence()));
        }

        Ok(())
    }

    #[test]
    fn test_empty_loci_are_skipped() -> Result<(), Box<dyn std::error::Error>> {
        let config = Config::default();
        let input = LocusInput::new(
            "chr1:+:100-1000".parse()?,
            vec![coverage("chr2:+:100-1000", 10)?],
        );

        let assembly = Pipeline::new(&config).run(input);

        assert!(assembly.isoforms().is_empty());
        assert_eq!(assembly.completed(), Stage::Pending);
        assert_eq!(
            assembly.skip_reason(),
            Some("no evidence overlaps the locus chr1:+:100-1000")
        );

        Ok(())
    }

    #[test]
    fn test_warnings_are_surfaced() -> Result<(), Box<dyn std::error::Error>> {
        let config = Config::default();
        let mut records = two_exons()?;
        records.push(coverage("chr1:-:100-300", 10)?);

        let input = LocusInput::new("chr1:+:100-700".parse()?, records);
        let assembly = Pipeline::new(&config).run(input);

        assert_eq!(assembly.isoforms().len(), 1);
        assert_eq!(
            assembly.warnings(),
            &[Warning::StructuralInconsistency(Inconsistency::CrossStrand {
                expected: Strand::Positive,
                found: Strand::Negative,
            })]
        );

        Ok(())
    }

    #[test]
    fn test_assemble_all_preserves_input_order() -> Result<(), Box<dyn std::error::Error>> {
        let config = Config::default();

        let inputs = (0..16)
            .map(|i| {
                let start = 1000 * i + 100;
                let interval = format!("chr1:+:{}-{}", start, start + 500);
                Ok(LocusInput::new(interval.parse()?, vec![coverage(&interval, 10)?]))
            })
            .collect::<Result<Vec<_>, Box<dyn std::error::Error>>>()?;

        let names = inputs.iter().map(|input| input.name()).collect::<Vec<_>>();
        let assemblies = assemble_all(&config, inputs);

        assert_eq!(
            assemblies
                .iter()
                .map(|assembly| assembly.name().to_string())
                .collect::<Vec<_>>(),
            names
        );
        assert!(assemblies
            .iter()
            .all(|assembly| assembly.isoforms().len() == 1));

        Ok(())
    }
}
