//! Scoring candidate paths into isoforms.

use petgraph::stable_graph::NodeIndex;
use petgraph::Direction;
use tracing::debug;

use crate::config::Config;
use crate::core::Number;
use crate::evidence::Batch;
use crate::graph::SpliceGraph;
use crate::isoform::Isoform;
use crate::path::CandidatePath;

/// Assigns confidence and abundance to the candidate paths of one locus.
///
/// Confidence is a weakest-link measure. Each consecutive pair of segments on
/// a path is joined by its strongest evidence edge, and that edge's weight is
/// divided by the largest competing weight at either end (the strongest edge
/// leaving the upstream segment or entering the downstream segment). The
/// confidence of the path is the smallest of these ratios, so a path is only
/// as trustworthy as its least dominant junction. Paths without edges have a
/// confidence of one.
///
/// The raw abundance is the weight of the weakest evidence edge along the
/// path (or the lowest segment coverage for paths without edges), adjusted by
/// the configured [`Normalizer`](crate::isoform::abundance::Normalizer).
#[derive(Debug)]
pub struct Scorer<'a> {
    /// The configuration.
    config: &'a Config,

    /// The evidence for the locus.
    batch: &'a Batch,
}

impl<'a> Scorer<'a> {
    /// Creates a new scorer.
    pub fn new(config: &'a Config, batch: &'a Batch) -> Self {
        Self { config, batch }
    }

    /// Scores a single candidate path through `graph`.
    pub fn score(&self, path: CandidatePath, graph: &SpliceGraph) -> Isoform {
        let mut confidence = 1.0f64;
        let mut weakest: Option<f64> = None;

        let segments = path.segments();

        for (from, to) in segments.iter().zip(segments.iter().skip(1)) {
            let (Some(u), Some(v)) = (graph.index_of(from.id()), graph.index_of(to.id())) else {
                confidence = 0.0;
                continue;
            };

            let Some(weight) = strongest_between(graph, u, v) else {
                confidence = 0.0;
                continue;
            };

            let local = strongest(graph, u, Direction::Outgoing)
                .max(strongest(graph, v, Direction::Incoming));

            let ratio = match local > 0.0 {
                true => weight / local,
                false => 0.0,
            };

            confidence = confidence.min(ratio);
            weakest = Some(weakest.map_or(weight, |current| current.min(weight)));
        }

        let raw = weakest.unwrap_or_else(|| {
            segments
                .iter()
                .map(|segment| segment.mean_coverage())
                .fold(f64::INFINITY, f64::min)
        });

        let isoform = Isoform::new(path, confidence.clamp(0.0, 1.0), raw)
            .with_pairing_support(self.batch.links());
        let abundance = self.config.normalizer().normalize(raw, isoform.exons());

        isoform.with_abundance(abundance)
    }

    /// Scores every candidate path, drops those below the
    /// [confidence floor](Config::confidence_floor), and returns the rest in
    /// genomic-coordinate order named `<name>.<n>`.
    ///
    /// # Examples
    ///
    /// ```
    /// use splicegraph::config::Config;
    /// use splicegraph::evidence::collect;
    /// use splicegraph::evidence::Record;
    /// use splicegraph::graph::construct;
    /// use splicegraph::graph::simplify;
    /// use splicegraph::isoform::Scorer;
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
    /// let (paths, _) = assemble(&graph, &config);
    ///
    /// let isoforms = Scorer::new(&config, &batch).score_all(paths, &graph, "gene");
    /// assert_eq!(isoforms.len(), 1);
    /// assert_eq!(isoforms[0].name(), Some("gene.1"));
    /// assert_eq!(isoforms[0].confidence(), 1.0);
    /// assert_eq!(isoforms[0].abundance(), 20.0);
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn score_all(
        &self,
        paths: Vec<CandidatePath>,
        graph: &SpliceGraph,
        name: &str,
    ) -> Vec<Isoform> {
        let floor = self.config.confidence_floor();

        let mut isoforms = paths
            .into_iter()
            .map(|path| self.score(path, graph))
            .filter(|isoform| {
                let keep = isoform.confidence() >= floor;

                if !keep {
                    debug!(
                        "filtering {} with confidence {:.4} below {}",
                        isoform.path(),
                        isoform.confidence(),
                        floor
                    );
                }

                keep
            })
            .collect::<Vec<_>>();

        isoforms.sort_by_key(coordinates);

        isoforms
            .into_iter()
            .enumerate()
            .map(|(i, isoform)| isoform.with_name(format!("{}.{}", name, i + 1)))
            .collect()
    }
}

/// Gets the exon coordinates of an isoform, used to order output.
fn coordinates(isoform: &Isoform) -> Vec<(Number, Number)> {
    isoform
        .exons()
        .iter()
        .map(|exon| (exon.start(), exon.end()))
        .collect()
}

/// Gets the weight of the strongest evidence edge from `from` to `to`.
fn strongest_between(graph: &SpliceGraph, from: NodeIndex, to: NodeIndex) -> Option<f64> {
    graph
        .evidence_neighbours(from, Direction::Outgoing)
        .filter(|neighbour| neighbour.node == to)
        .map(|neighbour| neighbour.edge.weight())
        .max_by(f64::total_cmp)
}

/// Gets the weight of the strongest evidence edge at `node` in the given
/// direction, or zero if there is none.
fn strongest(graph: &SpliceGraph, node: NodeIndex, direction: Direction) -> f64 {
    graph
        .evidence_neighbours(node, direction)
        .map(|neighbour| neighbour.edge.weight())
        .fold(0.0, f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Builder;
    use crate::core::GenomicInterval;
    use crate::evidence::collect;
    use crate::evidence::Record;
    use crate::graph::construct;
    use crate::graph::simplify;
    use crate::isoform::abundance::Normalizer;
    use crate::path::assemble;
    use crate::segment::build;

    /// An exon that is both included and skipped.
    fn cassette() -> Result<Vec<Record>, Box<dyn std::error::Error>> {
        Ok(vec![
            Record::Coverage {
                interval: "chr1:+:100-200".parse()?,
                depth: 10,
            },
            Record::Coverage {
                interval: "chr1:+:300-400".parse()?,
                depth: 10,
            },
            Record::Coverage {
                interval: "chr1:+:500-600".parse()?,
                depth: 10,
            },
            Record::Junction {
                donor: "chr1:+:150-200".parse()?,
                acceptor: "chr1:+:300-350".parse()?,
                count: 40,
            },
            Record::Junction {
                donor: "chr1:+:350-400".parse()?,
                acceptor: "chr1:+:500-550".parse()?,
                count: 30,
            },
            Record::Junction {
                donor: "chr1:+:150-200".parse()?,
                acceptor: "chr1:+:500-550".parse()?,
                count: 10,
            },
            Record::Pairing {
                first: "chr1:+:120-180".parse()?,
                second: "chr1:+:320-380".parse()?,
                count: 5,
            },
        ])
    }

    fn score(config: &Config) -> Result<Vec<Isoform>, Box<dyn std::error::Error>> {
        let locus = "chr1:+:100-600".parse::<GenomicInterval>()?;
        let batch = collect(&locus, cassette()?)?;
        let (graph, _) = construct(build(&batch, config), &batch, config);
        let graph = simplify(graph, config.min_support());
        let (paths, _) = assemble(&graph, config);

        Ok(Scorer::new(config, &batch).score_all(paths, &graph, "locus"))
    }

    #[test]
    fn test_weakest_link_confidence() -> Result<(), Box<dyn std::error::Error>> {
        let isoforms = score(&Config::default())?;

        let summary = isoforms
            .iter()
            .map(|isoform| {
                (
                    isoform.name().map(String::from),
                    isoform.exons().len(),
                    isoform.confidence(),
                    isoform.abundance(),
                    isoform.pairing_support(),
                )
            })
            .collect::<Vec<_>>();

        assert_eq!(
            summary,
            vec![
                (Some(String::from("locus.1")), 3, 1.0, 30.0, 5),
                (Some(String::from("locus.2")), 2, 0.25, 10.0, 0),
            ]
        );

        for isoform in &isoforms {
            assert!((0.0..=1.0).contains(&isoform.confidence()));
        }

        Ok(())
    }

    #[test]
    fn test_the_confidence_floor_filters() -> Result<(), Box<dyn std::error::Error>> {
        let config = Builder::default().confidence_floor(0.3).try_build()?;
        let isoforms = score(&config)?;

        assert_eq!(isoforms.len(), 1);
        assert_eq!(isoforms[0].name(), Some("locus.1"));
        assert_eq!(isoforms[0].exons().len(), 3);

        Ok(())
    }

    #[test]
    fn test_abundance_is_normalized() -> Result<(), Box<dyn std::error::Error>> {
        #[derive(Debug)]
        struct PerHundredBases;

        impl Normalizer for PerHundredBases {
            fn name(&self) -> &str {
                "per-hundred-bases"
            }

            fn normalize(&self, raw: f64, exons: &[GenomicInterval]) -> f64 {
                let length = exons.iter().map(|exon| exon.len()).sum::<u64>() as f64;
                raw * 100.0 / length
            }
        }

        let config = Builder::default().normalizer(PerHundredBases).try_build()?;
        let isoforms = score(&config)?;

        assert_eq!(isoforms[0].abundance(), 10.0);
        assert_eq!(isoforms[1].abundance(), 5.0);

        Ok(())
    }
}
