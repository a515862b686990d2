//! `splicegraph` is a crate for assembling gene isoforms from aligned read
//! evidence, one locus at a time.
//!
//! For every locus, the crate carries out the following stages in order:
//!
//! 1. **Collection.** Coverage, splice-junction and paired-end observations
//!    overlapping the locus are aggregated into an evidence
//!    [`Batch`](crate::evidence::Batch) (see [`evidence::collect()`]).
//!    Observations on the wrong strand are discarded with a warning.
//! 2. **Segmentation.** The locus is partitioned into elementary exonic
//!    [`Segment`](crate::segment::Segment)s at every coverage discontinuity
//!    and junction site (see [`segment::build()`]). Boundaries within the
//!    configured tolerance of one another are merged.
//! 3. **Graph construction.** Segments become the nodes of a directed,
//!    acyclic [`SpliceGraph`](crate::graph::SpliceGraph) whose edges are
//!    physical adjacencies and observed junctions (see
//!    [`graph::construct()`]). Weakly covered segments inside a junction are
//!    spliced out rather than treated as retained introns.
//! 4. **Simplification.** Edges with too little support are pruned, along
//!    with any segments they leave stranded (see [`graph::simplify()`]).
//! 5. **Path assembly.** A greedy path cover of the remaining evidence edges
//!    yields one [`CandidatePath`](crate::path::CandidatePath) per
//!    candidate isoform (see [`path::assemble()`]).
//! 6. **Scoring.** Each path gets a weakest-link confidence and an abundance
//!    estimate; paths below the confidence floor are dropped (see
//!    [`isoform::Scorer`]). The introns and classified exons of the surviving
//!    isoforms are pooled per locus (see [`isoform::element`]).
//!
//! Most users will not call the stages individually. Instead, the
//! [`Pipeline`] runs them all for a single locus and returns an [`Assembly`],
//! and [`assemble_all()`] does the same for many loci in parallel. No
//! condition within a locus fails the run: a locus without evidence, or one
//! whose every path is filtered, yields zero isoforms, and any evidence that
//! was discarded along the way is reported through
//! [`Assembly::warnings()`].
//!
//! A [`Config`] cannot be instantiated with invalid options. Use
//! [`config::Builder`] and its [`try_build()`](config::Builder::try_build)
//! method to construct one (or [`Config::default()`] for the defaults).
//!
//! Below is a representative example of assembling a locus with two exons
//! linked by a single junction.
//!
//! ```
//! use splicegraph::evidence::Record;
//! use splicegraph::LocusInput;
//! use splicegraph::Pipeline;
//!
//! let config = splicegraph::config::Builder::default()
//!     .boundary_merge_tolerance(5)
//!     .try_build()?;
//!
//! let records = vec![
//!     Record::Coverage {
//!         interval: "chr1:+:100-300".parse()?,
//!         depth: 10,
//!     },
//!     Record::Coverage {
//!         interval: "chr1:+:500-700".parse()?,
//!         depth: 10,
//!     },
//!     Record::Junction {
//!         donor: "chr1:+:250-300".parse()?,
//!         acceptor: "chr1:+:500-550".parse()?,
//!         count: 20,
//!     },
//! ];
//!
//! let input = LocusInput::new("chr1:+:100-700".parse()?, records).with_name("GENE1");
//! let assembly = Pipeline::new(&config).run(input);
//!
//! for isoform in assembly.isoforms() {
//!     println!("{isoform}");
//! }
//!
//! assert_eq!(
//!     assembly.isoforms()[0].to_string(),
//!     "GENE1.1\tchr1\t+\t100-300,500-700\t1.0000\t20.00"
//! );
//!
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![warn(rust_2021_compatibility)]
#![warn(missing_debug_implementations)]
#![warn(clippy::missing_docs_in_private_items)]
#![warn(rustdoc::broken_intra_doc_links)]

pub mod config;
pub mod core;
pub mod evidence;
pub mod graph;
pub mod isoform;
pub mod path;
pub mod pipeline;
pub mod segment;
pub mod warning;

pub use config::Config;
pub use isoform::Isoform;
pub use pipeline::assemble_all;
pub use pipeline::Assembly;
pub use pipeline::LocusInput;
pub use pipeline::Pipeline;
pub use warning::Warning;
