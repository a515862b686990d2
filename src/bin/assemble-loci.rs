//! A binary that assembles isoforms for every locus in a tab-separated
//! evidence file.
//!
//! ```shell
//! cargo run --release --bin=assemble-loci --features=binaries evidence.tsv.gz
//! ```
//!
//! Each line of the input carries one tab-separated entry. A `locus` line opens
//! a new locus and every following line adds evidence to it:
//!
//! ```text
//! locus     chr1:+:100-700    GENE1
//! coverage  chr1:+:100-300    10
//! coverage  chr1:+:500-700    10
//! junction  chr1:+:250-300    chr1:+:500-550    20
//! pair      chr1:+:120-180    chr1:+:520-580    4
//! ```
//!
//! Intervals are interbase intervals as parsed by `omics` (negative-stranded
//! intervals run from the higher coordinate to the lower one, e.g.,
//! `chr1:-:700-100`). The locus name is optional. Blank lines and lines
//! starting with `#` are ignored. Files ending in `.gz` are decompressed.
//!
//! One line is printed per isoform, in input locus order. With `--elements`,
//! the introns and classified exons of each locus are printed as BED6 lines
//! instead.

use std::fs::File;
use std::io::BufRead as _;
use std::io::BufReader;
use std::io::Read;
use std::path::PathBuf;

use anyhow::bail;
use anyhow::Context;
use anyhow::Result;
use clap::Parser;
use clap_verbosity_flag::Verbosity;
use flate2::read::GzDecoder;
use omics::coordinate::interval::interbase;
use splicegraph::config::Builder;
use splicegraph::config::MinSupport;
use splicegraph::core::GenomicInterval;
use splicegraph::evidence::Record;
use splicegraph::LocusInput;
use tracing::info;
use tracing::warn;
use tracing_log::AsTrace as _;
use tracing_subscriber::EnvFilter;

////////////////////////////////////////////////////////////////////////////////////////
// Parsing
////////////////////////////////////////////////////////////////////////////////////////

/// Parses an interbase interval into a genomic interval.
fn parse_interval(value: &str) -> Result<GenomicInterval> {
    let interval = value
        .parse::<interbase::Interval>()
        .with_context(|| format!("parsing interval: {value}"))?;

    GenomicInterval::try_from(interval).with_context(|| format!("converting interval: {value}"))
}

/// Parses a count or depth.
fn parse_count(value: &str) -> Result<u32> {
    value
        .parse::<u32>()
        .with_context(|| format!("parsing count: {value}"))
}

/// Parses a single evidence line into a record.
fn record(kind: &str, fields: &[&str]) -> Result<Record> {
    match (kind, fields) {
        ("coverage", [interval, depth]) => Ok(Record::Coverage {
            interval: parse_interval(interval)?,
            depth: parse_count(depth)?,
        }),
        ("junction", [donor, acceptor, count]) => Ok(Record::Junction {
            donor: parse_interval(donor)?,
            acceptor: parse_interval(acceptor)?,
            count: parse_count(count)?,
        }),
        ("pair", [first, second, count]) => Ok(Record::Pairing {
            first: parse_interval(first)?,
            second: parse_interval(second)?,
            count: parse_count(count)?,
        }),
        _ => bail!("unrecognized {kind} line with {} field(s)", fields.len()),
    }
}

/// Reads every locus from an evidence stream.
fn read_loci<R: Read>(reader: BufReader<R>) -> Result<Vec<LocusInput>> {
    let mut loci: Vec<(GenomicInterval, Option<String>, Vec<Record>)> = Vec::new();

    for (i, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("reading line {}", i + 1))?;
        let line = line.trim_end();

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let fields = line.split('\t').collect::<Vec<_>>();

        match fields.as_slice() {
            ["locus", locus] => loci.push((parse_interval(locus)?, None, Vec::new())),
            ["locus", locus, name] => {
                loci.push((parse_interval(locus)?, Some(name.to_string()), Vec::new()))
            }
            [kind, rest @ ..] => {
                let record = record(kind, rest).with_context(|| format!("line {}", i + 1))?;

                match loci.last_mut() {
                    Some((_, _, records)) => records.push(record),
                    None => bail!("line {}: evidence appears before any locus", i + 1),
                }
            }
            [] => {}
        }
    }

    Ok(loci
        .into_iter()
        .map(|(locus, name, records)| {
            let input = LocusInput::new(locus, records);

            match name {
                Some(name) => input.with_name(name),
                None => input,
            }
        })
        .collect())
}

////////////////////////////////////////////////////////////////////////////////////////
// Main
////////////////////////////////////////////////////////////////////////////////////////

/// Assembles isoforms for every locus in an evidence file.
#[derive(Parser)]
struct Args {
    /// The evidence file (optionally gzipped).
    input: PathBuf,

    /// Boundaries closer than or equal to this many bases are merged.
    #[arg(short = 't', long)]
    boundary_merge_tolerance: Option<i64>,

    /// The minimum support for an edge, in reads.
    #[arg(short = 's', long, conflicts_with = "relative_min_support")]
    min_support: Option<f64>,

    /// The minimum support for an edge, as a fraction of the larger coverage
    /// of the two segments it joins.
    #[arg(short = 'r', long)]
    relative_min_support: Option<f64>,

    /// The maximum number of paths assembled for a single locus.
    #[arg(short = 'p', long)]
    max_paths_per_locus: Option<usize>,

    /// Isoforms with a confidence below this value are not reported.
    #[arg(short = 'c', long)]
    confidence_floor: Option<f64>,

    /// Intronic coverage below this fraction of the flanking exon coverage is
    /// not considered a retained intron.
    #[arg(short = 'i', long)]
    intron_retention_cutoff: Option<f64>,

    /// Prints the introns and classified exons of each locus as BED6.
    #[arg(short = 'e', long)]
    elements: bool,

    #[command(flatten)]
    verbose: Verbosity,
}

fn throw(args: &Args) -> Result<()> {
    let mut builder = Builder::default();

    if let Some(tolerance) = args.boundary_merge_tolerance {
        builder = builder.boundary_merge_tolerance(tolerance);
    }

    if let Some(value) = args.min_support {
        builder = builder.min_support(MinSupport::Absolute(value));
    }

    if let Some(value) = args.relative_min_support {
        builder = builder.min_support(MinSupport::Relative(value));
    }

    if let Some(cap) = args.max_paths_per_locus {
        builder = builder.max_paths_per_locus(cap);
    }

    if let Some(floor) = args.confidence_floor {
        builder = builder.confidence_floor(floor);
    }

    if let Some(cutoff) = args.intron_retention_cutoff {
        builder = builder.intron_retention_cutoff(cutoff);
    }

    let config = builder.try_build().context("building the configuration")?;

    let file = File::open(&args.input)
        .with_context(|| format!("opening {}", args.input.display()))?;

    let loci = match args.input.extension().is_some_and(|ext| ext == "gz") {
        true => read_loci(BufReader::new(GzDecoder::new(file))),
        false => read_loci(BufReader::new(file)),
    }
    .with_context(|| format!("reading {}", args.input.display()))?;

    info!("read {} loci from {}", loci.len(), args.input.display());

    let assemblies = splicegraph::assemble_all(&config, loci);

    for assembly in &assemblies {
        if let Some(reason) = assembly.skip_reason() {
            warn!("skipped {}: {}", assembly.name(), reason);
        }

        if args.elements {
            for element in assembly.elements() {
                println!("{element}");
            }
        } else {
            for isoform in assembly.isoforms() {
                println!("{isoform}");
            }
        }
    }

    let isoforms = assemblies
        .iter()
        .map(|assembly| assembly.isoforms().len())
        .sum::<usize>();
    info!("assembled {} isoform(s)", isoforms);

    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    match std::env::var("RUST_LOG") {
        Ok(_) => tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .init(),
        Err(_) => tracing_subscriber::fmt()
            .with_max_level(args.verbose.log_level_filter().as_trace())
            .init(),
    };

    throw(&args)
}
