//! Core genomic primitives used across the crate.

pub mod interval;
pub mod strand;

pub use interval::GenomicInterval;
pub use omics::coordinate::position::Number;
pub use strand::Strand;
