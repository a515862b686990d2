//! Alignment-derived evidence and its aggregation into per-locus batches.
//!
//! Evidence enters the crate as a stream of [`Record`]s produced by an
//! external alignment parser. The [`collector`] restricts that stream to a
//! single locus and aggregates it into an immutable [`Batch`] that the rest of
//! the pipeline consumes.

pub mod batch;
pub mod collector;
pub mod record;

pub use batch::Batch;
pub use batch::Junction;
pub use batch::Link;
pub use batch::Run;
pub use collector::collect;
pub use record::Record;
