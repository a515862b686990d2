//! Pluggable abundance normalization.
//!
//! The raw abundance of an isoform is the support count of the weakest edge
//! along its path. How that count should be adjusted for read length or
//! fragment length depends on the library, so the adjustment sits behind the
//! [`Normalizer`] trait and is supplied through the
//! [`Config`](crate::config::Config).

use crate::core::GenomicInterval;

/// A normalization applied to the raw abundance of an isoform.
///
/// Implementations are shared across parallel locus assemblies and must be
/// [`Send`] and [`Sync`].
///
/// # Examples
///
/// ```
/// use splicegraph::config::Builder;
/// use splicegraph::core::GenomicInterval;
/// use splicegraph::isoform::abundance::Normalizer;
///
/// /// Reports abundance per kilobase of exonic sequence.
/// #[derive(Debug)]
/// struct PerKilobase;
///
/// impl Normalizer for PerKilobase {
///     fn name(&self) -> &str {
///         "per-kilobase"
///     }
///
///     fn normalize(&self, raw: f64, exons: &[GenomicInterval]) -> f64 {
///         let length = exons.iter().map(|exon| exon.len()).sum::<u64>() as f64;
///         raw * 1000.0 / length
///     }
/// }
///
/// let config = Builder::default().normalizer(PerKilobase).try_build()?;
/// assert_eq!(config.normalizer().name(), "per-kilobase");
///
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub trait Normalizer: std::fmt::Debug + Send + Sync {
    /// A short name for the normalization, used in logs.
    fn name(&self) -> &str;

    /// Normalizes the `raw` abundance of an isoform with the given exons.
    fn normalize(&self, raw: f64, exons: &[GenomicInterval]) -> f64;
}

/// The identity normalization: reports the raw support count.
#[derive(Clone, Copy, Debug, Default)]
pub struct Raw;

impl Normalizer for Raw {
    fn name(&self) -> &str {
        "raw"
    }

    fn normalize(&self, raw: f64, _: &[GenomicInterval]) -> f64 {
        raw
    }
}
