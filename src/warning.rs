//! Non-fatal conditions encountered while assembling a locus.
//!
//! None of these conditions abort assembly. Each one is logged through
//! [`tracing`] where it is detected and collected into the
//! [`Assembly`](crate::pipeline::Assembly) for the locus.

use omics::coordinate::position::Number;

use crate::core::Strand;

/// A reason why a piece of evidence was considered structurally inconsistent
/// and discarded.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Inconsistency {
    /// The evidence sits on a different strand than the locus.
    CrossStrand {
        /// The strand of the locus.
        expected: Strand,

        /// The strand of the evidence.
        found: Strand,
    },

    /// A junction whose donor site does not precede its acceptor site (or
    /// whose sites resolve to segments in reversed order).
    ReversedOrder {
        /// The donor site.
        donor: Number,

        /// The acceptor site.
        acceptor: Number,
    },

    /// A junction with at least one site outside of the locus.
    TransLocus {
        /// The donor site.
        donor: Number,

        /// The acceptor site.
        acceptor: Number,
    },

    /// A junction site that could not be matched to any segment boundary
    /// within tolerance.
    UnanchoredSite {
        /// The unmatched site.
        site: Number,
    },
}

impl std::fmt::Display for Inconsistency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Inconsistency::CrossStrand { expected, found } => write!(
                f,
                "evidence on strand {found} does not match the locus strand {expected}"
            ),
            Inconsistency::ReversedOrder { donor, acceptor } => write!(
                f,
                "junction donor ({donor}) does not precede its acceptor ({acceptor})"
            ),
            Inconsistency::TransLocus { donor, acceptor } => write!(
                f,
                "junction {donor}-{acceptor} links outside of the locus"
            ),
            Inconsistency::UnanchoredSite { site } => {
                write!(f, "junction site {site} matches no segment boundary")
            }
        }
    }
}

/// A non-fatal condition raised while assembling a locus.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Warning {
    /// Evidence implying reversed-order or cross-strand linkage was
    /// discarded.
    StructuralInconsistency(Inconsistency),

    /// The locus was too combinatorially complex: the path count cap was hit
    /// and the remaining cover targets were dropped.
    PathCapExceeded {
        /// The configured maximum number of paths.
        cap: usize,

        /// The number of edges (or isolated segments) left unexplained.
        dropped: usize,
    },
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Warning::StructuralInconsistency(inconsistency) => {
                write!(f, "structural inconsistency: {inconsistency}")
            }
            Warning::PathCapExceeded { cap, dropped } => write!(
                f,
                "path cap exceeded: {dropped} cover target(s) dropped after {cap} paths"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warning_display() {
        let warning = Warning::StructuralInconsistency(Inconsistency::ReversedOrder {
            donor: 500,
            acceptor: 300,
        });
        assert_eq!(
            warning.to_string(),
            "structural inconsistency: junction donor (500) does not precede its acceptor (300)"
        );

        let warning = Warning::PathCapExceeded { cap: 2, dropped: 3 };
        assert_eq!(
            warning.to_string(),
            "path cap exceeded: 3 cover target(s) dropped after 2 paths"
        );
    }
}
