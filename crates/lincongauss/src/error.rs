//! Errors surfaced by the samplers and integrators.

use std::fmt;

/// Error type shared by all constructors and run loops.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// A matrix or vector argument has the wrong dimension.
    ShapeMismatch {
        what: &'static str,
        expected: usize,
        got: usize,
    },
    /// A scalar parameter is outside its admissible range.
    InvalidParams { reason: String },
    /// A point that must lie in the integration domain does not.
    NotInDomain { what: &'static str },
    /// No in-domain starting point was found within the draw budget.
    NoStartingPoint { attempts: usize },
    /// The crossing-direction test could not reach an even crossing count
    /// after exhausting all probe-angle reductions.
    DegenerateIntersections { reductions: usize },
    /// A chain step kept producing out-of-domain candidates.
    ResampleOverflow { retries: usize },
    /// A nesting contained none of the scored samples; the estimate collapses
    /// to zero.
    EmptyNesting { level: usize },
    /// A nesting was scored or sampled out of order.
    StaleNesting { op: &'static str },
}

impl Error {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidParams {
            reason: reason.into(),
        }
    }

    pub(crate) fn shape(what: &'static str, expected: usize, got: usize) -> Self {
        Self::ShapeMismatch {
            what,
            expected,
            got,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ShapeMismatch {
                what,
                expected,
                got,
            } => write!(f, "shape mismatch for {what}: expected {expected}, got {got}"),
            Self::InvalidParams { reason } => write!(f, "invalid parameter: {reason}"),
            Self::NotInDomain { what } => {
                write!(f, "{what} must lie in the integration domain")
            }
            Self::NoStartingPoint { attempts } => {
                write!(f, "no in-domain starting point found in {attempts} draws")
            }
            Self::DegenerateIntersections { reductions } => write!(
                f,
                "odd crossing count persists after {reductions} probe-angle reductions \
                 (near-tangential ellipse)"
            ),
            Self::ResampleOverflow { retries } => {
                write!(f, "candidate stayed outside the domain after {retries} proposals")
            }
            Self::EmptyNesting { level } => {
                write!(f, "nesting {level} contains no samples; estimate collapsed to zero")
            }
            Self::StaleNesting { op } => write!(f, "nesting cannot be {op} in its current stage"),
        }
    }
}

impl std::error::Error for Error {}
