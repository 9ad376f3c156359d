#![deny(missing_docs)]

//! Finds the crossings of parabolic arcs with a sweep line.
//!
//! Each input is a piece of a parabola `y = a x^2 + b x + c`, restricted to
//! an interval `t1 <= x <= t2` (when `a` is zero, that's just a line
//! segment). A vertical sweep line moves from left to right, keeping track
//! of the top-to-bottom order of the arcs it crosses, and stopping at every
//! place where an arc starts, ends, or crosses another arc.
//!
//! ```
//! use arcsweep::{Arcs, Sweeper};
//!
//! let mut arcs = Arcs::default();
//! arcs.push(0.0, 1.0, 0.0, -5.0, 5.0)?;
//! arcs.push(0.0, -1.0, 0.0, -5.0, 5.0)?;
//!
//! let mut sweeper = Sweeper::new(&arcs);
//! let summary = sweeper.run()?;
//! assert_eq!(summary.to_string(), "summary: 2 segments, 1 intersections");
//! # Ok::<(), arcsweep::Error>(())
//! ```

#[macro_use]
mod typed_vec;

pub mod arc;
#[cfg(any(test, feature = "arbitrary"))]
pub mod arbitrary;
pub mod command;
#[cfg(feature = "generators")]
pub mod generators;
pub mod num;
pub mod oracle;
pub mod status;
pub mod sweep;

pub use arc::{Arc, ArcId, ArcInstance, Arcs};
pub use command::Command;
pub use status::StatusTree;
pub use sweep::{Event, EventKind, Status, StepReport, Summary, Sweeper};

/// Something went wrong while building or sweeping arcs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Error {
    /// There are no more events to process.
    NoMoreEvents,
    /// An arc was expected in the sweep-line status, but wasn't there.
    ArcNotFound(ArcId),
    /// One of an arc's inputs was infinite or NaN.
    NonFinite(ArcId),
    /// An arc's interval ended before it started.
    ReversedInterval(ArcId),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::NoMoreEvents => write!(f, "no more events"),
            Error::ArcNotFound(id) => write!(f, "arc {id} is not in the sweep line"),
            Error::NonFinite(id) => write!(f, "arc {id} has a non-finite input"),
            Error::ReversedInterval(id) => write!(f, "arc {id} has t1 > t2"),
        }
    }
}

impl std::error::Error for Error {}
