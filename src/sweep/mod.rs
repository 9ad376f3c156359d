//! The sweep-line implementation.
//!
//! The main entry point is [`Sweeper`], which walks a sweep line across a
//! collection of arcs from left to right, one [`Event`] at a time.

use crate::{arc::ArcId, num::CheapOrderedFloat};

mod event_queue;
mod sweeper;

pub use event_queue::EventQueue;
pub use sweeper::{Status, StepReport, Summary, Sweeper, DEFAULT_SWAP_OFFSET};

/// The different things that can happen at a sweep position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum EventKind {
    /// An arc enters the sweep line.
    Start(ArcId),
    /// Two arcs cross.
    Intersection {
        /// The arc that was on top just before the crossing.
        upper: ArcId,
        /// The arc that was underneath just before the crossing.
        lower: ArcId,
    },
    /// An arc leaves the sweep line.
    End(ArcId),
}

impl EventKind {
    /// The single-letter tag used in event traces.
    pub fn tag(&self) -> char {
        match self {
            EventKind::Start(_) => 'S',
            EventKind::Intersection { .. } => 'I',
            EventKind::End(_) => 'E',
        }
    }

    // At a single sweep position, starts come first and ends come last.
    fn sort_key(&self) -> (u8, ArcId, ArcId) {
        match *self {
            EventKind::Start(id) => (0, id, ArcId(0)),
            EventKind::Intersection { upper, lower } => (1, upper, lower),
            EventKind::End(id) => (2, id, ArcId(0)),
        }
    }
}

/// Something that happens at a sweep position.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Event {
    /// The sweep position.
    pub x: f64,
    /// What happens there.
    pub kind: EventKind,
}

impl Eq for Event {}

impl Ord for Event {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (CheapOrderedFloat::from(self.x), self.kind.sort_key())
            .cmp(&(CheapOrderedFloat::from(other.x), other.kind.sort_key()))
    }
}

impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
