//! Parabolic arcs and the arena that owns them.

use std::cmp::Ordering;

use kurbo::{Line, PathSeg, Point, QuadBez};

use crate::{num::CheapOrderedFloat, Error};

/// An index into our arc arena.
///
/// Every arc gets an identity when it is added to an [`Arcs`] arena, so that
/// two arcs with identical coefficients are still considered different. The
/// identity is the arc's position in the arena, and it never changes.
#[derive(
    Clone, Copy, PartialOrd, Ord, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct ArcId(pub usize);

impl std::fmt::Debug for ArcId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "a_{}", self.0)
    }
}

impl std::fmt::Display for ArcId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The graph of `y = a x^2 + b x + c`, restricted to `t1 <= x <= t2`.
///
/// When `a` is zero this is just a line segment, and we call the arc
/// "straight".
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Arc {
    /// This arc's identity.
    pub id: ArcId,
    /// The quadratic coefficient.
    pub a: f64,
    /// The linear coefficient.
    pub b: f64,
    /// The constant coefficient.
    pub c: f64,
    /// The smallest `x` covered by this arc.
    pub t1: f64,
    /// The largest `x` covered by this arc.
    pub t2: f64,
}

impl Arc {
    /// Evaluates the arc's polynomial at `x`.
    ///
    /// This doesn't check that `x` is in range.
    pub fn evaluate(&self, x: f64) -> f64 {
        (self.a * x + self.b) * x + self.c
    }

    /// Is `x` within this arc's closed interval?
    pub fn in_range(&self, x: f64) -> bool {
        self.t1 <= x && x <= self.t2
    }

    /// Is this arc a line segment?
    pub fn is_straight(&self) -> bool {
        self.a == 0.0
    }

    /// The left endpoint.
    pub fn start_point(&self) -> Point {
        Point::new(self.t1, self.evaluate(self.t1))
    }

    /// The right endpoint.
    pub fn end_point(&self) -> Point {
        Point::new(self.t2, self.evaluate(self.t2))
    }

    /// Takes a snapshot of this arc's height at the sweep position `x`.
    pub fn instantiate(&self, x: f64) -> ArcInstance {
        self.instance_at_y(self.evaluate(x))
    }

    /// Takes a snapshot of this arc with an explicit ordering key.
    pub fn instance_at_y(&self, y: f64) -> ArcInstance {
        ArcInstance {
            arc: *self,
            current_y: y,
        }
    }

    /// Converts this arc into a `kurbo` path segment.
    ///
    /// Straight arcs become lines. Other arcs become the quadratic Bézier that
    /// traces exactly the same parabola: its control point is where the
    /// tangents at the two endpoints meet.
    pub fn to_kurbo(&self) -> PathSeg {
        let p0 = self.start_point();
        let p2 = self.end_point();
        if self.is_straight() {
            PathSeg::Line(Line::new(p0, p2))
        } else {
            let mid = (self.t1 + self.t2) / 2.0;
            let slope = 2.0 * self.a * self.t1 + self.b;
            let p1 = Point::new(mid, p0.y + slope * (mid - self.t1));
            PathSeg::Quad(QuadBez::new(p0, p1, p2))
        }
    }
}

/// An arc together with its height at some sweep position.
///
/// The height is only a sort key: instances are ordered from top (large
/// `current_y`) to bottom. Identity comes from the arc id alone, so two
/// instances of the same arc are the same value even if they were taken at
/// different sweep positions.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ArcInstance {
    /// The arc.
    pub arc: Arc,
    /// The arc's height when this instance was taken.
    pub current_y: f64,
}

impl ArcInstance {
    /// The arc's identity.
    pub fn id(&self) -> ArcId {
        self.arc.id
    }

    /// Compares the vertical position of two instances.
    ///
    /// Higher instances come first. Instances of different arcs at the same
    /// height compare equal; instances of the same arc always compare equal.
    pub fn order(&self, other: &ArcInstance) -> Ordering {
        if self.id() == other.id() {
            Ordering::Equal
        } else {
            CheapOrderedFloat::from(other.current_y).cmp(&CheapOrderedFloat::from(self.current_y))
        }
    }

    /// Are these instances of the same arc?
    pub fn same_arc(&self, other: &ArcInstance) -> bool {
        self.id() == other.id()
    }
}

/// An arena of arcs.
///
/// Arcs are indexed by [`ArcId`] and can be retrieved by indexing (i.e. with
/// square brackets).
#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct Arcs {
    arcs: Vec<Arc>,
}

impl Arcs {
    /// Adds a new arc, returning its identity.
    ///
    /// All inputs must be finite and the interval must not be reversed.
    pub fn push(&mut self, a: f64, b: f64, c: f64, t1: f64, t2: f64) -> Result<ArcId, Error> {
        let id = ArcId(self.arcs.len());
        if ![a, b, c, t1, t2].iter().all(|v| v.is_finite()) {
            return Err(Error::NonFinite(id));
        }
        if t1 > t2 {
            return Err(Error::ReversedInterval(id));
        }
        self.arcs.push(Arc {
            id,
            a,
            b,
            c,
            t1,
            t2,
        });
        Ok(id)
    }

    /// The number of arcs in this arena.
    pub fn len(&self) -> usize {
        self.arcs.len()
    }

    /// Are there no arcs at all?
    pub fn is_empty(&self) -> bool {
        self.arcs.is_empty()
    }

    /// Iterate over all indices that can be used to index into this arena.
    pub fn indices(&self) -> impl Iterator<Item = ArcId> {
        (0..self.arcs.len()).map(ArcId)
    }

    /// Iterate over all arcs in this arena.
    pub fn iter(&self) -> impl Iterator<Item = &Arc> {
        self.arcs.iter()
    }

    /// Returns the arc with this id, if there is one.
    pub fn get(&self, id: ArcId) -> Option<&Arc> {
        self.arcs.get(id.0)
    }
}

impl std::ops::Index<ArcId> for Arcs {
    type Output = Arc;

    fn index(&self, index: ArcId) -> &Self::Output {
        &self.arcs[index.0]
    }
}
