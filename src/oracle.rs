//! Computing where two arcs cross.
//!
//! Two parabolas (or a parabola and a line, or two lines) meet in at most two
//! points, so the result always fits in a small fixed-size vector.

use arrayvec::ArrayVec;
use kurbo::{ParamCurve, PathSeg, Point};

use crate::{arc::Arc, num::quadratic_roots};

/// The intersection points of two arcs, in increasing `x` order.
pub type Crossings = ArrayVec<Point, 2>;

/// Finds all points where `l1` and `l2` meet within both of their intervals.
///
/// Coincident arcs (ones with identical polynomials) don't have isolated
/// intersection points, and we report none.
pub fn intersect(l1: &Arc, l2: &Arc) -> Crossings {
    match (l1.is_straight(), l2.is_straight()) {
        (true, true) => intersect_lines(l1, l2),
        (false, false) => intersect_quadratics(l1, l2),
        (true, false) => intersect_mixed(l1, l2),
        (false, true) => intersect_mixed(l2, l1),
    }
}

fn intersect_lines(l1: &Arc, l2: &Arc) -> Crossings {
    let mut ret = Crossings::new();
    if l1.b == l2.b {
        return ret;
    }
    let x = (l2.c - l1.c) / (l1.b - l2.b);
    if l1.in_range(x) && l2.in_range(x) {
        ret.push(Point::new(x, l1.evaluate(x)));
    }
    ret
}

fn intersect_quadratics(l1: &Arc, l2: &Arc) -> Crossings {
    quadratic_roots(l1.a - l2.a, l1.b - l2.b, l1.c - l2.c)
        .into_iter()
        .filter(|x| l1.in_range(*x) && l2.in_range(*x))
        .map(|x| Point::new(x, l1.evaluate(x)))
        .collect()
}

fn intersect_mixed(line: &Arc, quad: &Arc) -> Crossings {
    let PathSeg::Line(kurbo_line) = line.to_kurbo() else {
        unreachable!("straight arcs convert to lines");
    };
    let curve = quad.to_kurbo();

    let mut xs: ArrayVec<f64, 3> = curve
        .intersect_line(kurbo_line)
        .into_iter()
        .map(|hit| curve.eval(hit.segment_t).x)
        .filter(|x| line.in_range(*x) && quad.in_range(*x))
        .collect();
    xs.sort_by(|a, b| a.total_cmp(b));

    let mut ret = Crossings::new();
    for x in xs {
        if ret.last().is_some_and(|p| p.x == x) || ret.is_full() {
            continue;
        }
        ret.push(Point::new(x, quad.evaluate(x)));
    }
    ret
}
