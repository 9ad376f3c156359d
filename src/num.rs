//! Ordering helpers for the floating-point keys used by the sweep.

use std::hash::Hash;

/// A wrapper for `f64` that implements `Ord`.
///
/// Unlike the wrappers in the `ordered_float` crate, this one doesn't order
/// NaNs or guard against them on construction: any comparison involving a
/// NaN reports `Equal`. Arcs are validated as finite when they enter an
/// [`Arcs`](crate::Arcs) arena, so sweep keys never see a NaN in practice.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct CheapOrderedFloat(f64);

impl Hash for CheapOrderedFloat {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state)
    }
}

impl CheapOrderedFloat {
    /// Retrieve the inner `f64`.
    pub fn into_inner(self) -> f64 {
        self.0
    }
}

impl Eq for CheapOrderedFloat {}

impl PartialOrd for CheapOrderedFloat {
    #[inline(always)]
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CheapOrderedFloat {
    #[inline(always)]
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        if self.0 < other.0 {
            std::cmp::Ordering::Less
        } else if self.0 > other.0 {
            std::cmp::Ordering::Greater
        } else {
            std::cmp::Ordering::Equal
        }
    }
}

impl From<f64> for CheapOrderedFloat {
    fn from(value: f64) -> Self {
        CheapOrderedFloat(value)
    }
}

/// Solves `a x^2 + b x + c = 0`, returning the real roots in increasing order.
///
/// A zero leading coefficient falls back to the linear equation; if that is
/// also degenerate there are no isolated roots and we return none.
pub fn quadratic_roots(a: f64, b: f64, c: f64) -> arrayvec::ArrayVec<f64, 2> {
    let mut ret = arrayvec::ArrayVec::new();
    if a == 0.0 {
        if b != 0.0 {
            ret.push(-c / b);
        }
        return ret;
    }

    let disc = b * b - 4.0 * a * c;
    if disc < 0.0 {
        return ret;
    }
    if disc == 0.0 {
        ret.push(-b / (2.0 * a));
        return ret;
    }

    // The numerically stable form: compute the root that doesn't suffer from
    // cancellation, and get the other one from the product of roots.
    let q = -0.5 * (b + disc.sqrt().copysign(b));
    let r1 = q / a;
    let r2 = if q == 0.0 { -r1 } else { c / q };
    if r1 < r2 {
        ret.push(r1);
        ret.push(r2);
    } else {
        ret.push(r2);
        ret.push(r1);
    }
    ret
}
