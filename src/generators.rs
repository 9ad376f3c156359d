//! Utilities for generating examples, benchmarks, and test cases.

use crate::Arcs;

/// Generates `n` line segments that all cross one another.
///
/// Segment `i` has slope `i`, and the crossing of segments `i` and `j` is at
/// `x = i^2 + i j + j^2 + sqrt(2) (i + j)`, so no two crossings share an `x`
/// coordinate. There are `n (n - 1) / 2` crossings in total.
pub fn fan(n: usize) -> Arcs {
    let sqrt2 = std::f64::consts::SQRT_2;
    let nf = n as f64;
    let t2 = 3.0 * nf * nf + 2.0 * sqrt2 * nf;
    let mut arcs = Arcs::default();
    for i in 0..n {
        let i = i as f64;
        let c = -(i * i * i + sqrt2 * i * i);
        // The coefficients are finite, so this can't fail.
        let _ = arcs.push(0.0, i, c, -1.0, t2);
    }
    arcs
}

/// Generates `n` horizontal segments, stacked one above the other, and a
/// parabola that dips below all of them.
///
/// The parabola crosses each segment twice, for `2 n` crossings in total.
pub fn ladder(n: usize) -> Arcs {
    let mut arcs = Arcs::default();
    for k in 0..n {
        let _ = arcs.push(0.0, 0.0, k as f64, 0.0, 10.0);
    }
    // a (x - 5)^2 - 1/2, with a chosen so that it's above the top rung at the ends.
    let a = (n as f64 + 1.0) / 25.0;
    let _ = arcs.push(a, -10.0 * a, 25.0 * a - 0.5, 0.0, 10.0);
    arcs
}
