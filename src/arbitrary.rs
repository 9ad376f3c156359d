//! Utilities for fuzz and/or property testing using `arbitrary`.

use arbitrary::Unstructured;

use crate::{Arc, Arcs};

/// Generate an arbitrary float in some range.
pub fn float_in_range(
    start: f64,
    end: f64,
    u: &mut Unstructured<'_>,
) -> Result<f64, arbitrary::Error> {
    let num: u32 = u.arbitrary()?;
    let t = num as f64 / u32::MAX as f64;
    Ok((1.0 - t) * start + t * end)
}

/// Generate an arbitrary arc whose coefficients and interval are not too big.
///
/// About half of the generated arcs are straight.
pub fn arc(u: &mut Unstructured<'_>, arcs: &mut Arcs) -> Result<Arc, arbitrary::Error> {
    let straight: bool = u.arbitrary()?;
    let a = if straight {
        0.0
    } else {
        float_in_range(-2.0, 2.0, u)?
    };
    let b = float_in_range(-10.0, 10.0, u)?;
    let c = float_in_range(-100.0, 100.0, u)?;
    let t1 = float_in_range(-100.0, 100.0, u)?;
    let t2 = float_in_range(t1, 100.0, u)?;
    let id = arcs
        .push(a, b, c, t1, t2)
        .map_err(|_| arbitrary::Error::IncorrectFormat)?;
    Ok(arcs[id])
}

/// Generate a collection of up to `max_len` arbitrary arcs.
pub fn arcs(u: &mut Unstructured<'_>, max_len: usize) -> Result<Arcs, arbitrary::Error> {
    let len = u.int_in_range(0..=max_len)?;
    let mut ret = Arcs::default();
    for _ in 0..len {
        arc(u, &mut ret)?;
    }
    Ok(ret)
}
