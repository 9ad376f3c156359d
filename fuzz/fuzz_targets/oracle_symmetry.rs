#![no_main]

use arbitrary::Unstructured;
use arcsweep::{Arcs, oracle::intersect};
use libfuzzer_sys::fuzz_target;

fn check(mut u: Unstructured) -> Result<(), arbitrary::Error> {
    let mut arcs = Arcs::default();
    let a = arcsweep::arbitrary::arc(&mut u, &mut arcs)?;
    let b = arcsweep::arbitrary::arc(&mut u, &mut arcs)?;

    let ab = intersect(&a, &b);
    let ba = intersect(&b, &a);
    assert_eq!(ab.len(), ba.len());
    for (p, q) in ab.iter().zip(&ba) {
        assert!((p.x - q.x).abs() <= 1e-9 * (1.0 + p.x.abs()));
    }
    for p in &ab {
        assert!(a.in_range(p.x) && b.in_range(p.x));
    }
    for pair in ab.windows(2) {
        assert!(pair[0].x < pair[1].x);
    }
    Ok(())
}

fuzz_target!(|data: &[u8]| {
    let _ = check(Unstructured::new(data));
});
