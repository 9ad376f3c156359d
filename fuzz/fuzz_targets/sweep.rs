#![no_main]

use arbitrary::Unstructured;
use arcsweep::Sweeper;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut u = Unstructured::new(data);
    let Ok(arcs) = arcsweep::arbitrary::arcs(&mut u, 16) else {
        return;
    };
    let mut sweeper = Sweeper::new(&arcs);
    sweeper.run().unwrap();
    assert!(sweeper.status_tree().is_empty());
});
