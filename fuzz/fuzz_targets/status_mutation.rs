#![no_main]

use arbitrary::{Arbitrary, Unstructured};

use arcsweep::{ArcId, ArcInstance, Arcs, StatusTree};
use libfuzzer_sys::fuzz_target;

const ARCS: usize = 32;

#[derive(Arbitrary, Debug)]
enum Op {
    Insert { id: u8, y: i8 },
    Remove { idx: usize },
    RemoveById { idx: usize },
    Refresh { x: i8 },
}

fn arbitrary_ops(mut u: Unstructured, arcs: &Arcs) -> Result<(), arbitrary::Error> {
    let len = u.arbitrary_len::<Op>()?;
    let mut model: Vec<ArcInstance> = Vec::new();
    let mut tree = StatusTree::new();
    for _ in 0..len {
        let op: Op = u.arbitrary()?;
        match op {
            Op::Insert { id, y } => {
                let id = ArcId(id as usize % ARCS);
                if model.iter().any(|v| v.id() == id) {
                    continue;
                }
                let value = arcs[id].instance_at_y(y as f64);
                let pos = model.partition_point(|v| v.current_y >= value.current_y);
                model.insert(pos, value);
                tree.insert(value);
            }
            Op::Remove { idx } => {
                if !model.is_empty() {
                    let value = model.remove(idx % model.len());
                    assert!(tree.remove(&value));
                }
            }
            Op::RemoveById { idx } => {
                if !model.is_empty() {
                    let value = model.remove(idx % model.len());
                    assert_eq!(tree.remove_by_id(value.id()), Ok(value));
                }
            }
            Op::Refresh { x } => {
                let x = x as f64;
                tree.refresh_all(x);
                // A stable sort keeps tied arcs in their old order, like the tree does.
                for v in &mut model {
                    *v = v.arc.instantiate(x);
                }
                model.sort_by(|a, b| a.order(b));
            }
        }
        tree.check_invariants();
        assert_eq!(tree.len(), model.len());
        let ids: Vec<_> = model.iter().map(|v| v.id()).collect();
        assert_eq!(tree.ids(), ids);
    }
    Ok(())
}

fuzz_target!(|data: &[u8]| {
    let mut arcs = Arcs::default();
    for i in 0..ARCS {
        // Lines through the origin with different slopes, so refreshing reorders them.
        let _ = arcs.push(0.0, i as f64 - 16.0, 0.0, -128.0, 128.0);
    }
    let u = Unstructured::new(data);
    let _ = arbitrary_ops(u, &arcs);
});
