use std::fmt;

use crate::{
    arc::{Arc, ArcId, ArcInstance, Arcs},
    oracle::intersect,
    status::StatusTree,
    Error,
};

use super::{Event, EventKind, EventQueue};

/// How far above its partner an arc is reinserted after they cross.
pub const DEFAULT_SWAP_OFFSET: f64 = 1e-5;

/// What happened during a single [`Sweeper::step`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StepReport {
    /// The event that was processed.
    pub event: Event,
    /// How many new crossing events were added to the queue.
    pub new_intersections: usize,
}

impl fmt::Display for StepReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "event: {} {:.2} {}",
            self.event.kind.tag(),
            self.event.x,
            self.new_intersections
        )
    }
}

/// A snapshot of the arcs crossing the sweep line, from top to bottom.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Status {
    /// The arc ids, from top to bottom.
    pub ids: Vec<ArcId>,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "status: {}:", self.ids.len())?;
        for (i, id) in self.ids.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{id}")?;
        }
        Ok(())
    }
}

/// The result of sweeping all the way to the end.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Summary {
    /// The number of input arcs.
    pub segments: usize,
    /// The number of crossings that were processed.
    pub intersections: usize,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "summary: {} segments, {} intersections",
            self.segments, self.intersections
        )
    }
}

/// Walks a sweep line across a collection of arcs.
///
/// The sweeper starts out with one start event and one end event for every
/// arc. Each call to [`Sweeper::step`] processes the leftmost pending event,
/// updating the top-to-bottom order of the arcs on the sweep line and
/// queueing up any crossings between arcs that just became neighbors.
#[derive(Debug)]
pub struct Sweeper<'a> {
    arcs: &'a Arcs,
    events: EventQueue,
    status: StatusTree,
    x: Option<f64>,
    intersections: usize,
    swap_offset: f64,
}

impl<'a> Sweeper<'a> {
    /// Creates a new sweeper for a collection of arcs.
    pub fn new(arcs: &'a Arcs) -> Self {
        Self::with_swap_offset(arcs, DEFAULT_SWAP_OFFSET)
    }

    /// Creates a new sweeper, with a custom vertical offset for reordering
    /// arcs after they cross.
    pub fn with_swap_offset(arcs: &'a Arcs, swap_offset: f64) -> Self {
        let mut events = EventQueue::default();
        for arc in arcs.iter() {
            events.seed(Event {
                x: arc.t1,
                kind: EventKind::Start(arc.id),
            });
            events.seed(Event {
                x: arc.t2,
                kind: EventKind::End(arc.id),
            });
        }

        Sweeper {
            arcs,
            events,
            status: StatusTree::new(),
            x: None,
            intersections: 0,
            swap_offset,
        }
    }

    /// The position of the most recently processed event.
    pub fn sweep_x(&self) -> Option<f64> {
        self.x
    }

    /// The number of crossings processed so far.
    pub fn intersections(&self) -> usize {
        self.intersections
    }

    /// The events that haven't been processed yet.
    pub fn pending_events(&self) -> impl Iterator<Item = &Event> + '_ {
        self.events.iter()
    }

    /// The arcs currently on the sweep line, from top to bottom.
    pub fn status(&self) -> Status {
        Status {
            ids: self.status.ids(),
        }
    }

    /// The tree holding the arcs currently on the sweep line.
    pub fn status_tree(&self) -> &StatusTree {
        &self.status
    }

    /// Processes the next event.
    pub fn step(&mut self) -> Result<StepReport, Error> {
        let event = self.events.pop().ok_or(Error::NoMoreEvents)?;
        self.x = Some(event.x);

        let new_intersections = match event.kind {
            EventKind::Start(id) => self.handle_start(event.x, id),
            EventKind::End(id) => self.handle_end(event.x, id)?,
            EventKind::Intersection { upper, lower } => {
                self.handle_intersection(event.x, upper, lower)?
            }
        };

        tracing::debug!(
            "{} at x={}: {} active, {} new crossings",
            event.kind.tag(),
            event.x,
            self.status.len(),
            new_intersections
        );
        self.check_invariants();
        Ok(StepReport {
            event,
            new_intersections,
        })
    }

    /// Processes all remaining events.
    pub fn run(&mut self) -> Result<Summary, Error> {
        loop {
            match self.step() {
                Ok(_) => {}
                Err(Error::NoMoreEvents) => break,
                Err(e) => return Err(e),
            }
        }
        Ok(Summary {
            segments: self.arcs.len(),
            intersections: self.intersections,
        })
    }

    // Queues up the crossings of two neighboring arcs that are still ahead
    // of the sweep line, returning the number that were accepted.
    fn schedule(&mut self, x: f64, upper: &Arc, lower: &Arc) -> usize {
        let mut added = 0;
        for p in intersect(upper, lower) {
            if p.x <= x {
                continue;
            }
            let event = Event {
                x: p.x,
                kind: EventKind::Intersection {
                    upper: upper.id,
                    lower: lower.id,
                },
            };
            if self.events.add(event) {
                tracing::trace!("scheduled {:?}/{:?} at {}", upper.id, lower.id, p.x);
                added += 1;
            } else {
                tracing::trace!("rejected {:?}/{:?} at {}", upper.id, lower.id, p.x);
            }
        }
        added
    }

    // Checks a freshly placed arc against whatever is directly above and below it.
    fn schedule_neighbors(&mut self, x: f64, inst: &ArcInstance) -> usize {
        let mut added = 0;
        if let Some(pred) = self.status.predecessor(inst) {
            added += self.schedule(x, &pred.arc, &inst.arc);
        }
        if let Some(succ) = self.status.successor(inst) {
            added += self.schedule(x, &inst.arc, &succ.arc);
        }
        added
    }

    fn handle_start(&mut self, x: f64, id: ArcId) -> usize {
        self.status.refresh_all(x);
        let inst = self.arcs[id].instantiate(x);
        self.status.insert(inst);

        let pred = self.status.predecessor(&inst);
        let succ = self.status.successor(&inst);
        if let (Some(pred), Some(succ)) = (pred, succ) {
            let cancelled = self.events.cancel_between(pred.id(), succ.id());
            if cancelled > 0 {
                tracing::trace!(
                    "{:?} separates {:?} and {:?}, cancelled {}",
                    id,
                    pred.id(),
                    succ.id(),
                    cancelled
                );
            }
        }
        self.schedule_neighbors(x, &inst)
    }

    fn handle_end(&mut self, x: f64, id: ArcId) -> Result<usize, Error> {
        self.status.refresh_all(x);
        let inst = *self.status.find(id).ok_or(Error::ArcNotFound(id))?;

        let mut added = 0;
        let pred = self.status.predecessor(&inst);
        let succ = self.status.successor(&inst);
        if let (Some(pred), Some(succ)) = (pred, succ) {
            added += self.schedule(x, &pred.arc, &succ.arc);
        }
        self.status.remove_by_id(id)?;
        Ok(added)
    }

    fn handle_intersection(&mut self, x: f64, upper: ArcId, lower: ArcId) -> Result<usize, Error> {
        // The event's idea of which arc is on top might be stale, if the
        // crossing was found before an earlier crossing of the same pair.
        let ids = self.status.ids();
        let pos = |id| {
            ids.iter()
                .position(|i| *i == id)
                .ok_or(Error::ArcNotFound(id))
        };
        let (upper, lower) = if pos(lower)? < pos(upper)? {
            (lower, upper)
        } else {
            (upper, lower)
        };

        self.status.refresh_all(x);
        self.status.remove_by_id(upper)?;
        self.status.remove_by_id(lower)?;

        let was_lower = self.arcs[lower];
        let was_upper = self.arcs[upper];
        let new_upper = was_lower.instance_at_y(was_lower.evaluate(x) + self.swap_offset);
        let new_lower = was_upper.instantiate(x);
        self.status.insert(new_upper);
        self.status.insert(new_lower);
        self.intersections += 1;
        tracing::debug!(
            "crossing #{} of {:?} and {:?} at x={}",
            self.intersections,
            upper,
            lower,
            x
        );

        let added =
            self.schedule_neighbors(x, &new_upper) + self.schedule_neighbors(x, &new_lower);
        Ok(added)
    }

    #[cfg(feature = "slow-asserts")]
    fn check_invariants(&self) {
        self.status.check_invariants();
        for ev in self.events.iter() {
            if let Some(x) = self.x {
                assert!(ev.x >= x, "{ev:?} is behind the sweep line at {x}");
            }
        }
    }

    #[cfg(not(feature = "slow-asserts"))]
    fn check_invariants(&self) {}
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use proptest::prelude::*;

    use super::*;

    fn arcs(coeffs: &[(f64, f64, f64, f64, f64)]) -> Arcs {
        let mut ret = Arcs::default();
        for &(a, b, c, t1, t2) in coeffs {
            ret.push(a, b, c, t1, t2).unwrap();
        }
        ret
    }

    fn trace(sweeper: &mut Sweeper) -> Vec<String> {
        std::iter::from_fn(|| sweeper.step().ok())
            .map(|r| r.to_string())
            .collect()
    }

    #[test]
    fn x_shape() {
        let arcs = arcs(&[(0.0, 1.0, 0.0, -5.0, 5.0), (0.0, -1.0, 0.0, -5.0, 5.0)]);
        let mut sweeper = Sweeper::new(&arcs);
        assert_eq!(sweeper.pending_events().count(), 4);
        assert_eq!(sweeper.sweep_x(), None);

        let first = sweeper.step().unwrap();
        assert_eq!(first.event.kind, EventKind::Start(ArcId(0)));
        assert_eq!(sweeper.status().ids, vec![ArcId(0)]);

        let second = sweeper.step().unwrap();
        assert_eq!(second.new_intersections, 1);
        // y = -x is on top to the left of the crossing.
        assert_eq!(sweeper.status().ids, vec![ArcId(1), ArcId(0)]);

        let third = sweeper.step().unwrap();
        assert_eq!(
            third.event.kind,
            EventKind::Intersection {
                upper: ArcId(1),
                lower: ArcId(0)
            }
        );
        assert_eq!(sweeper.intersections(), 1);
        assert_eq!(sweeper.status().ids, vec![ArcId(0), ArcId(1)]);

        let summary = sweeper.run().unwrap();
        assert_eq!(
            summary,
            Summary {
                segments: 2,
                intersections: 1
            }
        );
        assert!(sweeper.status_tree().is_empty());
        assert_matches!(sweeper.step(), Err(Error::NoMoreEvents));
    }

    #[test]
    fn trace_format() {
        let arcs = arcs(&[(0.0, 1.0, 0.0, -5.0, 5.0), (0.0, -1.0, 0.0, -5.0, 5.0)]);
        let mut sweeper = Sweeper::new(&arcs);
        insta::assert_snapshot!(trace(&mut sweeper).join("\n"), @r"
        event: S -5.00 0
        event: S -5.00 1
        event: I 0.00 0
        event: E 5.00 0
        event: E 5.00 0
        ");
    }

    #[test]
    fn status_format() {
        let arcs = arcs(&[
            (0.0, 0.0, 1.0, 0.0, 4.0),
            (0.0, 0.0, 3.0, 1.0, 4.0),
            (0.0, 0.0, 2.0, 2.0, 4.0),
        ]);
        let mut sweeper = Sweeper::new(&arcs);
        assert_eq!(sweeper.status().to_string(), "status: 0:");
        for _ in 0..3 {
            sweeper.step().unwrap();
        }
        assert_eq!(sweeper.status().to_string(), "status: 3:1 2 0");
        assert_eq!(sweeper.status(), sweeper.status());
    }

    #[test]
    fn parabolas_cross_twice() {
        // x^2 and 8 - x^2 cross at x = -2 and x = 2.
        let arcs = arcs(&[(1.0, 0.0, 0.0, -3.0, 3.0), (-1.0, 0.0, 8.0, -3.0, 3.0)]);
        let mut sweeper = Sweeper::new(&arcs);
        sweeper.step().unwrap();
        let report = sweeper.step().unwrap();
        assert_eq!(report.new_intersections, 2);

        sweeper.step().unwrap();
        assert_eq!(sweeper.status().ids, vec![ArcId(1), ArcId(0)]);
        sweeper.step().unwrap();
        assert_eq!(sweeper.status().ids, vec![ArcId(0), ArcId(1)]);
        assert_eq!(sweeper.run().unwrap().intersections, 2);
    }

    #[test]
    fn parabola_and_line() {
        // y = x^2 dips below y = 4 between -2 and 2.
        let arcs = arcs(&[(1.0, 0.0, 0.0, -3.0, 3.0), (0.0, 0.0, 4.0, -3.0, 3.0)]);
        let mut sweeper = Sweeper::new(&arcs);
        assert_eq!(sweeper.run().unwrap().intersections, 2);
    }

    #[test]
    fn separated_pair_is_rechecked() {
        // Arcs 0 and 1 cross at x = 4, but arc 2 starts between them at x = 1
        // and ends at x = 2, before any crossing.
        let arcs = arcs(&[
            (0.0, 1.0, 0.0, 0.0, 6.0),
            (0.0, -1.0, 8.0, 0.0, 6.0),
            (0.0, 0.0, 4.0, 1.0, 2.0),
        ]);
        let mut sweeper = Sweeper::new(&arcs);
        sweeper.step().unwrap();
        sweeper.step().unwrap();
        assert_eq!(sweeper.pending_events().count(), 5);

        // Arc 2 separates them, cancelling their crossing.
        let report = sweeper.step().unwrap();
        assert_eq!(report.event.kind, EventKind::Start(ArcId(2)));
        assert_eq!(report.new_intersections, 0);
        assert_eq!(sweeper.status().ids, vec![ArcId(1), ArcId(2), ArcId(0)]);
        assert!(sweeper
            .pending_events()
            .all(|ev| !matches!(ev.kind, EventKind::Intersection { .. })));

        // When it leaves, they are neighbors again.
        let report = sweeper.step().unwrap();
        assert_eq!(report.event.kind, EventKind::End(ArcId(2)));
        assert_eq!(report.new_intersections, 1);

        assert_eq!(sweeper.run().unwrap().intersections, 1);
    }

    #[test]
    fn custom_offset() {
        let arcs = arcs(&[(0.0, 1.0, 0.0, -5.0, 5.0), (0.0, -1.0, 0.0, -5.0, 5.0)]);
        let mut sweeper = Sweeper::with_swap_offset(&arcs, 0.5);
        for _ in 0..3 {
            sweeper.step().unwrap();
        }
        let top = sweeper.status_tree().find(ArcId(0)).unwrap();
        assert_eq!(top.current_y, 0.5);
    }

    #[test]
    fn empty() {
        let arcs = Arcs::default();
        let mut sweeper = Sweeper::new(&arcs);
        assert_matches!(sweeper.step(), Err(Error::NoMoreEvents));
        assert_eq!(
            sweeper.run(),
            Ok(Summary {
                segments: 0,
                intersections: 0
            })
        );
    }

    fn segment() -> impl Strategy<Value = (f64, f64, f64, f64)> {
        (
            -100.0f64..100.0,
            -100.0f64..100.0,
            -100.0f64..100.0,
            -100.0f64..100.0,
        )
            .prop_filter("nearly vertical", |(x0, _, x1, _)| (x0 - x1).abs() > 1.0)
    }

    proptest! {
    #[test]
    fn matches_brute_force(segs in prop::collection::vec(segment(), 0..=8)) {
        let mut arcs = Arcs::default();
        for (x0, y0, x1, y1) in segs {
            let (x0, y0, x1, y1) = if x0 < x1 { (x0, y0, x1, y1) } else { (x1, y1, x0, y0) };
            let b = (y1 - y0) / (x1 - x0);
            let c = y0 - b * x0;
            arcs.push(0.0, b, c, x0, x1).unwrap();
        }

        let all: Vec<_> = arcs.iter().collect();
        let mut expected = 0;
        for (i, a) in all.iter().enumerate() {
            for b in &all[i + 1..] {
                expected += intersect(a, b).len();
            }
        }

        let mut sweeper = Sweeper::new(&arcs);
        let summary = sweeper.run().unwrap();
        prop_assert_eq!(summary.intersections, expected);
        prop_assert!(sweeper.status_tree().is_empty());
    }
    }
}
