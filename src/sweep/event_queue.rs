use std::collections::BTreeSet;

use super::{Event, EventKind};
use crate::arc::ArcId;

/// The pending events, ordered by sweep position.
///
/// Only one dynamically discovered event is allowed per sweep position: see
/// [`EventQueue::add`].
#[derive(Clone, Debug, Default)]
pub struct EventQueue {
    events: BTreeSet<Event>,
}

impl EventQueue {
    /// Adds an event, unless some pending event already has the same `x`.
    ///
    /// Returns whether the event was added.
    pub fn add(&mut self, event: Event) -> bool {
        let lo = Event {
            x: event.x,
            kind: EventKind::Start(ArcId(0)),
        };
        let hi = Event {
            x: event.x,
            kind: EventKind::End(ArcId(usize::MAX)),
        };
        if self.events.range(lo..=hi).next().is_some() {
            return false;
        }
        self.events.insert(event)
    }

    /// Adds an event, allowing it to share its `x` with other events.
    ///
    /// This is for the start and end events that are known up front. Returns
    /// false only if this exact event was already pending.
    pub fn seed(&mut self, event: Event) -> bool {
        self.events.insert(event)
    }

    /// Removes and returns the next event.
    pub fn pop(&mut self) -> Option<Event> {
        self.events.pop_first()
    }

    /// The next event, without removing it.
    pub fn peek(&self) -> Option<&Event> {
        self.events.first()
    }

    /// Removes a pending event, returning whether it was there.
    pub fn remove(&mut self, event: &Event) -> bool {
        self.events.remove(event)
    }

    /// Removes all pending crossings between `a` and `b` (in either order),
    /// returning how many there were.
    pub fn cancel_between(&mut self, a: ArcId, b: ArcId) -> usize {
        let before = self.events.len();
        self.events.retain(|ev| match ev.kind {
            EventKind::Intersection { upper, lower } => {
                !((upper == a && lower == b) || (upper == b && lower == a))
            }
            _ => true,
        });
        before - self.events.len()
    }

    /// The number of pending events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Are there no pending events?
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Iterates over the pending events, in the order they'll be processed.
    pub fn iter(&self) -> impl Iterator<Item = &Event> + '_ {
        self.events.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn start(x: f64, id: usize) -> Event {
        Event {
            x,
            kind: EventKind::Start(ArcId(id)),
        }
    }

    fn end(x: f64, id: usize) -> Event {
        Event {
            x,
            kind: EventKind::End(ArcId(id)),
        }
    }

    fn crossing(x: f64, upper: usize, lower: usize) -> Event {
        Event {
            x,
            kind: EventKind::Intersection {
                upper: ArcId(upper),
                lower: ArcId(lower),
            },
        }
    }

    #[test]
    fn pops_in_order() {
        let mut queue = EventQueue::default();
        assert!(queue.seed(end(5.0, 0)));
        assert!(queue.seed(start(-5.0, 1)));
        assert!(queue.seed(start(-5.0, 0)));
        assert!(queue.add(crossing(0.0, 1, 0)));
        assert!(queue.seed(end(5.0, 1)));

        let popped: Vec<_> = std::iter::from_fn(|| queue.pop()).collect();
        assert_eq!(
            popped,
            vec![
                start(-5.0, 0),
                start(-5.0, 1),
                crossing(0.0, 1, 0),
                end(5.0, 0),
                end(5.0, 1),
            ]
        );
        assert!(queue.is_empty());
        assert_eq!(queue.pop(), None);
    }

    #[test]
    fn same_x_kinds() {
        let mut queue = EventQueue::default();
        queue.seed(end(1.0, 0));
        queue.seed(crossing(1.0, 3, 4));
        queue.seed(start(1.0, 9));
        assert_eq!(queue.pop(), Some(start(1.0, 9)));
        assert_eq!(queue.pop(), Some(crossing(1.0, 3, 4)));
        assert_eq!(queue.pop(), Some(end(1.0, 0)));
    }

    #[test]
    fn duplicate_x_rejected() {
        let mut queue = EventQueue::default();
        queue.seed(start(2.0, 0));
        assert!(!queue.add(crossing(2.0, 1, 0)));
        assert!(queue.add(crossing(3.0, 1, 0)));
        assert!(!queue.add(crossing(3.0, 5, 6)));
        assert!(!queue.add(crossing(3.0, 1, 0)));
        assert_eq!(queue.len(), 2);

        // Seeding still allows sharing an x, but not exact duplicates.
        assert!(queue.seed(end(3.0, 0)));
        assert!(!queue.seed(end(3.0, 0)));
        assert_eq!(queue.len(), 3);
    }

    #[test]
    fn cancel() {
        let mut queue = EventQueue::default();
        queue.add(crossing(1.0, 1, 2));
        queue.add(crossing(2.0, 2, 1));
        queue.add(crossing(3.0, 2, 3));
        queue.seed(start(4.0, 1));
        assert_eq!(queue.cancel_between(ArcId(1), ArcId(2)), 2);
        assert_eq!(queue.cancel_between(ArcId(1), ArcId(2)), 0);
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.peek(), Some(&crossing(3.0, 2, 3)));

        assert!(queue.remove(&crossing(3.0, 2, 3)));
        assert!(!queue.remove(&crossing(3.0, 2, 3)));
        assert_eq!(queue.iter().collect::<Vec<_>>(), vec![&start(4.0, 1)]);
    }
}
