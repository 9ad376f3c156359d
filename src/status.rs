//! The sweep-line status: a red-black tree of the arcs crossing the sweep line.
//!
//! Nodes live in an arena and refer to each other by index. Index zero is a
//! shared black sentinel that stands in for every missing child (and for the
//! root's parent), which lets the rebalancing code avoid special-casing
//! leaves.
//!
//! The tree is ordered from top to bottom, using [`ArcInstance::order`]. When
//! two different arcs have the same height, the one inserted later goes
//! after (i.e. below) the one that was already there.

use std::cmp::Ordering;

use crate::{
    arc::{ArcId, ArcInstance},
    Error,
};

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
struct NodeIdx(usize);

const NIL: NodeIdx = NodeIdx(0);

struct NodeVec<T> {
    inner: Vec<T>,
}

impl_typed_vec!(NodeVec, NodeIdx, "n");

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Color {
    Red,
    Black,
}

#[derive(Clone, Debug)]
struct Node {
    // `None` for the sentinel and for free slots.
    value: Option<ArcInstance>,
    color: Color,
    left: NodeIdx,
    right: NodeIdx,
    parent: NodeIdx,
}

impl Node {
    fn sentinel() -> Self {
        Node {
            value: None,
            color: Color::Black,
            left: NIL,
            right: NIL,
            parent: NIL,
        }
    }
}

/// The ordered set of arcs that currently cross the sweep line.
pub struct StatusTree {
    nodes: NodeVec<Node>,
    free: Vec<NodeIdx>,
    root: NodeIdx,
    len: usize,
}

impl Default for StatusTree {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for StatusTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.ids()).finish()
    }
}

impl StatusTree {
    /// Creates an empty tree.
    pub fn new() -> Self {
        let mut nodes = NodeVec::default();
        nodes.push(Node::sentinel());
        StatusTree {
            nodes,
            free: Vec::new(),
            root: NIL,
            len: 0,
        }
    }

    /// The number of arcs in the tree.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Is the tree empty?
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn value(&self, idx: NodeIdx) -> &ArcInstance {
        match &self.nodes[idx].value {
            Some(v) => v,
            None => unreachable!("{idx:?} has no value"),
        }
    }

    fn left(&self, idx: NodeIdx) -> NodeIdx {
        self.nodes[idx].left
    }

    fn right(&self, idx: NodeIdx) -> NodeIdx {
        self.nodes[idx].right
    }

    fn parent(&self, idx: NodeIdx) -> NodeIdx {
        self.nodes[idx].parent
    }

    fn color(&self, idx: NodeIdx) -> Color {
        self.nodes[idx].color
    }

    fn alloc(&mut self, value: ArcInstance) -> NodeIdx {
        let node = Node {
            value: Some(value),
            color: Color::Red,
            left: NIL,
            right: NIL,
            parent: NIL,
        };
        if let Some(idx) = self.free.pop() {
            self.nodes[idx] = node;
            idx
        } else {
            self.nodes.push(node)
        }
    }

    fn release(&mut self, idx: NodeIdx) {
        self.nodes[idx] = Node::sentinel();
        self.free.push(idx);
    }

    /// Inserts an arc instance, keeping the tree balanced.
    ///
    /// The new instance goes after every instance it ties with.
    pub fn insert(&mut self, value: ArcInstance) {
        let z = self.alloc(value);
        let mut y = NIL;
        let mut x = self.root;
        while x != NIL {
            y = x;
            x = if value.order(self.value(x)) == Ordering::Less {
                self.left(x)
            } else {
                self.right(x)
            };
        }

        self.nodes[z].parent = y;
        if y == NIL {
            self.root = z;
        } else if value.order(self.value(y)) == Ordering::Less {
            self.nodes[y].left = z;
        } else {
            self.nodes[y].right = z;
        }
        self.len += 1;
        self.insert_fixup(z);
        self.slow_check();
    }

    fn insert_fixup(&mut self, mut z: NodeIdx) {
        while self.color(self.parent(z)) == Color::Red {
            let p = self.parent(z);
            let g = self.parent(p);
            if p == self.left(g) {
                let uncle = self.right(g);
                if self.color(uncle) == Color::Red {
                    self.nodes[p].color = Color::Black;
                    self.nodes[uncle].color = Color::Black;
                    self.nodes[g].color = Color::Red;
                    z = g;
                } else {
                    if z == self.right(p) {
                        z = p;
                        self.rotate_left(z);
                    }
                    let p = self.parent(z);
                    let g = self.parent(p);
                    self.nodes[p].color = Color::Black;
                    self.nodes[g].color = Color::Red;
                    self.rotate_right(g);
                }
            } else {
                let uncle = self.left(g);
                if self.color(uncle) == Color::Red {
                    self.nodes[p].color = Color::Black;
                    self.nodes[uncle].color = Color::Black;
                    self.nodes[g].color = Color::Red;
                    z = g;
                } else {
                    if z == self.left(p) {
                        z = p;
                        self.rotate_right(z);
                    }
                    let p = self.parent(z);
                    let g = self.parent(p);
                    self.nodes[p].color = Color::Black;
                    self.nodes[g].color = Color::Red;
                    self.rotate_left(g);
                }
            }
        }
        let root = self.root;
        self.nodes[root].color = Color::Black;
    }

    // Replaces `old` with `new` in `old`'s parent.
    fn replace_child(&mut self, old: NodeIdx, new: NodeIdx) {
        let p = self.parent(old);
        if p == NIL {
            self.root = new;
        } else if old == self.left(p) {
            self.nodes[p].left = new;
        } else {
            self.nodes[p].right = new;
        }
    }

    fn rotate_left(&mut self, x: NodeIdx) {
        let y = self.right(x);
        let y_left = self.left(y);
        self.nodes[x].right = y_left;
        if y_left != NIL {
            self.nodes[y_left].parent = x;
        }
        self.nodes[y].parent = self.parent(x);
        self.replace_child(x, y);
        self.nodes[y].left = x;
        self.nodes[x].parent = y;
    }

    fn rotate_right(&mut self, x: NodeIdx) {
        let y = self.left(x);
        let y_right = self.right(y);
        self.nodes[x].left = y_right;
        if y_right != NIL {
            self.nodes[y_right].parent = x;
        }
        self.nodes[y].parent = self.parent(x);
        self.replace_child(x, y);
        self.nodes[y].right = x;
        self.nodes[x].parent = y;
    }

    fn locate_from(&self, node: NodeIdx, value: &ArcInstance) -> Option<NodeIdx> {
        if node == NIL {
            return None;
        }
        let here = self.value(node);
        if here.same_arc(value) {
            return Some(node);
        }
        match value.order(here) {
            Ordering::Less => self.locate_from(self.left(node), value),
            Ordering::Greater => self.locate_from(self.right(node), value),
            // Ties can be on either side.
            Ordering::Equal => self
                .locate_from(self.left(node), value)
                .or_else(|| self.locate_from(self.right(node), value)),
        }
    }

    /// Finds the stored instance of `value`'s arc, searching by height.
    ///
    /// This only succeeds if the stored instance has the same height as
    /// `value`, so it should be used with instances taken at the tree's
    /// current sweep position.
    pub fn locate(&self, value: &ArcInstance) -> Option<&ArcInstance> {
        self.locate_from(self.root, value).map(|idx| self.value(idx))
    }

    fn find_node(&self, id: ArcId) -> Option<NodeIdx> {
        let mut stack = vec![self.root];
        while let Some(idx) = stack.pop() {
            if idx == NIL {
                continue;
            }
            if self.value(idx).id() == id {
                return Some(idx);
            }
            stack.push(self.left(idx));
            stack.push(self.right(idx));
        }
        None
    }

    /// Finds the stored instance of the arc `id`, whatever its height.
    pub fn find(&self, id: ArcId) -> Option<&ArcInstance> {
        self.find_node(id).map(|idx| self.value(idx))
    }

    /// Removes `value`'s arc, returning false if it wasn't there.
    ///
    /// Like [`StatusTree::locate`], this searches by height.
    pub fn remove(&mut self, value: &ArcInstance) -> bool {
        match self.locate_from(self.root, value) {
            Some(idx) => {
                self.delete_node(idx);
                true
            }
            None => false,
        }
    }

    /// Removes the arc `id`, returning its stored instance.
    pub fn remove_by_id(&mut self, id: ArcId) -> Result<ArcInstance, Error> {
        let idx = self.find_node(id).ok_or(Error::ArcNotFound(id))?;
        Ok(self.delete_node(idx))
    }

    fn max_node(&self, mut idx: NodeIdx) -> NodeIdx {
        while self.right(idx) != NIL {
            idx = self.right(idx);
        }
        idx
    }

    fn delete_node(&mut self, z: NodeIdx) -> ArcInstance {
        let removed = *self.value(z);

        // The node that gets unlinked: either `z` itself, or (if `z` has two
        // children) its in-order predecessor, whose value moves into `z`.
        let y = if self.left(z) == NIL || self.right(z) == NIL {
            z
        } else {
            self.max_node(self.left(z))
        };
        let x = if self.left(y) != NIL {
            self.left(y)
        } else {
            self.right(y)
        };

        // This may write the sentinel's parent link, which the fixup relies on.
        self.nodes[x].parent = self.parent(y);
        self.replace_child(y, x);

        if y != z {
            let moved = self.nodes[y].value.take();
            self.nodes[z].value = moved;
        }
        if self.color(y) == Color::Black {
            self.delete_fixup(x);
        }
        self.nodes[NIL].parent = NIL;
        self.release(y);
        self.len -= 1;
        self.slow_check();
        removed
    }

    fn delete_fixup(&mut self, mut x: NodeIdx) {
        while x != self.root && self.color(x) == Color::Black {
            let p = self.parent(x);
            if x == self.left(p) {
                let mut w = self.right(p);
                if self.color(w) == Color::Red {
                    self.nodes[w].color = Color::Black;
                    self.nodes[p].color = Color::Red;
                    self.rotate_left(p);
                    w = self.right(self.parent(x));
                }
                if self.color(self.left(w)) == Color::Black
                    && self.color(self.right(w)) == Color::Black
                {
                    self.nodes[w].color = Color::Red;
                    x = self.parent(x);
                } else {
                    if self.color(self.right(w)) == Color::Black {
                        let wl = self.left(w);
                        self.nodes[wl].color = Color::Black;
                        self.nodes[w].color = Color::Red;
                        self.rotate_right(w);
                        w = self.right(self.parent(x));
                    }
                    let p = self.parent(x);
                    self.nodes[w].color = self.color(p);
                    self.nodes[p].color = Color::Black;
                    let wr = self.right(w);
                    self.nodes[wr].color = Color::Black;
                    self.rotate_left(p);
                    x = self.root;
                }
            } else {
                let mut w = self.left(p);
                if self.color(w) == Color::Red {
                    self.nodes[w].color = Color::Black;
                    self.nodes[p].color = Color::Red;
                    self.rotate_right(p);
                    w = self.left(self.parent(x));
                }
                if self.color(self.right(w)) == Color::Black
                    && self.color(self.left(w)) == Color::Black
                {
                    self.nodes[w].color = Color::Red;
                    x = self.parent(x);
                } else {
                    if self.color(self.left(w)) == Color::Black {
                        let wr = self.right(w);
                        self.nodes[wr].color = Color::Black;
                        self.nodes[w].color = Color::Red;
                        self.rotate_left(w);
                        w = self.left(self.parent(x));
                    }
                    let p = self.parent(x);
                    self.nodes[w].color = self.color(p);
                    self.nodes[p].color = Color::Black;
                    let wl = self.left(w);
                    self.nodes[wl].color = Color::Black;
                    self.rotate_right(p);
                    x = self.root;
                }
            }
        }
        self.nodes[x].color = Color::Black;
    }

    /// All the stored instances, from top to bottom.
    pub fn to_sorted_sequence(&self) -> Vec<ArcInstance> {
        let mut ret = Vec::with_capacity(self.len);
        let mut stack = Vec::new();
        let mut cur = self.root;
        while cur != NIL || !stack.is_empty() {
            while cur != NIL {
                stack.push(cur);
                cur = self.left(cur);
            }
            if let Some(idx) = stack.pop() {
                ret.push(*self.value(idx));
                cur = self.right(idx);
            }
        }
        ret
    }

    /// The ids of all stored arcs, from top to bottom.
    pub fn ids(&self) -> Vec<ArcId> {
        self.to_sorted_sequence().iter().map(|v| v.id()).collect()
    }

    // The neighbors of `value`'s arc in the flattened order.
    fn neighbors(&self, value: &ArcInstance) -> (Option<ArcInstance>, Option<ArcInstance>) {
        let seq = self.to_sorted_sequence();
        let Some(pos) = seq.iter().position(|v| v.same_arc(value)) else {
            return (None, None);
        };
        let pred = pos.checked_sub(1).map(|i| seq[i]);
        let succ = seq.get(pos + 1).copied();
        (pred, succ)
    }

    /// The instance just above `value`'s arc, if there is one.
    pub fn predecessor(&self, value: &ArcInstance) -> Option<ArcInstance> {
        self.neighbors(value).0
    }

    /// The instance just below `value`'s arc, if there is one.
    pub fn successor(&self, value: &ArcInstance) -> Option<ArcInstance> {
        self.neighbors(value).1
    }

    /// Recomputes every arc's height at the sweep position `x`, and rebuilds
    /// the tree in the new order.
    ///
    /// Arcs that tie at `x` keep their previous relative order.
    pub fn refresh_all(&mut self, x: f64) {
        let values = self.to_sorted_sequence();
        self.nodes.clear();
        self.nodes.push(Node::sentinel());
        self.free.clear();
        self.root = NIL;
        self.len = 0;
        for v in values {
            self.insert(v.arc.instantiate(x));
        }
    }

    /// The number of black nodes on every path from the root to a leaf,
    /// counting the sentinel.
    pub fn black_height(&self) -> usize {
        let mut idx = self.root;
        let mut count = 1;
        while idx != NIL {
            if self.color(idx) == Color::Black {
                count += 1;
            }
            idx = self.left(idx);
        }
        count
    }

    #[cfg(feature = "slow-asserts")]
    fn slow_check(&self) {
        self.check_invariants();
    }

    #[cfg(not(feature = "slow-asserts"))]
    fn slow_check(&self) {}

    /// Checks the red-black and ordering invariants, panicking if they fail.
    pub fn check_invariants(&self) {
        assert_eq!(self.color(NIL), Color::Black, "the sentinel is red");
        assert_eq!(self.color(self.root), Color::Black, "the root is red");
        assert_eq!(self.parent(self.root), NIL, "the root has a parent");

        let count = self.check_subtree(self.root);
        assert_eq!(count.nodes, self.len, "bad length");

        for pair in self.to_sorted_sequence().windows(2) {
            assert_ne!(
                pair[0].order(&pair[1]),
                Ordering::Greater,
                "{:?} and {:?} are out of order",
                pair[0],
                pair[1]
            );
        }
    }

    fn check_subtree(&self, idx: NodeIdx) -> SubtreeCount {
        if idx == NIL {
            return SubtreeCount {
                nodes: 0,
                black_height: 1,
            };
        }
        let left = self.left(idx);
        let right = self.right(idx);
        for child in [left, right] {
            if child != NIL {
                assert_eq!(self.parent(child), idx, "bad parent link at {child:?}");
            }
            if self.color(idx) == Color::Red {
                assert_eq!(self.color(child), Color::Black, "red child of red {idx:?}");
            }
        }
        let l = self.check_subtree(left);
        let r = self.check_subtree(right);
        assert_eq!(
            l.black_height, r.black_height,
            "black height mismatch at {idx:?}"
        );
        SubtreeCount {
            nodes: l.nodes + r.nodes + 1,
            black_height: l.black_height + usize::from(self.color(idx) == Color::Black),
        }
    }
}

struct SubtreeCount {
    nodes: usize,
    black_height: usize,
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use proptest::prelude::*;

    use super::*;
    use crate::arc::Arcs;

    fn flat_arcs(n: usize) -> Arcs {
        let mut arcs = Arcs::default();
        for i in 0..n {
            arcs.push(0.0, 0.0, i as f64, 0.0, 10.0).unwrap();
        }
        arcs
    }

    #[test]
    fn empty() {
        let tree = StatusTree::new();
        tree.check_invariants();
        assert!(tree.is_empty());
        assert_eq!(tree.black_height(), 1);
        assert!(tree.to_sorted_sequence().is_empty());
    }

    #[test]
    fn sorted_top_to_bottom() {
        let arcs = flat_arcs(20);
        let mut tree = StatusTree::new();
        for i in [3, 17, 0, 9, 12, 5, 19, 1, 8, 14, 2, 11, 6, 18, 4, 15, 7, 13, 10, 16] {
            tree.insert(arcs[ArcId(i)].instantiate(0.0));
            tree.check_invariants();
        }
        assert_eq!(tree.len(), 20);
        let ids: Vec<_> = tree.ids().into_iter().map(|id| id.0).collect();
        assert_eq!(ids, (0..20).rev().collect::<Vec<_>>());
        // Black height h needs at least 2^(h - 1) - 1 nodes.
        assert!(tree.black_height() <= 6);
    }

    #[test]
    fn ties_go_after() {
        let arcs = flat_arcs(3);
        let mut tree = StatusTree::new();
        for id in arcs.indices() {
            tree.insert(arcs[id].instance_at_y(1.0));
        }
        assert_eq!(tree.ids(), vec![ArcId(0), ArcId(1), ArcId(2)]);
        // Every tied value can still be found.
        for id in arcs.indices() {
            assert!(tree.locate(&arcs[id].instance_at_y(1.0)).is_some());
        }
    }

    #[test]
    fn neighbors() {
        let arcs = flat_arcs(3);
        let mut tree = StatusTree::new();
        for id in arcs.indices() {
            tree.insert(arcs[id].instantiate(0.0));
        }
        let top = arcs[ArcId(2)].instantiate(0.0);
        let mid = arcs[ArcId(1)].instantiate(0.0);
        let bottom = arcs[ArcId(0)].instantiate(0.0);
        assert_eq!(tree.predecessor(&top), None);
        assert_eq!(tree.successor(&top).map(|v| v.id()), Some(ArcId(1)));
        assert_eq!(tree.predecessor(&mid).map(|v| v.id()), Some(ArcId(2)));
        assert_eq!(tree.successor(&mid).map(|v| v.id()), Some(ArcId(0)));
        assert_eq!(tree.successor(&bottom), None);
    }

    #[test]
    fn remove_by_id() {
        let arcs = flat_arcs(5);
        let mut tree = StatusTree::new();
        for id in arcs.indices() {
            tree.insert(arcs[id].instantiate(0.0));
        }
        let removed = tree.remove_by_id(ArcId(2)).unwrap();
        assert_eq!(removed.id(), ArcId(2));
        assert_eq!(tree.len(), 4);
        tree.check_invariants();

        assert_matches!(tree.remove_by_id(ArcId(2)), Err(Error::ArcNotFound(ArcId(2))));
        assert_eq!(tree.len(), 4);
        assert_eq!(tree.ids(), vec![ArcId(4), ArcId(3), ArcId(1), ArcId(0)]);
    }

    #[test]
    fn remove_absent_is_noop() {
        let arcs = flat_arcs(2);
        let mut tree = StatusTree::new();
        tree.insert(arcs[ArcId(0)].instantiate(0.0));
        assert!(!tree.remove(&arcs[ArcId(1)].instantiate(0.0)));
        assert_eq!(tree.len(), 1);
        assert!(tree.remove(&arcs[ArcId(0)].instantiate(0.0)));
        assert!(tree.is_empty());
        tree.check_invariants();
    }

    #[test]
    fn refresh_reorders() {
        let mut arcs = Arcs::default();
        let up = arcs.push(0.0, 1.0, 0.0, -5.0, 5.0).unwrap();
        let down = arcs.push(0.0, -1.0, 0.0, -5.0, 5.0).unwrap();
        let mut tree = StatusTree::new();
        tree.insert(arcs[up].instantiate(-1.0));
        tree.insert(arcs[down].instantiate(-1.0));
        assert_eq!(tree.ids(), vec![down, up]);

        tree.refresh_all(1.0);
        tree.check_invariants();
        assert_eq!(tree.ids(), vec![up, down]);
        assert_eq!(tree.find(up).map(|v| v.current_y), Some(1.0));

        // At the crossing they tie, and keep their previous order.
        tree.refresh_all(0.0);
        assert_eq!(tree.ids(), vec![up, down]);
    }

    #[derive(Clone, Debug)]
    enum Op {
        Insert { id: usize, y: u8 },
        Remove { idx: usize },
        RemoveById { idx: usize },
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            2 => (0..64usize, 0..8u8).prop_map(|(id, y)| Op::Insert { id, y }),
            1 => any::<usize>().prop_map(|idx| Op::Remove { idx }),
            1 => any::<usize>().prop_map(|idx| Op::RemoveById { idx }),
        ]
    }

    proptest! {
    #[test]
    fn matches_vec_model(ops in prop::collection::vec(op(), 0..200)) {
        let arcs = flat_arcs(64);
        let mut tree = StatusTree::new();
        let mut model: Vec<ArcInstance> = Vec::new();

        for op in ops {
            match op {
                Op::Insert { id, y } => {
                    if model.iter().any(|v| v.id() == ArcId(id)) {
                        continue;
                    }
                    let value = arcs[ArcId(id)].instance_at_y(y as f64);
                    let pos = model.partition_point(|v| v.current_y >= value.current_y);
                    model.insert(pos, value);
                    tree.insert(value);
                }
                Op::Remove { idx } => {
                    if model.is_empty() {
                        continue;
                    }
                    let value = model.remove(idx % model.len());
                    prop_assert!(tree.remove(&value));
                }
                Op::RemoveById { idx } => {
                    if model.is_empty() {
                        continue;
                    }
                    let value = model.remove(idx % model.len());
                    prop_assert_eq!(tree.remove_by_id(value.id()), Ok(value));
                }
            }
            tree.check_invariants();
            let ids: Vec<_> = model.iter().map(|v| v.id()).collect();
            prop_assert_eq!(tree.ids(), ids);
        }
    }
    }

    #[test]
    fn arbitrary_insert_remove() {
        arbtest::arbtest(|u| {
            let arcs = flat_arcs(16);
            let mut tree = StatusTree::new();
            let mut present = Vec::new();
            for _ in 0..u.int_in_range(0..=100usize)? {
                let id = ArcId(u.int_in_range(0..=15)?);
                if let Some(pos) = present.iter().position(|p| *p == id) {
                    present.swap_remove(pos);
                    tree.remove_by_id(id).unwrap();
                } else {
                    let y: i8 = u.arbitrary()?;
                    present.push(id);
                    tree.insert(arcs[id].instance_at_y(y as f64));
                }
                tree.check_invariants();
                assert_eq!(tree.len(), present.len());
            }
            Ok(())
        });
    }
}
