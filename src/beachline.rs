//! The beachline: an ordered sequence of parabolic arcs, indexed for
//! O(log n) "which arc is above this y" queries even though the ordering
//! itself shifts as the sweep parameter L advances.
//!
//! Arcs live in a `slotmap` arena so every reference to one (from a
//! neighbour, from a pending circle event) is a stable key rather than a
//! pointer or an iterator. The arena doubles as a self-balancing AVL
//! tree: each `ArcNode` carries `left`/`right`/`parent` pointers plus a
//! `height`, giving O(1)-amortised `prev`/`next` neighbour access via
//! parent-pointer walks and O(log n) rebalanced insertion/removal.
//!
//! The tree's comparator — "is y above or below the breakpoint between
//! this arc and its neighbour" — depends on the current sweep parameter
//! L. Rather than stash L as shared mutable state the tree reads behind
//! the driver's back, every method that needs it (`find_arc_above`)
//! takes it as an explicit argument: the comparator stays pure, and nodes
//! never hold a stale L.

use slotmap::SlotMap;

use crate::event::Handle;
use crate::geometry::{parabola_intersect, PointF};
use crate::map::{CellKey, EdgeKey};
use crate::sweepline::CircleEvent;

slotmap::new_key_type! {
    /// A stable handle to an arc on the beachline.
    pub struct ArcKey;
}

struct ArcNode {
    focus: PointF,
    cell: CellKey,
    top_edge: Option<EdgeKey>,
    bottom_edge: Option<EdgeKey>,
    event: Option<Handle<CircleEvent>>,
    left: Option<ArcKey>,
    right: Option<ArcKey>,
    parent: Option<ArcKey>,
    height: i32,
}

impl ArcNode {
    fn new(focus: PointF, cell: CellKey) -> Self {
        ArcNode {
            focus,
            cell,
            top_edge: None,
            bottom_edge: None,
            event: None,
            left: None,
            right: None,
            parent: None,
            height: 1,
        }
    }
}

#[derive(Default)]
pub struct Beachline {
    arena: SlotMap<ArcKey, ArcNode>,
    root: Option<ArcKey>,
}

impl Beachline {
    pub fn new() -> Self {
        Beachline {
            arena: SlotMap::with_key(),
            root: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// The leftmost arc in sequence order (smallest y), or `None` if the
    /// beachline is empty.
    pub fn first(&self) -> Option<ArcKey> {
        let mut cur = self.root?;
        while let Some(l) = self.arena[cur].left {
            cur = l;
        }
        Some(cur)
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn clear(&mut self) {
        self.arena.clear();
        self.root = None;
    }

    // --- accessors -----------------------------------------------------

    pub fn focus(&self, key: ArcKey) -> PointF {
        self.arena[key].focus
    }

    pub fn cell(&self, key: ArcKey) -> CellKey {
        self.arena[key].cell
    }

    pub fn top_edge(&self, key: ArcKey) -> Option<EdgeKey> {
        self.arena[key].top_edge
    }

    pub fn bottom_edge(&self, key: ArcKey) -> Option<EdgeKey> {
        self.arena[key].bottom_edge
    }

    pub fn set_top_edge(&mut self, key: ArcKey, edge: Option<EdgeKey>) {
        self.arena[key].top_edge = edge;
    }

    pub fn set_bottom_edge(&mut self, key: ArcKey, edge: Option<EdgeKey>) {
        self.arena[key].bottom_edge = edge;
    }

    /// Remove and return the arc's pending circle-event handle, if any.
    pub fn take_event(&mut self, key: ArcKey) -> Option<Handle<CircleEvent>> {
        self.arena[key].event.take()
    }

    pub fn set_event(&mut self, key: ArcKey, handle: Handle<CircleEvent>) {
        self.arena[key].event = Some(handle);
    }

    // --- in-order neighbours --------------------------------------------

    pub fn prev(&self, key: ArcKey) -> Option<ArcKey> {
        if let Some(mut cur) = self.arena[key].left {
            while let Some(r) = self.arena[cur].right {
                cur = r;
            }
            return Some(cur);
        }
        let mut cur = key;
        let mut parent = self.arena[cur].parent;
        while let Some(p) = parent {
            if self.arena[p].right == Some(cur) {
                return Some(p);
            }
            cur = p;
            parent = self.arena[p].parent;
        }
        None
    }

    pub fn next(&self, key: ArcKey) -> Option<ArcKey> {
        if let Some(mut cur) = self.arena[key].right {
            while let Some(l) = self.arena[cur].left {
                cur = l;
            }
            return Some(cur);
        }
        let mut cur = key;
        let mut parent = self.arena[cur].parent;
        while let Some(p) = parent {
            if self.arena[p].left == Some(cur) {
                return Some(p);
            }
            cur = p;
            parent = self.arena[p].parent;
        }
        None
    }

    /// The arc under which a new site at (L, y) would land: the unique
    /// arc whose breakpoint interval straddles y, given the current
    /// sweep position `l`.
    pub fn find_arc_above(&self, l: f64, y: f64) -> ArcKey {
        let mut cur = self.root.expect("find_arc_above called on empty beachline");
        loop {
            let focus = self.arena[cur].focus;
            let left_bound = match self.prev(cur) {
                Some(p) => parabola_intersect(self.arena[p].focus, focus, l).y,
                None => f64::NEG_INFINITY,
            };
            let right_bound = match self.next(cur) {
                Some(n) => parabola_intersect(focus, self.arena[n].focus, l).y,
                None => f64::INFINITY,
            };
            if y < left_bound {
                cur = self.arena[cur].left.expect("beachline interval invariant violated");
            } else if y > right_bound {
                cur = self.arena[cur].right.expect("beachline interval invariant violated");
            } else {
                return cur;
            }
        }
    }

    // --- structural mutation --------------------------------------------

    pub fn insert_root(&mut self, focus: PointF, cell: CellKey) -> ArcKey {
        let key = self.arena.insert(ArcNode::new(focus, cell));
        self.root = Some(key);
        key
    }

    /// Insert a new arc immediately before `of` in sequence order.
    pub fn insert_before(&mut self, of: ArcKey, focus: PointF, cell: CellKey) -> ArcKey {
        let key = self.arena.insert(ArcNode::new(focus, cell));
        if let Some(left) = self.arena[of].left {
            let mut cur = left;
            while let Some(r) = self.arena[cur].right {
                cur = r;
            }
            self.attach_right(cur, key);
        } else {
            self.attach_left(of, key);
        }
        self.retrace(Some(key));
        key
    }

    /// Insert a new arc immediately after `of` in sequence order.
    pub fn insert_after(&mut self, of: ArcKey, focus: PointF, cell: CellKey) -> ArcKey {
        let key = self.arena.insert(ArcNode::new(focus, cell));
        if let Some(right) = self.arena[of].right {
            let mut cur = right;
            while let Some(l) = self.arena[cur].left {
                cur = l;
            }
            self.attach_left(cur, key);
        } else {
            self.attach_right(of, key);
        }
        self.retrace(Some(key));
        key
    }

    /// Replace an arc's contents with a new site and return it, along
    /// with two new neighbouring arcs carrying the arc's old focus/cell:
    /// `lo` (spliced in immediately before, inheriting the old bottom
    /// edge) and `hi` (spliced in immediately after, inheriting the old
    /// top edge). The edge `new_edge` becomes both sides of the new
    /// arc's boundary and the inner side of `lo`/`hi`.
    pub fn break_arc(
        &mut self,
        node: ArcKey,
        new_focus: PointF,
        new_cell: CellKey,
        new_edge: EdgeKey,
    ) -> (ArcKey, ArcKey, ArcKey) {
        let old_top = self.arena[node].top_edge;
        let old_bottom = self.arena[node].bottom_edge;
        let old_focus = self.arena[node].focus;
        let old_cell = self.arena[node].cell;

        self.arena[node].focus = new_focus;
        self.arena[node].cell = new_cell;
        self.arena[node].top_edge = Some(new_edge);
        self.arena[node].bottom_edge = Some(new_edge);
        self.arena[node].event = None;

        let lo = self.insert_before(node, old_focus, old_cell);
        self.set_top_edge(lo, Some(new_edge));
        self.set_bottom_edge(lo, old_bottom);

        let hi = self.insert_after(node, old_focus, old_cell);
        self.set_top_edge(hi, old_top);
        self.set_bottom_edge(hi, Some(new_edge));

        (lo, node, hi)
    }

    /// Remove an arc from the beachline.
    pub fn erase(&mut self, key: ArcKey) {
        let parent = self.arena[key].parent;
        let left = self.arena[key].left;
        let right = self.arena[key].right;

        let rebalance_from;

        match (left, right) {
            (None, None) => {
                self.replace_child(parent, key, None);
                rebalance_from = parent;
            }
            (Some(l), None) => {
                self.replace_child(parent, key, Some(l));
                self.arena[l].parent = parent;
                rebalance_from = parent;
            }
            (None, Some(r)) => {
                self.replace_child(parent, key, Some(r));
                self.arena[r].parent = parent;
                rebalance_from = parent;
            }
            (Some(left), Some(right)) => {
                let mut succ = right;
                while let Some(l) = self.arena[succ].left {
                    succ = l;
                }
                let succ_parent = self.arena[succ].parent;
                let succ_right = self.arena[succ].right;

                if succ_parent == Some(key) {
                    rebalance_from = Some(succ);
                } else {
                    let sp = succ_parent.unwrap();
                    self.replace_child(Some(sp), succ, succ_right);
                    if let Some(sr) = succ_right {
                        self.arena[sr].parent = Some(sp);
                    }
                    self.arena[succ].right = Some(right);
                    self.arena[right].parent = Some(succ);
                    rebalance_from = Some(sp);
                }

                self.arena[succ].left = Some(left);
                self.arena[left].parent = Some(succ);
                self.replace_child(parent, key, Some(succ));
                self.arena[succ].parent = parent;
            }
        }

        self.arena.remove(key);
        self.retrace(rebalance_from);
    }

    // --- AVL internals ---------------------------------------------------

    fn height(&self, key: Option<ArcKey>) -> i32 {
        key.map(|k| self.arena[k].height).unwrap_or(0)
    }

    fn update_height(&mut self, key: ArcKey) {
        let h = 1 + self.height(self.arena[key].left).max(self.height(self.arena[key].right));
        self.arena[key].height = h;
    }

    fn balance_factor(&self, key: ArcKey) -> i32 {
        self.height(self.arena[key].left) - self.height(self.arena[key].right)
    }

    fn attach_left(&mut self, parent: ArcKey, child: ArcKey) {
        self.arena[parent].left = Some(child);
        self.arena[child].parent = Some(parent);
    }

    fn attach_right(&mut self, parent: ArcKey, child: ArcKey) {
        self.arena[parent].right = Some(child);
        self.arena[child].parent = Some(parent);
    }

    fn replace_child(&mut self, parent: Option<ArcKey>, old: ArcKey, new: Option<ArcKey>) {
        match parent {
            None => self.root = new,
            Some(p) => {
                if self.arena[p].left == Some(old) {
                    self.arena[p].left = new;
                } else {
                    self.arena[p].right = new;
                }
            }
        }
    }

    fn rotate_left(&mut self, x: ArcKey) -> ArcKey {
        let y = self.arena[x].right.expect("rotate_left requires a right child");
        let t2 = self.arena[y].left;
        let parent = self.arena[x].parent;

        self.replace_child(parent, x, Some(y));
        self.arena[y].parent = parent;

        self.arena[x].right = t2;
        if let Some(t2k) = t2 {
            self.arena[t2k].parent = Some(x);
        }

        self.arena[y].left = Some(x);
        self.arena[x].parent = Some(y);

        self.update_height(x);
        self.update_height(y);
        y
    }

    fn rotate_right(&mut self, x: ArcKey) -> ArcKey {
        let y = self.arena[x].left.expect("rotate_right requires a left child");
        let t2 = self.arena[y].right;
        let parent = self.arena[x].parent;

        self.replace_child(parent, x, Some(y));
        self.arena[y].parent = parent;

        self.arena[x].left = t2;
        if let Some(t2k) = t2 {
            self.arena[t2k].parent = Some(x);
        }

        self.arena[y].right = Some(x);
        self.arena[x].parent = Some(y);

        self.update_height(x);
        self.update_height(y);
        y
    }

    fn retrace(&mut self, mut node: Option<ArcKey>) {
        while let Some(k) = node {
            self.update_height(k);
            let bf = self.balance_factor(k);
            let new_k = if bf > 1 {
                let left = self.arena[k].left.unwrap();
                if self.balance_factor(left) < 0 {
                    self.rotate_left(left);
                }
                self.rotate_right(k)
            } else if bf < -1 {
                let right = self.arena[k].right.unwrap();
                if self.balance_factor(right) > 0 {
                    self.rotate_right(right);
                }
                self.rotate_left(k)
            } else {
                k
            };
            node = self.arena[new_k].parent;
        }
    }
}
