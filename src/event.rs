//! A generic ordered multiset ("SelectivePriorityQueue") supporting
//! O(log n) insert, peek, pop, *and* O(log n) removal of an arbitrary
//! element via a stable handle returned from `insert`.
//!
//! This generalizes the site/circle event heap: rather than a single
//! hand-rolled heap over one concrete event type, it's a binary heap over
//! any `Ord` type, instantiated once for site events and once for circle
//! events. Each slot is reference-counted and carries its own current
//! heap index, updated on every swap, so a `Handle` obtained at insertion
//! time can still find (and erase) its element after arbitrary other
//! insertions and removals — exactly the trick the original hand-rolled
//! event queue used, generalized and made safe: `erase` verifies the
//! handle still points at a live slot before trusting its cached index.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

struct Slot<T> {
    value: T,
    index: usize,
}

/// A stable reference to a value previously inserted into an
/// [`EventQueue`]. Remains valid (in the sense that `erase` either
/// removes the right element or safely reports `false`) across any
/// number of other insertions and removals.
pub struct Handle<T>(Weak<RefCell<Slot<T>>>);

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        Handle(self.0.clone())
    }
}

pub struct EventQueue<T: Ord> {
    heap: Vec<Rc<RefCell<Slot<T>>>>,
}

impl<T: Ord + Clone> Default for EventQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Ord + Clone> EventQueue<T> {
    pub fn new() -> Self {
        EventQueue { heap: Vec::new() }
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Insert a value, returning a handle that can later be passed to
    /// `erase`.
    pub fn insert(&mut self, value: T) -> Handle<T> {
        let index = self.heap.len();
        let slot = Rc::new(RefCell::new(Slot { value, index }));
        let handle = Handle(Rc::downgrade(&slot));
        self.heap.push(slot);
        self.sift_up(index);
        handle
    }

    /// The smallest element, by value, without removing it.
    pub fn peek(&self) -> Option<T> {
        self.heap.first().map(|slot| slot.borrow().value.clone())
    }

    /// Remove and return the smallest element.
    pub fn pop(&mut self) -> Option<T> {
        if self.heap.is_empty() {
            return None;
        }
        let last = self.heap.len() - 1;
        self.swap_slots(0, last);
        let slot = self.heap.pop().unwrap();
        if !self.heap.is_empty() {
            self.sift_down(0);
        }
        Some(
            Rc::try_unwrap(slot)
                .ok()
                .expect("no outstanding handle should reference a popped event")
                .into_inner()
                .value,
        )
    }

    /// Remove the element referenced by `handle`, if it's still live.
    /// Returns `false` if the handle's slot was already popped/erased.
    pub fn erase(&mut self, handle: &Handle<T>) -> bool {
        let Some(slot) = handle.0.upgrade() else {
            return false;
        };
        let index = slot.borrow().index;
        if index >= self.heap.len() || !Rc::ptr_eq(&self.heap[index], &slot) {
            return false;
        }
        let last = self.heap.len() - 1;
        self.swap_slots(index, last);
        self.heap.pop();
        if index < self.heap.len() {
            self.fix(index);
        }
        true
    }

    fn fix(&mut self, index: usize) {
        if index > 0 {
            let parent = Self::parent(index);
            if self.heap[parent].borrow().value > self.heap[index].borrow().value {
                self.sift_up(index);
                return;
            }
        }
        self.sift_down(index);
    }

    fn parent(i: usize) -> usize {
        (i + 1) / 2 - 1
    }

    fn left(i: usize) -> usize {
        2 * (i + 1) - 1
    }

    fn right(i: usize) -> usize {
        2 * (i + 1)
    }

    fn swap_slots(&mut self, a: usize, b: usize) {
        self.heap.swap(a, b);
        self.heap[a].borrow_mut().index = a;
        self.heap[b].borrow_mut().index = b;
    }

    fn sift_up(&mut self, mut i: usize) {
        while i > 0 {
            let p = Self::parent(i);
            if self.heap[p].borrow().value > self.heap[i].borrow().value {
                self.swap_slots(i, p);
                i = p;
            } else {
                break;
            }
        }
    }

    fn sift_down(&mut self, mut i: usize) {
        loop {
            let mut smallest = i;
            let l = Self::left(i);
            let r = Self::right(i);
            if l < self.heap.len() && self.heap[smallest].borrow().value > self.heap[l].borrow().value {
                smallest = l;
            }
            if r < self.heap.len() && self.heap[smallest].borrow().value > self.heap[r].borrow().value {
                smallest = r;
            }
            if smallest != i {
                self.swap_slots(i, smallest);
                i = smallest;
            } else {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pops_in_ascending_order() {
        let mut q: EventQueue<i32> = EventQueue::new();
        for v in [5, 1, 4, 2, 3] {
            q.insert(v);
        }
        let mut popped = Vec::new();
        while let Some(v) = q.pop() {
            popped.push(v);
        }
        assert_eq!(popped, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn erase_removes_arbitrary_handle() {
        let mut q: EventQueue<i32> = EventQueue::new();
        let h1 = q.insert(10);
        let h2 = q.insert(20);
        let _h3 = q.insert(5);
        assert!(q.erase(&h1));
        assert_eq!(q.len(), 2);
        assert!(q.erase(&h2));
        assert_eq!(q.pop(), Some(5));
        assert_eq!(q.pop(), None);
    }

    #[test]
    fn erase_is_false_once_handle_already_popped() {
        let mut q: EventQueue<i32> = EventQueue::new();
        let h = q.insert(1);
        assert_eq!(q.pop(), Some(1));
        assert!(!q.erase(&h));
    }

    #[test]
    fn handles_survive_many_interleaved_operations() {
        let mut q: EventQueue<i32> = EventQueue::new();
        let handles: Vec<_> = (0..50).rev().map(|v| q.insert(v)).collect();
        // erase every other handle
        for h in handles.iter().step_by(2) {
            assert!(q.erase(h));
        }
        let mut remaining = Vec::new();
        while let Some(v) = q.pop() {
            remaining.push(v);
        }
        let mut expected: Vec<i32> = (0..50).filter(|v| v % 2 == 1).collect();
        expected.sort();
        assert_eq!(remaining, expected);
    }
}
