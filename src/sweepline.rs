//! The sweepline driver: advances a vertical line at x = L across the
//! plane, processing site and circle events in increasing-x order and
//! building the beachline and edge graph as it goes.
//!
//! This is a from-scratch driver, not a port of the source crate's
//! `voronoi_builder.rs` — the source built a half-edge DCEL, this one
//! builds the simpler focus/edge/cell model in `map.rs` — but it keeps
//! the source's event-loop shape: a `handle_site_event`/`handle_circle_event`
//! pair dispatched from a `step` loop, plus a `check_circle` helper run
//! after every beachline mutation that might create or destroy a
//! concave triple.

use std::cmp::Ordering;

use log::{debug, trace, warn};

use crate::beachline::{ArcKey, Beachline};
use crate::event::EventQueue;
use crate::geometry::{circumcenter, cross, distance, parabola_intersect, Point, PointF};
use crate::map::{CellKey, Voronoi};

#[derive(Debug, Clone, Copy)]
struct SiteEvent {
    x: f64,
    y: f64,
    cell: CellKey,
}

impl PartialEq for SiteEvent {
    fn eq(&self, other: &Self) -> bool {
        self.x == other.x && self.y == other.y
    }
}
impl Eq for SiteEvent {}

impl PartialOrd for SiteEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SiteEvent {
    fn cmp(&self, other: &Self) -> Ordering {
        self.x.total_cmp(&other.x).then_with(|| self.y.total_cmp(&other.y))
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct CircleEvent {
    x: f64,
    center: PointF,
    arc: ArcKey,
}

impl PartialEq for CircleEvent {
    fn eq(&self, other: &Self) -> bool {
        self.x == other.x && self.center.y == other.center.y
    }
}
impl Eq for CircleEvent {}

impl PartialOrd for CircleEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CircleEvent {
    fn cmp(&self, other: &Self) -> Ordering {
        self.x
            .total_cmp(&other.x)
            .then_with(|| self.center.y.total_cmp(&other.center.y))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DriverState {
    Unloaded,
    Idle,
    Running,
    Finishing,
    Done,
}

/// The outcome of a single `step`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepOutcome {
    /// An event was processed; the sweep position is now `L`.
    Continued(f64),
    /// Both queues were empty; edges have been finished and the diagram
    /// is complete.
    Done,
}

/// Drives Fortune's sweepline algorithm over a [`Voronoi`] map.
pub struct SweepLine {
    l: f64,
    beachline: Beachline,
    site_events: EventQueue<SiteEvent>,
    circle_events: EventQueue<CircleEvent>,
    state: DriverState,
    width: i64,
    height: i64,
}

impl Default for SweepLine {
    fn default() -> Self {
        Self::new()
    }
}

impl SweepLine {
    pub fn new() -> Self {
        SweepLine {
            l: f64::NEG_INFINITY,
            beachline: Beachline::new(),
            site_events: EventQueue::new(),
            circle_events: EventQueue::new(),
            state: DriverState::Unloaded,
            width: 0,
            height: 0,
        }
    }

    /// Snapshot the map's cells, clear their edges, seed the site-event
    /// queue, and reset the beachline and circle-event queue. Callable
    /// from any state to restart.
    pub fn load(&mut self, vmap: &mut Voronoi) {
        self.beachline.clear();
        self.circle_events = EventQueue::new();
        self.site_events = EventQueue::new();
        self.width = vmap.width;
        self.height = vmap.height;
        self.l = f64::NEG_INFINITY;

        let cells: Vec<CellKey> = vmap.cells().collect();
        for cell in cells {
            vmap.clear_edges_of(cell);
            let focus = vmap
                .cell(cell)
                .expect("cell returned by Voronoi::cells always exists")
                .focus();
            self.site_events.insert(SiteEvent {
                x: focus.x as f64,
                y: focus.y as f64,
                cell,
            });
        }
        debug!("loaded {} site events", self.site_events.len());
        self.state = DriverState::Idle;
    }

    /// Process the next event (by increasing event-x, site wins ties)
    /// and return the new sweep position, or signal that both queues
    /// are empty and the diagram has been finished.
    pub fn step(&mut self, vmap: &mut Voronoi) -> StepOutcome {
        let site_top = self.site_events.peek();
        let circle_top = self.circle_events.peek();

        let take_site = match (&site_top, &circle_top) {
            (None, None) => None,
            (Some(_), None) => Some(true),
            (None, Some(_)) => Some(false),
            (Some(s), Some(c)) => Some(s.x <= c.x),
        };

        match take_site {
            None => {
                self.state = DriverState::Finishing;
                self.finish_edges(vmap);
                self.state = DriverState::Done;
                StepOutcome::Done
            }
            Some(true) => {
                let event = self.site_events.pop().expect("peeked site event is still present");
                self.l = event.x;
                self.state = DriverState::Running;
                self.handle_site_event(vmap, event);
                StepOutcome::Continued(self.l)
            }
            Some(false) => {
                let event = self
                    .circle_events
                    .pop()
                    .expect("peeked circle event is still present");
                self.l = event.x;
                self.state = DriverState::Running;
                self.handle_circle_event(vmap, event);
                StepOutcome::Continued(self.l)
            }
        }
    }

    /// True once `run` (or enough `step` calls) has drained both queues
    /// and finished every edge.
    pub fn is_done(&self) -> bool {
        self.state == DriverState::Done
    }

    /// Step until both queues are empty, then finish edges.
    pub fn run(&mut self, vmap: &mut Voronoi) {
        loop {
            if let StepOutcome::Done = self.step(vmap) {
                break;
            }
        }
    }

    fn handle_site_event(&mut self, vmap: &mut Voronoi, event: SiteEvent) {
        let focus = PointF::new(event.x, event.y);
        let cell = event.cell;

        if self.beachline.is_empty() {
            self.beachline.insert_root(focus, cell);
            trace!("seeded beachline root at ({}, {})", event.x, event.y);
            return;
        }

        let arc = self.beachline.find_arc_above(self.l, event.y);
        let arc_focus = self.beachline.focus(arc);

        if arc_focus.x == focus.x {
            // Vertical coincidence: the bisector is horizontal and has
            // no finite breakpoint yet, only a sentinel ray.
            let mid_y = (arc_focus.y + focus.y) / 2.0;
            let ray_start = Point::from(PointF::new(f64::NEG_INFINITY, mid_y));
            let arc_cell = self.beachline.cell(arc);

            if focus.y > arc_focus.y {
                let new_arc = self.beachline.insert_after(arc, focus, cell);
                let edge = vmap.add_edge_with_a(arc_cell, cell, ray_start);
                self.beachline.set_top_edge(arc, Some(edge));
                self.beachline.set_bottom_edge(new_arc, Some(edge));
            } else {
                let new_arc = self.beachline.insert_before(arc, focus, cell);
                let edge = vmap.add_edge_with_a(cell, arc_cell, ray_start);
                self.beachline.set_bottom_edge(arc, Some(edge));
                self.beachline.set_top_edge(new_arc, Some(edge));
            }
            trace!("vertical coincidence at x={}", event.x);
            return;
        }

        if let Some(handle) = self.beachline.take_event(arc) {
            self.circle_events.erase(&handle);
        }

        let arc_cell = self.beachline.cell(arc);
        let new_edge = vmap.add_edge(arc_cell, cell);
        let (lo, _mid, hi) = self.beachline.break_arc(arc, focus, cell, new_edge);
        trace!("split arc into {:?}/{:?}/{:?}", lo, _mid, hi);

        self.check_circle(lo);
        self.check_circle(hi);
    }

    fn handle_circle_event(&mut self, vmap: &mut Voronoi, event: CircleEvent) {
        let pj = event.arc;
        let pi = self.beachline.prev(pj);
        let pk = self.beachline.next(pj);
        let (pi, pk) = match (pi, pk) {
            (Some(pi), Some(pk)) => (pi, pk),
            _ => panic!("circle event references an arc with no two neighbours"),
        };

        let center = Point::from(event.center);

        let pi_cell = self.beachline.cell(pi);
        let pk_cell = self.beachline.cell(pk);
        let new_edge = vmap.add_edge_with_a(pi_cell, pk_cell, center);
        self.beachline.set_bottom_edge(pk, Some(new_edge));
        self.beachline.set_top_edge(pi, Some(new_edge));

        if let Some(bottom) = self.beachline.bottom_edge(pj) {
            vmap.set_edge_endpoint(bottom, center);
        }
        if let Some(top) = self.beachline.top_edge(pj) {
            vmap.set_edge_endpoint(top, center);
        }

        self.beachline.erase(pj);
        debug!("closed circle event at x={}, vertex ({}, {})", event.x, center.x, center.y);

        self.check_circle(pi);
        self.check_circle(pk);
    }

    /// Remove `q`'s stale pending circle event, if any, and schedule a
    /// fresh one iff `q` and its current neighbours form a concave
    /// triple (toward increasing L).
    fn check_circle(&mut self, q: ArcKey) {
        if let Some(handle) = self.beachline.take_event(q) {
            self.circle_events.erase(&handle);
        }

        let p = match self.beachline.prev(q) {
            Some(p) => p,
            None => return,
        };
        let r = match self.beachline.next(q) {
            Some(r) => r,
            None => return,
        };

        let pf = self.beachline.focus(p);
        let qf = self.beachline.focus(q);
        let rf = self.beachline.focus(r);

        if cross(pf, qf, rf) >= 0.0 {
            return;
        }

        let center = match circumcenter(pf, qf, rf) {
            Ok(c) => c,
            Err(_) => {
                warn!("check_circle: circumcenter degenerate after cross-product test passed");
                return;
            }
        };
        let event_x = center.x + distance(qf, center);

        let handle = self.circle_events.insert(CircleEvent {
            x: event_x,
            center,
            arc: q,
        });
        self.beachline.set_event(q, handle);
    }

    /// Extend L past the bounding rectangle and close every arc's
    /// remaining open edge against the resulting breakpoint.
    fn finish_edges(&mut self, vmap: &mut Voronoi) {
        let l = 2.0 * ((self.width + self.height) as f64);
        let mut cur = self.beachline.first();
        while let Some(key) = cur {
            let next = self.beachline.next(key);
            if let Some(next_key) = next {
                let a = self.beachline.focus(key);
                let b = self.beachline.focus(next_key);
                let p = Point::from(parabola_intersect(a, b, l));
                if let Some(edge) = self.beachline.top_edge(key) {
                    vmap.set_edge_endpoint(edge, p);
                }
            }
            cur = next;
        }
        debug!("finished edges at L={}", l);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn three_sites_produce_one_vertex_and_three_edges() {
        let mut vmap = Voronoi::new(1000, 1000);
        vmap.add_site(0, 0).unwrap();
        vmap.add_site(10, 0).unwrap();
        vmap.add_site(5, 10).unwrap();

        let mut sweep = SweepLine::new();
        sweep.load(&mut vmap);
        sweep.run(&mut vmap);

        let mut seen_edges = std::collections::HashSet::new();
        for cell in vmap.cells() {
            for &edge_key in vmap.cell(cell).unwrap().edges() {
                seen_edges.insert(edge_key);
            }
        }
        assert_eq!(seen_edges.len(), 3);
        for &edge_key in &seen_edges {
            assert!(vmap.edge(edge_key).unwrap().is_closed());
        }
    }

    #[test]
    fn two_sites_produce_a_single_bisector() {
        let mut vmap = Voronoi::new(1000, 1000);
        vmap.add_site(0, 0).unwrap();
        vmap.add_site(100, 0).unwrap();

        let mut sweep = SweepLine::new();
        sweep.load(&mut vmap);
        sweep.run(&mut vmap);

        let mut seen_edges = std::collections::HashSet::new();
        for cell in vmap.cells() {
            for &edge_key in vmap.cell(cell).unwrap().edges() {
                seen_edges.insert(edge_key);
            }
        }
        assert_eq!(seen_edges.len(), 1);
    }

    #[test]
    fn vertically_colinear_sites_close_against_sentinel() {
        let mut vmap = Voronoi::new(1000, 1000);
        vmap.add_site(100, 100).unwrap();
        vmap.add_site(100, 300).unwrap();

        let mut sweep = SweepLine::new();
        sweep.load(&mut vmap);
        sweep.run(&mut vmap);

        let mut seen_edges = std::collections::HashSet::new();
        for cell in vmap.cells() {
            for &edge_key in vmap.cell(cell).unwrap().edges() {
                seen_edges.insert(edge_key);
            }
        }
        assert_eq!(seen_edges.len(), 1);
        let edge_key = *seen_edges.iter().next().unwrap();
        let edge = vmap.edge(edge_key).unwrap();
        assert!(edge.is_closed());
        let (a, b) = (edge.a.unwrap(), edge.b.unwrap());
        assert_eq!(a.y, 200);
        assert_eq!(b.y, 200);
    }
}
