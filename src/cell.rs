use std::collections::HashMap;
use std::f64::consts::PI;

use slotmap::SlotMap;

use crate::edge::Edge;
use crate::geometry::{Point, PointF, SENTINEL_X};
use crate::map::EdgeKey;

/// The region of the plane nearer to `focus` than to any other site.
///
/// Edges accumulate in insertion order while the sweep runs; `organize`
/// sorts them into a counter-clockwise fan once the diagram is complete,
/// which is what a renderer wants to walk the cell's boundary.
#[derive(Debug, Clone)]
pub struct Cell {
    focus: Point,
    edges: Vec<EdgeKey>,
    order: Vec<EdgeKey>,
    organized: bool,
}

impl Cell {
    pub(crate) fn new(focus: Point) -> Self {
        Cell {
            focus,
            edges: Vec::new(),
            order: Vec::new(),
            organized: false,
        }
    }

    pub fn focus(&self) -> Point {
        self.focus
    }

    pub(crate) fn push_edge(&mut self, edge: EdgeKey) {
        self.edges.push(edge);
        self.organized = false;
    }

    pub(crate) fn edge_keys(&self) -> &[EdgeKey] {
        &self.edges
    }

    pub(crate) fn clear_edges(&mut self) {
        self.edges.clear();
        self.order.clear();
        self.organized = false;
    }

    /// Drop a single edge this cell shares with a neighbour whose own
    /// removal released it. A no-op if the edge isn't present.
    pub(crate) fn drop_edge(&mut self, edge: EdgeKey) {
        let before = self.edges.len();
        self.edges.retain(|&k| k != edge);
        if self.edges.len() != before {
            self.unorganize();
        }
    }

    pub fn is_organized(&self) -> bool {
        self.organized
    }

    /// Forget the sorted fan; called whenever the cell's edges change.
    pub fn unorganize(&mut self) {
        self.organized = false;
        self.order.clear();
    }

    /// The cell's boundary edges, sorted counter-clockwise if `organize`
    /// has run since the last change, otherwise in arbitrary insertion
    /// order.
    pub fn edges(&self) -> &[EdgeKey] {
        if self.organized {
            &self.order
        } else {
            &self.edges
        }
    }

    /// Sort the cell's edges by the angle of their midpoint relative to
    /// the focus, canonicalizing each edge's endpoint order so that
    /// walking the sorted sequence traces the boundary counter-clockwise.
    ///
    /// Ported from the angle-averaging and antipodal correction in the
    /// original polygon organizer: an edge whose two endpoints straddle
    /// the branch cut of `atan2` has its average angle shifted by pi and
    /// renormalized, and if that places the edge "behind" the focus, one
    /// of the two endpoint angles is shifted by 2*pi before the
    /// endpoint-order canonicalization runs.
    pub fn organize(&mut self, edges: &mut SlotMap<EdgeKey, Edge>) {
        let focus = PointF::new(self.focus.x as f64, self.focus.y as f64);
        let mut keyed: Vec<(f64, usize, EdgeKey)> = Vec::with_capacity(self.edges.len());

        for (insertion_index, &key) in self.edges.iter().enumerate() {
            let edge = edges.get_mut(key).expect("cell references a live edge");
            let (a, b) = match (edge.a, edge.b) {
                (Some(a), Some(b)) => (a, b),
                _ => continue, // not yet closed; organize() is only meaningful post-run
            };

            let mut ta = (a.y as f64 - focus.y).atan2(a.x as f64 - focus.x);
            let mut tb = (b.y as f64 - focus.y).atan2(b.x as f64 - focus.x);

            let mut degree = (ta + tb) / 2.0;
            if (ta - tb).abs() > PI {
                degree += PI;
                while degree > PI {
                    degree -= 2.0 * PI;
                }
                while degree < -PI {
                    degree += 2.0 * PI;
                }
            }

            if !(-PI / 2.0..=PI / 2.0).contains(&degree) {
                if tb > 0.0 && ta < 0.0 {
                    ta += 2.0 * PI;
                } else if ta > 0.0 && tb < 0.0 {
                    tb += 2.0 * PI;
                }
            }

            if ta >= tb {
                edge.a = Some(b);
                edge.b = Some(a);
            }

            keyed.push((degree, insertion_index, key));
        }

        keyed.sort_by(|x, y| x.0.partial_cmp(&y.0).unwrap().then_with(|| x.1.cmp(&y.1)));
        self.order = keyed.into_iter().map(|(_, _, k)| k).collect();
        self.organized = true;
    }

    /// True iff every edge is closed (no endpoint still carries the
    /// sentinel ray marker) and every endpoint Point occurs an even
    /// number of times across the cell's edges, i.e. they form closed
    /// loops rather than dangling chains.
    pub fn is_complete(&self, edges: &SlotMap<EdgeKey, Edge>) -> bool {
        let mut occurrences: HashMap<Point, u32> = HashMap::new();
        for &key in &self.edges {
            let edge = match edges.get(key) {
                Some(e) => e,
                None => return false,
            };
            let (a, b) = match (edge.a, edge.b) {
                (Some(a), Some(b)) => (a, b),
                _ => return false,
            };
            if a.x == SENTINEL_X || b.x == SENTINEL_X {
                return false;
            }
            *occurrences.entry(a).or_insert(0) += 1;
            *occurrences.entry(b).or_insert(0) += 1;
        }
        occurrences.values().all(|&count| count % 2 == 0)
    }
}
