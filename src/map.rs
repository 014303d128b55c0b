use std::collections::HashMap;

use slotmap::SlotMap;

use crate::cell::Cell;
use crate::edge::Edge;
use crate::error::VoronoiError;
use crate::geometry::Point;

slotmap::new_key_type! {
    /// A stable handle to a [`Cell`] in a [`Voronoi`] map.
    pub struct CellKey;
    /// A stable handle to an [`Edge`] in a [`Voronoi`] map.
    pub struct EdgeKey;
}

/// The container of cells (one per site) within a bounded rectangle.
///
/// Cells and edges both live in arenas owned by the map; every other
/// reference to either (from an arc, or from an event) is an index into
/// one of these arenas rather than a pointer, so nothing can outlive the
/// map that owns it.
pub struct Voronoi {
    pub width: i64,
    pub height: i64,
    cells: SlotMap<CellKey, Cell>,
    edges: SlotMap<EdgeKey, Edge>,
    foci: HashMap<Point, CellKey>,
    order: Vec<CellKey>,
}

impl Voronoi {
    pub fn new(width: i64, height: i64) -> Self {
        Voronoi {
            width,
            height,
            cells: SlotMap::with_key(),
            edges: SlotMap::with_key(),
            foci: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Add a new site. Rejects a site at a focus that already has a
    /// cell; duplicate sites never enter the beachline.
    pub fn add_site(&mut self, x: i64, y: i64) -> Result<CellKey, VoronoiError> {
        let focus = Point::new(x, y);
        if self.foci.contains_key(&focus) {
            return Err(VoronoiError::DuplicateSite(focus));
        }
        let key = self.cells.insert(Cell::new(focus));
        self.foci.insert(focus, key);
        self.order.push(key);
        Ok(key)
    }

    /// Remove a cell and release its edges, including dropping them
    /// from whichever sibling cell shares each one.
    pub fn remove_site(&mut self, cell: CellKey) {
        if let Some(removed) = self.cells.remove(cell) {
            self.foci.remove(&removed.focus());
            self.order.retain(|&k| k != cell);
            for &edge_key in removed.edge_keys() {
                self.edges.remove(edge_key);
                for (_, sibling) in self.cells.iter_mut() {
                    sibling.drop_edge(edge_key);
                }
            }
        }
    }

    /// Equivalent to `remove_site` followed by `add_site`.
    pub fn move_site(&mut self, cell: CellKey, x: i64, y: i64) -> Result<CellKey, VoronoiError> {
        self.remove_site(cell);
        self.add_site(x, y)
    }

    /// Drop a cell's edges, used before the sweepline is re-run on a
    /// mutated site set. Also drops them from whichever sibling cell
    /// shares each one, so a surviving neighbour never keeps a key into
    /// an edge that no longer exists.
    pub fn clear_edges_of(&mut self, cell: CellKey) {
        let released: Vec<EdgeKey> = match self.cells.get(cell) {
            Some(existing) => existing.edge_keys().to_vec(),
            None => Vec::new(),
        };
        for edge_key in released {
            self.edges.remove(edge_key);
            for (key, sibling) in self.cells.iter_mut() {
                if key != cell {
                    sibling.drop_edge(edge_key);
                }
            }
        }
        if let Some(existing) = self.cells.get_mut(cell) {
            existing.clear_edges();
        }
    }

    /// Allocate a new, empty edge shared by the two given cells.
    pub(crate) fn add_edge(&mut self, cell_a: CellKey, cell_b: CellKey) -> EdgeKey {
        let key = self.edges.insert(Edge::new());
        self.cells[cell_a].push_edge(key);
        self.cells[cell_b].push_edge(key);
        key
    }

    /// Allocate a new edge whose `a` endpoint is already known, shared by
    /// the two given cells. Used by the vertical-coincidence special case
    /// and by circle-event handling.
    pub(crate) fn add_edge_with_a(&mut self, cell_a: CellKey, cell_b: CellKey, a: Point) -> EdgeKey {
        let key = self.edges.insert(Edge::with_a(a));
        self.cells[cell_a].push_edge(key);
        self.cells[cell_b].push_edge(key);
        key
    }

    /// Fill whichever endpoint of the edge is still empty.
    pub fn set_edge_endpoint(&mut self, edge: EdgeKey, p: Point) {
        self.edges[edge].set_next_endpoint(p);
    }

    pub fn cells(&self) -> impl Iterator<Item = CellKey> + '_ {
        self.order.iter().copied()
    }

    pub fn cell(&self, key: CellKey) -> Option<&Cell> {
        self.cells.get(key)
    }

    pub fn edge(&self, key: EdgeKey) -> Option<&Edge> {
        self.edges.get(key)
    }

    /// Sort one cell's edges into a counter-clockwise fan. See
    /// [`Cell::organize`].
    pub fn organize_cell(&mut self, cell: CellKey) {
        let Voronoi { cells, edges, .. } = self;
        if let Some(c) = cells.get_mut(cell) {
            c.organize(edges);
        }
    }

    /// `organize_cell` for every cell currently in the map.
    pub fn organize_all(&mut self) {
        for key in self.order.clone() {
            self.organize_cell(key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_site_is_rejected() {
        let mut vmap = Voronoi::new(100, 100);
        vmap.add_site(10, 10).unwrap();
        let err = vmap.add_site(10, 10).unwrap_err();
        assert_eq!(err, VoronoiError::DuplicateSite(Point::new(10, 10)));
    }

    #[test]
    fn remove_site_releases_edges() {
        let mut vmap = Voronoi::new(100, 100);
        let a = vmap.add_site(0, 0).unwrap();
        let b = vmap.add_site(10, 0).unwrap();
        let e = vmap.add_edge(a, b);
        vmap.remove_site(a);
        assert!(vmap.edge(e).is_none());
        assert!(vmap.cell(a).is_none());
        // re-adding the same focus now succeeds since the old cell is gone
        assert!(vmap.add_site(0, 0).is_ok());
    }

    #[test]
    fn move_site_is_remove_then_add() {
        let mut vmap = Voronoi::new(100, 100);
        let a = vmap.add_site(0, 0).unwrap();
        let moved = vmap.move_site(a, 5, 5).unwrap();
        assert_eq!(vmap.cell(moved).unwrap().focus(), Point::new(5, 5));
        assert!(vmap.cell(a).is_none());
    }
}
