use crate::geometry::Point;

/// Errors raised while mutating a [`crate::map::Voronoi`] map.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum VoronoiError {
    #[error("a cell already exists at site ({}, {})", .0.x, .0.y)]
    DuplicateSite(Point),
}

/// Errors raised by geometry primitives.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum GeometryError {
    #[error("three points are collinear; no circumcenter exists")]
    Degenerate,
}
