#![warn(clippy::all)]
#![forbid(unsafe_code)]
//!# Docs
//!
//! A Rust implementation of the computational core of
//! [Fortune's algorithm](https://en.wikipedia.org/wiki/Fortune%27s_algorithm):
//! an event-driven sweepline that builds a bounded
//! [Voronoi diagram](https://en.wikipedia.org/wiki/Voronoi_diagram) from a
//! set of planar sites.
//!
//!## Implementation Details
//! The implementation is entirely in safe Rust.
//!
//! Sites and the resulting cell/edge graph live in a [`Voronoi`] map; a
//! [`SweepLine`] consumes that map's sites and fills in its edges. The
//! two are kept apart deliberately: the map is the thing an interactive
//! caller mutates between runs, the sweep is the disposable engine that
//! processes one run of it.
//!
//!## Example Usage
//!
//! ```rust
//! use sweepline_voronoi::{SweepLine, Voronoi};
//!
//! let mut vmap = Voronoi::new(1000, 1000);
//! vmap.add_site(100, 100).unwrap();
//! vmap.add_site(900, 100).unwrap();
//! vmap.add_site(500, 900).unwrap();
//!
//! let mut sweep = SweepLine::new();
//! sweep.load(&mut vmap);
//! sweep.run(&mut vmap);
//!
//! for cell in vmap.cells() {
//!     for &edge in vmap.cell(cell).unwrap().edges() {
//!         assert!(vmap.edge(edge).unwrap().is_closed());
//!     }
//! }
//! ```

mod beachline;
mod cell;
mod edge;
pub mod error;
mod event;
mod geometry;
mod map;
mod sweepline;

pub use cell::Cell;
pub use edge::Edge;
pub use error::{GeometryError, VoronoiError};
pub use geometry::Point;
pub use map::{CellKey, EdgeKey, Voronoi};
pub use sweepline::{StepOutcome, SweepLine};
