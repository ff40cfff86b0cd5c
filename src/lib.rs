//! Densifies polylines with their crossings of a regular unit grid.
//!
//! Given a polyline in grid space (cells are unit squares / cubes
//! aligned to integer coordinates), the traversal yields, between
//! every pair of consecutive vertices, each point at which the segment
//! crosses a grid line. The output can be used for per-cell analysis
//! of vector geometries (which raster cells a line touches,
//! ray / DEM intersections, etc.) without rasterizing.
//!
//! # Usage
//!
//! Configure a [`GridTraversalBuilder`] with a polyline, either as a
//! flat buffer of any dimension, or as 2-d [`geo`] coordinates:
//!
//! ```rust
//! use geo::LineString;
//! use geo_traversal::GridTraversalBuilder;
//!
//! let line = LineString::from(vec![(0., 0.), (2., 1.)]);
//! let points: Vec<_> = GridTraversalBuilder::new()
//!     .points(line)
//!     .build()
//!     .unwrap()
//!     .map(|pt| (pt[0], pt[1]))
//!     .collect();
//! assert_eq!(points, vec![(0., 0.), (1., 0.5), (2., 1.)]);
//! ```
//!
//! # Parallel evaluation
//!
//! The underlying [`Traversal`] is a splittable producer: it divides
//! its remaining work first by segment index, and then within a
//! segment. It plugs into [`rayon`] via [`ParTraversal`], and
//! [`GridCrossings`] implements [`IntoParallelIterator`].
//!
//! # Numeric robustness
//!
//! Crossings within [`ZERO_EPSILON`] of an already emitted point (eg.
//! at grid vertices, or at a segment start that is on a grid line) are
//! not repeated. Segments with non-finite coordinates are traversed
//! conservatively: the offending dimensions are ignored and the
//! segment is never split. See [`Tolerance`] to configure the
//! tolerances.
//!
//! [`IntoParallelIterator`]: rayon::iter::IntoParallelIterator
mod error;
pub use error::{InvalidArgument, Result};

mod points;
pub use points::{GridPoint, PointSource};

mod utils;
pub use utils::{colinearity_factor, Tolerance, COLINEAR_EPSILON, ZERO_EPSILON};

pub mod moves;
pub use moves::Splittable;

mod traversal;
pub use traversal::{ParTraversal, Traversal};

mod builder;
pub use builder::{GridCrossings, GridTraversalBuilder};

#[cfg(test)]
#[path = "../benches/utils/random.rs"]
pub mod random;
