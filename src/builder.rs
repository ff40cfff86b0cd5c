use std::sync::Arc;

use log::debug;
use rayon::{
    iter::{Chain, IntoParallelIterator, ParallelIterator},
    option,
};

use crate::{
    error::{InvalidArgument, Result},
    traversal::{ParTraversal, Traversal},
    utils::Tolerance,
    GridPoint, PointSource,
};

/// Builder to assemble a [`GridCrossings`] sequence.
///
/// A polyline must be supplied, either as a flat buffer (see
/// [`flat`](Self::flat)) or as any point source (see
/// [`points`](Self::points)).
///
/// # Example
///
/// ```rust
/// # use geo_traversal::{GridTraversalBuilder, Result};
/// # fn main() -> Result<()> {
/// let points: Vec<_> = GridTraversalBuilder::new()
///     .flat(vec![0.2, 1.0, 0.2, 4.0], 2)
///     .include_start(false)
///     .build()?
///     .map(|pt| (pt[0], pt[1]))
///     .collect();
/// assert_eq!(points, vec![(0.2, 2.0), (0.2, 3.0), (0.2, 4.0)]);
/// # Ok(())}
/// ```
#[derive(Debug, Clone)]
pub struct GridTraversalBuilder {
    polyline: Option<Polyline>,
    include_start: bool,
    parallel: bool,
    tolerance: Tolerance,
}

/// The polyline, as given to the builder.
#[derive(Debug, Clone)]
enum Polyline {
    Flat { coords: Arc<[f64]>, dimension: usize },
    Source(PointSource),
}

impl Default for GridTraversalBuilder {
    fn default() -> Self {
        GridTraversalBuilder {
            polyline: None,
            include_start: true,
            parallel: false,
            tolerance: Tolerance::default(),
        }
    }
}

impl GridTraversalBuilder {
    pub fn new() -> Self {
        Default::default()
    }

    /// Traverse a polyline given as a flat buffer with `dimension`
    /// ordinates per point.
    ///
    /// The buffer is validated by [`build`](Self::build).
    pub fn flat<C: Into<Arc<[f64]>>>(mut self, coords: C, dimension: usize) -> Self {
        self.polyline = Some(Polyline::Flat {
            coords: coords.into(),
            dimension,
        });
        self
    }

    /// Traverse the points of any [`PointSource`]: an existing one, or
    /// 2-d points such as a [`LineString`].
    ///
    /// [`LineString`]: geo::LineString
    pub fn points<S: Into<PointSource>>(mut self, points: S) -> Self {
        self.polyline = Some(Polyline::Source(points.into()));
        self
    }

    /// Whether to yield the first point of the polyline (default
    /// `true`).
    pub fn include_start(mut self, include_start: bool) -> Self {
        self.include_start = include_start;
        self
    }

    /// Whether to evaluate in parallel when collecting (default
    /// `false`). This does not change the points produced.
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Tolerances to use (default [`Tolerance::default`]).
    pub fn tolerance(mut self, tolerance: Tolerance) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Validate the configuration and create the sequence.
    pub fn build(self) -> Result<GridCrossings> {
        self.tolerance.validate()?;
        let source = match self.polyline.ok_or(InvalidArgument::MissingPolyline)? {
            Polyline::Flat { coords, dimension } => PointSource::flat(coords, dimension)?,
            Polyline::Source(source) => source,
        };
        debug!(
            "traversal of {len} points of dimension {dim} (parallel: {par})",
            len = source.len(),
            dim = source.dimension(),
            par = self.parallel,
        );

        let start = if self.include_start && !source.is_empty() {
            Some(source.get(0))
        } else {
            None
        };
        Ok(GridCrossings {
            start,
            traversal: Traversal::new(source, self.tolerance),
            parallel: self.parallel,
        })
    }
}

/// The grid-densified polyline: a lazy, single-use sequence of points.
///
/// Iterating is always sequential; use [`into_par_iter`] for a
/// parallel iterator, or [`collect_points`] to let the builder
/// configuration decide.
///
/// [`into_par_iter`]: IntoParallelIterator::into_par_iter
/// [`collect_points`]: Self::collect_points
#[derive(Debug, Clone)]
pub struct GridCrossings {
    start: Option<GridPoint>,
    traversal: Traversal,
    parallel: bool,
}

impl GridCrossings {
    /// Whether parallel evaluation was requested.
    pub fn is_parallel(&self) -> bool {
        self.parallel
    }

    /// Dimension of the points produced.
    pub fn dimension(&self) -> usize {
        self.traversal.source().dimension()
    }

    /// Evaluate and collect all points, in order.
    pub fn collect_points(self) -> Vec<GridPoint> {
        if self.parallel {
            self.into_par_iter().collect()
        } else {
            self.collect()
        }
    }
}

impl Iterator for GridCrossings {
    type Item = GridPoint;

    fn next(&mut self) -> Option<Self::Item> {
        self.start.take().or_else(|| self.traversal.next())
    }
}

impl IntoParallelIterator for GridCrossings {
    type Iter = Chain<option::IntoIter<GridPoint>, ParTraversal>;
    type Item = GridPoint;

    fn into_par_iter(self) -> Self::Iter {
        self.start
            .into_par_iter()
            .chain(ParTraversal::from(self.traversal))
    }
}
