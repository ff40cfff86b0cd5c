use std::sync::Arc;

use geo::{Coordinate, LineString, Point};
use smallvec::SmallVec;

use crate::error::{InvalidArgument, Result};

const INLINE_DIMENSIONS: usize = 4;

/// A point in grid space; one `f64` per ordinate.
///
/// Points of up to four dimensions are stored inline.
pub type GridPoint = SmallVec<[f64; INLINE_DIMENSIONS]>;

/// Read-only, indexable sequence of points of a fixed dimension.
///
/// The data is held behind an [`Arc`] so that clones are cheap and may
/// be read concurrently; this is how split sub-traversals share their
/// input.
#[derive(Debug, Clone, PartialEq)]
pub enum PointSource {
    /// A flat buffer holding `dimension` consecutive ordinates per
    /// point.
    Flat {
        coords: Arc<[f64]>,
        dimension: usize,
    },
    /// A list of 2-d coordinates.
    Planar(Arc<[Coordinate<f64>]>),
}

impl PointSource {
    /// Create a source over a flat buffer of ordinates.
    ///
    /// Fails if `dimension` is zero, or if the buffer length is not a
    /// multiple of `dimension`.
    pub fn flat<C: Into<Arc<[f64]>>>(coords: C, dimension: usize) -> Result<Self> {
        let coords = coords.into();
        if dimension == 0 {
            return Err(InvalidArgument::ZeroDimension);
        }
        if coords.len() % dimension != 0 {
            return Err(InvalidArgument::RaggedBuffer {
                len: coords.len(),
                dimension,
            });
        }
        Ok(PointSource::Flat { coords, dimension })
    }

    /// Number of points.
    #[inline]
    pub fn len(&self) -> usize {
        match self {
            PointSource::Flat { coords, dimension } => coords.len() / dimension,
            PointSource::Planar(coords) => coords.len(),
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of ordinates of every point.
    #[inline]
    pub fn dimension(&self) -> usize {
        match self {
            PointSource::Flat { dimension, .. } => *dimension,
            PointSource::Planar(_) => 2,
        }
    }

    /// The `dim`-th ordinate of the point at `index`.
    ///
    /// # Panics
    ///
    /// If either index is out of bounds.
    #[inline]
    pub fn ordinate(&self, index: usize, dim: usize) -> f64 {
        match self {
            PointSource::Flat { coords, dimension } => {
                assert!(dim < *dimension, "ordinate out of bounds");
                coords[index * dimension + dim]
            }
            PointSource::Planar(coords) => match dim {
                0 => coords[index].x,
                1 => coords[index].y,
                _ => panic!("ordinate out of bounds"),
            },
        }
    }

    /// The point at `index`.
    ///
    /// # Panics
    ///
    /// If `index` is out of bounds.
    pub fn get(&self, index: usize) -> GridPoint {
        match self {
            PointSource::Flat { coords, dimension } => {
                let start = index * dimension;
                SmallVec::from_slice(&coords[start..start + dimension])
            }
            PointSource::Planar(coords) => {
                let c = coords[index];
                SmallVec::from_slice(&[c.x, c.y])
            }
        }
    }

    /// The move vector of the segment starting at `index`, ie.
    /// `get(index + 1) - get(index)`.
    pub fn direction(&self, index: usize) -> GridPoint {
        (0..self.dimension())
            .map(|dim| self.ordinate(index + 1, dim) - self.ordinate(index, dim))
            .collect()
    }

    /// Iterate over all points in order.
    pub fn iter(&self) -> impl Iterator<Item = GridPoint> + '_ {
        (0..self.len()).map(move |idx| self.get(idx))
    }
}

impl From<Vec<Coordinate<f64>>> for PointSource {
    fn from(coords: Vec<Coordinate<f64>>) -> Self {
        PointSource::Planar(coords.into())
    }
}

impl From<LineString<f64>> for PointSource {
    fn from(ls: LineString<f64>) -> Self {
        ls.0.into()
    }
}

impl From<Vec<Point<f64>>> for PointSource {
    fn from(points: Vec<Point<f64>>) -> Self {
        points.into_iter().map(|p| p.0).collect::<Vec<_>>().into()
    }
}
