use thiserror::Error;

/// Malformed configuration of a traversal.
///
/// These are only raised while assembling a traversal (see
/// [`GridTraversalBuilder::build`](crate::GridTraversalBuilder::build)
/// and [`PointSource::flat`](crate::PointSource::flat)). Iterating a
/// successfully built traversal never fails.
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum InvalidArgument {
    /// The builder was never given a polyline.
    #[error("no polyline was supplied to the traversal builder")]
    MissingPolyline,

    /// A flat buffer was declared with zero ordinates per point.
    #[error("point dimension must be positive")]
    ZeroDimension,

    /// A flat buffer whose length is not a multiple of its dimension.
    #[error("flat buffer of length {len} is not a multiple of dimension {dimension}")]
    RaggedBuffer { len: usize, dimension: usize },

    /// A tolerance that is negative or not finite.
    #[error("tolerances must be finite and non-negative")]
    InvalidTolerance,
}

/// Result type used by the fallible constructors of this crate.
pub type Result<T> = std::result::Result<T, InvalidArgument>;
