//! Per-segment evaluators.
//!
//! A segment is evaluated by [`MonoMove`] if it moves along exactly
//! one dimension, and by [`MultiMove`] otherwise. Both yield the grid
//! crossings strictly after the segment start, in order, ending with
//! the segment end.
mod mono;
pub use mono::MonoMove;

mod multi;
pub use multi::MultiMove;

use crate::GridPoint;

/// A lazy producer of points that can hand off a prefix of its
/// remaining work.
///
/// This is the sequential half of a [`rayon`] producer; see
/// [`ParTraversal`](crate::ParTraversal) for the parallel bridge.
pub trait Splittable: Sized {
    /// Produce the next point, or `None` once exhausted.
    fn advance(&mut self) -> Option<GridPoint>;

    /// Split off a disjoint prefix of the remaining work.
    ///
    /// On success, the returned producer yields the points that `self`
    /// would have yielded first, and `self` is left with the rest.
    /// Returns `None` if the work can't be (safely) divided; `self` is
    /// then unchanged.
    fn try_split(&mut self) -> Option<Self>;
}
