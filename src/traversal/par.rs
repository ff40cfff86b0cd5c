use rayon::iter::{
    plumbing::{bridge_unindexed, Folder, UnindexedConsumer, UnindexedProducer},
    ParallelIterator,
};

use super::Traversal;
use crate::{moves::Splittable, GridPoint};

/// Splits on the segment index first, then within a segment; the
/// prefix is always the left half.
impl UnindexedProducer for Traversal {
    type Item = GridPoint;

    fn split(mut self) -> (Self, Option<Self>) {
        match self.try_split() {
            Some(prefix) => (prefix, Some(self)),
            None => (self, None),
        }
    }

    fn fold_with<F>(self, folder: F) -> F
    where
        F: Folder<Self::Item>,
    {
        folder.consume_iter(self)
    }
}

/// Parallel iterator over the points of a [`Traversal`].
///
/// Order-preserving adaptors (eg. `collect` into a `Vec`) reproduce the
/// sequential order.
#[derive(Debug, Clone)]
pub struct ParTraversal(Traversal);

impl From<Traversal> for ParTraversal {
    fn from(traversal: Traversal) -> Self {
        ParTraversal(traversal)
    }
}

impl ParallelIterator for ParTraversal {
    type Item = GridPoint;

    fn drive_unindexed<C>(self, consumer: C) -> C::Result
    where
        C: UnindexedConsumer<Self::Item>,
    {
        bridge_unindexed(self.0, consumer)
    }
}
