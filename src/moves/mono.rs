use log::{debug, trace};

use super::Splittable;
use crate::{
    utils::{last_boundary_before, next_boundary, within_exact_integers},
    GridPoint,
};

/// Evaluator for a segment that moves along a single dimension.
///
/// Every crossing lies on an integer value of the moving `axis`; the
/// other ordinates stay at those of the segment start.
#[derive(Debug, Clone)]
pub struct MonoMove {
    origin: GridPoint,
    axis: usize,
    forward: bool,
    /// Position on `axis` of the last point emitted (or of the start).
    cursor: f64,
    /// Position on `axis` at which this move stops.
    target: f64,
    /// Point to emit at `target`; `None` if `target` is a boundary
    /// created by a split.
    last: Option<GridPoint>,
    done: bool,
    eps: f64,
}

impl MonoMove {
    /// Create an evaluator for the segment from `start` to `end`, moving
    /// along `axis` by `delta`.
    ///
    /// The end point is emitted as is, so that input vertices are
    /// reproduced exactly.
    pub fn new(axis: usize, start: GridPoint, end: GridPoint, delta: f64, eps: f64) -> Self {
        debug_assert!(delta.is_finite() && delta != 0.);
        let cursor = start[axis];
        MonoMove {
            axis,
            forward: delta > 0.,
            cursor,
            target: cursor + delta,
            last: Some(end),
            origin: start,
            done: false,
            eps,
        }
    }

    fn point_at(&self, value: f64) -> GridPoint {
        let mut pt = self.origin.clone();
        pt[self.axis] = value;
        pt
    }

    /// Checks if `value` is at or past the target (within tolerance).
    #[inline]
    fn reaches_target(&self, value: f64) -> bool {
        if self.forward {
            value >= self.target - self.eps
        } else {
            value <= self.target + self.eps
        }
    }

    /// Number of integer boundaries strictly between the cursor and the
    /// target.
    ///
    /// Moves reaching beyond 2^53 report none, and so are never split.
    pub fn remaining_boundaries(&self) -> usize {
        if self.done
            || !within_exact_integers(self.cursor)
            || !within_exact_integers(self.target)
        {
            return 0;
        }
        let first = next_boundary(self.cursor, self.forward, self.eps);
        if self.reaches_target(first) {
            return 0;
        }
        let last = last_boundary_before(self.target, self.forward, self.eps);
        ((last - first).abs() + 1.) as usize
    }
}

impl Splittable for MonoMove {
    fn advance(&mut self) -> Option<GridPoint> {
        if self.done {
            return None;
        }
        let next = next_boundary(self.cursor, self.forward, self.eps);
        // Past 2^53 the next boundary may round back onto the cursor.
        let stalled = next == self.cursor;
        let pt = if stalled || self.reaches_target(next) {
            self.done = true;
            self.cursor = self.target;
            match self.last.take() {
                Some(end) => end,
                None => self.point_at(self.target),
            }
        } else {
            self.cursor = next;
            self.point_at(next)
        };
        trace!("mono move: axis {axis} at {pos}", axis = self.axis, pos = self.cursor);
        Some(pt)
    }

    fn try_split(&mut self) -> Option<Self> {
        let count = self.remaining_boundaries();
        if count == 0 {
            return None;
        }
        let step = if self.forward { 1. } else { -1. };
        let first = next_boundary(self.cursor, self.forward, self.eps);
        let half = (count + 1) / 2;
        let mid = first + step * (half - 1) as f64;
        debug!(
            "mono move: split {count} boundaries at {mid} on axis {axis}",
            axis = self.axis
        );

        let prefix = MonoMove {
            origin: self.origin.clone(),
            target: mid,
            last: None,
            ..*self
        };
        self.cursor = mid;
        Some(prefix)
    }
}
