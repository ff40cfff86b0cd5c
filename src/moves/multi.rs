use log::{debug, trace};
use smallvec::SmallVec;

use super::Splittable;
use crate::{
    utils::{
        colinearity_factor, is_near_zero, next_boundary, step_boundary, within_exact_integers,
        Tolerance,
    },
    GridPoint,
};

/// The next grid-line crossing along one dimension.
#[derive(Debug, Clone, Copy)]
struct Crossing {
    dim: usize,
    step: f64,
    /// Integer value of the boundary.
    boundary: f64,
    /// Parametric position of `boundary` along the segment; infinite
    /// once the dimension has no representable boundary left.
    t: f64,
}

type Crossings = SmallVec<[Crossing; 4]>;

/// Evaluator for a segment that moves along two or more dimensions.
///
/// Merges the per-dimension streams of boundary crossings by their
/// parametric position `t`, collapsing crossings of different
/// dimensions closer than the zero tolerance into a single point (eg.
/// when passing through a grid vertex).
#[derive(Debug, Clone)]
pub struct MultiMove {
    start: GridPoint,
    delta: GridPoint,
    crossings: Crossings,
    /// Parametric position of the last point emitted.
    t_lo: f64,
    /// Parametric position at which this move stops.
    t_hi: f64,
    /// Point to emit at `t_hi`; `None` for the prefix of a split.
    last: Option<GridPoint>,
    done: bool,
    /// The zero tolerance, measured along `t`.
    eps: f64,
    tol: Tolerance,
}

/// Zero tolerance along `t` for a move by `delta`.
///
/// The coordinate tolerance is scaled by the largest finite move, so
/// that consecutive boundaries of one dimension are never within it.
/// It is kept above a few ulps of `t`.
fn parametric_eps(delta: &[f64], eps: f64) -> f64 {
    let extent = delta
        .iter()
        .filter(|d| d.is_finite())
        .fold(0., |m: f64, d| m.max(d.abs()));
    if extent > 0. {
        (eps / extent).max(4. * f64::EPSILON)
    } else {
        eps
    }
}

impl MultiMove {
    /// Create an evaluator for the segment from `start` to `end`.
    pub fn new(start: GridPoint, end: GridPoint, tol: Tolerance) -> Self {
        let delta: GridPoint = end.iter().zip(&start).map(|(e, s)| e - s).collect();
        let eps = parametric_eps(&delta, tol.zero);
        let crossings = crossings_after(&start, &delta, 0., tol.zero, eps);
        MultiMove {
            start,
            delta,
            crossings,
            t_lo: 0.,
            t_hi: 1.,
            last: Some(end),
            done: false,
            eps,
            tol,
        }
    }

    /// Linear interpolation of the segment at `t`.
    fn interpolate(&self, t: f64) -> GridPoint {
        self.start
            .iter()
            .zip(&self.delta)
            .map(|(s, d)| s + t * d)
            .collect()
    }

    #[inline]
    fn t_of(&self, dim: usize, boundary: f64) -> f64 {
        (boundary - self.start[dim]) / self.delta[dim]
    }

    /// Checks if the boundaries of every moving dimension are one unit
    /// apart over the whole segment.
    fn has_unit_boundaries(&self) -> bool {
        self.crossings.iter().all(|c| {
            let s = self.start[c.dim];
            within_exact_integers(s) && within_exact_integers(s + self.delta[c.dim])
        })
    }

    /// Position and boundary of the split point, if there is one.
    ///
    /// The split is placed at the median remaining boundary of the
    /// dimension with the largest move.
    fn split_boundary(&self) -> Option<(usize, f64, f64)> {
        if !self.has_unit_boundaries() {
            return None;
        }
        let dominant = self.crossings.iter().max_by(|a, b| {
            let da = self.delta[a.dim].abs();
            let db = self.delta[b.dim].abs();
            da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
        })?;
        let Crossing { dim, step, boundary, t } = *dominant;
        if !t.is_finite() {
            return None;
        }

        // Last boundary strictly before the stop.
        let stop = self.start[dim] + self.t_hi * self.delta[dim];
        let mut last = next_boundary(stop, step < 0., 0.);
        while self.t_of(dim, last) >= self.t_hi - self.eps {
            last -= step;
        }
        if (last - boundary) * step < 0. {
            return None;
        }
        let count = ((last - boundary) * step) as usize + 1;
        let mid = boundary + step * ((count + 1) / 2 - 1) as f64;
        Some((dim, mid, self.t_of(dim, mid)))
    }
}

/// The first crossing of every moving dimension after `t_lo`.
///
/// Dimensions with a non-finite or (near) `zero` move are skipped, as
/// are those with no representable boundary after `t_lo`. Boundaries
/// within `eps` of `t_lo` count as already crossed.
fn crossings_after(start: &[f64], delta: &[f64], t_lo: f64, zero: f64, eps: f64) -> Crossings {
    delta
        .iter()
        .enumerate()
        .filter(|&(_, &d)| d.is_finite() && !is_near_zero(d, zero))
        .filter_map(|(dim, &d)| {
            let step = d.signum();
            let t_of = |b: f64| (b - start[dim]) / d;

            // Correct the rounding of the first guess in either direction.
            let mut boundary = next_boundary(start[dim] + t_lo * d, d > 0., 0.);
            while t_of(boundary) <= t_lo + eps {
                boundary = step_boundary(boundary, step)?;
            }
            while let Some(prev) = step_boundary(boundary, -step).filter(|&b| t_of(b) > t_lo + eps) {
                boundary = prev;
            }
            Some(Crossing {
                dim,
                step,
                boundary,
                t: t_of(boundary),
            })
        })
        .collect()
}

impl Splittable for MultiMove {
    fn advance(&mut self) -> Option<GridPoint> {
        if self.done {
            return None;
        }
        let eps = self.eps;
        let lead = self
            .crossings
            .iter()
            .map(|c| c.t)
            .fold(f64::INFINITY, f64::min);

        if lead >= self.t_hi - eps && self.last.is_some() {
            self.done = true;
            self.t_lo = self.t_hi;
            return self.last.take();
        }
        if lead > self.t_hi + eps {
            self.done = true;
            return None;
        }

        // Every dimension crossing at `lead` moves on by one boundary.
        let mut pt = self.interpolate(lead);
        let (start, delta) = (&self.start, &self.delta);
        for c in self.crossings.iter_mut().filter(|c| c.t <= lead + eps) {
            pt[c.dim] = c.boundary;
            match step_boundary(c.boundary, c.step) {
                Some(b) => {
                    c.boundary = b;
                    c.t = (b - start[c.dim]) / delta[c.dim];
                }
                None => c.t = f64::INFINITY,
            }
        }
        self.t_lo = lead;
        trace!("multi move: t = {lead}: {pt:?}");
        Some(pt)
    }

    fn try_split(&mut self) -> Option<Self> {
        if self.done {
            return None;
        }
        let (dim, mid, t_mid) = self.split_boundary()?;

        // Only split if the split point lies along the move.
        let mut split_pt = self.interpolate(t_mid);
        split_pt[dim] = mid;
        let offset: GridPoint = split_pt
            .iter()
            .zip(&self.start)
            .map(|(p, s)| p - s)
            .collect();
        match colinearity_factor(&offset, &self.delta, self.tol.colinear) {
            Some(k) if k > self.t_lo && k < self.t_hi => {}
            _ => {
                debug!("multi move: declined split at t = {t_mid}: not colinear");
                return None;
            }
        }
        debug!("multi move: split at t = {t_mid} (boundary {mid} on axis {dim})");

        let prefix = MultiMove {
            start: self.start.clone(),
            delta: self.delta.clone(),
            crossings: self.crossings.clone(),
            t_hi: t_mid,
            last: None,
            ..*self
        };
        self.t_lo = t_mid;
        self.crossings = crossings_after(&self.start, &self.delta, t_mid, self.tol.zero, self.eps);
        Some(prefix)
    }
}
