use std::mem;

use log::{debug, trace};

use crate::{
    moves::{MonoMove, MultiMove, Splittable},
    utils::{is_near_zero, Tolerance},
    GridPoint, PointSource,
};

mod par;
pub use par::ParTraversal;

/// Position of a [`Traversal`] within its polyline.
///
/// The index is that of the segment `(point[i], point[i + 1])`
/// currently being processed.
#[derive(Debug, Clone)]
enum State {
    /// At segment `i`, no evaluator prepared.
    Ready(usize),
    /// Evaluating axis-aligned segment `i`.
    Mono(usize, MonoMove),
    /// Evaluating general segment `i`.
    Multi(usize, MultiMove),
    Done,
}

/// Lazy, splittable producer of the grid crossings of a polyline.
///
/// Yields, segment by segment, every point at which the polyline
/// crosses an integer grid line, followed by the segment end. The first
/// point of the polyline is not yielded. Zero-length segments yield
/// nothing.
///
/// Implements [`Iterator`] for sequential consumption, and
/// [`Splittable`] (and [`UnindexedProducer`]) for parallel consumption.
///
/// [`UnindexedProducer`]: rayon::iter::plumbing::UnindexedProducer
#[derive(Debug, Clone)]
pub struct Traversal {
    source: PointSource,
    tol: Tolerance,
    /// Index of the segment at which this producer stops (exclusive).
    end: usize,
    state: State,
}

/// Outcome of a single transition.
enum Step {
    Emit(GridPoint),
    Continue,
}

impl Traversal {
    /// Create a traversal over all segments of `source`.
    pub fn new(source: PointSource, tol: Tolerance) -> Self {
        let end = source.len().saturating_sub(1);
        let state = if end == 0 {
            State::Done
        } else {
            State::Ready(0)
        };
        Traversal {
            source,
            tol,
            end,
            state,
        }
    }

    /// The underlying point source.
    pub fn source(&self) -> &PointSource {
        &self.source
    }

    /// Index of the current segment, or `None` if exhausted.
    fn cursor(&self) -> Option<usize> {
        match self.state {
            State::Ready(i) | State::Mono(i, _) | State::Multi(i, _) => Some(i),
            State::Done => None,
        }
    }

    /// Number of segments not yet completely processed.
    pub fn remaining_segments(&self) -> usize {
        self.cursor().map_or(0, |i| self.end - i)
    }

    /// State following the completion of segment `idx`.
    #[inline]
    fn after(&self, idx: usize) -> State {
        if idx + 1 >= self.end {
            State::Done
        } else {
            State::Ready(idx + 1)
        }
    }

    /// Prepare the evaluator for segment `idx`, skipping it if it has
    /// zero length.
    fn prepare(&self, idx: usize) -> State {
        let eps = self.tol.zero;
        let delta = self.source.direction(idx);

        // Non-finite components always count as moving.
        let mut moving = delta
            .iter()
            .enumerate()
            .filter(|&(_, &d)| !is_near_zero(d, eps));
        let state = match (moving.next(), moving.next()) {
            (None, _) => {
                debug!("skipping zero-length segment {idx}");
                return self.after(idx);
            }
            (Some((axis, &d)), None) if d.is_finite() => State::Mono(
                idx,
                MonoMove::new(axis, self.source.get(idx), self.source.get(idx + 1), d, eps),
            ),
            _ => State::Multi(
                idx,
                MultiMove::new(self.source.get(idx), self.source.get(idx + 1), self.tol),
            ),
        };
        trace!("segment {idx}: {state:?}");
        state
    }

    /// The transition function of the traversal state machine.
    fn transition(&self, state: State) -> (State, Step) {
        match state {
            State::Ready(idx) => (self.prepare(idx), Step::Continue),
            State::Mono(idx, mut mv) => match mv.advance() {
                Some(pt) => (State::Mono(idx, mv), Step::Emit(pt)),
                None => (self.after(idx), Step::Continue),
            },
            State::Multi(idx, mut mv) => match mv.advance() {
                Some(pt) => (State::Multi(idx, mv), Step::Emit(pt)),
                None => (self.after(idx), Step::Continue),
            },
            State::Done => (State::Done, Step::Continue),
        }
    }

    /// A producer over segments `[start, end)`, in `state`.
    fn with_state(&self, end: usize, state: State) -> Self {
        Traversal {
            source: self.source.clone(),
            tol: self.tol,
            end,
            state,
        }
    }
}

impl Splittable for Traversal {
    fn advance(&mut self) -> Option<GridPoint> {
        loop {
            if let State::Done = self.state {
                return None;
            }
            let state = mem::replace(&mut self.state, State::Done);
            let (state, step) = self.transition(state);
            self.state = state;
            if let Step::Emit(pt) = step {
                return Some(pt);
            }
        }
    }

    fn try_split(&mut self) -> Option<Self> {
        let idx = self.cursor()?;
        let span = self.end - idx;

        if span >= 2 {
            let mid = idx + span / 2;
            debug!("traversal: split segments [{idx}, {end}) at {mid}", end = self.end);
            let state = mem::replace(&mut self.state, State::Ready(mid));
            return Some(self.with_state(mid, state));
        }

        // A single segment in flight: delegate to its evaluator.
        if let State::Ready(idx) = self.state {
            self.state = self.prepare(idx);
        }
        let prefix = match &mut self.state {
            State::Mono(idx, mv) => State::Mono(*idx, mv.try_split()?),
            State::Multi(idx, mv) => State::Multi(*idx, mv.try_split()?),
            _ => return None,
        };
        Some(self.with_state(self.end, prefix))
    }
}

impl Iterator for Traversal {
    type Item = GridPoint;

    fn next(&mut self) -> Option<Self::Item> {
        self.advance()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use wkt::TryFromWkt;

    use geo::LineString;

    use super::*;
    use crate::moves::tests::{as_tuples, drain, drain_split};
    use crate::random::*;

    pub fn init_log() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn traversal<S: Into<PointSource>>(src: S) -> Traversal {
        Traversal::new(src.into(), Tolerance::default())
    }

    fn from_wkt(wkt: &str) -> Traversal {
        traversal(LineString::<f64>::try_from_wkt_str(wkt).unwrap())
    }

    #[test]
    fn test_vertical_scenario() {
        init_log();
        let tr = from_wkt("LINESTRING(0.2 1.0,0.2 4.0)");
        assert_eq!(
            as_tuples(&drain(tr)),
            vec![vec![0.2, 2.], vec![0.2, 3.], vec![0.2, 4.]]
        );
    }

    #[test]
    fn test_diagonal_scenario() {
        init_log();
        let tr = from_wkt("LINESTRING(0 0,2 1)");
        assert_eq!(as_tuples(&drain(tr)), vec![vec![1., 0.5], vec![2., 1.]]);
    }

    #[test]
    fn test_repeated_point() {
        init_log();
        let with_repeat = drain(from_wkt("LINESTRING(0 0,0 0,3 0)"));
        let without = drain(from_wkt("LINESTRING(0 0,3 0)"));
        assert_eq!(with_repeat, without);
        assert_eq!(
            as_tuples(&without),
            vec![vec![1., 0.], vec![2., 0.], vec![3., 0.]]
        );

        // Trailing and interior repeats.
        let tr = from_wkt("LINESTRING(0 0,1.5 0,1.5 0,1.5 0,1.5 1.5,1.5 1.5)");
        assert_eq!(
            as_tuples(&drain(tr)),
            vec![
                vec![1., 0.],
                vec![1.5, 0.],
                vec![1.5, 1.],
                vec![1.5, 1.5]
            ]
        );
    }

    #[test]
    fn test_degenerate_sources() {
        let empty = PointSource::flat(Vec::<f64>::new(), 2).unwrap();
        assert_eq!(drain(traversal(empty)).len(), 0);

        let single = PointSource::flat(vec![0.5, 0.5, 0.5], 3).unwrap();
        let mut tr = traversal(single);
        assert_eq!(tr.remaining_segments(), 0);
        assert!(tr.try_split().is_none());
        assert!(tr.next().is_none());

        let still = from_wkt("LINESTRING(1 1,1 1,1 1)");
        assert_eq!(drain(still).len(), 0);
    }

    #[test]
    fn test_mixed_polyline() {
        let src = PointSource::flat(
            vec![
                0.5, 0.5, 0.5, //
                0.5, 2.5, 0.5, //
                2.5, 3.5, 0.5, //
                2.5, 3.5, 0.5, //
                2.5, 3.5, -1.,
            ],
            3,
        )
        .unwrap();
        let out = drain(traversal(src));
        assert_eq!(
            as_tuples(&out),
            vec![
                vec![0.5, 1., 0.5],
                vec![0.5, 2., 0.5],
                vec![0.5, 2.5, 0.5],
                vec![1., 2.75, 0.5],
                vec![1.5, 3., 0.5],
                vec![2., 3.25, 0.5],
                vec![2.5, 3.5, 0.5],
                vec![2.5, 3.5, 0.],
                vec![2.5, 3.5, -1.],
            ]
        );
    }

    #[test]
    fn test_vertices_preserved_in_order() {
        let ls = random_walk(rand::thread_rng(), 64, 3.);
        let src = PointSource::from(ls.clone());
        let out = drain(traversal(src));

        let mut vertices = ls.0.iter().skip(1).peekable();
        for pt in &out {
            if let Some(v) = vertices.peek() {
                if pt[0] == v.x && pt[1] == v.y {
                    vertices.next();
                }
            }
        }
        assert!(vertices.next().is_none(), "not all vertices were emitted in order");
    }

    #[test]
    fn test_crossing_completeness() {
        let ls = random_walk(rand::thread_rng(), 32, 5.);
        let out = drain(traversal(ls.clone()));

        // No grid line lies strictly between two consecutive points.
        let mut prev = vec![ls.0[0].x, ls.0[0].y];
        for pt in &out {
            for dim in 0..2 {
                let (a, b) = (prev[dim], pt[dim]);
                let (lo, hi) = if a < b { (a, b) } else { (b, a) };
                assert!(
                    lo.floor() + 1. >= hi - 1e-6,
                    "missing crossing between {:?} and {:?}",
                    prev,
                    pt
                );
            }
            prev = pt.to_vec();
        }
    }

    #[test]
    fn test_huge_coordinates_terminate() {
        init_log();
        let big = 2f64.powi(53);
        let src = PointSource::flat(vec![big, 0.5, big + 8., 0.5, big + 8., 3.5], 2).unwrap();
        let tr = traversal(src);

        let out: Vec<_> = tr.clone().take(50).collect();
        assert_eq!(
            as_tuples(&out),
            vec![
                vec![big + 8., 0.5],
                vec![big + 8., 1.],
                vec![big + 8., 2.],
                vec![big + 8., 3.],
                vec![big + 8., 3.5],
            ]
        );
        for depth in 1..4 {
            assert_eq!(drain_split(tr.clone(), depth), out);
        }
    }

    #[test]
    fn test_split_segments() {
        init_log();
        let src = PointSource::flat(
            vec![0.5, 0.5, 4.5, 0.5, 4.5, 4.5, 0.5, 4.5, 0.5, 0.5],
            2,
        )
        .unwrap();
        let mut tr = traversal(src);
        assert_eq!(tr.remaining_segments(), 4);

        let sequential = drain(tr.clone());
        let prefix = tr.try_split().unwrap();
        assert_eq!(prefix.remaining_segments(), 2);
        assert_eq!(tr.remaining_segments(), 2);

        let mut split = drain(prefix);
        split.extend(drain(tr));
        assert_eq!(split, sequential);
    }

    #[test]
    fn test_split_single_segment() {
        let mut tr = from_wkt("LINESTRING(0.5 0.5,8.5 0.5)");
        let sequential = drain(tr.clone());

        // Split before anything is prepared.
        let prefix = tr.try_split().unwrap();
        assert_eq!(prefix.remaining_segments(), 1);
        let mut split = drain(prefix);
        split.extend(drain(tr));
        assert_eq!(split, sequential);

        // Split in flight.
        let mut tr = from_wkt("LINESTRING(0.5 0.5,8.5 4.5)");
        let sequential = drain(tr.clone());
        let first = tr.next().unwrap();
        let prefix = tr.try_split().unwrap();
        let mut split = vec![first];
        split.extend(drain(prefix));
        split.extend(drain(tr));
        assert_eq!(split, sequential);
    }

    #[test]
    fn test_split_declined_falls_back() {
        let mut tr = from_wkt("LINESTRING(0.1 0.1,0.9 0.2)");
        assert!(tr.try_split().is_none());
        assert_eq!(as_tuples(&drain(tr)), vec![vec![0.9, 0.2]]);

        let mut tr = traversal(PointSource::flat(vec![0., 0., f64::NAN, 5.5], 2).unwrap());
        assert!(tr.try_split().is_none());
        let ys: Vec<_> = drain(tr).iter().map(|p| p[1]).collect();
        assert_eq!(ys, vec![1., 2., 3., 4., 5., 5.5]);
    }

    #[test]
    fn test_random_split_matches_sequential() {
        let mut rng = rand::thread_rng();
        for dim in 2..5 {
            let coords = uniform_flat_polyline(&mut rng, 16, dim, 24.);
            let tr = traversal(PointSource::flat(coords, dim).unwrap());
            let sequential = drain(tr.clone());
            for depth in 1..8 {
                assert_eq!(drain_split(tr.clone(), depth), sequential);
            }
        }
    }
}
