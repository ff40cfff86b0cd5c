#![allow(dead_code)]

use std::f64::consts::PI;

use geo::{Coordinate, LineString};

use rand::Rng;
use rand_distr::{Distribution, Normal, Standard};
use smallvec::SmallVec;

/// A point with `dimension` ordinates, each uniform in `[0, extent)`.
#[inline]
pub fn uniform_grid_point<R: Rng>(rng: &mut R, dimension: usize, extent: f64) -> SmallVec<[f64; 4]> {
    (0..dimension)
        .map(|_| rng.sample::<f64, _>(Standard) * extent)
        .collect()
}

/// A 2-d random walk with `steps` segments of normally distributed
/// length (mean `step_len`).
pub fn random_walk<R: Rng>(mut rng: R, steps: usize, step_len: f64) -> LineString<f64> {
    let len_distr = Normal::new(step_len, step_len / 4.).unwrap();
    let mut curr = Coordinate { x: 0., y: 0. };
    let mut coords = Vec::with_capacity(steps + 1);
    coords.push(curr);
    for _ in 0..steps {
        let angle = rng.sample::<f64, _>(Standard) * 2. * PI;
        let len = len_distr.sample(&mut rng).abs();
        curr = curr + Coordinate { x: len * angle.cos(), y: len * angle.sin() };
        coords.push(curr);
    }
    LineString(coords)
}

/// A `dimension`-d random polyline with `num_points` vertices inside
/// `[0, extent)^dimension`, as a flat buffer.
pub fn uniform_flat_polyline<R: Rng>(rng: &mut R, num_points: usize, dimension: usize, extent: f64) -> Vec<f64> {
    (0..num_points)
        .flat_map(|_| uniform_grid_point(rng, dimension, extent))
        .collect()
}

/// A fixed set of pre-generated inputs, cycled through by benches.
pub struct Samples<T>(Vec<T>);

impl<T> Samples<T> {
    pub fn from_fn<F: FnMut() -> T>(size: usize, mut proc: F) -> Self {
        Self((0..size).map(|_| proc()).collect())
    }

    pub fn sampler<'a>(&'a self) -> impl FnMut() -> &'a T {
        let mut curr = 0;
        move || {
            let idx = curr;
            curr = (curr + 1) % self.0.len();
            &self.0[idx]
        }
    }
}
