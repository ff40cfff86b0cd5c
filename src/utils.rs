use itertools::Itertools;

use crate::error::{InvalidArgument, Result};

/// Tolerance below which a scalar is treated as zero while stepping.
pub const ZERO_EPSILON: f64 = 1e-8;

/// Tolerance used to compare colinearity factors.
///
/// Looser than [`ZERO_EPSILON`] as the factors are ratios of two
/// already approximate quantities.
pub const COLINEAR_EPSILON: f64 = 1e-5;

/// Numeric tolerances used by a traversal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerance {
    /// Is-this-scalar-zero tolerance, used by the evaluators.
    pub zero: f64,
    /// Colinearity tolerance, used only to decide whether a split is
    /// safe.
    pub colinear: f64,
}

impl Default for Tolerance {
    fn default() -> Self {
        Tolerance {
            zero: ZERO_EPSILON,
            colinear: COLINEAR_EPSILON,
        }
    }
}

impl Tolerance {
    /// Create a tolerance, checking both values are finite and
    /// non-negative.
    pub fn new(zero: f64, colinear: f64) -> Result<Self> {
        let tol = Tolerance { zero, colinear };
        tol.validate()?;
        Ok(tol)
    }

    pub(crate) fn validate(&self) -> Result<()> {
        let valid = |eps: f64| eps.is_finite() && eps >= 0.;
        if valid(self.zero) && valid(self.colinear) {
            Ok(())
        } else {
            Err(InvalidArgument::InvalidTolerance)
        }
    }
}

/// Checks if `x` is within `eps` of zero. `NaN` is never near zero.
#[inline]
pub fn is_near_zero(x: f64, eps: f64) -> bool {
    x.abs() <= eps
}

/// The next integer strictly beyond `c` in the direction of travel.
///
/// If `c` is already within `eps` of an integer, that integer is
/// considered visited and the one after it is returned.
#[inline]
pub fn next_boundary(c: f64, forward: bool, eps: f64) -> f64 {
    let r = c.round();
    if is_near_zero(c - r, eps) {
        if forward {
            r + 1.
        } else {
            r - 1.
        }
    } else if forward {
        c.ceil()
    } else {
        c.floor()
    }
}

/// Magnitude (2^53) from which consecutive integers are no longer all
/// representable.
const EXACT_INTEGER_LIMIT: f64 = 9_007_199_254_740_992.;

/// Checks if every integer between zero and `x` is representable, so
/// that boundaries around `x` are one unit apart. `false` for `NaN`.
#[inline]
pub fn within_exact_integers(x: f64) -> bool {
    x.abs() < EXACT_INTEGER_LIMIT
}

/// The boundary `step` units after `b`, or `None` if `b + step` rounds
/// back to `b`.
#[inline]
pub fn step_boundary(b: f64, step: f64) -> Option<f64> {
    let next = b + step;
    if next == b {
        None
    } else {
        Some(next)
    }
}

/// The last integer strictly before `c` in the direction of travel;
/// the mirror of [`next_boundary`].
#[inline]
pub fn last_boundary_before(c: f64, forward: bool, eps: f64) -> f64 {
    next_boundary(c, !forward, eps)
}

/// Solve for the scalar `k` such that `a = k * b`.
///
/// Dimensions where both components are near zero are ignored. Returns
/// `None` if any component is non-finite, if `b` is (near) zero, or if
/// the per-dimension ratios disagree by more than `eps`.
///
/// # Panics
///
/// If `a` and `b` have different lengths.
pub fn colinearity_factor(a: &[f64], b: &[f64], eps: f64) -> Option<f64> {
    let mut factor: Option<f64> = None;
    for (&x, &y) in a.iter().zip_eq(b) {
        if !x.is_finite() || !y.is_finite() {
            return None;
        }
        if is_near_zero(y, ZERO_EPSILON) {
            if is_near_zero(x, ZERO_EPSILON) {
                continue;
            }
            return None;
        }
        let k = x / y;
        match factor {
            None => factor = Some(k),
            Some(f) if is_near_zero(f - k, eps) => {}
            Some(_) => return None,
        }
    }
    factor
}
