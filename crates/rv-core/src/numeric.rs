//! Scalar type and float comparison helpers.

use crate::error::{CoreError, CoreResult};

/// Floating point type used throughout the engine
pub type Real = f64;

/// Absolute/relative band for float comparisons.
#[derive(Clone, Copy, Debug)]
pub struct Tolerances {
    pub abs: Real,
    pub rel: Real,
}

impl Tolerances {
    pub const fn new(abs: Real, rel: Real) -> Self {
        Self { abs, rel }
    }

    /// Band for elapsed-time stamps handed in by the caller. Restart
    /// workflows replay the last step with sub-microsecond jitter; that
    /// is not a time reversal.
    pub const fn elapsed_time() -> Self {
        Self::new(1e-6, 1e-12)
    }
}

impl Default for Tolerances {
    fn default() -> Self {
        Self::new(1e-12, 1e-9)
    }
}

/// True when `a` and `b` agree within the wider of the absolute band and
/// the relative band scaled by the larger magnitude.
pub fn nearly_equal(a: Real, b: Real, tol: Tolerances) -> bool {
    let band = tol.abs.max(tol.rel * a.abs().max(b.abs()));
    (a - b).abs() <= band
}

/// Reject NaN/Inf at the engine boundary.
pub fn ensure_finite(v: Real, what: &'static str) -> CoreResult<Real> {
    if v.is_finite() {
        return Ok(v);
    }
    Err(CoreError::NonFinite { what, value: v })
}
