//! Interpolation primitives used by the nested builder and the generator.
//!
//! - `linear`: piecewise-linear lookup with flat extrapolation, used for
//!   duration–ratio tables and resampling scattered curves.
//! - `Pchip`: monotone piecewise cubic Hermite interpolant. Slopes follow
//!   Fritsch–Carlson with a weighted harmonic mean at interior knots and the
//!   three-point shape-preserving rule at the ends, so non-decreasing data
//!   yields a non-decreasing curve that never leaves the knot range.

// ---------------------------------------------------------------------------
// Linear
// ---------------------------------------------------------------------------

/// Piecewise-linear interpolation of `x` over knots `xs`/`ys`.
///
/// `xs` must be ascending and the same length as `ys`. Values outside the
/// knot range take the nearest end value. Returns 0.0 for empty input.
pub fn linear(xs: &[f64], ys: &[f64], x: f64) -> f64 {
    let n = xs.len().min(ys.len());
    if n == 0 {
        return 0.0;
    }
    if x <= xs[0] {
        return ys[0];
    }
    if x >= xs[n - 1] {
        return ys[n - 1];
    }
    // First knot strictly greater than x; x lies in [xs[k-1], xs[k]).
    let k = xs[..n].partition_point(|&v| v <= x);
    let (x0, x1) = (xs[k - 1], xs[k]);
    let (y0, y1) = (ys[k - 1], ys[k]);
    if x1 == x0 {
        return y1;
    }
    y0 + (y1 - y0) * (x - x0) / (x1 - x0)
}

// ---------------------------------------------------------------------------
// PCHIP
// ---------------------------------------------------------------------------

/// Monotone cubic Hermite interpolant through a set of knots.
#[derive(Debug, Clone)]
pub struct Pchip {
    xs: Vec<f64>,
    ys: Vec<f64>,
    slopes: Vec<f64>,
}

impl Pchip {
    /// Fits the interpolant. Returns `None` unless there are at least two
    /// knots with strictly increasing `xs`.
    pub fn new(xs: &[f64], ys: &[f64]) -> Option<Self> {
        let n = xs.len();
        if n < 2 || ys.len() != n {
            return None;
        }
        if xs.windows(2).any(|w| !(w[1] > w[0])) {
            return None;
        }

        let h: Vec<f64> = xs.windows(2).map(|w| w[1] - w[0]).collect();
        let delta: Vec<f64> = (0..n - 1).map(|k| (ys[k + 1] - ys[k]) / h[k]).collect();

        let mut slopes = vec![0.0; n];
        if n == 2 {
            slopes[0] = delta[0];
            slopes[1] = delta[0];
        } else {
            for k in 1..n - 1 {
                let (d0, d1) = (delta[k - 1], delta[k]);
                if d0 == 0.0 || d1 == 0.0 || d0.signum() != d1.signum() {
                    slopes[k] = 0.0;
                } else {
                    let w1 = 2.0 * h[k] + h[k - 1];
                    let w2 = h[k] + 2.0 * h[k - 1];
                    slopes[k] = (w1 + w2) / (w1 / d0 + w2 / d1);
                }
            }
            slopes[0] = end_slope(h[0], h[1], delta[0], delta[1]);
            slopes[n - 1] = end_slope(h[n - 2], h[n - 3], delta[n - 2], delta[n - 3]);
        }

        Some(Self {
            xs: xs.to_vec(),
            ys: ys.to_vec(),
            slopes,
        })
    }

    /// Evaluates the interpolant. Outside the knot range the end value is held.
    pub fn eval(&self, x: f64) -> f64 {
        let n = self.xs.len();
        if x <= self.xs[0] {
            return self.ys[0];
        }
        if x >= self.xs[n - 1] {
            return self.ys[n - 1];
        }
        let k = self.xs.partition_point(|&v| v <= x) - 1;
        let h = self.xs[k + 1] - self.xs[k];
        let t = (x - self.xs[k]) / h;
        let t2 = t * t;
        let t3 = t2 * t;

        let h00 = 2.0 * t3 - 3.0 * t2 + 1.0;
        let h10 = t3 - 2.0 * t2 + t;
        let h01 = -2.0 * t3 + 3.0 * t2;
        let h11 = t3 - t2;

        h00 * self.ys[k]
            + h10 * h * self.slopes[k]
            + h01 * self.ys[k + 1]
            + h11 * h * self.slopes[k + 1]
    }

    /// The fitted knot slopes, mainly for inspection in tests.
    pub fn slopes(&self) -> &[f64] {
        &self.slopes
    }
}

/// Three-point end slope, limited so the end interval cannot overshoot.
fn end_slope(h0: f64, h1: f64, d0: f64, d1: f64) -> f64 {
    let d = ((2.0 * h0 + h1) * d0 - h0 * d1) / (h0 + h1);
    if d.signum() != d0.signum() || d0 == 0.0 {
        0.0
    } else if d0.signum() != d1.signum() && d.abs() > 3.0 * d0.abs() {
        3.0 * d0
    } else {
        d
    }
}
