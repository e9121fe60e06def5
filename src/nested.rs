//! Nested (balanced) storm builder.
//!
//! Turns a duration–depth ratio table ("the wettest D hours hold r(D) of the
//! day's rain") into a 24-hour cumulative temporal distribution.
//!
//! Each duration D on a 0.1-hour grid is placed as a window centred on hour
//! 12, so the curve satisfies
//!
//!   F(12 + D/2) = 0.5 + r(D)/2
//!   F(12 - D/2) = 0.5 - r(D)/2
//!
//! This assumes the storm is symmetric about its 12-hour peak. Published
//! regional curves are not exactly symmetric, so the result is a
//! preliminary distribution, not the authoritative temporal table.
//!
//! Assignments are collected into a sparse map keyed by centi-hours (every
//! window edge is a multiple of 0.05 h), anchored at 0, 12 and 24 h, and then
//! resampled linearly onto the 0.1-hour grid. A half-window falling outside
//! [0, 24] is simply not assigned; the resample fills the gap.

use std::collections::BTreeMap;

use crate::interpolate::linear;
use crate::model::{ControlPoint, STEPS_PER_HOUR, STORM_SAMPLES, grid_hours, round_to};

/// Peak position of the balanced storm, in centi-hours.
const CENTER_CENTI: i64 = 1200;
const END_CENTI: i64 = 2400;

/// Full-resolution output of the builder: 241 points at 0.1-hour spacing.
#[derive(Debug, Clone, PartialEq)]
pub struct NestedCurve {
    pub points: Vec<ControlPoint>,
}

impl NestedCurve {
    /// Half-hour subset (0.0, 0.5, … 24.0) used as registry control points.
    pub fn half_hourly(&self) -> Vec<ControlPoint> {
        self.every(STEPS_PER_HOUR / 2)
    }

    /// Every `stride`-th point, always ending on 24.0.
    pub fn every(&self, stride: usize) -> Vec<ControlPoint> {
        let stride = stride.max(1);
        let mut out: Vec<ControlPoint> = self.points.iter().step_by(stride).copied().collect();
        if let Some(last) = self.points.last() {
            if out.last().map(|p| p.hours) != Some(last.hours) {
                out.push(*last);
            }
        }
        out
    }

    /// Fraction at `hours`, linearly interpolated between grid points.
    pub fn fraction_at(&self, hours: f64) -> f64 {
        let xs: Vec<f64> = self.points.iter().map(|p| p.hours).collect();
        let ys: Vec<f64> = self.points.iter().map(|p| p.fraction).collect();
        linear(&xs, &ys, hours)
    }
}

/// Builds the balanced 24-hour distribution for a duration–ratio table.
///
/// `ratios` holds (duration hours, ratio of 24-hour depth) pairs in any
/// order; an implicit (0, 0) anchor is added. Ratios are clamped into
/// [0, 1] after interpolation.
pub fn build_nested(ratios: &[(f64, f64)]) -> NestedCurve {
    let mut table: Vec<(f64, f64)> = ratios.to_vec();
    table.push((0.0, 0.0));
    table.sort_by(|a, b| a.0.total_cmp(&b.0));
    table.dedup_by(|a, b| a.0 == b.0);
    let known_x: Vec<f64> = table.iter().map(|(d, _)| *d).collect();
    let known_y: Vec<f64> = table.iter().map(|(_, r)| *r).collect();

    let mut sparse: BTreeMap<i64, f64> = BTreeMap::new();
    for k in 1..STORM_SAMPLES {
        let duration = grid_hours(k);
        let ratio = linear(&known_x, &known_y, duration).clamp(0.0, 1.0);
        // D = k/10 h, so D/2 = 5k centi-hours.
        let half = 5 * k as i64;

        let end = CENTER_CENTI + half;
        if end <= END_CENTI {
            sparse.insert(end, 0.5 + ratio / 2.0);
        }
        let start = CENTER_CENTI - half;
        if start >= 0 {
            sparse.insert(start, 0.5 - ratio / 2.0);
        }
    }
    sparse.insert(0, 0.0);
    sparse.insert(CENTER_CENTI, 0.5);
    sparse.insert(END_CENTI, 1.0);

    let times: Vec<f64> = sparse.keys().map(|c| *c as f64 / 100.0).collect();
    let fractions: Vec<f64> = sparse.values().copied().collect();

    let points = (0..STORM_SAMPLES)
        .map(|i| {
            let t = grid_hours(i);
            ControlPoint::new(t, round_to(linear(&times, &fractions, t), 4))
        })
        .collect();

    NestedCurve { points }
}
