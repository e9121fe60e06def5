//! Core data types for the design-storm hyetograph service.
//!
//! This module defines the shared domain model imported by all other modules.
//! It contains no logic beyond small accessors, no I/O, and no external
//! dependencies apart from chrono/serde derives.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Grid constants
// ---------------------------------------------------------------------------

/// Output resolution in hours (6 minutes).
pub const STEP_HOURS: f64 = 0.1;

/// Length of the storm itself, in hours.
pub const STORM_HOURS: f64 = 24.0;

/// Length of the reported series: the storm plus a 24-hour dry tail.
pub const SERIES_HOURS: f64 = 48.0;

/// Steps per hour at the output resolution.
pub const STEPS_PER_HOUR: usize = 10;

/// Number of 0.1-hour samples from 0.0 to 24.0 inclusive.
pub const STORM_SAMPLES: usize = 24 * STEPS_PER_HOUR + 1;

/// Number of 0.1-hour samples from 0.0 to 48.0 inclusive.
pub const SERIES_SAMPLES: usize = 48 * STEPS_PER_HOUR + 1;

/// Fixed inch → millimetre factor.
pub const MM_PER_INCH: f64 = 25.4;

/// Elapsed hours for grid index `i`. Computed by division so that
/// whole-hour indices land on exact values (240 → 24.0).
pub fn grid_hours(i: usize) -> f64 {
    i as f64 / STEPS_PER_HOUR as f64
}

/// Rounds `value` to `decimals` places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}

// ---------------------------------------------------------------------------
// Distribution types
// ---------------------------------------------------------------------------

/// One (duration, cumulative fraction) pair on a temporal distribution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControlPoint {
    pub hours: f64,
    pub fraction: f64,
}

impl ControlPoint {
    pub const fn new(hours: f64, fraction: f64) -> Self {
        Self { hours, fraction }
    }
}

/// Where a registered family's control points came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FamilyOrigin {
    /// Literal published table (SCS synthetic storms).
    Legacy,
    /// Built from a regional duration–depth ratio table.
    Regional,
    /// Supplied by the user for a single generation call.
    Custom,
}

/// A named temporal distribution: cumulative fraction of the 24-hour depth
/// versus elapsed hours, sorted by hours.
///
/// Invariants (checked by `generator::validate_points`):
///   hours ∈ [0, 24], fraction ∈ [0, 1], fraction non-decreasing,
///   fraction(0) = 0, fraction(24) = 1.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistributionFamily {
    /// Short lookup key, e.g. `scs-ii`.
    pub key: String,
    /// Display label, e.g. `SCS Type II (Legacy/Standard)`.
    pub label: String,
    pub origin: FamilyOrigin,
    pub points: Vec<ControlPoint>,
}

/// Ratio of the most intense D-hour depth to the 24-hour depth.
///
/// This is NOT a temporal curve: `ratio(1.0) = 0.5` says half of the day's
/// rain falls inside the wettest hour, not that half has fallen by hour one.
#[derive(Debug, Clone, Copy)]
pub struct DepthRatioTable {
    pub region: &'static str,
    /// (duration hours, ratio), ascending in duration.
    pub ratios: &'static [(f64, f64)],
}

// ---------------------------------------------------------------------------
// Hyetograph types
// ---------------------------------------------------------------------------

/// One 6-minute step of a generated hyetograph.
///
/// `date`/`time` come from a fixed display anchor and carry no meaning.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HyetographRow {
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub hours: f64,
    pub fraction: f64,
    pub incremental_in: f64,
    pub cumulative_in: f64,
    pub incremental_mm: f64,
    pub cumulative_mm: f64,
}

/// A generated 48-hour hyetograph (481 rows at 0.1-hour spacing).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Hyetograph {
    pub distribution: String,
    pub total_depth_in: f64,
    pub rows: Vec<HyetographRow>,
}

impl Hyetograph {
    /// Cumulative depth at the last step.
    pub fn total(&self) -> f64 {
        self.rows.last().map(|r| r.cumulative_in).unwrap_or(0.0)
    }

    /// The step with the largest incremental depth, as (hours, depth).
    /// Ties resolve to the earliest step. `None` for an empty series.
    pub fn peak(&self) -> Option<(f64, f64)> {
        let mut best: Option<&HyetographRow> = None;
        for row in &self.rows {
            match best {
                Some(b) if row.incremental_in <= b.incremental_in => {}
                _ => best = Some(row),
            }
        }
        best.map(|r| (r.hours, r.incremental_in))
    }

    /// Row at exactly `hours` on the 0.1-hour grid.
    pub fn at_hours(&self, hours: f64) -> Option<&HyetographRow> {
        let idx = (hours * STEPS_PER_HOUR as f64).round();
        if idx < 0.0 {
            return None;
        }
        self.rows.get(idx as usize)
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors raised by the distribution and generation core.
///
/// All of them abort the single call that raised them; no partial
/// hyetograph is ever returned.
#[derive(Debug, Clone, PartialEq)]
pub enum StormError {
    /// The requested family is not registered and no custom points were given.
    UnknownDistribution(String),
    /// Control points break a range or monotonicity invariant.
    InvalidControlPoints(String),
    /// Fewer than two distinct durations, or a negative/non-finite depth.
    DegenerateInput(String),
}

impl std::fmt::Display for StormError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StormError::UnknownDistribution(name) => write!(f, "Unknown distribution: {}", name),
            StormError::InvalidControlPoints(msg) => write!(f, "Invalid control points: {}", msg),
            StormError::DegenerateInput(msg) => write!(f, "Degenerate input: {}", msg),
        }
    }
}

impl std::error::Error for StormError {}
