//! Storm-type classification from the 60-minute / 24-hour depth ratio.
//!
//! Sites whose wettest hour carries a large share of the day's rain get the
//! peakier regional distribution. Buckets are half-open and checked in
//! ascending order, first match wins:
//!
//!   ratio < 0.30  → Type A (NOAA Region A)
//!   ratio < 0.35  → Type B (NOAA Region B)
//!   ratio < 0.40  → Type C (NOAA Region C)
//!   otherwise     → Type D (NOAA Region D)

use serde::Serialize;
use std::fmt;

use crate::distributions::{REGION_A, REGION_B, REGION_C, REGION_D};
use crate::ingest::atlas14::PrecipFrequencyTable;
use crate::logging::{self, Component};

/// Upper bounds (exclusive) of the A, B and C buckets.
pub const TYPE_A_BELOW: f64 = 0.30;
pub const TYPE_B_BELOW: f64 = 0.35;
pub const TYPE_C_BELOW: f64 = 0.40;

/// Storm type buckets, in ascending ratio order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StormType {
    A,
    B,
    C,
    D,
}

impl StormType {
    /// Registry label of the regional family recommended for this type.
    pub fn family(self) -> &'static str {
        match self {
            StormType::A => REGION_A,
            StormType::B => REGION_B,
            StormType::C => REGION_C,
            StormType::D => REGION_D,
        }
    }
}

impl fmt::Display for StormType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StormType::A => write!(f, "Type A"),
            StormType::B => write!(f, "Type B"),
            StormType::C => write!(f, "Type C"),
            StormType::D => write!(f, "Type D"),
        }
    }
}

/// Result of classifying one site.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Classification {
    pub depth_60min: f64,
    pub depth_24h: f64,
    pub ratio: f64,
    pub storm_type: StormType,
    pub family: &'static str,
}

/// 60-minute depth over 24-hour depth; 0.0 when the 24-hour depth is zero.
pub fn depth_ratio(depth_60min: f64, depth_24h: f64) -> f64 {
    if depth_24h == 0.0 {
        return 0.0;
    }
    depth_60min / depth_24h
}

/// Maps a ratio onto its storm type.
pub fn storm_type_for(ratio: f64) -> StormType {
    if ratio < TYPE_A_BELOW {
        StormType::A
    } else if ratio < TYPE_B_BELOW {
        StormType::B
    } else if ratio < TYPE_C_BELOW {
        StormType::C
    } else {
        StormType::D
    }
}

/// Classifies a site from its 60-minute and 24-hour depths.
pub fn classify(depth_60min: f64, depth_24h: f64) -> Classification {
    let ratio = depth_ratio(depth_60min, depth_24h);
    let storm_type = storm_type_for(ratio);
    logging::debug(
        Component::Classifier,
        None,
        &format!("60-min {:.3} / 24-hr {:.3} = {:.3} → {}", depth_60min, depth_24h, ratio, storm_type),
    );
    Classification {
        depth_60min,
        depth_24h,
        ratio,
        storm_type,
        family: storm_type.family(),
    }
}

/// Classifies a site from its frequency table at `return_period` years.
/// Missing entries count as 0.0.
pub fn recommend(table: &PrecipFrequencyTable, return_period: u32) -> Classification {
    let (d60, d24) = table.design_depths(return_period);
    classify(d60, d24)
}
