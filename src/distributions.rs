//! Distribution registry for the hyetograph service.
//!
//! Defines the canonical temporal distributions available for generation:
//! the legacy SCS synthetic 24-hour storms (literal published tables) and the
//! four NOAA Atlas 14 regional distributions (built from published
//! duration–depth ratios by `nested::build_nested`).
//!
//! The registry is built once with `DistributionRegistry::standard()` and is
//! immutable afterwards; share it by reference or `Arc` between callers.

use crate::logging::{self, Component};
use crate::model::{ControlPoint, DepthRatioTable, DistributionFamily, FamilyOrigin};
use crate::nested::build_nested;

// ---------------------------------------------------------------------------
// Family identifiers
// ---------------------------------------------------------------------------

/// Sentinel key for user-supplied control points.
pub const CUSTOM_KEY: &str = "custom";

/// Display label of the custom sentinel.
pub const CUSTOM_LABEL: &str = "Custom (Paste Table)";

/// Display labels of the regional families, in A–D order.
pub const REGION_A: &str = "NOAA Region A";
pub const REGION_B: &str = "NOAA Region B";
pub const REGION_C: &str = "NOAA Region C";
pub const REGION_D: &str = "NOAA Region D";

// ---------------------------------------------------------------------------
// Legacy SCS tables
// ---------------------------------------------------------------------------

/// A literal published temporal distribution.
pub struct LegacyTable {
    pub key: &'static str,
    pub label: &'static str,
    pub points: &'static [(f64, f64)],
}

/// SCS/NRCS synthetic 24-hour rainfall distributions (TR-55 / NEH 630 ch. 4),
/// cumulative fraction of the 24-hour depth at the tabulated hours.
pub static LEGACY_TABLES: &[LegacyTable] = &[
    LegacyTable {
        key: "scs-i",
        label: "SCS Type I (Legacy/Pacific)",
        points: &[
            (0.0, 0.0),
            (2.0, 0.035),
            (4.0, 0.076),
            (6.0, 0.125),
            (7.0, 0.156),
            (8.0, 0.194),
            (8.5, 0.219),
            (9.0, 0.254),
            (9.5, 0.303),
            (9.75, 0.362),
            (10.0, 0.515),
            (10.5, 0.583),
            (11.0, 0.624),
            (11.5, 0.654),
            (12.0, 0.682),
            (13.0, 0.727),
            (14.0, 0.767),
            (16.0, 0.830),
            (20.0, 0.926),
            (24.0, 1.0),
        ],
    },
    LegacyTable {
        key: "scs-ia",
        label: "SCS Type IA (Legacy/Pacific)",
        points: &[
            (0.0, 0.0),
            (2.0, 0.050),
            (4.0, 0.116),
            (6.0, 0.206),
            (7.0, 0.268),
            (7.5, 0.310),
            (8.0, 0.425),
            (8.5, 0.480),
            (9.0, 0.520),
            (9.5, 0.550),
            (10.0, 0.577),
            (10.5, 0.601),
            (11.0, 0.624),
            (11.5, 0.645),
            (12.0, 0.664),
            (13.0, 0.701),
            (14.0, 0.736),
            (16.0, 0.800),
            (20.0, 0.906),
            (24.0, 1.0),
        ],
    },
    LegacyTable {
        key: "scs-ii",
        label: "SCS Type II (Legacy/Standard)",
        points: &[
            (0.0, 0.0),
            (1.0, 0.011),
            (2.0, 0.022),
            (3.0, 0.035),
            (4.0, 0.048),
            (5.0, 0.063),
            (6.0, 0.080),
            (7.0, 0.098),
            (8.0, 0.120),
            (8.5, 0.133),
            (9.0, 0.147),
            (9.5, 0.163),
            (10.0, 0.181),
            (10.5, 0.204),
            (11.0, 0.235),
            (11.5, 0.283),
            (11.75, 0.357),
            (12.0, 0.663),
            (12.5, 0.735),
            (13.0, 0.772),
            (13.5, 0.799),
            (14.0, 0.820),
            (15.0, 0.854),
            (16.0, 0.880),
            (17.0, 0.903),
            (18.0, 0.922),
            (19.0, 0.938),
            (20.0, 0.952),
            (21.0, 0.965),
            (22.0, 0.976),
            (23.0, 0.988),
            (24.0, 1.0),
        ],
    },
    LegacyTable {
        key: "scs-iii",
        label: "SCS Type III (Legacy/Gulf)",
        points: &[
            (0.0, 0.0),
            (1.0, 0.010),
            (2.0, 0.020),
            (3.0, 0.031),
            (4.0, 0.043),
            (5.0, 0.057),
            (6.0, 0.072),
            (7.0, 0.089),
            (8.0, 0.115),
            (8.5, 0.130),
            (9.0, 0.148),
            (9.5, 0.167),
            (10.0, 0.189),
            (10.5, 0.216),
            (11.0, 0.250),
            (11.5, 0.298),
            (12.0, 0.500),
            (12.5, 0.702),
            (13.0, 0.751),
            (13.5, 0.784),
            (14.0, 0.811),
            (15.0, 0.854),
            (16.0, 0.886),
            (17.0, 0.910),
            (18.0, 0.928),
            (19.0, 0.943),
            (20.0, 0.957),
            (21.0, 0.969),
            (22.0, 0.981),
            (23.0, 0.991),
            (24.0, 1.0),
        ],
    },
];

// ---------------------------------------------------------------------------
// Regional duration–depth ratio tables
// ---------------------------------------------------------------------------

/// Mean ratio of D-hour depth to 24-hour depth for the four NOAA Atlas 14
/// rainfall distribution regions (NEH 630 ch. 4, fig. 4-72).
///
/// Durations: 5, 10, 15, 30 min; 1, 2, 3, 6, 12, 24 h.
pub static REGIONAL_RATIOS: &[DepthRatioTable] = &[
    DepthRatioTable {
        region: REGION_A,
        ratios: &[
            (0.0833, 0.143),
            (0.1667, 0.219),
            (0.25, 0.272),
            (0.5, 0.386),
            (1.0, 0.502),
            (2.0, 0.594),
            (3.0, 0.635),
            (6.0, 0.749),
            (12.0, 0.864),
            (24.0, 1.0),
        ],
    },
    DepthRatioTable {
        region: REGION_B,
        ratios: &[
            (0.0833, 0.121),
            (0.1667, 0.189),
            (0.25, 0.237),
            (0.5, 0.344),
            (1.0, 0.453),
            (2.0, 0.543),
            (3.0, 0.585),
            (6.0, 0.705),
            (12.0, 0.840),
            (24.0, 1.0),
        ],
    },
    DepthRatioTable {
        region: REGION_C,
        ratios: &[
            (0.0833, 0.105),
            (0.1667, 0.166),
            (0.25, 0.210),
            (0.5, 0.308),
            (1.0, 0.409),
            (2.0, 0.500),
            (3.0, 0.545),
            (6.0, 0.672),
            (12.0, 0.823),
            (24.0, 1.0),
        ],
    },
    DepthRatioTable {
        region: REGION_D,
        ratios: &[
            (0.0833, 0.094),
            (0.1667, 0.149),
            (0.25, 0.188),
            (0.5, 0.276),
            (1.0, 0.366),
            (2.0, 0.454),
            (3.0, 0.501),
            (6.0, 0.636),
            (12.0, 0.805),
            (24.0, 1.0),
        ],
    },
];

/// Lookup key for a regional label: "NOAA Region B" → "noaa-b".
fn regional_key(label: &str) -> String {
    let letter = label.rsplit(' ').next().unwrap_or(label);
    format!("noaa-{}", letter.to_ascii_lowercase())
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Immutable set of named distributions, in display order
/// (regional A–D first, then legacy I, IA, II, III).
#[derive(Debug, Clone)]
pub struct DistributionRegistry {
    families: Vec<DistributionFamily>,
}

impl DistributionRegistry {
    /// Builds the standard registry: regional families from the ratio tables
    /// (half-hour control points) followed by the legacy SCS tables.
    pub fn standard() -> Self {
        let mut families = Vec::with_capacity(REGIONAL_RATIOS.len() + LEGACY_TABLES.len());

        for table in REGIONAL_RATIOS {
            let curve = build_nested(table.ratios);
            families.push(DistributionFamily {
                key: regional_key(table.region),
                label: table.region.to_string(),
                origin: FamilyOrigin::Regional,
                points: curve.half_hourly(),
            });
        }

        for table in LEGACY_TABLES {
            families.push(DistributionFamily {
                key: table.key.to_string(),
                label: table.label.to_string(),
                origin: FamilyOrigin::Legacy,
                points: table
                    .points
                    .iter()
                    .map(|(h, f)| ControlPoint::new(*h, *f))
                    .collect(),
            });
        }

        logging::debug(
            Component::Registry,
            None,
            &format!("Built distribution registry with {} families", families.len()),
        );

        Self { families }
    }

    /// Builds a registry from explicit families, e.g. for tests or site-specific
    /// tables loaded elsewhere.
    pub fn from_families(families: Vec<DistributionFamily>) -> Self {
        Self { families }
    }

    /// Looks up a family by key or label, ignoring ASCII case and surrounding
    /// whitespace. Also accepts the label without its parenthesised suffix
    /// ("SCS Type II"). Returns `None` if not found.
    pub fn find(&self, name: &str) -> Option<&DistributionFamily> {
        let wanted = name.trim();
        self.families.iter().find(|f| {
            f.key.eq_ignore_ascii_case(wanted)
                || f.label.eq_ignore_ascii_case(wanted)
                || short_label(&f.label).eq_ignore_ascii_case(wanted)
        })
    }

    /// All registered families, in display order.
    pub fn families(&self) -> &[DistributionFamily] {
        &self.families
    }

    /// Display labels, in display order.
    pub fn names(&self) -> Vec<&str> {
        self.families.iter().map(|f| f.label.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.families.len()
    }

    pub fn is_empty(&self) -> bool {
        self.families.is_empty()
    }
}

/// Returns true if `name` refers to the custom sentinel.
pub fn is_custom_name(name: &str) -> bool {
    let wanted = name.trim();
    wanted.eq_ignore_ascii_case(CUSTOM_KEY)
        || wanted.eq_ignore_ascii_case(CUSTOM_LABEL)
        || wanted.eq_ignore_ascii_case(short_label(CUSTOM_LABEL))
}

/// "SCS Type II (Legacy/Standard)" → "SCS Type II".
fn short_label(label: &str) -> &str {
    match label.find(" (") {
        Some(idx) => &label[..idx],
        None => label,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
