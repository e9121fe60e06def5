//! Hyetograph generation.
//!
//! `generate` turns a total 24-hour depth and a temporal distribution into a
//! 48-hour series at 6-minute resolution: 24 hours of storm fitted with a
//! monotone cubic through the distribution's control points, then 24 hours
//! of zero-rainfall tail. It is a pure function of its inputs and the
//! registry; every call returns a fresh `Hyetograph`.

use chrono::{Duration, NaiveDate, NaiveDateTime};

use crate::distributions::{CUSTOM_LABEL, DistributionRegistry, is_custom_name};
use crate::interpolate::Pchip;
use crate::logging::{self, Component};
use crate::model::{
    ControlPoint, Hyetograph, HyetographRow, MM_PER_INCH, SERIES_SAMPLES, STORM_HOURS, STORM_SAMPLES,
    StormError, grid_hours, round_to,
};

/// Decimal places for reported depths.
const DEPTH_DECIMALS: i32 = 6;

/// Tolerance for the (0, 0) and (24, 1) anchors on user points.
const ANCHOR_TOLERANCE: f64 = 1e-9;

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

/// Which temporal distribution to generate with.
#[derive(Debug, Clone, PartialEq)]
pub enum CurveSelection {
    /// A registered family, by key or label.
    Named(String),
    /// User-supplied control points, validated before use.
    Custom(Vec<ControlPoint>),
}

impl CurveSelection {
    /// Maps a (name, optional points) request onto a selection.
    ///
    /// Points are only used when the name is the custom sentinel; the
    /// sentinel without points stays `Named` and fails lookup.
    pub fn from_request(name: &str, custom: Option<Vec<ControlPoint>>) -> Self {
        match custom {
            Some(points) if is_custom_name(name) => CurveSelection::Custom(points),
            _ => CurveSelection::Named(name.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Sorts and checks control points against the distribution invariants.
///
/// - `DegenerateInput` if fewer than two distinct durations remain.
/// - `InvalidControlPoints` for non-finite values, hours outside [0, 24],
///   fractions outside [0, 1], repeated hours, a decreasing fraction, or
///   missing (0, 0) / (24, 1) anchors.
pub fn validate_points(points: &[ControlPoint]) -> Result<Vec<ControlPoint>, StormError> {
    if let Some(p) = points.iter().find(|p| !p.hours.is_finite() || !p.fraction.is_finite()) {
        return Err(StormError::InvalidControlPoints(format!(
            "non-finite point ({}, {})",
            p.hours, p.fraction
        )));
    }

    let mut sorted = points.to_vec();
    sorted.sort_by(|a, b| a.hours.total_cmp(&b.hours));

    let mut distinct = sorted.iter().map(|p| p.hours).collect::<Vec<_>>();
    distinct.dedup();
    if distinct.len() < 2 {
        return Err(StormError::DegenerateInput(format!(
            "need at least two distinct durations, got {}",
            distinct.len()
        )));
    }

    for p in &sorted {
        if !(0.0..=STORM_HOURS).contains(&p.hours) {
            return Err(StormError::InvalidControlPoints(format!(
                "duration {} h outside 0–24 h",
                p.hours
            )));
        }
        if !(0.0..=1.0).contains(&p.fraction) {
            return Err(StormError::InvalidControlPoints(format!(
                "fraction {} at {} h outside 0–1",
                p.fraction, p.hours
            )));
        }
    }

    for w in sorted.windows(2) {
        if w[1].hours == w[0].hours {
            return Err(StormError::InvalidControlPoints(format!(
                "duration {} h listed more than once",
                w[0].hours
            )));
        }
        if w[1].fraction < w[0].fraction {
            return Err(StormError::InvalidControlPoints(format!(
                "fraction decreases from {} at {} h to {} at {} h",
                w[0].fraction, w[0].hours, w[1].fraction, w[1].hours
            )));
        }
    }

    let first = sorted[0];
    let last = sorted[sorted.len() - 1];
    if first.hours.abs() > ANCHOR_TOLERANCE || first.fraction.abs() > ANCHOR_TOLERANCE {
        return Err(StormError::InvalidControlPoints(format!(
            "curve must start at (0, 0), starts at ({}, {})",
            first.hours, first.fraction
        )));
    }
    if (last.hours - STORM_HOURS).abs() > ANCHOR_TOLERANCE || (last.fraction - 1.0).abs() > ANCHOR_TOLERANCE {
        return Err(StormError::InvalidControlPoints(format!(
            "curve must end at (24, 1), ends at ({}, {})",
            last.hours, last.fraction
        )));
    }

    Ok(sorted)
}

// ---------------------------------------------------------------------------
// Generation
// ---------------------------------------------------------------------------

/// Display anchor for the synthetic calendar column: 2026-01-01 00:00.
pub fn display_start() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_default()
}

/// Samples the 0–48 h cumulative fraction curve (481 values) for validated,
/// sorted control points. Values past 24 h are held at 1.0.
pub fn fraction_curve(points: &[ControlPoint]) -> Result<Vec<f64>, StormError> {
    let xs: Vec<f64> = points.iter().map(|p| p.hours).collect();
    let ys: Vec<f64> = points.iter().map(|p| p.fraction).collect();
    let pchip = Pchip::new(&xs, &ys)
        .ok_or_else(|| StormError::DegenerateInput("control points do not span a range".to_string()))?;

    let mut fractions = Vec::with_capacity(SERIES_SAMPLES);
    for i in 0..SERIES_SAMPLES {
        let f = if i < STORM_SAMPLES - 1 {
            pchip.eval(grid_hours(i)).clamp(0.0, 1.0)
        } else {
            1.0
        };
        fractions.push(f);
    }
    fractions[0] = 0.0;
    Ok(fractions)
}

/// Generates the 48-hour hyetograph for `total_depth` inches.
///
/// Fails with `DegenerateInput` for a negative or non-finite depth,
/// `UnknownDistribution` when a named family is not registered, and
/// `InvalidControlPoints`/`DegenerateInput` when custom points are unusable.
pub fn generate(
    registry: &DistributionRegistry,
    total_depth: f64,
    selection: &CurveSelection,
) -> Result<Hyetograph, StormError> {
    if !total_depth.is_finite() || total_depth < 0.0 {
        return Err(StormError::DegenerateInput(format!(
            "total depth must be a finite value ≥ 0, got {}",
            total_depth
        )));
    }

    let (label, points) = match selection {
        CurveSelection::Named(name) => {
            let family = registry
                .find(name)
                .ok_or_else(|| StormError::UnknownDistribution(name.clone()))?;
            (family.label.clone(), validate_points(&family.points)?)
        }
        CurveSelection::Custom(points) => (CUSTOM_LABEL.to_string(), validate_points(points)?),
    };

    let fractions = fraction_curve(&points)?;
    let start = display_start();

    let mut rows = Vec::with_capacity(SERIES_SAMPLES);
    let mut previous = 0.0;
    for (i, fraction) in fractions.iter().enumerate() {
        let cumulative = round_to(fraction * total_depth, DEPTH_DECIMALS);
        // Differences of the rounded series telescope back to the total.
        let incremental = round_to(cumulative - previous, DEPTH_DECIMALS);
        previous = cumulative;

        let stamp = start + Duration::minutes(6 * i as i64);
        rows.push(HyetographRow {
            date: stamp.date(),
            time: stamp.time(),
            hours: round_to(grid_hours(i), 1),
            fraction: *fraction,
            incremental_in: incremental,
            cumulative_in: cumulative,
            incremental_mm: round_to(incremental * MM_PER_INCH, DEPTH_DECIMALS),
            cumulative_mm: round_to(cumulative * MM_PER_INCH, DEPTH_DECIMALS),
        });
    }

    let hyetograph = Hyetograph {
        distribution: label,
        total_depth_in: total_depth,
        rows,
    };

    if let Some((peak_hours, peak_depth)) = hyetograph.peak() {
        logging::debug(
            Component::Generator,
            Some(&hyetograph.distribution),
            &format!(
                "Generated {} steps for {:.3} in; peak {:.6} in at {:.1} h",
                hyetograph.rows.len(),
                total_depth,
                peak_depth,
                peak_hours
            ),
        );
    }

    Ok(hyetograph)
}

// ---------------------------------------------------------------------------
// Tabular export
// ---------------------------------------------------------------------------

impl Hyetograph {
    /// Tab-separated table with a header row, ready for clipboard/spreadsheet.
    ///
    /// Columns: Date, Time, Hours, Incremental (in), Cumulative (in), and
    /// optionally the millimetre mirrors.
    pub fn to_tsv(&self, include_mm: bool) -> String {
        let mut out = String::new();
        out.push_str("Date\tTime\tHours\tIncremental Rainfall (in)\tCumulative Rainfall (in)");
        if include_mm {
            out.push_str("\tIncremental Rainfall (mm)\tCumulative Rainfall (mm)");
        }
        out.push('\n');

        for row in &self.rows {
            out.push_str(&format!(
                "{}\t{}\t{:.1}\t{:.6}\t{:.6}",
                row.date.format("%Y-%m-%d"),
                row.time.format("%H:%M:%S"),
                row.hours,
                row.incremental_in,
                row.cumulative_in
            ));
            if include_mm {
                out.push_str(&format!("\t{:.6}\t{:.6}", row.incremental_mm, row.cumulative_mm));
            }
            out.push('\n');
        }
        out
    }
}

// ---------------------------------------------------------------------------
// Pasted tables
// ---------------------------------------------------------------------------

/// Reads two-column (hours, fraction) text pasted from a spreadsheet.
///
/// Columns may be separated by tabs, commas, semicolons or spaces. Lines
/// whose first two fields are not both numbers (headers, notes, blanks) are
/// skipped. The result still needs `validate_points`.
pub fn parse_control_points(text: &str) -> Vec<ControlPoint> {
    text.lines()
        .filter_map(|line| {
            let mut fields = line
                .split(|c: char| c == '\t' || c == ',' || c == ';' || c.is_whitespace())
                .filter(|f| !f.is_empty());
            let hours = fields.next()?.parse::<f64>().ok()?;
            let fraction = fields.next()?.parse::<f64>().ok()?;
            Some(ControlPoint::new(hours, fraction))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn half_at_noon() -> Vec<ControlPoint> {
        vec![
            ControlPoint::new(0.0, 0.0),
            ControlPoint::new(12.0, 0.5),
            ControlPoint::new(24.0, 1.0),
        ]
    }

    fn registry() -> DistributionRegistry {
        DistributionRegistry::standard()
    }

    // --- Validation ---------------------------------------------------------

    #[test]
    fn test_validate_sorts_points() {
        let shuffled = vec![
            ControlPoint::new(24.0, 1.0),
            ControlPoint::new(0.0, 0.0),
            ControlPoint::new(12.0, 0.5),
        ];
        let sorted = validate_points(&shuffled).expect("valid points");
        assert_eq!(sorted, half_at_noon());
    }

    #[test]
    fn test_validate_rejects_single_duration_as_degenerate() {
        let single = vec![ControlPoint::new(0.0, 0.0)];
        assert!(matches!(validate_points(&single), Err(StormError::DegenerateInput(_))));
        assert!(matches!(validate_points(&[]), Err(StormError::DegenerateInput(_))));
        let repeated = vec![ControlPoint::new(24.0, 1.0), ControlPoint::new(24.0, 1.0)];
        assert!(matches!(validate_points(&repeated), Err(StormError::DegenerateInput(_))));
    }

    #[test]
    fn test_validate_rejects_decreasing_fraction() {
        let points = vec![
            ControlPoint::new(0.0, 0.0),
            ControlPoint::new(10.0, 0.6),
            ControlPoint::new(12.0, 0.5),
            ControlPoint::new(24.0, 1.0),
        ];
        let err = validate_points(&points).unwrap_err();
        assert!(matches!(err, StormError::InvalidControlPoints(_)), "got {:?}", err);
    }

    #[test]
    fn test_validate_rejects_out_of_range_values() {
        let late = vec![ControlPoint::new(0.0, 0.0), ControlPoint::new(25.0, 1.0)];
        assert!(matches!(validate_points(&late), Err(StormError::InvalidControlPoints(_))));

        let over = vec![
            ControlPoint::new(0.0, 0.0),
            ControlPoint::new(12.0, 1.2),
            ControlPoint::new(24.0, 1.2),
        ];
        assert!(matches!(validate_points(&over), Err(StormError::InvalidControlPoints(_))));

        let nan = vec![ControlPoint::new(0.0, 0.0), ControlPoint::new(24.0, f64::NAN)];
        assert!(matches!(validate_points(&nan), Err(StormError::InvalidControlPoints(_))));
    }

    #[test]
    fn test_validate_requires_anchors() {
        let no_start = vec![ControlPoint::new(1.0, 0.1), ControlPoint::new(24.0, 1.0)];
        assert!(matches!(validate_points(&no_start), Err(StormError::InvalidControlPoints(_))));

        let short = vec![ControlPoint::new(0.0, 0.0), ControlPoint::new(24.0, 0.9)];
        assert!(matches!(validate_points(&short), Err(StormError::InvalidControlPoints(_))));
    }

    #[test]
    fn test_validate_rejects_duplicate_hours_among_others() {
        let dup = vec![
            ControlPoint::new(0.0, 0.0),
            ControlPoint::new(12.0, 0.4),
            ControlPoint::new(12.0, 0.6),
            ControlPoint::new(24.0, 1.0),
        ];
        assert!(matches!(validate_points(&dup), Err(StormError::InvalidControlPoints(_))));
    }

    // --- Generation ---------------------------------------------------------

    #[test]
    fn test_series_has_481_rows_from_zero_to_48() {
        let h = generate(&registry(), 3.0, &CurveSelection::Named("scs-ii".into())).unwrap();
        assert_eq!(h.rows.len(), 481);
        assert_eq!(h.rows[0].hours, 0.0);
        assert_eq!(h.rows[480].hours, 48.0);
        assert_eq!(h.rows[1].hours, 0.1);
        assert_eq!(h.distribution, "SCS Type II (Legacy/Standard)");
    }

    #[test]
    fn test_half_at_noon_scenario() {
        let selection = CurveSelection::Custom(half_at_noon());
        let h = generate(&registry(), 10.0, &selection).unwrap();
        let noon = h.at_hours(12.0).expect("row at 12 h");
        assert!((noon.cumulative_in - 5.0).abs() < 0.001);
        assert_eq!(h.at_hours(24.0).map(|r| r.cumulative_in), Some(10.0));
        assert_eq!(h.at_hours(48.0).map(|r| r.cumulative_in), Some(10.0));
        assert_eq!(h.distribution, CUSTOM_LABEL);
    }

    #[test]
    fn test_first_row_is_zero_and_first_increment_is_first_cumulative() {
        let h = generate(&registry(), 5.0, &CurveSelection::Named("scs-ia".into())).unwrap();
        assert_eq!(h.rows[0].cumulative_in, 0.0);
        assert_eq!(h.rows[0].incremental_in, 0.0);
        assert_eq!(h.rows[1].incremental_in, h.rows[1].cumulative_in);
    }

    #[test]
    fn test_tail_carries_no_rain() {
        let h = generate(&registry(), 7.5, &CurveSelection::Named("NOAA Region C".into())).unwrap();
        for row in &h.rows[241..] {
            assert_eq!(row.incremental_in, 0.0, "rain in tail at {} h", row.hours);
            assert_eq!(row.cumulative_in, 7.5);
        }
    }

    #[test]
    fn test_zero_depth_gives_all_zero_series() {
        let h = generate(&registry(), 0.0, &CurveSelection::Named("scs-iii".into())).unwrap();
        assert!(h.rows.iter().all(|r| r.incremental_in == 0.0 && r.cumulative_in == 0.0));
    }

    #[test]
    fn test_negative_or_nan_depth_is_degenerate() {
        let sel = CurveSelection::Named("scs-ii".into());
        assert!(matches!(generate(&registry(), -1.0, &sel), Err(StormError::DegenerateInput(_))));
        assert!(matches!(generate(&registry(), f64::NAN, &sel), Err(StormError::DegenerateInput(_))));
    }

    #[test]
    fn test_unknown_name_fails() {
        let err = generate(&registry(), 1.0, &CurveSelection::Named("Type Z".into())).unwrap_err();
        assert_eq!(err, StormError::UnknownDistribution("Type Z".to_string()));
    }

    #[test]
    fn test_custom_sentinel_without_points_is_unknown() {
        let sel = CurveSelection::from_request("Custom", None);
        assert!(matches!(generate(&registry(), 1.0, &sel), Err(StormError::UnknownDistribution(_))));
    }

    #[test]
    fn test_from_request_uses_points_only_for_sentinel() {
        let sel = CurveSelection::from_request(CUSTOM_LABEL, Some(half_at_noon()));
        assert_eq!(sel, CurveSelection::Custom(half_at_noon()));
        let sel = CurveSelection::from_request("scs-ii", Some(half_at_noon()));
        assert_eq!(sel, CurveSelection::Named("scs-ii".to_string()));
    }

    #[test]
    fn test_invalid_custom_points_abort_generation() {
        let bad = vec![
            ControlPoint::new(0.0, 0.0),
            ControlPoint::new(12.0, 0.7),
            ControlPoint::new(13.0, 0.6),
            ControlPoint::new(24.0, 1.0),
        ];
        let err = generate(&registry(), 4.0, &CurveSelection::Custom(bad)).unwrap_err();
        assert!(matches!(err, StormError::InvalidControlPoints(_)));
    }

    #[test]
    fn test_millimetres_mirror_inches() {
        let h = generate(&registry(), 2.0, &CurveSelection::Named("scs-i".into())).unwrap();
        let last = h.rows.last().unwrap();
        assert!((last.cumulative_mm - 50.8).abs() < 1e-9);
        for row in &h.rows {
            assert!((row.incremental_mm - row.incremental_in * MM_PER_INCH).abs() < 1e-6);
        }
    }

    #[test]
    fn test_calendar_columns_step_six_minutes_from_new_year() {
        let h = generate(&registry(), 1.0, &CurveSelection::Named("scs-ii".into())).unwrap();
        assert_eq!(h.rows[0].date, NaiveDate::from_ymd_opt(2026, 1, 1).unwrap());
        assert_eq!(h.rows[1].time, NaiveTime::from_hms_opt(0, 6, 0).unwrap());
        assert_eq!(h.rows[240].date, NaiveDate::from_ymd_opt(2026, 1, 2).unwrap());
        assert_eq!(h.rows[480].date, NaiveDate::from_ymd_opt(2026, 1, 3).unwrap());
        assert_eq!(h.rows[480].time, NaiveTime::from_hms_opt(0, 0, 0).unwrap());
    }

    #[test]
    fn test_scs_ii_peak_falls_just_before_noon() {
        let h = generate(&registry(), 1.0, &CurveSelection::Named("scs-ii".into())).unwrap();
        let (hours, depth) = h.peak().expect("non-empty series");
        assert!((11.7..=12.1).contains(&hours), "peak at {} h", hours);
        assert!(depth > 0.05, "peak step only {} in", depth);
    }

    #[test]
    fn test_fraction_curve_is_clamped_and_held() {
        let f = fraction_curve(&half_at_noon()).unwrap();
        assert_eq!(f.len(), SERIES_SAMPLES);
        assert_eq!(f[0], 0.0);
        assert_eq!(f[240], 1.0);
        assert!(f[241..].iter().all(|v| *v == 1.0));
    }

    // --- Export -------------------------------------------------------------

    #[test]
    fn test_tsv_has_header_and_one_line_per_row() {
        let h = generate(&registry(), 1.0, &CurveSelection::Named("scs-ii".into())).unwrap();
        let tsv = h.to_tsv(false);
        let lines: Vec<&str> = tsv.lines().collect();
        assert_eq!(lines.len(), 482);
        assert_eq!(
            lines[0],
            "Date\tTime\tHours\tIncremental Rainfall (in)\tCumulative Rainfall (in)"
        );
        assert_eq!(lines[1], "2026-01-01\t00:00:00\t0.0\t0.000000\t0.000000");
        assert_eq!(lines[481].split('\t').count(), 5);

        let with_mm = h.to_tsv(true);
        assert_eq!(with_mm.lines().next().map(|l| l.split('\t').count()), Some(7));
    }

    // --- Pasted tables ------------------------------------------------------

    #[test]
    fn test_parse_control_points_skips_headers() {
        let text = "Hours\tFraction\n0\t0\n12, 0.5\n\n24 1.0\nnote: end\n";
        let points = parse_control_points(text);
        assert_eq!(points, half_at_noon());
    }
}
