//! Distribution Registry Verification Module
//!
//! Checks every registered distribution against the curve invariants before
//! it is trusted for design work: anchored at (0, 0) and (24, 1), fine-grid
//! fractions non-decreasing, and a generated test storm whose increments
//! add back up to its depth.
//!
//! Run with `hyetogen_service verify` after editing any table.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::distributions::DistributionRegistry;
use crate::generator::{CurveSelection, fraction_curve, generate, validate_points};
use crate::model::{DistributionFamily, FamilyOrigin, STORM_SAMPLES};

/// Depth used for the round-trip check, in inches.
const CHECK_DEPTH_IN: f64 = 10.0;

/// Allowed |Σ increments − depth| for the round-trip check.
const SUM_TOLERANCE: f64 = 1e-4;

// ============================================================================
// Verification Results
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct VerificationReport {
    pub timestamp: String,
    pub results: Vec<FamilyVerification>,
    pub summary: VerificationSummary,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct VerificationSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct FamilyVerification {
    pub key: String,
    pub label: String,
    pub origin: FamilyOrigin,
    pub status: VerificationStatus,
    pub control_points: usize,
    pub anchored: bool,
    pub monotone: bool,
    /// Σ increments − depth for the check storm.
    pub sum_error: Option<f64>,
    pub peak_hours: Option<f64>,
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub enum VerificationStatus {
    Success,
    Failed,
}

// ============================================================================
// Per-family Verification
// ============================================================================

pub fn verify_family(registry: &DistributionRegistry, family: &DistributionFamily) -> FamilyVerification {
    let mut result = FamilyVerification {
        key: family.key.clone(),
        label: family.label.clone(),
        origin: family.origin,
        status: VerificationStatus::Failed,
        control_points: family.points.len(),
        anchored: false,
        monotone: false,
        sum_error: None,
        peak_hours: None,
        error_message: None,
    };

    // Test 1: table invariants
    let points = match validate_points(&family.points) {
        Ok(p) => p,
        Err(e) => {
            result.error_message = Some(e.to_string());
            return result;
        }
    };
    result.anchored = true;

    // Test 2: the fitted curve never falls on the fine grid
    match fraction_curve(&points) {
        Ok(fractions) => {
            let storm = &fractions[..STORM_SAMPLES];
            result.monotone = storm.windows(2).all(|w| w[1] >= w[0]) && storm[STORM_SAMPLES - 1] == 1.0;
            if !result.monotone {
                result.error_message = Some("fitted curve is not non-decreasing".to_string());
            }
        }
        Err(e) => {
            result.error_message = Some(e.to_string());
            return result;
        }
    }

    // Test 3: a check storm's increments add back up to its depth
    match generate(registry, CHECK_DEPTH_IN, &CurveSelection::Named(family.key.clone())) {
        Ok(h) => {
            let sum: f64 = h.rows.iter().map(|r| r.incremental_in).sum();
            result.sum_error = Some(sum - CHECK_DEPTH_IN);
            result.peak_hours = h.peak().map(|(hours, _)| hours);
        }
        Err(e) => {
            result.error_message = Some(e.to_string());
            return result;
        }
    }

    let sum_ok = result.sum_error.map(|e| e.abs() <= SUM_TOLERANCE).unwrap_or(false);
    if !sum_ok && result.error_message.is_none() {
        result.error_message = Some(format!(
            "increments miss the depth by {:.2e}",
            result.sum_error.unwrap_or(f64::NAN)
        ));
    }
    if result.anchored && result.monotone && sum_ok {
        result.status = VerificationStatus::Success;
    }

    result
}

// ============================================================================
// Full Verification Runner
// ============================================================================

pub fn verify_registry(registry: &DistributionRegistry) -> VerificationReport {
    let mut report = VerificationReport {
        timestamp: Utc::now().to_rfc3339(),
        results: Vec::with_capacity(registry.len()),
        summary: VerificationSummary {
            total: registry.len(),
            ..Default::default()
        },
    };

    for family in registry.families() {
        let result = verify_family(registry, family);
        match result.status {
            VerificationStatus::Success => report.summary.passed += 1,
            VerificationStatus::Failed => report.summary.failed += 1,
        }
        report.results.push(result);
    }

    report
}

pub fn print_summary(report: &VerificationReport) {
    println!("\n═══════════════════════════════════════════════════════════");
    println!("📊 DISTRIBUTION VERIFICATION SUMMARY");
    println!("═══════════════════════════════════════════════════════════");
    println!();
    for r in &report.results {
        match r.status {
            VerificationStatus::Success => println!(
                "  ✓ {:<32} {:>3} pts  peak {:>4.1} h  Σ err {:+.1e}",
                r.label,
                r.control_points,
                r.peak_hours.unwrap_or(0.0),
                r.sum_error.unwrap_or(0.0)
            ),
            VerificationStatus::Failed => println!(
                "  ✗ {:<32} FAILED: {}",
                r.label,
                r.error_message.as_deref().unwrap_or("Unknown")
            ),
        }
    }
    println!();
    println!(
        "Distributions:    {}/{} passed  ({} failed)",
        report.summary.passed, report.summary.total, report.summary.failed
    );
    println!("═══════════════════════════════════════════════════════════");
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ControlPoint;

    #[test]
    fn test_standard_registry_passes() {
        let registry = DistributionRegistry::standard();
        let report = verify_registry(&registry);
        for r in &report.results {
            assert_eq!(
                r.status,
                VerificationStatus::Success,
                "{} failed: {:?}",
                r.label,
                r.error_message
            );
        }
        assert_eq!(report.summary.total, 8);
        assert_eq!(report.summary.passed, 8);
        assert_eq!(report.summary.failed, 0);
    }

    #[test]
    fn test_broken_family_is_reported_not_panicked() {
        let broken = DistributionFamily {
            key: "broken".to_string(),
            label: "Broken".to_string(),
            origin: FamilyOrigin::Legacy,
            points: vec![
                ControlPoint::new(0.0, 0.0),
                ControlPoint::new(12.0, 0.8),
                ControlPoint::new(13.0, 0.4),
                ControlPoint::new(24.0, 1.0),
            ],
        };
        let registry = DistributionRegistry::from_families(vec![broken]);
        let report = verify_registry(&registry);
        assert_eq!(report.summary.failed, 1);
        let r = &report.results[0];
        assert!(!r.anchored);
        assert!(r.error_message.as_deref().unwrap_or("").contains("Invalid control points"));
    }

    #[test]
    fn test_report_serializes_to_json() {
        let registry = DistributionRegistry::standard();
        let report = verify_registry(&registry);
        let json = serde_json::to_string(&report).expect("report serializes");
        assert!(json.contains("\"key\":\"scs-ii\""));
        assert!(json.contains("\"status\":\"Success\""));
    }
}
