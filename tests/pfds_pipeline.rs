//! Precipitation-Frequency Pipeline Integration Tests
//!
//! Runs the full path a site-driven request takes: saved PFDS CSV →
//! frequency table → ratio classification → planned storm → hyetograph.
//! The live Atlas 14 test is ignored by default; run it with
//! `cargo test -- --ignored` when the network is available.

use std::path::PathBuf;
use std::time::Duration;

use hyetogen_service::classify::{StormType, recommend};
use hyetogen_service::config::RunConfig;
use hyetogen_service::distributions::{DistributionRegistry, REGION_C};
use hyetogen_service::generator::{CurveSelection, generate};
use hyetogen_service::ingest::atlas14::{
    ATLAS14_BASE_URL, Atlas14Client, CsvFileSource, FetchError, FrequencySource,
};
use hyetogen_service::planner::plan;

const HOUSTON: (f64, f64) = (29.7604, -95.3698);

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures").join(name)
}

#[test]
fn test_saved_csv_loads_full_table() {
    let table = CsvFileSource::new(fixture("houston_pfds.csv"))
        .fetch(HOUSTON.0, HOUSTON.1)
        .expect("fixture should parse");

    assert_eq!(table.durations().len(), 12);
    assert_eq!(table.return_periods().first(), Some(&1));
    assert_eq!(table.return_periods().last(), Some(&1000));
    assert_eq!(table.design_depths(25), (3.96, 10.7));
    // Absent entries read as zero rather than failing.
    assert_eq!(table.depth("7-day", 25), 0.0);
}

#[test]
fn test_recommendation_depends_on_return_period() {
    let table = CsvFileSource::new(fixture("houston_pfds.csv"))
        .fetch(HOUSTON.0, HOUSTON.1)
        .unwrap();

    // 3.96 / 10.7 = 0.370
    assert_eq!(recommend(&table, 25).storm_type, StormType::C);
    // 5.12 / 15.0 = 0.341
    assert_eq!(recommend(&table, 100).storm_type, StormType::B);
    // 2.20 / 5.12 = 0.430
    assert_eq!(recommend(&table, 2).storm_type, StormType::D);
    // Unknown return period: both depths absent, ratio defined as 0.
    assert_eq!(recommend(&table, 3).storm_type, StormType::A);
}

#[test]
fn test_site_config_end_to_end() {
    let csv = fixture("houston_pfds.csv");
    let text = format!(
        "[storm]\nreturn_period = 25\n\n[site]\nlatitude = {}\nlongitude = {}\ncsv = '{}'\n",
        HOUSTON.0,
        HOUSTON.1,
        csv.display()
    );
    let config = RunConfig::from_toml_str(&text).expect("run config should parse");
    let site = config.site.as_ref().expect("site section");
    let table = CsvFileSource::new(site.csv.as_deref().expect("csv path"))
        .fetch(site.latitude, site.longitude)
        .unwrap();

    let storm_plan = plan(&config, Some(&table)).expect("plan resolves");
    assert_eq!(storm_plan.depth_in, 10.7);
    assert_eq!(storm_plan.selection, CurveSelection::Named(REGION_C.to_string()));

    let registry = DistributionRegistry::standard();
    let h = generate(&registry, storm_plan.depth_in, &storm_plan.selection).unwrap();
    assert_eq!(h.distribution, REGION_C);
    assert!((h.total() - 10.7).abs() <= 1e-4);
}

#[test]
fn test_missing_file_is_a_request_failure() {
    let err = CsvFileSource::new(fixture("does_not_exist.csv"))
        .fetch(HOUSTON.0, HOUSTON.1)
        .unwrap_err();
    assert!(matches!(err, FetchError::RequestFailed(_)));
}

#[test]
#[ignore]
fn test_live_atlas14_houston() {
    let client = Atlas14Client::new(ATLAS14_BASE_URL, Duration::from_secs(30)).unwrap();
    let table = client.fetch(HOUSTON.0, HOUSTON.1).expect("PFDS should answer for Houston");

    println!("\n🔍 Atlas 14 PFDS for Houston:");
    println!("{}", table.to_tsv());

    let (d60, d24) = table.design_depths(25);
    assert!(d60 > 0.0 && d24 > d60, "unexpected 25-yr depths {} / {}", d60, d24);
    let c = recommend(&table, 25);
    println!("25-yr ratio {:.3} → {} ({})", c.ratio, c.storm_type, c.family);
}
