//! NOAA Atlas 14 precipitation-frequency data source.
//!
//! Retrieves point precipitation-frequency estimates (PFDS) as CSV text and
//! parses them into a duration × return-period depth table.
//!
//! Endpoint: https://hdsc.nws.noaa.gov/cgi-bin/hdsc/new/fe_text_mean.csv
//!
//! The core never fetches on its own; callers obtain a fully materialised
//! `PrecipFrequencyTable` from a `FrequencySource` before classifying or
//! generating.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Serialize;

use crate::logging::{self, Component};

pub const ATLAS14_BASE_URL: &str = "https://hdsc.nws.noaa.gov/cgi-bin/hdsc/new/fe_text_mean.csv";

/// Marker text on the header row of the depth table.
const HEADER_MARKER: &str = "by duration for ARI (years):";

/// Duration labels in display order. Labels outside this list sort last.
pub const DURATION_ORDER: &[&str] = &[
    "5-min", "10-min", "15-min", "30-min", "60-min", "2-hr", "3-hr", "6-hr", "12-hr", "24-hr", "2-day",
    "3-day", "4-day", "7-day", "10-day", "20-day", "30-day", "45-day", "60-day",
];

pub const LABEL_60_MIN: &str = "60-min";
pub const LABEL_24_HR: &str = "24-hr";

// ============================================================================
// Errors
// ============================================================================

/// Errors that can arise when fetching or parsing PFDS data.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchError {
    /// Non-2xx HTTP response from the PFDS server.
    HttpError(u16),
    /// The request could not be sent or the body could not be read.
    RequestFailed(String),
    /// The response body could not be interpreted as a PFDS table.
    ParseError(String),
    /// The location has no estimates (outside coverage or an error page).
    NoDataAvailable(String),
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::HttpError(code) => write!(f, "HTTP error: {}", code),
            FetchError::RequestFailed(msg) => write!(f, "Request failed: {}", msg),
            FetchError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            FetchError::NoDataAvailable(msg) => write!(f, "No data available: {}", msg),
        }
    }
}

impl std::error::Error for FetchError {}

// ============================================================================
// Frequency table
// ============================================================================

/// Depth (inches) by duration label and return period (years).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PrecipFrequencyTable {
    depths: BTreeMap<String, BTreeMap<u32, f64>>,
}

impl PrecipFrequencyTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, duration: &str, return_period: u32, depth: f64) {
        self.depths
            .entry(duration.to_string())
            .or_default()
            .insert(return_period, depth);
    }

    /// Depth for a duration/return period; absent entries read as 0.0.
    pub fn depth(&self, duration: &str, return_period: u32) -> f64 {
        self.depths
            .get(duration)
            .and_then(|row| row.get(&return_period))
            .copied()
            .unwrap_or(0.0)
    }

    /// The (60-minute, 24-hour) depths used for classification.
    pub fn design_depths(&self, return_period: u32) -> (f64, f64) {
        (
            self.depth(LABEL_60_MIN, return_period),
            self.depth(LABEL_24_HR, return_period),
        )
    }

    /// Duration labels in vocabulary order, unknown labels last.
    pub fn durations(&self) -> Vec<&str> {
        let mut labels: Vec<&str> = self.depths.keys().map(|k| k.as_str()).collect();
        labels.sort_by_key(|l| DURATION_ORDER.iter().position(|o| o == l).unwrap_or(usize::MAX));
        labels
    }

    /// Return periods present in any row, ascending.
    pub fn return_periods(&self) -> Vec<u32> {
        let mut rps: Vec<u32> = self.depths.values().flat_map(|row| row.keys().copied()).collect();
        rps.sort_unstable();
        rps.dedup();
        rps
    }

    pub fn is_empty(&self) -> bool {
        self.depths.values().all(|row| row.is_empty())
    }

    /// Tab-separated table: one row per duration, one column per return period.
    pub fn to_tsv(&self) -> String {
        let rps = self.return_periods();
        let mut out = String::from("Duration");
        for rp in &rps {
            out.push_str(&format!("\t{}-yr", rp));
        }
        out.push('\n');
        for label in self.durations() {
            out.push_str(label);
            for rp in &rps {
                match self.depths.get(label).and_then(|row| row.get(rp)) {
                    Some(d) => out.push_str(&format!("\t{:.3}", d)),
                    None => out.push('\t'),
                }
            }
            out.push('\n');
        }
        out
    }
}

// ============================================================================
// CSV parsing
// ============================================================================

/// Parses a PFDS CSV response body into a frequency table.
///
/// The header row containing "by duration for ARI (years):" maps return
/// periods to columns. Later rows labelled with `min`, `hr` or `day` are
/// data rows; cells that do not parse as numbers are skipped.
pub fn parse_pfds_csv(body: &str) -> Result<PrecipFrequencyTable, FetchError> {
    if body.trim().is_empty() {
        return Err(FetchError::NoDataAvailable("empty response".to_string()));
    }
    if body.contains("File not found") || (body.contains("Error") && body.len() < 200) {
        return Err(FetchError::NoDataAvailable("PFDS returned an error page".to_string()));
    }

    let mut columns: Vec<(usize, u32)> = Vec::new();
    let mut table = PrecipFrequencyTable::new();
    let mut in_table = false;

    for line in body.lines() {
        let fields: Vec<&str> = line.split(',').map(|f| f.trim()).collect();
        let Some(first) = fields.first() else {
            continue;
        };
        if first.is_empty() {
            continue;
        }

        if first.contains(HEADER_MARKER) {
            in_table = true;
            columns = fields
                .iter()
                .enumerate()
                .skip(1)
                .filter_map(|(i, cell)| cell.parse::<u32>().ok().map(|rp| (i, rp)))
                .collect();
            continue;
        }

        if !in_table {
            continue;
        }

        let label = first.trim_end_matches(':').trim();
        if !(label.contains("min") || label.contains("hr") || label.contains("day")) {
            continue;
        }

        for (col, rp) in &columns {
            if let Some(depth) = fields.get(*col).and_then(|c| c.parse::<f64>().ok()) {
                table.insert(label, *rp, depth);
            }
        }
    }

    if !in_table {
        return Err(FetchError::ParseError(format!("no '{}' header row", HEADER_MARKER)));
    }
    if table.is_empty() {
        return Err(FetchError::NoDataAvailable("table header present but no depths".to_string()));
    }
    Ok(table)
}

// ============================================================================
// Sources
// ============================================================================

/// Anything that can produce a frequency table for a point.
pub trait FrequencySource {
    fn fetch(&self, latitude: f64, longitude: f64) -> Result<PrecipFrequencyTable, FetchError>;
}

/// Live PFDS client (english units, partial-duration series).
pub struct Atlas14Client {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl Atlas14Client {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::RequestFailed(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.to_string(),
        })
    }

    pub fn build_url(&self, latitude: f64, longitude: f64) -> String {
        build_pfds_url(&self.base_url, latitude, longitude)
    }

    fn fetch_body(&self, url: &str) -> Result<String, FetchError> {
        let response = self
            .client
            .get(url)
            .header("Accept", "text/csv")
            .send()
            .map_err(|e| FetchError::RequestFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(FetchError::HttpError(response.status().as_u16()));
        }

        response
            .text()
            .map_err(|e| FetchError::RequestFailed(e.to_string()))
    }
}

/// PFDS CSV request URL for a point.
pub fn build_pfds_url(base_url: &str, latitude: f64, longitude: f64) -> String {
    format!(
        "{}?lat={}&lon={}&data=depth&units=english&series=pds",
        base_url, latitude, longitude
    )
}

impl FrequencySource for Atlas14Client {
    fn fetch(&self, latitude: f64, longitude: f64) -> Result<PrecipFrequencyTable, FetchError> {
        let url = self.build_url(latitude, longitude);
        let location = format!("{:.4},{:.4}", latitude, longitude);
        logging::info(Component::Fetch, Some(&location), &format!("Fetching {}", url));

        let result = self.fetch_body(&url).and_then(|body| parse_pfds_csv(&body));

        if let Err(ref e) = result {
            logging::log_fetch_failure(&location, "PFDS fetch", e);
        }
        result
    }
}

/// Reads a previously saved PFDS CSV instead of calling the service.
/// The coordinates are ignored.
pub struct CsvFileSource {
    path: PathBuf,
}

impl CsvFileSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl FrequencySource for CsvFileSource {
    fn fetch(&self, _latitude: f64, _longitude: f64) -> Result<PrecipFrequencyTable, FetchError> {
        let body = std::fs::read_to_string(&self.path)
            .map_err(|e| FetchError::RequestFailed(format!("{}: {}", self.path.display(), e)))?;
        parse_pfds_csv(&body)
    }
}

// ============================================================================
// Tests
// ============================================================================
