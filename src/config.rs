//! Run configuration.
//!
//! A generation run is described by a TOML file; `.env` may override the
//! PFDS endpoint (`ATLAS14_BASE_URL`) and the log level
//! (`HYETOGEN_LOG_LEVEL`).
//!
//! ```toml
//! [storm]
//! depth_in = 10.0
//! distribution = "auto"
//! return_period = 25
//!
//! [site]
//! latitude = 29.7604
//! longitude = -95.3698
//!
//! [output]
//! format = "tsv"
//! ```

use serde::Deserialize;
use std::fmt;
use std::path::Path;

use crate::distributions::is_custom_name;
use crate::ingest::atlas14::ATLAS14_BASE_URL;
use crate::logging::LogLevel;
use crate::model::ControlPoint;

pub const ENV_BASE_URL: &str = "ATLAS14_BASE_URL";
pub const ENV_LOG_LEVEL: &str = "HYETOGEN_LOG_LEVEL";

/// Distribution value that asks for classification-based selection.
pub const AUTO_DISTRIBUTION: &str = "auto";

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// The file could not be read.
    Io(String),
    /// The TOML did not match the expected layout.
    Parse(String),
    /// Fields parsed but do not describe a runnable request.
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(msg) => write!(f, "Config read error: {}", msg),
            ConfigError::Parse(msg) => write!(f, "Config parse error: {}", msg),
            ConfigError::Invalid(msg) => write!(f, "Invalid config: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    #[serde(default)]
    pub storm: StormSection,
    pub site: Option<SiteSection>,
    pub custom: Option<CustomSection>,
    #[serde(default)]
    pub output: OutputSection,
    #[serde(default)]
    pub logging: LoggingSection,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StormSection {
    /// Total 24-hour depth in inches. Taken from the site table when absent.
    pub depth_in: Option<f64>,
    #[serde(default = "default_distribution")]
    pub distribution: String,
    #[serde(default = "default_return_period")]
    pub return_period: u32,
}

impl Default for StormSection {
    fn default() -> Self {
        Self {
            depth_in: None,
            distribution: default_distribution(),
            return_period: default_return_period(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SiteSection {
    pub latitude: f64,
    pub longitude: f64,
    /// Saved PFDS CSV to read instead of calling the service.
    pub csv: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CustomSection {
    /// (hours, cumulative fraction) pairs.
    pub points: Vec<[f64; 2]>,
}

impl CustomSection {
    pub fn control_points(&self) -> Vec<ControlPoint> {
        self.points.iter().map(|[h, f]| ControlPoint::new(*h, *f)).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Tsv,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputSection {
    #[serde(default = "default_format")]
    pub format: OutputFormat,
    #[serde(default)]
    pub millimeters: bool,
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            format: default_format(),
            millimeters: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingSection {
    #[serde(default = "default_level")]
    pub level: String,
    pub file: Option<String>,
    #[serde(default)]
    pub timestamps: bool,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: default_level(),
            file: None,
            timestamps: false,
        }
    }
}

fn default_distribution() -> String {
    AUTO_DISTRIBUTION.to_string()
}

fn default_return_period() -> u32 {
    25
}

fn default_format() -> OutputFormat {
    OutputFormat::Tsv
}

fn default_level() -> String {
    "info".to_string()
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

impl RunConfig {
    /// Parses and validates a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: RunConfig = toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&text)
    }

    pub fn is_auto(&self) -> bool {
        self.storm.distribution.trim().eq_ignore_ascii_case(AUTO_DISTRIBUTION)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.is_auto() && self.site.is_none() {
            return Err(ConfigError::Invalid(
                "distribution = \"auto\" needs a [site] to classify".to_string(),
            ));
        }
        if self.storm.depth_in.is_none() && self.site.is_none() {
            return Err(ConfigError::Invalid(
                "give storm.depth_in or a [site] to read the 24-hr depth from".to_string(),
            ));
        }
        if let Some(depth) = self.storm.depth_in {
            if !depth.is_finite() || depth < 0.0 {
                return Err(ConfigError::Invalid(format!("storm.depth_in must be ≥ 0, got {}", depth)));
            }
        }
        if is_custom_name(&self.storm.distribution) && self.custom.is_none() {
            return Err(ConfigError::Invalid(
                "a custom distribution needs [custom].points".to_string(),
            ));
        }
        if let Some(site) = &self.site {
            if !(-90.0..=90.0).contains(&site.latitude) || !(-180.0..=180.0).contains(&site.longitude) {
                return Err(ConfigError::Invalid(format!(
                    "site ({}, {}) is not a latitude/longitude",
                    site.latitude, site.longitude
                )));
            }
        }
        self.log_level()?;
        Ok(())
    }

    pub fn log_level(&self) -> Result<LogLevel, ConfigError> {
        self.logging.level.parse::<LogLevel>().map_err(ConfigError::Invalid)
    }
}

// ---------------------------------------------------------------------------
// Environment
// ---------------------------------------------------------------------------

/// Settings that come from the process environment / `.env`.
#[derive(Debug, Clone, PartialEq)]
pub struct EnvOverrides {
    pub base_url: String,
    pub log_level: Option<LogLevel>,
}

impl EnvOverrides {
    /// Loads `.env` if present, then reads the overrides.
    pub fn load() -> Self {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds overrides from any key lookup; unset or unparseable values fall
    /// back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let base_url = lookup(ENV_BASE_URL)
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| ATLAS14_BASE_URL.to_string());
        let log_level = lookup(ENV_LOG_LEVEL).and_then(|v| v.parse::<LogLevel>().ok());
        Self { base_url, log_level }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let cfg = RunConfig::from_toml_str(
            r#"
            [storm]
            depth_in = 4.5
            distribution = "SCS Type II"
            "#,
        )
        .expect("minimal config should parse");
        assert_eq!(cfg.storm.return_period, 25);
        assert_eq!(cfg.output.format, OutputFormat::Tsv);
        assert!(!cfg.output.millimeters);
        assert_eq!(cfg.log_level(), Ok(LogLevel::Info));
        assert!(!cfg.is_auto());
    }

    #[test]
    fn test_full_config_parses() {
        let cfg = RunConfig::from_toml_str(
            r#"
            [storm]
            distribution = "auto"
            return_period = 100

            [site]
            latitude = 29.7604
            longitude = -95.3698
            csv = "pfds.csv"

            [output]
            format = "json"
            millimeters = true

            [logging]
            level = "debug"
            file = "run.log"
            timestamps = true
            "#,
        )
        .expect("full config should parse");
        assert!(cfg.is_auto());
        assert_eq!(cfg.storm.return_period, 100);
        assert_eq!(cfg.site.as_ref().and_then(|s| s.csv.as_deref()), Some("pfds.csv"));
        assert_eq!(cfg.output.format, OutputFormat::Json);
        assert_eq!(cfg.log_level(), Ok(LogLevel::Debug));
    }

    #[test]
    fn test_auto_without_site_is_invalid() {
        let err = RunConfig::from_toml_str("[storm]\ndepth_in = 3.0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)), "got {:?}", err);
    }

    #[test]
    fn test_custom_requires_points() {
        let err = RunConfig::from_toml_str("[storm]\ndepth_in = 3.0\ndistribution = \"custom\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let cfg = RunConfig::from_toml_str(
            "[storm]\ndepth_in = 3.0\ndistribution = \"custom\"\n[custom]\npoints = [[0.0, 0.0], [24.0, 1.0]]\n",
        )
        .expect("custom with points should parse");
        let points = cfg.custom.as_ref().map(|c| c.control_points()).unwrap_or_default();
        assert_eq!(points, vec![ControlPoint::new(0.0, 0.0), ControlPoint::new(24.0, 1.0)]);
    }

    #[test]
    fn test_negative_depth_and_bad_coordinates_are_invalid() {
        let err = RunConfig::from_toml_str("[storm]\ndepth_in = -1.0\ndistribution = \"scs-ii\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err = RunConfig::from_toml_str("[site]\nlatitude = 123.0\nlongitude = 0.0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_unknown_fields_are_rejected() {
        let err = RunConfig::from_toml_str("[storm]\ndepth = 3.0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_bad_log_level_is_invalid() {
        let err = RunConfig::from_toml_str(
            "[storm]\ndepth_in = 1.0\ndistribution = \"scs-ii\"\n[logging]\nlevel = \"chatty\"\n",
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_env_overrides_fall_back_to_defaults() {
        let env = EnvOverrides::from_lookup(|_| None);
        assert_eq!(env.base_url, ATLAS14_BASE_URL);
        assert_eq!(env.log_level, None);

        let env = EnvOverrides::from_lookup(|key| match key {
            ENV_BASE_URL => Some("http://localhost:8080/pfds.csv".to_string()),
            ENV_LOG_LEVEL => Some("debug".to_string()),
            _ => None,
        });
        assert_eq!(env.base_url, "http://localhost:8080/pfds.csv");
        assert_eq!(env.log_level, Some(LogLevel::Debug));
    }
}
