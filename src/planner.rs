//! Turns a run configuration plus (optional) site data into a concrete
//! generation request.
//!
//! Resolution order:
//!   depth:        `storm.depth_in`, else the site's 24-hr depth at the
//!                  configured return period
//!   distribution: "auto" → classifier recommendation from the site table;
//!                  "custom" → `[custom].points`; anything else → registry name

use crate::classify::{Classification, recommend};
use crate::config::{ConfigError, RunConfig};
use crate::distributions::is_custom_name;
use crate::generator::CurveSelection;
use crate::ingest::atlas14::PrecipFrequencyTable;

/// A fully resolved generation request.
#[derive(Debug, Clone, PartialEq)]
pub struct StormPlan {
    pub depth_in: f64,
    pub selection: CurveSelection,
    /// Present whenever site data was available.
    pub classification: Option<Classification>,
}

/// Resolves `config` against the site table (if one was fetched).
pub fn plan(config: &RunConfig, site_table: Option<&PrecipFrequencyTable>) -> Result<StormPlan, ConfigError> {
    let rp = config.storm.return_period;
    let classification = site_table.map(|t| recommend(t, rp));

    let depth_in = match (config.storm.depth_in, site_table) {
        (Some(depth), _) => depth,
        (None, Some(table)) => {
            let (_, d24) = table.design_depths(rp);
            if d24 == 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "site table has no 24-hr depth for the {}-yr return period",
                    rp
                )));
            }
            d24
        }
        (None, None) => {
            return Err(ConfigError::Invalid("no depth given and no site data".to_string()));
        }
    };

    let selection = if config.is_auto() {
        match &classification {
            Some(c) => CurveSelection::Named(c.family.to_string()),
            None => {
                return Err(ConfigError::Invalid(
                    "distribution = \"auto\" needs site data".to_string(),
                ));
            }
        }
    } else if is_custom_name(&config.storm.distribution) {
        let points = config.custom.as_ref().map(|c| c.control_points());
        CurveSelection::from_request(&config.storm.distribution, points)
    } else {
        CurveSelection::Named(config.storm.distribution.clone())
    };

    Ok(StormPlan {
        depth_in,
        selection,
        classification,
    })
}
