//! Design-storm hyetograph generation.
//!
//! Converts a total 24-hour rainfall depth into a 48-hour hyetograph at
//! 6-minute resolution, using either the legacy SCS synthetic storms or
//! NOAA Atlas 14 regional distributions built from duration–depth ratios.
//!
//! Modules, leaf first:
//! - `model`: shared types and errors
//! - `interpolate`: linear and monotone cubic interpolation
//! - `nested`: balanced-storm builder for ratio tables
//! - `distributions`: static tables and the immutable registry
//! - `generator`: validation, generation, tabular export
//! - `classify`: 60-min/24-hr ratio classifier
//! - `ingest`: precipitation-frequency data sources
//! - `planner`, `config`, `verify`, `logging`: run plumbing

pub mod classify;
pub mod config;
pub mod distributions;
pub mod generator;
pub mod ingest;
pub mod interpolate;
pub mod logging;
pub mod model;
pub mod nested;
pub mod planner;
pub mod verify;

pub use classify::{Classification, StormType, classify};
pub use distributions::DistributionRegistry;
pub use generator::{CurveSelection, generate};
pub use model::{ControlPoint, Hyetograph, HyetographRow, StormError};
