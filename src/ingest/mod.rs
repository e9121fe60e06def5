//! Precipitation-frequency data sources.
//!
//! Submodules:
//! - `atlas14`: NOAA Atlas 14 PFDS client, CSV parser and frequency table.

pub mod atlas14;
