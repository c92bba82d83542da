//! `ga-covid` library crate.
//!
//! A data source for a time-series pipeline host: it downloads the Georgia
//! DPH COVID-19 archive, joins the county case/death table against a FIPS
//! reference table and returns rows for the configured counties.
//!
//! The binary (`ga-covid`) is a thin wrapper that plays the host with a local
//! pipe file.

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod logging;
pub mod pipe;
pub mod report;
pub mod settings;
pub mod transform;
