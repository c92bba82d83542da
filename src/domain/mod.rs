//! Domain types used throughout the plugin.
//!
//! This module defines:
//!
//! - the reference, input and output row types (`CountyRef`, `CaseRow`, `CovidRow`)
//! - the registration output (`PipeParameters`)
//! - the report-date window (`DateBounds`)
//! - FIPS list validation (`fips`)

pub mod fips;
pub mod types;

pub use fips::*;
pub use types::*;
