//! Remote data retrieval and the static reference table.
//!
//! - `source`: blocking download of the published archive
//! - `archive`: ZIP extraction into the scratch directory
//! - `counties`: the county FIPS reference table

pub mod archive;
pub mod counties;
pub mod source;

pub use counties::CountyTable;
pub use source::ArchiveClient;
