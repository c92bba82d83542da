//! Input/output helpers.
//!
//! - case/death CSV ingest with typed coercion (`ingest`)
//! - result CSV export (`export`)

pub mod export;
pub mod ingest;

pub use export::*;
pub use ingest::*;
