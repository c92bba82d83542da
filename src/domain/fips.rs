//! County FIPS list parsing and validation.
//!
//! Kept free of IO so the interactive prompt only has to orchestrate it.

use crate::settings::FIPS_PREFIX;

/// Why a FIPS list was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FipsError {
    Empty,
    BadPrefix(String),
}

impl std::fmt::Display for FipsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FipsError::Empty => write!(f, "No FIPS codes were entered."),
            FipsError::BadPrefix(code) => write!(
                f,
                "Invalid FIPS code '{code}'. All FIPS codes must begin with {FIPS_PREFIX} (prefix for the state of Georgia)."
            ),
        }
    }
}

impl std::error::Error for FipsError {}

/// Split operator input into codes.
///
/// Spaces are removed everywhere and the rest is split on commas. Empty
/// segments are kept so that `"13089,"` fails validation instead of silently
/// shrinking.
pub fn parse_fips_input(input: &str) -> Vec<String> {
    let compact: String = input.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() {
        return Vec::new();
    }
    compact.split(',').map(str::to_string).collect()
}

/// Check every code carries the state prefix. The first offender is reported.
pub fn validate_fips(fips: &[String]) -> Result<(), FipsError> {
    if fips.is_empty() {
        return Err(FipsError::Empty);
    }
    match fips.iter().find(|code| !code.starts_with(FIPS_PREFIX)) {
        Some(code) => Err(FipsError::BadPrefix(code.clone())),
        None => Ok(()),
    }
}

/// Confirmation summary shown before accepting a list.
pub fn confirmation_question(fips: &[String]) -> String {
    let mut question = String::from("Is this correct?");
    for code in fips {
        question.push_str(&format!("\n  - {code}"));
    }
    question.push('\n');
    question
}
