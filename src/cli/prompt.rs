//! Interactive FIPS prompt.
//!
//! The loop only does IO; validation lives in `domain::fips`. It keeps asking
//! until the operator enters a valid list and confirms it, so the only ways
//! out are a valid list or an input error (closed stdin).

use std::io::{self, BufRead, Write};

use crate::domain::{confirmation_question, parse_fips_input, validate_fips, FipsError};
use crate::error::AppError;
use crate::settings::FIPS_PREFIX;

const FIPS_QUESTION: &str = "Please enter a list of FIPS codes separated by commas:";

/// Prompt on stdin/stdout.
pub fn prompt_for_fips() -> Result<Vec<String>, AppError> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    prompt_for_fips_with(&mut stdin.lock(), &mut stdout.lock())
}

/// Prompt on arbitrary streams.
pub fn prompt_for_fips_with<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> Result<Vec<String>, AppError> {
    loop {
        let line = ask(input, output, &format!("{FIPS_QUESTION} "))?;
        let fips = parse_fips_input(&line);

        match validate_fips(&fips) {
            Ok(()) => {}
            Err(FipsError::BadPrefix(_)) => {
                // Report the rule, not the offender.
                say(
                    output,
                    &format!("All FIPS codes must begin with {FIPS_PREFIX} (prefix for the state of Georgia)."),
                )?;
                continue;
            }
            Err(err @ FipsError::Empty) => {
                say(output, &err.to_string())?;
                continue;
            }
        }

        if confirm(input, output, &confirmation_question(&fips))? {
            return Ok(fips);
        }
    }
}

/// Yes/no question defaulting to yes. Unrecognized answers re-ask.
fn confirm<R: BufRead, W: Write>(input: &mut R, output: &mut W, question: &str) -> Result<bool, AppError> {
    loop {
        let answer = ask(input, output, &format!("{question}[Y/n] "))?;
        match answer.trim().to_ascii_lowercase().as_str() {
            "" | "y" | "yes" => return Ok(true),
            "n" | "no" => return Ok(false),
            other => say(output, &format!("Please answer 'y' or 'n' (got '{other}')."))?,
        }
    }
}

fn ask<R: BufRead, W: Write>(input: &mut R, output: &mut W, prompt: &str) -> Result<String, AppError> {
    write!(output, "{prompt}").map_err(|e| AppError::input(format!("Failed to write prompt: {e}")))?;
    output
        .flush()
        .map_err(|e| AppError::input(format!("Failed to write prompt: {e}")))?;

    let mut line = String::new();
    let bytes = input
        .read_line(&mut line)
        .map_err(|e| AppError::input(format!("Failed to read input: {e}")))?;
    if bytes == 0 {
        return Err(AppError::input("No input received; registration canceled."));
    }
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn say<W: Write>(output: &mut W, message: &str) -> Result<(), AppError> {
    writeln!(output, "{message}").map_err(|e| AppError::input(format!("Failed to write prompt: {e}")))
}
