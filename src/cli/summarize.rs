//! Summarize command implementation.

use super::output::{print_summaries, Source};
use super::{CliError, SummaryFormat};
use shutbox::record::read_scores;
use shutbox::stats::summarize;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Execute the summarize command.
///
/// # Errors
///
/// Returns an error if the score file cannot be read or holds no rows.
pub(crate) fn execute(input: &Path, format: SummaryFormat) -> Result<(), CliError> {
    let file = File::open(input)
        .map_err(|e| CliError::new(format!("Failed to read {}: {e}", input.display())))?;
    let rows = read_scores(BufReader::new(file))?;
    if rows.is_empty() {
        return Err(CliError::new(format!("No score rows in {}", input.display())));
    }

    let summaries = summarize(&rows);
    print_summaries(&summaries, &Source::File(input.display().to_string()), format)
}
