//! Learn command implementation: build a policy table from step traces.

use super::{ensure_parent_dir, CliError};
use shutbox::policy::learn_table;
use shutbox::record::read_steps;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Execute the learn command.
///
/// # Errors
///
/// Returns an error if the trace cannot be read or the table cannot be saved.
pub(crate) fn execute(input: &Path, output: &Path, min_count: u64, quiet: bool) -> Result<(), CliError> {
    let file = File::open(input)
        .map_err(|e| CliError::new(format!("Failed to read {}: {e}", input.display())))?;
    let steps = read_steps(BufReader::new(file))?;

    let table = learn_table(&steps, min_count)?;
    ensure_parent_dir(output)?;
    table.save(output)?;

    if !quiet {
        eprintln!(
            "Learned {} entries from {} steps (min count {min_count}) -> {}",
            table.len(),
            steps.len(),
            output.display()
        );
    }
    Ok(())
}
