//! CLI command implementations for Shutbox.

pub(crate) mod collect;
pub(crate) mod learn;
pub(crate) mod simulate;
pub(crate) mod summarize;

mod output;

use clap::{Args, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use shutbox::game::DEFAULT_TILES;
use shutbox::policy::{PolicyTable, TableError};
use shutbox::record::RecordError;
use shutbox::{ConfigError, GameConfig, Policy, SimulationError, Strategy};
use std::error::Error;
use std::fmt;

/// Output format for strategy summaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum SummaryFormat {
    /// Human-readable text output.
    Text,
    /// Machine-readable JSON output.
    Json,
    /// CSV format.
    Csv,
}

/// Game rule flags shared by the simulation commands.
#[derive(Debug, Clone, Copy, Args)]
pub(crate) struct RulesArgs {
    /// Number of tiles on the board (1-12)
    #[arg(long, default_value_t = DEFAULT_TILES)]
    tiles: u8,

    /// Disable the single-die rule
    #[arg(long)]
    no_single_die: bool,

    /// Throw one die automatically whenever the rule allows it
    #[arg(long, conflicts_with = "no_single_die")]
    auto_single_die: bool,
}

impl RulesArgs {
    /// The game configuration these flags describe.
    ///
    /// # Errors
    ///
    /// Returns an error for an unsupported tile count.
    pub(crate) fn game_config(self) -> Result<GameConfig, CliError> {
        let config = GameConfig {
            tiles_max: self.tiles,
            single_die_rule: !self.no_single_die,
            auto_single_die: self.auto_single_die,
        };
        config.validate()?;
        Ok(config)
    }
}

/// CLI error type.
#[derive(Debug)]
pub(crate) struct CliError {
    message: String,
}

impl CliError {
    /// Create a new CLI error.
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for CliError {}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        Self::new(e.to_string())
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        Self::new(e.to_string())
    }
}

impl From<SimulationError> for CliError {
    fn from(e: SimulationError) -> Self {
        Self::new(e.to_string())
    }
}

impl From<TableError> for CliError {
    fn from(e: TableError) -> Self {
        Self::new(e.to_string())
    }
}

impl From<RecordError> for CliError {
    fn from(e: RecordError) -> Self {
        Self::new(e.to_string())
    }
}

/// Use the given seed, or derive one from the clock.
// Only the low bits of the clock matter for a seed.
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn resolve_seed(seed: Option<u64>) -> u64 {
    seed.unwrap_or_else(|| {
        use std::time::{SystemTime, UNIX_EPOCH};
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(42)
    })
}

/// Size the global rayon pool.
pub(crate) fn configure_threads(threads: Option<usize>) {
    if let Some(num_threads) = threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build_global()
            .ok(); // Ignore error if already initialized
    }
}

/// Progress bar over `len` games, or `None` when hidden.
pub(crate) fn progress_bar(len: u64, show: bool) -> Option<ProgressBar> {
    if !show {
        return None;
    }
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} games ({per_sec})")
            .expect("valid template")
            .progress_chars("=>-"),
    );
    Some(pb)
}

/// Load a policy table if a path was given.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub(crate) fn load_table(path: Option<&std::path::Path>) -> Result<Option<PolicyTable>, CliError> {
    Ok(path.map(PolicyTable::load).transpose()?)
}

/// Build one policy per strategy.
///
/// # Errors
///
/// Returns an error if the table strategy is requested without a table.
pub(crate) fn build_policies(
    strategies: &[Strategy],
    table: Option<&PolicyTable>,
) -> Result<Vec<Box<dyn Policy>>, CliError> {
    strategies
        .iter()
        .map(|&strategy| {
            strategy
                .policy(table)
                .ok_or_else(|| CliError::new(format!("strategy {strategy} requires --table <FILE>")))
        })
        .collect()
}

/// Create the parent directory of an output file.
///
/// # Errors
///
/// Returns an error if the directory cannot be created.
pub(crate) fn ensure_parent_dir(path: &std::path::Path) -> Result<(), CliError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| {
            CliError::new(format!("Failed to create {}: {e}", parent.display()))
        })?;
    }
    Ok(())
}
