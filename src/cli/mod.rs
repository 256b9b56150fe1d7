//! Command-line parsing for the FRED retail dashboard.
//!
//! The goal of this module is to keep **argument parsing** and **command
//! dispatch** separate from the alignment/statistics code.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "pulse", version, about = "Retail Market Dashboard (FRED-based)")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Launch the interactive TUI dashboard.
    ///
    /// This uses the same underlying pipeline as `pulse report`, but renders
    /// KPIs, the combined chart and the correlation heatmap with Ratatui.
    Dash(RangeArgs),
    /// Print KPIs, correlations and fetch warnings to the terminal.
    Report(ReportArgs),
}

/// Options shared by every command: range, selection, resampling.
#[derive(Debug, Parser, Clone)]
pub struct RangeArgs {
    /// Start date (inclusive, YYYY-MM-DD).
    #[arg(long, default_value = "2015-01-01")]
    pub start: NaiveDate,

    /// End date (inclusive, YYYY-MM-DD). Defaults to today.
    #[arg(long)]
    pub end: Option<NaiveDate>,

    /// Series to include, by registry label or FRED code (repeatable).
    /// Defaults to every registry series.
    #[arg(short = 's', long = "series")]
    pub series: Vec<String>,

    /// Disable month-end resampling of quarterly series.
    #[arg(long)]
    pub no_resample: bool,
}

/// Options for the plain-terminal report.
#[derive(Debug, Parser)]
pub struct ReportArgs {
    #[command(flatten)]
    pub range: RangeArgs,

    /// Export the aligned table to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,
}
