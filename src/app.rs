//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - builds the immutable run configuration
//! - runs the fetch/align/stats pipeline
//! - prints reports or launches the TUI
//! - writes optional exports

use clap::Parser;

use crate::cli::{Command, RangeArgs, ReportArgs};
use crate::data::FredClient;
use crate::domain::{DashConfig, SERIES_REGISTRY};
use crate::error::AppError;

pub mod pipeline;

use pipeline::Dashboard;

/// Entry point for the `pulse` binary.
pub fn run() -> Result<(), AppError> {
    // We want `pulse` and `pulse --start 2020-01-01` to behave like
    // `pulse dash ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of
    // the argv list before parsing. This preserves a clean clap structure
    // while retaining the requested UX.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Dash(args) => handle_dash(args),
        Command::Report(args) => handle_report(args),
    }
}

fn handle_dash(args: RangeArgs) -> Result<(), AppError> {
    let config = dash_config_from_args(&args)?;
    crate::tui::run(config)
}

fn handle_report(args: ReportArgs) -> Result<(), AppError> {
    let config = dash_config_from_args(&args.range)?;
    let mut client = FredClient::from_env();

    match pipeline::run_dashboard(client.as_mut(), &config) {
        Dashboard::AwaitingKey => {
            println!("No FRED API key found. Set FRED_API_KEY in the environment (.env).");
        }
        Dashboard::NoData { failures } => {
            print!("{}", crate::report::format_failures(&failures));
            println!("No data loaded. Check series selection or date range.");
        }
        Dashboard::Ready(run) => {
            print!("{}", crate::report::format_failures(&run.failures));
            println!("{}", crate::report::format_run_summary(&run, &config));
            println!("{}", crate::report::format_kpis(&run.kpis));
            println!("{}", crate::report::format_correlations(&run.correlations));

            if let Some(path) = &args.export {
                crate::io::export::write_table_csv(path, &run.filled)?;
                println!("Wrote aligned table: {}", path.display());
            }
        }
    }

    Ok(())
}

/// Resolve CLI arguments into the immutable per-run configuration.
///
/// Series may be given as display labels or FRED codes; anything unknown is a
/// hard error listing the registry, so typos fail fast instead of silently
/// shrinking the dashboard.
pub fn dash_config_from_args(args: &RangeArgs) -> Result<DashConfig, AppError> {
    let today = chrono::Local::now().date_naive();
    let mut config = DashConfig::with_today(today);
    config.start = args.start;
    config.end = args.end.unwrap_or(today);
    config.resample_quarterly = !args.no_resample;

    if !args.series.is_empty() {
        let mut selected = Vec::with_capacity(args.series.len());
        for wanted in &args.series {
            let def = SERIES_REGISTRY
                .iter()
                .find(|d| d.label.eq_ignore_ascii_case(wanted) || d.code.eq_ignore_ascii_case(wanted))
                .ok_or_else(|| {
                    let known: Vec<&str> = SERIES_REGISTRY.iter().map(|d| d.code).collect();
                    AppError::new(
                        2,
                        format!("Unknown series '{wanted}'. Known codes: {}.", known.join(", ")),
                    )
                })?;
            if !selected.iter().any(|l| l == def.label) {
                selected.push(def.label.to_string());
            }
        }
        config.selected = selected;
    }

    Ok(config)
}

/// Rewrite argv so `pulse` defaults to `pulse dash`.
///
/// Rules:
/// - `pulse`                        -> `pulse dash`
/// - `pulse --start 2020-01-01 ...` -> `pulse dash --start 2020-01-01 ...`
/// - `pulse --help/--version/-h`    -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("dash".to_string());
        return argv;
    };

    let is_top_level_help_or_version =
        matches!(arg1.as_str(), "-h" | "--help" | "-V" | "--version" | "help");
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "dash" | "report");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "dash flags".
    if arg1.starts_with('-') {
        argv.insert(1, "dash".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn args(series: &[&str]) -> RangeArgs {
        RangeArgs {
            start: NaiveDate::from_ymd_opt(2015, 1, 1).unwrap(),
            end: Some(NaiveDate::from_ymd_opt(2020, 1, 1).unwrap()),
            series: series.iter().map(|s| s.to_string()).collect(),
            no_resample: false,
        }
    }

    #[test]
    fn codes_resolve_to_registry_labels() {
        let config = dash_config_from_args(&args(&["ecomsa", "PCE"])).unwrap();
        assert_eq!(
            config.selected,
            vec![
                "E-commerce Sales (ECOMSA, Quarterly)".to_string(),
                "PCE - Personal Consumption".to_string(),
            ]
        );
    }

    #[test]
    fn unknown_series_is_a_config_error() {
        let err = dash_config_from_args(&args(&["NOPE"])).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn empty_selection_defaults_to_full_registry() {
        let config = dash_config_from_args(&args(&[])).unwrap();
        assert_eq!(config.selected.len(), SERIES_REGISTRY.len());
    }

    #[test]
    fn bare_invocation_rewrites_to_dash() {
        let argv = rewrite_args(vec!["pulse".to_string()]);
        assert_eq!(argv, vec!["pulse".to_string(), "dash".to_string()]);

        let argv = rewrite_args(vec!["pulse".to_string(), "--start".to_string()]);
        assert_eq!(argv[1], "dash");

        let argv = rewrite_args(vec!["pulse".to_string(), "report".to_string()]);
        assert_eq!(argv[1], "report");

        let argv = rewrite_args(vec!["pulse".to_string(), "--help".to_string()]);
        assert_eq!(argv[1], "--help");
    }
}
