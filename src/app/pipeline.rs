//! Shared dashboard pipeline used by both CLI and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! fetch -> normalize -> align -> forward-fill -> KPIs/correlations
//!
//! The CLI and the TUI can then focus on presentation (printing vs widgets).
//! Every run is a pure function of the `DashConfig`; only the fetch cache
//! inside `FredClient` carries state between runs, and only to skip repeat
//! network calls for identical (code, start, end) requests.

use crate::align::{AlignedTable, resample_month_end};
use crate::data::FredClient;
use crate::domain::{DashConfig, FetchFailure, Frequency, Series, registry_lookup};
use crate::stats::{CorrelationMatrix, SeriesKpi, compute_correlations, compute_kpis};

/// All computed outputs of a single dashboard run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    /// Exact-date join onto the daily domain; gaps intact.
    pub table: AlignedTable,
    /// Forward-filled variant; KPI, chart and correlation input.
    pub filled: AlignedTable,
    pub kpis: Vec<SeriesKpi>,
    pub correlations: CorrelationMatrix,
    /// Per-series fetch failures, surfaced as non-fatal warnings.
    pub failures: Vec<FetchFailure>,
}

/// Outcome of one recomputation pass.
///
/// The non-ready variants are states to render, not errors: a missing API key
/// short-circuits before any fetch, and an empty result set is informational.
#[derive(Debug, Clone)]
pub enum Dashboard {
    /// No API key configured; nothing was fetched.
    AwaitingKey,
    /// Nothing selected or every fetch failed.
    NoData { failures: Vec<FetchFailure> },
    Ready(RunOutput),
}

/// Execute the full pipeline: fetch the selected series, then compute.
pub fn run_dashboard(client: Option<&mut FredClient>, config: &DashConfig) -> Dashboard {
    let Some(client) = client else {
        return Dashboard::AwaitingKey;
    };

    let mut series = Vec::new();
    let mut failures = Vec::new();

    for label in &config.selected {
        let Some(def) = registry_lookup(label) else {
            failures.push(FetchFailure {
                label: label.clone(),
                cause: "Unknown series label.".to_string(),
            });
            continue;
        };

        match client.fetch_series(def.label, def.code, config.start, config.end) {
            Ok(fetched) => {
                if config.resample_quarterly && def.frequency == Frequency::Quarterly {
                    // Keep the original alongside the month-end variant; the
                    // chart dedups, everything else can reference either.
                    let monthly = resample_month_end(&fetched);
                    series.push(fetched);
                    series.push(monthly);
                } else {
                    series.push(fetched);
                }
            }
            Err(failure) => failures.push(failure),
        }
    }

    run_with_series(series, failures, config)
}

/// Compute stage of the pipeline, split out so it is testable without a
/// network client.
pub fn run_with_series(
    series: Vec<Series>,
    failures: Vec<FetchFailure>,
    config: &DashConfig,
) -> Dashboard {
    if series.is_empty() {
        return Dashboard::NoData { failures };
    }

    let table = AlignedTable::align(&series, config.start, config.end);
    let filled = table.forward_fill();
    let kpis = compute_kpis(&filled);
    let correlations = compute_correlations(&filled);

    Dashboard::Ready(RunOutput {
        table,
        filled,
        kpis,
        correlations,
        failures,
    })
}
