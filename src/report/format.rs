//! Terminal formatting for the dashboard report.
//!
//! The stats layer only exposes numbers and `None` sentinels; everything
//! display-related (thousands separators, signs, "N/A") lives here.

use crate::app::pipeline::RunOutput;
use crate::domain::{DashConfig, FetchFailure};
use crate::stats::{CorrelationMatrix, SeriesKpi};

/// Format the run header: range, column/row counts, cache-visible stats.
pub fn format_run_summary(run: &RunOutput, config: &DashConfig) -> String {
    let mut out = String::new();

    out.push_str("=== pulse - Retail Market Dashboard (FRED-based) ===\n");
    out.push_str(&format!("Range: {} .. {} (inclusive)\n", config.start, config.end));
    out.push_str(&format!(
        "Aligned: {} daily rows x {} columns\n",
        run.table.n_rows(),
        run.table.n_cols(),
    ));
    if config.resample_quarterly {
        out.push_str("Quarterly series resampled to month-end (forward-fill).\n");
    }

    out
}

/// Format per-series fetch failures as warning lines (may be empty).
pub fn format_failures(failures: &[FetchFailure]) -> String {
    let mut out = String::new();
    for f in failures {
        out.push_str(&format!("warning: failed to load {}: {}\n", f.label, f.cause));
    }
    out
}

/// Format the KPI table: latest value and percent change vs window start.
pub fn format_kpis(kpis: &[SeriesKpi]) -> String {
    let mut out = String::new();

    out.push_str("KPIs (latest vs first valid value in range):\n");
    out.push_str(&format!("{:<44} {:>16} {:>18}\n", "series", "latest", "delta"));
    out.push_str(&format!("{:-<44} {:-<16} {:-<18}\n", "", "", ""));

    for kpi in kpis {
        let latest = kpi
            .record
            .latest
            .map(fmt_thousands)
            .unwrap_or_else(|| "N/A".to_string());
        let delta = kpi
            .record
            .delta_pct
            .map(|d| format!("{d:+.2}% vs first"))
            .unwrap_or_else(|| "N/A".to_string());
        out.push_str(&format!(
            "{:<44} {:>16} {:>18}\n",
            truncate(&kpi.label, 44),
            latest,
            delta,
        ));
    }

    out
}

/// Format the correlation matrix with a numbered legend.
///
/// Registry labels are long, so columns are numbered and a legend maps the
/// numbers back to labels. Undefined cells print as a dot.
pub fn format_correlations(corr: &CorrelationMatrix) -> String {
    let mut out = String::new();

    out.push_str("Correlation (pct change):\n");
    if corr.is_empty() {
        out.push_str("(no series)\n");
        return out;
    }

    out.push_str(&format!("{:<4}", ""));
    for j in 0..corr.len() {
        out.push_str(&format!("{:>7}", format!("[{}]", j + 1)));
    }
    out.push('\n');

    for i in 0..corr.len() {
        out.push_str(&format!("{:<4}", format!("[{}]", i + 1)));
        for j in 0..corr.len() {
            match corr.get(i, j) {
                Some(r) => out.push_str(&format!("{r:>7.2}")),
                None => out.push_str(&format!("{:>7}", ".")),
            }
        }
        out.push('\n');
    }

    out.push('\n');
    for (i, label) in corr.labels().iter().enumerate() {
        out.push_str(&format!("[{}] {}\n", i + 1, label));
    }

    out
}

/// `1234567.891` -> `1,234,567.89`.
fn fmt_thousands(v: f64) -> String {
    let raw = format!("{:.2}", v.abs());
    let (int_part, frac_part) = raw.split_once('.').unwrap_or((raw.as_str(), "00"));

    let mut grouped = String::new();
    let digits: Vec<char> = int_part.chars().collect();
    for (i, ch) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(*ch);
    }

    let sign = if v < 0.0 { "-" } else { "" };
    format!("{sign}{grouped}.{frac_part}")
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::align::AlignedTable;
    use crate::domain::Series;
    use crate::stats::{KpiRecord, compute_correlations};
    use chrono::NaiveDate;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn thousands_grouping() {
        assert_eq!(fmt_thousands(1234567.891), "1,234,567.89");
        assert_eq!(fmt_thousands(999.5), "999.50");
        assert_eq!(fmt_thousands(-1000.0), "-1,000.00");
        assert_eq!(fmt_thousands(0.0), "0.00");
    }

    #[test]
    fn kpi_rows_show_na_sentinels() {
        let kpis = vec![
            SeriesKpi {
                label: "A".to_string(),
                record: KpiRecord {
                    latest: Some(150.0),
                    first: Some(100.0),
                    delta_pct: Some(50.0),
                },
            },
            SeriesKpi {
                label: "B".to_string(),
                record: KpiRecord::default(),
            },
        ];
        let text = format_kpis(&kpis);
        assert!(text.contains("+50.00% vs first"));
        assert!(text.contains("N/A"));
        assert!(text.contains("150.00"));
    }

    #[test]
    fn correlation_matrix_prints_legend_and_dots() {
        let a = Series::from_observations(
            "Alpha",
            "A",
            vec![(d(2020, 1, 1), 1.0), (d(2020, 1, 2), 2.0), (d(2020, 1, 3), 1.5)],
        );
        let flat = Series::from_observations(
            "Flat",
            "F",
            vec![(d(2020, 1, 1), 5.0), (d(2020, 1, 2), 5.0), (d(2020, 1, 3), 5.0)],
        );
        let table = AlignedTable::align(&[a, flat], d(2020, 1, 1), d(2020, 1, 3));
        let corr = compute_correlations(&table);

        let text = format_correlations(&corr);
        assert!(text.contains("[1] Alpha"));
        assert!(text.contains("[2] Flat"));
        assert!(text.contains("1.00"));
        assert!(text.contains('.'));
    }

    #[test]
    fn failures_format_one_warning_per_line() {
        let failures = vec![FetchFailure {
            label: "PCE - Personal Consumption".to_string(),
            cause: "status 429".to_string(),
        }];
        let text = format_failures(&failures);
        assert_eq!(
            text,
            "warning: failed to load PCE - Personal Consumption: status 429\n"
        );
        assert!(format_failures(&[]).is_empty());
    }
}
