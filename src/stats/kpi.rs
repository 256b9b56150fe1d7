//! KPI computation: latest value and percent change from window start.
//!
//! All values here are numeric with an explicit not-available sentinel
//! (`None`); formatting (separators, signs, percent symbols) belongs to the
//! report/TUI layers.

use crate::align::AlignedTable;

/// Per-series KPI values for one window.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct KpiRecord {
    /// Last non-missing value in the window.
    pub latest: Option<f64>,
    /// First non-missing value in the window.
    pub first: Option<f64>,
    /// `(latest - first) / first * 100`, only when `first` is present,
    /// finite and non-zero. A zero first value is N/A, never a division.
    pub delta_pct: Option<f64>,
}

/// A labeled KPI record, in table column order.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesKpi {
    pub label: String,
    pub record: KpiRecord,
}

/// Compute KPIs for every column of a (typically windowed, forward-filled)
/// table. Columns with no valid value in the window yield an all-N/A record.
pub fn compute_kpis(window: &AlignedTable) -> Vec<SeriesKpi> {
    window
        .columns()
        .iter()
        .map(|c| {
            let mut valid = c.values.iter().flatten().copied();
            let first = valid.next();
            let latest = valid.last().or(first);

            let delta_pct = match (first, latest) {
                (Some(f), Some(l)) if f.is_finite() && f != 0.0 => Some((l - f) / f * 100.0),
                _ => None,
            };

            SeriesKpi {
                label: c.label.clone(),
                record: KpiRecord {
                    latest,
                    first,
                    delta_pct,
                },
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Series;
    use chrono::NaiveDate;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn table_of(values: Vec<(NaiveDate, f64)>) -> AlignedTable {
        let series = Series::from_observations("A", "A", values);
        AlignedTable::align(&[series], d(2020, 1, 1), d(2020, 1, 10))
    }

    #[test]
    fn delta_is_percent_change_from_first_valid() {
        let table = table_of(vec![(d(2020, 1, 2), 100.0), (d(2020, 1, 9), 150.0)]);
        let kpis = compute_kpis(&table);
        assert_eq!(kpis.len(), 1);
        let r = kpis[0].record;
        assert_eq!(r.first, Some(100.0));
        assert_eq!(r.latest, Some(150.0));
        assert!((r.delta_pct.unwrap() - 50.0).abs() < 1e-12);
    }

    #[test]
    fn zero_first_value_routes_to_not_available() {
        let table = table_of(vec![(d(2020, 1, 1), 0.0), (d(2020, 1, 5), 50.0)]);
        let r = compute_kpis(&table)[0].record;
        assert_eq!(r.first, Some(0.0));
        assert_eq!(r.latest, Some(50.0));
        assert_eq!(r.delta_pct, None);
    }

    #[test]
    fn empty_column_is_all_not_available() {
        let table = table_of(vec![]);
        let r = compute_kpis(&table)[0].record;
        assert_eq!(r, KpiRecord::default());
    }

    #[test]
    fn single_valid_value_is_its_own_latest() {
        let table = table_of(vec![(d(2020, 1, 4), 7.0)]);
        let r = compute_kpis(&table)[0].record;
        assert_eq!(r.first, Some(7.0));
        assert_eq!(r.latest, Some(7.0));
        assert!((r.delta_pct.unwrap() - 0.0).abs() < 1e-12);
    }

    #[test]
    fn leading_gap_is_skipped_not_counted() {
        // First valid value is at day 5 even though the window starts at day 1.
        let table = table_of(vec![(d(2020, 1, 5), 10.0), (d(2020, 1, 8), 12.0)]);
        let r = compute_kpis(&table)[0].record;
        assert_eq!(r.first, Some(10.0));
        assert_eq!(r.latest, Some(12.0));
        assert!((r.delta_pct.unwrap() - 20.0).abs() < 1e-12);
    }
}
