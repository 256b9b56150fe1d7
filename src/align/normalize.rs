//! Frequency normalization: resample a coarse series to month-end.
//!
//! Quarterly releases (ECOMSA) look sparse next to monthly series, so the
//! dashboard can optionally resample them onto month-end dates, carrying the
//! most recent observation forward into months with no native release. The
//! resampled series is a *new* column with its own label; the original stays
//! available and chart dedup decides which one gets plotted.

use chrono::{Datelike, Days, Months, NaiveDate};

use crate::domain::Series;

/// Last calendar day of `date`'s month.
pub fn month_end(date: NaiveDate) -> NaiveDate {
    let first = date.with_day(1).unwrap_or(date);
    first
        .checked_add_months(Months::new(1))
        .and_then(|d| d.checked_sub_days(Days::new(1)))
        .unwrap_or(date)
}

/// Display label for the month-end resampled variant of `label`.
///
/// Registry labels carry their frequency in parentheses, so the common case
/// is a direct swap; anything else gets an explicit suffix.
pub fn monthly_label(label: &str) -> String {
    if label.contains("Quarterly") {
        label.replace("Quarterly", "Monthly")
    } else {
        format!("{label} (Monthly)")
    }
}

/// Resample a series to month-end frequency with forward-fill.
///
/// For every month-end from the first observation's month through the last
/// observation's month, the value is the most recent native observation at or
/// before that date. Months before the first observation stay absent, so no
/// values are invented at the front. An empty input yields an empty output.
pub fn resample_month_end(series: &Series) -> Series {
    let mut out = Series::new(monthly_label(&series.label), series.code.clone());
    out.normalized = true;

    let (Some(first), Some(last)) = (series.first_date(), series.last_date()) else {
        return out;
    };

    let mut cursor = month_end(first);
    let stop = month_end(last);
    while cursor <= stop {
        if let Some(value) = series.latest_at(cursor) {
            out.insert(cursor, value);
        }
        cursor = month_end(
            cursor
                .checked_add_days(Days::new(1))
                .unwrap_or(cursor),
        );
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn month_end_handles_lengths_and_leap_years() {
        assert_eq!(month_end(d(2020, 1, 15)), d(2020, 1, 31));
        assert_eq!(month_end(d(2020, 2, 1)), d(2020, 2, 29));
        assert_eq!(month_end(d(2021, 2, 28)), d(2021, 2, 28));
        assert_eq!(month_end(d(2020, 4, 30)), d(2020, 4, 30));
        assert_eq!(month_end(d(2020, 12, 31)), d(2020, 12, 31));
    }

    #[test]
    fn monthly_label_swaps_frequency() {
        assert_eq!(
            monthly_label("E-commerce Sales (ECOMSA, Quarterly)"),
            "E-commerce Sales (ECOMSA, Monthly)"
        );
        assert_eq!(monthly_label("PCE"), "PCE (Monthly)");
    }

    #[test]
    fn resample_fills_intermediate_months() {
        let quarterly = Series::from_observations(
            "E-commerce Sales (ECOMSA, Quarterly)",
            "ECOMSA",
            vec![(d(2020, 3, 31), 100.0), (d(2020, 6, 30), 110.0)],
        );

        let monthly = resample_month_end(&quarterly);
        assert!(monthly.normalized);
        assert_eq!(monthly.label, "E-commerce Sales (ECOMSA, Monthly)");
        assert_eq!(monthly.code, "ECOMSA");

        assert_eq!(monthly.get(d(2020, 3, 31)), Some(100.0));
        assert_eq!(monthly.get(d(2020, 4, 30)), Some(100.0));
        assert_eq!(monthly.get(d(2020, 5, 31)), Some(100.0));
        assert_eq!(monthly.get(d(2020, 6, 30)), Some(110.0));
        assert_eq!(monthly.len(), 4);
    }

    #[test]
    fn resample_round_trips_quarter_end_values() {
        let quarterly = Series::from_observations(
            "Q",
            "Q",
            vec![
                (d(2019, 12, 31), 90.0),
                (d(2020, 3, 31), 100.0),
                (d(2020, 6, 30), 110.0),
                (d(2020, 9, 30), 105.0),
            ],
        );

        let monthly = resample_month_end(&quarterly);
        for (date, value) in quarterly.iter() {
            assert_eq!(monthly.get(date), Some(value));
        }
    }

    #[test]
    fn resample_mid_month_observation_lands_on_month_end() {
        let series = Series::from_observations("A", "A", vec![(d(2020, 1, 10), 5.0)]);
        let monthly = resample_month_end(&series);
        assert_eq!(monthly.len(), 1);
        assert_eq!(monthly.get(d(2020, 1, 31)), Some(5.0));
    }

    #[test]
    fn resample_empty_is_empty() {
        let empty = Series::new("A", "A");
        let monthly = resample_month_end(&empty);
        assert!(monthly.is_empty());
        assert!(monthly.normalized);
    }
}
