//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - passed between the fetch/align/stats stages
//! - exported to CSV
//! - rendered by either the CLI report or the TUI

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Native release frequency of a registry series.
///
/// The FRED series we track are monthly or quarterly; daily granularity only
/// appears after alignment onto the calendar domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Monthly,
    Quarterly,
}

/// One entry of the fixed series registry.
#[derive(Debug, Clone, Copy)]
pub struct SeriesDef {
    /// Display label used as the column name everywhere.
    pub label: &'static str,
    /// FRED series code (the fetch identifier).
    pub code: &'static str,
    pub frequency: Frequency,
}

/// The fixed registry of retail-market series this dashboard knows about.
///
/// Selection is always a subset of these labels; the label doubles as the
/// join key for display columns, the code as the fetch identifier.
pub const SERIES_REGISTRY: &[SeriesDef] = &[
    SeriesDef {
        label: "Total Retail Sales (RSAFS, Monthly)",
        code: "RSAFS",
        frequency: Frequency::Monthly,
    },
    SeriesDef {
        label: "E-commerce Sales (ECOMSA, Quarterly)",
        code: "ECOMSA",
        frequency: Frequency::Quarterly,
    },
    SeriesDef {
        label: "Retail Employment (CEU4200000001, Monthly)",
        code: "CEU4200000001",
        frequency: Frequency::Monthly,
    },
    SeriesDef {
        label: "Clothing & Accessories Sales",
        code: "MRTSSM448USS",
        frequency: Frequency::Monthly,
    },
    SeriesDef {
        label: "Consumer Sentiment (UM)",
        code: "UMCSENT",
        frequency: Frequency::Monthly,
    },
    SeriesDef {
        label: "PCE - Personal Consumption",
        code: "PCE",
        frequency: Frequency::Monthly,
    },
    SeriesDef {
        label: "Personal Savings Rate",
        code: "PSAVERT",
        frequency: Frequency::Monthly,
    },
];

/// Look up a registry entry by display label.
pub fn registry_lookup(label: &str) -> Option<&'static SeriesDef> {
    SERIES_REGISTRY.iter().find(|def| def.label == label)
}

/// A dated numeric series for one source identifier.
///
/// Observations are keyed by date, which enforces both ordering and the
/// no-duplicate-dates invariant by construction. Sparse dates simply have no
/// entry; explicit missing markers only appear after alignment.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    /// Display label (column name). Distinct from the source code: a
    /// normalized series keeps its code but gets a new label.
    pub label: String,
    /// Source identifier (FRED code). Shared between a series and its
    /// normalized variant, which is how chart dedup pairs them up.
    pub code: String,
    /// True when this series was produced by the frequency normalizer.
    pub normalized: bool,
    points: BTreeMap<NaiveDate, f64>,
}

impl Series {
    pub fn new(label: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            code: code.into(),
            normalized: false,
            points: BTreeMap::new(),
        }
    }

    /// Build from (date, value) pairs. Later duplicates of a date win.
    pub fn from_observations(
        label: impl Into<String>,
        code: impl Into<String>,
        observations: impl IntoIterator<Item = (NaiveDate, f64)>,
    ) -> Self {
        let mut series = Self::new(label, code);
        for (date, value) in observations {
            series.insert(date, value);
        }
        series
    }

    pub fn insert(&mut self, date: NaiveDate, value: f64) {
        self.points.insert(date, value);
    }

    pub fn get(&self, date: NaiveDate) -> Option<f64> {
        self.points.get(&date).copied()
    }

    /// Most recent value at or before `date`, if any. This is the forward-fill
    /// lookup used by the frequency normalizer.
    pub fn latest_at(&self, date: NaiveDate) -> Option<f64> {
        self.points.range(..=date).next_back().map(|(_, v)| *v)
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.keys().next().copied()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.keys().next_back().copied()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Date-ordered iteration over observations.
    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.points.iter().map(|(d, v)| (*d, *v))
    }
}

/// A non-fatal per-series fetch failure, surfaced as a warning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchFailure {
    pub label: String,
    pub cause: String,
}

/// Immutable configuration for a single dashboard recomputation.
///
/// The pipeline is a pure function of this struct (plus the fetch cache);
/// nothing persists between runs.
#[derive(Debug, Clone)]
pub struct DashConfig {
    /// Inclusive start of the calendar domain.
    pub start: NaiveDate,
    /// Inclusive end of the calendar domain.
    pub end: NaiveDate,
    /// Selected registry labels, in registry order.
    pub selected: Vec<String>,
    /// Resample quarterly series to month-end with forward-fill.
    pub resample_quarterly: bool,
}

impl DashConfig {
    /// Default range matching the dashboard's original defaults:
    /// 2015-01-01 through today, all series selected, resampling on.
    pub fn with_today(today: NaiveDate) -> Self {
        Self {
            start: NaiveDate::from_ymd_opt(2015, 1, 1).unwrap_or(today),
            end: today,
            selected: SERIES_REGISTRY.iter().map(|d| d.label.to_string()).collect(),
            resample_quarterly: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn registry_labels_are_unique() {
        for (i, a) in SERIES_REGISTRY.iter().enumerate() {
            for b in &SERIES_REGISTRY[i + 1..] {
                assert_ne!(a.label, b.label);
                assert_ne!(a.code, b.code);
            }
        }
    }

    #[test]
    fn series_deduplicates_dates_last_write_wins() {
        let s = Series::from_observations(
            "A",
            "A",
            vec![(d(2020, 1, 1), 1.0), (d(2020, 1, 1), 2.0)],
        );
        assert_eq!(s.len(), 1);
        assert_eq!(s.get(d(2020, 1, 1)), Some(2.0));
    }

    #[test]
    fn latest_at_carries_prior_value() {
        let s = Series::from_observations(
            "A",
            "A",
            vec![(d(2020, 1, 1), 1.0), (d(2020, 3, 1), 3.0)],
        );
        assert_eq!(s.latest_at(d(2020, 2, 15)), Some(1.0));
        assert_eq!(s.latest_at(d(2020, 3, 1)), Some(3.0));
        assert_eq!(s.latest_at(d(2019, 12, 31)), None);
    }
}
