//! The aligned table: many series joined onto one dense daily calendar.
//!
//! Alignment is an exact-date join: a cell is populated only when the source
//! series has an observation on that exact calendar day. Forward-fill is a
//! separate, explicit step so downstream consumers can choose which variant
//! they operate on instead of silently inheriting filled values.

use chrono::{Days, NaiveDate};

use crate::domain::Series;

/// One column of an aligned table.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub label: String,
    pub code: String,
    pub normalized: bool,
    /// One slot per domain date; `None` marks a missing value.
    pub values: Vec<Option<f64>>,
}

/// Multiple series reindexed onto the same dense daily date domain.
///
/// Invariant: `values.len() == dates.len()` for every column.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedTable {
    dates: Vec<NaiveDate>,
    columns: Vec<Column>,
}

impl AlignedTable {
    /// Join `series` onto the dense daily domain `[start, end]` inclusive.
    ///
    /// An inverted range (`start > end`) yields an empty domain: zero rows for
    /// every column, no error. Duplicate labels are a caller error; the last
    /// series with a given label wins.
    pub fn align(series: &[Series], start: NaiveDate, end: NaiveDate) -> Self {
        let dates = daily_domain(start, end);

        let mut columns: Vec<Column> = Vec::with_capacity(series.len());
        for s in series {
            let values: Vec<Option<f64>> = dates.iter().map(|d| s.get(*d)).collect();
            let column = Column {
                label: s.label.clone(),
                code: s.code.clone(),
                normalized: s.normalized,
                values,
            };
            match columns.iter_mut().find(|c| c.label == column.label) {
                Some(existing) => *existing = column,
                None => columns.push(column),
            }
        }

        Self { dates, columns }
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, label: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.label == label)
    }

    pub fn n_rows(&self) -> usize {
        self.dates.len()
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty() || self.columns.is_empty()
    }

    /// A new table with every internal gap forward-filled per column.
    ///
    /// Leading gaps (before a column's first value) stay missing; only the
    /// last known value is propagated, never anything invented.
    pub fn forward_fill(&self) -> Self {
        let columns = self
            .columns
            .iter()
            .map(|c| {
                let mut last: Option<f64> = None;
                let values = c
                    .values
                    .iter()
                    .map(|v| {
                        if v.is_some() {
                            last = *v;
                        }
                        last
                    })
                    .collect();
                Column {
                    label: c.label.clone(),
                    code: c.code.clone(),
                    normalized: c.normalized,
                    values,
                }
            })
            .collect();

        Self {
            dates: self.dates.clone(),
            columns,
        }
    }

    /// Rows whose date lies within `[start, end]` inclusive.
    ///
    /// Inverted bounds give an empty window, matching the domain rule.
    pub fn window(&self, start: NaiveDate, end: NaiveDate) -> Self {
        let lo = self.dates.partition_point(|d| *d < start);
        let hi = self.dates.partition_point(|d| *d <= end);
        let (lo, hi) = if lo <= hi { (lo, hi) } else { (lo, lo) };

        let columns = self
            .columns
            .iter()
            .map(|c| Column {
                label: c.label.clone(),
                code: c.code.clone(),
                normalized: c.normalized,
                values: c.values[lo..hi].to_vec(),
            })
            .collect();

        Self {
            dates: self.dates[lo..hi].to_vec(),
            columns,
        }
    }

    /// Columns to plot on the combined chart.
    ///
    /// When a normalized (month-end) variant and its coarser original are both
    /// present, they share a source code; the original is excluded so the same
    /// underlying data is not drawn twice. Both columns stay in the table for
    /// KPI and correlation purposes.
    pub fn chart_columns(&self) -> Vec<&Column> {
        self.columns
            .iter()
            .filter(|c| {
                c.normalized
                    || !self
                        .columns
                        .iter()
                        .any(|other| other.normalized && other.code == c.code)
            })
            .collect()
    }
}

fn daily_domain(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    let mut dates = Vec::new();
    let mut cursor = start;
    while cursor <= end {
        dates.push(cursor);
        cursor = match cursor.checked_add_days(Days::new(1)) {
            Some(next) => next,
            None => break,
        };
    }
    dates
}
