//! Pairwise Pearson correlation of period-over-period returns.
//!
//! The input is the forward-filled aligned table (see DESIGN.md for why the
//! filled variant is used). Per column we compute the percent change between
//! consecutive rows, then jointly drop every row where *any* column's return
//! is undefined. Correlation is only computed over that strict intersection,
//! so a single sparse series shrinks the usable window for all pairs.

use crate::align::AlignedTable;

/// Symmetric matrix of pairwise correlation coefficients.
///
/// Cells are `None` when the coefficient is undefined: fewer than two jointly
/// valid return rows, or a zero-variance column. Undefined is a value here,
/// not an error.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    labels: Vec<String>,
    /// Row-major `n x n` cells.
    cells: Vec<Option<f64>>,
}

impl CorrelationMatrix {
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn get(&self, i: usize, j: usize) -> Option<f64> {
        let n = self.labels.len();
        if i >= n || j >= n {
            return None;
        }
        self.cells[i * n + j]
    }

    pub fn get_by_label(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.labels.iter().position(|l| l == a)?;
        let j = self.labels.iter().position(|l| l == b)?;
        self.get(i, j)
    }
}

/// Compute the full pairwise correlation matrix for `table`.
pub fn compute_correlations(table: &AlignedTable) -> CorrelationMatrix {
    let labels: Vec<String> = table.columns().iter().map(|c| c.label.clone()).collect();
    let n = labels.len();

    let returns: Vec<Vec<Option<f64>>> = table
        .columns()
        .iter()
        .map(|c| pct_change(&c.values))
        .collect();

    // Strict intersection: keep only row indices where every column has a
    // defined return.
    let n_rows = table.n_rows();
    let usable: Vec<usize> = (0..n_rows)
        .filter(|&row| returns.iter().all(|col| col[row].is_some()))
        .collect();

    let mut cells = vec![None; n * n];
    if usable.len() >= 2 {
        let compact: Vec<Vec<f64>> = returns
            .iter()
            .map(|col| usable.iter().map(|&row| col[row].unwrap_or(0.0)).collect())
            .collect();

        for i in 0..n {
            for j in i..n {
                let r = pearson(&compact[i], &compact[j]);
                cells[i * n + j] = r;
                cells[j * n + i] = r;
            }
        }
    }

    CorrelationMatrix { labels, cells }
}

/// Period-over-period percent change between consecutive slots.
///
/// The first slot has no predecessor and is always `None`; so is any slot
/// where either side is missing or the previous value is zero (no division
/// by zero, no infinities).
pub fn pct_change(values: &[Option<f64>]) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(values.len());
    for i in 0..values.len() {
        let r = if i == 0 {
            None
        } else {
            match (values[i - 1], values[i]) {
                (Some(prev), Some(curr)) if prev != 0.0 && prev.is_finite() => {
                    Some((curr - prev) / prev)
                }
                _ => None,
            }
        };
        out.push(r);
    }
    out
}

/// Pearson correlation coefficient, `None` when undefined.
fn pearson(x: &[f64], y: &[f64]) -> Option<f64> {
    let n = x.len().min(y.len());
    if n < 2 {
        return None;
    }

    let nf = n as f64;
    let mean_x = x[..n].iter().sum::<f64>() / nf;
    let mean_y = y[..n].iter().sum::<f64>() / nf;

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    for i in 0..n {
        let dx = x[i] - mean_x;
        let dy = y[i] - mean_y;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }

    let denom = (sxx * syy).sqrt();
    if denom <= 0.0 || !denom.is_finite() {
        return None;
    }

    // Floating-point roundoff can push |r| a hair past 1.
    Some((sxy / denom).clamp(-1.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::align::AlignedTable;
    use crate::domain::Series;
    use chrono::NaiveDate;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn daily(label: &str, values: &[f64]) -> Series {
        let obs = values
            .iter()
            .enumerate()
            .map(|(i, v)| (d(2020, 1, 1 + i as u32), *v));
        Series::from_observations(label, label, obs)
    }

    #[test]
    fn pct_change_first_row_and_gaps_are_undefined() {
        let values = vec![Some(10.0), Some(11.0), None, Some(12.0), Some(0.0), Some(5.0)];
        let r = pct_change(&values);
        assert_eq!(r[0], None);
        assert!((r[1].unwrap() - 0.1).abs() < 1e-12);
        assert_eq!(r[2], None); // current missing
        assert_eq!(r[3], None); // previous missing
        assert!((r[4].unwrap() - (-1.0)).abs() < 1e-12);
        assert_eq!(r[5], None); // previous value is zero
    }

    #[test]
    fn self_correlation_is_one() {
        let a = daily("A", &[10.0, 11.0, 10.5, 12.0, 11.0]);
        let table = AlignedTable::align(&[a], d(2020, 1, 1), d(2020, 1, 5));
        let corr = compute_correlations(&table);
        assert!((corr.get_by_label("A", "A").unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn opposite_moves_correlate_negatively() {
        let a = daily("A", &[10.0, 11.0, 10.0, 11.0, 10.0]);
        let b = daily("B", &[10.0, 9.0, 10.0, 9.0, 10.0]);
        let table = AlignedTable::align(&[a, b], d(2020, 1, 1), d(2020, 1, 5));
        let corr = compute_correlations(&table);
        let r = corr.get_by_label("A", "B").unwrap();
        assert!(r < -0.99, "expected strong negative correlation, got {r}");
        // Symmetry.
        assert_eq!(corr.get_by_label("A", "B"), corr.get_by_label("B", "A"));
    }

    #[test]
    fn disjoint_return_dates_yield_not_available_without_panicking() {
        // A has values only on days 1-3, B only on days 4-6: no row has a
        // defined return for both, so the joint intersection is empty.
        let a = Series::from_observations(
            "A",
            "A",
            vec![(d(2020, 1, 1), 1.0), (d(2020, 1, 2), 2.0), (d(2020, 1, 3), 3.0)],
        );
        let b = Series::from_observations(
            "B",
            "B",
            vec![(d(2020, 1, 4), 1.0), (d(2020, 1, 5), 2.0), (d(2020, 1, 6), 3.0)],
        );
        let table = AlignedTable::align(&[a, b], d(2020, 1, 1), d(2020, 1, 6));
        let corr = compute_correlations(&table);
        assert_eq!(corr.len(), 2);
        assert_eq!(corr.get_by_label("A", "B"), None);
        // The strict joint intersection is empty, so even self-correlations
        // are undefined here; nothing crashes.
        assert_eq!(corr.get_by_label("A", "A"), None);
    }

    #[test]
    fn constant_series_has_undefined_correlation() {
        let a = daily("A", &[10.0, 11.0, 12.0, 13.0]);
        let flat = daily("Flat", &[5.0, 5.0, 5.0, 5.0]);
        let table = AlignedTable::align(&[a, flat], d(2020, 1, 1), d(2020, 1, 4));
        let corr = compute_correlations(&table);
        assert_eq!(corr.get_by_label("A", "Flat"), None);
        assert_eq!(corr.get_by_label("Flat", "Flat"), None);
        // The non-degenerate pair still computes.
        assert!((corr.get_by_label("A", "A").unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn single_usable_row_is_undefined() {
        let a = daily("A", &[10.0, 11.0]);
        let b = daily("B", &[5.0, 6.0]);
        let table = AlignedTable::align(&[a, b], d(2020, 1, 1), d(2020, 1, 2));
        // Only one return row survives (day 2), below the two-row minimum.
        let corr = compute_correlations(&table);
        assert_eq!(corr.get_by_label("A", "B"), None);
    }

    #[test]
    fn empty_table_produces_empty_matrix() {
        let table = AlignedTable::align(&[], d(2020, 1, 1), d(2020, 1, 5));
        let corr = compute_correlations(&table);
        assert!(corr.is_empty());
    }
}
