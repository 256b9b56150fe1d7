//! Export the aligned table to CSV.
//!
//! The export is meant to be easy to consume in spreadsheets or downstream
//! scripts: one row per calendar day, one column per series, empty cells for
//! missing values.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::align::AlignedTable;
use crate::error::AppError;

/// Write the aligned table to a CSV file.
pub fn write_table_csv(path: &Path, table: &AlignedTable) -> Result<(), AppError> {
    let mut file = File::create(path).map_err(|e| {
        AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display()))
    })?;

    let mut header = vec!["date".to_string()];
    header.extend(table.columns().iter().map(|c| csv_field(&c.label)));
    writeln!(file, "{}", header.join(","))
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV header: {e}")))?;

    for (row, date) in table.dates().iter().enumerate() {
        let mut fields = vec![date.to_string()];
        for c in table.columns() {
            fields.push(
                c.values[row]
                    .map(|v| format!("{v:.6}"))
                    .unwrap_or_default(),
            );
        }
        writeln!(file, "{}", fields.join(","))
            .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
    }

    Ok(())
}

/// Quote a field when it contains CSV metacharacters.
///
/// Registry labels contain commas ("Total Retail Sales (RSAFS, Monthly)"),
/// so the header needs proper quoting.
fn csv_field(raw: &str) -> String {
    if raw.contains(',') || raw.contains('"') || raw.contains('\n') {
        format!("\"{}\"", raw.replace('"', "\"\""))
    } else {
        raw.to_string()
    }
}
