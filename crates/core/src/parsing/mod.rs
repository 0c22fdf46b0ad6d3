//! Turning raw sheet rows (arrays of cell text) into validated records.
//!
//! Every sheet of a broker export has the same shape: some account metadata,
//! a header row whose second cell is a known label, the data rows, and
//! sometimes a totals footer. [`skip_until_marker`] drops everything up to and
//! including the header row, and [`validate_rows`] validates what is left with
//! partial-failure semantics.

pub mod cash_operations;
pub mod cells;
pub mod header;
pub mod positions;
pub mod workbook;

use crate::models::validation::{Partitioned, ValidationFailure, ValidationIssue};

/// A record type that can be read positionally from one sheet row.
pub trait RowSchema: Sized {
    /// Second-cell label of the sheet's header row.
    const MARKERS: &'static [&'static str];

    /// Validate one row. All problems of the row are reported together.
    fn from_cells(cells: &[String]) -> Result<Self, Vec<ValidationIssue>>;
}

/// Validate every row independently. Never fails: a bad row lands in
/// `failures` with its issues, so `successes.len() + failures.len() == rows.len()`.
pub fn validate_rows<T: RowSchema>(rows: &[Vec<String>]) -> Partitioned<T, ValidationFailure> {
    Partitioned::from_results(rows.iter().map(|row| {
        T::from_cells(row).map_err(|issues| ValidationFailure {
            row: row.clone(),
            issues,
        })
    }))
}

/// Rows strictly after the first row whose second cell equals one of `markers`.
/// Empty when no marker row exists.
pub fn skip_until_marker(rows: &[Vec<String>], markers: &[&str]) -> Vec<Vec<String>> {
    rows.iter()
        .position(|row| {
            row.get(1)
                .map(|cell| markers.contains(&cell.trim()))
                .unwrap_or(false)
        })
        .map(|idx| rows[idx + 1..].to_vec())
        .unwrap_or_default()
}

/// Drop rows whose cells are all blank (spacer rows in the exports).
pub fn drop_blank_rows(rows: Vec<Vec<String>>) -> Vec<Vec<String>> {
    rows.into_iter()
        .filter(|row| row.iter().any(|cell| !cell.trim().is_empty()))
        .collect()
}

/// Drop the totals footer: a row with no identifier whose cells include `Total`.
pub fn drop_total_rows(rows: Vec<Vec<String>>) -> Vec<Vec<String>> {
    rows.into_iter()
        .filter(|row| {
            let has_id = row.get(1).map(|c| !c.trim().is_empty()).unwrap_or(false);
            has_id || !row.iter().any(|cell| cell.trim() == "Total")
        })
        .collect()
}

/// Locate the table of `T` in a sheet and validate its rows.
pub fn parse_sheet<T: RowSchema>(rows: &[Vec<String>]) -> Partitioned<T, ValidationFailure> {
    let body = drop_total_rows(drop_blank_rows(skip_until_marker(rows, T::MARKERS)));
    validate_rows(&body)
}
