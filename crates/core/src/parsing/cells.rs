use chrono::NaiveDateTime;

use crate::models::validation::{IssueCode, ValidationIssue};

/// Date-time layout used by every broker sheet: `08.11.2025 14:03:27`.
pub const BROKER_DATETIME_FORMAT: &str = "%d.%m.%Y %H:%M:%S";

// ── Cell parsers ─────────────────────────────────────────────────────

/// Parse a numeric cell. Accepts `1234.56`, `1 234,56` and `-0,5`.
/// Returns `None` for anything that is not a finite number.
pub fn parse_number(s: &str) -> Option<f64> {
    let cleaned: String = s
        .trim()
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| if c == ',' { '.' } else { c })
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Parse a broker date-time cell.
pub fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s.trim(), BROKER_DATETIME_FORMAT).ok()
}

/// Extract the share count from a trade comment such as `"OPEN BUY 5/10 @ 123.45"`.
///
/// The quantity is the third space-separated token; partial fills are written
/// as `filled/ordered` and only the numerator counts. Anything else yields
/// `NaN` so the caller can tell a broken comment from a zero quantity.
pub fn parse_comment_quantity(comment: &str) -> f64 {
    comment
        .split_whitespace()
        .nth(2)
        .and_then(|token| token.split('/').next())
        .and_then(|numerator| numerator.parse::<f64>().ok())
        .unwrap_or(f64::NAN)
}

// ── Row reader ───────────────────────────────────────────────────────

/// Positional accessor over one row that records an issue for every bad cell.
///
/// Accessors return `None` on failure; the caller builds its record only if
/// [`RowReader::finish`] reports no issues.
pub struct RowReader<'a> {
    cells: &'a [String],
    issues: Vec<ValidationIssue>,
}

impl<'a> RowReader<'a> {
    pub fn new(cells: &'a [String]) -> Self {
        Self {
            cells,
            issues: Vec::new(),
        }
    }

    fn cell(&self, idx: usize) -> Option<&'a str> {
        self.cells
            .get(idx)
            .map(|c| c.trim())
            .filter(|c| !c.is_empty())
    }

    pub fn report(&mut self, issue: ValidationIssue) {
        self.issues.push(issue);
    }

    /// Trimmed text of a cell that may be blank.
    pub fn optional_text(&self, idx: usize) -> Option<String> {
        self.cell(idx).map(str::to_string)
    }

    pub fn text(&mut self, idx: usize, field: &str) -> Option<String> {
        match self.cell(idx) {
            Some(value) => Some(value.to_string()),
            None => {
                self.report(ValidationIssue::new(field, IssueCode::Missing, "Required"));
                None
            }
        }
    }

    pub fn number(&mut self, idx: usize, field: &str) -> Option<f64> {
        let raw = self.text(idx, field)?;
        match parse_number(&raw) {
            Some(n) => Some(n),
            None => {
                self.report(
                    ValidationIssue::new(field, IssueCode::InvalidNumber, "Expected number")
                        .with_value(raw),
                );
                None
            }
        }
    }

    pub fn datetime(&mut self, idx: usize, field: &str) -> Option<NaiveDateTime> {
        let raw = self.text(idx, field)?;
        match parse_datetime(&raw) {
            Some(dt) => Some(dt),
            None => {
                self.report(
                    ValidationIssue::new(
                        field,
                        IssueCode::InvalidDate,
                        format!("Expected date in format {BROKER_DATETIME_FORMAT}"),
                    )
                    .with_value(raw),
                );
                None
            }
        }
    }

    /// Match a cell against a closed set of labels.
    pub fn one_of<T>(
        &mut self,
        idx: usize,
        field: &str,
        parse: impl Fn(&str) -> Option<T>,
        allowed: Vec<String>,
    ) -> Option<T> {
        let raw = self.text(idx, field)?;
        match parse(&raw) {
            Some(value) => Some(value),
            None => {
                self.report(
                    ValidationIssue::new(
                        field,
                        IssueCode::InvalidEnum,
                        format!("Invalid enum value. Expected one of: {}", allowed.join(", ")),
                    )
                    .with_value(raw)
                    .with_values(allowed),
                );
                None
            }
        }
    }

    /// Issues collected so far; `Ok` only when the row is clean.
    pub fn finish(self) -> Result<(), Vec<ValidationIssue>> {
        if self.issues.is_empty() {
            Ok(())
        } else {
            Err(self.issues)
        }
    }
}
