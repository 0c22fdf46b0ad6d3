use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of problem found in a single cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCode {
    /// Cell absent or blank.
    Missing,
    /// Cell present but not a finite number.
    InvalidNumber,
    /// Cell present but not in the broker date-time format.
    InvalidDate,
    /// Cell not one of a closed set of values.
    InvalidEnum,
    /// Cell parsed but violates a domain rule.
    InvalidValue,
}

impl fmt::Display for IssueCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            IssueCode::Missing => "missing",
            IssueCode::InvalidNumber => "invalid_number",
            IssueCode::InvalidDate => "invalid_date",
            IssueCode::InvalidEnum => "invalid_enum",
            IssueCode::InvalidValue => "invalid_value",
        };
        f.write_str(s)
    }
}

/// One structured problem with one field of a row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// Field path, e.g. `["time"]`.
    pub path: Vec<String>,
    pub code: IssueCode,
    pub message: String,
    /// The rejected cell text, when there was one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// For [`IssueCode::InvalidEnum`]: every value that would have been accepted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<String>>,
}

impl ValidationIssue {
    pub fn new(field: &str, code: IssueCode, message: impl Into<String>) -> Self {
        Self {
            path: vec![field.to_string()],
            code,
            message: message.into(),
            value: None,
            values: None,
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_values(mut self, values: Vec<String>) -> Self {
        self.values = Some(values);
        self
    }

    /// The issue path joined with dots, for log lines.
    pub fn path_string(&self) -> String {
        self.path.join(".")
    }
}

/// A row that failed validation, together with every issue found in it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationFailure {
    pub row: Vec<String>,
    pub issues: Vec<ValidationIssue>,
}

impl ValidationFailure {
    /// Human readable one-line summary (`time: invalid_date (...)`).
    pub fn summary(&self) -> String {
        self.issues
            .iter()
            .map(|i| format!("{}: {} ({})", i.path_string(), i.code, i.message))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Successes and failures of a batch where every item is independent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Partitioned<T, E> {
    pub successes: Vec<T>,
    pub failures: Vec<E>,
}

impl<T, E> Partitioned<T, E> {
    pub fn new() -> Self {
        Self {
            successes: Vec::new(),
            failures: Vec::new(),
        }
    }

    /// Split results into two lists, preserving order within each.
    pub fn from_results<I>(results: I) -> Self
    where
        I: IntoIterator<Item = Result<T, E>>,
    {
        results.into_iter().fold(Self::new(), |mut acc, result| {
            acc.push(result);
            acc
        })
    }

    pub fn push(&mut self, result: Result<T, E>) {
        match result {
            Ok(value) => self.successes.push(value),
            Err(error) => self.failures.push(error),
        }
    }

    pub fn extend(&mut self, other: Partitioned<T, E>) {
        self.successes.extend(other.successes);
        self.failures.extend(other.failures);
    }

    pub fn len(&self) -> usize {
        self.successes.len() + self.failures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T, E> Default for Partitioned<T, E> {
    fn default() -> Self {
        Self::new()
    }
}
