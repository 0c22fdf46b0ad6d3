use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use tracing::debug;

use crate::errors::CoreError;

/// Named sheets of raw cell text, as extracted from a broker export.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Workbook {
    sheets: BTreeMap<String, Vec<Vec<String>>>,
}

impl Workbook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_sheet(&mut self, name: impl Into<String>, rows: Vec<Vec<String>>) {
        self.sheets.insert(name.into(), rows);
    }

    pub fn with_sheet(mut self, name: impl Into<String>, rows: Vec<Vec<String>>) -> Self {
        self.insert_sheet(name, rows);
        self
    }

    /// Read one sheet exported as CSV. Rows may have differing lengths and no
    /// line is treated as a header.
    pub fn read_csv<R: Read>(reader: R) -> Result<Vec<Vec<String>>, CoreError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(record.iter().map(str::to_string).collect());
        }
        Ok(rows)
    }

    /// Add a sheet from a CSV file on disk.
    pub fn load_csv_sheet(&mut self, name: impl Into<String>, path: &Path) -> Result<(), CoreError> {
        let name = name.into();
        let file = std::fs::File::open(path).map_err(|e| {
            CoreError::CsvParsing(format!("cannot open sheet {name:?} at {}: {e}", path.display()))
        })?;
        let rows = Self::read_csv(file)?;
        debug!("Loaded sheet {:?}: {} rows from {:?}", name, rows.len(), path);
        self.insert_sheet(name, rows);
        Ok(())
    }

    pub fn sheet(&self, name: &str) -> Option<&[Vec<String>]> {
        self.sheets.get(name).map(Vec::as_slice)
    }

    /// A sheet the pipeline cannot work without.
    pub fn require_sheet(&self, name: &str) -> Result<&[Vec<String>], CoreError> {
        self.sheet(name)
            .ok_or_else(|| CoreError::CsvParsing(format!("sheet {name:?} not found in workbook")))
    }

    pub fn sheet_names(&self) -> impl Iterator<Item = &str> {
        self.sheets.keys().map(String::as_str)
    }
}
