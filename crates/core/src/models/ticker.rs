use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::CoreError;

/// Broker symbol as it appears in the export (e.g. `"CDR.PL"`, `"AAPL.US"`).
///
/// Always trimmed and non-empty. Kept distinct from [`ExternalTicker`] so a raw
/// broker symbol can never be sent to a price provider by accident.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Ticker(String);

impl Ticker {
    pub fn new(symbol: impl AsRef<str>) -> Result<Self, CoreError> {
        let trimmed = symbol.as_ref().trim();
        if trimmed.is_empty() {
            return Err(CoreError::InvalidTicker(symbol.as_ref().to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Ticker {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Ticker> for String {
    fn from(value: Ticker) -> Self {
        value.0
    }
}

/// Symbol in the naming scheme of the external price provider (e.g. `"CDR.WA"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ExternalTicker(String);

impl ExternalTicker {
    pub fn new(symbol: impl AsRef<str>) -> Result<Self, CoreError> {
        let trimmed = symbol.as_ref().trim();
        if trimmed.is_empty() {
            return Err(CoreError::InvalidTicker(symbol.as_ref().to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExternalTicker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ExternalTicker {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Identity mapping: the broker symbol used verbatim by the provider.
impl From<&Ticker> for ExternalTicker {
    fn from(ticker: &Ticker) -> Self {
        Self(ticker.0.clone())
    }
}

impl From<ExternalTicker> for String {
    fn from(value: ExternalTicker) -> Self {
        value.0
    }
}

/// A calendar day used as a map key, serialized as `YYYY-MM-DD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DateKey(NaiveDate);

impl DateKey {
    pub const FORMAT: &'static str = "%Y-%m-%d";

    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Parse a strict ISO `YYYY-MM-DD` string.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        let trimmed = s.trim();
        // chrono accepts unpadded fields ("2024-1-5"); keys must be canonical
        if trimmed.len() != 10 {
            return Err(CoreError::InvalidDateKey(s.to_string()));
        }
        NaiveDate::parse_from_str(trimmed, Self::FORMAT)
            .map(Self)
            .map_err(|_| CoreError::InvalidDateKey(s.to_string()))
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    pub fn next_day(&self) -> Self {
        Self(self.0 + Duration::days(1))
    }

    pub fn previous_day(&self) -> Self {
        Self(self.0 - Duration::days(1))
    }
}

impl From<NaiveDate> for DateKey {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(Self::FORMAT))
    }
}

impl TryFrom<String> for DateKey {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<DateKey> for String {
    fn from(value: DateKey) -> Self {
        value.to_string()
    }
}
