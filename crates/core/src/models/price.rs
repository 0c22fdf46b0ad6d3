use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

use super::ticker::{DateKey, ExternalTicker};

/// Where a price point came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceSource {
    Mock,
    Yahoo,
}

impl fmt::Display for PriceSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PriceSource::Mock => write!(f, "mock"),
            PriceSource::Yahoo => write!(f, "yahoo"),
        }
    }
}

/// Contiguous stretch of days during which a symbol is held.
///
/// `end` is the first day the position was no longer held; `None` means the
/// position is still open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRange {
    pub start: DateKey,
    pub end: Option<DateKey>,
}

impl PriceRange {
    pub fn new(start: DateKey, end: Option<DateKey>) -> Self {
        Self { start, end }
    }

    pub fn open(start: DateKey) -> Self {
        Self { start, end: None }
    }

    pub fn is_open(&self) -> bool {
        self.end.is_none()
    }
}

impl fmt::Display for PriceRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.end {
            Some(end) => write!(f, "{} → {}", self.start, end),
            None => write!(f, "{} → open", self.start),
        }
    }
}

/// Per-symbol ranges for which prices are needed, ordered by start.
pub type PriceIndex = BTreeMap<ExternalTicker, Vec<PriceRange>>;

/// One daily OHLC bar for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub symbol: ExternalTicker,
    pub date: DateKey,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub close_adjusted: Option<f64>,
    pub source: PriceSource,
}

/// A raw daily quote as returned by a price provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub adjclose: Option<f64>,
}

impl Quote {
    pub fn into_price_point(self, symbol: ExternalTicker, source: PriceSource) -> PricePoint {
        PricePoint {
            symbol,
            date: DateKey::new(self.date),
            open: self.open,
            high: self.high,
            low: self.low,
            close: self.close,
            close_adjusted: self.adjclose.filter(|p| p.is_finite() && *p > 0.0),
            source,
        }
    }
}

/// Exact `(symbol, date)` lookup over a set of price points.
///
/// Points are kept sorted by date per symbol; inserting a point for an
/// existing `(symbol, date)` replaces it, so merging cached points first and
/// fetched points second lets fresh data win.
#[derive(Debug, Clone, Default)]
pub struct PriceBook {
    entries: HashMap<ExternalTicker, Vec<PricePoint>>,
}

impl PriceBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a book from cached points overlaid with fetched points.
    pub fn merge(cached: &[PricePoint], fetched: &[PricePoint]) -> Self {
        let mut book = Self::new();
        book.insert_all(cached);
        book.insert_all(fetched);
        book
    }

    /// Insert or replace a point. O(log n) search plus the insertion shift.
    pub fn insert(&mut self, point: PricePoint) {
        let entries = self.entries.entry(point.symbol.clone()).or_default();
        match entries.binary_search_by_key(&point.date, |p| p.date) {
            Ok(idx) => entries[idx] = point,
            Err(idx) => entries.insert(idx, point),
        }
    }

    pub fn insert_all(&mut self, points: &[PricePoint]) {
        for point in points {
            self.insert(point.clone());
        }
    }

    /// Exact lookup. No fill from neighbouring days.
    pub fn get_price(&self, symbol: &ExternalTicker, date: DateKey) -> Option<&PricePoint> {
        let entries = self.entries.get(symbol)?;
        entries
            .binary_search_by_key(&date, |p| p.date)
            .ok()
            .map(|idx| &entries[idx])
    }

    /// Most recent day with a price for `symbol`.
    pub fn latest_date(&self, symbol: &ExternalTicker) -> Option<DateKey> {
        self.entries.get(symbol)?.last().map(|p| p.date)
    }
}
