use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::ticker::{DateKey, ExternalTicker};

/// Round to 2 decimal places the way the broker's own tooling does
/// (`Math.round(x * 100) / 100`: halves round towards positive infinity).
pub fn round2(x: f64) -> f64 {
    (x * 100.0 + 0.5).floor() / 100.0
}

/// A signed share movement: positive for a purchase, negative for a sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioTransaction {
    pub symbol: ExternalTicker,
    pub time: NaiveDateTime,
    pub quantity: f64,
}

impl PortfolioTransaction {
    pub fn new(symbol: ExternalTicker, time: NaiveDateTime, quantity: f64) -> Self {
        Self {
            symbol,
            time,
            quantity,
        }
    }

    /// Calendar day the transaction belongs to.
    pub fn date_key(&self) -> DateKey {
        DateKey::new(self.time.date())
    }
}

/// Quantity held per symbol at the end of one day.
///
/// Symbols stay in the map after being sold out (with quantity 0) so the
/// price index can see the position close.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PortfolioDaySnapshot {
    holdings: BTreeMap<ExternalTicker, f64>,
}

impl PortfolioDaySnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a signed delta to a symbol, rounding the running total to cents.
    pub fn apply(&mut self, symbol: &ExternalTicker, delta: f64) {
        let quantity = self.holdings.entry(symbol.clone()).or_insert(0.0);
        *quantity = round2(*quantity + delta);
    }

    pub fn quantity(&self, symbol: &ExternalTicker) -> Option<f64> {
        self.holdings.get(symbol).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ExternalTicker, f64)> {
        self.holdings.iter().map(|(s, q)| (s, *q))
    }

    /// Symbols with a nonzero quantity.
    pub fn nonzero(&self) -> impl Iterator<Item = (&ExternalTicker, f64)> {
        self.iter().filter(|(_, q)| *q != 0.0)
    }

    pub fn len(&self) -> usize {
        self.holdings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.holdings.is_empty()
    }
}

impl FromIterator<(ExternalTicker, f64)> for PortfolioDaySnapshot {
    fn from_iter<I: IntoIterator<Item = (ExternalTicker, f64)>>(iter: I) -> Self {
        Self {
            holdings: iter.into_iter().collect(),
        }
    }
}

/// Chronological `(day, snapshot)` pairs.
pub type DailySnapshots = Vec<(DateKey, PortfolioDaySnapshot)>;
