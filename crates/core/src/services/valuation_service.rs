use serde::{Deserialize, Serialize};

use crate::errors::CoreError;
use crate::models::portfolio::{round2, DailySnapshots, PortfolioDaySnapshot};
use crate::models::price::PriceBook;
use crate::models::report::DailyValue;
use crate::models::ticker::{DateKey, ExternalTicker};

/// A holding that could not be valued because its price is unknown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingPrice {
    pub symbol: ExternalTicker,
    pub date: DateKey,
}

impl From<MissingPrice> for CoreError {
    fn from(m: MissingPrice) -> Self {
        CoreError::MissingPrice {
            symbol: m.symbol.to_string(),
            date: m.date.to_string(),
        }
    }
}

/// Best-effort value of one snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct Valuation {
    pub value: f64,
    pub failures: Vec<MissingPrice>,
}

/// Values holdings against a [`PriceBook`].
///
/// Prices are looked up for the exact day only. Weekends and holidays
/// therefore show up as missing prices; holdings are carried forward by the
/// calendar, prices are not.
// TODO: carry the last known close forward for non-trading days once the
// report distinguishes estimated from observed values.
pub struct ValuationService;

impl ValuationService {
    pub fn new() -> Self {
        Self
    }

    /// Σ quantity × close over every nonzero holding. Unpriced holdings add
    /// nothing and are listed in `failures`.
    pub fn calculate_value(
        &self,
        book: &PriceBook,
        date: DateKey,
        snapshot: &PortfolioDaySnapshot,
    ) -> Valuation {
        let mut value = 0.0;
        let mut failures = Vec::new();

        for (symbol, quantity) in snapshot.nonzero() {
            match book.get_price(symbol, date) {
                Some(point) => value += quantity * point.close,
                None => failures.push(MissingPrice {
                    symbol: symbol.clone(),
                    date,
                }),
            }
        }

        Valuation { value, failures }
    }

    /// Value of every day in the series, rounded to cents, plus every
    /// `(symbol, date)` that had no price.
    pub fn daily_values(
        &self,
        book: &PriceBook,
        dense: &DailySnapshots,
    ) -> (Vec<DailyValue>, Vec<MissingPrice>) {
        let mut values = Vec::with_capacity(dense.len());
        let mut missing = Vec::new();

        for (date, snapshot) in dense {
            let valuation = self.calculate_value(book, *date, snapshot);
            values.push(DailyValue {
                date: *date,
                value: round2(valuation.value),
            });
            missing.extend(valuation.failures);
        }

        (values, missing)
    }
}

impl Default for ValuationService {
    fn default() -> Self {
        Self::new()
    }
}
