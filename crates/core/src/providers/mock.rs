use async_trait::async_trait;
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use std::collections::{HashMap, HashSet};

use crate::errors::CoreError;
use crate::models::portfolio::round2;
use crate::models::price::{PriceSource, Quote};
use crate::models::ticker::ExternalTicker;
use super::traits::PriceProvider;

/// Offline provider producing deterministic weekday prices.
///
/// Without configured quotes every symbol gets a synthetic series derived from
/// its name, so a report can be produced with no network access. Tests can
/// pin exact quotes per symbol or make a symbol fail.
#[derive(Debug, Default)]
pub struct MockPriceProvider {
    quotes: HashMap<ExternalTicker, Vec<Quote>>,
    failing: HashSet<ExternalTicker>,
}

impl MockPriceProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve exactly these quotes for `symbol` instead of synthetic ones.
    pub fn with_quotes(mut self, symbol: ExternalTicker, quotes: Vec<Quote>) -> Self {
        self.quotes.insert(symbol, quotes);
        self
    }

    /// Make every request for `symbol` fail.
    pub fn with_failure(mut self, symbol: ExternalTicker) -> Self {
        self.failing.insert(symbol);
        self
    }

    fn synthetic_quote(symbol: &ExternalTicker, date: NaiveDate) -> Quote {
        let seed: u32 = symbol.as_str().bytes().map(u32::from).sum();
        let base = 10.0 + f64::from(seed % 490);
        let drift = f64::from(date.num_days_from_ce().rem_euclid(30)) * 0.1;
        let close = round2(base + drift);
        Quote {
            date,
            open: close,
            high: round2(close * 1.01),
            low: round2(close * 0.99),
            close,
            adjclose: None,
        }
    }
}

#[async_trait]
impl PriceProvider for MockPriceProvider {
    fn name(&self) -> &str {
        "Mock"
    }

    fn source(&self) -> PriceSource {
        PriceSource::Mock
    }

    async fn get_historical_prices(
        &self,
        symbol: &ExternalTicker,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Quote>, CoreError> {
        if self.failing.contains(symbol) {
            return Err(CoreError::Api {
                provider: self.name().to_string(),
                message: format!("No data found, symbol may be delisted: {symbol}"),
            });
        }

        if let Some(quotes) = self.quotes.get(symbol) {
            return Ok(quotes
                .iter()
                .filter(|q| q.date >= start && q.date <= end)
                .cloned()
                .collect());
        }

        let mut out = Vec::new();
        let mut day = start;
        while day <= end {
            if !matches!(day.weekday(), Weekday::Sat | Weekday::Sun) {
                out.push(Self::synthetic_quote(symbol, day));
            }
            day += Duration::days(1);
        }
        Ok(out)
    }
}
