use std::collections::HashMap;

use crate::models::settings::Settings;
use crate::models::ticker::{ExternalTicker, Ticker};

/// Maps broker tickers (`CDR.PL`) to price provider tickers (`CDR.WA`).
///
/// Pure and total: a ticker no rule applies to is passed through unchanged.
#[derive(Debug, Clone)]
pub struct TickerNormalizer {
    overrides: HashMap<String, String>,
    exchange_suffixes: HashMap<String, String>,
}

impl TickerNormalizer {
    pub fn new(
        overrides: HashMap<String, String>,
        exchange_suffixes: HashMap<String, String>,
    ) -> Self {
        Self {
            overrides,
            exchange_suffixes,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            settings.ticker_overrides.clone(),
            settings.exchange_suffixes.clone(),
        )
    }

    pub fn to_external(&self, ticker: &Ticker) -> ExternalTicker {
        let rewritten = self.rewrite(ticker.as_str());
        ExternalTicker::new(&rewritten).unwrap_or_else(|_| ExternalTicker::from(ticker))
    }

    /// String-level rewrite: override table, then exchange suffix table.
    pub fn rewrite(&self, symbol: &str) -> String {
        if let Some(mapped) = self.overrides.get(symbol) {
            return mapped.clone();
        }

        let Some((base, exchange)) = symbol.rsplit_once('.') else {
            return symbol.to_string();
        };

        match self.exchange_suffixes.get(exchange) {
            Some(_) if base.is_empty() => symbol.to_string(),
            Some(suffix) if suffix.is_empty() => base.to_string(),
            Some(suffix) => format!("{base}.{suffix}"),
            None => symbol.to_string(),
        }
    }
}

impl Default for TickerNormalizer {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}
