use async_trait::async_trait;
use chrono::{Datelike, Duration, NaiveDate};
use time::OffsetDateTime;

use crate::errors::CoreError;
use crate::models::price::{PriceSource, Quote};
use crate::models::ticker::ExternalTicker;
use super::traits::PriceProvider;

const PROVIDER_NAME: &str = "Yahoo Finance";

/// Yahoo Finance provider for daily equity bars.
///
/// - **Free**: No API key required.
/// - **Coverage**: Global equities and ETFs, addressed with exchange suffixes
///   (`CDR.WA`, `NOKIA.HE`); US listings have no suffix.
/// - **Data**: Full historical OHLC plus adjusted close.
///
/// Uses the `yahoo_finance_api` crate which wraps Yahoo Finance's public
/// endpoints. Prices are in the listing's native currency.
pub struct YahooFinanceProvider {
    connector: yahoo_finance_api::YahooConnector,
}

impl YahooFinanceProvider {
    pub fn new() -> Result<Self, CoreError> {
        let connector = yahoo_finance_api::YahooConnector::new().map_err(|e| api_error(
            format!("Failed to create connector: {e}"),
        ))?;
        Ok(Self { connector })
    }

    /// Convert a `chrono::NaiveDate` to `time::OffsetDateTime` (midnight UTC).
    fn to_offset_datetime(date: NaiveDate) -> Result<OffsetDateTime, CoreError> {
        let month = time::Month::try_from(date.month() as u8)
            .map_err(|e| api_error(format!("Invalid month in {date}: {e}")))?;

        let odt = time::Date::from_calendar_date(date.year(), month, date.day() as u8)
            .map_err(|e| api_error(format!("Invalid date {date}: {e}")))?
            .midnight()
            .assume_utc();
        Ok(odt)
    }

    /// Convert a unix timestamp (seconds) to `chrono::NaiveDate`.
    fn timestamp_to_naive_date(ts: i64) -> Option<NaiveDate> {
        chrono::DateTime::from_timestamp(ts, 0).map(|dt| dt.date_naive())
    }
}

fn api_error(message: String) -> CoreError {
    CoreError::Api {
        provider: PROVIDER_NAME.into(),
        message,
    }
}

#[async_trait]
impl PriceProvider for YahooFinanceProvider {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn source(&self) -> PriceSource {
        PriceSource::Yahoo
    }

    async fn get_historical_prices(
        &self,
        symbol: &ExternalTicker,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Quote>, CoreError> {
        let from = Self::to_offset_datetime(start)?;
        let to = Self::to_offset_datetime(end + Duration::days(1))?; // inclusive end

        let resp = self
            .connector
            .get_quote_history(symbol.as_str(), from, to)
            .await
            .map_err(|e| api_error(format!("Failed to fetch history for {symbol}: {e}")))?;

        let quotes = resp
            .quotes()
            .map_err(|e| api_error(format!("Failed to parse quotes for {symbol}: {e}")))?;

        let mut out: Vec<Quote> = quotes
            .iter()
            .filter_map(|q| {
                let date = Self::timestamp_to_naive_date(q.timestamp)?;
                if date < start || date > end || !q.close.is_finite() {
                    return None;
                }
                Some(Quote {
                    date,
                    open: q.open,
                    high: q.high,
                    low: q.low,
                    close: q.close,
                    adjclose: Some(q.adjclose),
                })
            })
            .collect();
        out.sort_by_key(|q| q.date);
        out.dedup_by_key(|q| q.date);

        Ok(out)
    }
}
