use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::{Id, JoinSet};
use tracing::{debug, warn};

use crate::errors::CoreError;
use crate::models::price::{PriceIndex, PricePoint, PriceRange};
use crate::models::settings::Settings;
use crate::models::ticker::{DateKey, ExternalTicker};
use crate::models::validation::Partitioned;
use crate::providers::registry::PriceProviderRegistry;

/// Fetches historical prices for residual ranges from the provider registry.
///
/// One request per `(symbol, range)`, issued concurrently. A failing or slow
/// symbol never aborts the others: each request ends up either as price
/// points or as one [`CoreError::GetHistoricalPrices`] in the result.
pub struct PriceService {
    registry: PriceProviderRegistry,
    timeout: Duration,
    concurrency: usize,
}

impl PriceService {
    pub fn new(registry: PriceProviderRegistry, timeout: Duration, concurrency: usize) -> Self {
        Self {
            registry,
            timeout,
            concurrency: concurrency.max(1),
        }
    }

    pub fn from_settings(registry: PriceProviderRegistry, settings: &Settings) -> Self {
        Self::new(
            registry,
            Duration::from_secs(settings.fetch_timeout_secs),
            settings.fetch_concurrency,
        )
    }

    /// Get the names of all providers in fallback order.
    pub fn provider_names(&self) -> Vec<String> {
        self.registry.names()
    }

    /// Fetch every residual range. Open ranges are fetched through `today`.
    pub async fn fetch(
        &self,
        residual: &PriceIndex,
        today: NaiveDate,
    ) -> Partitioned<PricePoint, CoreError> {
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut tasks = JoinSet::new();
        let mut requests: HashMap<Id, (ExternalTicker, PriceRange)> = HashMap::new();

        for (symbol, ranges) in residual {
            for range in ranges {
                let symbol = symbol.clone();
                let range = *range;
                let registry = self.registry.clone();
                let semaphore = Arc::clone(&semaphore);
                let timeout = self.timeout;

                let task_symbol = symbol.clone();
                let handle = tasks.spawn(async move {
                    let _permit = semaphore.acquire_owned().await;
                    fetch_range(&registry, &task_symbol, range, today, timeout).await
                });
                requests.insert(handle.id(), (symbol, range));
            }
        }

        let mut result = Partitioned::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Ok(points)) => result.successes.extend(points),
                Ok(Err(e)) => {
                    warn!("{e}");
                    result.failures.push(e);
                }
                Err(e) => {
                    let failure = match requests.get(&e.id()) {
                        Some((symbol, range)) => fetch_failure(symbol, *range, today, e.to_string()),
                        None => CoreError::GetHistoricalPrices {
                            symbol: String::new(),
                            start: String::new(),
                            end: String::new(),
                            message: e.to_string(),
                        },
                    };
                    warn!("Price fetch task failed: {failure}");
                    result.failures.push(failure);
                }
            }
        }

        // join order is completion order; keep output deterministic
        result
            .successes
            .sort_by(|a, b| (&a.symbol, a.date).cmp(&(&b.symbol, b.date)));
        result
    }
}

/// Ask providers in order until one answers within the timeout.
async fn fetch_range(
    registry: &PriceProviderRegistry,
    symbol: &ExternalTicker,
    range: PriceRange,
    today: NaiveDate,
    timeout: Duration,
) -> Result<Vec<PricePoint>, CoreError> {
    let start = range.start.date();
    let end = fetch_end(range, today);
    let failure = |message: String| fetch_failure(symbol, range, today, message);

    if registry.is_empty() {
        return Err(failure("no price provider configured".into()));
    }

    let mut last_error = String::new();
    for provider in registry.providers() {
        debug!("{}: requesting {} {} → {}", provider.name(), symbol, start, end);
        match tokio::time::timeout(timeout, provider.get_historical_prices(symbol, start, end)).await {
            Ok(Ok(quotes)) => {
                let source = provider.source();
                return Ok(quotes
                    .into_iter()
                    .filter(|q| q.date >= start && q.date <= end)
                    .map(|q| q.into_price_point(symbol.clone(), source))
                    .collect());
            }
            Ok(Err(e)) => last_error = e.to_string(),
            Err(_) => {
                last_error = format!("{} timed out after {:?}", provider.name(), timeout);
            }
        }
    }

    Err(failure(last_error))
}

/// Last day requested for `range`. Open ranges run through `today`.
fn fetch_end(range: PriceRange, today: NaiveDate) -> NaiveDate {
    range.end.map(|d| d.date()).unwrap_or(today)
}

fn fetch_failure(
    symbol: &ExternalTicker,
    range: PriceRange,
    today: NaiveDate,
    message: String,
) -> CoreError {
    CoreError::GetHistoricalPrices {
        symbol: symbol.to_string(),
        start: range.start.to_string(),
        end: DateKey::new(fetch_end(range, today)).to_string(),
        message,
    }
}
