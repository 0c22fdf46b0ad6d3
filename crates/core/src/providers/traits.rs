use async_trait::async_trait;
use chrono::NaiveDate;

use crate::errors::CoreError;
use crate::models::price::{PriceSource, Quote};
use crate::models::ticker::ExternalTicker;

/// Trait abstraction for historical price sources.
///
/// The fetcher only talks to this trait, so a provider that stops working can
/// be replaced (or stacked behind another in the registry) without touching
/// the pipeline.
#[async_trait]
pub trait PriceProvider: Send + Sync {
    /// Human-readable name of this provider (for logs/errors).
    fn name(&self) -> &str;

    /// Marker stored on every price point this provider produces.
    fn source(&self) -> PriceSource;

    /// Daily quotes for `symbol` from `start` to `end`, both inclusive,
    /// sorted by date. Days without trading are simply absent.
    async fn get_historical_prices(
        &self,
        symbol: &ExternalTicker,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Quote>, CoreError>;
}
