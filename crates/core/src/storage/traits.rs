use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;
use crate::models::price::{PriceIndex, PricePoint};

/// Persisted form of a price point: unique per `(symbol, date)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredPrice {
    pub point: PricePoint,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Shared store of already known prices.
///
/// Implementations must tolerate concurrent readers and writers. Writes are
/// upserts keyed by `(symbol, date)`, so repeating a write is harmless.
#[async_trait]
pub trait PriceStore: Send + Sync {
    /// Every stored point for the index's symbols, from each symbol's earliest
    /// range start onwards, sorted by symbol then date.
    async fn read_prices(&self, index: &PriceIndex) -> Result<Vec<PricePoint>, CoreError>;

    /// Upsert points; returns how many were written.
    async fn write_prices(&self, points: &[PricePoint]) -> Result<usize, CoreError>;

    /// Number of stored points.
    async fn len(&self) -> Result<usize, CoreError>;
}
