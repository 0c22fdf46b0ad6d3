use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use crate::errors::CoreError;
use crate::models::price::{PriceIndex, PricePoint};
use crate::models::ticker::{DateKey, ExternalTicker};

use super::traits::{PriceStore, StoredPrice};

/// Ordered `(symbol, date)` table shared by the store implementations.
#[derive(Debug, Clone, Default)]
pub(crate) struct PriceTable {
    rows: BTreeMap<(ExternalTicker, DateKey), StoredPrice>,
}

impl PriceTable {
    pub(crate) fn from_records(records: Vec<StoredPrice>) -> Self {
        let rows = records
            .into_iter()
            .map(|r| ((r.point.symbol.clone(), r.point.date), r))
            .collect();
        Self { rows }
    }

    pub(crate) fn records(&self) -> Vec<StoredPrice> {
        self.rows.values().cloned().collect()
    }

    pub(crate) fn query(&self, index: &PriceIndex) -> Vec<PricePoint> {
        let mut out = Vec::new();
        for (symbol, ranges) in index {
            let Some(from) = ranges.iter().map(|r| r.start).min() else {
                continue;
            };
            let lower = (symbol.clone(), from);
            out.extend(
                self.rows
                    .range(lower..)
                    .take_while(|((s, _), _)| s == symbol)
                    .map(|(_, stored)| stored.point.clone()),
            );
        }
        out
    }

    /// Insert new points and overwrite existing ones, keeping `created_at`.
    pub(crate) fn upsert(&mut self, points: &[PricePoint], now: NaiveDateTime) -> usize {
        for point in points {
            let key = (point.symbol.clone(), point.date);
            match self.rows.get_mut(&key) {
                Some(existing) => {
                    existing.point = point.clone();
                    existing.updated_at = now;
                }
                None => {
                    self.rows.insert(
                        key,
                        StoredPrice {
                            point: point.clone(),
                            created_at: now,
                            updated_at: now,
                        },
                    );
                }
            }
        }
        points.len()
    }

    pub(crate) fn len(&self) -> usize {
        self.rows.len()
    }
}

/// Process-local price store, mainly for tests and one-off runs.
#[derive(Debug, Default)]
pub struct InMemoryPriceStore {
    table: RwLock<PriceTable>,
}

impl InMemoryPriceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with `points`.
    pub fn with_prices(points: &[PricePoint]) -> Self {
        let mut table = PriceTable::default();
        table.upsert(points, Utc::now().naive_utc());
        Self {
            table: RwLock::new(table),
        }
    }

    /// Full stored records, including timestamps.
    pub async fn records(&self) -> Vec<StoredPrice> {
        self.table.read().await.records()
    }
}

#[async_trait]
impl PriceStore for InMemoryPriceStore {
    async fn read_prices(&self, index: &PriceIndex) -> Result<Vec<PricePoint>, CoreError> {
        Ok(self.table.read().await.query(index))
    }

    async fn write_prices(&self, points: &[PricePoint]) -> Result<usize, CoreError> {
        let now = Utc::now().naive_utc();
        Ok(self.table.write().await.upsert(points, now))
    }

    async fn len(&self) -> Result<usize, CoreError> {
        Ok(self.table.read().await.len())
    }
}
