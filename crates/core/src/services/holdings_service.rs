use std::collections::BTreeMap;

use crate::models::portfolio::{DailySnapshots, PortfolioDaySnapshot, PortfolioTransaction};
use crate::models::rows::{CashOperationRow, CashOperationType};
use crate::models::ticker::{DateKey, ExternalTicker};

use super::ticker_service::TickerNormalizer;

/// Folds share movements into running per-day holdings.
///
/// Pure: no I/O and no provider calls.
pub struct HoldingsService;

impl HoldingsService {
    pub fn new() -> Self {
        Self
    }

    /// Signed share movements from validated cash operations, oldest first.
    ///
    /// Only stock purchases (+) and sales (−) move shares; every other
    /// operation type is cash only. Rows sharing a timestamp keep their sheet
    /// order.
    pub fn transactions_from_operations(
        &self,
        rows: &[CashOperationRow],
        normalizer: &TickerNormalizer,
    ) -> Vec<PortfolioTransaction> {
        let mut transactions: Vec<PortfolioTransaction> = rows
            .iter()
            .filter_map(|row| {
                let sign = match row.kind {
                    CashOperationType::StockPurchase => 1.0,
                    CashOperationType::StockSale => -1.0,
                    _ => return None,
                };
                let symbol = normalizer.to_external(row.symbol.as_ref()?);
                let quantity = row.quantity?;
                Some(PortfolioTransaction::new(symbol, row.time, sign * quantity.abs()))
            })
            .collect();

        transactions.sort_by_key(|t| t.time);
        transactions
    }

    /// One snapshot per day that has at least one transaction, chronological.
    ///
    /// Each day starts from the previous day's snapshot and adds that day's
    /// deltas in the given order; running totals are rounded to cents after
    /// every single addition.
    pub fn reconstruct(&self, transactions: &[PortfolioTransaction]) -> DailySnapshots {
        let mut by_day: BTreeMap<DateKey, Vec<(&ExternalTicker, f64)>> = BTreeMap::new();
        for tx in transactions {
            by_day
                .entry(tx.date_key())
                .or_default()
                .push((&tx.symbol, tx.quantity));
        }

        let mut running = PortfolioDaySnapshot::new();
        by_day
            .into_iter()
            .map(|(day, deltas)| {
                for (symbol, delta) in deltas {
                    running.apply(symbol, delta);
                }
                (day, running.clone())
            })
            .collect()
    }
}

impl Default for HoldingsService {
    fn default() -> Self {
        Self::new()
    }
}
