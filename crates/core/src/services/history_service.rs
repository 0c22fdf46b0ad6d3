//! End-to-end pipeline for one uploaded workbook.
//!
//! ## Steps
//!
//!   1. Parse the cash operation sheet (header + rows); position sheets when present.
//!   2. Split out deposits and withdrawals.
//!   3. Stock trades → per-day holdings → dense calendar → price index.
//!   4. Read cached prices, fetch the residual ranges plus today's bar for
//!      held symbols, persist what was fetched for closed days.
//!   5. Value every day of the calendar.
//!
//! Structural problems (missing sheet, missing currency, unreadable cache) fail
//! the run. Everything row- or symbol-scoped degrades into counters and log lines.

use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::errors::CoreError;
use crate::models::portfolio::PortfolioTransaction;
use crate::models::price::{PriceBook, PricePoint};
use crate::models::report::{CashFlow, DailyValue, PortfolioReport, ReportDiagnostics};
use crate::models::rows::{CashOperationRow, ClosedPositionRow, OpenPositionRow};
use crate::models::settings::Settings;
use crate::parsing::cash_operations::CASH_OPERATION_SHEET;
use crate::parsing::header::parse_sheet_header;
use crate::parsing::positions::{CLOSED_POSITION_SHEET, OPEN_POSITION_SHEET};
use crate::parsing::parse_sheet;
use crate::parsing::workbook::Workbook;
use crate::providers::registry::PriceProviderRegistry;
use crate::storage::traits::PriceStore;

use super::cache_diff_service::CacheDiffService;
use super::calendar_service::CalendarService;
use super::currency_service::{CurrencyService, Money};
use super::holdings_service::HoldingsService;
use super::price_index_service::PriceIndexService;
use super::price_service::PriceService;
use super::ticker_service::TickerNormalizer;
use super::valuation_service::ValuationService;

/// Sequences the pipeline services. Collaborators are injected; the clock is
/// passed to [`HistoryService::build_report`].
pub struct HistoryService {
    normalizer: TickerNormalizer,
    holdings_service: HoldingsService,
    calendar_service: CalendarService,
    index_service: PriceIndexService,
    diff_service: CacheDiffService,
    price_service: PriceService,
    valuation_service: ValuationService,
    currency_service: CurrencyService,
    store: Arc<dyn PriceStore>,
}

impl HistoryService {
    pub fn new(
        settings: &Settings,
        registry: PriceProviderRegistry,
        store: Arc<dyn PriceStore>,
    ) -> Self {
        Self {
            normalizer: TickerNormalizer::from_settings(settings),
            holdings_service: HoldingsService::new(),
            calendar_service: CalendarService::new(),
            index_service: PriceIndexService::new(),
            diff_service: CacheDiffService::new(),
            price_service: PriceService::from_settings(registry, settings),
            valuation_service: ValuationService::new(),
            currency_service: CurrencyService::from_settings(settings),
            store,
        }
    }

    /// Build the deposit/withdrawal summary and the daily value series.
    pub async fn build_report(
        &self,
        workbook: &Workbook,
        today: NaiveDate,
    ) -> Result<PortfolioReport, CoreError> {
        let mut diagnostics = ReportDiagnostics::default();

        // ── 1. Parse ────────────────────────────────────────────────
        let cash_sheet = workbook.require_sheet(CASH_OPERATION_SHEET)?;
        let header = parse_sheet_header(cash_sheet)?;

        let cash = parse_sheet::<CashOperationRow>(cash_sheet);
        diagnostics.cash_rows = cash.successes.len();
        diagnostics.cash_row_failures = cash.failures.len();
        for failure in &cash.failures {
            warn!("Skipping cash operation row {:?}: {}", failure.row, failure.summary());
        }
        info!(
            "Cash operations: {} valid, {} rejected (account currency {})",
            cash.successes.len(),
            cash.failures.len(),
            header.currency
        );

        if let Some(rows) = workbook.sheet(OPEN_POSITION_SHEET) {
            let open = parse_sheet::<OpenPositionRow>(rows);
            diagnostics.open_positions = open.successes.len();
            diagnostics.position_row_failures += open.failures.len();
        }
        if let Some(rows) = workbook.sheet(CLOSED_POSITION_SHEET) {
            let closed = parse_sheet::<ClosedPositionRow>(rows);
            diagnostics.closed_positions = closed.successes.len();
            diagnostics.position_row_failures += closed.failures.len();
        }

        // ── 2. Cash flows ───────────────────────────────────────────
        let conversion = self.currency_service.conversion_for(&header.currency);
        let cash_flow_currency = conversion
            .as_ref()
            .map(|(target, _)| target.clone())
            .unwrap_or_else(|| header.currency.clone());
        let to_flow = |row: &CashOperationRow| CashFlow {
            id: row.id.clone(),
            time: row.time,
            amount: match &conversion {
                Some((_, rate)) => CurrencyService::convert_currency(
                    &Money::new(header.currency.clone(), row.amount),
                    *rate,
                ),
                None => row.amount,
            },
        };
        let deposits: Vec<CashFlow> = cash
            .successes
            .iter()
            .filter(|r| r.kind.is_deposit())
            .map(to_flow)
            .collect();
        let withdrawals: Vec<CashFlow> = cash
            .successes
            .iter()
            .filter(|r| r.kind.is_withdrawal())
            .map(to_flow)
            .collect();

        // ── 3. Holdings ─────────────────────────────────────────────
        let transactions = self
            .holdings_service
            .transactions_from_operations(&cash.successes, &self.normalizer);

        let value = if transactions.is_empty() {
            info!("No stock trades in workbook, skipping valuation");
            Vec::new()
        } else {
            self.value_holdings(&transactions, today, &mut diagnostics)
                .await?
        };

        Ok(PortfolioReport {
            cash_flow_currency,
            deposits,
            withdrawals,
            value,
            diagnostics,
        })
    }

    async fn value_holdings(
        &self,
        transactions: &[PortfolioTransaction],
        today: NaiveDate,
        diagnostics: &mut ReportDiagnostics,
    ) -> Result<Vec<DailyValue>, CoreError> {
        let sparse = self.holdings_service.reconstruct(transactions);
        let dense = self.calendar_service.fill(&sparse, today)?;
        let index = self.index_service.build_index(&dense);
        info!(
            "{} transactions over {} trading days, {} calendar days, {} symbols",
            transactions.len(),
            sparse.len(),
            dense.len(),
            index.len()
        );

        // ── 4. Prices ───────────────────────────────────────────────
        let cached = self.store.read_prices(&index).await?;
        let residual = self.diff_service.diff(&index, &cached, today);
        let residual = self.diff_service.with_today(&index, residual, today);
        info!(
            "{} cached prices, {} symbols need fetching",
            cached.len(),
            residual.len()
        );

        let fetched = self.price_service.fetch(&residual, today).await;
        diagnostics.cached_prices = cached.len();
        diagnostics.fetched_prices = fetched.successes.len();
        diagnostics.fetch_failures = fetched.failures.len();

        // today's bar is provisional until the session closes
        let closed: Vec<PricePoint> = fetched
            .successes
            .iter()
            .filter(|p| p.date.date() < today)
            .cloned()
            .collect();
        match self.store.write_prices(&closed).await {
            Ok(n) => debug!("Persisted {n} fetched prices"),
            Err(e) => warn!("Could not persist fetched prices: {e}"),
        }

        // ── 5. Valuation ────────────────────────────────────────────
        let book = PriceBook::merge(&cached, &fetched.successes);
        let (values, missing) = self.valuation_service.daily_values(&book, &dense);
        diagnostics.missing_prices = missing.len();
        for m in missing {
            warn!("{}", CoreError::from(m));
        }

        Ok(values)
    }
}
