// ═══════════════════════════════════════════════════════════════════
// Integration Tests: whole-workbook reports through PortfolioHistory
// with the mock provider and in-memory / file price stores
// ═══════════════════════════════════════════════════════════════════

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::io::Write;
use std::sync::Arc;

use portfolio_history_core::errors::CoreError;
use portfolio_history_core::models::price::{PriceIndex, PricePoint, PriceRange, Quote};
use portfolio_history_core::models::settings::Settings;
use portfolio_history_core::models::ticker::{DateKey, ExternalTicker};
use portfolio_history_core::parsing::cash_operations::CASH_OPERATION_SHEET;
use portfolio_history_core::parsing::positions::{CLOSED_POSITION_SHEET, OPEN_POSITION_SHEET};
use portfolio_history_core::parsing::workbook::Workbook;
use portfolio_history_core::providers::mock::MockPriceProvider;
use portfolio_history_core::providers::registry::PriceProviderRegistry;
use portfolio_history_core::services::calendar_service::CalendarService;
use portfolio_history_core::services::holdings_service::HoldingsService;
use portfolio_history_core::services::ticker_service::TickerNormalizer;
use portfolio_history_core::storage::memory::InMemoryPriceStore;
use portfolio_history_core::storage::traits::PriceStore;
use portfolio_history_core::PortfolioHistory;

// ═══════════════════════════════════════════════════════════════════
// Fixtures
// ═══════════════════════════════════════════════════════════════════

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn key(y: i32, m: u32, day: u32) -> DateKey {
    DateKey::new(d(y, m, day))
}

fn ext(s: &str) -> ExternalTicker {
    ExternalTicker::new(s).unwrap()
}

fn row(cells: &[&str]) -> Vec<String> {
    cells.iter().map(|c| c.to_string()).collect()
}

fn quote(date: NaiveDate, close: f64) -> Quote {
    Quote {
        date,
        open: close,
        high: close,
        low: close,
        close,
        adjclose: None,
    }
}

/// A Monday.
fn today() -> NaiveDate {
    d(2025, 11, 10)
}

/// UPS.US 5 + META.US 5 on 2025-11-08, META.US 5 more on 2025-11-09,
/// plus cash movements and one broken row.
fn cash_sheet() -> Vec<Vec<String>> {
    vec![
        row(&["", "Account", "", "Currency"]),
        row(&["", "51234567", "", "PLN"]),
        row(&[]),
        row(&["", "ID", "Type", "Time", "Comment", "Symbol", "Amount"]),
        row(&["", "1", "deposit", "01.11.2025 09:00:00", "Deposit", "", "1000"]),
        row(&["", "2", "IKE Deposit", "02.11.2025 09:00:00", "IKE", "", "200"]),
        row(&["", "3", "Stock purchase", "08.11.2025 14:03:27", "OPEN BUY 5 @ 100", "UPS.US", "-500"]),
        row(&["", "4", "Stock purchase", "08.11.2025 15:10:00", "OPEN BUY 5 @ 600", "META.US", "-3000"]),
        row(&["", "5", "Stock purchase", "09.11.2025 10:00:00", "OPEN BUY 5/8 @ 610", "META.US", "-3050"]),
        row(&["", "6", "withdrawal", "09.11.2025 12:00:00", "Withdrawal", "", "-50"]),
        row(&["", "7", "bonus", "09.11.2025 12:00:00", "", "", "5"]),
        row(&["", "", "", "", "", "Total", "-5395"]),
    ]
}

fn workbook() -> Workbook {
    Workbook::new().with_sheet(CASH_OPERATION_SHEET, cash_sheet())
}

fn priced_mock() -> MockPriceProvider {
    MockPriceProvider::new()
        .with_quotes(
            ext("UPS"),
            vec![
                quote(d(2025, 11, 8), 100.0),
                quote(d(2025, 11, 9), 101.0),
                quote(d(2025, 11, 10), 102.0),
            ],
        )
        .with_quotes(
            ext("META"),
            vec![
                quote(d(2025, 11, 8), 600.0),
                quote(d(2025, 11, 9), 610.0),
                quote(d(2025, 11, 10), 620.0),
            ],
        )
}

fn app_with(
    settings: Settings,
    provider: MockPriceProvider,
    store: Arc<dyn PriceStore>,
) -> PortfolioHistory {
    let registry = PriceProviderRegistry::new().with_provider(Arc::new(provider));
    PortfolioHistory::with_parts(settings, registry, store)
}

/// Store whose reads or writes always fail.
struct BrokenStore {
    fail_reads: bool,
}

#[async_trait]
impl PriceStore for BrokenStore {
    async fn read_prices(&self, _index: &PriceIndex) -> Result<Vec<PricePoint>, CoreError> {
        if self.fail_reads {
            Err(CoreError::CacheRead("connection refused".into()))
        } else {
            Ok(Vec::new())
        }
    }

    async fn write_prices(&self, _points: &[PricePoint]) -> Result<usize, CoreError> {
        Err(CoreError::CacheWrite("read-only".into()))
    }

    async fn len(&self) -> Result<usize, CoreError> {
        Ok(0)
    }
}

// ═══════════════════════════════════════════════════════════════════
// Holdings from a workbook
// ═══════════════════════════════════════════════════════════════════

mod holdings_from_sheet {
    use super::*;
    use portfolio_history_core::models::rows::CashOperationRow;
    use portfolio_history_core::parsing::parse_sheet;

    #[test]
    fn ups_and_meta_scenario() {
        let parsed = parse_sheet::<CashOperationRow>(&cash_sheet());
        let holdings = HoldingsService::new();
        let txs = holdings.transactions_from_operations(&parsed.successes, &TickerNormalizer::default());
        let sparse = holdings.reconstruct(&txs);

        assert_eq!(sparse.len(), 2);
        assert_eq!(sparse[0].0, key(2025, 11, 8));
        assert_eq!(sparse[0].1.quantity(&ext("UPS")), Some(5.0));
        assert_eq!(sparse[0].1.quantity(&ext("META")), Some(5.0));
        assert_eq!(sparse[1].0, key(2025, 11, 9));
        assert_eq!(sparse[1].1.quantity(&ext("UPS")), Some(5.0));
        assert_eq!(sparse[1].1.quantity(&ext("META")), Some(10.0));

        let dense = CalendarService::new().fill(&sparse, today()).unwrap();
        assert_eq!(dense.len(), 3);
        assert_eq!(dense[2].1, sparse[1].1);
    }
}

// ═══════════════════════════════════════════════════════════════════
// Full report
// ═══════════════════════════════════════════════════════════════════

mod report {
    use super::*;

    #[tokio::test]
    async fn values_every_day_and_splits_cash_flows() {
        let store = Arc::new(InMemoryPriceStore::new());
        let app = app_with(Settings::default(), priced_mock(), store.clone());

        let report = app.build_report(&workbook(), today()).await.unwrap();

        assert_eq!(report.cash_flow_currency, "PLN");
        let deposits: Vec<f64> = report.deposits.iter().map(|c| c.amount).collect();
        assert_eq!(deposits, vec![1000.0, 200.0]);
        assert_eq!(report.withdrawals.len(), 1);
        assert_eq!(report.withdrawals[0].amount, -50.0);
        assert_eq!(report.withdrawals[0].id, "6");

        let values: Vec<(DateKey, f64)> = report.value.iter().map(|v| (v.date, v.value)).collect();
        assert_eq!(
            values,
            vec![
                (key(2025, 11, 8), 3500.0),
                (key(2025, 11, 9), 6605.0),
                (key(2025, 11, 10), 6710.0),
            ]
        );

        let diag = &report.diagnostics;
        assert_eq!(diag.cash_rows, 6);
        assert_eq!(diag.cash_row_failures, 1);
        assert_eq!(diag.cached_prices, 0);
        assert_eq!(diag.fetched_prices, 6);
        assert_eq!(diag.fetch_failures, 0);
        assert_eq!(diag.missing_prices, 0);

        // Monday's bars are still provisional and stay out of the store
        assert_eq!(store.len().await.unwrap(), 4);
        let stored = store
            .read_prices(&PriceIndex::from([
                (ext("UPS"), vec![PriceRange::open(key(2025, 11, 1))]),
                (ext("META"), vec![PriceRange::open(key(2025, 11, 1))]),
            ]))
            .await
            .unwrap();
        assert_eq!(stored.len(), 4);
        assert!(stored.iter().all(|p| p.date < key(2025, 11, 10)));
    }

    #[tokio::test]
    async fn second_run_served_from_cache() {
        let store = Arc::new(InMemoryPriceStore::new());
        let app = app_with(Settings::default(), priced_mock(), store.clone());

        let first = app.build_report(&workbook(), today()).await.unwrap();
        let second = app.build_report(&workbook(), today()).await.unwrap();

        assert_eq!(first.value, second.value);
        assert_eq!(second.diagnostics.cached_prices, 4);
        // only today's bar is asked for again
        assert_eq!(second.diagnostics.fetched_prices, 2);
        assert_eq!(second.diagnostics.missing_prices, 0);
        assert_eq!(store.len().await.unwrap(), 4);
    }

    #[tokio::test]
    async fn todays_close_refreshed_on_later_run() {
        let store = Arc::new(InMemoryPriceStore::new());
        let intraday = app_with(Settings::default(), priced_mock(), store.clone());
        let first = intraday.build_report(&workbook(), today()).await.unwrap();
        assert_eq!(first.value[2].value, 6710.0);

        // same store, provider now reports a different close for Monday
        let settled = priced_mock()
            .with_quotes(
                ext("UPS"),
                vec![
                    quote(d(2025, 11, 8), 100.0),
                    quote(d(2025, 11, 9), 101.0),
                    quote(d(2025, 11, 10), 104.0),
                ],
            );
        let later = app_with(Settings::default(), settled, store.clone());
        let second = later.build_report(&workbook(), today()).await.unwrap();

        assert_eq!(second.value[2].value, 6720.0);
        assert_eq!(second.value[..2], first.value[..2]);
    }

    #[tokio::test]
    async fn failed_symbol_reported_not_fatal() {
        let provider = priced_mock().with_failure(ext("META"));
        let app = app_with(Settings::default(), provider, Arc::new(InMemoryPriceStore::new()));

        let report = app.build_report(&workbook(), today()).await.unwrap();

        let values: Vec<f64> = report.value.iter().map(|v| v.value).collect();
        assert_eq!(values, vec![500.0, 505.0, 510.0]);
        assert_eq!(report.diagnostics.fetch_failures, 1);
        assert_eq!(report.diagnostics.missing_prices, 3);
    }

    #[tokio::test]
    async fn cash_flows_converted_when_rate_configured() {
        let settings = Settings {
            report_currency: Some("USD".into()),
            conversion_rates: HashMap::from([("PLN".to_string(), 0.2746)]),
            ..Settings::default()
        };
        let app = app_with(settings, priced_mock(), Arc::new(InMemoryPriceStore::new()));

        let report = app.build_report(&workbook(), today()).await.unwrap();

        assert_eq!(report.cash_flow_currency, "USD");
        assert_eq!(report.deposits[0].amount, 274.6);
        assert_eq!(report.deposits[1].amount, 54.92);
    }

    #[tokio::test]
    async fn conversion_leaves_value_series_untouched() {
        let settings = Settings {
            report_currency: Some("USD".into()),
            conversion_rates: HashMap::from([("PLN".to_string(), 0.2746)]),
            ..Settings::default()
        };
        let converted = app_with(settings, priced_mock(), Arc::new(InMemoryPriceStore::new()))
            .build_report(&workbook(), today())
            .await
            .unwrap();
        let plain = app_with(Settings::default(), priced_mock(), Arc::new(InMemoryPriceStore::new()))
            .build_report(&workbook(), today())
            .await
            .unwrap();

        assert_eq!(converted.value, plain.value);
        assert_ne!(converted.deposits, plain.deposits);
        assert_eq!(plain.cash_flow_currency, "PLN");
    }

    #[tokio::test]
    async fn no_trades_no_values() {
        let sheet = vec![
            row(&["", "Currency"]),
            row(&["", "EUR"]),
            row(&["", "ID", "Type", "Time", "Comment", "Symbol", "Amount"]),
            row(&["", "1", "deposit", "01.11.2025 09:00:00", "", "", "100"]),
        ];
        let wb = Workbook::new().with_sheet(CASH_OPERATION_SHEET, sheet);
        let store = Arc::new(InMemoryPriceStore::new());
        let app = app_with(Settings::default(), priced_mock(), store.clone());

        let report = app.build_report(&wb, today()).await.unwrap();

        assert_eq!(report.cash_flow_currency, "EUR");
        assert_eq!(report.deposits.len(), 1);
        assert!(report.value.is_empty());
        assert_eq!(report.diagnostics.fetched_prices, 0);
        assert_eq!(store.len().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn position_sheets_counted_when_present() {
        let open = vec![
            row(&["", "Position", "Symbol", "Type"]),
            row(&["", "P1", "UPS.US", "BUY", "5", "08.11.2025 14:03:27", "100", "102", "500", "10"]),
            row(&["", "P2", "META.US", "SHORT", "10", "08.11.2025 15:10:00", "600", "620", "6000", "200"]),
        ];
        let closed = vec![row(&["", "Position", "Symbol", "Type"])];
        let wb = workbook()
            .with_sheet(OPEN_POSITION_SHEET, open)
            .with_sheet(CLOSED_POSITION_SHEET, closed);
        let app = app_with(Settings::default(), priced_mock(), Arc::new(InMemoryPriceStore::new()));

        let report = app.build_report(&wb, today()).await.unwrap();

        assert_eq!(report.diagnostics.open_positions, 1);
        assert_eq!(report.diagnostics.closed_positions, 0);
        assert_eq!(report.diagnostics.position_row_failures, 1);
    }

    #[tokio::test]
    async fn report_serializes_to_json() {
        let app = app_with(Settings::default(), priced_mock(), Arc::new(InMemoryPriceStore::new()));
        let report = app.build_report(&workbook(), today()).await.unwrap();

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["cash_flow_currency"], "PLN");
        assert_eq!(json["value"][0]["date"], "2025-11-08");
        assert_eq!(json["value"][0]["value"], 3500.0);
    }
}

// ═══════════════════════════════════════════════════════════════════
// Failure modes
// ═══════════════════════════════════════════════════════════════════

mod failures {
    use super::*;

    #[tokio::test]
    async fn missing_cash_sheet_is_client_error() {
        let app = app_with(Settings::default(), priced_mock(), Arc::new(InMemoryPriceStore::new()));
        let err = app
            .build_report(&Workbook::new(), today())
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::CsvParsing(_)));
        assert_eq!(err.status_code(), 400);
    }

    #[tokio::test]
    async fn missing_currency_is_client_error() {
        let sheet = vec![
            row(&["", "ID", "Type", "Time", "Comment", "Symbol", "Amount"]),
            row(&["", "1", "deposit", "01.11.2025 09:00:00", "", "", "100"]),
        ];
        let wb = Workbook::new().with_sheet(CASH_OPERATION_SHEET, sheet);
        let app = app_with(Settings::default(), priced_mock(), Arc::new(InMemoryPriceStore::new()));

        let err = app.build_report(&wb, today()).await.unwrap_err();
        assert!(matches!(err, CoreError::HeaderParsing(_)));
        assert_eq!(err.status_code(), 400);
    }

    #[tokio::test]
    async fn store_read_failure_is_fatal() {
        let app = app_with(
            Settings::default(),
            priced_mock(),
            Arc::new(BrokenStore { fail_reads: true }),
        );
        let err = app.build_report(&workbook(), today()).await.unwrap_err();
        assert!(matches!(err, CoreError::CacheRead(_)));
        assert_eq!(err.status_code(), 500);
    }

    #[tokio::test]
    async fn store_write_failure_is_only_logged() {
        let app = app_with(
            Settings::default(),
            priced_mock(),
            Arc::new(BrokenStore { fail_reads: false }),
        );
        let report = app.build_report(&workbook(), today()).await.unwrap();
        assert_eq!(report.value.len(), 3);
        assert_eq!(report.diagnostics.fetched_prices, 6);
    }
}

// ═══════════════════════════════════════════════════════════════════
// CSV files + settings-built pipeline
// ═══════════════════════════════════════════════════════════════════

mod from_files {
    use super::*;

    fn write_csv(dir: &std::path::Path, name: &str, rows: &[Vec<String>]) -> std::path::PathBuf {
        let path = dir.join(name);
        let mut writer = csv::WriterBuilder::new()
            .flexible(true)
            .from_path(&path)
            .unwrap();
        for r in rows {
            writer.write_record(r).unwrap();
        }
        writer.flush().unwrap();
        path
    }

    #[tokio::test]
    async fn csv_export_with_synthetic_prices() {
        let dir = tempfile::tempdir().unwrap();
        let cash = write_csv(dir.path(), "cash.csv", &cash_sheet());

        let settings = Settings {
            providers: vec!["mock".into()],
            cache_path: dir.path().join("cache").join("prices.bin"),
            ..Settings::default()
        };
        let app = PortfolioHistory::from_settings(settings).unwrap();
        let wb = PortfolioHistory::load_workbook(&cash, None, None).unwrap();

        // a Tuesday
        let report = app.build_report(&wb, d(2025, 11, 11)).await.unwrap();

        // 2025-11-08 and 2025-11-09 fall on a weekend: the synthetic series
        // has no bars there, so only Monday and Tuesday get a value
        assert_eq!(report.value.len(), 4);
        assert_eq!(report.value[0].value, 0.0);
        assert_eq!(report.value[1].value, 0.0);
        assert!(report.value[2].value > 0.0);
        assert!(report.value[3].value > 0.0);
        assert_eq!(report.diagnostics.missing_prices, 4);

        // Monday's two bars; Tuesday is today and not persisted
        assert_eq!(app.cached_price_count().await.unwrap(), 2);
        assert!(dir.path().join("cache").join("prices.bin").exists());
    }

    #[test]
    fn missing_position_file_fails_loading() {
        let dir = tempfile::tempdir().unwrap();
        let cash = write_csv(dir.path(), "cash.csv", &cash_sheet());
        let missing = dir.path().join("open.csv");

        let err = PortfolioHistory::load_workbook(&cash, Some(missing.as_path()), None).unwrap_err();
        assert!(matches!(err, CoreError::CsvParsing(_)));
    }

    #[test]
    fn optional_sheets_loaded_when_given() {
        let dir = tempfile::tempdir().unwrap();
        let cash = write_csv(dir.path(), "cash.csv", &cash_sheet());
        let mut open = std::fs::File::create(dir.path().join("open.csv")).unwrap();
        writeln!(open, ",Position,Symbol,Type").unwrap();

        let open_path = dir.path().join("open.csv");
        let wb = PortfolioHistory::load_workbook(&cash, Some(open_path.as_path()), None).unwrap();
        assert!(wb.sheet(OPEN_POSITION_SHEET).is_some());
        assert!(wb.sheet(CLOSED_POSITION_SHEET).is_none());
    }

    #[test]
    fn unknown_provider_rejected() {
        let settings = Settings {
            providers: vec!["nope".into()],
            ..Settings::default()
        };
        assert!(matches!(
            PortfolioHistory::from_settings(settings),
            Err(CoreError::Config(_))
        ));
    }
}
