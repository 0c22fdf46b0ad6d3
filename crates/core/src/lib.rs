pub mod errors;
pub mod models;
pub mod parsing;
pub mod providers;
pub mod services;
pub mod storage;

use chrono::NaiveDate;
use std::path::Path;
use std::sync::Arc;

use errors::CoreError;
use models::report::PortfolioReport;
use models::settings::Settings;
use parsing::cash_operations::CASH_OPERATION_SHEET;
use parsing::positions::{CLOSED_POSITION_SHEET, OPEN_POSITION_SHEET};
use parsing::workbook::Workbook;
use providers::registry::PriceProviderRegistry;
use services::history_service::HistoryService;
use storage::file_store::FilePriceStore;
use storage::traits::PriceStore;

/// Main entry point for the portfolio history core library.
/// Owns the settings, the price store and the pipeline built on top of them.
#[must_use]
pub struct PortfolioHistory {
    settings: Settings,
    store: Arc<dyn PriceStore>,
    history_service: HistoryService,
}

impl std::fmt::Debug for PortfolioHistory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PortfolioHistory")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl PortfolioHistory {
    /// Build from settings: providers by name, prices cached in
    /// `settings.cache_path`.
    pub fn from_settings(settings: Settings) -> Result<Self, CoreError> {
        let registry = PriceProviderRegistry::from_settings(&settings)?;
        let store: Arc<dyn PriceStore> = Arc::new(FilePriceStore::new(settings.cache_path.clone()));
        Ok(Self::with_parts(settings, registry, store))
    }

    /// Build with explicit collaborators (used by tests and embedders).
    pub fn with_parts(
        settings: Settings,
        registry: PriceProviderRegistry,
        store: Arc<dyn PriceStore>,
    ) -> Self {
        let history_service = HistoryService::new(&settings, registry, Arc::clone(&store));
        Self {
            settings,
            store,
            history_service,
        }
    }

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Assemble a workbook from per-sheet CSV exports. Position sheets are optional.
    pub fn load_workbook(
        cash: &Path,
        open: Option<&Path>,
        closed: Option<&Path>,
    ) -> Result<Workbook, CoreError> {
        let mut workbook = Workbook::new();
        workbook.load_csv_sheet(CASH_OPERATION_SHEET, cash)?;
        if let Some(path) = open {
            workbook.load_csv_sheet(OPEN_POSITION_SHEET, path)?;
        }
        if let Some(path) = closed {
            workbook.load_csv_sheet(CLOSED_POSITION_SHEET, path)?;
        }
        Ok(workbook)
    }

    /// Deposits, withdrawals and the daily value series for `workbook` as of `today`.
    pub async fn build_report(
        &self,
        workbook: &Workbook,
        today: NaiveDate,
    ) -> Result<PortfolioReport, CoreError> {
        self.history_service.build_report(workbook, today).await
    }

    /// Number of `(symbol, date)` prices in the store.
    pub async fn cached_price_count(&self) -> Result<usize, CoreError> {
        self.store.len().await
    }
}
