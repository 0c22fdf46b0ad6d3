use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::ticker::DateKey;

/// A deposit or withdrawal taken straight from the cash operation sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashFlow {
    pub id: String,
    pub time: NaiveDateTime,
    pub amount: f64,
}

/// Portfolio market value at the end of one day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyValue {
    pub date: DateKey,
    pub value: f64,
}

/// Counters describing how complete a report is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportDiagnostics {
    pub cash_rows: usize,
    pub cash_row_failures: usize,
    pub open_positions: usize,
    pub closed_positions: usize,
    pub position_row_failures: usize,
    pub cached_prices: usize,
    pub fetched_prices: usize,
    pub fetch_failures: usize,
    pub missing_prices: usize,
}

/// Everything derived from one uploaded workbook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioReport {
    /// Currency of `deposits` and `withdrawals`: the configured report
    /// currency when a conversion applies, the account currency otherwise.
    /// `value` is never converted and sums each listing's own quote currency.
    pub cash_flow_currency: String,
    pub deposits: Vec<CashFlow>,
    pub withdrawals: Vec<CashFlow>,
    pub value: Vec<DailyValue>,
    pub diagnostics: ReportDiagnostics,
}
