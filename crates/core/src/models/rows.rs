use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ticker::Ticker;

/// Type column of the cash operation sheet. Closed set: anything else is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CashOperationType {
    Deposit,
    Withdrawal,
    IkeDeposit,
    StockPurchase,
    StockSale,
    /// Spelled `DIVIDENT` in the broker export.
    Dividend,
    WithholdingTax,
    FreeFundsInterest,
    FreeFundsInterestTax,
    SecFee,
    SubaccountTransfer,
    CloseTrade,
    Commission,
}

impl CashOperationType {
    pub const ALL: [CashOperationType; 13] = [
        CashOperationType::Deposit,
        CashOperationType::Withdrawal,
        CashOperationType::IkeDeposit,
        CashOperationType::StockPurchase,
        CashOperationType::StockSale,
        CashOperationType::Dividend,
        CashOperationType::WithholdingTax,
        CashOperationType::FreeFundsInterest,
        CashOperationType::FreeFundsInterestTax,
        CashOperationType::SecFee,
        CashOperationType::SubaccountTransfer,
        CashOperationType::CloseTrade,
        CashOperationType::Commission,
    ];

    /// Exact label used by the broker.
    pub fn label(&self) -> &'static str {
        match self {
            CashOperationType::Deposit => "deposit",
            CashOperationType::Withdrawal => "withdrawal",
            CashOperationType::IkeDeposit => "IKE Deposit",
            CashOperationType::StockPurchase => "Stock purchase",
            CashOperationType::StockSale => "Stock sale",
            CashOperationType::Dividend => "DIVIDENT",
            CashOperationType::WithholdingTax => "Withholding Tax",
            CashOperationType::FreeFundsInterest => "Free-funds Interest",
            CashOperationType::FreeFundsInterestTax => "Free-funds Interest Tax",
            CashOperationType::SecFee => "SEC fee",
            CashOperationType::SubaccountTransfer => "Subaccount Transfer",
            CashOperationType::CloseTrade => "close trade",
            CashOperationType::Commission => "commission",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.label() == label)
    }

    pub fn labels() -> Vec<String> {
        Self::ALL.iter().map(|t| t.label().to_string()).collect()
    }

    /// Purchases and sales carry a share quantity in their comment.
    pub fn is_stock_trade(&self) -> bool {
        matches!(
            self,
            CashOperationType::StockPurchase | CashOperationType::StockSale
        )
    }

    pub fn is_deposit(&self) -> bool {
        matches!(
            self,
            CashOperationType::Deposit | CashOperationType::IkeDeposit
        )
    }

    pub fn is_withdrawal(&self) -> bool {
        matches!(self, CashOperationType::Withdrawal)
    }
}

impl fmt::Display for CashOperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Direction of a position. The broker only exports long positions for stock accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PositionType {
    Buy,
}

impl PositionType {
    pub const ALL: [PositionType; 1] = [PositionType::Buy];

    pub fn label(&self) -> &'static str {
        match self {
            PositionType::Buy => "BUY",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.label() == label)
    }

    pub fn labels() -> Vec<String> {
        Self::ALL.iter().map(|t| t.label().to_string()).collect()
    }
}

impl fmt::Display for PositionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One validated row of the cash operation history sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashOperationRow {
    pub id: String,
    pub kind: CashOperationType,
    /// Broker-local timestamp.
    pub time: NaiveDateTime,
    pub comment: String,
    /// Present for trades and dividends, blank for deposits and fees.
    pub symbol: Option<Ticker>,
    pub amount: f64,
    /// Share count, only for `Stock purchase` / `Stock sale`.
    pub quantity: Option<f64>,
}

/// One validated row of the open position sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenPositionRow {
    pub position: String,
    pub symbol: Ticker,
    pub kind: PositionType,
    pub volume: f64,
    pub open_time: NaiveDateTime,
    pub open_price: f64,
    pub market_price: f64,
    pub purchase_value: f64,
    pub profit: f64,
}

/// One validated row of the closed position history sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClosedPositionRow {
    pub position: String,
    pub symbol: Ticker,
    pub kind: PositionType,
    pub volume: f64,
    pub open_time: NaiveDateTime,
    pub open_price: f64,
    pub close_time: NaiveDateTime,
    pub close_price: f64,
    pub purchase_value: f64,
    pub sale_value: f64,
    pub profit: f64,
}

/// Account metadata found above the table of a sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetHeader {
    /// ISO currency code of the account, e.g. `"PLN"`.
    pub currency: String,
    pub account: Option<String>,
}
