use crate::models::rows::{CashOperationRow, CashOperationType};
use crate::models::ticker::Ticker;
use crate::models::validation::{IssueCode, ValidationIssue};

use super::cells::{parse_comment_quantity, RowReader};
use super::RowSchema;

/// Name of the cash operation sheet in the export.
pub const CASH_OPERATION_SHEET: &str = "CASH OPERATION HISTORY";

// Column layout: [blank] ID | Type | Time | Comment | Symbol | Amount
const COL_ID: usize = 1;
const COL_TYPE: usize = 2;
const COL_TIME: usize = 3;
const COL_COMMENT: usize = 4;
const COL_SYMBOL: usize = 5;
const COL_AMOUNT: usize = 6;

impl RowSchema for CashOperationRow {
    const MARKERS: &'static [&'static str] = &["ID"];

    fn from_cells(cells: &[String]) -> Result<Self, Vec<ValidationIssue>> {
        let mut r = RowReader::new(cells);

        let id = r.text(COL_ID, "id");
        let kind = r.one_of(
            COL_TYPE,
            "type",
            CashOperationType::from_label,
            CashOperationType::labels(),
        );
        let time = r.datetime(COL_TIME, "time");
        let comment = r.optional_text(COL_COMMENT).unwrap_or_default();
        let symbol_text = r.optional_text(COL_SYMBOL);
        let amount = r.number(COL_AMOUNT, "amount");

        let is_trade = kind.map(|k| k.is_stock_trade()).unwrap_or(false);

        let symbol = match symbol_text {
            Some(text) => match Ticker::new(&text) {
                Ok(ticker) => Some(ticker),
                Err(_) => {
                    r.report(
                        ValidationIssue::new("symbol", IssueCode::InvalidValue, "Invalid ticker")
                            .with_value(text),
                    );
                    None
                }
            },
            None => {
                if is_trade {
                    r.report(ValidationIssue::new(
                        "symbol",
                        IssueCode::Missing,
                        "Stock trades require a symbol",
                    ));
                }
                None
            }
        };

        let quantity = if is_trade {
            let quantity = parse_comment_quantity(&comment);
            if quantity.is_finite() {
                Some(quantity)
            } else {
                r.report(
                    ValidationIssue::new(
                        "quantity",
                        IssueCode::InvalidNumber,
                        "Could not read quantity from comment",
                    )
                    .with_value(comment.clone()),
                );
                None
            }
        } else {
            None
        };

        r.finish()?;

        // finish() succeeded, so every required field was read
        match (id, kind, time, amount) {
            (Some(id), Some(kind), Some(time), Some(amount)) => Ok(CashOperationRow {
                id,
                kind,
                time,
                comment,
                symbol,
                amount,
                quantity,
            }),
            _ => Err(vec![ValidationIssue::new(
                "row",
                IssueCode::Missing,
                "Incomplete row",
            )]),
        }
    }
}
