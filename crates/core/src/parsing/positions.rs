use crate::models::rows::{ClosedPositionRow, OpenPositionRow, PositionType};
use crate::models::ticker::Ticker;
use crate::models::validation::{IssueCode, ValidationIssue};

use super::cells::RowReader;
use super::RowSchema;

pub const OPEN_POSITION_SHEET: &str = "OPEN POSITION";
pub const CLOSED_POSITION_SHEET: &str = "CLOSED POSITION HISTORY";

fn read_ticker(r: &mut RowReader<'_>, idx: usize) -> Option<Ticker> {
    let text = r.text(idx, "symbol")?;
    match Ticker::new(&text) {
        Ok(ticker) => Some(ticker),
        Err(_) => {
            r.report(
                ValidationIssue::new("symbol", IssueCode::InvalidValue, "Invalid ticker")
                    .with_value(text),
            );
            None
        }
    }
}

fn read_kind(r: &mut RowReader<'_>, idx: usize) -> Option<PositionType> {
    r.one_of(idx, "type", PositionType::from_label, PositionType::labels())
}

fn incomplete() -> Vec<ValidationIssue> {
    vec![ValidationIssue::new("row", IssueCode::Missing, "Incomplete row")]
}

// Open positions: [blank] Position | Symbol | Type | Volume | Open time |
// Open price | Market price | Purchase value | Gross P/L
impl RowSchema for OpenPositionRow {
    const MARKERS: &'static [&'static str] = &["Position"];

    fn from_cells(cells: &[String]) -> Result<Self, Vec<ValidationIssue>> {
        let mut r = RowReader::new(cells);

        let position = r.text(1, "position");
        let symbol = read_ticker(&mut r, 2);
        let kind = read_kind(&mut r, 3);
        let volume = r.number(4, "volume");
        let open_time = r.datetime(5, "open_time");
        let open_price = r.number(6, "open_price");
        let market_price = r.number(7, "market_price");
        let purchase_value = r.number(8, "purchase_value");
        let profit = r.number(9, "profit");

        r.finish()?;

        Ok(OpenPositionRow {
            position: position.ok_or_else(incomplete)?,
            symbol: symbol.ok_or_else(incomplete)?,
            kind: kind.ok_or_else(incomplete)?,
            volume: volume.ok_or_else(incomplete)?,
            open_time: open_time.ok_or_else(incomplete)?,
            open_price: open_price.ok_or_else(incomplete)?,
            market_price: market_price.ok_or_else(incomplete)?,
            purchase_value: purchase_value.ok_or_else(incomplete)?,
            profit: profit.ok_or_else(incomplete)?,
        })
    }
}

// Closed positions: [blank] Position | Symbol | Type | Volume | Open time |
// Open price | Close time | Close price | Purchase value | Sale value | Gross P/L
impl RowSchema for ClosedPositionRow {
    const MARKERS: &'static [&'static str] = &["Position"];

    fn from_cells(cells: &[String]) -> Result<Self, Vec<ValidationIssue>> {
        let mut r = RowReader::new(cells);

        let position = r.text(1, "position");
        let symbol = read_ticker(&mut r, 2);
        let kind = read_kind(&mut r, 3);
        let volume = r.number(4, "volume");
        let open_time = r.datetime(5, "open_time");
        let open_price = r.number(6, "open_price");
        let close_time = r.datetime(7, "close_time");
        let close_price = r.number(8, "close_price");
        let purchase_value = r.number(9, "purchase_value");
        let sale_value = r.number(10, "sale_value");
        let profit = r.number(11, "profit");

        r.finish()?;

        Ok(ClosedPositionRow {
            position: position.ok_or_else(incomplete)?,
            symbol: symbol.ok_or_else(incomplete)?,
            kind: kind.ok_or_else(incomplete)?,
            volume: volume.ok_or_else(incomplete)?,
            open_time: open_time.ok_or_else(incomplete)?,
            open_price: open_price.ok_or_else(incomplete)?,
            close_time: close_time.ok_or_else(incomplete)?,
            close_price: close_price.ok_or_else(incomplete)?,
            purchase_value: purchase_value.ok_or_else(incomplete)?,
            sale_value: sale_value.ok_or_else(incomplete)?,
            profit: profit.ok_or_else(incomplete)?,
        })
    }
}
