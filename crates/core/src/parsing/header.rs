use crate::errors::CoreError;
use crate::models::rows::SheetHeader;

pub const CURRENCY_LABEL: &str = "Currency";
pub const ACCOUNT_LABEL: &str = "Account";

/// Value printed directly below `label` in the metadata block of a sheet.
fn labelled_value(rows: &[Vec<String>], label: &str) -> Option<String> {
    rows.iter().enumerate().find_map(|(r, row)| {
        let c = row.iter().position(|cell| cell.trim() == label)?;
        rows.get(r + 1)?
            .get(c)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    })
}

/// Read the account metadata above a sheet's table.
///
/// The currency is mandatory: without it no amount in the sheet can be
/// interpreted, so its absence fails the whole file.
pub fn parse_sheet_header(rows: &[Vec<String>]) -> Result<SheetHeader, CoreError> {
    let currency = labelled_value(rows, CURRENCY_LABEL).ok_or_else(|| {
        CoreError::HeaderParsing(format!("missing \"{CURRENCY_LABEL}\" value in sheet header"))
    })?;

    let currency = currency.to_uppercase();
    if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(CoreError::HeaderParsing(format!(
            "invalid currency code {currency:?}"
        )));
    }

    Ok(SheetHeader {
        currency,
        account: labelled_value(rows, ACCOUNT_LABEL),
    })
}
