pub mod cache_diff_service;
pub mod calendar_service;
pub mod currency_service;
pub mod history_service;
pub mod holdings_service;
pub mod price_index_service;
pub mod price_service;
pub mod ticker_service;
pub mod valuation_service;
