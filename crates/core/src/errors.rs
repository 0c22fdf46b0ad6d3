use thiserror::Error;

/// Unified error type for the entire portfolio-history-core library.
/// Every public function returns `Result<T, CoreError>`.
///
/// Row-level validation problems are NOT errors: they are collected as
/// [`ValidationFailure`](crate::models::validation::ValidationFailure) values
/// so one bad row never aborts a whole sheet.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Input workbook ──────────────────────────────────────────────
    #[error("Header parsing failed: {0}")]
    HeaderParsing(String),

    #[error("CSV parsing failed: {0}")]
    CsvParsing(String),

    // ── Domain values ───────────────────────────────────────────────
    #[error("Invalid ticker: {0:?}")]
    InvalidTicker(String),

    #[error("Invalid date key: {0:?} (expected YYYY-MM-DD)")]
    InvalidDateKey(String),

    #[error("No holdings to build a calendar from")]
    EmptyHoldings,

    // ── Prices ──────────────────────────────────────────────────────
    #[error("Failed to get historical prices for {symbol} ({start} → {end}): {message}")]
    GetHistoricalPrices {
        symbol: String,
        start: String,
        end: String,
        message: String,
    },

    #[error("Price not available for {symbol} on {date}")]
    MissingPrice { symbol: String, date: String },

    #[error("API error ({provider}): {message}")]
    Api { provider: String, message: String },

    // ── Price cache ─────────────────────────────────────────────────
    #[error("Price cache read failed: {0}")]
    CacheRead(String),

    #[error("Price cache write failed: {0}")]
    CacheWrite(String),

    #[error("Invalid file format: {0}")]
    InvalidFileFormat(String),

    #[error("Unsupported file version: {0}")]
    UnsupportedVersion(u16),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    // ── File I/O / configuration ────────────────────────────────────
    #[error("File I/O error: {0}")]
    FileIO(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl CoreError {
    /// HTTP status an upload endpoint would answer with for this error.
    ///
    /// Structural problems with the uploaded file are the client's fault;
    /// everything else is reported as a server failure.
    pub fn status_code(&self) -> u16 {
        match self {
            CoreError::HeaderParsing(_)
            | CoreError::CsvParsing(_)
            | CoreError::InvalidTicker(_)
            | CoreError::InvalidDateKey(_) => 400,
            _ => 500,
        }
    }
}

// ── Conversion helpers (From impls) ─────────────────────────────────

impl From<std::io::Error> for CoreError {
    fn from(e: std::io::Error) -> Self {
        CoreError::FileIO(e.to_string())
    }
}

impl From<bincode::Error> for CoreError {
    fn from(e: bincode::Error) -> Self {
        CoreError::Serialization(e.to_string())
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Deserialization(e.to_string())
    }
}

impl From<csv::Error> for CoreError {
    fn from(e: csv::Error) -> Self {
        CoreError::CsvParsing(e.to_string())
    }
}
