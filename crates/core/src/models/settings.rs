use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Runtime configuration for one deployment.
///
/// Every field has a default so a partial config file (or none at all) works.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Exact broker ticker → provider ticker pairs for naming mismatches the
    /// suffix rules cannot express.
    pub ticker_overrides: HashMap<String, String>,

    /// Broker exchange suffix → provider exchange suffix. An empty value drops
    /// the suffix entirely (US listings).
    pub exchange_suffixes: HashMap<String, String>,

    /// Price providers to try, in order (`"yahoo"`, `"mock"`).
    pub providers: Vec<String>,

    /// Upper bound for a single historical price request.
    pub fetch_timeout_secs: u64,

    /// Maximum number of price requests in flight.
    pub fetch_concurrency: usize,

    /// Location of the persisted price cache.
    pub cache_path: PathBuf,

    /// Currency the report is expressed in when a conversion rate is known.
    pub report_currency: Option<String>,

    /// Account currency → rate into `report_currency`.
    pub conversion_rates: HashMap<String, f64>,
}

impl Settings {
    pub fn default_ticker_overrides() -> HashMap<String, String> {
        [
            ("BRK.B.US", "BRK-B"),
            ("BF.B.US", "BF-B"),
            ("CSPX.UK", "CSPX.L"),
            ("VUSA.UK", "VUSA.L"),
            ("EUNL.DE", "EUNL.DE"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    pub fn default_exchange_suffixes() -> HashMap<String, String> {
        [
            ("PL", "WA"),
            ("UK", "GB"),
            ("FI", "HE"),
            ("US", ""),
            ("DE", "DE"),
            ("FR", "PA"),
            ("NL", "AS"),
            ("IT", "MI"),
            ("ES", "MC"),
            ("BE", "BR"),
            ("PT", "LS"),
            ("DK", "CO"),
            ("SE", "ST"),
            ("NO", "OL"),
            ("CH", "SW"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            ticker_overrides: Self::default_ticker_overrides(),
            exchange_suffixes: Self::default_exchange_suffixes(),
            providers: vec!["yahoo".to_string()],
            fetch_timeout_secs: 20,
            fetch_concurrency: 4,
            cache_path: PathBuf::from("data/prices.bin"),
            report_currency: None,
            conversion_rates: HashMap::new(),
        }
    }
}
