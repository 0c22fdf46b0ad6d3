use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::models::portfolio::round2;
use crate::models::settings::Settings;

/// An amount in a named currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Money {
    pub currency: String,
    pub value: f64,
}

impl Money {
    pub fn new(currency: impl Into<String>, value: f64) -> Self {
        Self {
            currency: currency.into().to_uppercase(),
            value,
        }
    }
}

/// Single-step currency conversion with an explicitly supplied rate.
///
/// Rates come from configuration only: the account currency is converted with
/// one configured rate or not at all.
pub struct CurrencyService {
    target: Option<String>,
    rates: HashMap<String, f64>,
}

impl CurrencyService {
    pub fn new() -> Self {
        Self {
            target: None,
            rates: HashMap::new(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            target: settings.report_currency.as_ref().map(|c| c.to_uppercase()),
            rates: settings
                .conversion_rates
                .iter()
                .map(|(k, v)| (k.to_uppercase(), *v))
                .collect(),
        }
    }

    /// `money.value × rate`, rounded to cents.
    pub fn convert_currency(money: &Money, rate: f64) -> f64 {
        round2(money.value * rate)
    }

    /// Currency and rate to express `account_currency` amounts in, if a
    /// conversion is configured. Same-currency conversion is the identity.
    pub fn conversion_for(&self, account_currency: &str) -> Option<(String, f64)> {
        let target = self.target.as_ref()?;
        let from = account_currency.to_uppercase();
        if &from == target {
            return Some((target.clone(), 1.0));
        }
        self.rates.get(&from).map(|rate| (target.clone(), *rate))
    }
}

impl Default for CurrencyService {
    fn default() -> Self {
        Self::new()
    }
}
