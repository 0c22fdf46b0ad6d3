use std::fmt;
use std::sync::Arc;

use tracing::warn;

use crate::errors::CoreError;
use crate::models::settings::Settings;

use super::mock::MockPriceProvider;
use super::traits::PriceProvider;
use super::yahoo_finance::YahooFinanceProvider;

/// Ordered list of price providers.
///
/// The fetcher asks providers in registration order and falls back to the
/// next one when a request fails.
#[derive(Clone)]
pub struct PriceProviderRegistry {
    providers: Vec<Arc<dyn PriceProvider>>,
}

impl PriceProviderRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
        }
    }

    /// Build the registry named by `settings.providers`.
    pub fn from_settings(settings: &Settings) -> Result<Self, CoreError> {
        let mut registry = Self::new();

        for name in &settings.providers {
            match name.trim().to_lowercase().as_str() {
                "yahoo" => match YahooFinanceProvider::new() {
                    Ok(yahoo) => registry.register(Arc::new(yahoo)),
                    Err(e) => warn!("Yahoo Finance provider unavailable: {e}"),
                },
                "mock" => registry.register(Arc::new(MockPriceProvider::new())),
                other => {
                    return Err(CoreError::Config(format!("unknown price provider {other:?}")));
                }
            }
        }

        if registry.is_empty() {
            return Err(CoreError::Config("no price provider available".into()));
        }
        Ok(registry)
    }

    /// Register a new price provider after the existing ones.
    pub fn register(&mut self, provider: Arc<dyn PriceProvider>) {
        self.providers.push(provider);
    }

    pub fn with_provider(mut self, provider: Arc<dyn PriceProvider>) -> Self {
        self.register(provider);
        self
    }

    /// All providers in fallback order.
    pub fn providers(&self) -> &[Arc<dyn PriceProvider>] {
        &self.providers
    }

    pub fn names(&self) -> Vec<String> {
        self.providers.iter().map(|p| p.name().to_string()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl fmt::Debug for PriceProviderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PriceProviderRegistry")
            .field("providers", &self.names())
            .finish()
    }
}

impl Default for PriceProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}
