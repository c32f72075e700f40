//! Reference-rate provider for development and seeding.
//!
//! Rates are derived from each currency's static USD reference value:
//! `rate(base/quote) = usd(base) / usd(quote)`. Explicit overrides win.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDate;

use rates_types::{CurrencyCode, CurrencyPair, ProviderError, RateProvider};

const PROVIDER: &str = "manual";

#[derive(Debug, Clone, Default)]
pub struct ManualProvider {
    overrides: HashMap<CurrencyPair, f64>,
}

impl ManualProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pins the rate for `pair`; its inverse is derived from it.
    pub fn with_rate(mut self, pair: CurrencyPair, rate: f64) -> Self {
        self.overrides.insert(pair, rate);
        self
    }

    /// Rate for `pair` regardless of date.
    pub fn rate(&self, pair: CurrencyPair) -> f64 {
        if let Some(rate) = self.overrides.get(&pair) {
            return *rate;
        }
        if let Some(rate) = self.overrides.get(&pair.inverse()) {
            return pair.inverse().convert_rate(*rate);
        }
        pair.base().usd_reference() / pair.quote().usd_reference()
    }
}

#[async_trait]
impl RateProvider for ManualProvider {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn fetch_rate(&self, pair: CurrencyPair, date: NaiveDate) -> Result<f64, ProviderError> {
        let rate = self.rate(pair);
        tracing::debug!(%pair, %date, rate, "manual reference rate");
        Ok(rate)
    }

    fn supported_pairs(&self) -> Vec<CurrencyPair> {
        let all = CurrencyCode::all();
        all.iter()
            .flat_map(|base| all.iter().map(move |quote| (*base, *quote)))
            .filter_map(|(base, quote)| CurrencyPair::new(base, quote).ok())
            .collect()
    }
}
