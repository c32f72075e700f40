//! Exchange rate provider port.
//!
//! Implementations can be HTTP clients, static tables, test doubles, etc.

use chrono::{NaiveDate, Utc};

use crate::domain::CurrencyPair;
use crate::error::ProviderError;

/// Source of raw exchange rates.
#[async_trait::async_trait]
pub trait RateProvider: Send + Sync {
    /// Stable provider name, also used as the stored source tag.
    fn name(&self) -> &'static str;

    /// Rate for `pair` on `date`: units of quote per one unit of base.
    async fn fetch_rate(&self, pair: CurrencyPair, date: NaiveDate) -> Result<f64, ProviderError>;

    /// Rate for today.
    async fn fetch_latest(&self, pair: CurrencyPair) -> Result<f64, ProviderError> {
        self.fetch_rate(pair, Utc::now().date_naive()).await
    }

    /// Pairs this provider is known to serve.
    fn supported_pairs(&self) -> Vec<CurrencyPair>;
}
