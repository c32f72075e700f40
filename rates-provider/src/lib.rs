//! Exchange rate provider adapters.
//!
//! Each adapter implements the `RateProvider` port. `ConfiguredProvider`
//! selects one at runtime from a `ProviderKind` without trait objects.
//!
//! # Example
//! ```no_run
//! use rates_provider::{ConfiguredProvider, ProviderKind};
//! use rates_types::RateProvider;
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let provider = ConfiguredProvider::build("unionpay".parse::<ProviderKind>()?)?;
//! let rate = provider.fetch_latest("CNY/JPY".parse()?).await?;
//! # Ok(()) }
//! ```

pub mod manual;
pub mod unionpay;

use async_trait::async_trait;
use chrono::NaiveDate;

use rates_types::{CurrencyPair, ProviderError, RateProvider};

pub use manual::ManualProvider;
pub use unionpay::UnionPayClient;

#[derive(Debug, thiserror::Error)]
#[error("Unknown provider: {0}. Supported: unionpay, manual")]
pub struct UnknownProvider(pub String);

/// Provider selectable by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    UnionPay,
    Manual,
}

impl std::str::FromStr for ProviderKind {
    type Err = UnknownProvider;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "unionpay" => Ok(ProviderKind::UnionPay),
            "manual" => Ok(ProviderKind::Manual),
            other => Err(UnknownProvider(other.to_string())),
        }
    }
}

/// Runtime-selected provider.
pub enum ConfiguredProvider {
    UnionPay(UnionPayClient),
    Manual(ManualProvider),
}

impl ConfiguredProvider {
    pub fn build(kind: ProviderKind) -> Result<Self, ProviderError> {
        Ok(match kind {
            ProviderKind::UnionPay => ConfiguredProvider::UnionPay(UnionPayClient::new()?),
            ProviderKind::Manual => ConfiguredProvider::Manual(ManualProvider::new()),
        })
    }
}

#[async_trait]
impl RateProvider for ConfiguredProvider {
    fn name(&self) -> &'static str {
        match self {
            ConfiguredProvider::UnionPay(p) => p.name(),
            ConfiguredProvider::Manual(p) => p.name(),
        }
    }

    async fn fetch_rate(&self, pair: CurrencyPair, date: NaiveDate) -> Result<f64, ProviderError> {
        match self {
            ConfiguredProvider::UnionPay(p) => p.fetch_rate(pair, date).await,
            ConfiguredProvider::Manual(p) => p.fetch_rate(pair, date).await,
        }
    }

    fn supported_pairs(&self) -> Vec<CurrencyPair> {
        match self {
            ConfiguredProvider::UnionPay(p) => p.supported_pairs(),
            ConfiguredProvider::Manual(p) => p.supported_pairs(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_kind_parse() {
        assert_eq!("UnionPay".parse::<ProviderKind>().unwrap(), ProviderKind::UnionPay);
        assert_eq!("manual".parse::<ProviderKind>().unwrap(), ProviderKind::Manual);
        assert!("ecb".parse::<ProviderKind>().is_err());
    }

    #[test]
    fn test_configured_provider_names_match_source_tags() {
        for kind in [ProviderKind::UnionPay, ProviderKind::Manual] {
            let provider = ConfiguredProvider::build(kind).unwrap();
            assert!(provider.name().parse::<rates_types::Source>().is_ok());
        }
    }
}
