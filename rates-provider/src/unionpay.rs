//! UnionPay International daily rate file adapter.
//!
//! UnionPay publishes one JSON file per day at `{base_url}/{YYYYMMDD}.json`.
//! Each row `(transCur, baseCur, rateData)` means one unit of `transCur`
//! costs `rateData` units of `baseCur`.

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use rates_types::{CurrencyCode, CurrencyPair, ProviderError, RateProvider};

pub const DEFAULT_BASE_URL: &str = "https://m.unionpayintl.com/jfimg";

const PROVIDER: &str = "unionpay";

/// One row of the daily rate file.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnionPayRow {
    pub trans_cur: String,
    pub base_cur: String,
    pub rate_data: f64,
}

/// Body of the daily rate file.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnionPayResponse {
    #[serde(default)]
    pub exchange_rate_json: Vec<UnionPayRow>,
    #[serde(default)]
    pub cur_date: Option<String>,
}

/// Finds the rate for `pair` among the rows, in either orientation.
///
/// A row published for the inverse pair yields the reciprocal.
pub fn resolve_rate(rows: &[UnionPayRow], pair: CurrencyPair) -> Option<f64> {
    let base = pair.base().code();
    let quote = pair.quote().code();

    let matches = |row: &UnionPayRow, trans: &str, base_cur: &str| {
        row.trans_cur.eq_ignore_ascii_case(trans) && row.base_cur.eq_ignore_ascii_case(base_cur)
    };

    if let Some(row) = rows.iter().find(|row| matches(row, quote, base)) {
        return Some(row.rate_data);
    }

    rows.iter()
        .find(|row| matches(row, base, quote))
        .map(|row| pair.convert_rate(row.rate_data))
}

/// HTTP client for the UnionPay daily rate files.
pub struct UnionPayClient {
    http: Client,
    base_url: String,
}

impl UnionPayClient {
    pub fn new() -> Result<Self, ProviderError> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Points the client at another host (mirrors, tests).
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, ProviderError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ProviderError::Transport {
                provider: PROVIDER,
                message: e.to_string(),
            })?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn file_url(&self, date: NaiveDate) -> String {
        format!("{}/{}.json", self.base_url, date.format("%Y%m%d"))
    }

    async fn fetch_file(&self, date: NaiveDate) -> Result<UnionPayResponse, ProviderError> {
        let url = self.file_url(date);
        tracing::debug!(%url, %date, "fetching unionpay rate file");

        let resp = self
            .http
            .get(&url)
            .header(
                "Content-Type",
                "application/x-www-form-urlencoded; charset=UTF-8",
            )
            .send()
            .await
            .map_err(|e| ProviderError::Transport {
                provider: PROVIDER,
                message: e.to_string(),
            })?;

        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            tracing::warn!(%url, %date, "unionpay returned 404, data not published for date");
            return Err(ProviderError::Unavailable {
                provider: PROVIDER,
                date,
            });
        }
        if !status.is_success() {
            return Err(ProviderError::Transport {
                provider: PROVIDER,
                message: format!("unexpected status {}", status),
            });
        }

        let body = resp.text().await.map_err(|e| ProviderError::Transport {
            provider: PROVIDER,
            message: e.to_string(),
        })?;

        serde_json::from_str(&body).map_err(|e| ProviderError::Parse {
            provider: PROVIDER,
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl RateProvider for UnionPayClient {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn fetch_rate(&self, pair: CurrencyPair, date: NaiveDate) -> Result<f64, ProviderError> {
        let file = self.fetch_file(date).await?;

        match resolve_rate(&file.exchange_rate_json, pair) {
            Some(rate) => {
                tracing::info!(%pair, rate, %date, "rate fetched successfully");
                Ok(rate)
            }
            None => {
                tracing::warn!(%pair, %date, rows = file.exchange_rate_json.len(), "rate not found in response");
                Err(ProviderError::RateNotFound {
                    provider: PROVIDER,
                    pair,
                    date,
                })
            }
        }
    }

    fn supported_pairs(&self) -> Vec<CurrencyPair> {
        use CurrencyCode::*;
        [
            (CNY, JPY),
            (CNY, USD),
            (CNY, EUR),
            (CNY, GBP),
            (CNY, HKD),
            (JPY, USD),
            (JPY, EUR),
            (JPY, CNY),
            (USD, JPY),
            (USD, EUR),
            (USD, CNY),
            (EUR, USD),
            (EUR, JPY),
            (GBP, USD),
        ]
        .into_iter()
        .filter_map(|(base, quote)| CurrencyPair::new(base, quote).ok())
        .collect()
    }
}
