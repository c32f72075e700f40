//! # Rates Client SDK
//!
//! A typed Rust client for the RateFlow API.

use chrono::NaiveDate;
use rates_types::{
    ApiResponse, CurrencyPair, HealthStatus, ListRatesResult, Pagination, RateResponse,
};
use reqwest::Client;
use serde::de::DeserializeOwned;

/// Error type for client operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {status} {code} - {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Malformed response: {0}")]
    Malformed(String),
}

impl ClientError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::Api { status: 404, .. })
    }
}

/// Rates API client.
pub struct RatesClient {
    base_url: String,
    http: Client,
}

impl RatesClient {
    /// Creates a new client.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Reports the service status string.
    pub async fn health(&self) -> Result<HealthStatus, ClientError> {
        let envelope = self.get("/health", &[]).await?;
        data(envelope)
    }

    /// Latest rate for `pair`.
    pub async fn latest(&self, pair: CurrencyPair) -> Result<RateResponse, ClientError> {
        let envelope = self
            .get("/api/v1/rates/latest", &[("pair", pair.to_string())])
            .await?;
        data(envelope)
    }

    /// Rate for `pair` on `date`.
    pub async fn rate_on(
        &self,
        pair: CurrencyPair,
        date: NaiveDate,
    ) -> Result<RateResponse, ClientError> {
        let envelope = self
            .get(
                "/api/v1/rates",
                &[("pair", pair.to_string()), ("date", date.to_string())],
            )
            .await?;
        data(envelope)
    }

    /// One page of rates for `pair`, optionally restricted to an inclusive range.
    pub async fn list(
        &self,
        pair: CurrencyPair,
        page: u32,
        page_size: u32,
        range: Option<(NaiveDate, NaiveDate)>,
    ) -> Result<ListRatesResult, ClientError> {
        let mut query = vec![
            ("pair", pair.to_string()),
            ("page", page.to_string()),
            ("pageSize", page_size.to_string()),
        ];
        if let Some((start, end)) = range {
            query.push(("startDate", start.to_string()));
            query.push(("endDate", end.to_string()));
        }

        let envelope: ApiResponse<Vec<RateResponse>> =
            self.get("/api/v1/rates/list", &query).await?;
        let pagination: Pagination = envelope
            .meta
            .clone()
            .ok_or_else(|| ClientError::Malformed("list response without meta".into()))?;
        Ok(ListRatesResult {
            items: data(envelope)?,
            pagination,
        })
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<ApiResponse<T>, ClientError> {
        let resp = self
            .http
            .get(format!("{}{}", self.base_url, path))
            .query(query)
            .send()
            .await?;
        self.handle_response(resp).await
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<ApiResponse<T>, ClientError> {
        let status = resp.status();
        let body = resp.text().await?;
        if status.is_success() {
            Ok(serde_json::from_str(&body)?)
        } else {
            let (code, message) = serde_json::from_str::<ApiResponse<serde_json::Value>>(&body)
                .ok()
                .and_then(|envelope| envelope.error)
                .map(|error| (error.code, error.message))
                .unwrap_or_else(|| ("UNKNOWN".to_string(), body));
            Err(ClientError::Api {
                status: status.as_u16(),
                code,
                message,
            })
        }
    }
}

fn data<T>(envelope: ApiResponse<T>) -> Result<T, ClientError> {
    envelope
        .data
        .ok_or_else(|| ClientError::Malformed("successful response without data".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::{Json, Router, http::StatusCode, routing::get};
    use serde_json::json;

    #[test]
    fn test_client_creation() {
        let client = RatesClient::new("http://localhost:8080");
        assert_eq!(client.base_url(), "http://localhost:8080");
    }

    #[test]
    fn test_client_with_trailing_slash() {
        let client = RatesClient::new("http://localhost:8080/");
        assert_eq!(client.base_url(), "http://localhost:8080");
    }

    fn rate_json(pair: &str, base: &str, quote: &str, rate: f64, date: &str) -> serde_json::Value {
        json!({
            "id": "2b3c9a04-6f3e-4a4e-9d55-0a4a1c2f7e10",
            "pair": pair,
            "baseCurrency": base,
            "quoteCurrency": quote,
            "rate": rate,
            "effectiveDate": date,
            "source": "unionpay",
            "createdAt": "2024-01-02T00:00:00Z",
            "updatedAt": "2024-01-02T00:00:00Z"
        })
    }

    /// Serves canned envelopes on an ephemeral port.
    async fn stub_server() -> String {
        let app = Router::new()
            .route(
                "/health",
                get(|| async { Json(json!({"success": true, "data": {"status": "healthy"}})) }),
            )
            .route(
                "/api/v1/rates/latest",
                get(|| async {
                    (
                        StatusCode::NOT_FOUND,
                        Json(json!({
                            "success": false,
                            "error": {"code": "NOT_FOUND", "message": "Exchange rate not found"}
                        })),
                    )
                }),
            )
            .route(
                "/api/v1/rates",
                get(|| async {
                    Json(json!({
                        "success": true,
                        "data": rate_json("CNY/JPY", "CNY", "JPY", 20.5, "2024-01-02")
                    }))
                }),
            )
            .route(
                "/api/v1/rates/list",
                get(|| async {
                    Json(json!({
                        "success": true,
                        "data": [
                            rate_json("USD/JPY", "USD", "JPY", 150.1, "2024-01-03"),
                            rate_json("USD/JPY", "USD", "JPY", 149.8, "2024-01-02")
                        ],
                        "meta": {"page": 1, "pageSize": 2, "total": 7, "totalPages": 4}
                    }))
                }),
            );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn pair(s: &str) -> CurrencyPair {
        s.parse().unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let client = RatesClient::new(stub_server().await);
        assert_eq!(client.health().await.unwrap().status, "healthy");
    }

    #[tokio::test]
    async fn test_error_envelope_becomes_api_error() {
        let client = RatesClient::new(stub_server().await);

        let err = client.latest(pair("CNY/JPY")).await.unwrap_err();
        assert!(err.is_not_found());
        match err {
            ClientError::Api { code, message, .. } => {
                assert_eq!(code, "NOT_FOUND");
                assert_eq!(message, "Exchange rate not found");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_rate_on_unwraps_data() {
        let client = RatesClient::new(stub_server().await);
        let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();

        let rate = client.rate_on(pair("CNY/JPY"), date).await.unwrap();
        assert_eq!(rate.rate, 20.5);
        assert_eq!(rate.effective_date, date);
    }

    #[tokio::test]
    async fn test_list_reads_meta() {
        let client = RatesClient::new(stub_server().await);

        let result = client.list(pair("USD/JPY"), 1, 2, None).await.unwrap();
        assert_eq!(result.items.len(), 2);
        assert_eq!(result.pagination.total, 7);
        assert_eq!(result.pagination.total_pages, 4);
    }
}
