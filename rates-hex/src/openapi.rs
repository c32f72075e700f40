//! OpenAPI specification and documentation.

#![allow(dead_code)] // Path functions are only used by utoipa for documentation generation

use rates_types::domain::{CurrencyCode, RateId, Source};
use rates_types::dto::{ErrorBody, HealthStatus, Pagination, RateResponse};
use utoipa::OpenApi;

// Dummy functions to generate path documentation
// These are not the actual handlers, just for OpenAPI path generation

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = inline(serde_json::Value), example = json!({"success": true, "data": {"status": "healthy"}}))
    )
)]
async fn health() {}

/// Latest exchange rate for a currency pair
///
/// Falls back to the stored inverse pair and converts the value.
#[utoipa::path(
    get,
    path = "/api/v1/rates/latest",
    tag = "rates",
    params(
        ("pair" = String, Query, description = "Currency pair (CNY/JPY, CNY-JPY or CNYJPY)")
    ),
    responses(
        (status = 200, description = "Latest rate, wrapped in the response envelope", body = inline(serde_json::Value)),
        (status = 400, description = "Missing or invalid pair", body = ErrorBody),
        (status = 404, description = "No rate stored for either orientation", body = ErrorBody)
    )
)]
async fn latest_rate() {}

/// Exchange rate for a currency pair on a specific date
#[utoipa::path(
    get,
    path = "/api/v1/rates",
    tag = "rates",
    params(
        ("pair" = String, Query, description = "Currency pair (CNY/JPY, CNY-JPY or CNYJPY)"),
        ("date" = String, Query, description = "Date in YYYY-MM-DD format")
    ),
    responses(
        (status = 200, description = "Rate on the date, wrapped in the response envelope", body = inline(serde_json::Value)),
        (status = 400, description = "Missing or invalid pair or date", body = ErrorBody),
        (status = 404, description = "No rate stored for that date", body = ErrorBody)
    )
)]
async fn rate_on_date() {}

/// Paginated exchange rates for a currency pair, newest first
#[utoipa::path(
    get,
    path = "/api/v1/rates/list",
    tag = "rates",
    params(
        ("pair" = String, Query, description = "Currency pair (CNY/JPY, CNY-JPY or CNYJPY)"),
        ("page" = Option<u32>, Query, description = "Page number (default: 1)"),
        ("pageSize" = Option<u32>, Query, description = "Items per page (default: 20, max: 100)"),
        ("startDate" = Option<String>, Query, description = "Range start, YYYY-MM-DD (needs endDate)"),
        ("endDate" = Option<String>, Query, description = "Range end, YYYY-MM-DD (needs startDate)")
    ),
    responses(
        (status = 200, description = "Rates in `data`, pagination in `meta`", body = inline(serde_json::Value)),
        (status = 400, description = "Missing or invalid pair or dates", body = ErrorBody),
        (status = 500, description = "Storage failure", body = ErrorBody)
    )
)]
async fn list_rates() {}

/// OpenAPI documentation for the Rates API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "RateFlow Exchange Rate API",
        version = "1.0.0",
        description = "Multi-currency exchange rates with inverse-pair fallback.\n\nEvery response uses the envelope `{\"success\", \"data\", \"meta\", \"error\"}`. The legacy `/api/rates/...` paths serve the same handlers.",
        license(name = "MIT"),
    ),
    paths(health, latest_rate, rate_on_date, list_rates),
    components(
        schemas(
            RateResponse,
            Pagination,
            ErrorBody,
            HealthStatus,
            CurrencyCode,
            Source,
            RateId,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "rates", description = "Exchange rate queries"),
    )
)]
pub struct ApiDoc;
