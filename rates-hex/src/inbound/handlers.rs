//! HTTP request handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::NaiveDate;
use serde::Deserialize;

use rates_types::{
    ApiResponse, AppError, CurrencyPair, HealthStatus, ListRatesParams, RateCache, RateRepository,
};

use crate::RateService;

/// Application state shared across handlers.
pub struct AppState<R: RateRepository, C: RateCache> {
    pub service: RateService<R, C>,
}

/// Wrapper to implement IntoResponse for AppError (orphan rule workaround).
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self.0 {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "internal server error".to_string(),
                )
            }
        };

        (status, Json(ApiResponse::<()>::error(code, message))).into_response()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Query parameters
// ─────────────────────────────────────────────────────────────────────────────

/// Raw query strings; parsed leniently so bad values map to our own errors.
#[derive(Debug, Default, Deserialize)]
pub struct PairQuery {
    pub pair: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RateOnQuery {
    pub pair: Option<String>,
    pub date: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub pair: Option<String>,
    pub page: Option<String>,
    pub page_size: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

fn required_pair(raw: Option<&str>) -> Result<CurrencyPair, AppError> {
    let raw = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::BadRequest("pair parameter is required".into()))?;
    raw.parse()
        .map_err(|_| AppError::BadRequest(format!("invalid currency pair format: {raw}")))
}

fn parse_date(name: &str, raw: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| {
        AppError::BadRequest(format!("invalid {name} format, use YYYY-MM-DD"))
    })
}

/// Unparsable numbers fall back to the defaults applied by `ListRatesParams`.
fn lenient_number(raw: Option<&str>) -> Option<u32> {
    raw.and_then(|s| s.trim().parse::<i64>().ok())
        .map(|n| n.clamp(0, i64::from(u32::MAX)) as u32)
}

impl ListQuery {
    fn into_params(self) -> Result<ListRatesParams, AppError> {
        let pair = required_pair(self.pair.as_deref())?;
        let params = ListRatesParams::new(
            pair,
            lenient_number(self.page.as_deref()),
            lenient_number(self.page_size.as_deref()),
        );

        let start = non_empty(self.start_date.as_deref());
        let end = non_empty(self.end_date.as_deref());
        match (start, end) {
            (Some(start), Some(end)) => {
                let start = parse_date("startDate", start)?;
                let end = parse_date("endDate", end)?;
                if end < start {
                    return Err(AppError::BadRequest(
                        "endDate must not be before startDate".into(),
                    ));
                }
                Ok(params.with_range(start, end))
            }
            _ => Ok(params),
        }
    }
}

fn non_empty(raw: Option<&str>) -> Option<&str> {
    raw.filter(|s| !s.trim().is_empty())
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// Health check endpoint.
pub async fn health() -> impl IntoResponse {
    Json(ApiResponse::ok(HealthStatus {
        status: "healthy".into(),
    }))
}

/// Latest rate for a pair.
#[tracing::instrument(skip(state))]
pub async fn latest_rate<R: RateRepository, C: RateCache>(
    State(state): State<Arc<AppState<R, C>>>,
    Query(query): Query<PairQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let pair = required_pair(query.pair.as_deref())?;
    let rate = state.service.get_latest(pair).await?;
    Ok(Json(ApiResponse::ok(rate)))
}

/// Rate for a pair on a given date.
#[tracing::instrument(skip(state))]
pub async fn rate_on_date<R: RateRepository, C: RateCache>(
    State(state): State<Arc<AppState<R, C>>>,
    Query(query): Query<RateOnQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let pair = required_pair(query.pair.as_deref())?;
    let raw_date = non_empty(query.date.as_deref())
        .ok_or_else(|| AppError::BadRequest("date parameter is required".into()))?;
    let date = parse_date("date", raw_date)?;

    let rate = state.service.get_rate_on(pair, date).await?;
    Ok(Json(ApiResponse::ok(rate)))
}

/// Paginated rates for a pair, newest first.
#[tracing::instrument(skip(state))]
pub async fn list_rates<R: RateRepository, C: RateCache>(
    State(state): State<Arc<AppState<R, C>>>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let params = query.into_params()?;
    let result = state.service.list_rates(params).await?;
    Ok(Json(ApiResponse::paginated(result.items, result.pagination)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list_query(page: Option<&str>, size: Option<&str>) -> ListQuery {
        ListQuery {
            pair: Some("CNYJPY".into()),
            page: page.map(Into::into),
            page_size: size.map(Into::into),
            ..ListQuery::default()
        }
    }

    #[test]
    fn test_pair_is_required() {
        assert!(matches!(required_pair(None), Err(AppError::BadRequest(_))));
        assert!(matches!(
            required_pair(Some("  ")),
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            required_pair(Some("CNY/XXX")),
            Err(AppError::BadRequest(_))
        ));
        assert_eq!(required_pair(Some("cny-jpy")).unwrap().to_string(), "CNY/JPY");
    }

    #[test]
    fn test_lenient_paging() {
        let p = list_query(Some("abc"), Some("-5")).into_params().unwrap();
        assert_eq!((p.page, p.page_size), (1, 20));

        let p = list_query(Some("3"), Some("1000")).into_params().unwrap();
        assert_eq!((p.page, p.page_size), (3, 100));
    }

    #[test]
    fn test_range_requires_both_dates() {
        let mut q = list_query(None, None);
        q.start_date = Some("2024-01-01".into());
        assert_eq!(q.into_params().unwrap().range, None);

        let mut q = list_query(None, None);
        q.start_date = Some("2024-01-01".into());
        q.end_date = Some("2024-01-31".into());
        assert!(q.into_params().unwrap().range.is_some());
    }

    #[test]
    fn test_bad_range_rejected() {
        let mut q = list_query(None, None);
        q.start_date = Some("2024-02-01".into());
        q.end_date = Some("2024-01-01".into());
        assert!(matches!(q.into_params(), Err(AppError::BadRequest(_))));

        let mut q = list_query(None, None);
        q.start_date = Some("01/02/2024".into());
        q.end_date = Some("2024-01-01".into());
        assert!(matches!(q.into_params(), Err(AppError::BadRequest(_))));
    }
}
