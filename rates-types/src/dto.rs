//! Data Transfer Objects (DTOs) for queries, responses and storage filters.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{CurrencyCode, CurrencyPair, Rate, RateId, Source};

/// Largest page size a list query may request.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Page size used when none (or an invalid one) is given.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

// ─────────────────────────────────────────────────────────────────────────────
// Rate responses
// ─────────────────────────────────────────────────────────────────────────────

/// A rate as shown to API consumers and stored in the cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RateResponse {
    pub id: RateId,
    /// Canonical `BASE/QUOTE` form of the requested pair
    #[schema(example = "CNY/JPY")]
    pub pair: String,
    pub base_currency: CurrencyCode,
    pub quote_currency: CurrencyCode,
    #[schema(example = 20.53)]
    pub rate: f64,
    pub effective_date: NaiveDate,
    pub source: Source,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RateResponse {
    /// Stored rate shown as-is.
    pub fn from_rate(rate: &Rate) -> Self {
        Self::with_pair(rate, rate.pair(), rate.value())
    }

    /// Stored rate re-expressed for `requested`, which is its inverse.
    pub fn inverted(rate: &Rate, requested: CurrencyPair) -> Self {
        let value = rate.pair().convert_rate(rate.value());
        Self::with_pair(rate, requested, value)
    }

    /// Shows `rate` in the orientation of `requested`, inverting when needed.
    pub fn for_pair(rate: &Rate, requested: CurrencyPair) -> Self {
        if rate.pair() == requested {
            Self::from_rate(rate)
        } else {
            Self::inverted(rate, requested)
        }
    }

    fn with_pair(rate: &Rate, pair: CurrencyPair, value: f64) -> Self {
        Self {
            id: rate.id(),
            pair: pair.to_string(),
            base_currency: pair.base(),
            quote_currency: pair.quote(),
            rate: value,
            effective_date: rate.effective_date(),
            source: rate.source(),
            created_at: rate.created_at(),
            updated_at: rate.updated_at(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Listing
// ─────────────────────────────────────────────────────────────────────────────

/// Pagination metadata returned alongside list results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub page_size: u32,
    pub total: i64,
    pub total_pages: i64,
}

impl Pagination {
    pub fn new(page: u32, page_size: u32, total: i64) -> Self {
        let size = i64::from(page_size.max(1));
        Self {
            page,
            page_size,
            total,
            total_pages: (total.max(0) + size - 1) / size,
        }
    }
}

/// Validated input of the list query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListRatesParams {
    pub pair: CurrencyPair,
    pub page: u32,
    pub page_size: u32,
    /// Inclusive `(start, end)`; switches the query to range mode.
    pub range: Option<(NaiveDate, NaiveDate)>,
}

impl ListRatesParams {
    /// Clamps page to >= 1 and page size to `1..=MAX_PAGE_SIZE`.
    pub fn new(pair: CurrencyPair, page: Option<u32>, page_size: Option<u32>) -> Self {
        let page = page.filter(|p| *p >= 1).unwrap_or(1);
        let page_size = match page_size {
            Some(size) if size >= 1 => size.min(MAX_PAGE_SIZE),
            _ => DEFAULT_PAGE_SIZE,
        };
        Self {
            pair,
            page,
            page_size,
            range: None,
        }
    }

    pub fn with_range(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.range = Some((start, end));
        self
    }

    /// Row offset of the first item on the requested page.
    pub fn offset(&self) -> usize {
        (self.page as usize - 1) * self.page_size as usize
    }
}

/// One page of rates plus pagination metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ListRatesResult {
    pub items: Vec<RateResponse>,
    pub pagination: Pagination,
}

// ─────────────────────────────────────────────────────────────────────────────
// Storage filters
// ─────────────────────────────────────────────────────────────────────────────

/// Column filters for listing, counting and deleting stored rates.
///
/// Date bounds are exclusive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RateFilter {
    pub base: Option<CurrencyCode>,
    pub quote: Option<CurrencyCode>,
    pub source: Option<Source>,
    pub effective_before: Option<NaiveDate>,
    pub effective_after: Option<NaiveDate>,
}

impl RateFilter {
    /// Exact match on one orientation of a pair.
    pub fn for_pair(pair: CurrencyPair) -> Self {
        Self {
            base: Some(pair.base()),
            quote: Some(pair.quote()),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    #[default]
    Descending,
}

/// Limit/offset window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub limit: i64,
    pub offset: i64,
}

/// Filtered listing ordered by effective date.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RateQuery {
    pub filter: RateFilter,
    pub order: SortOrder,
    pub page: Option<PageRequest>,
}

impl RateQuery {
    /// Newest-first page of one orientation of a pair.
    pub fn page_of(pair: CurrencyPair, params: &ListRatesParams) -> Self {
        Self {
            filter: RateFilter::for_pair(pair),
            order: SortOrder::Descending,
            page: Some(PageRequest {
                limit: i64::from(params.page_size),
                offset: params.offset() as i64,
            }),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// API envelope
// ─────────────────────────────────────────────────────────────────────────────

/// Error detail inside the response envelope.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    #[schema(example = "NOT_FOUND")]
    pub code: String,
    pub message: String,
}

/// Envelope wrapping every API response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Pagination>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            meta: None,
            error: None,
        }
    }

    pub fn paginated(data: T, meta: Pagination) -> Self {
        Self {
            success: true,
            data: Some(data),
            meta: Some(meta),
            error: None,
        }
    }

    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            meta: None,
            error: Some(ErrorBody {
                code: code.into(),
                message: message.into(),
            }),
        }
    }
}

/// Body of the health endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthStatus {
    #[schema(example = "healthy")]
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Source;

    fn cny_jpy() -> CurrencyPair {
        CurrencyPair::new(CurrencyCode::CNY, CurrencyCode::JPY).unwrap()
    }

    #[test]
    fn test_pagination_rounds_up() {
        assert_eq!(Pagination::new(1, 10, 50).total_pages, 5);
        assert_eq!(Pagination::new(1, 10, 51).total_pages, 6);
        assert_eq!(Pagination::new(1, 10, 0).total_pages, 0);
    }

    #[test]
    fn test_list_params_clamp() {
        let p = ListRatesParams::new(cny_jpy(), Some(0), Some(500));
        assert_eq!(p.page, 1);
        assert_eq!(p.page_size, MAX_PAGE_SIZE);

        let p = ListRatesParams::new(cny_jpy(), None, Some(0));
        assert_eq!(p.page_size, DEFAULT_PAGE_SIZE);

        let p = ListRatesParams::new(cny_jpy(), Some(3), Some(10));
        assert_eq!(p.offset(), 20);
    }

    #[test]
    fn test_inverted_response_uses_requested_pair() {
        let stored = Rate::new(
            cny_jpy().inverse(),
            0.05,
            Utc::now().date_naive(),
            Source::UnionPay,
        )
        .unwrap();

        let resp = RateResponse::for_pair(&stored, cny_jpy());
        assert_eq!(resp.pair, "CNY/JPY");
        assert_eq!(resp.base_currency, CurrencyCode::CNY);
        assert!((resp.rate - 20.0).abs() < 1e-9);
        assert_eq!(resp.id, stored.id());
    }

    #[test]
    fn test_rate_response_json_is_camel_case() {
        let stored = Rate::new(cny_jpy(), 20.0, Utc::now().date_naive(), Source::Manual).unwrap();
        let json = serde_json::to_value(RateResponse::from_rate(&stored)).unwrap();
        assert_eq!(json["baseCurrency"], "CNY");
        assert_eq!(json["quoteCurrency"], "JPY");
        assert_eq!(json["source"], "manual");
        assert!(json.get("effectiveDate").is_some());
    }

    #[test]
    fn test_envelope_skips_empty_fields() {
        let json = serde_json::to_value(ApiResponse::<()>::error("NOT_FOUND", "missing")).unwrap();
        assert_eq!(json["success"], false);
        assert!(json.get("data").is_none());
        assert_eq!(json["error"]["code"], "NOT_FOUND");
    }
}
