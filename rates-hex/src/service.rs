//! Rate Query Service
//!
//! Orchestrates read queries through the repository and cache ports.
//! Contains NO infrastructure logic - pure query orchestration.

use chrono::NaiveDate;

use rates_types::{
    AppError, CurrencyPair, LATEST_RATE_TTL, ListRatesParams, ListRatesResult, Pagination, Rate,
    RateCache, RateFilter, RateQuery, RateRepository, RateResponse, RepoError, latest_cache_key,
};

use crate::reconcile::{self, Side};

/// Application service for rate queries.
///
/// Generic over `R: RateRepository` and `C: RateCache` - adapters are injected
/// at compile time.
pub struct RateService<R: RateRepository, C: RateCache> {
    repo: R,
    cache: C,
}

impl<R: RateRepository, C: RateCache> RateService<R, C> {
    pub fn new(repo: R, cache: C) -> Self {
        Self { repo, cache }
    }

    /// Returns a reference to the underlying repository.
    pub fn repo(&self) -> &R {
        &self.repo
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Latest rate
    // ─────────────────────────────────────────────────────────────────────────────

    /// Most recent rate for `pair`, falling back to the stored inverse.
    ///
    /// Responses are cached per requested orientation for five minutes.
    pub async fn get_latest(&self, pair: CurrencyPair) -> Result<RateResponse, AppError> {
        let key = latest_cache_key(pair);

        if let Some(cached) = self.cached_response(&key).await {
            tracing::debug!(%pair, key = %key, "latest rate served from cache");
            return Ok(cached);
        }

        let response = match self.repo.find_latest(pair).await {
            Ok(rate) => RateResponse::from_rate(&rate),
            Err(RepoError::NotFound) => {
                let stored = self.repo.find_latest(pair.inverse()).await?;
                tracing::debug!(%pair, orientation = "inverse", "latest rate resolved");
                RateResponse::inverted(&stored, pair)
            }
            Err(e) => return Err(e.into()),
        };

        self.store_response(&key, &response).await;
        Ok(response)
    }

    async fn cached_response(&self, key: &str) -> Option<RateResponse> {
        match self.cache.get(key).await {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(response) => Some(response),
                Err(e) => {
                    tracing::warn!(key = %key, error = %e, "discarding undecodable cache entry");
                    None
                }
            },
            Ok(None) => {
                tracing::debug!(key = %key, "cache miss");
                None
            }
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "cache read failed");
                None
            }
        }
    }

    async fn store_response(&self, key: &str, response: &RateResponse) {
        let raw = match serde_json::to_string(response) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "failed to encode rate for cache");
                return;
            }
        };
        if let Err(e) = self.cache.set(key, &raw, LATEST_RATE_TTL).await {
            tracing::warn!(key = %key, error = %e, "cache write failed");
        }
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Rate on a date
    // ─────────────────────────────────────────────────────────────────────────────

    /// Rate for `pair` on `date`, falling back to the stored inverse. Not cached.
    pub async fn get_rate_on(
        &self,
        pair: CurrencyPair,
        date: NaiveDate,
    ) -> Result<RateResponse, AppError> {
        match self.repo.find_by_pair_and_date(pair, date).await {
            Ok(rate) => Ok(RateResponse::from_rate(&rate)),
            Err(RepoError::NotFound) => {
                let stored = self
                    .repo
                    .find_by_pair_and_date(pair.inverse(), date)
                    .await?;
                Ok(RateResponse::inverted(&stored, pair))
            }
            Err(e) => Err(e.into()),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Listing
    // ─────────────────────────────────────────────────────────────────────────────

    /// Page of rates for a pair, newest first, read from whichever stored
    /// orientation holds more data.
    pub async fn list_rates(&self, params: ListRatesParams) -> Result<ListRatesResult, AppError> {
        match params.range {
            Some((start, end)) => self.list_range(params, start, end).await,
            None => self.list_paged(params).await,
        }
    }

    async fn list_paged(&self, params: ListRatesParams) -> Result<ListRatesResult, AppError> {
        let pair = params.pair;

        let direct = self.paged_side(pair, &params).await;
        let inverse = if reconcile::needs_inverse(&direct) {
            Some(self.paged_side(pair.inverse(), &params).await)
        } else {
            None
        };
        log_sides(pair, &direct, inverse.as_ref());

        let (orientation, side) = reconcile::select(direct, inverse)?;
        let total = self
            .repo
            .count(&RateFilter::for_pair(orientation.stored_pair(pair)))
            .await?;
        tracing::debug!(%pair, orientation = orientation.as_str(), total, "list orientation selected");

        Ok(ListRatesResult {
            items: to_responses(&side.rows, pair),
            pagination: Pagination::new(params.page, params.page_size, total),
        })
    }

    /// One page of `stored` plus its row count.
    ///
    /// A failed count does not fail the side; the page length stands in.
    async fn paged_side(
        &self,
        stored: CurrencyPair,
        params: &ListRatesParams,
    ) -> Result<Side<Rate>, RepoError> {
        let rows = self.repo.find_all(&RateQuery::page_of(stored, params)).await?;
        let count = match self.repo.count(&RateFilter::for_pair(stored)).await {
            Ok(count) => count,
            Err(e) => {
                tracing::warn!(pair = %stored, error = %e, "count failed, using page length");
                rows.len() as i64
            }
        };
        Ok(Side::new(rows, count))
    }

    async fn list_range(
        &self,
        params: ListRatesParams,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<ListRatesResult, AppError> {
        let pair = params.pair;

        let direct = self
            .repo
            .find_by_date_range(pair, start, end)
            .await
            .map(Side::counted);
        let inverse = if reconcile::needs_inverse(&direct) {
            Some(
                self.repo
                    .find_by_date_range(pair.inverse(), start, end)
                    .await
                    .map(Side::counted),
            )
        } else {
            None
        };
        log_sides(pair, &direct, inverse.as_ref());

        let (orientation, side) = reconcile::select(direct, inverse)?;
        tracing::debug!(%pair, orientation = orientation.as_str(), total = side.count, "range orientation selected");

        let mut rows = side.rows;
        rows.reverse();
        let total = rows.len() as i64;
        let from = params.offset().min(rows.len());
        let to = (from + params.page_size as usize).min(rows.len());

        Ok(ListRatesResult {
            items: to_responses(&rows[from..to], pair),
            pagination: Pagination::new(params.page, params.page_size, total),
        })
    }
}

fn to_responses(rows: &[Rate], requested: CurrencyPair) -> Vec<RateResponse> {
    rows.iter()
        .map(|rate| RateResponse::for_pair(rate, requested))
        .collect()
}

fn log_sides(
    pair: CurrencyPair,
    direct: &Result<Side<Rate>, RepoError>,
    inverse: Option<&Result<Side<Rate>, RepoError>>,
) {
    let count = |side: &Result<Side<Rate>, RepoError>| side.as_ref().map(|s| s.count).ok();
    tracing::debug!(
        %pair,
        direct_count = ?count(direct),
        inverse_count = ?inverse.and_then(count),
        "list sides read"
    );
}

