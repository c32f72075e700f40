//! Repository port trait.
//!
//! This is the primary port in our hexagonal architecture.
//! Adapters (Postgres, SQLite) implement this trait.

use chrono::NaiveDate;

use crate::domain::{CurrencyPair, Rate, RateId};
use crate::dto::{RateFilter, RateQuery};
use crate::error::RepoError;

/// Storage of exchange rates keyed by (pair, effective date, source).
///
/// Lookups are orientation-specific: a rate stored as `JPY/CNY` is never
/// returned for `CNY/JPY`. Inverse fallback is the caller's job.
#[async_trait::async_trait]
pub trait RateRepository: Send + Sync + 'static {
    // ─────────────────────────────────────────────────────────────────────────────
    // Writes
    // ─────────────────────────────────────────────────────────────────────────────

    /// Inserts the rate, or overwrites value and `updated_at` of the row with
    /// the same (base, quote, effective date, source).
    ///
    /// Returns the row as stored. An overwritten row keeps its original id
    /// and `created_at`.
    async fn create(&self, rate: &Rate) -> Result<Rate, RepoError>;

    /// Deletes every row matching the filter. Maintenance only.
    async fn delete(&self, filter: &RateFilter) -> Result<u64, RepoError>;

    // ─────────────────────────────────────────────────────────────────────────────
    // Point lookups
    // ─────────────────────────────────────────────────────────────────────────────

    async fn find_by_id(&self, id: RateId) -> Result<Rate, RepoError>;

    async fn find_by_pair_and_date(
        &self,
        pair: CurrencyPair,
        date: NaiveDate,
    ) -> Result<Rate, RepoError>;

    /// Most recent rate by effective date for exactly this orientation.
    async fn find_latest(&self, pair: CurrencyPair) -> Result<Rate, RepoError>;

    async fn exists_by_pair_and_date(
        &self,
        pair: CurrencyPair,
        date: NaiveDate,
    ) -> Result<bool, RepoError>;

    // ─────────────────────────────────────────────────────────────────────────────
    // Listings
    // ─────────────────────────────────────────────────────────────────────────────

    /// Inclusive date range, oldest first.
    async fn find_by_date_range(
        &self,
        pair: CurrencyPair,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Rate>, RepoError>;

    /// Latest rate for each pair that has one. Pairs without data are skipped.
    async fn find_by_pairs(&self, pairs: &[CurrencyPair]) -> Result<Vec<Rate>, RepoError>;

    async fn find_all(&self, query: &RateQuery) -> Result<Vec<Rate>, RepoError>;

    async fn count(&self, filter: &RateFilter) -> Result<i64, RepoError>;
}
