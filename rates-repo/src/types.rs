//! Database row structs and their conversion into domain rates.
//!
//! Postgres returns native UUID/DATE/TIMESTAMPTZ columns; SQLite stores them
//! as TEXT (RFC 3339 timestamps, `YYYY-MM-DD` dates).

use sqlx::FromRow;

use rates_types::{CurrencyCode, CurrencyPair, Rate, RateId, RepoError, Source};

// ─────────────────────────────────────────────────────────────────────────────
// Row structs
// ─────────────────────────────────────────────────────────────────────────────

/// Rate row from PostgreSQL. `value` must be selected as DOUBLE PRECISION.
#[cfg(feature = "postgres")]
#[derive(FromRow)]
pub struct PgRateRow {
    pub id: uuid::Uuid,
    pub base_currency: String,
    pub quote_currency: String,
    pub value: f64,
    pub effective_date: chrono::NaiveDate,
    pub source: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// Rate row from SQLite.
#[cfg(feature = "sqlite")]
#[derive(FromRow)]
pub struct SqliteRateRow {
    pub id: String,
    pub base_currency: String,
    pub quote_currency: String,
    pub value: f64,
    pub effective_date: String,
    pub source: String,
    pub created_at: String,
    pub updated_at: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Parsing helpers
// ─────────────────────────────────────────────────────────────────────────────

fn corrupt(what: &str, err: impl std::fmt::Display) -> RepoError {
    RepoError::Database(format!("Corrupt {} column: {}", what, err))
}

fn parse_pair(base: &str, quote: &str) -> Result<CurrencyPair, RepoError> {
    let base: CurrencyCode = base.parse().map_err(|e| corrupt("base_currency", e))?;
    let quote: CurrencyCode = quote.parse().map_err(|e| corrupt("quote_currency", e))?;
    CurrencyPair::new(base, quote).map_err(|e| corrupt("currency pair", e))
}

fn parse_source(s: &str) -> Result<Source, RepoError> {
    s.parse().map_err(|e| corrupt("source", e))
}

#[cfg(feature = "sqlite")]
fn parse_timestamp(s: &str) -> Result<chrono::DateTime<chrono::Utc>, RepoError> {
    chrono::DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&chrono::Utc))
        .map_err(|e| corrupt("timestamp", e))
}

/// SQLite date column format.
#[cfg(feature = "sqlite")]
pub fn format_date(date: chrono::NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

// ─────────────────────────────────────────────────────────────────────────────
// Domain conversion
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(feature = "postgres")]
impl PgRateRow {
    pub fn into_domain(self) -> Result<Rate, RepoError> {
        Ok(Rate::from_parts(
            RateId::from_uuid(self.id),
            parse_pair(&self.base_currency, &self.quote_currency)?,
            self.value,
            self.effective_date,
            parse_source(&self.source)?,
            self.created_at,
            self.updated_at,
        ))
    }
}

#[cfg(feature = "sqlite")]
impl SqliteRateRow {
    pub fn into_domain(self) -> Result<Rate, RepoError> {
        let id = uuid::Uuid::parse_str(&self.id).map_err(|e| corrupt("id", e))?;
        let effective_date = chrono::NaiveDate::parse_from_str(&self.effective_date, "%Y-%m-%d")
            .map_err(|e| corrupt("effective_date", e))?;

        Ok(Rate::from_parts(
            RateId::from_uuid(id),
            parse_pair(&self.base_currency, &self.quote_currency)?,
            self.value,
            effective_date,
            parse_source(&self.source)?,
            parse_timestamp(&self.created_at)?,
            parse_timestamp(&self.updated_at)?,
        ))
    }
}
