//! Error types for the exchange-rate service.

use chrono::NaiveDate;

use crate::domain::{CurrencyCode, CurrencyPair};

/// Domain-level errors (validation of values and entities).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DomainError {
    #[error("Invalid currency code: {0}")]
    InvalidCurrency(String),

    #[error("Base and quote currency must differ: {0}")]
    SameCurrency(CurrencyCode),

    #[error("Invalid currency pair format: {0}")]
    InvalidPairFormat(String),

    #[error("Rate value must be positive and finite, got {0}")]
    NonPositiveRate(f64),

    #[error("Effective date {0} is too far in the future")]
    EffectiveDateInFuture(NaiveDate),

    #[error("Effective date {0} is before 2000-01-01")]
    EffectiveDateTooOld(NaiveDate),

    #[error("Invalid rate source: {0}")]
    InvalidSource(String),
}

/// Repository-level errors (data access failures).
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Entity not found")]
    NotFound,

    #[error("Conflict: {0}")]
    Conflict(String),
}

impl RepoError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, RepoError::NotFound)
    }
}

/// Errors raised by rate providers.
///
/// `RateNotFound` and `Unavailable` mean the data may show up later
/// (weekends, holidays, not yet published); callers can retry.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error(
        "{provider}: rate not found for {pair} on {date} (possibly weekend/holiday or unsupported pair)"
    )]
    RateNotFound {
        provider: &'static str,
        pair: CurrencyPair,
        date: NaiveDate,
    },

    #[error("{provider}: data not available for {date}")]
    Unavailable {
        provider: &'static str,
        date: NaiveDate,
    },

    #[error("{provider}: unsupported pair {pair}")]
    Unsupported {
        provider: &'static str,
        pair: CurrencyPair,
    },

    #[error("{provider}: request failed: {message}")]
    Transport {
        provider: &'static str,
        message: String,
    },

    #[error("{provider}: malformed response: {message}")]
    Parse {
        provider: &'static str,
        message: String,
    },
}

impl ProviderError {
    /// True when retrying later (or with another date) may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ProviderError::RateNotFound { .. }
                | ProviderError::Unavailable { .. }
                | ProviderError::Transport { .. }
        )
    }
}

/// Cache backend errors. Never fatal to a request.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Cache backend error: {0}")]
    Backend(String),

    #[error("Cache serialization error: {0}")]
    Serialization(String),
}

/// Failure of the fetch command, tagged with the step that failed.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("failed to check existing rate for {pair} on {date}: {source}")]
    ExistenceCheck {
        pair: CurrencyPair,
        date: NaiveDate,
        #[source]
        source: RepoError,
    },

    #[error("failed to fetch rate for {pair} on {date}: {source}")]
    Provider {
        pair: CurrencyPair,
        date: NaiveDate,
        #[source]
        source: ProviderError,
    },

    #[error("invalid rate for {pair} on {date}: {source}")]
    Entity {
        pair: CurrencyPair,
        date: NaiveDate,
        #[source]
        source: DomainError,
    },

    #[error("failed to save rate for {pair} on {date}: {source}")]
    Save {
        pair: CurrencyPair,
        date: NaiveDate,
        #[source]
        source: RepoError,
    },
}

/// Application-level errors (for HTTP responses).
///
/// Maps cleanly to HTTP status codes.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::Domain(e) => AppError::BadRequest(e.to_string()),
            RepoError::NotFound => AppError::NotFound("Exchange rate not found".into()),
            RepoError::Database(e) => AppError::Internal(e),
            RepoError::Conflict(e) => AppError::BadRequest(e),
        }
    }
}

impl From<FetchError> for AppError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::Entity { .. } => AppError::BadRequest(err.to_string()),
            FetchError::Provider { ref source, .. } if source.is_retryable() => {
                AppError::NotFound(err.to_string())
            }
            _ => AppError::Internal(err.to_string()),
        }
    }
}
