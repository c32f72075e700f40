//! Exchange rate aggregate.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::pair::CurrencyPair;
use crate::error::DomainError;

/// Unique identifier for a stored Rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct RateId(Uuid);

impl RateId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn into_uuid(self) -> Uuid {
        self.0
    }
}

impl Default for RateId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for RateId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Where a rate came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    UnionPay,
    Ecb,
    OpenExchange,
    Manual,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::UnionPay => "unionpay",
            Source::Ecb => "ecb",
            Source::OpenExchange => "openexchange",
            Source::Manual => "manual",
        }
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Source {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "unionpay" => Ok(Source::UnionPay),
            "ecb" => Ok(Source::Ecb),
            "openexchange" => Ok(Source::OpenExchange),
            "manual" => Ok(Source::Manual),
            other => Err(DomainError::InvalidSource(other.to_string())),
        }
    }
}

/// Earliest effective date accepted for new rates.
pub fn min_effective_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2000, 1, 1).unwrap_or(NaiveDate::MIN)
}

/// A single observed exchange rate for one pair on one day.
#[derive(Debug, Clone, PartialEq)]
pub struct Rate {
    id: RateId,
    pair: CurrencyPair,
    value: f64,
    effective_date: NaiveDate,
    source: Source,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Rate {
    /// Creates a validated rate stamped with the current time.
    pub fn new(
        pair: CurrencyPair,
        value: f64,
        effective_date: NaiveDate,
        source: Source,
    ) -> Result<Self, DomainError> {
        Self::new_at(pair, value, effective_date, source, Utc::now())
    }

    /// Creates a validated rate as if constructed at `now`.
    ///
    /// # Validation
    /// - value must be finite and strictly positive
    /// - effective date at most one day after `now`
    /// - effective date not before 2000-01-01
    pub fn new_at(
        pair: CurrencyPair,
        value: f64,
        effective_date: NaiveDate,
        source: Source,
        now: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        if !value.is_finite() || value <= 0.0 {
            return Err(DomainError::NonPositiveRate(value));
        }

        let latest_allowed = (now + Duration::days(1)).date_naive();
        if effective_date > latest_allowed {
            return Err(DomainError::EffectiveDateInFuture(effective_date));
        }

        if effective_date < min_effective_date() {
            return Err(DomainError::EffectiveDateTooOld(effective_date));
        }

        Ok(Self {
            id: RateId::new(),
            pair,
            value,
            effective_date,
            source,
            created_at: now,
            updated_at: now,
        })
    }

    /// Reconstitutes a rate from storage without re-validating.
    pub fn from_parts(
        id: RateId,
        pair: CurrencyPair,
        value: f64,
        effective_date: NaiveDate,
        source: Source,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            pair,
            value,
            effective_date,
            source,
            created_at,
            updated_at,
        }
    }

    pub fn id(&self) -> RateId {
        self.id
    }

    pub fn pair(&self) -> CurrencyPair {
        self.pair
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn effective_date(&self) -> NaiveDate {
        self.effective_date
    }

    pub fn source(&self) -> Source {
        self.source
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CurrencyCode;

    fn cny_jpy() -> CurrencyPair {
        CurrencyPair::new(CurrencyCode::CNY, CurrencyCode::JPY).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_new_rate_valid() {
        let today = Utc::now().date_naive();
        let rate = Rate::new(cny_jpy(), 20.0, today, Source::UnionPay).unwrap();
        assert_eq!(rate.value(), 20.0);
        assert_eq!(rate.pair(), cny_jpy());
        assert_eq!(rate.effective_date(), today);
        assert_eq!(rate.created_at(), rate.updated_at());
    }

    #[test]
    fn test_rejects_non_positive_values() {
        let today = Utc::now().date_naive();
        for value in [0.0, -1.5, f64::NAN] {
            assert!(matches!(
                Rate::new(cny_jpy(), value, today, Source::Manual),
                Err(DomainError::NonPositiveRate(_))
            ));
        }
    }

    #[test]
    fn test_rejects_infinite_values() {
        let today = Utc::now().date_naive();
        for value in [f64::INFINITY, f64::NEG_INFINITY] {
            assert!(matches!(
                Rate::new(cny_jpy(), value, today, Source::Manual),
                Err(DomainError::NonPositiveRate(_))
            ));
        }
        assert!(Rate::new(cny_jpy(), f64::MAX, today, Source::Manual).is_ok());
    }

    #[test]
    fn test_future_date_window() {
        let now = date(2024, 6, 1).and_hms_opt(12, 0, 0).unwrap().and_utc();
        assert!(Rate::new_at(cny_jpy(), 1.0, date(2024, 6, 2), Source::Manual, now).is_ok());
        assert!(matches!(
            Rate::new_at(cny_jpy(), 1.0, date(2024, 6, 3), Source::Manual, now),
            Err(DomainError::EffectiveDateInFuture(_))
        ));
    }

    #[test]
    fn test_rejects_dates_before_2000() {
        assert!(matches!(
            Rate::new(cny_jpy(), 1.0, date(1999, 12, 31), Source::Ecb),
            Err(DomainError::EffectiveDateTooOld(_))
        ));
        assert!(Rate::new(cny_jpy(), 1.0, date(2000, 1, 1), Source::Ecb).is_ok());
    }

    #[test]
    fn test_from_parts_skips_validation() {
        let now = Utc::now();
        let rate = Rate::from_parts(
            RateId::new(),
            cny_jpy(),
            -1.0,
            date(1990, 1, 1),
            Source::Manual,
            now,
            now,
        );
        assert_eq!(rate.value(), -1.0);
    }

    #[test]
    fn test_source_parse() {
        assert_eq!("UnionPay".parse::<Source>().unwrap(), Source::UnionPay);
        assert_eq!("openexchange".parse::<Source>().unwrap(), Source::OpenExchange);
        assert!(matches!(
            "bloomberg".parse::<Source>(),
            Err(DomainError::InvalidSource(_))
        ));
        assert_eq!(Source::Ecb.to_string(), "ecb");
    }
}
