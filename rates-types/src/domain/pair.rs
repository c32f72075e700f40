//! Currency pair value type.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::currency::CurrencyCode;
use crate::error::DomainError;

/// Ordered (base, quote) pair: 1 unit of `base` = rate units of `quote`.
///
/// Base and quote are always distinct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CurrencyPair {
    base: CurrencyCode,
    quote: CurrencyCode,
}

impl CurrencyPair {
    pub fn new(base: CurrencyCode, quote: CurrencyCode) -> Result<Self, DomainError> {
        if base == quote {
            return Err(DomainError::SameCurrency(base));
        }
        Ok(Self { base, quote })
    }

    /// Parses `BASE/QUOTE`, `BASE-QUOTE` or the 6-character `BASEQUOTE` form.
    pub fn parse(s: &str) -> Result<Self, DomainError> {
        let normalized = s.trim().to_uppercase();

        let (base, quote) = if normalized.contains('/') {
            split_exact(&normalized, '/')?
        } else if normalized.contains('-') {
            split_exact(&normalized, '-')?
        } else if normalized.len() == 6 && normalized.is_ascii() {
            normalized.split_at(3)
        } else {
            return Err(DomainError::InvalidPairFormat(s.to_string()));
        };

        Self::new(base.parse()?, quote.parse()?)
    }

    pub fn base(&self) -> CurrencyCode {
        self.base
    }

    pub fn quote(&self) -> CurrencyCode {
        self.quote
    }

    /// The same pair viewed from the other side.
    pub fn inverse(&self) -> Self {
        Self {
            base: self.quote,
            quote: self.base,
        }
    }

    /// Re-expresses a rate quoted in this orientation in the inverse one.
    ///
    /// Zero maps to zero instead of infinity.
    pub fn convert_rate(&self, rate: f64) -> f64 {
        if rate == 0.0 { 0.0 } else { 1.0 / rate }
    }

    /// `BASEQUOTE` without a separator.
    pub fn compact(&self) -> String {
        format!("{}{}", self.base, self.quote)
    }

    /// Pairs that are commonly fetched.
    pub fn common_pairs() -> Vec<CurrencyPair> {
        use CurrencyCode::*;
        [
            (CNY, JPY),
            (CNY, USD),
            (USD, JPY),
            (EUR, USD),
            (GBP, USD),
            (USD, HKD),
            (USD, KRW),
            (USD, SGD),
        ]
        .into_iter()
        .map(|(base, quote)| Self { base, quote })
        .collect()
    }
}

fn split_exact(s: &str, sep: char) -> Result<(&str, &str), DomainError> {
    let mut parts = s.split(sep);
    match (parts.next(), parts.next(), parts.next()) {
        (Some(base), Some(quote), None) => Ok((base.trim(), quote.trim())),
        _ => Err(DomainError::InvalidPairFormat(s.to_string())),
    }
}

impl fmt::Display for CurrencyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.base, self.quote)
    }
}

impl FromStr for CurrencyPair {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for CurrencyPair {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CurrencyPair {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use CurrencyCode::*;

    fn pair(base: CurrencyCode, quote: CurrencyCode) -> CurrencyPair {
        CurrencyPair::new(base, quote).unwrap()
    }

    #[test]
    fn test_new_rejects_same_currency() {
        assert!(matches!(
            CurrencyPair::new(CNY, CNY),
            Err(DomainError::SameCurrency(CNY))
        ));
        let p = pair(CNY, JPY);
        assert_eq!(p.base(), CNY);
        assert_eq!(p.quote(), JPY);
    }

    #[test]
    fn test_parse_accepts_all_separators() {
        let expected = pair(CNY, JPY);
        assert_eq!(CurrencyPair::parse("CNY/JPY").unwrap(), expected);
        assert_eq!(CurrencyPair::parse("CNY-JPY").unwrap(), expected);
        assert_eq!(CurrencyPair::parse("CNYJPY").unwrap(), expected);
        assert_eq!(CurrencyPair::parse(" cny/jpy ").unwrap(), expected);
    }

    #[test]
    fn test_parse_rejects_malformed_input() {
        assert!(matches!(
            CurrencyPair::parse("CNY/JPY/USD"),
            Err(DomainError::InvalidPairFormat(_))
        ));
        assert!(matches!(
            CurrencyPair::parse("CNYJP"),
            Err(DomainError::InvalidPairFormat(_))
        ));
        assert!(matches!(
            CurrencyPair::parse("ABC/JPY"),
            Err(DomainError::InvalidCurrency(_))
        ));
        assert!(matches!(
            CurrencyPair::parse("USDUSD"),
            Err(DomainError::SameCurrency(USD))
        ));
        assert!(CurrencyPair::parse("").is_err());
    }

    #[test]
    fn test_display_round_trips_through_parse() {
        for p in CurrencyPair::common_pairs() {
            assert_eq!(CurrencyPair::parse(&p.to_string()).unwrap(), p);
        }
        assert_eq!(pair(EUR, USD).to_string(), "EUR/USD");
        assert_eq!(pair(EUR, USD).compact(), "EURUSD");
    }

    #[test]
    fn test_inverse_is_an_involution() {
        let p = pair(USD, JPY);
        assert_eq!(p.inverse(), pair(JPY, USD));
        assert_eq!(p.inverse().inverse(), p);
    }

    #[test]
    fn test_convert_rate() {
        let p = pair(JPY, CNY);
        assert_eq!(p.convert_rate(0.0), 0.0);
        assert!((p.convert_rate(0.05) - 20.0).abs() < 1e-9);
        for x in [0.05, 1.0, 7.31, 150.25] {
            assert!((p.convert_rate(p.convert_rate(x)) - x).abs() < 1e-9);
        }
    }

    #[test]
    fn test_serde_uses_canonical_string() {
        let json = serde_json::to_string(&pair(CNY, JPY)).unwrap();
        assert_eq!(json, "\"CNY/JPY\"");
        let back: CurrencyPair = serde_json::from_str("\"cny-jpy\"").unwrap();
        assert_eq!(back, pair(CNY, JPY));
    }
}
