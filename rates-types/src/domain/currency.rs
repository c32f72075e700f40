//! Supported currency codes.
//!
//! Currencies are declared once in the `define_currencies!` invocation at the
//! bottom of this file. The macro generates the closed `CurrencyCode` enum and
//! its metadata lookups.
//!
//! # Adding a New Currency
//! ```ignore
//! define_currencies! {
//!     // ... existing currencies ...
//!     CHF => ("CHF", "Fr", 1.13),
//! }
//! ```

use crate::error::DomainError;

/// Declares the currency set.
///
/// # Syntax
/// ```ignore
/// define_currencies! {
///     NAME => ("CODE", "SYMBOL", usd_per_unit),
/// }
/// ```
///
/// `usd_per_unit` is a static reference value used only by the manual
/// provider for seeding and development data.
macro_rules! define_currencies {
    (
        $(
            $name:ident => ($code:literal, $symbol:literal, $usd:expr)
        ),* $(,)?
    ) => {
        /// ISO-4217 code of a supported currency.
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            serde::Serialize,
            serde::Deserialize,
            utoipa::ToSchema,
        )]
        #[serde(rename_all = "UPPERCASE")]
        pub enum CurrencyCode {
            $($name),*
        }

        impl CurrencyCode {
            pub fn code(&self) -> &'static str {
                match self {
                    $(CurrencyCode::$name => $code),*
                }
            }

            pub fn symbol(&self) -> &'static str {
                match self {
                    $(CurrencyCode::$name => $symbol),*
                }
            }

            /// Reference value of one unit in USD.
            pub fn usd_reference(&self) -> f64 {
                match self {
                    $(CurrencyCode::$name => $usd),*
                }
            }

            pub fn all() -> &'static [CurrencyCode] {
                &[$(CurrencyCode::$name),*]
            }
        }

        impl std::str::FromStr for CurrencyCode {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_uppercase().as_str() {
                    $($code => Ok(CurrencyCode::$name),)*
                    _ => Err(DomainError::InvalidCurrency(s.trim().to_string())),
                }
            }
        }
    };
}

impl std::fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

define_currencies! {
    CNY => ("CNY", "¥", 0.1389),
    JPY => ("JPY", "¥", 0.00667),
    USD => ("USD", "$", 1.0),
    EUR => ("EUR", "€", 1.087),
    GBP => ("GBP", "£", 1.266),
    HKD => ("HKD", "HK$", 0.128),
    KRW => ("KRW", "₩", 0.00075),
    SGD => ("SGD", "S$", 0.741),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive_and_trims() {
        assert_eq!("usd".parse::<CurrencyCode>().unwrap(), CurrencyCode::USD);
        assert_eq!("  Jpy ".parse::<CurrencyCode>().unwrap(), CurrencyCode::JPY);
    }

    #[test]
    fn test_parse_rejects_unknown_code() {
        let err = "INR".parse::<CurrencyCode>().unwrap_err();
        assert!(matches!(err, DomainError::InvalidCurrency(code) if code == "INR"));
        assert!("".parse::<CurrencyCode>().is_err());
    }

    #[test]
    fn test_display_matches_code() {
        for code in CurrencyCode::all() {
            assert_eq!(code.to_string(), code.code());
        }
    }

    #[test]
    fn test_all_has_eight_codes() {
        assert_eq!(CurrencyCode::all().len(), 8);
    }
}
