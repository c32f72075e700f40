//! Domain models for the exchange-rate service.

pub mod currency;
pub mod pair;
pub mod rate;

pub use currency::CurrencyCode;
pub use pair::CurrencyPair;
pub use rate::{Rate, RateId, Source, min_effective_date};
