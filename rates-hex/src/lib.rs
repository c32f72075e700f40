//! # Rates Hex
//!
//! Application services and HTTP adapter for the exchange-rate service.
//!
//! ## Architecture
//!
//! - `service` - read queries with inverse-pair fallback and caching
//! - `reconcile` - orientation selection for list queries
//! - `fetch` - provider-to-store fetch command
//! - `inbound/` - HTTP adapter (Axum server)
//!
//! Services are generic over the `rates-types` ports, so any repository,
//! cache or provider implementation can be injected.

pub mod fetch;
pub mod inbound;
pub mod openapi;
pub mod reconcile;
pub mod service;


pub use fetch::{FetchOutcome, FetchRateCommand, FetchRateService};
pub use service::RateService;
