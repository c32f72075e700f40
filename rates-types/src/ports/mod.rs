//! Port traits (interfaces for adapters).
//!
//! These are the contracts that adapters must implement.
//! The application layer depends on these traits, not concrete implementations.

mod cache;
mod provider;
mod repository;

pub use cache::{LATEST_RATE_TTL, RateCache, latest_cache_key};
pub use provider::RateProvider;
pub use repository::RateRepository;
