//! # Rates Types
//!
//! Domain types and port traits for the exchange-rate service.
//! This crate has ZERO external IO dependencies - only data structures,
//! business rules, and trait definitions.
//!
//! ## Architecture
//!
//! This crate represents the **innermost core** of the hexagonal architecture:
//! - `domain/` - Pure domain types (CurrencyCode, CurrencyPair, Rate)
//! - `ports/` - Trait definitions that adapters must implement
//! - `dto/` - Data Transfer Objects for API boundaries and store queries
//! - `error/` - Domain and application error types

pub mod domain;
pub mod dto;
pub mod error;
pub mod ports;

// Re-export commonly used types
pub use domain::{CurrencyCode, CurrencyPair, Rate, RateId, Source};
pub use dto::*;
pub use error::{AppError, CacheError, DomainError, FetchError, ProviderError, RepoError};
pub use ports::{LATEST_RATE_TTL, RateCache, RateProvider, RateRepository, latest_cache_key};
