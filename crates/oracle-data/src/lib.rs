//! Reference-data boundary for oracle-rs
//!
//! A rate-limited, TTL-cached client for a Financial Modeling Prep style
//! REST API. Lookups are idempotent and keyed by ticker symbol; an empty
//! provider response surfaces as [`DataError::NotFound`] rather than a
//! silently defaulted record.

pub mod cache;
pub mod client;
pub mod error;
pub mod records;

pub use cache::{CacheKey, CacheManager, DataCache};
pub use client::{FmpClient, FmpConfig};
pub use error::{DataError, Result};
pub use records::{
    CompanyProfile, FinancialGrowth, FinancialHealth, KeyFinancials, NewsArticle, NewsDigest,
    Profitability, StockQuote, Valuation,
};
