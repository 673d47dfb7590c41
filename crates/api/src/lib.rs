//! API client for the external pool-analytics provider.
//!
//! This crate provides the HTTP client that retrieves the two record
//! sets the optimizer consumes:
//! - Pool summaries: trailing price statistics, token valuations,
//!   volume aggregates and fee tier per pool
//! - Pool positions: open concentrated-liquidity positions with their
//!   price bounds and adjusted liquidity

mod flipside;

pub use flipside::{ApiError, FlipsideClient, MarketData, PoolPosition, PoolSummary};
