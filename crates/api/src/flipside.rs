//! Flipside Crypto query-result client for pool analytics.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, instrument};

/// Query id for the pool summary data set (trailing price stats,
/// token valuations, volume aggregates, fee tier).
const POOL_SUMMARY_QUERY: &str = "efed0457-5edc-46fa-ad7b-cffd01d5b93d";

/// Query id for the open position data set.
const POOL_POSITION_QUERY: &str = "bb47119b-a9ad-4c59-ac4d-be8c880786e9";

/// Errors surfaced by the analytics client.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider returned something other than a JSON array.
    /// Callers must treat the whole cycle as unavailable, not as an
    /// empty data set.
    #[error("malformed payload from {endpoint}: expected a JSON array")]
    MalformedPayload { endpoint: String },
}

/// Flipside query-result API client.
#[derive(Debug, Clone)]
pub struct FlipsideClient {
    client: reqwest::Client,
    base_url: String,
}

impl FlipsideClient {
    /// Create a client pointed at the production API.
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: "https://api.flipsidecrypto.com".to_string(),
        }
    }

    /// Create a client with a custom base URL.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    fn query_url(&self, query_id: &str) -> String {
        format!("{}/api/v2/queries/{}/data/latest", self.base_url, query_id)
    }

    /// Fetch both record sets concurrently.
    ///
    /// Either set failing fails the whole fetch; the optimizer never
    /// runs on half the inputs.
    #[instrument(skip(self))]
    pub async fn fetch_market_data(&self) -> Result<MarketData, ApiError> {
        let (summaries, positions) =
            tokio::try_join!(self.fetch_pool_summaries(), self.fetch_pool_positions())?;

        Ok(MarketData {
            summaries,
            positions,
        })
    }

    /// Fetch the latest pool summary records.
    #[instrument(skip(self))]
    pub async fn fetch_pool_summaries(&self) -> Result<Vec<PoolSummary>, ApiError> {
        let url = self.query_url(POOL_SUMMARY_QUERY);
        let payload: Value = self.client.get(&url).send().await?.json().await?;
        parse_rows(payload, &url)
    }

    /// Fetch the latest open position records.
    #[instrument(skip(self))]
    pub async fn fetch_pool_positions(&self) -> Result<Vec<PoolPosition>, ApiError> {
        let url = self.query_url(POOL_POSITION_QUERY);
        let payload: Value = self.client.get(&url).send().await?.json().await?;
        parse_rows(payload, &url)
    }
}

/// A row type of one of the query result sets.
trait QueryRecord: DeserializeOwned {
    fn pool_name(&self) -> &str;
    fn is_valid(&self) -> bool;
}

/// Deserialize and validate the rows of a query payload.
///
/// A non-array payload fails the whole set; a bad row is skipped and
/// its siblings kept.
fn parse_rows<T: QueryRecord>(payload: Value, endpoint: &str) -> Result<Vec<T>, ApiError> {
    let rows = payload
        .as_array()
        .ok_or_else(|| ApiError::MalformedPayload {
            endpoint: endpoint.to_string(),
        })?;

    let total = rows.len();
    let mut records = Vec::with_capacity(total);
    let mut rejected = 0;

    for row in rows {
        match serde_json::from_value::<T>(row.clone()) {
            Ok(record) if record.is_valid() => records.push(record),
            Ok(record) => {
                debug!(pool = %record.pool_name(), "Rejected record with out-of-range values");
                rejected += 1;
            }
            Err(e) => {
                debug!(error = %e, "Rejected malformed record");
                rejected += 1;
            }
        }
    }

    info!(
        endpoint = endpoint,
        total = total,
        accepted = records.len(),
        rejected = rejected,
        "Parsed query rows"
    );

    Ok(records)
}

impl Default for FlipsideClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Both record sets for one optimization cycle.
#[derive(Debug, Clone)]
pub struct MarketData {
    pub summaries: Vec<PoolSummary>,
    pub positions: Vec<PoolPosition>,
}

/// One pool summary row from the analytics provider.
///
/// Prices are token1-per-token0 over a trailing 7-day window.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PoolSummary {
    /// Pool display name, e.g. "USDC-WETH 3000 60"
    #[serde(rename = "POOL_NAME")]
    pub pool_name: String,

    /// Trailing mean price
    #[serde(rename = "L7_MEAN_PRICE_1_0", deserialize_with = "deserialize_f64_from_string")]
    pub mean_price: f64,

    /// Trailing price standard deviation
    #[serde(rename = "L7_STDDEV_PRICE_1_0", deserialize_with = "deserialize_f64_from_string")]
    pub price_std_dev: f64,

    /// Latest observed price
    #[serde(rename = "LATEST_PRICE_1_0", deserialize_with = "deserialize_f64_from_string")]
    pub latest_price: f64,

    /// USD value of one unit of token0
    #[serde(rename = "TOKEN0_USD", deserialize_with = "deserialize_f64_from_string")]
    pub token0_usd: f64,

    /// USD value of one unit of token1
    #[serde(rename = "TOKEN1_USD", deserialize_with = "deserialize_f64_from_string")]
    pub token1_usd: f64,

    /// Mean daily trading volume (USD)
    #[serde(rename = "AVG_DAILY_VOLUME", deserialize_with = "deserialize_f64_from_string")]
    pub avg_daily_volume: f64,

    /// Median daily trading volume (USD)
    #[serde(rename = "MEDIAN_DAILY_VOLUME", deserialize_with = "deserialize_f64_from_string")]
    pub median_daily_volume: f64,

    /// Mean hourly trading volume (USD)
    #[serde(rename = "AVG_HOURLY_VOLUME", deserialize_with = "deserialize_f64_from_string")]
    pub avg_hourly_volume: f64,

    /// Median hourly trading volume (USD)
    #[serde(rename = "MEDIAN_HOURLY_VOLUME", deserialize_with = "deserialize_f64_from_string")]
    pub median_hourly_volume: f64,

    /// Fee tier as a percentage, e.g. 0.3 for a 30bps pool
    #[serde(rename = "FEE_PERCENT", deserialize_with = "deserialize_f64_from_string")]
    pub fee_percent: f64,
}

impl PoolSummary {
    /// Check numeric ranges before the record enters the engine.
    pub fn is_valid(&self) -> bool {
        self.latest_price.is_finite()
            && self.latest_price > 0.0
            && self.mean_price.is_finite()
            && self.mean_price > 0.0
            && self.price_std_dev.is_finite()
            && self.price_std_dev > 0.0
            && self.token0_usd.is_finite()
            && self.token0_usd > 0.0
            && self.token1_usd.is_finite()
            && self.token1_usd > 0.0
            && self.avg_daily_volume.is_finite()
            && self.avg_daily_volume >= 0.0
            && self.median_daily_volume.is_finite()
            && self.median_daily_volume >= 0.0
            && self.avg_hourly_volume.is_finite()
            && self.avg_hourly_volume >= 0.0
            && self.median_hourly_volume.is_finite()
            && self.median_hourly_volume >= 0.0
            && self.fee_percent.is_finite()
            && self.fee_percent >= 0.0
    }
}

impl QueryRecord for PoolSummary {
    fn pool_name(&self) -> &str {
        &self.pool_name
    }

    fn is_valid(&self) -> bool {
        self.is_valid()
    }
}

/// One open position row from the analytics provider.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PoolPosition {
    /// Pool the position belongs to
    #[serde(rename = "POOL_NAME")]
    pub pool_name: String,

    /// Lower price bound of the position
    #[serde(rename = "PRICE_LOWER_1_0", deserialize_with = "deserialize_f64_from_string")]
    pub price_lower: f64,

    /// Upper price bound of the position
    #[serde(rename = "PRICE_UPPER_1_0", deserialize_with = "deserialize_f64_from_string")]
    pub price_upper: f64,

    /// Decimal-adjusted liquidity magnitude
    #[serde(rename = "LIQUIDITY_ADJ", deserialize_with = "deserialize_f64_from_string")]
    pub liquidity_adj: f64,
}

impl PoolPosition {
    /// Check numeric ranges before the record enters the engine.
    pub fn is_valid(&self) -> bool {
        self.price_lower.is_finite()
            && self.price_upper.is_finite()
            && self.price_lower <= self.price_upper
            && self.liquidity_adj.is_finite()
    }
}

impl QueryRecord for PoolPosition {
    fn pool_name(&self) -> &str {
        &self.pool_name
    }

    fn is_valid(&self) -> bool {
        self.is_valid()
    }
}

// Custom deserializers

fn deserialize_f64_from_string<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrNumber {
        String(String),
        Number(f64),
    }

    match StringOrNumber::deserialize(deserializer)? {
        StringOrNumber::String(s) => s.parse().map_err(serde::de::Error::custom),
        StringOrNumber::Number(n) => Ok(n),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_summary() {
        // Based on the provider's actual row format
        let json = r#"{
            "POOL_NAME": "USDC-WETH 3000 60",
            "L7_MEAN_PRICE_1_0": "2012.4418",
            "L7_STDDEV_PRICE_1_0": 95.2277,
            "LATEST_PRICE_1_0": 1987.55,
            "TOKEN0_USD": 1.0,
            "TOKEN1_USD": "1987.55",
            "AVG_DAILY_VOLUME": 104523871.4,
            "MEDIAN_DAILY_VOLUME": 98121344.1,
            "AVG_HOURLY_VOLUME": 4355161.3,
            "MEDIAN_HOURLY_VOLUME": 4088389.3,
            "FEE_PERCENT": 0.3
        }"#;

        let summary: PoolSummary = serde_json::from_str(json).unwrap();
        assert_eq!(summary.pool_name, "USDC-WETH 3000 60");
        assert!((summary.mean_price - 2012.4418).abs() < 1e-9);
        assert!((summary.token1_usd - 1987.55).abs() < 1e-9);
        assert!(summary.is_valid());
    }

    #[test]
    fn test_deserialize_position() {
        let json = r#"{
            "POOL_NAME": "USDC-WETH 3000 60",
            "PRICE_LOWER_1_0": "1800.0",
            "PRICE_UPPER_1_0": 2200.0,
            "LIQUIDITY_ADJ": 15230.77
        }"#;

        let position: PoolPosition = serde_json::from_str(json).unwrap();
        assert!((position.price_lower - 1800.0).abs() < 1e-9);
        assert!((position.price_upper - 2200.0).abs() < 1e-9);
        assert!(position.is_valid());
    }

    #[test]
    fn test_invalid_summary_rejected() {
        let json = r#"{
            "POOL_NAME": "BAD-POOL 500 10",
            "L7_MEAN_PRICE_1_0": 100.0,
            "L7_STDDEV_PRICE_1_0": 0.0,
            "LATEST_PRICE_1_0": 100.0,
            "TOKEN0_USD": 1.0,
            "TOKEN1_USD": 100.0,
            "AVG_DAILY_VOLUME": 1000000.0,
            "MEDIAN_DAILY_VOLUME": 900000.0,
            "AVG_HOURLY_VOLUME": 40000.0,
            "MEDIAN_HOURLY_VOLUME": 38000.0,
            "FEE_PERCENT": 0.05
        }"#;

        // Zero standard deviation cannot parameterize the price model
        let summary: PoolSummary = serde_json::from_str(json).unwrap();
        assert!(!summary.is_valid());
    }

    #[test]
    fn test_bad_rows_skipped_siblings_kept() {
        let payload = serde_json::json!([
            {
                "POOL_NAME": "USDC-WETH 3000 60",
                "PRICE_LOWER_1_0": "1800.0",
                "PRICE_UPPER_1_0": 2200.0,
                "LIQUIDITY_ADJ": 15230.77
            },
            // Not even the right shape
            { "POOL_NAME": "DAI-WETH 3000 60" },
            // Parses, but the bounds are inverted
            {
                "POOL_NAME": "WBTC-WETH 3000 60",
                "PRICE_LOWER_1_0": 18.0,
                "PRICE_UPPER_1_0": 16.0,
                "LIQUIDITY_ADJ": 1.0
            }
        ]);

        let positions: Vec<PoolPosition> = parse_rows(payload, "test-endpoint").unwrap();
        assert_eq!(positions.len(), 1);
        assert_eq!(positions[0].pool_name, "USDC-WETH 3000 60");
    }

    #[test]
    fn test_non_array_payload_is_malformed() {
        let payload = serde_json::json!({ "error": "query still running" });
        let result: Result<Vec<PoolSummary>, ApiError> = parse_rows(payload, "test-endpoint");
        assert!(matches!(
            result,
            Err(ApiError::MalformedPayload { endpoint }) if endpoint == "test-endpoint"
        ));
    }

    #[test]
    fn test_inverted_position_rejected() {
        let position = PoolPosition {
            pool_name: "USDC-WETH 3000 60".to_string(),
            price_lower: 2200.0,
            price_upper: 1800.0,
            liquidity_adj: 5.0,
        };
        assert!(!position.is_valid());
    }
}
