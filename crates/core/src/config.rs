//! Optimizer configuration with profile support.
//!
//! All knobs that trigger a full recomputation when changed live here:
//! the hypothetical deposit size, the volume methodology, the grid
//! geometry and the ingestion filters.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use optimizer_api::PoolSummary;

/// Main configuration for one optimization run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizerConfig {
    /// Profile name (for logging/identification)
    #[serde(default = "default_profile_name")]
    pub profile: String,

    /// USD size of the hypothetical deposit used to size positions
    #[serde(default = "default_deposit_usd")]
    pub deposit_usd: f64,

    /// Which volume column of the summary feed drives fee estimation
    #[serde(default)]
    pub volume: VolumeMethodology,

    /// Minimum average daily volume for a pool to qualify.
    /// Always checked against the average-daily column, independent of
    /// the methodology above.
    #[serde(default = "default_min_daily_volume")]
    pub min_daily_volume_usd: f64,

    /// Pools excluded by name (known-bad data)
    #[serde(default = "default_excluded_pools")]
    pub excluded_pools: Vec<String>,

    /// Standard deviations of price coverage on each side of center
    #[serde(default = "default_range_std_devs")]
    pub range_std_devs: f64,

    /// Bin width as a fraction of one standard deviation
    #[serde(default = "default_bin_fraction")]
    pub bin_fraction: f64,

    /// Only consider ranges that bracket the current price
    #[serde(default = "default_require_overlap")]
    pub require_price_overlap: bool,

    /// Optional floor on a candidate's probability of price-in-range
    #[serde(default)]
    pub min_probability: Option<f64>,
}

fn default_profile_name() -> String {
    "default".to_string()
}
fn default_deposit_usd() -> f64 {
    1000.0
}
fn default_min_daily_volume() -> f64 {
    500_000.0
}
fn default_excluded_pools() -> Vec<String> {
    // something wrong with this particular pool's source data
    vec!["INST-WETH 3000 60".to_string()]
}
fn default_range_std_devs() -> f64 {
    8.0
}
fn default_bin_fraction() -> f64 {
    0.25
}
fn default_require_overlap() -> bool {
    true
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            profile: default_profile_name(),
            deposit_usd: default_deposit_usd(),
            volume: VolumeMethodology::default(),
            min_daily_volume_usd: default_min_daily_volume(),
            excluded_pools: default_excluded_pools(),
            range_std_devs: default_range_std_devs(),
            bin_fraction: default_bin_fraction(),
            require_price_overlap: default_require_overlap(),
            min_probability: None,
        }
    }
}

impl OptimizerConfig {
    /// Load configuration based on the `OPTIMIZER_PROFILE` env var.
    ///
    /// The value is a path to a TOML file; unset or unreadable falls
    /// back to defaults.
    pub fn from_env() -> Self {
        match std::env::var("OPTIMIZER_PROFILE") {
            Ok(path) => match std::fs::read_to_string(&path) {
                Ok(contents) => match toml::from_str(&contents) {
                    Ok(config) => config,
                    Err(e) => {
                        warn!(path = %path, error = %e, "Failed to parse profile, using defaults");
                        Self::default()
                    }
                },
                Err(e) => {
                    warn!(path = %path, error = %e, "Failed to read profile, using defaults");
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }

    /// Log the active configuration.
    pub fn log_config(&self) {
        info!(
            profile = %self.profile,
            deposit_usd = self.deposit_usd,
            volume = %self.volume,
            min_daily_volume_usd = self.min_daily_volume_usd,
            excluded_pools = self.excluded_pools.len(),
            range_std_devs = self.range_std_devs,
            bin_fraction = self.bin_fraction,
            require_price_overlap = self.require_price_overlap,
            min_probability = ?self.min_probability,
            "Optimizer configuration"
        );
    }
}

/// Selects which summary volume column feeds yield estimation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeMethodology {
    #[serde(default)]
    pub time_period: TimePeriod,
    #[serde(default)]
    pub aggregation: Aggregation,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimePeriod {
    #[default]
    Daily,
    Hourly,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggregation {
    #[default]
    Mean,
    Median,
}

impl VolumeMethodology {
    /// Pick the configured volume column off a summary record.
    pub fn select(&self, summary: &PoolSummary) -> f64 {
        match (self.time_period, self.aggregation) {
            (TimePeriod::Daily, Aggregation::Mean) => summary.avg_daily_volume,
            (TimePeriod::Daily, Aggregation::Median) => summary.median_daily_volume,
            (TimePeriod::Hourly, Aggregation::Mean) => summary.avg_hourly_volume,
            (TimePeriod::Hourly, Aggregation::Median) => summary.median_hourly_volume,
        }
    }
}

impl std::fmt::Display for VolumeMethodology {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let period = match self.time_period {
            TimePeriod::Daily => "daily",
            TimePeriod::Hourly => "hourly",
        };
        let agg = match self.aggregation {
            Aggregation::Mean => "mean",
            Aggregation::Median => "median",
        };
        write!(f, "{}/{}", period, agg)
    }
}
