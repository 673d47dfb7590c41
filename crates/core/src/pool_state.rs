//! Per-pool engine state.
//!
//! Built fresh for every optimization run from the two input record
//! sets and discarded with the run's result. Nothing here survives
//! across invocations.

use std::collections::BTreeMap;

use tracing::debug;

use crate::config::OptimizerConfig;
use crate::grid::BinGrid;
use optimizer_api::{PoolPosition, PoolSummary};

/// Pool states keyed by pool name. Ordered for deterministic
/// iteration; no consumer depends on the order itself.
pub type PoolStateMap = BTreeMap<String, PoolState>;

/// Everything the scoring pass needs to know about one pool.
#[derive(Debug, Clone)]
pub struct PoolState {
    /// Latest observed price; also the grid's center
    pub current_price: f64,
    /// Trailing mean price
    pub mean_price: f64,
    /// Trailing price standard deviation
    pub price_std_dev: f64,
    /// Bin grid centered on the current price
    pub grid: BinGrid,
    /// Standing liquidity accumulated per bin
    pub bins: Vec<f64>,
    /// USD value of one unit of token0
    pub token0_usd: f64,
    /// USD value of one unit of token1
    pub token1_usd: f64,
    /// Volume column selected by the configured methodology
    pub daily_volume_usd: f64,
    /// Fee tier as a percentage
    pub fee_percent: f64,
}

impl PoolState {
    fn from_summary(summary: &PoolSummary, config: &OptimizerConfig) -> Self {
        let grid = BinGrid::from_volatility(
            summary.latest_price,
            summary.price_std_dev,
            config.range_std_devs,
            config.bin_fraction,
        );
        Self {
            current_price: summary.latest_price,
            mean_price: summary.mean_price,
            price_std_dev: summary.price_std_dev,
            bins: vec![0.0; grid.total_bins],
            grid,
            token0_usd: summary.token0_usd,
            token1_usd: summary.token1_usd,
            daily_volume_usd: config.volume.select(summary),
            fee_percent: summary.fee_percent,
        }
    }
}

/// Construct one state per qualifying pool.
///
/// Records below the volume threshold or on the exclusion list are
/// skipped entirely. Duplicate rows for the same pool are ignored,
/// first seen wins.
pub fn build_pool_states(summaries: &[PoolSummary], config: &OptimizerConfig) -> PoolStateMap {
    let mut pools = PoolStateMap::new();

    for summary in summaries {
        if summary.avg_daily_volume < config.min_daily_volume_usd {
            debug!(
                pool = %summary.pool_name,
                avg_daily_volume = summary.avg_daily_volume,
                "Skipping pool below volume threshold"
            );
            continue;
        }
        if config.excluded_pools.iter().any(|p| p == &summary.pool_name) {
            debug!(pool = %summary.pool_name, "Skipping excluded pool");
            continue;
        }

        pools
            .entry(summary.pool_name.clone())
            .or_insert_with(|| PoolState::from_summary(summary, config));
    }

    pools
}

/// Accumulate each position's liquidity into every bin its price range
/// overlaps, clipped to the grid window.
pub fn bin_positions(pools: &mut PoolStateMap, positions: &[PoolPosition]) {
    for position in positions {
        let Some(state) = pools.get_mut(&position.pool_name) else {
            continue;
        };

        let Some((lower, upper)) = state
            .grid
            .clipped_span(position.price_lower, position.price_upper)
        else {
            // Bounds do not overlap the modeled window
            continue;
        };

        for bin in &mut state.bins[lower..=upper] {
            *bin += position.liquidity_adj;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(name: &str, avg_daily_volume: f64) -> PoolSummary {
        PoolSummary {
            pool_name: name.to_string(),
            mean_price: 100.0,
            price_std_dev: 10.0,
            latest_price: 100.0,
            token0_usd: 1.0,
            token1_usd: 100.0,
            avg_daily_volume,
            median_daily_volume: avg_daily_volume,
            avg_hourly_volume: avg_daily_volume / 24.0,
            median_hourly_volume: avg_daily_volume / 24.0,
            fee_percent: 0.3,
        }
    }

    fn position(pool: &str, lower: f64, upper: f64, liquidity: f64) -> PoolPosition {
        PoolPosition {
            pool_name: pool.to_string(),
            price_lower: lower,
            price_upper: upper,
            liquidity_adj: liquidity,
        }
    }

    #[test]
    fn test_volume_threshold_drops_record() {
        let config = OptimizerConfig::default();
        let summaries = vec![summary("BIG", 1_000_000.0), summary("SMALL", 100_000.0)];
        let pools = build_pool_states(&summaries, &config);
        assert!(pools.contains_key("BIG"));
        assert!(!pools.contains_key("SMALL"));
    }

    #[test]
    fn test_exclusion_list_drops_record() {
        let config = OptimizerConfig::default();
        let summaries = vec![summary("INST-WETH 3000 60", 10_000_000.0)];
        let pools = build_pool_states(&summaries, &config);
        assert!(pools.is_empty());
    }

    #[test]
    fn test_duplicate_summary_first_seen_wins() {
        let config = OptimizerConfig::default();
        let mut second = summary("POOL", 1_000_000.0);
        second.latest_price = 999.0;
        let summaries = vec![summary("POOL", 1_000_000.0), second];
        let pools = build_pool_states(&summaries, &config);
        assert_eq!(pools["POOL"].current_price, 100.0);
    }

    #[test]
    fn test_state_geometry_and_zeroed_bins() {
        let config = OptimizerConfig::default();
        let pools = build_pool_states(&[summary("POOL", 1_000_000.0)], &config);
        let state = &pools["POOL"];
        // 8 std devs * 4 bins per std dev + 1
        assert_eq!(state.grid.total_bins, 33);
        assert_eq!(state.bins.len(), 33);
        assert!(state.bins.iter().all(|&b| b == 0.0));
        assert!((state.grid.bin_width - 2.5).abs() < 1e-12);
    }

    #[test]
    fn test_bin_conservation_for_in_window_position() {
        let config = OptimizerConfig::default();
        let mut pools = build_pool_states(&[summary("POOL", 1_000_000.0)], &config);

        // Fully inside the window; spans a known number of bins
        let pos = position("POOL", 95.0, 105.0, 1000.0);
        bin_positions(&mut pools, std::slice::from_ref(&pos));

        let state = &pools["POOL"];
        let (lower, upper) = state.grid.clipped_span(95.0, 105.0).unwrap();
        let spanned = upper - lower + 1;
        let total: f64 = state.bins.iter().sum();
        assert!((total - 1000.0 * spanned as f64).abs() < 1e-9);
        // The full magnitude lands in every overlapped bin
        assert!(state.bins[lower..=upper].iter().all(|&b| b == 1000.0));
    }

    #[test]
    fn test_out_of_window_position_contributes_nothing() {
        let config = OptimizerConfig::default();
        let mut pools = build_pool_states(&[summary("POOL", 1_000_000.0)], &config);

        // Grid covers [80 - 1.25, 120 + 1.25]; both far outside
        let positions = vec![
            position("POOL", 1.0, 2.0, 500.0),
            position("POOL", 5000.0, 6000.0, 500.0),
        ];
        bin_positions(&mut pools, &positions);
        assert!(pools["POOL"].bins.iter().all(|&b| b == 0.0));
    }

    #[test]
    fn test_partial_overlap_clips_to_window() {
        let config = OptimizerConfig::default();
        let mut pools = build_pool_states(&[summary("POOL", 1_000_000.0)], &config);

        // Lower bound below the window, upper bound inside it
        let pos = position("POOL", 1.0, 100.0, 250.0);
        bin_positions(&mut pools, std::slice::from_ref(&pos));

        let state = &pools["POOL"];
        let center = state.grid.center() as usize;
        assert!(state.bins[0] == 250.0);
        assert!(state.bins[center] == 250.0);
        assert!(state.bins[center + 1] == 0.0);
    }

    #[test]
    fn test_unknown_pool_position_skipped() {
        let config = OptimizerConfig::default();
        let mut pools = build_pool_states(&[summary("POOL", 1_000_000.0)], &config);
        let pos = position("OTHER", 95.0, 105.0, 1000.0);
        bin_positions(&mut pools, std::slice::from_ref(&pos));
        assert!(pools["POOL"].bins.iter().all(|&b| b == 0.0));
    }

    #[test]
    fn test_accumulation_is_additive() {
        let config = OptimizerConfig::default();
        let mut pools = build_pool_states(&[summary("POOL", 1_000_000.0)], &config);
        let positions = vec![
            position("POOL", 99.0, 101.0, 100.0),
            position("POOL", 99.0, 101.0, 50.0),
        ];
        bin_positions(&mut pools, &positions);
        let state = &pools["POOL"];
        let center = state.grid.center() as usize;
        assert_eq!(state.bins[center], 150.0);
    }
}
