//! Range enumeration and candidate scoring.
//!
//! For each pool this walks every contiguous bin span, sizes a
//! hypothetical deposit in it, and scores the span by its
//! probability-weighted share of trading activity.

use serde::Serialize;
use tracing::debug;

use crate::config::OptimizerConfig;
use crate::deposit::solve_deposit_split;
use crate::grid::BinGrid;
use crate::pool_state::PoolState;
use crate::probability::{BlendedDistribution, EngineError};

/// One scored candidate range, flattened with its pool identity.
/// Plain data for the presentation layer.
#[derive(Debug, Clone, Serialize)]
pub struct PositionCandidate {
    pub pool_name: String,
    pub current_price: f64,
    pub range_lower: f64,
    pub range_upper: f64,
    pub bin_lower_index: usize,
    pub bin_upper_index: usize,
    pub probability_price_in_range: f64,
    pub liquidity_coverage_expected_value: f64,
    pub estimated_apy: f64,
}

/// One bin of a pool's realized liquidity distribution, for
/// visualization.
#[derive(Debug, Clone, Serialize)]
pub struct LiquidityBin {
    pub bin_price: f64,
    pub liquidity: f64,
}

/// A candidate bin span before scoring. `range_upper` is the price one
/// bin past the upper index, so the range covers the half-open bin
/// intervals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeSpan {
    pub bin_lower_index: usize,
    pub bin_upper_index: usize,
    pub range_lower: f64,
    pub range_upper: f64,
}

/// Enumerate every contiguous bin span of the grid.
///
/// Deliberately exhaustive O(total_bins²); the candidate set must stay
/// bit-identical to the nested-loop enumeration, so no shortcuts here.
pub fn enumerate_ranges(grid: &BinGrid, current_price: f64, require_overlap: bool) -> Vec<RangeSpan> {
    let mut spans = Vec::with_capacity(grid.total_bins * (grid.total_bins + 1) / 2);

    for lower in 0..grid.total_bins {
        for upper in lower..grid.total_bins {
            let range_lower = grid.price_at(lower as i64);
            let range_upper = grid.price_at(upper as i64 + 1);

            if require_overlap && (range_lower > current_price || range_upper < current_price) {
                continue;
            }

            spans.push(RangeSpan {
                bin_lower_index: lower,
                bin_upper_index: upper,
                range_lower,
                range_upper,
            });
        }
    }

    spans
}

/// Score every candidate span of one pool.
pub fn evaluate_pool(
    pool_name: &str,
    state: &PoolState,
    config: &OptimizerConfig,
) -> Result<Vec<PositionCandidate>, EngineError> {
    let blend = BlendedDistribution::new(
        pool_name,
        state.current_price,
        state.mean_price,
        state.price_std_dev,
    )?;

    let spans = enumerate_ranges(&state.grid, state.current_price, config.require_price_overlap);

    let mut candidates = Vec::new();
    let mut degenerate = 0;

    for span in spans {
        let Some(split) = solve_deposit_split(
            config.deposit_usd,
            span.range_lower,
            span.range_upper,
            state.current_price,
            state.token0_usd,
            state.token1_usd,
        ) else {
            degenerate += 1;
            continue;
        };

        // Expected share of trading activity: for each covered bin,
        // the position's share of that bin's liquidity weighted by the
        // blended probability of price sitting in the bin.
        let mut coverage = 0.0;
        for i in span.bin_lower_index..=span.bin_upper_index {
            let bin_lower = state.grid.price_at(i as i64);
            let bin_upper = state.grid.price_at(i as i64 + 1);
            let bin_probability = blend.probability_between(bin_lower, bin_upper);
            coverage += split.liquidity / (state.bins[i] + split.liquidity) * bin_probability;
        }

        if !coverage.is_finite() {
            degenerate += 1;
            continue;
        }

        let estimated_daily_fees = coverage * state.daily_volume_usd * state.fee_percent / 100.0;

        candidates.push(PositionCandidate {
            pool_name: pool_name.to_string(),
            current_price: state.current_price,
            range_lower: span.range_lower,
            range_upper: span.range_upper,
            bin_lower_index: span.bin_lower_index,
            bin_upper_index: span.bin_upper_index,
            // Reported over the whole range, not the per-bin sum
            probability_price_in_range: blend
                .probability_between(span.range_lower, span.range_upper),
            liquidity_coverage_expected_value: coverage,
            estimated_apy: estimated_daily_fees / config.deposit_usd * 365.0,
        });
    }

    debug!(
        pool = %pool_name,
        candidates = candidates.len(),
        degenerate = degenerate,
        "Scored pool"
    );

    Ok(candidates)
}
