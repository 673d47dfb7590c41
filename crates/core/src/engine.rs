//! One full optimization invocation.
//!
//! Everything is constructed fresh per call and returned as plain
//! data; re-running under a changed configuration recomputes from
//! scratch and the caller keeps whichever result arrived last.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{info, warn};

use crate::config::OptimizerConfig;
use crate::optimizer::{evaluate_pool, LiquidityBin, PositionCandidate};
use crate::pool_state::{bin_positions, build_pool_states};
use optimizer_api::{PoolPosition, PoolSummary};

/// Serializable result of one optimization cycle.
#[derive(Debug, Clone, Default, Serialize)]
pub struct OptimizationResult {
    /// All scored candidates across pools, in enumeration order
    pub position_candidates: Vec<PositionCandidate>,
    /// Realized per-bin liquidity per pool, for visualization
    pub liquidity_distributions: BTreeMap<String, Vec<LiquidityBin>>,
}

/// Run the full pipeline: build pool states, bin positions, enumerate
/// and score candidate ranges.
pub fn run_optimization(
    summaries: &[PoolSummary],
    positions: &[PoolPosition],
    config: &OptimizerConfig,
) -> OptimizationResult {
    let mut pools = build_pool_states(summaries, config);
    bin_positions(&mut pools, positions);

    let mut result = OptimizationResult::default();

    for (pool_name, state) in &pools {
        // Every built pool gets a distribution, scored or not
        let distribution = state
            .bins
            .iter()
            .enumerate()
            .map(|(i, &liquidity)| LiquidityBin {
                bin_price: state.grid.price_at(i as i64),
                liquidity,
            })
            .collect();
        result.liquidity_distributions.insert(pool_name.clone(), distribution);

        match evaluate_pool(pool_name, state, config) {
            Ok(candidates) => result.position_candidates.extend(candidates),
            // One bad pool never takes down the cycle
            Err(e) => warn!(pool = %pool_name, error = %e, "Skipping pool"),
        }
    }

    info!(
        pools = pools.len(),
        candidates = result.position_candidates.len(),
        deposit_usd = config.deposit_usd,
        volume = %config.volume,
        "Optimization cycle complete"
    );

    result
}
