//! LP range optimizer core logic.
//!
//! This crate provides the liquidity-binning and range-optimization
//! engine:
//! - Bin grid coordinate transforms (price <-> bin index)
//! - Pool state construction and position liquidity binning
//! - Exhaustive contiguous-range enumeration
//! - Blended Gaussian price-probability model
//! - Closed-form two-asset deposit splitting
//! - Probability-weighted coverage and fee-yield estimation
//! - Candidate filtering and ranking
//!
//! All state is built fresh per invocation; nothing is shared or
//! cached across runs.

pub mod config;
mod deposit;
mod engine;
mod grid;
mod optimizer;
mod pool_state;
mod probability;
mod selector;

pub use config::{Aggregation, OptimizerConfig, TimePeriod, VolumeMethodology};
pub use deposit::{solve_deposit_split, DepositSplit};
pub use engine::{run_optimization, OptimizationResult};
pub use grid::BinGrid;
pub use optimizer::{enumerate_ranges, evaluate_pool, LiquidityBin, PositionCandidate, RangeSpan};
pub use pool_state::{bin_positions, build_pool_states, PoolState, PoolStateMap};
pub use probability::{BlendedDistribution, EngineError, PriceDistribution};
pub use selector::{filter_by_probability, sort_by_apy, top_per_pool};
