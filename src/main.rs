//! Uniswap v3 LP Range Optimizer
//!
//! Estimates, per qualifying pool, the concentrated-liquidity price
//! range that maximizes expected fee yield for a hypothetical deposit.
//! Features:
//! - Concurrent retrieval of pool summaries and open positions
//! - Price-bin discretization of standing liquidity
//! - Exhaustive candidate-range enumeration with blended Gaussian
//!   probability weighting
//! - JSON emission of all candidates and per-pool bin distributions

use anyhow::Result;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use optimizer_api::{ApiError, FlipsideClient};
use optimizer_core::{
    filter_by_probability, run_optimization, sort_by_apy, top_per_pool, OptimizerConfig,
};

#[tokio::main]
async fn main() -> Result<()> {
    print_banner();

    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,optimizer_core=debug")),
        )
        .init();

    // Use OPTIMIZER_PROFILE env var to point at a TOML profile
    let config = OptimizerConfig::from_env();
    config.log_config();

    let client = FlipsideClient::new();

    info!("Fetching pool summaries and positions...");
    let market = match client.fetch_market_data().await {
        Ok(market) => market,
        Err(e @ ApiError::MalformedPayload { .. }) => {
            // No partial computation on a bad payload; the cycle simply
            // has no result.
            warn!(error = %e, "Computation unavailable this cycle");
            println!("null");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    info!(
        summaries = market.summaries.len(),
        positions = market.positions.len(),
        "Market data retrieved"
    );

    let result = run_optimization(&market.summaries, &market.positions, &config);

    // Log the headline pick per pool
    let mut ranked = result.position_candidates.clone();
    if let Some(min_probability) = config.min_probability {
        ranked = filter_by_probability(ranked, min_probability);
    }
    sort_by_apy(&mut ranked);

    for candidate in top_per_pool(&ranked) {
        info!(
            pool = %candidate.pool_name,
            range_lower = format!("{:.6}", candidate.range_lower),
            range_upper = format!("{:.6}", candidate.range_upper),
            probability_in_range = format!("{:.4}", candidate.probability_price_in_range),
            estimated_apy = format!("{:.2}%", candidate.estimated_apy * 100.0),
            "Best range"
        );
    }

    // Full result for the presentation layer
    println!("{}", serde_json::to_string_pretty(&result)?);

    Ok(())
}

/// Print startup banner.
fn print_banner() {
    eprintln!(
        r#"
    ╦  ╔═╗  ╔═╗┌─┐┌┬┐┬┌┬┐┬┌─┐┌─┐┬─┐
    ║  ╠═╝  ║ ║├─┘ │ │││││┌─┘├┤ ├┬┘
    ╩═╝╩    ╚═╝┴   ┴ ┴┴ ┴┴└─┘└─┘┴└─
    LP Range Optimizer v0.1.0
    "#
    );
}
