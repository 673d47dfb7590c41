//! Two-asset deposit split for a hypothetical position.
//!
//! Solves, for a range bracketing the current price (lower < current
//! <= upper), the system:
//!
//! ```text
//! Eq1: amt0 * sqrt(upper)*sqrt(cprice) / (sqrt(upper) - sqrt(cprice))
//!        = amt1 / (sqrt(cprice) - sqrt(lower))
//! Eq2: amt0 * token0_usd + amt1 * token1_usd = deposit_usd
//! ```
//!
//! The closed form for amt0 below is the Eq2-substituted solution;
//! keep its shape intact. Degenerate geometry (a range bound landing
//! exactly on the current price) drives the expressions to NaN or
//! infinity, which is reported as `None` rather than propagated.

/// Token amounts and resulting liquidity for one candidate range.
#[derive(Debug, Clone, Copy)]
pub struct DepositSplit {
    pub amount0: f64,
    pub amount1: f64,
    /// Liquidity contributed by the position, the min of the two
    /// single-sided liquidity expressions
    pub liquidity: f64,
}

/// Solve the deposit split. `None` means the candidate is degenerate
/// and must be discarded; sibling candidates are unaffected.
pub fn solve_deposit_split(
    deposit_usd: f64,
    range_lower: f64,
    range_upper: f64,
    current_price: f64,
    token0_usd: f64,
    token1_usd: f64,
) -> Option<DepositSplit> {
    let sqrt_upper = range_upper.sqrt();
    let sqrt_lower = range_lower.sqrt();
    let sqrt_current = current_price.sqrt();

    let amount0 = (deposit_usd * (sqrt_upper - sqrt_current))
        / (-sqrt_upper * sqrt_current * token1_usd * sqrt_lower
            + sqrt_upper * current_price * token1_usd
            + sqrt_upper * token0_usd
            - sqrt_current * token0_usd);
    let amount1 = (deposit_usd - amount0 * token0_usd) / token1_usd;

    let liquidity_from_amount0 =
        amount0 * (sqrt_upper * sqrt_current) / (sqrt_upper - sqrt_current);
    let liquidity_from_amount1 = amount1 / (sqrt_current - sqrt_lower);

    // f64::min ignores NaN operands, so propagate NaN by hand to keep
    // the degenerate cases degenerate.
    let liquidity = if liquidity_from_amount0.is_nan() || liquidity_from_amount1.is_nan() {
        f64::NAN
    } else {
        liquidity_from_amount0.min(liquidity_from_amount1)
    };

    if !amount0.is_finite() || !amount1.is_finite() || !liquidity.is_finite() {
        return None;
    }

    Some(DepositSplit {
        amount0,
        amount1,
        liquidity,
    })
}
