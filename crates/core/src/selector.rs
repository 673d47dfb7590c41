//! Candidate filtering and ranking.

use std::collections::BTreeMap;

use crate::optimizer::PositionCandidate;

/// Drop candidates whose probability of price-in-range is below the
/// floor.
pub fn filter_by_probability(
    candidates: Vec<PositionCandidate>,
    min_probability: f64,
) -> Vec<PositionCandidate> {
    candidates
        .into_iter()
        .filter(|c| c.probability_price_in_range >= min_probability)
        .collect()
}

/// Sort descending by estimated APY. Stable, so ties keep enumeration
/// order; there is no secondary key.
pub fn sort_by_apy(candidates: &mut [PositionCandidate]) {
    candidates.sort_by(|a, b| {
        b.estimated_apy
            .partial_cmp(&a.estimated_apy)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}

/// Reduce to the single best candidate per pool.
pub fn top_per_pool(candidates: &[PositionCandidate]) -> Vec<PositionCandidate> {
    let mut best: BTreeMap<&str, &PositionCandidate> = BTreeMap::new();

    for candidate in candidates {
        match best.get(candidate.pool_name.as_str()) {
            Some(current) if current.estimated_apy >= candidate.estimated_apy => {}
            _ => {
                best.insert(&candidate.pool_name, candidate);
            }
        }
    }

    best.into_values().cloned().collect()
}
