//! Price probability model.
//!
//! Two linear-price Gaussians per pool: one centered on the latest
//! price, one on the trailing mean, both with the trailing standard
//! deviation. Interval masses from the two are averaged.

use statrs::distribution::{ContinuousCDF, Normal};
use thiserror::Error;

/// Errors from engine-side model construction.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid price distribution for pool {pool}: mean={mean}, std_dev={std_dev}")]
    InvalidDistribution {
        pool: String,
        mean: f64,
        std_dev: f64,
    },
}

/// A single Gaussian over linear price.
#[derive(Debug, Clone, Copy)]
pub struct PriceDistribution {
    normal: Normal,
}

impl PriceDistribution {
    /// `None` when the parameters cannot form a Gaussian (non-finite
    /// mean or non-positive sigma); the pool-aware error is attached
    /// one level up.
    pub fn new(mean: f64, std_dev: f64) -> Option<Self> {
        let normal = Normal::new(mean, std_dev).ok()?;
        Some(Self { normal })
    }

    /// Probability mass in `[a, b]`.
    #[inline]
    pub fn probability_between(&self, a: f64, b: f64) -> f64 {
        self.normal.cdf(b) - self.normal.cdf(a)
    }
}

/// The pair of distributions scored for every candidate range.
#[derive(Debug, Clone, Copy)]
pub struct BlendedDistribution {
    from_current: PriceDistribution,
    from_mean: PriceDistribution,
}

impl BlendedDistribution {
    pub fn new(
        pool: &str,
        current_price: f64,
        mean_price: f64,
        price_std_dev: f64,
    ) -> Result<Self, EngineError> {
        let annotate = |mean: f64| EngineError::InvalidDistribution {
            pool: pool.to_string(),
            mean,
            std_dev: price_std_dev,
        };
        Ok(Self {
            from_current: PriceDistribution::new(current_price, price_std_dev)
                .ok_or_else(|| annotate(current_price))?,
            from_mean: PriceDistribution::new(mean_price, price_std_dev)
                .ok_or_else(|| annotate(mean_price))?,
        })
    }

    /// Blended probability mass in `[a, b]`.
    ///
    /// TODO: the plain average of the two masses is provisional; an
    /// earlier iteration weighted by per-bin liquidity share and the
    /// two were never benchmarked against realized fees.
    #[inline]
    pub fn probability_between(&self, a: f64, b: f64) -> f64 {
        (self.from_current.probability_between(a, b) + self.from_mean.probability_between(a, b))
            / 2.0
    }
}
