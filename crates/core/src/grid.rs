//! Bin index / price coordinate transforms.
//!
//! The grid discretizes the price axis around a pool's current price.
//! Every bin-to-price conversion in the engine goes through [`BinGrid`];
//! nothing else is allowed to re-derive the affine mapping.

/// Fixed-width price bin grid centered on a reference price.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinGrid {
    /// Price at the center bin index
    pub center_price: f64,
    /// Width of one bin in price units
    pub bin_width: f64,
    /// Total number of bins (odd, so the center is a whole index)
    pub total_bins: usize,
}

impl BinGrid {
    /// Create a grid from explicit geometry.
    pub fn new(center_price: f64, bin_width: f64, total_bins: usize) -> Self {
        Self {
            center_price,
            bin_width,
            total_bins,
        }
    }

    /// Create a grid covering `range_std_devs` standard deviations on
    /// each side of the center, with bins of `bin_fraction` of one
    /// standard deviation each.
    ///
    /// `total_bins = range_std_devs * (1 / bin_fraction) + 1`; the +1
    /// makes the count odd so the center bin sits exactly on the
    /// reference price.
    pub fn from_volatility(
        center_price: f64,
        price_std_dev: f64,
        range_std_devs: f64,
        bin_fraction: f64,
    ) -> Self {
        let total_bins = (range_std_devs * (1.0 / bin_fraction)) as usize + 1;
        Self {
            center_price,
            bin_width: price_std_dev * bin_fraction,
            total_bins,
        }
    }

    /// Index of the center bin: `(total_bins - 1) / 2`.
    #[inline]
    pub fn center(&self) -> i64 {
        ((self.total_bins - 1) / 2) as i64
    }

    /// Price at a bin index.
    ///
    /// Accepts indices outside `[0, total_bins)`: range upper bounds
    /// use `price_at(upper + 1)` for the half-open bin interval.
    #[inline]
    pub fn price_at(&self, index: i64) -> f64 {
        (index - self.center()) as f64 * self.bin_width + self.center_price
    }

    /// Fractional bin index of a price (exact inverse of `price_at`).
    /// Callers floor and clamp the result.
    #[inline]
    pub fn index_at(&self, price: f64) -> f64 {
        (price - self.center_price) / self.bin_width + self.center() as f64
    }

    /// Floor a price to a whole bin index (may lie outside the grid).
    #[inline]
    pub fn floor_index_at(&self, price: f64) -> i64 {
        self.index_at(price).floor() as i64
    }

    /// Map a position's price bounds to the inclusive span of bins it
    /// overlaps, clipped to the grid. `None` means no overlap.
    pub fn clipped_span(&self, price_lower: f64, price_upper: f64) -> Option<(usize, usize)> {
        let lower = self.floor_index_at(price_lower);
        let upper = self.floor_index_at(price_upper);

        let max_index = self.total_bins as i64 - 1;
        if lower > max_index || upper < 0 {
            return None;
        }

        Some((lower.max(0) as usize, upper.min(max_index) as usize))
    }
}
