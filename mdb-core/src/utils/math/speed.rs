//! Speed mapping for magnitude-driven motor control.
//!
//! The `SpeedLaw` struct converts a non-negative motion magnitude into a
//! normalized speed demand in percent using a piecewise-linear, saturating
//! law. It is pure and side-effect free so it can be tuned and tested without
//! hardware.
//!
//! # Example
//! ```rust
//! use mdb_core::utils::math::speed::SpeedLaw;
//! let law = SpeedLaw::default();
//! assert_eq!(law.demand(0.2), 0);
//! assert_eq!(law.demand(12.0), 100);
//! ```

/// Maximum demand, in percent.
pub const DEMAND_MAX: u8 = 100;

/// Piecewise-linear clamp-and-scale law mapping a motion magnitude to a
/// 0..=100 speed demand.
#[derive(Debug, Clone, Copy)]
pub struct SpeedLaw {
    /// Magnitudes at or below this value map to 0.
    low: f32,
    /// Magnitudes at or above this value map to 100.
    high: f32,
}

impl Default for SpeedLaw {
    /// Default thresholds for the L3GD20 at ±250 dps: dead band below
    /// 0.5 dps, full speed at 10 dps.
    fn default() -> Self {
        Self {
            low: 0.5,
            high: 10.0,
        }
    }
}

impl SpeedLaw {
    /// Instantiate with explicit thresholds. `high` must be greater than
    /// `low`; callers passing a degenerate range get the default law back.
    pub fn new(low: f32, high: f32) -> Self {
        if high > low {
            Self { low, high }
        } else {
            Self::default()
        }
    }

    /// Map a magnitude to a speed demand in percent.
    ///
    /// The law is monotonic non-decreasing and saturating: 0 at or below the
    /// low threshold, 100 at or above the high threshold, linear in between
    /// with the fraction truncated to an integer.
    pub fn demand(&self, magnitude: f32) -> u8 {
        if magnitude <= self.low {
            return 0;
        }
        if magnitude >= self.high {
            return DEMAND_MAX;
        }
        let span = self.high - self.low;
        let percent = ((magnitude - self.low) / span) * 100.0;
        (percent as u8).min(DEMAND_MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn saturates_at_thresholds() {
        let law = SpeedLaw::default();
        assert_eq!(law.demand(0.0), 0);
        assert_eq!(law.demand(0.5), 0);
        assert_eq!(law.demand(10.0), 100);
        assert_eq!(law.demand(1000.0), 100);
    }

    #[test]
    fn interpolates_and_truncates() {
        let law = SpeedLaw::default();
        // (5.0 - 0.5) / 9.5 * 100 = 47.36..., truncated
        assert_eq!(law.demand(5.0), 47);
        assert_eq!(law.demand(0.6), 1);
        assert_eq!(law.demand(9.9), 98);
    }

    #[test]
    fn monotonic_over_active_range() {
        let law = SpeedLaw::default();
        let mut prev = 0;
        for i in 0..=200 {
            let m = 0.5 + (i as f32) * (9.5 / 200.0);
            let d = law.demand(m);
            assert!(d >= prev, "demand decreased at magnitude {}", m);
            prev = d;
        }
    }

    #[test]
    fn degenerate_range_falls_back_to_default() {
        let law = SpeedLaw::new(10.0, 10.0);
        assert_eq!(law.demand(5.0), 47);
    }

    #[test]
    fn negative_magnitude_is_dead_band() {
        let law = SpeedLaw::default();
        assert_eq!(law.demand(-3.0), 0);
    }
}
