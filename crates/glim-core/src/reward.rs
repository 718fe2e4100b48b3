//! Reward arithmetic.
//!
//! Rewarded payouts are `floor(floor(base * streak) * placement)` with `base`
//! drawn uniformly from the configured range. Offerwall payouts convert the
//! offer value at a fixed rate up to a ceiling.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::{Mutex, PoisonError};

use crate::error::{EconomyError, Result};

/// Source of the uniform base rolls.
pub trait RewardRng: Send + Sync {
    /// Draw an integer uniformly from `min..=max`.
    fn draw(&self, min: i64, max: i64) -> i64;
}

/// `StdRng` behind a mutex; seed it for reproducible tests.
#[derive(Debug)]
pub struct SeededRng {
    inner: Mutex<StdRng>,
}

impl SeededRng {
    /// Seed from operating-system entropy.
    #[must_use]
    pub fn from_entropy() -> Self {
        Self {
            inner: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Deterministic sequence for a given seed.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            inner: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl RewardRng for SeededRng {
    fn draw(&self, min: i64, max: i64) -> i64 {
        if min >= max {
            return min;
        }
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .gen_range(min..=max)
    }
}

/// Apply the streak and placement multipliers to a base roll.
///
/// Each step floors, so the result is always a non-negative integer.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
pub fn apply_multipliers(base: i64, streak_multiplier: f64, placement_multiplier: f64) -> i64 {
    let after_streak = (base as f64 * streak_multiplier).floor().max(0.0);
    (after_streak * placement_multiplier).floor().max(0.0) as i64
}

/// Check an offerwall completion and convert its value to Glim.
///
/// # Errors
///
/// Returns `EconomyError::InvalidOffer` if `offer_id` is blank or
/// `offer_value` is not a positive finite number.
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
pub fn offerwall_glim(
    offer_id: &str,
    offer_value: f64,
    glim_per_unit: i64,
    max_glim: i64,
) -> Result<i64> {
    if offer_id.trim().is_empty() {
        return Err(EconomyError::InvalidOffer("offer_id is required".into()));
    }
    if !offer_value.is_finite() || offer_value <= 0.0 {
        return Err(EconomyError::InvalidOffer(
            "offer_value must be positive".into(),
        ));
    }

    let glim = (offer_value * glim_per_unit as f64).floor();
    if glim >= max_glim as f64 {
        Ok(max_glim)
    } else {
        Ok(glim as i64)
    }
}
