//! Economy configuration.
//!
//! All caps, reward ranges, exchange rates and multiplier tables live in one
//! immutable [`EconomyConfig`] that is handed to the reward service at
//! construction.

use chrono::FixedOffset;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{EconomyError, Result};

/// Default number of rewarded videos a user may watch per calendar day.
pub const DEFAULT_REWARDED_DAILY_CAP: u32 = 10;

/// Default lower bound of the rewarded-video base roll.
pub const DEFAULT_REWARDED_MIN_GLIM: i64 = 50;

/// Default upper bound of the rewarded-video base roll.
pub const DEFAULT_REWARDED_MAX_GLIM: i64 = 150;

/// Interstitial payout range.
pub const DEFAULT_INTERSTITIAL_MIN_GLIM: i64 = 10;

/// Interstitial payout range.
pub const DEFAULT_INTERSTITIAL_MAX_GLIM: i64 = 30;

/// Default daily cap on ad-derived Glim reported by the stats endpoint.
pub const DEFAULT_DAILY_GLIM_CAP: i64 = 5000;

/// Glim per unit of offer value (1 cent = 100 Glim).
pub const OFFERWALL_GLIM_PER_UNIT: i64 = 100;

/// Ceiling on a single offerwall payout.
pub const OFFERWALL_MAX_GLIM: i64 = 50_000;

/// One step of the login-streak multiplier table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StreakTier {
    /// Streak length at which this tier starts.
    pub min_days: u32,
    /// Multiplier applied to rewarded-video payouts.
    pub multiplier: f64,
}

/// Immutable economy settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EconomyConfig {
    /// Rewarded videos allowed per user per calendar day.
    pub rewarded_daily_cap: u32,

    /// Inclusive lower bound of the rewarded base roll.
    pub rewarded_min_glim: i64,

    /// Inclusive upper bound of the rewarded base roll.
    pub rewarded_max_glim: i64,

    /// Inclusive lower bound of the interstitial payout.
    pub interstitial_min_glim: i64,

    /// Inclusive upper bound of the interstitial payout.
    pub interstitial_max_glim: i64,

    /// Daily cap on ad-derived Glim, reported by the stats endpoint.
    pub daily_glim_cap: i64,

    /// Glim paid per unit of offer value.
    pub offerwall_glim_per_unit: i64,

    /// Ceiling on one offerwall payout.
    pub offerwall_max_glim: i64,

    /// Multiplier per placement. Unknown placements pay 1.0.
    pub placement_multipliers: HashMap<String, f64>,

    /// Streak tiers, sorted by `min_days`.
    pub streak_tiers: Vec<StreakTier>,

    /// Offset from UTC of the canonical calendar day, in seconds.
    pub day_utc_offset_seconds: i32,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        let placement_multipliers = [
            ("offline_double", 2.0),
            ("speed_up", 1.5),
            ("bonus_chest", 1.8),
            ("continue", 1.2),
            ("expedition", 1.5),
            ("event", 2.0),
            ("general", 1.0),
        ]
        .into_iter()
        .map(|(name, mult)| (name.to_string(), mult))
        .collect();

        Self {
            rewarded_daily_cap: DEFAULT_REWARDED_DAILY_CAP,
            rewarded_min_glim: DEFAULT_REWARDED_MIN_GLIM,
            rewarded_max_glim: DEFAULT_REWARDED_MAX_GLIM,
            interstitial_min_glim: DEFAULT_INTERSTITIAL_MIN_GLIM,
            interstitial_max_glim: DEFAULT_INTERSTITIAL_MAX_GLIM,
            daily_glim_cap: DEFAULT_DAILY_GLIM_CAP,
            offerwall_glim_per_unit: OFFERWALL_GLIM_PER_UNIT,
            offerwall_max_glim: OFFERWALL_MAX_GLIM,
            placement_multipliers,
            streak_tiers: vec![
                StreakTier {
                    min_days: 0,
                    multiplier: 1.0,
                },
                StreakTier {
                    min_days: 3,
                    multiplier: 1.25,
                },
                StreakTier {
                    min_days: 7,
                    multiplier: 1.5,
                },
                StreakTier {
                    min_days: 14,
                    multiplier: 2.0,
                },
            ],
            day_utc_offset_seconds: 0,
        }
    }
}

impl EconomyConfig {
    /// Multiplier for a placement; unknown placements pay 1.0.
    #[must_use]
    pub fn placement_multiplier(&self, placement: &str) -> f64 {
        self.placement_multipliers
            .get(placement)
            .copied()
            .unwrap_or(1.0)
    }

    /// Multiplier for a streak of `days` consecutive logins.
    ///
    /// The highest tier whose threshold has been reached wins; below every
    /// tier the multiplier is 1.0.
    #[must_use]
    pub fn streak_multiplier(&self, days: u32) -> f64 {
        self.streak_tiers
            .iter()
            .filter(|tier| tier.min_days <= days)
            .max_by_key(|tier| tier.min_days)
            .map_or(1.0, |tier| tier.multiplier)
    }

    /// The canonical time zone for daily caps and stats.
    ///
    /// # Errors
    ///
    /// Returns `EconomyError::Configuration` if the offset is out of range.
    pub fn day_offset(&self) -> Result<FixedOffset> {
        FixedOffset::east_opt(self.day_utc_offset_seconds).ok_or_else(|| {
            EconomyError::Configuration(format!(
                "day UTC offset out of range: {}s",
                self.day_utc_offset_seconds
            ))
        })
    }

    /// Check the configuration for values that would break reward rules.
    ///
    /// # Errors
    ///
    /// Returns `EconomyError::Configuration` describing the first problem.
    pub fn validate(&self) -> Result<()> {
        if self.rewarded_min_glim < 0 || self.rewarded_min_glim > self.rewarded_max_glim {
            return Err(EconomyError::Configuration(format!(
                "rewarded range {}..={} is invalid",
                self.rewarded_min_glim, self.rewarded_max_glim
            )));
        }
        if self.interstitial_min_glim < 0 || self.interstitial_min_glim > self.interstitial_max_glim
        {
            return Err(EconomyError::Configuration(format!(
                "interstitial range {}..={} is invalid",
                self.interstitial_min_glim, self.interstitial_max_glim
            )));
        }
        if self.offerwall_glim_per_unit <= 0 || self.offerwall_max_glim < 0 {
            return Err(EconomyError::Configuration(
                "offerwall rate and ceiling must be positive".into(),
            ));
        }
        let bad_multiplier = |m: f64| !m.is_finite() || m < 0.0;
        if let Some((name, _)) = self
            .placement_multipliers
            .iter()
            .find(|(_, m)| bad_multiplier(**m))
        {
            return Err(EconomyError::Configuration(format!(
                "placement multiplier for {name} must be a non-negative number"
            )));
        }
        if self
            .streak_tiers
            .iter()
            .any(|tier| bad_multiplier(tier.multiplier))
        {
            return Err(EconomyError::Configuration(
                "streak multipliers must be non-negative numbers".into(),
            ));
        }
        self.day_offset()?;
        Ok(())
    }
}
