//! Economy account for a user.
//!
//! The account carries the Glim balance plus the per-user ad state: the
//! daily rewarded-watch counter and the login streak reported by the
//! external streak service.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::UserId;

/// A user's Glim account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// The user ID (from the auth service).
    pub user_id: UserId,

    /// Current Glim balance.
    pub glim_balance: i64,

    /// Glim credited over the account's lifetime.
    pub lifetime_glim_earned: i64,

    /// Rewarded videos watched on `daily_ad_watches_on`.
    pub daily_ad_watches: u32,

    /// Calendar day the counter refers to.
    pub daily_ad_watches_on: Option<NaiveDate>,

    /// Consecutive login days, as last reported.
    pub streak_days: u32,

    /// When the account was created.
    pub created_at: DateTime<Utc>,

    /// When the account was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Create a new account with zero balance.
    #[must_use]
    pub fn new(user_id: UserId, now: DateTime<Utc>) -> Self {
        Self {
            user_id,
            glim_balance: 0,
            lifetime_glim_earned: 0,
            daily_ad_watches: 0,
            daily_ad_watches_on: None,
            streak_days: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Rewarded watches counted for `day`. A stale counter reads as zero.
    #[must_use]
    pub fn daily_watches_on(&self, day: NaiveDate) -> u32 {
        if self.daily_ad_watches_on == Some(day) {
            self.daily_ad_watches
        } else {
            0
        }
    }

    /// Bump the daily counter for `day`, resetting it on a new day.
    ///
    /// Returns the updated count.
    pub fn count_rewarded_watch(&mut self, day: NaiveDate) -> u32 {
        self.daily_ad_watches = self.daily_watches_on(day) + 1;
        self.daily_ad_watches_on = Some(day);
        self.daily_ad_watches
    }

    /// Add `amount` Glim to the balance. Returns the new balance.
    pub fn credit(&mut self, amount: i64, now: DateTime<Utc>) -> i64 {
        self.glim_balance += amount;
        self.lifetime_glim_earned += amount;
        self.updated_at = now;
        self.glim_balance
    }
}
