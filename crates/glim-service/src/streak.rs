//! Streak multiplier source.
//!
//! Login streaks are tracked by the auth/login service and reported here;
//! the reward service only asks for the multiplier to apply.

use std::sync::Arc;

use glim_core::{EconomyConfig, UserId};
use glim_store::Store;

/// Supplies the streak multiplier for a user.
pub trait StreakSource: Send + Sync {
    /// Multiplier applied to the user's rewarded-video payouts.
    ///
    /// # Errors
    ///
    /// Returns an error if the streak cannot be read.
    fn multiplier(&self, user_id: &UserId) -> glim_core::Result<f64>;
}

/// Reads the reported streak from the account and maps it through the
/// configured tier table. Users without an account get the base tier.
pub struct AccountStreaks {
    store: Arc<dyn Store>,
    config: EconomyConfig,
}

impl AccountStreaks {
    /// Create a source backed by `store`.
    #[must_use]
    pub fn new(store: Arc<dyn Store>, config: EconomyConfig) -> Self {
        Self { store, config }
    }
}

impl StreakSource for AccountStreaks {
    fn multiplier(&self, user_id: &UserId) -> glim_core::Result<f64> {
        let days = self
            .store
            .get_account(user_id)?
            .map_or(0, |account| account.streak_days);
        Ok(self.config.streak_multiplier(days))
    }
}
