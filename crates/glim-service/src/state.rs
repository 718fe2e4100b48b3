//! Application state.

use std::sync::Arc;

use glim_core::{Clock, RewardRng, SeededRng, SystemClock};
use glim_store::{RocksStore, Store};

use crate::config::ServiceConfig;
use crate::rewards::AdRewardService;
use crate::streak::AccountStreaks;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// The storage backend.
    pub store: Arc<RocksStore>,

    /// Service configuration.
    pub config: ServiceConfig,

    /// Time source for day boundaries and timestamps.
    pub clock: Arc<dyn Clock>,

    /// Ad reward engine.
    pub rewards: Arc<AdRewardService>,
}

impl AppState {
    /// Create application state with the system clock and an entropy-seeded RNG.
    ///
    /// # Errors
    ///
    /// Returns an error if the economy configuration is invalid.
    pub fn new(store: Arc<RocksStore>, config: ServiceConfig) -> glim_core::Result<Self> {
        Self::with_seams(
            store,
            config,
            Arc::new(SystemClock),
            Arc::new(SeededRng::from_entropy()),
        )
    }

    /// Create application state with an explicit clock and RNG.
    ///
    /// # Errors
    ///
    /// Returns an error if the economy configuration is invalid.
    pub fn with_seams(
        store: Arc<RocksStore>,
        config: ServiceConfig,
        clock: Arc<dyn Clock>,
        rng: Arc<dyn RewardRng>,
    ) -> glim_core::Result<Self> {
        let dyn_store: Arc<dyn Store> = store.clone();
        let streaks = Arc::new(AccountStreaks::new(
            Arc::clone(&dyn_store),
            config.economy.clone(),
        ));
        let rewards = AdRewardService::new(
            dyn_store,
            config.economy.clone(),
            Arc::clone(&clock),
            rng,
            streaks,
        )?;

        if config.jwt_secret.is_none() {
            tracing::warn!("JWT secret not configured - player requests will be rejected");
        }
        if config.service_api_key.is_none() {
            tracing::warn!("Service API key not configured - service routes will be rejected");
        }

        Ok(Self {
            store,
            config,
            clock,
            rewards: Arc::new(rewards),
        })
    }
}
