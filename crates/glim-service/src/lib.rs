//! Glim economy HTTP API service.
//!
//! This crate provides the HTTP API for the Glim ad-reward economy:
//!
//! - Rewarded video, interstitial and offerwall payouts
//! - Daily ad statistics
//! - Economy accounts and the Glim ledger
//! - Quest progress and login-streak reporting
//!
//! # Authentication
//!
//! The service supports two authentication methods:
//!
//! 1. **Player JWT tokens** - For requests from the game client
//! 2. **Service API keys** - For the login and quest backends

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// Allow some pedantic lints that are noisy for Axum handler functions
#![allow(clippy::missing_errors_doc)] // Axum handlers all return Result
#![allow(clippy::unused_async)] // Axum handlers must be async

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod rewards;
pub mod routes;
pub mod state;
pub mod streak;

pub use config::ServiceConfig;
pub use error::ApiError;
pub use rewards::{
    AdRewardService, DailyStats, InterstitialOutcome, OfferOutcome, RewardedOutcome,
};
pub use routes::create_router;
pub use state::AppState;
pub use streak::{AccountStreaks, StreakSource};
