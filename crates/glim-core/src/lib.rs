//! Core types and reward rules for the Glim economy.
//!
//! This crate provides the foundational types shared by the store and the
//! HTTP service:
//!
//! - **Identifiers**: `UserId`, `TransactionId`, `WatchId`, `QuestId`
//! - **Accounts**: `Account` (balance, daily ad counter, login streak)
//! - **Ledger**: `GlimTransaction`, `TransactionType`
//! - **Ads**: `AdWatchEvent`, `AdType`, `AdTypeStats`
//! - **Quests**: `Quest`
//! - **Rules**: `EconomyConfig`, `apply_multipliers`, `offerwall_glim`
//! - **Seams**: `Clock`, `RewardRng`
//!
//! # Glim
//!
//! Glim is the game's soft currency. Amounts are stored as `i64` whole Glim;
//! reward payouts are never negative.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod account;
pub mod ads;
pub mod clock;
pub mod config;
pub mod error;
pub mod ids;
pub mod ledger;
pub mod quest;
pub mod reward;

pub use account::Account;
pub use ads::{
    summarize_watches, AdType, AdTypeStats, AdWatchEvent, DEFAULT_PLACEMENT, DEFAULT_PROVIDER,
};
pub use clock::{Clock, DayWindow, FixedClock, SystemClock};
pub use config::{
    EconomyConfig, StreakTier, DEFAULT_DAILY_GLIM_CAP, DEFAULT_REWARDED_DAILY_CAP,
    DEFAULT_REWARDED_MAX_GLIM, DEFAULT_REWARDED_MIN_GLIM, OFFERWALL_GLIM_PER_UNIT,
    OFFERWALL_MAX_GLIM,
};
pub use error::{EconomyError, Result};
pub use ids::{IdError, QuestId, TransactionId, UserId, WatchId};
pub use ledger::{GlimTransaction, TransactionType};
pub use quest::{Quest, AD_WATCH_QUEST};
pub use reward::{apply_multipliers, offerwall_glim, RewardRng, SeededRng};
