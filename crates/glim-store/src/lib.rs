//! `RocksDB` storage layer for the Glim economy.
//!
//! This crate persists accounts, the Glim ledger, the ad-watch log and quest
//! progress using `RocksDB` with column families for efficient indexing.
//!
//! # Architecture
//!
//! The storage uses the following column families:
//!
//! - `accounts`: Account records, keyed by `user_id`
//! - `transactions`: Ledger entries, keyed by `transaction_id` (ULID)
//! - `transactions_by_user`: Index for listing a user's ledger entries
//! - `ad_watches`: Watch log, keyed by `user_id || watch_id`
//! - `quests`: Quest progress, keyed by `user_id || quest_id`
//!
//! # Example
//!
//! ```no_run
//! use chrono::Utc;
//! use glim_core::{GlimTransaction, UserId};
//! use glim_store::{RocksStore, Store};
//!
//! let store = RocksStore::open("/tmp/glim-db").unwrap();
//!
//! let user_id = UserId::generate();
//! let tx = GlimTransaction::offerwall(user_id, 10_000, "offer-1", Utc::now());
//! let balance = store.credit_glim(&tx).unwrap();
//! assert_eq!(balance, 10_000);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod keys;
pub mod rocks;
pub mod schema;

pub use error::{Result, StoreError};
pub use rocks::RocksStore;

use chrono::{DateTime, NaiveDate, Utc};

use glim_core::{
    Account, AdType, AdWatchEvent, GlimTransaction, Quest, QuestId, TransactionId, UserId,
};

/// Everything written for one ad payout, committed together.
#[derive(Debug, Clone, Copy)]
pub struct AdRewardWrite<'a> {
    /// Watch-log entry to append.
    pub event: &'a AdWatchEvent,

    /// Ledger credit for the payout.
    pub transaction: &'a GlimTransaction,

    /// Calendar day the watch counts toward.
    pub day: NaiveDate,

    /// Open quests whose type contains this kind are advanced by one.
    pub quest_kind: Option<&'a str>,
}

/// State after an ad payout was committed.
#[derive(Debug, Clone)]
pub struct AdRewardCommit {
    /// Glim balance after the credit.
    pub balance: i64,

    /// Rewarded watches counted for the day.
    pub daily_ad_watches: u32,

    /// Quests that were advanced, in their new state.
    pub quests_advanced: Vec<Quest>,
}

/// The storage trait defining all database operations.
///
/// This trait abstracts the storage layer so the reward service can be
/// driven against any backend.
pub trait Store: Send + Sync {
    // =========================================================================
    // Account Operations
    // =========================================================================

    /// Insert or update an account record.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn put_account(&self, account: &Account) -> Result<()>;

    /// Get an account by user ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_account(&self, user_id: &UserId) -> Result<Option<Account>>;

    // =========================================================================
    // Ledger Operations
    // =========================================================================

    /// Get a ledger entry by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_transaction(&self, transaction_id: &TransactionId) -> Result<Option<GlimTransaction>>;

    /// List a user's ledger entries, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn list_transactions_by_user(
        &self,
        user_id: &UserId,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<GlimTransaction>>;

    /// List a user's ledger entries created in `[from, to)`, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn list_transactions_between(
        &self,
        user_id: &UserId,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<GlimTransaction>>;

    // =========================================================================
    // Watch Log Operations
    // =========================================================================

    /// List a user's watch-log entries in `[from, to)`, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn list_ad_watches_between(
        &self,
        user_id: &UserId,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<AdWatchEvent>>;

    /// Count a user's watches of one ad type in `[from, to)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn count_ad_watches(
        &self,
        user_id: &UserId,
        ad_type: AdType,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<u32> {
        let count = self
            .list_ad_watches_between(user_id, from, to)?
            .iter()
            .filter(|event| event.ad_type == ad_type)
            .count();
        Ok(u32::try_from(count).unwrap_or(u32::MAX))
    }

    // =========================================================================
    // Quest Operations
    // =========================================================================

    /// Insert or update a quest.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn put_quest(&self, quest: &Quest) -> Result<()>;

    /// Get one of a user's quests.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_quest(&self, user_id: &UserId, quest_id: &QuestId) -> Result<Option<Quest>>;

    /// List a user's quests, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn list_quests_by_user(&self, user_id: &UserId) -> Result<Vec<Quest>>;

    // =========================================================================
    // Compound Operations
    // =========================================================================

    /// Credit Glim and record the ledger entry atomically.
    ///
    /// Creates the account if the user has none. The stored entry carries
    /// the resulting `balance_after`. Returns the new balance.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn credit_glim(&self, transaction: &GlimTransaction) -> Result<i64>;

    /// Commit an ad payout atomically: watch-log entry, ledger credit,
    /// daily rewarded counter (rewarded ads only) and quest progress.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails; nothing is written
    /// in that case.
    fn record_ad_reward(&self, write: &AdRewardWrite<'_>) -> Result<AdRewardCommit>;
}
