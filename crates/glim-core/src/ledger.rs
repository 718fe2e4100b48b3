//! Glim ledger entries.
//!
//! Every change to a user's Glim balance is recorded as an append-only
//! [`GlimTransaction`]. The ledger, not the watch log, is the source of truth
//! for how much Glim a user earned on a given day.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{TransactionId, UserId};

/// A ledger entry representing a Glim balance change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlimTransaction {
    /// Unique transaction ID (ULID stamped with `created_at`).
    pub id: TransactionId,

    /// The user whose balance was affected.
    pub user_id: UserId,

    /// Amount of Glim credited. Never negative for reward types.
    pub amount: i64,

    /// Type of transaction.
    pub transaction_type: TransactionType,

    /// Balance after this transaction. Filled in by the store on commit.
    pub balance_after: i64,

    /// Human-readable description.
    pub description: String,

    /// When the transaction was created.
    pub created_at: DateTime<Utc>,
}

impl GlimTransaction {
    /// Create a credit entry. `balance_after` is set when the store applies it.
    #[must_use]
    pub fn credit(
        user_id: UserId,
        amount: i64,
        transaction_type: TransactionType,
        description: String,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: TransactionId::at(created_at),
            user_id,
            amount,
            transaction_type,
            balance_after: 0,
            description,
            created_at,
        }
    }

    /// Rewarded-video payout.
    #[must_use]
    pub fn ad_rewarded(
        user_id: UserId,
        amount: i64,
        placement: &str,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self::credit(
            user_id,
            amount,
            TransactionType::AdRewarded,
            format!("Rewarded video: {placement}"),
            created_at,
        )
    }

    /// Interstitial payout.
    #[must_use]
    pub fn ad_interstitial(
        user_id: UserId,
        amount: i64,
        placement: &str,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self::credit(
            user_id,
            amount,
            TransactionType::AdInterstitial,
            format!("Interstitial: {placement}"),
            created_at,
        )
    }

    /// Offerwall payout.
    #[must_use]
    pub fn offerwall(
        user_id: UserId,
        amount: i64,
        offer_id: &str,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self::credit(
            user_id,
            amount,
            TransactionType::Offerwall,
            format!("Offerwall offer: {offer_id}"),
            created_at,
        )
    }
}

/// Type of ledger transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    /// Rewarded video watched.
    AdRewarded,

    /// Interstitial watched.
    AdInterstitial,

    /// Offerwall offer completed.
    Offerwall,
}

impl TransactionType {
    /// Wire name of the type, as stored and reported.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::AdRewarded => "ad_rewarded",
            Self::AdInterstitial => "ad_interstitial",
            Self::Offerwall => "offerwall",
        }
    }

    /// Whether the entry counts toward the daily ad-derived Glim total.
    ///
    /// Only `ad_`-prefixed types count; offerwall payouts do not.
    #[must_use]
    pub fn is_ad_derived(&self) -> bool {
        self.as_str().starts_with("ad_")
    }
}
