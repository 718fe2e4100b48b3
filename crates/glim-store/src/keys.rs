//! Key encoding utilities for `RocksDB`.
//!
//! Per-user keys are `user_id (16 bytes) || ulid (16 bytes)`. ULIDs start
//! with a big-endian millisecond timestamp, so a user's entries sort by time
//! and a day of them is one contiguous key range.

use chrono::{DateTime, Utc};

use glim_core::{QuestId, TransactionId, UserId, WatchId};

/// Length of a per-user compound key.
pub const USER_KEY_LEN: usize = 32;

/// Create an account key from a user ID.
#[must_use]
pub fn account_key(user_id: &UserId) -> Vec<u8> {
    user_id.as_bytes().to_vec()
}

/// Create a transaction key from a transaction ID.
#[must_use]
pub fn transaction_key(transaction_id: &TransactionId) -> Vec<u8> {
    transaction_id.to_bytes().to_vec()
}

fn user_scoped_key(user_id: &UserId, suffix: [u8; 16]) -> Vec<u8> {
    let mut key = Vec::with_capacity(USER_KEY_LEN);
    key.extend_from_slice(user_id.as_bytes());
    key.extend_from_slice(&suffix);
    key
}

/// Create a user-transaction index key.
#[must_use]
pub fn user_transaction_key(user_id: &UserId, transaction_id: &TransactionId) -> Vec<u8> {
    user_scoped_key(user_id, transaction_id.to_bytes())
}

/// Create a watch-log key.
#[must_use]
pub fn ad_watch_key(user_id: &UserId, watch_id: &WatchId) -> Vec<u8> {
    user_scoped_key(user_id, watch_id.to_bytes())
}

/// Create a quest key.
#[must_use]
pub fn quest_key(user_id: &UserId, quest_id: &QuestId) -> Vec<u8> {
    user_scoped_key(user_id, quest_id.to_bytes())
}

/// Create a prefix for iterating all of a user's entries in a column family.
#[must_use]
pub fn user_prefix(user_id: &UserId) -> Vec<u8> {
    user_id.as_bytes().to_vec()
}

/// The first per-user key whose ULID timestamp is `at` or later.
///
/// The ULID type is irrelevant here; only the timestamp prefix matters.
#[must_use]
pub fn user_time_bound(user_id: &UserId, at: DateTime<Utc>) -> Vec<u8> {
    user_scoped_key(user_id, TransactionId::lower_bound(at).to_bytes())
}

/// Extract the ULID suffix from a per-user key.
///
/// Returns `None` if the key is not a 32-byte compound key.
#[must_use]
pub fn ulid_suffix(key: &[u8]) -> Option<[u8; 16]> {
    if key.len() != USER_KEY_LEN {
        return None;
    }
    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&key[16..USER_KEY_LEN]);
    Some(bytes)
}
