//! `RocksDB` storage implementation.
//!
//! This module provides the `RocksStore` implementation of the `Store` trait.
//! Compound operations read the account, then commit every affected record
//! in a single `WriteBatch`. The read-modify-write is not guarded here;
//! callers serialize writes per user.

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rocksdb::{
    BoundColumnFamily, ColumnFamilyDescriptor, DBWithThreadMode, Direction, IteratorMode,
    MultiThreaded, Options, WriteBatch,
};

use glim_core::{
    Account, AdType, AdWatchEvent, GlimTransaction, Quest, QuestId, TransactionId, UserId,
};

use crate::error::{Result, StoreError};
use crate::keys;
use crate::schema::{all_column_families, cf};
use crate::{AdRewardCommit, AdRewardWrite, Store};

/// RocksDB-backed storage implementation.
pub struct RocksStore {
    db: Arc<DBWithThreadMode<MultiThreaded>>,
}

impl RocksStore {
    /// Open or create a `RocksDB` database at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or created.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_descriptors: Vec<_> = all_column_families()
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()))
            .collect();

        let db = DBWithThreadMode::open_cf_descriptors(&opts, path, cf_descriptors)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(Self { db: Arc::new(db) })
    }

    /// Get a column family handle.
    fn cf(&self, name: &str) -> Result<Arc<BoundColumnFamily<'_>>> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| StoreError::Database(format!("column family not found: {name}")))
    }

    /// Serialize a value using CBOR.
    fn serialize<T: serde::Serialize>(value: &T) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        ciborium::into_writer(value, &mut buf)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        Ok(buf)
    }

    /// Deserialize a value from CBOR.
    fn deserialize<T: serde::de::DeserializeOwned>(data: &[u8]) -> Result<T> {
        ciborium::from_reader(data).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    /// Collect `(key, value)` pairs with `from <= key < to`, in key order.
    fn scan_range(&self, name: &str, from: &[u8], to: &[u8]) -> Result<Vec<(Box<[u8]>, Box<[u8]>)>> {
        let cf = self.cf(name)?;
        let iter = self
            .db
            .iterator_cf(&cf, IteratorMode::From(from, Direction::Forward));

        let mut entries = Vec::new();
        for item in iter {
            let (key, value) = item.map_err(|e| StoreError::Database(e.to_string()))?;
            if &*key >= to {
                break;
            }
            entries.push((key, value));
        }
        Ok(entries)
    }

    /// Collect all `(key, value)` pairs starting with `prefix`, in key order.
    fn scan_prefix(&self, name: &str, prefix: &[u8]) -> Result<Vec<(Box<[u8]>, Box<[u8]>)>> {
        let cf = self.cf(name)?;
        let iter = self
            .db
            .iterator_cf(&cf, IteratorMode::From(prefix, Direction::Forward));

        let mut entries = Vec::new();
        for item in iter {
            let (key, value) = item.map_err(|e| StoreError::Database(e.to_string()))?;
            if !key.starts_with(prefix) {
                break;
            }
            entries.push((key, value));
        }
        Ok(entries)
    }

    /// Resolve user-index keys to ledger entries.
    fn transactions_for_index_keys<'k>(
        &self,
        index_keys: impl Iterator<Item = &'k [u8]>,
    ) -> Result<Vec<GlimTransaction>> {
        let mut transactions = Vec::new();
        for key in index_keys {
            let tx_id = keys::ulid_suffix(key)
                .map(TransactionId::from_bytes)
                .ok_or(StoreError::CorruptKey {
                    column_family: cf::TRANSACTIONS_BY_USER,
                })?;
            if let Some(tx) = self.get_transaction(&tx_id)? {
                transactions.push(tx);
            }
        }
        Ok(transactions)
    }

    /// Stage a ledger entry and its user index in `batch`.
    fn stage_transaction(&self, batch: &mut WriteBatch, transaction: &GlimTransaction) -> Result<()> {
        let cf_tx = self.cf(cf::TRANSACTIONS)?;
        let cf_by_user = self.cf(cf::TRANSACTIONS_BY_USER)?;

        let tx_key = keys::transaction_key(&transaction.id);
        let user_tx_key = keys::user_transaction_key(&transaction.user_id, &transaction.id);
        let value = Self::serialize(transaction)?;

        batch.put_cf(&cf_tx, &tx_key, &value);
        batch.put_cf(&cf_by_user, &user_tx_key, []); // Index entry (empty value)
        Ok(())
    }

    /// Stage an account write in `batch`.
    fn stage_account(&self, batch: &mut WriteBatch, account: &Account) -> Result<()> {
        let cf = self.cf(cf::ACCOUNTS)?;
        batch.put_cf(
            &cf,
            keys::account_key(&account.user_id),
            Self::serialize(account)?,
        );
        Ok(())
    }

    fn write(&self, batch: WriteBatch) -> Result<()> {
        self.db
            .write(batch)
            .map_err(|e| StoreError::Database(e.to_string()))
    }
}

impl Store for RocksStore {
    // =========================================================================
    // Account Operations
    // =========================================================================

    fn put_account(&self, account: &Account) -> Result<()> {
        let cf = self.cf(cf::ACCOUNTS)?;
        let key = keys::account_key(&account.user_id);
        let value = Self::serialize(account)?;

        self.db
            .put_cf(&cf, key, value)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(())
    }

    fn get_account(&self, user_id: &UserId) -> Result<Option<Account>> {
        let cf = self.cf(cf::ACCOUNTS)?;
        let key = keys::account_key(user_id);

        self.db
            .get_cf(&cf, key)
            .map_err(|e| StoreError::Database(e.to_string()))?
            .map(|data| Self::deserialize(&data))
            .transpose()
    }

    // =========================================================================
    // Ledger Operations
    // =========================================================================

    fn get_transaction(&self, transaction_id: &TransactionId) -> Result<Option<GlimTransaction>> {
        let cf = self.cf(cf::TRANSACTIONS)?;
        let key = keys::transaction_key(transaction_id);

        self.db
            .get_cf(&cf, key)
            .map_err(|e| StoreError::Database(e.to_string()))?
            .map(|data| Self::deserialize(&data))
            .transpose()
    }

    fn list_transactions_by_user(
        &self,
        user_id: &UserId,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<GlimTransaction>> {
        let prefix = keys::user_prefix(user_id);
        let index = self.scan_prefix(cf::TRANSACTIONS_BY_USER, &prefix)?;

        // ULID suffixes sort oldest first; walk backwards for newest first.
        let page = index
            .iter()
            .rev()
            .skip(offset)
            .take(limit)
            .map(|(key, _)| &**key);

        self.transactions_for_index_keys(page)
    }

    fn list_transactions_between(
        &self,
        user_id: &UserId,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<GlimTransaction>> {
        let lo = keys::user_time_bound(user_id, from);
        let hi = keys::user_time_bound(user_id, to);
        let index = self.scan_range(cf::TRANSACTIONS_BY_USER, &lo, &hi)?;

        let mut transactions = self.transactions_for_index_keys(index.iter().map(|(k, _)| &**k))?;
        transactions.retain(|tx| from <= tx.created_at && tx.created_at < to);
        Ok(transactions)
    }

    // =========================================================================
    // Watch Log Operations
    // =========================================================================

    fn list_ad_watches_between(
        &self,
        user_id: &UserId,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<AdWatchEvent>> {
        let lo = keys::user_time_bound(user_id, from);
        let hi = keys::user_time_bound(user_id, to);

        let mut events = self
            .scan_range(cf::AD_WATCHES, &lo, &hi)?
            .iter()
            .map(|(_, value)| Self::deserialize::<AdWatchEvent>(value))
            .collect::<Result<Vec<_>>>()?;
        events.retain(|event| from <= event.watched_at && event.watched_at < to);
        Ok(events)
    }

    // =========================================================================
    // Quest Operations
    // =========================================================================

    fn put_quest(&self, quest: &Quest) -> Result<()> {
        let cf = self.cf(cf::QUESTS)?;
        let key = keys::quest_key(&quest.user_id, &quest.id);
        let value = Self::serialize(quest)?;

        self.db
            .put_cf(&cf, key, value)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(())
    }

    fn get_quest(&self, user_id: &UserId, quest_id: &QuestId) -> Result<Option<Quest>> {
        let cf = self.cf(cf::QUESTS)?;
        let key = keys::quest_key(user_id, quest_id);

        self.db
            .get_cf(&cf, key)
            .map_err(|e| StoreError::Database(e.to_string()))?
            .map(|data| Self::deserialize(&data))
            .transpose()
    }

    fn list_quests_by_user(&self, user_id: &UserId) -> Result<Vec<Quest>> {
        let prefix = keys::user_prefix(user_id);
        self.scan_prefix(cf::QUESTS, &prefix)?
            .iter()
            .map(|(_, value)| Self::deserialize(value))
            .collect()
    }

    // =========================================================================
    // Compound Operations
    // =========================================================================

    fn credit_glim(&self, transaction: &GlimTransaction) -> Result<i64> {
        let mut account = self
            .get_account(&transaction.user_id)?
            .unwrap_or_else(|| Account::new(transaction.user_id, transaction.created_at));

        let balance = account.credit(transaction.amount, transaction.created_at);
        let mut committed = transaction.clone();
        committed.balance_after = balance;

        let mut batch = WriteBatch::default();
        self.stage_account(&mut batch, &account)?;
        self.stage_transaction(&mut batch, &committed)?;
        self.write(batch)?;

        Ok(balance)
    }

    fn record_ad_reward(&self, write: &AdRewardWrite<'_>) -> Result<AdRewardCommit> {
        let event = write.event;
        let now = event.watched_at;

        let mut account = self
            .get_account(&event.user_id)?
            .unwrap_or_else(|| Account::new(event.user_id, now));

        let balance = account.credit(write.transaction.amount, now);
        let daily_ad_watches = if event.ad_type == AdType::Rewarded {
            account.count_rewarded_watch(write.day)
        } else {
            account.daily_watches_on(write.day)
        };

        let mut committed = write.transaction.clone();
        committed.balance_after = balance;

        let mut quests_advanced = Vec::new();
        if let Some(kind) = write.quest_kind {
            for mut quest in self.list_quests_by_user(&event.user_id)? {
                if quest.accepts(kind) && quest.advance(1, now) {
                    quests_advanced.push(quest);
                }
            }
        }

        let cf_watches = self.cf(cf::AD_WATCHES)?;
        let cf_quests = self.cf(cf::QUESTS)?;

        // Write atomically
        let mut batch = WriteBatch::default();
        batch.put_cf(
            &cf_watches,
            keys::ad_watch_key(&event.user_id, &event.id),
            Self::serialize(event)?,
        );
        self.stage_transaction(&mut batch, &committed)?;
        self.stage_account(&mut batch, &account)?;
        for quest in &quests_advanced {
            batch.put_cf(
                &cf_quests,
                keys::quest_key(&quest.user_id, &quest.id),
                Self::serialize(quest)?,
            );
        }
        self.write(batch)?;

        tracing::debug!(
            user_id = %event.user_id,
            ad_type = %event.ad_type,
            glim = committed.amount,
            balance,
            quests_advanced = quests_advanced.len(),
            "Ad reward committed"
        );

        Ok(AdRewardCommit {
            balance,
            daily_ad_watches,
            quests_advanced,
        })
    }
}
