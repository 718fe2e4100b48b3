//! Ad reward service.
//!
//! Validates eligibility, computes payouts and commits the watch log, ledger
//! credit, daily counter and quest progress for each ad event.
//!
//! # Concurrency
//!
//! Reward operations for one user run under a per-user lock held from the
//! cap check to the commit, so two simultaneous rewarded-video calls cannot
//! both pass the cap. The commit itself is a single store write batch.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::NaiveDate;
use tokio::sync::OwnedMutexGuard;

use glim_core::{
    apply_multipliers, offerwall_glim, summarize_watches, AdType, AdTypeStats, AdWatchEvent,
    Clock, DayWindow, EconomyConfig, EconomyError, GlimTransaction, Result, RewardRng, UserId,
    AD_WATCH_QUEST, DEFAULT_PLACEMENT, DEFAULT_PROVIDER,
};
use glim_store::{AdRewardWrite, Store};

use crate::streak::StreakSource;

/// Lock map size above which idle entries are pruned.
const LOCK_PRUNE_THRESHOLD: usize = 1024;

/// Per-user async locks.
#[derive(Default)]
pub struct UserLocks {
    inner: Mutex<HashMap<UserId, Arc<tokio::sync::Mutex<()>>>>,
}

impl UserLocks {
    /// Wait for exclusive access to `user_id`'s economy state.
    pub async fn lock(&self, user_id: UserId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut map = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
            if map.len() > LOCK_PRUNE_THRESHOLD {
                map.retain(|_, lock| Arc::strong_count(lock) > 1);
            }
            Arc::clone(map.entry(user_id).or_default())
        };
        lock.lock_owned().await
    }
}

/// Result of a rewarded-video watch.
#[derive(Debug, Clone)]
pub struct RewardedOutcome {
    /// Glim credited.
    pub glim_rewarded: i64,
    /// Streak multiplier applied.
    pub streak_multiplier: f64,
    /// Placement multiplier applied.
    pub placement_bonus: f64,
    /// Rewarded watches today, including this one.
    pub daily_watches: u32,
    /// Configured daily cap.
    pub daily_cap: u32,
    /// Balance after the credit.
    pub balance: i64,
    /// Quests completed by this watch.
    pub quests_completed: usize,
}

/// Result of an interstitial watch.
#[derive(Debug, Clone)]
pub struct InterstitialOutcome {
    /// Glim credited.
    pub glim_rewarded: i64,
    /// Balance after the credit.
    pub balance: i64,
}

/// Result of an offerwall completion.
#[derive(Debug, Clone)]
pub struct OfferOutcome {
    /// Glim credited.
    pub glim_rewarded: i64,
    /// Offer that was completed.
    pub offer_id: String,
    /// Balance after the credit.
    pub balance: i64,
}

/// Today's ad activity for one user.
#[derive(Debug, Clone)]
pub struct DailyStats {
    /// Calendar day in the canonical time zone.
    pub today: NaiveDate,
    /// Watch-log aggregate per ad type.
    pub ad_stats: Vec<AdTypeStats>,
    /// Sum of today's ad-derived ledger entries.
    pub total_ad_glim: i64,
    /// Daily ad Glim cap.
    pub daily_cap: i64,
    /// `max(0, daily_cap - total_ad_glim)`.
    pub remaining_cap: i64,
    /// Current streak multiplier.
    pub streak_multiplier: f64,
    /// Rewarded videos allowed per day.
    pub rewarded_cap: u32,
    /// Rewarded videos watched today.
    pub rewarded_watched: u32,
}

/// Computes and commits ad rewards.
pub struct AdRewardService {
    store: Arc<dyn Store>,
    config: EconomyConfig,
    clock: Arc<dyn Clock>,
    rng: Arc<dyn RewardRng>,
    streaks: Arc<dyn StreakSource>,
    locks: UserLocks,
}

impl AdRewardService {
    /// Create a reward service.
    ///
    /// # Errors
    ///
    /// Returns `EconomyError::Configuration` if `config` is invalid.
    pub fn new(
        store: Arc<dyn Store>,
        config: EconomyConfig,
        clock: Arc<dyn Clock>,
        rng: Arc<dyn RewardRng>,
        streaks: Arc<dyn StreakSource>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            store,
            config,
            clock,
            rng,
            streaks,
            locks: UserLocks::default(),
        })
    }

    /// The economy settings in force.
    #[must_use]
    pub fn config(&self) -> &EconomyConfig {
        &self.config
    }

    /// Hold `user_id`'s economy lock, for writes outside the reward path
    /// that rewrite the account.
    pub async fn lock_user(&self, user_id: UserId) -> OwnedMutexGuard<()> {
        self.locks.lock(user_id).await
    }

    /// The calendar day containing the current instant.
    ///
    /// # Errors
    ///
    /// Returns `EconomyError::Configuration` if the day offset is out of range.
    pub fn today(&self) -> Result<DayWindow> {
        Ok(DayWindow::containing(
            self.clock.now(),
            self.config.day_offset()?,
        ))
    }

    /// Pay out a rewarded video.
    ///
    /// # Errors
    ///
    /// - `EconomyError::CapExceeded` once today's rewarded watches reach the cap.
    /// - `EconomyError::Storage` if reading or committing fails.
    pub async fn watch_rewarded(
        &self,
        user_id: UserId,
        placement: Option<&str>,
        provider: Option<&str>,
    ) -> Result<RewardedOutcome> {
        let placement = placement.unwrap_or(DEFAULT_PLACEMENT);
        let provider = provider.unwrap_or(DEFAULT_PROVIDER);

        let _guard = self.locks.lock(user_id).await;
        let window = self.today()?;

        let watched =
            self.store
                .count_ad_watches(&user_id, AdType::Rewarded, window.start, window.end)?;
        let cap = self.config.rewarded_daily_cap;
        if watched >= cap {
            tracing::info!(user_id = %user_id, watched, cap, "Rewarded video cap reached");
            return Err(EconomyError::CapExceeded { watched, cap });
        }

        let base = self
            .rng
            .draw(self.config.rewarded_min_glim, self.config.rewarded_max_glim);
        let streak_multiplier = self.streaks.multiplier(&user_id)?;
        let placement_bonus = self.config.placement_multiplier(placement);
        let reward = apply_multipliers(base, streak_multiplier, placement_bonus);

        let now = self.clock.now();
        let event = AdWatchEvent::new(user_id, AdType::Rewarded, provider, placement, reward, now);
        let transaction = GlimTransaction::ad_rewarded(user_id, reward, placement, now);
        let commit = self.store.record_ad_reward(&AdRewardWrite {
            event: &event,
            transaction: &transaction,
            day: window.day,
            quest_kind: Some(AD_WATCH_QUEST),
        })?;

        let quests_completed = commit
            .quests_advanced
            .iter()
            .filter(|quest| quest.completed)
            .count();

        tracing::info!(
            user_id = %user_id,
            placement,
            provider,
            base,
            streak_multiplier,
            placement_bonus,
            glim = reward,
            balance = commit.balance,
            daily_watches = watched + 1,
            quests_completed,
            "Rewarded video paid"
        );

        Ok(RewardedOutcome {
            glim_rewarded: reward,
            streak_multiplier,
            placement_bonus,
            daily_watches: watched + 1,
            daily_cap: cap,
            balance: commit.balance,
            quests_completed,
        })
    }

    /// Pay out an interstitial. No cap, no multipliers, no quest progress.
    ///
    /// # Errors
    ///
    /// Returns `EconomyError::Storage` if the commit fails.
    pub async fn watch_interstitial(
        &self,
        user_id: UserId,
        placement: Option<&str>,
        provider: Option<&str>,
    ) -> Result<InterstitialOutcome> {
        let placement = placement.unwrap_or(DEFAULT_PLACEMENT);
        let provider = provider.unwrap_or(DEFAULT_PROVIDER);

        let _guard = self.locks.lock(user_id).await;
        let window = self.today()?;

        let reward = self.rng.draw(
            self.config.interstitial_min_glim,
            self.config.interstitial_max_glim,
        );

        let now = self.clock.now();
        let event = AdWatchEvent::new(
            user_id,
            AdType::Interstitial,
            provider,
            placement,
            reward,
            now,
        );
        let transaction = GlimTransaction::ad_interstitial(user_id, reward, placement, now);
        let commit = self.store.record_ad_reward(&AdRewardWrite {
            event: &event,
            transaction: &transaction,
            day: window.day,
            quest_kind: None,
        })?;

        tracing::info!(
            user_id = %user_id,
            placement,
            provider,
            glim = reward,
            balance = commit.balance,
            "Interstitial paid"
        );

        Ok(InterstitialOutcome {
            glim_rewarded: reward,
            balance: commit.balance,
        })
    }

    /// Today's ad activity. Read only.
    ///
    /// # Errors
    ///
    /// Returns `EconomyError::Storage` if a read fails.
    pub fn daily_stats(&self, user_id: UserId) -> Result<DailyStats> {
        let window = self.today()?;

        let watches = self
            .store
            .list_ad_watches_between(&user_id, window.start, window.end)?;
        let ad_stats = summarize_watches(&watches);
        let rewarded_watched = ad_stats
            .iter()
            .find(|s| s.ad_type == AdType::Rewarded)
            .map_or(0, |s| s.count);

        let total_ad_glim: i64 = self
            .store
            .list_transactions_between(&user_id, window.start, window.end)?
            .iter()
            .filter(|tx| tx.transaction_type.is_ad_derived())
            .map(|tx| tx.amount)
            .sum();

        let daily_cap = self.config.daily_glim_cap;

        Ok(DailyStats {
            today: window.day,
            ad_stats,
            total_ad_glim,
            daily_cap,
            remaining_cap: (daily_cap - total_ad_glim).max(0),
            streak_multiplier: self.streaks.multiplier(&user_id)?,
            rewarded_cap: self.config.rewarded_daily_cap,
            rewarded_watched,
        })
    }

    /// Credit an offerwall completion.
    ///
    /// Offerwall completions are credited to the ledger only; they are not
    /// written to the watch log. The provider's callback signature is not
    /// verified.
    ///
    /// # Errors
    ///
    /// - `EconomyError::InvalidOffer` for a blank id or non-positive value.
    /// - `EconomyError::Storage` if the credit fails.
    pub async fn complete_offerwall(
        &self,
        user_id: UserId,
        offer_id: &str,
        offer_value: f64,
        provider: Option<&str>,
    ) -> Result<OfferOutcome> {
        let provider = provider.unwrap_or(DEFAULT_PROVIDER);
        let glim = offerwall_glim(
            offer_id,
            offer_value,
            self.config.offerwall_glim_per_unit,
            self.config.offerwall_max_glim,
        )?;

        let _guard = self.locks.lock(user_id).await;
        let transaction = GlimTransaction::offerwall(user_id, glim, offer_id, self.clock.now());
        let balance = self.store.credit_glim(&transaction)?;

        tracing::info!(
            user_id = %user_id,
            offer_id,
            offer_value,
            provider,
            glim,
            balance,
            "Offerwall completion credited"
        );

        Ok(OfferOutcome {
            glim_rewarded: glim,
            offer_id: offer_id.to_string(),
            balance,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use glim_core::{Account, FixedClock, Quest, TransactionType};
    use glim_store::RocksStore;
    use tempfile::TempDir;

    use crate::streak::AccountStreaks;

    /// Always rolls the same value, clamped to the requested range.
    struct FixedRoll(i64);

    impl RewardRng for FixedRoll {
        fn draw(&self, min: i64, max: i64) -> i64 {
            self.0.clamp(min, max)
        }
    }

    struct Fixture {
        service: AdRewardService,
        store: Arc<dyn Store>,
        clock: Arc<FixedClock>,
        _dir: TempDir,
    }

    fn fixture_with(config: EconomyConfig, roll: i64) -> Fixture {
        let dir = TempDir::new().unwrap();
        let store: Arc<dyn Store> = Arc::new(RocksStore::open(dir.path()).unwrap());
        let clock = Arc::new(FixedClock::new(
            Utc.with_ymd_and_hms(2026, 6, 1, 9, 0, 0).unwrap(),
        ));
        let streaks = Arc::new(AccountStreaks::new(Arc::clone(&store), config.clone()));
        let service = AdRewardService::new(
            Arc::clone(&store),
            config,
            clock.clone(),
            Arc::new(FixedRoll(roll)),
            streaks,
        )
        .unwrap();
        Fixture {
            service,
            store,
            clock,
            _dir: dir,
        }
    }

    fn fixture(roll: i64) -> Fixture {
        fixture_with(EconomyConfig::default(), roll)
    }

    fn set_streak(store: &Arc<dyn Store>, user_id: UserId, days: u32) {
        let mut account = Account::new(user_id, Utc::now());
        account.streak_days = days;
        store.put_account(&account).unwrap();
    }

    #[tokio::test]
    async fn rewarded_applies_streak_then_placement() {
        let fx = fixture(75);
        let user_id = UserId::generate();
        set_streak(&fx.store, user_id, 3); // 1.25x

        let outcome = fx
            .service
            .watch_rewarded(user_id, Some("speed_up"), Some("admob"))
            .await
            .unwrap();

        // floor(floor(75 * 1.25) * 1.5) = floor(93 * 1.5) = 139
        assert_eq!(outcome.glim_rewarded, 139);
        assert!((outcome.streak_multiplier - 1.25).abs() < f64::EPSILON);
        assert!((outcome.placement_bonus - 1.5).abs() < f64::EPSILON);
        assert_eq!(outcome.daily_watches, 1);
        assert_eq!(outcome.daily_cap, 10);
        assert_eq!(outcome.balance, 139);
    }

    #[tokio::test]
    async fn rewarded_defaults_placement_and_provider() {
        let fx = fixture(100);
        let user_id = UserId::generate();

        let outcome = fx.service.watch_rewarded(user_id, None, None).await.unwrap();
        assert_eq!(outcome.glim_rewarded, 100);

        let now = fx.clock.now();
        let watches = fx
            .store
            .list_ad_watches_between(&user_id, now - Duration::hours(1), now + Duration::hours(1))
            .unwrap();
        assert_eq!(watches[0].placement, "general");
        assert_eq!(watches[0].provider, "unknown");
    }

    #[tokio::test]
    async fn rewarded_cap_blocks_and_awards_nothing() {
        let config = EconomyConfig {
            rewarded_daily_cap: 2,
            ..EconomyConfig::default()
        };
        let fx = fixture_with(config, 60);
        let user_id = UserId::generate();

        fx.service.watch_rewarded(user_id, None, None).await.unwrap();
        fx.service.watch_rewarded(user_id, None, None).await.unwrap();

        let err = fx
            .service
            .watch_rewarded(user_id, None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, EconomyError::CapExceeded { watched: 2, cap: 2 }));

        let account = fx.store.get_account(&user_id).unwrap().unwrap();
        assert_eq!(account.glim_balance, 120);
        assert_eq!(fx.store.list_transactions_by_user(&user_id, 10, 0).unwrap().len(), 2);
    }

    #[tokio::test]
    async fn cap_resets_on_the_next_calendar_day() {
        let config = EconomyConfig {
            rewarded_daily_cap: 1,
            ..EconomyConfig::default()
        };
        let fx = fixture_with(config, 60);
        let user_id = UserId::generate();

        fx.service.watch_rewarded(user_id, None, None).await.unwrap();
        assert!(fx.service.watch_rewarded(user_id, None, None).await.is_err());

        fx.clock.advance(Duration::days(1));
        let outcome = fx.service.watch_rewarded(user_id, None, None).await.unwrap();
        assert_eq!(outcome.daily_watches, 1);
    }

    #[tokio::test]
    async fn concurrent_rewarded_calls_respect_the_cap() {
        let config = EconomyConfig {
            rewarded_daily_cap: 3,
            ..EconomyConfig::default()
        };
        let fx = fixture_with(config, 50);
        let service = Arc::new(fx.service);
        let user_id = UserId::generate();

        let calls: Vec<_> = (0..8)
            .map(|_| {
                let service = Arc::clone(&service);
                tokio::spawn(async move { service.watch_rewarded(user_id, None, None).await })
            })
            .collect();

        let mut ok = 0;
        for call in calls {
            if call.await.unwrap().is_ok() {
                ok += 1;
            }
        }
        assert_eq!(ok, 3);
    }

    #[tokio::test]
    async fn rewarded_watches_advance_ad_quests_up_to_target() {
        let fx = fixture(50);
        let user_id = UserId::generate();
        let quest = Quest::new(user_id, "daily_ad_watch", 3, fx.clock.now()).unwrap();
        fx.store.put_quest(&quest).unwrap();

        for n in 1..=5_u32 {
            fx.service.watch_rewarded(user_id, None, None).await.unwrap();
            let stored = fx.store.get_quest(&user_id, &quest.id).unwrap().unwrap();
            assert_eq!(stored.progress, n.min(3));
            assert_eq!(stored.completed, n >= 3);
        }
    }

    #[tokio::test]
    async fn interstitial_is_flat_and_uncapped() {
        let config = EconomyConfig {
            rewarded_daily_cap: 0,
            ..EconomyConfig::default()
        };
        let fx = fixture_with(config, 25);
        let user_id = UserId::generate();
        set_streak(&fx.store, user_id, 30);
        let quest = Quest::new(user_id, "ad_watch", 2, fx.clock.now()).unwrap();
        fx.store.put_quest(&quest).unwrap();

        for _ in 0..3 {
            let outcome = fx
                .service
                .watch_interstitial(user_id, Some("event"), None)
                .await
                .unwrap();
            assert_eq!(outcome.glim_rewarded, 25);
        }

        let stored = fx.store.get_quest(&user_id, &quest.id).unwrap().unwrap();
        assert_eq!(stored.progress, 0);
        let account = fx.store.get_account(&user_id).unwrap().unwrap();
        assert_eq!(account.daily_watches_on(fx.clock.now().date_naive()), 0);
    }

    #[tokio::test]
    async fn interstitial_roll_stays_in_range() {
        let fx = fixture(1_000);
        let outcome = fx
            .service
            .watch_interstitial(UserId::generate(), None, None)
            .await
            .unwrap();
        assert_eq!(outcome.glim_rewarded, 30);
    }

    #[tokio::test]
    async fn offerwall_converts_caps_and_skips_the_watch_log() {
        let fx = fixture(50);
        let user_id = UserId::generate();

        let capped = fx
            .service
            .complete_offerwall(user_id, "survey-1", 600.0, Some("tapjoy"))
            .await
            .unwrap();
        assert_eq!(capped.glim_rewarded, 50_000);

        let plain = fx
            .service
            .complete_offerwall(user_id, "install-2", 100.0, None)
            .await
            .unwrap();
        assert_eq!(plain.glim_rewarded, 10_000);
        assert_eq!(plain.balance, 60_000);

        let stats = fx.service.daily_stats(user_id).unwrap();
        assert!(stats.ad_stats.is_empty());
        assert_eq!(stats.total_ad_glim, 0);
    }

    #[tokio::test]
    async fn invalid_offer_leaves_ledger_untouched() {
        let fx = fixture(50);
        let user_id = UserId::generate();

        for (offer_id, value) in [("", 100.0), ("offer", 0.0)] {
            let err = fx
                .service
                .complete_offerwall(user_id, offer_id, value, None)
                .await
                .unwrap_err();
            assert!(matches!(err, EconomyError::InvalidOffer(_)));
        }
        assert!(fx.store.get_account(&user_id).unwrap().is_none());
        assert!(fx
            .store
            .list_transactions_by_user(&user_id, 10, 0)
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn daily_stats_sum_ad_ledger_entries_of_today() {
        let fx = fixture(80);
        let user_id = UserId::generate();
        set_streak(&fx.store, user_id, 7); // 1.5x

        fx.service.watch_rewarded(user_id, None, None).await.unwrap(); // 120
        fx.service
            .watch_interstitial(user_id, None, None)
            .await
            .unwrap(); // 30
        fx.service
            .complete_offerwall(user_id, "o", 1.0, None)
            .await
            .unwrap(); // 100, not ad-derived

        // Yesterday's ad credit does not count today.
        let yesterday = fx.clock.now() - Duration::days(1);
        fx.store
            .credit_glim(&GlimTransaction::ad_rewarded(user_id, 999, "general", yesterday))
            .unwrap();

        let stats = fx.service.daily_stats(user_id).unwrap();
        assert_eq!(stats.today, NaiveDate::from_ymd_opt(2026, 6, 1).unwrap());
        assert_eq!(stats.total_ad_glim, 150);
        assert_eq!(stats.daily_cap, 5000);
        assert_eq!(stats.remaining_cap, 4850);
        assert_eq!(stats.rewarded_cap, 10);
        assert_eq!(stats.rewarded_watched, 1);
        assert!((stats.streak_multiplier - 1.5).abs() < f64::EPSILON);
        assert_eq!(stats.ad_stats.len(), 2);
    }

    #[tokio::test]
    async fn daily_stats_total_ignores_the_watch_log() {
        let fx = fixture(50);
        let user_id = UserId::generate();

        // A ledger credit with no matching watch-log entry still counts.
        fx.store
            .credit_glim(&GlimTransaction::credit(
                user_id,
                70,
                TransactionType::AdRewarded,
                "backfill".into(),
                fx.clock.now(),
            ))
            .unwrap();

        let stats = fx.service.daily_stats(user_id).unwrap();
        assert_eq!(stats.total_ad_glim, 70);
        assert!(stats.ad_stats.is_empty());
        assert_eq!(stats.rewarded_watched, 0);
    }

    #[tokio::test]
    async fn remaining_cap_never_goes_negative() {
        let config = EconomyConfig {
            daily_glim_cap: 100,
            ..EconomyConfig::default()
        };
        let fx = fixture_with(config, 150);
        let user_id = UserId::generate();
        fx.service
            .watch_rewarded(user_id, Some("event"), None)
            .await
            .unwrap(); // 300

        let stats = fx.service.daily_stats(user_id).unwrap();
        assert_eq!(stats.total_ad_glim, 300);
        assert_eq!(stats.remaining_cap, 0);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let dir = TempDir::new().unwrap();
        let store: Arc<dyn Store> = Arc::new(RocksStore::open(dir.path()).unwrap());
        let config = EconomyConfig {
            rewarded_min_glim: 10,
            rewarded_max_glim: 5,
            ..EconomyConfig::default()
        };
        let streaks = Arc::new(AccountStreaks::new(Arc::clone(&store), config.clone()));
        let result = AdRewardService::new(
            store,
            config,
            Arc::new(FixedClock::new(Utc::now())),
            Arc::new(FixedRoll(5)),
            streaks,
        );
        assert!(matches!(result, Err(EconomyError::Configuration(_))));
    }
}
