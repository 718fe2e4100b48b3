//! Quest progress.
//!
//! Quests are owned by the game's quest system; the economy only advances
//! them as a side effect of rewards. Progress is clamped at the target and
//! completion never reverts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{EconomyError, Result};
use crate::{QuestId, UserId};

/// Quest kind advanced by rewarded videos.
pub const AD_WATCH_QUEST: &str = "ad_watch";

/// A user's progress on one quest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quest {
    /// Quest ID.
    pub id: QuestId,

    /// Owner.
    pub user_id: UserId,

    /// Quest type, e.g. `daily_ad_watch`.
    pub quest_type: String,

    /// Current progress, never above `target`.
    pub progress: u32,

    /// Progress needed to complete.
    pub target: u32,

    /// Set once `progress` reaches `target`.
    pub completed: bool,

    /// When the quest was assigned.
    pub created_at: DateTime<Utc>,

    /// When the quest was completed.
    pub completed_at: Option<DateTime<Utc>>,
}

impl Quest {
    /// Create a new quest with zero progress.
    ///
    /// # Errors
    ///
    /// Returns `EconomyError::InvalidQuest` for an empty type or a zero target.
    pub fn new(
        user_id: UserId,
        quest_type: impl Into<String>,
        target: u32,
        now: DateTime<Utc>,
    ) -> Result<Self> {
        let quest_type = quest_type.into();
        if quest_type.trim().is_empty() {
            return Err(EconomyError::InvalidQuest("quest_type is required".into()));
        }
        if target == 0 {
            return Err(EconomyError::InvalidQuest(
                "target must be at least 1".into(),
            ));
        }

        Ok(Self {
            id: QuestId::at(now),
            user_id,
            quest_type,
            progress: 0,
            target,
            completed: false,
            created_at: now,
            completed_at: None,
        })
    }

    /// Whether this quest is still open and its type mentions `kind`.
    #[must_use]
    pub fn accepts(&self, kind: &str) -> bool {
        !self.completed && self.quest_type.contains(kind)
    }

    /// Advance progress by `amount`, clamped at the target.
    ///
    /// Returns `true` if the quest changed. Completed quests are left alone.
    pub fn advance(&mut self, amount: u32, now: DateTime<Utc>) -> bool {
        if self.completed || amount == 0 {
            return false;
        }

        self.progress = self.progress.saturating_add(amount).min(self.target);
        if self.progress >= self.target {
            self.completed = true;
            self.completed_at = Some(now);
        }
        true
    }
}
