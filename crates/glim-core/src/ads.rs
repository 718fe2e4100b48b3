//! Ad-watch log types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{UserId, WatchId};

/// Placement used when the client does not send one.
pub const DEFAULT_PLACEMENT: &str = "general";

/// Provider used when the client does not send one.
pub const DEFAULT_PROVIDER: &str = "unknown";

/// Ad format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdType {
    /// Opt-in video with a guaranteed reward.
    Rewarded,

    /// Ad shown between actions.
    Interstitial,

    /// Third-party catalog of sponsored actions.
    Offerwall,
}

impl AdType {
    /// Wire name of the ad type.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Rewarded => "rewarded",
            Self::Interstitial => "interstitial",
            Self::Offerwall => "offerwall",
        }
    }
}

impl fmt::Display for AdType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One watched ad, as appended to the watch log.
///
/// Entries are immutable once logged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdWatchEvent {
    /// Log entry ID (ULID stamped with `watched_at`).
    pub id: WatchId,

    /// Viewer.
    pub user_id: UserId,

    /// Ad format.
    pub ad_type: AdType,

    /// Ad network that served the ad.
    pub provider: String,

    /// In-game context that triggered the ad.
    pub placement: String,

    /// Glim paid out for this watch.
    pub glim_rewarded: i64,

    /// When the ad was watched.
    pub watched_at: DateTime<Utc>,
}

impl AdWatchEvent {
    /// Create a new log entry.
    #[must_use]
    pub fn new(
        user_id: UserId,
        ad_type: AdType,
        provider: impl Into<String>,
        placement: impl Into<String>,
        glim_rewarded: i64,
        watched_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: WatchId::at(watched_at),
            user_id,
            ad_type,
            provider: provider.into(),
            placement: placement.into(),
            glim_rewarded,
            watched_at,
        }
    }
}

/// Per-ad-type aggregate over a day of the watch log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdTypeStats {
    /// Ad format.
    pub ad_type: AdType,
    /// Number of watches.
    pub count: u32,
    /// Glim paid out for those watches.
    pub total_glim: i64,
}

/// Group watch-log entries by ad type, ordered by ad type.
#[must_use]
pub fn summarize_watches(events: &[AdWatchEvent]) -> Vec<AdTypeStats> {
    let mut stats: Vec<AdTypeStats> = Vec::new();
    for event in events {
        match stats.iter_mut().find(|s| s.ad_type == event.ad_type) {
            Some(entry) => {
                entry.count += 1;
                entry.total_glim += event.glim_rewarded;
            }
            None => stats.push(AdTypeStats {
                ad_type: event.ad_type,
                count: 1,
                total_glim: event.glim_rewarded,
            }),
        }
    }
    stats.sort_by_key(|s| s.ad_type);
    stats
}
