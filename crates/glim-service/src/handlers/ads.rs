//! Ad reward handlers.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use glim_core::AdTypeStats;

use super::{optional_json, ApiJson};
use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::rewards::DailyStats;
use crate::state::AppState;

/// Body of a video watch report. Every field is optional and the body may
/// be omitted.
#[derive(Debug, Default, Deserialize)]
pub struct WatchRequest {
    /// Where in the game the ad was shown.
    pub placement: Option<String>,
    /// Ad network that served it.
    pub provider: Option<String>,
}

/// Rewarded video response.
#[derive(Debug, Serialize)]
pub struct RewardedResponse {
    /// Always `true` on success.
    pub watched: bool,
    /// Glim credited.
    pub glim_rewarded: i64,
    /// Streak multiplier applied.
    pub streak_multiplier: f64,
    /// Placement multiplier applied.
    pub placement_bonus: f64,
    /// Rewarded videos watched today, including this one.
    pub daily_watches: u32,
    /// Rewarded videos allowed per day.
    pub daily_cap: u32,
}

/// Pay out a rewarded video.
pub async fn watch_rewarded(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    body: Bytes,
) -> Result<Json<RewardedResponse>, ApiError> {
    let request: WatchRequest = optional_json(&body)?;

    let outcome = state
        .rewards
        .watch_rewarded(
            auth.user_id,
            request.placement.as_deref(),
            request.provider.as_deref(),
        )
        .await?;

    Ok(Json(RewardedResponse {
        watched: true,
        glim_rewarded: outcome.glim_rewarded,
        streak_multiplier: outcome.streak_multiplier,
        placement_bonus: outcome.placement_bonus,
        daily_watches: outcome.daily_watches,
        daily_cap: outcome.daily_cap,
    }))
}

/// Interstitial response.
#[derive(Debug, Serialize)]
pub struct InterstitialResponse {
    /// Always `true` on success.
    pub watched: bool,
    /// Glim credited.
    pub glim_rewarded: i64,
}

/// Pay out an interstitial.
pub async fn watch_interstitial(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    body: Bytes,
) -> Result<Json<InterstitialResponse>, ApiError> {
    let request: WatchRequest = optional_json(&body)?;

    let outcome = state
        .rewards
        .watch_interstitial(
            auth.user_id,
            request.placement.as_deref(),
            request.provider.as_deref(),
        )
        .await?;

    Ok(Json(InterstitialResponse {
        watched: true,
        glim_rewarded: outcome.glim_rewarded,
    }))
}

/// Per-ad-type entry of the daily stats.
#[derive(Debug, Serialize)]
pub struct AdStatResponse {
    /// `rewarded`, `interstitial` or `offerwall`.
    pub ad_type: String,
    /// Watches today.
    pub count: u32,
    /// Glim from those watches.
    pub total_glim: i64,
}

impl From<&AdTypeStats> for AdStatResponse {
    fn from(stats: &AdTypeStats) -> Self {
        Self {
            ad_type: stats.ad_type.as_str().to_string(),
            count: stats.count,
            total_glim: stats.total_glim,
        }
    }
}

/// Daily stats response.
#[derive(Debug, Serialize)]
pub struct DailyStatsResponse {
    /// Calendar day, `YYYY-MM-DD`.
    pub today: String,
    /// Watch-log aggregate per ad type.
    pub ad_stats: Vec<AdStatResponse>,
    /// Ad-derived Glim credited today.
    pub total_ad_glim: i64,
    /// Daily ad Glim cap.
    pub daily_cap: i64,
    /// Cap headroom, never negative.
    pub remaining_cap: i64,
    /// Current streak multiplier.
    pub streak_multiplier: f64,
    /// Rewarded videos allowed per day.
    pub rewarded_cap: u32,
    /// Rewarded videos watched today.
    pub rewarded_watched: u32,
}

impl From<DailyStats> for DailyStatsResponse {
    fn from(stats: DailyStats) -> Self {
        Self {
            today: stats.today.format("%Y-%m-%d").to_string(),
            ad_stats: stats.ad_stats.iter().map(AdStatResponse::from).collect(),
            total_ad_glim: stats.total_ad_glim,
            daily_cap: stats.daily_cap,
            remaining_cap: stats.remaining_cap,
            streak_multiplier: stats.streak_multiplier,
            rewarded_cap: stats.rewarded_cap,
            rewarded_watched: stats.rewarded_watched,
        }
    }
}

/// Today's ad activity for the caller.
pub async fn daily_stats(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<Json<DailyStatsResponse>, ApiError> {
    let stats = state.rewards.daily_stats(auth.user_id)?;
    Ok(Json(DailyStatsResponse::from(stats)))
}

/// Offerwall completion request.
#[derive(Debug, Deserialize)]
pub struct OfferwallRequest {
    /// Provider's offer identifier.
    #[serde(default)]
    pub offer_id: String,
    /// Provider-reported value of the offer.
    #[serde(default)]
    pub offer_value: f64,
    /// Offerwall provider.
    pub provider: Option<String>,
}

/// Offerwall completion response.
#[derive(Debug, Serialize)]
pub struct OfferwallResponse {
    /// Always `true` on success.
    pub completed: bool,
    /// Glim credited.
    pub glim_rewarded: i64,
    /// The completed offer.
    pub offer_id: String,
}

/// Credit an offerwall completion.
pub async fn offerwall_complete(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    ApiJson(request): ApiJson<OfferwallRequest>,
) -> Result<Json<OfferwallResponse>, ApiError> {
    let outcome = state
        .rewards
        .complete_offerwall(
            auth.user_id,
            &request.offer_id,
            request.offer_value,
            request.provider.as_deref(),
        )
        .await?;

    Ok(Json(OfferwallResponse {
        completed: true,
        glim_rewarded: outcome.glim_rewarded,
        offer_id: outcome.offer_id,
    }))
}
