//! Login streak reporting.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use glim_core::{Account, UserId};
use glim_store::Store;

use super::ApiJson;
use crate::auth::ServiceAuth;
use crate::error::ApiError;
use crate::state::AppState;

/// Streak report from the login service.
#[derive(Debug, Deserialize)]
pub struct StreakRequest {
    /// Player the streak belongs to.
    pub user_id: String,
    /// Consecutive login days.
    pub streak_days: u32,
}

/// Streak report response.
#[derive(Debug, Serialize)]
pub struct StreakResponse {
    /// Player the streak belongs to.
    pub user_id: String,
    /// Recorded streak.
    pub streak_days: u32,
    /// Multiplier now applied to rewarded videos.
    pub streak_multiplier: f64,
}

/// Record a player's login streak (service auth).
///
/// Creates the economy account if the player has none yet.
pub async fn report_streak(
    State(state): State<Arc<AppState>>,
    service: ServiceAuth,
    ApiJson(request): ApiJson<StreakRequest>,
) -> Result<Json<StreakResponse>, ApiError> {
    let user_id: UserId = request
        .user_id
        .parse()
        .map_err(|_| ApiError::BadRequest("Invalid user_id".into()))?;

    let _guard = state.rewards.lock_user(user_id).await;

    let now = state.clock.now();
    let mut account = state
        .store
        .get_account(&user_id)?
        .unwrap_or_else(|| Account::new(user_id, now));
    account.streak_days = request.streak_days;
    account.updated_at = now;
    state.store.put_account(&account)?;

    tracing::info!(
        user_id = %user_id,
        streak_days = request.streak_days,
        service = %service.service_name,
        "Login streak recorded"
    );

    Ok(Json(StreakResponse {
        user_id: user_id.to_string(),
        streak_days: account.streak_days,
        streak_multiplier: state
            .rewards
            .config()
            .streak_multiplier(account.streak_days),
    }))
}
