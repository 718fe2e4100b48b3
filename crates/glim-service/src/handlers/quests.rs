//! Quest handlers.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use glim_core::{Quest, UserId};
use glim_store::Store;

use super::ApiJson;
use crate::auth::{AuthUser, ServiceAuth};
use crate::error::ApiError;
use crate::state::AppState;

/// Quest response.
#[derive(Debug, Serialize)]
pub struct QuestResponse {
    /// Quest ID.
    pub id: String,
    /// Quest kind, e.g. `daily_ad_watch`.
    pub quest_type: String,
    /// Current progress.
    pub progress: u32,
    /// Progress needed to complete.
    pub target: u32,
    /// Whether the quest is complete.
    pub completed: bool,
    /// Created timestamp.
    pub created_at: String,
    /// Completion timestamp.
    pub completed_at: Option<String>,
}

impl From<&Quest> for QuestResponse {
    fn from(quest: &Quest) -> Self {
        Self {
            id: quest.id.to_string(),
            quest_type: quest.quest_type.clone(),
            progress: quest.progress,
            target: quest.target,
            completed: quest.completed,
            created_at: quest.created_at.to_rfc3339(),
            completed_at: quest.completed_at.map(|at| at.to_rfc3339()),
        }
    }
}

/// Quest list response.
#[derive(Debug, Serialize)]
pub struct QuestListResponse {
    /// The caller's quests, oldest first.
    pub quests: Vec<QuestResponse>,
}

/// List the caller's quests.
pub async fn list_quests(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<Json<QuestListResponse>, ApiError> {
    let quests = state.store.list_quests_by_user(&auth.user_id)?;

    Ok(Json(QuestListResponse {
        quests: quests.iter().map(QuestResponse::from).collect(),
    }))
}

/// Quest assignment request.
#[derive(Debug, Deserialize)]
pub struct AssignQuestRequest {
    /// Player the quest is assigned to.
    pub user_id: String,
    /// Quest kind.
    pub quest_type: String,
    /// Progress needed to complete.
    pub target: u32,
}

/// Assign a quest to a player (service auth).
pub async fn assign_quest(
    State(state): State<Arc<AppState>>,
    service: ServiceAuth,
    ApiJson(request): ApiJson<AssignQuestRequest>,
) -> Result<Json<QuestResponse>, ApiError> {
    let user_id: UserId = request
        .user_id
        .parse()
        .map_err(|_| ApiError::BadRequest("Invalid user_id".into()))?;

    let quest = Quest::new(user_id, request.quest_type, request.target, state.clock.now())?;
    state.store.put_quest(&quest)?;

    tracing::info!(
        user_id = %user_id,
        quest_id = %quest.id,
        quest_type = %quest.quest_type,
        target = quest.target,
        service = %service.service_name,
        "Quest assigned"
    );

    Ok(Json(QuestResponse::from(&quest)))
}
