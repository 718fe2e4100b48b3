//! Account and ledger handlers.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use glim_core::{Account, GlimTransaction};
use glim_store::Store;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;

/// Largest page of ledger entries returned at once.
const MAX_TRANSACTION_PAGE: usize = 100;

/// Account response.
#[derive(Debug, Serialize)]
pub struct AccountResponse {
    /// User ID.
    pub user_id: String,
    /// Current Glim balance.
    pub glim_balance: i64,
    /// Glim credited over the account's lifetime.
    pub lifetime_glim_earned: i64,
    /// Rewarded videos watched today.
    pub daily_ad_watches: u32,
    /// Login streak, as last reported.
    pub streak_days: u32,
    /// Created timestamp.
    pub created_at: String,
}

impl AccountResponse {
    fn new(account: &Account, today: chrono::NaiveDate) -> Self {
        Self {
            user_id: account.user_id.to_string(),
            glim_balance: account.glim_balance,
            lifetime_glim_earned: account.lifetime_glim_earned,
            daily_ad_watches: account.daily_watches_on(today),
            streak_days: account.streak_days,
            created_at: account.created_at.to_rfc3339(),
        }
    }
}

/// Register the caller's economy account.
pub async fn create_account(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<Json<AccountResponse>, ApiError> {
    let _guard = state.rewards.lock_user(auth.user_id).await;

    if state.store.get_account(&auth.user_id)?.is_some() {
        return Err(ApiError::Conflict("Account already exists".into()));
    }

    let account = Account::new(auth.user_id, state.clock.now());
    state.store.put_account(&account)?;

    tracing::info!(user_id = %auth.user_id, "Account created");

    let today = state.rewards.today()?.day;
    Ok(Json(AccountResponse::new(&account, today)))
}

/// Get the current user's account.
pub async fn get_account(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<Json<AccountResponse>, ApiError> {
    let account = state
        .store
        .get_account(&auth.user_id)?
        .ok_or_else(|| ApiError::NotFound("Account not found".into()))?;

    let today = state.rewards.today()?.day;
    Ok(Json(AccountResponse::new(&account, today)))
}

/// Transaction list query parameters.
#[derive(Debug, Deserialize)]
pub struct ListTransactionsQuery {
    /// Maximum number of transactions to return (default: 50, max: 100).
    #[serde(default = "default_limit")]
    pub limit: usize,
    /// Offset for pagination (default: 0).
    #[serde(default)]
    pub offset: usize,
}

fn default_limit() -> usize {
    50
}

/// Ledger entry response.
#[derive(Debug, Serialize)]
pub struct TransactionResponse {
    /// Transaction ID.
    pub id: String,
    /// Glim credited.
    pub amount: i64,
    /// Transaction type.
    pub transaction_type: String,
    /// Balance after this transaction.
    pub balance_after: i64,
    /// Description.
    pub description: String,
    /// Timestamp.
    pub created_at: String,
}

impl From<&GlimTransaction> for TransactionResponse {
    fn from(tx: &GlimTransaction) -> Self {
        Self {
            id: tx.id.to_string(),
            amount: tx.amount,
            transaction_type: tx.transaction_type.as_str().to_string(),
            balance_after: tx.balance_after,
            description: tx.description.clone(),
            created_at: tx.created_at.to_rfc3339(),
        }
    }
}

/// Transaction list response.
#[derive(Debug, Serialize)]
pub struct TransactionListResponse {
    /// Ledger entries, newest first.
    pub transactions: Vec<TransactionResponse>,
    /// Whether there may be more entries.
    pub has_more: bool,
}

/// List the caller's ledger entries, newest first.
pub async fn list_transactions(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Query(query): Query<ListTransactionsQuery>,
) -> Result<Json<TransactionListResponse>, ApiError> {
    let limit = query.limit.min(MAX_TRANSACTION_PAGE);

    // Fetch one extra to check if there are more
    let transactions =
        state
            .store
            .list_transactions_by_user(&auth.user_id, limit + 1, query.offset)?;

    let has_more = transactions.len() > limit;
    let transactions: Vec<TransactionResponse> = transactions
        .iter()
        .take(limit)
        .map(TransactionResponse::from)
        .collect();

    Ok(Json(TransactionListResponse {
        transactions,
        has_more,
    }))
}
