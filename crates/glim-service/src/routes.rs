//! Router configuration.
//!
//! This module sets up the Axum router with all routes and middleware.

use std::sync::Arc;
use std::time::Duration;

use axum::routing::{get, post, put};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{accounts, ads, health, quests, streaks};
use crate::state::AppState;

/// Create the service router with all routes and middleware.
///
/// # Routes
///
/// ## Public
/// - `GET /health` - Health check
///
/// ## Ads (player JWT auth)
/// - `POST /v1/ads/watch_rewarded` - Pay out a rewarded video
/// - `POST /v1/ads/watch_interstitial` - Pay out an interstitial
/// - `GET /v1/ads/daily_stats` - Today's ad activity
/// - `POST /v1/ads/offerwall_complete` - Credit an offerwall completion
///
/// ## Accounts (player JWT auth)
/// - `POST /v1/accounts` - Register economy account
/// - `GET /v1/accounts/me` - Get current user's account
/// - `GET /v1/glim/transactions` - List ledger entries
///
/// ## Quests
/// - `GET /v1/quests` - List my quests (player JWT auth)
/// - `POST /v1/quests` - Assign a quest (service API key auth)
///
/// ## Streaks (service API key auth)
/// - `PUT /v1/streaks` - Report a login streak
pub fn create_router(state: AppState) -> Router {
    let cors_origins = state.config.cors_origins.clone();
    let max_body_bytes = state.config.max_body_bytes;
    let request_timeout_seconds = state.config.request_timeout_seconds;

    let cors = build_cors_layer(&cors_origins);

    let state = Arc::new(state);

    Router::new()
        // Health (public)
        .route("/health", get(health::health))
        // Ads
        .route("/v1/ads/watch_rewarded", post(ads::watch_rewarded))
        .route("/v1/ads/watch_interstitial", post(ads::watch_interstitial))
        .route("/v1/ads/daily_stats", get(ads::daily_stats))
        .route("/v1/ads/offerwall_complete", post(ads::offerwall_complete))
        // Accounts
        .route("/v1/accounts", post(accounts::create_account))
        .route("/v1/accounts/me", get(accounts::get_account))
        .route("/v1/glim/transactions", get(accounts::list_transactions))
        // Quests
        .route(
            "/v1/quests",
            get(quests::list_quests).post(quests::assign_quest),
        )
        // Streaks (service auth)
        .route("/v1/streaks", put(streaks::report_streak))
        // Middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(RequestBodyLimitLayer::new(max_body_bytes))
                .layer(TimeoutLayer::new(Duration::from_secs(
                    request_timeout_seconds,
                ))),
        )
        .with_state(state)
}

/// Build the CORS layer from configured origins.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}
