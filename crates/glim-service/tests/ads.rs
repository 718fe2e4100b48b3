//! Ad reward integration tests.

mod common;

use axum::http::StatusCode;
use chrono::Duration;
use common::TestHarness;
use serde_json::json;

use glim_core::{Clock, EconomyConfig, GlimTransaction};
use glim_store::Store;

// ============================================================================
// Rewarded Video
// ============================================================================

#[tokio::test]
async fn rewarded_video_pays_within_range() {
    let harness = TestHarness::new();

    let response = harness
        .server
        .post("/v1/ads/watch_rewarded")
        .add_header("authorization", harness.user_auth_header())
        .json(&json!({ "placement": "general", "provider": "admob" }))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["watched"], true);
    let glim = body["glim_rewarded"].as_i64().unwrap();
    assert!((50..=150).contains(&glim));
    assert_eq!(body["streak_multiplier"], 1.0);
    assert_eq!(body["placement_bonus"], 1.0);
    assert_eq!(body["daily_watches"], 1);
    assert_eq!(body["daily_cap"], 10);
}

#[tokio::test]
async fn rewarded_video_accepts_missing_body() {
    let harness = TestHarness::with_economy(TestHarness::fixed_rolls(100, 20));

    let response = harness
        .server
        .post("/v1/ads/watch_rewarded")
        .add_header("authorization", harness.user_auth_header())
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["glim_rewarded"], 100);
}

#[tokio::test]
async fn rewarded_video_rejects_malformed_body() {
    let harness = TestHarness::new();

    let response = harness
        .server
        .post("/v1/ads/watch_rewarded")
        .add_header("authorization", harness.user_auth_header())
        .text("{not json")
        .await;

    response.assert_status_bad_request();
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "bad_request");
}

#[tokio::test]
async fn streak_and_placement_multipliers_stack() {
    let harness = TestHarness::with_economy(TestHarness::fixed_rolls(75, 20));

    harness
        .server
        .put("/v1/streaks")
        .add_header("x-api-key", harness.service_api_key.clone())
        .json(&json!({ "user_id": harness.test_user_id.to_string(), "streak_days": 14 }))
        .await
        .assert_status_ok();

    let response = harness
        .server
        .post("/v1/ads/watch_rewarded")
        .add_header("authorization", harness.user_auth_header())
        .json(&json!({ "placement": "bonus_chest" }))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    // floor(floor(75 * 2.0) * 1.8) = 270
    assert_eq!(body["glim_rewarded"], 270);
    assert_eq!(body["streak_multiplier"], 2.0);
    assert_eq!(body["placement_bonus"], 1.8);
}

#[tokio::test]
async fn unknown_placement_gets_no_bonus() {
    let harness = TestHarness::with_economy(TestHarness::fixed_rolls(90, 20));

    let response = harness
        .server
        .post("/v1/ads/watch_rewarded")
        .add_header("authorization", harness.user_auth_header())
        .json(&json!({ "placement": "mystery_box" }))
        .await;

    let body: serde_json::Value = response.json();
    assert_eq!(body["glim_rewarded"], 90);
    assert_eq!(body["placement_bonus"], 1.0);
}

#[tokio::test]
async fn rewarded_video_cap_returns_429_and_awards_nothing() {
    let harness = TestHarness::with_economy(EconomyConfig {
        rewarded_daily_cap: 3,
        ..TestHarness::fixed_rolls(100, 20)
    });

    for n in 1..=3 {
        let response = harness
            .server
            .post("/v1/ads/watch_rewarded")
            .add_header("authorization", harness.user_auth_header())
            .await;
        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        assert_eq!(body["daily_watches"], n);
    }

    let response = harness
        .server
        .post("/v1/ads/watch_rewarded")
        .add_header("authorization", harness.user_auth_header())
        .await;

    response.assert_status(StatusCode::TOO_MANY_REQUESTS);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "cap_exceeded");
    assert_eq!(body["error"], "Daily rewarded video limit reached");

    let account = harness
        .store
        .get_account(&harness.test_user_id)
        .unwrap()
        .unwrap();
    assert_eq!(account.glim_balance, 300);
}

#[tokio::test]
async fn rewarded_video_cap_resets_next_day() {
    let harness = TestHarness::with_economy(EconomyConfig {
        rewarded_daily_cap: 1,
        ..EconomyConfig::default()
    });

    harness
        .server
        .post("/v1/ads/watch_rewarded")
        .add_header("authorization", harness.user_auth_header())
        .await
        .assert_status_ok();
    harness
        .server
        .post("/v1/ads/watch_rewarded")
        .add_header("authorization", harness.user_auth_header())
        .await
        .assert_status(StatusCode::TOO_MANY_REQUESTS);

    harness.clock.advance(Duration::days(1));

    harness
        .server
        .post("/v1/ads/watch_rewarded")
        .add_header("authorization", harness.user_auth_header())
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn rewarded_video_without_auth_fails() {
    let harness = TestHarness::new();

    let response = harness.server.post("/v1/ads/watch_rewarded").await;

    response.assert_status_unauthorized();
}

// ============================================================================
// Interstitial
// ============================================================================

#[tokio::test]
async fn interstitial_pays_flat_and_ignores_cap() {
    let harness = TestHarness::with_economy(EconomyConfig {
        rewarded_daily_cap: 0,
        ..EconomyConfig::default()
    });

    for _ in 0..3 {
        let response = harness
            .server
            .post("/v1/ads/watch_interstitial")
            .add_header("authorization", harness.user_auth_header())
            .json(&json!({ "placement": "event" }))
            .await;

        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        assert_eq!(body["watched"], true);
        let glim = body["glim_rewarded"].as_i64().unwrap();
        assert!((10..=30).contains(&glim));
    }
}

// ============================================================================
// Offerwall
// ============================================================================

#[tokio::test]
async fn offerwall_reward_is_capped() {
    let harness = TestHarness::new();

    let response = harness
        .server
        .post("/v1/ads/offerwall_complete")
        .add_header("authorization", harness.user_auth_header())
        .json(&json!({ "offer_id": "survey-42", "offer_value": 600, "provider": "tapjoy" }))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["completed"], true);
    assert_eq!(body["glim_rewarded"], 50_000);
    assert_eq!(body["offer_id"], "survey-42");
}

#[tokio::test]
async fn offerwall_reward_converts_value() {
    let harness = TestHarness::new();

    let response = harness
        .server
        .post("/v1/ads/offerwall_complete")
        .add_header("authorization", harness.user_auth_header())
        .json(&json!({ "offer_id": "install-7", "offer_value": 100 }))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["glim_rewarded"], 10_000);

    let transactions = harness
        .store
        .list_transactions_by_user(&harness.test_user_id, 10, 0)
        .unwrap();
    assert_eq!(transactions.len(), 1);
    assert_eq!(transactions[0].description, "Offerwall offer: install-7");
}

#[tokio::test]
async fn invalid_offer_is_rejected_without_ledger_change() {
    let harness = TestHarness::new();

    for body in [
        json!({ "offer_id": "", "offer_value": 100 }),
        json!({ "offer_id": "offer-1", "offer_value": 0 }),
        json!({ "offer_value": 10 }),
    ] {
        let response = harness
            .server
            .post("/v1/ads/offerwall_complete")
            .add_header("authorization", harness.user_auth_header())
            .json(&body)
            .await;

        response.assert_status_bad_request();
        let body: serde_json::Value = response.json();
        assert_eq!(body["code"], "invalid_offer");
    }

    assert!(harness
        .store
        .list_transactions_by_user(&harness.test_user_id, 10, 0)
        .unwrap()
        .is_empty());
}

// ============================================================================
// Daily Stats
// ============================================================================

#[tokio::test]
async fn daily_stats_for_a_new_user() {
    let harness = TestHarness::new();

    let response = harness
        .server
        .get("/v1/ads/daily_stats")
        .add_header("authorization", harness.user_auth_header())
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["today"], "2026-06-01");
    assert!(body["ad_stats"].as_array().unwrap().is_empty());
    assert_eq!(body["total_ad_glim"], 0);
    assert_eq!(body["daily_cap"], 5000);
    assert_eq!(body["remaining_cap"], 5000);
    assert_eq!(body["streak_multiplier"], 1.0);
    assert_eq!(body["rewarded_cap"], 10);
    assert_eq!(body["rewarded_watched"], 0);
}

#[tokio::test]
async fn daily_stats_reflect_todays_activity() {
    let harness = TestHarness::with_economy(TestHarness::fixed_rolls(100, 20));

    for _ in 0..2 {
        harness
            .server
            .post("/v1/ads/watch_rewarded")
            .add_header("authorization", harness.user_auth_header())
            .await
            .assert_status_ok();
    }
    harness
        .server
        .post("/v1/ads/watch_interstitial")
        .add_header("authorization", harness.user_auth_header())
        .await
        .assert_status_ok();
    harness
        .server
        .post("/v1/ads/offerwall_complete")
        .add_header("authorization", harness.user_auth_header())
        .json(&json!({ "offer_id": "o-1", "offer_value": 5 }))
        .await
        .assert_status_ok();

    let response = harness
        .server
        .get("/v1/ads/daily_stats")
        .add_header("authorization", harness.user_auth_header())
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    let stats = body["ad_stats"].as_array().unwrap();
    assert_eq!(stats.len(), 2);
    assert_eq!(stats[0]["ad_type"], "rewarded");
    assert_eq!(stats[0]["count"], 2);
    assert_eq!(stats[0]["total_glim"], 200);
    assert_eq!(stats[1]["ad_type"], "interstitial");
    assert_eq!(stats[1]["count"], 1);
    assert_eq!(body["total_ad_glim"], 220);
    assert_eq!(body["remaining_cap"], 4780);
    assert_eq!(body["rewarded_watched"], 2);
}

#[tokio::test]
async fn daily_stats_total_comes_from_the_ledger() {
    let harness = TestHarness::new();

    // An ad credit with no watch-log entry.
    harness
        .store
        .credit_glim(&GlimTransaction::ad_rewarded(
            harness.test_user_id,
            40,
            "general",
            harness.clock.now(),
        ))
        .unwrap();

    let response = harness
        .server
        .get("/v1/ads/daily_stats")
        .add_header("authorization", harness.user_auth_header())
        .await;

    let body: serde_json::Value = response.json();
    assert_eq!(body["total_ad_glim"], 40);
    assert!(body["ad_stats"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn daily_stats_roll_over_at_midnight() {
    let harness = TestHarness::with_economy(TestHarness::fixed_rolls(100, 20));

    harness
        .server
        .post("/v1/ads/watch_rewarded")
        .add_header("authorization", harness.user_auth_header())
        .await
        .assert_status_ok();

    harness.clock.advance(Duration::hours(12));

    let response = harness
        .server
        .get("/v1/ads/daily_stats")
        .add_header("authorization", harness.user_auth_header())
        .await;

    let body: serde_json::Value = response.json();
    assert_eq!(body["today"], "2026-06-02");
    assert_eq!(body["total_ad_glim"], 0);
    assert_eq!(body["rewarded_watched"], 0);
}
