//! Common test utilities for Glim economy integration tests.

#![allow(dead_code)] // Some utilities are used by different test files

use std::sync::Arc;

use axum::Router;
use axum_test::TestServer;
use chrono::{TimeZone, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use tempfile::TempDir;

use glim_core::{EconomyConfig, FixedClock, SeededRng, UserId};
use glim_service::auth::JwtClaims;
use glim_service::{create_router, AppState, ServiceConfig};
use glim_store::RocksStore;

/// Shared secret the harness signs player tokens with.
pub const JWT_SECRET: &str = "integration-test-secret";

/// Audience the harness signs player tokens for.
pub const AUDIENCE: &str = "glim-economy";

/// Test harness containing everything needed for integration tests.
pub struct TestHarness {
    /// The test server for making HTTP requests.
    pub server: TestServer,
    /// The store behind the server, for direct assertions.
    pub store: Arc<RocksStore>,
    /// The clock the server reads; advance it to cross day boundaries.
    pub clock: Arc<FixedClock>,
    /// Temporary directory for the database (kept alive for test duration).
    pub _temp_dir: TempDir,
    /// A test user ID for authenticated requests.
    pub test_user_id: UserId,
    /// The service API key for service-to-service requests.
    pub service_api_key: String,
}

impl TestHarness {
    /// Create a new test harness with a fresh database and default economy.
    pub fn new() -> Self {
        Self::with_economy(EconomyConfig::default())
    }

    /// Create a new test harness with the given economy settings.
    pub fn with_economy(economy: EconomyConfig) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store = Arc::new(RocksStore::open(temp_dir.path()).expect("Failed to open store"));

        let service_api_key = "test-service-key".to_string();

        let config = ServiceConfig {
            listen_addr: "127.0.0.1:0".into(),
            data_dir: temp_dir.path().to_string_lossy().to_string(),
            jwt_secret: Some(JWT_SECRET.into()),
            auth_audience: AUDIENCE.into(),
            auth_issuer: None,
            service_api_key: Some(service_api_key.clone()),
            cors_origins: vec!["*".into()],
            max_body_bytes: 1024 * 1024,
            request_timeout_seconds: 30,
            economy,
        };

        let clock = Arc::new(FixedClock::new(
            Utc.with_ymd_and_hms(2026, 6, 1, 12, 0, 0).unwrap(),
        ));
        let state = AppState::with_seams(
            Arc::clone(&store),
            config,
            clock.clone(),
            Arc::new(SeededRng::seeded(7)),
        )
        .expect("Failed to build app state");
        let router: Router = create_router(state);

        let server = TestServer::new(router).expect("Failed to create test server");
        let test_user_id = UserId::generate();

        Self {
            server,
            store,
            clock,
            _temp_dir: temp_dir,
            test_user_id,
            service_api_key,
        }
    }

    /// Economy settings that make every payout deterministic.
    pub fn fixed_rolls(rewarded: i64, interstitial: i64) -> EconomyConfig {
        EconomyConfig {
            rewarded_min_glim: rewarded,
            rewarded_max_glim: rewarded,
            interstitial_min_glim: interstitial,
            interstitial_max_glim: interstitial,
            ..EconomyConfig::default()
        }
    }

    /// Get the authorization header for user authentication.
    pub fn user_auth_header(&self) -> String {
        Self::auth_header_for(&self.test_user_id)
    }

    /// Get a different user's auth header (for testing isolation).
    pub fn other_user_auth_header() -> String {
        Self::auth_header_for(&UserId::generate())
    }

    /// Sign a player token for `user_id`.
    pub fn auth_header_for(user_id: &UserId) -> String {
        let now = Utc::now().timestamp();
        let claims = JwtClaims {
            sub: user_id.to_string(),
            aud: Some(serde_json::json!(AUDIENCE)),
            iss: None,
            exp: now + 3600,
            iat: now,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
        )
        .expect("Failed to sign token");
        format!("Bearer {token}")
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}
