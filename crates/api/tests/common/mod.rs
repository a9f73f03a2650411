//! Common test utilities for integration tests.
//!
//! The router is wired to the in-memory lifecycle store and an HS256 token
//! validator, so these tests need no database.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Method, Request},
    Router,
};
use domain::models::{ActorProfile, Asset};
use domain::services::{InMemoryLifecycleStore, LifecycleOptions, ServiceLifecycleManager};
use equipment_tracker_api::{
    app::{create_router, AppState},
    config::{
        Config, DatabaseConfig, JwtAuthConfig, LifecycleConfig, LoggingConfig, SecurityConfig,
        ServerConfig,
    },
};
use fake::faker::name::en::{FirstName, LastName};
use fake::Fake;
use serde_json::Value;
use shared::jwt::JwtConfig;
use std::sync::Arc;
use uuid::Uuid;

pub const TEST_JWT_SECRET: &str = "integration-test-secret";

/// Test configuration using a shared-secret token validator.
pub fn test_config() -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            request_timeout_secs: 30,
        },
        database: DatabaseConfig {
            url: "postgres://unused".to_string(),
            max_connections: 5,
            min_connections: 1,
            connect_timeout_secs: 10,
            idle_timeout_secs: 600,
        },
        logging: LoggingConfig {
            level: "debug".to_string(),
            format: "pretty".to_string(),
        },
        security: SecurityConfig::default(),
        jwt: JwtAuthConfig {
            public_key: String::new(),
            private_key: String::new(),
            secret: TEST_JWT_SECRET.to_string(),
            access_token_expiry_secs: 3600,
            leeway_secs: 0,
        },
        lifecycle: LifecycleConfig::default(),
    }
}

/// A router plus handles into its backing store.
pub struct TestApp {
    pub router: Router,
    pub store: InMemoryLifecycleStore,
    pub company_id: Uuid,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: Config) -> Self {
        let store = InMemoryLifecycleStore::new();
        let manager = ServiceLifecycleManager::new(
            store.clone(),
            store.clone(),
            LifecycleOptions::from(&config.lifecycle),
        );
        let state =
            AppState::new(config, Arc::new(manager)).expect("test JWT config should build");

        Self {
            router: create_router(state),
            store,
            company_id: Uuid::new_v4(),
        }
    }

    /// Registers an in-service asset for the test company.
    pub async fn seed_asset(&self) -> Asset {
        let asset = Asset::new(self.company_id, "Torque wrench TW-7");
        self.store.insert_asset(asset.clone()).await;
        asset
    }

    /// Registers a user with a generated full name and returns its token.
    pub async fn seed_user(&self) -> TestUser {
        let first: String = FirstName().fake();
        let last: String = LastName().fake();
        let user_id = Uuid::new_v4();
        self.store
            .insert_profile(ActorProfile {
                user_id,
                first_name: Some(first.clone()),
                last_name: Some(last.clone()),
            })
            .await;

        TestUser {
            user_id,
            display_name: format!("{} {}", first, last),
            token: token_for(user_id, self.company_id),
        }
    }
}

/// An authenticated test user.
pub struct TestUser {
    pub user_id: Uuid,
    pub display_name: String,
    pub token: String,
}

/// Issues an access token signed with the test secret.
pub fn token_for(user_id: Uuid, company_id: Uuid) -> String {
    let jwt = JwtConfig::from_secret(TEST_JWT_SECRET, 3600, 0);
    let (token, _) = jwt
        .generate_access_token(user_id, company_id)
        .expect("token generation should succeed");
    token
}

/// Builds a JSON request with an optional bearer token.
pub fn json_request(method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");

    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }

    let body = match body {
        Some(json) => Body::from(serde_json::to_string(&json).unwrap()),
        None => Body::empty(),
    };
    builder.body(body).unwrap()
}

/// Parses a JSON response body.
pub async fn parse_response_body(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap_or(Value::Null)
}
