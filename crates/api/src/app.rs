use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use domain::services::{AssetLifecycle, LifecycleOptions, ServiceLifecycleManager};
use persistence::{PgLifecycleStore, UserDirectory};
use shared::jwt::{JwtConfig, JwtError};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::middleware::{metrics_handler, metrics_middleware, require_user_auth, trace_id};
use crate::routes::{assets, health};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub lifecycle: Arc<dyn AssetLifecycle>,
    pub jwt: Arc<JwtConfig>,
}

impl AppState {
    /// Builds the state from configuration and a lifecycle implementation.
    pub fn new(config: Config, lifecycle: Arc<dyn AssetLifecycle>) -> Result<Self, JwtError> {
        let jwt = config.jwt.build()?;
        Ok(Self {
            config: Arc::new(config),
            lifecycle,
            jwt: Arc::new(jwt),
        })
    }
}

/// Builds the application backed by PostgreSQL.
pub fn create_app(config: Config, pool: PgPool) -> Result<Router, JwtError> {
    let options = LifecycleOptions::from(&config.lifecycle);
    let manager = ServiceLifecycleManager::new(
        PgLifecycleStore::new(pool.clone()),
        UserDirectory::new(pool),
        options,
    );

    let state = AppState::new(config, Arc::new(manager))?;
    Ok(create_router(state))
}

/// Builds the router with all routes and global middleware.
pub fn create_router(state: AppState) -> Router {
    let config = state.config.clone();

    // Empty origin list allows any origin (development)
    let cors = if config.security.cors_origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = config
            .security
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    // Protected routes (require JWT user authentication)
    let protected_routes = Router::new()
        .route(
            "/api/v1/assets/:asset_id/out-of-service",
            post(assets::mark_out_of_service),
        )
        .route(
            "/api/v1/assets/:asset_id/return-to-service",
            post(assets::return_to_service),
        )
        .route(
            "/api/v1/assets/:asset_id/service-status",
            get(assets::service_status),
        )
        .route("/api/v1/assets/:asset_id/changelog", get(assets::changelog))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_user_auth,
        ));

    // Public routes (no authentication required)
    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::ready))
        .route("/api/health/live", get(health::live))
        .route("/metrics", get(metrics_handler));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        // Global middleware (order matters: bottom layers run first)
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(cors)
        .with_state(state)
}
